use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::components::vector::Vector2;
use crate::core::sync::lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input event types the host feeds in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A button went down at (x, y) in pixels.
    PointerDown { x: f64, y: f64, button: MouseButton },
    PointerUp { x: f64, y: f64, button: MouseButton },
    PointerMove { x: f64, y: f64 },
    KeyDown { key_code: u32 },
    KeyUp { key_code: u32 },
}

/// Input state as of one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub pointer: Vector2,
    pub left: bool,
    pub right: bool,
    pub middle: bool,
    pub keys: HashSet<u32>,
}

impl InputSnapshot {
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
        }
    }

    pub fn is_key_pressed(&self, key_code: u32) -> bool {
        self.keys.contains(&key_code)
    }

    fn set_button(&mut self, button: MouseButton, down: bool) {
        match button {
            MouseButton::Left => self.left = down,
            MouseButton::Right => self.right = down,
            MouseButton::Middle => self.middle = down,
        }
    }

    /// Fold one event into the state.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerDown { x, y, button } => {
                self.pointer = Vector2::new(x, y);
                self.set_button(button, true);
            }
            InputEvent::PointerUp { x, y, button } => {
                self.pointer = Vector2::new(x, y);
                self.set_button(button, false);
            }
            InputEvent::PointerMove { x, y } => self.pointer = Vector2::new(x, y),
            InputEvent::KeyDown { key_code } => {
                self.keys.insert(key_code);
            }
            InputEvent::KeyUp { key_code } => {
                self.keys.remove(&key_code);
            }
        }
    }
}

/// Where a world samples input from, once per update.
pub trait InputSource: Send {
    fn poll(&mut self) -> InputSnapshot;
}

/// Host-fed input. Events wait here until the world polls, which folds
/// them in arrival order into the running [`InputSnapshot`].
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: Vec<InputEvent>,
    state: InputSnapshot,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.pending.push(event);
    }

    /// Queue several events at once, keeping their order.
    pub fn push_all(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.pending.extend(events);
    }

    /// Events pushed since the last poll.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// State as of the last poll, without folding anything new.
    pub fn last_state(&self) -> &InputSnapshot {
        &self.state
    }
}

impl InputSource for InputQueue {
    fn poll(&mut self) -> InputSnapshot {
        let state = &mut self.state;
        self.pending.drain(..).for_each(|event| state.apply(&event));
        self.state.clone()
    }
}

/// Queue shared between the host (pushing) and a world (polling).
pub type SharedInput = Arc<Mutex<InputQueue>>;

impl<T: InputSource> InputSource for Arc<Mutex<T>> {
    fn poll(&mut self) -> InputSnapshot {
        lock(&**self).poll()
    }
}
