// Named-event pub/sub shared by shapes and the world.
pub mod emitter;

use crate::api::types::Axis;
use crate::components::shape::Shape;
use crate::components::vector::Vector2;

/// Event kinds emitted by shapes and the world.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    MouseDown,
    MouseUp,
    MouseMove,
    Click,
    Hover,
    Unhover,
    Collision,
    DirectionChange,
    /// Game-defined event, emitted only by user code.
    Custom(String),
}

impl EventType {
    pub fn custom(name: impl Into<String>) -> Self {
        EventType::Custom(name.into())
    }
}

/// Payload delivered with an event.
#[derive(Debug, Clone)]
pub enum EventData {
    None,
    /// Pointer position in pixels.
    Pointer(Vector2),
    Direction(Axis),
    Collision { a: Shape, b: Shape },
    Custom(serde_json::Value),
}
