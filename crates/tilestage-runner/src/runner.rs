use std::sync::{Arc, Mutex, MutexGuard};

use log::info;
use tilestage::{
    FixedTimestep, InputEvent, InputQueue, SharedInput, Surface, World, WorldBuilder,
};

fn queue(input: &SharedInput) -> MutexGuard<'_, InputQueue> {
    input.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drives a [`World`] from variable host frame times.
///
/// The host calls [`GameRunner::start`] once, pushes input events as they
/// arrive and calls [`GameRunner::frame`] once per displayed frame.
pub struct GameRunner {
    world: World,
    input: SharedInput,
    timestep: FixedTimestep,
    started: bool,
}

impl GameRunner {
    /// Build the world, routing its input through the runner's queue.
    pub fn new(builder: WorldBuilder) -> Self {
        let input: SharedInput = Arc::new(Mutex::new(InputQueue::new()));
        let world = builder.with_input(Arc::clone(&input)).build();
        let timestep = FixedTimestep::new(world.config().fixed_dt);
        Self { world, input, timestep, started: false }
    }

    /// Enter the first level. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        info!("starting \"{}\"", self.world.config().title);
        self.world.select_level(0);
        self.started = true;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Queue an input event for the next world update.
    pub fn push_input(&mut self, event: InputEvent) {
        queue(&self.input).push(event);
    }

    /// Run as many fixed updates as `dt` seconds allow, then draw and run
    /// the level's render hook. Returns the number of updates run.
    pub fn frame(&mut self, dt: f64, surface: &mut dyn Surface) -> u32 {
        if !self.started {
            return 0;
        }
        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.world.update_by(self.timestep.dt());
        }
        self.world.draw(surface);
        self.world.render(surface);
        steps
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tilestage::{DrawCall, Level, MouseButton, RecordingSurface, WorldConfig};

    fn runner_with(level: Level) -> GameRunner {
        GameRunner::new(WorldBuilder::new(WorldConfig::default()).with_level(level))
    }

    #[test]
    fn frames_before_start_do_nothing() {
        let mut runner = runner_with(Level::new());
        let mut surface = RecordingSurface::new();
        assert_eq!(runner.frame(1.0, &mut surface), 0);
        assert!(surface.calls().is_empty());
        assert_eq!(runner.world().current_level(), None);
    }

    #[test]
    fn start_enters_level_zero_once() {
        let mounts = Arc::new(AtomicUsize::new(0));
        let m = Arc::clone(&mounts);
        let mut runner = runner_with(Level::new().on_mount(move |_| {
            m.fetch_add(1, Ordering::SeqCst);
        }));
        runner.start();
        runner.start();
        assert!(runner.is_started());
        assert_eq!(runner.world().current_level(), Some(0));
        assert_eq!(mounts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn frame_runs_fixed_steps_then_draws() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let t = Arc::clone(&ticks);
        let mut runner = runner_with(Level::new().on_tick(move |_, data| {
            assert_eq!(data.delta, 1.0 / 60.0);
            t.fetch_add(1, Ordering::SeqCst);
        }));
        runner.start();

        let mut surface = RecordingSurface::new();
        assert_eq!(runner.frame(1.0 / 30.0, &mut surface), 2);
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert_eq!(surface.calls(), &[DrawCall::Fill(tilestage::Color::BLACK)]);
    }

    #[test]
    fn pushed_input_reaches_the_world() {
        let mut runner = runner_with(Level::new());
        runner.start();
        runner.push_input(InputEvent::PointerDown { x: 4.0, y: 2.0, button: MouseButton::Left });
        runner.frame(1.0 / 60.0, &mut RecordingSurface::new());
        assert!(runner.world().mouse().left);
        assert_eq!(runner.world().cursor_position(), tilestage::Vector2::new(4.0, 2.0));
    }
}
