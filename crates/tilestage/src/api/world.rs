use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use glam::Vec2;
use log::{debug, info, warn};

use super::audio::{AudioError, AudioManager, NullAudio};
use super::level::{Level, RenderHook, TickHook};
use super::types::{LoopData, ShapeKind, BORDER_TAG, PIXELS_PER_METER};
use crate::components::shape::{Shape, ShapeProps};
use crate::components::vector::Vector2;
use crate::config::WorldConfig;
use crate::core::contact::{CollisionPair, CollisionQueue, ContactListener};
use crate::core::physics::PhysicsWorld;
use crate::core::rng::seed_names;
use crate::core::scene::Registry;
use crate::core::sync::{lock, read, write};
use crate::core::time::FrameClock;
use crate::error::{Error, Result};
use crate::events::emitter::{EventEmitter, ListenerId};
use crate::events::{EventData, EventType};
use crate::input::queue::{InputQueue, InputSnapshot, InputSource};
use crate::renderer::surface::{Color, Surface};

/// World-level pointer callback, called with the cursor position in pixels.
pub type PointerCallback = Arc<dyn Fn(&World, Vector2) + Send + Sync>;

/// Z index given to `line`, `circle` and `rect` draw commands.
const PEN_Z: i32 = 1000;
const PEN_SIZE: f64 = 10.0;
const DEFAULT_BORDER_WIDTH: f64 = 10.0;

const VELOCITY_ITERATIONS: usize = 6;
const POSITION_ITERATIONS: usize = 3;

fn gravity_to_solver(gravity: Vector2) -> Vec2 {
    (gravity * PIXELS_PER_METER).as_vec2()
}

#[derive(Default)]
struct LevelState {
    /// Level whose hooks are installed. `None` until the first selection.
    active: Option<usize>,
    pending: Option<usize>,
    tick: Option<TickHook>,
    render: Option<RenderHook>,
}

struct InputState {
    source: Box<dyn InputSource>,
    current: InputSnapshot,
}

#[derive(Default)]
struct MouseCallbacks {
    down: Option<PointerCallback>,
    up: Option<PointerCallback>,
    moved: Option<PointerCallback>,
}

pub(crate) struct WorldInner {
    config: WorldConfig,
    physics: Mutex<PhysicsWorld>,
    registry: RwLock<Registry>,
    collisions: CollisionQueue,
    draw_commands: Mutex<Vec<Shape>>,
    levels: Vec<Level>,
    level_state: Mutex<LevelState>,
    input: Mutex<InputState>,
    audio: Mutex<Box<dyn AudioManager>>,
    events: EventEmitter,
    mouse: Mutex<MouseCallbacks>,
    clock: Mutex<FrameClock>,
    paused: AtomicBool,
    destroyed: AtomicBool,
}

impl WorldInner {
    /// The physics lock. Never take it while holding the registry lock.
    pub(crate) fn physics(&self) -> MutexGuard<'_, PhysicsWorld> {
        lock(&self.physics)
    }
}

/// Builds a [`World`] with injected collaborators.
pub struct WorldBuilder {
    config: WorldConfig,
    levels: Vec<Level>,
    audio: Option<Box<dyn AudioManager>>,
    input: Option<Box<dyn InputSource>>,
}

impl WorldBuilder {
    pub fn new(config: WorldConfig) -> Self {
        Self { config, levels: Vec::new(), audio: None, input: None }
    }

    pub fn with_levels(mut self, levels: impl IntoIterator<Item = Level>) -> Self {
        self.levels.extend(levels);
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.levels.push(level);
        self
    }

    pub fn with_audio(mut self, audio: impl AudioManager + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Seed for default shape names, applied by `build`.
    pub fn with_name_seed(mut self, seed: u64) -> Self {
        self.config.name_seed = Some(seed);
        self
    }

    pub fn build(self) -> World {
        if let Some(seed) = self.config.name_seed {
            seed_names(seed);
            debug!("shape names seeded with {seed}");
        }
        let mut physics = PhysicsWorld::new(gravity_to_solver(self.config.gravity));
        physics.set_dt(self.config.fixed_dt as f32);
        physics.set_solver_iterations(VELOCITY_ITERATIONS, POSITION_ITERATIONS);

        let levels = if self.levels.is_empty() { vec![Level::default()] } else { self.levels };
        let paused = self.config.paused;
        info!(
            "world \"{}\" {}x{} with {} level(s)",
            self.config.title,
            self.config.width,
            self.config.height,
            levels.len()
        );

        World {
            inner: Arc::new(WorldInner {
                config: self.config,
                physics: Mutex::new(physics),
                registry: RwLock::new(Registry::new()),
                collisions: CollisionQueue::new(),
                draw_commands: Mutex::new(Vec::new()),
                levels,
                level_state: Mutex::new(LevelState::default()),
                input: Mutex::new(InputState {
                    source: self.input.unwrap_or_else(|| Box::new(InputQueue::new())),
                    current: InputSnapshot::default(),
                }),
                audio: Mutex::new(self.audio.unwrap_or_else(|| Box::new(NullAudio))),
                events: EventEmitter::new(),
                mouse: Mutex::new(MouseCallbacks::default()),
                clock: Mutex::new(FrameClock::default()),
                paused: AtomicBool::new(paused),
                destroyed: AtomicBool::new(false),
            }),
        }
    }
}

/// The simulation: physics, the live shape registry, the frame pipeline and
/// the level state machine.
///
/// `World` is a handle; clones drive the same simulation. Shapes only keep a
/// weak reference back to it.
#[derive(Clone)]
pub struct World {
    inner: Arc<WorldInner>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        WorldBuilder::new(config).build()
    }

    pub fn builder(config: WorldConfig) -> WorldBuilder {
        WorldBuilder::new(config)
    }

    pub(crate) fn from_inner(inner: Arc<WorldInner>) -> Self {
        Self { inner }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.inner.config
    }

    pub fn width(&self) -> f64 {
        self.inner.config.width
    }

    pub fn height(&self) -> f64 {
        self.inner.config.height
    }

    // -- registry --

    /// Create the shape's body and add it to the registry.
    /// Registering a shape that is already live is a no-op.
    pub fn register(&self, shape: &Shape) -> Result<()> {
        if shape.is_live() || self.is_destroyed() {
            return Ok(());
        }
        if !write(&self.inner.registry).reserve(shape.id()) {
            return Ok(());
        }
        let (desc, material) = match shape.body_desc(self.inner.config.air_resistance) {
            Ok(built) => built,
            Err(err) => {
                write(&self.inner.registry).release(shape.id());
                return Err(err);
            }
        };
        let body = self.inner.physics().create_body(&desc, material);
        shape.attach(Arc::downgrade(&self.inner), body);

        let spawned = write(&self.inner.registry).spawn(shape.clone(), Some(body.body_handle));
        if !spawned {
            if let Some(body) = shape.detach() {
                self.inner.physics().remove_body(&body);
            }
            return Ok(());
        }
        debug!("registered {}", shape.label());
        Ok(())
    }

    /// Remove the shape and destroy its body. No-op when it is not registered here.
    ///
    /// Contacts the shape was part of end immediately: both sides forget each
    /// other and finish callbacks run with the next collision dispatch.
    pub fn unregister(&self, shape: &Shape) {
        let (removed, partners) = {
            let mut registry = write(&self.inner.registry);
            let Some(removed) = registry.despawn(shape.id()) else {
                return;
            };
            let partners: Vec<Shape> = removed
                .collision_objects()
                .into_iter()
                .filter_map(|id| registry.get(id).cloned())
                .collect();
            (removed, partners)
        };

        for partner in partners {
            partner.finish_collide_with(&removed);
            removed.finish_collide_with(&partner);
            self.inner.collisions.push_end(CollisionPair { a: removed.clone(), b: partner });
        }
        if let Some(body) = removed.detach() {
            self.inner.physics().remove_body(&body);
        }
        debug!("unregistered {}", removed.label());
    }

    fn clear_shapes(&self) {
        let shapes = write(&self.inner.registry).clear();
        for shape in &shapes {
            if let Some(body) = shape.detach() {
                self.inner.physics().remove_body(&body);
            }
        }
        self.inner.collisions.clear();
        debug!("cleared {} shape(s)", shapes.len());
    }

    // -- frame pipeline --

    /// Advance one frame by the wall-clock time since the previous update.
    pub fn update(&self) {
        if !self.is_running() {
            return;
        }
        let now = Instant::now();
        let (delta, frame) = {
            let mut clock = lock(&self.inner.clock);
            (clock.tick(now), clock.frame())
        };
        self.run_frame(now, delta, frame);
    }

    /// Advance one frame by an explicit `delta` in seconds.
    pub fn update_by(&self, delta: f64) {
        if !self.is_running() {
            return;
        }
        let now = Instant::now();
        let frame = {
            let mut clock = lock(&self.inner.clock);
            clock.mark(now);
            clock.frame()
        };
        self.run_frame(now, delta, frame);
    }

    fn is_running(&self) -> bool {
        !self.is_paused() && !self.is_destroyed()
    }

    fn run_frame(&self, now: Instant, delta: f64, frame: u64) {
        if delta > 0.0 {
            let listener = ContactListener::new(&self.inner.registry, &self.inner.collisions);
            let mut physics = self.inner.physics();
            physics.set_dt(delta as f32);
            physics.step(&listener, &listener);
        }

        lock(&self.inner.audio).update();

        self.process_collisions();

        let pending = lock(&self.inner.level_state).pending.take();
        if let Some(index) = pending {
            self.select_level(index);
            return;
        }

        for shape in self.all_elements() {
            match shape.update() {
                Ok(()) => {}
                // Removed by a handler since the snapshot.
                Err(Error::Detached { shape }) => debug!("skipping sync of detached {shape}"),
                Err(err) => warn!("sync failed: {err}"),
            }
        }

        let tick = lock(&self.inner.level_state).tick.clone();
        if let Some(tick) = tick {
            tick(self, &LoopData { time: now, frame, delta });
        }

        self.update_input();
    }

    /// Dispatch queued contacts in detection order, then finish callbacks
    /// for contacts that ended during the step.
    fn process_collisions(&self) {
        for pair in self.inner.collisions.drain_begun() {
            let (a, b) = (pair.a, pair.b);
            if a.is_retired() || b.is_retired() {
                debug!("dropping contact of removed {} / {}", a.label(), b.label());
                continue;
            }
            self.inner.events.emit(
                &EventType::Collision,
                &EventData::Collision { a: a.clone(), b: b.clone() },
            );
            a.collide_with(&b);
            b.collide_with(&a);
            if let Some(callback) = a.collision_callback() {
                callback(&b);
            }
            if let Some(callback) = b.collision_callback() {
                callback(&a);
            }
        }

        for pair in self.inner.collisions.drain_ended() {
            if let Some(callback) = pair.a.finish_collision_callback() {
                callback(&pair.b);
            }
            if let Some(callback) = pair.b.finish_collision_callback() {
                callback(&pair.a);
            }
        }
    }

    fn update_input(&self) {
        let (current, previous) = {
            let mut input = lock(&self.inner.input);
            let snapshot = input.source.poll();
            let previous = std::mem::replace(&mut input.current, snapshot.clone());
            (snapshot, previous)
        };
        let pointer = current.pointer;
        let at = EventData::Pointer(pointer);

        for shape in self.all_elements() {
            let inside = shape.contains_point(pointer);
            let was = shape.set_hovered(inside);
            if inside && !was {
                shape.emit(&EventType::Hover, &at);
            } else if !inside && was {
                shape.emit(&EventType::Unhover, &at);
            }
        }

        if pointer != previous.pointer {
            for shape in self.hovered_objects() {
                shape.emit(&EventType::MouseMove, &at);
            }
            self.inner.events.emit(&EventType::MouseMove, &at);
            let moved = lock(&self.inner.mouse).moved.clone();
            if let Some(callback) = moved {
                callback(self, pointer);
            }
        }

        if current.left && !previous.left {
            for shape in self.hovered_objects() {
                if !shape.set_clicked(true) {
                    shape.emit(&EventType::MouseDown, &at);
                }
            }
            self.inner.events.emit(&EventType::MouseDown, &at);
            let down = lock(&self.inner.mouse).down.clone();
            if let Some(callback) = down {
                callback(self, pointer);
            }
        }

        if !current.left && previous.left {
            for shape in self.hovered_objects() {
                shape.emit(&EventType::MouseUp, &at);
                shape.emit(&EventType::Click, &at);
                shape.set_clicked(false);
            }
            self.inner.events.emit(&EventType::MouseUp, &at);
            let up = lock(&self.inner.mouse).up.clone();
            if let Some(callback) = up {
                callback(self, pointer);
            }
        }
    }

    // -- levels --

    /// Queue a switch, applied at the start of the next update.
    /// A later request replaces an earlier one.
    pub fn switch_to_level(&self, index: usize) {
        if index >= self.inner.levels.len() {
            debug!("ignoring switch to missing level {index}");
            return;
        }
        lock(&self.inner.level_state).pending = Some(index);
    }

    pub fn next_level(&self) {
        let next = self.current_level().map_or(0, |current| current + 1);
        self.switch_to_level(next);
    }

    /// Tear down the active level and build level `index` immediately.
    pub fn select_level(&self, index: usize) {
        let Some(level) = self.inner.levels.get(index) else {
            debug!("ignoring selection of missing level {index}");
            return;
        };

        let previous = lock(&self.inner.level_state).active;
        if let Some(destroy) = previous
            .and_then(|i| self.inner.levels.get(i))
            .and_then(|l| l.destroy.clone())
        {
            destroy(self);
        }

        self.clear_shapes();

        {
            let mut state = lock(&self.inner.level_state);
            state.active = Some(index);
            state.tick = level.tick.clone();
            state.render = level.render.clone();
        }

        if let Some(init) = &level.init {
            init(self);
        }
        level.spawn_tiles(self);
        if let Some(mount) = &level.mount {
            mount(self);
        }
        info!("level {index} selected with {} shape(s)", self.len());
    }

    pub fn current_level(&self) -> Option<usize> {
        lock(&self.inner.level_state).active
    }

    pub fn level_count(&self) -> usize {
        self.inner.levels.len()
    }

    // -- drawing --

    /// Fill the background and draw every shape plus this frame's pen
    /// commands, borders first and then by ascending z index.
    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.fill(self.inner.config.background);
        let mut shapes = self.all_elements();
        shapes.append(&mut lock(&self.inner.draw_commands));
        sort_for_draw(&mut shapes);
        for shape in &shapes {
            shape.draw(surface);
        }
    }

    /// Run the active level's render hook.
    pub fn render(&self, surface: &mut dyn Surface) {
        let render = lock(&self.inner.level_state).render.clone();
        if let Some(render) = render {
            render(self, surface);
        }
    }

    /// Queue a one-frame shape, drawn and discarded by the next `draw`.
    /// Zero sizes default to 10 and a missing colour to white.
    pub fn pen(&self, kind: ShapeKind, props: ShapeProps) {
        let mut props = props.with_kind(kind);
        if props.width == 0.0 {
            props.width = PEN_SIZE;
        }
        if props.height == 0.0 {
            props.height = PEN_SIZE;
        }
        if kind == ShapeKind::Circle && props.radius == 0.0 {
            props.radius = PEN_SIZE;
        }
        if props.width < 0.0 || props.height < 0.0 || props.radius < 0.0 {
            warn!("dropping pen command with negative extent: {props:?}");
            return;
        }
        props.background.get_or_insert(Color::WHITE);
        props.name.get_or_insert_with(|| "pen".to_string());
        lock(&self.inner.draw_commands).push(Shape::new(props));
    }

    /// Segment from (x1, y1) to (x2, y2). Thickness below 1 is drawn as 1.
    pub fn line(&self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color, thickness: f64) {
        let thickness = if thickness <= 0.0 { 1.0 } else { thickness };
        let (from, to) = (Vector2::new(x1, y1), Vector2::new(x2, y2));
        let length = from.distance(to);
        let mid = (from + to) * 0.5;
        self.pen(
            ShapeKind::Rectangle,
            ShapeProps::rect(mid.x - length / 2.0, mid.y - thickness / 2.0, length, thickness)
                .with_background(color)
                .with_rotation((to - from).angle())
                .with_z_index(PEN_Z),
        );
    }

    /// Circle centred on (x, y).
    pub fn circle(&self, x: f64, y: f64, radius: f64, color: Color) {
        self.pen(
            ShapeKind::Circle,
            ShapeProps::circle(x - radius, y - radius, radius)
                .with_background(color)
                .with_z_index(PEN_Z),
        );
    }

    pub fn rect(&self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.pen(
            ShapeKind::Rectangle,
            ShapeProps::rect(x, y, width, height).with_background(color).with_z_index(PEN_Z),
        );
    }

    // -- tag filters --

    /// With no targets, shapes carrying `tag` stop colliding with each
    /// other. Otherwise they only collide with shapes of the listed tags.
    /// Applies to the shapes carrying `tag` right now.
    pub fn set_tag_collision_filter(&self, tag: &str, collides_with: &[&str]) {
        let shapes = self.elements_by_tag(tag);
        for shape in &shapes {
            shape.set_collision_filter(shape.collision_filter().with_tag_rule(tag, collides_with));
        }
        debug!("tag filter on \"{tag}\" ({} shape(s)) -> {collides_with:?}", shapes.len());
    }

    pub fn disable_collision_between_tags(&self, tag_a: &str, tag_b: &str) -> Result<()> {
        for a in self.elements_by_tag(tag_a) {
            for b in self.elements_by_tag(tag_b) {
                if a != b {
                    a.not_collide_with(&b)?;
                }
            }
        }
        Ok(())
    }

    pub fn enable_collision_between_tags(&self, tag_a: &str, tag_b: &str) -> Result<()> {
        for a in self.elements_by_tag(tag_a) {
            for b in self.elements_by_tag(tag_b) {
                if a != b {
                    a.restore_collision_with(&b)?;
                }
            }
        }
        Ok(())
    }

    // -- queries --

    /// Every live shape in registration order.
    pub fn all_elements(&self) -> Vec<Shape> {
        read(&self.inner.registry).snapshot()
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<Shape> {
        read(&self.inner.registry).find_all_by_tag(tag)
    }

    pub fn element_by_name(&self, name: &str) -> Option<Shape> {
        read(&self.inner.registry).find_by_name(name).cloned()
    }

    pub fn elements_by_name(&self, name: &str) -> Vec<Shape> {
        read(&self.inner.registry).find_all_by_name(name)
    }

    pub fn elements_by_kind(&self, kind: ShapeKind) -> Vec<Shape> {
        read(&self.inner.registry).find_all_by_kind(kind)
    }

    /// Shapes under the cursor as of the last input sample.
    pub fn hovered_objects(&self) -> Vec<Shape> {
        let pointer = self.cursor_position();
        self.all_elements()
            .into_iter()
            .filter(|s| s.contains_point(pointer))
            .collect()
    }

    pub fn unhovered_objects(&self) -> Vec<Shape> {
        let pointer = self.cursor_position();
        self.all_elements()
            .into_iter()
            .filter(|s| !s.contains_point(pointer))
            .collect()
    }

    pub fn len(&self) -> usize {
        read(&self.inner.registry).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.inner.registry).is_empty()
    }

    /// Bodies alive in the physics simulation.
    pub fn body_count(&self) -> usize {
        self.inner.physics().body_count()
    }

    // -- helpers --

    pub fn center(&self, shape: &Shape, reset_velocity: bool) -> Result<()> {
        shape.set_position(
            self.width() / 2.0 - shape.width() / 2.0,
            self.height() / 2.0 - shape.height() / 2.0,
        )?;
        if reset_velocity {
            shape.set_velocity(0.0, 0.0)?;
        }
        Ok(())
    }

    pub fn center_x(&self, shape: &Shape, reset_velocity: bool) -> Result<()> {
        shape.set_x(self.width() / 2.0 - shape.width() / 2.0)?;
        if reset_velocity {
            shape.set_velocity(0.0, 0.0)?;
        }
        Ok(())
    }

    pub fn center_y(&self, shape: &Shape, reset_velocity: bool) -> Result<()> {
        shape.set_y(self.height() / 2.0 - shape.height() / 2.0)?;
        if reset_velocity {
            shape.set_velocity(0.0, 0.0)?;
        }
        Ok(())
    }

    /// Degrees from `a`'s top-left corner to `b`'s.
    pub fn angle_between(&self, a: &Shape, b: &Shape) -> f64 {
        (b.position() - a.position()).angle().to_degrees()
    }

    /// Register four fixed walls along the world's edges, tagged `border`.
    pub fn create_borders(&self) -> Result<Vec<Shape>> {
        let border = self.inner.config.border;
        let width = border.map(|b| b.width).filter(|w| *w > 0.0).unwrap_or(DEFAULT_BORDER_WIDTH);
        let color = border.map_or(Color::BLACK, |b| b.color);
        let (w, h) = (self.width(), self.height());

        let walls = [
            ("borderTop", 0.0, 0.0, w, width),
            ("borderBottom", 0.0, h - width, w, width),
            ("borderLeft", 0.0, 0.0, width, h),
            ("borderRight", w - width, 0.0, width, h),
        ];
        let mut shapes = Vec::with_capacity(walls.len());
        for (name, x, y, bw, bh) in walls {
            let shape = Shape::new(
                ShapeProps::rect(x, y, bw, bh)
                    .with_name(name)
                    .with_tag(BORDER_TAG)
                    .with_background(color)
                    .with_body(true),
            );
            self.register(&shape)?;
            shapes.push(shape);
        }
        Ok(shapes)
    }

    // -- lifecycle --

    /// Remove every body and shape and release the audio backend.
    /// Later updates do nothing.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.clear_shapes();
        lock(&self.inner.draw_commands).clear();
        lock(&self.inner.audio).cleanup();
        info!("world \"{}\" destroyed", self.inner.config.title);
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::SeqCst)
    }

    /// Gravity in m/s².
    pub fn gravity(&self) -> Vector2 {
        let g = self.inner.physics().gravity();
        Vector2::from(g) * (1.0 / PIXELS_PER_METER)
    }

    pub fn set_gravity(&self, gravity: Vector2) {
        self.inner.physics().set_gravity(gravity_to_solver(gravity));
    }

    // -- input --

    pub fn cursor_position(&self) -> Vector2 {
        lock(&self.inner.input).current.pointer
    }

    /// Pointer and key state as of the last update.
    pub fn mouse(&self) -> InputSnapshot {
        lock(&self.inner.input).current.clone()
    }

    pub fn is_key_pressed(&self, key_code: u32) -> bool {
        lock(&self.inner.input).current.is_key_pressed(key_code)
    }

    pub fn set_on_mouse_down(&self, callback: impl Fn(&World, Vector2) + Send + Sync + 'static) {
        lock(&self.inner.mouse).down = Some(Arc::new(callback));
    }

    pub fn set_on_mouse_up(&self, callback: impl Fn(&World, Vector2) + Send + Sync + 'static) {
        lock(&self.inner.mouse).up = Some(Arc::new(callback));
    }

    pub fn set_on_mouse_move(&self, callback: impl Fn(&World, Vector2) + Send + Sync + 'static) {
        lock(&self.inner.mouse).moved = Some(Arc::new(callback));
    }

    // -- events --

    pub fn events(&self) -> &EventEmitter {
        &self.inner.events
    }

    pub fn on(&self, kind: EventType, handler: impl Fn(&EventData) + Send + Sync + 'static) -> ListenerId {
        self.inner.events.on(kind, handler)
    }

    pub fn once(&self, kind: EventType, handler: impl Fn(&EventData) + Send + Sync + 'static) -> ListenerId {
        self.inner.events.once(kind, handler)
    }

    pub fn remove_listener(&self, kind: &EventType, id: ListenerId) -> bool {
        self.inner.events.remove_listener(kind, id)
    }

    pub fn emit(&self, kind: &EventType, payload: &EventData) {
        self.inner.events.emit(kind, payload);
    }

    // -- audio --

    pub fn play_sound(&self, name: &str) -> Result<(), AudioError> {
        lock(&self.inner.audio).play_sound(name)
    }

    pub fn play_sound_with_volume(&self, name: &str, volume: f64) -> Result<(), AudioError> {
        lock(&self.inner.audio).play_sound_with_volume(name, volume)
    }

    pub fn play_music(&self, name: &str) -> Result<(), AudioError> {
        lock(&self.inner.audio).play_music(name)
    }

    pub fn stop_music(&self) {
        lock(&self.inner.audio).stop_music();
    }

    pub fn pause_music(&self) {
        lock(&self.inner.audio).pause_music();
    }

    pub fn resume_music(&self) {
        lock(&self.inner.audio).resume_music();
    }
}

/// Stable sort: `border` shapes first, then ascending z index.
pub(crate) fn sort_for_draw(shapes: &mut [Shape]) {
    shapes.sort_by_key(|s| (s.tag() != BORDER_TAG, s.z_index()));
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("title", &self.inner.config.title)
            .field("shapes", &self.len())
            .field("levels", &self.inner.levels.len())
            .field("current_level", &self.current_level())
            .field("paused", &self.is_paused())
            .finish()
    }
}
