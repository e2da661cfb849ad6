use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use glam::{DAffine2, DVec2, Vec2};

use crate::api::types::{
    meters_to_pixels, pixels_to_meters, Axis, AxisX, AxisY, Border, Direction, Flip, Pattern,
    ShapeId, ShapeKind, BORDER_TAG, DEFAULT_TAG, DEG, DIRECTION_EPSILON,
};
use crate::api::world::{World, WorldInner};
use crate::components::vector::Vector2;
use crate::core::filter::CollisionFilter;
use crate::core::physics::{BodyDesc, BodyState, ColliderDesc, ColliderMaterial, PhysicsBody};
use crate::core::rng::random_name;
use crate::core::sync::{read, write};
use crate::error::{Error, Result};
use crate::events::emitter::{EventEmitter, ListenerId};
use crate::events::{EventData, EventType};
use crate::renderer::raster::{exceeds_raster, Fill, RasterCache, RasterKey};
use crate::renderer::surface::{Color, DrawOptions, Image, Rect, Surface};

/// Called with the other shape of a collision pair.
pub type CollisionCallback = Arc<dyn Fn(&Shape) + Send + Sync>;

/// Construction parameters for a [`Shape`].
#[derive(Debug, Clone)]
pub struct ShapeProps {
    pub kind: ShapeKind,
    /// Top-left corner in pixels.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Circle radius. Zero derives it from width, then height, then 20.
    pub radius: f64,
    /// Radians.
    pub rotation: f64,
    pub z_index: i32,
    /// Random when unset.
    pub name: Option<String>,
    pub tag: Option<String>,
    pub pattern: Pattern,
    /// Black when unset.
    pub background: Option<Color>,
    pub image: Option<Arc<Image>>,
    pub border: Option<Border>,
    pub flip: Flip,
    pub opacity: f64,
    pub scale: f64,
    /// Dynamic body. Otherwise the body is fixed.
    pub is_body: bool,
    /// Affected by gravity.
    pub physics: bool,
    /// Sensor collider: reports contacts, never pushes.
    pub ghost: bool,
    pub rotation_lock: bool,
    /// Kilograms; zero lets the collider density decide.
    pub mass: f64,
    pub friction: f64,
    pub rebound: f64,
    pub speed: f64,
    /// Initial velocity in px/s.
    pub velocity: Vector2,
}

impl Default for ShapeProps {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Rectangle,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            radius: 0.0,
            rotation: 0.0,
            z_index: 0,
            name: None,
            tag: None,
            pattern: Pattern::Color,
            background: None,
            image: None,
            border: None,
            flip: Flip::default(),
            opacity: 1.0,
            scale: 1.0,
            is_body: false,
            physics: false,
            ghost: false,
            rotation_lock: false,
            mass: 0.0,
            friction: 0.0,
            rebound: 0.0,
            speed: 3.0,
            velocity: Vector2::ZERO,
        }
    }
}

impl ShapeProps {
    pub fn new(kind: ShapeKind) -> Self {
        Self { kind, ..Self::default() }
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, ..Self::default() }
    }

    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Self { kind: ShapeKind::Circle, x, y, radius, ..Self::default() }
    }

    pub fn with_kind(mut self, kind: ShapeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_image(mut self, image: Arc<Image>) -> Self {
        self.image = Some(image);
        self.pattern = Pattern::Image;
        self
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_rotation(mut self, radians: f64) -> Self {
        self.rotation = radians;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Dynamic body, optionally affected by gravity.
    pub fn with_body(mut self, physics: bool) -> Self {
        self.is_body = true;
        self.physics = physics;
        self
    }

    pub fn with_ghost(mut self, ghost: bool) -> Self {
        self.ghost = ghost;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_rebound(mut self, rebound: f64) -> Self {
        self.rebound = rebound;
        self
    }

    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_rotation_lock(mut self, locked: bool) -> Self {
        self.rotation_lock = locked;
        self
    }
}

struct ShapeState {
    name: String,
    tag: String,
    kind: ShapeKind,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    radius: f64,
    rotation: f64,
    angular_velocity: f64,
    rotation_lock: bool,
    scale: f64,
    opacity: f64,
    z_index: i32,
    pattern: Pattern,
    background: Color,
    image: Option<Arc<Image>>,
    border: Option<Border>,
    flip: Flip,
    is_body: bool,
    physics: bool,
    ghost: bool,
    mass: f64,
    friction: f64,
    rebound: f64,
    speed: f64,
    velocity: Vector2,
    body: Option<PhysicsBody>,
    world: Weak<WorldInner>,
    /// Set once unregistered, until registered again.
    retired: bool,
    collision_objects: Vec<ShapeId>,
    no_collide_with: HashSet<ShapeId>,
    last_collision_impulse: f64,
    filter: CollisionFilter,
    directions: Axis,
    hovered: bool,
    clicked: bool,
    on_collision: Option<CollisionCallback>,
    on_finish_collision: Option<CollisionCallback>,
    raster: RasterCache,
}

impl ShapeState {
    fn center(&self) -> Vector2 {
        Vector2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Image to draw and whether it must be stretched to the shape's size.
    fn raster(&mut self) -> (Arc<Image>, bool) {
        if self.pattern == Pattern::Image && self.kind != ShapeKind::Line {
            if let Some(image) = &self.image {
                return (Arc::clone(image), true);
            }
        }
        let fill = match self.pattern {
            Pattern::Gradient { end } => Fill::Gradient { top: self.background, bottom: end },
            _ => Fill::Solid(self.background),
        };
        let (key, oversized) = match self.kind {
            ShapeKind::Rectangle | ShapeKind::Line => (
                RasterKey::rect(fill, self.width, self.height),
                exceeds_raster(self.width) || exceeds_raster(self.height),
            ),
            ShapeKind::Square => {
                let side = self.width.max(self.height);
                (RasterKey::rect(fill, side, side), exceeds_raster(side))
            }
            ShapeKind::Circle | ShapeKind::Dot => {
                let diameter = self.radius * 2.0;
                (RasterKey::disc(self.background, diameter), exceeds_raster(diameter))
            }
        };
        (self.raster.get_or_build(key), oversized)
    }

    fn draw_options(&self, image: &Image, stretch: bool) -> DrawOptions {
        let src = DVec2::new(image.width() as f64, image.height() as f64);
        let mut scale = DVec2::new(
            if self.flip.x { -1.0 } else { 1.0 },
            if self.flip.y { -1.0 } else { 1.0 },
        );
        if stretch {
            scale *= DVec2::new(self.width, self.height) / src.max(DVec2::ONE);
        }
        scale *= self.scale;
        let transform = DAffine2::from_translation(self.center().into())
            * DAffine2::from_angle(self.rotation)
            * DAffine2::from_scale(scale)
            * DAffine2::from_translation(-src / 2.0);
        DrawOptions {
            transform,
            alpha: self.opacity.clamp(0.0, 1.0) as f32,
        }
    }
}

fn center_in_meters(x: f64, y: f64, width: f64, height: f64) -> Vec2 {
    Vec2::new(
        pixels_to_meters(x + width / 2.0) as f32,
        pixels_to_meters(y + height / 2.0) as f32,
    )
}

fn to_meters(v: Vector2) -> Vec2 {
    Vec2::new(pixels_to_meters(v.x) as f32, pixels_to_meters(v.y) as f32)
}

struct ShapeInner {
    id: ShapeId,
    events: EventEmitter,
    state: RwLock<ShapeState>,
}

/// A drawable entity, optionally backed by a rigid body.
///
/// `Shape` is a handle: clones share the same entity. Operations that touch
/// physics require the shape to be registered with a [`World`] and fail with
/// [`Error::Detached`] otherwise, before changing anything.
#[derive(Clone)]
pub struct Shape {
    inner: Arc<ShapeInner>,
}

impl Shape {
    pub fn new(props: ShapeProps) -> Self {
        let (mut width, mut height, mut radius) = (props.width, props.height, props.radius);
        if props.kind == ShapeKind::Circle {
            if radius <= 0.0 {
                radius = if width != 0.0 {
                    width / 2.0
                } else if height != 0.0 {
                    height / 2.0
                } else {
                    20.0
                };
            }
            width = radius * 2.0;
            height = width;
        }

        let state = ShapeState {
            name: props.name.unwrap_or_else(random_name),
            tag: props.tag.unwrap_or_else(|| DEFAULT_TAG.to_string()),
            kind: props.kind,
            x: props.x,
            y: props.y,
            width,
            height,
            radius,
            rotation: props.rotation,
            angular_velocity: 0.0,
            rotation_lock: props.rotation_lock,
            scale: props.scale,
            opacity: props.opacity,
            z_index: props.z_index,
            pattern: props.pattern,
            background: props.background.unwrap_or(Color::BLACK),
            image: props.image,
            border: props.border,
            flip: props.flip,
            is_body: props.is_body,
            physics: props.physics,
            ghost: props.ghost,
            mass: props.mass,
            friction: props.friction,
            rebound: props.rebound,
            speed: props.speed,
            velocity: props.velocity,
            body: None,
            world: Weak::new(),
            retired: false,
            collision_objects: Vec::new(),
            no_collide_with: HashSet::new(),
            last_collision_impulse: 0.0,
            filter: CollisionFilter::default(),
            directions: Axis::default(),
            hovered: false,
            clicked: false,
            on_collision: None,
            on_finish_collision: None,
            raster: RasterCache::default(),
        };

        Self {
            inner: Arc::new(ShapeInner {
                id: ShapeId::next(),
                events: EventEmitter::new(),
                state: RwLock::new(state),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ShapeState> {
        read(&self.inner.state)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ShapeState> {
        write(&self.inner.state)
    }

    fn detached(&self) -> Error {
        Error::Detached { shape: self.label() }
    }

    /// Body handle and owning world, or `Error::Detached`.
    fn live(&self) -> Result<(PhysicsBody, Arc<WorldInner>)> {
        let (body, world) = {
            let s = self.read();
            (s.body, s.world.upgrade())
        };
        match (body, world) {
            (Some(body), Some(world)) => Ok((body, world)),
            _ => Err(self.detached()),
        }
    }

    /// `name #id`, for logs and errors.
    pub fn label(&self) -> String {
        format!("{} {}", self.read().name, self.inner.id)
    }

    // -- identity & plain state --

    pub fn id(&self) -> ShapeId {
        self.inner.id
    }

    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    pub fn tag(&self) -> String {
        self.read().tag.clone()
    }

    pub fn kind(&self) -> ShapeKind {
        self.read().kind
    }

    pub fn x(&self) -> f64 {
        self.read().x
    }

    pub fn y(&self) -> f64 {
        self.read().y
    }

    /// Top-left corner.
    pub fn position(&self) -> Vector2 {
        let s = self.read();
        Vector2::new(s.x, s.y)
    }

    pub fn center(&self) -> Vector2 {
        self.read().center()
    }

    pub fn width(&self) -> f64 {
        self.read().width
    }

    pub fn height(&self) -> f64 {
        self.read().height
    }

    pub fn radius(&self) -> f64 {
        self.read().radius
    }

    pub fn bounds(&self) -> Rect {
        self.read().bounds()
    }

    /// Radians.
    pub fn rotation(&self) -> f64 {
        self.read().rotation
    }

    pub fn angular_velocity(&self) -> f64 {
        self.read().angular_velocity
    }

    pub fn is_rotation_locked(&self) -> bool {
        self.read().rotation_lock
    }

    pub fn scale(&self) -> f64 {
        self.read().scale
    }

    pub fn opacity(&self) -> f64 {
        self.read().opacity
    }

    pub fn z_index(&self) -> i32 {
        self.read().z_index
    }

    pub fn pattern(&self) -> Pattern {
        self.read().pattern
    }

    pub fn background(&self) -> Color {
        self.read().background
    }

    pub fn image(&self) -> Option<Arc<Image>> {
        self.read().image.clone()
    }

    pub fn border(&self) -> Option<Border> {
        self.read().border
    }

    pub fn flip(&self) -> Flip {
        self.read().flip
    }

    pub fn is_body(&self) -> bool {
        self.read().is_body
    }

    pub fn has_physics(&self) -> bool {
        self.read().physics
    }

    pub fn is_ghost(&self) -> bool {
        self.read().ghost
    }

    /// Kilograms, as last read from the body (1 for massless bodies).
    pub fn mass(&self) -> f64 {
        self.read().mass
    }

    pub fn friction(&self) -> f64 {
        self.read().friction
    }

    pub fn rebound(&self) -> f64 {
        self.read().rebound
    }

    pub fn speed(&self) -> f64 {
        self.read().speed
    }

    /// Pixels per second, truncated toward zero when read back from the body.
    pub fn velocity(&self) -> Vector2 {
        self.read().velocity
    }

    pub fn directions(&self) -> Axis {
        self.read().directions
    }

    pub fn body(&self) -> Option<PhysicsBody> {
        self.read().body
    }

    /// Registered with a world that is still alive.
    pub fn is_live(&self) -> bool {
        let s = self.read();
        s.body.is_some() && s.world.strong_count() > 0
    }

    /// Unregistered from a world and not registered again since.
    pub fn is_retired(&self) -> bool {
        self.read().retired
    }

    /// The owning world, while registered.
    pub fn world(&self) -> Option<World> {
        self.read().world.upgrade().map(World::from_inner)
    }

    pub fn is_hovered(&self) -> bool {
        self.read().hovered
    }

    pub fn is_clicked(&self) -> bool {
        self.read().clicked
    }

    /// Point-in-bounds test used for hover.
    pub fn contains_point(&self, point: Vector2) -> bool {
        self.read().bounds().contains(point)
    }

    pub fn last_collision_impulse(&self) -> f64 {
        self.read().last_collision_impulse
    }

    pub fn collision_filter(&self) -> CollisionFilter {
        self.read().filter
    }

    // -- plain setters --

    pub fn set_name(&self, name: impl Into<String>) {
        self.write().name = name.into();
    }

    /// Filters derived from the old tag stay in place until
    /// `World::set_tag_collision_filter` runs again.
    pub fn set_tag(&self, tag: impl Into<String>) {
        self.write().tag = tag.into();
    }

    pub fn set_background(&self, color: Color) {
        self.write().background = color;
    }

    pub fn set_pattern(&self, pattern: Pattern) {
        self.write().pattern = pattern;
    }

    pub fn set_image(&self, image: Option<Arc<Image>>) {
        self.write().image = image;
    }

    pub fn set_border(&self, border: Option<Border>) {
        self.write().border = border;
    }

    pub fn set_flip(&self, flip: Flip) {
        self.write().flip = flip;
    }

    pub fn set_opacity(&self, opacity: f64) {
        self.write().opacity = opacity;
    }

    pub fn set_z_index(&self, z: i32) {
        self.write().z_index = z;
    }

    pub fn set_speed(&self, speed: f64) {
        self.write().speed = speed;
    }

    pub fn set_on_collision(&self, callback: impl Fn(&Shape) + Send + Sync + 'static) {
        self.write().on_collision = Some(Arc::new(callback));
    }

    pub fn set_on_finish_collision(&self, callback: impl Fn(&Shape) + Send + Sync + 'static) {
        self.write().on_finish_collision = Some(Arc::new(callback));
    }

    pub(crate) fn collision_callback(&self) -> Option<CollisionCallback> {
        self.read().on_collision.clone()
    }

    pub(crate) fn finish_collision_callback(&self) -> Option<CollisionCallback> {
        self.read().on_finish_collision.clone()
    }

    pub(crate) fn set_collision_filter(&self, filter: CollisionFilter) {
        self.write().filter = filter;
    }

    pub(crate) fn set_last_collision_impulse(&self, impulse: f64) {
        self.write().last_collision_impulse = impulse;
    }

    /// Returns the previous value.
    pub(crate) fn set_hovered(&self, hovered: bool) -> bool {
        std::mem::replace(&mut self.write().hovered, hovered)
    }

    /// Returns the previous value.
    pub(crate) fn set_clicked(&self, clicked: bool) -> bool {
        std::mem::replace(&mut self.write().clicked, clicked)
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

    // -- registration (driven by World) --

    /// Body description for this shape's current geometry.
    pub(crate) fn body_desc(&self, linear_damping: f64) -> Result<(BodyDesc, ColliderMaterial)> {
        let s = self.read();
        let degenerate = || Error::DegenerateGeometry {
            shape: format!("{} {}", s.name, self.inner.id),
            width: s.width,
            height: s.height,
        };
        let collider = match s.kind {
            ShapeKind::Circle => {
                if s.radius <= 0.0 {
                    return Err(degenerate());
                }
                ColliderDesc::Ball { radius: pixels_to_meters(s.radius) as f32 }
            }
            _ => {
                if s.width <= 0.0 || s.height <= 0.0 {
                    return Err(degenerate());
                }
                ColliderDesc::Cuboid {
                    half_width: pixels_to_meters(s.width / 2.0) as f32,
                    half_height: pixels_to_meters(s.height / 2.0) as f32,
                }
            }
        };

        let fixed = !s.is_body || s.tag == BORDER_TAG;
        let mut desc = BodyDesc::new(collider, fixed)
            .at(center_in_meters(s.x, s.y, s.width, s.height))
            .rotated(s.rotation as f32)
            .moving(to_meters(s.velocity))
            .with_rotation_locked(fixed || s.rotation_lock)
            .as_sensor(s.ghost)
            .damped(linear_damping as f32);
        if !fixed && !s.physics {
            desc = desc.with_gravity_scale(0.0);
        }

        let material = ColliderMaterial {
            restitution: s.rebound as f32,
            friction: s.friction as f32,
            density: 1.0,
            mass: (s.mass > 0.0).then_some(s.mass as f32),
        };
        Ok((desc, material))
    }

    pub(crate) fn attach(&self, world: Weak<WorldInner>, body: PhysicsBody) {
        let mut s = self.write();
        s.world = world;
        s.body = Some(body);
        s.retired = false;
        s.filter = CollisionFilter::default();
    }

    /// Clear the body and world references, returning the body to destroy.
    pub(crate) fn detach(&self) -> Option<PhysicsBody> {
        let mut s = self.write();
        s.world = Weak::new();
        s.retired = true;
        s.collision_objects.clear();
        s.hovered = false;
        s.clicked = false;
        s.body.take()
    }

    /// Unregister from the owning world. No-op when detached.
    pub fn remove(&self) {
        if let Some(world) = self.world() {
            world.unregister(self);
        }
    }

    // -- physics-backed mutators --

    fn place(&self, body: &PhysicsBody, world: &WorldInner, x: f64, y: f64, rotation: f64) {
        let (width, height) = {
            let s = self.read();
            (s.width, s.height)
        };
        world
            .physics()
            .teleport(body, center_in_meters(x, y, width, height), rotation as f32);
        let mut s = self.write();
        s.x = x;
        s.y = y;
        s.rotation = rotation;
    }

    pub fn set_x(&self, x: f64) -> Result<()> {
        let y = self.y();
        self.set_position(x, y)
    }

    pub fn set_y(&self, y: f64) -> Result<()> {
        let x = self.x();
        self.set_position(x, y)
    }

    /// Move the top-left corner, teleporting the body.
    pub fn set_position(&self, x: f64, y: f64) -> Result<()> {
        let (body, world) = self.live()?;
        let rotation = self.rotation();
        self.place(&body, &world, x, y, rotation);
        Ok(())
    }

    /// Absolute rotation in degrees.
    pub fn set_rotation(&self, degrees: f64) -> Result<()> {
        let (body, world) = self.live()?;
        let (x, y) = (self.x(), self.y());
        self.place(&body, &world, x, y, degrees * DEG);
        Ok(())
    }

    /// Rotate by `degrees` relative to the current rotation.
    pub fn rotate(&self, degrees: f64) -> Result<()> {
        let (body, world) = self.live()?;
        let (x, y, rotation) = {
            let s = self.read();
            (s.x, s.y, s.rotation)
        };
        self.place(&body, &world, x, y, rotation + degrees * DEG);
        Ok(())
    }

    /// Draw scale. The collider keeps its registered size.
    pub fn set_scale(&self, scale: f64) -> Result<()> {
        self.live()?;
        self.write().scale = scale;
        Ok(())
    }

    /// Velocity in px/s.
    pub fn set_velocity(&self, x: f64, y: f64) -> Result<()> {
        let (body, world) = self.live()?;
        let velocity = Vector2::new(x, y);
        world.physics().set_velocity(&body, to_meters(velocity));
        self.write().velocity = velocity;
        Ok(())
    }

    pub fn set_x_velocity(&self, x: f64) -> Result<()> {
        let (body, world) = self.live()?;
        {
            let mut physics = world.physics();
            let current = physics.velocity(&body);
            physics.set_velocity(&body, Vec2::new(pixels_to_meters(x) as f32, current.y));
        }
        self.write().velocity.x = x;
        Ok(())
    }

    pub fn set_y_velocity(&self, y: f64) -> Result<()> {
        let (body, world) = self.live()?;
        {
            let mut physics = world.physics();
            let current = physics.velocity(&body);
            physics.set_velocity(&body, Vec2::new(current.x, pixels_to_meters(y) as f32));
        }
        self.write().velocity.y = y;
        Ok(())
    }

    pub fn lock_rotation(&self, locked: bool) -> Result<()> {
        let (body, world) = self.live()?;
        world.physics().lock_rotation(&body, locked);
        self.write().rotation_lock = locked;
        Ok(())
    }

    /// Launch upwards at `strength` px/s.
    pub fn jump(&self, strength: f64) -> Result<()> {
        self.set_y_velocity(-strength)
    }

    /// Move along one axis at the shape's speed, keeping the other component.
    pub fn move_dir(&self, direction: Direction) -> Result<()> {
        let speed = self.speed();
        match direction {
            Direction::Up => self.set_y_velocity(-speed),
            Direction::Down => self.set_y_velocity(speed),
            Direction::Left => self.set_x_velocity(-speed),
            Direction::Right => self.set_x_velocity(speed),
        }
    }

    /// Head towards `target` at the shape's speed.
    pub fn follow(&self, target: &Shape) -> Result<()> {
        self.live()?;
        let heading = Vector2::from_angle((target.center() - self.center()).angle()) * self.speed();
        self.set_velocity(heading.x, heading.y)
    }

    /// Apply an impulse of magnitude `speed` (default: the shape's speed) at
    /// `degrees`, and nudge the cached position by the same vector so the
    /// move shows up before the next sync.
    pub fn move_theta(&self, degrees: f64, speed: Option<f64>) -> Result<()> {
        let (body, world) = self.live()?;
        let speed = speed.unwrap_or_else(|| self.speed());
        let step = Vector2::from_angle(degrees * DEG) * speed;
        world.physics().apply_impulse(&body, step.as_vec2());
        let mut s = self.write();
        s.x += step.x;
        s.y += step.y;
        Ok(())
    }

    /// Refresh direction state, then pull position, rotation, velocity and
    /// mass from the body.
    pub fn update(&self) -> Result<()> {
        let (body, world) = self.live()?;
        self.update_direction()?;

        let Some(BodyState { center, rotation, velocity, spin, mass }) =
            world.physics().state(&body)
        else {
            return Ok(());
        };

        let mut s = self.write();
        s.x = meters_to_pixels(center.x as f64) - s.width / 2.0;
        s.y = meters_to_pixels(center.y as f64) - s.height / 2.0;
        s.rotation = rotation as f64;
        s.angular_velocity = spin as f64;
        s.velocity = Vector2::new(
            meters_to_pixels(velocity.x as f64).trunc(),
            meters_to_pixels(velocity.y as f64).trunc(),
        );
        s.mass = if mass > 0.0 { mass as f64 } else { 1.0 };
        Ok(())
    }

    fn update_direction(&self) -> Result<()> {
        let (velocity, previous) = {
            let s = self.read();
            (s.velocity, s.directions)
        };

        let mut next = previous;
        if velocity.x.abs() > DIRECTION_EPSILON {
            next.x = if velocity.x < 0.0 { AxisX::Left } else { AxisX::Right };
        } else if velocity.x != 0.0 {
            self.set_x_velocity(0.0)?;
        }
        if velocity.y.abs() > DIRECTION_EPSILON {
            next.y = if velocity.y < 0.0 { AxisY::Up } else { AxisY::Down };
        } else if velocity.y != 0.0 {
            self.set_y_velocity(0.0)?;
        }

        if next != previous {
            self.write().directions = next;
            if next.is_determined() {
                self.emit(&EventType::DirectionChange, &EventData::Direction(next));
            }
        }
        Ok(())
    }

    // -- collision bookkeeping --

    /// Record a touching shape. Duplicates are kept.
    pub fn collide_with(&self, other: &Shape) {
        self.write().collision_objects.push(other.id());
    }

    /// Forget the first record of `other`.
    pub fn finish_collide_with(&self, other: &Shape) {
        let mut s = self.write();
        if let Some(idx) = s.collision_objects.iter().position(|id| *id == other.id()) {
            s.collision_objects.remove(idx);
        }
    }

    pub fn is_colliding_with(&self, other: &Shape) -> bool {
        self.read().collision_objects.contains(&other.id())
    }

    pub fn collision_objects(&self) -> Vec<ShapeId> {
        self.read().collision_objects.clone()
    }

    pub fn should_collide_with(&self, other: &Shape) -> bool {
        !self.read().no_collide_with.contains(&other.id())
    }

    /// Exempt the pair from contact in both directions.
    pub fn not_collide_with(&self, other: &Shape) -> Result<()> {
        self.live()?;
        other.live()?;
        self.write().no_collide_with.insert(other.id());
        other.write().no_collide_with.insert(self.id());
        Ok(())
    }

    pub fn restore_collision_with(&self, other: &Shape) -> Result<()> {
        self.live()?;
        other.live()?;
        self.write().no_collide_with.remove(&other.id());
        other.write().no_collide_with.remove(&self.id());
        Ok(())
    }

    /// Exempt against every shape currently carrying `tag`.
    pub fn not_collide_with_tag(&self, tag: &str) -> Result<()> {
        let (_, world) = self.live()?;
        for other in World::from_inner(world).elements_by_tag(tag) {
            self.not_collide_with(&other)?;
        }
        Ok(())
    }

    pub fn restore_collision_with_tag(&self, tag: &str) -> Result<()> {
        let (_, world) = self.live()?;
        for other in World::from_inner(world).elements_by_tag(tag) {
            self.restore_collision_with(&other)?;
        }
        Ok(())
    }

    /// Outside the owning world's `[0, width] x [0, height]`. False when detached.
    pub fn is_out_of_map(&self) -> bool {
        let Some(world) = self.world() else {
            return false;
        };
        let (x, y) = (self.x(), self.y());
        x < 0.0 || y < 0.0 || x > world.width() || y > world.height()
    }

    // -- drawing --

    /// Draw the border (if any) and the body raster.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let (border, bounds, image, options) = {
            let mut s = self.write();
            if s.opacity <= 0.0 {
                return;
            }
            let border = s.border.filter(|b| b.width > 0.0);
            let bounds = s.bounds();
            let (image, stretch) = s.raster();
            let options = s.draw_options(&image, stretch);
            (border, bounds, image, options)
        };

        if let Some(border) = border {
            let w = border.width;
            surface.draw_rect(
                Rect::new(bounds.x - w, bounds.y - w, bounds.width + 2.0 * w, bounds.height + 2.0 * w),
                border.color,
            );
        }
        surface.draw_image(&image, &options);
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Shape {}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.read();
        f.debug_struct("Shape")
            .field("id", &self.inner.id)
            .field("name", &s.name)
            .field("tag", &s.tag)
            .field("kind", &s.kind)
            .field("x", &s.x)
            .field("y", &s.y)
            .field("live", &s.body.is_some())
            .finish()
    }
}
