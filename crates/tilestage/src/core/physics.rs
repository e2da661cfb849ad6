//! Thin rapier2d wrapper. Everything here works in metres and radians; the
//! pixel conversion lives with the shapes.

use std::num::NonZeroUsize;

use glam::Vec2;
use rapier2d::prelude::*;

fn to_solver(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn from_solver(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Collider geometry, centred on the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

/// Surface response and mass of a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
    /// Wins over `density` when positive.
    pub mass: Option<f32>,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self { restitution: 0.0, friction: 0.0, density: 1.0, mass: None }
    }
}

/// Everything needed to insert one body with a single collider.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub fixed: bool,
    pub center: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub rotation_locked: bool,
    /// Sensors report contacts but are never pushed apart.
    pub sensor: bool,
    pub damping: f32,
    pub collider: ColliderDesc,
}

impl BodyDesc {
    /// Fixed bodies ignore gravity and never rotate.
    pub fn new(collider: ColliderDesc, fixed: bool) -> Self {
        Self {
            fixed,
            center: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            gravity_scale: if fixed { 0.0 } else { 1.0 },
            rotation_locked: fixed,
            sensor: false,
            damping: 0.0,
            collider,
        }
    }

    pub fn at(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    pub fn rotated(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn moving(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_rotation_locked(mut self, locked: bool) -> Self {
        self.rotation_locked = locked;
        self
    }

    pub fn as_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn damped(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    fn rigid_body(&self) -> RigidBody {
        let builder = if self.fixed {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let locked = if self.rotation_locked {
            LockedAxes::ROTATION_LOCKED
        } else {
            LockedAxes::empty()
        };
        builder
            .translation(to_solver(self.center))
            .rotation(self.rotation)
            .linvel(to_solver(self.velocity))
            .gravity_scale(self.gravity_scale)
            .locked_axes(locked)
            .linear_damping(self.damping)
            .build()
    }

    fn collider(&self, material: ColliderMaterial) -> Collider {
        let builder = match self.collider {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
        }
        .restitution(material.restitution)
        .friction(material.friction)
        .sensor(self.sensor)
        // Every pair goes through the filter hooks and reports begin/end and
        // force events; the contact listener sorts out what matters.
        .active_events(ActiveEvents::COLLISION_EVENTS | ActiveEvents::CONTACT_FORCE_EVENTS)
        .contact_force_event_threshold(0.0)
        .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::FILTER_INTERSECTION_PAIR);
        match material.mass {
            Some(mass) if mass > 0.0 => builder.mass(mass),
            _ => builder.density(material.density),
        }
        .build()
    }
}

/// Handles of one inserted body and its collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// What a shape pulls back from its body after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub center: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub spin: f32,
    /// Zero for fixed bodies.
    pub mass: f32,
}

/// The rapier sets and pipeline behind one world.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    queries: QueryPipeline,
}

impl PhysicsWorld {
    /// Y grows downwards, so positive `gravity.y` pulls bodies down the screen.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: to_solver(gravity),
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            queries: QueryPipeline::new(),
        }
    }

    pub fn set_dt(&mut self, dt: f32) {
        self.params.dt = dt;
    }

    /// Velocity iterations become solver iterations and position iterations
    /// become internal PGS iterations. Zero is raised to one.
    pub fn set_solver_iterations(&mut self, velocity: usize, position: usize) {
        self.params.num_solver_iterations =
            NonZeroUsize::new(velocity).unwrap_or(NonZeroUsize::MIN);
        self.params.num_internal_pgs_iterations = position.max(1);
    }

    pub fn gravity(&self) -> Vec2 {
        from_solver(&self.gravity)
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = to_solver(gravity);
    }

    pub fn create_body(&mut self, desc: &BodyDesc, material: ColliderMaterial) -> PhysicsBody {
        let body_handle = self.bodies.insert(desc.rigid_body());
        let collider_handle = self.colliders.insert_with_parent(
            desc.collider(material),
            body_handle,
            &mut self.bodies,
        );
        PhysicsBody { body_handle, collider_handle }
    }

    /// Drops the body together with its collider. Unknown handles are ignored.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn step(&mut self, hooks: &dyn PhysicsHooks, events: &dyn EventHandler) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.queries),
            hooks,
            events,
        );
    }

    pub fn apply_impulse(&mut self, body: &PhysicsBody, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.apply_impulse(to_solver(impulse), true);
        }
    }

    pub fn set_velocity(&mut self, body: &PhysicsBody, velocity: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(to_solver(velocity), true);
        }
    }

    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map_or(Vec2::ZERO, |rb| from_solver(rb.linvel()))
    }

    /// Move the body's centre without integrating through the space between.
    pub fn teleport(&mut self, body: &PhysicsBody, center: Vec2, rotation: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_position(Isometry::<Real>::new(to_solver(center), rotation), true);
        }
    }

    pub fn lock_rotation(&mut self, body: &PhysicsBody, locked: bool) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.lock_rotations(locked, true);
        }
    }

    pub fn state(&self, body: &PhysicsBody) -> Option<BodyState> {
        let rb = self.bodies.get(body.body_handle)?;
        let iso = rb.position();
        Some(BodyState {
            center: from_solver(&iso.translation.vector),
            rotation: iso.rotation.angle(),
            velocity: from_solver(rb.linvel()),
            spin: rb.angvel(),
            mass: rb.mass(),
        })
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
