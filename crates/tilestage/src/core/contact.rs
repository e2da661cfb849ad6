use std::sync::{Mutex, RwLock};

use log::trace;
use rapier2d::prelude::*;

use super::scene::Registry;
use super::sync::{lock, read};
use crate::components::shape::Shape;

/// Two shapes whose colliders touched.
#[derive(Debug, Clone)]
pub struct CollisionPair {
    pub a: Shape,
    pub b: Shape,
}

/// Hand-off between the physics step and the main loop.
///
/// Contact callbacks push; `World::update` drains everything once per frame,
/// outside the lock, so user callbacks never run on the physics call stack.
#[derive(Debug, Default)]
pub struct CollisionQueue {
    begun: Mutex<Vec<CollisionPair>>,
    ended: Mutex<Vec<CollisionPair>>,
}

impl CollisionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_begin(&self, pair: CollisionPair) {
        lock(&self.begun).push(pair);
    }

    pub fn push_end(&self, pair: CollisionPair) {
        lock(&self.ended).push(pair);
    }

    /// Take every queued begin pair, in detection order.
    pub fn drain_begun(&self) -> Vec<CollisionPair> {
        std::mem::take(&mut *lock(&self.begun))
    }

    pub fn drain_ended(&self) -> Vec<CollisionPair> {
        std::mem::take(&mut *lock(&self.ended))
    }

    pub fn pending(&self) -> usize {
        lock(&self.begun).len() + lock(&self.ended).len()
    }

    pub fn clear(&self) {
        lock(&self.begun).clear();
        lock(&self.ended).clear();
    }
}

// Contact normals steeper than this count as floor/ceiling hits.
const VERTICAL_NORMAL: f32 = 0.7;
const MIN_RECORDED_IMPULSE: f32 = 0.5;

/// Translates Rapier's pair filtering and contact events into shape semantics.
/// Built fresh for every step; it only borrows world state.
pub(crate) struct ContactListener<'a> {
    registry: &'a RwLock<Registry>,
    queue: &'a CollisionQueue,
}

impl<'a> ContactListener<'a> {
    pub(crate) fn new(registry: &'a RwLock<Registry>, queue: &'a CollisionQueue) -> Self {
        Self { registry, queue }
    }

    fn resolve_bodies(
        &self,
        b1: Option<RigidBodyHandle>,
        b2: Option<RigidBodyHandle>,
    ) -> Option<(Shape, Shape)> {
        let registry = read(self.registry);
        let a = registry.by_body(b1?)?.clone();
        let b = registry.by_body(b2?)?.clone();
        Some((a, b))
    }

    fn resolve_colliders(
        &self,
        colliders: &ColliderSet,
        c1: ColliderHandle,
        c2: ColliderHandle,
    ) -> Option<(Shape, Shape)> {
        let b1 = colliders.get(c1).and_then(|c| c.parent());
        let b2 = colliders.get(c2).and_then(|c| c.parent());
        self.resolve_bodies(b1, b2)
    }

    /// Exemptions and tag filters. Pairs not owned by live shapes are allowed.
    fn allows(&self, ctx: &PairFilterContext) -> bool {
        let Some((a, b)) = self.resolve_bodies(ctx.rigid_body1, ctx.rigid_body2) else {
            return true;
        };
        a.should_collide_with(&b)
            && b.should_collide_with(&a)
            && a.collision_filter().should_collide(&b.collision_filter())
    }
}

impl PhysicsHooks for ContactListener<'_> {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        self.allows(context).then_some(SolverFlags::COMPUTE_IMPULSES)
    }

    fn filter_intersection_pair(&self, context: &PairFilterContext) -> bool {
        self.allows(context)
    }
}

impl EventHandler for ContactListener<'_> {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let Some((a, b)) = self.resolve_colliders(colliders, event.collider1(), event.collider2()) else {
            trace!("dropping contact between unregistered colliders {:?}", event);
            return;
        };
        if event.started() {
            self.queue.push_begin(CollisionPair { a, b });
        } else {
            a.finish_collide_with(&b);
            b.finish_collide_with(&a);
            self.queue.push_end(CollisionPair { a, b });
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        colliders: &ColliderSet,
        contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
        let Some(normal) = contact_pair.manifolds.first().map(|m| m.data.normal) else {
            return;
        };
        if normal.y.abs() <= VERTICAL_NORMAL {
            return;
        }
        let impulse = contact_pair.total_impulse_magnitude();
        if impulse <= MIN_RECORDED_IMPULSE {
            return;
        }
        if let Some((a, b)) =
            self.resolve_colliders(colliders, contact_pair.collider1, contact_pair.collider2)
        {
            a.set_last_collision_impulse(impulse as f64);
            b.set_last_collision_impulse(impulse as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::shape::ShapeProps;
    use std::sync::Arc;
    use std::thread;

    fn named(name: &str) -> Shape {
        Shape::new(ShapeProps::default().with_name(name))
    }

    #[test]
    fn drain_empties_the_queue() {
        let queue = CollisionQueue::new();
        queue.push_begin(CollisionPair { a: named("a"), b: named("b") });
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.drain_begun().len(), 1);
        assert!(queue.drain_begun().is_empty());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn pairs_from_another_thread_arrive_in_order() {
        let queue = Arc::new(CollisionQueue::new());
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..50 {
                    let name = format!("s{i}");
                    queue.push_begin(CollisionPair { a: named(&name), b: named("wall") });
                }
            })
        };
        producer.join().unwrap();
        let names: Vec<String> = queue.drain_begun().iter().map(|p| p.a.name()).collect();
        let expected: Vec<String> = (0..50).map(|i| format!("s{i}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn clear_discards_both_buffers() {
        let queue = CollisionQueue::new();
        queue.push_begin(CollisionPair { a: named("a"), b: named("b") });
        queue.push_end(CollisionPair { a: named("a"), b: named("b") });
        queue.clear();
        assert_eq!(queue.pending(), 0);
    }
}
