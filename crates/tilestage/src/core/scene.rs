use std::collections::{HashMap, HashSet};

use rapier2d::prelude::RigidBodyHandle;

use crate::api::types::{ShapeId, ShapeKind};
use crate::components::shape::Shape;

/// Live shapes in insertion order, plus a body-handle index for resolving
/// contact callbacks without a scan.
/// Designed for small-to-medium shape counts (hundreds, not millions).
#[derive(Debug, Default)]
pub struct Registry {
    shapes: Vec<Shape>,
    by_body: HashMap<RigidBodyHandle, Shape>,
    /// Ids whose bodies are being built outside the lock.
    reserved: HashSet<ShapeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for a registration in progress. False when it is already
    /// present or claimed.
    pub fn reserve(&mut self, id: ShapeId) -> bool {
        !self.contains(id) && self.reserved.insert(id)
    }

    /// Drop a claim whose registration failed.
    pub fn release(&mut self, id: ShapeId) {
        self.reserved.remove(&id);
    }

    /// Add a shape, consuming its reservation if any. Returns false if a
    /// shape with the same ID is already present.
    pub fn spawn(&mut self, shape: Shape, body: Option<RigidBodyHandle>) -> bool {
        self.reserved.remove(&shape.id());
        if self.contains(shape.id()) {
            return false;
        }
        if let Some(handle) = body {
            self.by_body.insert(handle, shape.clone());
        }
        self.shapes.push(shape);
        true
    }

    /// Remove a shape by ID, keeping the order of the rest.
    pub fn despawn(&mut self, id: ShapeId) -> Option<Shape> {
        let idx = self.shapes.iter().position(|s| s.id() == id)?;
        let shape = self.shapes.remove(idx);
        if let Some(body) = shape.body() {
            self.by_body.remove(&body.body_handle);
        }
        Some(shape)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.get(id).is_some()
    }

    pub fn by_body(&self, handle: RigidBodyHandle) -> Option<&Shape> {
        self.by_body.get(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    /// Clone of the ordered shape list, for iterating without the lock.
    pub fn snapshot(&self) -> Vec<Shape> {
        self.shapes.clone()
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.tag() == tag)
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<Shape> {
        self.shapes.iter().filter(|s| s.tag() == tag).cloned().collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.name() == name)
    }

    pub fn find_all_by_name(&self, name: &str) -> Vec<Shape> {
        self.shapes.iter().filter(|s| s.name() == name).cloned().collect()
    }

    pub fn find_all_by_kind(&self, kind: ShapeKind) -> Vec<Shape> {
        self.shapes.iter().filter(|s| s.kind() == kind).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Remove every shape, returning them in order.
    pub fn clear(&mut self) -> Vec<Shape> {
        self.by_body.clear();
        std::mem::take(&mut self.shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::shape::ShapeProps;

    fn tagged(tag: &str) -> Shape {
        Shape::new(ShapeProps::default().with_tag(tag))
    }

    #[test]
    fn spawn_and_get() {
        let mut registry = Registry::new();
        let shape = Shape::new(ShapeProps::rect(10.0, 20.0, 5.0, 5.0));
        assert!(registry.spawn(shape.clone(), None));
        let found = registry.get(shape.id()).unwrap();
        assert_eq!(found.position().x, 10.0);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = Registry::new();
        let shape = tagged("a");
        assert!(registry.spawn(shape.clone(), None));
        assert!(!registry.spawn(shape, None));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reservations_are_exclusive_until_spawned_or_released() {
        let mut registry = Registry::new();
        let shape = tagged("a");
        assert!(registry.reserve(shape.id()));
        assert!(!registry.reserve(shape.id()));
        registry.release(shape.id());
        assert!(registry.reserve(shape.id()));

        assert!(registry.spawn(shape.clone(), None));
        assert!(!registry.reserve(shape.id()));
        registry.despawn(shape.id());
        assert!(registry.reserve(shape.id()));
    }

    #[test]
    fn despawn_keeps_insertion_order() {
        let mut registry = Registry::new();
        let shapes: Vec<Shape> = ["a", "b", "c", "d"].into_iter().map(tagged).collect();
        for s in &shapes {
            registry.spawn(s.clone(), None);
        }
        assert!(registry.despawn(shapes[1].id()).is_some());
        assert!(registry.despawn(shapes[1].id()).is_none());
        let tags: Vec<String> = registry.iter().map(Shape::tag).collect();
        assert_eq!(tags, vec!["a", "c", "d"]);
    }

    #[test]
    fn find_by_tag_and_name() {
        let mut registry = Registry::new();
        registry.spawn(Shape::new(ShapeProps::default().with_tag("hero").with_name("Kit")), None);
        registry.spawn(tagged("enemy"), None);
        registry.spawn(tagged("enemy"), None);
        assert_eq!(registry.find_by_tag("hero").unwrap().name(), "Kit");
        assert_eq!(registry.find_all_by_tag("enemy").len(), 2);
        assert_eq!(registry.find_by_name("Kit").unwrap().tag(), "hero");
        assert_eq!(registry.find_all_by_kind(ShapeKind::Rectangle).len(), 3);
        assert!(registry.find_by_tag("boss").is_none());
    }

    #[test]
    fn clear_returns_everything() {
        let mut registry = Registry::new();
        registry.spawn(tagged("a"), None);
        registry.spawn(tagged("b"), None);
        let removed = registry.clear();
        assert_eq!(removed.len(), 2);
        assert!(registry.is_empty());
    }
}
