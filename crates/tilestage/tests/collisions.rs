use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tilestage::{EventData, EventType, Shape, ShapeProps, Vector2, World, WorldConfig};

const DT: f64 = 1.0 / 60.0;

fn ball(name: &str, x: f64, vx: f64) -> Shape {
    Shape::new(
        ShapeProps::circle(x, 100.0, 16.0)
            .with_name(name)
            .with_tag("ball")
            .with_body(false)
            .with_velocity(Vector2::new(vx, 0.0)),
    )
}

fn converging_pair(world: &World) -> (Shape, Shape) {
    let a = ball("left", 100.0, 160.0);
    let b = ball("right", 160.0, -160.0);
    world.register(&a).unwrap();
    world.register(&b).unwrap();
    (a, b)
}

fn run(world: &World, frames: usize) {
    for _ in 0..frames {
        world.update_by(DT);
    }
}

#[test]
fn converging_bodies_report_a_collision() {
    let world = World::new(WorldConfig::default());
    let (a, b) = converging_pair(&world);

    let events = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&events);
    world.on(EventType::Collision, move |data| {
        if let EventData::Collision { a, b } = data {
            e.lock().unwrap().push((a.name(), b.name()));
        }
    });

    let a_hits = Arc::new(AtomicUsize::new(0));
    let t = Arc::clone(&a_hits);
    let partner = b.clone();
    a.set_on_collision(move |other| {
        assert_eq!(*other, partner);
        t.fetch_add(1, Ordering::SeqCst);
    });

    let b_hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&b_hits);
    let (a_seen, b_seen) = (a.clone(), b.clone());
    b.set_on_collision(move |other| {
        assert_eq!(*other, a_seen);
        assert!(b_seen.is_colliding_with(&a_seen));
        assert!(a_seen.is_colliding_with(&b_seen));
        h.fetch_add(1, Ordering::SeqCst);
    });

    run(&world, 60);

    let events = events.lock().unwrap();
    assert!(!events.is_empty());
    let (first_a, first_b) = &events[0];
    let mut names = [first_a.as_str(), first_b.as_str()];
    names.sort_unstable();
    assert_eq!(names, ["left", "right"]);
    assert_eq!(a_hits.load(Ordering::SeqCst), events.len());
    assert_eq!(b_hits.load(Ordering::SeqCst), events.len());
    // the bodies stopped each other instead of passing through
    assert!(a.x() < b.x());
}

#[test]
fn exempted_pair_passes_through() {
    let world = World::new(WorldConfig::default());
    let (a, b) = converging_pair(&world);
    a.not_collide_with(&b).unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    world.on(EventType::Collision, move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    run(&world, 60);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(a.x() > b.x());
    assert!(a.collision_objects().is_empty());
}

#[test]
fn negative_group_tags_never_collide() {
    let world = World::new(WorldConfig::default());
    let (a, b) = converging_pair(&world);
    world.set_tag_collision_filter("ball", &[]);

    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    world.on(EventType::Collision, move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    run(&world, 60);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(a.x() > b.x());
}

#[test]
fn landing_records_the_impact_impulse() {
    let world = World::new(WorldConfig::default().with_gravity(Vector2::new(0.0, 9.8)));
    let (floor, crate_) = floor_and_crate(&world);

    let landed = Arc::new(AtomicUsize::new(0));
    let l = Arc::clone(&landed);
    crate_.set_on_collision(move |other| {
        assert_eq!(other.name(), "floor");
        l.fetch_add(1, Ordering::SeqCst);
    });

    run(&world, 120);

    assert!(landed.load(Ordering::SeqCst) >= 1);
    assert!(crate_.last_collision_impulse() > 0.5);
    assert!(floor.last_collision_impulse() > 0.5);
    assert!(crate_.y() > 400.0 && crate_.y() < 440.0);
    assert!(crate_.is_colliding_with(&floor));
}

#[test]
fn removing_a_shape_mid_run_is_safe() {
    let world = World::new(WorldConfig::default());
    let (a, b) = converging_pair(&world);
    let world_handle = world.clone();
    a.set_on_collision(move |other| world_handle.unregister(other));

    run(&world, 60);
    assert!(a.is_live());
    assert!(!b.is_live());
    assert_eq!(world.len(), 1);
    assert_eq!(world.body_count(), 1);
}

fn floor_and_crate(world: &World) -> (Shape, Shape) {
    let floor = Shape::new(ShapeProps::rect(0.0, 440.0, 800.0, 40.0).with_name("floor"));
    let crate_ = Shape::new(ShapeProps::rect(392.0, 400.0, 16.0, 16.0).with_name("crate").with_body(true));
    world.register(&floor).unwrap();
    world.register(&crate_).unwrap();
    (floor, crate_)
}

#[test]
fn removing_the_floor_ends_the_resting_contact() {
    let world = World::new(WorldConfig::default().with_gravity(Vector2::new(0.0, 9.8)));
    let (floor, crate_) = floor_and_crate(&world);

    let finished = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::clone(&finished);
    crate_.set_on_finish_collision(move |other| f.lock().unwrap().push(other.name()));

    run(&world, 120);
    assert!(crate_.is_colliding_with(&floor));

    world.unregister(&floor);
    run(&world, 120);

    assert!(!crate_.is_colliding_with(&floor));
    assert!(crate_.collision_objects().is_empty());
    let finished = finished.lock().unwrap();
    assert!(!finished.is_empty());
    assert!(finished.iter().all(|name| name == "floor"));
    // nothing holds it up any more
    assert!(crate_.y() > 480.0);
}

#[test]
fn bouncing_apart_fires_finish_callbacks() {
    let world = World::new(WorldConfig::default());
    let a = Shape::new(
        ShapeProps::circle(100.0, 100.0, 16.0)
            .with_name("left")
            .with_body(false)
            .with_rebound(1.0)
            .with_velocity(Vector2::new(160.0, 0.0)),
    );
    let b = Shape::new(
        ShapeProps::circle(160.0, 100.0, 16.0)
            .with_name("right")
            .with_body(false)
            .with_rebound(1.0)
            .with_velocity(Vector2::new(-160.0, 0.0)),
    );
    world.register(&a).unwrap();
    world.register(&b).unwrap();

    let finished = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::clone(&finished);
    a.set_on_finish_collision(move |other| f.lock().unwrap().push(other.name()));

    run(&world, 60);
    let finished = finished.lock().unwrap();
    assert!(!finished.is_empty());
    assert!(finished.iter().all(|name| name == "right"));
    assert!(!a.is_colliding_with(&b));
    assert!(a.velocity().x < 0.0 && b.velocity().x > 0.0);
}

#[test]
fn side_hits_record_no_impact_impulse() {
    let world = World::new(WorldConfig::default());
    let (a, b) = converging_pair(&world);
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    world.on(EventType::Collision, move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    run(&world, 60);
    assert!(count.load(Ordering::SeqCst) > 0);
    // head-on along x: the contact normal is horizontal
    assert_eq!(a.last_collision_impulse(), 0.0);
    assert_eq!(b.last_collision_impulse(), 0.0);
}

#[test]
fn ghosts_report_contacts_but_pass_through() {
    let world = World::new(WorldConfig::default());
    let ghost = Shape::new(
        ShapeProps::circle(100.0, 100.0, 16.0)
            .with_name("ghost")
            .with_body(false)
            .with_ghost(true)
            .with_velocity(Vector2::new(160.0, 0.0)),
    );
    let wall = ball("wall", 160.0, 0.0);
    world.register(&ghost).unwrap();
    world.register(&wall).unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    ghost.set_on_collision(move |other| {
        assert_eq!(other.name(), "wall");
        h.fetch_add(1, Ordering::SeqCst);
    });

    run(&world, 60);
    assert!(hits.load(Ordering::SeqCst) >= 1);
    assert!(ghost.x() > wall.x());
    assert_eq!(wall.velocity(), Vector2::ZERO);
}

#[test]
fn restoring_a_tag_exemption_brings_contacts_back() {
    let world = World::new(WorldConfig::default());
    let a = ball("left", 100.0, 160.0);
    let b = Shape::new(
        ShapeProps::circle(160.0, 100.0, 16.0)
            .with_name("right")
            .with_tag("target")
            .with_body(false)
            .with_velocity(Vector2::new(-160.0, 0.0)),
    );
    world.register(&a).unwrap();
    world.register(&b).unwrap();

    a.not_collide_with_tag("target").unwrap();
    assert!(!a.should_collide_with(&b) && !b.should_collide_with(&a));
    a.restore_collision_with_tag("target").unwrap();
    assert!(a.should_collide_with(&b) && b.should_collide_with(&a));

    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    b.set_on_collision(move |_| {
        h.fetch_add(1, Ordering::SeqCst);
    });
    run(&world, 60);
    assert!(hits.load(Ordering::SeqCst) >= 1);
    assert!(a.x() < b.x());
}
