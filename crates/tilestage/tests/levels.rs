use std::sync::{Arc, Mutex};

use tilestage::{
    Color, DrawCall, InputEvent, InputQueue, Level, MouseButton, RecordingSurface, Shape,
    ShapeProps, SharedInput, Vector2, World, WorldBuilder, WorldConfig, BORDER_TAG,
};

fn wall(world: &World, pos: Vector2, w: f64, h: f64) {
    let shape = Shape::new(ShapeProps::rect(pos.x, pos.y, w, h).with_tag("wall").with_z_index(1));
    world.register(&shape).unwrap();
}

fn coin(world: &World, pos: Vector2, w: f64, h: f64) {
    let shape = Shape::new(
        ShapeProps::rect(pos.x, pos.y, w, h)
            .with_tag("coin")
            .with_z_index(2)
            .with_ghost(true),
    );
    world.register(&shape).unwrap();
}

fn maze() -> Level {
    Level::new()
        .with_map(["#c#", "..#"])
        .with_item('#', wall)
        .with_item('c', coin)
}

#[test]
fn tile_map_spawns_overlapping_tiles() {
    let world = WorldBuilder::new(WorldConfig::default().with_size(300.0, 200.0))
        .with_level(maze())
        .build();
    world.select_level(0);

    assert_eq!(world.elements_by_tag("wall").len(), 3);
    let coins = world.elements_by_tag("coin");
    assert_eq!(coins.len(), 1);
    assert_eq!(coins[0].position(), Vector2::new(99.75, -0.25));
    assert_eq!((coins[0].width(), coins[0].height()), (100.5, 100.5));
    assert!(coins[0].is_ghost());
}

#[test]
fn levels_advance_in_order_and_stop_at_the_end() {
    let entered = Arc::new(Mutex::new(Vec::new()));
    let levels = (0..3).map(|i| {
        let entered = Arc::clone(&entered);
        Level::new().on_mount(move |_| entered.lock().unwrap().push(i))
    });
    let world = WorldBuilder::new(WorldConfig::default()).with_levels(levels).build();

    world.select_level(0);
    for _ in 0..5 {
        world.next_level();
        world.update_by(1.0 / 60.0);
    }
    assert_eq!(*entered.lock().unwrap(), vec![0, 1, 2]);
    assert_eq!(world.current_level(), Some(2));
}

#[test]
fn last_switch_request_wins() {
    let world = WorldBuilder::new(WorldConfig::default())
        .with_levels([Level::new(), maze(), Level::new()])
        .build();
    world.select_level(0);
    world.switch_to_level(2);
    world.switch_to_level(1);
    world.update_by(1.0 / 60.0);
    assert_eq!(world.current_level(), Some(1));
    assert_eq!(world.len(), 4);
}

#[test]
fn level_render_hook_draws_after_shapes() {
    let level = maze().on_render(|world, surface| {
        surface.draw_rect(tilestage::Rect::new(0.0, 0.0, world.width(), 1.0), Color::WHITE);
    });
    let world = WorldBuilder::new(WorldConfig::default().with_size(300.0, 200.0))
        .with_level(level)
        .build();
    world.select_level(0);
    world.create_borders().unwrap();

    let mut surface = RecordingSurface::new();
    world.draw(&mut surface);
    world.render(&mut surface);

    let calls = surface.calls();
    assert_eq!(calls[0], DrawCall::Fill(Color::BLACK));
    assert!(matches!(calls.last(), Some(DrawCall::Rect { .. })));
    // 4 borders + 3 walls + 1 coin
    assert_eq!(surface.images().count(), 8);

    let mut order = world.all_elements();
    order.sort_by_key(|s| (s.tag() != BORDER_TAG, s.z_index()));
    assert!(order[..4].iter().all(|s| s.tag() == BORDER_TAG));
    assert_eq!(order[7].tag(), "coin");
}

#[test]
fn clicking_a_tile_through_the_input_queue() {
    let input: SharedInput = Arc::new(Mutex::new(InputQueue::new()));
    let world = WorldBuilder::new(WorldConfig::default().with_size(300.0, 200.0))
        .with_level(maze())
        .with_input(Arc::clone(&input))
        .build();
    world.select_level(0);

    let clicked = Arc::new(Mutex::new(Vec::new()));
    for shape in world.all_elements() {
        let clicked = Arc::clone(&clicked);
        let tag = shape.tag();
        shape.on(tilestage::EventType::Click, move |_| clicked.lock().unwrap().push(tag.clone()));
    }

    {
        let mut queue = input.lock().unwrap();
        queue.push(InputEvent::PointerDown { x: 150.0, y: 50.0, button: MouseButton::Left });
    }
    world.update_by(1.0 / 60.0);
    input
        .lock()
        .unwrap()
        .push(InputEvent::PointerUp { x: 150.0, y: 50.0, button: MouseButton::Left });
    world.update_by(1.0 / 60.0);

    assert_eq!(*clicked.lock().unwrap(), vec!["coin".to_string()]);
    assert_eq!(world.cursor_position(), Vector2::new(150.0, 50.0));
}
