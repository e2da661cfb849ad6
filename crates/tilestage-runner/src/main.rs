//! Headless demo: a few crates fall onto a tile-map floor and land on each
//! other. Frames are drawn into a recording surface and summarised in the log.

use std::time::{SystemTime, UNIX_EPOCH};

use env_logger::{Builder, Env};
use log::info;
use tilestage::{
    Color, EventData, EventType, Level, RecordingSurface, Shape, ShapeProps, Vector2,
    WorldBuilder, WorldConfig,
};
use tilestage_runner::GameRunner;

const FRAMES: usize = 240;

fn demo_level() -> Level {
    Level::new()
        .with_map([
            "..........",
            "..........",
            "..........",
            "..........",
            "..........",
            "##########",
        ])
        .with_item('#', |world, pos, w, h| {
            let floor = Shape::new(
                ShapeProps::rect(pos.x, pos.y, w, h)
                    .with_tag("floor")
                    .with_background(Color::rgb(90, 70, 50)),
            );
            if let Err(err) = world.register(&floor) {
                log::warn!("floor tile rejected: {err}");
            }
        })
        .on_mount(|world| {
            for i in 0..4 {
                let crate_ = Shape::new(
                    ShapeProps::rect(120.0 + i as f64 * 40.0, 40.0 + i as f64 * 24.0, 24.0, 24.0)
                        .with_tag("crate")
                        .with_background(Color::rgb(200, 160, 60))
                        .with_body(true)
                        .with_rebound(0.2),
                );
                if let Err(err) = world.register(&crate_) {
                    log::warn!("crate rejected: {err}");
                }
            }
            world.on(EventType::Collision, |data| {
                if let EventData::Collision { a, b } = data {
                    info!("{} hit {}", a.label(), b.label());
                }
            });
        })
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1);

    let config = WorldConfig {
        title: "tilestage headless".to_string(),
        width: 480.0,
        height: 360.0,
        gravity: Vector2::new(0.0, 9.8),
        name_seed: Some(seed),
        ..WorldConfig::default()
    };
    let mut runner = GameRunner::new(WorldBuilder::new(config).with_level(demo_level()));
    runner.start();

    let mut surface = RecordingSurface::new();
    let mut updates = 0;
    for _ in 0..FRAMES {
        updates += runner.frame(1.0 / 60.0, &mut surface);
        surface.take();
    }

    runner.frame(0.0, &mut surface);
    let world = runner.world();
    info!("{updates} updates, last frame issued {} draw calls", surface.calls().len());
    for shape in world.elements_by_tag("crate") {
        let at = shape.position();
        info!(
            "{} rests at ({:.1}, {:.1}), last impact {:.2}",
            shape.label(),
            at.x,
            at.y,
            shape.last_collision_impulse()
        );
    }
}
