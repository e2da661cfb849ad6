pub mod api;
pub mod core;
pub mod components;
pub mod events;
pub mod renderer;
pub mod input;
pub mod config;
pub mod error;

// Re-export key types at crate root for convenience
pub use api::world::{World, WorldBuilder, PointerCallback};
pub use api::level::{Level, SpawnFn, WorldHook, TickHook, RenderHook, TilePlacement, tile_placements};
pub use api::audio::{AudioManager, AudioError, NullAudio};
pub use api::types::{
    ShapeId, ShapeKind, Pattern, Border, Flip, Direction, Axis, AxisX, AxisY, LoopData,
    BORDER_TAG, DEFAULT_TAG, PIXELS_PER_METER, DIRECTION_EPSILON, DEG,
    pixels_to_meters, meters_to_pixels,
};
pub use components::vector::Vector2;
pub use components::shape::{Shape, ShapeProps, CollisionCallback};
pub use config::WorldConfig;
pub use core::contact::{CollisionPair, CollisionQueue};
pub use core::filter::{CollisionFilter, tag_hash, tag_group_index, tag_category_bit};
pub use core::physics::{
    PhysicsWorld, PhysicsBody, BodyDesc, BodyState, ColliderDesc, ColliderMaterial,
};
pub use core::rng::{Rng, seed_names};
pub use core::time::FixedTimestep;
pub use error::{Error, Result};
pub use events::{EventType, EventData};
pub use events::emitter::{EventEmitter, ListenerId, Handler};
pub use input::queue::{InputEvent, InputQueue, InputSnapshot, InputSource, MouseButton, SharedInput};
pub use renderer::surface::{Color, Image, Rect, DrawOptions, Surface, RecordingSurface, DrawCall};
