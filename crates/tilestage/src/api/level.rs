//! Level definitions: a character tile map plus lifecycle hooks.
//!
//! The map is a list of rows; each character is looked up in the level's
//! item table and, if present, its spawn function is called with the tile's
//! top-left corner and size. Tiles overlap their neighbours slightly so
//! adjacent colliders leave no seams.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::types::LoopData;
use super::world::World;
use crate::components::vector::Vector2;
use crate::renderer::surface::Surface;

pub type WorldHook = Arc<dyn Fn(&World) + Send + Sync>;
pub type TickHook = Arc<dyn Fn(&World, &LoopData) + Send + Sync>;
pub type RenderHook = Arc<dyn Fn(&World, &mut dyn Surface) + Send + Sync>;
/// Called per matching tile with (world, top-left, width, height).
pub type SpawnFn = Arc<dyn Fn(&World, Vector2, f64, f64) + Send + Sync>;

/// Extra size added to every tile, split across both sides.
pub const TILE_OVERLAP: f64 = 0.5;

/// One tile that will be handed to a spawn function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub item: char,
    pub row: usize,
    pub col: usize,
    pub position: Vector2,
    pub width: f64,
    pub height: f64,
}

/// Lay `map` over a `width` x `height` world. Tile size is the world size
/// divided by the row count and the first row's length.
pub fn tile_placements(map: &[String], width: f64, height: f64) -> Vec<TilePlacement> {
    let rows = map.len();
    let cols = map.first().map_or(0, |row| row.chars().count());
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    let tile_w = width / cols as f64;
    let tile_h = height / rows as f64;

    let mut placements = Vec::new();
    for (row, line) in map.iter().enumerate() {
        for (col, item) in line.chars().enumerate() {
            placements.push(TilePlacement {
                item,
                row,
                col,
                position: Vector2::new(
                    col as f64 * tile_w - TILE_OVERLAP / 2.0,
                    row as f64 * tile_h - TILE_OVERLAP / 2.0,
                ),
                width: tile_w + TILE_OVERLAP,
                height: tile_h + TILE_OVERLAP,
            });
        }
    }
    placements
}

/// An immutable level definition. Build with the `with_*`/`on_*` methods.
#[derive(Clone, Default)]
pub struct Level {
    map: Vec<String>,
    items: HashMap<char, SpawnFn>,
    pub(crate) init: Option<WorldHook>,
    pub(crate) tick: Option<TickHook>,
    pub(crate) render: Option<RenderHook>,
    pub(crate) mount: Option<WorldHook>,
    pub(crate) destroy: Option<WorldHook>,
}

impl Level {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map = rows.into_iter().map(Into::into).collect();
        self
    }

    /// Spawn function for every `item` character in the map.
    pub fn with_item(
        mut self,
        item: char,
        spawn: impl Fn(&World, Vector2, f64, f64) + Send + Sync + 'static,
    ) -> Self {
        self.items.insert(item, Arc::new(spawn));
        self
    }

    /// Runs after the previous level is torn down, before tiles spawn.
    pub fn on_init(mut self, hook: impl Fn(&World) + Send + Sync + 'static) -> Self {
        self.init = Some(Arc::new(hook));
        self
    }

    /// Runs once per update while the level is active.
    pub fn on_tick(mut self, hook: impl Fn(&World, &LoopData) + Send + Sync + 'static) -> Self {
        self.tick = Some(Arc::new(hook));
        self
    }

    /// Runs from `World::render`, after the shapes are drawn.
    pub fn on_render(mut self, hook: impl Fn(&World, &mut dyn Surface) + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(hook));
        self
    }

    /// Runs after the tiles have spawned.
    pub fn on_mount(mut self, hook: impl Fn(&World) + Send + Sync + 'static) -> Self {
        self.mount = Some(Arc::new(hook));
        self
    }

    /// Runs when another level replaces this one.
    pub fn on_destroy(mut self, hook: impl Fn(&World) + Send + Sync + 'static) -> Self {
        self.destroy = Some(Arc::new(hook));
        self
    }

    pub fn map(&self) -> &[String] {
        &self.map
    }

    pub(crate) fn spawn_tiles(&self, world: &World) {
        for tile in tile_placements(&self.map, world.width(), world.height()) {
            if let Some(spawn) = self.items.get(&tile.item) {
                spawn(world, tile.position, tile.width, tile.height);
            }
        }
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items: Vec<char> = self.items.keys().copied().collect();
        items.sort_unstable();
        f.debug_struct("Level")
            .field("map", &self.map)
            .field("items", &items)
            .field("tick", &self.tick.is_some())
            .field("render", &self.render.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(map: &[&str]) -> Vec<String> {
        map.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn tiles_cover_the_world_with_overlap() {
        let map = rows(&["#..#", "...."]);
        let tiles = tile_placements(&map, 800.0, 600.0);
        assert_eq!(tiles.len(), 8);

        let last_wall = tiles.iter().find(|t| t.item == '#' && t.col == 3).unwrap();
        assert_eq!(last_wall.row, 0);
        assert_eq!(last_wall.position, Vector2::new(600.0 - 0.25, -0.25));
        assert_eq!(last_wall.width, 200.5);
        assert_eq!(last_wall.height, 300.5);

        let below = tiles.iter().find(|t| t.row == 1 && t.col == 1).unwrap();
        assert_eq!(below.position, Vector2::new(199.75, 299.75));
    }

    #[test]
    fn empty_maps_spawn_nothing() {
        assert!(tile_placements(&[], 800.0, 600.0).is_empty());
        assert!(tile_placements(&rows(&[""]), 800.0, 600.0).is_empty());
    }

    #[test]
    fn builder_records_hooks_and_items() {
        let level = Level::new()
            .with_map(["ab", "ba"])
            .with_item('a', |_, _, _, _| {})
            .on_tick(|_, _| {})
            .on_destroy(|_| {});
        assert_eq!(level.map().len(), 2);
        assert!(level.tick.is_some());
        assert!(level.destroy.is_some());
        assert!(level.init.is_none());
        let debug = format!("{level:?}");
        assert!(debug.contains("['a']"));
    }
}
