use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::renderer::surface::Color;

/// Unique identifier for a shape. Process-wide and monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

impl ShapeId {
    pub(crate) fn next() -> Self {
        ShapeId(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometric kind of a shape. Circles get a ball collider, everything else a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Square,
    #[default]
    Rectangle,
    Line,
    Dot,
}

/// How a shape's body is filled when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Pattern {
    /// Solid background colour.
    #[default]
    Color,
    /// The shape's image, stretched to its size. Falls back to `Color` without one.
    Image,
    /// Vertical gradient from the background colour (top) to `end` (bottom).
    Gradient { end: Color },
}

/// Outline drawn around a shape, outside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f64,
    pub color: Color,
}

impl Border {
    pub fn new(width: f64, color: Color) -> Self {
        Self { width, color }
    }
}

/// Mirror flags applied when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flip {
    pub x: bool,
    pub y: bool,
}

/// Cardinal direction for `Shape::move_dir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisX {
    #[default]
    Unknown,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisY {
    #[default]
    Unknown,
    Up,
    Down,
}

/// Last known heading of a shape on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Axis {
    pub x: AxisX,
    pub y: AxisY,
}

impl Axis {
    pub fn new(x: AxisX, y: AxisY) -> Self {
        Self { x, y }
    }

    /// Both axes have a known heading.
    pub fn is_determined(&self) -> bool {
        self.x != AxisX::Unknown && self.y != AxisY::Unknown
    }
}

/// Frame information handed to a level's tick hook.
#[derive(Debug, Clone, Copy)]
pub struct LoopData {
    pub time: Instant,
    /// Number of completed updates, starting at 1 for the first.
    pub frame: u64,
    /// Seconds since the previous update.
    pub delta: f64,
}

/// Shapes with this tag always get a fixed body and draw beneath everything else.
pub const BORDER_TAG: &str = "border";
pub const DEFAULT_TAG: &str = "unknown";

pub const PIXELS_PER_METER: f64 = 8.0;

/// Velocities at or below this magnitude are treated as drift and zeroed.
pub const DIRECTION_EPSILON: f64 = 0.0;

/// Degrees to radians.
pub const DEG: f64 = std::f64::consts::PI / 180.0;

pub fn pixels_to_meters(pixels: f64) -> f64 {
    pixels / PIXELS_PER_METER
}

pub fn meters_to_pixels(meters: f64) -> f64 {
    meters * PIXELS_PER_METER
}
