use std::sync::Arc;

use log::{trace, warn};

use super::surface::{Color, Image};

/// How a generated raster is coloured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Fill {
    Solid(Color),
    /// Top row `top`, bottom row `bottom`.
    Gradient { top: Color, bottom: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outline {
    Rect,
    Disc,
}

/// Everything a generated raster depends on. Equal keys produce equal images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RasterKey {
    pub fill: Fill,
    pub outline: Outline,
    pub width: u32,
    pub height: u32,
}

/// Longest side of a generated raster. Larger shapes get a capped raster
/// stretched over their bounds.
pub(crate) const MAX_RASTER_SIDE: u32 = 4096;

fn pixels(extent: f64) -> u32 {
    let side = extent.round();
    if side.is_nan() {
        return 1;
    }
    side.clamp(1.0, MAX_RASTER_SIDE as f64) as u32
}

/// Whether `extent` is too large to rasterise at full size.
pub(crate) fn exceeds_raster(extent: f64) -> bool {
    extent.round() > MAX_RASTER_SIDE as f64
}

impl RasterKey {
    pub fn rect(fill: Fill, width: f64, height: f64) -> Self {
        Self { fill, outline: Outline::Rect, width: pixels(width), height: pixels(height) }
    }

    pub fn disc(color: Color, diameter: f64) -> Self {
        let side = pixels(diameter);
        Self { fill: Fill::Solid(color), outline: Outline::Disc, width: side, height: side }
    }

    pub fn render(&self) -> Image {
        match (self.outline, self.fill) {
            (Outline::Rect, Fill::Solid(color)) => Image::filled(self.width, self.height, color),
            (Outline::Rect, Fill::Gradient { top, bottom }) => {
                vertical_gradient(self.width, self.height, top, bottom)
            }
            (Outline::Disc, Fill::Solid(color)) | (Outline::Disc, Fill::Gradient { top: color, .. }) => {
                disc(self.width, color)
            }
        }
    }
}

pub(crate) fn disc(diameter: u32, color: Color) -> Image {
    let mut image = Image::new(diameter, diameter);
    let r = diameter as f64 / 2.0;
    for y in 0..diameter {
        for x in 0..diameter {
            let dx = x as f64 + 0.5 - r;
            let dy = y as f64 + 0.5 - r;
            if dx * dx + dy * dy <= r * r {
                image.set(x, y, color);
            }
        }
    }
    image
}

pub(crate) fn vertical_gradient(width: u32, height: u32, top: Color, bottom: Color) -> Image {
    let mut image = Image::new(width, height);
    let span = height.saturating_sub(1).max(1) as f64;
    for y in 0..height {
        let row = top.lerp(bottom, y as f64 / span);
        for x in 0..width {
            image.set(x, y, row);
        }
    }
    image
}

/// Single-entry cache of a shape's generated raster.
#[derive(Debug, Default)]
pub(crate) struct RasterCache {
    entry: Option<(RasterKey, Arc<Image>)>,
    builds: u32,
}

impl RasterCache {
    pub fn get_or_build(&mut self, key: RasterKey) -> Arc<Image> {
        if let Some((cached, image)) = &self.entry {
            if *cached == key {
                return Arc::clone(image);
            }
        }
        if key.width == MAX_RASTER_SIDE || key.height == MAX_RASTER_SIDE {
            warn!("raster capped at {}x{}", key.width, key.height);
        }
        let image = Arc::new(key.render());
        self.builds += 1;
        trace!("raster {} generated ({}x{})", self.builds, key.width, key.height);
        self.entry = Some((key, Arc::clone(&image)));
        image
    }

    /// How many rasters this cache has generated.
    #[cfg(test)]
    pub fn builds(&self) -> u32 {
        self.builds
    }
}
