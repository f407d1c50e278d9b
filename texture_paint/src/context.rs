// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The paint context: produces rasters of a tiled texture for device-space rectangles.

use std::sync::Arc;

use crate::color::ColorModel;
use crate::error::{Error, Result};
use crate::fill::{Filler, FillerKind, Selection};
use crate::geometry::SamplingState;
use crate::kurbo::{Affine, Rect};
use crate::peniko::ImageQuality;
use crate::pool::RasterPool;
use crate::raster::{OutputRaster, RasterFormat};
use crate::texture::SourceTexture;

/// The pixel format a render target would rather receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferredFormat {
    /// Packed `0xAARRGGBB`.
    Argb,
    /// Packed `0x__RRGGBB`.
    Xrgb,
}

/// Options for creating a [`TexturePaintContext`].
#[derive(Debug, Clone)]
pub struct ContextSettings {
    /// The sampling quality. [`ImageQuality::Low`] samples the nearest texel, anything
    /// else blends the four surrounding texels bilinearly.
    pub quality: ImageQuality,
    /// The output format preferred by the render target, if any.
    pub preferred_format: Option<PreferredFormat>,
    /// The pool rasters are taken from and returned to. Defaults to
    /// [`RasterPool::shared`].
    pub pool: Option<Arc<RasterPool>>,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            quality: ImageQuality::Low,
            preferred_format: None,
            pool: None,
        }
    }
}

impl ContextSettings {
    /// Settings with bilinear filtering switched on or off.
    pub fn filtered(filter: bool) -> Self {
        Self {
            quality: if filter {
                ImageQuality::Medium
            } else {
                ImageQuality::Low
            },
            ..Self::default()
        }
    }

    /// Whether bilinear filtering is requested.
    pub fn filter(&self) -> bool {
        !matches!(self.quality, ImageQuality::Low)
    }
}

/// Produces rasters of one texture paint under one transform.
///
/// The sampling state and filler are fixed at construction, so every call to
/// [`raster`](Self::raster) is a pure function of the requested rectangle. The context
/// keeps the most recent raster for itself and only hands it back to the pool once it
/// is disposed (or dropped).
///
/// Contexts are cheap to create but not shareable: each one serves a single fill
/// operation on a single thread. Many contexts may sample the same texture
/// concurrently.
#[derive(Debug)]
pub struct TexturePaintContext<'a> {
    texture: SourceTexture<'a>,
    sampling: SamplingState,
    filler: Filler<'a>,
    format: RasterFormat,
    model: ColorModel,
    scanline_width: u32,
    pool: Arc<RasterPool>,
    raster: Option<OutputRaster>,
}

static_assertions::assert_impl_all!(TexturePaintContext<'static>: Send);

impl<'a> TexturePaintContext<'a> {
    /// Create a context painting `texture`, repeated infinitely, through `transform`.
    ///
    /// `transform` maps tile space (one unit per texel) to device space. A singular
    /// transform is not an error; it makes every pixel sample the texel at the tile
    /// origin. `device_bounds` is the device-space area the caller is going to fill and
    /// is used to size rasters for single-row requests.
    pub fn new(
        texture: SourceTexture<'a>,
        transform: Affine,
        device_bounds: Rect,
        settings: ContextSettings,
    ) -> Self {
        let sampling = SamplingState::new(transform, texture.width(), texture.height());
        let Selection {
            filler,
            format,
            model,
        } = Filler::select(&texture, settings.filter(), settings.preferred_format);

        Self {
            texture,
            sampling,
            filler,
            format,
            model,
            scanline_width: scanline_width(device_bounds),
            pool: settings.pool.unwrap_or_else(RasterPool::shared),
            raster: None,
        }
    }

    /// Sample the device-space rectangle at `(x, y)` of size `width x height`.
    ///
    /// The returned raster may be larger than requested; only its top-left
    /// `width x height` pixels are defined, in the format and color model reported by
    /// [`output_format`](Self::output_format) and
    /// [`output_color_model`](Self::output_color_model).
    pub fn raster(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<&OutputRaster> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyRequest { width, height });
        }
        if self.format.byte_len(width, height).is_none() {
            return Err(Error::RequestTooLarge { width, height });
        }

        let mut raster = match self.raster.take() {
            Some(raster) if raster.fits(width, height) => raster,
            previous => {
                if let Some(previous) = previous {
                    self.pool.release(previous);
                }
                self.pool
                    .acquire(self.format, self.allocation_width(width, height), height)
            }
        };

        let origin = self.sampling.origin(x, y);
        self.filler
            .fill(&self.texture, &self.sampling, origin, &mut raster, width, height);
        Ok(&*self.raster.insert(raster))
    }

    // Scan-line renderers ask for one row at a time; size the first one for the
    // whole span so it can be reused for the rest.
    fn allocation_width(&self, width: u32, height: u32) -> u32 {
        if height != 1 || self.scanline_width <= width {
            return width;
        }
        match self.format.byte_len(self.scanline_width, 1) {
            Some(_) => self.scanline_width,
            None => width,
        }
    }

    /// Give the context's raster back to the pool.
    ///
    /// Dropping the context has the same effect.
    pub fn dispose(mut self) {
        if let Some(raster) = self.raster.take() {
            log::debug!(
                "disposing paint context, releasing {}x{} raster",
                raster.width(),
                raster.height()
            );
            self.pool.release(raster);
        }
    }

    /// How the elements of the produced rasters are to be interpreted.
    pub fn output_color_model(&self) -> &ColorModel {
        &self.model
    }

    /// The storage format of the produced rasters.
    pub fn output_format(&self) -> RasterFormat {
        self.format
    }

    /// The filler chosen for this context.
    pub fn filler_kind(&self) -> FillerKind {
        self.filler.kind()
    }

    /// The sampling state derived from the paint transform.
    pub fn sampling(&self) -> &SamplingState {
        &self.sampling
    }

    /// The texture being painted.
    pub fn texture(&self) -> &SourceTexture<'a> {
        &self.texture
    }

    /// The pool rasters are returned to.
    pub fn pool(&self) -> &Arc<RasterPool> {
        &self.pool
    }
}

impl Drop for TexturePaintContext<'_> {
    fn drop(&mut self) {
        if let Some(raster) = self.raster.take() {
            self.pool.release(raster);
        }
    }
}

#[expect(clippy::cast_possible_truncation, reason = "clamped to the u32 range")]
fn scanline_width(device_bounds: Rect) -> u32 {
    let width = device_bounds.width().abs();
    if width.is_finite() && width >= 1.0 {
        width.ceil().min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::DirectMasks;
    use crate::pool::PoolSettings;

    #[test]
    fn scanline_widths() {
        assert_eq!(scanline_width(Rect::new(0.0, 0.0, 99.2, 1.0)), 100);
        assert_eq!(scanline_width(Rect::new(10.0, 0.0, 0.0, 1.0)), 10);
        assert_eq!(scanline_width(Rect::ZERO), 1);
        assert_eq!(scanline_width(Rect::new(0.0, 0.0, f64::INFINITY, 1.0)), 1);
        assert_eq!(scanline_width(Rect::new(0.0, 0.0, 1.0e12, 1.0)), u32::MAX);
    }

    #[test]
    fn growing_requests_replace_the_raster() {
        let texels = [0xff00_0000; 4];
        let texture = SourceTexture::packed(&texels, 2, 2, DirectMasks::ARGB).unwrap();
        let pool = Arc::new(RasterPool::new(PoolSettings {
            min_dimension: 0,
            ..PoolSettings::default()
        }));
        let settings = ContextSettings {
            pool: Some(pool.clone()),
            ..ContextSettings::default()
        };
        let mut ctx = TexturePaintContext::new(texture, Affine::IDENTITY, Rect::ZERO, settings);

        assert_eq!(ctx.raster(0, 0, 4, 4).unwrap().width(), 4);
        assert_eq!(ctx.raster(0, 0, 3, 2).unwrap().width(), 4);
        assert_eq!(pool.stats().cached, 0);

        assert_eq!(ctx.raster(0, 0, 8, 2).unwrap().width(), 8);
        // The outgrown raster went back to the pool.
        assert_eq!(pool.stats().cached, 1);

        ctx.dispose();
        assert_eq!(pool.stats().cached, 2);
    }
}
