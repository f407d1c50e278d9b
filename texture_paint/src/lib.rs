// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A CPU rasterizer for tiled texture paints.
//!
//! Given a source tile, an affine transform and a device-space rectangle, a
//! [`TexturePaintContext`] produces a raster in which every pixel holds the color of the
//! tile at the inverse-mapped position, wrapped so that the tile repeats infinitely. The
//! position is stepped incrementally in fixed point, so the per-pixel cost is a few
//! integer additions rather than a matrix multiplication.
//!
//! Sampling is either nearest neighbor or bilinear (see [`ContextSettings::quality`]).
//! Each context picks one of several fillers up front, based on how the texture is
//! stored:
//!
//! - packed 32-bit direct color, copied in runs where the transform allows it,
//! - 8-bit palette indices, optionally resolved and blended,
//! - anything else, through the [`ColorModel`] (including caller-defined
//!   [`PixelCodec`]s).
//!
//! Output rasters come from a [`RasterPool`] and go back to it when the context is
//! disposed, so steady-state painting does not allocate.
//!
//! # Example
//!
//! ```
//! use texture_paint::kurbo::{Affine, Rect};
//! use texture_paint::{ContextSettings, DirectMasks, SourceTexture, TexturePaint};
//!
//! let texels = [0xffff_0000, 0xff00_ff00, 0xff00_00ff, 0xffff_ffff];
//! let texture = SourceTexture::packed(&texels, 2, 2, DirectMasks::ARGB).unwrap();
//! let paint = TexturePaint::unscaled(texture);
//!
//! let bounds = Rect::new(0.0, 0.0, 4.0, 4.0);
//! let mut ctx = paint.create_context(Affine::IDENTITY, bounds, ContextSettings::default());
//! let raster = ctx.raster(0, 0, 4, 4).unwrap();
//! assert_eq!(raster.pixel_word(2, 3), Some(0xff00_00ff));
//! ctx.dispose();
//! ```
//!
//! # Features
//!
//! - `png` (enabled by default): Allow encoding output rasters as PNG images.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blend;
pub mod color;
mod context;
mod error;
mod fill;
pub mod geometry;
mod paint;
pub mod pool;
pub mod raster;
pub mod texture;

pub use peniko;
pub use peniko::kurbo;

pub use color::{ChannelOrder, ColorModel, DirectMasks, Palette, PixelCodec, Texel};
pub use context::{ContextSettings, PreferredFormat, TexturePaintContext};
pub use error::Error;
pub use fill::FillerKind;
pub use geometry::SamplingState;
pub use paint::TexturePaint;
pub use pool::{PoolSettings, PoolStats, RasterPool};
pub use raster::{OutputRaster, RasterFormat};
pub use texture::{SourceTexture, TexelData, TextureLayout};
