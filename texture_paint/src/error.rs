// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported at the crate's call boundaries.

use thiserror::Error;

/// Errors that can occur when building textures and contexts or requesting rasters.
///
/// None of these are recoverable runtime conditions: each one describes a call that
/// violated the documented preconditions. Singular transforms and pool misses are
/// handled internally and never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The source texture has no pixels.
    #[error("Texture has zero area ({width}x{height})")]
    EmptyTexture {
        /// The width of the texture.
        width: u32,
        /// The height of the texture.
        height: u32,
    },
    /// The texture storage is shorter than its layout requires.
    #[error("Texture storage holds {actual} elements, but its layout needs {required}")]
    BufferTooSmall {
        /// The number of elements the layout addresses.
        required: usize,
        /// The number of elements actually available.
        actual: usize,
    },
    /// A stride is too small to hold one texel or one row.
    #[error("Stride {stride} cannot hold {needed} elements")]
    StrideTooSmall {
        /// The offending stride, in elements.
        stride: usize,
        /// The minimum stride required.
        needed: usize,
    },
    /// The color model cannot describe pixels held in the given storage.
    #[error("Color model `{model}` cannot be stored as {storage}")]
    StorageMismatch {
        /// A short name of the color model.
        model: &'static str,
        /// A short name of the storage kind.
        storage: &'static str,
    },
    /// Texels must span between 1 and 255 storage elements.
    #[error("Texel length {0} is outside of 1..=255")]
    InvalidTexelLength(usize),
    /// A palette must have between 1 and 65536 entries.
    #[error("Palette has {0} entries, expected between 1 and 65536")]
    InvalidPalette(usize),
    /// Direct color masks must be contiguous, disjoint and have non-empty color channels.
    #[error("Invalid direct color masks (a: {alpha:#x}, r: {red:#x}, g: {green:#x}, b: {blue:#x})")]
    InvalidMasks {
        /// The alpha mask.
        alpha: u32,
        /// The red mask.
        red: u32,
        /// The green mask.
        green: u32,
        /// The blue mask.
        blue: u32,
    },
    /// A raster request with no pixels.
    #[error("Raster request has zero area ({width}x{height})")]
    EmptyRequest {
        /// The requested width.
        width: u32,
        /// The requested height.
        height: u32,
    },
    /// A raster request whose pixel count does not fit in memory.
    #[error("Raster request {width}x{height} is too large")]
    RequestTooLarge {
        /// The requested width.
        width: u32,
        /// The requested height.
        height: u32,
    },
}

pub(crate) type Result<T, E = Error> = core::result::Result<T, E>;
