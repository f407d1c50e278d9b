// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fallback filler, going through the color model for every texel.
//!
//! This works for any storage layout and any color model, including caller-defined
//! codecs, at the price of a dynamic dispatch per sample.

use super::{Region, next};
use crate::blend::blend;
use crate::color::Texel;
use crate::geometry::{SamplingState, TilePoint};
use crate::texture::SourceTexture;

/// A storage element of an output raster.
pub(super) trait Element: Copy {
    fn from_u32(value: u32) -> Self;
}

impl Element for u32 {
    #[inline(always)]
    fn from_u32(value: u32) -> Self {
        value
    }
}

impl Element for u8 {
    #[inline(always)]
    #[expect(clippy::cast_possible_truncation, reason = "byte storage keeps the low bits")]
    fn from_u32(value: u32) -> Self {
        value as Self
    }
}

/// Fill `dst`, whose rows hold `texel_len` elements per pixel, with texels in the
/// source's own color model.
///
/// When filtering, the four neighbors are decoded to ARGB, blended and encoded back.
pub(super) fn fill<E: Element>(
    texture: &SourceTexture<'_>,
    filter: bool,
    sampling: &SamplingState,
    origin: TilePoint,
    mut dst: Region<'_, E>,
) {
    let model = texture.model();
    let per_pixel = model.texel_len();
    let mut texel = Texel::new();
    let mut corner = Texel::new();

    walk(sampling, origin, &mut dst, per_pixel, |point, pixel| {
        if filter {
            model.encode_argb(filtered(texture, sampling, point, &mut corner), &mut texel);
        } else {
            texture.texel(point.x.pos, point.y.pos, &mut texel);
        }
        for (slot, value) in pixel.iter_mut().zip(&texel) {
            *slot = E::from_u32(*value);
        }
    });
}

/// Fill `dst` with bilinearly filtered, non-premultiplied ARGB words.
///
/// Used for sources whose model cannot hold blended colors, such as palettes.
pub(super) fn fill_argb(
    texture: &SourceTexture<'_>,
    sampling: &SamplingState,
    origin: TilePoint,
    mut dst: Region<'_, u32>,
) {
    let mut corner = Texel::new();
    walk(sampling, origin, &mut dst, 1, |point, pixel| {
        pixel[0] = filtered(texture, sampling, point, &mut corner);
    });
}

/// Step through `dst` in `per_pixel`-element chunks, calling `write` with the tile
/// position of each pixel.
fn walk<E>(
    sampling: &SamplingState,
    origin: TilePoint,
    dst: &mut Region<'_, E>,
    per_pixel: usize,
    mut write: impl FnMut(TilePoint, &mut [E]),
) {
    let (tile_width, tile_height) = (sampling.width(), sampling.height());
    let column_step = sampling.column_step();
    let row_step = sampling.row_step();
    let mut row_start = origin;

    for out in dst.rows_mut() {
        let mut point = row_start;
        for pixel in out.chunks_exact_mut(per_pixel) {
            write(point, pixel);
            point.advance(column_step, tile_width, tile_height);
        }
        row_start.advance(row_step, tile_width, tile_height);
    }
}

/// The blend of the four texels around `point`, in ARGB.
fn filtered(
    texture: &SourceTexture<'_>,
    sampling: &SamplingState,
    point: TilePoint,
    corner: &mut Texel,
) -> u32 {
    let model = texture.model();
    let (x, y) = (point.x.pos, point.y.pos);
    let (x1, y1) = (next(x, sampling.width()), next(y, sampling.height()));
    let samples = [(x, y), (x1, y), (x, y1), (x1, y1)].map(|(sx, sy)| {
        texture.texel(sx, sy, corner);
        model.decode_argb(corner)
    });
    blend(samples, point.x.err, point.y.err)
}
