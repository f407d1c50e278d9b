// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions shared across different tests.

use std::sync::Arc;
use texture_paint::kurbo::{Affine, Rect};
use texture_paint::{
    ContextSettings, PoolSettings, RasterPool, SamplingState, SourceTexture, TexturePaintContext,
};

pub(crate) const RED: u32 = 0xffff_0000;
pub(crate) const GREEN: u32 = 0xff00_ff00;
pub(crate) const BLUE: u32 = 0xff00_00ff;
pub(crate) const WHITE: u32 = 0xffff_ffff;

/// A 2x2 tile: red and green on top, blue and white below.
pub(crate) const CHECKER: [u32; 4] = [RED, GREEN, BLUE, WHITE];

/// A device-space region: `(x, y, width, height)`.
pub(crate) type Region = (i32, i32, u32, u32);

/// Opaque colors that differ between neighboring texels.
pub(crate) fn pattern(width: u32, height: u32) -> Vec<u32> {
    (0..width * height)
        .map(|i| 0xff00_0000 | (i.wrapping_mul(0x9e37_79b9) >> 8))
        .collect()
}

/// A pool that is not shared with other tests, so its statistics are meaningful.
pub(crate) fn private_pool() -> Arc<RasterPool> {
    Arc::new(RasterPool::new(PoolSettings::default()))
}

pub(crate) fn settings(filter: bool, pool: &Arc<RasterPool>) -> ContextSettings {
    ContextSettings {
        pool: Some(pool.clone()),
        ..ContextSettings::filtered(filter)
    }
}

/// Render `region` through a fresh context and decode it to ARGB.
pub(crate) fn render(
    texture: &SourceTexture<'_>,
    transform: Affine,
    filter: bool,
    region: Region,
) -> Vec<u32> {
    let pool = private_pool();
    let mut ctx =
        TexturePaintContext::new(texture.clone(), transform, Rect::ZERO, settings(filter, &pool));
    decode(&mut ctx, region)
}

/// Request `region` from `ctx` and decode it to ARGB.
pub(crate) fn decode(ctx: &mut TexturePaintContext<'_>, (x, y, w, h): Region) -> Vec<u32> {
    let model = ctx.output_color_model().clone();
    ctx.raster(x, y, w, h).unwrap().to_argb_vec(w, h, &model)
}

/// Nearest-neighbor sampling that evaluates the inverse transform afresh for every pixel.
pub(crate) fn reference_nearest(
    texture: &SourceTexture<'_>,
    transform: Affine,
    (x, y, w, h): Region,
) -> Vec<u32> {
    let sampling = SamplingState::new(transform, texture.width(), texture.height());
    let mut out = Vec::with_capacity((w * h) as usize);
    for j in 0..h as i32 {
        for i in 0..w as i32 {
            let point = sampling.origin(x + i, y + j);
            out.push(texture.argb(point.x.pos, point.y.pos));
        }
    }
    out
}
