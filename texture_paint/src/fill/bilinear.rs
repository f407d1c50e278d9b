// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bilinear filtering of single-element texels that resolve to a packed color.

use super::{Region, next};
use crate::blend::blend;
use crate::geometry::{SamplingState, TilePoint};
use crate::texture::TileView;

/// Fill `dst` with the bilinear blend of the four texels around each sample point.
///
/// `resolve` maps a stored element to the packed color that is blended, the identity
/// for packed sources and a palette lookup for indexed ones. Neighbors past the last
/// row or column wrap around to the first one.
pub(super) fn fill<T: Copy>(
    src: TileView<'_, T>,
    resolve: impl Fn(T) -> u32,
    sampling: &SamplingState,
    origin: TilePoint,
    mut dst: Region<'_, u32>,
) {
    let (tile_width, tile_height) = (sampling.width(), sampling.height());
    let column_step = sampling.column_step();
    let row_step = sampling.row_step();
    let mut row_start = origin;

    for out in dst.rows_mut() {
        let mut point = row_start;
        for pixel in out {
            let x0 = point.x.pos as usize;
            let x1 = next(point.x.pos, tile_width) as usize;
            let top = src.row(point.y.pos);
            let bottom = src.row(next(point.y.pos, tile_height));

            let samples = [
                resolve(top[x0]),
                resolve(top[x1]),
                resolve(bottom[x0]),
                resolve(bottom[x1]),
            ];
            *pixel = blend(samples, point.x.err, point.y.err);
            point.advance(column_step, tile_width, tile_height);
        }
        row_start.advance(row_step, tile_width, tile_height);
    }
}
