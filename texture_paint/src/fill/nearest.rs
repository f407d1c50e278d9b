// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest-neighbor filling for single-element texels (packed words or index bytes).

use super::Region;
use crate::geometry::{SamplingState, TilePoint};
use crate::texture::TileView;

/// Fill the top-left `width x height` pixels of `dst` with the texel under each pixel.
pub(super) fn fill<T: Copy>(
    src: TileView<'_, T>,
    sampling: &SamplingState,
    origin: TilePoint,
    dst: Region<'_, T>,
) {
    if sampling.is_unit_column_step() {
        fill_runs(src, sampling, origin, dst);
    } else {
        fill_per_pixel(src, sampling, origin, dst);
    }
}

/// The fast path: every output row is a wrapped run of one tile row, so it is
/// assembled from block copies.
fn fill_runs<T: Copy>(
    src: TileView<'_, T>,
    sampling: &SamplingState,
    origin: TilePoint,
    mut dst: Region<'_, T>,
) {
    let row_step = sampling.row_step();
    let mut row_start = origin;

    for out in dst.rows_mut() {
        copy_wrapped(src.row(row_start.y.pos), row_start.x.pos as usize, out);
        row_start.advance(row_step, sampling.width(), sampling.height());
    }
}

/// Fill `out` from `row`, starting at `start` and wrapping to the row start as often
/// as needed.
fn copy_wrapped<T: Copy>(row: &[T], start: usize, out: &mut [T]) {
    let mut x = start;
    let mut rest = out;
    while !rest.is_empty() {
        let n = (row.len() - x).min(rest.len());
        let (head, tail) = rest.split_at_mut(n);
        head.copy_from_slice(&row[x..x + n]);
        rest = tail;
        x = 0;
    }
}

/// The general path, stepping through tile space pixel by pixel.
fn fill_per_pixel<T: Copy>(
    src: TileView<'_, T>,
    sampling: &SamplingState,
    origin: TilePoint,
    mut dst: Region<'_, T>,
) {
    let (tile_width, tile_height) = (sampling.width(), sampling.height());
    let column_step = sampling.column_step();
    let row_step = sampling.row_step();
    let mut row_start = origin;

    for out in dst.rows_mut() {
        let mut point = row_start;
        for pixel in out {
            *pixel = src.row(point.y.pos)[point.x.pos as usize];
            point.advance(column_step, tile_width, tile_height);
        }
        row_start.advance(row_step, tile_width, tile_height);
    }
}
