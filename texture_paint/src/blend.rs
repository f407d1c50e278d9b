// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bilinear blending of four packed samples with fixed-point weights.

use crate::geometry::FRAC_BITS;
use static_assertions::const_assert;

/// Precision of the interpolation weights.
pub const WEIGHT_BITS: u32 = 12;
const WEIGHT_ONE: u32 = 1 << WEIGHT_BITS;
const PRODUCT_BITS: u32 = 2 * WEIGHT_BITS;
const ROUND: u32 = 1 << (PRODUCT_BITS - 1);

// A full channel times the sum of all weights, plus rounding, must fit the accumulator.
const_assert!(255 * (1_u64 << PRODUCT_BITS) + (1_u64 << (PRODUCT_BITS - 1)) <= u32::MAX as u64);
const_assert!(WEIGHT_BITS <= FRAC_BITS);

/// Blend four samples bilinearly.
///
/// `samples` are the texels at `(x, y)`, `(x + 1, y)`, `(x, y + 1)` and `(x + 1, y + 1)`,
/// and `x_frac`/`y_frac` are the 1.31 fixed-point offsets of the sample point from
/// `(x, y)`. Each of the four byte lanes is blended independently, so the result is
/// meaningful for any packing that keeps one channel per byte.
///
/// The weights are truncated to [`WEIGHT_BITS`] before use and each lane is rounded
/// half up.
#[inline(always)]
pub fn blend(samples: [u32; 4], x_frac: u32, y_frac: u32) -> u32 {
    debug_assert!(x_frac >> FRAC_BITS == 0 && y_frac >> FRAC_BITS == 0);

    let x = x_frac >> (FRAC_BITS - WEIGHT_BITS);
    let y = y_frac >> (FRAC_BITS - WEIGHT_BITS);
    let weights = [
        (WEIGHT_ONE - x) * (WEIGHT_ONE - y),
        x * (WEIGHT_ONE - y),
        (WEIGHT_ONE - x) * y,
        x * y,
    ];

    let mut acc = [0_u32; 4];
    for (sample, weight) in samples.into_iter().zip(weights) {
        if weight == 0 {
            continue;
        }
        for (lane, sum) in acc.iter_mut().enumerate() {
            *sum += ((sample >> (lane * 8)) & 0xff) * weight;
        }
    }

    acc.into_iter()
        .enumerate()
        .fold(0, |out, (lane, sum)| out | (((sum + ROUND) >> PRODUCT_BITS) << (lane * 8)))
}
