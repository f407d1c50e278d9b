// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sampling geometry: the inverse paint transform reduced to fixed-point increments.
//!
//! Rather than applying the inverse transform to every device pixel, the position in
//! tile space is computed once at the start of each request. From there on, moving one
//! pixel to the right (or one row down) adds a constant displacement, represented as a
//! whole number of texels plus a 31-bit fraction. The fractions are accumulated like in a
//! digital differential analyzer: whenever the accumulator overflows, the carry moves the
//! position one more texel. All positions are kept inside `[0, width) x [0, height)`,
//! which is what makes the tiling infinite.

use crate::kurbo::{Affine, Point};

/// Number of fractional bits in a tile-space position.
pub const FRAC_BITS: u32 = 31;
/// The fixed-point representation of `1.0`.
pub const FRAC_ONE: u32 = 1 << FRAC_BITS;
/// Mask for the fractional part of an accumulator.
pub const FRAC_MASK: u32 = FRAC_ONE - 1;

/// Reduce `num` into `[0, den)`.
///
/// Negative values wrap around instead of being clamped. Tiny negative values whose
/// wrapped result would round up to `den` map to `0`.
pub(crate) fn wrap(num: f64, den: f64) -> f64 {
    if !num.is_finite() {
        return 0.0;
    }
    let mut num = num % den;
    if num < 0.0 {
        num += den;
        if num >= den {
            num = 0.0;
        }
    }
    num
}

/// The fractional part of a non-negative `value` in 1.31 fixed point.
#[expect(clippy::cast_possible_truncation, reason = "saturating float conversion")]
pub(crate) fn fract_fixed(value: f64) -> u32 {
    let scaled = (value.fract() * f64::from(FRAC_ONE)) as u32;
    scaled.min(FRAC_MASK)
}

/// A tile-space displacement: whole texels plus a 1.31 fixed-point fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Increment {
    /// Whole texels, always less than the tile dimension.
    pub whole: u32,
    /// Fractional texels in units of `2^-31`.
    pub frac: u32,
}

impl Increment {
    /// No movement.
    pub const ZERO: Self = Self { whole: 0, frac: 0 };

    #[expect(clippy::cast_possible_truncation, reason = "value is already wrapped")]
    fn from_wrapped(value: f64) -> Self {
        Self {
            whole: value as u32,
            frac: fract_fixed(value),
        }
    }
}

/// A position along one axis of the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// The texel index, always less than the tile dimension.
    pub pos: u32,
    /// The error accumulator in units of `2^-31`, always less than [`FRAC_ONE`].
    pub err: u32,
}

impl Cursor {
    #[expect(clippy::cast_possible_truncation, reason = "value is already wrapped")]
    fn from_wrapped(value: f64) -> Self {
        Self {
            pos: value as u32,
            err: fract_fixed(value),
        }
    }

    /// Move by `inc`, wrapping around at `period`.
    #[inline(always)]
    pub fn advance(&mut self, inc: Increment, period: u32) {
        // Both terms are below 2^31, so the sum cannot overflow a `u32`.
        self.err += inc.frac;
        if self.err >= FRAC_ONE {
            self.err &= FRAC_MASK;
            self.pos += 1;
        }
        // `pos + 1 + whole` is at most `2 * period - 1`, one subtraction suffices.
        self.pos += inc.whole;
        if self.pos >= period {
            self.pos -= period;
        }
    }

    /// The position as a floating point number of texels.
    pub fn position(self) -> f64 {
        f64::from(self.pos) + f64::from(self.err) / f64::from(FRAC_ONE)
    }
}

/// The displacement caused by one device-space step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Step {
    /// Horizontal displacement in tile space.
    pub x: Increment,
    /// Vertical displacement in tile space.
    pub y: Increment,
}

/// A position in tile space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TilePoint {
    /// Horizontal position.
    pub x: Cursor,
    /// Vertical position.
    pub y: Cursor,
}

impl TilePoint {
    /// Move by `step` inside a tile of the given size.
    #[inline(always)]
    pub fn advance(&mut self, step: Step, width: u32, height: u32) {
        self.x.advance(step.x, width);
        self.y.advance(step.y, height);
    }
}

/// The per-context sampling state derived from a device-to-tile transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingState {
    width: u32,
    height: u32,
    inverse: Affine,
    reduced: [f64; 6],
    column: Step,
    row: Step,
    degenerate: bool,
}

impl SamplingState {
    /// Derive the sampling state for a tile of `width x height` texels.
    ///
    /// `transform` maps tile space to device space. If it is not invertible, every
    /// device pixel samples the texel at the tile origin instead.
    pub fn new(transform: Affine, width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0, "tile must not be empty");

        let (inverse, degenerate) = match invert(transform) {
            Some(inverse) => (inverse, false),
            None => {
                log::warn!(
                    "paint transform {:?} is not invertible, sampling a single texel",
                    transform.as_coeffs()
                );
                (Affine::scale(0.0), true)
            }
        };

        let w = f64::from(width);
        let h = f64::from(height);
        let [a, b, c, d, e, f] = inverse.as_coeffs();
        let reduced = [
            wrap(a, w),
            wrap(b, h),
            wrap(c, w),
            wrap(d, h),
            wrap(e, w),
            wrap(f, h),
        ];

        let column = Step {
            x: Increment::from_wrapped(reduced[0]),
            y: Increment::from_wrapped(reduced[1]),
        };
        let row = Step {
            x: Increment::from_wrapped(reduced[2]),
            y: Increment::from_wrapped(reduced[3]),
        };

        Self {
            width,
            height,
            inverse,
            reduced,
            column,
            row,
            degenerate,
        }
    }

    /// The tile width in texels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The tile height in texels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The device-to-tile transform (zero scale if the paint transform was singular).
    pub fn inverse(&self) -> Affine {
        self.inverse
    }

    /// The coefficients of [`inverse`](Self::inverse), reduced modulo the tile size.
    ///
    /// Coefficients contributing to x are reduced modulo the width, those contributing
    /// to y modulo the height.
    pub fn reduced_coeffs(&self) -> [f64; 6] {
        self.reduced
    }

    /// Whether the paint transform was singular.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// The displacement for one step to the right in device space.
    pub fn column_step(&self) -> Step {
        self.column
    }

    /// The displacement for one step down in device space.
    pub fn row_step(&self) -> Step {
        self.row
    }

    /// Whether moving one device pixel right moves exactly one texel right and
    /// nothing else, allowing rows to be copied as whole runs.
    pub fn is_unit_column_step(&self) -> bool {
        self.column
            == Step {
                x: Increment { whole: 1, frac: 0 },
                y: Increment::ZERO,
            }
    }

    /// The wrapped tile-space position of device pixel `(x, y)`, computed directly.
    pub fn origin(&self, x: i32, y: i32) -> TilePoint {
        let (tx, ty) = self.wrapped_position(f64::from(x), f64::from(y));
        TilePoint {
            x: Cursor::from_wrapped(tx),
            y: Cursor::from_wrapped(ty),
        }
    }

    /// The wrapped tile-space position of an arbitrary device-space point.
    pub fn tile_point(&self, device: Point) -> Point {
        let p = self.inverse * device;
        Point::new(
            wrap(p.x, f64::from(self.width)),
            wrap(p.y, f64::from(self.height)),
        )
    }

    // Only valid for integer positions: the reduced coefficients are congruent to the
    // real ones modulo the tile size, but their fractional multiples are not.
    fn wrapped_position(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.reduced;
        (
            wrap(e + x * a + y * c, f64::from(self.width)),
            wrap(f + x * b + y * d, f64::from(self.height)),
        )
    }
}

fn invert(transform: Affine) -> Option<Affine> {
    let det = transform.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let inverse = transform.inverse();
    inverse.is_finite().then_some(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapped_distance(a: f64, b: f64, period: f64) -> f64 {
        let d = (a - b).rem_euclid(period);
        d.min(period - d)
    }

    #[test]
    fn wrap_handles_negative_values() {
        assert_eq!(wrap(-1.0, 17.0), 16.0);
        assert_eq!(wrap(-17.0, 17.0), 0.0);
        assert_eq!(wrap(35.5, 17.0), 1.5);
        assert_eq!(wrap(-1.0e-20, 17.0), 0.0);
        assert_eq!(wrap(f64::NAN, 17.0), 0.0);
    }

    #[test]
    fn fraction_scale() {
        assert_eq!(fract_fixed(0.5), 1 << 30);
        assert_eq!(fract_fixed(3.25), 1 << 29);
        assert_eq!(fract_fixed(0.0), 0);
        assert!(fract_fixed(1.0 - f64::EPSILON) <= FRAC_MASK);
    }

    #[test]
    fn cursor_carries_fraction() {
        let mut cursor = Cursor {
            pos: 16,
            err: 3 << 29,
        };
        cursor.advance(Increment { whole: 0, frac: 1 << 30 }, 17);
        assert_eq!(cursor, Cursor { pos: 0, err: 1 << 29 });

        cursor.advance(Increment { whole: 16, frac: 0 }, 17);
        assert_eq!(cursor, Cursor { pos: 16, err: 1 << 29 });
    }

    #[test]
    fn increments_stay_inside_the_tile() {
        let transform = Affine::new([-3.5, 40.25, 19.0, -0.75, -1000.0, 3.0]);
        let state = SamplingState::new(transform, 17, 13);
        for step in [state.column_step(), state.row_step()] {
            assert!(step.x.whole < 17 && step.x.frac < FRAC_ONE);
            assert!(step.y.whole < 13 && step.y.frac < FRAC_ONE);
        }
        let origin = state.origin(-123_456, 98_765);
        assert!(origin.x.pos < 17 && origin.y.pos < 13);
    }

    #[test]
    fn identity_is_a_unit_step() {
        let state = SamplingState::new(Affine::IDENTITY, 17, 13);
        assert!(state.is_unit_column_step());
        assert_eq!(state.row_step().y, Increment { whole: 1, frac: 0 });
        assert_eq!(state.origin(18, -1).x.pos, 1);
        assert_eq!(state.origin(18, -1).y.pos, 12);
    }

    #[test]
    fn fractional_points_use_the_full_inverse() {
        let state = SamplingState::new(Affine::scale(0.2), 3, 3);
        let p = state.tile_point(Point::new(0.5, 0.0));
        assert!((p.x - 2.5).abs() < 1.0e-9 && p.y == 0.0, "{p:?}");

        let p = state.tile_point(Point::new(1.25, -0.5));
        assert!((p.x - 0.25).abs() < 1.0e-9, "{p:?}");
        assert!((p.y - 0.5).abs() < 1.0e-9, "{p:?}");

        // Integer points agree with the reduced evaluation.
        let direct = state.tile_point(Point::new(4.0, -2.0));
        let origin = state.origin(4, -2);
        assert!((direct.x - origin.x.position()).abs() < 1.0e-6);
        assert!((direct.y - origin.y.position()).abs() < 1.0e-6);
    }

    #[test]
    fn singular_transform_degenerates() {
        let state = SamplingState::new(Affine::scale_non_uniform(2.0, 0.0), 8, 8);
        assert!(state.is_degenerate());
        assert_eq!(state.column_step(), Step::default());
        assert_eq!(state.row_step(), Step::default());
        assert_eq!(state.origin(1234, -99), TilePoint::default());
    }

    #[test]
    fn stepping_matches_direct_evaluation() {
        let (w, h) = (17, 13);
        let transform = Affine::translate((3.25, -7.5))
            * Affine::rotate(0.3)
            * Affine::scale_non_uniform(1.7, 0.6);
        let state = SamplingState::new(transform, w, h);

        let mut point = state.origin(-40, 25);
        for n in 1..=10_000 {
            point.advance(state.column_step(), w, h);
            if n % 250 == 0 {
                let fresh = state.origin(-40 + n, 25);
                let dx = wrapped_distance(point.x.position(), fresh.x.position(), f64::from(w));
                let dy = wrapped_distance(point.y.position(), fresh.y.position(), f64::from(h));
                assert!(dx < 1.0e-5 && dy < 1.0e-5, "drift after {n} steps: {dx}, {dy}");
            }
        }

        let mut point = state.origin(7, 0);
        for n in 1..=10_000 {
            point.advance(state.row_step(), w, h);
            if n % 250 == 0 {
                let fresh = state.tile_point(Point::new(7.0, f64::from(n)));
                let dx = wrapped_distance(point.x.position(), fresh.x, f64::from(w));
                let dy = wrapped_distance(point.y.position(), fresh.y, f64::from(h));
                assert!(dx < 1.0e-5 && dy < 1.0e-5, "drift after {n} rows: {dx}, {dy}");
            }
        }
    }
}
