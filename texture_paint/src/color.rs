// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color models: how a raw pixel maps to and from a non-premultiplied ARGB value.
//!
//! All ARGB values in this crate are packed as `0xAARRGGBB` in a [`u32`].

use crate::error::{Error, Result};
use core::fmt::Debug;
use smallvec::SmallVec;
use std::sync::Arc;

/// An opaque pixel value: the raw storage elements of one pixel.
///
/// Byte storage widens each element to a `u32`.
pub type Texel = SmallVec<[u32; 4]>;

/// Fully opaque alpha in ARGB.
pub(crate) const OPAQUE_ALPHA: u32 = 0xff00_0000;

/// The abstract pixel-access protocol for caller-defined pixel formats.
///
/// Textures described by a [`ColorModel::Custom`] are always rendered by the generic
/// filler, which reads texels element by element and uses this trait to convert them.
pub trait PixelCodec: Debug + Send + Sync {
    /// The number of storage elements making up one texel.
    fn texel_len(&self) -> usize;

    /// Convert a texel (exactly [`texel_len`](Self::texel_len) elements) to ARGB.
    fn decode_argb(&self, texel: &[u32]) -> u32;

    /// Convert an ARGB value to a texel, replacing the contents of `texel`.
    fn encode_argb(&self, argb: u32, texel: &mut Texel);

    /// Whether every decoded color has full alpha.
    fn is_opaque(&self) -> bool {
        false
    }
}

/// Channel masks of a direct color model packed into one 32-bit element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectMasks {
    /// The alpha mask. Zero means the model is opaque.
    pub alpha: u32,
    /// The red mask.
    pub red: u32,
    /// The green mask.
    pub green: u32,
    /// The blue mask.
    pub blue: u32,
}

impl DirectMasks {
    /// `0xAARRGGBB`.
    pub const ARGB: Self = Self {
        alpha: 0xff00_0000,
        red: 0x00ff_0000,
        green: 0x0000_ff00,
        blue: 0x0000_00ff,
    };
    /// `0x__RRGGBB`, the top byte is ignored.
    pub const XRGB: Self = Self {
        alpha: 0,
        red: 0x00ff_0000,
        green: 0x0000_ff00,
        blue: 0x0000_00ff,
    };
    /// `0xAABBGGRR`.
    pub const ABGR: Self = Self {
        alpha: 0xff00_0000,
        red: 0x0000_00ff,
        green: 0x0000_ff00,
        blue: 0x00ff_0000,
    };
    /// 5-6-5 RGB in the low 16 bits.
    pub const RGB565: Self = Self {
        alpha: 0,
        red: 0xf800,
        green: 0x07e0,
        blue: 0x001f,
    };

    /// Create validated masks.
    ///
    /// Every color mask must be a non-empty contiguous run of bits, the alpha mask is
    /// either zero or contiguous, and no two masks may overlap.
    pub fn new(alpha: u32, red: u32, green: u32, blue: u32) -> Result<Self> {
        let masks = Self {
            alpha,
            red,
            green,
            blue,
        };
        let contiguous = [red, green, blue].into_iter().all(is_contiguous)
            && (alpha == 0 || is_contiguous(alpha));
        let disjoint = alpha & red == 0
            && alpha & green == 0
            && alpha & blue == 0
            && red & green == 0
            && red & blue == 0
            && green & blue == 0;

        if contiguous && disjoint {
            Ok(masks)
        } else {
            Err(Error::InvalidMasks {
                alpha,
                red,
                green,
                blue,
            })
        }
    }

    /// Whether each channel occupies exactly one byte lane (alpha may be absent).
    ///
    /// Bilinear blending works lane by lane, so only such layouts can be
    /// filtered without decoding.
    pub fn is_byte_aligned(&self) -> bool {
        fn byte_lane(mask: u32) -> bool {
            matches!(mask, 0xff | 0xff00 | 0x00ff_0000 | 0xff00_0000)
        }

        (self.alpha == 0 || byte_lane(self.alpha))
            && byte_lane(self.red)
            && byte_lane(self.green)
            && byte_lane(self.blue)
    }

    /// Whether the model carries no alpha channel.
    pub fn is_opaque(&self) -> bool {
        self.alpha == 0
    }

    /// Decode a packed element to ARGB.
    pub fn decode(&self, word: u32) -> u32 {
        let a = if self.alpha == 0 {
            0xff
        } else {
            extract(word, self.alpha)
        };

        (a << 24)
            | (extract(word, self.red) << 16)
            | (extract(word, self.green) << 8)
            | extract(word, self.blue)
    }

    /// Encode an ARGB value as a packed element.
    pub fn encode(&self, argb: u32) -> u32 {
        let mut word = insert(argb & 0xff, self.blue)
            | insert((argb >> 8) & 0xff, self.green)
            | insert((argb >> 16) & 0xff, self.red);
        if self.alpha != 0 {
            word |= insert(argb >> 24, self.alpha);
        }
        word
    }
}

fn is_contiguous(mask: u32) -> bool {
    if mask == 0 {
        return false;
    }
    let shifted = mask >> mask.trailing_zeros();
    shifted & shifted.wrapping_add(1) == 0
}

/// Extract the channel under `mask`, scaled to 8 bits with rounding.
#[expect(clippy::cast_possible_truncation, reason = "results never exceed the mask width")]
fn extract(word: u32, mask: u32) -> u32 {
    let bits = mask.count_ones();
    let value = (word & mask) >> mask.trailing_zeros();
    if bits == 8 {
        return value;
    }
    let max = (1_u64 << bits) - 1;

    ((u64::from(value) * 255 + max / 2) / max) as u32
}

/// Scale an 8-bit channel to the width of `mask` and shift it into place.
#[expect(clippy::cast_possible_truncation, reason = "results never exceed the mask width")]
fn insert(channel: u32, mask: u32) -> u32 {
    let bits = mask.count_ones();
    let value = if bits == 8 {
        channel
    } else {
        let max = (1_u64 << bits) - 1;
        ((u64::from(channel) * max + 127) / 255) as u32
    };

    (value << mask.trailing_zeros()) & mask
}

/// A color lookup table of ARGB entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Arc<[u32]>,
    opaque: bool,
}

impl Palette {
    /// The largest supported palette.
    pub const MAX_LEN: usize = 1 << 16;

    /// Create a palette from ARGB entries.
    pub fn new(entries: impl Into<Arc<[u32]>>) -> Result<Self> {
        let entries = entries.into();
        if entries.is_empty() || entries.len() > Self::MAX_LEN {
            return Err(Error::InvalidPalette(entries.len()));
        }
        let opaque = entries.iter().all(|e| e & OPAQUE_ALPHA == OPAQUE_ALPHA);

        Ok(Self { entries, opaque })
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false, palettes have at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The ARGB entries.
    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    /// Whether every entry has full alpha.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Look up an index. Indices past the end resolve to transparent black.
    #[inline(always)]
    pub fn get(&self, index: u32) -> u32 {
        self.entries.get(index as usize).copied().unwrap_or(0)
    }

    /// A 256-entry lookup table for byte indices, padded with transparent black.
    pub fn lut256(&self) -> Box<[u32; 256]> {
        let mut lut = Box::new([0_u32; 256]);
        for (slot, entry) in lut.iter_mut().zip(self.entries.iter()) {
            *slot = *entry;
        }
        lut
    }

    /// The index of the entry closest to `argb` (squared distance over all four
    /// channels, lowest index wins ties).
    #[expect(clippy::cast_possible_truncation, reason = "palettes have at most 2^16 entries")]
    pub fn nearest(&self, argb: u32) -> u32 {
        let distance = |entry: u32| -> u32 {
            (0..4_u32)
                .map(|lane| {
                    let shift = lane * 8;
                    let d = ((entry >> shift) & 0xff).abs_diff((argb >> shift) & 0xff);
                    d * d
                })
                .sum()
        };

        let mut best = 0;
        let mut best_distance = u32::MAX;
        for (index, entry) in self.entries.iter().enumerate() {
            let d = distance(*entry);
            if d < best_distance {
                best = index;
                best_distance = d;
                if d == 0 {
                    break;
                }
            }
        }

        best as u32
    }
}

/// Interleaved 8-bit component layouts, one storage element per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    /// A single luminance component.
    Gray,
    /// Red, green, blue.
    Rgb,
    /// Blue, green, red.
    Bgr,
    /// Red, green, blue, alpha.
    Rgba,
    /// Alpha, blue, green, red.
    Abgr,
}

impl ChannelOrder {
    /// The number of components per pixel.
    pub fn components(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Abgr => 4,
        }
    }

    /// Whether the layout has no alpha component.
    pub fn is_opaque(self) -> bool {
        matches!(self, Self::Gray | Self::Rgb | Self::Bgr)
    }

    fn decode(self, texel: &[u32]) -> u32 {
        let c = |i: usize| texel[i] & 0xff;
        let (a, r, g, b) = match self {
            Self::Gray => (0xff, c(0), c(0), c(0)),
            Self::Rgb => (0xff, c(0), c(1), c(2)),
            Self::Bgr => (0xff, c(2), c(1), c(0)),
            Self::Rgba => (c(3), c(0), c(1), c(2)),
            Self::Abgr => (c(0), c(3), c(2), c(1)),
        };
        (a << 24) | (r << 16) | (g << 8) | b
    }

    fn encode(self, argb: u32, texel: &mut Texel) {
        let a = argb >> 24;
        let r = (argb >> 16) & 0xff;
        let g = (argb >> 8) & 0xff;
        let b = argb & 0xff;
        texel.clear();
        match self {
            // Rec. 601 luma in 8.8 fixed point.
            Self::Gray => texel.push((77 * r + 150 * g + 29 * b + 128) >> 8),
            Self::Rgb => texel.extend_from_slice(&[r, g, b]),
            Self::Bgr => texel.extend_from_slice(&[b, g, r]),
            Self::Rgba => texel.extend_from_slice(&[r, g, b, a]),
            Self::Abgr => texel.extend_from_slice(&[a, b, g, r]),
        }
    }
}

/// Describes how the pixels of a texture or output raster are interpreted.
#[derive(Debug, Clone)]
pub enum ColorModel {
    /// Packed direct color in one 32-bit element.
    Direct(DirectMasks),
    /// One element holding an index into a palette.
    Indexed(Palette),
    /// One 8-bit component per element.
    Interleaved(ChannelOrder),
    /// A caller-defined pixel format.
    Custom(Arc<dyn PixelCodec>),
}

impl ColorModel {
    /// Packed `0xAARRGGBB`.
    pub const ARGB: Self = Self::Direct(DirectMasks::ARGB);
    /// Packed `0x__RRGGBB`.
    pub const XRGB: Self = Self::Direct(DirectMasks::XRGB);

    /// A short name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct(_) => "direct",
            Self::Indexed(_) => "indexed",
            Self::Interleaved(_) => "interleaved",
            Self::Custom(_) => "custom",
        }
    }

    /// The number of storage elements per texel.
    pub fn texel_len(&self) -> usize {
        match self {
            Self::Direct(_) | Self::Indexed(_) => 1,
            Self::Interleaved(order) => order.components(),
            Self::Custom(codec) => codec.texel_len(),
        }
    }

    /// Whether every decoded color has full alpha.
    pub fn is_opaque(&self) -> bool {
        match self {
            Self::Direct(masks) => masks.is_opaque(),
            Self::Indexed(palette) => palette.is_opaque(),
            Self::Interleaved(order) => order.is_opaque(),
            Self::Custom(codec) => codec.is_opaque(),
        }
    }

    /// Convert a texel to ARGB.
    pub fn decode_argb(&self, texel: &[u32]) -> u32 {
        match self {
            Self::Direct(masks) => masks.decode(texel[0]),
            Self::Indexed(palette) => palette.get(texel[0]),
            Self::Interleaved(order) => order.decode(texel),
            Self::Custom(codec) => codec.decode_argb(texel),
        }
    }

    /// Convert an ARGB value to a texel, replacing the contents of `texel`.
    pub fn encode_argb(&self, argb: u32, texel: &mut Texel) {
        match self {
            Self::Direct(masks) => {
                texel.clear();
                texel.push(masks.encode(argb));
            }
            Self::Indexed(palette) => {
                texel.clear();
                texel.push(palette.nearest(argb));
            }
            Self::Interleaved(order) => order.encode(argb, texel),
            Self::Custom(codec) => codec.encode_argb(argb, texel),
        }
    }
}

impl PartialEq for ColorModel {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Direct(a), Self::Direct(b)) => a == b,
            (Self::Indexed(a), Self::Indexed(b)) => a == b,
            (Self::Interleaved(a), Self::Interleaved(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_aligned_masks() {
        assert!(DirectMasks::ARGB.is_byte_aligned());
        assert!(DirectMasks::XRGB.is_byte_aligned());
        assert!(DirectMasks::ABGR.is_byte_aligned());
        assert!(!DirectMasks::RGB565.is_byte_aligned());
    }

    #[test]
    fn rejects_overlapping_masks() {
        assert!(DirectMasks::new(0, 0xff00, 0x0ff0, 0xff).is_err());
        assert!(DirectMasks::new(0, 0xf0f0, 0x0f00, 0xf).is_err());
        assert!(DirectMasks::new(0, 0, 0xff00, 0xff).is_err());
        assert_eq!(
            DirectMasks::new(0, 0xf800, 0x07e0, 0x001f),
            Ok(DirectMasks::RGB565)
        );
    }

    #[test]
    fn rgb565_extremes() {
        let masks = DirectMasks::RGB565;
        assert_eq!(masks.decode(0xffff), 0xffff_ffff);
        assert_eq!(masks.decode(0xf800), 0xffff_0000);
        assert_eq!(masks.encode(0xff00_ff00), 0x07e0);
        assert_eq!(masks.decode(masks.encode(0xff84_8284)), 0xff84_8284);
    }

    #[test]
    fn abgr_swaps_red_and_blue() {
        assert_eq!(DirectMasks::ABGR.decode(0x8011_2233), 0x8033_2211);
        assert_eq!(DirectMasks::ABGR.encode(0x8033_2211), 0x8011_2233);
    }

    #[test]
    fn palette_lookup_and_nearest() {
        let palette = Palette::new(vec![0xff00_0000, 0xffff_0000, 0x00ff_ffff]).unwrap();
        assert!(!palette.is_opaque());
        assert_eq!(palette.get(1), 0xffff_0000);
        assert_eq!(palette.get(7), 0);
        assert_eq!(palette.nearest(0xfff0_1010), 1);
        assert_eq!(palette.lut256()[2], 0x00ff_ffff);
        assert_eq!(palette.lut256()[3], 0);
    }

    #[test]
    fn palette_length_is_checked() {
        assert_eq!(Palette::new(vec![]), Err(Error::InvalidPalette(0)));
        assert!(Palette::new(vec![0; Palette::MAX_LEN + 1]).is_err());
    }

    #[test]
    fn interleaved_orders() {
        let model = ColorModel::Interleaved(ChannelOrder::Bgr);
        assert_eq!(model.decode_argb(&[1, 2, 3]), 0xff03_0201);
        let mut texel = Texel::new();
        model.encode_argb(0xff03_0201, &mut texel);
        assert_eq!(texel.as_slice(), &[1, 2, 3]);

        let model = ColorModel::Interleaved(ChannelOrder::Abgr);
        assert_eq!(model.decode_argb(&[0x80, 1, 2, 3]), 0x8003_0201);
        assert!(!model.is_opaque());
    }
}
