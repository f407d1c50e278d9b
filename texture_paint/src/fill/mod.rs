// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fillers: the per-format loops that write sampled texels into an output raster.
//!
//! A filler is chosen once per context from the source storage, its color model and
//! the filter request. The specialized fillers operate directly on one-element texels;
//! everything else goes through the color model.

mod bilinear;
mod generic;
mod nearest;

use crate::color::ColorModel;
use crate::context::PreferredFormat;
use crate::geometry::{SamplingState, TilePoint};
use crate::raster::{OutputRaster, RasterFormat, StorageMut};
use crate::texture::{SourceTexture, TexelData, TileView};

/// The filling strategy chosen for a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillerKind {
    /// Packed direct-color texels, nearest neighbor.
    Packed,
    /// Packed direct-color texels with byte-aligned channels, bilinear.
    PackedFilter,
    /// Palette indices copied unchanged.
    Indexed,
    /// Palette indices resolved through a lookup table and blended.
    IndexedFilter,
    /// Any layout, through the color model, nearest neighbor.
    Generic,
    /// Any layout, through the color model, bilinear.
    GenericFilter,
}

#[derive(Debug)]
pub(crate) enum Filler<'a> {
    Packed { src: TileView<'a, u32>, filter: bool },
    Indexed { src: TileView<'a, u8> },
    IndexedFilter { src: TileView<'a, u8>, lut: Box<[u32; 256]> },
    Generic { filter: bool },
    /// Filtered through the color model into ARGB words.
    GenericArgb,
}

/// The outcome of filler selection.
#[derive(Debug)]
pub(crate) struct Selection<'a> {
    pub(crate) filler: Filler<'a>,
    pub(crate) format: RasterFormat,
    pub(crate) model: ColorModel,
}

impl<'a> Filler<'a> {
    /// Pick the filler for `texture`, along with the format and color model of the
    /// rasters it produces.
    pub(crate) fn select(
        texture: &SourceTexture<'a>,
        filter: bool,
        preferred: Option<PreferredFormat>,
    ) -> Selection<'a> {
        let model = texture.model();
        let selection = match model {
            ColorModel::Direct(masks) => match texture.words() {
                Some(src) if !filter || masks.is_byte_aligned() => Selection {
                    filler: Self::Packed { src, filter },
                    format: RasterFormat::PACKED,
                    model: model.clone(),
                },
                _ => Self::generic(texture, filter),
            },
            ColorModel::Indexed(palette) => match texture.bytes() {
                Some(src) if !filter => Selection {
                    filler: Self::Indexed { src },
                    format: RasterFormat::INDEXED,
                    model: model.clone(),
                },
                Some(src) if palette.len() <= 256 => Selection {
                    filler: Self::IndexedFilter {
                        src,
                        lut: palette.lut256(),
                    },
                    format: RasterFormat::PACKED,
                    model: blended_model(palette.is_opaque(), preferred),
                },
                // Blends rarely match a palette entry, so filtered output is ARGB.
                _ if filter => Selection {
                    filler: Self::GenericArgb,
                    format: RasterFormat::PACKED,
                    model: blended_model(palette.is_opaque(), preferred),
                },
                _ => Self::generic(texture, filter),
            },
            ColorModel::Interleaved(_) | ColorModel::Custom(_) => Self::generic(texture, filter),
        };

        log::debug!(
            "{:?} filler for a {}x{} {} texture, output {:?}",
            selection.filler.kind(),
            texture.width(),
            texture.height(),
            model.name(),
            selection.format
        );
        selection
    }

    fn generic(texture: &SourceTexture<'a>, filter: bool) -> Selection<'a> {
        let per_pixel = u8::try_from(texture.model().texel_len()).unwrap_or(u8::MAX);
        let format = match texture.data() {
            TexelData::Words(_) => RasterFormat::Words { per_pixel },
            TexelData::Bytes(_) => RasterFormat::Bytes { per_pixel },
        };
        Selection {
            filler: Self::Generic { filter },
            format,
            model: texture.model().clone(),
        }
    }

    /// The public name of this filler.
    pub(crate) fn kind(&self) -> FillerKind {
        match self {
            Self::Packed { filter: false, .. } => FillerKind::Packed,
            Self::Packed { filter: true, .. } => FillerKind::PackedFilter,
            Self::Indexed { .. } => FillerKind::Indexed,
            Self::IndexedFilter { .. } => FillerKind::IndexedFilter,
            Self::Generic { filter: false } => FillerKind::Generic,
            Self::Generic { filter: true } | Self::GenericArgb => FillerKind::GenericFilter,
        }
    }

    /// Fill the top-left `width x height` pixels of `raster`, whose top-left pixel
    /// samples `origin`.
    ///
    /// # Panics
    ///
    /// Panics if the raster does not have the format chosen by [`Filler::select`] or
    /// is smaller than the region.
    pub(crate) fn fill(
        &self,
        texture: &SourceTexture<'_>,
        sampling: &SamplingState,
        origin: TilePoint,
        raster: &mut OutputRaster,
        width: u32,
        height: u32,
    ) {
        assert!(raster.fits(width, height), "region exceeds the raster");
        let stride = raster.row_stride();
        let row_len = width as usize * raster.format().elements_per_pixel();

        match (self, raster.storage_mut()) {
            (Self::Packed { src, filter: false }, StorageMut::Words(dst)) => {
                nearest::fill(*src, sampling, origin, Region::new(dst, stride, row_len, height));
            }
            (Self::Packed { src, filter: true }, StorageMut::Words(dst)) => {
                let dst = Region::new(dst, stride, row_len, height);
                bilinear::fill(*src, |word| word, sampling, origin, dst);
            }
            (Self::Indexed { src }, StorageMut::Bytes(dst)) => {
                nearest::fill(*src, sampling, origin, Region::new(dst, stride, row_len, height));
            }
            (Self::IndexedFilter { src, lut }, StorageMut::Words(dst)) => {
                let dst = Region::new(dst, stride, row_len, height);
                bilinear::fill(*src, |idx| lut[usize::from(idx)], sampling, origin, dst);
            }
            (Self::Generic { filter }, StorageMut::Words(dst)) => {
                let dst = Region::new(dst, stride, row_len, height);
                generic::fill(texture, *filter, sampling, origin, dst);
            }
            (Self::Generic { filter }, StorageMut::Bytes(dst)) => {
                let dst = Region::new(dst, stride, row_len, height);
                generic::fill(texture, *filter, sampling, origin, dst);
            }
            (Self::GenericArgb, StorageMut::Words(dst)) => {
                let dst = Region::new(dst, stride, row_len, height);
                generic::fill_argb(texture, sampling, origin, dst);
            }
            _ => unreachable!("raster storage does not match the filler"),
        }
    }
}

/// The packed model for blended colors of a source that is opaque or not.
fn blended_model(opaque: bool, preferred: Option<PreferredFormat>) -> ColorModel {
    // Blends of opaque colors are opaque, so XRGB loses nothing.
    if opaque && preferred != Some(PreferredFormat::Argb) {
        ColorModel::XRGB
    } else {
        ColorModel::ARGB
    }
}

/// The part of a raster written by one request: `height` rows of `row_len` elements,
/// `stride` elements apart.
#[derive(Debug)]
pub(crate) struct Region<'a, T> {
    pixels: &'a mut [T],
    stride: usize,
    row_len: usize,
    height: u32,
}

impl<'a, T> Region<'a, T> {
    pub(crate) fn new(pixels: &'a mut [T], stride: usize, row_len: usize, height: u32) -> Self {
        debug_assert!(row_len <= stride, "rows must not overlap");
        debug_assert!(
            height == 0 || pixels.len() >= (height as usize - 1) * stride + row_len,
            "region exceeds the buffer"
        );
        Self {
            pixels,
            stride,
            row_len,
            height,
        }
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut [T]> + '_ {
        let row_len = self.row_len;
        self.pixels
            .chunks_mut(self.stride)
            .take(self.height as usize)
            .map(move |row| &mut row[..row_len])
    }
}

/// The neighbor of texel `pos` along an axis of length `period`.
#[inline(always)]
fn next(pos: u32, period: u32) -> u32 {
    if pos + 1 == period { 0 } else { pos + 1 }
}
