// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output rasters: owned, reusable pixel buffers filled by a paint context.

use crate::color::{ColorModel, Texel};

/// The storage format of an [`OutputRaster`], also the key of the raster pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    /// `per_pixel` 32-bit elements per pixel.
    Words {
        /// Elements per pixel.
        per_pixel: u8,
    },
    /// `per_pixel` 8-bit elements per pixel.
    Bytes {
        /// Elements per pixel.
        per_pixel: u8,
    },
}

impl RasterFormat {
    /// One packed `u32` per pixel.
    pub const PACKED: Self = Self::Words { per_pixel: 1 };
    /// One byte per pixel.
    pub const INDEXED: Self = Self::Bytes { per_pixel: 1 };

    /// The number of storage elements per pixel.
    pub fn elements_per_pixel(self) -> usize {
        match self {
            Self::Words { per_pixel } | Self::Bytes { per_pixel } => usize::from(per_pixel),
        }
    }

    /// The size in bytes of a `width x height` raster, or `None` if it cannot be
    /// allocated.
    pub fn byte_len(self, width: u32, height: u32) -> Option<usize> {
        let element = match self {
            Self::Words { .. } => size_of::<u32>(),
            Self::Bytes { .. } => size_of::<u8>(),
        };
        let len = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(self.elements_per_pixel())?
            .checked_mul(element)?;
        isize::try_from(len).is_ok().then_some(len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RasterData {
    Words(Vec<u32>),
    Bytes(Vec<u8>),
}

/// Mutable access to the elements of a raster.
#[derive(Debug)]
pub(crate) enum StorageMut<'a> {
    Words(&'a mut [u32]),
    Bytes(&'a mut [u8]),
}

/// A rectangular pixel buffer produced by a paint context.
///
/// Rows are tightly packed: the row stride is `width * elements_per_pixel` elements.
/// A raster handed out by a context may be larger than the requested region; only the
/// requested top-left region holds defined content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRaster {
    width: u32,
    height: u32,
    format: RasterFormat,
    data: RasterData,
}

impl OutputRaster {
    /// Allocate a zeroed raster.
    ///
    /// # Panics
    ///
    /// Panics if the element count overflows `usize`.
    pub fn new(format: RasterFormat, width: u32, height: u32) -> Self {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.elements_per_pixel()))
            .expect("raster dimensions overflow");
        let data = match format {
            RasterFormat::Words { .. } => RasterData::Words(vec![0; len]),
            RasterFormat::Bytes { .. } => RasterData::Bytes(vec![0; len]),
        };

        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// The width of the raster in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height of the raster in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The storage format.
    pub fn format(&self) -> RasterFormat {
        self.format
    }

    /// The number of pixels in the raster.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether a `width x height` region fits in this raster.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.width >= width && self.height >= height
    }

    /// The distance between rows, in elements.
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.format.elements_per_pixel()
    }

    /// The elements of a word raster.
    pub fn words(&self) -> Option<&[u32]> {
        match &self.data {
            RasterData::Words(words) => Some(words),
            RasterData::Bytes(_) => None,
        }
    }

    /// The raster content as bytes.
    ///
    /// Word rasters are viewed in native byte order.
    pub fn bytes(&self) -> &[u8] {
        match &self.data {
            RasterData::Words(words) => bytemuck::cast_slice(words),
            RasterData::Bytes(bytes) => bytes,
        }
    }

    /// The elements of row `y`, as bytes for byte rasters or native-endian words
    /// for word rasters.
    ///
    /// # Panics
    ///
    /// Panics if `y` is outside of the raster.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row {y} is outside of the raster");
        let stride = self.row_stride();
        let start = y as usize * stride;
        match &self.data {
            RasterData::Words(words) => bytemuck::cast_slice(&words[start..start + stride]),
            RasterData::Bytes(bytes) => &bytes[start..start + stride],
        }
    }

    /// The first element of pixel `(x, y)` in a word raster.
    pub fn pixel_word(&self, x: u32, y: u32) -> Option<u32> {
        let idx = self.element_index(x, y)?;
        self.words().map(|words| words[idx])
    }

    /// The first element of pixel `(x, y)` in a byte raster.
    pub fn pixel_byte(&self, x: u32, y: u32) -> Option<u8> {
        let idx = self.element_index(x, y)?;
        match &self.data {
            RasterData::Bytes(bytes) => Some(bytes[idx]),
            RasterData::Words(_) => None,
        }
    }

    fn element_index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.row_stride() + x as usize * self.format.elements_per_pixel())
    }

    pub(crate) fn storage_mut(&mut self) -> StorageMut<'_> {
        match &mut self.data {
            RasterData::Words(words) => StorageMut::Words(words),
            RasterData::Bytes(bytes) => StorageMut::Bytes(bytes),
        }
    }

    /// The raw elements of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside of the raster.
    pub fn texel(&self, x: u32, y: u32, out: &mut Texel) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) is outside of the raster"
        );
        let per_pixel = self.format.elements_per_pixel();
        let start = y as usize * self.row_stride() + x as usize * per_pixel;
        out.clear();
        match &self.data {
            RasterData::Words(words) => out.extend_from_slice(&words[start..start + per_pixel]),
            RasterData::Bytes(bytes) => out.extend(
                bytes[start..start + per_pixel]
                    .iter()
                    .map(|b| u32::from(*b)),
            ),
        }
    }

    /// Decode the top-left `width x height` region to ARGB, in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if the region does not fit in the raster.
    pub fn to_argb_vec(&self, width: u32, height: u32, model: &ColorModel) -> Vec<u32> {
        assert!(self.fits(width, height), "region exceeds the raster");
        let mut texel = Texel::new();
        let mut out = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                self.texel(x, y, &mut texel);
                out.push(model.decode_argb(&texel));
            }
        }
        out
    }

    /// Encode the top-left `width x height` region as an RGBA PNG.
    #[cfg(feature = "png")]
    pub fn encode_png(
        &self,
        width: u32,
        height: u32,
        model: &ColorModel,
    ) -> Result<Vec<u8>, png::EncodingError> {
        let rgba: Vec<u8> = self
            .to_argb_vec(width, height, model)
            .into_iter()
            .flat_map(|argb| {
                let [a, r, g, b] = argb.to_be_bytes();
                [r, g, b, a]
            })
            .collect();

        let mut data = Vec::new();
        let mut encoder = png::Encoder::new(&mut data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&rgba)?;
        writer.finish().map(|_| data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::DirectMasks;

    fn words_mut(raster: &mut OutputRaster) -> &mut [u32] {
        match raster.storage_mut() {
            StorageMut::Words(words) => words,
            StorageMut::Bytes(_) => panic!("word raster expected"),
        }
    }

    #[test]
    fn word_rasters_expose_bytes() {
        let mut raster = OutputRaster::new(RasterFormat::PACKED, 3, 2);
        words_mut(&mut raster)[4] = 0x0102_0304;
        assert_eq!(raster.bytes().len(), 24);
        assert_eq!(&raster.bytes()[16..20], &0x0102_0304_u32.to_ne_bytes());
        assert_eq!(&raster.row(1)[4..8], &0x0102_0304_u32.to_ne_bytes());
        assert_eq!(raster.pixel_word(1, 1), Some(0x0102_0304));
        assert_eq!(raster.pixel_word(3, 1), None);
        assert_eq!(raster.pixel_byte(1, 1), None);
    }

    #[test]
    fn texels_of_multi_element_pixels() {
        let mut raster = OutputRaster::new(RasterFormat::Bytes { per_pixel: 3 }, 2, 2);
        let StorageMut::Bytes(bytes) = raster.storage_mut() else {
            panic!("byte raster expected");
        };
        bytes[9..12].copy_from_slice(&[7, 8, 9]);
        let mut texel = Texel::new();
        raster.texel(1, 1, &mut texel);
        assert_eq!(texel.as_slice(), &[7, 8, 9]);
        assert_eq!(raster.row_stride(), 6);
        assert_eq!(raster.pixel_byte(1, 1), Some(7));
        assert_eq!(raster.row(1), &[0, 0, 0, 7, 8, 9]);
    }

    #[test]
    fn byte_lengths() {
        assert_eq!(RasterFormat::PACKED.byte_len(3, 5), Some(60));
        assert_eq!(RasterFormat::Bytes { per_pixel: 3 }.byte_len(3, 5), Some(45));
        assert_eq!(
            RasterFormat::Words { per_pixel: 255 }.byte_len(u32::MAX, u32::MAX),
            None
        );
    }

    #[test]
    fn decodes_regions() {
        let mut raster = OutputRaster::new(RasterFormat::PACKED, 4, 4);
        words_mut(&mut raster)[..2].copy_from_slice(&[0x00ff_0000, 0x0000_00ff]);
        let argb = raster.to_argb_vec(2, 1, &ColorModel::Direct(DirectMasks::XRGB));
        assert_eq!(argb, vec![0xffff_0000, 0xff00_00ff]);
    }
}
