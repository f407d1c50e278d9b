// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Source textures: borrowed, validated views over a tile's pixels.

use crate::color::{ChannelOrder, ColorModel, DirectMasks, Palette, Texel};
use crate::error::{Error, Result};

/// The raw storage of a texture.
#[derive(Debug, Clone, Copy)]
pub enum TexelData<'a> {
    /// 32-bit storage elements.
    Words(&'a [u32]),
    /// 8-bit storage elements.
    Bytes(&'a [u8]),
}

impl TexelData<'_> {
    /// The number of storage elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Words(words) => words.len(),
            Self::Bytes(bytes) => bytes.len(),
        }
    }

    /// Whether there are no storage elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Words(_) => "words",
            Self::Bytes(_) => "bytes",
        }
    }

    #[inline(always)]
    fn element(&self, idx: usize) -> u32 {
        match self {
            Self::Words(words) => words[idx],
            Self::Bytes(bytes) => u32::from(bytes[idx]),
        }
    }
}

/// How texels are addressed inside a [`TexelData`] buffer.
///
/// All strides and offsets are counted in storage elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureLayout {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Index of the first element of the top-left texel.
    pub offset: usize,
    /// Distance between vertically adjacent texels.
    pub row_stride: usize,
    /// Distance between horizontally adjacent texels.
    pub pixel_stride: usize,
}

impl TextureLayout {
    /// A layout without padding, for texels of `texel_len` elements.
    pub fn tight(width: u32, height: u32, texel_len: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            row_stride: width as usize * texel_len,
            pixel_stride: texel_len,
        }
    }

    #[inline(always)]
    fn index(&self, x: u32, y: u32) -> usize {
        self.offset + y as usize * self.row_stride + x as usize * self.pixel_stride
    }
}

/// An immutable view over one tile of a texture paint.
///
/// The view borrows the caller's storage; the tile repeats infinitely in both
/// directions when painted.
#[derive(Debug, Clone)]
pub struct SourceTexture<'a> {
    data: TexelData<'a>,
    layout: TextureLayout,
    model: ColorModel,
}

impl<'a> SourceTexture<'a> {
    /// Create a texture view, validating the layout against the storage.
    pub fn new(data: TexelData<'a>, layout: TextureLayout, model: ColorModel) -> Result<Self> {
        let TextureLayout {
            width,
            height,
            offset,
            row_stride,
            pixel_stride,
        } = layout;

        if width == 0 || height == 0 {
            return Err(Error::EmptyTexture { width, height });
        }

        match (&model, &data) {
            (ColorModel::Direct(_), TexelData::Bytes(_))
            | (ColorModel::Interleaved(_), TexelData::Words(_)) => {
                return Err(Error::StorageMismatch {
                    model: model.name(),
                    storage: data.kind_name(),
                });
            }
            _ => {}
        }

        let texel_len = model.texel_len();
        if !(1..=usize::from(u8::MAX)).contains(&texel_len) {
            return Err(Error::InvalidTexelLength(texel_len));
        }
        if pixel_stride < texel_len {
            return Err(Error::StrideTooSmall {
                stride: pixel_stride,
                needed: texel_len,
            });
        }

        let last_x = width as usize - 1;
        let last_y = height as usize - 1;
        let row_len = last_x
            .checked_mul(pixel_stride)
            .and_then(|n| n.checked_add(texel_len));
        let row_len = row_len.unwrap_or(usize::MAX);
        if height > 1 && row_stride < row_len {
            return Err(Error::StrideTooSmall {
                stride: row_stride,
                needed: row_len,
            });
        }

        let required = last_y
            .checked_mul(row_stride)
            .and_then(|n| n.checked_add(row_len))
            .and_then(|n| n.checked_add(offset))
            .unwrap_or(usize::MAX);
        if data.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            layout,
            model,
        })
    }

    /// A tightly packed direct-color texture, one `u32` per pixel.
    pub fn packed(data: &'a [u32], width: u32, height: u32, masks: DirectMasks) -> Result<Self> {
        Self::new(
            TexelData::Words(data),
            TextureLayout::tight(width, height, 1),
            ColorModel::Direct(masks),
        )
    }

    /// A tightly packed indexed texture, one byte per pixel.
    pub fn indexed(data: &'a [u8], width: u32, height: u32, palette: Palette) -> Result<Self> {
        Self::new(
            TexelData::Bytes(data),
            TextureLayout::tight(width, height, 1),
            ColorModel::Indexed(palette),
        )
    }

    /// A tightly packed texture of interleaved 8-bit components.
    pub fn interleaved(
        data: &'a [u8],
        width: u32,
        height: u32,
        order: ChannelOrder,
    ) -> Result<Self> {
        Self::new(
            TexelData::Bytes(data),
            TextureLayout::tight(width, height, order.components()),
            ColorModel::Interleaved(order),
        )
    }

    /// The width of the tile in pixels.
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    /// The height of the tile in pixels.
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// The storage layout.
    pub fn layout(&self) -> &TextureLayout {
        &self.layout
    }

    /// The underlying storage.
    pub fn data(&self) -> TexelData<'a> {
        self.data
    }

    /// The color model of the texels.
    pub fn model(&self) -> &ColorModel {
        &self.model
    }

    /// Read the raw elements of the texel at `(x, y)` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates lie outside the tile.
    pub fn texel(&self, x: u32, y: u32, out: &mut Texel) {
        assert!(
            x < self.layout.width && y < self.layout.height,
            "texel ({x}, {y}) is outside of the tile"
        );
        let base = self.layout.index(x, y);
        out.clear();
        out.extend((0..self.model.texel_len()).map(|i| self.data.element(base + i)));
    }

    /// The ARGB color of the texel at `(x, y)`.
    pub fn argb(&self, x: u32, y: u32) -> u32 {
        let mut texel = Texel::new();
        self.texel(x, y, &mut texel);
        self.model.decode_argb(&texel)
    }

    /// A row-addressable view of word storage with one element per pixel.
    pub(crate) fn words(&self) -> Option<TileView<'a, u32>> {
        match self.data {
            TexelData::Words(words) if self.layout.pixel_stride == 1 => {
                Some(TileView::new(words, &self.layout))
            }
            _ => None,
        }
    }

    /// A row-addressable view of byte storage with one element per pixel.
    pub(crate) fn bytes(&self) -> Option<TileView<'a, u8>> {
        match self.data {
            TexelData::Bytes(bytes) if self.layout.pixel_stride == 1 => {
                Some(TileView::new(bytes, &self.layout))
            }
            _ => None,
        }
    }
}

/// Rows of a single-element-per-pixel tile.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TileView<'a, T> {
    data: &'a [T],
    offset: usize,
    row_stride: usize,
    width: usize,
}

impl<'a, T: Copy> TileView<'a, T> {
    fn new(data: &'a [T], layout: &TextureLayout) -> Self {
        Self {
            data,
            offset: layout.offset,
            row_stride: layout.row_stride,
            width: layout.width as usize,
        }
    }

    /// The `width` pixels of row `y`.
    #[inline(always)]
    pub(crate) fn row(&self, y: u32) -> &'a [T] {
        let start = self.offset + y as usize * self.row_stride;
        &self.data[start..start + self.width]
    }
}
