// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Texture paints: a tile anchored to a user-space rectangle.

use crate::context::{ContextSettings, TexturePaintContext};
use crate::kurbo::{Affine, Rect};
use crate::texture::SourceTexture;

/// A paint that fills shapes with a texture, stretched over `anchor` and repeated from
/// there in every direction.
#[derive(Debug, Clone)]
pub struct TexturePaint<'a> {
    texture: SourceTexture<'a>,
    anchor: Rect,
}

impl<'a> TexturePaint<'a> {
    /// Create a paint that maps the whole tile onto `anchor`.
    ///
    /// An anchor without area (or with non-finite coordinates) is accepted; contexts
    /// created from it sample a single texel.
    pub fn new(texture: SourceTexture<'a>, anchor: Rect) -> Self {
        Self { texture, anchor }
    }

    /// A paint whose tile covers one unit per texel, starting at the origin.
    pub fn unscaled(texture: SourceTexture<'a>) -> Self {
        let anchor = Rect::new(
            0.0,
            0.0,
            f64::from(texture.width()),
            f64::from(texture.height()),
        );
        Self::new(texture, anchor)
    }

    /// The tile.
    pub fn texture(&self) -> &SourceTexture<'a> {
        &self.texture
    }

    /// The user-space rectangle covered by one copy of the tile.
    pub fn anchor(&self) -> Rect {
        self.anchor
    }

    /// The transform from tile space (one unit per texel) to user space.
    pub fn tile_transform(&self) -> Affine {
        let sx = self.anchor.width() / f64::from(self.texture.width());
        let sy = self.anchor.height() / f64::from(self.texture.height());
        Affine::translate(self.anchor.origin().to_vec2()) * Affine::scale_non_uniform(sx, sy)
    }

    /// Create a context for painting with `transform` (user to device space) into the
    /// device-space area `device_bounds`.
    pub fn create_context(
        &self,
        transform: Affine,
        device_bounds: Rect,
        settings: ContextSettings,
    ) -> TexturePaintContext<'a> {
        TexturePaintContext::new(
            self.texture.clone(),
            transform * self.tile_transform(),
            device_bounds,
            settings,
        )
    }
}
