// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster reuse across requests, contexts and threads.

use crate::util::{CHECKER, pattern, private_pool, render, settings};
use std::sync::Arc;
use texture_paint::kurbo::{Affine, Rect};
use texture_paint::{
    DirectMasks, PoolSettings, PoolStats, RasterPool, SourceTexture, TexturePaint,
    TexturePaintContext,
};

#[test]
fn repeated_requests_are_deterministic() {
    let texels = pattern(17, 13);
    let texture = SourceTexture::packed(&texels, 17, 13, DirectMasks::ARGB).unwrap();
    let pool = private_pool();
    let mut ctx = TexturePaintContext::new(
        texture,
        Affine::rotate(0.7) * Affine::scale(1.3),
        Rect::ZERO,
        settings(true, &pool),
    );
    let model = ctx.output_color_model().clone();

    let first = ctx.raster(-5, 9, 40, 20).unwrap().to_argb_vec(40, 20, &model);
    // Something else in between, writing into the same raster.
    ctx.raster(100, 100, 10, 10).unwrap();
    let second = ctx.raster(-5, 9, 40, 20).unwrap().to_argb_vec(40, 20, &model);
    assert_eq!(first, second);
}

#[test]
fn pooled_rasters_carry_no_stale_pixels() {
    let pool = private_pool();

    let white = [0xffff_ffff; 4];
    let texture = SourceTexture::packed(&white, 2, 2, DirectMasks::ARGB).unwrap();
    let mut ctx =
        TexturePaintContext::new(texture, Affine::IDENTITY, Rect::ZERO, settings(false, &pool));
    ctx.raster(0, 0, 64, 64).unwrap();
    ctx.dispose();
    assert_eq!(pool.stats().cached, 1);

    let texture = SourceTexture::packed(&CHECKER, 2, 2, DirectMasks::ARGB).unwrap();
    let transform = Affine::translate((0.5, 0.25));
    let settings = settings(true, &pool);
    let mut ctx = TexturePaintContext::new(texture.clone(), transform, Rect::ZERO, settings);
    let model = ctx.output_color_model().clone();
    let raster = ctx.raster(3, 1, 10, 7).unwrap();
    assert_eq!((raster.width(), raster.height()), (64, 64));
    let reused = raster.to_argb_vec(10, 7, &model);

    assert_eq!(reused, render(&texture, transform, true, (3, 1, 10, 7)));
    assert_eq!(
        pool.stats(),
        PoolStats {
            hits: 1,
            misses: 1,
            cached: 0
        }
    );
}

#[test]
fn dropping_a_context_returns_its_raster() {
    let pool = private_pool();
    let texture = SourceTexture::packed(&CHECKER, 2, 2, DirectMasks::ARGB).unwrap();
    {
        let settings = settings(false, &pool);
        let mut ctx =
            TexturePaintContext::new(texture.clone(), Affine::IDENTITY, Rect::ZERO, settings);
        ctx.raster(0, 0, 8, 8).unwrap();
    }
    assert_eq!(pool.stats().cached, 1);

    // A context that never produced a raster has nothing to give back.
    TexturePaintContext::new(texture, Affine::IDENTITY, Rect::ZERO, settings(false, &pool))
        .dispose();
    assert_eq!(pool.stats().cached, 1);
}

#[test]
fn single_rows_are_sized_for_the_device_bounds() {
    let pool = Arc::new(RasterPool::new(PoolSettings {
        min_dimension: 0,
        ..PoolSettings::default()
    }));
    let texels = pattern(5, 3);
    let texture = SourceTexture::packed(&texels, 5, 3, DirectMasks::ARGB).unwrap();
    let bounds = Rect::new(10.0, 0.0, 310.0, 50.0);
    let settings = settings(false, &pool);
    let mut ctx = TexturePaintContext::new(texture.clone(), Affine::IDENTITY, bounds, settings);

    let model = ctx.output_color_model().clone();
    for (y, w) in [(0, 40), (1, 300), (2, 120)] {
        let raster = ctx.raster(10, y, w, 1).unwrap();
        assert_eq!((raster.width(), raster.height()), (300, 1));
        assert_eq!(
            raster.to_argb_vec(w, 1, &model),
            render(&texture, Affine::IDENTITY, false, (10, y, w, 1))
        );
    }
    assert_eq!(pool.stats().misses, 1);

    // Taller requests are allocated as requested.
    assert_eq!(ctx.raster(0, 0, 40, 2).unwrap().width(), 40);
}

#[test]
fn contexts_on_many_threads_share_a_pool() {
    let pool = private_pool();
    let texels = pattern(17, 13);
    let texture = SourceTexture::packed(&texels, 17, 13, DirectMasks::ARGB).unwrap();
    let paint = TexturePaint::new(texture, Rect::new(3.0, 4.0, 37.0, 30.0));
    let transform = Affine::rotate(0.25);
    let expected = {
        let mut ctx = paint.create_context(transform, Rect::ZERO, settings(true, &pool));
        let model = ctx.output_color_model().clone();
        ctx.raster(0, 0, 50, 20).unwrap().to_argb_vec(50, 20, &model)
    };

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..25 {
                    let settings = settings(true, &pool);
                    let mut ctx = paint.create_context(transform, Rect::ZERO, settings);
                    let model = ctx.output_color_model().clone();
                    let out = ctx.raster(0, 0, 50, 20).unwrap().to_argb_vec(50, 20, &model);
                    assert_eq!(out, expected);
                    ctx.dispose();
                }
            });
        }
    });

    let stats = pool.stats();
    assert_eq!(stats.hits + stats.misses, 101);
    assert!(stats.cached <= PoolSettings::default().entries_per_format);
}
