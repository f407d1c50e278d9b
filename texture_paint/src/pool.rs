// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A pool of reusable output rasters, keyed by storage format.
//!
//! Paint contexts are short-lived, but a renderer creates them at a high rate. The pool
//! lets a disposed context hand its raster to the next context with the same format,
//! so steady-state painting does not allocate. The pool is purely advisory: a miss always
//! falls back to a fresh allocation, which is indistinguishable except for the cost.

use crate::raster::{OutputRaster, RasterFormat};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Tuning knobs of a [`RasterPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// How many rasters are kept per format. When exceeded, the raster with the smallest
    /// area is evicted (the oldest one on ties).
    pub entries_per_format: usize,
    /// Fresh allocations for requests no larger than `min_dimension` in both directions
    /// are rounded up to a `min_dimension` square.
    pub min_dimension: u32,
    /// Rasters with more pixels than this are never retained.
    pub max_cached_pixels: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            entries_per_format: 2,
            min_dimension: 32,
            max_cached_pixels: 4 * 1024 * 1024,
        }
    }
}

/// Counters describing the pool's effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Acquisitions served from the pool.
    pub hits: u64,
    /// Acquisitions that had to allocate.
    pub misses: u64,
    /// Rasters currently held.
    pub cached: usize,
}

type Slot = SmallVec<[OutputRaster; 2]>;

#[derive(Debug, Default)]
struct PoolState {
    /// Per-format rasters, least recently released first.
    slots: HashMap<RasterFormat, Slot>,
    hits: u64,
    misses: u64,
}

/// A thread-safe cache of output rasters.
///
/// The lock is only held while a slot is inspected or updated, never while pixels are
/// written.
#[derive(Debug)]
pub struct RasterPool {
    settings: PoolSettings,
    state: Mutex<PoolState>,
}

static_assertions::assert_impl_all!(RasterPool: Send, Sync);

impl Default for RasterPool {
    fn default() -> Self {
        Self::new(PoolSettings::default())
    }
}

impl RasterPool {
    /// Create an empty pool.
    pub fn new(settings: PoolSettings) -> Self {
        Self {
            settings,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// The process-wide pool used by contexts that are not given one explicitly.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<RasterPool>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::default())).clone()
    }

    /// The settings this pool was created with.
    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    // Pooled rasters carry no invariants that a panicking holder could break.
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a raster of `format` that is at least `width x height`.
    ///
    /// The most recently released raster that is large enough is reused; its previous
    /// content is left in place. Otherwise a zeroed raster is allocated.
    pub fn acquire(&self, format: RasterFormat, width: u32, height: u32) -> OutputRaster {
        {
            let mut guard = self.lock();
            let state = &mut *guard;
            if let Some(slot) = state.slots.get_mut(&format) {
                if let Some(idx) = slot.iter().rposition(|r| r.fits(width, height)) {
                    let raster = slot.remove(idx);
                    state.hits += 1;
                    log::trace!(
                        "raster pool hit for {format:?}: {}x{} serves {width}x{height}",
                        raster.width(),
                        raster.height()
                    );
                    return raster;
                }
            }
            state.misses += 1;
        }

        let min = self.settings.min_dimension;
        let (width, height) = if width <= min && height <= min {
            (min, min)
        } else {
            (width, height)
        };
        log::trace!("raster pool miss for {format:?}, allocating {width}x{height}");
        OutputRaster::new(format, width, height)
    }

    /// Offer a raster back to the pool.
    ///
    /// If the format's slot is full afterwards, the smallest raster is dropped, so a
    /// raster smaller than everything already held is not retained.
    pub fn release(&self, raster: OutputRaster) {
        if self.settings.entries_per_format == 0
            || raster.area() > self.settings.max_cached_pixels
        {
            log::trace!(
                "raster pool drops {}x{} {:?}",
                raster.width(),
                raster.height(),
                raster.format()
            );
            return;
        }

        let evicted = {
            let mut state = self.lock();
            let slot = state.slots.entry(raster.format()).or_default();
            slot.push(raster);
            if slot.len() > self.settings.entries_per_format {
                slot.iter()
                    .enumerate()
                    .min_by_key(|(_, r)| r.area())
                    .map(|(idx, _)| idx)
                    .map(|idx| slot.remove(idx))
            } else {
                None
            }
        };

        if let Some(evicted) = evicted {
            log::trace!(
                "raster pool evicts {}x{} {:?}",
                evicted.width(),
                evicted.height(),
                evicted.format()
            );
        }
    }

    /// Drop every cached raster. The counters are kept.
    pub fn clear(&self) {
        let slots = core::mem::take(&mut self.lock().slots);
        drop(slots);
    }

    /// A snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let state = self.lock();
        PoolStats {
            hits: state.hits,
            misses: state.misses,
            cached: state.slots.values().map(|slot| slot.len()).sum(),
        }
    }
}
