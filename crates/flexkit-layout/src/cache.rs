//! Per-node layout cache.
//!
//! One slot holds the result of the last full layout; a small ring holds
//! results of measure-only passes. Entries are keyed by the exact constraint
//! tuple the node was computed under.

use crate::{MeasureMode, Size};
use flexkit_style::Direction;
use tracing::trace;

/// Number of measurement slots kept per node.
pub const MEASUREMENT_SLOTS: usize = 8;

/// The constraint tuple a result was computed under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheKey {
    pub width: MeasureMode,
    pub height: MeasureMode,
    pub owner_width: Option<f32>,
    pub owner_height: Option<f32>,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub size: Size,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutCache {
    layout: Option<CacheEntry>,
    measurements: [Option<CacheEntry>; MEASUREMENT_SLOTS],
    next: usize,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a result.
    ///
    /// A full layout is only satisfied by the layout slot. A measure-only
    /// pass may also reuse a full layout computed under the same key.
    pub fn get(&self, key: &CacheKey, perform_layout: bool) -> Option<Size> {
        if let Some(entry) = self.layout.filter(|entry| entry.key == *key) {
            trace!(?key, perform_layout, "Cache hit (layout slot)");
            return Some(entry.size);
        }
        if perform_layout {
            return None;
        }
        let hit = self
            .measurements
            .iter()
            .flatten()
            .find(|entry| entry.key == *key)
            .map(|entry| entry.size);
        if hit.is_some() {
            trace!(?key, "Cache hit (measurement slot)");
        }
        hit
    }

    pub fn store(&mut self, key: CacheKey, size: Size, perform_layout: bool) {
        let entry = CacheEntry { key, size };
        if perform_layout {
            self.layout = Some(entry);
        } else {
            self.measurements[self.next] = Some(entry);
            self.next = (self.next + 1) % MEASUREMENT_SLOTS;
        }
    }

    /// Forget the full layout result, keeping measurements.
    pub fn invalidate_layout(&mut self) {
        self.layout = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_none() && self.measurements.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(width: f32) -> CacheKey {
        CacheKey {
            width: MeasureMode::AtMost(width),
            height: MeasureMode::Undefined,
            owner_width: Some(width),
            owner_height: None,
            direction: Direction::Ltr,
        }
    }

    #[test]
    fn test_layout_slot_serves_measurements() {
        let mut cache = LayoutCache::new();
        cache.store(key(100.0), Size::new(10.0, 20.0), true);

        assert_eq!(cache.get(&key(100.0), false), Some(Size::new(10.0, 20.0)));
        assert_eq!(cache.get(&key(100.0), true), Some(Size::new(10.0, 20.0)));
        assert_eq!(cache.get(&key(50.0), true), None);
    }

    #[test]
    fn test_measurement_slots_do_not_serve_layout() {
        let mut cache = LayoutCache::new();
        cache.store(key(100.0), Size::new(10.0, 20.0), false);

        assert_eq!(cache.get(&key(100.0), false), Some(Size::new(10.0, 20.0)));
        assert_eq!(cache.get(&key(100.0), true), None);
    }

    #[test]
    fn test_measurement_ring_evicts_oldest() {
        let mut cache = LayoutCache::new();
        for i in 0..=MEASUREMENT_SLOTS {
            cache.store(key(i as f32), Size::new(i as f32, 0.0), false);
        }

        assert_eq!(cache.get(&key(0.0), false), None);
        assert!(cache.get(&key(1.0), false).is_some());
        assert!(cache.get(&key(MEASUREMENT_SLOTS as f32), false).is_some());
    }

    #[test]
    fn test_clear() {
        let mut cache = LayoutCache::new();
        cache.store(key(1.0), Size::zero(), true);
        cache.store(key(2.0), Size::zero(), false);
        assert!(!cache.is_empty());

        cache.clear();
        assert!(cache.is_empty());
    }
}
