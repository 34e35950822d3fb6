//! Glyph advance cache
//!
//! Caches per-(font, size, codepoint) advance widths so repeated layout of
//! the same text avoids re-measuring. Entries are keyed by font id and must
//! be invalidated when that font is unregistered.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct AdvanceKey {
    font_id: u32,
    // font size in 1/10 px so the key stays Eq/Hash
    size_deci_px: u32,
    codepoint: u32,
}

/// Cache statistics surfaced through `getCacheStats`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,

    /// hits / (hits + misses); absent before the first query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_rate: Option<f32>,

    /// Estimated cache memory footprint in bytes
    pub memory_usage: usize,
}

/// Advance width cache with hit/miss accounting.
#[derive(Debug, Default)]
pub struct AdvanceCache {
    entries: HashMap<AdvanceKey, f32>,
    hits: u64,
    misses: u64,
}

impl AdvanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an advance, computing and caching it on a miss.
    pub fn advance(
        &mut self,
        font_id: u32,
        font_size: f32,
        codepoint: char,
        compute: impl FnOnce() -> f32,
    ) -> f32 {
        let key = AdvanceKey {
            font_id,
            size_deci_px: (font_size * 10.0) as u32,
            codepoint: codepoint as u32,
        };
        if let Some(&w) = self.entries.get(&key) {
            self.hits += 1;
            return w;
        }
        self.misses += 1;
        let w = compute();
        self.entries.insert(key, w);
        w
    }

    /// Drop every entry belonging to `font_id`.
    pub fn evict_font(&mut self, font_id: u32) {
        self.entries.retain(|k, _| k.font_id != font_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reset hit/miss counters without dropping entries.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
            hit_rate: if total > 0 {
                Some(self.hits as f32 / total as f32)
            } else {
                None
            },
            memory_usage: self.entries.len()
                * (std::mem::size_of::<AdvanceKey>() + std::mem::size_of::<f32>()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_miss_accounting() {
        let mut cache = AdvanceCache::new();
        assert_eq!(cache.stats().hit_rate, None);

        let w1 = cache.advance(1, 16.0, 'a', || 9.6);
        let w2 = cache.advance(1, 16.0, 'a', || unreachable!());
        assert_eq!(w1, w2);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_rate, Some(0.5));
    }

    #[test]
    fn evict_font_only_drops_that_font() {
        let mut cache = AdvanceCache::new();
        cache.advance(1, 16.0, 'a', || 1.0);
        cache.advance(2, 16.0, 'a', || 2.0);
        cache.evict_font(1);
        assert_eq!(cache.stats().entries, 1);
        // font 2 entry survives
        let w = cache.advance(2, 16.0, 'a', || unreachable!());
        assert_eq!(w, 2.0);
    }

    #[test]
    fn different_sizes_are_distinct_entries() {
        let mut cache = AdvanceCache::new();
        cache.advance(1, 16.0, 'a', || 1.0);
        cache.advance(1, 18.0, 'a', || 2.0);
        assert_eq!(cache.stats().entries, 2);
    }
}
