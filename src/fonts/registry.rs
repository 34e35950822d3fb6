//! Owning store of loaded font buffers keyed by monotonic handle
//!
//! Handles are positive `u32` values, strictly increasing for the lifetime of
//! one registry. A handle is never reissued, even after its record is
//! unregistered or the registry is cleared; long-lived host sessions rely on
//! stale handles staying invalid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::memory::{FontMemoryEntry, MemoryMetrics, DEFAULT_MEMORY_THRESHOLD};
use crate::errors::FontError;

/// Lifecycle state of a font record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontState {
    Active,
    Unloaded,
}

/// One registered font: name plus the exclusively-owned byte buffer.
#[derive(Clone, Debug)]
pub struct FontRecord {
    pub id: u32,
    pub name: String,
    pub bytes: Vec<u8>,
    pub state: FontState,
}

impl FontRecord {
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

/// Wire-facing summary of a registered font (for `getLoadedFonts`).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontInfo {
    pub id: u32,
    pub name: String,
    pub byte_length: usize,
}

/// Font registry with built-in memory accounting.
///
/// `total_memory` is maintained incrementally and always equals the sum of
/// `byte_length` over Active records, including on failure paths: a rejected
/// register never touches the counter or the id sequence.
#[derive(Debug)]
pub struct FontRegistry {
    fonts: BTreeMap<u32, FontRecord>,
    next_id: u32,
    default_font_id: Option<u32>,
    total_memory: usize,
    // One-shot latch so a threshold breach is only warned about once until
    // usage drops back under the limit.
    threshold_warning_issued: bool,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        Self {
            fonts: BTreeMap::new(),
            next_id: 1,
            default_font_id: None,
            total_memory: 0,
            threshold_warning_issued: false,
        }
    }

    /// Register a font from an owned copy of `bytes`.
    ///
    /// Returns the new monotonic id, or `FontError::EmptyData` for an empty
    /// buffer. The id counter only advances on success.
    pub fn register(&mut self, bytes: &[u8], name: &str) -> Result<u32, FontError> {
        if bytes.is_empty() {
            return Err(FontError::EmptyData);
        }

        let id = self.next_id;
        let record = FontRecord {
            id,
            name: name.to_string(),
            bytes: bytes.to_vec(),
            state: FontState::Active,
        };
        self.total_memory += record.byte_length();
        self.fonts.insert(id, record);
        self.next_id += 1;

        log::debug!(
            "font registered: '{}' (id={}, {} bytes, total={} bytes)",
            name,
            id,
            bytes.len(),
            self.total_memory
        );
        Ok(id)
    }

    /// Unregister a font and release its buffer immediately.
    ///
    /// The record stays behind as an `Unloaded` tombstone so the id remains
    /// known-but-invalid. Unknown ids are a no-op; unregister is idempotent.
    pub fn unregister(&mut self, id: u32) {
        if let Some(record) = self.fonts.get_mut(&id) {
            if record.state != FontState::Active {
                return;
            }
            self.total_memory -= record.byte_length();
            record.bytes = Vec::new();
            record.state = FontState::Unloaded;
            log::debug!(
                "font unregistered: '{}' (id={}, total={} bytes)",
                record.name,
                id,
                self.total_memory
            );
            self.reset_warning_if_below(DEFAULT_MEMORY_THRESHOLD);
        }
    }

    /// Record the default font id.
    ///
    /// Existence is deliberately not validated here; resolution validates, so
    /// set-default-then-register ordering works.
    pub fn set_default(&mut self, id: u32) {
        self.default_font_id = Some(id);
    }

    pub fn default_font_id(&self) -> Option<u32> {
        self.default_font_id
    }

    /// Resolve the font a request should use.
    ///
    /// Order: explicit requested id if Active, then the default id if Active,
    /// then the lowest-id Active record, then failure on an empty registry.
    pub fn resolve(&self, requested_id: Option<u32>) -> Result<&FontRecord, FontError> {
        if let Some(id) = requested_id {
            if let Some(record) = self.active(id) {
                return Ok(record);
            }
        }
        if let Some(id) = self.default_font_id {
            if let Some(record) = self.active(id) {
                return Ok(record);
            }
        }
        // BTreeMap iterates in ascending id order
        self.fonts
            .values()
            .find(|r| r.state == FontState::Active)
            .ok_or(FontError::NotLoaded)
    }

    fn active(&self, id: u32) -> Option<&FontRecord> {
        self.fonts.get(&id).filter(|r| r.state == FontState::Active)
    }

    pub fn get(&self, id: u32) -> Option<&FontRecord> {
        self.fonts.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.active(id).is_some()
    }

    /// Summaries of all Active fonts, ascending id order.
    pub fn list(&self) -> Vec<FontInfo> {
        self.fonts
            .values()
            .filter(|r| r.state == FontState::Active)
            .map(|r| FontInfo {
                id: r.id,
                name: r.name.clone(),
                byte_length: r.byte_length(),
            })
            .collect()
    }

    /// Number of Active fonts (tombstones excluded).
    pub fn len(&self) -> usize {
        self.fonts
            .values()
            .filter(|r| r.state == FontState::Active)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every buffer, leaving Unloaded tombstones. The id counter is
    /// NOT reset; monotonicity survives a clear.
    pub fn clear_all(&mut self) {
        let mut count = 0;
        for record in self.fonts.values_mut() {
            if record.state == FontState::Active {
                record.bytes = Vec::new();
                record.state = FontState::Unloaded;
                count += 1;
            }
        }
        self.total_memory = 0;
        self.threshold_warning_issued = false;
        log::debug!("all fonts cleared (count={})", count);
    }

    pub fn total_memory(&self) -> usize {
        self.total_memory
    }

    /// True when usage exceeds `limit` bytes.
    pub fn threshold_exceeded(&self, limit: usize) -> bool {
        self.total_memory > limit
    }

    /// Threshold check with the one-shot warning latch.
    ///
    /// Returns `(exceeded, should_warn)`; `should_warn` is true only the first
    /// time usage crosses the limit.
    pub fn check_threshold(&mut self, limit: usize) -> (bool, bool) {
        if self.total_memory > limit {
            let warn = !self.threshold_warning_issued;
            self.threshold_warning_issued = true;
            (true, warn)
        } else {
            self.threshold_warning_issued = false;
            (false, false)
        }
    }

    fn reset_warning_if_below(&mut self, limit: usize) {
        if self.total_memory <= limit {
            self.threshold_warning_issued = false;
        }
    }

    /// Build the host-facing memory metrics snapshot.
    pub fn memory_metrics(&self, limit: usize) -> MemoryMetrics {
        let fonts: Vec<FontMemoryEntry> = self
            .fonts
            .values()
            .filter(|r| r.state == FontState::Active)
            .map(|r| FontMemoryEntry {
                id: r.id,
                name: r.name.clone(),
                memory_usage: r.byte_length(),
            })
            .collect();
        MemoryMetrics {
            total_memory_usage: self.total_memory,
            font_count: fonts.len(),
            fonts,
            threshold_exceeded: self.threshold_exceeded(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_monotonic_ids() {
        let mut reg = FontRegistry::new();
        let a = reg.register(&[0u8; 16], "a").unwrap();
        let b = reg.register(&[0u8; 16], "b").unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn unregister_leaves_an_unloaded_tombstone() {
        let mut reg = FontRegistry::new();
        let a = reg.register(&[0u8; 16], "a").unwrap();
        reg.unregister(a);

        let rec = reg.get(a).expect("tombstone record kept");
        assert_eq!(rec.state, FontState::Unloaded);
        assert_eq!(rec.byte_length(), 0, "buffer released on unregister");
        assert!(!reg.contains(a));
        assert!(reg.list().is_empty());
        assert_eq!(reg.len(), 0);

        // idempotent: a second unregister must not touch the counter
        reg.unregister(a);
        assert_eq!(reg.total_memory(), 0);
    }

    #[test]
    fn unregister_never_frees_an_id_for_reuse() {
        let mut reg = FontRegistry::new();
        let a = reg.register(&[0u8; 16], "a").unwrap();
        reg.unregister(a);
        let b = reg.register(&[0u8; 16], "a").unwrap();
        assert_eq!(b, 2);
    }

    #[test]
    fn clear_all_keeps_id_counter() {
        let mut reg = FontRegistry::new();
        reg.register(&[0u8; 16], "a").unwrap();
        reg.register(&[0u8; 16], "b").unwrap();
        reg.clear_all();
        assert_eq!(reg.total_memory(), 0);
        let c = reg.register(&[0u8; 16], "c").unwrap();
        assert_eq!(c, 3);
    }

    #[test]
    fn empty_buffer_is_rejected_without_side_effects() {
        let mut reg = FontRegistry::new();
        assert!(reg.register(&[], "empty").is_err());
        assert_eq!(reg.total_memory(), 0);
        let a = reg.register(&[0u8; 8], "a").unwrap();
        assert_eq!(a, 1);
    }

    #[test]
    fn resolve_falls_back_requested_then_default_then_lowest() {
        let mut reg = FontRegistry::new();
        let a = reg.register(&[0u8; 8], "a").unwrap();
        let b = reg.register(&[0u8; 8], "b").unwrap();
        let c = reg.register(&[0u8; 8], "c").unwrap();

        assert_eq!(reg.resolve(Some(b)).unwrap().id, b);
        reg.set_default(c);
        assert_eq!(reg.resolve(Some(999)).unwrap().id, c);
        reg.unregister(c);
        assert_eq!(reg.resolve(None).unwrap().id, a);
        reg.unregister(a);
        reg.unregister(b);
        assert!(reg.resolve(None).is_err());
    }

    #[test]
    fn set_default_does_not_validate_eagerly() {
        let mut reg = FontRegistry::new();
        reg.set_default(5);
        // default points nowhere yet; registering ids 1..5 then resolving
        // picks the lowest active, not an error
        reg.register(&[0u8; 8], "a").unwrap();
        assert_eq!(reg.resolve(None).unwrap().id, 1);
    }

    #[test]
    fn total_memory_tracks_active_records() {
        let mut reg = FontRegistry::new();
        let a = reg.register(&vec![0u8; 1024], "a").unwrap();
        assert_eq!(reg.total_memory(), 1024);
        let _b = reg.register(&vec![0u8; 2048], "b").unwrap();
        assert_eq!(reg.total_memory(), 3072);
        reg.unregister(a);
        assert_eq!(reg.total_memory(), 2048);
        let c = reg.register(&vec![0u8; 10], "c").unwrap();
        assert_eq!(c, 3);
        assert_eq!(reg.total_memory(), 2058);
    }

    #[test]
    fn threshold_latch_warns_once_until_usage_drops() {
        let mut reg = FontRegistry::new();
        let big = reg.register(&vec![0u8; 100], "big").unwrap();
        let (exceeded, warn) = reg.check_threshold(50);
        assert!(exceeded && warn);
        let (exceeded, warn) = reg.check_threshold(50);
        assert!(exceeded && !warn);
        reg.unregister(big);
        reg.register(&vec![0u8; 100], "big2").unwrap();
        let (_, warn) = reg.check_threshold(50);
        assert!(warn, "latch resets once usage dropped below the limit");
    }
}
