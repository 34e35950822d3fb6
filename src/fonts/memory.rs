//! Memory accounting surface derived from the font registry

use serde::{Deserialize, Serialize};

/// Default warning threshold for total font memory: 50 MiB.
pub const DEFAULT_MEMORY_THRESHOLD: usize = 50 * 1024 * 1024;

/// Per-font breakdown entry in the memory metrics snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMemoryEntry {
    pub id: u32,
    pub name: String,
    pub memory_usage: usize,
}

/// Host-facing memory metrics (`getMemoryMetrics`).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryMetrics {
    /// Sum of byte lengths over all active font records
    pub total_memory_usage: usize,

    /// Number of active fonts
    pub font_count: usize,

    /// Per-font usage, ascending id order
    pub fonts: Vec<FontMemoryEntry>,

    /// Whether usage currently exceeds the configured limit
    pub threshold_exceeded: bool,
}
