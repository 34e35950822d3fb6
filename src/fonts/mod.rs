//! Font Registry and Memory Accountant
//!
//! Owns the loaded font byte buffers, issues monotonic handles, and derives
//! aggregate memory usage for the host-facing memory surface.

pub mod memory;
pub mod registry;

pub use memory::{FontMemoryEntry, MemoryMetrics, DEFAULT_MEMORY_THRESHOLD};
pub use registry::{FontInfo, FontRecord, FontRegistry, FontState};
