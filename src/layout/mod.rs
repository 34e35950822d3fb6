//! Canonical layout tree and the layout backend seam
//!
//! The backend (HTML parsing, cascade, box layout) is an external collaborator
//! behind the `LayoutBackend` trait; this crate only defines the tree it must
//! produce and ships a small text-flow stand-in so the boundary layers have a
//! live producer.

pub mod engine;
pub mod metrics_cache;
pub mod text_flow;
pub mod tree;

pub use engine::{BackendRequest, LayoutBackend};
pub use metrics_cache::{AdvanceCache, CacheStats};
pub use text_flow::TextFlowBackend;
pub use tree::{
    CharLayout, LayoutBlock, LayoutLine, LayoutRun, LayoutTree, TextDecoration, Transform,
    Viewport,
};
