//! Layout backend seam
//!
//! The actual HTML/CSS engine is an external collaborator. It is handed the
//! resolved font and the request inputs, and must return a canonical layout
//! tree or a structured `EngineError`. Cancellation/timeout inputs are
//! advisory only; the call is synchronous and runs to completion.

use crate::errors::EngineError;
use crate::fonts::FontRecord;
use crate::layout::metrics_cache::AdvanceCache;
use crate::layout::tree::{LayoutTree, Viewport};

/// Inputs forwarded to the layout backend for one request.
pub struct BackendRequest<'a> {
    pub html: &'a str,

    /// Optional external stylesheet text
    pub css: Option<&'a str>,

    pub viewport: Viewport,

    /// Font resolved through the registry's fallback chain
    pub font: &'a FontRecord,

    /// Optional cap on emitted characters, forwarded verbatim
    pub max_characters: Option<usize>,

    /// Advisory timeout in milliseconds; not enforced here
    pub timeout_ms: Option<f64>,

    /// Verbose tracing for the duration of this call
    pub debug: bool,
}

/// The external layout engine collaborator.
///
/// Implementations never retain references to request buffers beyond the
/// call; everything they need must be copied into the returned tree.
pub trait LayoutBackend {
    fn layout(
        &self,
        req: &BackendRequest<'_>,
        cache: &mut AdvanceCache,
    ) -> Result<LayoutTree, EngineError>;
}
