//! Engine instance core: lifecycle, font surface, and the request pipeline
//!
//! `EngineCore` is the caller-owned context object behind the WASM boundary.
//! It holds the font registry, the layout backend, the advance cache, and the
//! instance debug flag; nothing here is process-global, so independent
//! instances in one process share no state. All operations are synchronous
//! and run to completion on the caller's thread.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticsCollector, Envelope, PerformanceMetrics};
use crate::errors::{ErrorCode, ErrorEntry};
use crate::fonts::{FontInfo, FontRegistry, MemoryMetrics, DEFAULT_MEMORY_THRESHOLD};
use crate::layout::{
    AdvanceCache, BackendRequest, CacheStats, LayoutBackend, TextFlowBackend, Viewport,
};
use crate::serializer::{serialize_tree, OutputMode};
use crate::utils::{format_bytes, Stopwatch};

/// Largest accepted HTML input: 10 MiB.
pub const MAX_HTML_SIZE: usize = 10 * 1024 * 1024;

/// Viewport height assumed when the caller does not provide one.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 10_000;

/// Wire options for one layout request (camelCase on the JS side).
///
/// Transient: decoded, validated, and dropped within one call.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Required; must be positive. Signed on the wire so a negative value
    /// reaches the width validator instead of failing deserialization.
    pub viewport_width: Option<i64>,

    pub viewport_height: Option<i64>,

    /// "flat" | "byRow" | "simple" | "full"; absent means flat
    pub mode: Option<String>,

    /// Per-call font override, resolved through the fallback chain
    pub default_font_id: Option<u32>,

    pub enable_metrics: bool,

    /// Character cap forwarded to the backend
    pub max_characters: Option<usize>,

    /// Advisory timeout in milliseconds, forwarded to the backend
    pub timeout: Option<f64>,

    /// External stylesheet text
    pub css: Option<String>,

    /// Verbose tracing for the duration of this call
    pub is_debug: bool,

    /// Override for the byRow/simple baseline-bucket tolerance ε
    pub row_tolerance: Option<f32>,
}

/// Instance lifecycle. Construction moves straight to Operational; there is
/// no usable uninitialized state on the Rust side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Operational,
    Destroyed,
}

/// The engine instance behind the boundary.
pub struct EngineCore {
    registry: FontRegistry,
    backend: Box<dyn LayoutBackend>,
    cache: AdvanceCache,
    debug: bool,
    state: Lifecycle,
    last_envelope: Option<Envelope>,
    last_metrics: Option<PerformanceMetrics>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineCore {
    pub fn new() -> Self {
        Self::with_backend(Box::new(TextFlowBackend::new()))
    }

    /// Instance with a caller-supplied layout backend.
    pub fn with_backend(backend: Box<dyn LayoutBackend>) -> Self {
        Self {
            registry: FontRegistry::new(),
            backend,
            cache: AdvanceCache::new(),
            debug: false,
            state: Lifecycle::Operational,
            last_envelope: None,
            last_metrics: None,
        }
    }

    fn destroyed_entry() -> ErrorEntry {
        ErrorEntry::error(ErrorCode::InternalError, "engine instance destroyed")
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == Lifecycle::Destroyed
    }

    // ========================================================================
    // Font surface
    // ========================================================================

    /// Register a font. The boundary translates the error into the 0
    /// sentinel; internally it stays a typed failure.
    pub fn register_font(&mut self, bytes: &[u8], name: &str) -> Result<u32, ErrorEntry> {
        if self.is_destroyed() {
            return Err(Self::destroyed_entry());
        }
        if name.is_empty() && self.debug {
            log::debug!("registering font with empty name ({} bytes)", bytes.len());
        }
        self.registry
            .register(bytes, name)
            .map_err(|e| ErrorEntry::error(e.code(), e.to_string()))
    }

    /// Idempotent; unknown ids and destroyed instances are no-ops.
    pub fn unregister_font(&mut self, id: u32) {
        if self.is_destroyed() {
            return;
        }
        self.registry.unregister(id);
        self.cache.evict_font(id);
    }

    pub fn set_default_font(&mut self, id: u32) {
        if self.is_destroyed() {
            return;
        }
        self.registry.set_default(id);
    }

    pub fn list_fonts(&self) -> Vec<FontInfo> {
        self.registry.list()
    }

    pub fn clear_fonts(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.registry.clear_all();
        self.cache.clear();
    }

    // ========================================================================
    // Memory surface
    // ========================================================================

    pub fn total_memory_usage(&self) -> usize {
        self.registry.total_memory()
    }

    pub fn check_memory_threshold(&mut self) -> bool {
        let (exceeded, warn) = self.registry.check_threshold(DEFAULT_MEMORY_THRESHOLD);
        if warn {
            log::warn!(
                "font memory usage {} exceeds the {} threshold",
                format_bytes(self.registry.total_memory()),
                format_bytes(DEFAULT_MEMORY_THRESHOLD)
            );
        }
        exceeded
    }

    pub fn memory_metrics(&self) -> MemoryMetrics {
        self.registry.memory_metrics(DEFAULT_MEMORY_THRESHOLD)
    }

    // ========================================================================
    // Cache surface
    // ========================================================================

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn reset_cache_stats(&mut self) {
        self.cache.reset_stats();
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    // ========================================================================
    // Debug / lifecycle
    // ========================================================================

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        if debug {
            log::debug!("debug mode enabled");
        }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Envelope from the most recent layout call, if any.
    pub fn last_envelope(&self) -> Option<&Envelope> {
        self.last_envelope.as_ref()
    }

    /// Metrics from the most recent completed layout, recorded whether or
    /// not the request asked for them in its envelope.
    pub fn last_metrics(&self) -> Option<&PerformanceMetrics> {
        self.last_metrics.as_ref()
    }

    /// Release every font buffer and all accountant state. The instance is
    /// not reusable afterwards; every later operation fails structurally.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        log::debug!("destroying engine instance");
        self.registry.clear_all();
        self.cache.clear();
        self.last_envelope = None;
        self.last_metrics = None;
        self.state = Lifecycle::Destroyed;
    }

    // ========================================================================
    // Request pipeline
    // ========================================================================

    /// Run one layout request to completion and return its envelope.
    ///
    /// Never panics and never escapes as a host exception: every failure
    /// path produces a `success=false` envelope with at least one entry.
    pub fn layout(&mut self, html: &str, options: &LayoutOptions) -> Envelope {
        let envelope = self.run_pipeline(html, options);
        self.last_envelope = Some(envelope.clone());
        envelope
    }

    fn run_pipeline(&mut self, html: &str, options: &LayoutOptions) -> Envelope {
        if self.is_destroyed() {
            return Envelope::failure(ErrorCode::InternalError, "engine instance destroyed");
        }

        let total = Stopwatch::start();
        let mut diag = DiagnosticsCollector::new();
        let debug = self.debug || options.is_debug;

        // --- Validation (1xxx): cheapest first, always fatal ---
        if html.is_empty() {
            return Envelope::failure(ErrorCode::EmptyHtml, "HTML string is empty");
        }
        if html.len() > MAX_HTML_SIZE {
            return Envelope::failure(
                ErrorCode::HtmlTooLarge,
                format!(
                    "HTML size exceeds maximum allowed (10 MiB), got {} bytes",
                    html.len()
                ),
            );
        }
        let viewport_width = match options.viewport_width {
            Some(w) if w > 0 => match u32::try_from(w) {
                Ok(w) => w,
                Err(_) => {
                    return Envelope::failure(
                        ErrorCode::InvalidViewportWidth,
                        format!("Viewport width out of range, got {}", w),
                    )
                }
            },
            Some(w) => {
                return Envelope::failure(
                    ErrorCode::InvalidViewportWidth,
                    format!("Viewport width must be positive, got {}", w),
                )
            }
            None => {
                return Envelope::failure(
                    ErrorCode::InvalidViewportWidth,
                    "Viewport width is required",
                )
            }
        };
        let mode = match &options.mode {
            None => OutputMode::Flat,
            Some(s) => match OutputMode::parse(s) {
                Some(m) => m,
                None => {
                    return Envelope::failure(
                        ErrorCode::InvalidMode,
                        format!("Unknown output mode '{}'", s),
                    )
                }
            },
        };

        let viewport_height = match options.viewport_height {
            Some(h) if h > 0 => u32::try_from(h).unwrap_or(u32::MAX),
            _ => DEFAULT_VIEWPORT_HEIGHT,
        };
        let viewport = Viewport {
            width: viewport_width,
            height: viewport_height,
        };

        if debug {
            log::debug!(
                "layout request: {} of HTML, viewport={}x{}, mode={}",
                format_bytes(html.len()),
                viewport.width,
                viewport.height,
                mode.as_str()
            );
        }

        // --- Font resolution (2xxx): degrade through the fallback chain ---
        if let Some(requested) = options.default_font_id {
            if !self.registry.contains(requested) {
                diag.record_warning(
                    ErrorCode::FontIdNotFound,
                    format!("Requested font id {} is not loaded; using fallback", requested),
                );
            }
        }
        let font = match self.registry.resolve(options.default_font_id) {
            Ok(record) => record.clone(),
            Err(err) => {
                let mut env = Envelope::failure(err.code(), err.to_string());
                let (_, warnings, _) = diag.snapshot();
                env.warnings = warnings;
                return env;
            }
        };

        // --- Layout (3xxx): forwarded verbatim from the backend ---
        let layout_watch = Stopwatch::start();
        let request = BackendRequest {
            html,
            css: options.css.as_deref(),
            viewport,
            font: &font,
            max_characters: options.max_characters,
            timeout_ms: options.timeout,
            debug,
        };
        let tree = match self.backend.layout(&request, &mut self.cache) {
            Ok(tree) => tree,
            Err(err) => {
                let mut env = Envelope::failure(err.code(), err.to_string());
                let (_, warnings, _) = diag.snapshot();
                env.warnings = warnings;
                return env;
            }
        };
        let layout_time = layout_watch.elapsed_ms();

        let character_count = tree.char_count();
        if character_count == 0 {
            diag.record_warning(
                ErrorCode::InvalidInput,
                "No characters were extracted from the HTML; the document may be empty or \
                 contain only non-text elements",
            );
        }
        if debug {
            log::debug!("layout produced {} characters", character_count);
        }

        // --- Serialization (never fails on a well-formed tree) ---
        let serialize_watch = Stopwatch::start();
        let data = serialize_tree(&tree, mode, options.row_tolerance);
        let serialize_time = serialize_watch.elapsed_ms();

        // --- Memory accounting ---
        if self.check_memory_threshold() {
            diag.record_warning(
                ErrorCode::FontMemoryExceeded,
                format!(
                    "Font memory usage exceeds the {} threshold; consider unloading unused fonts",
                    format_bytes(DEFAULT_MEMORY_THRESHOLD)
                ),
            );
        }

        if let Some(rate) = self.cache.stats().hit_rate {
            diag.record_metric("cacheHitRate", rate as f64);
        }

        let (errors, warnings, samples) = diag.snapshot();
        let success = errors.is_empty();

        // Always measured and retained for getMetrics; the envelope only
        // carries them when the request asked.
        let mut metrics = PerformanceMetrics {
            parse_time: 0.0,
            layout_time,
            serialize_time,
            total_time: total.elapsed_ms(),
            character_count,
            input_size: html.len(),
            chars_per_second: 0.0,
            memory_used: self.registry.total_memory(),
            samples,
        };
        metrics.finalize_speed();
        self.last_metrics = Some(metrics.clone());

        if debug {
            log::debug!(
                "layout request finished: success={}, {} chars, {} errors, {} warnings",
                success,
                character_count,
                errors.len(),
                warnings.len()
            );
        }

        Envelope {
            success,
            data: success.then_some(data),
            errors,
            warnings,
            metrics: options.enable_metrics.then_some(metrics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(width: i64) -> LayoutOptions {
        LayoutOptions {
            viewport_width: Some(width),
            ..LayoutOptions::default()
        }
    }

    #[test]
    fn destroyed_instance_fails_structurally() {
        let mut core = EngineCore::new();
        core.register_font(&[0u8; 64], "sans").unwrap();
        core.destroy();

        assert!(core.register_font(&[0u8; 64], "again").is_err());
        let env = core.layout("<p>hi</p>", &options(800));
        assert!(!env.success);
        assert_eq!(env.errors[0].code, ErrorCode::InternalError);
        assert_eq!(core.total_memory_usage(), 0);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut core = EngineCore::new();
        core.destroy();
        core.destroy();
        assert!(core.is_destroyed());
    }

    #[test]
    fn missing_requested_font_degrades_with_warning() {
        let mut core = EngineCore::new();
        core.register_font(&[0u8; 64], "sans").unwrap();
        let env = core.layout(
            "<p>hi</p>",
            &LayoutOptions {
                viewport_width: Some(800),
                default_font_id: Some(42),
                ..LayoutOptions::default()
            },
        );
        assert!(env.success);
        assert!(env
            .warnings
            .iter()
            .any(|w| w.code == ErrorCode::FontIdNotFound));
    }

    #[test]
    fn last_envelope_is_retained() {
        let mut core = EngineCore::new();
        assert!(core.last_envelope().is_none());
        core.layout("", &options(800));
        let last = core.last_envelope().unwrap();
        assert_eq!(last.errors[0].code, ErrorCode::EmptyHtml);
    }
}
