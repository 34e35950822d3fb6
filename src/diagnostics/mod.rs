//! Diagnostics and metrics collection for one request
//!
//! The collector accumulates errors, warnings, and metric samples while a
//! request runs and merges into the final envelope via `snapshot()`. It never
//! fails: `snapshot()` is safe after any partial failure and always yields a
//! well-formed (possibly empty) report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorCode, ErrorEntry, Severity};
use crate::serializer::LayoutData;

/// Performance metrics for one layout request. Times are milliseconds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub parse_time: f64,
    pub layout_time: f64,
    pub serialize_time: f64,
    pub total_time: f64,
    pub character_count: usize,
    pub input_size: usize,
    pub chars_per_second: f64,

    /// Font memory held by the registry when the request finished
    pub memory_used: usize,

    /// Named samples recorded during the request (cache hit rates etc.)
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub samples: BTreeMap<String, f64>,
}

impl PerformanceMetrics {
    pub fn finalize_speed(&mut self) {
        if self.total_time > 0.0 {
            self.chars_per_second = self.character_count as f64 * 1000.0 / self.total_time;
        }
    }
}

/// The envelope returned by every layout call.
///
/// `data` is omitted rather than partially populated on failure; `errors`
/// and `warnings` are always present. `success` never coexists with an
/// `errors` entry of severity error.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<LayoutData>,

    pub errors: Vec<ErrorEntry>,
    pub warnings: Vec<ErrorEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PerformanceMetrics>,
}

impl Envelope {
    /// Failed envelope carrying a single error entry.
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            errors: vec![ErrorEntry::error(code, message)],
            warnings: Vec::new(),
            metrics: None,
        }
    }
}

/// Per-request accumulator for errors, warnings, and metric samples.
#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    errors: Vec<ErrorEntry>,
    warnings: Vec<ErrorEntry>,
    samples: BTreeMap<String, f64>,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry at the given severity. Severity decides which array
    /// it lands in: errors fail the request, warnings and infos do not.
    pub fn record(&mut self, code: ErrorCode, message: impl Into<String>, severity: Severity) {
        let entry = ErrorEntry::new(code, message, severity);
        match severity {
            Severity::Error => self.errors.push(entry),
            Severity::Warning | Severity::Info => self.warnings.push(entry),
        }
    }

    pub fn record_error(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.record(code, message, Severity::Error);
    }

    pub fn record_warning(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.record(code, message, Severity::Warning);
    }

    pub fn record_info(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.record(code, message, Severity::Info);
    }

    pub fn record_entry(&mut self, entry: ErrorEntry) {
        if entry.is_error() {
            self.errors.push(entry);
        } else {
            self.warnings.push(entry);
        }
    }

    /// Record a named metric sample; later samples with the same name win.
    pub fn record_metric(&mut self, name: impl Into<String>, value: f64) {
        self.samples.insert(name.into(), value);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Drain the collector into `(errors, warnings, samples)`.
    /// Always well-formed, including after a partially-failed request.
    pub fn snapshot(self) -> (Vec<ErrorEntry>, Vec<ErrorEntry>, BTreeMap<String, f64>) {
        (self.errors, self.warnings, self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_routes_entries() {
        let mut diag = DiagnosticsCollector::new();
        diag.record_error(ErrorCode::ParseFailed, "bad");
        diag.record_warning(ErrorCode::FontMemoryExceeded, "heavy");
        diag.record_info(ErrorCode::InvalidInput, "cache hit");
        assert!(diag.has_errors());
        let (errors, warnings, _) = diag.snapshot();
        assert_eq!(errors.len(), 1);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[1].severity, Severity::Info);
    }

    #[test]
    fn empty_snapshot_is_well_formed() {
        let (errors, warnings, samples) = DiagnosticsCollector::new().snapshot();
        assert!(errors.is_empty());
        assert!(warnings.is_empty());
        assert!(samples.is_empty());
    }

    #[test]
    fn metric_samples_deduplicate_by_name() {
        let mut diag = DiagnosticsCollector::new();
        diag.record_metric("cacheHitRate", 0.2);
        diag.record_metric("cacheHitRate", 0.8);
        let (_, _, samples) = diag.snapshot();
        assert_eq!(samples["cacheHitRate"], 0.8);
    }

    #[test]
    fn chars_per_second_derives_from_totals() {
        let mut m = PerformanceMetrics {
            total_time: 50.0,
            character_count: 100,
            ..PerformanceMetrics::default()
        };
        m.finalize_speed();
        assert_eq!(m.chars_per_second, 2000.0);
    }
}
