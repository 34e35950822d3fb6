//! Error taxonomy and diagnostic entry types
//!
//! The numeric error codes are part of the wire contract with the JavaScript
//! host and must stay bit-exact across releases. Internally everything is a
//! typed `Result`; the integer sentinels only appear at the WASM boundary.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

/// Closed error code taxonomy shared with the host.
///
/// Grouped by range:
/// - 1xxx input validation
/// - 2xxx fonts
/// - 3xxx parse/layout (forwarded from the layout backend)
/// - 4xxx memory
/// - 5xxx internal/serialization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum ErrorCode {
    // Input validation errors (1xxx)
    InvalidInput = 1001,
    EmptyHtml = 1002,
    InvalidViewportWidth = 1003,
    InvalidMode = 1004,
    InvalidOptions = 1005,
    HtmlTooLarge = 1006,

    // Font-related errors (2xxx)
    FontNotLoaded = 2001,
    FontLoadFailed = 2002,
    FontDataInvalid = 2003,
    FontNameEmpty = 2004,
    FontIdNotFound = 2005,
    NoDefaultFont = 2006,
    FontMemoryExceeded = 2007,

    // Parsing/layout errors (3xxx)
    ParseFailed = 3001,
    DocumentCreationFailed = 3002,
    RenderFailed = 3003,
    LayoutFailed = 3004,
    CssParseError = 3005,

    // Memory errors (4xxx)
    MemoryAllocationFailed = 4001,
    MemoryLimitExceeded = 4002,

    // Internal errors (5xxx)
    InternalError = 5001,
    SerializationFailed = 5002,
    UnknownError = 5999,
}

impl ErrorCode {
    /// Screaming-snake name used alongside the numeric code on the wire.
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::EmptyHtml => "EMPTY_HTML",
            ErrorCode::InvalidViewportWidth => "INVALID_VIEWPORT_WIDTH",
            ErrorCode::InvalidMode => "INVALID_MODE",
            ErrorCode::InvalidOptions => "INVALID_OPTIONS",
            ErrorCode::HtmlTooLarge => "HTML_TOO_LARGE",
            ErrorCode::FontNotLoaded => "FONT_NOT_LOADED",
            ErrorCode::FontLoadFailed => "FONT_LOAD_FAILED",
            ErrorCode::FontDataInvalid => "FONT_DATA_INVALID",
            ErrorCode::FontNameEmpty => "FONT_NAME_EMPTY",
            ErrorCode::FontIdNotFound => "FONT_ID_NOT_FOUND",
            ErrorCode::NoDefaultFont => "NO_DEFAULT_FONT",
            ErrorCode::FontMemoryExceeded => "FONT_MEMORY_EXCEEDED",
            ErrorCode::ParseFailed => "PARSE_FAILED",
            ErrorCode::DocumentCreationFailed => "DOCUMENT_CREATION_FAILED",
            ErrorCode::RenderFailed => "RENDER_FAILED",
            ErrorCode::LayoutFailed => "LAYOUT_FAILED",
            ErrorCode::CssParseError => "CSS_PARSE_ERROR",
            ErrorCode::MemoryAllocationFailed => "MEMORY_ALLOCATION_FAILED",
            ErrorCode::MemoryLimitExceeded => "MEMORY_LIMIT_EXCEEDED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::SerializationFailed => "SERIALIZATION_FAILED",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Numeric value as it appears in the envelope.
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Severity of a diagnostic entry.
///
/// `Error` fails the request (`success=false`); `Warning` leaves success
/// intact; `Info` is non-actionable (e.g. a cache hit note).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One diagnostic entry in the envelope's `errors` or `warnings` arrays.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    /// Numeric taxonomy code (bit-exact wire value)
    pub code: ErrorCode,

    /// Screaming-snake string form of the code
    pub code_name: String,

    /// Human-readable message
    pub message: String,

    /// Entry severity
    pub severity: Severity,

    /// Source line, when the backend can attribute one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Source column, when the backend can attribute one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ErrorEntry {
    pub fn new(code: ErrorCode, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            code,
            code_name: code.name().to_string(),
            message: message.into(),
            severity,
            line: None,
            column: None,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message, Severity::Error)
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message, Severity::Warning)
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Failure reported by the layout backend collaborator.
///
/// Variants map 1:1 onto the 3xxx taxonomy range; messages are forwarded
/// verbatim into the envelope.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// HTML tokenization/parsing failed
    #[error("HTML parsing failed: {0}")]
    ParseFailed(String),

    /// Document tree could not be constructed
    #[error("Document creation failed: {0}")]
    DocumentCreationFailed(String),

    /// Rendering pass failed
    #[error("Render failed: {0}")]
    RenderFailed(String),

    /// Box layout failed
    #[error("Layout failed: {0}")]
    LayoutFailed(String),

    /// Stylesheet could not be parsed
    #[error("CSS parsing failed: {0}")]
    CssParseError(String),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::ParseFailed(_) => ErrorCode::ParseFailed,
            EngineError::DocumentCreationFailed(_) => ErrorCode::DocumentCreationFailed,
            EngineError::RenderFailed(_) => ErrorCode::RenderFailed,
            EngineError::LayoutFailed(_) => ErrorCode::LayoutFailed,
            EngineError::CssParseError(_) => ErrorCode::CssParseError,
        }
    }
}

impl From<&EngineError> for ErrorEntry {
    fn from(err: &EngineError) -> Self {
        ErrorEntry::error(err.code(), err.to_string())
    }
}

/// Failure from the font registry.
#[derive(Debug, Clone, Error)]
pub enum FontError {
    /// Register called with an empty byte buffer
    #[error("Font data is empty")]
    EmptyData,

    /// No requested font, no default, and no registered fonts at all
    #[error("No font is loaded; register a font before layout")]
    NotLoaded,
}

impl FontError {
    pub fn code(&self) -> ErrorCode {
        match self {
            FontError::EmptyData => ErrorCode::FontDataInvalid,
            FontError::NotLoaded => ErrorCode::FontNotLoaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_keep_wire_values() {
        assert_eq!(ErrorCode::InvalidInput.as_u16(), 1001);
        assert_eq!(ErrorCode::FontNotLoaded.as_u16(), 2001);
        assert_eq!(ErrorCode::ParseFailed.as_u16(), 3001);
        assert_eq!(ErrorCode::MemoryAllocationFailed.as_u16(), 4001);
        assert_eq!(ErrorCode::SerializationFailed.as_u16(), 5002);
        assert_eq!(ErrorCode::UnknownError.as_u16(), 5999);
    }

    #[test]
    fn error_code_serializes_as_number() {
        let json = serde_json::to_string(&ErrorCode::FontNotLoaded).unwrap();
        assert_eq!(json, "2001");
    }

    #[test]
    fn entry_carries_both_code_forms() {
        let entry = ErrorEntry::error(ErrorCode::EmptyHtml, "HTML string is empty");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["code"], 1002);
        assert_eq!(json["codeName"], "EMPTY_HTML");
        assert_eq!(json["severity"], "error");
        assert!(json.get("line").is_none());
    }
}
