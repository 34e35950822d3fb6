//! Wire shapes for the four output modes
//!
//! Exactly one shape is produced per request, selected by `OutputMode`. The
//! union is untagged on the wire: the host already knows which mode it asked
//! for.

use serde::{Deserialize, Serialize};

use crate::layout::tree::{CharLayout, TextDecoration, Transform, Viewport};

/// Caller-selectable output shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    #[default]
    #[serde(rename = "flat")]
    Flat,
    #[serde(rename = "byRow")]
    ByRow,
    #[serde(rename = "simple")]
    Simple,
    #[serde(rename = "full")]
    Full,
}

impl OutputMode {
    /// Parse a mode string from the options object. `byrow` is accepted as a
    /// legacy alias. Unknown strings are a validation error, not a silent
    /// fallback.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flat" => Some(OutputMode::Flat),
            "byRow" | "byrow" => Some(OutputMode::ByRow),
            "simple" => Some(OutputMode::Simple),
            "full" => Some(OutputMode::Full),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Flat => "flat",
            OutputMode::ByRow => "byRow",
            OutputMode::Simple => "simple",
            OutputMode::Full => "full",
        }
    }
}

/// Mode-dependent payload of the envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutData {
    Flat(Vec<CharLayout>),
    ByRow(Vec<RowGroup>),
    Simple(SimpleDocument),
    Full(FullDocument),
}

impl LayoutData {
    /// Number of character records in the payload, independent of shape.
    pub fn char_count(&self) -> usize {
        match self {
            LayoutData::Flat(chars) => chars.len(),
            LayoutData::ByRow(rows) => rows.iter().map(|r| r.children.len()).sum(),
            LayoutData::Simple(doc) => doc.lines.iter().map(|l| l.characters.len()).sum(),
            LayoutData::Full(doc) => doc
                .blocks
                .iter()
                .flat_map(|b| b.lines.iter())
                .flat_map(|l| l.runs.iter())
                .map(|r| r.characters.len())
                .sum(),
        }
    }
}

/// One baseline bucket in byRow output.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowGroup {
    pub row_index: usize,

    /// Top Y of the row (min over members)
    pub y: f32,

    /// Members, ascending x; identical x keeps document order
    pub children: Vec<CharLayout>,
}

/// Stripped character record for minimal consumers (simple mode).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleChar {
    pub character: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub baseline: f32,
}

impl From<&CharLayout> for SimpleChar {
    fn from(ch: &CharLayout) -> Self {
        Self {
            character: ch.character.clone(),
            x: ch.x,
            y: ch.y,
            width: ch.width,
            height: ch.height,
            baseline: ch.baseline,
        }
    }
}

/// One line in simple mode (same bucketing as byRow).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleLine {
    pub line_index: usize,
    pub y: f32,
    pub baseline: f32,
    pub height: f32,
    pub width: f32,
    pub characters: Vec<SimpleChar>,
}

/// Two-level lines → characters structure.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleDocument {
    pub version: String,
    pub viewport: Viewport,
    pub lines: Vec<SimpleLine>,
}

/// Character record inside a full-mode run: geometry only, style lives on
/// the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FullChar {
    pub character: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub baseline: f32,
}

impl From<&CharLayout> for FullChar {
    fn from(ch: &CharLayout) -> Self {
        Self {
            character: ch.character.clone(),
            x: ch.x,
            y: ch.y,
            width: ch.width,
            height: ch.height,
            baseline: ch.baseline,
        }
    }
}

/// A run with the shared style hoisted off its characters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullRun {
    pub run_index: usize,

    /// Starting X of the run
    pub x: f32,

    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub font_style: String,
    pub color: String,
    pub background_color: String,
    pub opacity: f32,
    pub text_decoration: TextDecoration,
    pub transform: Transform,
    pub direction: String,
    pub font_id: u32,

    pub characters: Vec<FullChar>,
}

impl FullRun {
    /// New empty run carrying `ch`'s style.
    pub fn with_style(run_index: usize, ch: &CharLayout) -> Self {
        Self {
            run_index,
            x: ch.x,
            font_family: ch.font_family.clone(),
            font_size: ch.font_size,
            font_weight: ch.font_weight,
            font_style: ch.font_style.clone(),
            color: ch.color.clone(),
            background_color: ch.background_color.clone(),
            opacity: ch.opacity,
            text_decoration: ch.text_decoration.clone(),
            transform: ch.transform.clone(),
            direction: ch.direction.clone(),
            font_id: ch.font_id,
            characters: Vec::new(),
        }
    }
}

/// One line in full mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullLine {
    pub line_index: usize,
    pub y: f32,
    pub baseline: f32,
    pub height: f32,
    pub width: f32,
    pub runs: Vec<FullRun>,
}

/// One block-level element in full mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullBlock {
    pub block_index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<FullLine>,
}

/// Lossless Block → Line → Run → Character re-expression of the tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullDocument {
    pub version: String,
    pub parser_version: String,
    pub viewport: Viewport,
    pub blocks: Vec<FullBlock>,
}
