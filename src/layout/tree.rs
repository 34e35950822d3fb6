//! Canonical Layout Tree
//!
//! The authoritative, cascade-resolved Block → Line → Run → Character
//! structure produced by the layout backend for one document. Every character
//! carries fully resolved geometry and style; no CSS resolution happens past
//! this point. The tree is immutable input to the serializer and may be
//! reused to produce several output modes.

use serde::{Deserialize, Serialize};

/// Viewport dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Text decoration styling, mapping to the CSS text-decoration-* properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDecoration {
    pub underline: bool,
    pub overline: bool,
    pub line_through: bool,

    /// Decoration color, #rrggbbaa
    pub color: String,

    /// solid/double/dotted/dashed/wavy
    pub style: String,

    /// Thickness in pixels
    pub thickness: f32,
}

impl Default for TextDecoration {
    fn default() -> Self {
        Self {
            underline: false,
            overline: false,
            line_through: false,
            color: String::new(),
            style: "solid".to_string(),
            thickness: 1.0,
        }
    }
}

/// CSS transform components resolved for one character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub skew_x: f32,
    pub skew_y: f32,
    pub rotate: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            rotate: 0.0,
        }
    }
}

/// One laid-out character with resolved geometry and style.
///
/// All positions and sizes are pixels; colors are #rrggbbaa strings for
/// direct Canvas consumption.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharLayout {
    /// Character content (one scalar value, UTF-8)
    pub character: String,

    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    /// Baseline Y position
    pub baseline: f32,

    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,

    /// normal/italic/oblique
    pub font_style: String,

    /// Text color, #rrggbbaa
    pub color: String,

    /// Background color, #rrggbbaa
    pub background_color: String,

    pub opacity: f32,
    pub text_decoration: TextDecoration,
    pub transform: Transform,

    /// ltr/rtl
    pub direction: String,

    /// Registry handle of the font that shaped this character
    pub font_id: u32,
}

impl Default for CharLayout {
    fn default() -> Self {
        Self {
            character: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            baseline: 0.0,
            font_family: String::new(),
            font_size: 16.0,
            font_weight: 400,
            font_style: "normal".to_string(),
            color: "#000000ff".to_string(),
            background_color: "#00000000".to_string(),
            opacity: 1.0,
            text_decoration: TextDecoration::default(),
            transform: Transform::default(),
            direction: "ltr".to_string(),
            font_id: 0,
        }
    }
}

impl CharLayout {
    /// Style equality, ignoring geometry and content. Used for run grouping.
    pub fn same_style(&self, other: &CharLayout) -> bool {
        self.font_family == other.font_family
            && self.font_size == other.font_size
            && self.font_weight == other.font_weight
            && self.font_style == other.font_style
            && self.color == other.color
            && self.background_color == other.background_color
            && self.opacity == other.opacity
            && self.text_decoration == other.text_decoration
            && self.transform == other.transform
            && self.direction == other.direction
            && self.font_id == other.font_id
    }
}

/// Contiguous characters sharing a style within one line.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutRun {
    /// Starting X of the run
    pub x: f32,
    pub chars: Vec<CharLayout>,
}

/// One line of text within a block.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutLine {
    /// Line top Y
    pub y: f32,
    pub baseline: f32,
    pub height: f32,
    pub width: f32,
    pub runs: Vec<LayoutRun>,
}

impl LayoutLine {
    pub fn chars(&self) -> impl Iterator<Item = &CharLayout> {
        self.runs.iter().flat_map(|r| r.chars.iter())
    }
}

/// One block-level element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<LayoutLine>,
}

/// Root of the canonical layout tree for one document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutTree {
    pub viewport: Viewport,
    pub blocks: Vec<LayoutBlock>,
}

impl LayoutTree {
    pub fn empty(viewport: Viewport) -> Self {
        Self {
            viewport,
            blocks: Vec::new(),
        }
    }

    /// All characters in document order.
    pub fn chars(&self) -> impl Iterator<Item = &CharLayout> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .flat_map(|l| l.chars())
    }

    pub fn char_count(&self) -> usize {
        self.chars().count()
    }
}
