//! Minimal text-flow layout backend
//!
//! A deliberately small stand-in for a full HTML/CSS engine: it strips markup,
//! decodes the common entities, breaks lines at block boundaries and `<br>`,
//! and flows the remaining text with estimated glyph advances. It exists so
//! the registry, serializer, and diagnostics layers have a live collaborator;
//! it does not interpret stylesheets.

use crate::errors::EngineError;
use crate::layout::engine::{BackendRequest, LayoutBackend};
use crate::layout::metrics_cache::AdvanceCache;
use crate::layout::tree::{CharLayout, LayoutBlock, LayoutLine, LayoutRun, LayoutTree};

const DEFAULT_FONT_SIZE: f32 = 16.0;
const LINE_HEIGHT_FACTOR: f32 = 1.2;
const ASCENT_FACTOR: f32 = 0.8;

/// Tags that terminate the current block.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "table", "tr", "section",
    "article", "header", "footer", "blockquote", "pre",
];

/// Tags whose entire content is dropped.
const SKIP_TAGS: &[&str] = &["style", "script", "head", "title"];

#[derive(Debug, Default)]
pub struct TextFlowBackend;

impl TextFlowBackend {
    pub fn new() -> Self {
        Self
    }

    /// Estimated advance for one character at `font_size`.
    ///
    /// Monospace-style estimate: CJK and other wide ranges get a full em,
    /// everything else 0.6em. Real shaping lives in the engine this backend
    /// stands in for.
    fn estimate_advance(ch: char, font_size: f32) -> f32 {
        if is_wide(ch) {
            font_size
        } else {
            font_size * 0.6
        }
    }
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x9FFF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x2FFFD
        | 0x30000..=0x3FFFD)
}

/// Flow segmentation event produced by the markup scanner.
#[derive(Debug, PartialEq)]
enum FlowEvent {
    Text(String),
    LineBreak,
    BlockBreak,
}

/// Strip markup into a flat event stream.
///
/// This is not an HTML5 tokenizer; it only needs to be good enough to feed
/// the boundary layers with realistic multi-line content.
fn scan_markup(html: &str) -> Result<Vec<FlowEvent>, EngineError> {
    let mut events = Vec::new();
    let mut text = String::new();
    let mut chars = html.char_indices().peekable();
    let mut skip_until: Option<String> = None;

    while let Some((idx, ch)) = chars.next() {
        if ch == '<' {
            let rest = &html[idx + 1..];

            if let Some(waiting_for) = &skip_until {
                // Inside a skipped region a raw '<' is content (CSS
                // selectors, script operators); only the matching close tag
                // ends the region.
                if let Some(consumed) = matching_close_tag(rest, waiting_for) {
                    for _ in 0..consumed {
                        chars.next();
                    }
                    skip_until = None;
                }
                continue;
            }

            let close = rest.find('>').ok_or_else(|| {
                EngineError::ParseFailed(format!("unterminated tag at byte {}", idx))
            })?;
            let raw_tag = &rest[..close];
            // advance the iterator past the tag body and the '>'
            for _ in 0..raw_tag.chars().count() + 1 {
                chars.next();
            }

            let (is_close, name) = parse_tag_name(raw_tag);

            if SKIP_TAGS.contains(&name.as_str()) && !is_close {
                skip_until = Some(name);
                continue;
            }

            if name == "br" {
                flush_text(&mut events, &mut text);
                events.push(FlowEvent::LineBreak);
            } else if BLOCK_TAGS.contains(&name.as_str()) {
                flush_text(&mut events, &mut text);
                events.push(FlowEvent::BlockBreak);
            }
            continue;
        }

        if skip_until.is_some() {
            continue;
        }

        if ch == '&' {
            let rest = &html[idx + 1..];
            if let Some((entity, len)) = decode_entity(rest) {
                for _ in 0..len {
                    chars.next();
                }
                text.push(entity);
                continue;
            }
        }

        if ch.is_whitespace() {
            // HTML whitespace collapsing
            if !text.ends_with(' ') && !text.is_empty() {
                text.push(' ');
            }
        } else {
            text.push(ch);
        }
    }

    flush_text(&mut events, &mut text);
    Ok(events)
}

fn flush_text(events: &mut Vec<FlowEvent>, text: &mut String) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        events.push(FlowEvent::Text(trimmed.to_string()));
    }
    text.clear();
}

/// If `rest` (the text after a '<') opens the close tag for `name`, return
/// the number of chars to consume through the '>'.
fn matching_close_tag(rest: &str, name: &str) -> Option<usize> {
    let body = rest.strip_prefix('/')?;
    if body.len() < name.len() || !body[..name.len()].eq_ignore_ascii_case(name) {
        return None;
    }
    // reject a longer tag name sharing the prefix, e.g. </styled>
    if body[name.len()..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    let close = rest.find('>')?;
    Some(rest[..close].chars().count() + 1)
}

fn parse_tag_name(raw: &str) -> (bool, String) {
    let body = raw.trim();
    let (is_close, body) = match body.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let name: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    (is_close, name)
}

/// Decode `&name;` / `&#nn;` at the start of `rest`.
/// Returns the decoded char and the number of chars consumed (excluding '&').
fn decode_entity(rest: &str) -> Option<(char, usize)> {
    let semi = rest.find(';')?;
    if semi == 0 || semi > 8 {
        return None;
    }
    let body = &rest[..semi];
    let decoded = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let digits = body.strip_prefix('#')?;
            let code = if let Some(hex) = digits.strip_prefix('x').or(digits.strip_prefix('X')) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse::<u32>().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, semi + 1))
}

impl LayoutBackend for TextFlowBackend {
    fn layout(
        &self,
        req: &BackendRequest<'_>,
        cache: &mut AdvanceCache,
    ) -> Result<LayoutTree, EngineError> {
        let events = scan_markup(req.html)?;

        if req.debug {
            log::debug!(
                "text-flow backend: {} flow events, viewport={}x{}",
                events.len(),
                req.viewport.width,
                req.viewport.height
            );
        }
        if req.css.is_some() && req.debug {
            log::debug!("text-flow backend ignores external stylesheets");
        }

        let font_size = DEFAULT_FONT_SIZE;
        let line_height = font_size * LINE_HEIGHT_FACTOR;
        let viewport_width = req.viewport.width as f32;

        let mut tree = LayoutTree::empty(req.viewport);
        let mut flow = Flow {
            cache,
            font_id: req.font.id,
            font_family: req.font.name.clone(),
            font_size,
            line_height,
            viewport_width,
            max_characters: req.max_characters,
            emitted: 0,
            cursor_y: 0.0,
            block: Vec::new(),
            line: Vec::new(),
            cursor_x: 0.0,
        };

        for event in &events {
            match event {
                FlowEvent::Text(text) => flow.flow_text(text),
                FlowEvent::LineBreak => flow.finish_line(),
                FlowEvent::BlockBreak => flow.finish_block(&mut tree),
            }
            if flow.capped() {
                break;
            }
        }
        flow.finish_block(&mut tree);

        Ok(tree)
    }
}

/// Incremental flow state for one layout pass.
struct Flow<'a> {
    cache: &'a mut AdvanceCache,
    font_id: u32,
    font_family: String,
    font_size: f32,
    line_height: f32,
    viewport_width: f32,
    max_characters: Option<usize>,
    emitted: usize,
    cursor_y: f32,
    block: Vec<LayoutLine>,
    line: Vec<CharLayout>,
    cursor_x: f32,
}

impl Flow<'_> {
    fn capped(&self) -> bool {
        self.max_characters.is_some_and(|cap| self.emitted >= cap)
    }

    fn flow_text(&mut self, text: &str) {
        // Greedy word wrap: measure the next word, break before it if it
        // does not fit on a non-empty line.
        for word in split_words(text) {
            if self.capped() {
                return;
            }
            if word == " " {
                if !self.line.is_empty() {
                    self.push_char(' ');
                }
                continue;
            }
            let word_width: f32 = word
                .chars()
                .map(|c| self.advance_of(c))
                .sum();
            if self.cursor_x + word_width > self.viewport_width && !self.line.is_empty() {
                self.finish_line();
            }
            for ch in word.chars() {
                if self.capped() {
                    return;
                }
                self.push_char(ch);
            }
        }
    }

    fn advance_of(&mut self, ch: char) -> f32 {
        let size = self.font_size;
        self.cache
            .advance(self.font_id, size, ch, || {
                TextFlowBackend::estimate_advance(ch, size)
            })
    }

    fn push_char(&mut self, ch: char) {
        let advance = self.advance_of(ch);
        let layout = CharLayout {
            character: ch.to_string(),
            x: self.cursor_x,
            y: self.cursor_y,
            width: advance,
            height: self.font_size,
            baseline: self.cursor_y + self.font_size * ASCENT_FACTOR,
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            font_id: self.font_id,
            ..CharLayout::default()
        };
        self.line.push(layout);
        self.cursor_x += advance;
        self.emitted += 1;
    }

    fn finish_line(&mut self) {
        // Drop a trailing wrap space so line width reflects visible content
        if let Some(last) = self.line.last() {
            if last.character == " " {
                self.line.pop();
            }
        }
        if self.line.is_empty() {
            // hard break on an empty line still advances the cursor
            self.cursor_y += self.line_height;
            self.cursor_x = 0.0;
            return;
        }
        let chars = std::mem::take(&mut self.line);
        let first_x = chars.first().map(|c| c.x).unwrap_or(0.0);
        let last_right = chars.last().map(|c| c.x + c.width).unwrap_or(0.0);
        let line = LayoutLine {
            y: self.cursor_y,
            baseline: self.cursor_y + self.font_size * ASCENT_FACTOR,
            height: self.line_height,
            width: last_right - first_x,
            runs: vec![LayoutRun {
                x: first_x,
                chars,
            }],
        };
        self.block.push(line);
        self.cursor_y += self.line_height;
        self.cursor_x = 0.0;
    }

    fn finish_block(&mut self, tree: &mut LayoutTree) {
        if !self.line.is_empty() {
            self.finish_line();
        }
        if self.block.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.block);
        let top = lines.first().map(|l| l.y).unwrap_or(0.0);
        let bottom = lines.last().map(|l| l.y + l.height).unwrap_or(top);
        tree.blocks.push(LayoutBlock {
            x: 0.0,
            y: top,
            width: self.viewport_width,
            height: bottom - top,
            lines,
        });
    }
}

/// Split text into words and single-space separators.
fn split_words(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if ch == ' ' {
            if idx > start {
                out.push(&text[start..idx]);
            }
            out.push(" ");
            start = idx + 1;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_strips_tags_and_breaks_lines() {
        let events = scan_markup("<p>hello<br>world</p>").unwrap();
        assert_eq!(
            events,
            vec![
                FlowEvent::BlockBreak,
                FlowEvent::Text("hello".to_string()),
                FlowEvent::LineBreak,
                FlowEvent::Text("world".to_string()),
                FlowEvent::BlockBreak,
            ]
        );
    }

    #[test]
    fn scanner_skips_style_content() {
        let events = scan_markup("<style>p { color: red; }</style>hi").unwrap();
        assert_eq!(events, vec![FlowEvent::Text("hi".to_string())]);
    }

    #[test]
    fn raw_angle_bracket_inside_skip_tag_is_content() {
        // a '<' in CSS text must not swallow the closing </style>
        let events = scan_markup("<style>a<b { color: red }</style>hi").unwrap();
        assert_eq!(events, vec![FlowEvent::Text("hi".to_string())]);

        // close tag matching is case-insensitive, and a longer tag name
        // sharing the prefix does not end the region
        let events = scan_markup("<script>if (a</b) {}</SCRIPT>ok").unwrap();
        assert_eq!(events, vec![FlowEvent::Text("ok".to_string())]);
    }

    #[test]
    fn scanner_decodes_entities() {
        let events = scan_markup("a &amp; b &#65;").unwrap();
        assert_eq!(events, vec![FlowEvent::Text("a & b A".to_string())]);
    }

    #[test]
    fn unterminated_tag_is_a_parse_failure() {
        assert!(scan_markup("<p unterminated").is_err());
    }

    #[test]
    fn whitespace_collapses() {
        let events = scan_markup("a\n\n   b").unwrap();
        assert_eq!(events, vec![FlowEvent::Text("a b".to_string())]);
    }
}
