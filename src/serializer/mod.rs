//! Output Serializer
//!
//! Transforms a canonical layout tree into one of four caller-selectable
//! shapes in a single pass, without mutating the tree. The same tree may be
//! serialized in several modes on successive calls.

pub mod rows;
pub mod shapes;

pub use rows::{group_rows, RowBucket};
pub use shapes::{
    FullBlock, FullChar, FullDocument, FullLine, FullRun, LayoutData, OutputMode, RowGroup,
    SimpleChar, SimpleDocument, SimpleLine,
};

use crate::layout::tree::{CharLayout, LayoutTree};

/// Output format version carried by structured shapes.
pub const FORMAT_VERSION: &str = "2.0";

/// Serialize `tree` into the shape selected by `mode`.
///
/// `row_tolerance` overrides the adaptive baseline-bucketing ε used by the
/// byRow and simple modes; `None` means half the prevailing row line height.
pub fn serialize_tree(tree: &LayoutTree, mode: OutputMode, row_tolerance: Option<f32>) -> LayoutData {
    match mode {
        OutputMode::Flat => LayoutData::Flat(flat_chars(tree)),
        OutputMode::ByRow => LayoutData::ByRow(by_row(tree, row_tolerance)),
        OutputMode::Simple => LayoutData::Simple(simple(tree, row_tolerance)),
        OutputMode::Full => LayoutData::Full(full(tree)),
    }
}

/// All characters in document order with full per-character style.
fn flat_chars(tree: &LayoutTree) -> Vec<CharLayout> {
    tree.chars().cloned().collect()
}

fn by_row(tree: &LayoutTree, tolerance: Option<f32>) -> Vec<RowGroup> {
    group_rows(flat_chars(tree), tolerance)
        .into_iter()
        .enumerate()
        .map(|(idx, bucket)| RowGroup {
            row_index: idx,
            y: bucket.top_y(),
            children: bucket.chars,
        })
        .collect()
}

fn simple(tree: &LayoutTree, tolerance: Option<f32>) -> SimpleDocument {
    let lines = group_rows(flat_chars(tree), tolerance)
        .into_iter()
        .enumerate()
        .map(|(idx, bucket)| SimpleLine {
            line_index: idx,
            y: bucket.top_y(),
            baseline: bucket.baseline(),
            height: bucket.height(),
            width: bucket.width(),
            characters: bucket.chars.iter().map(SimpleChar::from).collect(),
        })
        .collect();
    SimpleDocument {
        version: FORMAT_VERSION.to_string(),
        viewport: tree.viewport,
        lines,
    }
}

fn full(tree: &LayoutTree) -> FullDocument {
    let blocks = tree
        .blocks
        .iter()
        .enumerate()
        .map(|(block_idx, block)| FullBlock {
            block_index: block_idx,
            x: block.x,
            y: block.y,
            width: block.width,
            height: block.height,
            lines: block
                .lines
                .iter()
                .enumerate()
                .map(|(line_idx, line)| FullLine {
                    line_index: line_idx,
                    y: line.y,
                    baseline: line.baseline,
                    height: line.height,
                    width: line.width,
                    runs: hoist_runs(line.chars()),
                })
                .collect(),
        })
        .collect();
    FullDocument {
        version: FORMAT_VERSION.to_string(),
        parser_version: env!("CARGO_PKG_VERSION").to_string(),
        viewport: tree.viewport,
        blocks,
    }
}

/// Regroup a line's characters into maximal same-style runs with the shared
/// style hoisted onto the run record. Re-splitting at every style change keeps
/// the re-expression lossless.
fn hoist_runs<'a>(chars: impl Iterator<Item = &'a CharLayout>) -> Vec<FullRun> {
    let mut runs: Vec<FullRun> = Vec::new();
    let mut current: Option<(CharLayout, FullRun)> = None;

    for ch in chars {
        match &mut current {
            Some((style_ref, run)) if style_ref.same_style(ch) => {
                run.characters.push(FullChar::from(ch));
            }
            _ => {
                if let Some((_, run)) = current.take() {
                    runs.push(run);
                }
                let mut run = FullRun::with_style(runs.len(), ch);
                run.characters.push(FullChar::from(ch));
                current = Some((ch.clone(), run));
            }
        }
    }
    if let Some((_, run)) = current {
        runs.push(run);
    }
    runs
}
