//! Baseline bucketing shared by the byRow and simple modes
//!
//! Floating-point layout can place characters of one visual line at slightly
//! different baseline values, so grouping by exact Y is wrong. Characters are
//! bucketed by baseline distance instead: a character joins the open row when
//! its baseline is within ε of the row's first baseline, where ε defaults to
//! half the prevailing (max) line height seen in that row so far.
//!
//! byRow and simple both go through `group_rows`, which is what makes their
//! per-row character sets identical by construction.

use crate::layout::tree::CharLayout;

/// One grouped row of characters, ascending x (ties keep document order).
#[derive(Clone, Debug)]
pub struct RowBucket {
    pub chars: Vec<CharLayout>,
}

impl RowBucket {
    /// Top Y of the row: min over members.
    pub fn top_y(&self) -> f32 {
        self.chars
            .iter()
            .map(|c| c.y)
            .fold(f32::INFINITY, f32::min)
    }

    /// Row baseline: max member baseline, matching how a mixed-size line
    /// settles on the deepest baseline.
    pub fn baseline(&self) -> f32 {
        self.chars.iter().map(|c| c.baseline).fold(0.0, f32::max)
    }

    /// Row height: max member height.
    pub fn height(&self) -> f32 {
        self.chars.iter().map(|c| c.height).fold(0.0, f32::max)
    }

    /// Horizontal extent from the first member's left edge to the rightmost
    /// member's right edge.
    pub fn width(&self) -> f32 {
        let left = self.chars.iter().map(|c| c.x).fold(f32::INFINITY, f32::min);
        let right = self
            .chars
            .iter()
            .map(|c| c.x + c.width)
            .fold(f32::NEG_INFINITY, f32::max);
        if right > left {
            right - left
        } else {
            0.0
        }
    }
}

/// Bucket `chars` into rows by baseline proximity.
///
/// `tolerance` overrides the adaptive ε; `None` uses half the prevailing
/// line height of the open row. Rows come back ordered by ascending top-y.
pub fn group_rows(chars: Vec<CharLayout>, tolerance: Option<f32>) -> Vec<RowBucket> {
    if chars.is_empty() {
        return Vec::new();
    }

    // Stable sort by baseline keeps document order between equal baselines.
    let mut ordered = chars;
    ordered.sort_by(|a, b| a.baseline.total_cmp(&b.baseline));

    let mut buckets: Vec<RowBucket> = Vec::new();
    let mut current: Vec<CharLayout> = Vec::new();
    let mut row_baseline = 0.0f32;
    let mut row_line_height = 0.0f32;

    for ch in ordered {
        if current.is_empty() {
            row_baseline = ch.baseline;
            row_line_height = ch.height;
            current.push(ch);
            continue;
        }
        let eps = tolerance.unwrap_or(row_line_height * 0.5).max(f32::EPSILON);
        if (ch.baseline - row_baseline).abs() < eps {
            row_line_height = row_line_height.max(ch.height);
            current.push(ch);
        } else {
            buckets.push(seal(std::mem::take(&mut current)));
            row_baseline = ch.baseline;
            row_line_height = ch.height;
            current.push(ch);
        }
    }
    if !current.is_empty() {
        buckets.push(seal(current));
    }

    // Rows by ascending top-y. Bucketing emits them in baseline order, which
    // is almost always already top-y order; the sort covers exotic metrics.
    buckets.sort_by(|a, b| a.top_y().total_cmp(&b.top_y()));
    buckets
}

/// Order a finished row by x; stable, so identical x (zero-width or stacked
/// marks) keeps source order.
fn seal(mut chars: Vec<CharLayout>) -> RowBucket {
    chars.sort_by(|a, b| a.x.total_cmp(&b.x));
    RowBucket { chars }
}
