//! # Text Measurement
//!
//! Line breaking and text measurement behind a pluggable service.
//!
//! The layout core never touches font data directly: it hands a string and
//! a wrap width to a [`TextMeasure`] and gets back a [`MeasuredText`] — the
//! line count, each line's vertical extents, and the content box, all in
//! device units. The core converts between points and device units through
//! a caller-supplied [`Resolution`], so a measurement service can run at
//! print resolution while the layout stays in points.
//!
//! Two implementations ship with the crate:
//!
//! - [`FaceMeasure`] — real font metrics parsed with `ttf-parser` plus
//!   UAX#14 break opportunities from `unicode-linebreak`.
//! - [`GridMeasure`] — fixed uniform metrics. Deterministic, serializable,
//!   and the measurer used for JSON requests and tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_bidi::BidiInfo;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Base paragraph direction for a layout run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// Detect the paragraph direction of `text` from its first strong
/// character (UAX#9). Neutral-only text reads as left-to-right.
pub fn detect_direction(text: &str) -> Direction {
    if text.is_empty() {
        return Direction::Ltr;
    }
    let info = BidiInfo::new(text, None);
    match info.paragraphs.first() {
        Some(para) if para.level.is_rtl() => Direction::Rtl,
        _ => Direction::Ltr,
    }
}

/// Conversion factor between points and device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Device units per inch.
    pub dpi: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self { dpi: 72 }
    }
}

impl Resolution {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    /// Convert a length in points to device units, rounding to nearest.
    pub fn points_to_pixels(&self, length: f64) -> i32 {
        (length * self.dpi as f64 / 72.0).round() as i32
    }

    /// Convert a length in device units to points.
    pub fn pixels_to_points(&self, length: i32) -> f64 {
        length as f64 * 72.0 / self.dpi as f64
    }
}

/// Vertical extents and width of one laid-out line, in device units.
/// `top`/`bottom`/`baseline` are relative to the top of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMetrics {
    pub top: i32,
    pub bottom: i32,
    pub baseline: i32,
    pub width: i32,
}

/// A multi-line text layout produced by a [`TextMeasure`].
///
/// Invariant: lines are in top-to-bottom order and do not overlap;
/// `height` is the bottom of the last line and `width` the widest line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasuredText {
    pub lines: Vec<LineMetrics>,
    pub width: i32,
    pub height: i32,
}

impl MeasuredText {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Top of line `line`; `line == line_count()` yields the layout height,
    /// so `line_top(i + 1)` is always the bottom boundary of line `i`.
    pub fn line_top(&self, line: usize) -> i32 {
        if line >= self.lines.len() {
            self.height
        } else {
            self.lines[line].top
        }
    }

    /// Baseline of line `line`, relative to the layout top.
    pub fn line_baseline(&self, line: usize) -> i32 {
        self.lines.get(line).map_or(0, |l| l.baseline)
    }

    /// The index of the line containing vertical offset `v`: the last line
    /// whose top is at or above `v`. Clamps to the first and last line.
    pub fn line_for_vertical(&self, v: i32) -> usize {
        if self.lines.is_empty() {
            return 0;
        }
        let mut line = 0;
        for (i, metrics) in self.lines.iter().enumerate() {
            if metrics.top > v {
                break;
            }
            line = i;
        }
        line
    }

    /// Drop trailing lines until the layout fits in `max_height` device
    /// units. The line straddling the limit is dropped, not clipped.
    pub fn truncate_to_height(&mut self, max_height: i32) {
        if self.height <= max_height {
            return;
        }
        let mut keep = self.line_for_vertical(max_height);
        if keep < self.lines.len() && self.lines[keep].top > max_height {
            keep = keep.saturating_sub(1);
        }
        self.lines.truncate(keep);
        self.recompute_extents();
    }

    fn recompute_extents(&mut self) {
        self.width = self.lines.iter().map(|l| l.width).max().unwrap_or(0);
        self.height = self.lines.last().map_or(0, |l| l.bottom);
    }
}

/// The pluggable text-measurement service.
///
/// Implementations must be synchronous and deterministic: the same
/// `(text, max_width)` pair always yields the same layout. The engine
/// reuses results across clipping passes on that assumption.
pub trait TextMeasure {
    /// Lay out `text` wrapped to `max_width` device units.
    ///
    /// Empty text yields an empty layout (zero lines), which the layout
    /// core treats as "nothing to print" for the field.
    fn measure(&self, text: &str, max_width: i32) -> MeasuredText;
}

// ─── Fixed-metrics measurer ─────────────────────────────────────────

/// A measurer with one advance width for every glyph and a fixed line
/// height. Exact by construction, so it is the measurer carried inside
/// JSON requests and used throughout the test suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMeasure {
    /// Advance width of every glyph, device units.
    pub advance: i32,
    /// Line height, device units.
    pub line_height: i32,
    /// Baseline offset from the line top, device units.
    pub ascent: i32,
}

impl Default for GridMeasure {
    fn default() -> Self {
        Self {
            advance: 6,
            line_height: 12,
            ascent: 9,
        }
    }
}

impl GridMeasure {
    fn push_line(&self, lines: &mut Vec<LineMetrics>, chars: usize) {
        let top = lines.len() as i32 * self.line_height;
        lines.push(LineMetrics {
            top,
            bottom: top + self.line_height,
            baseline: top + self.ascent,
            width: chars as i32 * self.advance,
        });
    }
}

impl TextMeasure for GridMeasure {
    fn measure(&self, text: &str, max_width: i32) -> MeasuredText {
        if text.is_empty() {
            return MeasuredText::empty();
        }
        let per_line = (max_width / self.advance.max(1)).max(1) as usize;

        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = 0usize;
            let mut any = false;
            for word in paragraph.split(' ') {
                let word_len = word.chars().count();
                if !any && word_len == 0 {
                    continue;
                }
                if current == 0 {
                    // A word longer than the line hard-splits.
                    let mut rest = word_len;
                    while rest > per_line {
                        self.push_line(&mut lines, per_line);
                        rest -= per_line;
                    }
                    current = rest;
                    any = true;
                } else if current + 1 + word_len <= per_line {
                    current += 1 + word_len;
                } else {
                    self.push_line(&mut lines, current);
                    let mut rest = word_len;
                    while rest > per_line {
                        self.push_line(&mut lines, per_line);
                        rest -= per_line;
                    }
                    current = rest;
                }
            }
            if current > 0 || !any {
                self.push_line(&mut lines, current);
            }
        }

        let mut measured = MeasuredText {
            lines,
            width: 0,
            height: 0,
        };
        measured.recompute_extents();
        measured
    }
}

// ─── Font-metrics measurer ──────────────────────────────────────────

/// A measurer backed by real font metrics.
///
/// Parses advance widths and vertical metrics out of a TrueType/OpenType
/// face with `ttf-parser`, and breaks lines greedily at UAX#14
/// opportunities from `unicode-linebreak`.
#[derive(Debug, Clone)]
pub struct FaceMeasure {
    units_per_em: u16,
    advances: HashMap<char, u16>,
    default_advance: u16,
    ascender: i16,
    descender: i16,
    line_gap: i16,
    /// Font size in device units.
    size: f64,
}

impl FaceMeasure {
    /// Parse a face from raw font data at the given size (device units).
    /// Returns `None` when the data is not a parseable font.
    pub fn from_font_data(data: &[u8], size: f64) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let line_gap = face.line_gap();

        let mut advances = HashMap::new();
        let mut default_advance = 0u16;
        // Sample the BMP to build the advance-width map.
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advances.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }
        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(Self {
            units_per_em,
            advances,
            default_advance,
            ascender,
            descender,
            line_gap,
            size,
        })
    }

    #[cfg(test)]
    fn synthetic(advance: u16, size: f64) -> Self {
        Self {
            units_per_em: 1000,
            advances: HashMap::new(),
            default_advance: advance,
            ascender: 800,
            descender: -200,
            line_gap: 0,
            size,
        }
    }

    fn char_width(&self, ch: char) -> f64 {
        let advance = self.advances.get(&ch).copied().unwrap_or(self.default_advance);
        advance as f64 / self.units_per_em as f64 * self.size
    }

    fn line_height(&self) -> f64 {
        (self.ascender as f64 - self.descender as f64 + self.line_gap as f64)
            / self.units_per_em as f64
            * self.size
    }

    fn ascent(&self) -> f64 {
        self.ascender as f64 / self.units_per_em as f64 * self.size
    }
}

/// UAX#14 break opportunities indexed by char position: entry `i` is the
/// opportunity *before* char `i`. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields byte offsets of the position after each break;
    // convert them to char indices.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        let mut char_idx = 0;
        for (byte_idx, _) in text.char_indices() {
            map[byte_idx] = char_idx;
            char_idx += 1;
        }
        map[text.len()] = char_idx;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

impl TextMeasure for FaceMeasure {
    fn measure(&self, text: &str, max_width: i32) -> MeasuredText {
        if text.is_empty() {
            return MeasuredText::empty();
        }
        let max_w = max_width as f64;
        let chars: Vec<char> = text.chars().collect();
        let break_opps = compute_break_opportunities(text);

        let mut line_widths: Vec<f64> = Vec::new();
        let mut line_start = 0usize;
        let mut line_width = 0.0f64;
        let mut last_break: Option<usize> = None;
        let mut last_break_width = 0.0f64;

        for (i, &ch) in chars.iter().enumerate() {
            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        line_widths.push(line_width);
                        line_start = i;
                        line_width = 0.0;
                        last_break = None;
                    }
                    Some(BreakOpportunity::Allowed) => {
                        last_break = Some(i);
                        last_break_width = line_width;
                    }
                    None => {}
                }
            }

            if ch == '\n' || ch == '\r' || ch == '\u{2028}' || ch == '\u{2029}' {
                continue;
            }

            let width = self.char_width(ch);
            if line_width + width > max_w && line_start < i {
                match last_break {
                    Some(bp) if bp > line_start => {
                        // Break at the last opportunity; carry the tail.
                        line_widths.push(last_break_width);
                        line_start = bp;
                        line_width = line_width - last_break_width + width;
                    }
                    _ => {
                        // No opportunity on this line: hard-break here.
                        line_widths.push(line_width);
                        line_start = i;
                        line_width = width;
                    }
                }
                last_break = None;
            } else {
                line_width += width;
            }
        }
        line_widths.push(line_width);

        let line_height = self.line_height();
        let ascent = self.ascent();
        let lines: Vec<LineMetrics> = line_widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let top = (i as f64 * line_height).round() as i32;
                let bottom = ((i + 1) as f64 * line_height).round() as i32;
                LineMetrics {
                    top,
                    bottom,
                    baseline: (i as f64 * line_height + ascent).round() as i32,
                    width: width.ceil() as i32,
                }
            })
            .collect();

        let mut measured = MeasuredText {
            lines,
            width: 0,
            height: 0,
        };
        measured.recompute_extents();
        measured
    }
}
