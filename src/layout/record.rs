//! # Per-Record Layout
//!
//! The mutable half of the engine: one [`RecordLayout`] holds the resolved
//! rectangle, clip rectangle, and measured text of every field for the
//! record currently being laid out. The paginator keeps a single instance
//! and refreshes it in place record after record — field slots are an
//! arena indexed by description order, so nothing is reallocated on the
//! way through a long record list.
//!
//! Three operations live here:
//!
//! 1. **Resolution** — sweep the fields in the description's dependency
//!    order, aggregate each field's alignment targets, and shift its
//!    margin-expanded rectangle to satisfy them.
//! 2. **Vertical clipping** — intersect the record with a column window at
//!    *line* granularity, so a text field is never cut mid-line.
//! 3. **Orphan control** — after a clip, refuse to leave fewer than the
//!    configured number of lines stranded on either side of the break.

use std::collections::HashSet;

use log::trace;

use crate::error::GalleyError;
use crate::geom::{Edges, Point, Rect};
use crate::layout::description::{
    FieldKind, FieldLayoutDescription, HorizontalEdge, RecordLayoutDescription, VerticalEdge,
};
use crate::layout::EPSILON;
use crate::measure::{Direction, MeasuredText, Resolution, TextMeasure};
use crate::model::{Record, RecordField};
use crate::draw::Surface;

/// An alignment entry with its field references resolved to arena indices.
/// `None` is the record root.
#[derive(Debug, Clone)]
struct ResolvedHAlign {
    edge: HorizontalEdge,
    to: Vec<(Option<usize>, HorizontalEdge)>,
    interpolate: Option<f64>,
    offset: f64,
}

#[derive(Debug, Clone)]
struct ResolvedVAlign {
    edge: VerticalEdge,
    to: Vec<(Option<usize>, VerticalEdge)>,
    interpolate: Option<f64>,
    offset: f64,
}

/// What a field slot holds for the current record.
#[derive(Debug, Clone)]
enum FieldContent {
    /// Measured text. `source` is the record field to refresh from, or
    /// `None` for static label text.
    Text {
        source: Option<RecordField>,
        text: String,
        measured: MeasuredText,
    },
    /// A fixed-size reserved box; all-or-nothing at column breaks.
    Frame { width: f64, height: f64 },
    /// Excluded by the visible-field set. Zero size, still a valid
    /// alignment target.
    Hidden,
}

/// Mutable per-record state for one field. Bounds and clip are in record
/// coordinates (the record origin is the top/start of its column slot).
#[derive(Debug, Clone)]
pub struct FieldLayout {
    content: FieldContent,
    /// Resolved bounding rectangle of the content.
    pub bounds: Rect,
    /// Current clip rectangle.
    pub clip: Rect,
    /// Offset of the first-line baseline from the bounds top.
    pub baseline: f64,
    h_align: Vec<ResolvedHAlign>,
    v_align: Vec<ResolvedVAlign>,
}

impl FieldLayout {
    /// Refresh content from `record` and recompute the natural bounds.
    fn set_content(
        &mut self,
        desc: &FieldLayoutDescription,
        record: &Record,
        measure: &dyn TextMeasure,
        resolution: Resolution,
        column_width: f64,
        page_height: f64,
    ) {
        match &mut self.content {
            FieldContent::Hidden => {
                self.bounds.set_empty();
                self.baseline = 0.0;
            }
            FieldContent::Frame { width, height } => {
                self.bounds
                    .set(0.0, 0.0, width.min(column_width), height.min(page_height));
                self.baseline = 0.0;
            }
            FieldContent::Text {
                source,
                text,
                measured,
            } => {
                if let Some(field) = source {
                    *text = field.display_value(record);
                }
                let max = desc.max_size;
                let wrap_width = max.map_or(f64::INFINITY, |s| s.width).min(column_width);
                *measured = measure.measure(text, resolution.points_to_pixels(wrap_width));
                if let Some(max) = max {
                    if max.height.is_finite() {
                        measured.truncate_to_height(resolution.points_to_pixels(max.height));
                    }
                }
                if measured.line_count() == 0 {
                    self.bounds.set_empty();
                    self.baseline = 0.0;
                } else {
                    let width = resolution
                        .pixels_to_points(measured.width)
                        .max(desc.min_size.width);
                    let height = resolution
                        .pixels_to_points(measured.height)
                        .max(desc.min_size.height);
                    self.bounds.set(0.0, 0.0, width, height);
                    self.baseline = resolution.pixels_to_points(measured.line_baseline(0));
                }
            }
        }
    }

    /// Intersect the clip with the window `[top, bottom]` (record
    /// coordinates), without line snapping.
    fn clip_window(&mut self, top: f64, bottom: f64) -> bool {
        self.clip = self.bounds;
        self.clip.top = self.clip.top.max(top);
        self.clip.bottom = self.clip.bottom.min(bottom);
        !self.clip.is_empty()
    }

    /// Clip the field to the window `[top, bottom]` at line granularity.
    ///
    /// `exclusive` decides the fate of a line straddling a window edge:
    /// `false` includes it at the top edge and excludes it at the bottom,
    /// `true` the reverse. Returns whether anything stays visible.
    fn vertical_clip(&mut self, top: f64, bottom: f64, exclusive: bool, res: Resolution) -> bool {
        match self.content {
            FieldContent::Hidden => {
                self.clip = self.bounds;
                false
            }
            FieldContent::Frame { .. } => {
                self.clip = self.bounds;
                if top > self.bounds.top + EPSILON || bottom + EPSILON < self.bounds.bottom {
                    // A frame never splits: partially outside means gone.
                    self.clip.bottom = self.clip.top;
                    false
                } else {
                    true
                }
            }
            FieldContent::Text { .. } => {
                if !self.clip_window(top, bottom) {
                    return false;
                }
                let line_count = match &self.content {
                    FieldContent::Text { measured, .. } => measured.line_count(),
                    _ => 0,
                };
                if line_count == 0 {
                    self.clip.top = self.bounds.top;
                    self.clip.bottom = self.bounds.top;
                    return false;
                }
                self.clip.top =
                    self.find_boundary(self.clip.top - self.bounds.top, exclusive, res)
                        + self.bounds.top;
                self.clip.bottom =
                    self.find_boundary(self.clip.bottom - self.bounds.top, !exclusive, res)
                        + self.bounds.top;
                !self.clip.is_empty()
            }
        }
    }

    /// Snap `boundary` (points from the content top) to a line edge.
    ///
    /// A boundary exactly on a line edge stays put. A boundary inside a
    /// line snaps to the line's bottom when `want_bottom`, else its top.
    fn find_boundary(&self, boundary: f64, want_bottom: bool, res: Resolution) -> f64 {
        let measured = match &self.content {
            FieldContent::Text { measured, .. } => measured,
            _ => return 0.0,
        };
        if measured.line_count() == 0 {
            return 0.0;
        }
        let line = measured.line_for_vertical(res.points_to_pixels(boundary));
        let top = res.pixels_to_points(measured.line_top(line));
        let bottom = res.pixels_to_points(measured.line_top(line + 1));
        if top >= boundary {
            top
        } else if bottom <= boundary {
            bottom
        } else if want_bottom {
            bottom
        } else {
            top
        }
    }

    /// Where this field wants the record to break, given a window ending
    /// at `bottom`. A frame that would straddle the edge forces the break
    /// above itself; everything else accepts the window.
    fn break_position(&self, _top: f64, bottom: f64) -> f64 {
        match &self.content {
            FieldContent::Frame { .. }
                if !self.bounds.is_empty()
                    && bottom > self.bounds.top + EPSILON
                    && bottom + EPSILON < self.bounds.bottom =>
            {
                self.bounds.top
            }
            _ => bottom,
        }
    }

    /// Vertical spans of this field's lines in record coordinates, or
    /// `None` for non-text fields.
    fn line_bounds(&self, res: Resolution) -> Option<Vec<(f64, f64)>> {
        match &self.content {
            FieldContent::Text { measured, .. }
                if measured.line_count() > 0 && !self.bounds.is_empty() =>
            {
                Some(
                    (0..measured.line_count())
                        .map(|i| {
                            (
                                self.bounds.top + res.pixels_to_points(measured.line_top(i)),
                                self.bounds.top + res.pixels_to_points(measured.line_top(i + 1)),
                            )
                        })
                        .collect(),
                )
            }
            _ => None,
        }
    }
}

/// Aggregated alignment constraints for one field, one slot per resolvable
/// edge. `None` means the edge is unconstrained.
#[derive(Debug, Default)]
struct AlignmentTarget {
    baseline: f64,
    rtl: bool,
    top: Option<f64>,
    left: Option<f64>,
    right: Option<f64>,
    bottom: Option<f64>,
    h_center: Option<f64>,
    v_center: Option<f64>,
}

impl AlignmentTarget {
    fn new(baseline: f64, rtl: bool) -> Self {
        Self {
            baseline,
            rtl,
            ..Default::default()
        }
    }
}

/// One axis of the shift computation: move the margin-expanded interval
/// `[outer_min, outer_max]` to satisfy the resolved constraints.
///
/// A single bound is satisfied exactly; two bounds center the interval
/// between them (the field is shifted, never resized); a center constraint
/// applies only when neither bound is given; with nothing at all the
/// interval lands at the origin, or at `default_end` for the RTL
/// horizontal default.
fn axis_shift(
    outer_min: f64,
    outer_max: f64,
    align_min: Option<f64>,
    align_max: Option<f64>,
    center: Option<f64>,
    default_end: Option<f64>,
) -> f64 {
    match (align_min, align_max) {
        (Some(min), Some(max)) => (min + max - outer_min - outer_max) / 2.0,
        (Some(min), None) => min - outer_min,
        (None, Some(max)) => max - outer_max,
        (None, None) => match center {
            Some(c) => c - (outer_min + outer_max) / 2.0,
            None => match default_end {
                Some(span) => span - outer_max,
                None => -outer_min,
            },
        },
    }
}

/// The concrete layout of one record: a field arena plus the whole-record
/// rectangles. Reused across the record sequence; see the module docs.
#[derive(Debug)]
pub struct RecordLayout<'a> {
    desc: &'a RecordLayoutDescription,
    fields: Vec<FieldLayout>,
    /// Field indices in dependency order, from description validation.
    order: Vec<usize>,
    pub column_width: f64,
    page_height: f64,
    pub resolution: Resolution,
    pub rtl: bool,
    /// Bounding box of the record content.
    pub bounds: Rect,
    /// Bounding box including every field's margins.
    pub margin_bounds: Rect,
    /// Current clip rectangle.
    pub clip: Rect,
}

impl<'a> RecordLayout<'a> {
    /// Build the field arena for `desc`, validating the alignment graph.
    ///
    /// Fields whose names are missing from `visible` (when given) become
    /// hidden slots: zero-size, excluded from drawing and clipping, but
    /// still present as alignment targets.
    pub fn new(
        desc: &'a RecordLayoutDescription,
        column_width: f64,
        page_height: f64,
        resolution: Resolution,
        direction: Direction,
        visible: Option<&HashSet<String>>,
    ) -> Result<Self, GalleyError> {
        let order = desc.resolution_order()?;
        let index = desc.field_index()?;
        let rtl = direction == Direction::Rtl;

        let fields = desc
            .fields
            .iter()
            .map(|fd| {
                let shown = visible.map_or(true, |set| set.contains(&fd.name));
                let content = if !shown {
                    FieldContent::Hidden
                } else {
                    match &fd.kind {
                        FieldKind::Text { field } => FieldContent::Text {
                            source: Some(*field),
                            text: String::new(),
                            measured: MeasuredText::empty(),
                        },
                        FieldKind::Label { text } => FieldContent::Text {
                            source: None,
                            text: text.clone(),
                            measured: MeasuredText::empty(),
                        },
                        FieldKind::Frame { width, height } => FieldContent::Frame {
                            width: *width,
                            height: *height,
                        },
                    }
                };
                FieldLayout {
                    content,
                    bounds: Rect::default(),
                    clip: Rect::default(),
                    baseline: 0.0,
                    h_align: fd
                        .horizontal
                        .iter()
                        .map(|a| ResolvedHAlign {
                            edge: a.edge,
                            to: a
                                .to
                                .iter()
                                .map(|r| (r.field.as_deref().map(|n| index[n]), r.edge))
                                .collect(),
                            interpolate: a.interpolate,
                            offset: a.offset,
                        })
                        .collect(),
                    v_align: fd
                        .vertical
                        .iter()
                        .map(|a| ResolvedVAlign {
                            edge: a.edge,
                            to: a
                                .to
                                .iter()
                                .map(|r| (r.field.as_deref().map(|n| index[n]), r.edge))
                                .collect(),
                            interpolate: a.interpolate,
                            offset: a.offset,
                        })
                        .collect(),
                }
            })
            .collect();

        Ok(Self {
            desc,
            fields,
            order,
            column_width,
            page_height,
            resolution,
            rtl,
            bounds: Rect::default(),
            margin_bounds: Rect::default(),
            clip: Rect::default(),
        })
    }

    pub fn description(&self) -> &RecordLayoutDescription {
        self.desc
    }

    /// The layout slot for a named field, for inspection.
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.desc
            .fields
            .iter()
            .position(|f| f.name == name)
            .map(|i| &self.fields[i])
    }

    /// Refresh every field's content from `record`.
    pub fn set_content(&mut self, record: &Record, measure: &dyn TextMeasure) {
        let desc = self.desc;
        for (field, fd) in self.fields.iter_mut().zip(&desc.fields) {
            field.set_content(
                fd,
                record,
                measure,
                self.resolution,
                self.column_width,
                self.page_height,
            );
        }
    }

    /// Project one horizontal scalar off a field (or the record root).
    ///
    /// Start/End honor the *target's* direction flag: the start of an RTL
    /// field is its right edge. The root projects a zero-height rectangle
    /// spanning the column width.
    fn h_dimension(&self, target: Option<usize>, edge: HorizontalEdge) -> f64 {
        let (bounds, margins) = match target {
            None => (Rect::new(0.0, 0.0, self.column_width, 0.0), Edges::default()),
            Some(i) => (self.fields[i].bounds, self.desc.fields[i].margins),
        };
        let rtl = self.rtl;
        match edge {
            HorizontalEdge::Start => {
                if rtl {
                    bounds.right + margins.left
                } else {
                    bounds.left - margins.left
                }
            }
            HorizontalEdge::End => {
                if rtl {
                    bounds.left - margins.right
                } else {
                    bounds.right + margins.right
                }
            }
            HorizontalEdge::Center => {
                (bounds.left
                    + bounds.right
                    + if rtl {
                        margins.left - margins.right
                    } else {
                        margins.right - margins.left
                    })
                    / 2.0
            }
        }
    }

    /// Project one vertical scalar off a field (or the record root).
    fn v_dimension(&self, target: Option<usize>, edge: VerticalEdge) -> f64 {
        let (bounds, margins, baseline) = match target {
            None => (
                Rect::new(0.0, 0.0, self.column_width, 0.0),
                Edges::default(),
                0.0,
            ),
            Some(i) => (
                self.fields[i].bounds,
                self.desc.fields[i].margins,
                self.fields[i].baseline,
            ),
        };
        match edge {
            VerticalEdge::Top => bounds.top - margins.top,
            VerticalEdge::Bottom => bounds.bottom + margins.bottom,
            VerticalEdge::Baseline => bounds.top + baseline,
            VerticalEdge::Center => {
                (bounds.top - margins.top + bounds.bottom + margins.bottom) / 2.0
            }
        }
    }

    /// Aggregate a list of projected values: interpolate between their
    /// minimum and maximum, then add the entry's constant offset.
    fn aggregate(values: impl Iterator<Item = f64>, t: f64, offset: f64) -> Option<f64> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            min = min.min(v);
            max = max.max(v);
        }
        if min > max {
            return None;
        }
        Some(min + (max - min) * t + offset)
    }

    /// Resolve every field's position from the alignment graph.
    ///
    /// Fields are swept in the dependency order computed at build time, so
    /// every projection reads already-final rectangles. Each field is
    /// reset to its natural size at the origin, its targets aggregated,
    /// and one shift per axis applied to the margin-expanded rectangle.
    /// There is no failure path: content that exceeds its constraints
    /// overlaps rather than erroring.
    pub fn resolve(&mut self) {
        for k in 0..self.order.len() {
            let i = self.order[k];

            let (width, height) = {
                let b = &self.fields[i].bounds;
                (b.width(), b.height())
            };
            self.fields[i].bounds.set(0.0, 0.0, width, height);

            let margins = self.desc.fields[i].margins;
            let baseline = self.fields[i].baseline;
            let mut target = AlignmentTarget::new(baseline, self.rtl);

            for alignment in &self.fields[i].v_align {
                let t = alignment
                    .interpolate
                    .unwrap_or_else(|| alignment.edge.natural_interpolate());
                let value = Self::aggregate(
                    alignment.to.iter().map(|&(f, e)| self.v_dimension(f, e)),
                    t,
                    alignment.offset,
                );
                let Some(value) = value else { continue };
                match alignment.edge {
                    VerticalEdge::Top => target.top = Some(value),
                    VerticalEdge::Bottom => target.bottom = Some(value),
                    // A baseline target is exact: the margin never shifts
                    // the baseline off its line.
                    VerticalEdge::Baseline => {
                        target.top = Some(value - target.baseline - margins.top)
                    }
                    VerticalEdge::Center => target.v_center = Some(value),
                }
            }
            for alignment in &self.fields[i].h_align {
                let t = alignment
                    .interpolate
                    .unwrap_or_else(|| alignment.edge.natural_interpolate(self.rtl));
                let value = Self::aggregate(
                    alignment.to.iter().map(|&(f, e)| self.h_dimension(f, e)),
                    t,
                    alignment.offset,
                );
                let Some(value) = value else { continue };
                match alignment.edge {
                    HorizontalEdge::Start => {
                        if target.rtl {
                            target.right = Some(value)
                        } else {
                            target.left = Some(value)
                        }
                    }
                    HorizontalEdge::End => {
                        if target.rtl {
                            target.left = Some(value)
                        } else {
                            target.right = Some(value)
                        }
                    }
                    HorizontalEdge::Center => target.h_center = Some(value),
                }
            }

            let b = self.fields[i].bounds;
            let dy = axis_shift(
                b.top - margins.top,
                b.bottom + margins.bottom,
                target.top,
                target.bottom,
                target.v_center,
                None,
            );
            let dx = axis_shift(
                b.left - margins.left,
                b.right + margins.right,
                target.left,
                target.right,
                target.h_center,
                if self.rtl { Some(self.column_width) } else { None },
            );
            self.fields[i].bounds.offset(dx, dy);
        }

        // Union the whole-record boxes; empty fields contribute nothing.
        self.bounds.set_empty();
        self.margin_bounds.set_empty();
        for (field, fd) in self.fields.iter().zip(&self.desc.fields) {
            if field.bounds.is_empty() {
                continue;
            }
            self.bounds.union(&field.bounds);
            self.margin_bounds.union_ltrb(
                field.bounds.left - fd.margins.left,
                field.bounds.top - fd.margins.top,
                field.bounds.right + fd.margins.right,
                field.bounds.bottom + fd.margins.bottom,
            );
        }
    }

    /// Clip the record to a column: the record origin sits at `y` in the
    /// column, and the column is `column_height` tall.
    ///
    /// Computes the visible window, lets unbreakable fields pull the break
    /// position up, then snaps the window to line boundaries: the top edge
    /// includes a straddling line, the bottom edge excludes one. The
    /// resulting window is stored in `self.clip` (record coordinates).
    pub fn vertical_clip(&mut self, y: f64, column_height: f64) -> &mut Self {
        for field in &mut self.fields {
            field.clip = field.bounds;
        }

        let record_bottom = y + self.bounds.bottom;
        let clip_top = y.max(0.0) - y;
        let mut clip_bottom;
        let mut pos = record_bottom.min(column_height) - y;
        loop {
            // Let each field pull the break position up until no field
            // objects to the window.
            clip_bottom = pos;
            for field in &self.fields {
                pos = field.break_position(clip_top, clip_bottom);
                if pos < clip_bottom {
                    break;
                }
            }
            if pos >= clip_bottom {
                break;
            }
        }

        self.clip
            .set(self.bounds.left, clip_top, self.bounds.right, clip_bottom);

        // Fast path: the whole record fits this window.
        if y >= 0.0 && clip_top <= self.bounds.top && clip_bottom + EPSILON >= self.bounds.bottom {
            self.clip = self.bounds;
            return self;
        }

        // Line-accurate pass. The clip top snaps out to include lines on
        // the boundary, taking the smallest top any field requires...
        let res = self.resolution;
        let bounds_top = self.bounds.top;
        let bounds_bottom = self.bounds.bottom;
        let top = self
            .fields
            .iter_mut()
            .map(|f| {
                if f.vertical_clip(clip_top, clip_bottom, false, res) {
                    f.clip.top
                } else {
                    bounds_bottom
                }
            })
            .fold(f64::INFINITY, f64::min);
        self.clip.top = if top.is_finite() { top } else { bounds_bottom };

        // ...and the clip bottom snaps in to exclude lines straddling the
        // boundary, taking the largest bottom any field can keep.
        let clip_top_snapped = self.clip.top;
        let window_bottom = clip_bottom - clip_top + clip_top_snapped;
        let bottom = self
            .fields
            .iter_mut()
            .map(|f| {
                if f.vertical_clip(clip_top_snapped, window_bottom, true, res) {
                    f.clip.bottom
                } else {
                    bounds_top
                }
            })
            .fold(f64::NEG_INFINITY, f64::max);
        self.clip.bottom = if bottom.is_finite() { bottom } else { bounds_top };

        self
    }

    /// Enforce the orphan threshold on the current clip.
    ///
    /// Called after [`Self::vertical_clip`]. When the break would leave
    /// fewer than `orphans` lines on either side, the clip is shrunk to
    /// the previous viable line boundary — or emptied entirely, pushing
    /// the record to the next column. The clip only ever shrinks here.
    pub fn handle_orphans(&mut self, y: f64, column_start: bool) {
        let orphans = self.desc.orphans as usize;
        // Nothing to do when orphans are off, nothing is visible, or the
        // record bottom already made it into this fragment.
        if orphans < 1 || self.clip.is_empty() || self.clip.bottom + EPSILON >= self.bounds.bottom {
            return;
        }

        // Vertical spans of every text line in the record, sorted by top
        // then bottom. Fields sharing a line are collapsed during counting.
        let res = self.resolution;
        let mut lines: Vec<(f64, f64)> = self
            .fields
            .iter()
            .filter(|f| !f.bounds.is_empty())
            .filter_map(|f| f.line_bounds(res))
            .flatten()
            .collect();
        lines.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let mut end = lines.len();
        while !self.clip.is_empty() {
            // Leading edge: when this fragment starts the record mid-column,
            // too few visible lines means the whole record moves on.
            if !column_start && self.clip.top <= self.bounds.top && self.clip.bottom > self.bounds.top
            {
                let mut visible = 0usize;
                let mut bottom = self.clip.top;
                for &(line_top, line_bottom) in &lines {
                    if line_top >= self.clip.bottom {
                        break;
                    }
                    if line_bottom <= self.clip.bottom && line_top >= bottom {
                        visible += 1;
                        bottom = line_bottom;
                    }
                }
                if visible < orphans {
                    trace!("orphan control: {visible} leading line(s), pushing record to next column");
                    self.clip.top = self.bounds.top;
                    self.clip.bottom = self.bounds.top;
                    return;
                }
            }

            // Trailing edge: count the lines left for the next column.
            let mut next_count = 0usize;
            let mut bottom = self.clip.top;
            for &(line_top, line_bottom) in &lines {
                if line_bottom > self.clip.bottom && line_top >= bottom {
                    next_count += 1;
                    bottom = line_bottom;
                }
            }
            if next_count == 0 || next_count >= orphans {
                return;
            }

            // Move lines to the next column: re-clip at the top of the
            // last line above the current break.
            let mut moved = false;
            while end > 0 {
                end -= 1;
                if lines[end].0 < self.clip.bottom {
                    self.vertical_clip(y, y + lines[end].0);
                    if self.clip.is_empty() {
                        return;
                    }
                    moved = true;
                    break;
                }
            }
            if !moved {
                return;
            }
        }
    }

    /// Draw the visible portion of every field onto `surface`. Only text
    /// is emitted; frames reserve space but draw nothing.
    pub fn draw(&self, surface: &mut dyn Surface) {
        for (field, fd) in self.fields.iter().zip(&self.desc.fields) {
            if field.clip.is_empty() {
                continue;
            }
            if let FieldContent::Text { text, measured, .. } = &field.content {
                surface.save();
                surface.clip_rect(&field.clip);
                surface.draw_text(
                    &fd.name,
                    Point::new(field.bounds.left, field.bounds.top),
                    text,
                    measured,
                );
                surface.restore();
            }
        }
    }
}
