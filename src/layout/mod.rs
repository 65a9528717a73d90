//! # Column-Flow Pagination
//!
//! This is the heart of the crate and the reason it exists.
//!
//! A record list is not a scroll. Print has columns with hard bottoms, and
//! a record that doesn't fit has to break *somewhere* — but never through
//! the middle of a text line, and never so that a line or two of a field
//! sit stranded at the top or bottom of a column. Getting that right takes
//! three cooperating pieces:
//!
//! 1. Each record is laid out by resolving its alignment graph
//!    ([`RecordLayout::resolve`]) at the current column width.
//! 2. The layout is clipped against the space left in the column at line
//!    granularity ([`RecordLayout::vertical_clip`]), and the break is
//!    re-negotiated when it would strand orphan lines
//!    ([`RecordLayout::handle_orphans`]).
//! 3. The [`Paginator`] walks the record sequence with a column cursor,
//!    emitting one [`RecordPosition`] fragment per column a record
//!    touches, advancing columns and pages as they fill.
//!
//! One [`RecordLayout`] is reused for every record — the engine mutates it
//! in place, which is why pagination is strictly sequential (see the
//! crate docs on concurrency).

pub mod description;
pub mod record;

use std::collections::HashSet;
use std::mem;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::draw::Surface;
use crate::error::GalleyError;
use crate::geom::{Point, Rect};
use crate::measure::{Direction, Resolution, TextMeasure};
use crate::model::Record;

pub use description::{
    FieldKind, FieldLayoutDescription, HorizontalAlignment, HorizontalEdge, HorizontalRef,
    RecordLayoutDescription, VerticalAlignment, VerticalEdge, VerticalRef,
};
pub use record::{FieldLayout, RecordLayout};

/// Comparison slop for cursor arithmetic in points.
pub(crate) const EPSILON: f64 = 1.0e-3;

/// Page-level inputs to a pagination run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageOptions {
    /// The drawable area of the page, in points. Columns divide its width;
    /// its height is the column height.
    pub page_bounds: Rect,
    pub resolution: Resolution,
    pub direction: Direction,
    /// Names of the fields to include; `None` includes all of them.
    pub visible: Option<HashSet<String>>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            // US Letter with 1" margins.
            page_bounds: Rect::new(72.0, 72.0, 540.0, 720.0),
            resolution: Resolution::default(),
            direction: Direction::default(),
            visible: None,
        }
    }
}

/// One fragment of a record placed on a page: which record, where its
/// origin sits in the page's drawable area, and the clip rectangle (in
/// record coordinates) selecting the slice visible in this column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPosition {
    pub record: usize,
    pub position: Point,
    pub clip: Rect,
}

/// The rule drawn between two records in a column. Consumers draw these
/// themselves; the engine only reports where they go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparatorLine {
    /// Top/start corner of the rule in the page's drawable area.
    pub position: Point,
    /// Length of the rule (the column width).
    pub length: f64,
    /// Stroke width in points.
    pub stroke: f64,
}

/// One laid-out page. Immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub records: Vec<RecordPosition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub separators: Vec<SeparatorLine>,
}

impl Page {
    fn is_empty(&self) -> bool {
        self.records.is_empty() && self.separators.is_empty()
    }
}

/// The pagination engine: walks a record sequence and flows it across
/// columns and pages.
///
/// A paginator is one-shot for layout ([`Paginator::paginate`] consumes
/// it); create a second one from the same description to draw, mirroring
/// the layout/draw split of the page list itself.
pub struct Paginator<'a> {
    desc: &'a RecordLayoutDescription,
    page_bounds: Rect,
    page_width: f64,
    page_height: f64,
    column_stride: f64,
    column_width: f64,
    /// Cursor in the current page's drawable area.
    location: Point,
    /// True only immediately after opening a fresh column.
    column_start: bool,
    pages: Vec<Page>,
    page: Page,
    layout: RecordLayout<'a>,
    /// Index of the record currently held by `layout`.
    laid_out: Option<usize>,
}

impl<'a> Paginator<'a> {
    /// Validate the configuration and build the shared record layout.
    ///
    /// Fails fast when the column arithmetic produces an unusable width,
    /// or when the description itself does not validate.
    pub fn new(desc: &'a RecordLayoutDescription, options: &PageOptions) -> Result<Self, GalleyError> {
        let page_width = options.page_bounds.width();
        let page_height = options.page_bounds.height();
        let columns = desc.columns;
        let column_stride = if columns == 0 {
            f64::NAN
        } else {
            (page_width + desc.horizontal_separation) / columns as f64
        };
        let column_width = column_stride - desc.horizontal_separation;
        if !(column_width > 0.0) || page_height <= 0.0 {
            return Err(GalleyError::InvalidColumnWidth {
                width: if column_width.is_nan() { 0.0 } else { column_width },
                columns,
            });
        }

        let layout = RecordLayout::new(
            desc,
            column_width,
            page_height,
            options.resolution,
            options.direction,
            options.visible.as_ref(),
        )?;

        Ok(Self {
            desc,
            page_bounds: options.page_bounds,
            page_width,
            page_height,
            column_stride,
            column_width,
            location: Point::default(),
            column_start: true,
            pages: Vec::new(),
            page: Page::default(),
            layout,
            laid_out: None,
        })
    }

    pub fn column_width(&self) -> f64 {
        self.column_width
    }

    /// Lay out every record and flow it onto pages.
    pub fn paginate(
        mut self,
        records: &[Record],
        measure: &dyn TextMeasure,
    ) -> Result<Vec<Page>, GalleyError> {
        if records.is_empty() {
            return Err(GalleyError::EmptyRecordList);
        }

        for (index, record) in records.iter().enumerate() {
            self.layout_record(index, record, measure);
            self.place_record(index);
        }

        if !self.page.is_empty() {
            self.next_page();
        }
        if self.pages.is_empty() {
            return Err(GalleyError::NoPages);
        }
        debug!(
            "paginated {} record(s) onto {} page(s)",
            records.len(),
            self.pages.len()
        );
        Ok(self.pages)
    }

    /// Refresh the shared layout for `record`, skipping the work when it
    /// already holds this record (the draw path re-requests fragments).
    fn layout_record(&mut self, index: usize, record: &Record, measure: &dyn TextMeasure) {
        if self.laid_out == Some(index) {
            return;
        }
        self.laid_out = Some(index);
        self.layout.set_content(record, measure);
        self.layout.resolve();
    }

    /// Close the current page and open the next.
    fn next_page(&mut self) {
        self.pages.push(mem::take(&mut self.page));
        self.column_start = true;
    }

    /// Move the cursor to the next column, rolling over to a new page
    /// past the last column. `new_y` is where the current record's origin
    /// lands in the fresh column.
    fn next_column(&mut self, x: &mut f64, y: &mut f64, new_y: f64) {
        *x += self.column_stride;
        if *x + EPSILON >= self.page_width {
            self.next_page();
            *x = 0.0;
        }
        self.column_start = true;
        *y = new_y;
        trace!("advanced to column at x={x:.1}");
    }

    /// Place the current layout on the page grid, splitting it across
    /// columns as needed. One `RecordPosition` is emitted per fragment.
    fn place_record(&mut self, index: usize) {
        // Nothing measurable, nothing to place.
        if self.layout.bounds.is_empty() {
            return;
        }

        let mut x = self.location.x;
        let mut y = self.location.y;
        // At a column start the record pulls up flush with the column top;
        // mid-column it sits one separation (plus the rule) below its
        // predecessor.
        let mut separation = if self.column_start {
            -self.layout.bounds.top
        } else {
            self.desc.vertical_separation + self.desc.separator_width
        };

        // Clip to the space left in this column; if nothing survives
        // orphan control, retry flush at the top of a fresh column.
        self.layout.vertical_clip(y + separation, self.page_height);
        self.layout.handle_orphans(y + separation, self.column_start);
        if self.layout.clip.is_empty() {
            self.next_column(&mut x, &mut y, 0.0);
            separation = -self.layout.margin_bounds.top;
            self.layout.vertical_clip(y + separation, self.page_height);
            self.layout.handle_orphans(y + separation, self.column_start);
        }

        if !self.column_start && self.desc.separator_width > 0.0 {
            self.page.separators.push(SeparatorLine {
                position: Point::new(x, y + self.desc.vertical_separation / 2.0),
                length: self.column_width,
                stroke: self.desc.separator_width,
            });
        }
        y += separation;

        // Emit fragments until the record's bottom makes it onto a page.
        loop {
            // A fresh column must draw from its very top; a top margin in
            // the layout can leave the clip hanging below it.
            if self.column_start && self.layout.clip.top + y > 0.0 {
                y = -self.layout.clip.top;
                self.layout.vertical_clip(y, self.page_height);
                self.layout.handle_orphans(y + separation, self.column_start);
            }

            // A single line taller than the column would never survive the
            // snap; take the raw window so the sweep keeps moving.
            if self.column_start && self.layout.clip.is_empty() {
                let top = (-y).max(self.layout.bounds.top);
                let bottom = (self.page_height - y).min(self.layout.bounds.bottom);
                if bottom > top {
                    self.layout
                        .clip
                        .set(self.layout.bounds.left, top, self.layout.bounds.right, bottom);
                }
            }

            self.page.records.push(RecordPosition {
                record: index,
                position: Point::new(x, y),
                clip: self.layout.clip,
            });
            self.column_start = false;

            let bottom = self.layout.clip.bottom;
            if bottom + EPSILON >= self.layout.bounds.bottom {
                break;
            }

            // Pushing the origin up by the consumed height makes the next
            // slice start at the resumed line.
            self.next_column(&mut x, &mut y, -bottom);
            self.layout.vertical_clip(y, self.page_height);
            self.layout.handle_orphans(y + separation, self.column_start);
        }

        // Park the cursor below the record, margins included.
        self.location.x = x;
        self.location.y = y + self.layout.margin_bounds.bottom;
    }

    /// Replay one page onto a drawing surface.
    ///
    /// Re-lays-out and re-clips each fragment's record, then forwards its
    /// visible text to `surface` under the fragment's translate and clip.
    /// Separator lines are data on the [`Page`]; consumers draw those.
    pub fn draw_page(
        &mut self,
        page: &Page,
        records: &[Record],
        measure: &dyn TextMeasure,
        surface: &mut dyn Surface,
    ) {
        surface.save();
        surface.translate(self.page_bounds.left, self.page_bounds.top);
        for fragment in &page.records {
            surface.save();
            surface.translate(fragment.position.x, fragment.position.y);
            surface.clip_rect(&fragment.clip);
            self.layout_record(fragment.record, &records[fragment.record], measure);
            self.layout
                .vertical_clip(fragment.position.y, self.page_height);
            self.layout.draw(surface);
            surface.restore();
        }
        surface.restore();
    }
}
