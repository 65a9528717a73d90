//! # Drawing Surface
//!
//! The engine's only output channel besides the page list. A consumer
//! renders a page by walking its fragments: translate to the fragment
//! position, intersect with its clip, and let the record layout replay
//! its text through a [`Surface`]. The engine emits nothing but
//! clip/translate/text calls — rasterization, fonts, and styling are the
//! consumer's business.

use serde::Serialize;

use crate::geom::{Point, Rect};
use crate::measure::MeasuredText;

/// A drawing surface with a save/restore state stack, in the style of a
/// vector canvas. Translation and clipping accumulate until the matching
/// `restore`.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    /// Translate the coordinate system by `(dx, dy)` points.
    fn translate(&mut self, dx: f64, dy: f64);
    /// Intersect the clip region with `rect` (current coordinates).
    fn clip_rect(&mut self, rect: &Rect);
    /// Draw a measured text layout with its top/start corner at `origin`.
    /// `field` names the field being drawn so the consumer can style it.
    fn draw_text(&mut self, field: &str, origin: Point, text: &str, measured: &MeasuredText);
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Save,
    Restore,
    Translate {
        dx: f64,
        dy: f64,
    },
    Clip {
        rect: Rect,
    },
    Text {
        field: String,
        origin: Point,
        text: String,
        lines: usize,
    },
}

/// A [`Surface`] that records every call. Backs the test suite and the
/// binary's dry-run output.
#[derive(Debug, Default, Serialize)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text ops only, in emission order.
    pub fn texts(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.ops.push(DrawOp::Translate { dx, dy });
    }

    fn clip_rect(&mut self, rect: &Rect) {
        self.ops.push(DrawOp::Clip { rect: *rect });
    }

    fn draw_text(&mut self, field: &str, origin: Point, text: &str, measured: &MeasuredText) {
        self.ops.push(DrawOp::Text {
            field: field.to_string(),
            origin,
            text: text.to_string(),
            lines: measured.line_count(),
        });
    }
}
