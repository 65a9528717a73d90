//! # Galley
//!
//! A column-flow print layout engine for bibliographic records.
//!
//! Most list-printing code treats the page as an afterthought: lay the
//! records out on an endless strip, slice it into pages, and hope no slice
//! lands mid-line. That produces half-lines at column bottoms, single
//! stranded lines at column tops, and fields that drift apart from the
//! labels they were aligned to.
//!
//! Galley works the other way around: **the column is the unit of
//! layout.** Each record's fields are positioned by resolving a small
//! graph of alignment constraints, and every break decision is made
//! against the real space left in the current column — at line
//! granularity, with orphan control re-negotiating any break that would
//! strand too few lines on either side.
//!
//! ## Architecture
//!
//! ```text
//! Input (records + layout description, API or JSON)
//!       ↓
//!   [model]     — records and their printable fields
//!       ↓
//!   [layout::description] — immutable field templates, alignment graph,
//!       ↓                   build-time cycle rejection
//!   [layout::record]      — per-record resolution, line clipping, orphans
//!       ↓
//!   [layout]    — the paginator: column cursor, fragments, pages
//!       ↓
//!   Vec<Page>   — (record index, position, clip) per fragment
//! ```
//!
//! Text is measured through the pluggable [`measure::TextMeasure`]
//! service; drawing goes through the [`draw::Surface`] trait. The engine
//! itself never touches fonts, rasterizers, or files.
//!
//! ## Concurrency
//!
//! Pagination is single-threaded and synchronous: a [`Paginator`] reuses
//! one mutable record layout across the whole sweep, so it must not be
//! shared. Descriptions are immutable once built and safe to share
//! read-only across threads — give each worker its own paginator.
//! Pagination is deterministic and idempotent for fixed inputs; to retry,
//! just call it again.

pub mod draw;
pub mod error;
pub mod geom;
pub mod layout;
pub mod measure;
pub mod model;
pub mod presets;

use serde::{Deserialize, Serialize};

pub use error::GalleyError;
pub use layout::{Page, PageOptions, Paginator, RecordLayoutDescription, RecordPosition};
pub use measure::{detect_direction, Direction, GridMeasure, TextMeasure};
pub use model::Record;

/// Lay out `records` with `description` onto pages.
///
/// This is the primary entry point. Fails fast on configuration errors
/// (empty record list, unusable column width, invalid description) and
/// otherwise always produces at least one page.
pub fn paginate(
    records: &[Record],
    description: &RecordLayoutDescription,
    options: &PageOptions,
    measure: &dyn TextMeasure,
) -> Result<Vec<Page>, GalleyError> {
    Paginator::new(description, options)?.paginate(records, measure)
}

/// A self-contained pagination request, for the JSON entry point.
///
/// Font data cannot ride in JSON, so requests carry the fixed-metrics
/// [`GridMeasure`] as their measurement service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
    pub records: Vec<Record>,
    pub layout: RecordLayoutDescription,
    #[serde(default)]
    pub options: PageOptions,
    #[serde(default)]
    pub metrics: GridMeasure,
}

/// Run a pagination request described as JSON and return the laid-out
/// pages as JSON.
pub fn paginate_json(json: &str) -> Result<String, GalleyError> {
    let request: PaginationRequest = serde_json::from_str(json)?;
    let pages = paginate(
        &request.records,
        &request.layout,
        &request.options,
        &request.metrics,
    )?;
    Ok(serde_json::to_string_pretty(&pages)?)
}
