//! # Stock Layout Descriptions
//!
//! Ready-made record layouts: a narrow single-stack arrangement for
//! skinny columns and a wide two-sided arrangement that splits the
//! label/value pairs around the column midline. [`standard_layout`] picks
//! between them by column width.
//!
//! These double as worked examples of the description language — label
//! and value fields tied together by baseline, chains of Top→Bottom
//! dependencies, and interpolated alignments for the midline split.

use crate::layout::{
    FieldKind, FieldLayoutDescription, HorizontalAlignment, HorizontalEdge, HorizontalRef,
    RecordLayoutDescription, VerticalAlignment, VerticalEdge, VerticalRef,
};
use crate::geom::Edges;
use crate::model::RecordField;

/// Gap between a label and its value, points.
const LABEL_MARGIN: f64 = 4.5;
/// Gap above each label/value row, points.
const VERTICAL_MARGIN: f64 = 1.0;
/// Columns at or below this width get the narrow layout.
const NARROW_MAX_WIDTH: f64 = 288.0;
/// Gutter on each side of the wide layout's midline, points.
const SPLIT_OFFSET: f64 = 18.0;

/// A label and its record-value field: the label hangs below `below`,
/// the value shares the label's baseline and starts after it.
fn labeled_pair(
    label_name: &str,
    label_text: &str,
    value_name: &str,
    field: RecordField,
    below: &str,
) -> (FieldLayoutDescription, FieldLayoutDescription) {
    let label = FieldLayoutDescription::new(
        label_name,
        FieldKind::Label {
            text: label_text.to_string(),
        },
    )
    .with_margins(Edges::new(0.0, VERTICAL_MARGIN, LABEL_MARGIN, 0.0))
    .aligned_v(VerticalAlignment::new(
        VerticalEdge::Top,
        vec![VerticalRef::of(VerticalEdge::Bottom, below)],
    ))
    .aligned_h(HorizontalAlignment::new(
        HorizontalEdge::Start,
        vec![HorizontalRef::root(HorizontalEdge::Start)],
    ));

    let value = FieldLayoutDescription::new(value_name, FieldKind::Text { field })
        .aligned_v(VerticalAlignment::new(
            VerticalEdge::Baseline,
            vec![VerticalRef::of(VerticalEdge::Baseline, label_name)],
        ))
        .aligned_h(HorizontalAlignment::new(
            HorizontalEdge::Start,
            vec![
                HorizontalRef::of(HorizontalEdge::End, label_name),
                HorizontalRef::root(HorizontalEdge::Start),
            ],
        ));

    (label, value)
}

fn cover() -> FieldLayoutDescription {
    FieldLayoutDescription::new(
        "cover",
        FieldKind::Frame {
            width: 16.0,
            height: 25.0,
        },
    )
    .with_margins(Edges::new(0.0, 0.0, LABEL_MARGIN, 0.0))
}

fn title() -> FieldLayoutDescription {
    FieldLayoutDescription::new(
        "title",
        FieldKind::Text {
            field: RecordField::Title,
        },
    )
    .aligned_h(HorizontalAlignment::new(
        HorizontalEdge::Start,
        vec![
            HorizontalRef::of(HorizontalEdge::End, "cover"),
            HorizontalRef::root(HorizontalEdge::Start),
        ],
    ))
}

fn subtitle() -> FieldLayoutDescription {
    FieldLayoutDescription::new(
        "subtitle",
        FieldKind::Text {
            field: RecordField::Subtitle,
        },
    )
    .with_margins(Edges::new(0.0, VERTICAL_MARGIN, 0.0, 0.0))
    .aligned_v(VerticalAlignment::new(
        VerticalEdge::Top,
        vec![VerticalRef::of(VerticalEdge::Bottom, "title")],
    ))
    .aligned_h(HorizontalAlignment::new(
        HorizontalEdge::Start,
        vec![
            HorizontalRef::of(HorizontalEdge::End, "cover"),
            HorizontalRef::root(HorizontalEdge::Start),
        ],
    ))
}

fn description_below(targets: &[&str]) -> FieldLayoutDescription {
    FieldLayoutDescription::new(
        "description",
        FieldKind::Text {
            field: RecordField::Description,
        },
    )
    .with_margins(Edges::new(0.0, VERTICAL_MARGIN, 0.0, 0.0))
    .aligned_v(VerticalAlignment::new(
        VerticalEdge::Top,
        targets
            .iter()
            .map(|name| VerticalRef::of(VerticalEdge::Bottom, name))
            .collect(),
    ))
}

/// Single-stack layout for narrow columns: cover and title up top, then
/// label/value rows one under another, description at the bottom.
pub fn narrow_layout() -> RecordLayoutDescription {
    let (authors_label, authors) = labeled_pair(
        "authorsLabel",
        "By:",
        "authors",
        RecordField::Authors,
        "subtitle",
    );
    let (tags_label, tags) = labeled_pair("tagsLabel", "Tags:", "tags", RecordField::Tags, "authors");
    let (isbn_label, isbns) = labeled_pair("isbnLabel", "ISBN:", "isbns", RecordField::Isbns, "tags");
    let (pages_label, pages) = labeled_pair(
        "pagesLabel",
        "Pages:",
        "pageCount",
        RecordField::PageCount,
        "isbns",
    );

    RecordLayoutDescription::new(vec![
        cover(),
        title(),
        subtitle(),
        authors_label,
        authors,
        tags_label,
        tags,
        isbn_label,
        isbns,
        pages_label,
        pages,
        description_below(&["pageCount", "cover"]),
    ])
}

/// Two-sided layout for wide columns: authors and tags run down the start
/// half, ISBNs and page count down the end half, split at the column
/// midline with a small gutter.
pub fn wide_layout() -> RecordLayoutDescription {
    // Midline of the span from the title start to the column end.
    let midline = |edge: HorizontalEdge, offset: f64| HorizontalAlignment {
        edge,
        to: vec![
            HorizontalRef::of(HorizontalEdge::Start, "title"),
            HorizontalRef::root(HorizontalEdge::End),
        ],
        interpolate: Some(0.5),
        offset,
    };

    let (authors_label, mut authors) = labeled_pair(
        "authorsLabel",
        "By:",
        "authors",
        RecordField::Authors,
        "subtitle",
    );
    authors.horizontal.push(midline(HorizontalEdge::End, -SPLIT_OFFSET));
    let (tags_label, mut tags) = labeled_pair("tagsLabel", "Tags:", "tags", RecordField::Tags, "authors");
    tags.horizontal.push(midline(HorizontalEdge::End, -SPLIT_OFFSET));

    let (mut isbn_label, mut isbns) = labeled_pair(
        "isbnLabel",
        "ISBN:",
        "isbns",
        RecordField::Isbns,
        "subtitle",
    );
    isbn_label.horizontal = vec![midline(HorizontalEdge::Start, SPLIT_OFFSET)];
    isbns.horizontal.push(HorizontalAlignment::new(
        HorizontalEdge::End,
        vec![HorizontalRef::root(HorizontalEdge::End)],
    ));
    let (mut pages_label, mut pages) = labeled_pair(
        "pagesLabel",
        "Pages:",
        "pageCount",
        RecordField::PageCount,
        "isbns",
    );
    pages_label.horizontal = vec![midline(HorizontalEdge::Start, SPLIT_OFFSET)];
    pages.horizontal.push(HorizontalAlignment::new(
        HorizontalEdge::End,
        vec![HorizontalRef::root(HorizontalEdge::End)],
    ));

    RecordLayoutDescription::new(vec![
        cover(),
        title(),
        subtitle(),
        authors_label,
        authors,
        tags_label,
        tags,
        isbn_label,
        isbns,
        pages_label,
        pages,
        description_below(&["tags", "pageCount"]),
    ])
}

/// The stock layout for a given column width.
pub fn standard_layout(column_width: f64) -> RecordLayoutDescription {
    if column_width <= NARROW_MAX_WIDTH {
        narrow_layout()
    } else {
        wide_layout()
    }
}
