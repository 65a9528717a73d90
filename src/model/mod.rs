//! # Record Model
//!
//! The input representation for the engine: one bibliographic record per
//! printed entry, plus the closed set of printable fields a layout
//! description can reference. This is the seam between whatever data store
//! produced the records and the layout core — the engine only ever sees a
//! record through [`RecordField::display_value`].

use serde::{Deserialize, Serialize};

/// One bibliographic entry to be laid out and printed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    pub title: String,
    pub subtitle: String,
    /// Author display names, in credit order.
    pub authors: Vec<String>,
    pub series: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub isbns: Vec<String>,
    pub page_count: u32,
    /// Star rating, 0.0 when unrated.
    pub rating: f64,
    pub added: Option<String>,
    pub modified: Option<String>,
    pub source: Option<String>,
    pub source_id: Option<String>,
}

impl Record {
    /// Create a record with just a title. Everything else defaults empty.
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }
}

/// The printable fields of a record.
///
/// A [`crate::layout::FieldKind::Text`] field names one of these; the
/// engine pulls the display string out of the current record each time the
/// shared layout is refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    Title,
    Subtitle,
    Authors,
    Series,
    Description,
    Tags,
    Categories,
    Isbns,
    PageCount,
    Rating,
    Added,
    Modified,
    Source,
    SourceId,
}

impl RecordField {
    /// The string printed for this field of `record`. List-valued fields
    /// join with a comma; absent optionals print as empty.
    pub fn display_value(&self, record: &Record) -> String {
        match self {
            RecordField::Title => record.title.clone(),
            RecordField::Subtitle => record.subtitle.clone(),
            RecordField::Authors => record.authors.join(", "),
            RecordField::Series => record.series.clone().unwrap_or_default(),
            RecordField::Description => record.description.clone(),
            RecordField::Tags => record.tags.join(", "),
            RecordField::Categories => record.categories.join(", "),
            RecordField::Isbns => record.isbns.join(", "),
            RecordField::PageCount => {
                if record.page_count == 0 {
                    String::new()
                } else {
                    record.page_count.to_string()
                }
            }
            RecordField::Rating => {
                if record.rating == 0.0 {
                    String::new()
                } else {
                    format!("{:.1}", record.rating)
                }
            }
            RecordField::Added => record.added.clone().unwrap_or_default(),
            RecordField::Modified => record.modified.clone().unwrap_or_default(),
            RecordField::Source => record.source.clone().unwrap_or_default(),
            RecordField::SourceId => record.source_id.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_fields_join_with_commas() {
        let mut record = Record::titled("Dune");
        record.authors = vec!["Frank Herbert".to_string(), "Brian Herbert".to_string()];
        assert_eq!(
            RecordField::Authors.display_value(&record),
            "Frank Herbert, Brian Herbert"
        );
    }

    #[test]
    fn absent_values_print_empty() {
        let record = Record::titled("Dune");
        assert_eq!(RecordField::Series.display_value(&record), "");
        assert_eq!(RecordField::PageCount.display_value(&record), "");
        assert_eq!(RecordField::Rating.display_value(&record), "");
    }
}
