//! # Layout Descriptions
//!
//! The declarative, immutable half of the engine: which fields a printed
//! record has, how big they may get, and how their edges align to each
//! other. A description is built (or deserialized) once, validated once,
//! and then shared read-only across every record laid out with it.
//!
//! Alignment is a small constraint graph: each field may pin an edge to
//! the aggregate of one or more other fields' edges (or the record root).
//! Validation topologically sorts that graph at build time and rejects
//! cycles outright, so the per-record resolver is a straight sweep in
//! dependency order with no re-entry bookkeeping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GalleyError;
use crate::geom::{Edges, Size};
use crate::model::RecordField;

/// The horizontal edges an alignment can reference or constrain.
/// Start and End are direction-aware: they resolve to left/right for
/// left-to-right layouts and right/left for right-to-left ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HorizontalEdge {
    Start,
    End,
    Center,
}

impl HorizontalEdge {
    /// Interpolation parameter used to aggregate multiple targets:
    /// 0.0 takes the minimum of the projected values, 1.0 the maximum,
    /// 0.5 their midpoint.
    pub(crate) fn natural_interpolate(self, rtl: bool) -> f64 {
        match self {
            HorizontalEdge::Start => {
                if rtl {
                    0.0
                } else {
                    1.0
                }
            }
            HorizontalEdge::End => {
                if rtl {
                    1.0
                } else {
                    0.0
                }
            }
            HorizontalEdge::Center => 0.5,
        }
    }

    pub(crate) fn key_name(self) -> &'static str {
        match self {
            HorizontalEdge::Start => "start",
            HorizontalEdge::End => "end",
            HorizontalEdge::Center => "horizontal-center",
        }
    }
}

/// The vertical edges an alignment can reference or constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalEdge {
    Top,
    Bottom,
    Baseline,
    Center,
}

impl VerticalEdge {
    pub(crate) fn natural_interpolate(self) -> f64 {
        match self {
            VerticalEdge::Top | VerticalEdge::Baseline => 1.0,
            VerticalEdge::Bottom => 0.0,
            VerticalEdge::Center => 0.5,
        }
    }

    pub(crate) fn key_name(self) -> &'static str {
        match self {
            VerticalEdge::Top => "top",
            VerticalEdge::Bottom => "bottom",
            VerticalEdge::Baseline => "baseline",
            VerticalEdge::Center => "vertical-center",
        }
    }
}

/// One edge of one field (or of the record root, when `field` is `None`)
/// used as an alignment target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalRef {
    pub edge: HorizontalEdge,
    /// Field name, or `None` for the record root.
    #[serde(default)]
    pub field: Option<String>,
}

impl HorizontalRef {
    /// Reference an edge of a named field.
    pub fn of(edge: HorizontalEdge, field: &str) -> Self {
        Self {
            edge,
            field: Some(field.to_string()),
        }
    }

    /// Reference an edge of the record root.
    pub fn root(edge: HorizontalEdge) -> Self {
        Self { edge, field: None }
    }
}

/// Vertical counterpart of [`HorizontalRef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalRef {
    pub edge: VerticalEdge,
    #[serde(default)]
    pub field: Option<String>,
}

impl VerticalRef {
    pub fn of(edge: VerticalEdge, field: &str) -> Self {
        Self {
            edge,
            field: Some(field.to_string()),
        }
    }

    pub fn root(edge: VerticalEdge) -> Self {
        Self { edge, field: None }
    }
}

/// Pin the `edge` of a field horizontally to the aggregate of `to`.
///
/// The targets' projected values are reduced to
/// `min + (max - min) * interpolate + offset`; when `interpolate` is
/// absent the edge's natural parameter applies (Start→max for LTR,
/// End→min for LTR, Center→midpoint, mirrored for RTL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalAlignment {
    pub edge: HorizontalEdge,
    pub to: Vec<HorizontalRef>,
    #[serde(default)]
    pub interpolate: Option<f64>,
    #[serde(default)]
    pub offset: f64,
}

impl HorizontalAlignment {
    pub fn new(edge: HorizontalEdge, to: Vec<HorizontalRef>) -> Self {
        Self {
            edge,
            to,
            interpolate: None,
            offset: 0.0,
        }
    }
}

/// Vertical counterpart of [`HorizontalAlignment`]. Top and Baseline
/// aggregate to the maximum, Bottom to the minimum, Center to the
/// midpoint, unless `interpolate` overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalAlignment {
    pub edge: VerticalEdge,
    pub to: Vec<VerticalRef>,
    #[serde(default)]
    pub interpolate: Option<f64>,
    #[serde(default)]
    pub offset: f64,
}

impl VerticalAlignment {
    pub fn new(edge: VerticalEdge, to: Vec<VerticalRef>) -> Self {
        Self {
            edge,
            to,
            interpolate: None,
            offset: 0.0,
        }
    }
}

/// What a field prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    /// A value pulled from the current record.
    Text { field: RecordField },
    /// Static text, e.g. the label in a label/value pair.
    Label { text: String },
    /// A fixed-size reserved box (cover art slot). Never split across
    /// columns; the engine reserves and clips the space but draws nothing.
    Frame { width: f64, height: f64 },
}

/// The immutable layout template for one field: content, margins, size
/// limits, and the two alignment maps. Shared read-only by every record
/// layout built from the description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLayoutDescription {
    /// Field name: the key other fields align to, and the key checked
    /// against the visible-field set.
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub margins: Edges,
    #[serde(default)]
    pub min_size: Size,
    /// Maximum content size; `None` is unbounded.
    #[serde(default)]
    pub max_size: Option<Size>,
    #[serde(default)]
    pub horizontal: Vec<HorizontalAlignment>,
    #[serde(default)]
    pub vertical: Vec<VerticalAlignment>,
}

impl FieldLayoutDescription {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            margins: Edges::default(),
            min_size: Size::default(),
            max_size: None,
            horizontal: Vec::new(),
            vertical: Vec::new(),
        }
    }

    pub fn with_margins(mut self, margins: Edges) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_max_size(mut self, size: Size) -> Self {
        self.max_size = Some(size);
        self
    }

    pub fn aligned_h(mut self, alignment: HorizontalAlignment) -> Self {
        self.horizontal.push(alignment);
        self
    }

    pub fn aligned_v(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical.push(alignment);
        self
    }
}

fn default_horizontal_separation() -> f64 {
    18.0
}

fn default_vertical_separation() -> f64 {
    9.0
}

fn default_columns() -> u32 {
    2
}

fn default_orphans() -> u32 {
    2
}

fn default_separator_width() -> f64 {
    0.5
}

/// The layout template for a whole record: an ordered field list plus the
/// page-flow parameters the paginator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordLayoutDescription {
    pub fields: Vec<FieldLayoutDescription>,
    /// Distance in points separating print columns horizontally.
    #[serde(default = "default_horizontal_separation")]
    pub horizontal_separation: f64,
    /// Distance in points separating records within a column.
    #[serde(default = "default_vertical_separation")]
    pub vertical_separation: f64,
    /// Number of print columns on a page.
    #[serde(default = "default_columns")]
    pub columns: u32,
    /// Minimum lines required on either side of a record break; a break
    /// leaving fewer is re-negotiated. 0 disables orphan control.
    #[serde(default = "default_orphans")]
    pub orphans: u32,
    /// Stroke width of the rule drawn between records; 0 disables it.
    #[serde(default = "default_separator_width")]
    pub separator_width: f64,
}

impl RecordLayoutDescription {
    pub fn new(fields: Vec<FieldLayoutDescription>) -> Self {
        Self {
            fields,
            horizontal_separation: default_horizontal_separation(),
            vertical_separation: default_vertical_separation(),
            columns: default_columns(),
            orphans: default_orphans(),
            separator_width: default_separator_width(),
        }
    }

    /// Map field names to indices, rejecting duplicates.
    pub(crate) fn field_index(&self) -> Result<HashMap<&str, usize>, GalleyError> {
        let mut index = HashMap::new();
        for (i, field) in self.fields.iter().enumerate() {
            if index.insert(field.name.as_str(), i).is_some() {
                return Err(GalleyError::DuplicateField(field.name.clone()));
            }
        }
        Ok(index)
    }

    /// Validate the description and compute the order fields must be
    /// resolved in: every field after everything it aligns to.
    ///
    /// Errors on unknown field references, duplicate names, duplicate
    /// edge constraints, and alignment cycles.
    pub(crate) fn resolution_order(&self) -> Result<Vec<usize>, GalleyError> {
        let index = self.field_index()?;

        // Dependency edges: deps[i] lists the fields i aligns to.
        let mut deps: Vec<Vec<usize>> = vec![Vec::new(); self.fields.len()];
        for (i, field) in self.fields.iter().enumerate() {
            let mut seen_h: Vec<HorizontalEdge> = Vec::new();
            for alignment in &field.horizontal {
                if seen_h.contains(&alignment.edge) {
                    return Err(GalleyError::DuplicateAlignment {
                        field: field.name.clone(),
                        key: alignment.edge.key_name(),
                    });
                }
                seen_h.push(alignment.edge);
                for target in &alignment.to {
                    if let Some(name) = &target.field {
                        let j = *index
                            .get(name.as_str())
                            .ok_or_else(|| GalleyError::UnknownField(name.clone()))?;
                        deps[i].push(j);
                    }
                }
            }
            let mut seen_v: Vec<VerticalEdge> = Vec::new();
            for alignment in &field.vertical {
                if seen_v.contains(&alignment.edge) {
                    return Err(GalleyError::DuplicateAlignment {
                        field: field.name.clone(),
                        key: alignment.edge.key_name(),
                    });
                }
                seen_v.push(alignment.edge);
                for target in &alignment.to {
                    if let Some(name) = &target.field {
                        let j = *index
                            .get(name.as_str())
                            .ok_or_else(|| GalleyError::UnknownField(name.clone()))?;
                        deps[i].push(j);
                    }
                }
            }
        }

        // Kahn's algorithm over the dependency graph.
        let n = self.fields.len();
        let mut out_count: Vec<usize> = deps.iter().map(Vec::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, targets) in deps.iter().enumerate() {
            for &j in targets {
                dependents[j].push(i);
            }
        }

        let mut ready: Vec<usize> = (0..n).filter(|&i| out_count[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = ready.pop() {
            order.push(i);
            for &dep in &dependents[i] {
                out_count[dep] -= 1;
                if out_count[dep] == 0 {
                    ready.push(dep);
                }
            }
        }

        if order.len() < n {
            // Some field never became ready: it sits on a cycle.
            let culprit = (0..n)
                .find(|&i| out_count[i] > 0)
                .map(|i| self.fields[i].name.clone())
                .unwrap_or_default();
            return Err(GalleyError::CyclicAlignment(culprit));
        }
        Ok(order)
    }

    /// Validate field references and the alignment graph without building
    /// a layout.
    pub fn validate(&self) -> Result<(), GalleyError> {
        self.resolution_order().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> FieldLayoutDescription {
        FieldLayoutDescription::new(name, FieldKind::Label { text: name.to_string() })
    }

    #[test]
    fn resolution_order_puts_targets_first() {
        let desc = RecordLayoutDescription::new(vec![
            field("a").aligned_v(VerticalAlignment::new(
                VerticalEdge::Top,
                vec![VerticalRef::of(VerticalEdge::Bottom, "b")],
            )),
            field("b"),
        ]);
        let order = desc.resolution_order().unwrap();
        let pos = |i: usize| order.iter().position(|&x| x == i).unwrap();
        assert!(pos(1) < pos(0), "b must resolve before a, got {order:?}");
    }

    #[test]
    fn cycle_is_rejected() {
        let desc = RecordLayoutDescription::new(vec![
            field("a").aligned_v(VerticalAlignment::new(
                VerticalEdge::Top,
                vec![VerticalRef::of(VerticalEdge::Bottom, "b")],
            )),
            field("b").aligned_v(VerticalAlignment::new(
                VerticalEdge::Top,
                vec![VerticalRef::of(VerticalEdge::Bottom, "a")],
            )),
        ]);
        assert!(matches!(
            desc.validate(),
            Err(GalleyError::CyclicAlignment(_))
        ));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let desc = RecordLayoutDescription::new(vec![field("a").aligned_v(
            VerticalAlignment::new(
                VerticalEdge::Top,
                vec![VerticalRef::of(VerticalEdge::Bottom, "a")],
            ),
        )]);
        assert!(matches!(
            desc.validate(),
            Err(GalleyError::CyclicAlignment(name)) if name == "a"
        ));
    }

    #[test]
    fn unknown_reference_is_rejected() {
        let desc = RecordLayoutDescription::new(vec![field("a").aligned_v(
            VerticalAlignment::new(
                VerticalEdge::Top,
                vec![VerticalRef::of(VerticalEdge::Bottom, "ghost")],
            ),
        )]);
        assert!(matches!(
            desc.validate(),
            Err(GalleyError::UnknownField(name)) if name == "ghost"
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let desc = RecordLayoutDescription::new(vec![field("a"), field("a")]);
        assert!(matches!(
            desc.validate(),
            Err(GalleyError::DuplicateField(name)) if name == "a"
        ));
    }

    #[test]
    fn duplicate_edge_constraint_is_rejected() {
        let desc = RecordLayoutDescription::new(vec![field("a")
            .aligned_v(VerticalAlignment::new(
                VerticalEdge::Top,
                vec![VerticalRef::root(VerticalEdge::Top)],
            ))
            .aligned_v(VerticalAlignment::new(
                VerticalEdge::Top,
                vec![VerticalRef::root(VerticalEdge::Bottom)],
            ))]);
        assert!(matches!(
            desc.validate(),
            Err(GalleyError::DuplicateAlignment { .. })
        ));
    }

    #[test]
    fn root_references_need_no_field() {
        let desc = RecordLayoutDescription::new(vec![field("a").aligned_v(
            VerticalAlignment::new(VerticalEdge::Top, vec![VerticalRef::root(VerticalEdge::Top)]),
        )]);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn description_round_trips_through_json() {
        let desc = RecordLayoutDescription::new(vec![field("a")
            .with_margins(Edges::new(4.5, 1.0, 0.0, 0.0))
            .aligned_h(HorizontalAlignment::new(
                HorizontalEdge::Start,
                vec![HorizontalRef::root(HorizontalEdge::Start)],
            ))]);
        let json = serde_json::to_string(&desc).unwrap();
        let back: RecordLayoutDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(desc, back);
    }
}
