//! Classification results.
//!
//! A [`Group`] is a cluster of primitives the classifier recognized as one
//! semantic plot element (one box plot, one line series, …). Groups reference
//! primitives by id only; resolving an id after an out-of-band redraw may
//! yield nothing, and callers must treat that as a stale member.

use std::collections::HashMap;

use crate::scene::{AxesId, Primitive, PrimitiveId, Scene};
use crate::stats::BoxStats;

/// Semantic plot type of a classified group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlotType {
    /// A single line series.
    Line,
    /// A bar series.
    Bar,
    /// One of several bar series sharing an axes.
    GroupedBar,
    /// A scatter series.
    Scatter,
    /// A violin plot (all bodies of one call).
    Violin,
    /// A box plot (all boxes of one call).
    Boxplot,
    /// A histogram.
    Histogram,
    /// An error-bar series.
    Errorbar,
    /// A filled region.
    Fill,
    /// A heatmap image. No detector in this scene model produces it; the
    /// variant completes the plot-type vocabulary the UI layer consumes.
    Heatmap,
}

/// A structural fact a detector discovered about a group.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    /// A floating-point value.
    F64(f64),
    /// An integer value.
    Int(i64),
    /// A boolean flag.
    Bool(bool),
    /// A text value.
    Text(String),
    /// A list of floats (positions, bin edges, …).
    List(Vec<f64>),
    /// Per-box statistics.
    Stats(Vec<BoxStats>),
}

/// Free-form map of structural facts keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(HashMap<String, MetaValue>);

impl Metadata {
    /// Create an empty metadata map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a fact.
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.0.insert(key.into(), value);
    }

    /// Raw lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    /// Lookup as f64.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            MetaValue::F64(v) => Some(*v),
            MetaValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Lookup as integer.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            MetaValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Lookup as bool.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            MetaValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Lookup as text.
    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            MetaValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Lookup as float list.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<&[f64]> {
        match self.0.get(key)? {
            MetaValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Lookup as box statistics.
    #[must_use]
    pub fn get_stats(&self, key: &str) -> Option<&[BoxStats]> {
        match self.0.get(key)? {
            MetaValue::Stats(v) => Some(v),
            _ => None,
        }
    }

    /// Number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A group of related primitives sharing one plot type.
#[derive(Debug, Clone)]
pub struct Group {
    /// Semantic plot type.
    pub plot_type: PlotType,
    /// Owning axes.
    pub axes: AxesId,
    /// Member primitives, in detection order. Weak references: resolve
    /// through the scene and skip ids that no longer exist.
    pub members: Vec<PrimitiveId>,
    /// Human-readable label.
    pub label: String,
    /// Structural facts the detector discovered.
    pub metadata: Metadata,
}

impl Group {
    /// Create a group with empty metadata.
    #[must_use]
    pub fn new(plot_type: PlotType, axes: AxesId, members: Vec<PrimitiveId>, label: impl Into<String>) -> Self {
        Self {
            plot_type,
            axes,
            members,
            label: label.into(),
            metadata: Metadata::new(),
        }
    }

    /// Resolve the still-live member primitives.
    pub fn primitives<'a>(
        &'a self,
        scene: &'a Scene,
    ) -> impl Iterator<Item = (PrimitiveId, &'a Primitive)> {
        self.members
            .iter()
            .filter_map(move |&id| Some((id, scene.get(id)?)))
    }
}
