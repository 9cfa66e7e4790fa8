//! Atomic renderable objects.
//!
//! A [`Primitive`] is one low-level drawing the host renderer produced. The
//! scene carries no record of what chart a primitive belongs to; detectors
//! reconstruct that from geometry and style, pattern-matching on the closed
//! [`PrimitiveKind`] union.

use crate::geometry::{Point, Rect};
use crate::scene::AxesId;
use crate::style::{FillStyle, MarkerStyle, StrokeStyle};

/// Geometry and per-kind style of a primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveKind {
    /// A polyline.
    Line {
        /// Path vertices in data coordinates.
        points: Vec<Point>,
        /// Stroke style.
        stroke: StrokeStyle,
        /// Markers drawn at the vertices (shape `None` for a bare line).
        marker: MarkerStyle,
    },
    /// A filled polygon.
    Polygon {
        /// Boundary vertices in data coordinates.
        points: Vec<Point>,
        /// Fill style.
        fill: FillStyle,
    },
    /// An axis-aligned rectangle (bar, histogram bin).
    Rectangle {
        /// Extent in data coordinates.
        rect: Rect,
        /// Fill style.
        fill: FillStyle,
    },
    /// An unordered set of marker points (scatter).
    PointCloud {
        /// Point positions in data coordinates.
        points: Vec<Point>,
        /// Marker style.
        marker: MarkerStyle,
    },
}

/// One atomic renderable object owned by the scene.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub(crate) axes: AxesId,
    pub(crate) kind: PrimitiveKind,
    pub(crate) label: String,
    pub(crate) internal: bool,
    pub(crate) visible: bool,
}

impl Primitive {
    pub(crate) fn new(
        axes: AxesId,
        kind: PrimitiveKind,
        label: impl Into<String>,
        internal: bool,
    ) -> Self {
        Self {
            axes,
            kind,
            label: label.into(),
            internal,
            visible: true,
        }
    }

    /// Axes this primitive is drawn on.
    #[must_use]
    pub const fn axes(&self) -> AxesId {
        self.axes
    }

    /// Geometry and style.
    #[must_use]
    pub const fn kind(&self) -> &PrimitiveKind {
        &self.kind
    }

    /// Mutable geometry and style.
    pub fn kind_mut(&mut self) -> &mut PrimitiveKind {
        &mut self.kind
    }

    /// Human-readable series label (empty for unlabeled primitives).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the series label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Whether the host library created this primitive for bookkeeping
    /// (box-plot internals, errorbar caps) rather than as a user series.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.internal
    }

    /// Whether the primitive is drawn.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the primitive.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Geometry points, if the kind carries a point list.
    #[must_use]
    pub fn points(&self) -> Option<&[Point]> {
        match &self.kind {
            PrimitiveKind::Line { points, .. }
            | PrimitiveKind::Polygon { points, .. }
            | PrimitiveKind::PointCloud { points, .. } => Some(points),
            PrimitiveKind::Rectangle { .. } => None,
        }
    }

    /// Rectangle extent, for `Rectangle` primitives.
    #[must_use]
    pub fn rect(&self) -> Option<Rect> {
        match &self.kind {
            PrimitiveKind::Rectangle { rect, .. } => Some(*rect),
            _ => None,
        }
    }
}
