//! # Replot
//!
//! Engine core for interactive chart restyling: reconstruct plot semantics
//! from an unannotated scene of rendering primitives, record every edit as
//! an invertible command, and recompute geometry for grouped categorical
//! charts.
//!
//! An already-rendered chart arrives as nothing but low-level primitives
//! (lines, polygons, rectangles, point clouds) with no stored record of
//! "this is a box plot". Three engines recover and maintain the semantics:
//!
//! - **Classifier**: a fixed pipeline of structural detectors partitions the
//!   primitives of each axes into typed [`Group`](group::Group)s, claiming
//!   each primitive at most once.
//! - **Command engine**: every mutation goes through a bounded
//!   [`CommandStack`](command::CommandStack) with strictly linear undo/redo.
//! - **Categorical layout engine**: grouped bar/box/violin/jitter charts are
//!   repositioned by one [`CategoricalLayout`](layout::CategoricalLayout)
//!   per axes, with bit-identical recomputation so regenerated source code
//!   matches the screen.
//!
//! Rendering, widget toolkits, code generation, and file I/O are external
//! collaborators: the engines consume a [`Scene`](scene::Scene) snapshot and
//! invoke an opaque redraw callback.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use replot::prelude::*;
//!
//! let groups = classify(&scene);
//! let mut session = EditSession::new();
//! session.execute(
//!     Command::set(target, Property::Color,
//!                  Value::Color(old), Value::Color(new), "recolor series"),
//!     &mut scene,
//! );
//! session.undo(&mut scene);
//! ```

#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in chart-geometry code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Geometric primitives (points, rectangles) in data coordinates.
pub mod geometry;

/// Style attributes (colors, strokes, fills, markers).
pub mod style;

/// Scene model: axes, primitives, containers, stable identities.
pub mod scene;

/// Box plot statistics (quartiles, Tukey whiskers).
pub mod stats;

// ============================================================================
// Engine Modules
// ============================================================================

/// Classification results: plot types, groups, metadata.
pub mod group;

/// Structural classification of primitives into plot groups.
pub mod classify;

/// Undo/redo command system.
pub mod command;

/// Categorical layout engine for grouped distribution charts.
pub mod layout;

/// Per-chart editing session tying the engines together.
pub mod session;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for replot operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and functions for convenient imports.
///
/// ```rust,ignore
/// use replot::prelude::*;
/// ```
pub mod prelude {
    pub use crate::classify::classify;
    pub use crate::command::{BatchCommand, Command, CommandStack, Property, Value};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Point, Rect};
    pub use crate::group::{Group, MetaValue, Metadata, PlotType};
    pub use crate::layout::{
        CategoricalLayout, DisplayMode, DistInfo, GroupSamples, LayoutResult, Orientation,
        SideTable, ViolinInner,
    };
    pub use crate::scene::{AxesId, Container, Primitive, PrimitiveId, PrimitiveKind, Scene};
    pub use crate::session::EditSession;
    pub use crate::stats::BoxStats;
    pub use crate::style::{
        FillStyle, LineStyle, MarkerShape, MarkerStyle, Rgba, StrokeStyle,
    };
}

// ============================================================================
// Tests
// ============================================================================
