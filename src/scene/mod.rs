//! Scene model: axes, primitives, and host-library containers.
//!
//! The scene is a snapshot of what the renderer drew: an ordered list of
//! axes, each holding its primitives in creation order. Classification
//! depends on that order, so the scene maintains per-axes id lists rather
//! than relying on arena slot order.
//!
//! Primitives are owned here and referenced everywhere else by
//! [`PrimitiveId`]; a stale id (primitive destroyed by an out-of-band
//! redraw) resolves to `None` and is never dereferenced unsafely.

mod arena;
mod primitive;

pub use arena::{Arena, ArenaId};
pub use primitive::{Primitive, PrimitiveKind};

use crate::error::{Error, Result};

/// Stable identity of a primitive within its scene.
pub type PrimitiveId = ArenaId;

/// Identity of one axes (subplot) in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxesId(pub(crate) u32);

impl AxesId {
    /// Raw index of the axes in the scene.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// A composite record the host library kept alongside raw primitives.
///
/// Bar charts and error bars are created as containers grouping several
/// primitives; the detectors for those plot types match containers directly
/// instead of guessing from loose geometry.
#[derive(Debug, Clone)]
pub enum Container {
    /// A bar-series container grouping rectangle primitives.
    Bar {
        /// Member rectangles, in creation order.
        rects: Vec<PrimitiveId>,
        /// Series label.
        label: String,
    },
    /// An error-bar container.
    Errorbar {
        /// The central data line, if drawn.
        data_line: Option<PrimitiveId>,
        /// Cap lines at the error extents.
        caps: Vec<PrimitiveId>,
        /// Vertical/horizontal error bar lines.
        bars: Vec<PrimitiveId>,
        /// Series label.
        label: String,
        /// Index of the bar container on the same axes that owns this
        /// error bar (from `bar(yerr=...)`), or `None` when standalone.
        owner_bar: Option<usize>,
    },
}

impl Container {
    /// All primitive ids referenced by this container.
    #[must_use]
    pub fn member_ids(&self) -> Vec<PrimitiveId> {
        match self {
            Self::Bar { rects, .. } => rects.clone(),
            Self::Errorbar {
                data_line,
                caps,
                bars,
                ..
            } => data_line
                .iter()
                .chain(caps.iter())
                .chain(bars.iter())
                .copied()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Axes {
    order: Vec<PrimitiveId>,
    containers: Vec<Container>,
}

/// Ordered collection of axes and the primitives drawn on them.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    arena: Arena<Primitive>,
    axes: Vec<Axes>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new axes and return its id.
    pub fn add_axes(&mut self) -> AxesId {
        self.axes.push(Axes::default());
        AxesId(self.axes.len() as u32 - 1)
    }

    /// Number of axes in the scene.
    #[must_use]
    pub const fn axes_count(&self) -> usize {
        self.axes.len()
    }

    /// Ids of all axes, in subplot order.
    pub fn axes_ids(&self) -> impl Iterator<Item = AxesId> {
        (0..self.axes.len() as u32).map(AxesId)
    }

    /// Total number of live primitives.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the scene holds no primitives.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Add a primitive to an axes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAxes`] when `axes` is not in this scene.
    pub fn add_primitive(
        &mut self,
        axes: AxesId,
        kind: PrimitiveKind,
        label: impl Into<String>,
        internal: bool,
    ) -> Result<PrimitiveId> {
        if axes.0 as usize >= self.axes.len() {
            return Err(Error::UnknownAxes(axes.0));
        }
        let id = self
            .arena
            .insert(Primitive::new(axes, kind, label, internal));
        self.axes[axes.0 as usize].order.push(id);
        Ok(id)
    }

    /// Remove a primitive. Stale ids are a no-op returning `None`.
    pub fn remove_primitive(&mut self, id: PrimitiveId) -> Option<Primitive> {
        let removed = self.arena.remove(id)?;
        if let Some(axes) = self.axes.get_mut(removed.axes.0 as usize) {
            axes.order.retain(|&o| o != id);
        }
        Some(removed)
    }

    /// Look up a primitive. Stale ids yield `None`.
    #[must_use]
    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.arena.get(id)
    }

    /// Mutable lookup. Stale ids yield `None`.
    pub fn get_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.arena.get_mut(id)
    }

    /// Whether the id refers to a live primitive.
    #[must_use]
    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.arena.get(id).is_some()
    }

    /// Live primitives on one axes, in creation order.
    pub fn primitives_on(
        &self,
        axes: AxesId,
    ) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        let order: &[PrimitiveId] = self
            .axes
            .get(axes.0 as usize)
            .map_or(&[], |a| a.order.as_slice());
        order.iter().filter_map(|&id| Some((id, self.arena.get(id)?)))
    }

    /// Record a container on an axes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAxes`] when `axes` is not in this scene.
    pub fn push_container(&mut self, axes: AxesId, container: Container) -> Result<()> {
        let axes_state = self
            .axes
            .get_mut(axes.0 as usize)
            .ok_or(Error::UnknownAxes(axes.0))?;
        axes_state.containers.push(container);
        Ok(())
    }

    /// Containers recorded on an axes, in creation order.
    #[must_use]
    pub fn containers_on(&self, axes: AxesId) -> &[Container] {
        self.axes
            .get(axes.0 as usize)
            .map_or(&[], |a| a.containers.as_slice())
    }
}
