//! Undo/redo command system for scene modifications.
//!
//! Every mutation of the scene (a color change, a layout recomputation, a
//! remove-then-recreate sequence) is wrapped in a [`Command`] and executed
//! through a [`CommandStack`]. The stack keeps a bounded linear history:
//! undoing and redoing walk it, executing anything new truncates the redo
//! branch.
//!
//! This is a best-effort convenience ledger for an interactive tool, not a
//! transactional log: a command whose target primitive was destroyed by an
//! unrelated redraw degrades to a silent no-op instead of failing.

use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use crate::scene::{PrimitiveId, PrimitiveKind, Scene};
use crate::style::{LineStyle, MarkerShape, Rgba};

/// Default bound on undo history depth.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// A property a command can set through the canonical setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    /// Primary color (stroke, face, or marker face depending on kind).
    Color,
    /// Edge color.
    EdgeColor,
    /// Opacity (0.0-1.0).
    Alpha,
    /// Stroke or edge width.
    LineWidth,
    /// Dash pattern.
    LineStyle,
    /// Marker glyph.
    Marker,
    /// Marker size.
    MarkerSize,
    /// Hatch pattern (empty text clears it).
    Hatch,
    /// Series label.
    Label,
    /// Visibility.
    Visible,
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A color.
    Color(Rgba),
    /// A float.
    F64(f64),
    /// A dash pattern.
    Style(LineStyle),
    /// A marker glyph.
    Shape(MarkerShape),
    /// A string.
    Text(String),
    /// A boolean.
    Bool(bool),
}

/// Apply a property value to a primitive through the canonical setter.
///
/// Returns false (and changes nothing) on a stale target or a
/// property/kind mismatch.
fn apply_property(scene: &mut Scene, target: PrimitiveId, property: Property, value: &Value) -> bool {
    let Some(prim) = scene.get_mut(target) else {
        trace!(?property, "command target is stale, skipping");
        return false;
    };
    match (property, value) {
        (Property::Label, Value::Text(s)) => {
            prim.set_label(s.clone());
            true
        }
        (Property::Visible, Value::Bool(b)) => {
            prim.set_visible(*b);
            true
        }
        (Property::Color, Value::Color(c)) => match prim.kind_mut() {
            PrimitiveKind::Line { stroke, .. } => {
                stroke.color = *c;
                true
            }
            PrimitiveKind::Polygon { fill, .. } | PrimitiveKind::Rectangle { fill, .. } => {
                fill.face = *c;
                true
            }
            PrimitiveKind::PointCloud { marker, .. } => {
                marker.face = *c;
                true
            }
        },
        (Property::EdgeColor, Value::Color(c)) => match prim.kind_mut() {
            PrimitiveKind::Polygon { fill, .. } | PrimitiveKind::Rectangle { fill, .. } => {
                fill.edge = *c;
                true
            }
            PrimitiveKind::Line { marker, .. } | PrimitiveKind::PointCloud { marker, .. } => {
                marker.edge = *c;
                true
            }
        },
        (Property::Alpha, Value::F64(a)) => match prim.kind_mut() {
            PrimitiveKind::Line { stroke, .. } => {
                stroke.alpha = *a;
                true
            }
            PrimitiveKind::Polygon { fill, .. } | PrimitiveKind::Rectangle { fill, .. } => {
                fill.alpha = *a;
                true
            }
            PrimitiveKind::PointCloud { marker, .. } => {
                marker.alpha = *a;
                true
            }
        },
        (Property::LineWidth, Value::F64(w)) => match prim.kind_mut() {
            PrimitiveKind::Line { stroke, .. } => {
                stroke.width = *w;
                true
            }
            PrimitiveKind::Polygon { fill, .. } | PrimitiveKind::Rectangle { fill, .. } => {
                fill.edge_width = *w;
                true
            }
            PrimitiveKind::PointCloud { .. } => false,
        },
        (Property::LineStyle, Value::Style(s)) => match prim.kind_mut() {
            PrimitiveKind::Line { stroke, .. } => {
                stroke.style = *s;
                true
            }
            _ => false,
        },
        (Property::Marker, Value::Shape(s)) => match prim.kind_mut() {
            PrimitiveKind::Line { marker, .. } | PrimitiveKind::PointCloud { marker, .. } => {
                marker.shape = *s;
                true
            }
            _ => false,
        },
        (Property::MarkerSize, Value::F64(s)) => match prim.kind_mut() {
            PrimitiveKind::Line { marker, .. } | PrimitiveKind::PointCloud { marker, .. } => {
                marker.size = *s;
                true
            }
            _ => false,
        },
        (Property::Hatch, Value::Text(h)) => match prim.kind_mut() {
            PrimitiveKind::Polygon { fill, .. } | PrimitiveKind::Rectangle { fill, .. } => {
                fill.hatch = if h.is_empty() { None } else { Some(h.clone()) };
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// One atomic, invertible mutation.
pub enum Command {
    /// A single property change applied through the canonical setter.
    Set {
        /// Target primitive.
        target: PrimitiveId,
        /// Property to change.
        property: Property,
        /// Value before the change (applied on undo).
        old: Value,
        /// Value after the change (applied on execute/redo).
        new: Value,
        /// Human-readable description.
        description: String,
    },
    /// A mutation too complex for a single setter, with explicit apply and
    /// revert closures.
    Custom {
        /// Applies the mutation.
        apply: Box<dyn Fn(&mut Scene)>,
        /// Reverts the mutation.
        revert: Box<dyn Fn(&mut Scene)>,
        /// Human-readable description.
        description: String,
    },
}

impl Command {
    /// Create a simple property-change command.
    #[must_use]
    pub fn set(
        target: PrimitiveId,
        property: Property,
        old: Value,
        new: Value,
        description: impl Into<String>,
    ) -> Self {
        Self::Set {
            target,
            property,
            old,
            new,
            description: description.into(),
        }
    }

    /// Create a custom command from apply/revert closures.
    #[must_use]
    pub fn custom(
        description: impl Into<String>,
        apply: impl Fn(&mut Scene) + 'static,
        revert: impl Fn(&mut Scene) + 'static,
    ) -> Self {
        Self::Custom {
            apply: Box::new(apply),
            revert: Box::new(revert),
            description: description.into(),
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Set { description, .. } | Self::Custom { description, .. } => description,
        }
    }

    fn apply(&self, scene: &mut Scene) {
        match self {
            Self::Set {
                target,
                property,
                new,
                ..
            } => {
                apply_property(scene, *target, *property, new);
            }
            Self::Custom { apply, .. } => apply(scene),
        }
    }

    fn revert(&self, scene: &mut Scene) {
        match self {
            Self::Set {
                target,
                property,
                old,
                ..
            } => {
                apply_property(scene, *target, *property, old);
            }
            Self::Custom { revert, .. } => revert(scene),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set {
                target,
                property,
                old,
                new,
                description,
            } => f
                .debug_struct("Set")
                .field("target", target)
                .field("property", property)
                .field("old", old)
                .field("new", new)
                .field("description", description)
                .finish(),
            Self::Custom { description, .. } => f
                .debug_struct("Custom")
                .field("description", description)
                .finish_non_exhaustive(),
        }
    }
}

/// An ordered list of commands treated as one atomic undo unit.
///
/// Children execute in forward order and undo in reverse order, which is
/// required whenever they have order-dependent effects (remove-then-recreate
/// sequences, chained changes to the same property).
#[derive(Debug, Default)]
pub struct BatchCommand {
    /// Child commands.
    pub commands: Vec<Command>,
    /// Human-readable description.
    pub description: String,
}

impl BatchCommand {
    /// Create a batch from child commands.
    #[must_use]
    pub fn new(commands: Vec<Command>, description: impl Into<String>) -> Self {
        Self {
            commands,
            description: description.into(),
        }
    }

    fn apply(&self, scene: &mut Scene) {
        for cmd in &self.commands {
            cmd.apply(scene);
        }
    }

    fn revert(&self, scene: &mut Scene) {
        for cmd in self.commands.iter().rev() {
            cmd.revert(scene);
        }
    }
}

/// A single command or a batch, as stored by the stack.
#[derive(Debug)]
pub enum HistoryEntry {
    /// One command.
    Command(Command),
    /// An atomic batch.
    Batch(BatchCommand),
}

impl HistoryEntry {
    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Command(cmd) => cmd.description(),
            Self::Batch(batch) => &batch.description,
        }
    }

    fn apply(&self, scene: &mut Scene) {
        match self {
            Self::Command(cmd) => cmd.apply(scene),
            Self::Batch(batch) => batch.apply(scene),
        }
    }

    fn revert(&self, scene: &mut Scene) {
        match self {
            Self::Command(cmd) => cmd.revert(scene),
            Self::Batch(batch) => batch.revert(scene),
        }
    }
}

impl From<Command> for HistoryEntry {
    fn from(cmd: Command) -> Self {
        Self::Command(cmd)
    }
}

impl From<BatchCommand> for HistoryEntry {
    fn from(batch: BatchCommand) -> Self {
        Self::Batch(batch)
    }
}

/// Bounded undo/redo history with linear (non-branching) semantics.
pub struct CommandStack {
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    max_depth: usize,
    on_change: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("undo", &self.undo.len())
            .field("redo", &self.redo.len())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl CommandStack {
    /// Create a stack with the given maximum history depth (at least 1).
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth: max_depth.max(1),
            on_change: None,
        }
    }

    /// Subscribe to history changes (UI enable/disable, code regeneration).
    pub fn set_on_change(&mut self, hook: impl FnMut() + 'static) {
        self.on_change = Some(Box::new(hook));
    }

    /// Whether undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of entries in the undo history.
    #[must_use]
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    /// Whether the undo history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// Descriptions of the undo history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<&str> {
        self.undo.iter().map(HistoryEntry::description).collect()
    }

    /// Execute an entry and push it onto the undo history.
    ///
    /// Evicts the oldest entry past `max_depth` and invalidates the redo
    /// stack; history is strictly linear.
    pub fn execute(&mut self, entry: impl Into<HistoryEntry>, scene: &mut Scene) {
        let entry = entry.into();
        trace!(description = entry.description(), "execute");
        entry.apply(scene);
        self.undo.push_back(entry);
        if self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
        self.redo.clear();
        self.notify();
    }

    /// Undo the most recent entry. No-op when the history is empty.
    pub fn undo(&mut self, scene: &mut Scene) {
        let Some(entry) = self.undo.pop_back() else {
            return;
        };
        trace!(description = entry.description(), "undo");
        entry.revert(scene);
        self.redo.push(entry);
        self.notify();
    }

    /// Redo the most recently undone entry. No-op when nothing was undone.
    pub fn redo(&mut self, scene: &mut Scene) {
        let Some(entry) = self.redo.pop() else {
            return;
        };
        trace!(description = entry.description(), "redo");
        entry.apply(scene);
        self.undo.push_back(entry);
        self.notify();
    }

    /// Drop both histories.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.notify();
    }

    fn notify(&mut self) {
        if let Some(hook) = self.on_change.as_mut() {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::style::{MarkerStyle, StrokeStyle};
    use std::cell::Cell;
    use std::rc::Rc;

    fn scene_with_line() -> (Scene, PrimitiveId) {
        let mut scene = Scene::new();
        let ax = scene.add_axes();
        let id = scene
            .add_primitive(
                ax,
                PrimitiveKind::Line {
                    points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
                    stroke: StrokeStyle::default(),
                    marker: MarkerStyle::default(),
                },
                "series",
                false,
            )
            .unwrap();
        (scene, id)
    }

    fn stroke_color(scene: &Scene, id: PrimitiveId) -> Rgba {
        match scene.get(id).unwrap().kind() {
            PrimitiveKind::Line { stroke, .. } => stroke.color,
            _ => unreachable!(),
        }
    }

    fn set_color(id: PrimitiveId, old: Rgba, new: Rgba) -> Command {
        Command::set(
            id,
            Property::Color,
            Value::Color(old),
            Value::Color(new),
            "set color",
        )
    }

    #[test]
    fn test_execute_undo_redo_round_trip() {
        let (mut scene, id) = scene_with_line();
        let mut stack = CommandStack::default();
        let colors = [Rgba::rgb(10, 0, 0), Rgba::rgb(20, 0, 0), Rgba::rgb(30, 0, 0)];

        let mut prev = Rgba::BLACK;
        for &c in &colors {
            stack.execute(set_color(id, prev, c), &mut scene);
            prev = c;
        }
        assert_eq!(stroke_color(&scene, id), colors[2]);
        assert_eq!(stack.len(), 3);

        for _ in 0..3 {
            stack.undo(&mut scene);
        }
        assert_eq!(stroke_color(&scene, id), Rgba::BLACK);
        assert!(!stack.can_undo());
        assert!(stack.can_redo());

        for _ in 0..3 {
            stack.redo(&mut scene);
        }
        assert_eq!(stroke_color(&scene, id), colors[2]);
        assert_eq!(stack.len(), 3);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_execute_invalidates_redo() {
        let (mut scene, id) = scene_with_line();
        let mut stack = CommandStack::default();
        let a = Rgba::rgb(1, 0, 0);
        let b = Rgba::rgb(2, 0, 0);

        stack.execute(set_color(id, Rgba::BLACK, a), &mut scene);
        stack.undo(&mut scene);
        assert!(stack.can_redo());
        stack.execute(set_color(id, Rgba::BLACK, b), &mut scene);
        assert!(!stack.can_redo());
        assert_eq!(stroke_color(&scene, id), b);
    }

    #[test]
    fn test_bounded_history_evicts_oldest() {
        let (mut scene, id) = scene_with_line();
        let mut stack = CommandStack::new(100);
        let mut prev = Rgba::BLACK;
        for i in 0..105u8 {
            let c = Rgba::rgb(i, 0, 0);
            stack.execute(set_color(id, prev, c), &mut scene);
            prev = c;
        }
        assert_eq!(stack.len(), 100);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_batch_undoes_in_reverse_order() {
        let (mut scene, id) = scene_with_line();
        let mut stack = CommandStack::default();
        let a = Rgba::rgb(1, 0, 0);
        let b = Rgba::rgb(2, 0, 0);

        // Two order-dependent changes to the same property: undoing them
        // forward would leave `a`; only reverse order restores black.
        let batch = BatchCommand::new(
            vec![set_color(id, Rgba::BLACK, a), set_color(id, a, b)],
            "recolor twice",
        );
        stack.execute(batch, &mut scene);
        assert_eq!(stroke_color(&scene, id), b);
        assert_eq!(stack.len(), 1);

        stack.undo(&mut scene);
        assert_eq!(stroke_color(&scene, id), Rgba::BLACK);
        stack.redo(&mut scene);
        assert_eq!(stroke_color(&scene, id), b);
    }

    #[test]
    fn test_stale_target_is_silent_noop() {
        let (mut scene, id) = scene_with_line();
        let mut stack = CommandStack::default();
        let cmd = set_color(id, Rgba::BLACK, Rgba::rgb(9, 9, 9));
        scene.remove_primitive(id);

        stack.execute(cmd, &mut scene);
        stack.undo(&mut scene);
        stack.redo(&mut scene);
        // Nothing observable happened and nothing panicked.
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_property_kind_mismatch_is_noop() {
        let (mut scene, id) = scene_with_line();
        let mut stack = CommandStack::default();
        // LineStyle on a line is fine; Hatch on a line is not.
        stack.execute(
            Command::set(
                id,
                Property::Hatch,
                Value::Text(String::new()),
                Value::Text("//".into()),
                "hatch a line",
            ),
            &mut scene,
        );
        assert_eq!(stroke_color(&scene, id), Rgba::BLACK);
    }

    #[test]
    fn test_custom_command_closures() {
        let (mut scene, id) = scene_with_line();
        let mut stack = CommandStack::default();
        let cmd = Command::custom(
            "hide",
            move |scene: &mut Scene| {
                if let Some(p) = scene.get_mut(id) {
                    p.set_visible(false);
                }
            },
            move |scene: &mut Scene| {
                if let Some(p) = scene.get_mut(id) {
                    p.set_visible(true);
                }
            },
        );
        stack.execute(cmd, &mut scene);
        assert!(!scene.get(id).unwrap().is_visible());
        stack.undo(&mut scene);
        assert!(scene.get(id).unwrap().is_visible());
    }

    #[test]
    fn test_on_change_hook_fires() {
        let (mut scene, id) = scene_with_line();
        let mut stack = CommandStack::default();
        let count = Rc::new(Cell::new(0));
        let hook_count = Rc::clone(&count);
        stack.set_on_change(move || hook_count.set(hook_count.get() + 1));

        stack.execute(set_color(id, Rgba::BLACK, Rgba::WHITE), &mut scene);
        stack.undo(&mut scene);
        stack.redo(&mut scene);
        stack.clear();
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn test_undo_redo_on_empty_are_noops() {
        let (mut scene, _) = scene_with_line();
        let mut stack = CommandStack::default();
        stack.undo(&mut scene);
        stack.redo(&mut scene);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_history_descriptions() {
        let (mut scene, id) = scene_with_line();
        let mut stack = CommandStack::default();
        stack.execute(set_color(id, Rgba::BLACK, Rgba::WHITE), &mut scene);
        stack.execute(
            BatchCommand::new(vec![], "empty batch"),
            &mut scene,
        );
        assert_eq!(stack.history(), vec!["set color", "empty batch"]);
    }
}

// ============================================================================
// Property-based tests with proptest
// ============================================================================
