//! Per-chart editing session.
//!
//! An [`EditSession`] owns everything one open chart needs while it is being
//! restyled: the command history, one categorical layout per axes, the
//! structural side-table read by code regeneration, and the redraw callback
//! the external renderer registered. All mutation runs synchronously inside
//! UI callbacks on a single thread.

use std::collections::HashMap;

use tracing::debug;

use crate::command::{CommandStack, HistoryEntry};
use crate::error::Result;
use crate::group::Group;
use crate::layout::{CategoricalLayout, DisplayMode, GroupSamples, LayoutResult, SideTable};
use crate::scene::{AxesId, Scene};

/// Redraw callback type. Throttling is the renderer's concern; the session
/// invokes the callback after every mutation.
pub type RedrawHook = Box<dyn FnMut()>;

/// Editing state for one open chart.
pub struct EditSession {
    commands: CommandStack,
    layouts: HashMap<AxesId, CategoricalLayout>,
    side_table: SideTable,
    redraw: Option<RedrawHook>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("commands", &self.commands)
            .field("layouts", &self.layouts.len())
            .field("side_table", &self.side_table.len())
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Create a session with default history depth.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: CommandStack::default(),
            layouts: HashMap::new(),
            side_table: SideTable::new(),
            redraw: None,
        }
    }

    /// Register the renderer's redraw callback.
    pub fn set_redraw(&mut self, hook: impl FnMut() + 'static) {
        self.redraw = Some(Box::new(hook));
    }

    /// Classify the scene into plot groups.
    ///
    /// Groups are rebuilt fresh on every call; discard previous results
    /// whenever the underlying primitives were structurally replaced.
    #[must_use]
    pub fn classify(&self, scene: &Scene) -> Vec<Group> {
        crate::classify::classify(scene)
    }

    /// The command history.
    #[must_use]
    pub const fn commands(&self) -> &CommandStack {
        &self.commands
    }

    /// Mutable command history (to subscribe to change notifications).
    pub fn commands_mut(&mut self) -> &mut CommandStack {
        &mut self.commands
    }

    /// Execute a command or batch against the scene and redraw.
    pub fn execute(&mut self, entry: impl Into<HistoryEntry>, scene: &mut Scene) {
        self.commands.execute(entry, scene);
        self.request_redraw();
    }

    /// Undo the most recent entry and redraw. No-op on empty history.
    pub fn undo(&mut self, scene: &mut Scene) {
        self.commands.undo(scene);
        self.request_redraw();
    }

    /// Redo the most recently undone entry and redraw.
    pub fn redo(&mut self, scene: &mut Scene) {
        self.commands.redo(scene);
        self.request_redraw();
    }

    /// Whether undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    /// Whether redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    /// Drop the command history.
    pub fn clear_history(&mut self) {
        self.commands.clear();
    }

    /// Layout state for one axes, created on first access.
    pub fn layout_mut(&mut self, axes: AxesId) -> &mut CategoricalLayout {
        self.layouts.entry(axes).or_default()
    }

    /// Layout state for one axes, if any edits touched it.
    #[must_use]
    pub fn layout(&self, axes: AxesId) -> Option<&CategoricalLayout> {
        self.layouts.get(&axes)
    }

    /// The structural side-table for code regeneration.
    #[must_use]
    pub const fn side_table(&self) -> &SideTable {
        &self.side_table
    }

    /// Switch an axes' display mode, recompute its layout, publish the
    /// side-table records, and redraw.
    ///
    /// # Errors
    ///
    /// Returns the layout engine's validation error unchanged; on error no
    /// side-table entry is touched and no redraw is requested.
    pub fn apply_mode(
        &mut self,
        axes: AxesId,
        mode: DisplayMode,
        groups: &[GroupSamples],
    ) -> Result<LayoutResult> {
        let layout = self.layouts.entry(axes).or_default();
        layout.compose(mode);
        let result = layout.recompute(groups)?;
        layout.publish(axes, &result, &mut self.side_table);
        debug!(axes = axes.index(), mode = %mode, "applied display mode");
        self.request_redraw();
        Ok(result)
    }

    /// Recompute an axes' layout with its current mode and republish.
    ///
    /// # Errors
    ///
    /// Returns the layout engine's validation error unchanged.
    pub fn recompute(&mut self, axes: AxesId, groups: &[GroupSamples]) -> Result<LayoutResult> {
        let layout = self.layouts.entry(axes).or_default();
        let result = layout.recompute(groups)?;
        layout.publish(axes, &result, &mut self.side_table);
        self.request_redraw();
        Ok(result)
    }

    fn request_redraw(&mut self) {
        if let Some(hook) = self.redraw.as_mut() {
            hook();
        }
    }
}
