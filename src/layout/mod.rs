//! Categorical layout engine for grouped distribution charts.
//!
//! Several series sharing one categorical axis (grouped box plots, violins,
//! jitter strips, and their combinations) are positioned by a single
//! [`CategoricalLayout`]: every series gets a symmetric offset around each
//! tick center, and the composed display mode decides which layers are
//! produced and at what widths.
//!
//! Recomputation is a pure function of the layout state and the input
//! samples: identical inputs yield bit-identical output, which generated
//! code relies on.

mod jitter;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::scene::AxesId;
use crate::stats::BoxStats;
use jitter::{Lcg, JITTER_SEED};

/// Default jitter spread in category-axis units.
pub const DEFAULT_JITTER_SPREAD: f64 = 0.2;

/// Fraction of the nominal width a box narrows to when drawn over a violin.
const NARROW_BOX_FRACTION: f64 = 0.3;

/// Factor violins widen by relative to the nominal element width.
const VIOLIN_WIDTH_FACTOR: f64 = 1.5;

/// Which way the category axis runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Categories along x, data along y.
    #[default]
    Vertical,
    /// Categories along y, data along x.
    Horizontal,
}

/// A non-empty subset of the box, violin, and jitter layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayMode {
    box_layer: bool,
    violin_layer: bool,
    jitter_layer: bool,
}

impl DisplayMode {
    /// Box plots only.
    pub const BOX: Self = Self {
        box_layer: true,
        violin_layer: false,
        jitter_layer: false,
    };
    /// Violins only.
    pub const VIOLIN: Self = Self {
        box_layer: false,
        violin_layer: true,
        jitter_layer: false,
    };
    /// Jitter strip only.
    pub const JITTER: Self = Self {
        box_layer: false,
        violin_layer: false,
        jitter_layer: true,
    };

    /// Compose a mode from layer flags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDisplayMode`] when no layer is enabled.
    pub fn new(box_layer: bool, violin_layer: bool, jitter_layer: bool) -> Result<Self> {
        if !box_layer && !violin_layer && !jitter_layer {
            return Err(Error::EmptyDisplayMode);
        }
        Ok(Self {
            box_layer,
            violin_layer,
            jitter_layer,
        })
    }

    /// This mode plus the box layer.
    #[must_use]
    pub const fn and_box(self) -> Self {
        Self {
            box_layer: true,
            ..self
        }
    }

    /// This mode plus the violin layer.
    #[must_use]
    pub const fn and_violin(self) -> Self {
        Self {
            violin_layer: true,
            ..self
        }
    }

    /// This mode plus the jitter layer.
    #[must_use]
    pub const fn and_jitter(self) -> Self {
        Self {
            jitter_layer: true,
            ..self
        }
    }

    /// Whether the box layer is shown.
    #[must_use]
    pub const fn has_box(self) -> bool {
        self.box_layer
    }

    /// Whether the violin layer is shown.
    #[must_use]
    pub const fn has_violin(self) -> bool {
        self.violin_layer
    }

    /// Whether the jitter layer is shown.
    #[must_use]
    pub const fn has_jitter(self) -> bool {
        self.jitter_layer
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if self.box_layer {
            parts.push("box");
        }
        if self.violin_layer {
            parts.push("violin");
        }
        if self.jitter_layer {
            parts.push("jitter");
        }
        write!(f, "{}", parts.join("+"))
    }
}

impl std::str::FromStr for DisplayMode {
    type Err = Error;

    /// Parse a `+`-joined mode string such as `"box+violin+jitter"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut mode = (false, false, false);
        for part in s.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            match part {
                "box" => mode.0 = true,
                "violin" => mode.1 = true,
                "jitter" => mode.2 = true,
                other => {
                    return Err(Error::InvalidLayout(format!("unknown display layer: {other}")))
                }
            }
        }
        Self::new(mode.0, mode.1, mode.2)
    }
}

/// Inner statistic markings drawn inside a violin body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViolinInner {
    /// No inner markings.
    None,
    /// Median and extrema lines.
    #[default]
    Box,
}

/// Per-series input to a layout recompute.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupSamples {
    /// Series label.
    pub label: String,
    /// Raw samples per category.
    pub samples: Vec<Vec<f64>>,
    /// Original box statistics per category, reused verbatim when present
    /// and consistent with `samples` (preferred over recomputation, which
    /// would lose fliers through resampling).
    pub stats: Option<Vec<BoxStats>>,
}

/// Box layer of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxLayer {
    /// Box width in category units.
    pub width: f64,
    /// Per-category statistics.
    pub stats: Vec<BoxStats>,
}

/// Violin layer of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolinLayer {
    /// Violin width in category units.
    pub width: f64,
    /// Whether inner statistic markings are drawn.
    pub show_inner: bool,
}

/// Jitter layer of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct JitterLayer {
    /// Spread in category units.
    pub spread: f64,
    /// Per-category, per-sample offsets from the series position.
    pub offsets: Vec<Vec<f64>>,
}

/// Layout of one series across all categories.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLayout {
    /// Series label.
    pub label: String,
    /// Position per category (tick center plus centered group offset).
    pub positions: Vec<f64>,
    /// Box layer, when the mode includes it.
    pub box_layer: Option<BoxLayer>,
    /// Violin layer, when the mode includes it.
    pub violin_layer: Option<ViolinLayer>,
    /// Jitter layer, when the mode includes it.
    pub jitter_layer: Option<JitterLayer>,
}

/// Result of one layout recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    /// Per-series layouts, in group order.
    pub groups: Vec<GroupLayout>,
    /// Category-axis extent covering every element.
    pub category_range: (f64, f64),
    /// Data-axis extent covering every sample, with margin.
    pub data_range: (f64, f64),
}

/// Structural record for one series, written to the [`SideTable`] after
/// every recompute for the code-regeneration collaborator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistInfo {
    /// Series label.
    pub label: String,
    /// Composed display mode.
    pub display_mode: DisplayMode,
    /// Category axis orientation.
    pub orientation: Orientation,
    /// Nominal element width.
    pub width: f64,
    /// Gap between neighboring series.
    pub gap: f64,
    /// Series positions per category.
    pub positions: Vec<f64>,
    /// Tick centers shared by all series on the axes.
    pub tick_centers: Vec<f64>,
    /// Violin inner-marking mode.
    pub violin_inner: ViolinInner,
    /// Jitter spread.
    pub jitter_spread: f64,
    /// Box statistics used for this series.
    pub box_stats: Vec<BoxStats>,
}

/// Per-axes structural side-table consumed by code regeneration.
///
/// Owned by the session controller and passed to the layout engine, never
/// attached to the scene.
#[derive(Debug, Clone, Default)]
pub struct SideTable {
    entries: HashMap<AxesId, Vec<DistInfo>>,
}

impl SideTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records for one axes, in group order.
    #[must_use]
    pub fn get(&self, axes: AxesId) -> Option<&[DistInfo]> {
        self.entries.get(&axes).map(Vec::as_slice)
    }

    /// Replace the records for one axes.
    pub fn replace(&mut self, axes: AxesId, infos: Vec<DistInfo>) {
        self.entries.insert(axes, infos);
    }

    /// Number of axes with records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Structural state for the grouped categorical charts of one axes.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalLayout {
    n_groups: usize,
    n_ticks: usize,
    tick_centers: Vec<f64>,
    width: f64,
    gap: f64,
    orientation: Orientation,
    mode: DisplayMode,
    violin_inner: ViolinInner,
    jitter_spread: f64,
}

impl Default for CategoricalLayout {
    fn default() -> Self {
        Self {
            n_groups: 1,
            n_ticks: 0,
            tick_centers: Vec::new(),
            width: 0.5,
            gap: 0.0,
            orientation: Orientation::Vertical,
            mode: DisplayMode::BOX,
            violin_inner: ViolinInner::default(),
            jitter_spread: DEFAULT_JITTER_SPREAD,
        }
    }
}

impl CategoricalLayout {
    /// Create a layout with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store structural parameters and recompute default tick centers
    /// (`0..n_ticks`). Call [`set_tick_centers`](Self::set_tick_centers)
    /// afterwards to keep the positions of a pre-existing chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] on a non-positive or non-finite
    /// width, negative or non-finite gap, or zero groups; prior state is
    /// left unchanged.
    pub fn set_structure(
        &mut self,
        n_groups: usize,
        n_ticks: usize,
        width: f64,
        gap: f64,
        orientation: Orientation,
    ) -> Result<()> {
        if n_groups == 0 {
            return Err(Error::InvalidLayout("group count must be at least 1".into()));
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(Error::InvalidLayout(format!(
                "width must be positive and finite, got {width}"
            )));
        }
        if !gap.is_finite() || gap < 0.0 {
            return Err(Error::InvalidLayout(format!(
                "gap must be non-negative and finite, got {gap}"
            )));
        }
        self.n_groups = n_groups;
        self.n_ticks = n_ticks;
        self.width = width;
        self.gap = gap;
        self.orientation = orientation;
        self.tick_centers = (0..n_ticks).map(|i| i as f64).collect();
        Ok(())
    }

    /// Supply tick centers detected from a pre-existing chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] when the count differs from the
    /// configured tick count.
    pub fn set_tick_centers(&mut self, centers: Vec<f64>) -> Result<()> {
        if centers.len() != self.n_ticks {
            return Err(Error::LengthMismatch {
                expected: self.n_ticks,
                actual: centers.len(),
            });
        }
        self.tick_centers = centers;
        Ok(())
    }

    /// Number of series sharing the axis.
    #[must_use]
    pub const fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Number of categories.
    #[must_use]
    pub const fn n_ticks(&self) -> usize {
        self.n_ticks
    }

    /// Tick centers.
    #[must_use]
    pub fn tick_centers(&self) -> &[f64] {
        &self.tick_centers
    }

    /// Nominal element width.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Gap between neighboring series at one tick.
    #[must_use]
    pub const fn gap(&self) -> f64 {
        self.gap
    }

    /// Category axis orientation.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Active display mode.
    #[must_use]
    pub const fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Violin inner-marking mode.
    #[must_use]
    pub const fn violin_inner(&self) -> ViolinInner {
        self.violin_inner
    }

    /// Set the violin inner-marking mode.
    pub fn set_violin_inner(&mut self, inner: ViolinInner) {
        self.violin_inner = inner;
    }

    /// Jitter spread.
    #[must_use]
    pub const fn jitter_spread(&self) -> f64 {
        self.jitter_spread
    }

    /// Set the jitter spread (independent of element width).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] on a negative or non-finite spread.
    pub fn set_jitter_spread(&mut self, spread: f64) -> Result<()> {
        if !spread.is_finite() || spread < 0.0 {
            return Err(Error::InvalidLayout(format!(
                "jitter spread must be non-negative and finite, got {spread}"
            )));
        }
        self.jitter_spread = spread;
        Ok(())
    }

    /// Centered offset of one series from its tick center.
    #[must_use]
    pub fn group_offset(&self, group: usize) -> f64 {
        (group as f64 - (self.n_groups as f64 - 1.0) / 2.0) * (self.width + self.gap)
    }

    /// Position of one series at one category:
    /// `tick_centers[tick] + (group − (n_groups−1)/2) · (width + gap)`.
    ///
    /// # Panics
    ///
    /// Panics when `tick` is out of range.
    #[must_use]
    pub fn position_for(&self, tick: usize, group: usize) -> f64 {
        self.tick_centers[tick] + self.group_offset(group)
    }

    /// Positions of one series across all categories.
    #[must_use]
    pub fn positions_for(&self, group: usize) -> Vec<f64> {
        let offset = self.group_offset(group);
        self.tick_centers.iter().map(|c| c + offset).collect()
    }

    /// Switch the display mode.
    ///
    /// Entering a mode that shows both box and violin from one that did not
    /// resets the violin inner markings to none; the box layer already
    /// shows median and whiskers. This reset is a one-way UI convenience and
    /// is not recorded in the undo history.
    pub fn compose(&mut self, mode: DisplayMode) {
        let had_both = self.mode.has_box() && self.mode.has_violin();
        let has_both = mode.has_box() && mode.has_violin();
        if has_both && !had_both {
            self.violin_inner = ViolinInner::None;
        }
        self.mode = mode;
    }

    /// Box width under the active mode: narrowed to 30% of nominal when
    /// drawn on top of the wider violin.
    #[must_use]
    pub fn box_width(&self) -> f64 {
        if self.mode.has_violin() {
            self.width * NARROW_BOX_FRACTION
        } else {
            self.width
        }
    }

    /// Violin width: 1.5 × nominal, so a narrowed box sits inside it.
    #[must_use]
    pub fn violin_width(&self) -> f64 {
        self.width * VIOLIN_WIDTH_FACTOR
    }

    /// Category-axis extent covering every element of every series.
    #[must_use]
    pub fn category_extent(&self) -> (f64, f64) {
        let (Some(first), Some(last)) = (self.tick_centers.first(), self.tick_centers.last())
        else {
            return (-0.5, 0.5);
        };
        let mut half = self.width.max(self.width * VIOLIN_WIDTH_FACTOR) / 2.0 + 0.15;
        if self.n_groups > 1 {
            half += ((self.n_groups as f64 - 1.0) / 2.0 * (self.width + self.gap)).abs();
        }
        (first - half, last + half)
    }

    /// Recompute positions and layers for every series.
    ///
    /// Pure function of the layout state and `groups`: identical inputs
    /// produce bit-identical output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] when `groups` does not have one
    /// entry per configured series.
    pub fn recompute(&self, groups: &[GroupSamples]) -> Result<LayoutResult> {
        if groups.len() != self.n_groups {
            return Err(Error::LengthMismatch {
                expected: self.n_groups,
                actual: groups.len(),
            });
        }

        let mut out = Vec::with_capacity(groups.len());
        for (j, group) in groups.iter().enumerate() {
            let positions = self.positions_for(j);
            let n_cats = group.samples.len().min(positions.len());

            let box_layer = self.mode.has_box().then(|| BoxLayer {
                width: self.box_width(),
                stats: stats_for(group, n_cats),
            });

            let violin_layer = self.mode.has_violin().then(|| ViolinLayer {
                width: self.violin_width(),
                // The box layer already shows median and whiskers.
                show_inner: self.violin_inner != ViolinInner::None && !self.mode.has_box(),
            });

            let jitter_layer = self.mode.has_jitter().then(|| {
                let mut rng = Lcg::new(JITTER_SEED);
                let offsets = group.samples[..n_cats]
                    .iter()
                    .map(|samples| {
                        samples
                            .iter()
                            .map(|_| rng.next_offset(self.jitter_spread))
                            .collect()
                    })
                    .collect();
                JitterLayer {
                    spread: self.jitter_spread,
                    offsets,
                }
            });

            out.push(GroupLayout {
                label: group.label.clone(),
                positions,
                box_layer,
                violin_layer,
                jitter_layer,
            });
        }

        debug!(
            mode = %self.mode,
            n_groups = self.n_groups,
            n_ticks = self.n_ticks,
            "layout recomputed"
        );

        Ok(LayoutResult {
            groups: out,
            category_range: self.category_extent(),
            data_range: data_extent(groups),
        })
    }

    /// Publish per-series structural records to the side-table.
    ///
    /// The table entry for `axes` is fully up to date when this returns.
    pub fn publish(&self, axes: AxesId, result: &LayoutResult, table: &mut SideTable) {
        let infos = result
            .groups
            .iter()
            .map(|group| DistInfo {
                label: group.label.clone(),
                display_mode: self.mode,
                orientation: self.orientation,
                width: self.width,
                gap: self.gap,
                positions: group.positions.clone(),
                tick_centers: self.tick_centers.clone(),
                violin_inner: self.violin_inner,
                jitter_spread: self.jitter_spread,
                box_stats: group
                    .box_layer
                    .as_ref()
                    .map(|layer| layer.stats.clone())
                    .unwrap_or_default(),
            })
            .collect();
        table.replace(axes, infos);
    }
}

/// Statistics for one series: reuse the originals when they are consistent
/// with the samples, otherwise recompute with the Tukey rule.
fn stats_for(group: &GroupSamples, n_cats: usize) -> Vec<BoxStats> {
    if let Some(stats) = &group.stats {
        if stats.len() == group.samples.len() {
            return stats[..n_cats].to_vec();
        }
    }
    group.samples[..n_cats]
        .iter()
        .map(|samples| BoxStats::from_samples(samples).unwrap_or_default())
        .collect()
}

/// Data-axis extent over every sample, with a 5% margin (at least 1.0 for
/// near-degenerate ranges).
fn data_extent(groups: &[GroupSamples]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for group in groups {
        for samples in &group.samples {
            for &v in samples {
                if v.is_finite() {
                    lo = lo.min(v);
                    hi = hi.max(v);
                }
            }
        }
    }
    if lo > hi {
        return (0.0, 1.0);
    }
    let mut margin = (hi - lo) * 0.05;
    if margin < 0.1 {
        margin = 1.0;
    }
    (lo - margin, hi + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_layout(n_groups: usize, n_ticks: usize, width: f64, gap: f64) -> CategoricalLayout {
        let mut layout = CategoricalLayout::new();
        layout
            .set_structure(n_groups, n_ticks, width, gap, Orientation::Vertical)
            .unwrap();
        layout
    }

    fn two_category_samples(n_groups: usize) -> Vec<GroupSamples> {
        (0..n_groups)
            .map(|g| GroupSamples {
                label: format!("series {g}"),
                samples: vec![
                    vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    vec![2.0, 3.0, 4.0, 5.0, 6.0],
                ],
                stats: None,
            })
            .collect()
    }

    #[test]
    fn test_centered_positions_concrete() {
        let layout = make_layout(2, 2, 0.5, 0.1);
        assert_relative_eq!(layout.position_for(0, 0), -0.3);
        assert_relative_eq!(layout.position_for(0, 1), 0.3);
        assert_relative_eq!(layout.position_for(1, 0), 0.7);
        assert_relative_eq!(layout.position_for(1, 1), 1.3);
    }

    #[test]
    fn test_offsets_symmetric_about_tick() {
        for n_groups in 1..=6 {
            let layout = make_layout(n_groups, 3, 0.4, 0.05);
            let mean: f64 = (0..n_groups).map(|g| layout.group_offset(g)).sum::<f64>()
                / n_groups as f64;
            assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_default_tick_centers_are_integers() {
        let layout = make_layout(1, 4, 0.5, 0.0);
        assert_eq!(layout.tick_centers(), &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_caller_supplied_tick_centers() {
        let mut layout = make_layout(1, 2, 0.5, 0.0);
        layout.set_tick_centers(vec![10.0, 20.0]).unwrap();
        assert_relative_eq!(layout.position_for(1, 0), 20.0);
        assert!(layout.set_tick_centers(vec![1.0]).is_err());
    }

    #[test]
    fn test_invalid_parameters_leave_state_unchanged() {
        let mut layout = make_layout(2, 3, 0.5, 0.1);
        let before = layout.clone();

        assert!(layout.set_structure(2, 3, -1.0, 0.1, Orientation::Vertical).is_err());
        assert!(layout.set_structure(2, 3, f64::NAN, 0.1, Orientation::Vertical).is_err());
        assert!(layout.set_structure(2, 3, 0.5, -0.2, Orientation::Vertical).is_err());
        assert!(layout.set_structure(0, 3, 0.5, 0.1, Orientation::Vertical).is_err());
        assert!(layout.set_jitter_spread(-0.1).is_err());
        assert_eq!(layout, before);
    }

    #[test]
    fn test_box_narrows_over_violin() {
        let mut layout = make_layout(1, 2, 0.5, 0.0);
        assert_relative_eq!(layout.box_width(), 0.5);
        layout.compose(DisplayMode::BOX.and_violin());
        assert_relative_eq!(layout.box_width(), 0.15);
        assert_relative_eq!(layout.violin_width(), 0.75);
    }

    #[test]
    fn test_entering_box_violin_resets_inner() {
        let mut layout = make_layout(1, 2, 0.5, 0.0);
        assert_eq!(layout.violin_inner(), ViolinInner::Box);

        layout.compose(DisplayMode::VIOLIN);
        assert_eq!(layout.violin_inner(), ViolinInner::Box);

        layout.compose(DisplayMode::BOX.and_violin());
        assert_eq!(layout.violin_inner(), ViolinInner::None);

        // Re-enabling inner then staying in a both-mode must not reset again.
        layout.set_violin_inner(ViolinInner::Box);
        layout.compose(DisplayMode::BOX.and_violin().and_jitter());
        assert_eq!(layout.violin_inner(), ViolinInner::Box);
    }

    #[test]
    fn test_box_violin_to_box_violin_jitter() {
        let mut layout = make_layout(1, 2, 0.5, 0.0);
        layout.compose(DisplayMode::BOX.and_violin());

        layout.compose(DisplayMode::BOX.and_violin().and_jitter());
        let result = layout.recompute(&two_category_samples(1)).unwrap();
        let group = &result.groups[0];

        let box_layer = group.box_layer.as_ref().unwrap();
        assert_relative_eq!(box_layer.width, 0.15);
        let violin_layer = group.violin_layer.as_ref().unwrap();
        assert!(!violin_layer.show_inner);
        let jitter_layer = group.jitter_layer.as_ref().unwrap();
        assert_relative_eq!(jitter_layer.spread, DEFAULT_JITTER_SPREAD);
        assert_eq!(jitter_layer.offsets.len(), 2);
        assert_eq!(jitter_layer.offsets[0].len(), 5);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut layout = make_layout(2, 2, 0.5, 0.1);
        layout.compose(DisplayMode::BOX.and_violin().and_jitter());
        let samples = two_category_samples(2);

        let first = layout.recompute(&samples).unwrap();
        let second = layout.recompute(&samples).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_recompute_group_count_mismatch() {
        let layout = make_layout(2, 2, 0.5, 0.1);
        let err = layout.recompute(&two_category_samples(3));
        assert!(matches!(
            err,
            Err(Error::LengthMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_original_stats_reused_verbatim() {
        let layout = make_layout(1, 1, 0.5, 0.0);
        let original = BoxStats {
            q1: 10.0,
            median: 11.0,
            q3: 12.0,
            whisker_lo: 9.0,
            whisker_hi: 13.0,
            fliers: vec![20.0],
        };
        let group = GroupSamples {
            label: "g".into(),
            // Samples disagree with the stats; the originals must win.
            samples: vec![vec![1.0, 2.0, 3.0]],
            stats: Some(vec![original.clone()]),
        };
        let result = layout.recompute(&[group]).unwrap();
        assert_eq!(result.groups[0].box_layer.as_ref().unwrap().stats, vec![original]);
    }

    #[test]
    fn test_stats_recomputed_when_missing() {
        let layout = make_layout(1, 1, 0.5, 0.0);
        let group = GroupSamples {
            label: "g".into(),
            samples: vec![(1..=9).map(f64::from).collect()],
            stats: None,
        };
        let result = layout.recompute(&[group]).unwrap();
        let stats = &result.groups[0].box_layer.as_ref().unwrap().stats[0];
        assert_relative_eq!(stats.median, 5.0);
        assert_relative_eq!(stats.q1, 3.0);
    }

    #[test]
    fn test_mode_string_round_trip() {
        for mode_str in [
            "box",
            "violin",
            "jitter",
            "box+violin",
            "box+jitter",
            "violin+jitter",
            "box+violin+jitter",
        ] {
            let mode: DisplayMode = mode_str.parse().unwrap();
            assert_eq!(mode.to_string(), mode_str);
        }
        assert!("".parse::<DisplayMode>().is_err());
        assert!("box+ridge".parse::<DisplayMode>().is_err());
    }

    #[test]
    fn test_side_table_published_after_recompute() {
        let mut scene = crate::scene::Scene::new();
        let ax = scene.add_axes();

        let mut layout = make_layout(2, 2, 0.5, 0.1);
        layout.compose(DisplayMode::BOX);
        let result = layout.recompute(&two_category_samples(2)).unwrap();

        let mut table = SideTable::new();
        layout.publish(ax, &result, &mut table);

        let infos = table.get(ax).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].display_mode, DisplayMode::BOX);
        assert_eq!(infos[0].positions, result.groups[0].positions);
        assert_eq!(infos[0].tick_centers, &[0.0, 1.0]);
        assert_eq!(infos[0].box_stats.len(), 2);
    }

    #[test]
    fn test_data_extent_margins() {
        let groups = vec![GroupSamples {
            label: String::new(),
            samples: vec![vec![0.0, 100.0]],
            stats: None,
        }];
        let (lo, hi) = data_extent(&groups);
        assert_relative_eq!(lo, -5.0);
        assert_relative_eq!(hi, 105.0);

        // Degenerate range widens by 1.0.
        let flat = vec![GroupSamples {
            label: String::new(),
            samples: vec![vec![3.0, 3.0]],
            stats: None,
        }];
        assert_eq!(data_extent(&flat), (2.0, 4.0));

        assert_eq!(data_extent(&[]), (0.0, 1.0));
    }

    #[test]
    fn test_category_extent() {
        let layout = make_layout(2, 3, 0.5, 0.1);
        let (lo, hi) = layout.category_extent();
        // half = 0.75/2 + 0.15 + (1/2)(0.6) = 0.825
        assert_relative_eq!(lo, -0.825);
        assert_relative_eq!(hi, 2.825);

        let empty = make_layout(1, 0, 0.5, 0.0);
        assert_eq!(empty.category_extent(), (-0.5, 0.5));
    }
}

// ============================================================================
// Property-based tests with proptest
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The mean centered offset over all groups is exactly zero.
        #[test]
        fn prop_layout_symmetry(
            n_groups in 1usize..12,
            width in 0.01f64..2.0,
            gap in 0.0f64..1.0,
        ) {
            let mut layout = CategoricalLayout::new();
            layout.set_structure(n_groups, 1, width, gap, Orientation::Vertical)
                .unwrap();
            let mean: f64 = (0..n_groups).map(|g| layout.group_offset(g)).sum::<f64>()
                / n_groups as f64;
            prop_assert!(mean.abs() < 1e-9);
        }

        /// Recompute is idempotent for arbitrary sample sets.
        #[test]
        fn prop_recompute_idempotent(
            samples in prop::collection::vec(
                prop::collection::vec(-100.0f64..100.0, 0..20),
                1..5,
            ),
        ) {
            let mut layout = CategoricalLayout::new();
            layout.set_structure(1, samples.len(), 0.5, 0.0, Orientation::Vertical)
                .unwrap();
            layout.compose(DisplayMode::BOX.and_violin().and_jitter());
            let groups = vec![GroupSamples {
                label: "g".into(),
                samples,
                stats: None,
            }];
            let first = layout.recompute(&groups).unwrap();
            let second = layout.recompute(&groups).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
