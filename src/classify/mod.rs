//! Structural classification of scene primitives into plot groups.
//!
//! The scene carries no record of chart semantics, so plot structure is
//! reverse-engineered from geometry and style patterns. Each axes is walked
//! by a fixed, ordered sequence of detectors; every detector may claim only
//! primitives no earlier detector claimed. The order is a correctness
//! invariant:
//!
//! 1. error bars (precise container matching; their cap and data lines are
//!    internal-flagged and would poison the box-plot line-count heuristic)
//! 2. box plots (line-count heuristic over internal lines)
//! 3. lines, 4. bars/histograms, 5. scatter,
//! 6. violins (filled polygons, strictly before generic fills),
//! 7. fills
//!
//! Ambiguous patterns yield zero groups rather than a best guess.

mod bars;
mod boxplot;
mod errorbar;

use std::collections::HashSet;

use tracing::debug;

use crate::group::{Group, MetaValue, Metadata, PlotType};
use crate::scene::{AxesId, PrimitiveId, PrimitiveKind, Scene};

/// Transient working set of claimed primitive ids, alive for one pass.
#[derive(Debug, Default)]
pub(crate) struct ClaimSet {
    claimed: HashSet<PrimitiveId>,
}

impl ClaimSet {
    fn new() -> Self {
        Self::default()
    }

    pub(crate) fn claim(&mut self, id: PrimitiveId) {
        self.claimed.insert(id);
    }

    pub(crate) fn is_claimed(&self, id: PrimitiveId) -> bool {
        self.claimed.contains(&id)
    }
}

/// Classify every axes of a scene into plot groups.
///
/// Deterministic and side-effect-free on the scene. After classification
/// each primitive is referenced by at most one group (claim exclusivity);
/// primitives no detector recognized stay unclassified.
#[must_use]
pub fn classify(scene: &Scene) -> Vec<Group> {
    let mut claims = ClaimSet::new();
    let mut groups = Vec::new();

    for axes in scene.axes_ids() {
        let before = groups.len();
        errorbar::detect(scene, axes, &mut claims, &mut groups);
        boxplot::detect(scene, axes, &mut claims, &mut groups);
        detect_lines(scene, axes, &mut claims, &mut groups);
        bars::detect(scene, axes, &mut claims, &mut groups);
        detect_scatter(scene, axes, &mut claims, &mut groups);
        detect_violins(scene, axes, &mut claims, &mut groups);
        detect_fill(scene, axes, &mut claims, &mut groups);
        debug!(
            axes = axes.index(),
            groups = groups.len() - before,
            "classified axes"
        );
    }

    groups
}

/// Each remaining non-internal line becomes its own group.
fn detect_lines(scene: &Scene, axes: AxesId, claims: &mut ClaimSet, out: &mut Vec<Group>) {
    for (id, prim) in scene.primitives_on(axes) {
        if claims.is_claimed(id) || prim.is_internal() {
            continue;
        }
        if !matches!(prim.kind(), PrimitiveKind::Line { .. }) {
            continue;
        }
        claims.claim(id);
        out.push(Group::new(
            PlotType::Line,
            axes,
            vec![id],
            format!("Line: {}", prim.label()),
        ));
    }
}

/// Each remaining point cloud becomes its own scatter group.
fn detect_scatter(scene: &Scene, axes: AxesId, claims: &mut ClaimSet, out: &mut Vec<Group>) {
    for (id, prim) in scene.primitives_on(axes) {
        if claims.is_claimed(id) {
            continue;
        }
        if !matches!(prim.kind(), PrimitiveKind::PointCloud { .. }) {
            continue;
        }
        claims.claim(id);
        let label = if prim.is_internal() || prim.label().is_empty() {
            "scatter"
        } else {
            prim.label()
        };
        out.push(Group::new(
            PlotType::Scatter,
            axes,
            vec![id],
            format!("Scatter: {label}"),
        ));
    }
}

/// Remaining filled polygons are violin bodies; all bodies on one axes form
/// a single group. Runs strictly before [`detect_fill`].
fn detect_violins(scene: &Scene, axes: AxesId, claims: &mut ClaimSet, out: &mut Vec<Group>) {
    let mut bodies: Vec<PrimitiveId> = Vec::new();
    let mut positions: Vec<f64> = Vec::new();

    for (id, prim) in scene.primitives_on(axes) {
        if claims.is_claimed(id) {
            continue;
        }
        let PrimitiveKind::Polygon { points, fill } = prim.kind() else {
            continue;
        };
        if fill.alpha <= 0.0 || points.is_empty() {
            continue;
        }
        // Violin center position = mean of the body's x coordinates.
        let pos = points.iter().map(|p| p.x).sum::<f64>() / points.len() as f64;
        bodies.push(id);
        positions.push(pos);
    }

    if bodies.is_empty() {
        return;
    }
    for &id in &bodies {
        claims.claim(id);
    }

    let n_violins = bodies.len();
    let mut metadata = Metadata::new();
    metadata.insert("n_violins", MetaValue::Int(n_violins as i64));
    metadata.insert("positions", MetaValue::List(positions));
    metadata.insert("orientation", MetaValue::Text("vertical".into()));

    let mut group = Group::new(
        PlotType::Violin,
        axes,
        bodies,
        format!("Violin ({n_violins} violins)"),
    );
    group.metadata = metadata;
    out.push(group);
}

/// Every remaining polygon becomes its own fill group.
fn detect_fill(scene: &Scene, axes: AxesId, claims: &mut ClaimSet, out: &mut Vec<Group>) {
    for (id, prim) in scene.primitives_on(axes) {
        if claims.is_claimed(id) {
            continue;
        }
        if !matches!(prim.kind(), PrimitiveKind::Polygon { .. }) {
            continue;
        }
        claims.claim(id);
        out.push(Group::new(PlotType::Fill, axes, vec![id], "Fill"));
    }
}
