//! Error-bar detection from host-library containers.
//!
//! Error bars are the one pattern the scene model exposes directly: the host
//! records an errorbar container holding the data line, cap lines, and bar
//! lines. Matching containers is precise, so this detector runs before the
//! box-plot line-count heuristic: cap and data lines are internal-flagged
//! and would otherwise be miscounted as box parts.

use crate::classify::ClaimSet;
use crate::group::{Group, MetaValue, Metadata, PlotType};
use crate::scene::{AxesId, Container, PrimitiveKind, Scene};

/// Detect error bars on one axes.
pub(crate) fn detect(scene: &Scene, axes: AxesId, claims: &mut ClaimSet, out: &mut Vec<Group>) {
    for container in scene.containers_on(axes) {
        let Container::Errorbar {
            data_line,
            caps,
            bars,
            label,
            owner_bar,
        } = container
        else {
            continue;
        };

        // An error bar owned by a bar container (from `bar(yerr=...)`) is
        // managed with its bars: claim its primitives, emit no group.
        let members: Vec<_> = data_line
            .iter()
            .chain(caps.iter())
            .chain(bars.iter())
            .copied()
            .collect();
        for &id in &members {
            claims.claim(id);
        }
        if owner_bar.is_some() {
            continue;
        }

        // The container holds the user-visible label; the data line is
        // usually unlabeled.
        let mut name = label.clone();
        if name.is_empty() || name.starts_with('_') {
            name = data_line
                .and_then(|id| scene.get(id))
                .map(|p| p.label().to_string())
                .unwrap_or_default();
        }
        if name.is_empty() || name.starts_with('_') {
            name = "Error bars".into();
        }

        let mut metadata = Metadata::new();
        if let Some(prim) = data_line.and_then(|id| scene.get(id)) {
            if let PrimitiveKind::Line { points, .. } = prim.kind() {
                metadata.insert(
                    "x_data",
                    MetaValue::List(points.iter().map(|p| p.x).collect()),
                );
                metadata.insert(
                    "y_data",
                    MetaValue::List(points.iter().map(|p| p.y).collect()),
                );
            }
        }

        let mut group = Group::new(
            PlotType::Errorbar,
            axes,
            members,
            format!("Errorbar: {name}"),
        );
        group.metadata = metadata;
        out.push(group);
    }
}
