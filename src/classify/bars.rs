//! Bar, grouped-bar, and histogram detection from rectangle containers.
//!
//! Histograms and bar charts leave the same primitives behind (rectangle
//! containers) and are told apart purely by geometry: a histogram's bins
//! are contiguous (gaps under 10% of a bin width) and near-uniform in width
//! (rounding to 6 decimals yields at most 2 distinct values). Everything
//! else is a bar series, grouped when several bar containers share the axes.

use crate::classify::ClaimSet;
use crate::geometry::Rect;
use crate::group::{Group, MetaValue, Metadata, PlotType};
use crate::scene::{AxesId, Container, PrimitiveId, PrimitiveKind, Scene};

/// Detect histograms and bar series on one axes.
pub(crate) fn detect(scene: &Scene, axes: AxesId, claims: &mut ClaimSet, out: &mut Vec<Group>) {
    struct BarSeries {
        ids: Vec<PrimitiveId>,
        rects: Vec<Rect>,
        label: String,
    }

    let mut histograms: Vec<BarSeries> = Vec::new();
    let mut plain: Vec<BarSeries> = Vec::new();

    for container in scene.containers_on(axes) {
        let Container::Bar { rects, label } = container else {
            continue;
        };

        let mut series = BarSeries {
            ids: Vec::new(),
            rects: Vec::new(),
            label: label.clone(),
        };
        for &id in rects {
            if claims.is_claimed(id) {
                continue;
            }
            let Some(prim) = scene.get(id) else { continue };
            let Some(rect) = prim.rect() else { continue };
            if series.label.is_empty() || series.label.starts_with('_') {
                if !prim.label().is_empty() && !prim.label().starts_with('_') {
                    series.label = prim.label().to_string();
                }
            }
            series.ids.push(id);
            series.rects.push(rect);
        }
        if series.ids.is_empty() {
            continue;
        }

        if is_histogram(&series.rects) {
            histograms.push(series);
        } else {
            plain.push(series);
        }
    }

    for series in histograms {
        for &id in &series.ids {
            claims.claim(id);
        }
        let mut order: Vec<usize> = (0..series.rects.len()).collect();
        order.sort_by(|&a, &b| {
            series.rects[a]
                .x
                .partial_cmp(&series.rects[b].x)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let sorted: Vec<Rect> = order.iter().map(|&i| series.rects[i]).collect();
        let members: Vec<PrimitiveId> = order.iter().map(|&i| series.ids[i]).collect();

        let mut bin_edges: Vec<f64> = sorted.iter().map(|r| r.x).collect();
        bin_edges.push(sorted[sorted.len() - 1].right());
        let bin_heights: Vec<f64> = sorted.iter().map(|r| r.height).collect();

        // Vertical histograms vary in height; horizontal ones in width.
        let heights: Vec<f64> = sorted.iter().map(|r| r.height).collect();
        let widths: Vec<f64> = sorted.iter().map(|r| r.width).collect();
        let orientation = if distinct_rounded(&heights) <= 2 && distinct_rounded(&widths) > 2 {
            "horizontal"
        } else {
            "vertical"
        };

        let label = if series.label.is_empty() || series.label.starts_with('_') {
            "Histogram".to_string()
        } else {
            series.label
        };

        let mut metadata = Metadata::new();
        metadata.insert("bin_edges", MetaValue::List(bin_edges));
        metadata.insert("bin_heights", MetaValue::List(bin_heights));
        metadata.insert("orientation", MetaValue::Text(orientation.into()));

        let mut group = Group::new(
            PlotType::Histogram,
            axes,
            members,
            format!("Histogram: {label}"),
        );
        group.metadata = metadata;
        out.push(group);
    }

    let is_grouped = plain.len() > 1;
    for series in plain {
        for &id in &series.ids {
            claims.claim(id);
        }

        let heights: Vec<f64> = series.rects.iter().map(|r| r.height).collect();
        let widths: Vec<f64> = series.rects.iter().map(|r| r.width).collect();
        // Uniform heights with varying widths mean the bars grow sideways.
        let horizontal = distinct_rounded(&heights) <= 1 && distinct_rounded(&widths) > 1;

        let mut order: Vec<usize> = (0..series.rects.len()).collect();
        let key = |r: &Rect| if horizontal { r.y } else { r.x };
        order.sort_by(|&a, &b| {
            key(&series.rects[a])
                .partial_cmp(&key(&series.rects[b]))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let sorted: Vec<Rect> = order.iter().map(|&i| series.rects[i]).collect();
        let members: Vec<PrimitiveId> = order.iter().map(|&i| series.ids[i]).collect();

        let (positions, values, bottoms, bar_width, orientation) = if horizontal {
            (
                sorted.iter().map(|r| r.y + r.height / 2.0).collect(),
                sorted.iter().map(|r| r.width).collect(),
                sorted.iter().map(|r| r.x).collect(),
                sorted[0].height,
                "horizontal",
            )
        } else {
            (
                sorted.iter().map(|r| r.x + r.width / 2.0).collect::<Vec<f64>>(),
                sorted.iter().map(|r| r.height).collect::<Vec<f64>>(),
                sorted.iter().map(|r| r.y).collect::<Vec<f64>>(),
                sorted[0].width,
                "vertical",
            )
        };

        let label = if series.label.is_empty() || series.label.starts_with('_') {
            "bars".to_string()
        } else {
            series.label
        };

        let mut metadata = Metadata::new();
        metadata.insert("positions", MetaValue::List(positions));
        metadata.insert("values", MetaValue::List(values));
        metadata.insert("bottoms", MetaValue::List(bottoms));
        metadata.insert("bar_width", MetaValue::F64(bar_width));
        metadata.insert("orientation", MetaValue::Text(orientation.into()));

        let plot_type = if is_grouped {
            PlotType::GroupedBar
        } else {
            PlotType::Bar
        };
        let mut group = Group::new(plot_type, axes, members, format!("Bar: {label}"));
        group.metadata = metadata;
        out.push(group);
    }
}

/// Contiguous, near-uniform-width rectangles are histogram bins.
fn is_histogram(rects: &[Rect]) -> bool {
    if rects.len() < 5 {
        return false;
    }
    let mut sorted: Vec<Rect> = rects.to_vec();
    sorted.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let widths: Vec<f64> = sorted.iter().map(|r| r.width).collect();
    if distinct_rounded(&widths) > 2 {
        return false;
    }
    sorted
        .windows(2)
        .all(|w| (w[1].x - w[0].right()).abs() < widths[0] * 0.1)
}

/// Number of distinct values after rounding to 6 decimals.
fn distinct_rounded(values: &[f64]) -> usize {
    let mut keys: Vec<i64> = values
        .iter()
        .map(|v| (v * 1e6).round() as i64)
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys.len()
}
