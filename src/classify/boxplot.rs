//! Box plot detection from internal line primitives.
//!
//! A box plot drawn in line mode leaves no container behind, only a run of
//! internal-flagged lines: the closed box outline, the median, two whiskers,
//! two caps, and optionally a flier marker line. Detection counts the
//! internal lines on an axes and accepts only clean multiples of 7
//! (with flier line) or 6 (without); anything else yields no groups.
//!
//! Per-box statistics are recovered from the chunk geometry so later layout
//! recomputation can reuse them verbatim instead of re-deriving quartiles
//! from resampled data.

use tracing::debug;

use crate::classify::ClaimSet;
use crate::geometry::Point;
use crate::group::{Group, MetaValue, Metadata, PlotType};
use crate::scene::{AxesId, Primitive, PrimitiveId, PrimitiveKind, Scene};
use crate::stats::BoxStats;

const FLAT_EPS: f64 = 1e-10;

/// Detect box plots on one axes.
pub(crate) fn detect(scene: &Scene, axes: AxesId, claims: &mut ClaimSet, out: &mut Vec<Group>) {
    let internal_lines: Vec<(PrimitiveId, &Primitive)> = scene
        .primitives_on(axes)
        .filter(|(id, prim)| {
            !claims.is_claimed(*id)
                && prim.is_internal()
                && matches!(prim.kind(), PrimitiveKind::Line { .. })
        })
        .collect();

    let n = internal_lines.len();
    if n < 6 {
        return;
    }

    let per_box = if n % 7 == 0 {
        7
    } else if n % 6 == 0 {
        6
    } else {
        // Non-canonical count: insufficient evidence, never guess.
        debug!(axes = axes.index(), lines = n, "internal line count not a box plot pattern");
        return;
    };
    let n_boxes = n / per_box;

    let horizontal = detect_orientation(&internal_lines);

    let mut stats: Vec<BoxStats> = Vec::with_capacity(n_boxes);
    let mut positions: Vec<f64> = Vec::with_capacity(n_boxes);
    for i in 0..n_boxes {
        let chunk = &internal_lines[i * per_box..(i + 1) * per_box];
        let (s, pos) = extract_chunk(chunk, horizontal, (i + 1) as f64);
        stats.push(s);
        positions.push(pos);
    }

    let orientation = if horizontal { "horizontal" } else { "vertical" };

    // Interleaved position ranges mean the boxes came from separate grouped
    // series; split into one group per block of consecutive boxes.
    let blocks = split_blocks(&positions, n_boxes);
    for block in blocks {
        let box_range = block.clone();
        let line_range = block.start * per_box..block.end * per_box;
        let block_n = box_range.len();

        for (id, _) in &internal_lines[line_range] {
            claims.claim(*id);
        }

        let mut metadata = Metadata::new();
        metadata.insert("n_boxes", MetaValue::Int(block_n as i64));
        metadata.insert("box_stats", MetaValue::Stats(stats[box_range.clone()].to_vec()));
        metadata.insert(
            "positions",
            MetaValue::List(positions[box_range.clone()].to_vec()),
        );
        metadata.insert("orientation", MetaValue::Text(orientation.into()));

        let members = internal_lines[block.start * per_box..block.end * per_box]
            .iter()
            .map(|(id, _)| *id)
            .collect();
        let mut group = Group::new(
            PlotType::Boxplot,
            axes,
            members,
            format!("Box plot ({block_n} boxes)"),
        );
        group.metadata = metadata;
        out.push(group);
    }
}

/// A box outline wider than twice its height is a horizontal box plot.
fn detect_orientation(lines: &[(PrimitiveId, &Primitive)]) -> bool {
    for (_, prim) in lines {
        let Some(points) = prim.points() else { continue };
        if points.len() >= 4 {
            let (x_min, x_max) = min_max(points.iter().map(|p| p.x));
            let (y_min, y_max) = min_max(points.iter().map(|p| p.y));
            return (x_max - x_min).abs() > (y_max - y_min).abs() * 2.0;
        }
    }
    false
}

/// Recover statistics and position from one box's worth of lines.
///
/// The chunk is classified by geometry rather than creation order: the
/// ≥4-point closed polyline is the box outline, flat 2-point lines are the
/// median or caps, steep 2-point lines are whiskers, marker-bearing lines
/// are fliers. Horizontal plots are read with x and y swapped so the
/// vertical logic applies unchanged.
fn extract_chunk(
    chunk: &[(PrimitiveId, &Primitive)],
    horizontal: bool,
    fallback_pos: f64,
) -> (BoxStats, f64) {
    let line_points = |prim: &Primitive| -> Vec<Point> {
        prim.points()
            .unwrap_or(&[])
            .iter()
            .map(|p| if horizontal { p.swapped() } else { *p })
            .collect()
    };

    let mut box_line: Option<Vec<Point>> = None;
    let mut flats: Vec<Vec<Point>> = Vec::new();
    let mut steeps: Vec<Vec<Point>> = Vec::new();
    let mut flier_values: Vec<f64> = Vec::new();

    for (_, prim) in chunk {
        let points = line_points(prim);
        if let PrimitiveKind::Line { marker, .. } = prim.kind() {
            if marker.shape.is_visible() {
                flier_values.extend(points.iter().map(|p| p.y));
                continue;
            }
        }
        if points.len() < 2 {
            continue;
        }
        if points.len() >= 4 {
            if box_line.is_none() {
                box_line = Some(points);
            } else {
                flats.push(points);
            }
            continue;
        }
        let dx = (points[points.len() - 1].x - points[0].x).abs();
        let dy = (points[points.len() - 1].y - points[0].y).abs();
        if dy < FLAT_EPS && dx > FLAT_EPS {
            flats.push(points);
        } else if dx < FLAT_EPS && dy > FLAT_EPS {
            steeps.push(points);
        } else {
            flats.push(points);
        }
    }

    let (q1, q3, position) = match &box_line {
        Some(points) => {
            let (x_min, x_max) = min_max(points.iter().map(|p| p.x));
            let (y_min, y_max) = min_max(points.iter().map(|p| p.y));
            (y_min, y_max, (x_min + x_max) / 2.0)
        }
        None if !flats.is_empty() => {
            let ys: Vec<f64> = flats.iter().map(|pts| pts[0].y).collect();
            let (q1, q3) = min_max(ys.iter().copied());
            let xs = &flats[0];
            let position = xs.iter().map(|p| p.x).sum::<f64>() / xs.len() as f64;
            (q1, q3, position)
        }
        None => (0.0, 1.0, fallback_pos),
    };

    // Median: the flat line inside the box.
    let mut median = (q1 + q3) / 2.0;
    for pts in &flats {
        let y = pts[0].y;
        if y >= q1 && y <= q3 {
            median = y;
            break;
        }
    }

    // Whiskers extend below q1 and above q3.
    let mut whisker_lo = q1;
    let mut whisker_hi = q3;
    for pts in &steeps {
        let (v_min, v_max) = min_max(pts.iter().map(|p| p.y));
        if v_max <= q1 + 0.01 {
            whisker_lo = whisker_lo.min(v_min);
        } else if v_min >= q3 - 0.01 {
            whisker_hi = whisker_hi.max(v_max);
        } else {
            whisker_lo = whisker_lo.min(v_min);
            whisker_hi = whisker_hi.max(v_max);
        }
    }

    // Caps refine the whisker ends.
    for pts in &flats {
        let y = pts[0].y;
        if y < q1 {
            whisker_lo = whisker_lo.min(y);
        } else if y > q3 {
            whisker_hi = whisker_hi.max(y);
        }
    }

    (
        BoxStats {
            q1,
            median,
            q3,
            whisker_lo,
            whisker_hi,
            fliers: flier_values,
        },
        position,
    )
}

/// Split `n_boxes` consecutive boxes into blocks of separate series.
///
/// Tries every block count dividing `n_boxes`; a split is accepted when each
/// block's positions are regularly spaced and the blocks' position ranges
/// overlap (interleaved series). Returns a single full-range block when no
/// split is justified.
fn split_blocks(positions: &[f64], n_boxes: usize) -> Vec<std::ops::Range<usize>> {
    if n_boxes > 1 {
        for n_grp in 2..=n_boxes {
            if n_boxes % n_grp != 0 {
                continue;
            }
            let per_block = n_boxes / n_grp;
            let blocks: Vec<&[f64]> = (0..n_grp)
                .map(|g| &positions[g * per_block..(g + 1) * per_block])
                .collect();

            let regular = blocks.iter().all(|block| {
                let mut sorted = block.to_vec();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let diffs: Vec<f64> = sorted.windows(2).map(|w| w[1] - w[0]).collect();
                diffs.len() <= 1 || std_dev(&diffs) <= mean(&diffs) * 0.5
            });
            if !regular {
                continue;
            }

            let ranges: Vec<(f64, f64)> = blocks
                .iter()
                .map(|block| min_max(block.iter().copied()))
                .collect();
            let overlapping = ranges.iter().enumerate().any(|(a, ra)| {
                ranges[a + 1..]
                    .iter()
                    .any(|rb| ra.0 < rb.1 && rb.0 < ra.1)
            });
            if overlapping {
                return (0..n_grp)
                    .map(|g| g * per_block..(g + 1) * per_block)
                    .collect();
            }
        }
    }
    vec![0..n_boxes]
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::style::{MarkerShape, MarkerStyle, StrokeStyle};

    fn add_line(scene: &mut Scene, axes: AxesId, points: Vec<Point>, marker: MarkerShape) {
        let kind = PrimitiveKind::Line {
            points,
            stroke: StrokeStyle::default(),
            marker: MarkerStyle {
                shape: marker,
                ..MarkerStyle::default()
            },
        };
        scene.add_primitive(axes, kind, "_boxpart", true).unwrap();
    }

    /// One box at `center` spanning q1..q3 = 2..4, median 3, whiskers 1..5.
    fn add_box(scene: &mut Scene, axes: AxesId, center: f64, with_flier: bool) {
        let hw = 0.2;
        // Closed box outline (5 points).
        add_line(
            scene,
            axes,
            vec![
                Point::new(center - hw, 2.0),
                Point::new(center + hw, 2.0),
                Point::new(center + hw, 4.0),
                Point::new(center - hw, 4.0),
                Point::new(center - hw, 2.0),
            ],
            MarkerShape::None,
        );
        // Median.
        add_line(
            scene,
            axes,
            vec![Point::new(center - hw, 3.0), Point::new(center + hw, 3.0)],
            MarkerShape::None,
        );
        // Whiskers.
        add_line(
            scene,
            axes,
            vec![Point::new(center, 2.0), Point::new(center, 1.0)],
            MarkerShape::None,
        );
        add_line(
            scene,
            axes,
            vec![Point::new(center, 4.0), Point::new(center, 5.0)],
            MarkerShape::None,
        );
        // Caps.
        add_line(
            scene,
            axes,
            vec![Point::new(center - 0.1, 1.0), Point::new(center + 0.1, 1.0)],
            MarkerShape::None,
        );
        add_line(
            scene,
            axes,
            vec![Point::new(center - 0.1, 5.0), Point::new(center + 0.1, 5.0)],
            MarkerShape::None,
        );
        if with_flier {
            add_line(scene, axes, vec![Point::new(center, 7.5)], MarkerShape::Circle);
        }
    }

    #[test]
    fn test_three_boxes_of_seven_lines() {
        let mut scene = Scene::new();
        let ax = scene.add_axes();
        for center in [1.0, 2.0, 3.0] {
            add_box(&mut scene, ax, center, true);
        }
        assert_eq!(scene.len(), 21);

        let groups = classify(&scene);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].plot_type, PlotType::Boxplot);
        assert_eq!(groups[0].metadata.get_int("n_boxes"), Some(3));
        // Detector priority: no LINE group may claim these primitives.
        assert!(groups.iter().all(|g| g.plot_type != PlotType::Line));
    }

    #[test]
    fn test_extracted_stats() {
        let mut scene = Scene::new();
        let ax = scene.add_axes();
        add_box(&mut scene, ax, 1.0, true);

        let groups = classify(&scene);
        let stats = groups[0].metadata.get_stats("box_stats").unwrap();
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert!((s.q1 - 2.0).abs() < 1e-9);
        assert!((s.q3 - 4.0).abs() < 1e-9);
        assert!((s.median - 3.0).abs() < 1e-9);
        assert!((s.whisker_lo - 1.0).abs() < 1e-9);
        assert!((s.whisker_hi - 5.0).abs() < 1e-9);
        assert_eq!(s.fliers, vec![7.5]);
        assert_eq!(groups[0].metadata.get_list("positions"), Some(&[1.0][..]));
    }

    #[test]
    fn test_non_canonical_count_yields_nothing() {
        let mut scene = Scene::new();
        let ax = scene.add_axes();
        add_box(&mut scene, ax, 1.0, true);
        // One extra internal line breaks the multiple-of-7-or-6 pattern.
        add_line(
            &mut scene,
            ax,
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            MarkerShape::None,
        );

        let groups = classify(&scene);
        assert!(groups.iter().all(|g| g.plot_type != PlotType::Boxplot));
    }

    #[test]
    fn test_horizontal_orientation() {
        let mut scene = Scene::new();
        let ax = scene.add_axes();
        // Horizontal box: outline wide in x, thin in y; stats along x.
        add_line(
            &mut scene,
            ax,
            vec![
                Point::new(2.0, 0.8),
                Point::new(4.0, 0.8),
                Point::new(4.0, 1.2),
                Point::new(2.0, 1.2),
                Point::new(2.0, 0.8),
            ],
            MarkerShape::None,
        );
        add_line(
            &mut scene,
            ax,
            vec![Point::new(3.0, 0.8), Point::new(3.0, 1.2)],
            MarkerShape::None,
        );
        add_line(
            &mut scene,
            ax,
            vec![Point::new(2.0, 1.0), Point::new(1.0, 1.0)],
            MarkerShape::None,
        );
        add_line(
            &mut scene,
            ax,
            vec![Point::new(4.0, 1.0), Point::new(5.0, 1.0)],
            MarkerShape::None,
        );
        add_line(
            &mut scene,
            ax,
            vec![Point::new(1.0, 0.9), Point::new(1.0, 1.1)],
            MarkerShape::None,
        );
        add_line(
            &mut scene,
            ax,
            vec![Point::new(5.0, 0.9), Point::new(5.0, 1.1)],
            MarkerShape::None,
        );

        let groups = classify(&scene);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].metadata.get_text("orientation"), Some("horizontal"));
        let stats = groups[0].metadata.get_stats("box_stats").unwrap();
        assert!((stats[0].q1 - 2.0).abs() < 1e-9);
        assert!((stats[0].q3 - 4.0).abs() < 1e-9);
        assert!((stats[0].whisker_lo - 1.0).abs() < 1e-9);
        assert!((stats[0].whisker_hi - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_interleaved_series_split() {
        let mut scene = Scene::new();
        let ax = scene.add_axes();
        // Series A at 0.8, 1.8, 2.8; series B at 1.2, 2.2, 3.2: the
        // blocks' position ranges overlap, so they must split.
        for center in [0.8, 1.8, 2.8] {
            add_box(&mut scene, ax, center, false);
        }
        for center in [1.2, 2.2, 3.2] {
            add_box(&mut scene, ax, center, false);
        }

        let groups = classify(&scene);
        let boxes: Vec<_> = groups
            .iter()
            .filter(|g| g.plot_type == PlotType::Boxplot)
            .collect();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].metadata.get_int("n_boxes"), Some(3));
        assert_eq!(boxes[0].metadata.get_list("positions"), Some(&[0.8, 1.8, 2.8][..]));
        assert_eq!(boxes[1].metadata.get_list("positions"), Some(&[1.2, 2.2, 3.2][..]));
    }

    #[test]
    fn test_disjoint_series_not_split() {
        let mut scene = Scene::new();
        let ax = scene.add_axes();
        // Six boxes in one regular row: ranges of any block split would not
        // overlap, so this stays one group.
        for center in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0] {
            add_box(&mut scene, ax, center, false);
        }

        let groups = classify(&scene);
        let boxes: Vec<_> = groups
            .iter()
            .filter(|g| g.plot_type == PlotType::Boxplot)
            .collect();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].metadata.get_int("n_boxes"), Some(6));
    }
}
