//! Ruling-based table detection for current-account statements.
//!
//! Current-account statements draw a full grid: every cell is boxed by
//! horizontal and vertical rules. Detection therefore works on the page's
//! path objects alone; text is only consulted once the cells are known.
//!
//! ```text
//! rulings ──▶ edges ──▶ snap + join ──▶ intersections ──▶ cells ──▶ tables
//! ```

use super::layout::{group_lines, BBox, PageLayout, Word};
use crate::config::LatticeSettings;
use crate::table::{RawRow, RawTable};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HEdge {
    y: f32,
    x0: f32,
    x1: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct VEdge {
    x: f32,
    top: f32,
    bottom: f32,
}

/// Quantised point used as a hash key. Coordinates are snapped before this
/// is taken, so equal corners produce equal keys.
type PointKey = (i64, i64);

fn key(x: f32, y: f32) -> PointKey {
    ((x * 100.0).round() as i64, (y * 100.0).round() as i64)
}

/// Find every ruled table on one page, ordered top-to-bottom then
/// left-to-right.
pub fn find_tables(page: &PageLayout, settings: &LatticeSettings) -> Vec<RawTable> {
    let (mut h_edges, mut v_edges) = edges_from_rulings(&page.rulings, settings.ruling_max_thickness);
    if h_edges.is_empty() || v_edges.is_empty() {
        return Vec::new();
    }

    snap_h(&mut h_edges, settings.snap_tolerance);
    snap_v(&mut v_edges, settings.snap_tolerance);
    let h_edges = join_h(h_edges, settings.join_tolerance);
    let v_edges = join_v(v_edges, settings.join_tolerance);

    let points = intersections(&h_edges, &v_edges, settings.intersection_tolerance);
    let cells = find_cells(&points, &h_edges, &v_edges, settings.intersection_tolerance);
    trace!(
        "page {}: {} h-edges, {} v-edges, {} intersections, {} cells",
        page.page_num,
        h_edges.len(),
        v_edges.len(),
        points.len(),
        cells.len()
    );

    let words = page.words(settings.word_gap_ratio);
    group_cells(cells)
        .into_iter()
        .map(|table_cells| RawTable::new(page.page_num, build_rows(&table_cells, &words)))
        .collect()
}

// ── Edges ────────────────────────────────────────────────────────────────

fn edges_from_rulings(rulings: &[BBox], max_thickness: f32) -> (Vec<HEdge>, Vec<VEdge>) {
    let mut h = Vec::new();
    let mut v = Vec::new();

    for r in rulings {
        let thin_h = r.height() <= max_thickness;
        let thin_v = r.width() <= max_thickness;
        match (thin_h, thin_v) {
            // A dot, not a rule.
            (true, true) => {}
            (true, false) => h.push(HEdge {
                y: r.center_y(),
                x0: r.x0,
                x1: r.x1,
            }),
            (false, true) => v.push(VEdge {
                x: r.center_x(),
                top: r.top,
                bottom: r.bottom,
            }),
            (false, false) => {
                h.push(HEdge { y: r.top, x0: r.x0, x1: r.x1 });
                h.push(HEdge { y: r.bottom, x0: r.x0, x1: r.x1 });
                v.push(VEdge { x: r.x0, top: r.top, bottom: r.bottom });
                v.push(VEdge { x: r.x1, top: r.top, bottom: r.bottom });
            }
        }
    }
    (h, v)
}

/// Cluster sorted values lying within `tolerance` of their neighbour and
/// replace each with its cluster mean.
fn snap_values(values: &mut [f32], tolerance: f32) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] - values[order[end - 1]] <= tolerance {
            end += 1;
        }
        let mean = order[start..end].iter().map(|&i| values[i]).sum::<f32>() / (end - start) as f32;
        for &i in &order[start..end] {
            values[i] = mean;
        }
        start = end;
    }
}

fn snap_h(edges: &mut [HEdge], tolerance: f32) {
    let mut ys: Vec<f32> = edges.iter().map(|e| e.y).collect();
    snap_values(&mut ys, tolerance);
    for (edge, y) in edges.iter_mut().zip(ys) {
        edge.y = y;
    }
}

fn snap_v(edges: &mut [VEdge], tolerance: f32) {
    let mut xs: Vec<f32> = edges.iter().map(|e| e.x).collect();
    snap_values(&mut xs, tolerance);
    for (edge, x) in edges.iter_mut().zip(xs) {
        edge.x = x;
    }
}

fn join_h(mut edges: Vec<HEdge>, tolerance: f32) -> Vec<HEdge> {
    edges.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x0.total_cmp(&b.x0)));
    let mut joined: Vec<HEdge> = Vec::with_capacity(edges.len());
    for edge in edges {
        match joined.last_mut() {
            Some(last) if last.y == edge.y && edge.x0 <= last.x1 + tolerance => {
                last.x1 = last.x1.max(edge.x1);
            }
            _ => joined.push(edge),
        }
    }
    joined
}

fn join_v(mut edges: Vec<VEdge>, tolerance: f32) -> Vec<VEdge> {
    edges.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.top.total_cmp(&b.top)));
    let mut joined: Vec<VEdge> = Vec::with_capacity(edges.len());
    for edge in edges {
        match joined.last_mut() {
            Some(last) if last.x == edge.x && edge.top <= last.bottom + tolerance => {
                last.bottom = last.bottom.max(edge.bottom);
            }
            _ => joined.push(edge),
        }
    }
    joined
}

// ── Intersections and cells ──────────────────────────────────────────────

fn intersections(h_edges: &[HEdge], v_edges: &[VEdge], tolerance: f32) -> Vec<(f32, f32)> {
    let mut seen = HashSet::new();
    let mut points = Vec::new();
    for v in v_edges {
        for h in h_edges {
            let crosses = v.x >= h.x0 - tolerance
                && v.x <= h.x1 + tolerance
                && h.y >= v.top - tolerance
                && h.y <= v.bottom + tolerance;
            if crosses && seen.insert(key(v.x, h.y)) {
                points.push((v.x, h.y));
            }
        }
    }
    points.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.total_cmp(&b.0)));
    points
}

fn h_covers(h_edges: &[HEdge], y: f32, xa: f32, xb: f32, tolerance: f32) -> bool {
    h_edges
        .iter()
        .any(|h| (h.y - y).abs() <= tolerance && h.x0 <= xa + tolerance && h.x1 >= xb - tolerance)
}

fn v_covers(v_edges: &[VEdge], x: f32, ya: f32, yb: f32, tolerance: f32) -> bool {
    v_edges.iter().any(|v| {
        (v.x - x).abs() <= tolerance && v.top <= ya + tolerance && v.bottom >= yb - tolerance
    })
}

/// Smallest edge-bounded rectangle to the right of and below each
/// intersection.
fn find_cells(points: &[(f32, f32)], h_edges: &[HEdge], v_edges: &[VEdge], tolerance: f32) -> Vec<BBox> {
    let known: HashSet<PointKey> = points.iter().map(|&(x, y)| key(x, y)).collect();

    let mut ys_at_x: HashMap<i64, Vec<f32>> = HashMap::new();
    let mut xs_at_y: HashMap<i64, Vec<f32>> = HashMap::new();
    for &(x, y) in points {
        let (kx, ky) = key(x, y);
        ys_at_x.entry(kx).or_default().push(y);
        xs_at_y.entry(ky).or_default().push(x);
    }

    let mut cells = Vec::new();
    for &(x, y) in points {
        let (kx, ky) = key(x, y);
        let below: Vec<f32> = ys_at_x[&kx].iter().copied().filter(|&y2| y2 > y).collect();
        let right: Vec<f32> = xs_at_y[&ky].iter().copied().filter(|&x2| x2 > x).collect();

        'search: for &y2 in &below {
            if !v_covers(v_edges, x, y, y2, tolerance) {
                continue;
            }
            for &x2 in &right {
                if !h_covers(h_edges, y, x, x2, tolerance) {
                    continue;
                }
                if known.contains(&key(x2, y2))
                    && v_covers(v_edges, x2, y, y2, tolerance)
                    && h_covers(h_edges, y2, x, x2, tolerance)
                {
                    cells.push(BBox::new(x, y, x2, y2));
                    break 'search;
                }
            }
        }
    }
    cells
}

// ── Tables ───────────────────────────────────────────────────────────────

fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Split cells into tables: two cells belong together when they share a
/// corner.
fn group_cells(cells: Vec<BBox>) -> Vec<Vec<BBox>> {
    let mut parent: Vec<usize> = (0..cells.len()).collect();
    let mut owner: HashMap<PointKey, usize> = HashMap::new();

    for (i, cell) in cells.iter().enumerate() {
        let corners = [
            key(cell.x0, cell.top),
            key(cell.x1, cell.top),
            key(cell.x0, cell.bottom),
            key(cell.x1, cell.bottom),
        ];
        for corner in corners {
            match owner.get(&corner) {
                Some(&j) => {
                    let (a, b) = (find_root(&mut parent, i), find_root(&mut parent, j));
                    if a != b {
                        parent[a] = b;
                    }
                }
                None => {
                    owner.insert(corner, i);
                }
            }
        }
    }

    let mut groups: BTreeMap<usize, Vec<BBox>> = BTreeMap::new();
    for (i, cell) in cells.into_iter().enumerate() {
        let root = find_root(&mut parent, i);
        groups.entry(root).or_default().push(cell);
    }

    let mut tables: Vec<Vec<BBox>> = groups.into_values().collect();
    tables.sort_by(|a, b| {
        let (ta, xa) = table_origin(a);
        let (tb, xb) = table_origin(b);
        ta.total_cmp(&tb).then(xa.total_cmp(&xb))
    });
    tables
}

fn table_origin(cells: &[BBox]) -> (f32, f32) {
    let top = cells.iter().map(|c| c.top).fold(f32::INFINITY, f32::min);
    let x0 = cells.iter().map(|c| c.x0).fold(f32::INFINITY, f32::min);
    (top, x0)
}

fn build_rows(cells: &[BBox], words: &[Word]) -> Vec<RawRow> {
    let mut columns: Vec<f32> = cells.iter().map(|c| c.x0).collect();
    columns.sort_by(f32::total_cmp);
    columns.dedup_by(|a, b| key(*a, 0.0) == key(*b, 0.0));

    let mut rows: BTreeMap<i64, Vec<&BBox>> = BTreeMap::new();
    for cell in cells {
        rows.entry(key(0.0, cell.top).1).or_default().push(cell);
    }

    rows.into_values()
        .map(|row_cells| {
            columns
                .iter()
                .map(|&x| {
                    row_cells
                        .iter()
                        .find(|c| key(c.x0, 0.0) == key(x, 0.0))
                        .map(|c| cell_text(c, words))
                })
                .collect()
        })
        .collect()
}

fn cell_text(cell: &BBox, words: &[Word]) -> String {
    let inside: Vec<Word> = words
        .iter()
        .filter(|w| cell.contains_point(w.bbox.center_x(), w.bbox.center_y()))
        .cloned()
        .collect();
    let tolerance = inside
        .iter()
        .map(|w| w.bbox.height())
        .fold(0.0_f32, f32::max)
        / 2.0;

    group_lines(&inside, tolerance)
        .iter()
        .map(|line| {
            line.iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
