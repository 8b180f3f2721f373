//! Edge-based grid strategy: Sobel edges, sticker-candidate regions,
//! proximity clustering, and a 3x3 row/column binning fit.

use log::debug;
use nalgebra::Point2;

use cubeface_core::{luma_u8, Quad, RgbImageView};

use crate::components::{connected_components, Region};
use crate::morphology::dilate3x3;
use crate::params::EdgeGridParams;

pub(crate) fn detect_edge_grid(frame: &RgbImageView<'_>, params: &EdgeGridParams) -> Option<Quad> {
    if frame.width < 16 || frame.height < 16 {
        return None;
    }
    let frame_area = (frame.width * frame.height) as f32;

    let gray = to_gray(frame);
    let edges = sobel_edge_mask(&gray, frame.width, frame.height, params.edge_threshold);
    let edges = dilate3x3(&edges, frame.width, frame.height);

    // Sticker interiors are the edge-enclosed non-edge regions.
    let interior: Vec<u8> = edges.iter().map(|&v| 1 - v).collect();
    let min_area = ((frame_area * params.min_candidate_area_frac) as usize).max(4);
    let max_area = (frame_area * params.max_candidate_area_frac) as usize;

    let interior_regions = connected_components(&interior, frame.width, frame.height, min_area);
    let candidates: Vec<Region> = interior_regions
        .into_iter()
        .filter(|r| {
            r.area <= max_area
                && r.extent() >= params.min_candidate_extent
                && r.aspect_ratio() >= params.min_candidate_aspect
        })
        .collect();

    debug!("edge-grid: {} sticker candidates", candidates.len());

    if let Some(quad) = best_grid_cluster(&candidates, params) {
        return Some(quad);
    }

    fallback_face_outline(&edges, frame, &candidates, params)
}

fn to_gray(frame: &RgbImageView<'_>) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.width * frame.height);
    for y in 0..frame.height {
        for x in 0..frame.width {
            out.push(luma_u8(frame.pixel(x, y)));
        }
    }
    out
}

/// Binary mask of pixels whose Sobel gradient magnitude (|gx| + |gy|)
/// exceeds `threshold`. The one-pixel border is left empty.
pub(crate) fn sobel_edge_mask(gray: &[u8], width: usize, height: usize, threshold: u16) -> Vec<u8> {
    let mut out = vec![0u8; gray.len()];
    let at = |x: usize, y: usize| gray[y * width + x] as i32;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = -at(x - 1, y - 1) + at(x + 1, y - 1) - 2 * at(x - 1, y) + 2 * at(x + 1, y)
                - at(x - 1, y + 1)
                + at(x + 1, y + 1);
            let gy = -at(x - 1, y - 1) - 2 * at(x, y - 1) - at(x + 1, y - 1)
                + at(x - 1, y + 1)
                + 2 * at(x, y + 1)
                + at(x + 1, y + 1);
            let mag = gx.unsigned_abs() + gy.unsigned_abs();
            if mag > threshold as u32 {
                out[y * width + x] = 1;
            }
        }
    }

    out
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Proximity-cluster the candidates and fit a 3x3 grid to each cluster.
/// Returns the quad of the best-filled accepted fit.
fn best_grid_cluster(candidates: &[Region], params: &EdgeGridParams) -> Option<Quad> {
    if candidates.len() < params.min_cluster_candidates {
        return None;
    }

    let avg_side =
        candidates.iter().map(Region::side).sum::<f32>() / candidates.len() as f32;
    let link_dist = params.cluster_link_factor * avg_side;

    let mut uf = UnionFind::new(candidates.len());
    for i in 0..candidates.len() {
        for j in i + 1..candidates.len() {
            let d = (candidates[i].center() - candidates[j].center()).norm();
            if d < link_dist {
                uf.union(i, j);
            }
        }
    }

    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    for i in 0..candidates.len() {
        let root = uf.find(i);
        match roots.iter().position(|&r| r == root) {
            Some(k) => clusters[k].push(i),
            None => {
                roots.push(root);
                clusters.push(vec![i]);
            }
        }
    }

    let mut best: Option<(usize, usize, Quad)> = None; // (filled, members, quad)
    for members in &clusters {
        if members.len() < params.min_cluster_candidates {
            continue;
        }
        let Some((filled, quad)) = fit_grid(candidates, members, avg_side, params) else {
            continue;
        };
        let take = match &best {
            None => true,
            Some((bf, bm, _)) => filled > *bf || (filled == *bf && members.len() > *bm),
        };
        if take {
            best = Some((filled, members.len(), quad));
        }
    }

    best.map(|(filled, members, quad)| {
        debug!("edge-grid: accepted cluster, {filled}/9 cells from {members} candidates");
        quad
    })
}

/// Bin cluster members into 3 rows x 3 columns across the span of their
/// centers; accept when enough distinct cells are covered.
fn fit_grid(
    candidates: &[Region],
    members: &[usize],
    avg_side: f32,
    params: &EdgeGridParams,
) -> Option<(usize, Quad)> {
    let centers: Vec<Point2<f32>> = members.iter().map(|&i| candidates[i].center()).collect();

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for c in &centers {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
        max_x = max_x.max(c.x);
        max_y = max_y.max(c.y);
    }

    let span_w = max_x - min_x;
    let span_h = max_y - min_y;
    if span_w < 1.0 || span_h < 1.0 {
        return None;
    }
    if (span_w.min(span_h) / span_w.max(span_h)) < params.min_cluster_aspect {
        return None;
    }

    let mut cells = [false; 9];
    for c in &centers {
        let col = (((c.x - min_x) / span_w) * 3.0).floor().min(2.0) as usize;
        let row = (((c.y - min_y) / span_h) * 3.0).floor().min(2.0) as usize;
        cells[row * 3 + col] = true;
    }
    let filled = cells.iter().filter(|&&f| f).count();
    if filled < params.min_filled_cells {
        return None;
    }

    // The span only covers the outer cell centers; expand by a fraction of
    // the sticker size to reach the face border plus the sticker-to-border
    // gap.
    let margin = params.corner_margin_cells * avg_side;

    let quad = Quad::from_unordered([
        Point2::new(min_x - margin, min_y - margin),
        Point2::new(max_x + margin, min_y - margin),
        Point2::new(max_x + margin, max_y + margin),
        Point2::new(min_x - margin, max_y + margin),
    ]);
    Some((filled, quad))
}

/// Fallback within this strategy: the connected edge structure of the whole
/// face. Its bounding box must be large, square-ish, and contain several
/// sticker candidates.
fn fallback_face_outline(
    edges: &[u8],
    frame: &RgbImageView<'_>,
    candidates: &[Region],
    params: &EdgeGridParams,
) -> Option<Quad> {
    let frame_area = (frame.width * frame.height) as f32;
    let min_bbox_area = frame_area * params.fallback_min_area_frac;

    let mut best: Option<Region> = None;
    for region in connected_components(edges, frame.width, frame.height, 16) {
        let bbox_area = (region.width() * region.height()) as f32;
        if bbox_area < min_bbox_area || region.aspect_ratio() < params.min_cluster_aspect {
            continue;
        }
        let contained = candidates
            .iter()
            .filter(|c| region.contains(c.center()))
            .count();
        if contained < params.fallback_min_contained {
            continue;
        }
        let is_larger = best
            .map(|b| bbox_area > (b.width() * b.height()) as f32)
            .unwrap_or(true);
        if is_larger {
            best = Some(region);
        }
    }

    best.map(|r| {
        debug!("edge-grid: fallback face outline accepted");
        Quad::from_unordered([
            Point2::new(r.min_x as f32, r.min_y as f32),
            Point2::new(r.max_x as f32, r.min_y as f32),
            Point2::new(r.max_x as f32, r.max_y as f32),
            Point2::new(r.min_x as f32, r.max_y as f32),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeface_core::RgbFrame;

    /// Render a flat 3x3 face: colored stickers on a dark background with
    /// dark gaps, the standard synthetic detection input.
    fn synthetic_face(size: usize, origin: usize, cell: usize, gap: usize) -> RgbFrame {
        let mut data = vec![40u8; size * size * 3];
        let colors: [[u8; 3]; 9] = [
            [200, 30, 30],
            [230, 230, 230],
            [30, 160, 60],
            [230, 200, 40],
            [200, 30, 30],
            [40, 70, 200],
            [230, 120, 30],
            [30, 160, 60],
            [230, 230, 230],
        ];
        for row in 0..3 {
            for col in 0..3 {
                let c = colors[row * 3 + col];
                let x0 = origin + col * (cell + gap);
                let y0 = origin + row * (cell + gap);
                for y in y0..y0 + cell {
                    for x in x0..x0 + cell {
                        let i = (y * size + x) * 3;
                        data[i] = c[0];
                        data[i + 1] = c[1];
                        data[i + 2] = c[2];
                    }
                }
            }
        }
        RgbFrame {
            width: size,
            height: size,
            data,
        }
    }

    #[test]
    fn detects_grid_on_synthetic_face() {
        let frame = synthetic_face(240, 40, 48, 8);
        let quad = detect_edge_grid(&frame.view(), &EdgeGridParams::default())
            .expect("grid should be found");

        // Face occupies 40..200 in both axes; the quad must be square-ish,
        // centered on the face, and cover most of it.
        assert!(quad.is_roughly_square(0.6));
        let c = quad.centroid();
        assert!((c.x - 120.0).abs() < 20.0, "centroid x = {}", c.x);
        assert!((c.y - 120.0).abs() < 20.0, "centroid y = {}", c.y);
        assert!(quad.area() > 120.0 * 120.0);
    }

    #[test]
    fn returned_corners_are_canonical_and_non_degenerate() {
        let frame = synthetic_face(240, 40, 48, 8);
        let quad = detect_edge_grid(&frame.view(), &EdgeGridParams::default()).unwrap();
        assert!(quad.area() > 0.0);
        let [tl, tr, br, bl] = quad.corners;
        assert!(tl.x < tr.x && tl.y < bl.y);
        assert!(br.x > bl.x && br.y > tr.y);
    }

    #[test]
    fn uniform_frame_yields_no_detection() {
        let frame = RgbFrame {
            width: 120,
            height: 120,
            data: vec![90u8; 120 * 120 * 3],
        };
        assert!(detect_edge_grid(&frame.view(), &EdgeGridParams::default()).is_none());
    }

    #[test]
    fn sobel_marks_a_vertical_step() {
        let mut gray = vec![0u8; 9 * 9];
        for y in 0..9 {
            for x in 5..9 {
                gray[y * 9 + x] = 255;
            }
        }
        let mask = sobel_edge_mask(&gray, 9, 9, 60);
        assert_eq!(mask[4 * 9 + 4], 1);
        assert_eq!(mask[4 * 9 + 1], 0);
    }
}
