//! Color-blob grid strategy for borderless/edgeless cubes.
//!
//! Works on a downscaled copy: segment saturated-color and white masks in
//! HSV, clean them up morphologically, extract round blobs, then fit a 3x3
//! lattice by hypothesizing a center blob and a pair of near-perpendicular
//! axis vectors.

use log::debug;
use nalgebra::{Point2, Vector2};

use cubeface_core::{downscale_rgb, rgb_to_hsv, Quad, RgbImageView};

use crate::components::{connected_components, Region};
use crate::morphology::{close3x3, open3x3};
use crate::params::ColorBlobParams;

pub(crate) fn detect_color_blobs(
    frame: &RgbImageView<'_>,
    params: &ColorBlobParams,
) -> Option<Quad> {
    if frame.width < 16 || frame.height < 16 {
        return None;
    }

    let (small, scale) = downscale_rgb(frame, params.max_side);
    let view = small.view();

    let mask = sticker_mask(&view, params);
    let mask = close3x3(&mask, view.width, view.height);
    let mask = open3x3(&mask, view.width, view.height);

    let area = (view.width * view.height) as f32;
    let min_area = ((area * params.min_blob_area_frac) as usize).max(4);
    let max_area = (area * params.max_blob_area_frac) as usize;

    let blobs: Vec<Region> = connected_components(&mask, view.width, view.height, min_area)
        .into_iter()
        .filter(|r| {
            r.area <= max_area
                && r.circularity() >= params.min_circularity
                && r.aspect_ratio() >= params.min_aspect
        })
        .collect();

    debug!("color-blob: {} blobs after filtering", blobs.len());
    if blobs.len() < params.min_filled_cells {
        return None;
    }

    let centers: Vec<Point2<f32>> = blobs.iter().map(Region::center).collect();
    let mean_side = blobs.iter().map(Region::side).sum::<f32>() / blobs.len() as f32;
    let fit = best_lattice_fit(&centers, view.width, view.height, params)?;

    debug!(
        "color-blob: accepted lattice, {}/9 cells, score {:.3}",
        fit.filled, fit.score
    );
    Some(fit.quad(mean_side, params).scale(scale))
}

/// Union of the saturated-color and white masks.
fn sticker_mask(view: &RgbImageView<'_>, params: &ColorBlobParams) -> Vec<u8> {
    let mut mask = vec![0u8; view.width * view.height];
    for y in 0..view.height {
        for x in 0..view.width {
            let hsv = rgb_to_hsv(view.pixel(x, y));
            let saturated = hsv.s >= params.min_saturation && hsv.v >= params.min_value;
            let white = hsv.s <= params.white_max_saturation && hsv.v >= params.white_min_value;
            if saturated || white {
                mask[y * view.width + x] = 1;
            }
        }
    }
    mask
}

struct LatticeFit {
    center: Point2<f32>,
    axis_u: Vector2<f32>,
    axis_v: Vector2<f32>,
    filled: usize,
    score: f32,
}

impl LatticeFit {
    /// Corners expanded outward beyond the outer cell centers by a fraction
    /// of the blob size, reaching the face border plus sticker-to-border gap.
    fn quad(&self, mean_blob_side: f32, params: &ColorBlobParams) -> Quad {
        let mean_axis = (self.axis_u.norm() + self.axis_v.norm()) / 2.0;
        let r = 1.0 + params.corner_margin_cells * mean_blob_side / mean_axis.max(1.0);
        let c = self.center;
        Quad::from_unordered([
            c + (self.axis_u + self.axis_v) * r,
            c + (self.axis_u - self.axis_v) * r,
            c - (self.axis_u + self.axis_v) * r,
            c - (self.axis_u - self.axis_v) * r,
        ])
    }
}

/// Try every blob as the hypothetical grid center with pairs of nearby
/// blobs defining the lattice axes; keep the best-scoring assignment.
fn best_lattice_fit(
    centers: &[Point2<f32>],
    width: usize,
    height: usize,
    params: &ColorBlobParams,
) -> Option<LatticeFit> {
    let frame_center = Point2::new(width as f32 / 2.0, height as f32 / 2.0);
    let half_diag = (width as f32 * width as f32 + height as f32 * height as f32).sqrt() / 2.0;

    let cos_max = params.axis_min_angle_deg.to_radians().cos();
    let cos_min = params.axis_max_angle_deg.to_radians().cos();

    let mut best: Option<LatticeFit> = None;

    for (ci, &c) in centers.iter().enumerate() {
        // Nearest other blobs are the axis candidates.
        let mut neighbors: Vec<usize> = (0..centers.len()).filter(|&i| i != ci).collect();
        neighbors.sort_by(|&a, &b| {
            let da = (centers[a] - c).norm_squared();
            let db = (centers[b] - c).norm_squared();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(params.max_axis_candidates);

        for ai in 0..neighbors.len() {
            for bi in ai + 1..neighbors.len() {
                let u = centers[neighbors[ai]] - c;
                let v = centers[neighbors[bi]] - c;
                let (nu, nv) = (u.norm(), v.norm());
                if nu < 1.0 || nv < 1.0 {
                    continue;
                }
                if nu.min(nv) / nu.max(nv) < params.axis_magnitude_ratio {
                    continue;
                }
                let cos = u.dot(&v) / (nu * nv);
                if cos > cos_max || cos < cos_min {
                    continue;
                }

                let tol = params.cell_tolerance * (nu + nv) / 2.0;
                let filled = count_filled_cells(centers, c, u, v, tol);
                if filled < params.min_filled_cells {
                    continue;
                }

                let centrality = 1.0 - ((c - frame_center).norm() / half_diag).min(1.0);
                let score = params.fill_weight * filled as f32 / 9.0
                    + params.centrality_weight * centrality;

                if best.as_ref().map(|b| score > b.score).unwrap_or(true) {
                    best = Some(LatticeFit {
                        center: c,
                        axis_u: u,
                        axis_v: v,
                        filled,
                        score,
                    });
                }
            }
        }
    }

    best
}

/// Assign every blob to its nearest of the 9 lattice cells; a cell counts
/// as filled when some blob lands within `tol` of it.
fn count_filled_cells(
    centers: &[Point2<f32>],
    c: Point2<f32>,
    u: Vector2<f32>,
    v: Vector2<f32>,
    tol: f32,
) -> usize {
    let mut cells = [false; 9];
    for &p in centers {
        let mut best_cell = 0usize;
        let mut best_dist = f32::INFINITY;
        for i in -1i32..=1 {
            for j in -1i32..=1 {
                let cell = c + u * i as f32 + v * j as f32;
                let d = (p - cell).norm();
                if d < best_dist {
                    best_dist = d;
                    best_cell = ((i + 1) * 3 + (j + 1)) as usize;
                }
            }
        }
        if best_dist <= tol {
            cells[best_cell] = true;
        }
    }
    cells.iter().filter(|&&f| f).count()
}
