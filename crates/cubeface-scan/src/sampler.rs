//! Perspective-rectified sticker sampling.
//!
//! The detected quad is mapped onto a fixed canonical square and each of
//! the nine cells is measured with a luminance-trimmed mean, which rejects
//! specular highlights and shadow pixels before averaging.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use cubeface_core::{
    homography_from_4pt, sample_bilinear_rgb, srgb_to_lab, Quad, RgbImageView,
};

use crate::types::Sample;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StickerSamplerParams {
    /// Side length of the canonical sampling square, pixels.
    pub warp_size: f32,
    /// Sub-samples per cell axis (grid of `subgrid`^2 points).
    pub subgrid: usize,
    /// Half-extent of the sub-sample grid as a fraction of the cell size.
    pub subgrid_spread: f32,
    /// Fraction of brightest sub-samples discarded (specular rejection).
    pub trim_bright_frac: f32,
    /// Fraction of darkest sub-samples discarded (shadow rejection).
    pub trim_dark_frac: f32,
}

impl Default for StickerSamplerParams {
    fn default() -> Self {
        Self {
            warp_size: 300.0,
            subgrid: 5,
            subgrid_spread: 0.12,
            trim_bright_frac: 0.2,
            trim_dark_frac: 0.1,
        }
    }
}

/// Measure the nine cell colors of `quad`, row-major.
///
/// Returns `None` when the quad admits no perspective mapping (degenerate
/// geometry); callers treat that exactly like a missed detection.
pub fn sample_face(
    frame: &RgbImageView<'_>,
    quad: &Quad,
    params: &StickerSamplerParams,
) -> Option<[Sample; 9]> {
    let s = params.warp_size;
    let square = [
        Point2::new(0.0_f32, 0.0),
        Point2::new(s, 0.0),
        Point2::new(s, s),
        Point2::new(0.0_f32, s),
    ];
    let h = homography_from_4pt(&square, &quad.corners)?;

    let cell = s / 3.0;
    let spread = params.subgrid_spread * cell;
    let n = params.subgrid.max(1);

    let mut out = [Sample {
        rgb: [0; 3],
        lab: srgb_to_lab([0, 0, 0]),
    }; 9];

    let mut subs: Vec<([f32; 3], f32)> = Vec::with_capacity(n * n);
    for row in 0..3 {
        for col in 0..3 {
            let cx = (col as f32 + 0.5) * cell;
            let cy = (row as f32 + 0.5) * cell;

            subs.clear();
            for sy in 0..n {
                for sx in 0..n {
                    let fx = if n == 1 { 0.0 } else { sx as f32 / (n - 1) as f32 * 2.0 - 1.0 };
                    let fy = if n == 1 { 0.0 } else { sy as f32 / (n - 1) as f32 * 2.0 - 1.0 };
                    let p = h.apply(Point2::new(cx + fx * spread, cy + fy * spread));
                    let rgb = sample_bilinear_rgb(frame, p.x, p.y);
                    let luma = 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2];
                    subs.push((rgb, luma));
                }
            }

            let rgb = trimmed_mean_rgb(&mut subs, params.trim_bright_frac, params.trim_dark_frac);
            out[row * 3 + col] = Sample {
                rgb,
                lab: srgb_to_lab(rgb),
            };
        }
    }

    Some(out)
}

/// Sort by luminance, drop the brightest and darkest tails, average the rest.
fn trimmed_mean_rgb(subs: &mut [([f32; 3], f32)], bright_frac: f32, dark_frac: f32) -> [u8; 3] {
    subs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let n = subs.len();
    let drop_dark = (n as f32 * dark_frac) as usize;
    let drop_bright = (n as f32 * bright_frac) as usize;
    let kept = &subs[drop_dark..n - drop_bright.min(n - drop_dark - 1)];

    let mut acc = [0.0f64; 3];
    for (rgb, _) in kept {
        for c in 0..3 {
            acc[c] += rgb[c] as f64;
        }
    }
    let k = kept.len().max(1) as f64;
    [
        (acc[0] / k).round().clamp(0.0, 255.0) as u8,
        (acc[1] / k).round().clamp(0.0, 255.0) as u8,
        (acc[2] / k).round().clamp(0.0, 255.0) as u8,
    ]
}
