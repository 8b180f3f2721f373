use serde::{Deserialize, Serialize};

/// Settings for the edge-based grid strategy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeGridParams {
    /// Sobel gradient magnitude above which a pixel counts as an edge.
    pub edge_threshold: u16,
    /// Sticker candidate area bounds as fractions of the frame area.
    pub min_candidate_area_frac: f32,
    pub max_candidate_area_frac: f32,
    /// Minimum bounding-box fill ratio for a candidate (rejects L-shaped
    /// and ragged regions that survive the area filter).
    pub min_candidate_extent: f32,
    /// Minimum short/long bounding-box ratio for a candidate.
    pub min_candidate_aspect: f32,
    /// Candidates closer than `link factor * average candidate side` are
    /// clustered together.
    pub cluster_link_factor: f32,
    /// Minimum candidates in a cluster before a grid fit is attempted.
    pub min_cluster_candidates: usize,
    /// Minimum filled cells (of 9) to accept a grid fit.
    pub min_filled_cells: usize,
    /// Minimum short/long aspect of the cluster bounding box.
    pub min_cluster_aspect: f32,
    /// Outward corner margin in cell widths, covering sticker-to-border gaps.
    pub corner_margin_cells: f32,
    /// Fallback: minimum area fraction for a whole-face edge structure.
    pub fallback_min_area_frac: f32,
    /// Fallback: sticker candidates the structure must contain.
    pub fallback_min_contained: usize,
}

impl Default for EdgeGridParams {
    fn default() -> Self {
        Self {
            edge_threshold: 60,
            min_candidate_area_frac: 0.001,
            max_candidate_area_frac: 0.04,
            min_candidate_extent: 0.6,
            min_candidate_aspect: 0.55,
            cluster_link_factor: 3.5,
            min_cluster_candidates: 7,
            min_filled_cells: 7,
            min_cluster_aspect: 0.45,
            corner_margin_cells: 0.82,
            fallback_min_area_frac: 0.03,
            fallback_min_contained: 3,
        }
    }
}

/// Settings for the color-blob strategy (borderless cubes).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColorBlobParams {
    /// Longer frame side is downscaled to at most this many pixels.
    pub max_side: usize,
    /// Saturated-color mask thresholds (HSV, 0..=1).
    pub min_saturation: f32,
    pub min_value: f32,
    /// White mask thresholds.
    pub white_max_saturation: f32,
    pub white_min_value: f32,
    /// Blob area bounds as fractions of the downscaled frame area.
    pub min_blob_area_frac: f32,
    pub max_blob_area_frac: f32,
    /// Minimum 4*pi*A/P^2 roundness of a blob.
    pub min_circularity: f32,
    /// Minimum short/long bounding-box ratio of a blob.
    pub min_aspect: f32,
    /// Accepted angle range between the two lattice axis vectors, degrees.
    pub axis_min_angle_deg: f32,
    pub axis_max_angle_deg: f32,
    /// Minimum shorter/longer magnitude ratio between the two axes.
    pub axis_magnitude_ratio: f32,
    /// Blob-to-cell assignment tolerance in mean-axis-length units.
    pub cell_tolerance: f32,
    /// Minimum filled cells (of 9) to accept a lattice fit.
    pub min_filled_cells: usize,
    /// Fit score weights: filled-cell fraction vs. centrality in frame.
    pub fill_weight: f32,
    pub centrality_weight: f32,
    /// Outward corner margin beyond the outer cell centers, in cell widths.
    pub corner_margin_cells: f32,
    /// Axis candidates considered per center hypothesis (nearest first).
    pub max_axis_candidates: usize,
}

impl Default for ColorBlobParams {
    fn default() -> Self {
        Self {
            max_side: 320,
            min_saturation: 0.35,
            min_value: 0.25,
            white_max_saturation: 0.22,
            white_min_value: 0.6,
            min_blob_area_frac: 0.001,
            max_blob_area_frac: 0.05,
            min_circularity: 0.25,
            min_aspect: 0.35,
            axis_min_angle_deg: 60.0,
            axis_max_angle_deg: 120.0,
            axis_magnitude_ratio: 0.7,
            cell_tolerance: 0.35,
            min_filled_cells: 6,
            fill_weight: 0.8,
            centrality_weight: 0.2,
            corner_margin_cells: 0.82,
            max_axis_candidates: 8,
        }
    }
}

/// Configuration for [`crate::FaceDetector`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FaceDetectorParams {
    #[serde(default)]
    pub edge: EdgeGridParams,
    #[serde(default)]
    pub blob: ColorBlobParams,
}
