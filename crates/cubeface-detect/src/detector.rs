use log::debug;

use cubeface_core::{Quad, RgbImageView};

use crate::color_blob::detect_color_blobs;
use crate::edge_grid::detect_edge_grid;
use crate::params::FaceDetectorParams;

// Final geometric guard applied to either strategy's quad.
const MIN_SIDE_RATIO: f32 = 0.45;

/// Locates the quadrilateral bounding a 3x3 sticker grid in a frame.
///
/// Strategies run in a fixed order and the first success wins: the
/// edge-based grid search, then the color-blob lattice search for cubes
/// without sticker borders. A frame with no valid geometry yields `None`,
/// never an error.
pub struct FaceDetector {
    params: FaceDetectorParams,
}

impl FaceDetector {
    pub fn new(params: FaceDetectorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &FaceDetectorParams {
        &self.params
    }

    pub fn detect(&self, frame: &RgbImageView<'_>) -> Option<Quad> {
        if let Some(quad) = detect_edge_grid(frame, &self.params.edge) {
            if quad.is_roughly_square(MIN_SIDE_RATIO) {
                debug!("face detected via edge-grid strategy");
                return Some(quad);
            }
            debug!("edge-grid quad failed the squareness guard");
        }
        if let Some(quad) = detect_color_blobs(frame, &self.params.blob) {
            if quad.is_roughly_square(MIN_SIDE_RATIO) {
                debug!("face detected via color-blob strategy");
                return Some(quad);
            }
            debug!("color-blob quad failed the squareness guard");
        }
        None
    }
}

impl Default for FaceDetector {
    fn default() -> Self {
        Self::new(FaceDetectorParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeface_core::RgbFrame;

    #[test]
    fn empty_frame_is_rejected_without_panic() {
        let frame = RgbFrame {
            width: 0,
            height: 0,
            data: Vec::new(),
        };
        let detector = FaceDetector::default();
        assert!(detector.detect(&frame.view()).is_none());
    }

    #[test]
    fn noise_frame_yields_no_detection() {
        // Deterministic low-contrast pseudo-noise; nothing grid-like in here.
        let mut data = Vec::with_capacity(160 * 160 * 3);
        let mut state = 0x2545f49u32;
        for _ in 0..160 * 160 * 3 {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            data.push(90 + (state >> 29) as u8);
        }
        let frame = RgbFrame {
            width: 160,
            height: 160,
            data,
        };
        let detector = FaceDetector::default();
        assert!(detector.detect(&frame.view()).is_none());
    }
}
