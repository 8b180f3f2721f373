//! Face detection: locate the quadrilateral bounding a 3x3 sticker grid.
//!
//! Two independent strategies are attempted in order; the first that
//! succeeds wins. The edge-grid strategy handles cubes with dark sticker
//! borders; the color-blob strategy handles borderless/stickerless cubes
//! where edge contrast is weak.

mod color_blob;
mod components;
mod detector;
mod edge_grid;
mod morphology;
mod params;

pub use components::{connected_components, Region};
pub use detector::FaceDetector;
pub use morphology::{close3x3, dilate3x3, erode3x3, open3x3};
pub use params::{ColorBlobParams, EdgeGridParams, FaceDetectorParams};
