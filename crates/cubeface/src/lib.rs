//! High-level facade crate for the `cubeface-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying scanning crates
//! - (feature-gated) end-to-end helpers that read a still `image::RgbImage`
//!   or raw RGB buffer and return the detected face and its sticker colors.
//!
//! ## Quickstart
//!
//! ```no_run
//! use cubeface::detect;
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("face.png")?.decode()?.to_rgb8();
//! let readout = detect::classify_face_default(&img);
//! println!("detected: {}", readout.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! For live camera streams, drive [`ScanPipeline`] one frame at a time
//! instead; it adds temporal voting, stability gating, validation, and the
//! capture cooldown on top of the per-frame path used here.
//!
//! ## API map
//! - `cubeface::core`: image views, quad geometry, perceptual color math.
//! - `cubeface::detector`: the two-strategy face detector.
//! - `cubeface::scan`: sampling, classification, voting, gating, validation,
//!   and the facelet-string export.
//! - `cubeface::detect` (feature `image`): end-to-end helpers from
//!   `image::RgbImage`.

pub use cubeface_core as core;
pub use cubeface_detect as detector;
pub use cubeface_scan as scan;

pub use cubeface_core::{FaceId, Quad, StickerColor};
pub use cubeface_detect::{FaceDetector, FaceDetectorParams};
pub use cubeface_scan::{
    facelet_string, AcceptedFace, CaptureOutcome, FrameReport, ScanParams, ScanPipeline,
};

#[cfg(feature = "image")]
pub mod detect;
