//! Core types and utilities for cube-face scanning.
//!
//! This crate is intentionally small and purely geometric/colorimetric. It
//! does *not* depend on any concrete frame source or image codec.

mod color;
mod homography;
mod image;
mod logger;
mod quad;

pub use color::{ciede2000, rgb_to_hsv, srgb_to_lab, FaceId, Hsv, Lab, StickerColor};
pub use homography::{homography_from_4pt, Homography};
pub use image::{downscale_rgb, luma_u8, sample_bilinear_rgb, RgbFrame, RgbImageView};
pub use logger::init_with_level;
pub use quad::Quad;
