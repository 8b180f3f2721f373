//! End-to-end helpers for still images.
//!
//! These run the per-frame path only (detect -> sample -> classify); there
//! is no temporal voting or validation here. Use [`crate::ScanPipeline`]
//! for live streams.

use crate::{core, detector, scan};

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid RGB image buffer length (expected {expected} bytes, got {got})")]
    InvalidRgbBuffer { expected: usize, got: usize },

    #[error("invalid RGB image dimensions (width={width}, height={height})")]
    InvalidRgbDimensions { width: u32, height: u32 },
}

/// One still image's detection and classification result.
#[derive(Clone, Copy, Debug)]
pub struct FaceReadout {
    pub quad: core::Quad,
    pub colors: [core::StickerColor; 9],
    pub samples: [scan::Sample; 9],
}

/// Convert an `image::RgbImage` into the lightweight `cubeface-core` view type.
pub fn rgb_view(img: &::image::RgbImage) -> core::RgbImageView<'_> {
    core::RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Detect the face quad in a still image.
pub fn detect_face(
    img: &::image::RgbImage,
    params: &detector::FaceDetectorParams,
) -> Option<core::Quad> {
    let det = detector::FaceDetector::new(params.clone());
    det.detect(&rgb_view(img))
}

/// Convenience overload using default detector parameters.
pub fn detect_face_default(img: &::image::RgbImage) -> Option<core::Quad> {
    detect_face(img, &detector::FaceDetectorParams::default())
}

/// Detect, sample, and classify the face in a still image.
pub fn classify_face(
    img: &::image::RgbImage,
    detector_params: &detector::FaceDetectorParams,
    sampler_params: &scan::StickerSamplerParams,
    classifier_params: &scan::ColorClassifierParams,
) -> Option<FaceReadout> {
    let view = rgb_view(img);
    let quad = detector::FaceDetector::new(detector_params.clone()).detect(&view)?;
    let samples = scan::sample_face(&view, &quad, sampler_params)?;
    let colors = scan::ColorClassifier::new(*classifier_params).classify(&samples);
    Some(FaceReadout {
        quad,
        colors,
        samples,
    })
}

/// Convenience overload using default parameters throughout.
pub fn classify_face_default(img: &::image::RgbImage) -> Option<FaceReadout> {
    classify_face(
        img,
        &detector::FaceDetectorParams::default(),
        &scan::StickerSamplerParams::default(),
        &scan::ColorClassifierParams::default(),
    )
}

/// Build an `image::RgbImage` from a raw interleaved RGB buffer.
pub fn rgb_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::RgbImage, DetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidRgbDimensions { width, height });
    };
    let Some(expected) = w.checked_mul(h).and_then(|n| n.checked_mul(3)) else {
        return Err(DetectError::InvalidRgbDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidRgbBuffer {
            expected,
            got: pixels.len(),
        });
    }
    ::image::RgbImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidRgbDimensions { width, height })
}

pub fn detect_face_from_rgb_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    params: &detector::FaceDetectorParams,
) -> Result<Option<core::Quad>, DetectError> {
    let img = rgb_image_from_slice(width, height, pixels)?;
    Ok(detect_face(&img, params))
}

pub fn classify_face_from_rgb_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    detector_params: &detector::FaceDetectorParams,
    sampler_params: &scan::StickerSamplerParams,
    classifier_params: &scan::ColorClassifierParams,
) -> Result<Option<FaceReadout>, DetectError> {
    let img = rgb_image_from_slice(width, height, pixels)?;
    Ok(classify_face(
        &img,
        detector_params,
        sampler_params,
        classifier_params,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_length_is_validated() {
        let err = rgb_image_from_slice(4, 4, &[0u8; 10]).unwrap_err();
        match err {
            DetectError::InvalidRgbBuffer { expected, got } => {
                assert_eq!(expected, 48);
                assert_eq!(got, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn valid_buffer_round_trips_dimensions() {
        let img = rgb_image_from_slice(3, 2, &[7u8; 18]).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        let view = rgb_view(&img);
        assert_eq!((view.width, view.height), (3, 2));
        assert_eq!(view.pixel(2, 1), [7, 7, 7]);
    }
}
