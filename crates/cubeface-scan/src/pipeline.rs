//! The frame-driven scan controller.
//!
//! One call per camera frame: detect -> sample -> classify -> vote ->
//! stability gate -> validate. The only state carried across frames is the
//! voting window, the stability state, and the capture cooldown, each with
//! a single mutation site here and explicit reset triggers.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use cubeface_core::{Quad, RgbImageView, StickerColor};
use cubeface_detect::{FaceDetector, FaceDetectorParams};

use crate::classifier::{ColorClassifier, ColorClassifierParams};
use crate::consensus::{TemporalConsensus, TemporalConsensusParams};
use crate::sampler::{sample_face, StickerSamplerParams};
use crate::stability::{StabilityGate, StabilityGateParams};
use crate::types::{AcceptedFace, CandidateFace, ClassifiedSticker};
use crate::validator::{validate_capture, ValidationError};

/// Full pipeline configuration, one nested section per stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanParams {
    #[serde(default)]
    pub detector: FaceDetectorParams,
    #[serde(default)]
    pub sampler: StickerSamplerParams,
    #[serde(default)]
    pub classifier: ColorClassifierParams,
    #[serde(default)]
    pub consensus: TemporalConsensusParams,
    #[serde(default)]
    pub stability: StabilityGateParams,
    /// Quiet period after a committed capture before the next one may be
    /// evaluated.
    pub cooldown_ms: u64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            detector: FaceDetectorParams::default(),
            sampler: StickerSamplerParams::default(),
            classifier: ColorClassifierParams::default(),
            consensus: TemporalConsensusParams::default(),
            stability: StabilityGateParams::default(),
            cooldown_ms: 1500,
        }
    }
}

/// Outcome of a capture attempt within one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureOutcome {
    /// The face passed validation and was committed; the caller owns it now.
    Accepted(AcceptedFace),
    /// The face failed validation; scanning simply continues.
    Rejected(ValidationError),
}

/// Read-only projection of one frame's pipeline run, for UI feedback.
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    /// Detected face quad, if any.
    pub quad: Option<Quad>,
    /// This frame's raw (unvoted) classification.
    pub live_colors: Option<[StickerColor; 9]>,
    /// Voted colors once the window has quorum.
    pub consensus: Option<[StickerColor; 9]>,
    /// Stable-time fraction of the capture threshold, 0..=1.
    pub stability: f32,
    /// At most one capture attempt per frame.
    pub outcome: Option<CaptureOutcome>,
}

/// Owns the per-stage state and drives one frame at a time.
pub struct ScanPipeline {
    params: ScanParams,
    detector: FaceDetector,
    classifier: ColorClassifier,
    consensus: TemporalConsensus,
    stability: StabilityGate,
    cooldown_until_ms: u64,
}

impl ScanPipeline {
    pub fn new(params: ScanParams) -> Self {
        let detector = FaceDetector::new(params.detector.clone());
        let classifier = ColorClassifier::new(params.classifier);
        let consensus = TemporalConsensus::new(params.consensus);
        let stability = StabilityGate::new(params.stability);
        Self {
            params,
            detector,
            classifier,
            consensus,
            stability,
            cooldown_until_ms: 0,
        }
    }

    #[inline]
    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    /// Drop all transient state, e.g. when the scanning session restarts.
    pub fn reset(&mut self) {
        self.consensus.reset();
        self.stability.reset();
        self.cooldown_until_ms = 0;
    }

    /// Run the pipeline for one frame.
    ///
    /// `accepted` is the collaborator-owned list of already-confirmed faces,
    /// consulted for duplicate centers and cross-face correction. Every
    /// failure mode yields a report; nothing in the per-frame path panics.
    pub fn process_frame(
        &mut self,
        frame: &RgbImageView<'_>,
        now_ms: u64,
        accepted: &[AcceptedFace],
    ) -> FrameReport {
        let mut report = FrameReport::default();

        let Some(quad) = self.detector.detect(frame) else {
            self.on_detection_lost();
            return report;
        };

        let Some(samples) = sample_face(frame, &quad, &self.params.sampler) else {
            // Degenerate geometry is treated exactly like a missed detection.
            debug!("sampling failed for detected quad");
            self.on_detection_lost();
            return report;
        };

        let colors = self.classifier.classify(&samples);
        let voted = self.consensus.add_frame(colors);
        let stable_ms = self.stability.update(&quad, now_ms);

        report.quad = Some(quad);
        report.live_colors = Some(colors);
        report.consensus = voted;
        report.stability = self.stability.progress(now_ms);

        let in_cooldown = now_ms < self.cooldown_until_ms;
        let stable = stable_ms >= self.params.stability.min_stable_ms;

        if let (Some(voted), true, false) = (voted, stable, in_cooldown) {
            let stickers: [ClassifiedSticker; 9] = std::array::from_fn(|i| ClassifiedSticker {
                sample: samples[i],
                color: voted[i],
            });
            let candidate = CandidateFace { stickers };

            match validate_capture(&candidate, accepted, now_ms) {
                Ok(face) => {
                    self.cooldown_until_ms = now_ms + self.params.cooldown_ms;
                    self.consensus.reset();
                    self.stability.reset();
                    report.outcome = Some(CaptureOutcome::Accepted(face));
                }
                Err(err) => {
                    warn!("capture rejected: {err}");
                    report.outcome = Some(CaptureOutcome::Rejected(err));
                }
            }
        }

        report
    }

    /// Both rolling-state owners reset whenever a frame has no detection.
    fn on_detection_lost(&mut self) {
        self.consensus.reset();
        self.stability.reset();
    }
}

impl Default for ScanPipeline {
    fn default() -> Self {
        Self::new(ScanParams::default())
    }
}
