//! Sticker sampling, classification, and capture gating.
//!
//! Consumes quads from `cubeface-detect` and drives them through sampling,
//! perceptual classification, temporal voting, stability gating, and
//! validation. [`ScanPipeline`] ties the stages together, one call per
//! camera frame.

mod classifier;
mod consensus;
mod facelet;
mod pipeline;
mod sampler;
mod stability;
mod types;
mod validator;

pub use classifier::{
    resolve_confusable_pair, ColorClassifier, ColorClassifierParams, CONFUSABLE_PAIRS,
};
pub use consensus::{TemporalConsensus, TemporalConsensusParams};
pub use facelet::{facelet_string, FaceletError};
pub use pipeline::{CaptureOutcome, FrameReport, ScanParams, ScanPipeline};
pub use sampler::{sample_face, StickerSamplerParams};
pub use stability::{StabilityGate, StabilityGateParams};
pub use types::{AcceptedFace, CandidateFace, ClassifiedSticker, Sample, CENTER_INDEX};
pub use validator::{validate_capture, ValidationError};
