use serde::{Deserialize, Serialize};

use cubeface_core::{FaceId, Lab, StickerColor};

/// Row-major index of the center sticker in a 3x3 face.
pub const CENTER_INDEX: usize = 4;

/// The color measured at one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub rgb: [u8; 3],
    pub lab: Lab,
}

/// One sampled cell plus its assigned canonical color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSticker {
    pub sample: Sample,
    pub color: StickerColor,
}

/// Exactly nine classified stickers, row-major, center at index 4.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateFace {
    pub stickers: [ClassifiedSticker; 9],
}

impl CandidateFace {
    pub fn colors(&self) -> [StickerColor; 9] {
        self.stickers.map(|s| s.color)
    }

    pub fn center_color(&self) -> StickerColor {
        self.stickers[CENTER_INDEX].color
    }
}

/// A face that passed validation, tagged with its canonical identity.
///
/// Ownership transfers to the cube-state collaborator once emitted; the
/// scanning core only reads accepted faces back for cross-face correction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcceptedFace {
    pub colors: [StickerColor; 9],
    pub face: FaceId,
    pub captured_at_ms: u64,
}

impl AcceptedFace {
    pub fn center_color(&self) -> StickerColor {
        self.colors[CENTER_INDEX]
    }
}
