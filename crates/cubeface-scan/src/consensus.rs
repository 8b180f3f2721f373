//! Multi-frame color voting.
//!
//! Per-frame classifications are noisy; a bounded window of recent frames
//! votes per cell, and a result is only reported once every cell clears the
//! quorum. A sudden multi-cell shift between consecutive frames signals a
//! cube being rotated mid-capture and flushes the window.

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use cubeface_core::StickerColor;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TemporalConsensusParams {
    /// Frames retained in the voting window.
    pub capacity: usize,
    /// Minimum buffered frames before any result is reported.
    pub min_fill: usize,
    /// Fraction of the buffered frames that must agree per cell.
    pub quorum_frac: f32,
    /// Cells that must change between consecutive frames to trigger the
    /// mid-rotation reset.
    pub shift_reset_cells: usize,
}

impl Default for TemporalConsensusParams {
    fn default() -> Self {
        Self {
            capacity: 12,
            min_fill: 5,
            quorum_frac: 0.65,
            shift_reset_cells: 3,
        }
    }
}

/// Bounded FIFO of per-frame color vectors with per-cell majority voting.
pub struct TemporalConsensus {
    window: VecDeque<[StickerColor; 9]>,
    params: TemporalConsensusParams,
}

impl TemporalConsensus {
    pub fn new(params: TemporalConsensusParams) -> Self {
        Self {
            window: VecDeque::with_capacity(params.capacity),
            params,
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Drop all buffered frames. Called on detection loss and after a
    /// capture commits.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Add one frame's classification and return the voted colors if every
    /// cell has quorum.
    pub fn add_frame(&mut self, colors: [StickerColor; 9]) -> Option<[StickerColor; 9]> {
        if let Some(last) = self.window.back() {
            let changed = last.iter().zip(colors.iter()).filter(|(a, b)| a != b).count();
            if changed >= self.params.shift_reset_cells {
                debug!("consensus: {changed} cells changed between frames, window flushed");
                self.window.clear();
            }
        }

        if self.window.len() == self.params.capacity {
            self.window.pop_front();
        }
        self.window.push_back(colors);

        if self.window.len() < self.params.min_fill {
            return None;
        }

        let quorum = (self.params.quorum_frac * self.window.len() as f32).ceil() as usize;
        let mut voted = [StickerColor::White; 9];

        for cell in 0..9 {
            let mut counts = [0usize; 6];
            for frame in &self.window {
                let k = StickerColor::ALL
                    .iter()
                    .position(|&c| c == frame[cell])
                    .expect("canonical color");
                counts[k] += 1;
            }
            let (best, &best_count) = counts
                .iter()
                .enumerate()
                .max_by_key(|(_, &n)| n)
                .expect("six counts");
            if best_count < quorum {
                return None;
            }
            voted[cell] = StickerColor::ALL[best];
        }

        Some(voted)
    }
}

impl Default for TemporalConsensus {
    fn default() -> Self {
        Self::new(TemporalConsensusParams::default())
    }
}
