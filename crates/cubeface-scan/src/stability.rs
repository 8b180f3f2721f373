//! Geometric stability tracking.
//!
//! Independent of the color consensus: both gates must reach their own
//! thresholds before a capture is attempted. Timestamps are caller-supplied
//! milliseconds, so the gate is deterministic under test.

use serde::{Deserialize, Serialize};

use cubeface_core::Quad;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StabilityGateParams {
    /// Per-corner movement below this many pixels counts as "still".
    pub corner_tolerance_px: f32,
    /// Stable time required before a capture may be attempted.
    pub min_stable_ms: u64,
}

impl Default for StabilityGateParams {
    fn default() -> Self {
        Self {
            corner_tolerance_px: 20.0,
            min_stable_ms: 700,
        }
    }
}

/// Tracks how long the detected quad has stayed in roughly the same screen
/// position.
pub struct StabilityGate {
    params: StabilityGateParams,
    last_quad: Option<Quad>,
    stable_since_ms: u64,
}

impl StabilityGate {
    pub fn new(params: StabilityGateParams) -> Self {
        Self {
            params,
            last_quad: None,
            stable_since_ms: 0,
        }
    }

    #[inline]
    pub fn params(&self) -> &StabilityGateParams {
        &self.params
    }

    /// Record this frame's quad and return the elapsed stable time in ms.
    ///
    /// Any corner moving beyond the tolerance restarts the clock at `now_ms`.
    pub fn update(&mut self, quad: &Quad, now_ms: u64) -> u64 {
        let moved = match &self.last_quad {
            None => true,
            Some(last) => last.max_corner_shift(quad) > self.params.corner_tolerance_px,
        };
        if moved {
            self.stable_since_ms = now_ms;
        }
        self.last_quad = Some(*quad);
        now_ms.saturating_sub(self.stable_since_ms)
    }

    /// Stable-time fraction of the capture threshold, clamped to 0..=1.
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.last_quad.is_none() || self.params.min_stable_ms == 0 {
            return 0.0;
        }
        let elapsed = now_ms.saturating_sub(self.stable_since_ms) as f32;
        (elapsed / self.params.min_stable_ms as f32).min(1.0)
    }

    /// Forget the tracked quad. Called on detection loss and after a
    /// capture commits.
    pub fn reset(&mut self) {
        self.last_quad = None;
        self.stable_since_ms = 0;
    }
}

impl Default for StabilityGate {
    fn default() -> Self {
        Self::new(StabilityGateParams::default())
    }
}
