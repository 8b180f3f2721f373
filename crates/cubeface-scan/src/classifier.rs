//! Perceptual color classification with face-level contextual refinement.
//!
//! Each sample is assigned the nearest canonical reference under CIEDE2000,
//! then the three known confusable pairs are re-examined across the whole
//! face: within one face under one lighting condition, true color
//! differences produce a much larger preference-score gap than noise does,
//! so the pair subset is either pushed wholesale to the closer reference or
//! split at the largest score gap.

use log::trace;
use serde::{Deserialize, Serialize};

use cubeface_core::{ciede2000, rgb_to_hsv, Lab, StickerColor};

use crate::types::Sample;

/// Color pairs prone to misclassification under real lighting.
pub const CONFUSABLE_PAIRS: [(StickerColor, StickerColor); 3] = [
    (StickerColor::White, StickerColor::Yellow),
    (StickerColor::Red, StickerColor::Orange),
    (StickerColor::Orange, StickerColor::Yellow),
];

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ColorClassifierParams {
    /// Below this spread of pair preference scores, the whole pair subset
    /// is treated as one actual color.
    pub pair_spread_threshold: f32,
    /// HSV fallback: saturation below which a sticker is forced to White.
    pub white_max_saturation: f32,
    /// HSV fallback: minimum value required for the White override.
    pub white_min_value: f32,
}

impl Default for ColorClassifierParams {
    fn default() -> Self {
        Self {
            pair_spread_threshold: 10.0,
            white_max_saturation: 0.18,
            white_min_value: 0.55,
        }
    }
}

/// Whole-face classifier; operating on all nine stickers at once is what
/// makes the confusable-pair context available.
pub struct ColorClassifier {
    references: [Lab; 6],
    params: ColorClassifierParams,
}

impl ColorClassifier {
    pub fn new(params: ColorClassifierParams) -> Self {
        let references = StickerColor::ALL.map(StickerColor::reference_lab);
        Self { references, params }
    }

    /// Assign one canonical color per sample. Pure: identical inputs always
    /// produce identical assignments.
    pub fn classify(&self, samples: &[Sample; 9]) -> [StickerColor; 9] {
        let mut distances = [[0.0f32; 6]; 9];
        let mut assigned = [StickerColor::White; 9];

        for (i, sample) in samples.iter().enumerate() {
            let mut best = 0usize;
            for (k, reference) in self.references.iter().enumerate() {
                let d = ciede2000(sample.lab, *reference);
                distances[i][k] = d;
                if d < distances[i][best] {
                    best = k;
                }
            }
            assigned[i] = StickerColor::ALL[best];
        }

        for pair in CONFUSABLE_PAIRS {
            resolve_confusable_pair(
                &mut assigned,
                &distances,
                pair,
                self.params.pair_spread_threshold,
            );
        }

        // Lighting-robust guard: very low saturation is white no matter what
        // the Lab distances say.
        for (i, sample) in samples.iter().enumerate() {
            let hsv = rgb_to_hsv(sample.rgb);
            if hsv.s <= self.params.white_max_saturation && hsv.v >= self.params.white_min_value {
                assigned[i] = StickerColor::White;
            }
        }

        assigned
    }
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self::new(ColorClassifierParams::default())
    }
}

#[inline]
fn color_index(color: StickerColor) -> usize {
    StickerColor::ALL
        .iter()
        .position(|&c| c == color)
        .expect("all colors appear in ALL")
}

/// Contextual refinement for one confusable pair.
///
/// Collects the stickers currently assigned to either color of the pair and
/// computes a per-sticker preference score `d(a) - d(b)`. A small spread
/// means the members are almost certainly all the same actual color, so all
/// of them move to the reference with the lower average distance. A large
/// spread is split at the biggest gap in the sorted scores: the low side
/// goes to `a`, the high side to `b`.
pub fn resolve_confusable_pair(
    assigned: &mut [StickerColor; 9],
    distances: &[[f32; 6]; 9],
    pair: (StickerColor, StickerColor),
    spread_threshold: f32,
) {
    let (a, b) = pair;
    let (ka, kb) = (color_index(a), color_index(b));

    let members: Vec<usize> = (0..9)
        .filter(|&i| assigned[i] == a || assigned[i] == b)
        .collect();
    if members.len() < 2 {
        return;
    }

    let mut scored: Vec<(usize, f32)> = members
        .iter()
        .map(|&i| (i, distances[i][ka] - distances[i][kb]))
        .collect();
    scored.sort_by(|x, y| x.1.partial_cmp(&y.1).unwrap_or(std::cmp::Ordering::Equal));

    let spread = scored[scored.len() - 1].1 - scored[0].1;

    if spread < spread_threshold {
        let mut avg_a = 0.0f32;
        let mut avg_b = 0.0f32;
        for &(i, _) in &scored {
            avg_a += distances[i][ka];
            avg_b += distances[i][kb];
        }
        let winner = if avg_a <= avg_b { a } else { b };
        trace!("confusable {a:?}/{b:?}: spread {spread:.2} below threshold, all -> {winner:?}");
        for &(i, _) in &scored {
            assigned[i] = winner;
        }
        return;
    }

    let mut split = 1usize;
    let mut widest = f32::NEG_INFINITY;
    for w in 1..scored.len() {
        let gap = scored[w].1 - scored[w - 1].1;
        if gap > widest {
            widest = gap;
            split = w;
        }
    }

    trace!("confusable {a:?}/{b:?}: spread {spread:.2}, split at gap {widest:.2}");
    for (rank, &(i, _)) in scored.iter().enumerate() {
        assigned[i] = if rank < split { a } else { b };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeface_core::srgb_to_lab;

    fn sample(rgb: [u8; 3]) -> Sample {
        Sample {
            rgb,
            lab: srgb_to_lab(rgb),
        }
    }

    #[test]
    fn classifies_clean_reference_colors() {
        let samples = [
            sample([255, 0, 0]),
            sample([255, 140, 0]),
            sample([255, 255, 0]),
            sample([0, 255, 0]),
            sample([0, 0, 255]),
            sample([255, 255, 255]),
            sample([0, 255, 0]),
            sample([0, 0, 255]),
            sample([255, 0, 0]),
        ];
        let classifier = ColorClassifier::default();
        let colors = classifier.classify(&samples);
        assert_eq!(
            colors,
            [
                StickerColor::Red,
                StickerColor::Orange,
                StickerColor::Yellow,
                StickerColor::Green,
                StickerColor::Blue,
                StickerColor::White,
                StickerColor::Green,
                StickerColor::Blue,
                StickerColor::Red,
            ]
        );
    }

    #[test]
    fn classify_is_idempotent() {
        let samples = [
            sample([200, 40, 30]),
            sample([220, 130, 40]),
            sample([230, 220, 60]),
            sample([40, 170, 80]),
            sample([40, 60, 190]),
            sample([235, 235, 230]),
            sample([190, 45, 35]),
            sample([45, 160, 75]),
            sample([50, 65, 200]),
        ];
        let classifier = ColorClassifier::default();
        let first = classifier.classify(&samples);
        for _ in 0..5 {
            assert_eq!(classifier.classify(&samples), first);
        }
    }

    #[test]
    fn low_saturation_forces_white() {
        // A dingy near-gray that Lab distance might pull toward yellow.
        let mut samples = [sample([255, 255, 255]); 9];
        samples[2] = sample([210, 208, 190]);
        let classifier = ColorClassifier::default();
        let colors = classifier.classify(&samples);
        assert_eq!(colors[2], StickerColor::White);
    }

    #[test]
    fn uniform_pair_subset_collapses_to_one_color() {
        // All members near orange, scores spread below threshold: everything
        // should land on the average-closer reference.
        let mut assigned = [StickerColor::Green; 9];
        let mut distances = [[100.0f32; 6]; 9];
        for i in 0..3 {
            assigned[i] = if i == 0 {
                StickerColor::Red
            } else {
                StickerColor::Orange
            };
            distances[i][0] = 12.0 + i as f32; // Red
            distances[i][1] = 8.0 + i as f32; // Orange
        }
        resolve_confusable_pair(
            &mut assigned,
            &distances,
            (StickerColor::Red, StickerColor::Orange),
            10.0,
        );
        for i in 0..3 {
            assert_eq!(assigned[i], StickerColor::Orange);
        }
    }

    #[test]
    fn clear_score_gap_splits_pair_members() {
        // Scenario: two confusable stickers with a clear gap between their
        // preference scores must end up as the two distinct colors.
        let mut assigned = [StickerColor::Green; 9];
        let mut distances = [[100.0f32; 6]; 9];

        // Sticker 0 strongly prefers White, sticker 1 strongly prefers
        // Yellow; Lab b difference ~15 shows up as a large score gap.
        let kw = 5; // White index in ALL
        let ky = 2; // Yellow index in ALL
        assigned[0] = StickerColor::White;
        distances[0][kw] = 3.0;
        distances[0][ky] = 18.0;
        assigned[1] = StickerColor::White;
        distances[1][kw] = 17.0;
        distances[1][ky] = 4.0;

        resolve_confusable_pair(
            &mut assigned,
            &distances,
            (StickerColor::White, StickerColor::Yellow),
            10.0,
        );
        assert_eq!(assigned[0], StickerColor::White);
        assert_eq!(assigned[1], StickerColor::Yellow);
    }
}
