//! Candidate-face sanity checks and cross-face correction.
//!
//! Validation enforces physical plausibility bounds on a single face;
//! cross-face correction then nudges confusable colors toward the global
//! 9-stickers-per-color invariant using the faces already accepted. It is a
//! soft repair pass, not a constraint solver.

use std::collections::HashMap;

use log::{debug, info};

use cubeface_core::StickerColor;

use crate::classifier::CONFUSABLE_PAIRS;
use crate::types::{AcceptedFace, CandidateFace, CENTER_INDEX};

/// Reasons a candidate face is refused.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("all nine stickers are {color:?} but the center is not white")]
    AllSameColorNotWhite { color: StickerColor },
    #[error("{color:?} appears {count} times, more than 5 non-center occurrences")]
    TooManyOfColor { color: StickerColor, count: usize },
    #[error("white appears {count} times on a face whose center is {center:?}")]
    TooMuchWhite { count: usize, center: StickerColor },
    #[error("a face with center {center:?} was already captured")]
    DuplicateCenter { center: StickerColor },
}

/// Validate a candidate against the per-face rules and the already-accepted
/// faces, applying cross-face correction on acceptance.
pub fn validate_capture(
    candidate: &CandidateFace,
    accepted: &[AcceptedFace],
    now_ms: u64,
) -> Result<AcceptedFace, ValidationError> {
    let colors = candidate.colors();
    let center = colors[CENTER_INDEX];

    if accepted.iter().any(|f| f.center_color() == center) {
        return Err(ValidationError::DuplicateCenter { center });
    }

    let mut counts: HashMap<StickerColor, usize> = HashMap::new();
    for &c in &colors {
        *counts.entry(c).or_insert(0) += 1;
    }

    if counts.len() == 1 && center != StickerColor::White {
        return Err(ValidationError::AllSameColorNotWhite { color: center });
    }

    for (&color, &count) in &counts {
        if color != center && color != StickerColor::White && count > 5 {
            return Err(ValidationError::TooManyOfColor { color, count });
        }
    }

    let white_count = counts.get(&StickerColor::White).copied().unwrap_or(0);
    if center != StickerColor::White && white_count > 4 {
        return Err(ValidationError::TooMuchWhite {
            count: white_count,
            center,
        });
    }

    let corrected = cross_face_correction(colors, accepted);
    let face = center.face_id();
    info!("face accepted: center {center:?} -> {face:?}");

    Ok(AcceptedFace {
        colors: corrected,
        face,
        captured_at_ms: now_ms,
    })
}

/// Tally colors over all accepted faces plus the candidate; for a
/// confusable pair with one color over 9 and the other under 9, reassign
/// the minimum number of non-center candidate stickers to pull both counts
/// toward 9.
fn cross_face_correction(
    mut colors: [StickerColor; 9],
    accepted: &[AcceptedFace],
) -> [StickerColor; 9] {
    let mut global: HashMap<StickerColor, i32> = HashMap::new();
    for face in accepted {
        for &c in &face.colors {
            *global.entry(c).or_insert(0) += 1;
        }
    }
    for &c in &colors {
        *global.entry(c).or_insert(0) += 1;
    }

    for &(a, b) in &CONFUSABLE_PAIRS {
        let ca = global.get(&a).copied().unwrap_or(0);
        let cb = global.get(&b).copied().unwrap_or(0);

        let (over, under, n_over, n_under) = if ca > 9 && cb < 9 {
            (a, b, ca, cb)
        } else if cb > 9 && ca < 9 {
            (b, a, cb, ca)
        } else {
            continue;
        };

        let mut to_move = (n_over - 9).min(9 - n_under) as usize;
        if to_move == 0 {
            continue;
        }

        debug!(
            "cross-face correction: {over:?} x{n_over} / {under:?} x{n_under}, moving {to_move}"
        );
        for i in (0..9).rev() {
            if to_move == 0 {
                break;
            }
            if i == CENTER_INDEX || colors[i] != over {
                continue;
            }
            colors[i] = under;
            to_move -= 1;
            *global.entry(over).or_insert(0) -= 1;
            *global.entry(under).or_insert(0) += 1;
        }
    }

    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeface_core::{srgb_to_lab, FaceId};
    use crate::types::{ClassifiedSticker, Sample};

    fn face_of(colors: [StickerColor; 9]) -> CandidateFace {
        let stickers = colors.map(|color| ClassifiedSticker {
            sample: Sample {
                rgb: [0, 0, 0],
                lab: srgb_to_lab([0, 0, 0]),
            },
            color,
        });
        CandidateFace { stickers }
    }

    fn accepted_of(colors: [StickerColor; 9], at: u64) -> AcceptedFace {
        AcceptedFace {
            colors,
            face: colors[CENTER_INDEX].face_id(),
            captured_at_ms: at,
        }
    }

    use StickerColor::*;

    #[test]
    fn all_one_color_with_white_center_passes() {
        let result = validate_capture(&face_of([White; 9]), &[], 10);
        let face = result.expect("valid");
        assert_eq!(face.face, FaceId::Up);
        assert_eq!(face.colors, [White; 9]);
    }

    #[test]
    fn all_one_color_with_non_white_center_fails() {
        let err = validate_capture(&face_of([Red; 9]), &[], 10).unwrap_err();
        assert_eq!(err, ValidationError::AllSameColorNotWhite { color: Red });
    }

    #[test]
    fn eight_red_one_white_with_red_center_passes() {
        let mut colors = [Red; 9];
        colors[0] = White;
        assert!(validate_capture(&face_of(colors), &[], 10).is_ok());
    }

    #[test]
    fn six_of_a_non_center_color_fails() {
        // Center Green, six Blue stickers: over the 5-occurrence bound.
        let colors = [Blue, Blue, Blue, Blue, Green, Blue, Blue, Green, Green];
        let err = validate_capture(&face_of(colors), &[], 10).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooManyOfColor {
                color: Blue,
                count: 6
            }
        );
    }

    #[test]
    fn five_whites_on_non_white_center_fails() {
        let colors = [White, White, White, White, Red, White, Red, Red, Red];
        let err = validate_capture(&face_of(colors), &[], 10).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooMuchWhite {
                count: 5,
                center: Red
            }
        );
    }

    #[test]
    fn duplicate_center_is_surfaced_distinctly() {
        let first = accepted_of([Green; 9], 5);
        let mut colors = [Red; 9];
        colors[CENTER_INDEX] = Green;
        colors[0] = Green;
        colors[1] = Green;
        let err = validate_capture(&face_of(colors), &[first], 10).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateCenter { center: Green });
    }

    #[test]
    fn correction_moves_overcounted_confusable_stickers() {
        // Accepted faces already hold 9 oranges; the candidate brings two
        // more oranges while red is short. Both extras flip to red.
        let orange_face = accepted_of(
            [
                Orange, Orange, Orange, Orange, Orange, Orange, Orange, Orange, Orange,
            ],
            1,
        );
        let mut colors = [Green; 9];
        colors[0] = Orange;
        colors[1] = Orange;
        let face = validate_capture(&face_of(colors), &[orange_face], 10).expect("accepted");
        assert_eq!(face.colors[0], Red);
        assert_eq!(face.colors[1], Red);
        assert_eq!(face.colors[CENTER_INDEX], Green);
    }

    #[test]
    fn correction_preserves_sticker_count_and_bounds() {
        let orange_face = accepted_of([Orange; 9], 1);
        let mut colors = [Green; 9];
        colors[0] = Orange;
        colors[1] = Orange;
        let before_max = 11; // orange count across accepted + candidate

        let face = validate_capture(&face_of(colors), &[orange_face], 10).unwrap();
        assert_eq!(face.colors.len(), 9);

        let mut counts: HashMap<StickerColor, usize> = HashMap::new();
        for &c in face.colors.iter().chain([Orange; 9].iter()) {
            *counts.entry(c).or_insert(0) += 1;
        }
        assert!(counts.values().all(|&n| n <= before_max));
        assert_eq!(counts[&Orange], 9);
    }

    #[test]
    fn center_sticker_is_never_corrected() {
        let orange_face = accepted_of([Orange; 9], 1);
        let mut colors = [Green; 9];
        colors[CENTER_INDEX] = Orange; // hypothetical orange center
        // An orange center cannot be captured twice; expect DuplicateCenter
        // rather than any correction touching the center.
        let err = validate_capture(&face_of(colors), &[orange_face], 10).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateCenter { center: Orange });
    }
}
