//! Facelet-string export for the external solver.
//!
//! The solver consumes a 54-character string: 9 stickers for each of the
//! six faces in fixed URFDLB order, each character the face letter of the
//! center color that sticker's color belongs to.

use cubeface_core::{FaceId, StickerColor};

use crate::types::AcceptedFace;

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum FaceletError {
    #[error("expected 6 captured faces, got {got}")]
    MissingFaces { got: usize },
    #[error("two captured faces share the center color {center:?}")]
    DuplicateCenter { center: StickerColor },
}

/// Serialize six accepted faces as a 54-character facelet string.
pub fn facelet_string(faces: &[AcceptedFace]) -> Result<String, FaceletError> {
    if faces.len() != 6 {
        return Err(FaceletError::MissingFaces { got: faces.len() });
    }
    for (i, face) in faces.iter().enumerate() {
        if faces[..i]
            .iter()
            .any(|f| f.center_color() == face.center_color())
        {
            return Err(FaceletError::DuplicateCenter {
                center: face.center_color(),
            });
        }
    }

    let mut out = String::with_capacity(54);
    for id in FaceId::FACELET_ORDER {
        let face = faces
            .iter()
            .find(|f| f.face == id)
            .ok_or(FaceletError::MissingFaces { got: faces.len() })?;
        for &color in &face.colors {
            out.push(color.face_id().letter());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CENTER_INDEX;
    use StickerColor::*;

    fn solid(color: StickerColor, at: u64) -> AcceptedFace {
        AcceptedFace {
            colors: [color; 9],
            face: color.face_id(),
            captured_at_ms: at,
        }
    }

    #[test]
    fn solved_cube_serializes_in_urfdlb_order() {
        let faces = [
            solid(Green, 3),
            solid(White, 1),
            solid(Yellow, 4),
            solid(Red, 2),
            solid(Blue, 6),
            solid(Orange, 5),
        ];
        let s = facelet_string(&faces).expect("complete capture");
        assert_eq!(s.len(), 54);
        assert_eq!(
            s,
            "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB"
        );
    }

    #[test]
    fn mixed_face_uses_per_sticker_letters() {
        let mut faces = vec![
            solid(White, 1),
            solid(Red, 2),
            solid(Green, 3),
            solid(Yellow, 4),
            solid(Orange, 5),
            solid(Blue, 6),
        ];
        faces[0].colors[0] = Green; // one green sticker on the white face
        let s = facelet_string(&faces).unwrap();
        assert!(s.starts_with("FUUUUUUUU"));
    }

    #[test]
    fn incomplete_capture_is_rejected() {
        let faces = [solid(White, 1), solid(Red, 2)];
        assert_eq!(
            facelet_string(&faces),
            Err(FaceletError::MissingFaces { got: 2 })
        );
    }

    #[test]
    fn duplicate_centers_are_rejected() {
        let mut faces = vec![
            solid(White, 1),
            solid(Red, 2),
            solid(Green, 3),
            solid(Yellow, 4),
            solid(Orange, 5),
            solid(Blue, 6),
        ];
        faces[5].colors[CENTER_INDEX] = Red;
        assert_eq!(
            facelet_string(&faces),
            Err(FaceletError::DuplicateCenter { center: Red })
        );
    }
}
