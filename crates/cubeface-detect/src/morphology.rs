//! 3x3 binary morphology over row-major masks.
//!
//! These run on the downscaled working copy, so the simple two-pass
//! dilate/erode implementations stay well inside the frame budget.

fn apply3x3(mask: &[u8], width: usize, height: usize, dilate: bool) -> Vec<u8> {
    let mut out = vec![0u8; mask.len()];

    for y in 0..height {
        for x in 0..width {
            let mut any = false;
            let mut all = true;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    let v = if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        0
                    } else {
                        mask[ny as usize * width + nx as usize]
                    };
                    any |= v != 0;
                    all &= v != 0;
                }
            }
            out[y * width + x] = if dilate { any as u8 } else { all as u8 };
        }
    }

    out
}

pub fn dilate3x3(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    apply3x3(mask, width, height, true)
}

pub fn erode3x3(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    apply3x3(mask, width, height, false)
}

/// Dilate then erode: merges sticker interiors split by glare or print.
pub fn close3x3(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    let d = dilate3x3(mask, width, height);
    erode3x3(&d, width, height)
}

/// Erode then dilate: removes speckle smaller than the structuring element.
pub fn open3x3(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    let e = erode3x3(mask, width, height);
    dilate3x3(&e, width, height)
}
