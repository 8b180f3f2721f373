use serde::{Deserialize, Serialize};

/// The six canonical sticker colors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickerColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    White,
}

impl StickerColor {
    pub const ALL: [StickerColor; 6] = [
        StickerColor::Red,
        StickerColor::Orange,
        StickerColor::Yellow,
        StickerColor::Green,
        StickerColor::Blue,
        StickerColor::White,
    ];

    /// Pure saturated reference RGB used to derive the Lab references.
    pub fn reference_rgb(self) -> [u8; 3] {
        match self {
            StickerColor::Red => [255, 0, 0],
            StickerColor::Orange => [255, 140, 0],
            StickerColor::Yellow => [255, 255, 0],
            StickerColor::Green => [0, 255, 0],
            StickerColor::Blue => [0, 0, 255],
            StickerColor::White => [255, 255, 255],
        }
    }

    pub fn reference_lab(self) -> Lab {
        srgb_to_lab(self.reference_rgb())
    }

    /// Canonical face identity for a face whose center has this color,
    /// using the standard western color scheme (white up, green front).
    pub fn face_id(self) -> FaceId {
        match self {
            StickerColor::White => FaceId::Up,
            StickerColor::Red => FaceId::Right,
            StickerColor::Green => FaceId::Front,
            StickerColor::Yellow => FaceId::Down,
            StickerColor::Orange => FaceId::Left,
            StickerColor::Blue => FaceId::Back,
        }
    }
}

/// Canonical face identity, in the fixed URFDLB facelet-string order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FaceId {
    Up,
    Right,
    Front,
    Down,
    Left,
    Back,
}

impl FaceId {
    pub const FACELET_ORDER: [FaceId; 6] = [
        FaceId::Up,
        FaceId::Right,
        FaceId::Front,
        FaceId::Down,
        FaceId::Left,
        FaceId::Back,
    ];

    pub fn letter(self) -> char {
        match self {
            FaceId::Up => 'U',
            FaceId::Right => 'R',
            FaceId::Front => 'F',
            FaceId::Down => 'D',
            FaceId::Left => 'L',
            FaceId::Back => 'B',
        }
    }
}

/// CIE L*a*b* coordinates (D65), the perceptual space used for
/// classification distances.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

/// Hue (degrees, 0..360), saturation and value in 0..=1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

// D65 reference white in CIE XYZ, Y normalized to 1 (CIE 15:2004).
const D65_WHITE: [f64; 3] = [0.95047, 1.0, 1.08883];

#[inline]
fn srgb_to_linear(c: u8) -> f64 {
    let c = c as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn lab_f(t: f64) -> f64 {
    const EPSILON: f64 = 0.008856;
    const KAPPA: f64 = 903.3;
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

/// Standard sRGB -> linear -> XYZ(D65) -> L*a*b* transform.
pub fn srgb_to_lab(rgb: [u8; 3]) -> Lab {
    let r = srgb_to_linear(rgb[0]);
    let g = srgb_to_linear(rgb[1]);
    let b = srgb_to_linear(rgb[2]);

    // sRGB to XYZ (D65) matrix, IEC 61966-2-1.
    let x = 0.4124564 * r + 0.3575761 * g + 0.1804375 * b;
    let y = 0.2126729 * r + 0.7151522 * g + 0.0721750 * b;
    let z = 0.0193339 * r + 0.1191920 * g + 0.9503041 * b;

    let fx = lab_f(x / D65_WHITE[0]);
    let fy = lab_f(y / D65_WHITE[1]);
    let fz = lab_f(z / D65_WHITE[2]);

    Lab {
        l: (116.0 * fy - 16.0) as f32,
        a: (500.0 * (fx - fy)) as f32,
        b: (200.0 * (fy - fz)) as f32,
    }
}

pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let r = rgb[0] as f32 / 255.0;
    let g = rgb[1] as f32 / 255.0;
    let b = rgb[2] as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta <= f32::EPSILON {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let s = if max <= f32::EPSILON { 0.0 } else { delta / max };

    Hsv { h, s, v: max }
}

/// CIEDE2000 color difference.
///
/// Full formula including the chroma/hue weighting functions and the
/// rotation term. Euclidean Lab distance conflates red/orange/yellow under
/// real lighting, so the classifier relies on this metric exclusively.
pub fn ciede2000(x: Lab, y: Lab) -> f32 {
    let (l1, a1, b1) = (x.l as f64, x.a as f64, x.b as f64);
    let (l2, a2, b2) = (y.l as f64, y.a as f64, y.b as f64);

    const POW7_25: f64 = 6103515625.0; // 25^7

    let c1 = (a1 * a1 + b1 * b1).sqrt();
    let c2 = (a2 * a2 + b2 * b2).sqrt();
    let c_bar = (c1 + c2) / 2.0;

    let c_bar7 = c_bar.powi(7);
    let g = 0.5 * (1.0 - (c_bar7 / (c_bar7 + POW7_25)).sqrt());

    let a1p = (1.0 + g) * a1;
    let a2p = (1.0 + g) * a2;
    let c1p = (a1p * a1p + b1 * b1).sqrt();
    let c2p = (a2p * a2p + b2 * b2).sqrt();

    let h1p = if c1p.abs() < 1e-12 {
        0.0
    } else {
        let h = b1.atan2(a1p).to_degrees();
        if h < 0.0 {
            h + 360.0
        } else {
            h
        }
    };
    let h2p = if c2p.abs() < 1e-12 {
        0.0
    } else {
        let h = b2.atan2(a2p).to_degrees();
        if h < 0.0 {
            h + 360.0
        } else {
            h
        }
    };

    let dl_p = l2 - l1;
    let dc_p = c2p - c1p;

    let dh_p = if c1p * c2p == 0.0 {
        0.0
    } else {
        let mut dh = h2p - h1p;
        if dh > 180.0 {
            dh -= 360.0;
        } else if dh < -180.0 {
            dh += 360.0;
        }
        dh
    };
    let dbig_h_p = 2.0 * (c1p * c2p).sqrt() * (dh_p / 2.0).to_radians().sin();

    let l_bar_p = (l1 + l2) / 2.0;
    let c_bar_p = (c1p + c2p) / 2.0;

    let h_bar_p = if c1p * c2p == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        (h1p + h2p) / 2.0
    } else if h1p + h2p < 360.0 {
        (h1p + h2p + 360.0) / 2.0
    } else {
        (h1p + h2p - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (h_bar_p - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_bar_p).to_radians().cos()
        + 0.32 * (3.0 * h_bar_p + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_bar_p - 63.0).to_radians().cos();

    let d_theta = 30.0 * (-((h_bar_p - 275.0) / 25.0).powi(2)).exp();
    let c_bar_p7 = c_bar_p.powi(7);
    let r_c = 2.0 * (c_bar_p7 / (c_bar_p7 + POW7_25)).sqrt();
    let r_t = -r_c * (2.0 * d_theta).to_radians().sin();

    let l_term = (l_bar_p - 50.0).powi(2);
    let s_l = 1.0 + 0.015 * l_term / (20.0 + l_term).sqrt();
    let s_c = 1.0 + 0.045 * c_bar_p;
    let s_h = 1.0 + 0.015 * c_bar_p * t;

    let dl = dl_p / s_l;
    let dc = dc_p / s_c;
    let dh = dbig_h_p / s_h;

    ((dl * dl + dc * dc + dh * dh + r_t * dc * dh).sqrt()) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn white_maps_to_lab_origin_chroma() {
        let lab = srgb_to_lab([255, 255, 255]);
        assert_relative_eq!(lab.l, 100.0, epsilon = 0.1);
        assert!(lab.a.abs() < 0.1);
        assert!(lab.b.abs() < 0.1);
    }

    #[test]
    fn black_has_zero_lightness() {
        let lab = srgb_to_lab([0, 0, 0]);
        assert!(lab.l.abs() < 1e-3);
    }

    #[test]
    fn ciede2000_is_zero_for_identical_and_symmetric() {
        let red = srgb_to_lab([255, 0, 0]);
        let green = srgb_to_lab([0, 255, 0]);
        assert!(ciede2000(red, red) < 1e-6);
        assert_relative_eq!(ciede2000(red, green), ciede2000(green, red), epsilon = 1e-5);
    }

    #[test]
    fn ciede2000_published_pair() {
        // Sharma et al. (2005) test pair #1.
        let a = Lab {
            l: 50.0,
            a: 2.6772,
            b: -79.7751,
        };
        let b = Lab {
            l: 50.0,
            a: 0.0,
            b: -82.7485,
        };
        assert_relative_eq!(ciede2000(a, b), 2.0425, epsilon = 1e-3);
    }

    #[test]
    fn red_is_closer_to_orange_than_to_green() {
        let red = StickerColor::Red.reference_lab();
        let orange = StickerColor::Orange.reference_lab();
        let green = StickerColor::Green.reference_lab();
        assert!(ciede2000(red, orange) < ciede2000(red, green));
    }

    #[test]
    fn hsv_of_primaries() {
        let red = rgb_to_hsv([255, 0, 0]);
        assert_relative_eq!(red.h, 0.0, epsilon = 1e-3);
        assert_relative_eq!(red.s, 1.0, epsilon = 1e-6);

        let gray = rgb_to_hsv([128, 128, 128]);
        assert!(gray.s < 1e-6);
        assert_relative_eq!(gray.v, 128.0 / 255.0, epsilon = 1e-6);
    }

    #[test]
    fn face_letters_follow_urfdlb_order() {
        let letters: String = FaceId::FACELET_ORDER.iter().map(|f| f.letter()).collect();
        assert_eq!(letters, "URFDLB");
    }
}
