/// Borrowed view over a packed RGB frame supplied by an external capture
/// source. The scanning core never owns or decodes camera frames.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major RGB, len = w*h*3
}

/// Owned RGB buffer, used for downscaled working copies.
#[derive(Clone, Debug)]
pub struct RgbFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbFrame {
    pub fn view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

#[inline]
fn get_rgb(src: &RgbImageView<'_>, x: i32, y: i32) -> [u8; 3] {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return [0, 0, 0];
    }
    let i = (y as usize * src.width + x as usize) * 3;
    [src.data[i], src.data[i + 1], src.data[i + 2]]
}

impl<'a> RgbImageView<'a> {
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        get_rgb(self, x as i32, y as i32)
    }
}

#[inline]
pub fn sample_bilinear_rgb(src: &RgbImageView<'_>, x: f32, y: f32) -> [f32; 3] {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    let mut out = [0.0f32; 3];
    for c in 0..3 {
        let a = p00[c] as f32 + fx * (p10[c] as f32 - p00[c] as f32);
        let b = p01[c] as f32 + fx * (p11[c] as f32 - p01[c] as f32);
        out[c] = a + fy * (b - a);
    }
    out
}

/// Rec.601 luma of one RGB pixel.
#[inline]
pub fn luma_u8(rgb: [u8; 3]) -> u8 {
    let y = 0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32;
    y.clamp(0.0, 255.0) as u8
}

/// Downscale so the longer side is at most `max_side` pixels.
///
/// Returns the working copy plus the scale factor that maps downscaled
/// coordinates back to the source frame. A frame already small enough is
/// copied unchanged with scale 1.
pub fn downscale_rgb(src: &RgbImageView<'_>, max_side: usize) -> (RgbFrame, f32) {
    let long = src.width.max(src.height);
    if long <= max_side || max_side == 0 {
        return (
            RgbFrame {
                width: src.width,
                height: src.height,
                data: src.data.to_vec(),
            },
            1.0,
        );
    }

    let scale = long as f32 / max_side as f32;
    let out_w = (src.width as f32 / scale).round().max(1.0) as usize;
    let out_h = (src.height as f32 / scale).round().max(1.0) as usize;

    let mut data = Vec::with_capacity(out_w * out_h * 3);
    for y in 0..out_h {
        for x in 0..out_w {
            let sx = (x as f32 + 0.5) * scale - 0.5;
            let sy = (y as f32 + 0.5) * scale - 0.5;
            let p = sample_bilinear_rgb(src, sx, sy);
            data.push(p[0].clamp(0.0, 255.0) as u8);
            data.push(p[1].clamp(0.0, 255.0) as u8);
            data.push(p[2].clamp(0.0, 255.0) as u8);
        }
    }

    (
        RgbFrame {
            width: out_w,
            height: out_h,
            data,
        },
        scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: usize, h: usize, rgb: [u8; 3]) -> RgbFrame {
        let mut data = Vec::with_capacity(w * h * 3);
        for _ in 0..w * h {
            data.extend_from_slice(&rgb);
        }
        RgbFrame {
            width: w,
            height: h,
            data,
        }
    }

    #[test]
    fn out_of_bounds_reads_black() {
        let f = solid(4, 4, [200, 100, 50]);
        assert_eq!(get_rgb(&f.view(), -1, 0), [0, 0, 0]);
        assert_eq!(get_rgb(&f.view(), 4, 2), [0, 0, 0]);
        assert_eq!(get_rgb(&f.view(), 1, 1), [200, 100, 50]);
    }

    #[test]
    fn bilinear_interpolates_between_neighbors() {
        let mut f = solid(2, 1, [0, 0, 0]);
        f.data[3] = 100; // pixel (1,0) red channel
        let mid = sample_bilinear_rgb(&f.view(), 0.5, 0.0);
        assert!((mid[0] - 50.0).abs() < 1e-3);
    }

    #[test]
    fn downscale_bounds_long_side_and_reports_scale() {
        let f = solid(640, 480, [10, 20, 30]);
        let (small, scale) = downscale_rgb(&f.view(), 320);
        assert_eq!(small.width, 320);
        assert_eq!(small.height, 240);
        assert!((scale - 2.0).abs() < 1e-6);
        assert_eq!(small.view().pixel(10, 10), [10, 20, 30]);
    }

    #[test]
    fn downscale_noop_for_small_frames() {
        let f = solid(100, 80, [1, 2, 3]);
        let (same, scale) = downscale_rgb(&f.view(), 320);
        assert_eq!((same.width, same.height), (100, 80));
        assert_eq!(scale, 1.0);
    }
}
