use nalgebra::Point2;

/// One connected region of a binary mask, with the statistics the grid
/// search needs: centroid, area, bounding box, and boundary length.
#[derive(Clone, Copy, Debug)]
pub struct Region {
    pub area: usize,
    pub perimeter: usize,
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
    sum_x: f64,
    sum_y: f64,
}

impl Region {
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(
            (self.sum_x / self.area as f64) as f32,
            (self.sum_y / self.area as f64) as f32,
        )
    }

    /// Short side over long side of the bounding box, in 0..=1.
    pub fn aspect_ratio(&self) -> f32 {
        let w = self.width() as f32;
        let h = self.height() as f32;
        w.min(h) / w.max(h)
    }

    /// Fraction of the bounding box covered by the region.
    pub fn extent(&self) -> f32 {
        self.area as f32 / (self.width() * self.height()) as f32
    }

    /// 4*pi*A / P^2 with P counted in boundary edges. Compact regions score
    /// near 0.8; ragged or elongated regions score low.
    pub fn circularity(&self) -> f32 {
        if self.perimeter == 0 {
            return 0.0;
        }
        let p = self.perimeter as f32;
        (4.0 * std::f32::consts::PI * self.area as f32 / (p * p)).min(1.0)
    }

    /// Approximate side length assuming a square region.
    pub fn side(&self) -> f32 {
        (self.area as f32).sqrt()
    }

    pub fn contains(&self, p: Point2<f32>) -> bool {
        p.x >= self.min_x as f32
            && p.x <= self.max_x as f32
            && p.y >= self.min_y as f32
            && p.y <= self.max_y as f32
    }
}

/// Extract 4-connected components of non-zero mask pixels.
///
/// Components smaller than `min_area` pixels are dropped. The mask buffer is
/// not modified; labeling state lives in a scratch buffer scoped to this
/// call. The perimeter is the count of pixel edges facing zero or
/// out-of-bounds neighbors.
pub fn connected_components(
    mask: &[u8],
    width: usize,
    height: usize,
    min_area: usize,
) -> Vec<Region> {
    debug_assert_eq!(mask.len(), width * height);

    let mut visited = vec![false; mask.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut out = Vec::new();

    for start_y in 0..height {
        for start_x in 0..width {
            let start = start_y * width + start_x;
            if visited[start] || mask[start] == 0 {
                continue;
            }

            let mut region = Region {
                area: 0,
                perimeter: 0,
                min_x: start_x,
                min_y: start_y,
                max_x: start_x,
                max_y: start_y,
                sum_x: 0.0,
                sum_y: 0.0,
            };

            visited[start] = true;
            stack.push((start_x, start_y));

            while let Some((x, y)) = stack.pop() {
                region.area += 1;
                region.sum_x += x as f64;
                region.sum_y += y as f64;
                region.min_x = region.min_x.min(x);
                region.min_y = region.min_y.min(y);
                region.max_x = region.max_x.max(x);
                region.max_y = region.max_y.max(y);

                let neighbors = [
                    (x.wrapping_sub(1), y),
                    (x + 1, y),
                    (x, y.wrapping_sub(1)),
                    (x, y + 1),
                ];
                for (nx, ny) in neighbors {
                    if nx >= width || ny >= height {
                        region.perimeter += 1;
                        continue;
                    }
                    let ni = ny * width + nx;
                    if mask[ni] == 0 {
                        region.perimeter += 1;
                    } else if !visited[ni] {
                        visited[ni] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if region.area >= min_area {
                out.push(region);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> (Vec<u8>, usize, usize) {
        let h = rows.len();
        let w = rows[0].len();
        let mut mask = Vec::with_capacity(w * h);
        for row in rows {
            for c in row.chars() {
                mask.push(if c == '#' { 1 } else { 0 });
            }
        }
        (mask, w, h)
    }

    #[test]
    fn finds_separate_regions_with_stats() {
        let (mask, w, h) = mask_from(&[
            "##...", //
            "##...", //
            "....#", //
            "....#", //
        ]);
        let mut regions = connected_components(&mask, w, h, 1);
        regions.sort_by_key(|r| r.min_x);
        assert_eq!(regions.len(), 2);

        let big = &regions[0];
        assert_eq!(big.area, 4);
        assert_eq!((big.width(), big.height()), (2, 2));
        assert!((big.center().x - 0.5).abs() < 1e-5);
        assert!((big.extent() - 1.0).abs() < 1e-5);

        let thin = &regions[1];
        assert_eq!(thin.area, 2);
        assert!(thin.aspect_ratio() < 0.6);
    }

    #[test]
    fn min_area_filters_specks() {
        let (mask, w, h) = mask_from(&[
            "#..", //
            "...", //
            ".##", //
        ]);
        let regions = connected_components(&mask, w, h, 2);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 2);
    }

    #[test]
    fn diagonal_pixels_are_not_connected() {
        let (mask, w, h) = mask_from(&[
            "#.", //
            ".#", //
        ]);
        let regions = connected_components(&mask, w, h, 1);
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn perimeter_counts_exposed_edges() {
        let (mask, w, h) = mask_from(&[
            "##", //
            "##", //
        ]);
        let regions = connected_components(&mask, w, h, 1);
        assert_eq!(regions[0].perimeter, 8);

        // A thin line exposes almost all of its edges: 2*9 + 2 of them.
        let (line, lw, lh) = mask_from(&["#########"]);
        let ln = connected_components(&line, lw, lh, 1);
        assert_eq!(ln[0].perimeter, 20);
        assert!(ln[0].circularity() < 0.3);
    }

    #[test]
    fn filled_square_is_rounder_than_a_line() {
        let (sq_mask, w, h) = mask_from(&[
            ".....", //
            ".###.", //
            ".###.", //
            ".###.", //
            ".....", //
        ]);
        let sq = connected_components(&sq_mask, w, h, 1);

        let (ln_mask, lw, lh) = mask_from(&["#########"]);
        let ln = connected_components(&ln_mask, lw, lh, 1);

        assert!(sq[0].circularity() > ln[0].circularity());
    }
}
