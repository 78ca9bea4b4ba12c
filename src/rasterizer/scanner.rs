//! Scanline triangle fill (§4.E): accumulates the leftmost/rightmost
//! [`Point`] crossing each scanline as edges are fed in, then sweeps every
//! touched row into the [`Canvas`].

use super::{Canvas, Point};

/// The leftmost and rightmost crossing [`Point`]s recorded so far on one
/// scanline.
#[derive(Clone)]
struct Pair {
    left: Point,
    right: Point,
}

/// Accumulates edge crossings scanline-by-scanline and fills the spans
/// between them into a [`Canvas`].
pub struct Scanner {
    pairs: Vec<Option<Pair>>,
    y_bottom: i64,
    y_top: i64,
    touched: bool,
}

impl Scanner {
    /// Builds a scanner covering `height` scanlines, none yet touched.
    pub fn new(height: u32) -> Self {
        Scanner {
            pairs: vec![None; height as usize],
            y_bottom: i64::MAX,
            y_top: i64::MIN,
            touched: false,
        }
    }

    /// Feeds one triangle edge `pt0 -> pt1`, recording its crossing on every
    /// scanline it spans. Horizontal edges (`floor(y0) == floor(y1)`)
    /// contribute no vertical coverage and are skipped; their span is
    /// already covered by the triangle's other two edges.
    pub fn build_edge(&mut self, pt0: &Point, pt1: &Point) {
        let (bottom, top) = if pt0.p.y() <= pt1.p.y() { (pt0, pt1) } else { (pt1, pt0) };
        let y_b = bottom.p.y().floor() as i64;
        let y_t = top.p.y().ceil() as i64;
        if y_b >= y_t {
            return;
        }
        let span = top.p.y() - bottom.p.y();
        for y in y_b..=y_t {
            let y = y.clamp(0, self.pairs.len() as i64 - 1);
            let alpha = if span.abs() < crate::math::TOL {
                0.0
            } else {
                ((y as f64 - bottom.p.y()) / span).clamp(0.0, 1.0)
            };
            let pt = Point::blend(bottom, top, alpha);
            self.push_point(y, pt);
        }
    }

    fn push_point(&mut self, y: i64, pt: Point) {
        if y < 0 || y as usize >= self.pairs.len() {
            return;
        }
        self.y_bottom = self.y_bottom.min(y);
        self.y_top = self.y_top.max(y);
        self.touched = true;
        let idx = y as usize;
        match &mut self.pairs[idx] {
            None => {
                self.pairs[idx] = Some(Pair {
                    left: pt.clone(),
                    right: pt,
                });
            }
            Some(pair) => {
                if pt.p.x() < pair.left.p.x() {
                    pair.left = pt.clone();
                }
                if pt.p.x() > pair.right.p.x() {
                    pair.right = pt;
                }
            }
        }
    }

    /// Fills every touched scanline's left-right span into `canvas`.
    pub fn scan(&self, canvas: &mut Canvas) {
        if !self.touched {
            return;
        }
        for y in self.y_bottom..=self.y_top {
            if let Some(pair) = &self.pairs[y as usize] {
                Self::scan_line(&pair.left, &pair.right, y, canvas);
            }
        }
    }

    fn scan_line(left: &Point, right: &Point, y: i64, canvas: &mut Canvas) {
        let x0 = left.p.x().floor() as i64;
        let x1 = right.p.x().ceil() as i64;
        if x1 <= x0 {
            canvas.plot(x0, y, &left.plot);
            return;
        }
        let span = right.p.x() - left.p.x();
        for x in x0..=x1 {
            let alpha = if span.abs() < crate::math::TOL {
                0.0
            } else {
                ((x as f64 - left.p.x()) / span).clamp(0.0, 1.0)
            };
            let pt = Point::blend(left, right, alpha);
            canvas.plot(x, y, &pt.plot);
        }
    }

    /// Sweeps accumulated spans into `canvas`, then clears this scanner's
    /// state so it can be reused for the next triangle.
    pub fn scan_reset(&mut self, canvas: &mut Canvas) {
        self.scan(canvas);
        for pair in self.pairs.iter_mut() {
            *pair = None;
        }
        self.y_bottom = i64::MAX;
        self.y_top = i64::MIN;
        self.touched = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::math::Vector2;
    use crate::rasterizer::{LayerKind, Variable};

    fn point(x: f64, y: f64, scalar: f64) -> Point {
        Point::new(Vector2::new(x, y), vec![Variable::Scalar(scalar)])
    }

    #[test]
    fn triangle_fill_covers_interior_and_clears_mask() {
        let mut canvas = Canvas::new(8, 8, &[LayerKind::Scalar]);
        let mut scanner = Scanner::new(8);

        let a = point(1.0, 1.0, 1.0);
        let b = point(5.0, 1.0, 1.0);
        let c = point(1.0, 5.0, 1.0);

        scanner.build_edge(&a, &b);
        scanner.build_edge(&b, &c);
        scanner.build_edge(&c, &a);
        scanner.scan_reset(&mut canvas);

        let idx = canvas.xy(2, 2);
        assert_eq!(canvas.layer(0)[idx], Variable::Scalar(1.0));

        let idx_outside = canvas.xy(7, 7);
        assert_eq!(canvas.layer(0)[idx_outside], Variable::Scalar(0.0));

        // state cleared for next triangle
        scanner.scan(&mut canvas);
    }

    #[test]
    fn degenerate_horizontal_edge_is_skipped() {
        let mut scanner = Scanner::new(4);
        let a = point(0.0, 2.0, 0.0);
        let b = point(4.0, 2.0, 0.0);
        scanner.build_edge(&a, &b);
        assert!(!scanner.touched);
    }

    #[test]
    fn blend_carries_color_layer() {
        let mut canvas = Canvas::new(4, 1, &[LayerKind::Color]);
        let mut scanner = Scanner::new(1);
        let a = Point::new(Vector2::new(0.0, 0.0), vec![Variable::Color(Color::BLACK)]);
        let b = Point::new(Vector2::new(0.0, 1.0), vec![Variable::Color(Color::WHITE)]);
        let c = Point::new(Vector2::new(3.0, 0.5), vec![Variable::Color(Color::WHITE)]);
        scanner.build_edge(&a, &b);
        scanner.build_edge(&b, &c);
        scanner.build_edge(&c, &a);
        scanner.scan_reset(&mut canvas);
        let idx = canvas.xy(0, 0);
        assert_eq!(canvas.layer(0)[idx], Variable::Color(Color::BLACK));
    }
}
