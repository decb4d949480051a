/// Zeroth and first-order spatial moments of a closed contour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl RawMoments {
    /// Green's theorem over the polygon `points`, closed back to the first
    /// vertex. Orientation does not matter; the area comes out non-negative.
    pub fn from_polygon(points: &[(f64, f64)]) -> Self {
        let mut moments = Self::default();
        if points.len() < 3 {
            return moments;
        }
        for (i, &(x0, y0)) in points.iter().enumerate() {
            let (x1, y1) = points[(i + 1) % points.len()];
            let cross = x0 * y1 - x1 * y0;
            moments.m00 += cross;
            moments.m10 += (x0 + x1) * cross;
            moments.m01 += (y0 + y1) * cross;
        }
        moments.m00 /= 2.0;
        moments.m10 /= 6.0;
        moments.m01 /= 6.0;
        if moments.m00 < 0.0 {
            moments.m00 = -moments.m00;
            moments.m10 = -moments.m10;
            moments.m01 = -moments.m01;
        }
        moments
    }

    pub fn area(&self) -> f64 {
        self.m00
    }

    /// `(m10 / m00, m01 / m00)`, or `None` for a contour enclosing no area.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 <= f64::EPSILON {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_region_has_no_centroid() {
        assert_eq!(RawMoments::default().centroid(), None);
    }

    #[test]
    fn rectangle_centroid_is_its_center() {
        let corners = [(100.0, 10.0), (139.0, 10.0), (139.0, 19.0), (100.0, 19.0)];
        let moments = RawMoments::from_polygon(&corners);
        assert_eq!(moments.area(), 351.0);
        assert_eq!(moments.centroid(), Some((119.5, 14.5)));
    }

    #[test]
    fn orientation_does_not_flip_area() {
        let clockwise = [(0.0, 0.0), (0.0, 4.0), (6.0, 4.0), (6.0, 0.0)];
        let moments = RawMoments::from_polygon(&clockwise);
        assert_eq!(moments.area(), 24.0);
        assert_eq!(moments.centroid(), Some((3.0, 2.0)));
    }

    #[test]
    fn collapsed_contours_are_degenerate() {
        assert_eq!(RawMoments::from_polygon(&[(5.0, 5.0)]).centroid(), None);
        let stroke = [(3.0, 0.0), (3.0, 1.0), (3.0, 2.0), (3.0, 1.0)];
        assert_eq!(RawMoments::from_polygon(&stroke).centroid(), None);
    }
}
