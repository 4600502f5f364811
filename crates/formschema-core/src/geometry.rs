/// Bounding box in a single page's coordinate space, origin bottom-left.
///
/// Coordinates follow the PDF `/Rect` convention:
/// - `left`: left edge
/// - `top`: top edge (larger y is higher on the page)
/// - `right`: right edge
/// - `bottom`: bottom edge
///
/// `right >= left` and `top >= bottom` are not enforced; producers
/// occasionally emit degenerate rects and every consumer tolerates
/// zero-area or inverted boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build a box from a PDF rectangle `[x0 y0 x1 y1]` without normalizing it.
    pub fn from_pdf_rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(x0, y1, x1, y0)
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    /// Center point as `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        (self.center_x(), self.center_y())
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Euclidean distance between the centers of two boxes.
    pub fn center_distance(&self, other: &BoundingBox) -> f64 {
        let dx = self.center_x() - other.center_x();
        let dy = self.center_y() - other.center_y();
        dx.hypot(dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pdf_rect_maps_corners() {
        let bbox = BoundingBox::from_pdf_rect(72.0, 700.0, 272.0, 720.0);
        assert_eq!(bbox.left, 72.0);
        assert_eq!(bbox.bottom, 700.0);
        assert_eq!(bbox.right, 272.0);
        assert_eq!(bbox.top, 720.0);
    }

    #[test]
    fn dimensions_and_center() {
        let bbox = BoundingBox::new(10.0, 60.0, 50.0, 20.0);
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 40.0);
        assert_eq!(bbox.center(), (30.0, 40.0));
    }

    #[test]
    fn degenerate_box_is_tolerated() {
        let bbox = BoundingBox::new(100.0, 700.0, 100.0, 700.0);
        assert_eq!(bbox.width(), 0.0);
        assert_eq!(bbox.height(), 0.0);
        assert_eq!(bbox.center(), (100.0, 700.0));
    }

    #[test]
    fn center_distance_is_euclidean() {
        let a = BoundingBox::new(0.0, 10.0, 10.0, 0.0);
        let b = BoundingBox::new(30.0, 50.0, 40.0, 40.0);
        assert!((a.center_distance(&b) - 50.0).abs() < 1e-9);
    }
}
