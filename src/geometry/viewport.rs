//! Page-space to viewport-space affine transform
//!
//! Page space is PDF user space (origin bottom-left, y up). The viewport is
//! the rendered page (origin top-left, y down) at a given scale and rotation.

use serde::{Deserialize, Serialize};

use super::types::Rect;

/// Affine matrix `[a, b, c, d, e, f]` mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform(pub [f64; 6]);

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Transform a rectangle given by two page-space corners and normalize
    /// the result so width and height are non-negative.
    pub fn convert_rect(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        let (vx0, vy0) = self.apply(x0, y0);
        let (vx1, vy1) = self.apply(x1, y1);
        Rect::from_corners(vx0, vy0, vx1, vy1)
    }
}

/// Page rotation in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalize any multiple of 90 degrees; other angles snap down
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) / 90 {
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            3 => Rotation::Deg270,
            _ => Rotation::Deg0,
        }
    }

    /// Unit rotation matrix entries `(a, b, c, d)` including the y flip
    fn basis(self) -> (f64, f64, f64, f64) {
        match self {
            Rotation::Deg0 => (1.0, 0.0, 0.0, -1.0),
            Rotation::Deg90 => (0.0, 1.0, 1.0, 0.0),
            Rotation::Deg180 => (-1.0, 0.0, 0.0, 1.0),
            Rotation::Deg270 => (0.0, -1.0, -1.0, 0.0),
        }
    }
}

/// Rendered page geometry: viewport size plus the page→viewport transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageViewport {
    pub width: f64,
    pub height: f64,
    pub transform: ViewportTransform,
}

impl PageViewport {
    /// Build the viewport for a page `view_box = [x0, y0, x1, y1]`.
    pub fn new(view_box: [f64; 4], scale: f64, rotation: Rotation) -> Self {
        let [x0, y0, x1, y1] = view_box;
        let center_x = (x1 + x0) / 2.0;
        let center_y = (y1 + y0) / 2.0;
        let (ra, rb, rc, rd) = rotation.basis();

        let (offset_x, offset_y, width, height) = if ra == 0.0 {
            (
                (center_y - y0).abs() * scale,
                (center_x - x0).abs() * scale,
                (y1 - y0).abs() * scale,
                (x1 - x0).abs() * scale,
            )
        } else {
            (
                (center_x - x0).abs() * scale,
                (center_y - y0).abs() * scale,
                (x1 - x0).abs() * scale,
                (y1 - y0).abs() * scale,
            )
        };

        let transform = ViewportTransform([
            ra * scale,
            rb * scale,
            rc * scale,
            rd * scale,
            offset_x - ra * scale * center_x - rc * scale * center_y,
            offset_y - rb * scale * center_x - rd * scale * center_y,
        ]);

        Self { width, height, transform }
    }

    /// Unrotated page of `page_width` x `page_height` at `scale`
    pub fn upright(page_width: f64, page_height: f64, scale: f64) -> Self {
        Self::new([0.0, 0.0, page_width, page_height], scale, Rotation::Deg0)
    }
}
