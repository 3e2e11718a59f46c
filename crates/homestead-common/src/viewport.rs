//! Viewport rectangle used for render culling.

use serde::{Deserialize, Serialize};

use crate::coords::PixelCoord;

/// A world-pixel-space rectangle describing what the camera can see.
///
/// Sprites are anchored at their bottom-left corner and extend toward
/// +x/+y, so visibility tests inflate only the low sides: an anchor a
/// little below or left of the viewport can still have pixels inside it,
/// while an anchor past the top-right edge cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Bottom-left corner in world pixel space
    pub min: PixelCoord,
    /// Width in pixels
    pub width: i64,
    /// Height in pixels
    pub height: i64,
}

impl Viewport {
    /// Creates a new viewport.
    #[must_use]
    pub const fn new(min: PixelCoord, width: i64, height: i64) -> Self {
        Self { min, width, height }
    }

    /// Top-right corner in world pixel space.
    #[must_use]
    pub const fn max(&self) -> PixelCoord {
        PixelCoord::new(self.min.x + self.width, self.min.y + self.height)
    }

    /// Tests whether a sprite anchored at `anchor` can intersect the
    /// viewport, given that it extends up to `overhang` pixels toward
    /// +x/+y from its anchor.
    #[must_use]
    pub const fn sees(&self, anchor: PixelCoord, overhang: i64) -> bool {
        let max = self.max();
        anchor.x + overhang >= self.min.x
            && anchor.x <= max.x
            && anchor.y + overhang >= self.min.y
            && anchor.y <= max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sees_inside() {
        let view = Viewport::new(PixelCoord::new(0, 0), 1280, 720);
        assert!(view.sees(PixelCoord::new(100, 100), 64));
        assert!(view.sees(PixelCoord::new(0, 0), 64));
        assert!(view.sees(PixelCoord::new(1280, 720), 64));
    }

    #[test]
    fn test_sees_low_side_overhang() {
        let view = Viewport::new(PixelCoord::new(0, 0), 1280, 720);
        // Anchor below/left of the viewport, sprite reaches in.
        assert!(view.sees(PixelCoord::new(-64, 10), 128));
        assert!(view.sees(PixelCoord::new(10, -128), 128));
        assert!(!view.sees(PixelCoord::new(-129, 10), 128));
    }

    #[test]
    fn test_sees_high_side_cutoff() {
        let view = Viewport::new(PixelCoord::new(0, 0), 1280, 720);
        // No inflation past the top-right edge.
        assert!(!view.sees(PixelCoord::new(1281, 10), 128));
        assert!(!view.sees(PixelCoord::new(10, 721), 128));
    }

    #[test]
    fn test_sees_negative_space_viewport() {
        let view = Viewport::new(PixelCoord::new(-2000, -2000), 1000, 1000);
        assert!(view.sees(PixelCoord::new(-1500, -1500), 64));
        assert!(!view.sees(PixelCoord::new(0, 0), 64));
    }
}
