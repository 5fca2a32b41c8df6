use serde::{Deserialize, Serialize};

/// Size of the render surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Zero dimensions are clamped to 1 so the aspect ratio stays finite.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_is_width_over_height() {
        let v = Viewport::new(1920, 1080);
        assert!((v.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn zero_height_is_clamped() {
        let v = Viewport::new(0, 0);
        assert_eq!(v, Viewport::new(1, 1));
        assert_eq!(v.aspect(), 1.0);
    }
}
