//! Viewport state: window dimensions and device pixel ratio.
//!
//! Pure state synchronization. The camera aspect always tracks the window
//! exactly; the surface is sized in device pixels with the pixel ratio capped
//! to bound GPU cost on high-DPI displays.

/// Device pixel ratios above this are clamped when sizing the surface.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Current window dimensions (physical pixels, as reported by the host) plus
/// the device scale factor.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    width: u32,
    height: u32,
    scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            scale_factor,
        }
    }

    /// Record a window resize. Zero-sized updates are ignored; the host emits
    /// them while minimizing and the surface must keep its last valid size.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Camera aspect ratio: exactly width / height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Surface dimensions in device pixels, with the pixel ratio capped at
    /// [`MAX_PIXEL_RATIO`].
    pub fn surface_size(&self) -> (u32, u32) {
        let ratio = if self.scale_factor > MAX_PIXEL_RATIO {
            MAX_PIXEL_RATIO / self.scale_factor
        } else {
            1.0
        };
        (
            ((self.width as f64 * ratio) as u32).max(1),
            ((self.height as f64 * ratio) as u32).max(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_is_exactly_width_over_height() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        assert!(viewport.resize(1920, 1080));
        assert_eq!(viewport.aspect(), 1920.0 / 1080.0);
        assert_eq!(viewport.surface_size(), (1920, 1080));
    }

    #[test]
    fn zero_resize_is_ignored() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        assert!(!viewport.resize(0, 600));
        assert_eq!(viewport.surface_size(), (800, 600));
    }

    #[test]
    fn pixel_ratio_is_capped_at_two() {
        // A 3x display reporting 3000x1500 physical pixels renders as if 2x.
        let viewport = Viewport::new(3000, 1500, 3.0);
        assert_eq!(viewport.surface_size(), (2000, 1000));

        let viewport = Viewport::new(1600, 1200, 2.0);
        assert_eq!(viewport.surface_size(), (1600, 1200));
    }
}
