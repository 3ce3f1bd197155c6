use tenebra_math::matrix::Matrix4f;

pub const MIN_ZOOM: f32 = 10.0;
pub const MAX_ZOOM: f32 = 24.0;
pub const INITIAL_VIEW_EXTENT: f32 = 11.5;
pub const VIEW_DEPTH: f32 = 80.0;

/// Rows kept free at the bottom of the screen when sizing the view volume.
const PROJECTION_HEIGHT_MARGIN: f32 = 20.0;

/// Zoom state of the orthographic camera.
///
/// The extent is the width of world space visible on screen and always stays
/// within `MIN_ZOOM..=MAX_ZOOM`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    extent: f32,
}

impl ViewState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            extent: INITIAL_VIEW_EXTENT,
        }
    }

    #[must_use]
    pub fn extent(&self) -> f32 {
        self.extent
    }

    pub fn set_extent(&mut self, extent: f32) {
        self.extent = extent.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_by(&mut self, delta: f32) {
        self.set_extent(self.extent + delta);
    }

    /// Left-handed orthographic projection for a screen of the given size.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn projection(&self, screen_width: u32, screen_height: u32) -> Matrix4f {
        let depth = VIEW_DEPTH * 4.0;
        let height = self.extent * (screen_height as f32 - PROJECTION_HEIGHT_MARGIN)
            / screen_width as f32;
        Matrix4f::new_orthographic_lh(self.extent, height, -depth / 2.0, depth / 2.0)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    fn initial_extent() {
        assert_float_absolute_eq!(ViewState::new().extent(), 11.5, 0.0);
    }

    #[test]
    fn set_extent_clamps() {
        let mut view = ViewState::new();

        view.set_extent(5.0);
        assert_float_absolute_eq!(view.extent(), 10.0, 0.0);

        view.set_extent(100.0);
        assert_float_absolute_eq!(view.extent(), 24.0, 0.0);

        view.set_extent(17.25);
        assert_float_absolute_eq!(view.extent(), 17.25, 0.0);
    }

    #[test]
    fn zoom_by_saturates() {
        let mut view = ViewState::new();

        for _ in 0..50 {
            view.zoom_by(1.0);
        }
        assert_float_absolute_eq!(view.extent(), MAX_ZOOM, 0.0);

        for _ in 0..50 {
            view.zoom_by(-1.0);
        }
        assert_float_absolute_eq!(view.extent(), MIN_ZOOM, 0.0);

        view.zoom_by(2.5);
        assert_float_absolute_eq!(view.extent(), 12.5, 0.0001);
    }

    #[test]
    fn projection_800x600() {
        let view = ViewState::new();

        let projection = view.projection(800, 600);

        let height = 11.5 * 580.0 / 800.0;
        assert_float_absolute_eq!(projection[0][0], 2.0 / 11.5, 0.0001);
        assert_float_absolute_eq!(projection[1][1], 2.0 / height, 0.0001);
        assert_float_absolute_eq!(projection[2][2], 1.0 / 320.0, 0.000_001);
        assert_float_absolute_eq!(projection[3][2], 0.5, 0.0001);
        assert_float_absolute_eq!(projection[3][3], 1.0, 0.0);
        assert_float_absolute_eq!(projection[0][1], 0.0, 0.0);
        assert_float_absolute_eq!(projection[3][0], 0.0, 0.0);
    }

    #[test]
    fn projection_follows_extent() {
        let mut view = ViewState::new();
        view.set_extent(20.0);

        let projection = view.projection(1024, 768);

        assert_float_absolute_eq!(projection[0][0], 0.1, 0.0001);
    }
}
