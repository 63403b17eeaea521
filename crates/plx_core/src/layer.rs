//! Parallax layers and the scroll math that drives them.
//!
//! A layer is a full-width textured band. Its texture coordinates are shifted
//! horizontally by an amount proportional to how far the player has walked
//! away from the screen centre, scaled by the layer's `scroll_speed`. Far
//! layers use small factors, near layers approach 1.0.

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Key into the texture registry.
    pub name: String,
    pub scroll_speed: f32,
    /// Bottom edge of the band, in screen pixels from the bottom.
    pub y_position: f32,
    pub height: f32,
}

impl Layer {
    pub fn new(name: &str, scroll_speed: f32, y_position: f32, height: f32) -> Self {
        Self {
            name: name.to_string(),
            scroll_speed,
            y_position,
            height,
        }
    }

    /// Horizontal scroll in pixels for the given player position.
    pub fn scroll_pixels(&self, player_x: f32, screen_width: f32) -> f32 {
        (player_x - screen_width / 2.0) * self.scroll_speed
    }

    /// Horizontal scroll expressed as a texture-coordinate offset.
    pub fn scroll_uv(&self, player_x: f32, screen_width: f32) -> f32 {
        self.scroll_pixels(player_x, screen_width) / screen_width
    }

    /// Maps the unit quad onto the layer band: translate then scale.
    pub fn model_matrix(&self, screen_width: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, self.y_position, 0.0))
            * Mat4::from_scale(Vec3::new(screen_width, self.height, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    const WIDTH: f32 = 800.0;

    #[test]
    fn scroll_is_zero_at_screen_centre() {
        for speed in [0.1, 0.2, 0.3, 0.5, 0.8, 1.0] {
            let layer = Layer::new("l", speed, 0.0, 100.0);
            assert_eq!(layer.scroll_uv(WIDTH / 2.0, WIDTH), 0.0);
        }
    }

    #[test]
    fn scroll_uv_matches_formula() {
        let layer = Layer::new("trees_mid", 0.5, 20.0, 350.0);
        for player_x in [-1200.0_f32, -10.0, 0.0, 390.0, 400.0, 410.0, 5000.0] {
            let expected = (player_x - WIDTH / 2.0) * 0.5 / WIDTH;
            assert_eq!(layer.scroll_uv(player_x, WIDTH), expected);
        }
    }

    #[test]
    fn branches_scroll_after_one_step_right() {
        let layer = Layer::new("branches", 0.8, 0.0, 400.0);
        let uv = layer.scroll_uv(410.0, WIDTH);
        assert!((uv - 0.01).abs() < 1e-6, "got {uv}");
    }

    #[test]
    fn slower_layers_scroll_less() {
        let far = Layer::new("ceu", 0.1, 0.0, 600.0);
        let near = Layer::new("branches", 0.8, 0.0, 400.0);
        let x = 900.0;
        assert!(far.scroll_uv(x, WIDTH).abs() < near.scroll_uv(x, WIDTH).abs());
    }

    #[test]
    fn model_matrix_maps_unit_quad_onto_band() {
        let layer = Layer::new("lua", 0.2, 250.0, 450.0);
        let model = layer.model_matrix(WIDTH);

        let bottom_left = model * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let top_right = model * Vec4::new(1.0, 1.0, 0.0, 1.0);

        assert_eq!(bottom_left.truncate(), Vec3::new(0.0, 250.0, 0.0));
        assert_eq!(top_right.truncate(), Vec3::new(800.0, 700.0, 0.0));
    }
}
