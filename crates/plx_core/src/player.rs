use glam::{Mat4, Vec3};

/// The only state mutated at runtime. Position is unbounded in both
/// directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub x: f32,
}

impl PlayerState {
    pub fn new(x: f32) -> Self {
        Self { x }
    }

    pub fn nudge(&mut self, dx: f32) {
        self.x += dx;
    }
}

/// Where the player sprite is drawn. The world scrolls underneath it, so the
/// sprite never moves on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSprite {
    pub screen_x: f32,
    pub screen_y: f32,
    pub size: f32,
}

impl PlayerSprite {
    /// Centres a sprite of nominal width `anchor_width` on the screen. The
    /// drawn `size` may differ from the anchor width.
    pub fn centered(screen_width: f32, anchor_width: f32, screen_y: f32, size: f32) -> Self {
        Self {
            screen_x: screen_width / 2.0 - anchor_width / 2.0,
            screen_y,
            size,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.screen_x, self.screen_y, 0.0))
            * Mat4::from_scale(Vec3::new(self.size, self.size, 1.0))
    }
}
