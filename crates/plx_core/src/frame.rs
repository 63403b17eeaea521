//! CPU-side frame planning.
//!
//! Layers are resolved to texture indices once at startup. Every frame the
//! planner turns the resolved layers and the current player position into an
//! ordered list of draw commands: layers back to front, then the player
//! sprite on top with no scroll.

use glam::Mat4;

use crate::layer::Layer;
use crate::player::{PlayerSprite, PlayerState};

/// Index into the renderer's texture registry.
pub type TextureIndex = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayer {
    pub layer: Layer,
    pub texture: TextureIndex,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub texture: TextureIndex,
    pub scroll_uv: f32,
    pub model: Mat4,
}

/// Resolves each layer to the position of its texture in `texture_names`.
/// Layers with no matching texture are dropped and will never be drawn.
pub fn resolve_layers(layers: &[Layer], texture_names: &[String]) -> Vec<ResolvedLayer> {
    let mut resolved = Vec::with_capacity(layers.len());
    for layer in layers {
        match texture_names.iter().position(|name| *name == layer.name) {
            Some(texture) => resolved.push(ResolvedLayer {
                layer: layer.clone(),
                texture,
            }),
            None => {
                log::debug!("Layer '{}' has no texture entry, skipping", layer.name);
            }
        }
    }
    resolved
}

#[derive(Debug, Clone)]
pub struct FramePlanner {
    layers: Vec<ResolvedLayer>,
    player_texture: Option<TextureIndex>,
    sprite: PlayerSprite,
    screen_width: f32,
}

impl FramePlanner {
    pub fn new(
        layers: Vec<ResolvedLayer>,
        player_texture: Option<TextureIndex>,
        sprite: PlayerSprite,
        screen_width: f32,
    ) -> Self {
        Self {
            layers,
            player_texture,
            sprite,
            screen_width,
        }
    }

    /// Upper bound on draws per frame.
    pub fn max_draws(&self) -> usize {
        self.layers.len() + 1
    }

    pub fn layers(&self) -> &[ResolvedLayer] {
        &self.layers
    }

    /// Fills `out` with this frame's draws. `out` is cleared first so the
    /// caller can reuse its allocation.
    pub fn plan(&self, player: &PlayerState, out: &mut Vec<DrawCommand>) {
        out.clear();
        for resolved in &self.layers {
            out.push(DrawCommand {
                texture: resolved.texture,
                scroll_uv: resolved.layer.scroll_uv(player.x, self.screen_width),
                model: resolved.layer.model_matrix(self.screen_width),
            });
        }
        if let Some(texture) = self.player_texture {
            out.push(DrawCommand {
                texture,
                scroll_uv: 0.0,
                model: self.sprite.model_matrix(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f32 = 800.0;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sample_layers() -> Vec<Layer> {
        vec![
            Layer::new("ceu", 0.1, 0.0, 600.0),
            Layer::new("lua", 0.2, 250.0, 450.0),
            Layer::new("trees_far", 0.3, 50.0, 400.0),
            Layer::new("trees_mid", 0.5, 20.0, 350.0),
            Layer::new("branches", 0.8, 0.0, 400.0),
        ]
    }

    fn sprite() -> PlayerSprite {
        PlayerSprite::centered(WIDTH, 100.0, 100.0, 180.0)
    }

    fn full_planner() -> FramePlanner {
        let textures = names(&["ceu", "lua", "trees_far", "trees_mid", "branches", "player"]);
        let layers = resolve_layers(&sample_layers(), &textures);
        FramePlanner::new(layers, Some(5), sprite(), WIDTH)
    }

    #[test]
    fn resolve_maps_names_to_indices() {
        let textures = names(&["player", "branches", "ceu"]);
        let resolved = resolve_layers(&sample_layers(), &textures);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].layer.name, "ceu");
        assert_eq!(resolved[0].texture, 2);
        assert_eq!(resolved[1].layer.name, "branches");
        assert_eq!(resolved[1].texture, 1);
    }

    #[test]
    fn plan_draws_layers_in_order_then_player() {
        let planner = full_planner();
        let mut draws = Vec::new();
        planner.plan(&PlayerState::new(400.0), &mut draws);

        assert_eq!(draws.len(), 6);
        let textures: Vec<_> = draws.iter().map(|d| d.texture).collect();
        assert_eq!(textures, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(planner.max_draws(), 6);
    }

    #[test]
    fn every_layer_is_unscrolled_at_centre() {
        let planner = full_planner();
        let mut draws = Vec::new();
        planner.plan(&PlayerState::new(WIDTH / 2.0), &mut draws);
        assert!(draws.iter().all(|d| d.scroll_uv == 0.0));
    }

    #[test]
    fn plan_scroll_matches_layer_formula() {
        let planner = full_planner();
        let mut draws = Vec::new();
        let player = PlayerState::new(-730.0);
        planner.plan(&player, &mut draws);
        for (draw, resolved) in draws.iter().zip(planner.layers()) {
            let expected = (player.x - WIDTH / 2.0) * resolved.layer.scroll_speed / WIDTH;
            assert_eq!(draw.scroll_uv, expected);
        }
    }

    #[test]
    fn player_draw_ignores_position() {
        let planner = full_planner();
        let mut at_start = Vec::new();
        let mut far_away = Vec::new();
        planner.plan(&PlayerState::new(400.0), &mut at_start);
        planner.plan(&PlayerState::new(98_760.0), &mut far_away);

        let a = at_start.last().expect("player draw");
        let b = far_away.last().expect("player draw");
        assert_eq!(a.model, b.model);
        assert_eq!(a.scroll_uv, 0.0);
        assert_eq!(b.scroll_uv, 0.0);
    }

    #[test]
    fn missing_layer_texture_skips_only_that_layer() {
        let textures = names(&["ceu", "lua", "trees_far", "branches", "player"]);
        let layers = resolve_layers(&sample_layers(), &textures);
        let planner = FramePlanner::new(layers, Some(4), sprite(), WIDTH);

        let mut draws = Vec::new();
        planner.plan(&PlayerState::new(410.0), &mut draws);
        assert_eq!(draws.len(), 5);
        assert!(planner.layers().iter().all(|l| l.layer.name != "trees_mid"));
        assert_eq!(draws.last().map(|d| d.texture), Some(4));
    }

    #[test]
    fn missing_player_texture_draws_layers_only() {
        let textures = names(&["ceu", "lua", "trees_far", "trees_mid", "branches"]);
        let layers = resolve_layers(&sample_layers(), &textures);
        let planner = FramePlanner::new(layers, None, sprite(), WIDTH);

        let mut draws = Vec::new();
        planner.plan(&PlayerState::new(400.0), &mut draws);
        assert_eq!(draws.len(), 5);
    }

    #[test]
    fn plan_reuses_output_buffer() {
        let planner = full_planner();
        let mut draws = vec![
            DrawCommand {
                texture: 99,
                scroll_uv: 1.0,
                model: Mat4::IDENTITY,
            };
            10
        ];
        planner.plan(&PlayerState::new(400.0), &mut draws);
        assert_eq!(draws.len(), 6);
        assert!(draws.iter().all(|d| d.texture != 99));
    }
}
