use plx_core::frame::TextureIndex;
use plx_core::input::{InputHandler, DEFAULT_STEP};
use plx_core::layer::Layer;
use plx_core::player::{PlayerSprite, PlayerState};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize, Clone)]
pub struct SceneFile {
    pub version: String,
    pub scene_id: String,
    /// Texture registry in load order.
    pub textures: Vec<SceneTexture>,
    /// Draw order, back to front.
    pub layers: Vec<SceneLayer>,
    pub player: ScenePlayer,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SceneTexture {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SceneLayer {
    pub name: String,
    pub scroll_speed: f32,
    #[serde(default)]
    pub y_position: f32,
    pub height: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScenePlayer {
    pub texture: String,
    pub start_x: f32,
    #[serde(default = "default_step")]
    pub step: f32,
    /// Nominal sprite width used to centre the sprite horizontally.
    pub anchor_width: f32,
    pub screen_y: f32,
    pub size: f32,
}

impl SceneFile {
    pub fn layers(&self) -> Vec<Layer> {
        self.layers
            .iter()
            .map(|l| Layer::new(&l.name, l.scroll_speed, l.y_position, l.height))
            .collect()
    }

    pub fn texture_names(&self) -> Vec<String> {
        self.textures.iter().map(|t| t.name.clone()).collect()
    }

    pub fn player_texture(&self) -> Option<TextureIndex> {
        self.textures
            .iter()
            .position(|t| t.name == self.player.texture)
    }

    pub fn player_sprite(&self, screen_width: f32) -> PlayerSprite {
        PlayerSprite::centered(
            screen_width,
            self.player.anchor_width,
            self.player.screen_y,
            self.player.size,
        )
    }

    pub fn initial_player(&self) -> PlayerState {
        PlayerState::new(self.player.start_x)
    }

    pub fn input_handler(&self) -> InputHandler {
        InputHandler::new(self.player.step)
    }
}

pub fn load_scene_from_str(raw: &str, origin: &str) -> Result<SceneFile, String> {
    let scene: SceneFile = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse scene JSON {origin}: {e}"))?;
    validate_scene(&scene)?;
    Ok(scene)
}

fn validate_scene(scene: &SceneFile) -> Result<(), String> {
    if scene.layers.is_empty() {
        return Err("Scene validation failed: layers array is empty".to_string());
    }

    let mut texture_names = HashSet::new();
    for texture in &scene.textures {
        if !texture_names.insert(texture.name.as_str()) {
            return Err(format!(
                "Scene validation failed: duplicate texture name '{}'",
                texture.name
            ));
        }
        if texture.path.trim().is_empty() {
            return Err(format!(
                "Scene validation failed: texture '{}' has an empty path",
                texture.name
            ));
        }
    }

    let mut layer_names = HashSet::new();
    for layer in &scene.layers {
        if !layer_names.insert(layer.name.as_str()) {
            return Err(format!(
                "Scene validation failed: duplicate layer name '{}'",
                layer.name
            ));
        }
        if !layer.scroll_speed.is_finite() {
            return Err(format!(
                "Scene validation failed: layer '{}' has a non-finite scroll_speed",
                layer.name
            ));
        }
        if !(layer.height > 0.0) {
            return Err(format!(
                "Scene validation failed: layer '{}' must have a positive height",
                layer.name
            ));
        }
        // Unmatched layers are legal; they are skipped at draw time.
        if !texture_names.contains(layer.name.as_str()) {
            log::warn!(
                "Scene layer '{}' has no texture entry and will not be drawn.",
                layer.name
            );
        }
    }

    let player = &scene.player;
    if !player.step.is_finite() || !player.start_x.is_finite() {
        return Err("Scene validation failed: player step and start_x must be finite".to_string());
    }
    if !(player.size > 0.0) {
        return Err("Scene validation failed: player size must be positive".to_string());
    }
    if !texture_names.contains(player.texture.as_str()) {
        log::warn!(
            "Player texture '{}' is not in the texture table; the sprite will not be drawn.",
            player.texture
        );
    }

    Ok(())
}

const fn default_step() -> f32 {
    DEFAULT_STEP
}
