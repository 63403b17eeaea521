use plx_core::frame::{resolve_layers, DrawCommand, FramePlanner};
use plx_core::input::{Key, KeyAction};
use plx_core::player::PlayerState;
use serde::Deserialize;

use crate::scene::SceneFile;

/// A scripted sequence of key events, used to drive the input handler and
/// frame planner without a window.
#[derive(Debug, Deserialize, Clone)]
pub struct KeyReplay {
    pub events: Vec<ReplayEvent>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplayKey {
    Left,
    Right,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplayAction {
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayEvent {
    pub key: ReplayKey,
    #[serde(default = "default_action")]
    pub action: ReplayAction,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl KeyReplay {
    pub fn expanded_events(&self) -> Vec<(Key, KeyAction)> {
        let mut out = Vec::new();
        for event in &self.events {
            let key = match event.key {
                ReplayKey::Left => Key::Left,
                ReplayKey::Right => Key::Right,
            };
            let action = match event.action {
                ReplayAction::Press => KeyAction::Press,
                ReplayAction::Repeat => KeyAction::Repeat,
                ReplayAction::Release => KeyAction::Release,
            };
            for _ in 0..event.repeat.max(1) {
                out.push((key, action));
            }
        }
        out
    }
}

pub fn parse_replay(raw: &str) -> Result<KeyReplay, String> {
    let replay: KeyReplay =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse replay JSON: {e}"))?;
    if replay.events.is_empty() {
        return Err("Replay validation failed: events list is empty".to_string());
    }
    Ok(replay)
}

/// Plays every event, planning a frame after each one the way the event
/// loop does. Returns the final player and the last frame's draws.
pub fn run_replay(
    scene: &SceneFile,
    texture_names: &[String],
    replay: &KeyReplay,
) -> (PlayerState, Vec<DrawCommand>) {
    let input = scene.input_handler();
    let player_texture = texture_names
        .iter()
        .position(|name| *name == scene.player.texture);
    let planner = FramePlanner::new(
        resolve_layers(&scene.layers(), texture_names),
        player_texture,
        scene.player_sprite(SCREEN_WIDTH),
        SCREEN_WIDTH,
    );
    let mut player = scene.initial_player();
    let mut draws = Vec::new();
    planner.plan(&player, &mut draws);
    for (key, action) in replay.expanded_events() {
        input.handle(&mut player, key, action);
        planner.plan(&player, &mut draws);
    }
    (player, draws)
}

const SCREEN_WIDTH: f32 = 800.0;

const fn default_action() -> ReplayAction {
    ReplayAction::Press
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::load_scene_from_str;

    const BUILTIN: &str = include_str!("../../../assets/scenes/parallax_scene.json");

    fn builtin_scene() -> SceneFile {
        load_scene_from_str(BUILTIN, "builtin").expect("builtin scene should load")
    }

    #[test]
    fn replay_parses_and_expands() {
        let replay = parse_replay(
            r#"{
              "events": [
                { "key": "right", "repeat": 3 },
                { "key": "left", "action": "release" }
              ]
            }"#,
        )
        .expect("replay should parse");
        let events = replay.expanded_events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], (Key::Right, KeyAction::Press));
        assert_eq!(events[3], (Key::Left, KeyAction::Release));
    }

    #[test]
    fn replay_rejects_empty_events() {
        let err = parse_replay(r#"{ "events": [] }"#).expect_err("empty replay should fail");
        assert!(err.contains("events list is empty"));
    }

    #[test]
    fn one_step_right_scrolls_branches() {
        let scene = builtin_scene();
        let replay = parse_replay(r#"{ "events": [ { "key": "right" } ] }"#).expect("parse");
        let (player, draws) = run_replay(&scene, &scene.texture_names(), &replay);

        assert_eq!(player.x, 410.0);
        let branches = scene
            .layers
            .iter()
            .position(|l| l.name == "branches")
            .expect("branches layer");
        assert!((draws[branches].scroll_uv - 0.01).abs() < 1e-6);
    }

    #[test]
    fn left_then_right_returns_to_start() {
        let scene = builtin_scene();
        let replay = parse_replay(
            r#"{
              "events": [
                { "key": "left", "action": "press" },
                { "key": "left", "action": "repeat", "repeat": 24 },
                { "key": "left", "action": "release" },
                { "key": "right", "action": "press" },
                { "key": "right", "action": "repeat", "repeat": 24 },
                { "key": "right", "action": "release" }
              ]
            }"#,
        )
        .expect("parse");
        let (player, draws) = run_replay(&scene, &scene.texture_names(), &replay);
        assert_eq!(player.x, 400.0);
        assert!(draws.iter().all(|d| d.scroll_uv == 0.0));
    }

    #[test]
    fn replay_run_is_deterministic() {
        let scene = builtin_scene();
        let replay = parse_replay(
            r#"{
              "events": [
                { "key": "right", "repeat": 60 },
                { "key": "left", "action": "repeat", "repeat": 13 },
                { "key": "right", "action": "release" },
                { "key": "left", "repeat": 200 }
              ]
            }"#,
        )
        .expect("parse");
        let names = scene.texture_names();
        let (player_a, draws_a) = run_replay(&scene, &names, &replay);
        let (player_b, draws_b) = run_replay(&scene, &names, &replay);
        assert_eq!(player_a, player_b);
        assert_eq!(draws_a, draws_b);
        assert_eq!(player_a.x, 400.0 + 600.0 - 130.0 - 2000.0);
    }

    #[test]
    fn player_sprite_stays_put_while_world_scrolls() {
        let scene = builtin_scene();
        let names = scene.texture_names();
        let still = parse_replay(r#"{ "events": [ { "key": "left", "action": "release" } ] }"#)
            .expect("parse");
        let moved = parse_replay(r#"{ "events": [ { "key": "right", "repeat": 500 } ] }"#)
            .expect("parse");

        let (_, draws_still) = run_replay(&scene, &names, &still);
        let (_, draws_moved) = run_replay(&scene, &names, &moved);
        let sprite_still = draws_still.last().expect("player draw");
        let sprite_moved = draws_moved.last().expect("player draw");
        assert_eq!(sprite_still.model, sprite_moved.model);
        assert_ne!(draws_still[0].scroll_uv, draws_moved[0].scroll_uv);
    }

    #[test]
    fn missing_registry_entry_does_not_stop_frames() {
        let scene = builtin_scene();
        // Registry without trees_mid: that layer is skipped, the rest keep drawing.
        let names: Vec<String> = scene
            .texture_names()
            .into_iter()
            .filter(|n| n != "trees_mid")
            .collect();
        let replay = parse_replay(r#"{ "events": [ { "key": "right", "repeat": 5 } ] }"#)
            .expect("parse");
        let (player, draws) = run_replay(&scene, &names, &replay);
        assert_eq!(player.x, 450.0);
        assert_eq!(draws.len(), 5);
        assert_eq!(draws.last().map(|d| d.texture), Some(4));
    }
}
