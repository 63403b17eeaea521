//! Parallax Scrolling -- render loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. Key events arrive
//! before the redraw request of the same loop iteration, so each frame:
//!
//!   1. applies pending key presses/repeats to the player position
//!   2. clears to the night-sky colour
//!   3. draws every layer back to front with its own texture-space scroll
//!   4. draws the player sprite on top at a fixed screen position
//!   5. presents
//!
//! The player never moves on screen. Walking shifts each layer's texture
//! coordinates by an amount scaled by the layer's scroll speed, which is
//! what produces the parallax.

#[cfg(test)]
mod replay;
mod scene;

use std::path::Path;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use plx_core::frame::{resolve_layers, DrawCommand, FramePlanner};
use plx_core::input::{InputHandler, Key, KeyAction};
use plx_core::player::PlayerState;
use plx_platform::window::PlatformConfig;
use plx_render::{
    DrawUniform, FrameUniforms, GpuContext, ParallaxPipeline, QuadMesh, ScreenCamera, Texture,
};
use scene::{load_scene_from_str, SceneFile};

const SCENE_JSON: &str = include_str!("../../../assets/scenes/parallax_scene.json");
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.2,
    a: 1.0,
};
const EXIT_STARTUP_FAILURE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Running,
    Closing,
}

impl LoopState {
    fn on_close_requested(self) -> Self {
        LoopState::Closing
    }

    fn is_running(self) -> bool {
        self == LoopState::Running
    }
}

struct GpuLayerTexture {
    name: String,
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Everything the running scene owns. Built in `ApplicationHandler::resumed`
/// once the window exists and released by `teardown`.
struct ParallaxState {
    window: Arc<Window>,
    gpu: GpuContext,
    pipeline: ParallaxPipeline,
    quad: QuadMesh,
    uniforms: FrameUniforms,
    /// Registry order; `DrawCommand::texture` indexes into this.
    textures: Vec<GpuLayerTexture>,
    planner: FramePlanner,
    input: InputHandler,
    player: PlayerState,

    // Reused every frame.
    draws: Vec<DrawCommand>,
    draw_uniforms: Vec<DrawUniform>,
}

impl ParallaxState {
    fn new(
        window: Arc<Window>,
        scene: &SceneFile,
        config: &PlatformConfig,
    ) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let pipeline = ParallaxPipeline::new(&gpu.device, gpu.surface_format);
        let quad = QuadMesh::new(&gpu.device);

        let mut textures = Vec::with_capacity(scene.textures.len());
        for entry in &scene.textures {
            let texture = Texture::load(&gpu.device, &gpu.queue, Path::new(&entry.path));
            log::debug!(
                "Texture '{}' is {}x{}",
                entry.name,
                texture.size.0,
                texture.size.1
            );
            let bind_group = pipeline.create_texture_bind_group(&gpu.device, &texture);
            textures.push(GpuLayerTexture {
                name: entry.name.clone(),
                texture,
                bind_group,
            });
        }
        let loaded = textures.iter().filter(|t| t.texture.loaded).count();
        log::info!("Loaded {}/{} textures", loaded, textures.len());

        let screen_width = config.width as f32;
        let texture_names = scene.texture_names();
        let planner = FramePlanner::new(
            resolve_layers(&scene.layers(), &texture_names),
            scene.player_texture(),
            scene.player_sprite(screen_width),
            screen_width,
        );

        let camera = ScreenCamera::new(config.width, config.height);
        let uniforms = FrameUniforms::new(
            &gpu.device,
            &pipeline,
            camera.build_uniform(),
            planner.max_draws(),
            gpu.uniform_alignment(),
        );

        Ok(Self {
            window,
            gpu,
            pipeline,
            quad,
            uniforms,
            textures,
            draws: Vec::with_capacity(planner.max_draws()),
            draw_uniforms: Vec::with_capacity(planner.max_draws()),
            planner,
            input: scene.input_handler(),
            player: scene.initial_player(),
        })
    }

    fn handle_key(&mut self, key: Key, action: KeyAction) {
        if self.input.handle(&mut self.player, key, action) {
            log::trace!("Player x = {}", self.player.x);
        }
    }

    fn render_frame(&mut self) {
        if self.gpu.size.0 == 0 || self.gpu.size.1 == 0 {
            return;
        }

        self.planner.plan(&self.player, &mut self.draws);
        self.draw_uniforms.clear();
        self.draw_uniforms.extend(
            self.draws
                .iter()
                .map(|draw| DrawUniform::new(draw.model, draw.scroll_uv)),
        );
        let written = self.uniforms.write(&self.gpu.queue, &self.draw_uniforms);

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Parallax Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.pipeline.render_pipeline);
            for (slot, draw) in self.draws.iter().take(written).enumerate() {
                let Some(texture) = self.textures.get(draw.texture) else {
                    continue;
                };
                render_pass.set_bind_group(
                    0,
                    &self.uniforms.bind_group,
                    &[self.uniforms.offset(slot)],
                );
                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                self.quad.draw(&mut render_pass);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    /// Releases GPU resources: geometry, then the pipeline, then each
    /// texture in registry order.
    fn teardown(self) {
        let ParallaxState {
            gpu,
            pipeline,
            quad,
            uniforms,
            textures,
            ..
        } = self;

        quad.destroy();
        uniforms.destroy();
        drop(pipeline);
        for entry in textures {
            log::debug!("Releasing texture '{}'", entry.name);
            drop(entry.bind_group);
            entry.texture.destroy();
        }
        drop(gpu);
        log::info!("GPU resources released");
    }
}

struct App {
    config: PlatformConfig,
    scene: SceneFile,
    loop_state: LoopState,
    state: Option<ParallaxState>,
    exit_code: i32,
}

impl App {
    fn new(scene: SceneFile) -> Self {
        Self {
            config: PlatformConfig::default(),
            scene,
            loop_state: LoopState::Running,
            state: None,
            exit_code: 0,
        }
    }

    fn fail_startup(&mut self, event_loop: &ActiveEventLoop, err: &str) {
        log::error!("{}", err);
        self.exit_code = EXIT_STARTUP_FAILURE;
        self.loop_state = self.loop_state.on_close_requested();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || !self.loop_state.is_running() {
            return;
        }
        let window = match plx_platform::window::create_window(event_loop, &self.config) {
            Ok(window) => window,
            Err(err) => {
                self.fail_startup(event_loop, &err);
                return;
            }
        };
        match ParallaxState::new(window, &self.scene, &self.config) {
            Ok(state) => self.state = Some(state),
            Err(err) => self.fail_startup(event_loop, &err),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                self.loop_state = self.loop_state.on_close_requested();
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        let pressed = event.state == ElementState::Pressed;
                        state.handle_key(key, KeyAction::from_event(pressed, event.repeat));
                    }
                }
            }

            WindowEvent::RedrawRequested if self.loop_state.is_running() => {
                state.render_frame();
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.take() {
            state.teardown();
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        _ => None,
    }
}

fn run() -> i32 {
    let scene = match load_scene_from_str(SCENE_JSON, "builtin scene") {
        Ok(scene) => scene,
        Err(err) => {
            log::error!("{}", err);
            return EXIT_STARTUP_FAILURE;
        }
    };
    log::info!("Scene loaded: {} ({})", scene.scene_id, scene.version);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {}", err);
            return EXIT_STARTUP_FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", err);
        return EXIT_STARTUP_FAILURE;
    }
    app.exit_code
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Parallax Scrolling starting...");

    std::process::exit(run());
}
