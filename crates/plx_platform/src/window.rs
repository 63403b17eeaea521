use std::sync::Arc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// The scene projection is fixed to `width` x `height`; resizing only
    /// stretches it, so the window is locked by default.
    pub resizable: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Parallax Scrolling".to_string(),
            width: 800,
            height: 600,
            resizable: false,
        }
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, String> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_resizable(config.resizable)
        .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height));

    let window = event_loop
        .create_window(attrs)
        .map_err(|e| format!("Failed to create window '{}': {e}", config.title))?;
    let size = window.inner_size();
    log::info!(
        "Window '{}' created at {}x{}",
        config.title,
        size.width,
        size.height
    );
    Ok(Arc::new(window))
}
