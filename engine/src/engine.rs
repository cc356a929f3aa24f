use std::time::{Duration, Instant};

use anyhow::Result;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    assets::AssetManager,
    input::InputState,
    render::{Renderer, TextureHandle},
};

/// Configuration values for the engine window and runtime behavior.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Colour games usually clear to; exposed through `EngineContext::clear_color`.
    pub clear_color: [f32; 4],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Flappy".into(),
            width: 288,
            height: 512,
            vsync: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Main entrypoint: owns the window, the event loop and the per-frame callbacks.
pub struct Engine {
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create a new engine instance with default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Override the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Override the initial window size in logical pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Enable or disable vertical sync.
    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    #[must_use]
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.config.clear_color = color;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the provided game until the window is closed or the game requests exit.
    pub fn run<G: Game + 'static>(self, mut game: G) -> Result<()> {
        let config = self.config;

        let event_loop = EventLoop::new()?;
        let mut window_attributes = Window::default_attributes();
        window_attributes.title = config.title.clone();
        window_attributes.inner_size = Some(LogicalSize::new(config.width, config.height).into());
        let window = event_loop.create_window(window_attributes)?;

        // The surface borrows the window for as long as the loop runs, which is the
        // rest of the process.
        let window: &'static Window = Box::leak(Box::new(window));

        let mut ctx = EngineContext::new(window, &config)?;
        game.init(&mut ctx)?;
        log::info!("Started '{}' at {}x{}", config.title, config.width, config.height);

        let mut last_frame = Instant::now();
        event_loop.run(move |event, elwt| match event {
            Event::NewEvents(_) => {
                ctx.begin_frame();
            }
            Event::WindowEvent { event, .. } => {
                ctx.handle_window_event(&event);

                match event {
                    WindowEvent::CloseRequested => {
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if is_escape_pressed(&event) {
                            elwt.exit();
                        }
                    }
                    WindowEvent::Resized(new_size) => {
                        ctx.resize_renderer(new_size);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Err(err) = game.draw(&mut ctx) {
                            log::error!("Encountered error during draw: {err:?}");
                            elwt.exit();
                            return;
                        }

                        if ctx.exit_requested {
                            elwt.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                ctx.update_time(now - last_frame);
                last_frame = now;

                if let Err(err) = game.update(&mut ctx) {
                    log::error!("Encountered error during update: {err:?}");
                    elwt.exit();
                    return;
                }

                if ctx.exit_requested {
                    elwt.exit();
                    return;
                }

                ctx.window.request_redraw();
            }
            _ => {}
        })?;

        Ok(())
    }
}

fn is_escape_pressed(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && matches!(event.physical_key, PhysicalKey::Code(KeyCode::Escape))
}

/// Shared context provided to game code each frame.
pub struct EngineContext<'window> {
    window: &'window Window,
    delta_time: Duration,
    elapsed_time: Duration,
    exit_requested: bool,
    clear_color: [f32; 4],
    input: InputState,
    renderer: Renderer<'window>,
    assets: AssetManager,
}

impl<'window> EngineContext<'window> {
    fn new(window: &'window Window, config: &EngineConfig) -> Result<Self> {
        let renderer = Renderer::new(window, config.vsync)?;

        Ok(Self {
            window,
            delta_time: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            exit_requested: false,
            clear_color: config.clear_color,
            input: InputState::new(),
            renderer,
            assets: AssetManager::new(),
        })
    }

    fn begin_frame(&mut self) {
        self.input.begin_frame();
    }

    fn update_time(&mut self, delta: Duration) {
        self.delta_time = delta;
        self.elapsed_time += delta;
    }

    fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.input.handle_key(event),
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.handle_mouse_button(*button, *state)
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.handle_cursor_moved(position.x, position.y)
            }
            WindowEvent::Touch(touch) => self.input.handle_touch(touch),
            _ => {}
        }
    }

    fn resize_renderer(&mut self, new_size: PhysicalSize<u32>) {
        self.renderer.resize(new_size);
    }

    /// Duration between the current and previous frames.
    pub fn delta_time(&self) -> Duration {
        self.delta_time
    }

    /// Total time elapsed since the engine started running.
    pub fn elapsed_time(&self) -> Duration {
        self.elapsed_time
    }

    /// Access the underlying winit window.
    pub fn window(&self) -> &Window {
        self.window
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Access the current input state.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Request that the engine exit after the current frame.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Access the renderer for drawing operations.
    pub fn renderer(&mut self) -> &mut Renderer<'window> {
        &mut self.renderer
    }

    /// Access the asset manager for loading and caching assets.
    pub fn assets(&mut self) -> &mut AssetManager {
        &mut self.assets
    }

    /// Load a texture through the asset cache.
    ///
    /// Same as `ctx.assets().load_texture(ctx.renderer(), path)` without the double borrow.
    pub fn load_texture(&mut self, path: &str) -> Result<TextureHandle> {
        self.assets.load_texture(&mut self.renderer, path)
    }

    /// Load a texture from encoded bytes, cached under `key`.
    pub fn load_texture_from_bytes(&mut self, key: &str, bytes: &[u8]) -> Result<TextureHandle> {
        self.assets
            .load_texture_from_bytes(&mut self.renderer, key, bytes)
    }

    /// Upload raw RGBA8 pixels and cache the handle under `key`.
    pub fn load_texture_from_rgba(
        &mut self,
        key: &str,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle> {
        if let Some(handle) = self.assets.get_texture(key) {
            return Ok(handle);
        }
        let handle = self.renderer.load_texture_from_rgba(data, width, height)?;
        self.assets.insert_texture(key, handle);
        Ok(handle)
    }
}

/// Trait implemented by user code to hook into the engine lifecycle.
pub trait Game {
    /// Called once after the window is created but before the first frame.
    fn init(&mut self, _ctx: &mut EngineContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Update game state. Called once per frame before drawing.
    fn update(&mut self, ctx: &mut EngineContext<'_>) -> Result<()>;

    /// Draw the current frame. Called after update when a redraw is requested.
    fn draw(&mut self, ctx: &mut EngineContext<'_>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let engine = Engine::new()
            .with_title("Flappy Bird")
            .with_size(320, 480)
            .with_vsync(false)
            .with_clear_color([0.1, 0.2, 0.3, 1.0]);
        let config = engine.config();
        assert_eq!(config.title, "Flappy Bird");
        assert_eq!((config.width, config.height), (320, 480));
        assert!(!config.vsync);
        assert_eq!(config.clear_color, [0.1, 0.2, 0.3, 1.0]);
    }
}
