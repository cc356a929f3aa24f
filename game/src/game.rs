use anyhow::{anyhow, Result};
use flappy_engine::{
    placeholder_atlas, Camera2D, EngineContext, Game, KeyCode, Sprite, TextureHandle, Vec2,
};

use crate::atlas;
use crate::level::Level;
use crate::settings::GameSettings;

const DEBUG_COLOR: [f32; 4] = [1.0, 0.1, 0.1, 1.0];
/// Longest step fed to the level; a stalled window must not tunnel the bird through pipes.
const MAX_FRAME_TIME: f32 = 0.1;

pub struct FlappyGame {
    settings: GameSettings,
    camera: Camera2D,
    level: Option<Level>,
    shown_score: Option<(u32, u32)>,
}

impl FlappyGame {
    pub fn new(settings: GameSettings) -> Self {
        let camera = Camera2D::orthographic(
            settings.window_width as f32,
            settings.window_height as f32,
        );
        Self {
            settings,
            camera,
            level: None,
            shown_score: None,
        }
    }

    fn load_atlas(&self, ctx: &mut EngineContext) -> Result<TextureHandle> {
        match ctx.load_texture(&self.settings.atlas_path) {
            Ok(handle) => Ok(handle),
            Err(err) => {
                log::warn!(
                    "Could not load atlas '{}' ({err}); using flat placeholder colours",
                    self.settings.atlas_path
                );
                let image = placeholder_atlas(
                    atlas::ATLAS_SIZE,
                    atlas::ATLAS_SIZE,
                    &atlas::placeholder_regions(),
                );
                let (width, height) = image.dimensions();
                ctx.load_texture_from_rgba("placeholder_atlas", image.as_raw(), width, height)
            }
        }
    }
}

impl Game for FlappyGame {
    fn init(&mut self, ctx: &mut EngineContext) -> Result<()> {
        let texture = self.load_atlas(ctx)?;
        let seed = fastrand::u64(..);
        log::debug!("Level seed {seed}");
        self.level = Some(Level::new(self.settings.clone(), texture, seed)?);
        Ok(())
    }

    fn update(&mut self, ctx: &mut EngineContext) -> Result<()> {
        let level = self
            .level
            .as_mut()
            .ok_or_else(|| anyhow!("update called before init"))?;

        let input = ctx.input();
        let tap = input.tap_pressed();
        if input.is_key_pressed(KeyCode::KeyB) {
            level.toggle_physics_debug();
        }

        let dt = ctx.delta_time().as_secs_f32().min(MAX_FRAME_TIME);
        level.update(dt, tap)?;

        let score = (level.score(), level.best_score());
        if self.shown_score != Some(score) {
            ctx.set_title(&format!("Flappy Bird | score {} | best {}", score.0, score.1));
            self.shown_score = Some(score);
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut EngineContext) -> Result<()> {
        let level = self
            .level
            .as_ref()
            .ok_or_else(|| anyhow!("draw called before init"))?;

        // Disabled nodes hide their whole subtree.
        let scene = level.scene();
        let mut sprites: Vec<(&Sprite, Vec2)> = Vec::new();
        scene.visit(|id, node| {
            if !node.is_enabled() {
                return false;
            }
            if let (Some(sprite), Ok(origin)) = (node.drawable(), scene.world_translation(id)) {
                sprites.push((sprite, origin));
            }
            true
        });

        let clear_color = ctx.clear_color();
        let renderer = ctx.renderer();
        let mut frame = renderer.begin_frame()?;
        renderer.clear(&mut frame, clear_color)?;

        for (sprite, origin) in sprites {
            renderer.draw_sprite(&mut frame, sprite, origin, &self.camera)?;
        }

        if level.show_physics_debug() {
            for (shape, origin) in level.collider_outlines() {
                renderer.draw_debug_shape(&mut frame, shape, origin, DEBUG_COLOR, &self.camera)?;
            }
        }

        renderer.end_frame(frame)?;
        Ok(())
    }
}
