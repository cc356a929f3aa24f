use anyhow::Result;
use flappy_bird::{FlappyGame, GameSettings};
use flappy_engine::{color_from_hex, Engine};

const CLEAR_COLOR: u32 = 0x045678ff;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = GameSettings::from_env()?;
    settings.validate()?;

    Engine::new()
        .with_title("Flappy Bird")
        .with_size(settings.window_width, settings.window_height)
        .with_vsync(true)
        .with_clear_color(color_from_hex(CLEAR_COLOR))
        .run(FlappyGame::new(settings))
}
