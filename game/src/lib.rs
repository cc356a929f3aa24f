//! Flappy Bird on the flappy engine: a bird, scrolling pipes and a three-state game loop.

pub mod atlas;
pub mod entities;
pub mod game;
pub mod level;
pub mod settings;

pub use crate::game::FlappyGame;
pub use crate::level::{GameState, Level};
pub use crate::settings::{GameSettings, SettingsError};
