use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an optional JSON settings file.
pub const CONFIG_ENV: &str = "FLAPPY_CONFIG";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Gameplay tuning. Units are world units (one atlas pixel) and seconds.
///
/// Every field has a default, so a settings file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub pipe_scroll_speed: f32,
    pub pipe_spawn_delay: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    /// Lowest y the bird can reach.
    pub ground_pos: f32,
    pub pipe_scroll_x_start: f32,
    pub pipe_scroll_x_end: f32,
    /// Half the gap between the upper and lower pipe.
    pub pipe_hole_height: f32,
    pub pipe_hole_random_y_offset: f32,
    /// Seconds on the game over screen before a tap restarts.
    pub restart_delay: f32,
    pub bird_start_x: f32,
    pub bird_radius: f32,
    pub atlas_path: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            pipe_scroll_speed: 100.0,
            pipe_spawn_delay: 1.6,
            gravity: -700.0,
            jump_velocity: 245.0,
            ground_pos: -182.0,
            pipe_scroll_x_start: 200.0,
            pipe_scroll_x_end: -200.0,
            pipe_hole_height: 42.0,
            pipe_hole_random_y_offset: 90.0,
            restart_delay: 2.0,
            bird_start_x: -50.0,
            bird_radius: 13.0,
            atlas_path: "res/data/img/flappy_atlas.png".into(),
            window_width: 288,
            window_height: 512,
        }
    }
}

impl GameSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load from the file named by `FLAPPY_CONFIG`, or fall back to defaults.
    pub fn from_env() -> Result<Self, SettingsError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                log::info!("Loading settings from {}", Path::new(&path).display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.pipe_spawn_delay <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "pipe_spawn_delay must be positive, got {}",
                self.pipe_spawn_delay
            )));
        }
        if self.pipe_scroll_speed <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "pipe_scroll_speed must be positive, got {}",
                self.pipe_scroll_speed
            )));
        }
        if self.restart_delay <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "restart_delay must be positive, got {}",
                self.restart_delay
            )));
        }
        if self.pipe_scroll_x_end >= self.pipe_scroll_x_start {
            return Err(SettingsError::Invalid(format!(
                "pipe_scroll_x_end ({}) must be left of pipe_scroll_x_start ({})",
                self.pipe_scroll_x_end, self.pipe_scroll_x_start
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = GameSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.pipe_spawn_delay, 1.6);
        assert_eq!(settings.ground_pos, -182.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = GameSettings::from_json(r#"{ "gravity": -500.0, "window_width": 400 }"#).unwrap();
        assert_eq!(settings.gravity, -500.0);
        assert_eq!(settings.window_width, 400);
        assert_eq!(settings.jump_velocity, 245.0);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = GameSettings::from_json("{ gravity: ").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GameSettings::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn validate_rejects_bad_ranges() {
        let mut settings = GameSettings {
            pipe_spawn_delay: 0.0,
            ..GameSettings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        settings.pipe_spawn_delay = 1.0;
        settings.pipe_scroll_x_end = 300.0;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_stalled_pipes_and_instant_restart() {
        let stalled = GameSettings {
            pipe_scroll_speed: 0.0,
            ..GameSettings::default()
        };
        let err = stalled.validate().unwrap_err();
        assert!(matches!(&err, SettingsError::Invalid(msg) if msg.contains("pipe_scroll_speed")));

        let instant = GameSettings {
            restart_delay: 0.0,
            ..GameSettings::default()
        };
        let err = instant.validate().unwrap_err();
        assert!(matches!(&err, SettingsError::Invalid(msg) if msg.contains("restart_delay")));
    }
}
