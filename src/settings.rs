//! Game settings and physics tuning
//!
//! Persisted in LocalStorage on web; the native runner reads a JSON file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Rejected settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("animation cadence must be at least one tick")]
    ZeroCadence,

    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Player movement constants, all in pixels and ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    /// Horizontal speed while a direction is held
    pub speed: f32,
    /// Upward impulse on jump
    pub jump_power: f32,
    /// Added to vertical velocity every tick
    pub gravity: f32,
    pub body_width: f32,
    pub body_height: f32,
    /// Ticks per animation frame
    pub animation_cadence: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            jump_power: JUMP_POWER,
            gravity: GRAVITY,
            body_width: PLAYER_WIDTH,
            body_height: PLAYER_HEIGHT,
            animation_cadence: ANIMATION_CADENCE,
        }
    }
}

impl Tuning {
    /// Every value must be finite and strictly positive
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, value) in [
            ("speed", self.speed),
            ("jumpPower", self.jump_power),
            ("gravity", self.gravity),
            ("bodyWidth", self.body_width),
            ("bodyHeight", self.body_height),
        ] {
            check_positive(field, value)?;
        }
        if self.animation_cadence == 0 {
            return Err(SettingsError::ZeroCadence);
        }
        Ok(())
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if !value.is_finite() {
        return Err(SettingsError::NotFinite { field, value });
    }
    if value <= 0.0 {
        return Err(SettingsError::NonPositive { field, value });
    }
    Ok(())
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub tuning: Tuning,
    /// Falling below this y (pixels) respawns the player.
    /// `None` uses the map's pixel height.
    pub world_height: Option<f32>,
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.tuning.validate()?;
        if let Some(height) = self.world_height {
            check_positive("worldHeight", height)?;
        }
        Ok(())
    }

    /// Parse and validate; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "blockhop_settings";

    /// Load settings from LocalStorage, falling back to defaults
    pub fn load() -> Self {
        if let Some(json) = crate::persistence::load_item(Self::STORAGE_KEY) {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {e}"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage
    pub fn save(&self) {
        match self.to_json() {
            Ok(json) => {
                if crate::persistence::store_item(Self::STORAGE_KEY, &json) {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Settings not saved: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.tuning.speed, 4.0);
        assert_eq!(settings.tuning.jump_power, 12.0);
        assert_eq!(settings.tuning.gravity, 0.5);
        assert_eq!(settings.world_height, None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"tuning": {"gravity": 0.75}, "worldHeight": 640}"#)
            .unwrap();
        assert_eq!(settings.tuning.gravity, 0.75);
        assert_eq!(settings.tuning.speed, PLAYER_SPEED);
        assert_eq!(settings.world_height, Some(640.0));
    }

    #[test]
    fn test_rejects_degenerate_tuning() {
        let mut tuning = Tuning {
            gravity: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(SettingsError::NotFinite { field: "gravity", .. })
        ));

        tuning.gravity = 0.5;
        tuning.speed = -1.0;
        assert!(matches!(
            tuning.validate(),
            Err(SettingsError::NonPositive { field: "speed", .. })
        ));

        tuning.speed = 4.0;
        tuning.animation_cadence = 0;
        assert!(matches!(tuning.validate(), Err(SettingsError::ZeroCadence)));
    }

    #[test]
    fn test_rejects_bad_world_height() {
        let err = Settings::from_json(r#"{"worldHeight": 0}"#).unwrap_err();
        assert_eq!(err.to_string(), "worldHeight must be positive, got 0");
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            world_height: Some(600.0),
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}
