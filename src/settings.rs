//! Player preferences
//!
//! Persisted separately from the records in LocalStorage, as one JSON blob.

use serde::{Deserialize, Serialize};

use crate::tuning::GameMode;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Which range to load
    pub mode: GameMode,

    // === Controls ===
    /// Radians of look per pixel of mouse movement
    pub mouse_sensitivity: f32,
    /// Flip vertical look
    pub invert_y: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Skip screen flashes
    pub reduced_flashes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),

            mouse_sensitivity: 0.002,
            invert_y: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            mute_on_blur: true,

            reduced_flashes: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "asteroid_range_settings";

    /// Effective sound-effect gain
    pub fn sfx_gain(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Effective music gain
    pub fn music_gain(&self) -> f32 {
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Convert a raw mouse delta (pixels) into a look delta (radians)
    pub fn look_delta(&self, dx: f32, dy: f32) -> glam::Vec2 {
        let y_sign = if self.invert_y { -1.0 } else { 1.0 };
        glam::Vec2::new(dx, dy * y_sign) * self.mouse_sensitivity
    }

    /// Parse settings JSON, keeping defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Discarding unreadable settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native builds have no storage
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
