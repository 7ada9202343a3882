//! Asteroid Range - A 3D shooting-range arcade game
//!
//! Core modules:
//! - `sim`: Combat simulation (targets, weapons, hit detection, power-ups)
//! - `session`: Fixed-timestep driver and record persistence
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `highscores`: Persisted best score and accuracy

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod error;
pub mod highscores;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{FireError, SimError};
pub use highscores::{MemoryStorage, Records, ScoreStorage};
pub use session::Session;
pub use settings::Settings;
pub use tuning::{GameMode, Tuning};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Half-extent of the cubic play volume targets bounce inside
    pub const ARENA_HALF_EXTENT: f32 = 50.0;

    /// Smallest size a target can still split from
    pub const MIN_SPLIT_SIZE: f32 = 1.0;

    /// Player health bounds
    pub const MAX_HEALTH: f32 = 100.0;
    /// Health below which a warning flash accompanies damage
    pub const LOW_HEALTH_WARNING: f32 = 30.0;
}

/// Forward view vector for a yaw/pitch pair (yaw 0 looks down -Z)
#[inline]
pub fn forward_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    Vec3::new(-sy * cp, sp, -cy * cp)
}

/// Angle in radians between a view direction and the direction to a point.
/// A point at the origin counts as straight ahead.
#[inline]
pub fn angle_to_point(origin: Vec3, forward: Vec3, point: Vec3) -> f32 {
    let to_point = point - origin;
    if to_point.length_squared() < f32::EPSILON {
        return 0.0;
    }
    forward.angle_between(to_point)
}
