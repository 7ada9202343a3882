//! Deterministic combat simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances only through `tick`
//! - Seeded RNG only
//! - Stable iteration order (target store order)
//! - No audio, rendering or platform dependencies; those are reached through
//!   queued [`GameEvent`]s and the [`SceneQuery`] trait

pub mod collision;
pub mod health;
pub mod hitscan;
pub mod powerups;
pub mod score;
pub mod state;
pub mod targets;
pub mod tick;
pub mod weapons;

pub use collision::{contact_damage, ray_exit_cube, ray_sphere, sphere_contains_point, spheres_overlap};
pub use health::DamageOutcome;
pub use hitscan::{ArenaScene, RayHit, RayObject, SceneQuery, ShotOutcome};
pub use powerups::{ActiveEffects, PowerUpKind, SLOW_MOTION_SCALE};
pub use score::{accuracy, compute_score};
pub use state::{
    FlashColor, GameEvent, GameOverReason, GamePhase, GameState, Pickup, Player, SessionStats,
    SoundCue, Target, TargetColor, TargetId,
};
pub use targets::{HitOutcome, split};
pub use tick::{THRUSTER_VOLUME, TickInput, tick, tick_with_scene};
pub use weapons::{Armory, WeaponKind, WeaponSlot, WeaponStatus};
