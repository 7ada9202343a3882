//! Simulation error types.
//!
//! Almost every failure in the combat core is a rejected precondition that the
//! caller is expected to shrug off. These types make the rejection visible so
//! it can be logged or turned into a sound cue, never a crash.

use std::fmt;

use crate::sim::{TargetId, WeaponKind};

/// Why a trigger pull did not fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireError {
    /// The session has ended; weapons are frozen.
    GameOver,
    /// The weapon is still cooling down.
    CoolingDown {
        weapon: WeaponKind,
        /// Seconds left before the weapon is ready.
        remaining: f32,
    },
    /// No ammunition left until the next reload.
    OutOfAmmo { weapon: WeaponKind },
}

impl fmt::Display for FireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireError::GameOver => write!(f, "game is over"),
            FireError::CoolingDown { weapon, remaining } => {
                write!(f, "{} cooling down ({remaining:.2}s left)", weapon.name())
            }
            FireError::OutOfAmmo { weapon } => write!(f, "{} is out of ammo", weapon.name()),
        }
    }
}

impl std::error::Error for FireError {}

/// A pipeline step that could not complete this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Frame delta was NaN, infinite or negative.
    NonFiniteDelta { dt: f32 },
    /// A target's position became non-finite and it was dropped from the store.
    NonFinitePosition { target: TargetId },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NonFiniteDelta { dt } => write!(f, "invalid frame delta {dt}"),
            SimError::NonFinitePosition { target } => {
                write!(f, "target {target} left the finite world and was dropped")
            }
        }
    }
}

impl std::error::Error for SimError {}
