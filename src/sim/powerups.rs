//! Power-up effects
//!
//! Health and Shield apply once and never revert. The four timed effects keep
//! a countdown that the tick decrements; activation and expiry are paired 1:1.
//! Collecting a timed effect that is already running only refreshes its
//! countdown, so its activation side effects are never applied twice.

use serde::{Deserialize, Serialize};

use super::state::{FlashColor, GameEvent, GameState};

/// Target speed multiplier while slow motion runs. Must be a power of two so
/// the expiry multiply restores speeds bit-for-bit.
pub const SLOW_MOTION_SCALE: f32 = 0.5;

/// How long a power-up flash stays up (ms)
const FLASH_MS: u32 = 100;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Health,
    Shield,
    RapidFire,
    SlowMotion,
    Invincibility,
    SpeedBoost,
}

impl PowerUpKind {
    /// Effects that run on a countdown
    pub const TIMED: [PowerUpKind; 4] = [
        PowerUpKind::RapidFire,
        PowerUpKind::SlowMotion,
        PowerUpKind::Invincibility,
        PowerUpKind::SpeedBoost,
    ];

    pub fn is_timed(&self) -> bool {
        !matches!(self, PowerUpKind::Health | PowerUpKind::Shield)
    }

    pub fn flash_color(&self) -> FlashColor {
        match self {
            PowerUpKind::Health => FlashColor::Green,
            PowerUpKind::Shield => FlashColor::Blue,
            PowerUpKind::RapidFire => FlashColor::Red,
            PowerUpKind::SlowMotion => FlashColor::Purple,
            PowerUpKind::Invincibility => FlashColor::Yellow,
            PowerUpKind::SpeedBoost => FlashColor::Orange,
        }
    }
}

/// Remaining seconds for each timed effect (0 = inactive)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveEffects {
    pub rapid_fire: f32,
    pub slow_motion: f32,
    pub invincibility: f32,
    pub speed_boost: f32,
}

impl ActiveEffects {
    fn timer_mut(&mut self, kind: PowerUpKind) -> Option<&mut f32> {
        match kind {
            PowerUpKind::RapidFire => Some(&mut self.rapid_fire),
            PowerUpKind::SlowMotion => Some(&mut self.slow_motion),
            PowerUpKind::Invincibility => Some(&mut self.invincibility),
            PowerUpKind::SpeedBoost => Some(&mut self.speed_boost),
            PowerUpKind::Health | PowerUpKind::Shield => None,
        }
    }

    /// Seconds left on a timed effect
    pub fn remaining(&self, kind: PowerUpKind) -> f32 {
        match kind {
            PowerUpKind::RapidFire => self.rapid_fire,
            PowerUpKind::SlowMotion => self.slow_motion,
            PowerUpKind::Invincibility => self.invincibility,
            PowerUpKind::SpeedBoost => self.speed_boost,
            PowerUpKind::Health | PowerUpKind::Shield => 0.0,
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.remaining(kind) > 0.0
    }

    pub fn rapid_fire_active(&self) -> bool {
        self.rapid_fire > 0.0
    }

    pub fn slow_motion_active(&self) -> bool {
        self.slow_motion > 0.0
    }

    pub fn invincibility_active(&self) -> bool {
        self.invincibility > 0.0
    }

    pub fn speed_boost_active(&self) -> bool {
        self.speed_boost > 0.0
    }
}

impl GameState {
    /// Apply a collected power-up
    pub fn apply_power_up(&mut self, kind: PowerUpKind) {
        match kind {
            // +25 health, clamped
            PowerUpKind::Health => {
                let amount = self.tuning.health_pickup_amount;
                self.heal(amount);
            }
            // Held until the next hit consumes it
            PowerUpKind::Shield => {
                self.player.shield = true;
            }
            // Countdown starts (or restarts); side effects only on a fresh start
            _ => {
                let duration = self.tuning.power_up_duration;
                let was_active = self.effects.is_active(kind);
                if let Some(timer) = self.effects.timer_mut(kind) {
                    *timer = duration;
                }
                if !was_active {
                    self.activate(kind);
                } else {
                    log::debug!("{:?} refreshed", kind);
                }
            }
        }

        self.emit(GameEvent::Flash {
            color: kind.flash_color(),
            duration_ms: FLASH_MS,
        });
        self.emit(GameEvent::PowerUpCollected(kind));
    }

    /// Count timed effects down, reverting any that run out
    pub fn tick_effects(&mut self, dt: f32) {
        for kind in PowerUpKind::TIMED {
            let expired = match self.effects.timer_mut(kind) {
                Some(timer) if *timer > 0.0 => {
                    *timer = (*timer - dt).max(0.0);
                    *timer == 0.0
                }
                _ => false,
            };
            if expired {
                self.expire(kind);
            }
        }
    }

    fn activate(&mut self, kind: PowerUpKind) {
        log::info!("{:?} active", kind);
        // Slow motion halves every target's speed, including fragments spawned
        // later (they inherit the scaled speed and are restored with the rest)
        if kind == PowerUpKind::SlowMotion {
            for target in &mut self.targets {
                target.speed *= SLOW_MOTION_SCALE;
            }
        }
    }

    fn expire(&mut self, kind: PowerUpKind) {
        log::info!("{:?} expired", kind);
        if kind == PowerUpKind::SlowMotion {
            for target in &mut self.targets {
                target.speed /= SLOW_MOTION_SCALE;
            }
        }
        self.emit(GameEvent::Flash {
            color: kind.flash_color(),
            duration_ms: FLASH_MS,
        });
        self.emit(GameEvent::PowerUpExpired(kind));
    }
}
