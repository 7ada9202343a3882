//! Player health and the end-of-session transitions
//!
//! Damage is filtered in a fixed order: invincibility ignores it, a shield
//! absorbs it (and breaks), otherwise health drops and may end the game.
//! Game over is one-way; records are compared exactly once on the way in.

use super::collision::contact_damage;
use super::state::{FlashColor, GameEvent, GameOverReason, GamePhase, GameState, SoundCue};
use crate::consts::*;

/// What a single damage event did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Session already over; nothing changed
    Ignored,
    /// Invincibility swallowed the hit
    Invincible,
    /// The shield took the hit and is gone
    Absorbed,
    /// Health dropped but the player is still standing
    Damaged { health: f32 },
    /// Health reached zero
    Fatal,
}

impl GameState {
    /// Apply damage through the invincibility/shield guards
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.is_over() {
            return DamageOutcome::Ignored;
        }
        if self.effects.invincibility_active() {
            log::debug!("Invincible, {} damage ignored", amount);
            return DamageOutcome::Invincible;
        }
        if self.player.shield {
            log::info!("Shield absorbed {} damage", amount);
            self.player.shield = false;
            self.emit(GameEvent::ShieldAbsorbed);
            self.emit(GameEvent::Flash {
                color: FlashColor::Blue,
                duration_ms: 100,
            });
            return DamageOutcome::Absorbed;
        }

        let health = (self.player.health - amount.max(0.0)).clamp(0.0, MAX_HEALTH);
        self.player.health = health;
        self.emit(GameEvent::PlayerHit { damage: amount });

        if health <= 0.0 {
            self.end_game(GameOverReason::HealthDepleted);
            return DamageOutcome::Fatal;
        }
        if health < LOW_HEALTH_WARNING {
            self.emit(GameEvent::Flash {
                color: FlashColor::Red,
                duration_ms: 100,
            });
        }
        DamageOutcome::Damaged { health }
    }

    /// A target struck the player
    pub fn on_player_hit(&mut self, target_size: f32) -> DamageOutcome {
        let outcome = self.apply_damage(contact_damage(target_size));
        if matches!(outcome, DamageOutcome::Damaged { .. } | DamageOutcome::Fatal) {
            self.emit(GameEvent::PlaySound(SoundCue::Hit));
            self.emit(GameEvent::Flash {
                color: FlashColor::Red,
                duration_ms: 500,
            });
        }
        outcome
    }

    /// Restore health, clamped to the maximum
    pub fn heal(&mut self, amount: f32) {
        if self.is_over() {
            return;
        }
        self.player.health = (self.player.health + amount.max(0.0)).clamp(0.0, MAX_HEALTH);
    }

    /// End the session once no live target remains
    pub fn check_field_cleared(&mut self) {
        if !self.is_over() && self.is_field_cleared() {
            self.end_game(GameOverReason::FieldCleared);
        }
    }

    /// Enter the terminal phase. Later calls are no-ops.
    pub fn end_game(&mut self, reason: GameOverReason) {
        if self.is_over() {
            return;
        }
        self.phase = GamePhase::GameOver(reason);
        log::info!(
            "Game over ({:?}): score {}, accuracy {:.1}%",
            reason,
            self.stats.score,
            self.stats.accuracy()
        );

        self.emit(GameEvent::PauseSound(SoundCue::Bgm));
        self.emit(GameEvent::PlaySound(SoundCue::GameOver));
        self.emit(GameEvent::ReleasePointerLock);
        self.emit(GameEvent::GameOver(reason));

        let (high_score, best_accuracy) = self
            .records
            .improve(self.stats.score, self.stats.accuracy());
        if high_score.is_some() || best_accuracy.is_some() {
            log::info!("New records: score {:?}, accuracy {:?}", high_score, best_accuracy);
            self.emit(GameEvent::RecordsImproved {
                high_score,
                best_accuracy,
            });
        }
    }
}
