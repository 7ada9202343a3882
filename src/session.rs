//! Frame-driven session wrapper
//!
//! Owns the game state and the record store. Feeds variable frame deltas into
//! fixed simulation steps, and writes records back when the simulation says
//! they improved.

use crate::consts::*;
use crate::highscores::{Records, ScoreStorage};
use crate::sim::{GameEvent, GameState, SceneQuery, SoundCue, TickInput, tick, tick_with_scene};
use crate::tuning::Tuning;

/// Largest frame delta accepted (a backgrounded tab can report seconds)
const MAX_FRAME_DT: f32 = 0.1;

/// One playthrough plus the storage its records live in
pub struct Session<S: ScoreStorage> {
    pub state: GameState,
    storage: S,
    accumulator: f32,
}

impl<S: ScoreStorage> Session<S> {
    /// Load records and start the background music
    pub fn new(tuning: Tuning, seed: u64, storage: S) -> Self {
        let mut state = GameState::new(tuning, seed);
        state.records = Records::load(&storage);
        state.emit(GameEvent::PlaySound(SoundCue::Bgm));
        Self {
            state,
            storage,
            accumulator: 0.0,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Run as many fixed steps as the frame delta covers.
    ///
    /// One-shot commands in `input` are applied on the first step only and
    /// cleared afterwards. Returns the number of steps taken.
    pub fn advance(&mut self, frame_dt: f32, input: &mut TickInput) -> u32 {
        self.advance_inner(frame_dt, input, None)
    }

    /// As [`Session::advance`], raycasting shots against an external scene
    pub fn advance_with_scene(&mut self, frame_dt: f32, input: &mut TickInput, scene: &dyn SceneQuery) -> u32 {
        self.advance_inner(frame_dt, input, Some(scene))
    }

    fn advance_inner(&mut self, frame_dt: f32, input: &mut TickInput, scene: Option<&dyn SceneQuery>) -> u32 {
        if !frame_dt.is_finite() || frame_dt < 0.0 {
            log::warn!("Ignoring frame delta {}", frame_dt);
            return 0;
        }
        self.accumulator += frame_dt.min(MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            match scene {
                Some(scene) => tick_with_scene(&mut self.state, input, scene, SIM_DT),
                None => tick(&mut self.state, input, SIM_DT),
            }
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.clear_one_shots();
        }
        substeps
    }

    /// Hand pending events to the host, persisting any improved records first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::RecordsImproved {
                high_score,
                best_accuracy,
            } = event
            {
                Records::persist(&self.storage, *high_score, *best_accuracy);
            }
        }
        events
    }

    /// Start over with a fresh roster; records carry across
    pub fn restart(&mut self, seed: u64) {
        self.state.restart(seed);
        self.accumulator = 0.0;
        self.state.emit(GameEvent::PlaySound(SoundCue::Bgm));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::{HIGH_SCORE_KEY, MemoryStorage};
    use crate::sim::GameOverReason;

    fn session() -> Session<MemoryStorage> {
        Session::new(Tuning::default(), 5, MemoryStorage::with(&[(HIGH_SCORE_KEY, "300")]))
    }

    #[test]
    fn test_new_loads_records_and_starts_music() {
        let mut s = session();
        assert_eq!(s.state.records.high_score, 300);
        assert_eq!(s.drain_events(), vec![GameEvent::PlaySound(SoundCue::Bgm)]);
    }

    #[test]
    fn test_advance_fixed_steps() {
        let mut s = session();
        let mut input = TickInput::default();
        assert_eq!(s.advance(SIM_DT * 0.5, &mut input), 0);
        assert_eq!(s.advance(SIM_DT * 0.5 + 1e-4, &mut input), 1);
        // Clamped frame delta caps the catch-up
        assert_eq!(s.advance(10.0, &mut input), 6);
        assert_eq!(s.advance(f32::NAN, &mut input), 0);
    }

    #[test]
    fn test_one_shots_apply_once() {
        let mut s = session();
        let mut input = TickInput {
            fire: true,
            forward: true,
            ..Default::default()
        };
        s.state.armory.select(crate::sim::WeaponKind::Laser);
        s.advance(SIM_DT * 3.0 + 1e-4, &mut input);
        assert_eq!(s.state.armory.slot(crate::sim::WeaponKind::Laser).ammo, 9);
        assert!(!input.fire);
        assert!(input.forward);
    }

    #[test]
    fn test_records_persisted_once_on_game_over() {
        let mut s = session();
        s.state.stats.score = 1000;
        s.state.end_game(GameOverReason::FieldCleared);
        s.drain_events();
        assert_eq!(s.storage().get(HIGH_SCORE_KEY).as_deref(), Some("1000"));
        let writes = s.storage().writes();

        s.state.end_game(GameOverReason::HealthDepleted);
        s.drain_events();
        assert_eq!(s.storage().writes(), writes);
    }

    #[test]
    fn test_restart_keeps_records() {
        let mut s = session();
        s.state.stats.score = 1000;
        s.state.end_game(GameOverReason::FieldCleared);
        s.drain_events();

        s.restart(6);
        assert!(!s.state.is_over());
        assert_eq!(s.state.records.high_score, 1000);
        assert_eq!(s.state.stats, Default::default());
    }
}
