//! Score and accuracy bookkeeping
//!
//! `score = hits * 100 + round(100 * hits / max(hits + misses, 1))`,
//! recomputed on every hit or miss and never touched otherwise.

use super::state::{GameState, SessionStats};

/// Points for a given hit/miss record
pub fn compute_score(hits: u32, misses: u32) -> u64 {
    let shots = (hits as u64 + misses as u64).max(1);
    let bonus = (100.0 * hits as f64 / shots as f64).round() as u64;
    hits as u64 * 100 + bonus
}

/// Hit percentage in `[0, 100]`, 0 before the first shot
pub fn accuracy(hits: u32, misses: u32) -> f32 {
    let shots = hits as u64 + misses as u64;
    if shots == 0 {
        return 0.0;
    }
    (hits as f64 / shots as f64 * 100.0) as f32
}

impl SessionStats {
    pub fn accuracy(&self) -> f32 {
        accuracy(self.hits, self.misses)
    }

    pub fn shots(&self) -> u32 {
        self.hits.saturating_add(self.misses)
    }

    fn recompute(&mut self) {
        self.score = compute_score(self.hits, self.misses);
    }
}

impl GameState {
    /// Count one target hit
    pub fn record_hit(&mut self) {
        self.stats.hits = self.stats.hits.saturating_add(1);
        self.stats.recompute();
    }

    /// Count one shot that hit nothing
    pub fn record_miss(&mut self) {
        self.stats.misses = self.stats.misses.saturating_add(1);
        self.stats.recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_score_formula() {
        assert_eq!(compute_score(0, 0), 0);
        assert_eq!(compute_score(1, 0), 200);
        assert_eq!(compute_score(0, 5), 0);
        // 2 of 3: 200 + round(66.67)
        assert_eq!(compute_score(2, 1), 267);
        assert_eq!(compute_score(1, 1), 150);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(3, 1), 75.0);
        assert_eq!(accuracy(0, 4), 0.0);
        assert_eq!(accuracy(5, 0), 100.0);
    }

    #[test]
    fn test_record_updates_score() {
        let mut state = GameState::new(crate::tuning::Tuning::default(), 2);
        state.record_hit();
        assert_eq!(state.stats.score, 200);
        state.record_miss();
        assert_eq!(state.stats.score, 150);
        assert_eq!(state.stats.shots(), 2);
    }

    proptest! {
        #[test]
        fn prop_score_is_pure(hits in 0u32..10_000, misses in 0u32..10_000) {
            prop_assert_eq!(compute_score(hits, misses), compute_score(hits, misses));
            prop_assert!(compute_score(hits, misses) >= hits as u64 * 100);
            prop_assert!(compute_score(hits, misses) <= hits as u64 * 100 + 100);
        }

        #[test]
        fn prop_accuracy_in_range(hits in 0u32..10_000, misses in 0u32..10_000) {
            let a = accuracy(hits, misses);
            prop_assert!((0.0..=100.0).contains(&a));
        }
    }
}
