//! Target store: spawning, splitting and drift
//!
//! A hit on a target larger than [`MIN_SPLIT_SIZE`] replaces it with two
//! fragments of half the size and double the speed. Anything smaller is
//! eliminated (kept in the store with `is_hit` set so the renderer can fade it).

use glam::Vec3;
use rand::Rng;

use super::state::{GameEvent, GameState, Target, TargetId};
use crate::consts::*;
use crate::error::SimError;

/// What a successful hit did to its target
#[derive(Debug, Clone, PartialEq)]
pub enum HitOutcome {
    Eliminated,
    Split([TargetId; 2]),
}

/// Random drift velocity with each axis in `[-max, max]`
pub(crate) fn random_drift(rng: &mut impl Rng, max: f32) -> Vec3 {
    if max <= 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.random_range(-max..=max),
        rng.random_range(-max..=max),
        rng.random_range(-max..=max),
    )
}

/// Break a target into two fragments.
///
/// Fragments sit on either side of the parent along X, `size + 1` away, with
/// a random Y/Z jitter of up to half that distance. The caller removes the
/// parent and inserts the fragments.
pub fn split(target: &Target, now: f32, drift: f32, rng: &mut impl Rng) -> [Target; 2] {
    let size = target.size * 0.5;
    let speed = target.speed * 2.0;
    let offset = target.size + 1.0;
    let half = offset / 2.0;

    let mut fragment = |n: u8, dx: f32| Target {
        id: target.id.fragment(n),
        pos: target.pos
            + Vec3::new(
                dx,
                rng.random_range(-half..=half),
                rng.random_range(-half..=half),
            ),
        vel: random_drift(rng, drift),
        size,
        speed,
        is_hit: false,
        spawn_time: now,
    };

    let a = fragment(1, offset);
    let b = fragment(2, -offset);
    [a, b]
}

impl GameState {
    /// Populate the store with the mode's starting roster
    pub fn spawn_initial(&mut self) {
        let now = self.time;
        let drift = self.tuning.target_drift;
        let roster = self.tuning.roster.clone();
        self.targets = roster
            .iter()
            .enumerate()
            .map(|(i, spawn)| Target {
                id: TargetId::from(i as u32 + 1),
                pos: spawn.position,
                vel: random_drift(&mut self.rng, drift),
                size: spawn.size,
                speed: spawn.speed,
                is_hit: false,
                spawn_time: now,
            })
            .collect();
        log::info!("Spawned {} targets", self.targets.len());
    }

    /// Register a hit on a target.
    ///
    /// Returns `None` without touching anything when the target is unknown,
    /// already hit, or younger than the minimum alive time. Weapon readiness
    /// is checked by the armory before any shot reaches here.
    pub fn apply_hit(&mut self, id: &TargetId) -> Option<HitOutcome> {
        let now = self.time;
        let min_alive = self.tuning.min_alive_time;
        let idx = self.targets.iter().position(|t| &t.id == id)?;
        let target = &self.targets[idx];
        if target.is_hit || !target.is_mature(now, min_alive) {
            log::debug!("Hit on {} ignored (hit or too young)", id);
            return None;
        }

        if target.can_split() {
            let parent = self.targets.remove(idx);
            let fragments = split(&parent, now, self.tuning.target_drift, &mut self.rng);
            let ids = [fragments[0].id.clone(), fragments[1].id.clone()];
            log::debug!("Target {} split into {} and {}", parent.id, ids[0], ids[1]);
            self.targets.extend(fragments);
            self.emit(GameEvent::TargetSplit { parent: parent.id });
            Some(HitOutcome::Split(ids))
        } else {
            self.targets[idx].is_hit = true;
            self.emit(GameEvent::TargetEliminated { target: id.clone() });
            Some(HitOutcome::Eliminated)
        }
    }

    /// Advance live targets along their drift, bouncing off the arena walls
    pub fn tick_movement(&mut self, dt: f32) -> Result<(), SimError> {
        let bound = ARENA_HALF_EXTENT;
        let mut lost = None;

        for target in self.targets.iter_mut().filter(|t| t.is_live()) {
            target.pos += target.vel * target.speed * dt;

            for axis in 0..3 {
                let p = target.pos[axis];
                let v = target.vel[axis];
                if (p > bound && v > 0.0) || (p < -bound && v < 0.0) {
                    target.vel[axis] = -v;
                }
            }

            if !target.pos.is_finite() && lost.is_none() {
                lost = Some(target.id.clone());
            }
        }

        match lost {
            Some(id) => {
                self.targets.retain(|t| t.pos.is_finite());
                Err(SimError::NonFinitePosition { target: id })
            }
            None => Ok(()),
        }
    }

    /// Resolve target-target overlaps.
    ///
    /// Both members of an overlapping pair leave the store; each is replaced by
    /// its fragments if it can split, or simply dropped. A target takes part in
    /// at most one collision per tick.
    pub fn tick_pairwise_collisions(&mut self) {
        let now = self.time;
        let min_alive = self.tuning.min_alive_time;
        let eligible = |t: &Target| t.is_live() && t.is_mature(now, min_alive);

        let n = self.targets.len();
        let mut consumed = vec![false; n];
        for i in 0..n {
            if consumed[i] || !eligible(&self.targets[i]) {
                continue;
            }
            for j in (i + 1)..n {
                if consumed[j] || !eligible(&self.targets[j]) {
                    continue;
                }
                let (a, b) = (&self.targets[i], &self.targets[j]);
                if super::collision::spheres_overlap(a.pos, a.radius(), b.pos, b.radius()) {
                    consumed[i] = true;
                    consumed[j] = true;
                    break;
                }
            }
        }

        if !consumed.iter().any(|&c| c) {
            return;
        }

        let mut kept = Vec::with_capacity(n);
        let mut removed = Vec::new();
        for (target, gone) in std::mem::take(&mut self.targets).into_iter().zip(consumed) {
            if gone {
                removed.push(target);
            } else {
                kept.push(target);
            }
        }
        self.targets = kept;

        let drift = self.tuning.target_drift;
        for target in removed {
            log::debug!("Target {} destroyed by collision", target.id);
            if target.can_split() {
                let fragments = split(&target, now, drift, &mut self.rng);
                self.targets.extend(fragments);
                self.emit(GameEvent::TargetSplit { parent: target.id });
            } else {
                self.emit(GameEvent::TargetEliminated { target: target.id });
            }
        }
    }

    /// True once no live target remains
    pub fn is_field_cleared(&self) -> bool {
        self.live_targets().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn target(id: u32, pos: Vec3, size: f32) -> Target {
        Target {
            id: TargetId::from(id),
            pos,
            vel: Vec3::ZERO,
            size,
            speed: 1.0,
            is_hit: false,
            spawn_time: 0.0,
        }
    }

    fn state_with(targets: Vec<Target>) -> GameState {
        let mut state = GameState::new(Tuning::default(), 1);
        state.targets = targets;
        state.time = 10.0;
        state
    }

    #[test]
    fn test_split_halves_size_doubles_speed() {
        let mut rng = Pcg32::seed_from_u64(5);
        let parent = Target {
            speed: 3.0,
            ..target(1, Vec3::new(1.0, 2.0, 3.0), 10.0)
        };
        let [a, b] = split(&parent, 4.0, 0.6, &mut rng);
        for f in [&a, &b] {
            assert_eq!(f.size, 5.0);
            assert_eq!(f.speed, 6.0);
            assert_eq!(f.spawn_time, 4.0);
            assert!(!f.is_hit);
            assert!((f.pos.y - parent.pos.y).abs() <= 5.5);
            assert!((f.pos.z - parent.pos.z).abs() <= 5.5);
        }
        assert_eq!(a.id.as_str(), "1-1");
        assert_eq!(b.id.as_str(), "1-2");
        assert_eq!(a.pos.x, 12.0);
        assert_eq!(b.pos.x, -10.0);
    }

    #[test]
    fn test_apply_hit_splits_large_target() {
        let mut state = state_with(vec![target(1, Vec3::ZERO, 10.0), target(2, Vec3::X * 30.0, 10.0)]);
        let outcome = state.apply_hit(&TargetId::from(1));
        assert!(matches!(outcome, Some(HitOutcome::Split(_))));
        assert_eq!(state.targets.len(), 3);
        assert!(state.target(&TargetId::from(1)).is_none());
        assert!(state.target(&TargetId::from("1-1")).is_some());
    }

    #[test]
    fn test_apply_hit_eliminates_small_target() {
        let mut state = state_with(vec![target(1, Vec3::ZERO, 1.0)]);
        assert_eq!(state.apply_hit(&TargetId::from(1)), Some(HitOutcome::Eliminated));
        assert_eq!(state.targets.len(), 1);
        assert!(state.targets[0].is_hit);
        assert!(state.is_field_cleared());

        // Second hit on the same target is a no-op
        assert_eq!(state.apply_hit(&TargetId::from(1)), None);
    }

    #[test]
    fn test_apply_hit_ignores_young_target() {
        let mut state = state_with(vec![target(1, Vec3::ZERO, 10.0)]);
        state.targets[0].spawn_time = state.time - 0.1;
        assert_eq!(state.apply_hit(&TargetId::from(1)), None);
        assert_eq!(state.targets.len(), 1);
        assert!(!state.targets[0].is_hit);
    }

    #[test]
    fn test_apply_hit_unknown_target() {
        let mut state = state_with(vec![]);
        assert_eq!(state.apply_hit(&TargetId::from(99)), None);
    }

    #[test]
    fn test_movement_bounces_off_walls() {
        let mut t = target(1, Vec3::new(ARENA_HALF_EXTENT - 0.1, 0.0, 0.0), 2.0);
        t.vel = Vec3::new(1.0, 0.0, 0.0);
        t.speed = 10.0;
        let mut state = state_with(vec![t]);
        state.tick_movement(0.1).expect("finite");
        assert!(state.targets[0].pos.x > ARENA_HALF_EXTENT);
        assert!(state.targets[0].vel.x < 0.0);

        // Heads back inside rather than sticking to the wall
        state.tick_movement(0.1).expect("finite");
        assert!(state.targets[0].vel.x < 0.0);
    }

    #[test]
    fn test_movement_skips_hit_targets() {
        let mut t = target(1, Vec3::ZERO, 2.0);
        t.vel = Vec3::ONE;
        t.is_hit = true;
        let mut state = state_with(vec![t]);
        state.tick_movement(1.0).expect("finite");
        assert_eq!(state.targets[0].pos, Vec3::ZERO);
    }

    #[test]
    fn test_movement_drops_non_finite_target() {
        let mut t = target(1, Vec3::ZERO, 2.0);
        t.vel = Vec3::new(f32::NAN, 0.0, 0.0);
        let mut state = state_with(vec![t, target(2, Vec3::X * 20.0, 2.0)]);
        let err = state.tick_movement(0.1).unwrap_err();
        assert_eq!(err, SimError::NonFinitePosition { target: TargetId::from(1) });
        assert_eq!(state.targets.len(), 1);
    }

    #[test]
    fn test_pairwise_collision_splits_both() {
        let mut state = state_with(vec![
            target(1, Vec3::ZERO, 4.0),
            target(2, Vec3::new(3.0, 0.0, 0.0), 4.0),
        ]);
        state.tick_pairwise_collisions();
        assert_eq!(state.targets.len(), 4);
        assert!(state.targets.iter().all(|t| t.size == 2.0));
    }

    #[test]
    fn test_pairwise_collision_drops_small_targets() {
        let mut state = state_with(vec![
            target(1, Vec3::ZERO, 1.0),
            target(2, Vec3::new(0.5, 0.0, 0.0), 1.0),
            target(3, Vec3::new(30.0, 0.0, 0.0), 1.0),
        ]);
        state.tick_pairwise_collisions();
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.targets[0].id.as_str(), "3");
    }

    #[test]
    fn test_pairwise_collision_one_per_target() {
        // Three mutually overlapping targets: only the first pair resolves
        let mut state = state_with(vec![
            target(1, Vec3::ZERO, 1.0),
            target(2, Vec3::new(0.2, 0.0, 0.0), 1.0),
            target(3, Vec3::new(0.4, 0.0, 0.0), 1.0),
        ]);
        state.tick_pairwise_collisions();
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.targets[0].id.as_str(), "3");
    }

    #[test]
    fn test_pairwise_collision_respects_min_alive_time() {
        let mut state = state_with(vec![
            target(1, Vec3::ZERO, 4.0),
            target(2, Vec3::new(1.0, 0.0, 0.0), 4.0),
        ]);
        state.targets[1].spawn_time = state.time;
        state.tick_pairwise_collisions();
        assert_eq!(state.targets.len(), 2);
    }
}
