//! Hit detection for the three weapons
//!
//! - Laser: first live target along the view ray, within range
//! - Spread: every live target inside the view cone, within range
//! - Explosive: every live target inside a blast sphere at the ray's impact point
//!
//! A shot reports either one hit per target it affected or a single miss,
//! never both.

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;

use super::collision::{ray_exit_cube, ray_sphere, sphere_contains_point};
use super::state::{GameEvent, GameState, SoundCue, TargetId};
use super::targets::HitOutcome;
use super::weapons::WeaponKind;
use crate::angle_to_point;
use crate::consts::*;
use crate::error::FireError;

/// What a ray struck
#[derive(Debug, Clone, PartialEq)]
pub enum RayObject {
    Target(TargetId),
    /// Arena walls or other static geometry
    Scenery,
}

/// One ray intersection
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    pub object: RayObject,
}

/// Scene intersection query supplied by the render side
pub trait SceneQuery {
    /// All intersections along a unit ray, nearest first
    fn raycast(&self, origin: Vec3, dir: Vec3) -> Vec<RayHit>;
}

/// Sphere-per-target scene bounded by the arena cube
#[derive(Debug, Clone, Default)]
pub struct ArenaScene {
    spheres: Vec<(TargetId, Vec3, f32)>,
    half_extent: f32,
}

impl ArenaScene {
    /// Capture the bounding sphere of every live target
    pub fn snapshot(state: &GameState) -> Self {
        Self {
            spheres: state
                .live_targets()
                .map(|t| (t.id.clone(), t.pos, t.radius()))
                .collect(),
            half_extent: ARENA_HALF_EXTENT,
        }
    }
}

impl SceneQuery for ArenaScene {
    fn raycast(&self, origin: Vec3, dir: Vec3) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self
            .spheres
            .iter()
            .filter_map(|(id, center, radius)| {
                ray_sphere(origin, dir, *center, *radius).map(|distance| RayHit {
                    point: origin + dir * distance,
                    distance,
                    object: RayObject::Target(id.clone()),
                })
            })
            .collect();

        if let Some(distance) = ray_exit_cube(origin, dir, self.half_extent) {
            hits.push(RayHit {
                point: origin + dir * distance,
                distance,
                object: RayObject::Scenery,
            });
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Result of a shot that actually fired
#[derive(Debug, Clone, PartialEq)]
pub struct ShotOutcome {
    pub weapon: WeaponKind,
    /// Targets affected, in resolution order
    pub hits: Vec<(TargetId, HitOutcome)>,
}

impl ShotOutcome {
    pub fn is_miss(&self) -> bool {
        self.hits.is_empty()
    }
}

impl GameState {
    /// Fire the selected weapon from the player's eye.
    ///
    /// A rejected trigger pull leaves weapons and targets untouched and only
    /// queues a sound cue.
    pub fn fire_selected(&mut self, scene: &dyn SceneQuery) -> Result<ShotOutcome, FireError> {
        if self.is_over() {
            return Err(FireError::GameOver);
        }

        let weapon = self.armory.selected;
        let rapid_fire = self.effects.rapid_fire_active();
        if let Err(err) = self.armory.fire(weapon, rapid_fire) {
            let cue = match err {
                FireError::OutOfAmmo { .. } => SoundCue::Empty,
                _ => SoundCue::Miss,
            };
            self.emit(GameEvent::PlaySound(cue));
            return Err(err);
        }
        self.emit(GameEvent::PlaySound(SoundCue::Shoot));

        let origin = self.player.pos;
        let dir = self.player.forward();
        let candidates = match weapon {
            WeaponKind::Laser => self.laser_candidates(scene, origin, dir),
            WeaponKind::Spread => self.spread_candidates(origin, dir),
            WeaponKind::Explosive => self.explosive_candidates(scene, origin, dir),
        };

        let mut hits = Vec::new();
        for id in candidates {
            if let Some(outcome) = self.apply_hit(&id) {
                self.emit(GameEvent::PlaySound(SoundCue::Hit));
                self.record_hit();
                hits.push((id, outcome));
            }
        }
        if hits.is_empty() {
            self.emit(GameEvent::PlaySound(SoundCue::Miss));
            self.record_miss();
        }

        log::debug!("{} fired: {} hit(s)", weapon.name(), hits.len());
        Ok(ShotOutcome { weapon, hits })
    }

    /// Scene hits along a ray, minus eliminated targets an outside scene may still report
    fn solid_hits(&self, scene: &dyn SceneQuery, origin: Vec3, dir: Vec3) -> Vec<RayHit> {
        scene
            .raycast(origin, dir)
            .into_iter()
            .filter(|hit| match &hit.object {
                RayObject::Target(id) => self.target(id).is_some_and(|t| t.is_live()),
                RayObject::Scenery => true,
            })
            .collect()
    }

    fn laser_candidates(&mut self, scene: &dyn SceneQuery, origin: Vec3, dir: Vec3) -> Vec<TargetId> {
        let intersects = self.solid_hits(scene, origin, dir);
        let end = intersects
            .first()
            .map(|hit| hit.point)
            .unwrap_or(origin + dir * self.tuning.laser_beam_length);
        self.emit(GameEvent::Beam {
            from: origin,
            to: end,
            weapon: WeaponKind::Laser,
        });

        let range = self.tuning.laser_range;
        intersects
            .into_iter()
            .filter(|hit| hit.distance <= range)
            .find_map(|hit| match hit.object {
                RayObject::Target(id) => Some(id),
                RayObject::Scenery => None,
            })
            .into_iter()
            .collect()
    }

    fn spread_candidates(&mut self, origin: Vec3, dir: Vec3) -> Vec<TargetId> {
        let cone = self.tuning.spread_cone;
        let range = self.tuning.spread_range;

        // Pellets are cosmetic only
        for _ in 0..self.tuning.spread_pellets {
            let jitter_x = (self.rng.random::<f32>() - 0.5) * cone;
            let jitter_y = (self.rng.random::<f32>() - 0.5) * cone;
            let pellet = Quat::from_euler(EulerRot::XYZ, jitter_x, jitter_y, 0.0) * dir;
            self.emit(GameEvent::Beam {
                from: origin,
                to: origin + pellet * range,
                weapon: WeaponKind::Spread,
            });
        }

        self.live_targets()
            .filter(|t| {
                angle_to_point(origin, dir, t.pos) <= cone && origin.distance(t.pos) <= range
            })
            .map(|t| t.id.clone())
            .collect()
    }

    fn explosive_candidates(&mut self, scene: &dyn SceneQuery, origin: Vec3, dir: Vec3) -> Vec<TargetId> {
        let max_range = self.tuning.explosive_max_range;
        let impact = self
            .solid_hits(scene, origin, dir)
            .into_iter()
            .next()
            .filter(|hit| hit.distance <= max_range)
            .map(|hit| hit.point)
            .unwrap_or(origin + dir * max_range);

        let radius = self.tuning.explosion_radius;
        self.emit(GameEvent::Beam {
            from: origin,
            to: impact,
            weapon: WeaponKind::Explosive,
        });
        self.emit(GameEvent::Explosion { at: impact, radius });

        self.live_targets()
            .filter(|t| sphere_contains_point(impact, radius, t.pos))
            .map(|t| t.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Target;
    use crate::tuning::Tuning;

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

    /// Player at the origin looking down -Z, all targets mature
    fn range_with(targets: Vec<Target>, weapon: WeaponKind) -> GameState {
        let mut state = GameState::new(Tuning::default(), 9);
        state.targets = targets;
        state.pickups.clear();
        state.player.pos = Vec3::ZERO;
        state.time = 10.0;
        state.armory.select(weapon);
        state
    }

    fn fire(state: &mut GameState) -> Result<ShotOutcome, FireError> {
        let scene = ArenaScene::snapshot(state);
        state.fire_selected(&scene)
    }

    fn sounds(state: &GameState, cue: SoundCue) -> usize {
        state
            .events
            .iter()
            .filter(|e| **e == GameEvent::PlaySound(cue))
            .count()
    }

    #[test]
    fn test_scene_orders_by_distance() {
        let state = range_with(
            vec![
                target(1, Vec3::new(0.0, 0.0, -30.0), 2.0),
                target(2, Vec3::new(0.0, 0.0, -10.0), 2.0),
            ],
            WeaponKind::Laser,
        );
        let hits = ArenaScene::snapshot(&state).raycast(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].object, RayObject::Target(TargetId::from(2)));
        assert_eq!(hits[1].object, RayObject::Target(TargetId::from(1)));
        assert_eq!(hits[2].object, RayObject::Scenery);
        assert!((hits[0].distance - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_laser_hits_only_nearest() {
        let mut state = range_with(
            vec![
                target(1, Vec3::new(0.0, 0.0, -30.0), 1.0),
                target(2, Vec3::new(0.0, 0.0, -10.0), 1.0),
            ],
            WeaponKind::Laser,
        );
        let shot = fire(&mut state).expect("laser ready");
        assert_eq!(shot.hits, vec![(TargetId::from(2), HitOutcome::Eliminated)]);
        assert!(!state.targets[0].is_hit);
        assert_eq!(state.stats.hits, 1);
        assert_eq!(sounds(&state, SoundCue::Hit), 1);
        assert_eq!(sounds(&state, SoundCue::Miss), 0);
    }

    #[test]
    fn test_laser_skips_dead_targets() {
        let mut dead = target(2, Vec3::new(0.0, 0.0, -10.0), 1.0);
        dead.is_hit = true;
        let mut state = range_with(
            vec![target(1, Vec3::new(0.0, 0.0, -30.0), 1.0), dead],
            WeaponKind::Laser,
        );
        let shot = fire(&mut state).expect("laser ready");
        assert_eq!(shot.hits[0].0, TargetId::from(1));
    }

    #[test]
    fn test_laser_miss_is_counted_once() {
        let mut state = range_with(vec![target(1, Vec3::new(20.0, 0.0, 0.0), 1.0)], WeaponKind::Laser);
        let shot = fire(&mut state).expect("laser ready");
        assert!(shot.is_miss());
        assert_eq!(state.stats.misses, 1);
        assert_eq!(sounds(&state, SoundCue::Miss), 1);
        assert_eq!(sounds(&state, SoundCue::Shoot), 1);
    }

    #[test]
    fn test_spread_hits_every_target_in_cone() {
        let mut state = range_with(
            vec![
                target(1, Vec3::new(0.0, 0.0, -20.0), 1.0),
                target(2, Vec3::new(2.0, 0.0, -20.0), 1.0),
                target(3, Vec3::new(0.0, 0.0, -150.0), 1.0),
                target(4, Vec3::new(20.0, 0.0, -5.0), 1.0),
            ],
            WeaponKind::Spread,
        );
        let shot = fire(&mut state).expect("spread ready");
        let ids: Vec<_> = shot.hits.iter().map(|(id, _)| id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(state.stats.hits, 2);
        assert_eq!(state.stats.misses, 0);

        let beams = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Beam { weapon: WeaponKind::Spread, .. }))
            .count();
        assert_eq!(beams, state.tuning.spread_pellets as usize);
    }

    #[test]
    fn test_spread_miss_signalled_once() {
        let mut state = range_with(vec![], WeaponKind::Spread);
        fire(&mut state).expect("spread ready");
        assert_eq!(sounds(&state, SoundCue::Miss), 1);
        assert_eq!(state.stats.misses, 1);
    }

    #[test]
    fn test_young_target_counts_as_miss() {
        let mut young = target(1, Vec3::new(0.0, 0.0, -20.0), 4.0);
        young.spawn_time = 9.9;
        let mut state = range_with(vec![young], WeaponKind::Spread);
        let shot = fire(&mut state).expect("spread ready");
        assert!(shot.is_miss());
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.stats.misses, 1);
    }

    #[test]
    fn test_explosive_blast_radius() {
        let mut state = range_with(
            vec![
                target(1, Vec3::new(0.0, 0.0, -40.0), 4.0),
                target(2, Vec3::new(30.0, 0.0, -40.0), 1.0),
                target(3, Vec3::new(0.0, 45.0, 40.0), 1.0),
            ],
            WeaponKind::Explosive,
        );
        state.tuning.explosion_radius = 35.0;
        let shot = fire(&mut state).expect("explosive ready");
        assert_eq!(shot.hits.len(), 2);
        assert!(matches!(shot.hits[0].1, HitOutcome::Split(_)));
        assert_eq!(shot.hits[1], (TargetId::from(2), HitOutcome::Eliminated));
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::Explosion { .. })));
    }

    fn explosion_point(state: &GameState) -> Option<Vec3> {
        state.events.iter().find_map(|e| match e {
            GameEvent::Explosion { at, .. } => Some(*at),
            _ => None,
        })
    }

    #[test]
    fn test_explosive_impacts_arena_wall() {
        let mut state = range_with(vec![target(1, Vec3::new(0.0, 0.0, -100.0), 1.0)], WeaponKind::Explosive);
        state.player.pos = Vec3::new(0.0, 0.0, 45.0);
        state.tuning.explosion_radius = 10.0;
        let shot = fire(&mut state).expect("explosive ready");
        assert!(shot.is_miss());
        // The wall at z = -50 is 95 units away, inside the 100 unit range
        let at = explosion_point(&state).expect("explosion");
        assert!((at - Vec3::new(0.0, 0.0, -50.0)).length() < 1e-3);
    }

    #[test]
    fn test_snapshot_leaves_out_dead_targets() {
        let mut dead = target(2, Vec3::new(0.0, 0.0, -10.0), 1.0);
        dead.is_hit = true;
        let state = range_with(
            vec![target(1, Vec3::new(0.0, 0.0, -30.0), 1.0), dead],
            WeaponKind::Laser,
        );
        let hits = ArenaScene::snapshot(&state).raycast(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(hits[0].object, RayObject::Target(TargetId::from(1)));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_explosive_passes_through_dead_targets() {
        let mut dead = target(2, Vec3::new(0.0, 0.0, 40.0), 1.0);
        dead.is_hit = true;
        let mut state = range_with(
            vec![target(1, Vec3::new(0.0, 0.0, -20.0), 1.0), dead],
            WeaponKind::Explosive,
        );
        state.player.pos = Vec3::new(0.0, 0.0, 45.0);
        state.tuning.explosion_radius = 10.0;

        let shot = fire(&mut state).expect("explosive ready");
        assert_eq!(shot.hits, vec![(TargetId::from(1), HitOutcome::Eliminated)]);
        let at = explosion_point(&state).expect("explosion");
        assert!((at - Vec3::new(0.0, 0.0, -19.5)).length() < 1e-3);
    }

    #[test]
    fn test_stale_scene_dead_target_does_not_block() {
        let mut state = range_with(
            vec![
                target(1, Vec3::new(0.0, 0.0, -30.0), 1.0),
                target(2, Vec3::new(0.0, 0.0, -10.0), 1.0),
            ],
            WeaponKind::Laser,
        );
        // Scene captured before target 2 went down still reports it
        let scene = ArenaScene::snapshot(&state);
        state.targets[1].is_hit = true;

        let shot = state.fire_selected(&scene).expect("laser ready");
        assert_eq!(shot.hits, vec![(TargetId::from(1), HitOutcome::Eliminated)]);
        let beam_end = state.events.iter().find_map(|e| match e {
            GameEvent::Beam { to, .. } => Some(*to),
            _ => None,
        });
        let beam_end = beam_end.expect("beam");
        assert!((beam_end - Vec3::new(0.0, 0.0, -29.5)).length() < 1e-3);
    }

    struct EmptyScene;

    impl SceneQuery for EmptyScene {
        fn raycast(&self, _origin: Vec3, _dir: Vec3) -> Vec<RayHit> {
            Vec::new()
        }
    }

    #[test]
    fn test_explosive_falls_back_to_max_range() {
        let mut state = range_with(vec![target(1, Vec3::new(0.0, 0.0, -95.0), 1.0)], WeaponKind::Explosive);
        state.tuning.explosion_radius = 10.0;
        let shot = state.fire_selected(&EmptyScene).expect("explosive ready");
        let at = explosion_point(&state).expect("explosion");
        assert!((at - Vec3::new(0.0, 0.0, -100.0)).length() < 1e-3);
        assert_eq!(shot.hits, vec![(TargetId::from(1), HitOutcome::Eliminated)]);
    }

    #[test]
    fn test_cooldown_rejects_without_side_effects() {
        let mut state = range_with(vec![target(1, Vec3::new(0.0, 0.0, -20.0), 1.0)], WeaponKind::Spread);
        fire(&mut state).expect("spread ready");
        state.events.clear();

        let err = fire(&mut state).unwrap_err();
        assert!(matches!(err, FireError::CoolingDown { .. }));
        assert_eq!(state.events, vec![GameEvent::PlaySound(SoundCue::Miss)]);
        assert_eq!(state.stats.misses, 0);
    }

    #[test]
    fn test_empty_weapon_plays_empty_cue() {
        let mut state = range_with(vec![], WeaponKind::Laser);
        for _ in 0..10 {
            fire(&mut state).expect("laser has no cooldown");
        }
        state.events.clear();
        let err = fire(&mut state).unwrap_err();
        assert_eq!(err, FireError::OutOfAmmo { weapon: WeaponKind::Laser });
        assert_eq!(state.events, vec![GameEvent::PlaySound(SoundCue::Empty)]);
    }

    #[test]
    fn test_last_round_cooling_down_plays_empty_cue() {
        let mut state = range_with(vec![], WeaponKind::Explosive);
        for _ in 0..5 {
            state.armory.tick(1.0);
            fire(&mut state).expect("explosive ready");
        }
        state.events.clear();
        let err = fire(&mut state).unwrap_err();
        assert_eq!(err, FireError::OutOfAmmo { weapon: WeaponKind::Explosive });
        assert_eq!(state.events, vec![GameEvent::PlaySound(SoundCue::Empty)]);
    }

    #[test]
    fn test_rapid_fire_halves_cooldown_on_shot() {
        let mut state = range_with(vec![], WeaponKind::Spread);
        state.apply_power_up(crate::sim::PowerUpKind::RapidFire);
        fire(&mut state).expect("spread ready");
        assert_eq!(state.armory.slot(WeaponKind::Spread).cooldown, 0.15);
    }

    #[test]
    fn test_no_firing_after_game_over() {
        let mut state = range_with(vec![], WeaponKind::Laser);
        state.end_game(crate::sim::GameOverReason::FieldCleared);
        assert_eq!(fire(&mut state).unwrap_err(), FireError::GameOver);
        assert_eq!(state.armory.slot(WeaponKind::Laser).ammo, 10);
    }
}
