//! Sphere and ray primitives, and the player's contact checks
//!
//! Everything in the arena is a sphere for collision purposes: targets
//! (radius = size / 2), the player body, pickups and explosion blasts.

use glam::Vec3;

use super::state::{GameEvent, GameState};
use super::targets::split;

/// Whether two spheres overlap (touching does not count)
#[inline]
pub fn spheres_overlap(a: Vec3, ra: f32, b: Vec3, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Whether a point lies inside or on a sphere
#[inline]
pub fn sphere_contains_point(center: Vec3, radius: f32, point: Vec3) -> bool {
    center.distance_squared(point) <= radius * radius
}

/// Distance along a unit ray to the first point on a sphere's surface.
///
/// A ray starting inside the sphere reports the exit distance.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let near = -b - sqrt_disc;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sqrt_disc;
    (far >= 0.0).then_some(far)
}

/// Distance along a unit ray until it leaves an origin-centred cube.
///
/// Returns `None` when the ray starts outside the cube.
pub fn ray_exit_cube(origin: Vec3, dir: Vec3, half_extent: f32) -> Option<f32> {
    if origin.abs().max_element() > half_extent {
        return None;
    }
    let mut exit = f32::INFINITY;
    for axis in 0..3 {
        let d = dir[axis];
        if d.abs() < f32::EPSILON {
            continue;
        }
        let wall = if d > 0.0 { half_extent } else { -half_extent };
        exit = exit.min((wall - origin[axis]) / d);
    }
    exit.is_finite().then_some(exit)
}

/// Player-hit damage for a target of the given size, between 5 and 20
pub fn contact_damage(size: f32) -> f32 {
    (size * 2.0).round().clamp(5.0, 20.0)
}

impl GameState {
    /// Resolve at most one player-target contact.
    ///
    /// The first live target overlapping the player either shatters (large
    /// targets) or strikes the player and is marked hit. Young targets are not
    /// exempt.
    pub fn tick_player_collision(&mut self) {
        let player_pos = self.player.pos;
        let player_radius = self.tuning.player_collision_radius;
        let Some(idx) = self
            .targets
            .iter()
            .position(|t| t.is_live() && spheres_overlap(player_pos, player_radius, t.pos, t.radius()))
        else {
            return;
        };

        if self.targets[idx].can_split() {
            let target = self.targets.remove(idx);
            log::debug!("Player shattered target {}", target.id);
            let fragments = split(&target, self.time, self.tuning.target_drift, &mut self.rng);
            self.targets.extend(fragments);
            self.emit(GameEvent::TargetSplit { parent: target.id });
        } else {
            let size = self.targets[idx].size;
            self.targets[idx].is_hit = true;
            log::debug!("Player struck by target {}", self.targets[idx].id);
            self.on_player_hit(size);
        }
    }

    /// Collect every pickup the player is touching
    pub fn tick_pickups(&mut self) {
        let player_pos = self.player.pos;
        let reach = self.tuning.player_pickup_radius;
        let radius = self.tuning.pickup_radius;

        let (touched, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pickups)
            .into_iter()
            .partition(|p| spheres_overlap(player_pos, reach, p.pos, radius));
        self.pickups = remaining;

        for pickup in touched {
            log::info!("Collected {:?} pickup #{}", pickup.kind, pickup.id);
            self.apply_power_up(pickup.kind);
        }
    }
}
