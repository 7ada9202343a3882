//! Fixed timestep simulation tick
//!
//! Core game loop that advances the combat simulation deterministically.
//! Subsystems run in a fixed order so that a target touched by an earlier
//! step (a shot, say) is already marked hit when a later one looks at it:
//!
//! 1. weapon selection and reload
//! 2. player steering
//! 3. trigger pull and hit resolution
//! 4. pickups
//! 5. player-target contact
//! 6. target-target collisions
//! 7. target drift
//! 8. weapon cooldowns
//! 9. power-up countdowns
//! 10. field-cleared check
//!
//! A step that fails is logged and skipped; the rest of the tick still runs.

use glam::{Vec2, Vec3};

use super::hitscan::{ArenaScene, SceneQuery};
use super::state::{GameEvent, GameState};
use super::weapons::WeaponKind;
use crate::error::SimError;

/// Thruster loop volume while any movement key is held
pub const THRUSTER_VOLUME: f32 = 0.3;

/// Pitch limit (just short of straight up/down)
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Held movement keys (W/S/A/D, Space/Shift)
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Look change in radians (x = turn right, y = look down)
    pub look_delta: Vec2,
    /// Trigger pulled this tick
    pub fire: bool,
    /// Weapon hotkey pressed this tick
    pub select: Option<WeaponKind>,
    /// Reload pressed this tick
    pub reload: bool,
}

impl TickInput {
    pub fn is_thrusting(&self) -> bool {
        self.forward || self.back || self.left || self.right || self.up || self.down
    }

    /// Clear the one-shot commands, keeping held keys
    pub fn clear_one_shots(&mut self) {
        self.look_delta = Vec2::ZERO;
        self.fire = false;
        self.select = None;
        self.reload = false;
    }

    /// Desired move direction in world space for the given yaw (not normalized)
    fn wish_dir(&self, yaw: f32) -> Vec3 {
        let axis = |pos: bool, neg: bool| pos as i32 as f32 - neg as i32 as f32;
        let (sy, cy) = yaw.sin_cos();
        let front = Vec3::new(-sy, 0.0, -cy);
        let side = Vec3::new(cy, 0.0, -sy);
        front * axis(self.forward, self.back)
            + side * axis(self.right, self.left)
            + Vec3::Y * axis(self.up, self.down)
    }
}

/// Advance the game state by one fixed timestep against the built-in arena scene
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let scene = if input.fire {
        ArenaScene::snapshot(state)
    } else {
        ArenaScene::default()
    };
    tick_with_scene(state, input, &scene, dt);
}

/// Advance the game state by one fixed timestep, raycasting against `scene`
pub fn tick_with_scene(state: &mut GameState, input: &TickInput, scene: &dyn SceneQuery, dt: f32) {
    // Terminal: nothing moves, fires or counts down
    if state.is_over() {
        return;
    }
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Tick skipped: {}", SimError::NonFiniteDelta { dt });
        return;
    }
    state.time += dt;

    run_step(state, "input", |s| {
        if let Some(kind) = input.select {
            s.armory.select(kind);
        }
        if input.reload {
            s.armory.reload();
            log::info!("Reloaded all weapons");
        }
        Ok(())
    });
    run_step(state, "steer", |s| {
        steer_player(s, input, dt);
        Ok(())
    });
    run_step(state, "fire", |s| {
        if input.fire {
            if let Err(err) = s.fire_selected(scene) {
                log::debug!("Shot rejected: {}", err);
            }
        }
        Ok(())
    });
    run_step(state, "pickups", |s| {
        s.tick_pickups();
        Ok(())
    });
    run_step(state, "player collision", |s| {
        s.tick_player_collision();
        Ok(())
    });
    run_step(state, "target collisions", |s| {
        s.tick_pairwise_collisions();
        Ok(())
    });
    run_step(state, "target movement", |s| s.tick_movement(dt));
    run_step(state, "cooldowns", |s| {
        s.armory.tick(dt);
        Ok(())
    });
    run_step(state, "effects", |s| {
        s.tick_effects(dt);
        Ok(())
    });
    run_step(state, "field check", |s| {
        s.check_field_cleared();
        Ok(())
    });
}

/// Run one pipeline step unless the session already ended, logging any failure
fn run_step(
    state: &mut GameState,
    name: &str,
    step: impl FnOnce(&mut GameState) -> Result<(), SimError>,
) {
    if state.is_over() {
        return;
    }
    if let Err(err) = step(state) {
        log::warn!("{} step failed: {}", name, err);
    }
}

/// Apply look and thrust to the player body
fn steer_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let tuning = &state.tuning;
    let player = &mut state.player;

    player.yaw -= input.look_delta.x;
    player.pitch = (player.pitch - input.look_delta.y).clamp(-MAX_PITCH, MAX_PITCH);

    let (accel, max_speed) = if state.effects.speed_boost_active() {
        (tuning.boost_accel, tuning.boost_max_speed)
    } else {
        (tuning.player_accel, tuning.player_max_speed)
    };

    let wish = input.wish_dir(player.yaw).normalize_or_zero();
    player.vel += wish * accel * dt;
    player.vel *= tuning.player_damping.powf(dt);
    player.vel = player.vel.clamp_length_max(max_speed);
    player.pos += player.vel * dt;

    let thrusting = input.is_thrusting();
    if thrusting != player.thrusting {
        player.thrusting = thrusting;
        let volume = if thrusting { THRUSTER_VOLUME } else { 0.0 };
        state.emit(GameEvent::ThrusterVolume(volume));
    }
}
