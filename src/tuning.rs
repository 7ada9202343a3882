//! Data-driven game balance
//!
//! Every number the combat core consults lives here so a mode preset or a JSON
//! override can change the feel of the game without touching the simulation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::sim::{PowerUpKind, WeaponKind};

/// Which shooting range to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Four big asteroids that shatter into faster fragments
    #[default]
    Asteroid,
    /// Ten small targets ringed around the player (the FPS prototype)
    Gallery,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Asteroid => "Asteroid",
            GameMode::Gallery => "Gallery",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asteroid" | "asteroids" => Some(GameMode::Asteroid),
            "gallery" | "fps" => Some(GameMode::Gallery),
            _ => None,
        }
    }
}

/// Initial placement of one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSpawn {
    pub position: Vec3,
    pub size: f32,
    pub speed: f32,
}

/// World placement of one collectible
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupSpawn {
    pub position: Vec3,
    pub kind: PowerUpKind,
}

/// Ammunition and cooldown for one weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponTuning {
    pub max_ammo: u32,
    /// Seconds between shots
    pub cooldown: f32,
}

/// Complete balance table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub mode: GameMode,

    // === Targets ===
    pub roster: Vec<TargetSpawn>,
    /// Seconds a fresh target is immune to hits and target-target splits
    pub min_alive_time: f32,
    /// Largest per-axis drift velocity (units/s) before the speed multiplier
    pub target_drift: f32,

    // === Player ===
    pub player_start: Vec3,
    /// Radius of the sphere used for player-target collisions
    pub player_collision_radius: f32,
    /// Radius of the sphere used for picking up power-ups
    pub player_pickup_radius: f32,
    pub player_accel: f32,
    pub player_max_speed: f32,
    pub boost_accel: f32,
    pub boost_max_speed: f32,
    /// Fraction of velocity retained after one second without thrust
    pub player_damping: f32,

    // === Weapons ===
    pub spread: WeaponTuning,
    pub laser: WeaponTuning,
    pub explosive: WeaponTuning,
    /// Half-angle (radians) of the spread cone
    pub spread_cone: f32,
    pub spread_range: f32,
    /// Cosmetic pellet beams drawn per spread shot
    pub spread_pellets: u32,
    pub laser_range: f32,
    /// Beam length drawn when the laser hits nothing
    pub laser_beam_length: f32,
    pub explosion_radius: f32,
    pub explosive_max_range: f32,
    /// Cooldown multiplier applied while rapid fire is active
    pub rapid_fire_cooldown_scale: f32,

    // === Power-ups ===
    pub pickups: Vec<PickupSpawn>,
    /// Radius of a pickup's collection sphere
    pub pickup_radius: f32,
    /// Seconds a timed power-up stays active
    pub power_up_duration: f32,
    pub health_pickup_amount: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::for_mode(GameMode::Asteroid)
    }
}

impl Tuning {
    /// Balance preset for a mode
    pub fn for_mode(mode: GameMode) -> Self {
        let base = Self {
            mode,
            roster: asteroid_roster(),
            min_alive_time: 2.0,
            target_drift: 0.6,

            player_start: Vec3::new(0.0, 0.0, 40.0),
            player_collision_radius: 2.0,
            player_pickup_radius: 1.5,
            player_accel: 20.0,
            player_max_speed: 10.0,
            boost_accel: 60.0,
            boost_max_speed: 30.0,
            player_damping: 0.3,

            spread: WeaponTuning {
                max_ammo: 30,
                cooldown: 0.3,
            },
            laser: WeaponTuning {
                max_ammo: 10,
                cooldown: 0.0,
            },
            explosive: WeaponTuning {
                max_ammo: 5,
                cooldown: 1.0,
            },
            spread_cone: 0.25,
            spread_range: 100.0,
            spread_pellets: 10,
            laser_range: 400.0,
            laser_beam_length: 100.0,
            explosion_radius: 50.0,
            explosive_max_range: 100.0,
            rapid_fire_cooldown_scale: 0.5,

            pickups: default_pickups(),
            pickup_radius: 2.5,
            power_up_duration: 10.0,
            health_pickup_amount: 25.0,
        };

        match mode {
            GameMode::Asteroid => base,
            GameMode::Gallery => Self {
                roster: gallery_roster(),
                min_alive_time: 0.5,
                player_collision_radius: 3.0,
                player_start: Vec3::new(0.0, 1.0, 0.0),
                ..base
            },
        }
    }

    /// Parse a JSON override. Missing fields fall back to the Asteroid preset.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Ammo/cooldown entry for a weapon
    pub fn weapon(&self, kind: WeaponKind) -> WeaponTuning {
        match kind {
            WeaponKind::Spread => self.spread,
            WeaponKind::Laser => self.laser,
            WeaponKind::Explosive => self.explosive,
        }
    }
}

fn asteroid_roster() -> Vec<TargetSpawn> {
    [
        Vec3::new(15.0, 0.0, 0.0),
        Vec3::new(-15.0, 0.0, 0.0),
        Vec3::new(0.0, 15.0, 0.0),
        Vec3::new(0.0, -15.0, 0.0),
    ]
    .into_iter()
    .map(|position| TargetSpawn {
        position,
        size: 10.0,
        speed: 10.0,
    })
    .collect()
}

/// Ten targets on a ring around the origin at staggered heights
fn gallery_roster() -> Vec<TargetSpawn> {
    (0..10)
        .map(|i| {
            let theta = std::f32::consts::TAU * i as f32 / 10.0;
            let height = if i % 2 == 0 { 2.0 } else { 6.0 };
            TargetSpawn {
                position: Vec3::new(theta.cos() * 25.0, height, theta.sin() * 25.0),
                size: 2.0,
                speed: 1.0,
            }
        })
        .collect()
}

/// Three of each collectible, laid out in short diagonal lines
fn default_pickups() -> Vec<PickupSpawn> {
    use PowerUpKind::*;
    [
        (Health, [10.0, 10.0, 0.0]),
        (Health, [13.0, 22.0, 0.0]),
        (Health, [16.0, 34.0, 0.0]),
        (Shield, [-10.0, 10.0, 0.0]),
        (Shield, [-13.0, 22.0, 0.0]),
        (Shield, [-16.0, 34.0, 0.0]),
        (RapidFire, [0.0, -10.0, 0.0]),
        (RapidFire, [3.0, -22.0, 0.0]),
        (RapidFire, [6.0, -34.0, 0.0]),
        (SlowMotion, [0.0, 0.0, 10.0]),
        (SlowMotion, [3.0, 12.0, 12.0]),
        (SlowMotion, [6.0, 24.0, 14.0]),
        (Invincibility, [15.0, 0.0, 0.0]),
        (Invincibility, [18.0, 12.0, 0.0]),
        (Invincibility, [21.0, 24.0, 0.0]),
        (SpeedBoost, [-15.0, 0.0, 0.0]),
        (SpeedBoost, [-18.0, 12.0, 0.0]),
        (SpeedBoost, [-21.0, 24.0, 0.0]),
    ]
    .into_iter()
    .map(|(kind, p)| PickupSpawn {
        position: Vec3::from_array(p),
        kind,
    })
    .collect()
}
