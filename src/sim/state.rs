//! Game state and core simulation types
//!
//! One mutable store for everything the per-frame pipeline touches. Outbound
//! calls to audio, visual effects and input capture are queued as
//! [`GameEvent`]s instead of being invoked directly.

use std::fmt;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::powerups::{ActiveEffects, PowerUpKind};
use super::weapons::{Armory, WeaponKind};
use crate::consts::*;
use crate::highscores::Records;
use crate::tuning::Tuning;
use crate::forward_from_angles;

/// Target identifier. Fragments extend their parent's id (`3` → `3-1`, `3-2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(String);

impl TargetId {
    /// Id of the `n`th fragment split from this target
    pub fn fragment(&self, n: u8) -> Self {
        Self(format!("{}-{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u32> for TargetId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display color bucket, derived from size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetColor {
    Blue,
    Purple,
    OrangeRed,
    Cyan,
    Yellow,
}

impl TargetColor {
    pub fn for_size(size: f32) -> Self {
        if size > 4.0 {
            TargetColor::Blue
        } else if size > 3.0 {
            TargetColor::Purple
        } else if size > 2.0 {
            TargetColor::OrangeRed
        } else if size > 1.0 {
            TargetColor::Cyan
        } else {
            TargetColor::Yellow
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            TargetColor::Blue => "#0000ff",
            TargetColor::Purple => "#800080",
            TargetColor::OrangeRed => "#ff4500",
            TargetColor::Cyan => "#00ffff",
            TargetColor::Yellow => "#ffff00",
        }
    }
}

/// A destructible, drifting target
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub pos: Vec3,
    /// Drift direction and base rate (units/s), scaled by `speed`
    pub vel: Vec3,
    pub size: f32,
    /// Movement-rate multiplier
    pub speed: f32,
    pub is_hit: bool,
    /// Simulation time (s) at creation
    pub spawn_time: f32,
}

impl Target {
    /// Bounding sphere radius
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    #[inline]
    pub fn color(&self) -> TargetColor {
        TargetColor::for_size(self.size)
    }

    /// Still in play (not yet hit)
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.is_hit
    }

    /// Old enough to be hit or split by another target
    #[inline]
    pub fn is_mature(&self, now: f32, min_alive_time: f32) -> bool {
        now - self.spawn_time > min_alive_time
    }

    /// Large enough to break into fragments rather than be eliminated
    #[inline]
    pub fn can_split(&self) -> bool {
        self.size > MIN_SPLIT_SIZE
    }
}

/// The player's camera body
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec3,
    pub vel: Vec3,
    /// Look angles (radians)
    pub yaw: f32,
    pub pitch: f32,
    pub health: f32,
    /// Absorbs exactly one hit, then drops
    pub shield: bool,
    /// Whether thrust keys were held last tick (drives the thruster cue)
    pub thrusting: bool,
}

impl Player {
    pub fn new(pos: Vec3) -> Self {
        Self {
            pos,
            vel: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            health: MAX_HEALTH,
            shield: false,
            thrusting: false,
        }
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        forward_from_angles(self.yaw, self.pitch)
    }
}

/// A collectible sitting in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec3,
}

/// Shot counters and the score derived from them
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub hits: u32,
    pub misses: u32,
    pub score: u64,
}

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Health reached zero
    HealthDepleted,
    /// No live targets remain
    FieldCleared,
}

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Terminal for this session; only a restart leaves it
    GameOver(GameOverReason),
}

/// Named sound triggers understood by the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Background music (idempotent when already playing)
    Bgm,
    Shoot,
    Hit,
    Miss,
    Empty,
    GameOver,
}

/// Overlay colors for screen flashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashColor {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Orange,
}

impl FlashColor {
    /// CSS color for the overlay
    pub fn css(&self) -> &'static str {
        match self {
            FlashColor::Red => "rgba(255,0,0,0.3)",
            FlashColor::Green => "rgba(0,255,0,0.3)",
            FlashColor::Blue => "rgba(0,0,255,0.3)",
            FlashColor::Yellow => "rgba(255,255,0,0.3)",
            FlashColor::Purple => "rgba(128,0,128,0.3)",
            FlashColor::Orange => "rgba(255,165,0,0.3)",
        }
    }
}

/// Outbound notifications for collaborators outside the simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    PlaySound(SoundCue),
    PauseSound(SoundCue),
    ThrusterVolume(f32),
    Flash { color: FlashColor, duration_ms: u32 },
    /// Cosmetic beam from the muzzle to an end point
    Beam { from: Vec3, to: Vec3, weapon: WeaponKind },
    Explosion { at: Vec3, radius: f32 },
    TargetSplit { parent: TargetId },
    TargetEliminated { target: TargetId },
    PlayerHit { damage: f32 },
    ShieldAbsorbed,
    PowerUpCollected(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    GameOver(GameOverReason),
    /// Persisted bests improved; the host should write them out
    RecordsImproved { high_score: Option<u64>, best_accuracy: Option<f32> },
    ReleasePointerLock,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation clock (seconds)
    pub time: f32,
    pub phase: GamePhase,
    pub player: Player,
    /// Target store, in spawn order
    pub targets: Vec<Target>,
    pub armory: Armory,
    /// Uncollected pickups
    pub pickups: Vec<Pickup>,
    pub effects: ActiveEffects,
    pub stats: SessionStats,
    /// Persisted bests, loaded by the host
    pub records: Records,
    /// Pending outbound events (drained by the host each frame)
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given balance and seed
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut state = Self {
            player: Player::new(tuning.player_start),
            armory: Armory::new(&tuning),
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            phase: GamePhase::Playing,
            targets: Vec::new(),
            pickups: Vec::new(),
            effects: ActiveEffects::default(),
            stats: SessionStats::default(),
            records: Records::default(),
            events: Vec::new(),
        };
        state.spawn_initial();
        state.spawn_pickups();
        state
    }

    /// Reset the session, keeping balance and persisted records
    pub fn restart(&mut self, seed: u64) {
        let records = self.records;
        *self = Self::new(self.tuning.clone(), seed);
        self.records = records;
        log::info!("Session restarted with seed {}", seed);
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver(_))
    }

    /// Queue an outbound event
    #[inline]
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn target(&self, id: &TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| &t.id == id)
    }

    /// Targets still in play
    pub fn live_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.is_live())
    }

    fn spawn_pickups(&mut self) {
        self.pickups = self
            .tuning
            .pickups
            .iter()
            .enumerate()
            .map(|(i, spawn)| Pickup {
                id: i as u32 + 1,
                kind: spawn.kind,
                pos: spawn.position,
            })
            .collect();
    }
}
