//! Weapons: ammunition, cooldowns and selection
//!
//! Each weapon cycles `Ready → Cooldown → Ready` while it has ammo. An empty
//! weapon stays empty until a reload, which refills every weapon at once and
//! leaves cooldowns alone.

use serde::{Deserialize, Serialize};

use crate::error::FireError;
use crate::tuning::Tuning;

/// Weapon types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Shotgun cone, hits everything inside it
    #[default]
    Spread,
    /// Single ray, first target along it
    Laser,
    /// Area blast at the impact point
    Explosive,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Spread, WeaponKind::Laser, WeaponKind::Explosive];

    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::Spread => "Spread Shot",
            WeaponKind::Laser => "Laser Beam",
            WeaponKind::Explosive => "Explosive Shot",
        }
    }

    /// Weapon bound to a number key (1-based)
    pub fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            1 => Some(WeaponKind::Spread),
            2 => Some(WeaponKind::Laser),
            3 => Some(WeaponKind::Explosive),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            WeaponKind::Spread => 0,
            WeaponKind::Laser => 1,
            WeaponKind::Explosive => 2,
        }
    }
}

/// Readiness of a single weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponStatus {
    Ready,
    CoolingDown,
    Empty,
}

/// Live ammo and cooldown for one weapon
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponSlot {
    pub kind: WeaponKind,
    pub max_ammo: u32,
    pub ammo: u32,
    /// Configured seconds between shots
    pub base_cooldown: f32,
    /// Seconds until the next shot is allowed
    pub cooldown: f32,
}

/// All weapons carried by the player
#[derive(Debug, Clone, PartialEq)]
pub struct Armory {
    pub selected: WeaponKind,
    slots: [WeaponSlot; 3],
    /// Cooldown multiplier while rapid fire is active
    rapid_fire_scale: f32,
}

impl Armory {
    /// Fully loaded, all cooldowns clear
    pub fn new(tuning: &Tuning) -> Self {
        let slot = |kind: WeaponKind| {
            let t = tuning.weapon(kind);
            WeaponSlot {
                kind,
                max_ammo: t.max_ammo,
                ammo: t.max_ammo,
                base_cooldown: t.cooldown,
                cooldown: 0.0,
            }
        };
        Self {
            selected: WeaponKind::default(),
            slots: WeaponKind::ALL.map(slot),
            rapid_fire_scale: tuning.rapid_fire_cooldown_scale,
        }
    }

    pub fn slot(&self, kind: WeaponKind) -> &WeaponSlot {
        &self.slots[kind.index()]
    }

    pub fn select(&mut self, kind: WeaponKind) {
        if self.selected != kind {
            log::debug!("Selected {}", kind.name());
            self.selected = kind;
        }
    }

    pub fn status(&self, kind: WeaponKind) -> WeaponStatus {
        let slot = self.slot(kind);
        if slot.ammo == 0 {
            WeaponStatus::Empty
        } else if slot.cooldown > 0.0 {
            WeaponStatus::CoolingDown
        } else {
            WeaponStatus::Ready
        }
    }

    pub fn can_fire(&self, kind: WeaponKind) -> bool {
        self.status(kind) == WeaponStatus::Ready
    }

    /// Spend one round and start the cooldown.
    ///
    /// Nothing changes when the weapon is not ready.
    pub fn fire(&mut self, kind: WeaponKind, rapid_fire: bool) -> Result<(), FireError> {
        let scale = if rapid_fire { self.rapid_fire_scale } else { 1.0 };
        let slot = &mut self.slots[kind.index()];
        if slot.ammo == 0 {
            return Err(FireError::OutOfAmmo { weapon: kind });
        }
        if slot.cooldown > 0.0 {
            return Err(FireError::CoolingDown {
                weapon: kind,
                remaining: slot.cooldown,
            });
        }
        slot.ammo -= 1;
        slot.cooldown = slot.base_cooldown * scale;
        Ok(())
    }

    /// Count every cooldown down by `dt`, flooring at zero
    pub fn tick(&mut self, dt: f32) {
        for slot in &mut self.slots {
            if slot.cooldown > 0.0 {
                slot.cooldown = (slot.cooldown - dt).max(0.0);
            }
        }
    }

    /// Refill every weapon to its maximum
    pub fn reload(&mut self) {
        for slot in &mut self.slots {
            slot.ammo = slot.max_ammo;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn armory() -> Armory {
        Armory::new(&Tuning::default())
    }

    #[test]
    fn test_starts_ready_and_full() {
        let a = armory();
        for kind in WeaponKind::ALL {
            assert!(a.can_fire(kind));
            assert_eq!(a.slot(kind).ammo, a.slot(kind).max_ammo);
        }
        assert_eq!(a.selected, WeaponKind::Spread);
    }

    #[test]
    fn test_fire_spends_ammo_and_starts_cooldown() {
        let mut a = armory();
        a.fire(WeaponKind::Spread, false).expect("ready");
        assert_eq!(a.slot(WeaponKind::Spread).ammo, 29);
        assert_eq!(a.slot(WeaponKind::Spread).cooldown, 0.3);
        assert_eq!(a.status(WeaponKind::Spread), WeaponStatus::CoolingDown);
    }

    #[test]
    fn test_cooldown_gates_until_exactly_zero() {
        let mut a = armory();
        a.fire(WeaponKind::Explosive, false).expect("ready");
        a.tick(0.5);
        assert!(matches!(
            a.fire(WeaponKind::Explosive, false),
            Err(FireError::CoolingDown { .. })
        ));
        assert_eq!(a.slot(WeaponKind::Explosive).ammo, 4);

        a.tick(0.5);
        assert_eq!(a.slot(WeaponKind::Explosive).cooldown, 0.0);
        assert!(a.fire(WeaponKind::Explosive, false).is_ok());
    }

    #[test]
    fn test_cooldown_floors_at_zero() {
        let mut a = armory();
        a.fire(WeaponKind::Spread, false).expect("ready");
        a.tick(5.0);
        assert_eq!(a.slot(WeaponKind::Spread).cooldown, 0.0);
    }

    #[test]
    fn test_rapid_fire_halves_cooldown() {
        let mut a = armory();
        a.fire(WeaponKind::Explosive, true).expect("ready");
        assert_eq!(a.slot(WeaponKind::Explosive).cooldown, 0.5);
    }

    #[test]
    fn test_empty_until_reload() {
        let mut a = armory();
        for _ in 0..10 {
            a.fire(WeaponKind::Laser, false).expect("laser has no cooldown");
        }
        assert_eq!(a.status(WeaponKind::Laser), WeaponStatus::Empty);
        assert_eq!(
            a.fire(WeaponKind::Laser, false),
            Err(FireError::OutOfAmmo { weapon: WeaponKind::Laser })
        );
        assert_eq!(a.slot(WeaponKind::Laser).ammo, 0);

        a.fire(WeaponKind::Spread, false).expect("ready");
        a.reload();
        assert_eq!(a.slot(WeaponKind::Laser).ammo, 10);
        // Reload leaves cooldowns alone
        assert_eq!(a.slot(WeaponKind::Spread).cooldown, 0.3);
    }

    #[test]
    fn test_empty_reported_before_cooldown() {
        let mut a = armory();
        for _ in 0..4 {
            a.fire(WeaponKind::Explosive, false).expect("ready");
            a.tick(1.0);
        }
        a.fire(WeaponKind::Explosive, false).expect("last round");
        assert!(a.slot(WeaponKind::Explosive).cooldown > 0.0);
        assert_eq!(
            a.fire(WeaponKind::Explosive, false),
            Err(FireError::OutOfAmmo { weapon: WeaponKind::Explosive })
        );
    }

    #[test]
    fn test_from_slot() {
        assert_eq!(WeaponKind::from_slot(1), Some(WeaponKind::Spread));
        assert_eq!(WeaponKind::from_slot(3), Some(WeaponKind::Explosive));
        assert_eq!(WeaponKind::from_slot(4), None);
    }

    proptest! {
        #[test]
        fn prop_ammo_never_increases_without_reload(
            actions in prop::collection::vec((0u8..3, any::<bool>(), 0.0f32..0.5), 0..200)
        ) {
            let mut a = armory();
            let mut last: Vec<u32> = WeaponKind::ALL.iter().map(|k| a.slot(*k).ammo).collect();
            for (w, rapid, dt) in actions {
                let kind = WeaponKind::ALL[w as usize];
                let before = a.slot(kind).ammo;
                let result = a.fire(kind, rapid);
                if before == 0 {
                    prop_assert!(result.is_err());
                }
                a.tick(dt);
                for (i, k) in WeaponKind::ALL.iter().enumerate() {
                    prop_assert!(a.slot(*k).ammo <= last[i]);
                    prop_assert!(a.slot(*k).cooldown >= 0.0);
                    last[i] = a.slot(*k).ammo;
                }
            }
        }
    }
}
