//! Salvo exchange math: ships, weapon profiles, and force-level power and
//! damage allocation. Fractional salvos are intentional; values model
//! expected attrition per pulse, not discrete missile counts.

use serde::Serialize;

/// Service life horizon used by the readiness decay term. A hull at this age
/// contributes zero readiness regardless of crew training.
pub const SERVICE_LIFE_YEARS: f64 = 40.0;

/// Immutable characteristics of a missile system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponProfile {
    pub label: String,
    /// Fraction of missiles that leave the launcher successfully.
    pub launch_reliability: f64,
    /// Fraction of launched missiles that strike, absent interception.
    pub hit_probability_offense: f64,
    /// Fraction of incoming missiles an interceptor salvo destroys.
    pub hit_probability_defense: f64,
}

impl WeaponProfile {
    /// Fraction of a nominal salvo that actually damages the target.
    pub fn offensive_efficiency(&self) -> f64 {
        self.launch_reliability * self.hit_probability_offense
    }
}

/// Mutable combat state of a single ship. Hit points are only mutated through
/// [Ship::apply_damage]; status is always derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct Ship {
    pub label: String,
    pub class_label: String,
    /// Missiles launchable per salvo at full strength.
    pub offensive_power: f64,
    /// Interceptors launchable per salvo at full strength.
    pub defensive_power: f64,
    pub max_hit_points: f64,
    hit_points: f64,
    pub age_years: u32,
    pub training: f64,
}

impl Ship {
    /// A ship enters service fully healthy.
    pub fn new(
        label: impl Into<String>,
        class_label: impl Into<String>,
        offensive_power: f64,
        defensive_power: f64,
        max_hit_points: f64,
        age_years: u32,
        training: f64,
    ) -> Self {
        Self {
            label: label.into(),
            class_label: class_label.into(),
            offensive_power,
            defensive_power,
            max_hit_points,
            hit_points: max_hit_points,
            age_years,
            training,
        }
    }

    pub fn hit_points(&self) -> f64 {
        self.hit_points
    }

    /// Remaining combat capability in [0, 1].
    pub fn status(&self) -> f64 {
        self.hit_points / self.max_hit_points
    }

    pub fn offensive_salvo(&self) -> f64 {
        self.offensive_power * self.status()
    }

    pub fn defensive_salvo(&self) -> f64 {
        self.defensive_power * self.status()
    }

    /// Absorb up to `amount` damage and return how much was absorbed.
    /// Negative or excess input is clamped, not rejected; upstream power
    /// arithmetic may overshoot in either direction.
    pub fn apply_damage(&mut self, amount: f64) -> f64 {
        let absorbed = amount.clamp(0.0, self.hit_points);
        self.hit_points -= absorbed;
        absorbed
    }

    /// Crew/platform readiness: linear age decay over the service life,
    /// scaled by training.
    pub fn readiness(&self) -> f64 {
        (1.0 - f64::from(self.age_years) / SERVICE_LIFE_YEARS).max(0.0) * self.training
    }

    pub fn is_sunk(&self) -> bool {
        self.hit_points <= 0.0
    }
}

/// One side's combat group: an ordered squadron sharing a single offensive
/// and a single defensive weapon. The ship sequence is fixed for the life of
/// a battle; sunk ships stay in place as inert entries.
#[derive(Debug, Clone, Serialize)]
pub struct Force {
    pub side_label: String,
    pub ships: Vec<Ship>,
    pub offensive_weapon: WeaponProfile,
    pub defensive_weapon: WeaponProfile,
    /// Fraction of the opposing force that can be targeted.
    pub scouting: f64,
    /// Mean per-ship readiness, fixed at construction.
    pub readiness: f64,
}

impl Force {
    pub fn new(
        side_label: impl Into<String>,
        ships: Vec<Ship>,
        offensive_weapon: WeaponProfile,
        defensive_weapon: WeaponProfile,
        scouting: f64,
    ) -> Self {
        let readiness = average_readiness(&ships);
        Self {
            side_label: side_label.into(),
            ships,
            offensive_weapon,
            defensive_weapon,
            scouting,
            readiness,
        }
    }

    /// Missiles leaving the rails this pulse, before scouting and weapon
    /// efficiency. This is what expenditure accounting charges for.
    pub fn salvo_size(&self) -> f64 {
        self.ships.iter().map(Ship::offensive_salvo).sum()
    }

    /// Interceptors fired this pulse, before readiness and kill probability.
    pub fn interceptor_salvo_size(&self) -> f64 {
        self.ships.iter().map(Ship::defensive_salvo).sum()
    }

    /// Expected missiles that launch, find a target, and hit, assuming no
    /// interception.
    pub fn striking_power(&self) -> f64 {
        self.salvo_size() * self.scouting * self.offensive_weapon.offensive_efficiency()
    }

    /// Expected incoming missiles this force can intercept this pulse.
    pub fn defensive_power(&self) -> f64 {
        self.interceptor_salvo_size() * self.readiness * self.defensive_weapon.hit_probability_defense
    }

    /// Net expected damage delivered to `opponent` this pulse. May be
    /// negative when the opponent's defense fully absorbs the salvo; the
    /// clamp happens at damage application, not here.
    pub fn combat_power_against(&self, opponent: &Force) -> f64 {
        self.striking_power() - opponent.defensive_power()
    }

    /// Equivalent operational hull count; the force's life total.
    pub fn total_status(&self) -> f64 {
        self.ships.iter().map(Ship::status).sum()
    }

    /// Defeated exactly when every ship is at status zero. Damage clamps to
    /// remaining hit points, so the sum bottoms out at exactly 0.0.
    pub fn is_defeated(&self) -> bool {
        self.total_status() <= 0.0
    }

    /// Distribute damage sequentially down the ship list: each surviving ship
    /// absorbs up to its remaining hit points before the next is touched.
    /// Returns total damage absorbed (min of the input and the remaining
    /// hit-point pool).
    pub fn apply_damage(&mut self, total_damage: f64) -> f64 {
        let mut remaining = total_damage.max(0.0);
        let mut absorbed = 0.0;
        for ship in &mut self.ships {
            if remaining <= 0.0 {
                break;
            }
            let taken = ship.apply_damage(remaining);
            remaining -= taken;
            absorbed += taken;
        }
        absorbed
    }

    pub fn ships_sunk(&self) -> usize {
        self.ships.iter().filter(|s| s.is_sunk()).count()
    }

    /// Hulls hit but still afloat.
    pub fn ships_damaged(&self) -> usize {
        self.ships
            .iter()
            .filter(|s| !s.is_sunk() && s.status() < 1.0)
            .count()
    }
}

/// Mean per-ship readiness; 0.0 for an empty squadron.
pub fn average_readiness(ships: &[Ship]) -> f64 {
    if ships.is_empty() {
        return 0.0;
    }
    ships.iter().map(Ship::readiness).sum::<f64>() / ships.len() as f64
}
