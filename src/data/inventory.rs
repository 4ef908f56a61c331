//! Reference inventory: normalized ship hulls and weapon systems used by the
//! fleet generator and the cost model. Loaded from data/inventory.json at
//! runtime; falls back to a compiled-in reference set when the file is
//! missing so simulation and tests run without any data directory.

use std::fs;

use serde::{Deserialize, Serialize};

use crate::combat::engine::{Ship, WeaponProfile};

/// Normalized hull record for one ship design within a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipClassRecord {
    pub id: String,
    pub name: String,
    /// Categorical class, e.g. "DDG".
    pub class_label: String,
    /// Missiles per salvo at full strength.
    pub offensive_power: f64,
    /// Interceptors per salvo at full strength.
    pub defensive_power: f64,
    /// Hits that put the hull out of action.
    pub staying_power: f64,
    pub age_years: u32,
    pub training: f64,
    /// Acquisition cost, millions.
    pub unit_cost: f64,
}

impl ShipClassRecord {
    pub fn to_ship(&self, label: impl Into<String>) -> Ship {
        Ship::new(
            label,
            self.class_label.clone(),
            self.offensive_power,
            self.defensive_power,
            self.staying_power,
            self.age_years,
            self.training,
        )
    }
}

/// Normalized missile-system record. Offensive systems carry a zero defensive
/// hit probability and vice versa, but both fields are always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponClassRecord {
    pub id: String,
    pub name: String,
    /// Categorical class, e.g. "ASCM" (strike) or "SAM" (interceptor).
    pub class_label: String,
    pub launch_reliability: f64,
    pub hit_probability_offense: f64,
    pub hit_probability_defense: f64,
    /// Cost per round, millions.
    pub cost_per_round: f64,
}

impl WeaponClassRecord {
    pub fn to_weapon_profile(&self) -> WeaponProfile {
        WeaponProfile {
            label: self.name.clone(),
            launch_reliability: self.launch_reliability,
            hit_probability_offense: self.hit_probability_offense,
            hit_probability_defense: self.hit_probability_defense,
        }
    }
}

/// Full reference set with provenance fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub data_version: Option<String>,
    #[serde(default)]
    pub source_note: Option<String>,
    pub ships: Vec<ShipClassRecord>,
    pub weapons: Vec<WeaponClassRecord>,
}

/// Normalize a label for lookup: lowercase, collapse spaces/underscores.
fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

impl Inventory {
    pub fn ships_in_class(&self, class_label: &str) -> Vec<&ShipClassRecord> {
        let wanted = normalize_lookup(class_label);
        self.ships
            .iter()
            .filter(|s| normalize_lookup(&s.class_label) == wanted)
            .collect()
    }

    pub fn weapons_in_class(&self, class_label: &str) -> Vec<&WeaponClassRecord> {
        let wanted = normalize_lookup(class_label);
        self.weapons
            .iter()
            .filter(|w| normalize_lookup(&w.class_label) == wanted)
            .collect()
    }

    /// Resolve a weapon by id or name.
    pub fn weapon_by_label(&self, label: &str) -> Option<&WeaponClassRecord> {
        let wanted = normalize_lookup(label);
        self.weapons
            .iter()
            .find(|w| normalize_lookup(&w.id) == wanted || normalize_lookup(&w.name) == wanted)
    }

    /// Representative acquisition cost for a class: the mean over its hulls.
    pub fn class_unit_cost(&self, class_label: &str) -> Option<f64> {
        let hulls = self.ships_in_class(class_label);
        if hulls.is_empty() {
            return None;
        }
        Some(hulls.iter().map(|s| s.unit_cost).sum::<f64>() / hulls.len() as f64)
    }

    /// Compiled-in reference set. Small but covers two ship classes and both
    /// weapon roles, enough for the default scenario, tests, and benches.
    pub fn builtin() -> Self {
        let ship = |id: &str, name: &str, class: &str, off: f64, def: f64, stay: f64, age: u32, training: f64, cost: f64| {
            ShipClassRecord {
                id: id.to_string(),
                name: name.to_string(),
                class_label: class.to_string(),
                offensive_power: off,
                defensive_power: def,
                staying_power: stay,
                age_years: age,
                training,
                unit_cost: cost,
            }
        };
        let weapon = |id: &str, name: &str, class: &str, rel: f64, off: f64, def: f64, cost: f64| {
            WeaponClassRecord {
                id: id.to_string(),
                name: name.to_string(),
                class_label: class.to_string(),
                launch_reliability: rel,
                hit_probability_offense: off,
                hit_probability_defense: def,
                cost_per_round: cost,
            }
        };
        Self {
            data_version: Some("builtin-1".to_string()),
            source_note: Some("compiled-in reference set".to_string()),
            ships: vec![
                ship("ddg-hobart", "Hobart", "DDG", 8.0, 6.0, 3.0, 8, 0.90, 1850.0),
                ship("ddg-daring", "Daring", "DDG", 8.0, 8.0, 3.5, 12, 0.85, 2100.0),
                ship("ddg-sejong", "Sejong", "DDG", 16.0, 8.0, 4.0, 6, 0.80, 1950.0),
                ship("ddg-burke", "Burke", "DDG", 8.0, 8.0, 3.5, 15, 0.90, 1800.0),
                ship("ffg-iver", "Iver Huitfeldt", "FFG", 8.0, 4.0, 2.0, 10, 0.85, 900.0),
                ship("ffg-sachsen", "Sachsen", "FFG", 8.0, 6.0, 2.5, 18, 0.80, 1100.0),
                ship("ffg-lafayette", "La Fayette", "FFG", 4.0, 2.0, 1.5, 22, 0.75, 650.0),
                ship("fsg-visby", "Visby", "FSG", 4.0, 2.0, 1.0, 15, 0.80, 250.0),
                ship("fsg-skjold", "Skjold", "FSG", 8.0, 1.0, 0.5, 12, 0.85, 200.0),
            ],
            weapons: vec![
                weapon("ascm-harpoon", "Harpoon", "ASCM", 0.90, 0.65, 0.0, 1.2),
                weapon("ascm-nsm", "NSM", "ASCM", 0.95, 0.80, 0.0, 2.2),
                weapon("ascm-exocet", "Exocet", "ASCM", 0.88, 0.60, 0.0, 3.2),
                weapon("sam-essm", "ESSM", "SAM", 0.92, 0.0, 0.70, 1.1),
                weapon("sam-sm2", "SM-2", "SAM", 0.85, 0.0, 0.75, 2.1),
                weapon("sam-ram", "RAM", "SAM", 0.95, 0.0, 0.60, 0.9),
            ],
        }
    }
}

pub const DEFAULT_INVENTORY_PATH: &str = "data/inventory.json";

/// Load the inventory from a JSON file. Returns None if the file is missing
/// or unparsable.
pub fn load_inventory(path: &str) -> Option<Inventory> {
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

pub fn load_inventory_or_builtin(path: &str) -> Inventory {
    load_inventory(path).unwrap_or_else(Inventory::builtin)
}
