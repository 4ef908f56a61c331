//! Fleet generation: materialize a side's Force from a specification against
//! the reference inventory. Hull and weapon selection are sampled fresh for
//! every trial, which is what spreads the Monte Carlo outcome distribution.

use serde::{Deserialize, Serialize};

use crate::combat::engine::{Force, Ship};
use crate::combat::rng::Rng;
use crate::data::inventory::{Inventory, ShipClassRecord, WeaponClassRecord};

/// Requested number of hulls from one ship class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRequest {
    pub class_label: String,
    pub count: usize,
}

/// Everything needed to materialize one side of a battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideSpec {
    pub side_label: String,
    pub squadron: Vec<ClassRequest>,
    pub offensive_weapon_class: String,
    pub defensive_weapon_class: String,
    /// Fraction of the opposing force that can be targeted.
    pub scouting: f64,
}

/// A generated Force plus the weapon labels that were sampled for it, for
/// cost accounting and the conditional win tables.
#[derive(Debug, Clone)]
pub struct GeneratedFleet {
    pub force: Force,
    pub offensive_weapon_label: String,
    pub defensive_weapon_label: String,
}

pub trait FleetGenerator {
    /// Returns a non-empty fleet when any requested quantity is positive and
    /// the inventory can satisfy the request; `None` otherwise.
    fn generate(&self, spec: &SideSpec, rng: &mut Rng) -> Option<GeneratedFleet>;
}

/// Generator backed by a reference inventory.
#[derive(Debug, Clone)]
pub struct InventoryGenerator {
    inventory: Inventory,
}

impl InventoryGenerator {
    pub fn new(inventory: Inventory) -> Self {
        Self { inventory }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }
}

impl FleetGenerator for InventoryGenerator {
    fn generate(&self, spec: &SideSpec, rng: &mut Rng) -> Option<GeneratedFleet> {
        let mut ships = Vec::new();
        for request in &spec.squadron {
            if request.count == 0 {
                continue;
            }
            let hulls = self.inventory.ships_in_class(&request.class_label);
            if hulls.is_empty() {
                continue;
            }
            ships.extend(sample_hulls(&hulls, request.count, rng));
        }
        if ships.is_empty() {
            return None;
        }

        let offensive = sample_weapon(&self.inventory.weapons_in_class(&spec.offensive_weapon_class), rng)?;
        let defensive = sample_weapon(&self.inventory.weapons_in_class(&spec.defensive_weapon_class), rng)?;

        let force = Force::new(
            spec.side_label.clone(),
            ships,
            offensive.to_weapon_profile(),
            defensive.to_weapon_profile(),
            spec.scouting,
        );
        Some(GeneratedFleet {
            force,
            offensive_weapon_label: offensive.name.clone(),
            defensive_weapon_label: defensive.name.clone(),
        })
    }
}

/// Two-phase sampling: a shuffled pass without replacement up to the number
/// of distinct hulls in the class, then with replacement for the remainder.
/// Win-probability statistics are sensitive to this exact law.
fn sample_hulls(hulls: &[&ShipClassRecord], count: usize, rng: &mut Rng) -> Vec<Ship> {
    let mut order: Vec<usize> = (0..hulls.len()).collect();
    rng.shuffle(&mut order);

    let mut out = Vec::with_capacity(count);
    for k in 0..count {
        let record = if k < hulls.len() {
            hulls[order[k]]
        } else {
            hulls[rng.next_index(hulls.len())]
        };
        out.push(record.to_ship(format!("{} #{}", record.name, k + 1)));
    }
    out
}

fn sample_weapon<'a>(candidates: &[&'a WeaponClassRecord], rng: &mut Rng) -> Option<&'a WeaponClassRecord> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.next_index(candidates.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ddg_spec(count: usize) -> SideSpec {
        SideSpec {
            side_label: "blue".to_string(),
            squadron: vec![ClassRequest {
                class_label: "DDG".to_string(),
                count,
            }],
            offensive_weapon_class: "ASCM".to_string(),
            defensive_weapon_class: "SAM".to_string(),
            scouting: 0.8,
        }
    }

    fn generator() -> InventoryGenerator {
        InventoryGenerator::new(Inventory::builtin())
    }

    #[test]
    fn zero_quantity_produces_no_fleet() {
        let mut rng = Rng::new(1);
        assert!(generator().generate(&ddg_spec(0), &mut rng).is_none());
    }

    #[test]
    fn unknown_class_produces_no_fleet() {
        let mut rng = Rng::new(1);
        let mut spec = ddg_spec(3);
        spec.squadron[0].class_label = "BB".to_string();
        assert!(generator().generate(&spec, &mut rng).is_none());
    }

    #[test]
    fn generated_fleet_matches_the_request() {
        let mut rng = Rng::new(7);
        let fleet = generator().generate(&ddg_spec(3), &mut rng).unwrap();
        assert_eq!(fleet.force.ships.len(), 3);
        assert!(fleet.force.ships.iter().all(|s| s.class_label == "DDG"));
        assert_eq!(fleet.force.side_label, "blue");
        assert!((fleet.force.scouting - 0.8).abs() < 1e-12);
        let inventory = Inventory::builtin();
        assert!(inventory.weapon_by_label(&fleet.offensive_weapon_label).is_some());
        assert!(inventory.weapon_by_label(&fleet.defensive_weapon_label).is_some());
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        let one = generator().generate(&ddg_spec(5), &mut a).unwrap();
        let two = generator().generate(&ddg_spec(5), &mut b).unwrap();
        let labels = |fleet: &GeneratedFleet| {
            fleet
                .force
                .ships
                .iter()
                .map(|s| s.label.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(labels(&one), labels(&two));
        assert_eq!(one.offensive_weapon_label, two.offensive_weapon_label);
    }

    #[test]
    fn sampling_is_without_replacement_up_to_class_size() {
        let inventory = Inventory::builtin();
        let distinct_ddg = inventory.ships_in_class("DDG").len();
        let mut rng = Rng::new(3);
        let fleet = generator().generate(&ddg_spec(distinct_ddg), &mut rng).unwrap();
        let mut designs: Vec<&str> = fleet
            .force
            .ships
            .iter()
            .map(|s| s.label.split(" #").next().unwrap_or(""))
            .collect();
        designs.sort_unstable();
        designs.dedup();
        assert_eq!(designs.len(), distinct_ddg, "first phase must not repeat a hull design");
    }

    #[test]
    fn oversized_request_falls_back_to_replacement() {
        let inventory = Inventory::builtin();
        let distinct_fsg = inventory.ships_in_class("FSG").len();
        let mut rng = Rng::new(11);
        let mut spec = ddg_spec(distinct_fsg + 4);
        spec.squadron[0].class_label = "FSG".to_string();
        let fleet = generator().generate(&spec, &mut rng).unwrap();
        assert_eq!(fleet.force.ships.len(), distinct_fsg + 4);
        // The without-replacement prefix is still distinct.
        let mut prefix: Vec<&str> = fleet.force.ships[..distinct_fsg]
            .iter()
            .map(|s| s.label.split(" #").next().unwrap_or(""))
            .collect();
        prefix.sort_unstable();
        prefix.dedup();
        assert_eq!(prefix.len(), distinct_fsg);
    }

    #[test]
    fn multi_class_request_concatenates_squadrons() {
        let mut rng = Rng::new(5);
        let spec = SideSpec {
            side_label: "blue".to_string(),
            squadron: vec![
                ClassRequest {
                    class_label: "DDG".to_string(),
                    count: 2,
                },
                ClassRequest {
                    class_label: "FFG".to_string(),
                    count: 3,
                },
            ],
            offensive_weapon_class: "ASCM".to_string(),
            defensive_weapon_class: "SAM".to_string(),
            scouting: 1.0,
        };
        let fleet = generator().generate(&spec, &mut rng).unwrap();
        assert_eq!(fleet.force.ships.len(), 5);
        assert_eq!(fleet.force.ships.iter().filter(|s| s.class_label == "DDG").count(), 2);
        assert_eq!(fleet.force.ships.iter().filter(|s| s.class_label == "FFG").count(), 3);
    }
}
