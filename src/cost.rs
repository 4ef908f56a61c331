//! Cost accounting: what a trial cost a side in lost hulls, repairs, and
//! expended munitions. Pure lookups against the reference inventory; unknown
//! labels price at zero rather than failing.

use std::collections::BTreeMap;

use crate::combat::battle::SalvoExpenditure;
use crate::combat::engine::Force;
use crate::data::inventory::Inventory;

/// Fraction of acquisition cost charged for a hull that was hit but stayed
/// afloat.
pub const REPAIR_COST_FRACTION: f64 = 0.25;

pub trait CostModel {
    fn ship_cost(&self, class_label: &str, num_lost: usize, num_damaged: usize) -> f64;
    fn weapon_cost(&self, weapon_label: &str, quantity_fired: f64) -> f64;
}

/// Cost model backed by the reference inventory's acquisition and per-round
/// prices.
#[derive(Debug, Clone)]
pub struct InventoryCostModel {
    inventory: Inventory,
}

impl InventoryCostModel {
    pub fn new(inventory: Inventory) -> Self {
        Self { inventory }
    }
}

impl CostModel for InventoryCostModel {
    fn ship_cost(&self, class_label: &str, num_lost: usize, num_damaged: usize) -> f64 {
        let unit = self.inventory.class_unit_cost(class_label).unwrap_or(0.0);
        unit * num_lost as f64 + unit * REPAIR_COST_FRACTION * num_damaged as f64
    }

    fn weapon_cost(&self, weapon_label: &str, quantity_fired: f64) -> f64 {
        let per_round = self
            .inventory
            .weapon_by_label(weapon_label)
            .map(|w| w.cost_per_round)
            .unwrap_or(0.0);
        per_round * quantity_fired
    }
}

/// Terminal state of one Force plus what it fired, for pricing.
#[derive(Debug, Clone, Copy)]
pub struct ForceCostInput<'a> {
    pub force: &'a Force,
    pub offensive_weapon_label: &'a str,
    pub defensive_weapon_label: &'a str,
    pub expended: SalvoExpenditure,
}

/// Total cost for one side, summed over its Force entries. A side fields
/// exactly one Force today; the summation is kept for multi-Force sides.
pub fn side_cost(inputs: &[ForceCostInput<'_>], model: &dyn CostModel) -> f64 {
    let mut total = 0.0;
    for input in inputs {
        let mut by_class: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for ship in &input.force.ships {
            let entry = by_class.entry(ship.class_label.as_str()).or_default();
            if ship.is_sunk() {
                entry.0 += 1;
            } else if ship.status() < 1.0 {
                entry.1 += 1;
            }
        }
        for (class_label, (lost, damaged)) in by_class {
            total += model.ship_cost(class_label, lost, damaged);
        }
        total += model.weapon_cost(input.offensive_weapon_label, input.expended.missiles);
        total += model.weapon_cost(input.defensive_weapon_label, input.expended.interceptors);
    }
    total
}
