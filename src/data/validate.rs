//! Inventory dataset validation. Probabilities, staying power, and class
//! coverage are checked at load time so combat never resolves against a
//! malformed record.

use std::collections::HashSet;
use std::fmt;

use crate::data::inventory::{load_inventory, Inventory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }
}

/// Validate an inventory JSON file.
pub fn validate_inventory_file(path: &str) -> Result<ValidationReport, String> {
    let inventory =
        load_inventory(path).ok_or_else(|| format!("unable to read or parse '{path}'"))?;
    Ok(validate_inventory(&inventory))
}

/// Validate an in-memory inventory.
pub fn validate_inventory(inventory: &Inventory) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_ids = HashSet::new();

    for (index, ship) in inventory.ships.iter().enumerate() {
        let context = format!("ships[{index}] id='{}'", ship.id);
        if ship.id.trim().is_empty() {
            report.push(ValidationSeverity::Error, context.as_str(), "missing non-empty 'id'");
        } else if !seen_ids.insert(ship.id.clone()) {
            report.push(
                ValidationSeverity::Error,
                context.as_str(),
                format!("duplicate id '{}'", ship.id),
            );
        }
        if ship.class_label.trim().is_empty() {
            report.push(
                ValidationSeverity::Error,
                context.as_str(),
                "missing non-empty 'class_label'",
            );
        }
        if !(ship.staying_power > 0.0) {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.staying_power"),
                format!("must be positive, got {}", ship.staying_power),
            );
        }
        if ship.offensive_power < 0.0 || ship.defensive_power < 0.0 {
            report.push(
                ValidationSeverity::Error,
                context.as_str(),
                "salvo sizes must be non-negative",
            );
        }
        if !(0.0..=1.0).contains(&ship.training) {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.training"),
                format!("must lie in [0, 1], got {}", ship.training),
            );
        }
        if ship.unit_cost < 0.0 {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.unit_cost"),
                "must be non-negative",
            );
        }
        if ship.offensive_power == 0.0 && ship.defensive_power == 0.0 {
            report.push(
                ValidationSeverity::Warning,
                context.as_str(),
                "hull carries no missiles and no interceptors",
            );
        }
    }

    for (index, weapon) in inventory.weapons.iter().enumerate() {
        let context = format!("weapons[{index}] id='{}'", weapon.id);
        if weapon.id.trim().is_empty() {
            report.push(ValidationSeverity::Error, context.as_str(), "missing non-empty 'id'");
        } else if !seen_ids.insert(weapon.id.clone()) {
            report.push(
                ValidationSeverity::Error,
                context.as_str(),
                format!("duplicate id '{}'", weapon.id),
            );
        }
        for (field, value) in [
            ("launch_reliability", weapon.launch_reliability),
            ("hit_probability_offense", weapon.hit_probability_offense),
            ("hit_probability_defense", weapon.hit_probability_defense),
        ] {
            if !(0.0..=1.0).contains(&value) {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.{field}"),
                    format!("must lie in [0, 1], got {value}"),
                );
            }
        }
        if weapon.cost_per_round < 0.0 {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.cost_per_round"),
                "must be non-negative",
            );
        }
        if weapon.hit_probability_offense == 0.0 && weapon.hit_probability_defense == 0.0 {
            report.push(
                ValidationSeverity::Warning,
                context.as_str(),
                "weapon can neither strike nor intercept",
            );
        }
    }

    check_class_coverage(&mut report, inventory);
    report
}

/// A usable inventory needs at least one hull class, one strike-capable
/// weapon class, and one intercept-capable weapon class.
fn check_class_coverage(report: &mut ValidationReport, inventory: &Inventory) {
    if inventory.ships.is_empty() {
        report.push(ValidationSeverity::Error, "ships", "no hulls in inventory");
    }
    let strike_classes: HashSet<&str> = inventory
        .weapons
        .iter()
        .filter(|w| w.hit_probability_offense > 0.0)
        .map(|w| w.class_label.as_str())
        .collect();
    let intercept_classes: HashSet<&str> = inventory
        .weapons
        .iter()
        .filter(|w| w.hit_probability_defense > 0.0)
        .map(|w| w.class_label.as_str())
        .collect();
    if strike_classes.is_empty() {
        report.push(
            ValidationSeverity::Error,
            "weapons",
            "no strike-capable weapon class",
        );
    }
    if intercept_classes.is_empty() {
        report.push(
            ValidationSeverity::Error,
            "weapons",
            "no intercept-capable weapon class",
        );
    }
    for class in strike_classes.intersection(&intercept_classes) {
        report.push(
            ValidationSeverity::Info,
            format!("weapons class='{class}'"),
            "class mixes strike and intercept roles",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::inventory::{ShipClassRecord, WeaponClassRecord};

    #[test]
    fn builtin_inventory_is_clean() {
        let report = validate_inventory(&Inventory::builtin());
        assert!(!report.has_errors(), "{:?}", report.diagnostics);
    }

    #[test]
    fn out_of_range_probability_is_an_error() {
        let mut inventory = Inventory::builtin();
        inventory.weapons[0].hit_probability_offense = 1.5;
        let report = validate_inventory(&inventory);
        assert!(report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.context.contains("hit_probability_offense")));
    }

    #[test]
    fn duplicate_ids_are_errors() {
        let mut inventory = Inventory::builtin();
        let copy = inventory.ships[0].clone();
        inventory.ships.push(copy);
        let report = validate_inventory(&inventory);
        assert!(report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.message.contains("duplicate id")));
    }

    #[test]
    fn non_positive_staying_power_is_an_error() {
        let mut inventory = Inventory::builtin();
        inventory.ships[0].staying_power = 0.0;
        assert!(validate_inventory(&inventory).has_errors());
    }

    #[test]
    fn toothless_hull_is_only_a_warning() {
        let inventory = Inventory {
            data_version: None,
            source_note: None,
            ships: vec![ShipClassRecord {
                id: "hulk".to_string(),
                name: "Hulk".to_string(),
                class_label: "AUX".to_string(),
                offensive_power: 0.0,
                defensive_power: 0.0,
                staying_power: 1.0,
                age_years: 30,
                training: 0.5,
                unit_cost: 10.0,
            }],
            weapons: vec![
                WeaponClassRecord {
                    id: "a".to_string(),
                    name: "A".to_string(),
                    class_label: "ASCM".to_string(),
                    launch_reliability: 1.0,
                    hit_probability_offense: 0.5,
                    hit_probability_defense: 0.0,
                    cost_per_round: 1.0,
                },
                WeaponClassRecord {
                    id: "b".to_string(),
                    name: "B".to_string(),
                    class_label: "SAM".to_string(),
                    launch_reliability: 1.0,
                    hit_probability_offense: 0.0,
                    hit_probability_defense: 0.5,
                    cost_per_round: 1.0,
                },
            ],
        };
        let report = validate_inventory(&inventory);
        assert!(!report.has_errors(), "{:?}", report.diagnostics);
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.severity == ValidationSeverity::Warning));
    }

    #[test]
    fn missing_weapon_roles_are_errors() {
        let mut inventory = Inventory::builtin();
        inventory.weapons.retain(|w| w.hit_probability_defense == 0.0);
        let report = validate_inventory(&inventory);
        assert!(report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.message.contains("no intercept-capable")));
    }

    #[test]
    fn unreadable_file_is_a_formatted_error() {
        let err = validate_inventory_file("/nonexistent/inventory.json").unwrap_err();
        assert!(err.contains("unable to read or parse"), "{err}");
    }
}
