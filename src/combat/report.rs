//! Battle reporting: per-pulse console snapshots and a serializable
//! end-of-battle summary for the CLI's JSON output.

use serde::Serialize;

use crate::combat::battle::{Battle, Conclusion, PulseHistory, SalvoExpenditure, Side};
use crate::combat::engine::Force;

/// Remaining strength as a percentage of the squadron's full-health total.
pub fn force_status_percent(force: &Force) -> f64 {
    if force.ships.is_empty() {
        return 0.0;
    }
    force.total_status() / force.ships.len() as f64 * 100.0
}

/// One-line state of both sides after the most recent pulse.
pub fn pulse_snapshot(battle: &Battle) -> String {
    format!(
        "pulse {:>3} | {} {:.2} ({:.1}%) | {} {:.2} ({:.1}%)",
        battle.pulse_count(),
        battle.blue.side_label,
        battle.blue.total_status(),
        force_status_percent(&battle.blue),
        battle.red.side_label,
        battle.red.total_status(),
        force_status_percent(&battle.red),
    )
}

/// Everything a finished battle reports: terminal condition, final strength,
/// expenditure, and the full status-over-time history.
#[derive(Debug, Clone, Serialize)]
pub struct BattleSummary {
    pub conclusion: Conclusion,
    pub pulses: u32,
    pub blue_side: String,
    pub red_side: String,
    pub blue_total_status: f64,
    pub red_total_status: f64,
    pub blue_ships_sunk: usize,
    pub red_ships_sunk: usize,
    pub blue_expended: SalvoExpenditure,
    pub red_expended: SalvoExpenditure,
    pub history: PulseHistory,
}

impl BattleSummary {
    pub fn from_battle(battle: &Battle, conclusion: Conclusion) -> Self {
        Self {
            conclusion,
            pulses: battle.pulse_count(),
            blue_side: battle.blue.side_label.clone(),
            red_side: battle.red.side_label.clone(),
            blue_total_status: battle.blue.total_status(),
            red_total_status: battle.red.total_status(),
            blue_ships_sunk: battle.blue.ships_sunk(),
            red_ships_sunk: battle.red.ships_sunk(),
            blue_expended: battle.expended(Side::Blue),
            red_expended: battle.expended(Side::Red),
            history: battle.history().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::engine::{Ship, WeaponProfile};

    fn weapon() -> WeaponProfile {
        WeaponProfile {
            label: "test".to_string(),
            launch_reliability: 1.0,
            hit_probability_offense: 1.0,
            hit_probability_defense: 0.0,
        }
    }

    fn two_ship_force(side: &str) -> Force {
        let ships = vec![
            Ship::new("a", "DDG", 4.0, 0.0, 2.0, 0, 1.0),
            Ship::new("b", "DDG", 4.0, 0.0, 2.0, 0, 1.0),
        ];
        Force::new(side, ships, weapon(), weapon(), 1.0)
    }

    #[test]
    fn status_percent_reflects_partial_damage() {
        let mut force = two_ship_force("blue");
        assert_eq!(force_status_percent(&force), 100.0);
        force.apply_damage(2.0);
        assert!((force_status_percent(&force) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_names_both_sides() {
        let battle = Battle::new(two_ship_force("blue"), two_ship_force("red"));
        let line = pulse_snapshot(&battle);
        assert!(line.contains("blue"), "{line}");
        assert!(line.contains("red"), "{line}");
        assert!(line.contains("100.0%"), "{line}");
    }

    #[test]
    fn summary_captures_terminal_state() {
        let mut battle = Battle::new(two_ship_force("blue"), two_ship_force("red"));
        let conclusion = battle.resolve();
        let summary = BattleSummary::from_battle(&battle, conclusion);
        assert_eq!(summary.pulses, battle.pulse_count());
        assert_eq!(summary.history.pulse_index.len(), summary.pulses as usize + 1);
        assert!(serde_json::to_string(&summary).is_ok());
    }
}
