//! Scenario configuration: one explicit structure carrying every knob for a
//! trial batch, scoped to a single harness run. Loaded from YAML; defaults
//! give a runnable scenario over the builtin inventory.

use std::fs;

use serde::{Deserialize, Serialize};

use crate::generate::{ClassRequest, SideSpec};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub trials: usize,
    /// Base seed; trial i runs on seed + i. Absent means a fresh entropy
    /// seed per run.
    pub seed: Option<u64>,
    /// Budget threshold for the winning-cost hypothesis test, millions.
    pub budget_threshold: f64,
    /// Significance level for the budget test and the cost interval.
    pub alpha: f64,
    /// 0 lets battles run to exhaustion; otherwise every battle fights
    /// exactly this many pulses.
    pub fixed_duration: u32,
    /// Open every battle with a one-sided blue first strike.
    pub surprise_attack: bool,
    pub blue: SideSpec,
    pub red: SideSpec,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            trials: 1000,
            seed: None,
            budget_threshold: 1500.0,
            alpha: 0.05,
            fixed_duration: 0,
            surprise_attack: true,
            blue: SideSpec {
                side_label: "blue".to_string(),
                squadron: vec![ClassRequest {
                    class_label: "DDG".to_string(),
                    count: 4,
                }],
                offensive_weapon_class: "ASCM".to_string(),
                defensive_weapon_class: "SAM".to_string(),
                scouting: 0.8,
            },
            red: SideSpec {
                side_label: "red".to_string(),
                squadron: vec![ClassRequest {
                    class_label: "FFG".to_string(),
                    count: 6,
                }],
                offensive_weapon_class: "ASCM".to_string(),
                defensive_weapon_class: "SAM".to_string(),
                scouting: 0.7,
            },
        }
    }
}

impl ScenarioConfig {
    /// The seed this run will actually use: the configured one, or fresh
    /// entropy when the scenario leaves it open.
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(entropy_seed)
    }
}

/// Fresh 64-bit seed from the OS entropy source. Falls back to a fixed mix
/// constant if the source is unavailable; never panics.
pub fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    if getrandom::getrandom(&mut buf).is_ok() {
        u64::from_le_bytes(buf)
    } else {
        0x9e3779b97f4a7c15
    }
}

pub const DEFAULT_SCENARIO_PATH: &str = "data/scenario.yaml";

/// Load a scenario from a YAML file.
pub fn load_scenario(path: &str) -> Result<ScenarioConfig, String> {
    let raw = fs::read_to_string(path).map_err(|err| format!("unable to read '{path}': {err}"))?;
    serde_yaml::from_str(&raw).map_err(|err| format!("unable to parse yaml '{path}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenario_is_runnable() {
        let config = ScenarioConfig::default();
        assert!(config.trials > 0);
        assert!(config.alpha > 0.0 && config.alpha < 1.0);
        assert!(!config.blue.squadron.is_empty());
        assert!(!config.red.squadron.is_empty());
    }

    #[test]
    fn configured_seed_wins_over_entropy() {
        let config = ScenarioConfig {
            seed: Some(99),
            ..ScenarioConfig::default()
        };
        assert_eq!(config.resolved_seed(), 99);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: ScenarioConfig = serde_yaml::from_str("trials: 50\nseed: 7\n").unwrap();
        assert_eq!(config.trials, 50);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.blue.side_label, "blue");
    }

    #[test]
    fn scenario_round_trips_through_yaml() {
        let config = ScenarioConfig {
            seed: Some(3),
            ..ScenarioConfig::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: ScenarioConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.trials, config.trials);
        assert_eq!(back.seed, Some(3));
        assert_eq!(back.red.squadron[0].count, 6);
    }

    #[test]
    fn missing_file_is_a_formatted_error() {
        let err = load_scenario("/nonexistent/scenario.yaml").unwrap_err();
        assert!(err.contains("unable to read"), "{err}");
    }
}
