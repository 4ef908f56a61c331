//! Monte Carlo trial harness: run many independent battles over freshly
//! generated fleets and aggregate the outcomes into statistics.
//!
//! Trials share no mutable state; the parallel runner distributes them
//! across Rayon workers and produces records identical to the sequential
//! runner because every trial derives its own seed from the base seed.

pub mod export_csv;
pub mod stats;

use std::collections::BTreeMap;
use std::fmt::Write as _;

use rayon::prelude::*;
use serde::Serialize;

use crate::combat::battle::{Battle, Conclusion, Side};
use crate::combat::rng::Rng;
use crate::cost::{side_cost, CostModel, ForceCostInput};
use crate::data::config::ScenarioConfig;
use crate::generate::FleetGenerator;
use crate::montecarlo::stats::{
    confidence_interval, summarize, upper_tail_z_test, ConfidenceInterval, SampleSummary,
};

/// Fallback significance level when a scenario carries an out-of-range alpha.
pub const DEFAULT_ALPHA: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialOutcome {
    BlueWin,
    RedWin,
    /// Both sides afloat (stalemate or duration expiry) or mutual destruction.
    Draw,
    /// A side could not be generated; no battle was fought.
    NoContest,
}

impl TrialOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlueWin => "blue_win",
            Self::RedWin => "red_win",
            Self::Draw => "draw",
            Self::NoContest => "no_contest",
        }
    }
}

/// Everything recorded about one finished trial. Costs and attrition are for
/// the blue side.
#[derive(Debug, Clone, Serialize)]
pub struct TrialRecord {
    pub trial: usize,
    pub outcome: TrialOutcome,
    pub conclusion: Option<Conclusion>,
    pub pulses: u32,
    pub squadron_size: usize,
    /// Offensive weapon sampled for blue this trial.
    pub weapon_label: String,
    pub cost: f64,
    /// Blue ships at status zero when the battle ended.
    pub attrition: usize,
    /// Defined only where attrition is positive.
    pub cost_per_attrition: Option<f64>,
}

/// Run the configured number of trials sequentially.
pub fn run_trials<G, C>(config: &ScenarioConfig, generator: &G, cost_model: &C) -> Vec<TrialRecord>
where
    G: FleetGenerator + Sync,
    C: CostModel + Sync,
{
    run_with_parallelism(config, generator, cost_model, false)
}

/// Like [run_trials] but distributes trials across all CPU cores via Rayon.
/// Records come back in trial order and match the sequential runner exactly.
pub fn run_trials_parallel<G, C>(
    config: &ScenarioConfig,
    generator: &G,
    cost_model: &C,
) -> Vec<TrialRecord>
where
    G: FleetGenerator + Sync,
    C: CostModel + Sync,
{
    run_with_parallelism(config, generator, cost_model, true)
}

fn run_with_parallelism<G, C>(
    config: &ScenarioConfig,
    generator: &G,
    cost_model: &C,
    parallel: bool,
) -> Vec<TrialRecord>
where
    G: FleetGenerator + Sync,
    C: CostModel + Sync,
{
    let base_seed = config.resolved_seed();
    let run_one = |trial: usize| run_trial(config, generator, cost_model, base_seed, trial);

    if parallel {
        (0..config.trials).into_par_iter().map(run_one).collect()
    } else {
        (0..config.trials).map(run_one).collect()
    }
}

/// One independent trial: generate both fleets, fight the battle, price the
/// result. A side that fails to generate skips combat entirely and records a
/// no-contest.
pub fn run_trial<G, C>(
    config: &ScenarioConfig,
    generator: &G,
    cost_model: &C,
    base_seed: u64,
    trial: usize,
) -> TrialRecord
where
    G: FleetGenerator,
    C: CostModel,
{
    let mut rng = Rng::new(base_seed.wrapping_add(trial as u64));
    let blue = generator.generate(&config.blue, &mut rng);
    let red = generator.generate(&config.red, &mut rng);
    let (Some(blue), Some(red)) = (blue, red) else {
        return TrialRecord {
            trial,
            outcome: TrialOutcome::NoContest,
            conclusion: None,
            pulses: 0,
            squadron_size: 0,
            weapon_label: config.blue.offensive_weapon_class.clone(),
            cost: 0.0,
            attrition: 0,
            cost_per_attrition: None,
        };
    };

    let squadron_size = blue.force.ships.len();
    let offensive_weapon_label = blue.offensive_weapon_label;
    let defensive_weapon_label = blue.defensive_weapon_label;

    let mut battle = Battle::with_duration(blue.force, red.force, config.fixed_duration);
    if config.surprise_attack {
        battle.surprise_attack(Side::Blue);
    }
    let conclusion = battle.resolve();

    let blue_won = !battle.blue.is_defeated() && battle.red.is_defeated();
    let red_won = !battle.red.is_defeated() && battle.blue.is_defeated();
    let outcome = if blue_won {
        TrialOutcome::BlueWin
    } else if red_won {
        TrialOutcome::RedWin
    } else {
        TrialOutcome::Draw
    };

    let cost = side_cost(
        &[ForceCostInput {
            force: &battle.blue,
            offensive_weapon_label: &offensive_weapon_label,
            defensive_weapon_label: &defensive_weapon_label,
            expended: battle.expended(Side::Blue),
        }],
        cost_model,
    );
    let attrition = battle.blue.ships_sunk();

    TrialRecord {
        trial,
        outcome,
        conclusion: Some(conclusion),
        pulses: battle.pulse_count(),
        squadron_size,
        weapon_label: offensive_weapon_label,
        cost,
        attrition,
        cost_per_attrition: (attrition > 0).then(|| cost / attrition as f64),
    }
}

/// Budget hypothesis test verdict: does the mean winning-trial cost exceed
/// the configured threshold?
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BudgetVerdict {
    pub threshold: f64,
    pub alpha: f64,
    pub z: f64,
    pub p_value: f64,
    pub over_budget: bool,
}

/// Cost statistics over winning trials, or an explicit insufficient-data
/// marker when fewer than two trials were won.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WinningCostStats {
    InsufficientData {
        winning_trials: usize,
    },
    Available {
        summary: SampleSummary,
        confidence: ConfidenceInterval,
        /// Absent when every winning trial cost the same (no spread to test).
        budget: Option<BudgetVerdict>,
    },
}

/// Mean cost-to-attrition ratio over the trials where it is defined.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RatioSummary {
    pub trials: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WinRateBucket<K> {
    pub key: K,
    pub trials: usize,
    pub blue_wins: usize,
    pub win_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub run_id: String,
    pub generated_at: String,
    pub trials: usize,
    pub no_contest: usize,
    pub blue_wins: usize,
    pub red_wins: usize,
    pub draws: usize,
    /// Blue wins over all trials; absent when no trials ran.
    pub blue_win_rate: Option<f64>,
    pub winning_cost: WinningCostStats,
    pub cost_per_attrition: Option<RatioSummary>,
    pub by_squadron_size: Vec<WinRateBucket<usize>>,
    pub by_weapon: Vec<WinRateBucket<String>>,
}

/// Fold trial records into the aggregate report.
pub fn aggregate_records(config: &ScenarioConfig, records: &[TrialRecord]) -> AggregateReport {
    let mut blue_wins = 0usize;
    let mut red_wins = 0usize;
    let mut draws = 0usize;
    let mut no_contest = 0usize;
    for record in records {
        match record.outcome {
            TrialOutcome::BlueWin => blue_wins += 1,
            TrialOutcome::RedWin => red_wins += 1,
            TrialOutcome::Draw => draws += 1,
            TrialOutcome::NoContest => no_contest += 1,
        }
    }

    let alpha = if config.alpha > 0.0 && config.alpha < 1.0 {
        config.alpha
    } else {
        DEFAULT_ALPHA
    };

    let winning_costs: Vec<f64> = records
        .iter()
        .filter(|r| r.outcome == TrialOutcome::BlueWin)
        .map(|r| r.cost)
        .collect();
    let winning_cost = match summarize(&winning_costs) {
        None => WinningCostStats::InsufficientData {
            winning_trials: winning_costs.len(),
        },
        Some(summary) => {
            let confidence = confidence_interval(&summary, 1.0 - alpha)
                .unwrap_or(ConfidenceInterval {
                    confidence: 1.0 - alpha,
                    low: summary.mean,
                    high: summary.mean,
                });
            let budget = upper_tail_z_test(&summary, config.budget_threshold).map(|test| {
                BudgetVerdict {
                    threshold: config.budget_threshold,
                    alpha,
                    z: test.z,
                    p_value: test.p_value,
                    over_budget: test.p_value < alpha,
                }
            });
            WinningCostStats::Available {
                summary,
                confidence,
                budget,
            }
        }
    };

    let ratios: Vec<f64> = records.iter().filter_map(|r| r.cost_per_attrition).collect();
    let cost_per_attrition = if ratios.is_empty() {
        None
    } else {
        Some(RatioSummary {
            trials: ratios.len(),
            mean: ratios.iter().sum::<f64>() / ratios.len() as f64,
        })
    };

    let mut by_squadron: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
    let mut by_weapon: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for record in records {
        if record.outcome == TrialOutcome::NoContest {
            continue;
        }
        let won = usize::from(record.outcome == TrialOutcome::BlueWin);
        let squadron = by_squadron.entry(record.squadron_size).or_default();
        squadron.0 += 1;
        squadron.1 += won;
        let weapon = by_weapon.entry(record.weapon_label.clone()).or_default();
        weapon.0 += 1;
        weapon.1 += won;
    }

    AggregateReport {
        run_id: uuid::Uuid::new_v4().to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        trials: records.len(),
        no_contest,
        blue_wins,
        red_wins,
        draws,
        blue_win_rate: (!records.is_empty()).then(|| blue_wins as f64 / records.len() as f64),
        winning_cost,
        cost_per_attrition,
        by_squadron_size: by_squadron
            .into_iter()
            .map(|(key, (trials, wins))| WinRateBucket {
                key,
                trials,
                blue_wins: wins,
                win_rate: wins as f64 / trials as f64,
            })
            .collect(),
        by_weapon: by_weapon
            .into_iter()
            .map(|(key, (trials, wins))| WinRateBucket {
                key,
                trials,
                blue_wins: wins,
                win_rate: wins as f64 / trials as f64,
            })
            .collect(),
    }
}

/// Run a full scenario and aggregate it in one call.
pub fn run_scenario<G, C>(
    config: &ScenarioConfig,
    generator: &G,
    cost_model: &C,
    parallel: bool,
) -> (Vec<TrialRecord>, AggregateReport)
where
    G: FleetGenerator + Sync,
    C: CostModel + Sync,
{
    let records = run_with_parallelism(config, generator, cost_model, parallel);
    let report = aggregate_records(config, &records);
    (records, report)
}

impl AggregateReport {
    /// Plain-text rendering for terminal use; the JSON form carries the same
    /// fields.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "run {} at {}", self.run_id, self.generated_at);
        let _ = writeln!(
            out,
            "trials: {} (blue wins {}, red wins {}, draws {}, no contest {})",
            self.trials, self.blue_wins, self.red_wins, self.draws, self.no_contest
        );
        match self.blue_win_rate {
            Some(rate) => {
                let _ = writeln!(out, "blue win rate: {:.3}", rate);
            }
            None => {
                let _ = writeln!(out, "blue win rate: n/a (no trials)");
            }
        }
        match &self.winning_cost {
            WinningCostStats::InsufficientData { winning_trials } => {
                let _ = writeln!(
                    out,
                    "winning-trial cost: insufficient data ({winning_trials} winning trial(s))"
                );
            }
            WinningCostStats::Available {
                summary,
                confidence,
                budget,
            } => {
                let _ = writeln!(
                    out,
                    "winning-trial cost: mean {:.1} std {:.1} over {} wins",
                    summary.mean, summary.std_dev, summary.count
                );
                let _ = writeln!(
                    out,
                    "  {:.0}% interval: [{:.1}, {:.1}]",
                    confidence.confidence * 100.0,
                    confidence.low,
                    confidence.high
                );
                match budget {
                    Some(verdict) => {
                        let _ = writeln!(
                            out,
                            "  budget {:.1}: z={:.3} p={:.4} alpha={:.2} -> {}",
                            verdict.threshold,
                            verdict.z,
                            verdict.p_value,
                            verdict.alpha,
                            if verdict.over_budget {
                                "over budget"
                            } else {
                                "within budget"
                            }
                        );
                    }
                    None => {
                        let _ = writeln!(out, "  budget test: n/a (zero cost spread)");
                    }
                }
            }
        }
        if let Some(ratio) = &self.cost_per_attrition {
            let _ = writeln!(
                out,
                "cost per ship lost: {:.1} over {} trial(s)",
                ratio.mean, ratio.trials
            );
        }
        let _ = writeln!(out, "win rate by squadron size:");
        for bucket in &self.by_squadron_size {
            let _ = writeln!(
                out,
                "  {:>3} ships: {:.3} ({}/{})",
                bucket.key, bucket.win_rate, bucket.blue_wins, bucket.trials
            );
        }
        let _ = writeln!(out, "win rate by weapon:");
        for bucket in &self.by_weapon {
            let _ = writeln!(
                out,
                "  {:<12} {:.3} ({}/{})",
                bucket.key, bucket.win_rate, bucket.blue_wins, bucket.trials
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::InventoryCostModel;
    use crate::data::inventory::Inventory;
    use crate::generate::InventoryGenerator;

    fn config(trials: usize, seed: u64) -> ScenarioConfig {
        ScenarioConfig {
            trials,
            seed: Some(seed),
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn zero_trials_produce_an_empty_report_without_statistics() {
        let scenario = config(0, 1);
        let report = aggregate_records(&scenario, &[]);
        assert_eq!(report.trials, 0);
        assert!(report.blue_win_rate.is_none());
        assert!(matches!(
            report.winning_cost,
            WinningCostStats::InsufficientData { winning_trials: 0 }
        ));
        assert!(report.cost_per_attrition.is_none());
        assert!(report.by_squadron_size.is_empty());
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let scenario = config(40, 1234);
        let generator = InventoryGenerator::new(Inventory::builtin());
        let cost_model = InventoryCostModel::new(Inventory::builtin());
        let sequential = run_trials(&scenario, &generator, &cost_model);
        let parallel = run_trials_parallel(&scenario, &generator, &cost_model);
        assert_eq!(sequential.len(), parallel.len());
        for (a, b) in sequential.iter().zip(&parallel) {
            assert_eq!(a.trial, b.trial);
            assert_eq!(a.outcome, b.outcome);
            assert_eq!(a.pulses, b.pulses);
            assert!((a.cost - b.cost).abs() < 1e-9);
        }
    }

    #[test]
    fn trial_records_are_deterministic_per_seed() {
        let scenario = config(25, 77);
        let generator = InventoryGenerator::new(Inventory::builtin());
        let cost_model = InventoryCostModel::new(Inventory::builtin());
        let first = run_trials(&scenario, &generator, &cost_model);
        let second = run_trials(&scenario, &generator, &cost_model);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.outcome, b.outcome);
            assert_eq!(a.weapon_label, b.weapon_label);
            assert!((a.cost - b.cost).abs() < 1e-9);
        }
    }

    #[test]
    fn tables_partition_contested_trials() {
        let scenario = config(60, 5);
        let generator = InventoryGenerator::new(Inventory::builtin());
        let cost_model = InventoryCostModel::new(Inventory::builtin());
        let (records, report) = run_scenario(&scenario, &generator, &cost_model, false);
        let contested = records
            .iter()
            .filter(|r| r.outcome != TrialOutcome::NoContest)
            .count();
        assert_eq!(
            report.by_squadron_size.iter().map(|b| b.trials).sum::<usize>(),
            contested
        );
        assert_eq!(
            report.by_weapon.iter().map(|b| b.trials).sum::<usize>(),
            contested
        );
        assert!(!report.render_table().is_empty());
    }
}
