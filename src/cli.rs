use std::fmt::Write as _;

use crate::combat::battle::{Battle, Conclusion, Side};
use crate::combat::report::{pulse_snapshot, BattleSummary};
use crate::combat::rng::Rng;
use crate::cost::InventoryCostModel;
use crate::data::config::{load_scenario, ScenarioConfig};
use crate::data::inventory::{load_inventory_or_builtin, DEFAULT_INVENTORY_PATH};
use crate::data::validate::validate_inventory_file;
use crate::generate::{FleetGenerator, InventoryGenerator};
use crate::montecarlo::export_csv::write_trial_records_path;
use crate::montecarlo::{aggregate_records, TrialOutcome};
use crate::parallel::{run_trial_batches, WorkerPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    MonteCarlo,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("montecarlo") => Some(Command::MonteCarlo),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::MonteCarlo) => handle_montecarlo(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: broadside <simulate|montecarlo|validate>");
            2
        }
    }
}

/// Fight one battle over the default scenario and print each pulse.
fn handle_simulate(args: &[String]) -> i32 {
    let pulses = parse_u32_arg(positional(args, 0), "pulses", 0);
    let seed = parse_u64_arg(positional(args, 1), "seed", 7);
    let as_table = args.iter().any(|arg| arg == "--table");

    let scenario = ScenarioConfig {
        seed: Some(seed),
        fixed_duration: pulses,
        ..ScenarioConfig::default()
    };
    let generator = InventoryGenerator::new(load_inventory_or_builtin(DEFAULT_INVENTORY_PATH));
    let mut rng = Rng::new(seed);
    let (Some(blue), Some(red)) = (
        generator.generate(&scenario.blue, &mut rng),
        generator.generate(&scenario.red, &mut rng),
    ) else {
        eprintln!("scenario generated an empty side; nothing to fight");
        return 1;
    };

    let mut battle = Battle::with_duration(blue.force, red.force, scenario.fixed_duration);
    println!("{}", pulse_snapshot(&battle));
    if scenario.surprise_attack {
        battle.surprise_attack(Side::Blue);
        println!("{}", pulse_snapshot(&battle));
    }
    let conclusion = if scenario.fixed_duration > 0 {
        while battle.pulse_count() < scenario.fixed_duration {
            battle.resolve_pulse();
            println!("{}", pulse_snapshot(&battle));
        }
        battle.conclusion().unwrap_or(Conclusion::DurationExpired)
    } else {
        loop {
            if let Some(done) = battle.conclusion() {
                break done;
            }
            battle.resolve_pulse();
            println!("{}", pulse_snapshot(&battle));
        }
    };

    let summary = BattleSummary::from_battle(&battle, conclusion);
    if as_table {
        println!("conclusion\tpulses\tblue_status\tred_status");
        println!(
            "{}\t{}\t{:.3}\t{:.3}",
            summary.conclusion.as_str(),
            summary.pulses,
            summary.blue_total_status,
            summary.red_total_status
        );
        return 0;
    }
    match serde_json::to_string_pretty(&summary) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize battle summary: {err}");
            1
        }
    }
}

/// Run a trial batch and print the aggregate report.
fn handle_montecarlo(args: &[String]) -> i32 {
    let mut scenario = match flag_value(args, "--scenario") {
        Some(path) => match load_scenario(&path) {
            Ok(scenario) => scenario,
            Err(err) => {
                eprintln!("{err}");
                return 1;
            }
        },
        None => ScenarioConfig::default(),
    };
    scenario.trials = parse_usize_arg(positional(args, 0), "trials", scenario.trials);
    if let Some(raw) = positional(args, 1) {
        scenario.seed = Some(parse_u64_arg(Some(raw), "seed", 7));
    }
    let workers = parse_usize_arg(flag_value(args, "--workers").as_ref(), "workers", 0);
    let as_table = args.iter().any(|arg| arg == "--table");

    let inventory = load_inventory_or_builtin(DEFAULT_INVENTORY_PATH);
    let generator = InventoryGenerator::new(inventory.clone());
    let cost_model = InventoryCostModel::new(inventory);
    let pool = WorkerPool::with_workers(workers);

    let records = run_trial_batches(&scenario, &generator, &cost_model, &pool);
    let report = aggregate_records(&scenario, &records);

    if let Some(path) = flag_value(args, "--csv") {
        if let Err(err) = write_trial_records_path(&path, &records) {
            eprintln!("{err}");
            return 1;
        }
        let contested = records
            .iter()
            .filter(|r| r.outcome != TrialOutcome::NoContest)
            .count();
        eprintln!("wrote {} record(s) ({contested} contested) to {path}", records.len());
    }

    if as_table {
        print!("{}", report.render_table());
        return 0;
    }
    match serde_json::to_string_pretty(&report) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize aggregate report: {err}");
            1
        }
    }
}

/// Validate an inventory file.
fn handle_validate(args: &[String]) -> i32 {
    let path = positional(args, 0)
        .map(String::as_str)
        .unwrap_or(DEFAULT_INVENTORY_PATH);

    match validate_inventory_file(path) {
        Ok(report) => {
            for diag in &report.diagnostics {
                println!("{diag}");
            }
            if report.has_errors() {
                eprintln!("validation failed: {path}");
                1
            } else {
                println!("validation passed: {path}");
                0
            }
        }
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}

/// The n-th positional operand after the command, ignoring flags and their
/// values.
fn positional(args: &[String], n: usize) -> Option<&String> {
    let mut seen = 0usize;
    let mut skip_next = false;
    for arg in args.iter().skip(2) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--table" {
            continue;
        }
        if arg.starts_with("--") {
            skip_next = true;
            continue;
        }
        if seen == n {
            return Some(arg);
        }
        seen += 1;
    }
    None
}

/// Value of a `--flag VALUE` pair, if present.
fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                let mut msg = String::new();
                let _ = write!(&mut msg, "invalid {name} '{value}', defaulting to {default}");
                eprintln!("{msg}");
            }
            default
        })
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
