//! Per-trial record export as CSV for downstream analysis. One row per
//! trial; empty cells where a value is undefined for that trial.

use std::io;

use crate::montecarlo::TrialRecord;

const HEADER: [&str; 9] = [
    "trial",
    "outcome",
    "conclusion",
    "pulses",
    "squadron_size",
    "weapon",
    "cost",
    "attrition",
    "cost_per_attrition",
];

/// Write records to any writer. Errors are formatted strings in the style of
/// the rest of the data layer.
pub fn write_trial_records<W: io::Write>(writer: W, records: &[TrialRecord]) -> Result<(), String> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER)
        .map_err(|err| format!("unable to write csv header: {err}"))?;
    for record in records {
        let row = [
            record.trial.to_string(),
            record.outcome.as_str().to_string(),
            record
                .conclusion
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            record.pulses.to_string(),
            record.squadron_size.to_string(),
            record.weapon_label.clone(),
            format!("{:.3}", record.cost),
            record.attrition.to_string(),
            record
                .cost_per_attrition
                .map(|r| format!("{r:.3}"))
                .unwrap_or_default(),
        ];
        out.write_record(&row)
            .map_err(|err| format!("unable to write csv row for trial {}: {err}", record.trial))?;
    }
    out.flush().map_err(|err| format!("unable to flush csv: {err}"))
}

/// Write records to a file path.
pub fn write_trial_records_path(path: &str, records: &[TrialRecord]) -> Result<(), String> {
    let file = std::fs::File::create(path)
        .map_err(|err| format!("unable to create '{path}': {err}"))?;
    write_trial_records(file, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::battle::Conclusion;
    use crate::montecarlo::TrialOutcome;

    fn record(trial: usize, outcome: TrialOutcome) -> TrialRecord {
        TrialRecord {
            trial,
            outcome,
            conclusion: Some(Conclusion::RedDefeated),
            pulses: 3,
            squadron_size: 4,
            weapon_label: "Harpoon".to_string(),
            cost: 123.456,
            attrition: 2,
            cost_per_attrition: Some(61.728),
        }
    }

    #[test]
    fn rows_match_records() {
        let records = vec![record(0, TrialOutcome::BlueWin), record(1, TrialOutcome::Draw)];
        let mut buf = Vec::new();
        write_trial_records(&mut buf, &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("trial,outcome,conclusion"));
        assert!(lines[1].contains("blue_win"));
        assert!(lines[1].contains("red_defeated"));
        assert!(lines[1].contains("123.456"));
        assert!(lines[2].contains("draw"));
    }

    #[test]
    fn undefined_ratio_is_an_empty_cell() {
        let mut no_attrition = record(0, TrialOutcome::BlueWin);
        no_attrition.attrition = 0;
        no_attrition.cost_per_attrition = None;
        let mut buf = Vec::new();
        write_trial_records(&mut buf, &[no_attrition]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with(",0,"));
    }
}
