//! CSV rendering of simulation records.

use std::fmt::Write;

use tn_equipment::SimRecord;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row per recorded step: time, states, then equipment results at the
/// given verbosity.
pub fn record_to_csv(record: &SimRecord, state_names: &[String], verbosity: u8) -> String {
    let result_names: Vec<String> = record
        .results
        .first()
        .map(|r| r.report(verbosity).into_iter().map(|(name, _)| name).collect())
        .unwrap_or_default();

    let mut out = String::from("Time");
    for name in state_names.iter().chain(&result_names) {
        out.push(',');
        out.push_str(name);
    }
    out.push('\n');

    for (i, time) in record.times.iter().enumerate() {
        let _ = write!(out, "{}", time.format(TIME_FORMAT));
        for value in record.states.get(i).into_iter().flatten() {
            let _ = write!(out, ",{value}");
        }
        if let Some(results) = record.results.get(i) {
            for (_, value) in results.report(verbosity) {
                let _ = write!(out, ",{value}");
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn passive_record_has_state_columns() {
        let t = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let record = SimRecord {
            times: vec![t],
            states: vec![vec![20.5, 21.0]],
            results: vec![],
        };
        let csv = record_to_csv(&record, &["T_A".into(), "T_B".into()], 0);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Time,T_A,T_B");
        assert_eq!(lines[1], "2024-03-01 06:00:00,20.5,21");
    }
}
