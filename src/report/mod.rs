use colored::*;

use crate::error::Result;
use crate::harness::RunRecord;

/// Console lines for a set of runs: the elapsed time of each strategy, then
/// the speedup over the previous one from the second strategy onward.
pub fn render(records: &[RunRecord]) -> String {
    let width = records
        .iter()
        .map(|r| r.strategy_name.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        out.push_str(&format!(
            "{:<width$}  {} {:.6}s\n",
            record.strategy_name.bright_blue().bold(),
            "elapsed".dimmed(),
            record.elapsed,
            width = width
        ));
        if i > 0 {
            // no speedup when the previous run took zero time
            let text = match record.speedup_percent {
                Some(pct) if pct >= 0.0 => format!("{:+.2}%", pct).green(),
                Some(pct) => format!("{:+.2}%", pct).red(),
                None => "n/a".yellow(),
            };
            out.push_str(&format!(
                "{:<width$}  {} {}\n",
                "",
                "speedup".dimmed(),
                text,
                width = width
            ));
        }
    }
    out
}

pub fn render_json(records: &[RunRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<RunRecord> {
        vec![
            RunRecord {
                strategy_name: "row-loop".to_string(),
                elapsed: 2.0,
                speedup_percent: None,
            },
            RunRecord {
                strategy_name: "row-map".to_string(),
                elapsed: 1.0,
                speedup_percent: Some(50.0),
            },
        ]
    }

    #[test]
    fn test_render_one_speedup_line_per_later_strategy() {
        colored::control::set_override(false);
        let text = render(&records());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("row-loop"));
        assert!(lines[0].contains("2.000000s"));
        assert!(lines[1].starts_with("row-map"));
        assert!(lines[2].contains("+50.00%"));
    }

    #[test]
    fn test_render_zero_baseline_prints_na() {
        colored::control::set_override(false);
        let records = vec![
            RunRecord {
                strategy_name: "row-loop".to_string(),
                elapsed: 0.0,
                speedup_percent: None,
            },
            RunRecord {
                strategy_name: "row-map".to_string(),
                elapsed: 0.5,
                speedup_percent: None,
            },
        ];
        let text = render(&records);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("speedup"));
        assert!(lines[2].contains("n/a"));
    }

    #[test]
    fn test_render_json_fields() {
        let json = render_json(&records()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["strategy_name"], "row-loop");
        assert!(parsed[0]["speedup_percent"].is_null());
        assert_eq!(parsed[1]["speedup_percent"], 50.0);
    }
}
