//! Formatted terminal output.
//!
//! Formatting lives here so the grading code stays free of presentation and
//! output changes stay localized.

use crate::app::pipeline::GradingOutcome;
use crate::grade::GRADE_BANDS;
use crate::rules::RuleOutcome;

/// Format the full run summary: marks per stage, rule trace, grades and SPI.
pub fn format_summary(outcome: &GradingOutcome) -> String {
    let mut out = String::new();
    let policy = &outcome.policy;
    let allocation = &outcome.allocation;

    out.push_str("=== spi - attendance bonus and SPI ===\n");
    out.push_str(&format!(
        "Policy: pass={} | cap={} | pardon floor={} | universal bonus=+{}\n",
        policy.pass_mark, policy.component_cap, policy.pardon_floor, policy.universal_bonus
    ));
    out.push_str(&format!(
        "Attendance bonus: spent {:.2} of {:.2} | passes gained={} | still failing={}\n",
        allocation.spent,
        allocation.budget,
        allocation.passes_gained(),
        allocation.still_failing()
    ));

    out.push_str("\nMarks:\n");
    out.push_str(&table_line(format!(
        "{:<24} {:<10} {:>8} {:>8} {:>8} {:>8}",
        "subject", "part", "raw", "bonus", "alloc", "final"
    )));
    out.push_str(&table_line(format!(
        "{:-<24} {:-<10} {:-<8} {:-<8} {:-<8} {:-<8}",
        "", "", "", "", "", ""
    )));

    let allocated = outcome.allocated();
    let final_marks = outcome.final_marks();
    for raw in &outcome.raw.subjects {
        let mut first = true;
        for (kind, raw_mark) in raw.marks.iter() {
            let name = if first { truncate(&raw.name, 24) } else { String::new() };
            first = false;
            out.push_str(&table_line(format!(
                "{:<24} {:<10} {:>8} {:>8} {:>8} {:>8}",
                name,
                kind.label(),
                fmt_mark(Some(raw_mark)),
                fmt_mark(allocation.bonus(&raw.name, kind)),
                fmt_mark(allocated.mark(&raw.name, kind)),
                fmt_mark(final_marks.mark(&raw.name, kind)),
            )));
        }
    }

    out.push_str("\nRules:\n");
    out.push_str(&format!(
        "- pardon (single failing subject, [{}, {})): {}\n",
        policy.pardon_floor,
        policy.pass_mark,
        describe_rule(&outcome.pardon)
    ));
    out.push_str(&format!(
        "- universal bonus (+{} when nothing fails): {}\n",
        policy.universal_bonus,
        describe_rule(&outcome.universal_bonus)
    ));

    out.push_str("\nGrades:\n");
    out.push_str(&table_line(format!(
        "{:<24} {:>8} {:<6} {:>6} {:>8}",
        "subject", "mean", "grade", "gp", "credits"
    )));
    out.push_str(&table_line(format!(
        "{:-<24} {:-<8} {:-<6} {:-<6} {:-<8}",
        "", "", "", "", ""
    )));
    for row in &outcome.report.subjects {
        out.push_str(&table_line(format!(
            "{:<24} {:>8.2} {:<6} {:>6.2} {:>8}",
            truncate(&row.name, 24),
            row.mean,
            row.grade.label(),
            row.grade_point,
            row.credits
        )));
    }

    out.push_str(&format!(
        "\nWeighted points: {:.2} over {} credits\n",
        outcome.report.weighted_points, outcome.report.total_credits
    ));
    out.push_str(&format_spi_line(outcome.spi()));
    out.push('\n');

    out
}

/// The one-line result, as printed after every run.
pub fn format_spi_line(spi: f64) -> String {
    format!("Final SPI: {spi:.2}")
}

/// Format the grade table: bands, letters and points.
pub fn format_grade_table() -> String {
    let mut out = String::new();
    out.push_str(&table_line(format!("{:<10} {:<6} {:>6}", "marks", "grade", "points")));
    out.push_str(&table_line(format!("{:-<10} {:-<6} {:-<6}", "", "", "")));
    for band in GRADE_BANDS.iter().rev() {
        out.push_str(&table_line(format!(
            "{:<10} {:<6} {:>6.1}",
            format!("{}-{}", band.lower, band.upper),
            band.grade.label(),
            band.grade.grade_point()
        )));
    }
    out
}

fn describe_rule(rule: &RuleOutcome) -> String {
    if !rule.fired {
        return "not applied".to_string();
    }
    let parts: Vec<String> = rule
        .touched
        .iter()
        .map(|(subject, kind)| format!("{subject} {}", kind.label()))
        .collect();
    format!("applied to {}", parts.join(", "))
}

fn fmt_mark(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

fn table_line(line: String) -> String {
    let mut line = line.trim_end().to_string();
    line.push('\n');
    line
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
