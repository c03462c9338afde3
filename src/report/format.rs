//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engines stay free of presentation concerns
//! - output changes are localized (important for snapshot-style tests)

use crate::app::pipeline::ComparisonRun;
use crate::domain::{Cell, ComparisonTable, CycleSlot, DecomposedSeries, PersistenceMethod};
use crate::stats::{persistence, volatility};

const LABEL_WIDTH: usize = 14;
const CELL_WIDTH: usize = 10;

/// Format the comparison table, grouped by statistic then economy.
pub fn format_comparison_table(table: &ComparisonTable) -> String {
    let mut out = String::new();
    let columns = table.columns();

    // Group header: one label per run of columns sharing a statistic.
    let mut header = format!("{:<w$}", "", w = LABEL_WIDTH);
    let mut i = 0;
    while i < columns.len() {
        let statistic = columns[i].statistic;
        let span = columns[i..].iter().take_while(|c| c.statistic == statistic).count();
        let width = span * CELL_WIDTH;
        header.push_str(&format!("{:<width$}", truncate(&statistic.label(table.reference()), width - 1)));
        i += span;
    }
    push_line(&mut out, &header);

    let mut sub = format!("{:<w$}", "", w = LABEL_WIDTH);
    for col in columns {
        sub.push_str(&format!("{:>w$}", col.economy.short_label(), w = CELL_WIDTH));
    }
    push_line(&mut out, &sub);

    push_line(
        &mut out,
        &format!("{:-<width$}", "", width = LABEL_WIDTH + columns.len() * CELL_WIDTH),
    );

    for row in table.rows() {
        let mut line = format!("{:<w$}", row.variable.key(), w = LABEL_WIDTH);
        for cell in &row.cells {
            line.push_str(&format!("{:>w$}", fmt_cell(cell), w = CELL_WIDTH));
        }
        push_line(&mut out, &line);
    }

    out
}

/// Notes explaining every `n/a` cell of the table.
pub fn format_unavailable_notes(table: &ComparisonTable) -> String {
    let mut out = String::new();
    for row in table.rows() {
        for (col, cell) in table.columns().iter().zip(&row.cells) {
            if let Cell::NotAvailable { reason } = cell {
                out.push_str(&format!(
                    "  {} / {} / {}: {reason}\n",
                    col.economy.short_label(),
                    row.variable.key(),
                    col.statistic.label(table.reference()),
                ));
            }
        }
    }
    out
}

/// Header block describing the run configuration and sample coverage.
pub fn format_run_summary(run: &ComparisonRun) -> String {
    let mut out = String::new();

    out.push_str("=== bcycle - Business Cycle Comparison ===\n");
    out.push_str(&format!("HP lambda: {}\n", run.config.lambda));
    out.push_str(&format!("Reference: {}\n", run.config.reference.key()));
    out.push_str(&format!(
        "Persistence: {}\n",
        match run.config.persistence {
            PersistenceMethod::LaggedPearson => "lag-1 Pearson",
            PersistenceMethod::Acf => "acf(1)",
        }
    ));

    out.push_str("\nSamples:\n");
    for economy in &run.economies {
        for (variable, slot) in &economy.cycles {
            let label = format!("{} {}", economy.economy.short_label(), variable.key());
            match slot {
                CycleSlot::Decomposed(d) => out.push_str(&format!(
                    "  {:<22} n={:<4} {}\n",
                    label,
                    d.cycle.observed_len(),
                    date_range(d),
                )),
                other => out.push_str(&format!(
                    "  {:<22} skipped ({})\n",
                    label,
                    other.unavailable_reason().unwrap_or_default()
                )),
            }
        }
    }
    out.push('\n');

    out
}

/// Short description of a single decomposition.
pub fn format_decomposition_summary(label: &str, d: &DecomposedSeries) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {label} ===\n"));
    out.push_str(&format!("HP lambda: {}\n", d.lambda));
    out.push_str(&format!("Observations: n={} {}\n", d.cycle.observed_len(), date_range(d)));

    let fmt_result = |r: crate::error::Result<f64>| match r {
        Ok(v) => format!("{v:.3}"),
        Err(e) => format!("n/a ({e})"),
    };
    out.push_str(&format!("Cycle volatility (%): {}\n", fmt_result(volatility(&d.cycle))));
    out.push_str(&format!(
        "Cycle persistence:    {}\n",
        fmt_result(persistence(&d.cycle, PersistenceMethod::LaggedPearson))
    ));

    let (lo, hi) = d
        .cycle
        .values()
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if lo.is_finite() {
        out.push_str(&format!("Cycle range:          [{lo:.4}, {hi:.4}]\n"));
    }

    out
}

fn date_range(d: &DecomposedSeries) -> String {
    let dates: Vec<_> = d
        .cycle
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(date, _)| date)
        .collect();
    match (dates.first(), dates.last()) {
        (Some(a), Some(b)) => format!("[{a} .. {b}]"),
        _ => "[]".to_string(),
    }
}

fn fmt_cell(cell: &Cell) -> String {
    match cell {
        Cell::Value(v) => format!("{v:.3}"),
        Cell::NotAvailable { .. } => "n/a".to_string(),
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
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
