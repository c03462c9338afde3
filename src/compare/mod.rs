//! Cross-economy comparison table.
//!
//! Pure aggregation: no statistic is computed here. Rows always follow
//! [`Variable::ALL`] and columns are grouped by statistic, then by economy in
//! the order the caller supplies them.

use crate::domain::{Cell, Column, ComparisonRow, ComparisonTable, StatisticKind, Variable};
use crate::error::Result;
use crate::stats::{EconomyStatistics, StatisticsEntry};

/// Build the comparison table from per-economy statistics.
///
/// Duplicate economies keep their first occurrence.
pub fn assemble(reference: Variable, economies: &[EconomyStatistics]) -> ComparisonTable {
    let mut ordered: Vec<&EconomyStatistics> = Vec::with_capacity(economies.len());
    for stats in economies {
        if !ordered.iter().any(|s| s.economy == stats.economy) {
            ordered.push(stats);
        }
    }

    let columns: Vec<Column> = StatisticKind::ALL
        .into_iter()
        .flat_map(|statistic| {
            ordered.iter().map(move |s| Column {
                statistic,
                economy: s.economy,
            })
        })
        .collect();

    let rows = Variable::ALL
        .into_iter()
        .map(|variable| {
            let cells = columns
                .iter()
                .map(|col| {
                    let stats = ordered
                        .iter()
                        .find(|s| s.economy == col.economy)
                        .and_then(|s| s.entry(variable));
                    cell_for(stats, col.statistic)
                })
                .collect();
            ComparisonRow { variable, cells }
        })
        .collect();

    ComparisonTable {
        reference,
        columns,
        rows,
    }
}

fn cell_for(entry: Option<&StatisticsEntry>, statistic: StatisticKind) -> Cell {
    let outcome: &Result<f64> = match entry {
        None => {
            return Cell::NotAvailable {
                reason: "missing: not provided".to_string(),
            };
        }
        Some(StatisticsEntry::Unavailable { reason }) => {
            return Cell::NotAvailable {
                reason: reason.clone(),
            };
        }
        Some(StatisticsEntry::Computed(stats)) => match stats.complete() {
            Ok(all) => return Cell::Value(statistic.pick(&all)),
            Err(_) => stats.outcome(statistic),
        },
    };
    match outcome {
        Ok(v) => Cell::Value(*v),
        Err(err) => Cell::NotAvailable {
            reason: err.to_string(),
        },
    }
}
