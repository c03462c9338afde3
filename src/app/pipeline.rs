//! Shared comparison pipeline used by every command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! bundle -> log transform -> HP filter -> statistics -> comparison table
//!
//! Every (economy, variable) decomposition is independent, so they are fanned
//! out with rayon and collected back into ordered maps.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::compare::assemble;
use crate::domain::{
    ComparisonTable, CycleConfig, CycleSlot, DecomposedSeries, Economy, SeriesSlot, TimeSeries,
    Variable, VariableBundle,
};
use crate::error::Result;
use crate::filter::HpFilter;
use crate::stats::{EconomyStatistics, StatisticsEngine};
use crate::transform::log_transform;

/// Decompositions and statistics of one economy.
#[derive(Debug, Clone)]
pub struct EconomyRun {
    pub economy: Economy,
    pub cycles: BTreeMap<Variable, CycleSlot>,
    pub statistics: EconomyStatistics,
}

/// All computed outputs of a comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonRun {
    pub config: CycleConfig,
    pub economies: Vec<EconomyRun>,
    pub table: ComparisonTable,
}

/// Log-transform then decompose one series.
pub fn decompose_series(series: &TimeSeries, filter: &HpFilter, take_logs: bool) -> Result<DecomposedSeries> {
    if take_logs {
        filter.decompose(&log_transform(series)?)
    } else {
        filter.decompose(series)
    }
}

/// Decomposition outcome for one slot; absence and failures are carried, not raised.
pub fn decompose_slot(slot: &SeriesSlot, filter: &HpFilter) -> CycleSlot {
    match slot {
        SeriesSlot::Available(series) => match decompose_series(series, filter, true) {
            Ok(d) => CycleSlot::Decomposed(d),
            Err(err) => CycleSlot::Failed(err),
        },
        SeriesSlot::Missing { reason } => CycleSlot::Missing {
            reason: reason.clone(),
        },
    }
}

/// Decompose every variable of every bundle in parallel.
///
/// Output order follows `bundles`, and within each economy the fixed variable order.
pub fn decompose_bundles(
    bundles: &[VariableBundle],
    config: &CycleConfig,
) -> Result<Vec<(Economy, BTreeMap<Variable, CycleSlot>)>> {
    let filter = HpFilter::from_config(config)?;

    let jobs: Vec<(usize, Variable, &SeriesSlot)> = bundles
        .iter()
        .enumerate()
        .flat_map(|(i, b)| b.iter().map(move |(v, slot)| (i, v, slot)))
        .collect();

    let results: Vec<(usize, Variable, CycleSlot)> = jobs
        .par_iter()
        .map(|(i, v, slot)| (*i, *v, decompose_slot(slot, &filter)))
        .collect();

    let mut out: Vec<(Economy, BTreeMap<Variable, CycleSlot>)> = bundles
        .iter()
        .map(|b| (b.economy(), BTreeMap::new()))
        .collect();
    for (i, v, slot) in results {
        if let Some(reason) = slot.unavailable_reason() {
            warn!(economy = out[i].0.short_label(), variable = v.key(), "{reason}");
        }
        out[i].1.insert(v, slot);
    }
    Ok(out)
}

/// Full run: decompose, compute statistics per economy, assemble the table.
pub fn run_comparison(bundles: &[VariableBundle], config: &CycleConfig) -> Result<ComparisonRun> {
    info!(
        economies = bundles.len(),
        lambda = config.lambda,
        reference = config.reference.key(),
        "decomposing series"
    );
    let decomposed = decompose_bundles(bundles, config)?;

    let engine = StatisticsEngine::from_config(config);
    let economies: Vec<EconomyRun> = decomposed
        .into_iter()
        .map(|(economy, cycles)| {
            let statistics = engine.compute(economy, &cycles);
            let summary = statistics.summary();
            info!(
                economy = economy.short_label(),
                computed = summary.computed,
                unavailable = summary.unavailable,
                "statistics computed"
            );
            EconomyRun {
                economy,
                cycles,
                statistics,
            }
        })
        .collect();

    let stats: Vec<EconomyStatistics> = economies.iter().map(|e| e.statistics.clone()).collect();
    let table = assemble(engine.reference(), &stats);

    Ok(ComparisonRun {
        config: config.clone(),
        economies,
        table,
    })
}
