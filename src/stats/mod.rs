//! Business-cycle statistics over cyclical components.
//!
//! For every variable of one economy we compute:
//! - volatility: sample std of the cycle, in percent
//! - persistence: lag-1 autocorrelation of the cycle
//! - co-movement: correlation with the reference variable's cycle
//!
//! Non-finite observations (edge gaps left by the filter) are dropped first.
//! Correlations pair observations by date, so variables covering different
//! periods are compared only where both exist.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{
    CycleConfig, CycleSlot, CycleStatistics, Economy, PersistenceMethod, StatisticKind, TimeSeries,
    Variable,
};
use crate::error::{CycleError, Result};
use crate::math::{acf_lag1, lagged_pearson, pearson, sample_std};

/// Finite observations in index order.
pub fn finite_values(series: &TimeSeries) -> Vec<f64> {
    series.values().iter().copied().filter(|v| v.is_finite()).collect()
}

/// Standard deviation of the cycle × 100.
pub fn volatility(cycle: &TimeSeries) -> Result<f64> {
    Ok(sample_std(&finite_values(cycle))? * 100.0)
}

/// Lag-1 autocorrelation of the cycle.
///
/// A zero-variance cycle has no defined autocorrelation and yields
/// [`CycleError::Numerical`].
pub fn persistence(cycle: &TimeSeries, method: PersistenceMethod) -> Result<f64> {
    let values = finite_values(cycle);
    if values.len() < 2 {
        return Err(CycleError::InsufficientData {
            needed: 2,
            got: values.len(),
        });
    }
    match method {
        PersistenceMethod::LaggedPearson => lagged_pearson(&values),
        PersistenceMethod::Acf => acf_lag1(&values),
    }
}

/// Pearson correlation of two cycles over their common, finite dates.
pub fn correlation(cycle: &TimeSeries, reference: &TimeSeries) -> Result<f64> {
    let (xs, ys) = aligned_pairs(cycle, reference);
    pearson(&xs, &ys)
}

/// Values of `a` and `b` on dates present (and finite) in both.
pub fn aligned_pairs(a: &TimeSeries, b: &TimeSeries) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let (mut i, mut j) = (0, 0);
    let (da, db): (&[NaiveDate], &[NaiveDate]) = (a.dates(), b.dates());
    while i < da.len() && j < db.len() {
        match da[i].cmp(&db[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                let (x, y) = (a.values()[i], b.values()[j]);
                if x.is_finite() && y.is_finite() {
                    xs.push(x);
                    ys.push(y);
                }
                i += 1;
                j += 1;
            }
        }
    }
    (xs, ys)
}

/// The three statistics of one variable, each computed independently so one
/// undefined statistic does not hide the others.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableStatistics {
    pub volatility: Result<f64>,
    pub persistence: Result<f64>,
    pub correlation: Result<f64>,
}

impl VariableStatistics {
    /// All three statistics, or the first error.
    pub fn complete(&self) -> Result<CycleStatistics> {
        Ok(CycleStatistics {
            volatility: self.volatility.clone()?,
            persistence: self.persistence.clone()?,
            correlation: self.correlation.clone()?,
        })
    }

    /// Outcome of a single statistic.
    pub fn outcome(&self, kind: StatisticKind) -> &Result<f64> {
        match kind {
            StatisticKind::Volatility => &self.volatility,
            StatisticKind::Persistence => &self.persistence,
            StatisticKind::CorrWithReference => &self.correlation,
        }
    }
}

/// Statistics outcome of one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum StatisticsEntry {
    Computed(VariableStatistics),
    Unavailable { reason: String },
}

/// Per-variable statistics of one economy, in the fixed variable order.
#[derive(Debug, Clone, PartialEq)]
pub struct EconomyStatistics {
    pub economy: Economy,
    pub entries: BTreeMap<Variable, StatisticsEntry>,
}

/// Entry counts, logged once per economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsSummary {
    pub economy: Economy,
    pub computed: usize,
    pub unavailable: usize,
}

impl EconomyStatistics {
    pub fn entry(&self, variable: Variable) -> Option<&StatisticsEntry> {
        self.entries.get(&variable)
    }

    pub fn summary(&self) -> StatisticsSummary {
        let computed = self
            .entries
            .values()
            .filter(|e| matches!(e, StatisticsEntry::Computed(_)))
            .count();
        StatisticsSummary {
            economy: self.economy,
            computed,
            unavailable: self.entries.len() - computed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsEngine {
    reference: Variable,
    persistence: PersistenceMethod,
}

impl StatisticsEngine {
    pub fn new(reference: Variable, persistence: PersistenceMethod) -> Self {
        Self {
            reference,
            persistence,
        }
    }

    pub fn from_config(config: &CycleConfig) -> Self {
        Self::new(config.reference, config.persistence)
    }

    pub fn reference(&self) -> Variable {
        self.reference
    }

    /// Statistics of `variable`'s cycle given the reference cycle, or the reason
    /// the reference is unavailable.
    pub fn variable_statistics(
        &self,
        variable: Variable,
        cycle: &TimeSeries,
        reference_cycle: Result<&TimeSeries>,
    ) -> VariableStatistics {
        let volatility = volatility(cycle);
        let persistence = persistence(cycle, self.persistence);
        let correlation = if variable == self.reference {
            // Defined as exactly 1 whenever the cycle itself has data.
            sample_std(&finite_values(cycle)).map(|_| 1.0)
        } else {
            reference_cycle.and_then(|reference| correlation(cycle, reference))
        };
        VariableStatistics {
            volatility,
            persistence,
            correlation,
        }
    }

    /// Statistics for every variable of one economy.
    pub fn compute(&self, economy: Economy, cycles: &BTreeMap<Variable, CycleSlot>) -> EconomyStatistics {
        let reference_cycle: Result<&TimeSeries> = match cycles.get(&self.reference) {
            Some(CycleSlot::Decomposed(d)) => Ok(&d.cycle),
            other => Err(CycleError::MissingReference {
                reference: self.reference.key().to_string(),
                reason: other
                    .and_then(CycleSlot::unavailable_reason)
                    .unwrap_or_else(|| "missing: not provided".to_string()),
            }),
        };

        let entries = Variable::ALL
            .into_iter()
            .map(|variable| {
                let entry = match cycles.get(&variable) {
                    Some(CycleSlot::Decomposed(d)) => StatisticsEntry::Computed(
                        self.variable_statistics(variable, &d.cycle, reference_cycle.clone()),
                    ),
                    Some(slot) => StatisticsEntry::Unavailable {
                        reason: slot.unavailable_reason().unwrap_or_default(),
                    },
                    None => StatisticsEntry::Unavailable {
                        reason: "missing: not provided".to_string(),
                    },
                };
                (variable, entry)
            })
            .collect();

        EconomyStatistics { economy, entries }
    }
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::from_config(&CycleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DecomposedSeries;
    use chrono::Months;

    fn quarterly_from(start_year: i32, values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start.checked_add_months(Months::new(3 * i as u32)).unwrap())
            .collect();
        TimeSeries::new(dates, values.to_vec()).unwrap()
    }

    fn cycle_slot(cycle: TimeSeries) -> CycleSlot {
        CycleSlot::Decomposed(DecomposedSeries {
            lambda: 1600.0,
            observed: cycle.clone(),
            trend: cycle.with_values(vec![0.0; cycle.len()]).unwrap(),
            cycle,
        })
    }

    fn sample_cycle() -> Vec<f64> {
        vec![0.01, 0.02, 0.015, -0.005, -0.02, -0.01, 0.0, 0.012, 0.018, -0.003]
    }

    #[test]
    fn volatility_is_percent_std() {
        let c = quarterly_from(1990, &[0.01, -0.01, 0.01, -0.01]);
        let v = volatility(&c).unwrap();
        let expected = (4.0 * 0.0001f64 / 3.0).sqrt() * 100.0;
        assert!((v - expected).abs() < 1e-12);
    }

    #[test]
    fn volatility_drops_edge_nans() {
        let c = quarterly_from(1990, &[f64::NAN, 0.01, -0.01, f64::NAN]);
        let v = volatility(&c).unwrap();
        assert!((v - (0.0002f64).sqrt() * 100.0).abs() < 1e-12);
    }

    #[test]
    fn zero_cycle_has_zero_volatility_and_undefined_persistence() {
        let c = quarterly_from(1990, &[0.0; 8]);
        assert_eq!(volatility(&c).unwrap(), 0.0);
        for method in [PersistenceMethod::LaggedPearson, PersistenceMethod::Acf] {
            let err = persistence(&c, method).unwrap_err();
            assert!(matches!(err, CycleError::Numerical(_)), "{method:?}");
        }
    }

    #[test]
    fn single_observation_is_insufficient() {
        let c = quarterly_from(1990, &[0.5]);
        assert_eq!(
            volatility(&c).unwrap_err(),
            CycleError::InsufficientData { needed: 2, got: 1 }
        );
        assert!(matches!(
            persistence(&c, PersistenceMethod::LaggedPearson),
            Err(CycleError::InsufficientData { .. })
        ));
    }

    #[test]
    fn persistence_methods_agree_in_sign_on_smooth_cycles() {
        let values: Vec<f64> = (0..40).map(|i| (i as f64 * 0.3).sin() * 0.02).collect();
        let c = quarterly_from(1990, &values);
        let lp = persistence(&c, PersistenceMethod::LaggedPearson).unwrap();
        let acf = persistence(&c, PersistenceMethod::Acf).unwrap();
        assert!(lp > 0.9 && acf > 0.8, "lp {lp}, acf {acf}");
    }

    #[test]
    fn correlation_aligns_on_common_dates() {
        // b starts one year later; the overlap is perfectly anti-correlated.
        let a = quarterly_from(1990, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let b = quarterly_from(1991, &[-5.0, -6.0, -7.0, -8.0, 99.0]);
        let (xs, ys) = aligned_pairs(&a, &b);
        assert_eq!(xs, vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(ys, vec![-5.0, -6.0, -7.0, -8.0]);
        assert!((correlation(&a, &b).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn reference_self_correlation_is_exactly_one() {
        let engine = StatisticsEngine::default();
        let c = quarterly_from(1990, &sample_cycle());
        let stats = engine.variable_statistics(Variable::Gdp, &c, Ok(&c));
        assert_eq!(stats.correlation, Ok(1.0));
        assert_eq!(stats.complete().unwrap().correlation, 1.0);
    }

    #[test]
    fn compute_covers_every_variable_in_order() {
        let engine = StatisticsEngine::default();
        let gdp = quarterly_from(1990, &sample_cycle());
        let inv: Vec<f64> = sample_cycle().iter().map(|v| v * 3.0).collect();

        let mut cycles = BTreeMap::new();
        cycles.insert(Variable::Investment, cycle_slot(quarterly_from(1990, &inv)));
        cycles.insert(Variable::Gdp, cycle_slot(gdp));
        cycles.insert(
            Variable::Consumption,
            CycleSlot::Missing {
                reason: "fetch failed".to_string(),
            },
        );

        let out = engine.compute(Economy::UnitedStates, &cycles);
        let order: Vec<Variable> = out.entries.keys().copied().collect();
        assert_eq!(order, Variable::ALL.to_vec());

        let StatisticsEntry::Computed(inv_stats) = out.entry(Variable::Investment).unwrap() else {
            panic!("investment should be computed");
        };
        let inv_stats = inv_stats.complete().unwrap();
        assert!((inv_stats.correlation - 1.0).abs() < 1e-12);

        let StatisticsEntry::Computed(gdp_stats) = out.entry(Variable::Gdp).unwrap() else {
            panic!("gdp should be computed");
        };
        let gdp_stats = gdp_stats.complete().unwrap();
        assert!((inv_stats.volatility - 3.0 * gdp_stats.volatility).abs() < 1e-9);

        assert_eq!(
            out.entry(Variable::Consumption),
            Some(&StatisticsEntry::Unavailable {
                reason: "missing: fetch failed".to_string()
            })
        );
        assert_eq!(out.summary().computed, 2);
        assert_eq!(out.summary().unavailable, 1);
    }

    #[test]
    fn missing_reference_only_blocks_correlation() {
        let engine = StatisticsEngine::default();
        let mut cycles = BTreeMap::new();
        cycles.insert(Variable::Consumption, cycle_slot(quarterly_from(1990, &sample_cycle())));
        cycles.insert(Variable::Gdp, CycleSlot::Failed(CycleError::domain("log of 0")));

        let out = engine.compute(Economy::Japan, &cycles);
        let StatisticsEntry::Computed(stats) = out.entry(Variable::Consumption).unwrap() else {
            panic!("consumption should be computed");
        };
        assert!(stats.volatility.is_ok());
        assert!(stats.persistence.is_ok());
        assert_eq!(
            stats.correlation,
            Err(CycleError::MissingReference {
                reference: "gdp".to_string(),
                reason: "domain error: log of 0".to_string(),
            })
        );
        assert_eq!(
            stats.correlation.clone().unwrap_err().to_string(),
            "reference variable gdp unavailable (domain error: log of 0)"
        );
        assert!(stats.complete().is_err());

        assert_eq!(
            out.entry(Variable::Gdp),
            Some(&StatisticsEntry::Unavailable {
                reason: "domain error: log of 0".to_string()
            })
        );
    }
}
