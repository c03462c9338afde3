//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - produced once by the engines and then only read
//! - exported to JSON/CSV
//! - handed to an external plotting or reporting layer as plain data

use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{CycleError, Result};

/// Macroeconomic variables covered by the comparison.
///
/// Declaration order is the fixed table order (gdp, consumption, investment).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    Gdp,
    Consumption,
    Investment,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::Gdp, Variable::Consumption, Variable::Investment];

    /// Lowercase key used in files and tables.
    pub fn key(self) -> &'static str {
        match self {
            Variable::Gdp => "gdp",
            Variable::Consumption => "consumption",
            Variable::Investment => "investment",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Variable::Gdp => "GDP",
            Variable::Consumption => "Consumption",
            Variable::Investment => "Investment",
        }
    }
}

/// Economies compared side by side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Economy {
    #[value(name = "us")]
    #[serde(rename = "us")]
    UnitedStates,
    #[value(name = "jp")]
    #[serde(rename = "jp")]
    Japan,
}

impl Economy {
    pub const ALL: [Economy; 2] = [Economy::UnitedStates, Economy::Japan];

    pub fn display_name(self) -> &'static str {
        match self {
            Economy::UnitedStates => "United States",
            Economy::Japan => "Japan",
        }
    }

    /// Short column label for tables.
    pub fn short_label(self) -> &'static str {
        match self {
            Economy::UnitedStates => "US",
            Economy::Japan => "Japan",
        }
    }

    /// FRED series id holding the real quarterly level of `variable`.
    pub fn series_id(self, variable: Variable) -> &'static str {
        match (self, variable) {
            (Economy::UnitedStates, Variable::Gdp) => "GDPC1",
            (Economy::UnitedStates, Variable::Consumption) => "PCECC96",
            (Economy::UnitedStates, Variable::Investment) => "GPDIC1",
            (Economy::Japan, Variable::Gdp) => "JPNRGDPEXP",
            (Economy::Japan, Variable::Consumption) => "JPNPFCEADSMEI",
            (Economy::Japan, Variable::Investment) => "JPNGFCFADSMEI",
        }
    }
}

/// Sampling frequency of a series, used to pick a conventional λ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Annual,
    Quarterly,
    Monthly,
}

impl Frequency {
    /// Conventional HP smoothing parameter (Ravn–Uhlig scaling of 1600).
    pub fn hp_lambda(self) -> f64 {
        match self {
            Frequency::Annual => 6.25,
            Frequency::Quarterly => 1600.0,
            Frequency::Monthly => 129_600.0,
        }
    }
}

/// An ordered `(date, value)` series with strictly increasing dates.
///
/// A NaN value marks a missing observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(CycleError::domain(format!(
                "series has {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(CycleError::domain(format!(
                "timestamps must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }
        Ok(Self { dates, values })
    }

    /// Build a series from unsorted pairs. Sorting happens here; duplicates still fail.
    pub fn from_pairs(mut pairs: Vec<(NaiveDate, f64)>) -> Result<Self> {
        pairs.sort_by_key(|(d, _)| *d);
        let (dates, values) = pairs.into_iter().unzip();
        Self::new(dates, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of non-missing (finite) observations.
    pub fn observed_len(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }

    /// A new series on the same index with different values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        if values.len() != self.dates.len() {
            return Err(CycleError::domain(format!(
                "expected {} values for the shared index, got {}",
                self.dates.len(),
                values.len()
            )));
        }
        Ok(Self {
            dates: self.dates.clone(),
            values,
        })
    }

    /// Observations inside the inclusive `[start, end]` range (open ends allowed).
    pub fn window(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let (dates, values) = self
            .iter()
            .filter(|(d, _)| start.is_none_or(|s| *d >= s) && end.is_none_or(|e| *d <= e))
            .unzip();
        Self { dates, values }
    }
}

/// One variable's raw series, or the reason it is unavailable.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesSlot {
    Available(TimeSeries),
    Missing { reason: String },
}

impl SeriesSlot {
    pub fn series(&self) -> Option<&TimeSeries> {
        match self {
            SeriesSlot::Available(series) => Some(series),
            SeriesSlot::Missing { .. } => None,
        }
    }
}

/// All raw series for one economy. Every [`Variable`] always has a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableBundle {
    economy: Economy,
    slots: BTreeMap<Variable, SeriesSlot>,
}

impl VariableBundle {
    /// A bundle with every variable marked missing.
    pub fn new(economy: Economy) -> Self {
        let slots = Variable::ALL
            .into_iter()
            .map(|v| {
                (
                    v,
                    SeriesSlot::Missing {
                        reason: "not provided".to_string(),
                    },
                )
            })
            .collect();
        Self { economy, slots }
    }

    pub fn with_series(mut self, variable: Variable, series: TimeSeries) -> Self {
        self.slots.insert(variable, SeriesSlot::Available(series));
        self
    }

    pub fn with_missing(mut self, variable: Variable, reason: impl Into<String>) -> Self {
        self.slots.insert(
            variable,
            SeriesSlot::Missing {
                reason: reason.into(),
            },
        );
        self
    }

    pub fn economy(&self) -> Economy {
        self.economy
    }

    pub fn slot(&self, variable: Variable) -> &SeriesSlot {
        // `new` fills every variable, so the lookup cannot fail.
        &self.slots[&variable]
    }

    /// Slots in the fixed variable order.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, &SeriesSlot)> {
        self.slots.iter().map(|(v, s)| (*v, s))
    }

    /// Restrict every available series to the inclusive date range.
    pub fn window(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let slots = self
            .slots
            .iter()
            .map(|(v, slot)| {
                let slot = match slot {
                    SeriesSlot::Available(series) => SeriesSlot::Available(series.window(start, end)),
                    missing => missing.clone(),
                };
                (*v, slot)
            })
            .collect();
        Self {
            economy: self.economy,
            slots,
        }
    }
}

/// Trend/cycle split of one series. All three share the same index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecomposedSeries {
    pub lambda: f64,
    pub observed: TimeSeries,
    pub trend: TimeSeries,
    pub cycle: TimeSeries,
}

/// Decomposition outcome of one variable of one economy.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleSlot {
    Decomposed(DecomposedSeries),
    /// The raw series never arrived.
    Missing { reason: String },
    /// The series arrived but transform or filter rejected it.
    Failed(CycleError),
}

impl CycleSlot {
    pub fn decomposed(&self) -> Option<&DecomposedSeries> {
        match self {
            CycleSlot::Decomposed(d) => Some(d),
            _ => None,
        }
    }

    /// Human-readable reason when there is no decomposition.
    pub fn unavailable_reason(&self) -> Option<String> {
        match self {
            CycleSlot::Decomposed(_) => None,
            CycleSlot::Missing { reason } => Some(format!("missing: {reason}")),
            CycleSlot::Failed(err) => Some(err.to_string()),
        }
    }
}

/// Lag-1 autocorrelation estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceMethod {
    /// Pearson correlation of `x[1..]` against `x[..n-1]`.
    LaggedPearson,
    /// Classical estimator: full-sample mean, lag-1 autocovariance over total sum of squares.
    Acf,
}

/// Parameters for a decomposition + statistics run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleConfig {
    /// HP smoothing parameter. `f64::INFINITY` yields the OLS linear trend.
    pub lambda: f64,
    /// Variable the co-movement statistic correlates against.
    pub reference: Variable,
    /// Minimum series length accepted by the filter.
    pub min_len: usize,
    pub persistence: PersistenceMethod,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            lambda: Frequency::Quarterly.hp_lambda(),
            reference: Variable::Gdp,
            min_len: 5,
            persistence: PersistenceMethod::LaggedPearson,
        }
    }
}

/// Business-cycle moments of one variable's cyclical component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleStatistics {
    /// Standard deviation of the cycle, in percent.
    pub volatility: f64,
    /// Lag-1 autocorrelation.
    pub persistence: f64,
    /// Correlation with the reference variable's cycle.
    pub correlation: f64,
}

/// Column groups of the comparison table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKind {
    Volatility,
    Persistence,
    CorrWithReference,
}

impl StatisticKind {
    pub const ALL: [StatisticKind; 3] = [
        StatisticKind::Volatility,
        StatisticKind::Persistence,
        StatisticKind::CorrWithReference,
    ];

    pub fn label(self, reference: Variable) -> String {
        match self {
            StatisticKind::Volatility => "Volatility (%)".to_string(),
            StatisticKind::Persistence => "Persistence".to_string(),
            StatisticKind::CorrWithReference => format!("Corr. with {}", reference.display_name()),
        }
    }

    pub fn pick(self, stats: &CycleStatistics) -> f64 {
        match self {
            StatisticKind::Volatility => stats.volatility,
            StatisticKind::Persistence => stats.persistence,
            StatisticKind::CorrWithReference => stats.correlation,
        }
    }
}

/// One table cell: a number, or an explicit "not available".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Value(f64),
    NotAvailable { reason: String },
}

impl Cell {
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(*v),
            Cell::NotAvailable { .. } => None,
        }
    }
}

/// A `(statistic, economy)` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub statistic: StatisticKind,
    pub economy: Economy,
}

/// One table row; `cells` line up with [`ComparisonTable::columns`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub variable: Variable,
    pub cells: Vec<Cell>,
}

/// Statistics of every variable across economies, grouped by statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub(crate) reference: Variable,
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn reference(&self) -> Variable {
        self.reference
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn get(&self, statistic: StatisticKind, economy: Economy, variable: Variable) -> Option<&Cell> {
        let col = self
            .columns
            .iter()
            .position(|c| c.statistic == statistic && c.economy == economy)?;
        let row = self.rows.iter().find(|r| r.variable == variable)?;
        row.cells.get(col)
    }
}
