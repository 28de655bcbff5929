pub use super::value_objects::{IndicatorFamily, IndicatorName, Ohlc, StockCode};
use serde::Serialize;
use std::collections::BTreeMap;

/// Domain entity - validated, index-aligned time series for one instrument.
///
/// Produced once per successful fetch and never mutated afterwards. Every
/// series has exactly `dates.len()` entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub name: Option<String>,
    pub dates: Vec<String>,
    pub ohlc: Vec<Ohlc>,
    pub volumes: Vec<u64>,
    pub indicators: BTreeMap<IndicatorName, Vec<Option<f64>>>,
}

impl ChartDataset {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn indicator(&self, name: IndicatorName) -> Option<&[Option<f64>]> {
        self.indicators.get(&name).map(Vec::as_slice)
    }

    pub fn has_indicator(&self, name: IndicatorName) -> bool {
        self.indicators.contains_key(&name)
    }

    /// A family counts as present when any of its members is.
    pub fn has_family(&self, family: IndicatorFamily) -> bool {
        family.members().into_iter().any(|name| self.has_indicator(name))
    }

    pub fn max_volume(&self) -> Option<u64> {
        self.volumes.iter().copied().max()
    }

    /// Last value of an indicator; a trailing `null` yields `None`.
    pub fn last_indicator_value(&self, name: IndicatorName) -> Option<f64> {
        self.indicator(name).and_then(|series| series.last().copied().flatten())
    }

    /// Display name, falling back to the instrument code.
    pub fn display_name<'a>(&'a self, code: &'a StockCode) -> &'a str {
        self.name.as_deref().unwrap_or(code.value())
    }
}
