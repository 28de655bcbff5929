use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};

use crate::domain::errors::ValidationError;

/// Value Object - instrument code as typed by the user, e.g. `2330`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct StockCode(String);

impl StockCode {
    /// Trims the input and accepts `[A-Za-z0-9.-]` only.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let code = raw.trim();
        if code.is_empty() {
            return Err(ValidationError::MissingField("code".to_string()));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') {
            return Err(ValidationError::WrongType("code".to_string(), "alphanumeric instrument code"));
        }
        Ok(Self(code.to_uppercase()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Value Object - period shorthand understood by the data source
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay, EnumIter, EnumString, AsRefStr,
    Serialize, Deserialize,
)]
pub enum Period {
    #[strum(serialize = "5d")]
    #[serde(rename = "5d")]
    FiveDays,
    #[strum(serialize = "1mo")]
    #[serde(rename = "1mo")]
    OneMonth,
    #[default]
    #[strum(serialize = "3mo")]
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[strum(serialize = "6mo")]
    #[serde(rename = "6mo")]
    SixMonths,
    #[strum(serialize = "1y")]
    #[serde(rename = "1y")]
    OneYear,
    #[strum(serialize = "2y")]
    #[serde(rename = "2y")]
    TwoYears,
    #[strum(serialize = "5y")]
    #[serde(rename = "5y")]
    FiveYears,
    #[strum(serialize = "max")]
    #[serde(rename = "max")]
    Max,
}

/// Either a period shorthand or an explicit inclusive date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRange {
    Period(Period),
    Between { start: String, end: String },
}

impl QueryRange {
    /// Dates must be `YYYY-MM-DD` with `start <= end`.
    pub fn between(start: &str, end: &str) -> Result<Self, ValidationError> {
        if !is_iso_date(start) {
            return Err(ValidationError::WrongType("start".to_string(), "date as YYYY-MM-DD"));
        }
        if !is_iso_date(end) {
            return Err(ValidationError::WrongType("end".to_string(), "date as YYYY-MM-DD"));
        }
        // ISO dates order lexicographically
        if start > end {
            return Err(ValidationError::WrongType("end".to_string(), "date not before start"));
        }
        Ok(Self::Between { start: start.to_string(), end: end.to_string() })
    }
}

impl Default for QueryRange {
    fn default() -> Self {
        Self::Period(Period::default())
    }
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u32> {
        let part = &value[range];
        if part.bytes().all(|b| b.is_ascii_digit()) { part.parse().ok() } else { None }
    };
    match (digits(0..4), digits(5..7), digits(8..10)) {
        (Some(_), Some(month), Some(day)) => (1..=12).contains(&month) && (1..=31).contains(&day),
        _ => false,
    }
}

/// Value Object - one request against the data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockQuery {
    pub code: StockCode,
    pub range: QueryRange,
}

impl StockQuery {
    pub fn new(code: StockCode, range: QueryRange) -> Self {
        Self { code, range }
    }
}

/// Supported indicator series. Payload keys and display toggles are checked
/// against this set; anything else is rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, StrumDisplay, EnumIter, EnumString,
    AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IndicatorName {
    Ma5,
    Ma10,
    Ma15,
    Ma20,
    Rsi,
    Macd,
    Signal,
    Hist,
    K,
    D,
}

impl IndicatorName {
    /// Moving average for a day count, e.g. `moving_average(5) == Ok(Ma5)`.
    pub fn moving_average(days: u32) -> Result<Self, ValidationError> {
        match days {
            5 => Ok(Self::Ma5),
            10 => Ok(Self::Ma10),
            15 => Ok(Self::Ma15),
            20 => Ok(Self::Ma20),
            other => Err(ValidationError::UnsupportedIndicator(format!("ma{}", other))),
        }
    }

    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        name.trim()
            .to_ascii_lowercase()
            .parse::<Self>()
            .map_err(|_| ValidationError::UnsupportedIndicator(name.to_string()))
    }

    pub fn family(self) -> IndicatorFamily {
        match self {
            Self::Ma5 | Self::Ma10 | Self::Ma15 | Self::Ma20 => IndicatorFamily::MovingAverage,
            Self::Rsi => IndicatorFamily::Rsi,
            Self::Macd | Self::Signal | Self::Hist => IndicatorFamily::Macd,
            Self::K | Self::D => IndicatorFamily::Kd,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Ma5 => "ma5",
            Self::Ma10 => "ma10",
            Self::Ma15 => "ma15",
            Self::Ma20 => "ma20",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::Signal => "signal",
            Self::Hist => "hist",
            Self::K => "k",
            Self::D => "d",
        }
    }
}

/// Indicators that are drawn together
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, StrumDisplay, EnumIter, Serialize,
)]
pub enum IndicatorFamily {
    #[strum(serialize = "MA")]
    #[serde(rename = "MA")]
    MovingAverage,
    #[strum(serialize = "RSI")]
    #[serde(rename = "RSI")]
    Rsi,
    #[strum(serialize = "MACD")]
    #[serde(rename = "MACD")]
    Macd,
    #[strum(serialize = "KD")]
    #[serde(rename = "KD")]
    Kd,
}

impl IndicatorFamily {
    pub fn members(self) -> Vec<IndicatorName> {
        IndicatorName::iter().filter(|name| name.family() == self).collect()
    }

    /// Oscillators get their own panel below the price panel.
    pub fn is_oscillator(self) -> bool {
        !matches!(self, Self::MovingAverage)
    }
}

/// Value Object - one daily candle in `[open, close, low, high]` order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
}

impl Ohlc {
    pub fn new(open: f64, close: f64, low: f64, high: f64) -> Self {
        Self { open, close, low, high }
    }

    pub fn from_quad([open, close, low, high]: [f64; 4]) -> Self {
        Self::new(open, close, low, high)
    }

    pub fn as_quad(&self) -> [f64; 4] {
        [self.open, self.close, self.low, self.high]
    }

    /// A flat candle (close == open) counts as up.
    pub fn direction(&self) -> CandleDirection {
        if self.close >= self.open { CandleDirection::Up } else { CandleDirection::Down }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleDirection {
    #[display(fmt = "up")]
    Up,
    #[display(fmt = "down")]
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_code_is_trimmed_and_checked() {
        assert_eq!(StockCode::new(" 2330 ").unwrap().value(), "2330");
        assert_eq!(StockCode::new("0050.tw").unwrap().value(), "0050.TW");
        assert!(matches!(StockCode::new("   "), Err(ValidationError::MissingField(_))));
        assert!(matches!(StockCode::new("23 30"), Err(ValidationError::WrongType(_, _))));
    }

    #[test]
    fn indicator_names_round_trip_through_keys() {
        for name in IndicatorName::iter() {
            assert_eq!(IndicatorName::parse(name.key()).unwrap(), name);
            assert_eq!(name.to_string(), name.key());
        }
        assert_eq!(IndicatorName::parse("MACD").unwrap(), IndicatorName::Macd);
        assert!(IndicatorName::parse("ma7").is_err());
    }

    #[test]
    fn moving_average_lookup_rejects_unknown_windows() {
        assert_eq!(IndicatorName::moving_average(20).unwrap(), IndicatorName::Ma20);
        assert_eq!(
            IndicatorName::moving_average(7),
            Err(ValidationError::UnsupportedIndicator("ma7".to_string()))
        );
    }

    #[test]
    fn families_group_their_members() {
        assert_eq!(
            IndicatorFamily::Macd.members(),
            vec![IndicatorName::Macd, IndicatorName::Signal, IndicatorName::Hist]
        );
        assert_eq!(IndicatorFamily::Kd.members(), vec![IndicatorName::K, IndicatorName::D]);
        assert!(!IndicatorFamily::MovingAverage.is_oscillator());
    }

    #[test]
    fn date_ranges_need_ordered_iso_dates() {
        assert!(QueryRange::between("2024-01-01", "2024-03-31").is_ok());
        assert!(QueryRange::between("2024-03-31", "2024-01-01").is_err());
        assert!(QueryRange::between("2024-1-1", "2024-03-31").is_err());
        assert!(QueryRange::between("2024-13-01", "2024-12-31").is_err());
    }

    #[test]
    fn flat_candle_is_up() {
        assert_eq!(Ohlc::from_quad([10.0, 10.0, 8.0, 12.0]).direction(), CandleDirection::Up);
        assert_eq!(Ohlc::from_quad([10.0, 9.5, 8.0, 12.0]).direction(), CandleDirection::Down);
    }
}
