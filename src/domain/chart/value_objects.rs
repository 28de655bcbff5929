use crate::domain::errors::{ConfigurationError, ValidationError, ValidationResult};
use crate::domain::market_data::{IndicatorFamily, IndicatorName};
use derive_more::Display;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use strum::{AsRefStr, EnumIter, EnumString};

/// Value Object - what a panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
#[serde(tag = "role", content = "family", rename_all = "lowercase")]
pub enum PanelRole {
    #[display(fmt = "price")]
    Price,
    #[display(fmt = "oscillator:{}", _0)]
    Oscillator(IndicatorFamily),
}

/// Value Object - axis orientation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString,
    AsRefStr, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    #[display(fmt = "time")]
    #[strum(serialize = "time")]
    Time,
    #[display(fmt = "value")]
    #[strum(serialize = "value")]
    Value,
}

/// How an axis picks its extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RangePolicy {
    /// Fitted to the visible data
    Auto,
    FixedMax { max: f64 },
    Fixed { min: f64, max: f64 },
}

/// Value Object - series drawing style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    #[display(fmt = "candlestick")]
    Candlestick,
    #[display(fmt = "bar")]
    Bar,
    #[display(fmt = "line")]
    Line,
}

/// Dataset field a series was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceField {
    #[display(fmt = "kData")]
    Ohlc,
    #[display(fmt = "volumes")]
    Volumes,
    #[display(fmt = "{}", _0)]
    Indicator(IndicatorName),
}

/// Value Object - Color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`.
    pub fn parse(css: &str) -> Result<Self, ConfigurationError> {
        let not_css = || ConfigurationError::InvalidParameter(format!("color `{}` is not #rrggbb", css));
        let digits = css
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(not_css)?;
        let hex = u32::from_str_radix(digits, 16).map_err(|_| not_css())?;
        Ok(Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8))
    }

    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0x80, 0x00);
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

/// Candle body colors. Rising sessions are red, falling ones green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandleTheme {
    pub up: Color,
    pub down: Color,
}

impl Default for CandleTheme {
    fn default() -> Self {
        Self { up: Color::RED, down: Color::GREEN }
    }
}

pub const MIN_VOLUME_SCALE_PERCENT: u32 = 1;
pub const MAX_VOLUME_SCALE_PERCENT: u32 = 400;

/// User-facing display knobs fed into the layout builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayParams {
    volume_scale_percent: u32,
    active_indicators: BTreeSet<IndicatorName>,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self { volume_scale_percent: 100, active_indicators: BTreeSet::new() }
    }
}

impl DisplayParams {
    pub fn new(
        volume_scale_percent: u32,
        active_indicators: impl IntoIterator<Item = IndicatorName>,
    ) -> ValidationResult<Self> {
        Ok(Self {
            volume_scale_percent: check_volume_scale(volume_scale_percent)?,
            active_indicators: active_indicators.into_iter().collect(),
        })
    }

    /// Builds from raw indicator names, rejecting anything unsupported.
    pub fn from_names<S: AsRef<str>>(volume_scale_percent: u32, names: &[S]) -> ValidationResult<Self> {
        let indicators = names
            .iter()
            .map(|name| IndicatorName::parse(name.as_ref()))
            .collect::<ValidationResult<Vec<_>>>()?;
        Self::new(volume_scale_percent, indicators)
    }

    pub fn volume_scale_percent(&self) -> u32 {
        self.volume_scale_percent
    }

    pub fn active_indicators(&self) -> &BTreeSet<IndicatorName> {
        &self.active_indicators
    }

    pub fn is_active(&self, name: IndicatorName) -> bool {
        self.active_indicators.contains(&name)
    }

    pub fn is_family_active(&self, family: IndicatorFamily) -> bool {
        self.active_indicators.iter().any(|name| name.family() == family)
    }

    pub fn with_volume_scale(mut self, percent: u32) -> ValidationResult<Self> {
        self.volume_scale_percent = check_volume_scale(percent)?;
        Ok(self)
    }

    /// Adds every member of a family.
    pub fn with_family(mut self, family: IndicatorFamily) -> Self {
        self.active_indicators.extend(family.members());
        self
    }

    /// Drops every member of a family.
    pub fn without_family(mut self, family: IndicatorFamily) -> Self {
        self.active_indicators.retain(|name| name.family() != family);
        self
    }

    /// Shows exactly one moving average, replacing any other.
    pub fn with_moving_average(self, days: u32) -> ValidationResult<Self> {
        let ma = IndicatorName::moving_average(days)?;
        let mut params = self.without_family(IndicatorFamily::MovingAverage);
        params.active_indicators.insert(ma);
        Ok(params)
    }

    /// Factor applied to the volume axis maximum.
    pub fn volume_scale_factor(&self) -> f64 {
        100.0 / f64::from(self.volume_scale_percent)
    }
}

fn check_volume_scale(percent: u32) -> ValidationResult<u32> {
    if (MIN_VOLUME_SCALE_PERCENT..=MAX_VOLUME_SCALE_PERCENT).contains(&percent) {
        Ok(percent)
    } else {
        Err(ValidationError::OutOfRange {
            field: "volume_scale_percent",
            min: i64::from(MIN_VOLUME_SCALE_PERCENT),
            max: i64::from(MAX_VOLUME_SCALE_PERCENT),
            actual: i64::from(percent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_round_trips_through_css() {
        let color = Color::parse("#ff8000").unwrap();
        assert_eq!(color.to_css(), "#ff8000");
        assert_eq!(Color::RED.to_css(), "#ff0000");
        assert_eq!(Color::GREEN.to_css(), "#008000");
        assert!(Color::parse("ff8000").is_err());
        assert!(Color::parse("#ggg000").is_err());
        assert!(Color::parse("#+fffff").is_err());
        assert_eq!(Color::parse("#0A1b2C").unwrap(), Color::rgb(0x0a, 0x1b, 0x2c));
    }

    #[test]
    fn volume_scale_is_bounded() {
        let none: [IndicatorName; 0] = [];
        assert!(DisplayParams::new(1, none).is_ok());
        assert!(DisplayParams::new(400, none).is_ok());
        assert_eq!(
            DisplayParams::new(0, none),
            Err(ValidationError::OutOfRange {
                field: "volume_scale_percent",
                min: 1,
                max: 400,
                actual: 0
            })
        );
        assert!(DisplayParams::default().with_volume_scale(401).is_err());
    }

    #[test]
    fn moving_average_selection_replaces_the_previous_one() {
        let params = DisplayParams::default()
            .with_moving_average(5)
            .and_then(|p| p.with_moving_average(20))
            .unwrap();
        assert!(params.is_active(IndicatorName::Ma20));
        assert!(!params.is_active(IndicatorName::Ma5));
        assert!(DisplayParams::default().with_moving_average(7).is_err());
    }

    #[test]
    fn unsupported_names_are_rejected() {
        assert_eq!(
            DisplayParams::from_names(100, &["rsi", "obv"]),
            Err(ValidationError::UnsupportedIndicator("obv".to_string()))
        );
        let params = DisplayParams::from_names(50, &["RSI", "k"]).unwrap();
        assert!(params.is_family_active(IndicatorFamily::Kd));
        assert_eq!(params.volume_scale_factor(), 2.0);
    }
}
