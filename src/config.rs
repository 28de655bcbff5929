use crate::domain::chart::services::{
    DEFAULT_OSCILLATOR_FRACTION, DEFAULT_VOLUME_HEADROOM, DEFAULT_VOLUME_PLACEHOLDER,
};
use crate::domain::chart::{CandleTheme, ChartModelBuilder, Color};
use crate::domain::errors::ConfigurationError;
use crate::domain::history::DEFAULT_HISTORY_CAPACITY;
use crate::domain::market_data::Period;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTIFICATION_CONTAINER: &str = "error-notifications";

/// Candle colors as `#rrggbb` strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub up: String,
    pub down: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        let theme = CandleTheme::default();
        Self { up: theme.up.to_css(), down: theme.down.to_css() }
    }
}

impl ThemeConfig {
    pub fn to_theme(&self) -> Result<CandleTheme, ConfigurationError> {
        Ok(CandleTheme { up: Color::parse(&self.up)?, down: Color::parse(&self.down)? })
    }
}

/// Runtime settings for a chart session. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub api_base_url: String,
    /// DOM element receiving error notifications; empty logs them only.
    pub notification_container_id: String,
    pub reset_zoom_on_new_query: bool,
    pub history_capacity: usize,
    pub volume_headroom: f64,
    pub volume_axis_placeholder: f64,
    pub oscillator_panel_fraction: f64,
    pub theme: ThemeConfig,
    pub default_period: Period,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            notification_container_id: DEFAULT_NOTIFICATION_CONTAINER.to_string(),
            reset_zoom_on_new_query: false,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            volume_headroom: DEFAULT_VOLUME_HEADROOM,
            volume_axis_placeholder: DEFAULT_VOLUME_PLACEHOLDER,
            oscillator_panel_fraction: DEFAULT_OSCILLATOR_FRACTION,
            theme: ThemeConfig::default(),
            default_period: Period::default(),
        }
    }
}

impl ChartConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(1..=DEFAULT_HISTORY_CAPACITY).contains(&self.history_capacity) {
            return Err(invalid(&format!(
                "history_capacity must be within 1..={}",
                DEFAULT_HISTORY_CAPACITY
            )));
        }
        if !(self.volume_headroom.is_finite() && self.volume_headroom >= 1.0) {
            return Err(invalid("volume_headroom must be a finite number >= 1"));
        }
        if !(self.volume_axis_placeholder.is_finite() && self.volume_axis_placeholder > 0.0) {
            return Err(invalid("volume_axis_placeholder must be positive"));
        }
        // three oscillator panels must leave room for the price panel
        if !(self.oscillator_panel_fraction > 0.0 && self.oscillator_panel_fraction <= 0.3) {
            return Err(invalid("oscillator_panel_fraction must be within (0, 0.3]"));
        }
        self.theme.to_theme()?;
        Ok(())
    }

    pub fn model_builder(&self) -> Result<ChartModelBuilder, ConfigurationError> {
        Ok(ChartModelBuilder::new()
            .with_volume_headroom(self.volume_headroom)
            .with_volume_placeholder(self.volume_axis_placeholder)
            .with_oscillator_fraction(self.oscillator_panel_fraction)
            .with_theme(self.theme.to_theme()?))
    }
}

fn invalid(message: &str) -> ConfigurationError {
    ConfigurationError::InvalidParameter(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = ChartConfig::from_json("{}").unwrap();
        assert_eq!(config, ChartConfig::default());
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.default_period, Period::ThreeMonths);
        assert_eq!(config.theme.up, "#ff0000");
        assert_eq!(config.notification_container_id, "error-notifications");
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = ChartConfig::from_json(
            r#"{"api_base_url":"http://localhost:5000","reset_zoom_on_new_query":true,"default_period":"1y"}"#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert!(config.reset_zoom_on_new_query);
        assert_eq!(config.default_period, Period::OneYear);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(ChartConfig::from_json("not json"), Err(ConfigurationError::Parse(_))));
        assert!(matches!(
            ChartConfig::from_json(r#"{"history_capacity":0}"#),
            Err(ConfigurationError::InvalidParameter(_))
        ));
        assert!(matches!(
            ChartConfig::from_json(r#"{"history_capacity":11}"#),
            Err(ConfigurationError::InvalidParameter(_))
        ));
        assert!(matches!(
            ChartConfig::from_json(r#"{"history_capacity":18446744073709551615}"#),
            Err(ConfigurationError::InvalidParameter(_))
        ));
        assert!(ChartConfig::from_json(r#"{"history_capacity":3}"#).is_ok());
        assert!(matches!(
            ChartConfig::from_json(r##"{"theme":{"up":"red"}}"##),
            Err(ConfigurationError::InvalidParameter(_))
        ));
    }
}
