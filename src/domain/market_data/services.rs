use crate::domain::errors::{ValidationError, ValidationResult};
use crate::domain::logging::{LogComponent, LogLevel, get_logger};
use crate::domain::market_data::{ChartDataset, IndicatorName, Ohlc};
use crate::log_debug;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use strum::IntoEnumIterator;

pub const DATES_FIELD: &str = "dates";
pub const PRICE_FIELD: &str = "kData";
pub const VOLUMES_FIELD: &str = "volumes";
pub const NAME_FIELD: &str = "name";

/// Checks raw payloads against the chart data contract.
///
/// Validation runs in two passes: every series is first checked for
/// presence, array shape and length, and only when all of them pass are the
/// entries coerced. `diagnose` reports every problem found, `validate` the
/// first one.
#[derive(Debug, Clone, Default)]
pub struct PayloadValidator {
    required_indicators: BTreeSet<IndicatorName>,
}

impl PayloadValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator that also requires the given indicator keys.
    pub fn requiring(indicators: impl IntoIterator<Item = IndicatorName>) -> Self {
        Self { required_indicators: indicators.into_iter().collect() }
    }

    pub fn validate(&self, raw: &Value) -> ValidationResult<ChartDataset> {
        match self.inspect(raw) {
            Ok(dataset) => {
                log_debug!(
                    LogComponent::Domain("PayloadValidator"),
                    "payload accepted: {} sessions, {} indicator series",
                    dataset.len(),
                    dataset.indicators.len()
                );
                Ok(dataset)
            }
            Err(mut errors) => {
                let problems: Vec<String> = errors.iter().map(ToString::to_string).collect();
                get_logger().log_with_metadata(
                    LogLevel::Warn,
                    LogComponent::Domain("PayloadValidator"),
                    &format!("payload rejected with {} problem(s)", errors.len()),
                    &problems.join("; "),
                );
                Err(errors.swap_remove(0))
            }
        }
    }

    /// Every problem in the payload, in field order. Empty when valid.
    pub fn diagnose(&self, raw: &Value) -> Vec<ValidationError> {
        self.inspect(raw).err().unwrap_or_default()
    }

    fn inspect(&self, raw: &Value) -> Result<ChartDataset, Vec<ValidationError>> {
        let object = raw
            .as_object()
            .ok_or_else(|| vec![ValidationError::WrongType("payload".to_string(), "object")])?;

        let mut errors = Vec::new();

        // Pass 1: shapes
        let dates = array_field(object, DATES_FIELD, true, None, &mut errors);
        let expected = dates.map(Vec::len);
        let prices = array_field(object, PRICE_FIELD, true, expected, &mut errors);
        let volumes = array_field(object, VOLUMES_FIELD, true, expected, &mut errors);
        let indicators: Vec<(IndicatorName, &Vec<Value>)> = IndicatorName::iter()
            .filter_map(|name| {
                let required = self.required_indicators.contains(&name);
                array_field(object, name.key(), required, expected, &mut errors)
                    .map(|values| (name, values))
            })
            .collect();

        if !errors.is_empty() {
            return Err(errors);
        }
        let (Some(dates), Some(prices), Some(volumes)) = (dates, prices, volumes) else {
            return Err(vec![ValidationError::MissingField(DATES_FIELD.to_string())]);
        };

        // Pass 2: entries
        let dates = collect_entries(dates, DATES_FIELD, coerce_date, &mut errors);
        let ohlc = collect_entries(prices, PRICE_FIELD, coerce_quad, &mut errors);
        let volumes = collect_entries(volumes, VOLUMES_FIELD, coerce_volume, &mut errors);
        let indicators: BTreeMap<IndicatorName, Vec<Option<f64>>> = indicators
            .into_iter()
            .filter_map(|(name, values)| {
                collect_entries(values, name.key(), coerce_indicator, &mut errors)
                    .map(|series| (name, series))
            })
            .collect();

        match (dates, ohlc, volumes) {
            (Some(dates), Some(ohlc), Some(volumes)) if errors.is_empty() => Ok(ChartDataset {
                name: object
                    .get(NAME_FIELD)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string),
                dates,
                ohlc,
                volumes,
                indicators,
            }),
            _ => Err(errors),
        }
    }
}

fn array_field<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    required: bool,
    expected_len: Option<usize>,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a Vec<Value>> {
    let Some(value) = object.get(field) else {
        if required {
            errors.push(ValidationError::MissingField(field.to_string()));
        }
        return None;
    };
    let Some(values) = value.as_array() else {
        errors.push(ValidationError::WrongType(field.to_string(), "array"));
        return None;
    };
    if let Some(expected) = expected_len {
        if values.len() != expected {
            errors.push(ValidationError::LengthMismatch(field.to_string(), expected, values.len()));
            return None;
        }
    }
    Some(values)
}

/// Coerces every entry; the first failing entry is reported for the field.
fn collect_entries<T>(
    values: &[Value],
    field: &str,
    coerce: fn(&Value) -> Result<T, &'static str>,
    errors: &mut Vec<ValidationError>,
) -> Option<Vec<T>> {
    match values.iter().map(coerce).collect::<Result<Vec<T>, _>>() {
        Ok(entries) => Some(entries),
        Err(expected) => {
            errors.push(ValidationError::WrongType(field.to_string(), expected));
            None
        }
    }
}

fn coerce_date(value: &Value) -> Result<String, &'static str> {
    value.as_str().map(str::to_string).ok_or("array of date strings")
}

/// Numbers or numeric strings; non-finite values are rejected.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn coerce_quad(value: &Value) -> Result<Ohlc, &'static str> {
    const EXPECTED: &str = "array of [open, close, low, high] rows";
    let row = value.as_array().filter(|row| row.len() == 4).ok_or(EXPECTED)?;
    let mut quad = [0.0; 4];
    for (slot, entry) in quad.iter_mut().zip(row) {
        *slot = coerce_number(entry).ok_or(EXPECTED)?;
    }
    Ok(Ohlc::from_quad(quad))
}

fn coerce_volume(value: &Value) -> Result<u64, &'static str> {
    const EXPECTED: &str = "array of non-negative integers";
    if let Some(volume) = value.as_u64() {
        return Ok(volume);
    }
    if let Some(volume) = value.as_str().and_then(|s| s.trim().parse::<u64>().ok()) {
        return Ok(volume);
    }
    match coerce_number(value) {
        Some(volume) if volume >= 0.0 && volume.fract() == 0.0 && volume <= u64::MAX as f64 => {
            Ok(volume as u64)
        }
        _ => Err(EXPECTED),
    }
}

fn coerce_indicator(value: &Value) -> Result<Option<f64>, &'static str> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or("array of numbers or nulls"),
        _ => Err("array of numbers or nulls"),
    }
}
