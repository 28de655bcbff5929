mod common;

use common::{full_payload, payload, with_indicator};
use serde_json::json;
use stock_chart_wasm::domain::errors::ValidationError;
use stock_chart_wasm::domain::market_data::{IndicatorName, PayloadValidator};

#[test]
fn accepts_well_formed_payload() {
    let dataset = PayloadValidator::new().validate(&full_payload(5)).expect("valid payload");

    assert_eq!(dataset.len(), 5);
    assert_eq!(dataset.name.as_deref(), Some("Test Corp"));
    assert_eq!(dataset.volumes, vec![100, 200, 300, 400, 500]);
    assert_eq!(dataset.ohlc[0].as_quad(), [10.0, 10.5, 9.0, 11.0]);
    assert_eq!(dataset.indicators.len(), 10);
    assert_eq!(dataset.last_indicator_value(IndicatorName::Rsi), Some(44.0));
}

#[test]
fn missing_volumes_is_reported_by_name() {
    let mut raw = payload(3);
    raw.as_object_mut().unwrap().remove("volumes");

    let err = PayloadValidator::new().validate(&raw).unwrap_err();
    assert_eq!(err, ValidationError::MissingField("volumes".into()));
}

#[test]
fn short_indicator_series_is_a_length_mismatch() {
    let mut raw = payload(4);
    raw["rsi"] = json!([50.0, 51.0]);

    let err = PayloadValidator::new().validate(&raw).unwrap_err();
    assert_eq!(err, ValidationError::LengthMismatch("rsi".into(), 4, 2));
}

#[test]
fn nulls_are_kept_as_gaps() {
    let raw = with_indicator(payload(4), "ma5", |i| (i >= 2).then_some(11.0));

    let dataset = PayloadValidator::new().validate(&raw).unwrap();
    assert_eq!(
        dataset.indicator(IndicatorName::Ma5).unwrap(),
        &[None, None, Some(11.0), Some(11.0)]
    );
}

#[test]
fn required_indicator_must_be_present() {
    let validator = PayloadValidator::requiring([IndicatorName::K, IndicatorName::D]);

    let err = validator.validate(&payload(2)).unwrap_err();
    assert_eq!(err, ValidationError::MissingField("k".into()));
    assert!(validator.validate(&full_payload(2)).is_ok());
}

#[test]
fn diagnose_lists_every_problem() {
    let raw = json!({
        "dates": ["2024-01-02", "2024-01-03"],
        "kData": [[1, 2, 0.5, 2.5]],
        "macd": "not a series",
    });

    let problems = PayloadValidator::new().diagnose(&raw);
    assert_eq!(
        problems,
        vec![
            ValidationError::LengthMismatch("kData".into(), 2, 1),
            ValidationError::MissingField("volumes".into()),
            ValidationError::WrongType("macd".into(), "array"),
        ]
    );
    assert!(PayloadValidator::new().diagnose(&payload(2)).is_empty());
}

#[test]
fn malformed_candle_row_is_rejected() {
    let mut raw = payload(2);
    raw["kData"][1] = json!([1.0, 2.0, 3.0]);

    let err = PayloadValidator::new().validate(&raw).unwrap_err();
    assert_eq!(err.field(), "kData");
}

#[test]
fn non_object_payload_is_rejected() {
    let err = PayloadValidator::new().validate(&json!([1, 2, 3])).unwrap_err();
    assert_eq!(err, ValidationError::WrongType("payload".into(), "object"));
}
