use crate::domain::market_data::{ChartDataset, IndicatorName};
use derive_more::Display;
use serde::Serialize;

/// Direction the next session is expected to lean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    #[display(fmt = "bullish")]
    Bullish,
    #[display(fmt = "cautiously bullish")]
    CautiouslyBullish,
    #[display(fmt = "neutral")]
    Neutral,
    #[display(fmt = "cautiously bearish")]
    CautiouslyBearish,
    #[display(fmt = "bearish")]
    Bearish,
}

/// Rule that produced an outlook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    #[display(fmt = "not enough sessions")]
    InsufficientData,
    #[display(fmt = "no signal")]
    Flat,
    #[display(fmt = "price up on rising volume")]
    PriceUpVolumeUp,
    #[display(fmt = "price up on falling volume")]
    PriceUpVolumeDown,
    #[display(fmt = "price down on rising volume")]
    PriceDownVolumeUp,
    #[display(fmt = "price down on falling volume")]
    PriceDownVolumeDown,
    #[display(fmt = "moving averages in bullish alignment")]
    MaBullishAlignment,
    #[display(fmt = "moving averages in bearish alignment")]
    MaBearishAlignment,
    #[display(fmt = "RSI overbought")]
    RsiOverbought,
    #[display(fmt = "RSI oversold")]
    RsiOversold,
    #[display(fmt = "MACD above signal")]
    MacdGoldenCross,
    #[display(fmt = "MACD below signal")]
    MacdDeathCross,
    #[display(fmt = "KD overbought")]
    KdOverbought,
    #[display(fmt = "KD oversold")]
    KdOversold,
    #[display(fmt = "K above D")]
    KdGoldenCross,
    #[display(fmt = "K below D")]
    KdDeathCross,
}

impl Signal {
    pub fn bias(self) -> Bias {
        match self {
            Signal::InsufficientData | Signal::Flat => Bias::Neutral,
            Signal::PriceUpVolumeDown => Bias::CautiouslyBullish,
            Signal::PriceDownVolumeDown => Bias::CautiouslyBearish,
            Signal::PriceUpVolumeUp
            | Signal::MaBullishAlignment
            | Signal::RsiOversold
            | Signal::MacdGoldenCross
            | Signal::KdOversold
            | Signal::KdGoldenCross => Bias::Bullish,
            Signal::PriceDownVolumeUp
            | Signal::MaBearishAlignment
            | Signal::RsiOverbought
            | Signal::MacdDeathCross
            | Signal::KdOverbought
            | Signal::KdDeathCross => Bias::Bearish,
        }
    }
}

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const KD_OVERBOUGHT: f64 = 80.0;
pub const KD_OVERSOLD: f64 = 20.0;

/// Simple next-session read of the last two sessions.
///
/// Rules run from price/volume through moving averages, RSI, MACD and KD;
/// a later rule that fires replaces the earlier verdict. Indicators that are
/// absent or still warming up (`null`) are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[display(fmt = "{} ({})", bias, signal)]
pub struct MarketOutlook {
    pub bias: Bias,
    pub signal: Signal,
}

impl MarketOutlook {
    fn from_signal(signal: Signal) -> Self {
        Self { bias: signal.bias(), signal }
    }

    pub fn assess(dataset: &ChartDataset) -> Self {
        let (Some([yesterday, today]), Some([volume_before, volume])) =
            (last_two(&dataset.ohlc), last_two(&dataset.volumes))
        else {
            return Self::from_signal(Signal::InsufficientData);
        };

        let volume_rising = volume > volume_before;
        let mut signal = if today.close > yesterday.close {
            if volume_rising { Signal::PriceUpVolumeUp } else { Signal::PriceUpVolumeDown }
        } else if today.close < yesterday.close {
            if volume_rising { Signal::PriceDownVolumeUp } else { Signal::PriceDownVolumeDown }
        } else {
            Signal::Flat
        };

        let last = |name| dataset.last_indicator_value(name);

        if let (Some(ma5), Some(ma10), Some(ma15), Some(ma20)) = (
            last(IndicatorName::Ma5),
            last(IndicatorName::Ma10),
            last(IndicatorName::Ma15),
            last(IndicatorName::Ma20),
        ) {
            if ma5 > ma10 && ma5 > ma15 && ma5 > ma20 {
                signal = Signal::MaBullishAlignment;
            } else if ma5 < ma10 && ma5 < ma15 && ma5 < ma20 {
                signal = Signal::MaBearishAlignment;
            }
        }

        if let Some(rsi) = last(IndicatorName::Rsi) {
            if rsi > RSI_OVERBOUGHT {
                signal = Signal::RsiOverbought;
            } else if rsi < RSI_OVERSOLD {
                signal = Signal::RsiOversold;
            }
        }

        if let (Some(macd), Some(line)) = (last(IndicatorName::Macd), last(IndicatorName::Signal)) {
            if macd > line {
                signal = Signal::MacdGoldenCross;
            } else if macd < line {
                signal = Signal::MacdDeathCross;
            }
        }

        if let (Some(k), Some(d)) = (last(IndicatorName::K), last(IndicatorName::D)) {
            if k > KD_OVERBOUGHT {
                signal = Signal::KdOverbought;
            } else if k < KD_OVERSOLD {
                signal = Signal::KdOversold;
            } else if k > d {
                signal = Signal::KdGoldenCross;
            } else if k < d {
                signal = Signal::KdDeathCross;
            }
        }

        Self::from_signal(signal)
    }
}

fn last_two<T>(series: &[T]) -> Option<&[T; 2]> {
    series.len().checked_sub(2).and_then(|start| series[start..].try_into().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::Ohlc;
    use std::collections::BTreeMap;

    fn two_sessions(closes: [f64; 2], volumes: [u64; 2]) -> ChartDataset {
        ChartDataset {
            name: None,
            dates: vec!["2024-01-02".into(), "2024-01-03".into()],
            ohlc: closes.iter().map(|&c| Ohlc::new(c, c, c, c)).collect(),
            volumes: volumes.to_vec(),
            indicators: BTreeMap::new(),
        }
    }

    #[test]
    fn single_session_is_insufficient() {
        let mut dataset = two_sessions([10.0, 11.0], [1, 2]);
        dataset.dates.pop();
        dataset.ohlc.pop();
        dataset.volumes.pop();
        assert_eq!(MarketOutlook::assess(&dataset).signal, Signal::InsufficientData);
    }

    #[test]
    fn short_volume_series_is_insufficient() {
        let mut dataset = two_sessions([10.0, 11.0], [1, 2]);
        dataset.volumes.pop();
        assert_eq!(MarketOutlook::assess(&dataset).signal, Signal::InsufficientData);
    }

    #[test]
    fn price_and_volume_drive_the_base_verdict() {
        let outlook = MarketOutlook::assess(&two_sessions([10.0, 11.0], [100, 50]));
        assert_eq!(outlook.signal, Signal::PriceUpVolumeDown);
        assert_eq!(outlook.bias, Bias::CautiouslyBullish);
        assert_eq!(outlook.to_string(), "cautiously bullish (price up on falling volume)");
    }

    #[test]
    fn later_rules_override_earlier_ones() {
        let mut dataset = two_sessions([10.0, 11.0], [100, 200]);
        dataset.indicators.insert(IndicatorName::Rsi, vec![None, Some(75.0)]);
        assert_eq!(MarketOutlook::assess(&dataset).signal, Signal::RsiOverbought);

        dataset.indicators.insert(IndicatorName::K, vec![None, Some(50.0)]);
        dataset.indicators.insert(IndicatorName::D, vec![None, Some(60.0)]);
        assert_eq!(MarketOutlook::assess(&dataset).signal, Signal::KdDeathCross);
    }

    #[test]
    fn warming_up_indicators_are_skipped() {
        let mut dataset = two_sessions([11.0, 10.0], [100, 200]);
        dataset.indicators.insert(IndicatorName::Macd, vec![None, None]);
        dataset.indicators.insert(IndicatorName::Signal, vec![None, Some(1.0)]);
        assert_eq!(MarketOutlook::assess(&dataset).signal, Signal::PriceDownVolumeUp);
    }
}
