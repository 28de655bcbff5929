use super::entities::{Axis, CandlePoint, ChartLayout, Panel, SeriesData, SeriesSpec, ZoomGroup};
use super::value_objects::{
    AxisKind, CandleTheme, DisplayParams, PanelRole, RangePolicy, SeriesKind, SourceField,
};
use super::zoom::ZoomRange;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{
    CandleDirection, ChartDataset, IndicatorFamily, IndicatorName, StockCode,
};
use crate::{log_debug, log_warn};
use strum::IntoEnumIterator;

pub const PRICE_PANEL_ID: &str = "price";
pub const TIME_GROUP_ID: &str = "time";
pub const CANDLE_SERIES_NAME: &str = "Candles";
pub const VOLUME_SERIES_NAME: &str = "Volume";

pub const DEFAULT_VOLUME_HEADROOM: f64 = 1.2;
pub const DEFAULT_VOLUME_PLACEHOLDER: f64 = 1000.0;
pub const DEFAULT_OSCILLATOR_FRACTION: f64 = 0.2;

/// Maps a validated dataset and display parameters to a [`ChartLayout`].
///
/// Pure: equal inputs always give equal layouts, and every id is derived
/// from panel and axis roles.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModelBuilder {
    volume_headroom: f64,
    volume_placeholder: f64,
    oscillator_fraction: f64,
    theme: CandleTheme,
}

impl Default for ChartModelBuilder {
    fn default() -> Self {
        Self {
            volume_headroom: DEFAULT_VOLUME_HEADROOM,
            volume_placeholder: DEFAULT_VOLUME_PLACEHOLDER,
            oscillator_fraction: DEFAULT_OSCILLATOR_FRACTION,
            theme: CandleTheme::default(),
        }
    }
}

impl ChartModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume_headroom(mut self, headroom: f64) -> Self {
        self.volume_headroom = headroom;
        self
    }

    pub fn with_volume_placeholder(mut self, placeholder: f64) -> Self {
        self.volume_placeholder = placeholder;
        self
    }

    pub fn with_oscillator_fraction(mut self, fraction: f64) -> Self {
        self.oscillator_fraction = fraction;
        self
    }

    pub fn with_theme(mut self, theme: CandleTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn theme(&self) -> &CandleTheme {
        &self.theme
    }

    /// Layout titled with the dataset name only.
    pub fn build(&self, dataset: &ChartDataset, params: &DisplayParams) -> ChartLayout {
        self.assemble(dataset.name.clone().unwrap_or_default(), dataset, params)
    }

    /// Layout titled `"{name} ({code})"`, or just the code when unnamed.
    pub fn build_for(
        &self,
        code: &StockCode,
        dataset: &ChartDataset,
        params: &DisplayParams,
    ) -> ChartLayout {
        let title = match &dataset.name {
            Some(name) => format!("{} ({})", name, code),
            None => code.to_string(),
        };
        self.assemble(title, dataset, params)
    }

    /// Upper bound of the volume axis.
    ///
    /// `headroom * max(volumes) * (100 / scale%)`. Without any positive
    /// volume the placeholder is scaled the same way.
    pub fn volume_axis_max(&self, dataset: &ChartDataset, params: &DisplayParams) -> f64 {
        let factor = params.volume_scale_factor();
        match dataset.max_volume().filter(|&max| max > 0) {
            Some(max) => self.volume_headroom * max as f64 * factor,
            None => {
                log_warn!(
                    LogComponent::Domain("ChartModelBuilder"),
                    "no positive volume in {} sessions, using placeholder axis max {}",
                    dataset.len(),
                    self.volume_placeholder
                );
                self.volume_placeholder * factor
            }
        }
    }

    fn oscillator_panels(&self, dataset: &ChartDataset, params: &DisplayParams) -> Vec<(IndicatorFamily, Vec<IndicatorName>)> {
        IndicatorFamily::iter()
            .filter(|family| family.is_oscillator())
            .filter_map(|family| {
                let members = shown_members(family, dataset, params);
                (!members.is_empty()).then_some((family, members))
            })
            .collect()
    }

    fn assemble(&self, title: String, dataset: &ChartDataset, params: &DisplayParams) -> ChartLayout {
        let oscillators = self.oscillator_panels(dataset, params);
        let last_panel = oscillators.len();
        let price_fraction = 1.0 - self.oscillator_fraction * oscillators.len() as f64;

        let mut panels = Vec::with_capacity(oscillators.len() + 1);
        let mut series = Vec::new();

        let price_axis = axis_id(PRICE_PANEL_ID, "value");
        let volume_axis = axis_id(PRICE_PANEL_ID, "volume");
        panels.push(Panel {
            id: PRICE_PANEL_ID.to_string(),
            role: PanelRole::Price,
            height_fraction: price_fraction,
            time_axis: Axis::time(axis_id(PRICE_PANEL_ID, "time"), last_panel == 0),
            value_axes: vec![
                Axis::value(price_axis.clone(), RangePolicy::Auto),
                Axis {
                    show_label: false,
                    show_split_line: false,
                    ..Axis::value(
                        volume_axis.clone(),
                        RangePolicy::FixedMax { max: self.volume_axis_max(dataset, params) },
                    )
                },
            ],
        });

        series.push(SeriesSpec {
            name: CANDLE_SERIES_NAME.to_string(),
            kind: SeriesKind::Candlestick,
            source: SourceField::Ohlc,
            panel_id: PRICE_PANEL_ID.to_string(),
            axis_id: price_axis.clone(),
            data: SeriesData::Candles(
                dataset
                    .ohlc
                    .iter()
                    .map(|ohlc| {
                        let direction = ohlc.direction();
                        let color = match direction {
                            CandleDirection::Up => self.theme.up,
                            CandleDirection::Down => self.theme.down,
                        };
                        CandlePoint { ohlc: *ohlc, direction, color }
                    })
                    .collect(),
            ),
        });
        series.push(SeriesSpec {
            name: VOLUME_SERIES_NAME.to_string(),
            kind: SeriesKind::Bar,
            source: SourceField::Volumes,
            panel_id: PRICE_PANEL_ID.to_string(),
            axis_id: volume_axis,
            data: SeriesData::Values(dataset.volumes.iter().map(|&v| Some(v as f64)).collect()),
        });
        for name in shown_members(IndicatorFamily::MovingAverage, dataset, params) {
            series.push(indicator_series(dataset, name, PRICE_PANEL_ID, &price_axis));
        }

        for (index, (family, members)) in oscillators.into_iter().enumerate() {
            let panel_id = family.to_string().to_lowercase();
            let value_axis = axis_id(&panel_id, "value");
            let range = match family {
                IndicatorFamily::Rsi | IndicatorFamily::Kd => RangePolicy::Fixed { min: 0.0, max: 100.0 },
                _ => RangePolicy::Auto,
            };
            for name in members {
                series.push(indicator_series(dataset, name, &panel_id, &value_axis));
            }
            panels.push(Panel {
                time_axis: Axis::time(axis_id(&panel_id, "time"), index + 1 == last_panel),
                value_axes: vec![Axis::value(value_axis, range)],
                id: panel_id,
                role: PanelRole::Oscillator(family),
                height_fraction: self.oscillator_fraction,
            });
        }

        let zoom_groups = zoom_groups(&panels);
        log_debug!(
            LogComponent::Domain("ChartModelBuilder"),
            "built layout `{}`: {} panels, {} series, {} zoom groups",
            title,
            panels.len(),
            series.len(),
            zoom_groups.len()
        );

        ChartLayout { title, categories: dataset.dates.clone(), panels, series, zoom_groups }
    }
}

fn axis_id(panel_id: &str, role: &str) -> String {
    format!("{}.{}", panel_id, role)
}

/// Active members of a family that the dataset actually carries.
fn shown_members(
    family: IndicatorFamily,
    dataset: &ChartDataset,
    params: &DisplayParams,
) -> Vec<IndicatorName> {
    family
        .members()
        .into_iter()
        .filter(|&name| params.is_active(name) && dataset.has_indicator(name))
        .collect()
}

fn indicator_series(dataset: &ChartDataset, name: IndicatorName, panel_id: &str, axis_id: &str) -> SeriesSpec {
    let kind = if name == IndicatorName::Hist { SeriesKind::Bar } else { SeriesKind::Line };
    SeriesSpec {
        name: name.key().to_uppercase(),
        kind,
        source: SourceField::Indicator(name),
        panel_id: panel_id.to_string(),
        axis_id: axis_id.to_string(),
        data: SeriesData::Values(dataset.indicator(name).map(<[_]>::to_vec).unwrap_or_default()),
    }
}

/// One shared time group plus one value group per panel.
fn zoom_groups(panels: &[Panel]) -> Vec<ZoomGroup> {
    let mut groups = vec![ZoomGroup {
        id: TIME_GROUP_ID.to_string(),
        axis_kind: AxisKind::Time,
        member_axis_ids: panels.iter().map(|panel| panel.time_axis.id.clone()).collect(),
        range: ZoomRange::FULL,
    }];
    groups.extend(panels.iter().map(|panel| ZoomGroup {
        id: axis_id(&panel.id, "value"),
        axis_kind: AxisKind::Value,
        member_axis_ids: panel.value_axes.iter().map(|axis| axis.id.clone()).collect(),
        range: ZoomRange::FULL,
    }));
    groups
}
