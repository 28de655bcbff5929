use super::value_objects::{AxisKind, Color, PanelRole, RangePolicy, SeriesKind, SourceField};
use super::zoom::ZoomRange;
use crate::domain::market_data::{CandleDirection, Ohlc};
use serde::Serialize;
use std::collections::BTreeSet;

/// One axis of a panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub id: String,
    pub kind: AxisKind,
    pub range: RangePolicy,
    pub show_label: bool,
    pub show_line: bool,
    pub show_split_line: bool,
}

impl Axis {
    pub fn time(id: String, show_label: bool) -> Self {
        Self {
            id,
            kind: AxisKind::Time,
            range: RangePolicy::Auto,
            show_label,
            show_line: true,
            show_split_line: false,
        }
    }

    pub fn value(id: String, range: RangePolicy) -> Self {
        Self {
            id,
            kind: AxisKind::Value,
            range,
            show_label: true,
            show_line: true,
            show_split_line: true,
        }
    }
}

/// Stacked drawing area with its own axis pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub id: String,
    pub role: PanelRole,
    pub height_fraction: f64,
    pub time_axis: Axis,
    pub value_axes: Vec<Axis>,
}

impl Panel {
    pub fn axes(&self) -> impl Iterator<Item = &Axis> {
        std::iter::once(&self.time_axis).chain(self.value_axes.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandlePoint {
    pub ohlc: Ohlc,
    pub direction: CandleDirection,
    pub color: Color,
}

/// Series values, copied out of the dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Candles(Vec<CandlePoint>),
    Values(Vec<Option<f64>>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Candles(points) => points.len(),
            SeriesData::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSpec {
    pub name: String,
    pub kind: SeriesKind,
    pub source: SourceField,
    pub panel_id: String,
    pub axis_id: String,
    pub data: SeriesData,
}

/// Axes whose pan/zoom state moves together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoomGroup {
    pub id: String,
    pub axis_kind: AxisKind,
    pub member_axis_ids: BTreeSet<String>,
    pub range: ZoomRange,
}

/// Complete, immutable description of what to draw.
///
/// Rebuilt from scratch whenever the dataset or display parameters change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: String,
    pub categories: Vec<String>,
    pub panels: Vec<Panel>,
    pub series: Vec<SeriesSpec>,
    pub zoom_groups: Vec<ZoomGroup>,
}

impl ChartLayout {
    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.iter().find(|panel| panel.id == id)
    }

    pub fn axis(&self, id: &str) -> Option<&Axis> {
        self.panels.iter().flat_map(Panel::axes).find(|axis| axis.id == id)
    }

    pub fn series_named(&self, name: &str) -> Option<&SeriesSpec> {
        self.series.iter().find(|series| series.name == name)
    }

    pub fn series_on<'a>(&'a self, panel_id: &'a str) -> impl Iterator<Item = &'a SeriesSpec> + 'a {
        self.series.iter().filter(move |series| series.panel_id == panel_id)
    }

    pub fn zoom_group(&self, id: &str) -> Option<&ZoomGroup> {
        self.zoom_groups.iter().find(|group| group.id == id)
    }

    pub fn group_of_axis(&self, axis_id: &str) -> Option<&ZoomGroup> {
        self.zoom_groups.iter().find(|group| group.member_axis_ids.contains(axis_id))
    }
}
