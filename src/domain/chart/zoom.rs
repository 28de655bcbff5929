use super::entities::ChartLayout;
use super::value_objects::AxisKind;
use crate::domain::logging::LogComponent;
use crate::{log_debug, log_warn};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ops::Range;
use std::rc::Rc;

/// Visible window as percentages of the full extent, `0 <= start <= end <= 100`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomRange {
    start: f64,
    end: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl ZoomRange {
    pub const FULL: ZoomRange = ZoomRange { start: 0.0, end: 100.0 };

    /// `None` for NaN bounds or `start > end`; otherwise both ends are
    /// clamped into `[0, 100]`.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        if start.is_nan() || end.is_nan() || start > end {
            return None;
        }
        Some(Self { start: start.clamp(0.0, 100.0), end: end.clamp(0.0, 100.0) })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    /// Category indices covered by the window; never empty for `len > 0`.
    pub fn index_window(&self, len: usize) -> Range<usize> {
        if len == 0 {
            return 0..0;
        }
        let lo = ((self.start / 100.0) * len as f64).floor() as usize;
        let hi = ((self.end / 100.0) * len as f64).ceil() as usize;
        let lo = lo.min(len - 1);
        let hi = hi.clamp(lo + 1, len);
        lo..hi
    }

    /// Projects the window onto a numeric extent.
    pub fn apply_to_span(&self, min: f64, max: f64) -> (f64, f64) {
        let width = max - min;
        (min + width * self.start / 100.0, min + width * self.end / 100.0)
    }
}

#[derive(Debug, Clone)]
struct GroupState {
    kind: AxisKind,
    range: ZoomRange,
}

/// Owns the pan/zoom window of every zoom group.
///
/// A range is stored per group, so every member axis sees the same window
/// and a write to any member is a write to the whole group.
#[derive(Debug, Clone, Default)]
pub struct ZoomController {
    groups: BTreeMap<String, GroupState>,
    axis_to_group: BTreeMap<String, String>,
}

pub type SharedZoom = Rc<RefCell<ZoomController>>;

impl ZoomController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedZoom {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Adopts the groups of a freshly built layout. Groups whose id and
    /// axis kind persist keep their current window; new groups start full.
    pub fn sync_layout(&mut self, layout: &ChartLayout) {
        let mut groups = BTreeMap::new();
        let mut axis_to_group = BTreeMap::new();
        for group in &layout.zoom_groups {
            let range = self
                .groups
                .get(&group.id)
                .filter(|previous| previous.kind == group.axis_kind)
                .map(|previous| previous.range)
                .unwrap_or(group.range);
            for axis in &group.member_axis_ids {
                axis_to_group.insert(axis.clone(), group.id.clone());
            }
            groups.insert(group.id.clone(), GroupState { kind: group.axis_kind, range });
        }
        log_debug!(
            LogComponent::Domain("ZoomController"),
            "synced {} zoom groups ({} axes)",
            groups.len(),
            axis_to_group.len()
        );
        self.groups = groups;
        self.axis_to_group = axis_to_group;
    }

    /// Returns `false` and leaves state untouched for an unknown group,
    /// a NaN bound or `start > end`.
    pub fn apply_user_range(&mut self, group_id: &str, start: f64, end: f64) -> bool {
        let Some(range) = ZoomRange::new(start, end) else {
            log_warn!(
                LogComponent::Domain("ZoomController"),
                "rejected zoom [{}, {}] for group `{}`",
                start,
                end,
                group_id
            );
            return false;
        };
        match self.groups.get_mut(group_id) {
            Some(group) => {
                group.range = range;
                true
            }
            None => {
                log_warn!(LogComponent::Domain("ZoomController"), "unknown zoom group `{}`", group_id);
                false
            }
        }
    }

    /// Gesture on a single axis; moves the axis's whole group.
    pub fn apply_axis_range(&mut self, axis_id: &str, start: f64, end: f64) -> bool {
        match self.axis_to_group.get(axis_id).cloned() {
            Some(group_id) => self.apply_user_range(&group_id, start, end),
            None => {
                log_warn!(LogComponent::Domain("ZoomController"), "axis `{}` has no zoom group", axis_id);
                false
            }
        }
    }

    pub fn reset(&mut self, group_id: &str) -> bool {
        match self.groups.get_mut(group_id) {
            Some(group) => {
                group.range = ZoomRange::FULL;
                true
            }
            None => false,
        }
    }

    /// Resets every group of one axis kind and returns how many there were.
    pub fn reset_axis_kind(&mut self, kind: AxisKind) -> usize {
        let mut count = 0;
        for group in self.groups.values_mut().filter(|group| group.kind == kind) {
            group.range = ZoomRange::FULL;
            count += 1;
        }
        log_debug!(LogComponent::Domain("ZoomController"), "reset {} {} group(s)", count, kind);
        count
    }

    pub fn reset_all(&mut self) {
        for group in self.groups.values_mut() {
            group.range = ZoomRange::FULL;
        }
    }

    pub fn range(&self, group_id: &str) -> Option<ZoomRange> {
        self.groups.get(group_id).map(|group| group.range)
    }

    pub fn range_for_axis(&self, axis_id: &str) -> Option<ZoomRange> {
        self.axis_to_group.get(axis_id).and_then(|group_id| self.range(group_id))
    }

    pub fn group_ids(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn snapshot(&self) -> ZoomSnapshot {
        ZoomSnapshot {
            groups: self.groups.iter().map(|(id, group)| (id.clone(), group.range)).collect(),
            axes: self.axis_to_group.clone(),
        }
    }
}

/// By-value copy of every group's window, handed to rendering surfaces
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZoomSnapshot {
    pub groups: BTreeMap<String, ZoomRange>,
    pub axes: BTreeMap<String, String>,
}

impl ZoomSnapshot {
    pub fn range(&self, group_id: &str) -> ZoomRange {
        self.groups.get(group_id).copied().unwrap_or_default()
    }

    pub fn range_for_axis(&self, axis_id: &str) -> ZoomRange {
        self.axes.get(axis_id).map(|group_id| self.range(group_id)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_clamped_but_inverted_ones_rejected() {
        let range = ZoomRange::new(-20.0, 150.0).unwrap();
        assert_eq!((range.start(), range.end()), (0.0, 100.0));
        assert!(ZoomRange::new(60.0, 40.0).is_none());
        assert!(ZoomRange::new(f64::NAN, 40.0).is_none());
        assert!(ZoomRange::new(120.0, 130.0).unwrap().start() <= 100.0);
    }

    #[test]
    fn index_window_covers_at_least_one_category() {
        assert_eq!(ZoomRange::FULL.index_window(10), 0..10);
        assert_eq!(ZoomRange::new(50.0, 50.0).unwrap().index_window(10), 5..6);
        assert_eq!(ZoomRange::new(100.0, 100.0).unwrap().index_window(10), 9..10);
        assert_eq!(ZoomRange::new(25.0, 75.0).unwrap().index_window(4), 1..3);
        assert_eq!(ZoomRange::FULL.index_window(0), 0..0);
    }

    #[test]
    fn span_projection() {
        let range = ZoomRange::new(10.0, 60.0).unwrap();
        assert_eq!(range.apply_to_span(0.0, 200.0), (20.0, 120.0));
    }
}
