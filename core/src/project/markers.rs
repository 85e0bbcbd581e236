use std::collections::BTreeMap;

use crate::host::ProjectStore;
use crate::project::marker::TempoMarker;
use crate::project::BOUNDARY_EPSILON;
use crate::time::ClockTime;

/// Incount map: one marker per lead-in point, keyed by time position.
/// Later writes at an identical key replace earlier ones; both represent
/// the same musical instant.
pub type MarkerMap = BTreeMap<ClockTime, TempoMarker>;

/// Ordered snapshot of every tempo/time-signature marker in the project,
/// earliest first.
pub struct MarkerSet {
  markers: Vec<TempoMarker>,
}

impl MarkerSet {
  pub fn collect_all(store: &dyn ProjectStore) -> MarkerSet {
    let markers = (0..store.count_markers())
      .filter_map(|index| TempoMarker::from_index(store, index))
      .collect();
    MarkerSet { markers }
  }

  pub fn len(&self) -> usize {
    self.markers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.markers.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &TempoMarker> {
    self.markers.iter()
  }

  /// The marker in effect at `position`: the latest one starting not later
  /// than `position` plus the boundary tolerance, or the earliest marker in
  /// the project when none precedes it.
  pub fn lead_marker_at(&self, position: ClockTime) -> Option<&TempoMarker> {
    self
      .markers
      .iter()
      .rev()
      .find(|m| m.get_time_pos() <= position + BOUNDARY_EPSILON)
      .or_else(|| self.markers.first())
  }

  /// Markers travelling with a clip spanning `[start, end)`.
  pub fn markers_within(&self, start: ClockTime, end: ClockTime) -> Vec<&TempoMarker> {
    self
      .markers
      .iter()
      .filter(|m| start <= m.get_time_pos() && m.get_time_pos() < end)
      .collect()
  }

  /// Deletes every host-side marker, latest first. The host re-indexes the
  /// remaining markers after each deletion, so deleting from the end keeps
  /// the not-yet-deleted indices valid.
  pub fn remove_all(&mut self, store: &mut dyn ProjectStore) {
    for marker in self.markers.iter_mut().rev() {
      marker.remove(store);
    }
  }
}

/// The time positions whose markers are worth materializing: keys are
/// scanned in descending time order, the latest is always retained, and
/// each earlier key is kept only when its marker differs from the retained
/// time-later one. Returned ascending.
pub fn non_redundant_times(map: &MarkerMap) -> Vec<ClockTime> {
  let mut kept: Vec<ClockTime> = Vec::new();
  let mut current: Option<&TempoMarker> = None;
  for (time, marker) in map.iter().rev() {
    let redundant = match current {
      Some(retained) => marker.equivalent_signature(retained),
      None => false,
    };
    if !redundant {
      kept.push(*time);
      current = Some(marker);
    }
  }
  kept.reverse();
  kept
}
