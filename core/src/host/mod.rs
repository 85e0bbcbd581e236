pub mod memory;

use uuid::Uuid;

use crate::time::{ClockTime, Seconds, Signature, Tempo};

pub type ClipId = Uuid;
pub type TrackId = Uuid;

/// Where a tempo marker should be anchored when writing it to the host.
/// Exactly one of the two encodings drives placement.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Placement {
  ByTime(ClockTime),
  ByMeasureBeat { measure: i32, beat: f64 },
}

/// Fields of one host-side tempo/time-signature marker.
#[derive(Debug, Clone, Copy)]
pub struct MarkerSnapshot {
  pub time_pos: ClockTime,
  pub measure_pos: i32,
  pub beat_pos: f64,
  pub tempo: Tempo,
  pub signature: Signature,
  pub linear_tempo: bool,
}

/// Musical context of an arbitrary time position.
#[derive(Debug, Clone, Copy)]
pub struct BeatsContext {
  /// Beats since the start of the containing measure.
  pub beats_into_measure: f64,
  /// Measure length in beats (the time signature numerator).
  pub measure_len_beats: f64,
  /// Beats since the start of the project.
  pub full_beats: f64,
  /// Time signature denominator.
  pub denominator: u16,
}

/// The host project state consumed and mutated during a run. Markers are
/// addressed by index and the host re-indexes the survivors after a delete,
/// so snapshots taken before a delete go stale from that index on.
pub trait ProjectStore {
  fn count_markers(&self) -> usize;
  fn get_marker(&self, index: usize) -> Option<MarkerSnapshot>;
  /// Writes a marker. `index` of `None` creates a new one. Returns the host
  /// success flag.
  fn set_marker(
    &mut self,
    index: Option<usize>,
    placement: Placement,
    tempo: Tempo,
    signature: Signature,
    linear_tempo: bool,
  ) -> bool;
  fn delete_marker(&mut self, index: usize) -> bool;

  fn count_selected_clips(&self) -> usize;
  fn get_selected_clip(&self, index: usize) -> Option<ClipId>;
  /// Track clips are enumerated in ascending position order.
  fn count_track_clips(&self, track: TrackId) -> usize;
  fn get_track_clip(&self, track: TrackId, index: usize) -> Option<ClipId>;
  fn get_clip_track(&self, clip: ClipId) -> Option<TrackId>;
  fn get_clip_position(&self, clip: ClipId) -> ClockTime;
  fn set_clip_position(&mut self, clip: ClipId, position: ClockTime);
  fn get_clip_length(&self, clip: ClipId) -> ClockTime;
  fn set_clip_selected(&mut self, clip: ClipId, selected: bool);
  fn unselect_all_clips(&mut self);

  fn time_to_beats(&self, time: ClockTime) -> BeatsContext;
  /// Tempo at `time` scaled by the time signature denominator, so that one
  /// "beat" is one denominator note.
  fn divided_bpm_at(&self, time: ClockTime) -> Tempo;

  /// Duplicates every selected clip, offsetting the duplicate by `offset`
  /// seconds, and moves the selection onto the duplicates. Repeated calls
  /// chain copies left to right.
  fn nudge_duplicate_selected(&mut self, offset: Seconds);

  /// Depth-counted UI refresh suspension. Every `true` call must be paired
  /// with a `false` call on all exit paths.
  fn prevent_refresh(&mut self, prevent: bool);
  fn update_arrange(&mut self);
}
