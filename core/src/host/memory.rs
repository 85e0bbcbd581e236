use log::warn;
use uuid::Uuid;

use crate::host::{BeatsContext, ClipId, MarkerSnapshot, Placement, ProjectStore, TrackId};
use crate::time::{ClockTime, Seconds, Signature, Tempo};

const DEFAULT_TEMPO: f64 = 120.0;
const DEFAULT_SIGNATURE_NUM_BEATS: u16 = 4;
const DEFAULT_SIGNATURE_NOTE_VALUE: u16 = 4;

#[derive(Debug, Clone)]
struct TrackRecord {
  id: TrackId,
  name: String,
}

#[derive(Debug, Clone)]
struct ClipRecord {
  id: ClipId,
  track: TrackId,
  position: ClockTime,
  length: ClockTime,
  selected: bool,
}

#[derive(Debug, Clone, Copy)]
struct MarkerRecord {
  time_pos: ClockTime,
  tempo: Tempo,
  signature: Signature,
  linear_tempo: bool,
}

impl MarkerRecord {
  /// Tempo scaled so that one beat is one denominator note.
  fn divided_tempo(&self) -> Tempo {
    Tempo::new(self.tempo.get_value() * f64::from(self.signature.get_note_value()) / 4.0)
  }
}

/// An in-memory project holding tracks, clips and a piecewise-constant
/// tempo map. Every marker opens a new measure at its time position.
pub struct MemoryProject {
  tracks: Vec<TrackRecord>,
  clips: Vec<ClipRecord>,
  markers: Vec<MarkerRecord>, // sorted by time_pos
  refresh_depth: i32,
  arrange_updates: u32,
}

impl MemoryProject {
  pub fn new() -> MemoryProject {
    MemoryProject {
      tracks: Vec::new(),
      clips: Vec::new(),
      markers: Vec::new(),
      refresh_depth: 0,
      arrange_updates: 0,
    }
  }

  pub fn add_track<T>(&mut self, name: T) -> TrackId
  where
    T: Into<String>,
  {
    let id = Uuid::new_v4();
    self.tracks.push(TrackRecord {
      id,
      name: name.into(),
    });
    id
  }

  pub fn add_clip(&mut self, track: TrackId, position: ClockTime, length: ClockTime) -> ClipId {
    let id = Uuid::new_v4();
    self.clips.push(ClipRecord {
      id,
      track,
      position,
      length,
      selected: false,
    });
    id
  }

  pub fn add_marker(
    &mut self,
    time_pos: ClockTime,
    tempo: Tempo,
    signature: Signature,
    linear_tempo: bool,
  ) {
    self.markers.push(MarkerRecord {
      time_pos,
      tempo,
      signature,
      linear_tempo,
    });
    self.sort_markers();
  }

  pub fn select_clip(&mut self, clip: ClipId) {
    self.set_clip_selected(clip, true);
  }

  pub fn get_track_name(&self, track: TrackId) -> Option<&str> {
    self
      .tracks
      .iter()
      .find(|t| t.id == track)
      .map(|t| t.name.as_str())
  }

  pub fn get_tracks(&self) -> Vec<TrackId> {
    self.tracks.iter().map(|t| t.id).collect()
  }

  pub fn count_all_clips(&self) -> usize {
    self.clips.len()
  }

  pub fn get_refresh_depth(&self) -> i32 {
    self.refresh_depth
  }

  pub fn get_arrange_updates(&self) -> u32 {
    self.arrange_updates
  }

  fn sort_markers(&mut self) {
    self.markers.sort_by_key(|m| m.time_pos);
  }

  fn default_marker() -> MarkerRecord {
    MarkerRecord {
      time_pos: ClockTime::zero(),
      tempo: Tempo::new(DEFAULT_TEMPO),
      signature: Signature::new(DEFAULT_SIGNATURE_NUM_BEATS, DEFAULT_SIGNATURE_NOTE_VALUE),
      linear_tempo: false,
    }
  }

  /// The marker governing `time`: the latest one at or before it, or the
  /// project defaults when none precedes it.
  fn governing_marker(&self, time: ClockTime) -> MarkerRecord {
    self
      .markers
      .iter()
      .rev()
      .find(|m| m.time_pos <= time)
      .cloned()
      .unwrap_or_else(Self::default_marker)
  }

  fn track_clip_ids(&self, track: TrackId) -> Vec<ClipId> {
    let mut clips: Vec<&ClipRecord> = self.clips.iter().filter(|c| c.track == track).collect();
    clips.sort_by_key(|c| c.position);
    clips.iter().map(|c| c.id).collect()
  }

  fn selected_clip_ids(&self) -> Vec<ClipId> {
    self
      .clips
      .iter()
      .filter(|c| c.selected)
      .map(|c| c.id)
      .collect()
  }

  fn clip(&self, clip: ClipId) -> &ClipRecord {
    self
      .clips
      .iter()
      .find(|c| c.id == clip)
      .unwrap_or_else(|| panic!("unknown clip {}", clip))
  }

  fn clip_mut(&mut self, clip: ClipId) -> &mut ClipRecord {
    self
      .clips
      .iter_mut()
      .find(|c| c.id == clip)
      .unwrap_or_else(|| panic!("unknown clip {}", clip))
  }

  /// Resolves a measure/beat position into time. Markers reset the measure
  /// grid, and a partial measure at the end of a tempo segment still counts
  /// as a whole one.
  fn measure_to_time(&self, measure: i32, beat: f64) -> ClockTime {
    assert!(measure >= 0 && beat >= 0.0);
    let measure = measure as u64;

    let mut seg = Self::default_marker();
    let mut seg_first_measure = 0u64;

    for next in self.markers.iter() {
      let seg_beats =
        (next.time_pos - seg.time_pos).to_seconds() / seg.divided_tempo().seconds_per_beat();
      let num = f64::from(seg.signature.get_num_beats());
      let seg_measures = (seg_beats / num).ceil() as u64;
      if measure < seg_first_measure + seg_measures {
        break;
      }
      seg_first_measure += seg_measures;
      seg = *next;
    }

    let beats_in = (measure - seg_first_measure) as f64 * f64::from(seg.signature.get_num_beats())
      + beat;
    seg.time_pos + ClockTime::from_beats(beats_in, seg.divided_tempo())
  }
}

impl Default for MemoryProject {
  fn default() -> MemoryProject {
    MemoryProject::new()
  }
}

impl ProjectStore for MemoryProject {
  fn count_markers(&self) -> usize {
    self.markers.len()
  }

  fn get_marker(&self, index: usize) -> Option<MarkerSnapshot> {
    self.markers.get(index).map(|m| {
      let ctx = self.time_to_beats(m.time_pos);
      MarkerSnapshot {
        time_pos: m.time_pos,
        measure_pos: (ctx.full_beats / ctx.measure_len_beats) as i32,
        beat_pos: ctx.beats_into_measure,
        tempo: m.tempo,
        signature: m.signature,
        linear_tempo: m.linear_tempo,
      }
    })
  }

  fn set_marker(
    &mut self,
    index: Option<usize>,
    placement: Placement,
    tempo: Tempo,
    signature: Signature,
    linear_tempo: bool,
  ) -> bool {
    let time_pos = match placement {
      Placement::ByTime(time) => time,
      Placement::ByMeasureBeat { measure, beat } => self.measure_to_time(measure, beat),
    };
    let record = MarkerRecord {
      time_pos,
      tempo,
      signature,
      linear_tempo,
    };
    match index {
      None => self.markers.push(record),
      Some(index) => match self.markers.get_mut(index) {
        Some(existing) => *existing = record,
        None => return false,
      },
    }
    self.sort_markers();
    true
  }

  fn delete_marker(&mut self, index: usize) -> bool {
    if index < self.markers.len() {
      self.markers.remove(index);
      true
    } else {
      false
    }
  }

  fn count_selected_clips(&self) -> usize {
    self.selected_clip_ids().len()
  }

  fn get_selected_clip(&self, index: usize) -> Option<ClipId> {
    self.selected_clip_ids().get(index).cloned()
  }

  fn count_track_clips(&self, track: TrackId) -> usize {
    self.track_clip_ids(track).len()
  }

  fn get_track_clip(&self, track: TrackId, index: usize) -> Option<ClipId> {
    self.track_clip_ids(track).get(index).cloned()
  }

  fn get_clip_track(&self, clip: ClipId) -> Option<TrackId> {
    self.clips.iter().find(|c| c.id == clip).map(|c| c.track)
  }

  fn get_clip_position(&self, clip: ClipId) -> ClockTime {
    self.clip(clip).position
  }

  fn set_clip_position(&mut self, clip: ClipId, position: ClockTime) {
    self.clip_mut(clip).position = position;
  }

  fn get_clip_length(&self, clip: ClipId) -> ClockTime {
    self.clip(clip).length
  }

  fn set_clip_selected(&mut self, clip: ClipId, selected: bool) {
    self.clip_mut(clip).selected = selected;
  }

  fn unselect_all_clips(&mut self) {
    for clip in self.clips.iter_mut() {
      clip.selected = false;
    }
  }

  fn time_to_beats(&self, time: ClockTime) -> BeatsContext {
    let mut seg = Self::default_marker();
    let mut full_beats = 0.0;

    for next in self.markers.iter() {
      if next.time_pos > time {
        break;
      }
      full_beats +=
        (next.time_pos - seg.time_pos).to_seconds() / seg.divided_tempo().seconds_per_beat();
      seg = *next;
    }

    let beats_in_seg = (time - seg.time_pos).to_seconds() / seg.divided_tempo().seconds_per_beat();
    full_beats += beats_in_seg;

    let measure_len_beats = f64::from(seg.signature.get_num_beats());
    BeatsContext {
      beats_into_measure: beats_in_seg % measure_len_beats,
      measure_len_beats,
      full_beats,
      denominator: seg.signature.get_note_value(),
    }
  }

  fn divided_bpm_at(&self, time: ClockTime) -> Tempo {
    self.governing_marker(time).divided_tempo()
  }

  fn nudge_duplicate_selected(&mut self, offset: Seconds) {
    let selected: Vec<ClipId> = self.selected_clip_ids();
    for id in selected {
      let source = self.clip(id).clone();
      let position = source.position.to_seconds() + offset;
      assert!(position >= 0.0);
      let duplicate = self.add_clip(
        source.track,
        ClockTime::from_seconds(position),
        source.length,
      );
      // The selection moves onto the duplicate so that repeated nudges
      // chain copies left to right.
      self.set_clip_selected(id, false);
      self.set_clip_selected(duplicate, true);
    }
  }

  fn prevent_refresh(&mut self, prevent: bool) {
    if prevent {
      self.refresh_depth += 1;
    } else {
      self.refresh_depth -= 1;
      if self.refresh_depth < 0 {
        warn!("Unbalanced UI refresh resume");
      }
    }
  }

  fn update_arrange(&mut self) {
    self.arrange_updates += 1;
  }
}

#[cfg(test)]
mod test {
  use super::MemoryProject;
  use crate::host::{Placement, ProjectStore};
  use crate::time::{ClockTime, Signature, Tempo};

  fn secs(value: f64) -> ClockTime {
    ClockTime::from_seconds(value)
  }

  #[test]
  pub fn time_to_beats_with_default_grid() {
    let project = MemoryProject::new();
    let ctx = project.time_to_beats(secs(5.0));
    // 120 bpm 4/4: 2 beats per second
    assert_eq!(ctx.full_beats, 10.0);
    assert_eq!(ctx.beats_into_measure, 2.0);
    assert_eq!(ctx.measure_len_beats, 4.0);
    assert_eq!(ctx.denominator, 4);
  }

  #[test]
  pub fn time_to_beats_across_tempo_change() {
    let mut project = MemoryProject::new();
    project.add_marker(secs(0.0), Tempo::new(120.0), Signature::new(4, 4), false);
    project.add_marker(secs(4.0), Tempo::new(60.0), Signature::new(3, 4), false);
    // 8 beats over the first 4 seconds, then 1 beat per second
    let ctx = project.time_to_beats(secs(6.0));
    assert_eq!(ctx.full_beats, 10.0);
    assert_eq!(ctx.beats_into_measure, 2.0);
    assert_eq!(ctx.measure_len_beats, 3.0);
  }

  #[test]
  pub fn divided_bpm_scales_with_denominator() {
    let mut project = MemoryProject::new();
    project.add_marker(secs(0.0), Tempo::new(120.0), Signature::new(4, 8), false);
    assert_eq!(project.divided_bpm_at(secs(1.0)), Tempo::new(240.0));
  }

  #[test]
  pub fn set_marker_by_measure_beat() {
    let mut project = MemoryProject::new();
    // measure 2 beat 1 at 120 bpm 4/4 = (2 * 4 + 1) * 0.5 s
    let ok = project.set_marker(
      None,
      Placement::ByMeasureBeat {
        measure: 2,
        beat: 1.0,
      },
      Tempo::new(90.0),
      Signature::new(4, 4),
      false,
    );
    assert!(ok);
    let marker = project.get_marker(0).unwrap();
    assert_eq!(marker.time_pos, secs(4.5));
  }

  #[test]
  pub fn set_marker_with_bad_index_fails() {
    let mut project = MemoryProject::new();
    let ok = project.set_marker(
      Some(3),
      Placement::ByTime(secs(0.0)),
      Tempo::new(120.0),
      Signature::new(4, 4),
      false,
    );
    assert!(!ok);
  }

  #[test]
  pub fn delete_marker_reindexes() {
    let mut project = MemoryProject::new();
    project.add_marker(secs(0.0), Tempo::new(120.0), Signature::new(4, 4), false);
    project.add_marker(secs(2.0), Tempo::new(100.0), Signature::new(4, 4), false);
    assert!(project.delete_marker(0));
    assert_eq!(project.count_markers(), 1);
    assert_eq!(project.get_marker(0).unwrap().time_pos, secs(2.0));
    assert!(!project.delete_marker(1));
  }

  #[test]
  pub fn nudge_duplicate_chains_copies() {
    let mut project = MemoryProject::new();
    let track = project.add_track("guitar");
    let clip = project.add_clip(track, secs(1.0), secs(2.0));
    project.select_clip(clip);

    project.nudge_duplicate_selected(4.0);
    project.nudge_duplicate_selected(4.0);

    assert_eq!(project.count_track_clips(track), 3);
    let positions: Vec<ClockTime> = (0..3)
      .map(|i| project.get_clip_position(project.get_track_clip(track, i).unwrap()))
      .collect();
    assert_eq!(positions, vec![secs(1.0), secs(5.0), secs(9.0)]);
    // the original clip lost its selection along the way
    assert_eq!(project.count_selected_clips(), 1);
    assert_ne!(project.get_selected_clip(0), Some(clip));
  }

  #[test]
  pub fn track_clips_are_in_position_order() {
    let mut project = MemoryProject::new();
    let track = project.add_track("drums");
    let late = project.add_clip(track, secs(8.0), secs(1.0));
    let early = project.add_clip(track, secs(2.0), secs(1.0));
    assert_eq!(project.get_track_clip(track, 0), Some(early));
    assert_eq!(project.get_track_clip(track, 1), Some(late));
  }
}
