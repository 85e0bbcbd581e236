use log::debug;

use crate::host::ProjectStore;
use crate::project::clip::ClipTimingInfo;
use crate::project::marker::{CloneTime, TempoMarker};
use crate::project::markers::{MarkerMap, MarkerSet};
use crate::time::{ClockTime, Signature, Tempo};

/// Result of laying out one clip: the end of its last trail-out, which is
/// the earliest time allowed for the next clip, and the lead-in/interior
/// markers the layout requires, still pending.
pub struct Replication {
  pub cursor: ClockTime,
  pub markers: MarkerMap,
}

/// Lays out `[gap][lead-in][clip][trail-out]` segments for one clip and its
/// copies. Gap and lead-in always come from the clip's original
/// start-of-measure tempo so that every copy counts in identically, and the
/// trail-out from its original end-of-measure context.
pub struct SegmentReplicator {
  copies: u32,
  gap_measures: u32,
}

impl SegmentReplicator {
  pub fn new(copies: u32, gap_measures: u32) -> SegmentReplicator {
    SegmentReplicator {
      copies,
      gap_measures,
    }
  }

  pub fn replicate(
    &self,
    store: &mut dyn ProjectStore,
    clip: &ClipTimingInfo,
    project_markers: &MarkerSet,
    t0: ClockTime,
  ) -> Replication {
    let (lead_tempo, lead_signature) = self.lead_context(store, clip, project_markers);
    let interior = project_markers.markers_within(clip.get_position(), clip.get_end());

    let gap_time = ClockTime::from_beats(
      f64::from(self.gap_measures) * clip.get_pos_measure_beats(),
      clip.get_pos_bpm(),
    );
    debug!(
      "Replicating clip {} from {} secs, gap {} secs",
      clip.get_id(),
      t0.to_seconds(),
      gap_time.to_seconds()
    );

    // The host's nudge-by-duplicate operates on the selection, and it moves
    // the selection onto each duplicate, so a previous pass can leave one
    // selected. Start every pass from a clean single-clip selection.
    store.unselect_all_clips();
    store.set_clip_selected(clip.get_id(), true);

    let mut markers = MarkerMap::new();
    let mut t = t0;

    // lead-in marker for the original placement
    markers.insert(t, TempoMarker::pending(t, lead_tempo, lead_signature, false));
    t += gap_time + clip.get_intime();

    // Clips never move left: earlier items on the track keep their place.
    if t > clip.get_position() {
      store.set_clip_position(clip.get_id(), t);
      debug!("Clip moved to {} secs", t.to_seconds());
    }

    self.clone_interior(&interior, clip, t, &mut markers);
    t += clip.get_length() + clip.get_outtime();

    for _ in 0..self.copies {
      markers.insert(t, TempoMarker::pending(t, lead_tempo, lead_signature, false));
      t += gap_time + clip.get_intime();

      self.clone_interior(&interior, clip, t, &mut markers);

      // each duplicate lands one whole segment after its source
      let nudge = clip.get_length() + clip.get_outtime() + gap_time + clip.get_intime();
      store.nudge_duplicate_selected(nudge.to_seconds());

      t += clip.get_length() + clip.get_outtime();
    }

    store.set_clip_selected(clip.get_id(), false);

    Replication { cursor: t, markers }
  }

  /// Markers inside the clip move with each copy, keeping their offset from
  /// the copy start.
  fn clone_interior(
    &self,
    interior: &[&TempoMarker],
    clip: &ClipTimingInfo,
    copy_start: ClockTime,
    markers: &mut MarkerMap,
  ) {
    let offset = copy_start.to_seconds() - clip.get_position().to_seconds();
    for marker in interior {
      let clone = marker.clone_with(CloneTime::Offset(offset));
      markers.insert(clone.get_time_pos(), clone);
    }
  }

  /// Tempo and signature in effect at the clip's original start. When the
  /// project has no markers at all, the host time map supplies them.
  fn lead_context(
    &self,
    store: &dyn ProjectStore,
    clip: &ClipTimingInfo,
    project_markers: &MarkerSet,
  ) -> (Tempo, Signature) {
    match project_markers.lead_marker_at(clip.get_position()) {
      Some(marker) => (marker.get_tempo(), marker.get_signature()),
      None => {
        let ctx = store.time_to_beats(clip.get_position());
        let signature = Signature::new(ctx.measure_len_beats.round() as u16, ctx.denominator);
        // divided bpm is already expressed in denominator notes, scale back
        let divided = store.divided_bpm_at(clip.get_position());
        let tempo = Tempo::new(divided.get_value() * 4.0 / f64::from(ctx.denominator));
        (tempo, signature)
      }
    }
  }
}

#[cfg(test)]
mod test {
  use super::SegmentReplicator;
  use crate::host::memory::MemoryProject;
  use crate::host::{ClipId, ProjectStore, TrackId};
  use crate::project::clip::ClipTimingInfo;
  use crate::project::markers::MarkerSet;
  use crate::time::{ClockTime, Signature, Tempo};

  fn secs(value: f64) -> ClockTime {
    ClockTime::from_seconds(value)
  }

  fn project_with_clip(position: f64, length: f64) -> (MemoryProject, TrackId, ClipId) {
    let mut project = MemoryProject::new();
    let track = project.add_track("guitar");
    let clip = project.add_clip(track, secs(position), secs(length));
    (project, track, clip)
  }

  #[test]
  pub fn grid_scenario_cursor_and_lead_markers() {
    // one clip at 4.0 s, 4.0 s long, 4/4 at 120 bpm, copies=2, gap=1:
    // gap = 4 beats * 0.5 s = 2.0 s, every segment spans 6.0 s
    let (mut project, _track, clip) = project_with_clip(4.0, 4.0);
    let markers = MarkerSet::collect_all(&project);
    let info = ClipTimingInfo::gather(&project, clip);

    let result = SegmentReplicator::new(2, 1).replicate(&mut project, &info, &markers, secs(0.0));

    assert_eq!(result.cursor, secs(18.0));
    let times: Vec<ClockTime> = result.markers.keys().cloned().collect();
    assert_eq!(times, vec![secs(0.0), secs(6.0), secs(12.0)]);
    for marker in result.markers.values() {
      assert_eq!(marker.get_tempo(), Tempo::new(120.0));
      assert_eq!(marker.get_signature(), Signature::new(4, 4));
    }
  }

  #[test]
  pub fn marker_count_and_cursor_formula() {
    // a tempo change inside the clip travels with every copy
    let mut project = MemoryProject::new();
    project.add_marker(secs(0.0), Tempo::new(120.0), Signature::new(4, 4), false);
    project.add_marker(secs(5.0), Tempo::new(140.0), Signature::new(4, 4), false);
    let track = project.add_track("guitar");
    let clip = project.add_clip(track, secs(4.0), secs(4.0));

    let markers = MarkerSet::collect_all(&project);
    let info = ClipTimingInfo::gather(&project, clip);
    let copies = 2;

    let result =
      SegmentReplicator::new(copies, 1).replicate(&mut project, &info, &markers, secs(0.0));

    // (copies + 1) lead markers plus one interior clone per placement
    assert_eq!(result.markers.len() as u32, (copies + 1) * (1 + 1));

    let segment =
      ClockTime::from_beats(4.0, info.get_pos_bpm()) + info.get_intime() + info.get_length()
        + info.get_outtime();
    let mut expected = secs(0.0);
    for _ in 0..=copies {
      expected += segment;
    }
    assert_eq!(result.cursor, expected);
  }

  #[test]
  pub fn interior_markers_keep_their_offset() {
    let mut project = MemoryProject::new();
    project.add_marker(secs(0.0), Tempo::new(120.0), Signature::new(4, 4), false);
    project.add_marker(secs(5.0), Tempo::new(140.0), Signature::new(4, 4), false);
    let track = project.add_track("guitar");
    let clip = project.add_clip(track, secs(4.0), secs(4.0));

    let markers = MarkerSet::collect_all(&project);
    let info = ClipTimingInfo::gather(&project, clip);

    let result = SegmentReplicator::new(0, 0).replicate(&mut project, &info, &markers, secs(4.0));

    // copy start is the clip's own position, so the clone stays at 5.0 s
    let clones: Vec<ClockTime> = result
      .markers
      .iter()
      .filter(|(_, m)| m.get_tempo() == Tempo::new(140.0))
      .map(|(t, _)| *t)
      .collect();
    assert_eq!(clones, vec![secs(5.0)]);
  }

  #[test]
  pub fn clip_moves_right_but_never_left() {
    let (mut project, _track, clip) = project_with_clip(1.0, 2.0);
    let markers = MarkerSet::collect_all(&project);
    let info = ClipTimingInfo::gather(&project, clip);

    // destination past the clip start pushes it right
    let result = SegmentReplicator::new(0, 0).replicate(&mut project, &info, &markers, secs(3.0));
    assert_eq!(project.get_clip_position(clip), secs(3.0) + info.get_intime());
    assert!(result.cursor > secs(3.0));

    // a destination before the clip leaves it alone
    let (mut project, _track, clip) = project_with_clip(6.0, 2.0);
    let markers = MarkerSet::collect_all(&project);
    let info = ClipTimingInfo::gather(&project, clip);
    SegmentReplicator::new(0, 0).replicate(&mut project, &info, &markers, secs(0.0));
    assert_eq!(project.get_clip_position(clip), secs(6.0));
  }

  #[test]
  pub fn duplicates_land_one_segment_apart() {
    let (mut project, track, clip) = project_with_clip(0.0, 2.0);
    let markers = MarkerSet::collect_all(&project);
    let info = ClipTimingInfo::gather(&project, clip);

    SegmentReplicator::new(2, 0).replicate(&mut project, &info, &markers, secs(0.0));

    assert_eq!(project.count_track_clips(track), 3);
    let positions: Vec<f64> = (0..3)
      .map(|i| {
        project
          .get_clip_position(project.get_track_clip(track, i).unwrap())
          .to_seconds()
      })
      .collect();
    let segment = (info.get_length() + info.get_outtime() + info.get_intime()).to_seconds();
    assert_eq!(positions[1] - positions[0], segment);
    assert_eq!(positions[2] - positions[1], segment);
  }

  #[test]
  pub fn stale_selection_is_not_duplicated_along() {
    let (mut project, track, clip) = project_with_clip(0.0, 2.0);
    let other = project.add_clip(track, secs(10.0), secs(1.0));
    project.set_clip_selected(other, true);
    let markers = MarkerSet::collect_all(&project);
    let info = ClipTimingInfo::gather(&project, clip);

    SegmentReplicator::new(1, 0).replicate(&mut project, &info, &markers, secs(0.0));

    // one duplicate of `clip`, none of the clip left selected before the pass
    assert_eq!(project.count_track_clips(track), 3);
    assert_eq!(project.get_clip_position(other), secs(10.0));
  }

  #[test]
  pub fn clip_selection_is_restored() {
    let (mut project, _track, clip) = project_with_clip(0.0, 2.0);
    let markers = MarkerSet::collect_all(&project);
    let info = ClipTimingInfo::gather(&project, clip);

    SegmentReplicator::new(1, 0).replicate(&mut project, &info, &markers, secs(0.0));

    // the source clip ends up unselected; the host leaves the last
    // duplicate selected after a nudge
    let selected: Vec<ClipId> = (0..project.count_selected_clips())
      .filter_map(|i| project.get_selected_clip(i))
      .collect();
    assert!(!selected.contains(&clip));
  }
}
