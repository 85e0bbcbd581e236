use std::time::Instant;

use log::{debug, info, warn};

use crate::host::{ClipId, ProjectStore, TrackId};
use crate::project::clip::ClipTimingInfo;
use crate::project::markers::{non_redundant_times, MarkerMap, MarkerSet};
use crate::project::replicator::SegmentReplicator;
use crate::project::ReplicateError;
use crate::time::ClockTime;

/// Validated user parameters for one run.
#[derive(Debug, Clone, Copy)]
pub struct ReplicateParams {
  duplicates: u32,
  gap_measures: u32,
}

impl ReplicateParams {
  pub fn new(duplicates: i64, gap_measures: i64) -> Result<ReplicateParams, ReplicateError> {
    if duplicates < 0 {
      return Err(ReplicateError::NegativeDuplicates);
    }
    if gap_measures < 0 {
      return Err(ReplicateError::NegativeGap);
    }
    Ok(ReplicateParams {
      duplicates: duplicates as u32,
      gap_measures: gap_measures as u32,
    })
  }

  pub fn get_duplicates(&self) -> u32 {
    self.duplicates
  }

  pub fn get_gap_measures(&self) -> u32 {
    self.gap_measures
  }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RunState {
  Idle,
  Gathering,
  Clearing,
  Replicating,
  Finalizing,
  Done,
  Cancelled,
  Failed,
}

/// Everything known before the first mutation.
struct Gathered {
  markers: MarkerSet,
  selected: Vec<ClipId>,
  track_clips: Vec<ClipTimingInfo>,
}

/// Orchestrates one end-to-end replication pass over the track containing
/// the current selection.
pub struct RunController {
  params: ReplicateParams,
  state: RunState,
}

impl RunController {
  pub fn new(params: ReplicateParams) -> RunController {
    RunController {
      params,
      state: RunState::Idle,
    }
  }

  pub fn get_state(&self) -> RunState {
    self.state
  }

  /// Runs the full pass. Returns the terminal state; selection problems
  /// cancel the run before any mutation, host faults fail it mid-way with
  /// the UI refresh still restored.
  pub fn run(&mut self, store: &mut dyn ProjectStore) -> Result<RunState, ReplicateError> {
    let started = Instant::now();

    self.state = RunState::Gathering;
    let gathered = match self.gather(store) {
      Some(gathered) => gathered,
      None => {
        self.state = RunState::Cancelled;
        return Ok(self.state);
      }
    };
    debug!("Gathering took {:?}", started.elapsed());

    self.state = RunState::Clearing;
    store.prevent_refresh(true);
    let result = self.apply(store, gathered);
    store.prevent_refresh(false);

    match result {
      Ok(()) => {
        store.update_arrange();
        self.state = RunState::Done;
        info!("Run completed in {:?}", started.elapsed());
        Ok(self.state)
      }
      Err(err) => {
        self.state = RunState::Failed;
        Err(err)
      }
    }
  }

  /// Snapshots markers, the selection and the owning track's clips without
  /// touching host state. `None` cancels the run.
  fn gather(&self, store: &dyn ProjectStore) -> Option<Gathered> {
    let markers = MarkerSet::collect_all(store);
    debug!("{} time signatures in project", markers.len());

    let selected_count = store.count_selected_clips();
    debug!("{} clips selected", selected_count);
    if selected_count == 0 {
      warn!("Usage error: no clips selected");
      return None;
    }

    let selected: Vec<ClipId> = (0..selected_count)
      .filter_map(|index| store.get_selected_clip(index))
      .collect();

    let mut tracks: Vec<TrackId> = selected
      .iter()
      .filter_map(|clip| store.get_clip_track(*clip))
      .collect();
    tracks.sort();
    tracks.dedup();
    if tracks.len() != 1 {
      warn!("Usage error: all selected clips must be in the same track");
      return None;
    }
    let track = tracks[0];

    let track_clips: Vec<ClipTimingInfo> = (0..store.count_track_clips(track))
      .filter_map(|index| store.get_track_clip(track, index))
      .map(|clip| ClipTimingInfo::gather(store, clip))
      .collect();

    Some(Gathered {
      markers,
      selected,
      track_clips,
    })
  }

  /// The mutating phases. The caller owns the refresh suspend/resume pair
  /// around this.
  fn apply(&mut self, store: &mut dyn ProjectStore, gathered: Gathered) -> Result<(), ReplicateError> {
    let Gathered {
      mut markers,
      selected,
      track_clips,
    } = gathered;

    markers.remove_all(store);
    store.unselect_all_clips();

    self.state = RunState::Replicating;
    let mut cursor = ClockTime::zero();
    let mut incount = MarkerMap::new();

    for clip in track_clips.iter() {
      let copies = if selected.contains(&clip.get_id()) {
        self.params.duplicates
      } else {
        0
      };
      let replicator = SegmentReplicator::new(copies, self.params.gap_measures);
      let result = replicator.replicate(store, clip, &markers, cursor);
      cursor = result.cursor;
      incount.extend(result.markers);
    }

    self.state = RunState::Finalizing;
    let times = non_redundant_times(&incount);
    debug!(
      "Materializing {} of {} incount markers",
      times.len(),
      incount.len()
    );
    for time in times {
      if let Some(marker) = incount.get_mut(&time) {
        marker.create(store)?;
      }
    }

    Ok(())
  }
}
