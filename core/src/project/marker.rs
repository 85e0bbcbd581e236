use log::{debug, warn};

use crate::host::{Placement, ProjectStore};
use crate::project::ReplicateError;
use crate::time::{ClockTime, Seconds, Signature, Tempo};

/// Whether a marker exists only in memory or also in the host project.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MarkerState {
  Pending,
  Materialized,
}

/// How a clone's time position relates to the source marker's.
#[derive(Debug, Clone, Copy)]
pub enum CloneTime {
  /// Signed offset in seconds from the source position.
  Offset(Seconds),
  /// Absolute position.
  At(ClockTime),
}

/// One tempo/time-signature change point. The host-side marker, when it
/// exists, is addressed through `index`; the host re-indexes markers after
/// deletions, so an index is only valid until the store is next mutated.
#[derive(Debug, Clone)]
pub struct TempoMarker {
  index: Option<usize>,
  time_pos: ClockTime,
  tempo: Tempo,
  signature: Signature,
  linear_tempo: bool,
  state: MarkerState,
}

impl TempoMarker {
  /// An in-memory marker not yet known to the host.
  pub fn pending(
    time_pos: ClockTime,
    tempo: Tempo,
    signature: Signature,
    linear_tempo: bool,
  ) -> TempoMarker {
    TempoMarker {
      index: None,
      time_pos,
      tempo,
      signature,
      linear_tempo,
      state: MarkerState::Pending,
    }
  }

  /// Loads the host's `index`-th marker. `None` if the host call fails.
  pub fn from_index(store: &dyn ProjectStore, index: usize) -> Option<TempoMarker> {
    store.get_marker(index).map(|snapshot| TempoMarker {
      index: Some(index),
      time_pos: snapshot.time_pos,
      tempo: snapshot.tempo,
      signature: snapshot.signature,
      linear_tempo: snapshot.linear_tempo,
      state: MarkerState::Materialized,
    })
  }

  pub fn get_time_pos(&self) -> ClockTime {
    self.time_pos
  }

  pub fn get_tempo(&self) -> Tempo {
    self.tempo
  }

  pub fn get_signature(&self) -> Signature {
    self.signature
  }

  pub fn is_linear_tempo(&self) -> bool {
    self.linear_tempo
  }

  pub fn get_state(&self) -> MarkerState {
    self.state
  }

  /// Materializes the marker in the host at its time position. Idempotent
  /// once materialized.
  pub fn create(&mut self, store: &mut dyn ProjectStore) -> Result<(), ReplicateError> {
    if self.state == MarkerState::Materialized {
      return Ok(());
    }
    let ok = store.set_marker(
      None,
      Placement::ByTime(self.time_pos),
      self.tempo,
      self.signature,
      self.linear_tempo,
    );
    if ok {
      self.state = MarkerState::Materialized;
      debug!(
        "Created marker ({}/{} {}) at {} secs",
        self.signature.get_num_beats(),
        self.signature.get_note_value(),
        self.tempo.get_value(),
        self.time_pos.to_seconds()
      );
      Ok(())
    } else {
      Err(ReplicateError::MarkerCreate {
        time: self.time_pos.to_seconds(),
      })
    }
  }

  /// Rewrites the already-materialized marker with the current tempo and
  /// signature, anchored by `placement`.
  pub fn update(
    &mut self,
    store: &mut dyn ProjectStore,
    placement: Placement,
  ) -> Result<(), ReplicateError> {
    let index = match self.index {
      Some(index) => index,
      None => return Err(ReplicateError::MarkerNotMaterialized),
    };
    let ok = store.set_marker(
      Some(index),
      placement,
      self.tempo,
      self.signature,
      self.linear_tempo,
    );
    if ok {
      if let Placement::ByTime(time) = placement {
        self.time_pos = time;
      }
      Ok(())
    } else {
      Err(ReplicateError::MarkerUpdate { index })
    }
  }

  /// A pending copy of this marker's tempo, signature and tempo shape at a
  /// new time position. A negative resulting position is a programming
  /// fault.
  pub fn clone_with(&self, time: CloneTime) -> TempoMarker {
    let time_pos = match time {
      CloneTime::Offset(offset) => {
        let seconds = self.time_pos.to_seconds() + offset;
        assert!(seconds >= 0.0);
        ClockTime::from_seconds(seconds)
      }
      CloneTime::At(time) => time,
    };
    TempoMarker::pending(time_pos, self.tempo, self.signature, self.linear_tempo)
  }

  /// Deletes the host-side marker. A host failure is logged and ignored;
  /// the in-memory value survives as a stale handle.
  pub fn remove(&mut self, store: &mut dyn ProjectStore) {
    match self.index {
      Some(index) => {
        if store.delete_marker(index) {
          debug!("Marker {} deleted", index);
        } else {
          warn!("Failed deleting marker {}", index);
        }
      }
      None => warn!("Can't remove a marker that was never materialized"),
    }
  }

  /// True when both markers carry the same tempo and time signature, which
  /// makes the later of two adjacent ones redundant.
  pub fn equivalent_signature(&self, other: &TempoMarker) -> bool {
    self.tempo == other.tempo
      && self.signature == other.signature
      && self.linear_tempo == other.linear_tempo
  }
}
