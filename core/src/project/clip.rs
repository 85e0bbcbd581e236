use crate::host::{BeatsContext, ClipId, ProjectStore};
use crate::project::BOUNDARY_EPSILON;
use crate::time::{ClockTime, Tempo};

/// Beats threshold below which a clip end counts as sitting on a barline.
const BARLINE_BEATS_EPSILON: f64 = 0.001;

/// Timing metadata for one clip, captured from live host state before any
/// mutation. `length` and `end` are local values; the end-of-measure nudge
/// below never touches the host clip.
#[derive(Debug, Clone)]
pub struct ClipTimingInfo {
  id: ClipId,
  position: ClockTime,
  length: ClockTime,
  end: ClockTime,

  pos_beats: f64,
  pos_measure_beats: f64,
  pos_denominator: u16,
  pos_bpm: Tempo,

  end_beats: f64,
  end_measure_beats: f64,
  end_denominator: u16,
  end_bpm: Tempo,

  intime: ClockTime,
  outtime: ClockTime,
}

impl ClipTimingInfo {
  pub fn gather(store: &dyn ProjectStore, id: ClipId) -> ClipTimingInfo {
    let position = store.get_clip_position(id);
    let mut length = store.get_clip_length(id);
    let mut end = position + length;

    let pos_ctx = store.time_to_beats(position);
    let pos_bpm = store.divided_bpm_at(position);

    let mut end_ctx = store.time_to_beats(end);
    let mut end_bpm = store.divided_bpm_at(end);

    // An end landing a tiny amount after a barline would insert a full
    // measure of the following segment's tempo while the tempo is still at
    // the prior value. Remap once with the end pulled back. A clip shorter
    // than the pull-back keeps its length as is.
    if end_ctx.beats_into_measure < BARLINE_BEATS_EPSILON && length > BOUNDARY_EPSILON {
      length -= BOUNDARY_EPSILON;
      end = position + length;
      end_ctx = store.time_to_beats(end);
      end_bpm = store.divided_bpm_at(end);
    }

    let intime = ClockTime::from_beats(pos_ctx.beats_into_measure, pos_bpm);
    let outtime_beats = end_ctx.measure_len_beats - end_ctx.beats_into_measure;
    let outtime = ClockTime::from_beats(outtime_beats, end_bpm);

    ClipTimingInfo {
      id,
      position,
      length,
      end,
      pos_beats: pos_ctx.beats_into_measure,
      pos_measure_beats: pos_ctx.measure_len_beats,
      pos_denominator: pos_ctx.denominator,
      pos_bpm,
      end_beats: end_ctx.beats_into_measure,
      end_measure_beats: end_ctx.measure_len_beats,
      end_denominator: end_ctx.denominator,
      end_bpm,
      intime,
      outtime,
    }
  }

  pub fn get_id(&self) -> ClipId {
    self.id
  }

  pub fn get_position(&self) -> ClockTime {
    self.position
  }

  pub fn get_length(&self) -> ClockTime {
    self.length
  }

  pub fn get_end(&self) -> ClockTime {
    self.end
  }

  /// Measure length in beats at the clip start.
  pub fn get_pos_measure_beats(&self) -> f64 {
    self.pos_measure_beats
  }

  pub fn get_pos_bpm(&self) -> Tempo {
    self.pos_bpm
  }

  pub fn get_end_bpm(&self) -> Tempo {
    self.end_bpm
  }

  /// Seconds from the start of the containing measure to the clip start.
  pub fn get_intime(&self) -> ClockTime {
    self.intime
  }

  /// Seconds from the clip end to the end of its containing measure.
  pub fn get_outtime(&self) -> ClockTime {
    self.outtime
  }

  pub fn start_context(&self) -> BeatsContext {
    BeatsContext {
      beats_into_measure: self.pos_beats,
      measure_len_beats: self.pos_measure_beats,
      full_beats: 0.0,
      denominator: self.pos_denominator,
    }
  }

  pub fn end_context(&self) -> BeatsContext {
    BeatsContext {
      beats_into_measure: self.end_beats,
      measure_len_beats: self.end_measure_beats,
      full_beats: 0.0,
      denominator: self.end_denominator,
    }
  }
}
