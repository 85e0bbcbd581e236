pub mod clip;
pub mod controller;
pub mod marker;
pub mod markers;
pub mod replicator;

use failure::Fail;

use crate::time::clock::UNITS_PER_SECOND;
use crate::time::ClockTime;

/// Tolerance used when deciding whether a time position sits on a measure
/// boundary, and when searching for the marker in effect at a clip start.
pub const BOUNDARY_EPSILON: ClockTime = ClockTime::new(UNITS_PER_SECOND / 1000);

#[derive(Debug, Fail)]
pub enum ReplicateError {
  #[fail(display = "Couldn't create tempo marker at {} secs", time)]
  MarkerCreate { time: f64 },

  #[fail(display = "Couldn't update tempo marker {}", index)]
  MarkerUpdate { index: usize },

  #[fail(display = "Tempo marker has not been materialized yet")]
  MarkerNotMaterialized,

  #[fail(display = "Can't have a negative number of duplicates")]
  NegativeDuplicates,

  #[fail(display = "Can't have a negative number of measures between items")]
  NegativeGap,
}
