use std::ops::{Add, AddAssign, Sub, SubAssign};

use super::{Seconds, Tempo};

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

pub type UnitType = u64;
pub const UNITS_PER_SECOND: UnitType = NANOS_PER_SECOND as UnitType;

///! High resolution project time position
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct ClockTime(UnitType);

impl ClockTime {
  pub const fn zero() -> ClockTime {
    ClockTime(0)
  }

  pub const fn new(units: UnitType) -> ClockTime {
    ClockTime(units)
  }

  pub fn from_seconds(seconds: Seconds) -> ClockTime {
    ClockTime((seconds * UNITS_PER_SECOND as f64).round() as UnitType)
  }

  pub fn from_beats(beats: f64, tempo: Tempo) -> ClockTime {
    ClockTime::from_seconds(beats * tempo.seconds_per_beat())
  }

  pub fn units(&self) -> UnitType {
    self.0
  }

  pub fn to_seconds(&self) -> Seconds {
    self.0 as f64 / UNITS_PER_SECOND as f64
  }
}

impl Add for ClockTime {
  type Output = ClockTime;

  fn add(self, rhs: ClockTime) -> ClockTime {
    ClockTime(self.0 + rhs.0)
  }
}

impl AddAssign for ClockTime {
  fn add_assign(&mut self, rhs: ClockTime) {
    *self = *self + rhs;
  }
}

impl Sub for ClockTime {
  type Output = ClockTime;

  fn sub(self, rhs: ClockTime) -> ClockTime {
    ClockTime(self.0 - rhs.0)
  }
}

impl SubAssign for ClockTime {
  fn sub_assign(&mut self, rhs: ClockTime) {
    *self = *self - rhs;
  }
}
