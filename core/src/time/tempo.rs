const SECONDS_PER_MINUTE: f64 = 60.0;

///! Tempo in beats per minute
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
pub struct Tempo(f64);

impl Tempo {
  pub fn new(value: f64) -> Tempo {
    assert!(value > 0.0);
    Tempo(value)
  }

  pub fn get_value(&self) -> f64 {
    self.0
  }

  pub fn seconds_per_beat(&self) -> f64 {
    SECONDS_PER_MINUTE / self.0
  }
}

impl From<Tempo> for f64 {
  fn from(item: Tempo) -> Self {
    item.0
  }
}
