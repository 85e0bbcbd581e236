#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Signature {
  num_beats: u16,  // numerator
  note_value: u16, // denominator
}

impl Signature {
  pub fn new(num_beats: u16, note_value: u16) -> Signature {
    assert!(num_beats > 0 && note_value > 0);
    Signature {
      num_beats,
      note_value,
    }
  }

  pub fn get_num_beats(&self) -> u16 {
    self.num_beats
  }

  pub fn get_note_value(&self) -> u16 {
    self.note_value
  }
}
