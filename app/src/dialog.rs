use std::io::{self, BufRead, Write};

use practice_track_core::config::Replicate as ReplicateDefaults;

/// Outcome of the parameter prompt, separating a cancelled dialog from
/// unparsable input. Both abort the run before any mutation.
#[derive(Debug, PartialEq)]
pub enum DialogResult {
  Cancelled,
  Invalid(String),
  Values { duplicates: i64, gap_measures: i64 },
}

/// Prompts for the two run parameters on stdin. An empty line accepts the
/// default; end of input cancels.
pub fn user_inputs(defaults: &ReplicateDefaults) -> DialogResult {
  let stdin = io::stdin();
  let mut lines = stdin.lock().lines();

  let duplicates = match read_field(&mut lines, "Number of duplicates", defaults.duplicates) {
    Ok(value) => value,
    Err(result) => return result,
  };
  let gap_measures = match read_field(
    &mut lines,
    "Number of measures between items",
    defaults.gap_measures,
  ) {
    Ok(value) => value,
    Err(result) => return result,
  };

  DialogResult::Values {
    duplicates,
    gap_measures,
  }
}

fn read_field<B>(lines: &mut io::Lines<B>, caption: &str, default: u32) -> Result<i64, DialogResult>
where
  B: BufRead,
{
  print!("{} [{}]: ", caption, default);
  drop(io::stdout().flush());

  match lines.next() {
    None => Err(DialogResult::Cancelled),
    Some(Err(_)) => Err(DialogResult::Cancelled),
    Some(Ok(line)) => {
      let trimmed = line.trim();
      if trimmed.is_empty() {
        Ok(i64::from(default))
      } else {
        trimmed.parse::<i64>().map_err(|_| {
          DialogResult::Invalid(format!("Bad input for {}: can't parse '{}'", caption, trimmed))
        })
      }
    }
  }
}
