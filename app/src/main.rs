use log::{info, warn};

use failure;
use failure::{Error, Fail};

use practice_track_core::config::Config;
use practice_track_core::host::memory::MemoryProject;
use practice_track_core::host::ProjectStore;
use practice_track_core::project::controller::{ReplicateParams, RunController};
use practice_track_core::time::{ClockTime, Signature, Tempo};

mod dialog;
use crate::dialog::{user_inputs, DialogResult};

mod project_file;
use crate::project_file::ProjectFile;

const PRACTICE_TRACK_CONFIG: &'static str = "PRACTICE_TRACK_CONFIG";
const DEFAULT_PRACTICE_TRACK_CONFIG: &'static str = "practice-track.toml";

const PRACTICE_TRACK_LOG_CONFIG: &'static str = "PRACTICE_TRACK_LOG_CONFIG";
const DEFAULT_PRACTICE_TRACK_LOG_CONFIG: &'static str = "log4rs.yaml";

#[derive(Debug, Fail)]
enum MainError {
  #[fail(display = "Failed to init logging: {}", cause)]
  LoggingInit { cause: String },
}

fn main() -> Result<(), Error> {
  init_logging()?;

  let config = init_config()?;

  let mut project = init_project(&config)?;

  let params = match user_inputs(&config.replicate) {
    DialogResult::Cancelled => {
      info!("Cancelled");
      return Ok(());
    }
    DialogResult::Invalid(message) => {
      warn!("{}", message);
      return Ok(());
    }
    DialogResult::Values {
      duplicates,
      gap_measures,
    } => match ReplicateParams::new(duplicates, gap_measures) {
      Ok(params) => params,
      Err(err) => {
        warn!("{}", err);
        return Ok(());
      }
    },
  };

  let mut controller = RunController::new(params);
  let state = controller.run(&mut project)?;
  info!("Run finished: {:?}", state);

  dump_project(&project);

  Ok(())
}

fn init_logging() -> Result<(), Error> {
  let log_config_path = std::env::var(PRACTICE_TRACK_LOG_CONFIG)
    .unwrap_or_else(|_| DEFAULT_PRACTICE_TRACK_LOG_CONFIG.to_string());

  log4rs::init_file(log_config_path.as_str(), Default::default()).map_err(|err| {
    MainError::LoggingInit {
      cause: err.to_string(),
    }
  })?;

  Ok(())
}

fn init_config() -> Result<Config, Error> {
  let config_path = std::env::var(PRACTICE_TRACK_CONFIG)
    .unwrap_or_else(|_| DEFAULT_PRACTICE_TRACK_CONFIG.to_string());

  info!("Loading configuration from {} ...", config_path);
  let config = match Config::from_file(config_path.as_str()) {
    Ok(config) => config,
    Err(_) => {
      warn!("No configuration file found, using defaults");
      Config::default()
    }
  };

  Ok(config)
}

fn init_project(config: &Config) -> Result<MemoryProject, Error> {
  let path = std::env::args().nth(1).or_else(|| config.project.path.clone());

  match path {
    Some(path) => {
      info!("Loading project from {} ...", path);
      Ok(ProjectFile::from_file(path.as_str())?.build())
    }
    None => {
      info!("No project file given, using the demo project");
      Ok(demo_project())
    }
  }
}

/// A minimal project to exercise the run with: one track, one selected
/// clip and a tempo change inside it.
fn demo_project() -> MemoryProject {
  let mut project = MemoryProject::new();
  project.add_marker(
    ClockTime::zero(),
    Tempo::new(120.0),
    Signature::new(4, 4),
    false,
  );
  project.add_marker(
    ClockTime::from_seconds(6.0),
    Tempo::new(90.0),
    Signature::new(4, 4),
    false,
  );
  let track = project.add_track("guitar");
  let clip = project.add_clip(
    track,
    ClockTime::from_seconds(4.0),
    ClockTime::from_seconds(4.0),
  );
  project.select_clip(clip);
  project
}

fn dump_project(project: &MemoryProject) {
  for track in project.get_tracks() {
    let name = project.get_track_name(track).unwrap_or("?");
    info!("Track '{}':", name);
    for index in 0..project.count_track_clips(track) {
      if let Some(clip) = project.get_track_clip(track, index) {
        let position = project.get_clip_position(clip).to_seconds();
        let length = project.get_clip_length(clip).to_seconds();
        info!("  clip at {:.3} s, {:.3} s long", position, length);
      }
    }
  }
  for index in 0..project.count_markers() {
    if let Some(marker) = project.get_marker(index) {
      info!(
        "Marker at {:.3} s: {}/{} {} bpm",
        marker.time_pos.to_seconds(),
        marker.signature.get_num_beats(),
        marker.signature.get_note_value(),
        marker.tempo.get_value()
      );
    }
  }
}
