use std::fs::File;
use std::io::Read;

use failure::Error;
use serde_derive::Deserialize;

use practice_track_core::host::memory::MemoryProject;
use practice_track_core::time::{ClockTime, Signature, Tempo};

/// TOML description of a project the replication run operates on. This is
/// input glue for the standalone binary; the engine itself never reads or
/// writes files.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ProjectFile {
  pub markers: Vec<MarkerEntry>,
  pub tracks: Vec<TrackEntry>,
}

#[derive(Deserialize, Debug)]
pub struct MarkerEntry {
  pub time: f64,
  pub bpm: f64,
  #[serde(default = "default_signature")]
  pub signature: [u16; 2],
  #[serde(default)]
  pub linear: bool,
}

fn default_signature() -> [u16; 2] {
  [4, 4]
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct TrackEntry {
  pub name: String,
  pub clips: Vec<ClipEntry>,
}

#[derive(Deserialize, Debug)]
pub struct ClipEntry {
  pub position: f64,
  pub length: f64,
  #[serde(default)]
  pub selected: bool,
}

impl ProjectFile {
  pub fn from_file(path: &str) -> Result<ProjectFile, Error> {
    let mut content = String::new();
    let mut file = File::open(path)?;
    file.read_to_string(&mut content)?;
    ProjectFile::from_str(&content)
  }

  pub fn from_str(content: &str) -> Result<ProjectFile, Error> {
    let project: ProjectFile = toml::from_str(content)?;
    Ok(project)
  }

  pub fn build(&self) -> MemoryProject {
    let mut project = MemoryProject::new();
    for marker in self.markers.iter() {
      project.add_marker(
        ClockTime::from_seconds(marker.time),
        Tempo::new(marker.bpm),
        Signature::new(marker.signature[0], marker.signature[1]),
        marker.linear,
      );
    }
    for track in self.tracks.iter() {
      let track_id = project.add_track(track.name.as_str());
      for clip in track.clips.iter() {
        let clip_id = project.add_clip(
          track_id,
          ClockTime::from_seconds(clip.position),
          ClockTime::from_seconds(clip.length),
        );
        if clip.selected {
          project.select_clip(clip_id);
        }
      }
    }
    project
  }
}
