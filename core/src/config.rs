use failure;
use failure::Error;

use serde;
use serde_derive::Deserialize;

use std::fs::File;
use std::io::Read;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Replicate {
  /// Default number of duplicates offered by the input prompt.
  pub duplicates: u32,
  /// Default number of whole measures between items.
  pub gap_measures: u32,
}

impl Default for Replicate {
  fn default() -> Replicate {
    Replicate {
      duplicates: 1,
      gap_measures: 1,
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Project {
  pub path: Option<String>,
}

impl Default for Project {
  fn default() -> Project {
    Project { path: None }
  }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
  pub replicate: Replicate,
  pub project: Project,
}

impl Default for Config {
  fn default() -> Config {
    Config {
      replicate: Replicate::default(),
      project: Project::default(),
    }
  }
}

impl Config {
  pub fn from_file<'a, T>(path: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let mut content = String::new();
    let path_str = path.into();
    let mut file = File::open(path_str)?;
    file.read_to_string(&mut content)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
  }

  pub fn from_str<'a, T>(content: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let config: Config = toml::from_str(content.into())?;
    Ok(config)
  }
}

#[cfg(test)]
mod test {
  use super::Config;

  #[test]
  pub fn defaults() {
    let config = Config::from_str("").unwrap();
    assert_eq!(config.replicate.duplicates, 1);
    assert_eq!(config.replicate.gap_measures, 1);
    assert!(config.project.path.is_none());
  }

  #[test]
  pub fn partial_replicate_section() {
    let config = Config::from_str("[replicate]\nduplicates = 4\n").unwrap();
    assert_eq!(config.replicate.duplicates, 4);
    assert_eq!(config.replicate.gap_measures, 1);
  }

  #[test]
  pub fn project_path() {
    let config = Config::from_str("[project]\npath = \"demo-project.toml\"\n").unwrap();
    assert_eq!(config.project.path.as_deref(), Some("demo-project.toml"));
  }
}
