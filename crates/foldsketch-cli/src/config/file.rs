use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileStepSizeConfig {
    pub initial: Option<f64>,
    pub max: Option<f64>,
    pub growth: Option<f64>,
    pub shrink: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileAnnealingConfig {
    #[serde(rename = "initial-temperature")]
    pub initial_temperature: Option<f64>,
    #[serde(rename = "num-steps")]
    pub num_steps: Option<usize>,
    #[serde(rename = "force-threshold")]
    pub force_threshold: Option<f64>,
    #[serde(rename = "cooling-factor")]
    pub cooling_factor: Option<f64>,
    #[serde(rename = "log-points")]
    pub log_points: Option<usize>,
    #[serde(rename = "step-size")]
    pub step_size: Option<FileStepSizeConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileScheduleConfig {
    #[serde(rename = "wait-period")]
    pub wait_period: Option<usize>,
    #[serde(rename = "tertiary-contacts")]
    pub tertiary_contacts: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileOutputConfig {
    pub name: Option<String>,
    pub snapshots: Option<usize>,
    #[serde(rename = "residue-ids")]
    pub residue_ids: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileForcefieldConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub annealing: Option<FileAnnealingConfig>,
    pub schedule: Option<FileScheduleConfig>,
    pub output: Option<FileOutputConfig>,
    pub forcefield: Option<FileForcefieldConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
