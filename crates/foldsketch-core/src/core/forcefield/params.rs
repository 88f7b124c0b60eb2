use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForcefieldError {
    #[error("Failed to read forcefield file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse forcefield TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid forcefield parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Parameters of the layout forcefield. Distances are in diagram units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ForcefieldParams {
    /// Backbone spacing between sequence neighbours; also scales the initial layout.
    pub unit_spacing: f64,
    pub pair_distance: f64,
    pub tertiary_distance: f64,
    pub stack_distance: f64,
    pub bond_k: f64,
    pub pair_k: f64,
    pub tertiary_k: f64,
    pub stack_k: f64,
    pub angle_k: f64,
    pub angle_degrees: f64,
    pub repulsion_k: f64,
    pub repulsion_cutoff: f64,
}

impl Default for ForcefieldParams {
    fn default() -> Self {
        Self {
            unit_spacing: 5.0,
            pair_distance: 7.5,
            tertiary_distance: 10.0,
            stack_distance: 5.0,
            bond_k: 1.0,
            pair_k: 1.0,
            tertiary_k: 0.2,
            stack_k: 0.5,
            angle_k: 10.0,
            angle_degrees: 90.0,
            repulsion_k: 1.0,
            repulsion_cutoff: 6.0,
        }
    }
}

impl ForcefieldParams {
    pub fn load(path: &Path) -> Result<Self, ForcefieldError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ForcefieldError> {
        let params: Self = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ForcefieldError> {
        let distances = [
            ("unit-spacing", self.unit_spacing),
            ("pair-distance", self.pair_distance),
            ("tertiary-distance", self.tertiary_distance),
            ("stack-distance", self.stack_distance),
        ];
        for (name, value) in distances {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ForcefieldError::InvalidParameter {
                    name,
                    reason: format!("must be a positive distance, got {}", value),
                });
            }
        }
        if self.repulsion_cutoff < 0.0 {
            return Err(ForcefieldError::InvalidParameter {
                name: "repulsion-cutoff",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}
