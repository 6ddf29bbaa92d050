use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::error::SimulationError;

pub const BUILTIN_PRESETS: &str = include_str!("data/parameter_presets.json");

/// Immutable rate/step configuration for one run.
///
/// Rates follow the classic notation: `r` prey birth, `a` predation, `k`
/// prey diffusion, `b` predator birth per prey eaten, `m` predator death,
/// `l` predator diffusion. All fields have documented defaults so a preset
/// or config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Prey birth rate `r`.
    pub prey_birth_rate: f64,
    /// Predation rate `a`.
    pub predation_rate: f64,
    /// Prey diffusion coefficient `k`.
    pub prey_diffusion: f64,
    /// Predator birth rate `b`.
    pub predator_birth_rate: f64,
    /// Predator death rate `m`.
    pub predator_death_rate: f64,
    /// Predator diffusion coefficient `l`.
    pub predator_diffusion: f64,
    /// Explicit Euler step size `dt`.
    pub time_step: f64,
    /// Total simulated duration `T`; the run covers `trunc(T / dt)` steps.
    pub duration: f64,
    /// Steps between reported frames.
    pub output_interval: u64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            prey_birth_rate: 0.1,
            predation_rate: 0.05,
            prey_diffusion: 0.2,
            predator_birth_rate: 0.03,
            predator_death_rate: 0.09,
            predator_diffusion: 0.2,
            time_step: 0.5,
            duration: 500.0,
            output_interval: 10,
        }
    }
}

impl SimulationParameters {
    /// Check every field before a run starts: rates must be finite and
    /// non-negative, the step size and duration strictly positive, the
    /// output interval at least one step.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let rates = [
            ("prey birth rate", self.prey_birth_rate),
            ("predation rate", self.predation_rate),
            ("prey diffusion coefficient", self.prey_diffusion),
            ("predator birth rate", self.predator_birth_rate),
            ("predator death rate", self.predator_death_rate),
            ("predator diffusion coefficient", self.predator_diffusion),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidParameters {
                    reason: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(SimulationError::InvalidParameters {
                reason: format!("time step must be positive, got {}", self.time_step),
            });
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(SimulationError::InvalidParameters {
                reason: format!("duration must be positive, got {}", self.duration),
            });
        }
        if self.output_interval == 0 {
            return Err(SimulationError::InvalidParameters {
                reason: "output interval must be at least one step".to_string(),
            });
        }
        Ok(())
    }

    /// Number of whole steps covered by the configured duration.
    pub fn total_steps(&self) -> u64 {
        (self.duration / self.time_step) as u64
    }

    /// Advisory explicit-Euler stability bound for the configured
    /// diffusion coefficients on a unit grid.
    ///
    /// Steps larger than this can oscillate or blow up; the engine does not
    /// enforce the bound, it only exposes it so callers can warn or refuse.
    pub fn stability_limit(&self) -> f64 {
        0.25 / self.prey_diffusion.max(self.predator_diffusion)
    }
}

/// Seed and shape of the generated landscape.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LandscapeSettings {
    pub seed: u64,
    pub land_proportion: f64,
    pub smoothing_passes: u32,
}

impl Default for LandscapeSettings {
    fn default() -> Self {
        Self {
            seed: 1,
            land_proportion: 0.75,
            smoothing_passes: 2,
        }
    }
}

/// One named parameter regime.
#[derive(Debug, Clone, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: SimulationParameters,
    #[serde(default)]
    pub landscape: LandscapeSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresetsFile {
    pub presets: Vec<Preset>,
}

/// Keyed collection of presets, builtin or loaded from a file.
#[derive(Debug, Clone)]
pub struct PresetLibrary {
    by_id: HashMap<String, Preset>,
}

impl PresetLibrary {
    pub fn builtin() -> Self {
        let parsed: PresetsFile =
            serde_json::from_str(BUILTIN_PRESETS).expect("builtin presets should parse");
        Self::from_presets(parsed.presets)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: PresetsFile = serde_json::from_str(json)?;
        Ok(Self::from_presets(parsed.presets))
    }

    pub fn from_file(path: &Path) -> Result<Self, PresetsError> {
        let contents = fs::read_to_string(path).map_err(|source| PresetsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let library = Self::from_json_str(&contents)?;
        Ok(library)
    }

    fn from_presets(presets: Vec<Preset>) -> Self {
        let mut by_id = HashMap::new();
        for preset in presets.into_iter() {
            by_id.insert(preset.id.clone(), preset);
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.by_id.get(id)
    }

    /// Preset ids in stable order, for listings and error messages.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_id.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum PresetsError {
    #[error("failed to parse presets: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read presets from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
