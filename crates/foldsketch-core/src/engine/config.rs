use crate::core::forcefield::params::ForcefieldParams;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Upper bound on the step size; a configured cap may be lower but never higher.
pub const MAX_STEP_SIZE: f64 = 2.0;

/// Bold-driver step size control: grow after an accepted move, shrink after a rejected one.
#[derive(Debug, Clone, PartialEq)]
pub struct StepControl {
    pub initial: f64,
    pub max: f64,
    pub growth: f64,
    pub shrink: f64,
}

impl Default for StepControl {
    fn default() -> Self {
        Self {
            initial: 2.0,
            max: 2.0,
            growth: 1.2,
            shrink: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    pub num_steps: usize,
    /// The run stops once the largest force component drops below this value.
    pub force_threshold: f64,
    /// Multiplier of `T_init / nsteps` giving the cooling rate per step.
    pub cooling_factor: f64,
    /// Number of log records spread over the run.
    pub log_points: usize,
    pub step: StepControl,
}

impl AnnealingConfig {
    /// Steps between log records (and cooling decrements); never zero.
    pub fn log_interval(&self) -> usize {
        (self.num_steps / self.log_points.max(1)).max(1)
    }

    pub fn cooling_rate(&self) -> f64 {
        if self.num_steps == 0 {
            0.0
        } else {
            self.initial_temperature / self.num_steps as f64 * self.cooling_factor
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub annealing: AnnealingConfig,
    /// Steps between phased activations of scheduled terms.
    pub wait_period: usize,
    /// Number of intermediate snapshots to render; zero disables them.
    pub snapshot_count: usize,
    pub use_tertiary_contacts: bool,
    pub label_with_ids: bool,
    pub forcefield: ForcefieldParams,
}

impl LayoutConfig {
    /// Steps between intermediate snapshots, or `None` when they are disabled.
    pub fn snapshot_interval(&self) -> Option<usize> {
        if self.snapshot_count == 0 {
            return None;
        }
        let steps = self.annealing.num_steps;
        Some((steps / steps.min(self.snapshot_count).max(1)).max(1))
    }
}

#[derive(Default)]
pub struct LayoutConfigBuilder {
    initial_temperature: Option<f64>,
    num_steps: Option<usize>,
    force_threshold: Option<f64>,
    cooling_factor: Option<f64>,
    log_points: Option<usize>,
    step: Option<StepControl>,
    wait_period: Option<usize>,
    snapshot_count: Option<usize>,
    use_tertiary_contacts: Option<bool>,
    label_with_ids: Option<bool>,
    forcefield: Option<ForcefieldParams>,
}

impl LayoutConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = Some(temperature);
        self
    }
    pub fn num_steps(mut self, steps: usize) -> Self {
        self.num_steps = Some(steps);
        self
    }
    pub fn force_threshold(mut self, threshold: f64) -> Self {
        self.force_threshold = Some(threshold);
        self
    }
    pub fn cooling_factor(mut self, factor: f64) -> Self {
        self.cooling_factor = Some(factor);
        self
    }
    pub fn log_points(mut self, points: usize) -> Self {
        self.log_points = Some(points);
        self
    }
    pub fn step_control(mut self, step: StepControl) -> Self {
        self.step = Some(step);
        self
    }
    pub fn wait_period(mut self, period: usize) -> Self {
        self.wait_period = Some(period);
        self
    }
    pub fn snapshot_count(mut self, count: usize) -> Self {
        self.snapshot_count = Some(count);
        self
    }
    pub fn use_tertiary_contacts(mut self, enabled: bool) -> Self {
        self.use_tertiary_contacts = Some(enabled);
        self
    }
    pub fn label_with_ids(mut self, enabled: bool) -> Self {
        self.label_with_ids = Some(enabled);
        self
    }
    pub fn forcefield(mut self, params: ForcefieldParams) -> Self {
        self.forcefield = Some(params);
        self
    }

    pub fn build(self) -> Result<LayoutConfig, ConfigError> {
        let initial_temperature = self
            .initial_temperature
            .ok_or(ConfigError::MissingParameter("initial_temperature"))?;
        if !(initial_temperature >= 0.0 && initial_temperature.is_finite()) {
            return Err(ConfigError::InvalidValue {
                name: "initial_temperature",
                reason: format!(
                    "must be a finite non-negative number, got {}",
                    initial_temperature
                ),
            });
        }

        let step = self.step.unwrap_or_default();
        if !(step.shrink > 0.0 && step.shrink < 1.0) {
            return Err(ConfigError::InvalidValue {
                name: "step.shrink",
                reason: format!("must lie in (0, 1), got {}", step.shrink),
            });
        }
        if !(step.initial > 0.0 && step.max > 0.0 && step.growth >= 1.0) {
            return Err(ConfigError::InvalidValue {
                name: "step",
                reason: "initial and max must be positive and growth at least 1".to_string(),
            });
        }
        if step.max > MAX_STEP_SIZE {
            return Err(ConfigError::InvalidValue {
                name: "step.max",
                reason: format!("must not exceed {}, got {}", MAX_STEP_SIZE, step.max),
            });
        }
        if step.initial > step.max {
            return Err(ConfigError::InvalidValue {
                name: "step.initial",
                reason: format!("must not exceed step.max ({}), got {}", step.max, step.initial),
            });
        }

        let force_threshold = self.force_threshold.unwrap_or(1e-4);
        if !(force_threshold >= 0.0 && force_threshold.is_finite()) {
            return Err(ConfigError::InvalidValue {
                name: "force_threshold",
                reason: format!("must be a finite non-negative number, got {}", force_threshold),
            });
        }

        let wait_period = self.wait_period.unwrap_or(20);
        if wait_period == 0 {
            return Err(ConfigError::InvalidValue {
                name: "wait_period",
                reason: "must be at least 1".to_string(),
            });
        }
        let log_points = self.log_points.unwrap_or(20);
        if log_points == 0 {
            return Err(ConfigError::InvalidValue {
                name: "log_points",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(LayoutConfig {
            annealing: AnnealingConfig {
                initial_temperature,
                num_steps: self
                    .num_steps
                    .ok_or(ConfigError::MissingParameter("num_steps"))?,
                force_threshold,
                cooling_factor: self.cooling_factor.unwrap_or(1.5),
                log_points,
                step,
            },
            wait_period,
            snapshot_count: self.snapshot_count.unwrap_or(0),
            use_tertiary_contacts: self.use_tertiary_contacts.unwrap_or(true),
            label_with_ids: self.label_with_ids.unwrap_or(false),
            forcefield: self.forcefield.unwrap_or_default(),
        })
    }
}
