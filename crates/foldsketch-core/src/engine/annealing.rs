use super::config::AnnealingConfig;
use super::progress::{Progress, ProgressReporter};
use super::schedule::ConstraintScheduler;
use super::state::{ConvergenceReason, LayoutState, StepRecord};
use crate::core::forcefield::field::ForceField;
use crate::core::forcefield::term::PotentialTerm;
use nalgebra::{Point2, Vector2};
use rand::Rng;
use tracing::{debug, instrument, trace};

/// How a single chain's minimization ended.
#[derive(Debug, Clone)]
pub struct AnnealingOutcome {
    pub state: LayoutState,
    pub reason: ConvergenceReason,
    pub records: Vec<StepRecord>,
    /// Energy, force and residue of the last evaluated step.
    pub final_record: StepRecord,
    /// Active term with the highest energy at the last evaluated step.
    pub peak_term: Option<(PotentialTerm, f64)>,
}

/// Temperature-annealed, adaptive-step descent over the active restraint terms.
pub struct AnnealingDriver<'a, F: ForceField + ?Sized> {
    forcefield: &'a F,
    config: &'a AnnealingConfig,
    snapshot_interval: Option<usize>,
}

impl<'a, F: ForceField + ?Sized> AnnealingDriver<'a, F> {
    pub fn new(forcefield: &'a F, config: &'a AnnealingConfig) -> Self {
        Self {
            forcefield,
            config,
            snapshot_interval: None,
        }
    }

    /// Calls the snapshot hook every `interval` steps.
    pub fn with_snapshot_interval(mut self, interval: Option<usize>) -> Self {
        self.snapshot_interval = interval.filter(|&i| i > 0);
        self
    }

    /// Runs at most `num_steps + 1` iterations.
    ///
    /// `on_snapshot` receives the step index and the positions after that step's update.
    #[instrument(skip_all, fields(n = state.positions.len(), steps = self.config.num_steps))]
    pub fn run<R, S>(
        &self,
        mut state: LayoutState,
        scheduler: &mut ConstraintScheduler,
        rng: &mut R,
        reporter: &ProgressReporter,
        mut on_snapshot: S,
    ) -> AnnealingOutcome
    where
        R: Rng + ?Sized,
        S: FnMut(usize, &[Point2<f64>]),
    {
        let cfg = self.config;
        let log_interval = cfg.log_interval();
        let cooling_rate = cfg.cooling_rate();
        let mut records = Vec::new();

        let (reason, final_record, peak_term) = loop {
            let i = state.step;
            if let Some(event) = scheduler.advance(i) {
                debug!(%event, "Activated restraint.");
            }
            let terms = scheduler.active();

            let (energy, per_term) = self.forcefield.energy(&state.positions, terms);
            let forces = self.forcefield.force(&state.positions, terms);
            let (max_force_index, max_force) = largest_component(&forces);
            let current = StepRecord {
                step: i,
                energy,
                max_force,
                temperature: state.temperature,
                step_size: state.step_size,
                max_force_index,
            };

            // Zero force also ends the run when the threshold is zero.
            if max_force == 0.0 || max_force < cfg.force_threshold {
                let peak = highest_energy_term(terms, &per_term);
                break (ConvergenceReason::ThresholdReached, current, peak);
            }
            if i == cfg.num_steps {
                let peak = highest_energy_term(terms, &per_term);
                break (ConvergenceReason::MaxStepsReached, current, peak);
            }

            let proposal = self.propose(&state, &forces, max_force, rng);
            let (new_energy, _) = self.forcefield.energy(&proposal, terms);

            if new_energy < energy {
                for (k, p) in proposal.into_iter().enumerate() {
                    state.last_displacement[k] = p - state.positions[k];
                    state.positions[k] = p;
                }
                state.step_size = (state.step_size * cfg.step.growth).min(cfg.step.max);
            } else {
                state.last_displacement.fill(Vector2::zeros());
                state.step_size *= cfg.step.shrink;
            }
            trace!(step = i, energy, new_energy, h = state.step_size, "Step evaluated.");

            if i % log_interval == 0 {
                records.push(StepRecord {
                    step_size: state.step_size,
                    ..current
                });
                if state.temperature > 0.0 {
                    state.temperature =
                        (state.temperature - log_interval as f64 * cooling_rate).max(0.0);
                }
            }

            if let Some(interval) = self.snapshot_interval {
                if i % interval == 0 {
                    on_snapshot(i, &state.positions);
                }
            }

            reporter.report(Progress::TaskIncrement);
            state.step += 1;
        };

        debug!(
            reason = %reason,
            steps = state.step,
            energy = final_record.energy,
            max_force = final_record.max_force,
            peak_term = ?peak_term,
            "Minimization finished."
        );
        AnnealingOutcome {
            state,
            reason,
            records,
            final_record,
            peak_term,
        }
    }

    fn propose<R: Rng + ?Sized>(
        &self,
        state: &LayoutState,
        forces: &[Vector2<f64>],
        max_force: f64,
        rng: &mut R,
    ) -> Vec<Point2<f64>> {
        let h = state.step_size;
        let t = state.temperature;
        state
            .positions
            .iter()
            .zip(forces)
            .enumerate()
            .map(|(k, (p, f))| {
                let descent = f / max_force * h;
                if t > 0.0 {
                    let r = Vector2::<f64>::new(
                        rng.gen_range(-1.0..=1.0),
                        rng.gen_range(-1.0..=1.0),
                    );
                    let momentum = if state.step > 0 {
                        state.last_displacement[k] * t
                    } else {
                        r * t
                    };
                    p + descent + momentum
                } else {
                    p + descent
                }
            })
            .collect()
    }
}

fn highest_energy_term(
    terms: &[PotentialTerm],
    per_term: &[f64],
) -> Option<(PotentialTerm, f64)> {
    terms
        .iter()
        .zip(per_term)
        .map(|(term, &energy)| (*term, energy))
        .fold(None, |best, cur| match best {
            Some((_, e)) if e >= cur.1 => best,
            _ => Some(cur),
        })
}

/// Residue index and magnitude of the largest force component.
fn largest_component(forces: &[Vector2<f64>]) -> (usize, f64) {
    forces
        .iter()
        .enumerate()
        .map(|(k, f)| (k, f.amax()))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best })
}
