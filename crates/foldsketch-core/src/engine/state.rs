use super::geometry::InitialGeometry;
use super::schedule::ActivationEvent;
use nalgebra::{Point2, Vector2};
use serde::Serialize;
use std::fmt;
use svg::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConvergenceReason {
    /// The largest force component fell below the threshold.
    ThresholdReached,
    MaxStepsReached,
}

impl fmt::Display for ConvergenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergenceReason::ThresholdReached => write!(f, "threshold reached"),
            ConvergenceReason::MaxStepsReached => write!(f, "maximum steps reached"),
        }
    }
}

/// Statistics logged at regular intervals of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub energy: f64,
    pub max_force: f64,
    pub temperature: f64,
    pub step_size: f64,
    /// Sequence index of the residue carrying the largest force component.
    pub max_force_index: usize,
}

/// Mutable state of one chain's minimization. Never shared between chains.
#[derive(Debug, Clone)]
pub struct LayoutState {
    pub positions: Vec<Point2<f64>>,
    pub temperature: f64,
    pub step_size: f64,
    pub step: usize,
    /// Displacement applied by the last accepted move; zero after a rejection.
    pub last_displacement: Vec<Vector2<f64>>,
}

impl LayoutState {
    pub fn new(positions: Vec<Point2<f64>>, temperature: f64, step_size: f64) -> Self {
        let n = positions.len();
        Self {
            positions,
            temperature,
            step_size,
            step: 0,
            last_displacement: vec![Vector2::zeros(); n],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Intermediate,
    Final,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub step: usize,
    pub kind: SnapshotKind,
    pub document: Document,
}

#[derive(Debug, Clone)]
pub struct ChainResult {
    pub label: String,
    pub geometry: InitialGeometry,
    /// Restraint activations in the order they happened.
    pub activations: Vec<ActivationEvent>,
    pub positions: Vec<Point2<f64>>,
    pub reason: ConvergenceReason,
    pub records: Vec<StepRecord>,
    /// Intermediate snapshots in step order, followed by the final one.
    pub snapshots: Vec<Snapshot>,
    pub final_energy: f64,
    pub final_max_force: f64,
    /// Index of the last iteration; the loop ran `steps + 1` times.
    pub steps: usize,
}

impl ChainResult {
    pub fn final_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots
            .iter()
            .rev()
            .find(|s| s.kind == SnapshotKind::Final)
    }
}
