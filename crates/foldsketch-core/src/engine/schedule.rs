use crate::core::forcefield::term::PotentialTerm;
use slotmap::{SlotMap, new_key_type};
use std::collections::VecDeque;
use std::fmt;

new_key_type! {
    /// Handle of a restraint term owned by a [`ConstraintScheduler`].
    pub struct TermId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationMode {
    /// Every term is active from the first step.
    Immediate,
    /// Pair and stack terms are switched on one by one, angles last.
    Phased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    Term(PotentialTerm),
    /// All angle terms, switched on together.
    Angles { count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationEvent {
    pub step: usize,
    pub kind: ActivationKind,
}

impl fmt::Display for ActivationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActivationKind::Term(term) => write!(f, "step {}: added {}", self.step, term),
            ActivationKind::Angles { count } => {
                write!(f, "step {}: added {} angle restraints", self.step, count)
            }
        }
    }
}

/// Decides which restraint terms take part in the energy at each step.
///
/// Base terms are always active. In phased mode a wait gate spaces out activations: the gate
/// opens after `wait_period` steps and activations only happen on multiples of `wait_period`.
/// Activating a term whose summary differs from the previous one closes the gate again, so
/// runs of equivalent terms come in back to back.
pub struct ConstraintScheduler {
    arena: SlotMap<TermId, PotentialTerm>,
    pending: VecDeque<TermId>,
    angles: Vec<TermId>,
    active: Vec<PotentialTerm>,
    mode: ActivationMode,
    wait_period: usize,
    wait_counter: usize,
    gate_open: bool,
    angles_added: bool,
    last_summary: Option<usize>,
    events: Vec<ActivationEvent>,
}

impl ConstraintScheduler {
    pub fn new(
        base: &[PotentialTerm],
        schedule: &[PotentialTerm],
        angles: &[PotentialTerm],
        mode: ActivationMode,
        wait_period: usize,
    ) -> Self {
        let mut arena = SlotMap::with_key();
        let pending: VecDeque<TermId> = schedule.iter().map(|t| arena.insert(*t)).collect();
        let angles: Vec<TermId> = angles.iter().map(|t| arena.insert(*t)).collect();

        let mut scheduler = Self {
            arena,
            pending,
            angles,
            active: base.to_vec(),
            mode,
            wait_period: wait_period.max(1),
            wait_counter: 0,
            gate_open: false,
            angles_added: false,
            last_summary: None,
            events: Vec::new(),
        };

        match mode {
            ActivationMode::Immediate => {
                while scheduler.activate_next(0).is_some() {}
                scheduler.activate_angles(0);
            }
            ActivationMode::Phased => {
                scheduler.activate_next(0);
            }
        }
        scheduler
    }

    pub fn mode(&self) -> ActivationMode {
        self.mode
    }

    /// Terms currently contributing to the energy: base terms first, then activations in order.
    pub fn active(&self) -> &[PotentialTerm] {
        &self.active
    }

    pub fn term(&self, id: TermId) -> Option<&PotentialTerm> {
        self.arena.get(id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &PotentialTerm> {
        self.pending.iter().filter_map(|id| self.arena.get(*id))
    }

    /// Every activation so far, in order.
    pub fn events(&self) -> &[ActivationEvent] {
        &self.events
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty() && (self.angles_added || self.angles.is_empty())
    }

    /// Runs the activation gate for `step` and returns the activation it triggered, if any.
    pub fn advance(&mut self, step: usize) -> Option<ActivationEvent> {
        if self.mode == ActivationMode::Immediate {
            return None;
        }

        self.wait_counter += 1;
        if self.wait_counter == self.wait_period {
            self.gate_open = true;
        }
        if step % self.wait_period != 0 || !self.gate_open {
            return None;
        }

        let previous = self.last_summary;
        if let Some(event) = self.activate_next(step) {
            if let ActivationKind::Term(term) = event.kind {
                if previous != Some(term.summary()) {
                    self.gate_open = false;
                    self.wait_counter = 0;
                }
            }
            return Some(event);
        }

        if !self.angles_added {
            self.gate_open = false;
            return self.activate_angles(step);
        }
        None
    }

    fn activate_next(&mut self, step: usize) -> Option<ActivationEvent> {
        let id = self.pending.pop_front()?;
        let term = *self.arena.get(id)?;
        self.active.push(term);
        self.last_summary = Some(term.summary());
        Some(self.record(step, ActivationKind::Term(term)))
    }

    fn activate_angles(&mut self, step: usize) -> Option<ActivationEvent> {
        self.angles_added = true;
        if self.angles.is_empty() {
            return None;
        }
        let terms: Vec<PotentialTerm> = self
            .angles
            .iter()
            .filter_map(|id| self.arena.get(*id).copied())
            .collect();
        let count = terms.len();
        self.active.extend(terms);
        Some(self.record(step, ActivationKind::Angles { count }))
    }

    fn record(&mut self, step: usize, kind: ActivationKind) -> ActivationEvent {
        let event = ActivationEvent { step, kind };
        self.events.push(event);
        event
    }
}
