use super::params::ForcefieldParams;
use super::potentials;
use super::term::PotentialTerm;
use crate::core::models::annotation::PairClass;
use itertools::Itertools;
use nalgebra::{Point2, Vector2};
use std::collections::HashSet;

/// Evaluates energies and forces of a 2D layout under a set of restraint terms.
///
/// The layout engine treats implementors as opaque: it only relies on `force` being consistent
/// with the descent direction of `energy`.
pub trait ForceField {
    /// Total energy and the energy of each term, in the order of `terms`.
    fn energy(&self, positions: &[Point2<f64>], terms: &[PotentialTerm]) -> (f64, Vec<f64>);

    /// Force (negative energy gradient) acting on each position.
    fn force(&self, positions: &[Point2<f64>], terms: &[PotentialTerm]) -> Vec<Vector2<f64>>;
}

/// Harmonic restraint forcefield with a soft excluded-volume repulsion between all residues
/// that are not directly bonded.
#[derive(Debug, Clone, Default)]
pub struct LayoutForcefield {
    params: ForcefieldParams,
}

impl LayoutForcefield {
    pub fn new(params: ForcefieldParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForcefieldParams {
        &self.params
    }

    /// Evaluates every term and the repulsion, handing each gradient contribution to `sink`.
    fn evaluate<F>(
        &self,
        positions: &[Point2<f64>],
        terms: &[PotentialTerm],
        mut sink: F,
    ) -> (f64, Vec<f64>)
    where
        F: FnMut(usize, Vector2<f64>),
    {
        let p = &self.params;
        let cos0 = p.angle_degrees.to_radians().cos();
        let mut per_term = Vec::with_capacity(terms.len());
        let mut bonded = HashSet::new();

        for term in terms {
            let energy = match *term {
                PotentialTerm::Angle { a, b, c } => {
                    match (positions.get(a), positions.get(b), positions.get(c)) {
                        (Some(pa), Some(pb), Some(pc)) => {
                            let (energy, grads) =
                                potentials::cosine_angle(pa, pb, pc, cos0, p.angle_k);
                            sink(a, grads[0]);
                            sink(b, grads[1]);
                            sink(c, grads[2]);
                            energy
                        }
                        _ => 0.0,
                    }
                }
                PotentialTerm::Pair { i, j, .. }
                | PotentialTerm::Stack { i, j }
                | PotentialTerm::Bond { i, j } => {
                    let (d0, k) = match *term {
                        PotentialTerm::Pair {
                            class: PairClass::Canonical,
                            ..
                        } => (p.pair_distance, p.pair_k),
                        PotentialTerm::Pair { .. } => (p.tertiary_distance, p.tertiary_k),
                        PotentialTerm::Stack { .. } => (p.stack_distance, p.stack_k),
                        _ => {
                            bonded.insert((i.min(j), i.max(j)));
                            (p.unit_spacing, p.bond_k)
                        }
                    };
                    match (positions.get(i), positions.get(j)) {
                        (Some(pi), Some(pj)) => {
                            let (energy, grad) = potentials::harmonic_distance(pi, pj, d0, k);
                            sink(i, grad);
                            sink(j, -grad);
                            energy
                        }
                        _ => 0.0,
                    }
                }
            };
            per_term.push(energy);
        }

        let mut total: f64 = per_term.iter().sum();
        if p.repulsion_k > 0.0 && p.repulsion_cutoff > 0.0 {
            for (i, j) in (0..positions.len()).tuple_combinations() {
                if bonded.contains(&(i, j)) {
                    continue;
                }
                let (energy, grad) = potentials::soft_repulsion(
                    &positions[i],
                    &positions[j],
                    p.repulsion_cutoff,
                    p.repulsion_k,
                );
                if energy > 0.0 {
                    total += energy;
                    sink(i, grad);
                    sink(j, -grad);
                }
            }
        }
        (total, per_term)
    }
}

impl ForceField for LayoutForcefield {
    fn energy(&self, positions: &[Point2<f64>], terms: &[PotentialTerm]) -> (f64, Vec<f64>) {
        self.evaluate(positions, terms, |_, _| {})
    }

    fn force(&self, positions: &[Point2<f64>], terms: &[PotentialTerm]) -> Vec<Vector2<f64>> {
        let mut forces = vec![Vector2::zeros(); positions.len()];
        self.evaluate(positions, terms, |idx, grad| forces[idx] -= grad);
        forces
    }
}
