use super::term::PotentialTerm;
use crate::core::models::annotation::{ChainAnnotation, InteractionKind, PairClass};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// A maximal run of stacked canonical pairs `(i, j), (i+1, j-1), ...`, outermost pair first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stem {
    pub pairs: Vec<(usize, usize)>,
}

impl Stem {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Restraint terms derived from one chain's annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedTerms {
    /// Backbone bonds, active for the whole run.
    pub base: Vec<PotentialTerm>,
    /// Double-stranded stems, longest first.
    pub closing: Vec<Stem>,
    /// Pair and stack terms in assembly order (3' index ascending, then 5' index descending).
    pub schedule: Vec<PotentialTerm>,
    /// Right-angle terms keeping each stem ladder-shaped.
    pub angles: Vec<PotentialTerm>,
}

pub struct Parameterizer {
    use_tertiary: bool,
}

impl Parameterizer {
    pub fn new(use_tertiary: bool) -> Self {
        Self { use_tertiary }
    }

    #[instrument(skip_all, fields(chain = %annotation.label, n = n))]
    pub fn derive(&self, annotation: &ChainAnnotation, n: usize) -> DerivedTerms {
        let base: Vec<PotentialTerm> = (1..n).map(|k| PotentialTerm::bond(k - 1, k)).collect();

        let mut schedule = Vec::new();
        let mut seen = HashSet::new();
        for x in annotation.interactions() {
            if x.i == x.j || x.j >= n {
                continue;
            }
            let term = match x.kind {
                InteractionKind::Pair(PairClass::Canonical) => {
                    PotentialTerm::pair(x.i, x.j, PairClass::Canonical)
                }
                InteractionKind::Pair(PairClass::NonCanonical) if self.use_tertiary => {
                    PotentialTerm::pair(x.i, x.j, PairClass::NonCanonical)
                }
                InteractionKind::Stack if self.use_tertiary && x.j - x.i > 1 => {
                    PotentialTerm::stack(x.i, x.j)
                }
                _ => continue,
            };
            if seen.insert(term) {
                schedule.push(term);
            }
        }
        schedule.sort_by_key(|t| {
            let idx = t.indices();
            (idx[1], std::cmp::Reverse(idx[0]), t.tag())
        });

        let canonical: Vec<(usize, usize)> = schedule
            .iter()
            .filter_map(|t| match *t {
                PotentialTerm::Pair {
                    i,
                    j,
                    class: PairClass::Canonical,
                } => Some((i, j)),
                _ => None,
            })
            .collect();
        let closing = find_stems(&canonical);
        let angles = stem_angles(&closing);

        debug!(
            bonds = base.len(),
            scheduled = schedule.len(),
            stems = closing.len(),
            angles = angles.len(),
            "Derived restraint terms."
        );
        DerivedTerms {
            base,
            closing,
            schedule,
            angles,
        }
    }
}

fn find_stems(pairs: &[(usize, usize)]) -> Vec<Stem> {
    let set: HashSet<(usize, usize)> = pairs.iter().copied().collect();
    let mut starts: Vec<(usize, usize)> = pairs
        .iter()
        .copied()
        .filter(|&(i, j)| i == 0 || !set.contains(&(i - 1, j + 1)))
        .collect();
    starts.sort_unstable();

    let mut stems: Vec<Stem> = starts
        .into_iter()
        .map(|(i, j)| {
            let mut stem = vec![(i, j)];
            let (mut a, mut b) = (i, j);
            while b > a + 2 && set.contains(&(a + 1, b - 1)) {
                a += 1;
                b -= 1;
                stem.push((a, b));
            }
            Stem { pairs: stem }
        })
        .collect();
    stems.sort_by(|x, y| y.len().cmp(&x.len()).then(x.pairs[0].cmp(&y.pairs[0])));
    stems
}

fn stem_angles(stems: &[Stem]) -> Vec<PotentialTerm> {
    let mut angles = Vec::new();
    for stem in stems {
        for window in stem.pairs.windows(2) {
            let ((i, j), (k, l)) = (window[0], window[1]);
            angles.push(PotentialTerm::angle(k, i, j));
            angles.push(PotentialTerm::angle(i, k, l));
            angles.push(PotentialTerm::angle(l, j, i));
            angles.push(PotentialTerm::angle(j, l, k));
        }
    }
    angles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::annotation::Interaction;

    fn chain(interactions: &[(usize, usize, &str)]) -> ChainAnnotation {
        let mut chain = ChainAnnotation::new("0");
        for &(i, j, code) in interactions {
            chain.insert(Interaction::new(i, j, code));
        }
        chain
    }

    #[test]
    fn base_terms_bond_every_sequence_neighbour() {
        let derived = Parameterizer::new(true).derive(&chain(&[]), 4);
        assert_eq!(
            derived.base,
            vec![
                PotentialTerm::bond(0, 1),
                PotentialTerm::bond(1, 2),
                PotentialTerm::bond(2, 3)
            ]
        );
        assert!(derived.schedule.is_empty());
        assert!(derived.angles.is_empty());
    }

    #[test]
    fn schedule_follows_assembly_order() {
        let annotation = chain(&[(0, 8, "WCc"), (1, 7, "WCc"), (2, 6, "WCc")]);
        let derived = Parameterizer::new(true).derive(&annotation, 9);
        assert_eq!(
            derived.schedule,
            vec![
                PotentialTerm::pair(2, 6, PairClass::Canonical),
                PotentialTerm::pair(1, 7, PairClass::Canonical),
                PotentialTerm::pair(0, 8, PairClass::Canonical),
            ]
        );
    }

    #[test]
    fn hairpin_forms_a_single_stem_with_ladder_angles() {
        let annotation = chain(&[(0, 8, "WCc"), (1, 7, "WCc"), (2, 6, "WCc")]);
        let derived = Parameterizer::new(true).derive(&annotation, 9);
        assert_eq!(derived.closing.len(), 1);
        assert_eq!(derived.closing[0].pairs, vec![(0, 8), (1, 7), (2, 6)]);
        assert_eq!(derived.angles.len(), 8);
        assert!(derived.angles.contains(&PotentialTerm::angle(1, 0, 8)));
        assert!(derived.angles.contains(&PotentialTerm::angle(7, 8, 0)));
    }

    #[test]
    fn stems_are_sorted_longest_first() {
        let annotation = chain(&[
            (0, 5, "WCc"),
            (8, 20, "WCc"),
            (9, 19, "WCc"),
            (10, 18, "WCc"),
        ]);
        let derived = Parameterizer::new(true).derive(&annotation, 21);
        assert_eq!(derived.closing.len(), 2);
        assert_eq!(derived.closing[0].len(), 3);
        assert_eq!(derived.closing[1].pairs, vec![(0, 5)]);
    }

    #[test]
    fn tertiary_contacts_can_be_excluded() {
        let annotation = chain(&[(0, 8, "WCc"), (3, 5, "WHt"), (2, 6, ">>"), (4, 5, ">>")]);

        let with = Parameterizer::new(true).derive(&annotation, 9);
        assert_eq!(with.schedule.len(), 3);
        assert!(with.schedule.contains(&PotentialTerm::stack(2, 6)));
        assert!(!with.schedule.contains(&PotentialTerm::stack(4, 5)));

        let without = Parameterizer::new(false).derive(&annotation, 9);
        assert_eq!(
            without.schedule,
            vec![PotentialTerm::pair(0, 8, PairClass::Canonical)]
        );
    }

    #[test]
    fn contacts_outside_the_sequence_are_dropped() {
        let annotation = chain(&[(0, 12, "WCc"), (1, 1, "WCc")]);
        let derived = Parameterizer::new(true).derive(&annotation, 9);
        assert!(derived.schedule.is_empty());
    }
}
