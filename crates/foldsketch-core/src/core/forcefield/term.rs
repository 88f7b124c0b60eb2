use crate::core::models::annotation::PairClass;
use std::fmt;

/// A geometric restraint between residues, addressed by sequence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PotentialTerm {
    Pair { i: usize, j: usize, class: PairClass },
    Stack { i: usize, j: usize },
    /// Angle at vertex `b` between the arms towards `a` and `c`.
    Angle { a: usize, b: usize, c: usize },
    /// Backbone connectivity between sequence neighbours.
    Bond { i: usize, j: usize },
}

impl PotentialTerm {
    pub const PAIR_TAG: usize = 0;
    pub const STACK_TAG: usize = 1;
    pub const ANGLE_TAG: usize = 2;
    pub const BOND_TAG: usize = 3;

    pub fn pair(i: usize, j: usize, class: PairClass) -> Self {
        PotentialTerm::Pair { i, j, class }
    }

    pub fn stack(i: usize, j: usize) -> Self {
        PotentialTerm::Stack { i, j }
    }

    pub fn angle(a: usize, b: usize, c: usize) -> Self {
        PotentialTerm::Angle { a, b, c }
    }

    pub fn bond(i: usize, j: usize) -> Self {
        PotentialTerm::Bond { i, j }
    }

    pub fn tag(&self) -> usize {
        match self {
            PotentialTerm::Pair { .. } => Self::PAIR_TAG,
            PotentialTerm::Stack { .. } => Self::STACK_TAG,
            PotentialTerm::Angle { .. } => Self::ANGLE_TAG,
            PotentialTerm::Bond { .. } => Self::BOND_TAG,
        }
    }

    pub fn indices(&self) -> Vec<usize> {
        match *self {
            PotentialTerm::Pair { i, j, .. }
            | PotentialTerm::Stack { i, j }
            | PotentialTerm::Bond { i, j } => vec![i, j],
            PotentialTerm::Angle { a, b, c } => vec![a, b, c],
        }
    }

    pub fn touches(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }

    /// Tag plus the sum of the residue indices.
    ///
    /// Used as a cheap identity when deciding whether consecutive activations belong together;
    /// structurally different terms can share a summary.
    pub fn summary(&self) -> usize {
        self.tag() + self.indices().iter().sum::<usize>()
    }
}

impl fmt::Display for PotentialTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PotentialTerm::Pair { i, j, class } => match class {
                PairClass::Canonical => write!(f, "pair({}, {})", i, j),
                PairClass::NonCanonical => write!(f, "tertiary({}, {})", i, j),
            },
            PotentialTerm::Stack { i, j } => write!(f, "stack({}, {})", i, j),
            PotentialTerm::Angle { a, b, c } => write!(f, "angle({}, {}, {})", a, b, c),
            PotentialTerm::Bond { i, j } => write!(f, "bond({}, {})", i, j),
        }
    }
}
