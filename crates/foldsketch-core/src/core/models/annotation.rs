use phf::phf_map;
use std::collections::HashMap;
use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Annotation length {found} does not match sequence length {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Residue ID {id} in annotation is not part of the sequence")]
    UnknownResidue { id: i64 },

    #[error("Annotation files have different numbers of frames ({expected} vs {found})")]
    InconsistentFrames { expected: usize, found: usize },

    #[error("Annotation files describe different chains ({expected:?} vs {found:?})")]
    InconsistentChains {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("No annotation frames found")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairClass {
    /// Watson-Crick and G-U wobble pairs.
    Canonical,
    NonCanonical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Pair(PairClass),
    Stack,
}

impl InteractionKind {
    /// Classifies an annotation code. Unknown codes are non-canonical pairs.
    pub fn from_code(code: &str) -> Self {
        KNOWN_CODES
            .get(code)
            .copied()
            .unwrap_or(InteractionKind::Pair(PairClass::NonCanonical))
    }

    pub fn is_stack(&self) -> bool {
        matches!(self, InteractionKind::Stack)
    }

    pub fn is_canonical_pair(&self) -> bool {
        matches!(self, InteractionKind::Pair(PairClass::Canonical))
    }
}

static KNOWN_CODES: phf::Map<&'static str, InteractionKind> = phf_map! {
    ">>" => InteractionKind::Stack,
    "<<" => InteractionKind::Stack,
    "<>" => InteractionKind::Stack,
    "><" => InteractionKind::Stack,
    "WCc" => InteractionKind::Pair(PairClass::Canonical),
    "GUc" => InteractionKind::Pair(PairClass::Canonical),
};

/// A single annotated contact between two residues, stored with `i < j` in sequence indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub i: usize,
    pub j: usize,
    pub kind: InteractionKind,
    pub code: String,
    /// Fraction of annotated frames in which the contact was observed.
    pub frequency: f64,
}

impl Interaction {
    pub fn new(a: usize, b: usize, code: &str) -> Self {
        let (i, j) = if a <= b { (a, b) } else { (b, a) };
        Self {
            i,
            j,
            kind: InteractionKind::from_code(code),
            code: code.to_string(),
            frequency: 1.0,
        }
    }

    pub fn with_kind(a: usize, b: usize, kind: InteractionKind, code: &str) -> Self {
        let mut interaction = Self::new(a, b, code);
        interaction.kind = kind;
        interaction
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    fn key(&self) -> (usize, usize, bool) {
        (self.i, self.j, self.kind.is_stack())
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} {}", self.i, self.j, self.code)
    }
}

/// Annotated contacts of one chain, kept in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainAnnotation {
    pub label: String,
    interactions: Vec<Interaction>,
}

impl ChainAnnotation {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            interactions: Vec::new(),
        }
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Adds an interaction, replacing an earlier one between the same residues and of the same
    /// pair/stack family.
    pub fn insert(&mut self, interaction: Interaction) {
        let key = interaction.key();
        match self.interactions.iter_mut().find(|x| x.key() == key) {
            Some(existing) => *existing = interaction,
            None => self.interactions.push(interaction),
        }
    }

    /// Base pairs (not stacking contacts) as `(i, j)` index tuples.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.interactions
            .iter()
            .filter(|x| !x.kind.is_stack())
            .map(|x| (x.i, x.j))
            .collect()
    }

    pub fn merge(&mut self, other: ChainAnnotation) {
        for interaction in other.interactions {
            self.insert(interaction);
        }
    }
}

/// Per-chain annotations read from one or more annotation files.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSet {
    pub chains: Vec<ChainAnnotation>,
    pub n_frames: usize,
}

impl AnnotationSet {
    pub fn new(chains: Vec<ChainAnnotation>, n_frames: usize) -> Self {
        Self { chains, n_frames }
    }

    pub fn chain_labels(&self) -> Vec<String> {
        self.chains.iter().map(|c| c.label.clone()).collect()
    }

    /// Merges another annotation set into this one. Both must agree on frame count and chains.
    pub fn merge(&mut self, other: AnnotationSet) -> Result<(), AnnotationError> {
        if self.n_frames != other.n_frames {
            return Err(AnnotationError::InconsistentFrames {
                expected: self.n_frames,
                found: other.n_frames,
            });
        }
        let expected = self.chain_labels();
        let found = other.chain_labels();
        if expected != found {
            return Err(AnnotationError::InconsistentChains { expected, found });
        }

        let mut by_label: HashMap<String, ChainAnnotation> = other
            .chains
            .into_iter()
            .map(|c| (c.label.clone(), c))
            .collect();
        for chain in &mut self.chains {
            if let Some(incoming) = by_label.remove(&chain.label) {
                chain.merge(incoming);
            }
        }
        Ok(())
    }
}
