use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Sequence is empty")]
    Empty,
    #[error("Invalid residue code '{code}' at position {position}")]
    InvalidCode { code: char, position: usize },
}

/// A one-letter nucleic-acid sequence together with the residue IDs assigned to it.
///
/// Residue IDs start at a caller-supplied first ID and skip any ID listed as missing,
/// so the index of a residue in the sequence and its ID can diverge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    letters: Vec<char>,
    residue_ids: Vec<i64>,
    index_by_id: HashMap<i64, usize>,
}

impl Sequence {
    pub fn new(letters: &str, first_id: i64, missing: &[i64]) -> Result<Self, SequenceError> {
        let letters: Vec<char> = letters.trim().chars().collect();
        if letters.is_empty() {
            return Err(SequenceError::Empty);
        }
        if let Some((position, &code)) = letters
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_alphabetic())
        {
            return Err(SequenceError::InvalidCode { code, position });
        }

        let missing: HashSet<i64> = missing.iter().copied().collect();
        let mut residue_ids = Vec::with_capacity(letters.len());
        let mut next_id = first_id;
        for _ in &letters {
            while missing.contains(&next_id) {
                next_id += 1;
            }
            residue_ids.push(next_id);
            next_id += 1;
        }

        let index_by_id = residue_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        Ok(Self {
            letters,
            residue_ids,
            index_by_id,
        })
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    pub fn residue_ids(&self) -> &[i64] {
        &self.residue_ids
    }

    pub fn letter(&self, index: usize) -> Option<char> {
        self.letters.get(index).copied()
    }

    pub fn residue_id(&self, index: usize) -> Option<i64> {
        self.residue_ids.get(index).copied()
    }

    /// Sequence index of the residue carrying `id`, if any.
    pub fn index_of(&self, id: i64) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    pub fn nucleotide(&self, id: i64) -> Option<char> {
        self.index_of(id).map(|idx| self.letters[idx])
    }

    pub fn as_string(&self) -> String {
        self.letters.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_assigns_consecutive_ids_from_first_id() {
        let seq = Sequence::new("GGGAAACCC", 1, &[]).unwrap();
        assert_eq!(seq.len(), 9);
        assert_eq!(seq.residue_ids(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(seq.index_of(9), Some(8));
    }

    #[test]
    fn new_skips_missing_ids() {
        let seq = Sequence::new("ACGU", 10, &[11, 12, 14]).unwrap();
        assert_eq!(seq.residue_ids(), &[10, 13, 15, 16]);
        assert_eq!(seq.nucleotide(13), Some('C'));
        assert_eq!(seq.index_of(11), None);
    }

    #[test]
    fn missing_ids_before_first_id_are_ignored() {
        let seq = Sequence::new("AC", 5, &[1, 2]).unwrap();
        assert_eq!(seq.residue_ids(), &[5, 6]);
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert_eq!(Sequence::new("  ", 1, &[]), Err(SequenceError::Empty));
    }

    #[test]
    fn non_letter_codes_are_rejected() {
        let err = Sequence::new("AC-G", 1, &[]).unwrap_err();
        assert_eq!(
            err,
            SequenceError::InvalidCode {
                code: '-',
                position: 2
            }
        );
    }

    #[test]
    fn as_string_round_trips_letters() {
        let seq = Sequence::new("GGAC", 1, &[]).unwrap();
        assert_eq!(seq.as_string(), "GGAC");
        assert_eq!(seq.letter(3), Some('C'));
        assert_eq!(seq.residue_id(4), None);
    }
}
