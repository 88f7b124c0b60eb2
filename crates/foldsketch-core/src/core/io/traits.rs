use crate::core::models::annotation::{AnnotationError, AnnotationSet};
use crate::core::models::sequence::Sequence;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading structural annotation formats.
///
/// Implementors turn a text annotation into per-chain contacts expressed in sequence
/// indices of `sequence`.
pub trait AnnotationFile {
    /// Reads an annotation set from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed or refers to residues that are not part
    /// of `sequence`.
    fn read_from(
        reader: &mut impl BufRead,
        sequence: &Sequence,
    ) -> Result<AnnotationSet, AnnotationError>;

    /// Reads an annotation set from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        sequence: &Sequence,
    ) -> Result<AnnotationSet, AnnotationError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, sequence)
    }
}
