//! Input/output for annotation formats and run traces.
//!
//! Annotation readers share the [`traits::AnnotationFile`] interface and resolve residue IDs
//! against a [`Sequence`](crate::core::models::sequence::Sequence). The [`trace`] writer
//! exports per-step statistics as CSV.

pub mod dotbracket;
pub mod pairing;
pub mod trace;
pub mod traits;
