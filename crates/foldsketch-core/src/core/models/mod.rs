//! Data models for the sequence being drawn and the structural annotation that drives its
//! layout.
//!
//! - [`sequence`] - One-letter sequence with residue ID numbering (gaps for missing residues)
//! - [`annotation`] - Base-pair and stacking contacts grouped per chain

pub mod annotation;
pub mod sequence;
