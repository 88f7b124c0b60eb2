//! # Force Field Module
//!
//! Restraint terms, their derivation from annotations and the energy model that scores a 2D
//! layout.
//!
//! ## Key Components
//!
//! - [`term`] - The [`PotentialTerm`](term::PotentialTerm) restraint variants and their summary value
//! - [`parameterization`] - Derives backbone, stem, scheduled and angle terms from a chain annotation
//! - [`field`] - The [`ForceField`](field::ForceField) interface and the default harmonic implementation
//! - [`params`] - Distances and force constants, loadable from TOML
//!
//! ## Usage
//!
//! ```ignore
//! use foldsketch::core::forcefield::field::{ForceField, LayoutForcefield};
//!
//! let ff = LayoutForcefield::new(params);
//! let (energy, per_term) = ff.energy(&positions, &terms);
//! let forces = ff.force(&positions, &terms);
//! ```

pub mod field;
pub mod parameterization;
pub mod params;
pub(crate) mod potentials;
pub mod term;
