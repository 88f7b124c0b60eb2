//! # FoldSketch Core Library
//!
//! Turns nucleic-acid base-pairing and stacking annotations into 2D secondary-structure
//! diagrams by annealed energy minimization.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Sequence and annotation models, annotation file readers,
//!   the restraint force field and the SVG renderer. Stateless.
//!
//! - **[`engine`]: The Logic Core.** Starting geometry, constraint scheduling and the annealing
//!   driver with its adaptive step control, plus configuration, reporting and progress events.
//!
//! - **[`workflows`]: The Public API.** The draw workflow that runs the engine once per chain
//!   and collects snapshots and the text report.

pub mod core;
pub mod engine;
pub mod workflows;
