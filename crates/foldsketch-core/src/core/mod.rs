//! # Core Module
//!
//! Stateless building blocks for drawing nucleic-acid secondary structure: the input models,
//! file formats, the restraint force field and the diagram renderer.
//!
//! ## Architecture
//!
//! - **Input Models** ([`models`]) - Residue sequence numbering and per-chain contact annotations
//! - **File I/O** ([`io`]) - Dot-bracket and pairing/stacking readers, CSV trace export
//! - **Energy Model** ([`forcefield`]) - Restraint terms, their derivation and the layout force field
//! - **Rendering** ([`render`]) - SVG diagrams of a finished or in-progress layout
//!
//! Nothing here holds state across a run; the minimization loop lives in
//! [`engine`](crate::engine).

pub mod forcefield;
pub mod io;
pub mod models;
pub mod render;
