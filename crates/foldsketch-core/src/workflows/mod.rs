//! # Workflows Module
//!
//! End-to-end entry points that tie the [`core`](crate::core) models and the
//! [`engine`](crate::engine) together.
//!
//! - **Draw Workflow** ([`draw`]) - Loads annotations, lays out each chain with the annealing
//!   driver, renders intermediate and final snapshots and writes the run report.

pub mod draw;
