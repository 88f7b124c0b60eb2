//! # Engine Module
//!
//! The stateful side of a layout run: picking the starting geometry, switching restraint terms
//! on over time and driving the annealed descent until the layout settles.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Temperature, step count, step-size control and snapshot settings
//! - **Starting Layout** ([`geometry`]) - Circle or line initialisation chosen from the contact set
//! - **Constraint Scheduling** ([`schedule`]) - Immediate or phased activation of restraint terms
//! - **Minimization** ([`annealing`]) - The annealing driver and its adaptive step control
//! - **State Tracking** ([`state`]) - Per-chain layout state, step records and results
//! - **Reporting** ([`report`]) - The text report sink and its line formats
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error type
//!
//! Runs are single-threaded. The only source of randomness is the generator handed to
//! [`annealing::AnnealingDriver::run`].

pub mod annealing;
pub mod config;
pub mod error;
pub mod geometry;
pub mod progress;
pub mod report;
pub mod schedule;
pub mod state;
