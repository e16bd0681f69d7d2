//! # Engine Module
//!
//! The optimization engine: it turns a squad-composition request into an integer model,
//! hands that model to a pluggable solver under a wall-clock budget, and decodes the
//! outcome (or a deterministic fallback) back into group assignments.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Solver worker count, seeding and exhaustive-search limits
//! - **Solver Port** ([`model`], [`solver`]) - A solver-agnostic integer model and the
//!   `Solver` trait, with a bundled parallel local-search adapter
//! - **Model Builder** ([`builder`]) - Decision, linking, saturation and penalty variables
//! - **Solver Driver** ([`driver`]) - Time-boxed solve with incumbent streaming; never fails
//! - **Solution Extractor** ([`extract`]) - Solved or round-robin fallback assignments
//! - **Coverage Calculator** ([`coverage`]) - Per-group boon coverage and normalized score
//! - **Progress Monitoring** ([`progress`]) - Phase events and incumbent snapshots
//! - **Error Handling** ([`error`]) - Engine-internal error types

pub mod builder;
pub mod config;
pub mod coverage;
pub mod driver;
pub mod error;
pub mod extract;
pub mod model;
pub mod progress;
pub mod roster;
pub mod solver;
