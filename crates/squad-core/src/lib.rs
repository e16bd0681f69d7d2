//! # squadopt Core Library
//!
//! A time-boxed optimizer for squad composition: given a roster of players and a
//! catalogue of role templates ("builds"), it jointly assigns one build to every
//! player and partitions the roster into sub-groups of at most five, maximizing
//! per-group boon coverage, might stacking, damage and sustain.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Player`, `BuildCatalogue`,
//!   `OptimizationRequest`, `OptimizationResult`), boon capability vectors and the
//!   `CapabilityProvider` seam, plus the static synergy table.
//!
//! - **[`engine`]: The Logic Core.** A solver-agnostic integer model (`Model`), the
//!   `Solver` port with a bundled local-search adapter, and the components that translate
//!   a request into a model and a solved model back into group assignments.
//!
//! - **[`workflows`]: The Public API.** [`workflows::optimize::run`] ties everything
//!   together. It never fails: when the solver cannot deliver, a deterministic fallback
//!   assignment is returned instead.

pub mod core;
pub mod engine;
pub mod workflows;
