//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! - **Models** ([`models`]) - Identifiers, players, the build catalogue, requests and results
//! - **Capabilities** ([`capability`]) - Boons, capability vectors and the provider seam
//! - **Synergy** ([`synergy`]) - Specialization-pair bonuses resolved against a catalogue

pub mod capability;
pub mod models;
pub mod synergy;
