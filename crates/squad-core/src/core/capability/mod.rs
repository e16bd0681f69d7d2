//! Boons, per-build capability vectors, and the provider seam that supplies them.

pub mod boon;
pub mod provider;
pub mod vector;

pub use boon::Boon;
pub use provider::{CapabilityLoadError, CapabilityProvider, CapabilityTable};
pub use vector::CapabilityVector;
