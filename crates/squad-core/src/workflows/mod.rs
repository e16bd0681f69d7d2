//! # Workflows Module
//!
//! High-level entry points that run a complete squad optimization for a caller.
//!
//! ## Overview
//!
//! A workflow takes a request and a capability provider, builds and solves the model
//! through the [`engine`](crate::engine) layer, and always returns a result: solver
//! failures and timeouts degrade to a deterministic fallback assignment instead of an
//! error.
//!
//! - **Optimize Workflow** ([`optimize`]) - Build assignment and sub-group partitioning
//!   with live incumbent reporting

pub mod optimize;
