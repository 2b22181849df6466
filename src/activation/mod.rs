//! ACT spreading activation.
//!
//! - [`transfer`]: pairwise transfer activation `f(x, y)`
//! - [`rate`]: pattern-matrix assembly and the equilibrium solve

pub mod rate;
pub mod transfer;

pub use rate::{activation_pattern, activation_rate, ActivationRate};
pub use transfer::transfer_activation;
