#![warn(missing_docs)]

//! Rust library for simulating the ancestral
//! selection graph and computing exact likelihoods
//! of samples of two allelic types.
//!
//! # Overview
//!
//! * [`simulate`] generates an [`EventHistory`] of the dual
//!   (coalescing and branching) process.
//! * [`overlay`] places neutral mutations on a history and
//!   [`project`] reads off the resulting sample.
//! * [`likelihood`] gives the exact probability of a sample
//!   given a history, and [`empirical_likelihood`] estimates the
//!   same quantity by simulation.
//!
//! # Example
//!
//! ```
//! use asgsim::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(54321);
//! let history = asgsim::simulate(3, 0.5, &mut rng).unwrap();
//! let annotated = asgsim::overlay(&history, 0.25, &mut rng).unwrap();
//! let sample = asgsim::project(&annotated, AlleleType::Advantaged).unwrap();
//! let p = asgsim::likelihood(&sample, &history, 0.25, AlleleType::Advantaged).unwrap();
//! assert!(p > 0.0 && p <= 1.0);
//! ```

mod error;
mod history;
mod likelihood;
mod monte_carlo;
mod overlay;
mod parameters;
pub mod prelude;
mod projection;
mod simulate;

pub use asgsim_core::{AlleleType, LineageId, Time};
pub use error::AsgError;
pub use history::{Branch, Event, EventHistory, Parentage};
pub use likelihood::{likelihood, unconditional_likelihood, ExactLikelihood};
pub use monte_carlo::empirical_likelihood;
pub use overlay::{overlay, AnnotatedHistory};
pub use parameters::{LikelihoodComparison, ModelParameters, ModelParametersBuilder};
pub use projection::project;
pub use simulate::simulate;

/// Get the asgsim version number.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
