//! The crate prelude
//!
//! # Example
//! ```
//! use asgsim::prelude::*;
//! ```

pub use asgsim_core::newtypes::*;
pub use asgsim_core::Time;
pub use asgsim_genetics::TwoStateMutation;

pub use crate::AnnotatedHistory;
pub use crate::AsgError;
pub use crate::Event;
pub use crate::EventHistory;
pub use crate::ExactLikelihood;
pub use crate::ModelParameters;
pub use crate::ModelParametersBuilder;
