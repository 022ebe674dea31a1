//! Core types shared by the ancestral selection graph crates.

use thiserror::Error;

mod active_set;
pub mod newtypes;
mod time;

pub use active_set::ActiveSet;
pub use newtypes::AlleleType;
pub use newtypes::LineageId;
pub use time::Time;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("could not convert {0} to a lineage id")]
    LineageIdError(i64),
    #[error("{0} is not an allele type, expected 0 or 1")]
    AlleleTypeError(i64),
    #[error("{0} is not a valid time")]
    TimeError(f64),
}
