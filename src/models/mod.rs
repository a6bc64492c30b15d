//! Weibull model evaluation.
//!
//! Models are implemented as small, pure functions so that fitting and export
//! code can stay generic.

pub mod curve;
pub mod weibull;

pub use curve::*;
pub use weibull::*;
