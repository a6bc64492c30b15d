//! Parameter fitting.
//!
//! Each input mode produces a `WeibullParameters` pair:
//!
//! - `points`: three (age, cumulative probability) pairs, closed form plus refinement
//! - `mle`: maximum likelihood over a lifetime sample
//! - `guided`: questionnaire answers mapped to a shape
//!
//! Direct parameter input needs no fitting and goes through `WeibullParameters::new`.

pub mod guided;
pub mod likelihood;
pub mod mle;
pub mod points;

pub use guided::*;
pub use likelihood::*;
pub use mle::*;
pub use points::*;
