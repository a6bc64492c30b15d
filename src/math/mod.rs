//! Mathematical utilities: least squares, bounded simplex search, sample statistics.

pub mod nelder_mead;
pub mod ols;
pub mod stats;

pub use nelder_mead::*;
pub use ols::*;
pub use stats::*;
