//! Reporting utilities: formatted terminal output for fits, saved curves and FMEA tables.

pub mod format;

pub use format::*;
