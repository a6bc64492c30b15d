//! `weibull-fit` library crate.
//!
//! The binary (`wb`) is a thin wrapper around this library so that the
//! fitting core, curve sampling and persistence are testable without
//! spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod fmea;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
