//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - fitted parameters and fit inputs (`WeibullParameters`, `CalibrationPoint`, `LifetimeSample`)
//! - curve selection enums (`CurveType`, `ExportKind`) and grid settings (`GridConfig`)
//! - curve outputs (`CurveSeries`, `ExportTable`) and saved-curve records (`SavedCurve`)

pub mod types;

pub use types::*;
