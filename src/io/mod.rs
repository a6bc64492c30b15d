//! Input/output helpers.
//!
//! - asset CSV ingest (`ingest`)
//! - export table CSV (`export`)
//! - saved-curve JSON store (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
