//! # NOVA Shared
//!
//! Common types used by every NOVA crate.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on rendering, audio or asset crates.
//! If you need those, put them behind a trait in `nova_fx`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{MAX_FILENAME_LEN, MAX_OBJECTS, NAME_LENGTH};
pub use math::{Matrix3, Vec3};
