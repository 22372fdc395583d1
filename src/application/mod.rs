//! Application layer: editing session, export and scripted edits
//!
//! This layer drives the domain; it owns the mutable session state.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
