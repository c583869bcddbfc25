//! Core types shared across the crate.
//!
//! Currently this is the error module; everything else lives with the
//! component that owns it.

pub mod error;

pub use error::{Result, SnipstackError};
