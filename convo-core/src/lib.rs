//! Core types for convo
//!
//! This crate owns the conversation session store, the context projection
//! handed to reply generators, and the configuration and logging shared by
//! the other convo crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod utils;

pub use error::{Error, Result};
