//! Core functionality for Rinth

pub mod config;
pub mod engine;
pub mod error;

pub use config::Config;
pub use engine::Engine;
pub use error::{RinthError, RinthResult};
