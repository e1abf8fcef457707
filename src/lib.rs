//! arkchat - clinical-reasoning chat relay for the KIN508 course
//!
//! This library provides the core functionality for the arkchat server:
//! configuration, the completion provider seam, the relay handler that
//! prepends the ARK system prompt, and the HTTP surface.

pub mod config;
pub mod error;
pub mod provider;
pub mod proxy;
pub mod relay;

pub use config::Config;
pub use error::{Error, Result};
