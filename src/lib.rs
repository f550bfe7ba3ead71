//! saju - Four Pillars calculator
//!
//! Converts a Gregorian birth date and hour into the sexagenary "four
//! pillars" (year, month, day, hour stem/branch pairs), derives the element
//! balance and stem/branch relations, and renders narrative text keyed by
//! the dominant element. It is designed to be consumed by:
//! - The CLI binary (src/bin/saju.rs)
//! - An HTTP backend (`server` feature)
//! - A blocking HTTP client for that backend (`remote` feature)
//! - WASM bindings (`wasm` feature)
//!
//! # Architecture
//!
//! This crate follows the "Library-First" pattern:
//! - **core**: Pure pipeline, no CLI or transport concerns
//! - **bin/saju.rs**: Thin wrapper that calls the library
//!
//! # Example
//!
//! ```
//! use saju::{BirthForm, ContentStore, SajuConfig, SajuEngine};
//!
//! let engine = SajuEngine::new(SajuConfig::default(), ContentStore::embedded().unwrap());
//! let reading = engine.calculate(&BirthForm::new(1990, 5, 15, 14u8)).unwrap();
//! assert_eq!(reading.pillars.to_string(), "庚午 庚午 乙巳 辛未");
//! ```

pub mod core;

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "remote")]
pub mod remote;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use crate::core::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the version of the saju library
pub fn version() -> &'static str {
    VERSION
}
