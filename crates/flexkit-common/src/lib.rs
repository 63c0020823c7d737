//! # FlexKit Common
//!
//! Shared setup for FlexKit binaries, benches and test harnesses.
//!
//! ## Features
//!
//! - Log level, format and filter configuration
//! - `tracing-subscriber` installation with `RUST_LOG` support

pub mod logging;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
