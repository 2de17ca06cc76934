pub mod config;
pub mod engine;
pub mod error;
pub mod rules;

pub use config::GanglionConfig;
pub use error::{ConfigError, GanglionError};
