//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML override file (loader.rs)
//!     → .env file + process environment (loader.rs)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; there is no reload path
//! - All fields have defaults so the service starts with no configuration
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, load_settings_from, ConfigError};
pub use schema::{ConsoleFormat, LogSettings, Settings};
pub use validation::ValidationError;
