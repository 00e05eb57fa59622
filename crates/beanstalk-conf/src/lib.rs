//! # Beanstalk Configuration
//!
//! Layered property sources and container settings for Beanstalk.
//!
//! Settings are assembled from [`PropertySource`]s merged in priority order
//! (environment variables > TOML files > in-memory defaults). The merged
//! document has two recognized tables:
//!
//! - `[container]` - options for the application context itself
//!   ([`ContainerSettings`])
//! - `[properties]` - free-form values, flattened into dotted keys and used to
//!   resolve `${key}` placeholders in literal field values
//!
//! ## Example
//!
//! ```rust
//! use beanstalk_conf::{EnvSource, MemorySource, Settings};
//!
//! let settings = Settings::builder()
//!     .add_source(MemorySource::new().with_property("app.name", "demo"))
//!     .add_source(EnvSource::new("MYAPP_"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(settings.interpolate("${app.name}").unwrap(), "demo");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod settings;
pub mod sources;

pub use error::{SettingsError, SettingsResult};
pub use settings::{ContainerSettings, DEFAULT_MAX_RESOLUTION_DEPTH, Settings, SettingsBuilder};
pub use sources::{EnvSource, MemorySource, PropertySource, TomlFileSource};
