//! Property sources for the layered settings system
//!
//! Each source yields a nested TOML table. [`SettingsBuilder`](crate::SettingsBuilder)
//! merges them in priority order (environment variables > TOML files > in-memory defaults).

use crate::error::{SettingsError, SettingsResult};
use std::fs;
use std::path::PathBuf;
use toml::{Table, Value};

/// Trait for property sources
pub trait PropertySource: Send + Sync {
	/// Load the properties provided by this source
	fn load(&self) -> SettingsResult<Table>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Environment variable property source
///
/// Variables are matched against the prefix, the prefix is stripped, the rest
/// is lower-cased and split into nested tables on `__`:
/// `BEANSTALK_PROPERTIES__APP__NAME` becomes `properties.app.name`.
///
/// Values under `container` are typed like TOML scalars so they deserialize
/// into [`ContainerSettings`](crate::ContainerSettings); every other value is
/// kept as the exact string from the environment.
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	/// Default prefix used by [`EnvSource::default`].
	pub const DEFAULT_PREFIX: &'static str = "BEANSTALK_";

	/// Create a new environment variable source with the given prefix
	///
	/// # Examples
	///
	/// ```
	/// use beanstalk_conf::EnvSource;
	///
	/// let source = EnvSource::new("APP_");
	/// ```
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	/// Build the nested table from an explicit list of variables.
	fn collect(&self, vars: impl IntoIterator<Item = (String, String)>) -> SettingsResult<Table> {
		let mut table = Table::new();
		for (key, value) in vars {
			let Some(stripped) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let path: Vec<String> = stripped
				.to_lowercase()
				.split("__")
				.map(str::to_string)
				.collect();
			if path.iter().any(String::is_empty) {
				tracing::warn!("Ignoring malformed environment variable: {}", key);
				continue;
			}
			// Properties stay verbatim; literal conversion types them later
			let value = if path[0] == "container" {
				parse_env_value(&value)
			} else {
				Value::String(value)
			};
			insert_path(&mut table, &path, value)?;
		}
		Ok(table)
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new(Self::DEFAULT_PREFIX)
	}
}

impl PropertySource for EnvSource {
	fn load(&self) -> SettingsResult<Table> {
		self.collect(std::env::vars())
	}

	fn priority(&self) -> u8 {
		100 // Highest priority
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

/// Interpret a `container` environment value the way a TOML scalar would be read.
fn parse_env_value(value: &str) -> Value {
	if let Ok(num) = value.parse::<i64>() {
		Value::Integer(num)
	} else if let Ok(b) = value.parse::<bool>() {
		Value::Boolean(b)
	} else if let Ok(f) = value.parse::<f64>() {
		Value::Float(f)
	} else {
		Value::String(value.to_string())
	}
}

fn insert_path(table: &mut Table, path: &[String], value: Value) -> SettingsResult<()> {
	let (last, parents) = path
		.split_last()
		.ok_or_else(|| SettingsError::Parse("empty property path".to_string()))?;
	let mut current = table;
	for segment in parents {
		let entry = current
			.entry(segment.clone())
			.or_insert_with(|| Value::Table(Table::new()));
		current = match entry {
			Value::Table(inner) => inner,
			_ => {
				return Err(SettingsError::Parse(format!(
					"'{}' is both a value and a table",
					segment
				)));
			}
		};
	}
	current.insert(last.clone(), value);
	Ok(())
}

/// TOML file property source
///
/// A missing file yields an empty table so optional settings files can be
/// layered without existence checks.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Create a new TOML file property source
	///
	/// # Examples
	///
	/// ```
	/// use beanstalk_conf::TomlFileSource;
	///
	/// let source = TomlFileSource::new("beanstalk.toml");
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl PropertySource for TomlFileSource {
	fn load(&self) -> SettingsResult<Table> {
		if !self.path.exists() {
			tracing::debug!("Settings file not found, skipping: {}", self.path.display());
			return Ok(Table::new());
		}

		let content = fs::read_to_string(&self.path)?;
		Ok(toml::from_str(&content)?)
	}

	fn priority(&self) -> u8 {
		50 // Medium priority
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// In-memory property source, mostly used for defaults and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	table: Table,
	priority: u8,
}

impl MemorySource {
	/// Create an empty in-memory source with the lowest priority
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse a TOML document into an in-memory source
	///
	/// # Examples
	///
	/// ```
	/// use beanstalk_conf::{MemorySource, PropertySource};
	///
	/// let source = MemorySource::from_toml_str("[properties]\nname = \"jack\"").unwrap();
	/// assert!(source.load().unwrap().contains_key("properties"));
	/// ```
	pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
		Ok(Self {
			table: toml::from_str(content)?,
			priority: 0,
		})
	}

	/// Add a property under the `properties` table, using a dotted key
	///
	/// # Examples
	///
	/// ```
	/// use beanstalk_conf::{MemorySource, PropertySource};
	///
	/// let source = MemorySource::new().with_property("app.name", "demo");
	/// let table = source.load().unwrap();
	/// assert_eq!(table["properties"]["app"]["name"].as_str(), Some("demo"));
	/// ```
	pub fn with_property(mut self, key: &str, value: impl Into<String>) -> Self {
		let mut path = vec!["properties".to_string()];
		path.extend(key.split('.').map(str::to_string));
		// Conflicting shapes only arise from programmer error; keep the first value.
		if let Err(e) = insert_path(&mut self.table, &path, Value::String(value.into())) {
			tracing::warn!("Ignoring property '{}': {}", key, e);
		}
		self
	}

	/// Override the priority of this source
	pub fn with_priority(mut self, priority: u8) -> Self {
		self.priority = priority;
		self
	}
}

impl PropertySource for MemorySource {
	fn load(&self) -> SettingsResult<Table> {
		Ok(self.table.clone())
	}

	fn priority(&self) -> u8 {
		self.priority
	}

	fn description(&self) -> String {
		format!("In-memory properties (priority: {})", self.priority)
	}
}
