//! Merged settings and placeholder interpolation.

use crate::error::{SettingsError, SettingsResult};
use crate::sources::{MemorySource, PropertySource, TomlFileSource};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use toml::{Table, Value};

/// Default bound on nested on-demand resolutions.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 100;

/// Options for the container itself, read from the `[container]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
	/// Maximum nesting of on-demand bean resolution before the container
	/// reports a runaway dependency chain.
	pub max_resolution_depth: usize,
	/// When `true`, a `${key}` placeholder without default and without a
	/// matching property fails instead of being left verbatim.
	pub strict_placeholders: bool,
}

impl Default for ContainerSettings {
	fn default() -> Self {
		Self {
			max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
			strict_placeholders: true,
		}
	}
}

/// Settings consumed by an application context.
///
/// `properties` holds every leaf of the `[properties]` table flattened into
/// dotted keys, in document order.
#[derive(Debug, Clone, Default)]
pub struct Settings {
	/// Container options.
	pub container: ContainerSettings,
	properties: IndexMap<String, String>,
}

impl Settings {
	/// Start a layered settings build.
	pub fn builder() -> SettingsBuilder {
		SettingsBuilder::new()
	}

	/// Parse settings from a TOML document.
	///
	/// # Examples
	///
	/// ```
	/// use beanstalk_conf::Settings;
	///
	/// let settings = Settings::from_toml_str(
	///     r#"
	/// [container]
	/// max_resolution_depth = 32
	///
	/// [properties]
	/// app.name = "demo"
	/// "#,
	/// )
	/// .unwrap();
	/// assert_eq!(settings.container.max_resolution_depth, 32);
	/// assert_eq!(settings.property("app.name"), Some("demo"));
	/// ```
	pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
		SettingsBuilder::new()
			.add_source(MemorySource::from_toml_str(content)?)
			.build()
	}

	/// Read settings from a TOML file that must exist.
	pub fn from_file(path: impl AsRef<Path>) -> SettingsResult<Self> {
		let path = path.as_ref();
		if !path.exists() {
			return Err(SettingsError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("settings file not found: {}", path.display()),
			)));
		}
		SettingsBuilder::new()
			.add_source(TomlFileSource::new(path))
			.build()
	}

	/// Look up a flattened property.
	pub fn property(&self, key: &str) -> Option<&str> {
		self.properties.get(key).map(String::as_str)
	}

	/// All flattened properties, in source order.
	pub fn properties(&self) -> &IndexMap<String, String> {
		&self.properties
	}

	/// Set a property directly, replacing any value loaded from a source.
	pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.properties.insert(key.into(), value.into());
	}

	/// Replace `${key}` and `${key:default}` placeholders in `raw`.
	///
	/// An unterminated `${` is kept as-is. A placeholder with no matching
	/// property and no default fails under `strict_placeholders`, and is kept
	/// verbatim otherwise.
	///
	/// # Examples
	///
	/// ```
	/// use beanstalk_conf::Settings;
	///
	/// let mut settings = Settings::default();
	/// settings.set_property("app.port", "8080");
	///
	/// assert_eq!(settings.interpolate("port=${app.port}").unwrap(), "port=8080");
	/// assert_eq!(settings.interpolate("${app.host:localhost}").unwrap(), "localhost");
	/// assert!(settings.interpolate("${missing}").is_err());
	/// ```
	pub fn interpolate(&self, raw: &str) -> SettingsResult<String> {
		let mut output = String::with_capacity(raw.len());
		let mut rest = raw;

		while let Some(start) = rest.find("${") {
			output.push_str(&rest[..start]);
			let after = &rest[start + 2..];
			let Some(end) = after.find('}') else {
				output.push_str(&rest[start..]);
				return Ok(output);
			};

			let expression = &after[..end];
			let (key, default) = match expression.split_once(':') {
				Some((key, default)) => (key, Some(default)),
				None => (expression, None),
			};

			match (self.property(key), default) {
				(Some(value), _) => output.push_str(value),
				(None, Some(default)) => output.push_str(default),
				(None, None) if self.container.strict_placeholders => {
					return Err(SettingsError::UnresolvedPlaceholder(key.to_string()));
				}
				(None, None) => output.push_str(&rest[start..start + 2 + end + 1]),
			}
			rest = &after[end + 1..];
		}

		output.push_str(rest);
		Ok(output)
	}
}

/// Builder merging several [`PropertySource`]s into [`Settings`].
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn PropertySource>>,
}

impl SettingsBuilder {
	/// Create a builder without sources.
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a property source.
	pub fn add_source(mut self, source: impl PropertySource + 'static) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Load every source and merge them; higher priority wins, ties keep the
	/// later source.
	///
	/// # Examples
	///
	/// ```
	/// use beanstalk_conf::{MemorySource, SettingsBuilder};
	///
	/// let settings = SettingsBuilder::new()
	///     .add_source(MemorySource::new().with_property("name", "low"))
	///     .add_source(MemorySource::new().with_property("name", "high").with_priority(10))
	///     .build()
	///     .unwrap();
	/// assert_eq!(settings.property("name"), Some("high"));
	/// ```
	pub fn build(mut self) -> SettingsResult<Settings> {
		self.sources.sort_by_key(|source| source.priority());

		let mut merged = Table::new();
		for source in &self.sources {
			tracing::debug!("Loading settings from {}", source.description());
			merge_tables(&mut merged, source.load()?);
		}

		let container = match merged.remove("container") {
			Some(value @ Value::Table(_)) => value.try_into::<ContainerSettings>()?,
			Some(_) => {
				return Err(SettingsError::Parse(
					"'container' must be a table".to_string(),
				));
			}
			None => ContainerSettings::default(),
		};

		let mut properties = IndexMap::new();
		match merged.remove("properties") {
			Some(Value::Table(table)) => flatten_into(&mut properties, "", &table),
			Some(_) => {
				return Err(SettingsError::Parse(
					"'properties' must be a table".to_string(),
				));
			}
			None => {}
		}

		Ok(Settings {
			container,
			properties,
		})
	}
}

fn merge_tables(base: &mut Table, overlay: Table) {
	for (key, value) in overlay {
		let Value::Table(incoming) = value else {
			base.insert(key, value);
			continue;
		};
		if let Some(Value::Table(existing)) = base.get_mut(&key) {
			merge_tables(existing, incoming);
			continue;
		}
		base.insert(key, Value::Table(incoming));
	}
}

fn flatten_into(out: &mut IndexMap<String, String>, prefix: &str, table: &Table) {
	for (key, value) in table {
		let full_key = if prefix.is_empty() {
			key.clone()
		} else {
			format!("{}.{}", prefix, key)
		};
		match value {
			Value::Table(inner) => flatten_into(out, &full_key, inner),
			other => {
				out.insert(full_key, scalar_to_string(other));
			}
		}
	}
}

fn scalar_to_string(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Array(items) => items
			.iter()
			.map(scalar_to_string)
			.collect::<Vec<_>>()
			.join(","),
		other => other.to_string(),
	}
}
