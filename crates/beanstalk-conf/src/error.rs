//! Error types for settings loading and property interpolation.

use thiserror::Error;

/// Errors raised while loading property sources or resolving placeholders.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SettingsError {
	/// Reading a settings file failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// A TOML document could not be parsed or deserialized.
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A value had an unexpected shape.
	#[error("Parse error: {0}")]
	Parse(String),

	/// A `${key}` placeholder referenced a property that no source defines.
	#[error("Unresolved placeholder: ${{{0}}}")]
	UnresolvedPlaceholder(String),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_unresolved_placeholder_message() {
		let error = SettingsError::UnresolvedPlaceholder("app.name".to_string());
		assert_eq!(error.to_string(), "Unresolved placeholder: ${app.name}");
	}

	#[rstest]
	fn test_toml_error_from() {
		let toml_error = toml::from_str::<toml::Table>("key = ").unwrap_err();
		let error: SettingsError = toml_error.into();
		assert!(matches!(error, SettingsError::Toml(_)));
	}
}
