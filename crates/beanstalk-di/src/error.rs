//! Error types for the container

use crate::cycle_detection::CycleError;
use beanstalk_conf::SettingsError;
use thiserror::Error;

/// Boxed error accepted from user constructors and extension hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building or querying an application context.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DiError {
	/// Two definitions, or two produced beans, share a name.
	#[error("Duplicate bean name: {0}")]
	DuplicateBeanName(String),

	/// A type-based lookup matched more than one scanned definition.
	#[error("Multiple beans assignable to {type_name}: {}", .candidates.join(", "))]
	DuplicateBeanClass {
		/// Requested type
		type_name: String,
		/// Names of every matching definition
		candidates: Vec<String>,
	},

	/// No definition matches the requested name or type.
	#[error("No such bean: {0}")]
	NoSuchBean(String),

	/// A literal field value does not parse as its declared type.
	#[error("Cannot convert '{literal}' to {target_type}")]
	DataConversion {
		/// Literal text after placeholder interpolation
		literal: String,
		/// Declared target type
		target_type: String,
	},

	/// A component could not be constructed.
	#[error("Cannot instantiate {type_name}: {reason}")]
	Instantiation {
		/// Component type
		type_name: String,
		/// Why construction failed
		reason: String,
	},

	/// A component declared a scope other than `singleton` or `prototype`.
	#[error("Illegal scope '{scope}' on {type_name}")]
	IllegalScope {
		/// Declared scope text
		scope: String,
		/// Component type
		type_name: String,
	},

	/// A bean exists but cannot be viewed as the requested type.
	#[error("Bean '{name}' is not assignable to {expected}")]
	TypeMismatch {
		/// Bean name
		name: String,
		/// Requested type
		expected: String,
	},

	/// On-demand materialization re-entered a bean already being built.
	#[error(transparent)]
	CircularDependency(#[from] CycleError),

	/// An extension hook aborted startup.
	#[error("Extension {extension} failed: {source}")]
	Extension {
		/// Extension name
		extension: String,
		/// Underlying failure
		#[source]
		source: BoxError,
	},

	/// Settings could not be loaded or a placeholder could not be resolved.
	#[error(transparent)]
	Settings(#[from] SettingsError),
}

impl DiError {
	/// Wrap a hook failure, attributing it to `extension`.
	pub fn extension(extension: impl Into<String>, source: impl Into<BoxError>) -> Self {
		Self::Extension {
			extension: extension.into(),
			source: source.into(),
		}
	}
}

/// Result type alias for container operations.
pub type DiResult<T> = Result<T, DiError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_duplicate_class_lists_candidates() {
		let error = DiError::DuplicateBeanClass {
			type_name: "dyn Greeter".to_string(),
			candidates: vec!["english".to_string(), "french".to_string()],
		};
		assert_eq!(
			error.to_string(),
			"Multiple beans assignable to dyn Greeter: english, french"
		);
	}

	#[rstest]
	fn test_extension_error_keeps_source() {
		use std::error::Error as _;

		let error = DiError::extension("audit", "hook rejected bean");

		assert_eq!(error.to_string(), "Extension audit failed: hook rejected bean");
		assert_eq!(error.source().unwrap().to_string(), "hook rejected bean");
	}

	#[rstest]
	fn test_settings_error_is_transparent() {
		let error: DiError = SettingsError::UnresolvedPlaceholder("jack.age".to_string()).into();
		assert_eq!(error.to_string(), "Unresolved placeholder: ${jack.age}");
	}
}
