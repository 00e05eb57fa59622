//! Conversion of literal field values into typed values.
//!
//! The conversion table is keyed by the declared type name, so every literal
//! field goes through the same rules regardless of which component declares it.

use crate::error::{DiError, DiResult};

/// A literal after conversion to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
	/// `i32`
	Int(i32),
	/// `i64`
	Long(i64),
	/// `i16`
	Short(i16),
	/// `f64`
	Double(f64),
	/// `f32`
	Float(f32),
	/// `bool`, only `"true"` or `"false"`
	Bool(bool),
	/// `char`, the first character of the literal
	Char(char),
	/// `String`, the literal unchanged
	Str(String),
}

/// Convert `literal` to the type named `target_type`.
///
/// # Examples
///
/// ```
/// use beanstalk_di::{LiteralValue, convert_literal};
///
/// assert_eq!(convert_literal("12", "i32").unwrap(), LiteralValue::Int(12));
/// assert_eq!(convert_literal("cp", "char").unwrap(), LiteralValue::Char('c'));
/// assert!(convert_literal("abc", "i32").is_err());
/// ```
pub fn convert_literal(literal: &str, target_type: &str) -> DiResult<LiteralValue> {
	let fail = || DiError::DataConversion {
		literal: literal.to_string(),
		target_type: target_type.to_string(),
	};

	match target_type {
		"i32" => literal.parse().map(LiteralValue::Int).map_err(|_| fail()),
		"i64" => literal.parse().map(LiteralValue::Long).map_err(|_| fail()),
		"i16" => literal.parse().map(LiteralValue::Short).map_err(|_| fail()),
		"f64" => literal.parse().map(LiteralValue::Double).map_err(|_| fail()),
		"f32" => literal.parse().map(LiteralValue::Float).map_err(|_| fail()),
		"bool" => match literal {
			"true" => Ok(LiteralValue::Bool(true)),
			"false" => Ok(LiteralValue::Bool(false)),
			_ => Err(fail()),
		},
		"char" => literal.chars().next().map(LiteralValue::Char).ok_or_else(fail),
		"String" => Ok(LiteralValue::Str(literal.to_string())),
		_ => Err(fail()),
	}
}

/// A type that can be assigned from a literal field value.
pub trait Literal: Sized + Send + Sync + 'static {
	/// Key into the conversion table
	const TYPE_NAME: &'static str;

	/// Extract the typed value; `None` if `value` is another variant.
	fn from_value(value: LiteralValue) -> Option<Self>;

	/// Convert a literal through the conversion table.
	fn parse_literal(literal: &str) -> DiResult<Self> {
		Self::from_value(convert_literal(literal, Self::TYPE_NAME)?).ok_or_else(|| {
			DiError::DataConversion {
				literal: literal.to_string(),
				target_type: Self::TYPE_NAME.to_string(),
			}
		})
	}
}

macro_rules! impl_literal {
	($($ty:ty => $variant:ident, $name:literal;)*) => {
		$(
			impl Literal for $ty {
				const TYPE_NAME: &'static str = $name;

				fn from_value(value: LiteralValue) -> Option<Self> {
					match value {
						LiteralValue::$variant(inner) => Some(inner),
						_ => None,
					}
				}
			}
		)*
	};
}

impl_literal! {
	i32 => Int, "i32";
	i64 => Long, "i64";
	i16 => Short, "i16";
	f64 => Double, "f64";
	f32 => Float, "f32";
	bool => Bool, "bool";
	char => Char, "char";
	String => Str, "String";
}
