//! Bean definitions and type identity.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime identity of a bean type or view.
///
/// Equality and hashing use only the [`TypeId`]; the name is kept for error
/// messages and for deriving default bean names.
#[derive(Clone, Copy)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	/// Key for `T`, which may be unsized (`dyn Trait`).
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	/// Type identifier
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Fully qualified type name
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Type name without module path or generic arguments.
	///
	/// # Examples
	///
	/// ```
	/// use beanstalk_di::TypeKey;
	///
	/// struct JackService;
	/// assert_eq!(TypeKey::of::<JackService>().simple_name(), "JackService");
	/// assert_eq!(TypeKey::of::<Vec<String>>().simple_name(), "Vec");
	/// ```
	pub fn simple_name(&self) -> &'static str {
		let base = self.name.split('<').next().unwrap_or(self.name);
		base.rsplit("::").next().unwrap_or(base)
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Default bean name: the simple type name with its first character lower-cased.
///
/// # Examples
///
/// ```
/// use beanstalk_di::default_bean_name;
///
/// assert_eq!(default_bean_name("JackService"), "jackService");
/// assert_eq!(default_bean_name("URLParser"), "uRLParser");
/// ```
pub fn default_bean_name(simple_name: &str) -> String {
	let mut chars = simple_name.chars();
	match chars.next() {
		Some(first) => first.to_lowercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Instance policy of a bean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BeanScope {
	/// One shared instance per container
	#[default]
	Singleton,
	/// A fresh instance per lookup
	Prototype,
}

impl BeanScope {
	/// Parse a declared scope; only `singleton` and `prototype` are accepted.
	pub fn parse(scope: &str) -> Option<Self> {
		match scope {
			"singleton" => Some(Self::Singleton),
			"prototype" => Some(Self::Prototype),
			_ => None,
		}
	}

	/// Canonical lower-case name
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Singleton => "singleton",
			Self::Prototype => "prototype",
		}
	}
}

impl fmt::Display for BeanScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Where a definition came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeanOrigin {
	/// Discovered by scanning or registered directly as a component
	Scanned,
	/// Produced by a factory method of a configuration bean
	Factory {
		/// Name of the configuration bean
		configuration: String,
		/// Factory method name
		method: &'static str,
	},
}

/// Immutable description of a registered bean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanDefinition {
	name: String,
	bean_type: TypeKey,
	scope: BeanScope,
	lazy: bool,
	origin: BeanOrigin,
}

impl BeanDefinition {
	/// Describe a bean.
	pub fn new(
		name: impl Into<String>,
		bean_type: TypeKey,
		scope: BeanScope,
		lazy: bool,
		origin: BeanOrigin,
	) -> Self {
		Self {
			name: name.into(),
			bean_type,
			scope,
			lazy,
			origin,
		}
	}

	/// Bean name, unique in its container
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Concrete type of the bean
	pub fn bean_type(&self) -> TypeKey {
		self.bean_type
	}

	/// Instance policy
	pub fn scope(&self) -> BeanScope {
		self.scope
	}

	/// Whether eager instantiation at startup is skipped
	pub fn is_lazy(&self) -> bool {
		self.lazy
	}

	/// Provenance
	pub fn origin(&self) -> &BeanOrigin {
		&self.origin
	}

	/// Shorthand for `scope() == BeanScope::Singleton`
	pub fn is_singleton(&self) -> bool {
		self.scope == BeanScope::Singleton
	}

	/// Whether this bean is built at startup
	pub fn is_eager_singleton(&self) -> bool {
		self.is_singleton() && !self.lazy
	}

	/// Whether this definition came from a factory method
	pub fn is_factory_produced(&self) -> bool {
		matches!(self.origin, BeanOrigin::Factory { .. })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	mod shop {
		pub struct BeanService;
		pub struct Wrapper<T>(pub T);
	}

	#[rstest]
	#[case("BeanService", "beanService")]
	#[case("Jack", "jack")]
	#[case("a", "a")]
	#[case("", "")]
	#[case("ÉtatManager", "étatManager")]
	fn test_default_bean_name(#[case] simple: &str, #[case] expected: &str) {
		assert_eq!(default_bean_name(simple), expected);
	}

	#[rstest]
	fn test_simple_name_strips_path_and_generics() {
		assert_eq!(TypeKey::of::<shop::BeanService>().simple_name(), "BeanService");
		assert_eq!(
			TypeKey::of::<shop::Wrapper<shop::BeanService>>().simple_name(),
			"Wrapper"
		);
	}

	#[rstest]
	fn test_type_key_equality_ignores_name() {
		let key = TypeKey::of::<shop::BeanService>();
		assert_eq!(key, TypeKey::of::<shop::BeanService>());
		assert_ne!(key, TypeKey::of::<String>());
	}

	#[rstest]
	#[case("singleton", Some(BeanScope::Singleton))]
	#[case("prototype", Some(BeanScope::Prototype))]
	#[case("Singleton", None)]
	#[case("request", None)]
	#[case("", None)]
	fn test_scope_parse(#[case] raw: &str, #[case] expected: Option<BeanScope>) {
		assert_eq!(BeanScope::parse(raw), expected);
	}

	#[rstest]
	fn test_definition_flags() {
		let definition = BeanDefinition::new(
			"widget",
			TypeKey::of::<String>(),
			BeanScope::Singleton,
			false,
			BeanOrigin::Factory {
				configuration: "appConfig".to_string(),
				method: "widget",
			},
		);

		assert!(definition.is_eager_singleton());
		assert!(definition.is_factory_produced());
		assert_eq!(definition.scope().to_string(), "singleton");
	}

	proptest! {
		#[test]
		fn prop_default_name_only_touches_first_char(first in "[A-Z]", rest in "[A-Za-z0-9_]{0,16}") {
			let simple = format!("{first}{rest}");
			let name = default_bean_name(&simple);
			prop_assert_eq!(&name[..1], first.to_lowercase());
			prop_assert_eq!(&name[1..], rest.as_str());
		}
	}
}
