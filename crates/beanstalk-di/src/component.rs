//! Component declarations.
//!
//! A [`Component`] describes how to build and wire one bean type: how to
//! construct it, which fields take literal values, which fields are
//! dependencies, which views it can be requested as, and (for configuration
//! components) which factory methods produce further beans. The container
//! only sees the type-erased [`Blueprint`] side of it.
//!
//! ```
//! use beanstalk_di::{Autowired, Component};
//!
//! #[derive(Default)]
//! struct Jack {
//!     age: i32,
//!     bean: Autowired<Bean>,
//! }
//!
//! #[derive(Default)]
//! struct Bean;
//!
//! let jack = Component::<Jack>::new()
//!     .value::<i32>("age", "15", |jack, age| jack.age = age)
//!     .autowired::<Bean>("bean", |jack| &jack.bean);
//! ```

use crate::autowired::Autowired;
use crate::definition::TypeKey;
use crate::error::{BoxError, DiError, DiResult};
use crate::literal::Literal;
use crate::proxy::{AdviceDecl, AdviceKind};
use crate::view::{BeanRef, ErasedView, ViewTable};
use std::any::Any;
use std::sync::Arc;

/// Supplies dependencies while a bean is being wired.
pub trait DependencyResolver {
	/// Resolve the bean named `qualifier`, or the unique bean with a `view`
	/// view when no qualifier is given, and return it viewed as `view`.
	fn resolve_dependency(&self, qualifier: Option<&str>, view: TypeKey) -> DiResult<ErasedView>;
}

/// Type-erased component as seen by the container.
pub trait Blueprint: Send + Sync {
	/// Concrete bean type
	fn bean_type(&self) -> TypeKey;

	/// Explicit bean name, if one was declared
	fn declared_name(&self) -> Option<&str>;

	/// Declared scope text, validated at registration
	fn declared_scope(&self) -> Option<&str>;

	/// Whether eager instantiation is skipped
	fn is_lazy(&self) -> bool;

	/// Whether factory methods are expanded after wiring
	fn is_configuration(&self) -> bool;

	/// Views the bean can be requested as
	fn views(&self) -> &ViewTable;

	/// Advice this component declares as an aspect
	fn advice(&self) -> &[AdviceDecl];

	/// Factory methods, in declaration order
	fn factory_methods(&self) -> &[FactoryMethod];

	/// Construct an unwired instance and assign its literal fields.
	///
	/// `interpolate` resolves placeholders in literal text before conversion.
	fn instantiate(&self, interpolate: &dyn Fn(&str) -> DiResult<String>) -> DiResult<BeanRef>;

	/// Fill every unset dependency field of `bean`.
	fn autowire(&self, name: &str, bean: &BeanRef, resolver: &dyn DependencyResolver)
	-> DiResult<()>;
}

type Constructor<T> = Box<dyn Fn() -> Result<T, BoxError> + Send + Sync>;
type FactoryFn = Arc<dyn Fn(&str, &BeanRef) -> DiResult<BeanRef> + Send + Sync>;

struct LiteralField<T> {
	field: &'static str,
	literal: String,
	assign: Box<dyn Fn(&mut T, &str) -> DiResult<()> + Send + Sync>,
}

struct DependencyField<T> {
	field: &'static str,
	qualifier: Option<String>,
	view: TypeKey,
	is_set: Box<dyn Fn(&T) -> bool + Send + Sync>,
	fill: Box<dyn Fn(&T, ErasedView) -> bool + Send + Sync>,
}

/// A method of a configuration component that produces a bean.
#[derive(Clone)]
pub struct FactoryMethod {
	method: &'static str,
	bean_name: Option<String>,
	views: ViewTable,
	invoke: FactoryFn,
}

impl FactoryMethod {
	/// Method name
	pub fn method(&self) -> &'static str {
		self.method
	}

	/// Name of the produced bean: the override if given, else the method name
	pub fn bean_name(&self) -> &str {
		self.bean_name.as_deref().unwrap_or(self.method)
	}

	/// Type of the produced bean
	pub fn produced_type(&self) -> TypeKey {
		self.views.concrete()
	}

	/// Views of the produced bean
	pub fn views(&self) -> &ViewTable {
		&self.views
	}

	/// Run the method on `configuration`, the bean named `configuration_name`.
	pub fn invoke(&self, configuration_name: &str, configuration: &BeanRef) -> DiResult<BeanRef> {
		(self.invoke)(configuration_name, configuration)
	}
}

/// Builder-style declaration of a component of type `T`.
pub struct Component<T> {
	bean_type: TypeKey,
	constructor: Option<Constructor<T>>,
	name: Option<String>,
	scope: Option<String>,
	lazy: bool,
	configuration: bool,
	literals: Vec<LiteralField<T>>,
	dependencies: Vec<DependencyField<T>>,
	factories: Vec<FactoryMethod>,
	advice: Vec<AdviceDecl>,
	views: ViewTable,
}

impl<T: Default + Any + Send + Sync> Component<T> {
	/// Declare a component constructed with `T::default()`.
	pub fn new() -> Self {
		Self::declare().constructor(T::default)
	}
}

impl<T: Default + Any + Send + Sync> Default for Component<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Any + Send + Sync> Component<T> {
	/// Declare a component with no constructor yet.
	///
	/// Instantiating it fails until [`constructor`](Self::constructor) or
	/// [`try_constructor`](Self::try_constructor) is supplied.
	pub fn declare() -> Self {
		Self {
			bean_type: TypeKey::of::<T>(),
			constructor: None,
			name: None,
			scope: None,
			lazy: false,
			configuration: false,
			literals: Vec::new(),
			dependencies: Vec::new(),
			factories: Vec::new(),
			advice: Vec::new(),
			views: ViewTable::of::<T>(),
		}
	}

	/// Zero-argument constructor.
	pub fn constructor(mut self, f: impl Fn() -> T + Send + Sync + 'static) -> Self {
		self.constructor = Some(Box::new(move || Ok::<T, BoxError>(f())));
		self
	}

	/// Fallible zero-argument constructor.
	pub fn try_constructor<E>(mut self, f: impl Fn() -> Result<T, E> + Send + Sync + 'static) -> Self
	where
		E: Into<BoxError>,
	{
		self.constructor = Some(Box::new(move || f().map_err(Into::<BoxError>::into)));
		self
	}

	/// Explicit bean name; defaults to the lower-camel simple type name.
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Declared scope, `"singleton"` or `"prototype"`.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());
		self
	}

	/// Shorthand for `scope("prototype")`.
	pub fn prototype(self) -> Self {
		self.scope("prototype")
	}

	/// Skip eager instantiation at startup.
	pub fn lazy(mut self) -> Self {
		self.lazy = true;
		self
	}

	/// Mark as a configuration component whose factory methods are expanded.
	pub fn configuration(mut self) -> Self {
		self.configuration = true;
		self
	}

	/// Literal field value, converted to `V` and assigned by `setter`.
	///
	/// `${key}` placeholders in `literal` are resolved from the container
	/// settings first.
	pub fn value<V: Literal>(
		mut self,
		field: &'static str,
		literal: impl Into<String>,
		setter: impl Fn(&mut T, V) + Send + Sync + 'static,
	) -> Self {
		self.literals.push(LiteralField {
			field,
			literal: literal.into(),
			assign: Box::new(move |instance: &mut T, raw: &str| -> DiResult<()> {
				setter(instance, V::parse_literal(raw)?);
				Ok(())
			}),
		});
		self
	}

	/// Dependency resolved by type.
	pub fn autowired<D>(
		self,
		field: &'static str,
		accessor: impl Fn(&T) -> &Autowired<D> + Send + Sync + Clone + 'static,
	) -> Self
	where
		D: ?Sized + Send + Sync + 'static,
	{
		self.dependency(field, None, accessor)
	}

	/// Dependency resolved by bean name.
	pub fn qualified<D>(
		self,
		field: &'static str,
		qualifier: impl Into<String>,
		accessor: impl Fn(&T) -> &Autowired<D> + Send + Sync + Clone + 'static,
	) -> Self
	where
		D: ?Sized + Send + Sync + 'static,
	{
		self.dependency(field, Some(qualifier.into()), accessor)
	}

	fn dependency<D, F>(mut self, field: &'static str, qualifier: Option<String>, accessor: F) -> Self
	where
		D: ?Sized + Send + Sync + 'static,
		F: Fn(&T) -> &Autowired<D> + Send + Sync + Clone + 'static,
	{
		let probe = accessor.clone();
		self.dependencies.push(DependencyField {
			field,
			qualifier,
			view: TypeKey::of::<D>(),
			is_set: Box::new(move |instance: &T| probe(instance).is_set()),
			fill: Box::new(move |instance: &T, view: ErasedView| match view.downcast::<Arc<D>>() {
				Ok(dependency) => {
					accessor(instance).set(*dependency);
					true
				}
				Err(_) => false,
			}),
		});
		self
	}

	/// Make the bean retrievable, and autowirable, as `V`.
	///
	/// ```
	/// use beanstalk_di::Component;
	/// use std::sync::Arc;
	///
	/// trait Greeter: Send + Sync {}
	///
	/// #[derive(Default)]
	/// struct English;
	/// impl Greeter for English {}
	///
	/// let component = Component::<English>::new()
	///     .provides::<dyn Greeter>(|english| english as Arc<dyn Greeter>);
	/// ```
	pub fn provides<V>(mut self, cast: impl Fn(Arc<T>) -> Arc<V> + Send + Sync + 'static) -> Self
	where
		V: ?Sized + Send + Sync + 'static,
	{
		self.views.add::<T, V>(cast);
		self
	}

	/// Factory method producing a bean named after the method.
	pub fn bean<R>(self, method: &'static str, f: impl Fn(&T) -> R + Send + Sync + 'static) -> Self
	where
		R: Any + Send + Sync,
	{
		self.factory(method, None, f)
	}

	/// Factory method producing a bean with an explicit name.
	pub fn bean_named<R>(
		self,
		method: &'static str,
		name: impl Into<String>,
		f: impl Fn(&T) -> R + Send + Sync + 'static,
	) -> Self
	where
		R: Any + Send + Sync,
	{
		self.factory(method, Some(name.into()), f)
	}

	fn factory<R>(
		mut self,
		method: &'static str,
		bean_name: Option<String>,
		f: impl Fn(&T) -> R + Send + Sync + 'static,
	) -> Self
	where
		R: Any + Send + Sync,
	{
		let expected = self.bean_type;
		self.factories.push(FactoryMethod {
			method,
			bean_name,
			views: ViewTable::of::<R>(),
			invoke: Arc::new(move |configuration_name: &str, configuration: &BeanRef| -> DiResult<BeanRef> {
				let configuration = configuration.downcast_ref::<T>().ok_or_else(|| {
					DiError::TypeMismatch {
						name: configuration_name.to_string(),
						expected: expected.name().to_string(),
					}
				})?;
				Ok(Arc::new(f(configuration)) as BeanRef)
			}),
		});
		self
	}

	/// Declare advice on `target_method` of every bean viewable as `Target`.
	pub fn advise<Target: ?Sized + 'static>(
		mut self,
		kind: AdviceKind,
		target_method: &'static str,
		advice_method: &'static str,
	) -> Self {
		self.advice.push(AdviceDecl {
			target_type: TypeKey::of::<Target>(),
			target_method,
			kind,
			advice_method,
		});
		self
	}

	/// Shorthand for [`advise`](Self::advise) with [`AdviceKind::Before`].
	pub fn before<Target: ?Sized + 'static>(self, target_method: &'static str, advice_method: &'static str) -> Self {
		self.advise::<Target>(AdviceKind::Before, target_method, advice_method)
	}

	/// Shorthand for [`advise`](Self::advise) with [`AdviceKind::After`].
	pub fn after<Target: ?Sized + 'static>(self, target_method: &'static str, advice_method: &'static str) -> Self {
		self.advise::<Target>(AdviceKind::After, target_method, advice_method)
	}

	/// Shorthand for [`advise`](Self::advise) with [`AdviceKind::AfterThrowing`].
	pub fn after_throwing<Target: ?Sized + 'static>(
		self,
		target_method: &'static str,
		advice_method: &'static str,
	) -> Self {
		self.advise::<Target>(AdviceKind::AfterThrowing, target_method, advice_method)
	}

	/// Shorthand for [`advise`](Self::advise) with [`AdviceKind::AfterReturning`].
	pub fn after_returning<Target: ?Sized + 'static>(
		self,
		target_method: &'static str,
		advice_method: &'static str,
	) -> Self {
		self.advise::<Target>(AdviceKind::AfterReturning, target_method, advice_method)
	}
}

impl<T: Any + Send + Sync> Blueprint for Component<T> {
	fn bean_type(&self) -> TypeKey {
		self.bean_type
	}

	fn declared_name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	fn declared_scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	fn is_lazy(&self) -> bool {
		self.lazy
	}

	fn is_configuration(&self) -> bool {
		self.configuration
	}

	fn views(&self) -> &ViewTable {
		&self.views
	}

	fn advice(&self) -> &[AdviceDecl] {
		&self.advice
	}

	fn factory_methods(&self) -> &[FactoryMethod] {
		&self.factories
	}

	fn instantiate(&self, interpolate: &dyn Fn(&str) -> DiResult<String>) -> DiResult<BeanRef> {
		let constructor = self
			.constructor
			.as_ref()
			.ok_or_else(|| DiError::Instantiation {
				type_name: self.bean_type.name().to_string(),
				reason: "no zero-argument constructor declared".to_string(),
			})?;

		let mut instance = constructor().map_err(|e| DiError::Instantiation {
			type_name: self.bean_type.name().to_string(),
			reason: e.to_string(),
		})?;

		for literal in &self.literals {
			let raw = interpolate(&literal.literal)?;
			(literal.assign)(&mut instance, &raw)?;
			tracing::trace!(
				"Assigned literal '{}' to {}.{}",
				raw,
				self.bean_type.simple_name(),
				literal.field
			);
		}

		Ok(Arc::new(instance) as BeanRef)
	}

	fn autowire(&self, name: &str, bean: &BeanRef, resolver: &dyn DependencyResolver) -> DiResult<()> {
		let instance = bean
			.downcast_ref::<T>()
			.ok_or_else(|| DiError::TypeMismatch {
				name: name.to_string(),
				expected: self.bean_type.name().to_string(),
			})?;

		for dependency in &self.dependencies {
			if (dependency.is_set)(instance) {
				tracing::trace!("Skipping already set field {}.{}", name, dependency.field);
				continue;
			}

			let view = resolver.resolve_dependency(dependency.qualifier.as_deref(), dependency.view)?;
			if !(dependency.fill)(instance, view) {
				return Err(DiError::TypeMismatch {
					name: dependency
						.qualifier
						.clone()
						.unwrap_or_else(|| dependency.field.to_string()),
					expected: dependency.view.name().to_string(),
				});
			}
			tracing::debug!("Injected {}.{}", name, dependency.field);
		}

		Ok(())
	}
}
