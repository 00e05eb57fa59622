//! The application context: startup pipeline and bean lookup.
//!
//! ## Startup
//!
//! [`ApplicationContextBuilder::build`] runs these stages in order, with the
//! [`Extension`] hooks of each stage:
//!
//! 1. **scan**: register a definition for every component found
//! 2. **instantiate**: construct every eager singleton into the in-progress tier
//! 3. **proxy**: offer advised in-progress singletons to the [`Weaver`]
//! 4. **autowire**: wire every in-progress singleton, promoting it to finished
//! 5. **configuration**: run the factory methods of configuration beans
//!
//! Any error aborts startup and no context is returned.
//!
//! ## Lookup
//!
//! A finished singleton is returned without locking. Anything else is
//! materialized under the context's materialization lock: the in-progress
//! proxy and real tiers are consulted first (only the lock holder fills
//! them), then the bean is constructed and wired, recursively resolving its
//! own dependencies. Singletons built by one lookup are promoted together
//! when the outermost materialization succeeds, and all of them are dropped
//! if it fails, so no finished bean ever points at a half-built one.
//!
//! Fresh materializations are tracked per lookup so a prototype chain that
//! comes back to a bean it is still building fails with
//! [`DiError::CircularDependency`] instead of recursing forever.

use crate::cache::{LifecycleCache, Tier};
use crate::component::{Blueprint, DependencyResolver};
use crate::cycle_detection::ResolutionTracker;
use crate::definition::{BeanDefinition, BeanOrigin, BeanScope, TypeKey};
use crate::error::{DiError, DiResult};
use crate::extension::Extension;
use crate::proxy::{Advice, InterceptionPlan, Weaver};
use crate::registry::DefinitionRegistry;
use crate::scan::{ComponentScanner, InventoryScanner};
use crate::view::{BeanRef, ErasedView};
use beanstalk_conf::Settings;
use indexmap::IndexMap;
use parking_lot::{ReentrantMutex, RwLock};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

/// A running container.
///
/// Lookups take `&self` and may be issued from several threads; on-demand
/// materialization is serialized.
pub struct ApplicationContext {
	registry: RwLock<DefinitionRegistry>,
	cache: LifecycleCache,
	extensions: Vec<Arc<dyn Extension>>,
	weaver: Option<Arc<dyn Weaver>>,
	settings: Settings,
	materialize_lock: ReentrantMutex<()>,
}

/// Builder for [`ApplicationContext`].
///
/// # Examples
///
/// ```
/// use beanstalk_di::{ApplicationContext, Component, ComponentSet};
///
/// #[derive(Default)]
/// struct Clock;
///
/// let context = ApplicationContext::builder()
///     .scanner(ComponentSet::new().with("app", Component::<Clock>::new()))
///     .package("app")
///     .build()
///     .unwrap();
///
/// assert!(context.get::<Clock>("clock").is_ok());
/// ```
#[derive(Default)]
pub struct ApplicationContextBuilder {
	scanner: Option<Arc<dyn ComponentScanner>>,
	packages: Vec<String>,
	components: Vec<Arc<dyn Blueprint>>,
	extensions: Vec<Arc<dyn Extension>>,
	weaver: Option<Arc<dyn Weaver>>,
	settings: Settings,
}

impl ApplicationContextBuilder {
	/// A builder with no packages, using [`InventoryScanner`] for scanning.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the scanner used for [`package`](Self::package).
	pub fn scanner(mut self, scanner: impl ComponentScanner + 'static) -> Self {
		self.scanner = Some(Arc::new(scanner));
		self
	}

	/// Scan `package` at startup.
	pub fn package(mut self, package: impl Into<String>) -> Self {
		self.packages.push(package.into());
		self
	}

	/// Register a component directly, after scanned ones.
	pub fn component(mut self, component: impl Blueprint + 'static) -> Self {
		self.components.push(Arc::new(component));
		self
	}

	/// Add an extension; hooks run in the order extensions are added.
	pub fn extension(mut self, extension: impl Extension + 'static) -> Self {
		self.extensions.push(Arc::new(extension));
		self
	}

	/// Set the weaver used by the proxy stage.
	pub fn weaver(mut self, weaver: impl Weaver + 'static) -> Self {
		self.weaver = Some(Arc::new(weaver));
		self
	}

	/// Settings for placeholders and container options.
	pub fn settings(mut self, settings: Settings) -> Self {
		self.settings = settings;
		self
	}

	/// Scan, register and start the context.
	pub fn build(self) -> DiResult<ApplicationContext> {
		let scanner = self
			.scanner
			.unwrap_or_else(|| Arc::new(InventoryScanner));

		let mut blueprints = Vec::new();
		for package in &self.packages {
			let found = scanner.scan(package)?;
			tracing::info!("Scanned package '{}': {} components", package, found.len());
			blueprints.extend(found);
		}
		blueprints.extend(self.components);

		let mut registry = DefinitionRegistry::new();
		for blueprint in blueprints {
			registry.register_component(blueprint)?;
		}

		let context = ApplicationContext {
			registry: RwLock::new(registry),
			cache: LifecycleCache::new(),
			extensions: self.extensions,
			weaver: self.weaver,
			settings: self.settings,
			materialize_lock: ReentrantMutex::new(()),
		};
		context.start()?;
		Ok(context)
	}
}

impl ApplicationContext {
	/// Start building a context.
	pub fn builder() -> ApplicationContextBuilder {
		ApplicationContextBuilder::new()
	}

	fn start(&self) -> DiResult<()> {
		let definitions = self.registry.read().definitions();
		for definition in &definitions {
			self.notify(|ext| ext.on_definition(self, definition))?;
		}
		self.notify(|ext| ext.after_scan(self))?;

		self.instantiate_eager()?;
		self.notify(|ext| ext.after_instantiate(self))?;

		self.apply_proxies()?;
		self.notify(|ext| ext.after_proxy(self))?;

		self.autowire_eager()?;
		self.notify(|ext| ext.after_autowire(self))?;

		self.notify(|ext| ext.before_configuration(self))?;
		self.expand_configuration()?;
		self.notify(|ext| ext.after_configuration(self))?;

		tracing::info!(
			"Application context started with {} bean definitions",
			self.definition_count()
		);
		Ok(())
	}

	fn notify(&self, hook: impl Fn(&dyn Extension) -> DiResult<()>) -> DiResult<()> {
		for extension in &self.extensions {
			if let Err(e) = hook(extension.as_ref()) {
				tracing::error!("Extension {} aborted startup: {}", extension.name(), e);
				return Err(e);
			}
		}
		Ok(())
	}

	fn instantiate_eager(&self) -> DiResult<()> {
		let eager: Vec<BeanDefinition> = self
			.registry
			.read()
			.definitions()
			.into_iter()
			.filter(BeanDefinition::is_eager_singleton)
			.collect();

		for definition in &eager {
			let bean = self.instantiate(definition)?;
			self.notify(|ext| ext.on_instance(self, definition.name(), &bean))?;
		}
		tracing::debug!("Instantiated {} eager singletons", eager.len());
		Ok(())
	}

	fn apply_proxies(&self) -> DiResult<()> {
		let aspects = self.registry.read().aspects();
		if aspects.is_empty() {
			return Ok(());
		}

		let lookup = self.lookup();
		for name in self.cache.in_progress_names() {
			let Some(target) = self.cache.in_progress_real(&name) else {
				continue;
			};

			let mut plan = InterceptionPlan::new(&name);
			for (aspect, declarations) in &aspects {
				for declaration in declarations {
					let matches = self
						.registry
						.read()
						.get(&name)
						.is_some_and(|entry| entry.views.contains(declaration.target_type.id()));
					if !matches {
						continue;
					}
					let instance = self.resolve(aspect, &lookup)?;
					plan.join_point_mut(declaration.target_method).push(
						declaration.kind,
						Advice {
							aspect: aspect.clone(),
							instance,
							method: declaration.advice_method,
						},
					);
				}
			}
			if plan.is_empty() {
				continue;
			}

			for join_point in &plan.join_points {
				self.notify(|ext| ext.on_intercept(self, join_point))?;
			}

			let Some(weaver) = &self.weaver else {
				tracing::warn!("Bean '{}' is advised but no weaver is configured", name);
				continue;
			};
			if let Some(proxy) = weaver.wrap(&name, &target, &plan)? {
				self.cache.insert_proxy(&name, proxy)?;
				tracing::debug!(
					"Proxied bean '{}' ({} join points)",
					name,
					plan.join_points.len()
				);
			}
		}
		Ok(())
	}

	fn autowire_eager(&self) -> DiResult<()> {
		let lookup = self.lookup();
		for name in self.cache.in_progress_names() {
			// Already promoted while wiring an earlier bean
			let Some(bean) = self.cache.in_progress_real(&name) else {
				continue;
			};
			let definition = self.definition(&name)?;
			self.autowire(&definition, &bean, &lookup)?;
			self.promote(&name);
		}

		let eager: Vec<String> = self
			.registry
			.read()
			.definitions()
			.into_iter()
			.filter(|definition| definition.is_eager_singleton() && !definition.is_factory_produced())
			.map(|definition| definition.name().to_string())
			.collect();
		for name in eager {
			if let Some(bean) = self.cache.finished(&name) {
				self.notify(|ext| ext.on_bean(self, &name, &bean))?;
			}
		}
		Ok(())
	}

	/// Run the factory methods of every finished configuration bean.
	///
	/// Each produced bean is inserted as a finished singleton and registered
	/// under the factory's bean name. Runs once during startup; running it
	/// again fails with [`DiError::DuplicateBeanName`] on the first produced
	/// bean.
	pub fn expand_configuration(&self) -> DiResult<()> {
		let configurations = self.registry.read().configurations();

		for (configuration_name, blueprint) in configurations {
			let Some(configuration) = self.cache.finished(&configuration_name) else {
				tracing::debug!(
					"Configuration '{}' is not instantiated, skipping its factory methods",
					configuration_name
				);
				continue;
			};

			for factory in blueprint.factory_methods() {
				let bean_name = factory.bean_name().to_string();
				if self.registry.read().contains(&bean_name) || self.cache.contains_finished(&bean_name) {
					return Err(DiError::DuplicateBeanName(bean_name));
				}

				let produced = factory.invoke(&configuration_name, &configuration)?;
				self.cache.insert_finished(&bean_name, produced)?;

				let definition = BeanDefinition::new(
					bean_name.as_str(),
					factory.produced_type(),
					BeanScope::Singleton,
					false,
					BeanOrigin::Factory {
						configuration: configuration_name.clone(),
						method: factory.method(),
					},
				);
				self.registry
					.write()
					.register(definition, factory.views().clone(), None)?;
				tracing::debug!(
					"Configuration '{}' produced bean '{}' via {}()",
					configuration_name,
					bean_name,
					factory.method()
				);
			}
		}
		Ok(())
	}

	fn lookup(&self) -> Lookup {
		Lookup {
			tracker: ResolutionTracker::new(self.settings.container.max_resolution_depth),
			pending: RefCell::new(Vec::new()),
		}
	}

	fn promote(&self, name: &str) {
		if self.cache.promote(name).is_some() {
			tracing::debug!("Promoted bean '{}' to finished", name);
		}
	}

	fn blueprint_of(&self, definition: &BeanDefinition) -> DiResult<Arc<dyn Blueprint>> {
		self.registry
			.read()
			.entry(definition.name())?
			.blueprint
			.clone()
			.ok_or_else(|| DiError::Instantiation {
				type_name: definition.bean_type().name().to_string(),
				reason: format!(
					"bean '{}' is produced by a factory method",
					definition.name()
				),
			})
	}

	/// Construct an instance; singletons enter the in-progress tier.
	fn instantiate(&self, definition: &BeanDefinition) -> DiResult<BeanRef> {
		let blueprint = self.blueprint_of(definition)?;
		let interpolate = |raw: &str| -> DiResult<String> { Ok(self.settings.interpolate(raw)?) };
		let bean = blueprint.instantiate(&interpolate)?;

		if definition.is_singleton() {
			self.cache.insert_in_progress(definition.name(), bean.clone())?;
		}
		tracing::debug!("Instantiated bean '{}'", definition.name());
		Ok(bean)
	}

	/// Fill the dependency fields of `bean`. Promotion is up to the caller.
	fn autowire(&self, definition: &BeanDefinition, bean: &BeanRef, lookup: &Lookup) -> DiResult<()> {
		let blueprint = self.blueprint_of(definition)?;
		let resolver = Resolution {
			context: self,
			lookup,
		};
		blueprint.autowire(definition.name(), bean, &resolver)
	}

	fn resolve(&self, name: &str, lookup: &Lookup) -> DiResult<BeanRef> {
		if let Some(bean) = self.cache.finished(name) {
			return Ok(bean);
		}

		// In-progress tiers are only filled by the lock holder
		let _lock = self.materialize_lock.lock();
		if let Some(bean) = self.cache.lookup(name) {
			return Ok(bean);
		}

		let definition = self.definition(name)?;
		let outermost = lookup.tracker.depth() == 0;
		let result = self.materialize(&definition, lookup);

		if outermost {
			let pending = lookup.pending.take();
			match &result {
				Ok(_) => pending.iter().for_each(|built| self.promote(built)),
				Err(e) => {
					for built in &pending {
						self.cache.discard_in_progress(built);
					}
					if !pending.is_empty() {
						tracing::debug!(
							"Discarded {} in-progress beans after failing '{}': {}",
							pending.len(),
							name,
							e
						);
					}
				}
			}
		}

		let bean = result?;
		if definition.is_singleton() {
			return self
				.cache
				.lookup(name)
				.ok_or_else(|| DiError::NoSuchBean(name.to_string()));
		}
		Ok(bean)
	}

	/// Construct and wire a bean that is in no tier.
	fn materialize(&self, definition: &BeanDefinition, lookup: &Lookup) -> DiResult<BeanRef> {
		let _guard = lookup
			.tracker
			.begin(definition.name(), definition.is_singleton())?;

		let bean = self.instantiate(definition)?;
		if definition.is_singleton() {
			lookup.pending.borrow_mut().push(definition.name().to_string());
		}
		self.autowire(definition, &bean, lookup)?;
		Ok(bean)
	}

	fn resolve_view(&self, qualifier: Option<&str>, view: TypeKey, lookup: &Lookup) -> DiResult<ErasedView> {
		let name = match qualifier {
			Some(name) => name.to_string(),
			None => self.registry.read().unique_name(view)?,
		};
		let bean = self.resolve(&name, lookup)?;
		self.registry.read().view_erased(&name, bean, view)
	}

	/// The bean named `name`, materializing it if needed.
	pub fn get_bean(&self, name: &str) -> DiResult<BeanRef> {
		self.resolve(name, &self.lookup())
	}

	/// The bean named `name`, viewed as `T`.
	pub fn get<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
		let bean = self.get_bean(name)?;
		self.registry.read().view::<T>(name, bean)
	}

	/// The unique scanned bean viewable as `T`.
	///
	/// Beans produced by factory methods are only reachable by name.
	pub fn get_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
		let name = self.registry.read().unique_name(TypeKey::of::<T>())?;
		self.get::<T>(&name)
	}

	/// Every scanned bean viewable as `T`, by name, in registration order.
	pub fn get_beans_of_type<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<IndexMap<String, Arc<T>>> {
		let names = self.registry.read().candidates(TypeKey::of::<T>());
		names
			.iter()
			.map(|name| Ok((name.clone(), self.get::<T>(name)?)))
			.collect()
	}

	/// Concrete type of the bean named `name`.
	pub fn get_type(&self, name: &str) -> DiResult<TypeKey> {
		Ok(self.definition(name)?.bean_type())
	}

	/// Number of registered definitions, including factory-produced beans.
	pub fn definition_count(&self) -> usize {
		self.registry.read().len()
	}

	/// Names of every registered definition, in registration order.
	pub fn definition_names(&self) -> Vec<String> {
		self.registry.read().names()
	}

	/// Whether `name` has a definition or a finished instance.
	pub fn contains_bean(&self, name: &str) -> bool {
		self.cache.contains_finished(name) || self.contains_definition(name)
	}

	/// Whether `name` has a definition.
	pub fn contains_definition(&self, name: &str) -> bool {
		self.registry.read().contains(name)
	}

	/// Definition of the bean named `name`.
	pub fn definition(&self, name: &str) -> DiResult<BeanDefinition> {
		Ok(self.registry.read().entry(name)?.definition.clone())
	}

	/// Definition of the unique scanned bean viewable as `T`.
	pub fn definition_of_type<T: ?Sized + 'static>(&self) -> DiResult<BeanDefinition> {
		let registry = self.registry.read();
		let name = registry.unique_name(TypeKey::of::<T>())?;
		Ok(registry.entry(&name)?.definition.clone())
	}

	/// Definition of the bean named `name`, which must be viewable as `T`.
	pub fn definition_named<T: ?Sized + 'static>(&self, name: &str) -> DiResult<BeanDefinition> {
		let registry = self.registry.read();
		let entry = registry.entry(name)?;
		let requested = TypeKey::of::<T>();
		if !entry.views.contains(requested.id()) {
			return Err(DiError::TypeMismatch {
				name: name.to_string(),
				expected: requested.name().to_string(),
			});
		}
		Ok(entry.definition.clone())
	}

	/// Tier currently holding the singleton `name`, if any.
	pub fn lifecycle_tier(&self, name: &str) -> Option<Tier> {
		self.cache.tier_of(name)
	}

	/// Settings the context was built with.
	pub fn settings(&self) -> &Settings {
		&self.settings
	}
}

impl fmt::Debug for ApplicationContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ApplicationContext")
			.field("definitions", &self.definition_names())
			.field("extensions", &self.extensions.len())
			.field("weaver", &self.weaver.is_some())
			.finish()
	}
}

/// State of one top-level lookup.
struct Lookup {
	tracker: ResolutionTracker,
	/// Singletons built by this lookup, promoted when the outermost
	/// materialization completes
	pending: RefCell<Vec<String>>,
}

/// Dependency resolution within one top-level lookup.
struct Resolution<'a> {
	context: &'a ApplicationContext,
	lookup: &'a Lookup,
}

impl DependencyResolver for Resolution<'_> {
	fn resolve_dependency(&self, qualifier: Option<&str>, view: TypeKey) -> DiResult<ErasedView> {
		self.context.resolve_view(qualifier, view, self.lookup)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::autowired::Autowired;
	use crate::component::Component;
	use rstest::rstest;

	#[derive(Default)]
	struct Jack {
		bean: Autowired<Bean>,
	}

	#[derive(Default)]
	struct Bean {
		jack: Autowired<Jack>,
	}

	fn jack() -> Component<Jack> {
		Component::<Jack>::new().autowired::<Bean>("bean", |jack| &jack.bean)
	}

	fn bean() -> Component<Bean> {
		Component::<Bean>::new().autowired::<Jack>("jack", |bean| &bean.jack)
	}

	#[rstest]
	fn test_eager_singletons_are_finished_after_build() {
		let context = ApplicationContext::builder()
			.component(jack())
			.component(bean())
			.build()
			.unwrap();

		assert_eq!(context.lifecycle_tier("jack"), Some(Tier::Finished));
		assert_eq!(context.lifecycle_tier("bean"), Some(Tier::Finished));
	}

	#[rstest]
	fn test_lazy_singleton_waits_for_lookup() {
		// Arrange
		let context = ApplicationContext::builder()
			.component(jack().lazy())
			.component(bean().lazy())
			.build()
			.unwrap();
		assert_eq!(context.lifecycle_tier("jack"), None);

		// Act
		let jack = context.get::<Jack>("jack").unwrap();

		// Assert
		let bean = context.get::<Bean>("bean").unwrap();
		assert!(Arc::ptr_eq(jack.bean.get().unwrap(), &bean));
		assert!(Arc::ptr_eq(bean.jack.get().unwrap(), &jack));
		assert_eq!(context.lifecycle_tier("jack"), Some(Tier::Finished));
	}

	#[rstest]
	fn test_unknown_name() {
		let context = ApplicationContext::builder().build().unwrap();

		assert!(matches!(context.get_bean("ghost"), Err(DiError::NoSuchBean(_))));
		assert!(!context.contains_bean("ghost"));
	}

	#[rstest]
	fn test_failed_lazy_singleton_leaves_no_in_progress_entry() {
		#[derive(Default)]
		struct Broken {
			missing: Autowired<String>,
		}

		let context = ApplicationContext::builder()
			.component(
				Component::<Broken>::new()
					.lazy()
					.autowired::<String>("missing", |broken| &broken.missing),
			)
			.build()
			.unwrap();

		assert!(context.get_bean("broken").is_err());
		assert_eq!(context.lifecycle_tier("broken"), None);
	}

	#[rstest]
	fn test_failed_lookup_rolls_back_dependencies_built_on_the_way() {
		// Arrange
		#[derive(Default)]
		struct Alpha {
			beta: Autowired<Beta>,
			missing: Autowired<String>,
		}
		#[derive(Default)]
		struct Beta {
			alpha: Autowired<Alpha>,
		}

		let context = ApplicationContext::builder()
			.component(
				Component::<Alpha>::new()
					.lazy()
					.autowired::<Beta>("beta", |alpha| &alpha.beta)
					.autowired::<String>("missing", |alpha| &alpha.missing),
			)
			.component(
				Component::<Beta>::new()
					.lazy()
					.autowired::<Alpha>("alpha", |beta| &beta.alpha),
			)
			.build()
			.unwrap();

		// Act
		let result = context.get_bean("alpha");

		// Assert
		assert!(matches!(result, Err(DiError::NoSuchBean(_))));
		assert_eq!(context.lifecycle_tier("alpha"), None);
		assert_eq!(context.lifecycle_tier("beta"), None);
		assert!(context.get_bean("beta").is_err());
		assert_eq!(context.lifecycle_tier("beta"), None);
	}

	#[rstest]
	fn test_concurrent_lookup_waits_for_wiring() {
		use std::thread;
		use std::time::Duration;

		// Arrange
		#[derive(Default)]
		struct Front {
			slow: Autowired<Slow>,
		}
		struct Slow;

		let context = ApplicationContext::builder()
			.component(
				Component::<Front>::new()
					.lazy()
					.autowired::<Slow>("slow", |front| &front.slow),
			)
			.component(Component::<Slow>::declare().lazy().constructor(|| {
				thread::sleep(Duration::from_millis(300));
				Slow
			}))
			.build()
			.unwrap();

		// Act
		let (first, second) = thread::scope(|scope| {
			let first = scope.spawn(|| context.get::<Front>("front").unwrap());
			thread::sleep(Duration::from_millis(100));
			let second = scope.spawn(|| context.get::<Front>("front").unwrap());
			(first.join().unwrap(), second.join().unwrap())
		});

		// Assert
		assert!(second.slow.is_set());
		assert!(Arc::ptr_eq(&first, &second));
	}

	#[rstest]
	fn test_depth_limit_from_settings() {
		#[derive(Default)]
		struct Head {
			tail: Autowired<Tail>,
		}
		#[derive(Default)]
		struct Tail;

		let mut settings = Settings::default();
		settings.container.max_resolution_depth = 1;
		let context = ApplicationContext::builder()
			.settings(settings)
			.component(
				Component::<Head>::new()
					.prototype()
					.autowired::<Tail>("tail", |head| &head.tail),
			)
			.component(Component::<Tail>::new().prototype())
			.build()
			.unwrap();

		let result = context.get_bean("head");

		assert!(matches!(result, Err(DiError::CircularDependency(_))));
		assert!(context.get_bean("tail").is_ok());
	}
}
