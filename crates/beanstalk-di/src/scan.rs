//! Component discovery.
//!
//! A package is a Rust module path such as `my_app::services`. Scanning a
//! package yields every component declared in that module or any module
//! below it.
//!
//! Components registered with [`register_component!`](crate::register_component)
//! are collected at link time through `inventory` and found by
//! [`InventoryScanner`]; [`ComponentSet`] is an explicit alternative.

use crate::component::Blueprint;
use crate::error::DiResult;
use indexmap::IndexMap;
use std::sync::Arc;

/// Discovers the components of a package.
pub trait ComponentScanner: Send + Sync {
	/// Components declared in `package` or below it.
	fn scan(&self, package: &str) -> DiResult<Vec<Arc<dyn Blueprint>>>;
}

/// Whether `module_path` is `package` or nested below it.
pub fn in_package(module_path: &str, package: &str) -> bool {
	match module_path.strip_prefix(package) {
		Some("") => true,
		Some(rest) => rest.starts_with("::"),
		None => false,
	}
}

/// A component submitted with [`register_component!`](crate::register_component).
pub struct ComponentRegistration {
	module_path: &'static str,
	build: fn() -> Arc<dyn Blueprint>,
}

impl ComponentRegistration {
	/// Registration of the component built by `build`, declared in `module_path`.
	pub const fn new(module_path: &'static str, build: fn() -> Arc<dyn Blueprint>) -> Self {
		Self { module_path, build }
	}

	/// Module the component was registered from
	pub fn module_path(&self) -> &'static str {
		self.module_path
	}

	/// Build the component declaration
	pub fn build(&self) -> Arc<dyn Blueprint> {
		(self.build)()
	}
}

inventory::collect!(ComponentRegistration);

/// Register a component for [`InventoryScanner`].
///
/// Takes the path of a function returning the component declaration. The
/// component belongs to the package of the module the macro is invoked in.
///
/// ```
/// use beanstalk_di::{Component, register_component};
///
/// #[derive(Default)]
/// struct Ledger;
///
/// fn ledger() -> Component<Ledger> {
///     Component::new()
/// }
///
/// register_component!(ledger);
/// ```
#[macro_export]
macro_rules! register_component {
	($factory:path) => {
		const _: () = {
			fn __beanstalk_component() -> ::std::sync::Arc<dyn $crate::Blueprint> {
				::std::sync::Arc::new($factory())
			}

			$crate::inventory::submit! {
				$crate::scan::ComponentRegistration::new(
					::core::module_path!(),
					__beanstalk_component,
				)
			}
		};
	};
}

/// Scanner over components registered with `register_component!`.
///
/// Results are ordered by module path, then by type name, so startup order
/// does not depend on link order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryScanner;

impl ComponentScanner for InventoryScanner {
	fn scan(&self, package: &str) -> DiResult<Vec<Arc<dyn Blueprint>>> {
		let mut found: Vec<(&'static str, Arc<dyn Blueprint>)> = Vec::new();
		for registration in inventory::iter::<ComponentRegistration> {
			if in_package(registration.module_path(), package) {
				found.push((registration.module_path(), registration.build()));
			}
		}
		found.sort_by(|(a_path, a), (b_path, b)| {
			a_path
				.cmp(b_path)
				.then_with(|| a.bean_type().name().cmp(b.bean_type().name()))
		});

		tracing::debug!("Found {} registered components in {}", found.len(), package);
		Ok(found.into_iter().map(|(_, blueprint)| blueprint).collect())
	}
}

/// Explicit package-to-components table.
///
/// # Examples
///
/// ```
/// use beanstalk_di::{Component, ComponentScanner, ComponentSet};
///
/// #[derive(Default)]
/// struct Jack;
///
/// let set = ComponentSet::new().with("app::people", Component::<Jack>::new());
/// assert_eq!(set.scan("app").unwrap().len(), 1);
/// assert!(set.scan("other").unwrap().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct ComponentSet {
	packages: IndexMap<String, Vec<Arc<dyn Blueprint>>>,
}

impl ComponentSet {
	/// An empty set
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a component to `package`.
	pub fn add(&mut self, package: impl Into<String>, component: impl Blueprint + 'static) {
		self.packages
			.entry(package.into())
			.or_default()
			.push(Arc::new(component));
	}

	/// Builder form of [`add`](Self::add).
	pub fn with(mut self, package: impl Into<String>, component: impl Blueprint + 'static) -> Self {
		self.add(package, component);
		self
	}
}

impl ComponentScanner for ComponentSet {
	fn scan(&self, package: &str) -> DiResult<Vec<Arc<dyn Blueprint>>> {
		Ok(self
			.packages
			.iter()
			.filter(|(module_path, _)| in_package(module_path, package))
			.flat_map(|(_, components)| components.iter().cloned())
			.collect())
	}
}
