//! Definition registry and type index.

use crate::component::Blueprint;
use crate::definition::{BeanDefinition, BeanOrigin, BeanScope, TypeKey, default_bean_name};
use crate::error::{DiError, DiResult};
use crate::proxy::AdviceDecl;
use crate::view::{BeanRef, ErasedView, ViewTable};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) struct RegistryEntry {
	pub(crate) definition: BeanDefinition,
	pub(crate) views: ViewTable,
	/// `None` for factory-produced beans
	pub(crate) blueprint: Option<Arc<dyn Blueprint>>,
}

/// Definitions keyed by name, in registration order.
///
/// Type lookups only consider scanned definitions; beans produced by factory
/// methods are reachable by name only.
#[derive(Default)]
pub(crate) struct DefinitionRegistry {
	by_name: IndexMap<String, RegistryEntry>,
	/// Memoized candidate names per requested type
	type_index: Mutex<HashMap<TypeId, Arc<[String]>>>,
}

impl DefinitionRegistry {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Derive the definition of a scanned component and register it.
	pub(crate) fn register_component(&mut self, blueprint: Arc<dyn Blueprint>) -> DiResult<BeanDefinition> {
		let bean_type = blueprint.bean_type();
		let name = blueprint
			.declared_name()
			.map(str::to_string)
			.unwrap_or_else(|| default_bean_name(bean_type.simple_name()));
		let scope = match blueprint.declared_scope() {
			Some(declared) => BeanScope::parse(declared).ok_or_else(|| DiError::IllegalScope {
				scope: declared.to_string(),
				type_name: bean_type.name().to_string(),
			})?,
			None => BeanScope::Singleton,
		};

		if !blueprint.factory_methods().is_empty() && !blueprint.is_configuration() {
			tracing::warn!(
				"Component '{}' declares factory methods but is not a configuration; they will not be expanded",
				name
			);
		}

		let definition = BeanDefinition::new(
			name,
			bean_type,
			scope,
			blueprint.is_lazy(),
			BeanOrigin::Scanned,
		);
		let views = blueprint.views().clone();
		self.register(definition.clone(), views, Some(blueprint))?;
		Ok(definition)
	}

	pub(crate) fn register(
		&mut self,
		definition: BeanDefinition,
		views: ViewTable,
		blueprint: Option<Arc<dyn Blueprint>>,
	) -> DiResult<()> {
		if self.by_name.contains_key(definition.name()) {
			return Err(DiError::DuplicateBeanName(definition.name().to_string()));
		}
		if !definition.is_factory_produced() {
			self.type_index.lock().clear();
		}

		tracing::debug!(
			"Registered bean '{}' ({}, {})",
			definition.name(),
			definition.bean_type(),
			definition.scope()
		);
		self.by_name.insert(
			definition.name().to_string(),
			RegistryEntry {
				definition,
				views,
				blueprint,
			},
		);
		Ok(())
	}

	pub(crate) fn get(&self, name: &str) -> Option<&RegistryEntry> {
		self.by_name.get(name)
	}

	pub(crate) fn entry(&self, name: &str) -> DiResult<&RegistryEntry> {
		self.get(name)
			.ok_or_else(|| DiError::NoSuchBean(name.to_string()))
	}

	pub(crate) fn contains(&self, name: &str) -> bool {
		self.by_name.contains_key(name)
	}

	pub(crate) fn len(&self) -> usize {
		self.by_name.len()
	}

	pub(crate) fn names(&self) -> Vec<String> {
		self.by_name.keys().cloned().collect()
	}

	pub(crate) fn definitions(&self) -> Vec<BeanDefinition> {
		self.by_name
			.values()
			.map(|entry| entry.definition.clone())
			.collect()
	}

	/// Names of scanned definitions viewable as `requested`, in registration order.
	pub(crate) fn candidates(&self, requested: TypeKey) -> Arc<[String]> {
		let mut index = self.type_index.lock();
		index
			.entry(requested.id())
			.or_insert_with(|| {
				self.by_name
					.values()
					.filter(|entry| !entry.definition.is_factory_produced())
					.filter(|entry| entry.views.contains(requested.id()))
					.map(|entry| entry.definition.name().to_string())
					.collect()
			})
			.clone()
	}

	/// The single scanned definition viewable as `requested`.
	pub(crate) fn unique_name(&self, requested: TypeKey) -> DiResult<String> {
		let candidates = self.candidates(requested);
		match candidates.as_ref() {
			[name] => Ok(name.clone()),
			[] => Err(DiError::NoSuchBean(requested.name().to_string())),
			_ => Err(DiError::DuplicateBeanClass {
				type_name: requested.name().to_string(),
				candidates: candidates.to_vec(),
			}),
		}
	}

	pub(crate) fn view_erased(&self, name: &str, bean: BeanRef, view: TypeKey) -> DiResult<ErasedView> {
		self.entry(name)?
			.views
			.view_erased(view.id(), bean)
			.ok_or_else(|| DiError::TypeMismatch {
				name: name.to_string(),
				expected: view.name().to_string(),
			})
	}

	pub(crate) fn view<V: ?Sized + Send + Sync + 'static>(&self, name: &str, bean: BeanRef) -> DiResult<Arc<V>> {
		self.entry(name)?
			.views
			.view::<V>(bean)
			.ok_or_else(|| DiError::TypeMismatch {
				name: name.to_string(),
				expected: std::any::type_name::<V>().to_string(),
			})
	}

	/// Aspect components and their advice, in registration order.
	pub(crate) fn aspects(&self) -> Vec<(String, Vec<AdviceDecl>)> {
		self.by_name
			.iter()
			.filter_map(|(name, entry)| {
				let advice = entry.blueprint.as_ref()?.advice();
				(!advice.is_empty()).then(|| (name.clone(), advice.to_vec()))
			})
			.collect()
	}

	/// Configuration components, in registration order.
	pub(crate) fn configurations(&self) -> Vec<(String, Arc<dyn Blueprint>)> {
		self.by_name
			.iter()
			.filter_map(|(name, entry)| {
				let blueprint = entry.blueprint.as_ref()?;
				blueprint
					.is_configuration()
					.then(|| (name.clone(), Arc::clone(blueprint)))
			})
			.collect()
	}
}
