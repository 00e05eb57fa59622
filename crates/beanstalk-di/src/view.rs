//! Type-erased beans and the views they can be handed out as.
//!
//! A bean is stored once as a [`BeanRef`]. Its [`ViewTable`] lists every type
//! it may be requested as: its own concrete type plus any trait objects the
//! component declared. Type-based lookup and typed retrieval both go through
//! this table, so "assignable to" means "has a view for".

use crate::definition::TypeKey;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A bean as stored by the container.
pub type BeanRef = Arc<dyn Any + Send + Sync>;

/// A view produced by a [`ViewTable`]: a boxed `Arc<V>` for some view type `V`.
pub type ErasedView = Box<dyn Any + Send + Sync>;

type Caster = Arc<dyn Fn(BeanRef) -> Option<ErasedView> + Send + Sync>;

/// Views a bean of one concrete type can be retrieved as.
#[derive(Clone)]
pub struct ViewTable {
	concrete: TypeKey,
	views: HashMap<TypeId, (TypeKey, Caster)>,
}

impl ViewTable {
	/// Table for `T` containing only the identity view.
	pub fn of<T: Any + Send + Sync>() -> Self {
		let mut table = Self {
			concrete: TypeKey::of::<T>(),
			views: HashMap::new(),
		};
		table.add::<T, T>(|bean| bean);
		table
	}

	/// Register `V` as a view of `T`.
	///
	/// Re-registering a view replaces the previous caster.
	pub fn add<T, V>(&mut self, cast: impl Fn(Arc<T>) -> Arc<V> + Send + Sync + 'static)
	where
		T: Any + Send + Sync,
		V: ?Sized + Send + Sync + 'static,
	{
		let caster: Caster = Arc::new(move |bean: BeanRef| {
			bean.downcast::<T>()
				.ok()
				.map(|concrete| Box::new(cast(concrete)) as ErasedView)
		});
		self.views.insert(TypeId::of::<V>(), (TypeKey::of::<V>(), caster));
	}

	/// Concrete type the table was built for
	pub fn concrete(&self) -> TypeKey {
		self.concrete
	}

	/// Whether the bean can be viewed as the type behind `id`
	pub fn contains(&self, id: TypeId) -> bool {
		self.views.contains_key(&id)
	}

	/// Every registered view
	pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
		self.views.values().map(|(key, _)| *key)
	}

	/// View `bean` as `V`; `None` if `V` is not registered or `bean` is not
	/// of the concrete type.
	pub fn view<V: ?Sized + Send + Sync + 'static>(&self, bean: BeanRef) -> Option<Arc<V>> {
		self.view_erased(TypeId::of::<V>(), bean)?
			.downcast::<Arc<V>>()
			.ok()
			.map(|view| *view)
	}

	pub(crate) fn view_erased(&self, id: TypeId, bean: BeanRef) -> Option<ErasedView> {
		let (_, caster) = self.views.get(&id)?;
		caster(bean)
	}
}

impl fmt::Debug for ViewTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewTable")
			.field("concrete", &self.concrete)
			.field("views", &self.keys().collect::<Vec<_>>())
			.finish()
	}
}
