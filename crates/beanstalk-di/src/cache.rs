//! The three-tier lifecycle cache.
//!
//! A singleton lives in exactly one tier at a time:
//!
//! - **in-progress real**: constructed, literals assigned, not yet wired
//! - **in-progress proxy**: a proxy built for an in-progress bean, parked next
//!   to the real object until promotion
//! - **finished**: fully wired; the only tier prototypes never reach
//!
//! Promotion moves a bean to the finished tier under one write lock, so
//! readers see it in exactly one tier. Lookups check finished, then proxy,
//! then real: a half-built bean is still handed out, which is what lets
//! singleton cycles close.

use crate::error::{DiError, DiResult};
use crate::view::BeanRef;
use indexmap::IndexMap;
use parking_lot::RwLock;

/// Tier a singleton currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
	/// Fully wired
	Finished,
	/// Proxy waiting for promotion
	InProgressProxy,
	/// Constructed but not yet wired
	InProgressReal,
}

#[derive(Default)]
struct Tiers {
	finished: IndexMap<String, BeanRef>,
	early_proxy: IndexMap<String, BeanRef>,
	early_real: IndexMap<String, BeanRef>,
}

#[derive(Default)]
pub(crate) struct LifecycleCache {
	tiers: RwLock<Tiers>,
}

impl LifecycleCache {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// First hit in finished, in-progress proxy, in-progress real order.
	pub(crate) fn lookup(&self, name: &str) -> Option<BeanRef> {
		let tiers = self.tiers.read();
		tiers
			.finished
			.get(name)
			.or_else(|| tiers.early_proxy.get(name))
			.or_else(|| tiers.early_real.get(name))
			.cloned()
	}

	pub(crate) fn tier_of(&self, name: &str) -> Option<Tier> {
		let tiers = self.tiers.read();
		if tiers.finished.contains_key(name) {
			Some(Tier::Finished)
		} else if tiers.early_proxy.contains_key(name) {
			Some(Tier::InProgressProxy)
		} else if tiers.early_real.contains_key(name) {
			Some(Tier::InProgressReal)
		} else {
			None
		}
	}

	pub(crate) fn finished(&self, name: &str) -> Option<BeanRef> {
		self.tiers.read().finished.get(name).cloned()
	}

	pub(crate) fn contains_finished(&self, name: &str) -> bool {
		self.tiers.read().finished.contains_key(name)
	}

	/// The unwired object of an in-progress singleton.
	pub(crate) fn in_progress_real(&self, name: &str) -> Option<BeanRef> {
		self.tiers.read().early_real.get(name).cloned()
	}

	/// Snapshot of in-progress names, in instantiation order.
	pub(crate) fn in_progress_names(&self) -> Vec<String> {
		self.tiers.read().early_real.keys().cloned().collect()
	}

	pub(crate) fn insert_in_progress(&self, name: &str, bean: BeanRef) -> DiResult<()> {
		let mut tiers = self.tiers.write();
		if tiers.early_real.contains_key(name) || tiers.finished.contains_key(name) {
			return Err(DiError::DuplicateBeanName(name.to_string()));
		}
		tiers.early_real.insert(name.to_string(), bean);
		Ok(())
	}

	pub(crate) fn insert_proxy(&self, name: &str, proxy: BeanRef) -> DiResult<()> {
		let mut tiers = self.tiers.write();
		if !tiers.early_real.contains_key(name) {
			return Err(DiError::NoSuchBean(name.to_string()));
		}
		tiers.early_proxy.insert(name.to_string(), proxy);
		Ok(())
	}

	/// Insert a bean that needs no wiring, such as a factory product.
	pub(crate) fn insert_finished(&self, name: &str, bean: BeanRef) -> DiResult<()> {
		let mut tiers = self.tiers.write();
		if tiers.finished.contains_key(name) {
			return Err(DiError::DuplicateBeanName(name.to_string()));
		}
		tiers.finished.insert(name.to_string(), bean);
		Ok(())
	}

	/// Move an in-progress singleton to the finished tier, preferring its proxy.
	///
	/// Returns the finished bean, or `None` if `name` was in no tier.
	pub(crate) fn promote(&self, name: &str) -> Option<BeanRef> {
		let mut tiers = self.tiers.write();
		let proxy = tiers.early_proxy.shift_remove(name);
		let real = tiers.early_real.shift_remove(name);
		match proxy.or(real) {
			Some(bean) => {
				tiers.finished.insert(name.to_string(), bean.clone());
				Some(bean)
			}
			None => tiers.finished.get(name).cloned(),
		}
	}

	/// Drop an in-progress singleton whose construction failed.
	pub(crate) fn discard_in_progress(&self, name: &str) {
		let mut tiers = self.tiers.write();
		tiers.early_proxy.shift_remove(name);
		tiers.early_real.shift_remove(name);
	}
}
