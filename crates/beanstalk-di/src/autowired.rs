//! Write-once dependency slots.

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// A dependency field filled by the container after construction.
///
/// Beans are shared as `Arc`s before wiring finishes, so the slot is filled
/// through `&self`. Once set it never changes; a slot that is already set
/// when the container wires the bean is left alone.
///
/// `Debug` reports only whether the slot is set: wired beans may reference
/// each other in a cycle.
///
/// # Examples
///
/// ```
/// use beanstalk_di::Autowired;
/// use std::sync::Arc;
///
/// let slot: Autowired<String> = Autowired::new();
/// assert!(!slot.is_set());
/// assert!(slot.set(Arc::new("jack".to_string())));
/// assert!(!slot.set(Arc::new("bean".to_string())));
/// assert_eq!(slot.get().unwrap().as_str(), "jack");
/// ```
pub struct Autowired<T: ?Sized> {
	cell: OnceCell<Arc<T>>,
}

impl<T: ?Sized> Autowired<T> {
	/// An empty slot
	pub const fn new() -> Self {
		Self {
			cell: OnceCell::new(),
		}
	}

	/// A slot populated ahead of wiring
	pub fn with(value: Arc<T>) -> Self {
		Self {
			cell: OnceCell::with_value(value),
		}
	}

	/// The injected dependency, if wiring reached this slot
	pub fn get(&self) -> Option<&Arc<T>> {
		self.cell.get()
	}

	/// Whether the slot holds a value
	pub fn is_set(&self) -> bool {
		self.cell.get().is_some()
	}

	/// Fill the slot; returns `false` and drops `value` if it was already set.
	pub fn set(&self, value: Arc<T>) -> bool {
		self.cell.set(value).is_ok()
	}
}

impl<T: ?Sized> Default for Autowired<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: ?Sized> fmt::Debug for Autowired<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = if self.is_set() { "set" } else { "unset" };
		write!(f, "Autowired({})", state)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	trait Named: Send + Sync {
		fn name(&self) -> &str;
	}

	struct Jack;

	impl Named for Jack {
		fn name(&self) -> &str {
			"jack"
		}
	}

	#[rstest]
	fn test_holds_trait_object() {
		let slot: Autowired<dyn Named> = Autowired::new();

		slot.set(Arc::new(Jack));

		assert_eq!(slot.get().unwrap().name(), "jack");
	}

	#[rstest]
	fn test_prepopulated_slot_rejects_set() {
		let slot = Autowired::with(Arc::new(1_u8));

		assert!(slot.is_set());
		assert!(!slot.set(Arc::new(2)));
		assert_eq!(**slot.get().unwrap(), 1);
	}

	#[rstest]
	fn test_debug_shows_state_only() {
		let slot: Autowired<u8> = Autowired::default();
		assert_eq!(format!("{:?}", slot), "Autowired(unset)");
		slot.set(Arc::new(3));
		assert_eq!(format!("{:?}", slot), "Autowired(set)");
	}
}
