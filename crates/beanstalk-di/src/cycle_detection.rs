//! Circular dependency detection for on-demand materialization
//!
//! Bean construction that goes through the in-progress tiers never needs this:
//! a half-built singleton is handed out and the cycle closes by itself. What
//! cannot close is a chain of *fresh* instantiations that comes back to a bean
//! it is still building through prototypes only. A repeated name with a
//! singleton somewhere after its first occurrence is not a cycle: that
//! singleton sits in the in-progress tier and the second lookup stops there.
//! Each top-level lookup owns a [`ResolutionTracker`] and every fresh
//! instantiation holds a [`ResolutionGuard`] for its duration.
//!
//! ## Features
//!
//! - **Cache-aware Detection**: only all-prototype loops are reported
//! - **Depth Limiting**: a configurable bound stops pathological chains
//! - **RAII**: Automatic cleanup via `ResolutionGuard`

use std::cell::RefCell;

struct PathEntry {
	name: String,
	/// Whether the bean is parked in the in-progress tier while it is built
	cached: bool,
}

struct ResolutionState {
	/// Materialization order, for detecting and displaying circular paths
	resolution_path: Vec<PathEntry>,
}

/// Resolution path of a single top-level lookup.
pub struct ResolutionTracker {
	state: RefCell<ResolutionState>,
	max_depth: usize,
}

impl ResolutionTracker {
	/// Create an empty tracker allowing at most `max_depth` nested materializations.
	pub fn new(max_depth: usize) -> Self {
		Self {
			state: RefCell::new(ResolutionState {
				resolution_path: Vec::new(),
			}),
			max_depth,
		}
	}

	/// Record the start of a fresh materialization of `name`.
	///
	/// `cached` marks singletons, which are visible in the in-progress tier
	/// while they are built. The returned guard removes `name` from the path
	/// when dropped.
	pub fn begin(&self, name: &str, cached: bool) -> Result<ResolutionGuard<'_>, CycleError> {
		let mut state = self.state.borrow_mut();

		let depth = state.resolution_path.len() + 1;
		if depth > self.max_depth {
			return Err(CycleError::MaxDepthExceeded(depth));
		}

		if let Some(start) = state
			.resolution_path
			.iter()
			.rposition(|entry| entry.name == name)
		{
			let closes_through_cache = state.resolution_path[start..]
				.iter()
				.any(|entry| entry.cached);
			if !closes_through_cache {
				return Err(CycleError::CircularDependency {
					name: name.to_string(),
					path: build_cycle_path(&state.resolution_path[start..], name),
				});
			}
		}

		state.resolution_path.push(PathEntry {
			name: name.to_string(),
			cached,
		});

		Ok(ResolutionGuard {
			tracker: self,
			name: name.to_string(),
		})
	}

	/// Number of materializations currently in flight.
	pub fn depth(&self) -> usize {
		self.state.borrow().resolution_path.len()
	}

	/// Names currently being materialized, outermost first.
	pub fn path(&self) -> Vec<String> {
		self.state
			.borrow()
			.resolution_path
			.iter()
			.map(|entry| entry.name.clone())
			.collect()
	}
}

/// RAII guard: removes its bean from the resolution path on drop.
pub struct ResolutionGuard<'a> {
	tracker: &'a ResolutionTracker,
	name: String,
}

impl Drop for ResolutionGuard<'_> {
	fn drop(&mut self) {
		let mut state = self.tracker.state.borrow_mut();
		if let Some(pos) = state
			.resolution_path
			.iter()
			.rposition(|entry| entry.name == self.name)
		{
			state.resolution_path.remove(pos);
		}
	}
}

fn build_cycle_path(cycle: &[PathEntry], current: &str) -> String {
	let names: Vec<&str> = cycle.iter().map(|entry| entry.name.as_str()).collect();
	format!("{} -> {}", names.join(" -> "), current)
}

/// Circular dependency error
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
	/// Circular dependency detected
	#[error("Circular dependency detected: {name}\n  Path: {path}")]
	CircularDependency {
		/// Bean that was requested while already being built
		name: String,
		/// Circular path (format: a -> b -> a)
		path: String,
	},

	/// Maximum resolution depth exceeded
	#[error(
		"Maximum resolution depth exceeded: {0}\nThis likely indicates an extremely deep or circular dependency chain."
	)]
	MaxDepthExceeded(usize),
}
