//! Aspect advice and the proxy stage.
//!
//! Aspect components declare advice against a target type and method. At
//! startup the container groups the advice matching each in-progress
//! singleton into an [`InterceptionPlan`] and offers it to the configured
//! [`Weaver`]. A proxy returned by the weaver is parked in the in-progress
//! proxy tier and wins over the real object when the bean is promoted.
//!
//! The weaver must return a bean of the target's concrete type (a wrapped
//! copy, for example); typed lookups go through the target's view table.

use crate::definition::TypeKey;
use crate::error::DiResult;
use crate::view::BeanRef;
use std::fmt;

/// When an advice method runs relative to the target method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdviceKind {
	/// Before the call
	Before,
	/// After the call, whatever its outcome
	After,
	/// After the call failed
	AfterThrowing,
	/// After the call returned normally
	AfterReturning,
}

/// An advice declared by an aspect component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceDecl {
	/// Type the advice applies to; matches any bean with a view of this type
	pub target_type: TypeKey,
	/// Method of the target being advised
	pub target_method: &'static str,
	/// When the advice runs
	pub kind: AdviceKind,
	/// Method of the aspect to run
	pub advice_method: &'static str,
}

/// An advice bound to its aspect instance.
#[derive(Clone)]
pub struct Advice {
	/// Aspect bean name
	pub aspect: String,
	/// Aspect bean
	pub instance: BeanRef,
	/// Method of the aspect to run
	pub method: &'static str,
}

impl fmt::Debug for Advice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Advice")
			.field("aspect", &self.aspect)
			.field("method", &self.method)
			.finish()
	}
}

/// All advice for one method of one bean, grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct JoinPoint {
	/// Advised bean name
	pub target: String,
	/// Advised method
	pub method: &'static str,
	/// Advice run before the call
	pub before: Vec<Advice>,
	/// Advice run after the call
	pub after: Vec<Advice>,
	/// Advice run when the call fails
	pub after_throwing: Vec<Advice>,
	/// Advice run when the call returns
	pub after_returning: Vec<Advice>,
}

impl JoinPoint {
	pub(crate) fn new(target: &str, method: &'static str) -> Self {
		Self {
			target: target.to_string(),
			method,
			..Self::default()
		}
	}

	pub(crate) fn push(&mut self, kind: AdviceKind, advice: Advice) {
		match kind {
			AdviceKind::Before => self.before.push(advice),
			AdviceKind::After => self.after.push(advice),
			AdviceKind::AfterThrowing => self.after_throwing.push(advice),
			AdviceKind::AfterReturning => self.after_returning.push(advice),
		}
	}

	/// Total number of advice bound to this join point
	pub fn advice_count(&self) -> usize {
		self.before.len() + self.after.len() + self.after_throwing.len() + self.after_returning.len()
	}
}

/// Every join point of a single bean, in declaration order.
#[derive(Debug, Clone)]
pub struct InterceptionPlan {
	/// Advised bean name
	pub target: String,
	/// One entry per advised method
	pub join_points: Vec<JoinPoint>,
}

impl InterceptionPlan {
	pub(crate) fn new(target: &str) -> Self {
		Self {
			target: target.to_string(),
			join_points: Vec::new(),
		}
	}

	pub(crate) fn join_point_mut(&mut self, method: &'static str) -> &mut JoinPoint {
		let index = match self.join_points.iter().position(|jp| jp.method == method) {
			Some(index) => index,
			None => {
				self.join_points.push(JoinPoint::new(&self.target, method));
				self.join_points.len() - 1
			}
		};
		&mut self.join_points[index]
	}

	/// Whether no advice matched the bean
	pub fn is_empty(&self) -> bool {
		self.join_points.is_empty()
	}
}

/// Builds proxies for advised beans.
pub trait Weaver: Send + Sync {
	/// Return a replacement for `target`, or `None` to leave it unproxied.
	fn wrap(&self, name: &str, target: &BeanRef, plan: &InterceptionPlan)
	-> DiResult<Option<BeanRef>>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::Arc;

	fn advice(method: &'static str) -> Advice {
		Advice {
			aspect: "auditAspect".to_string(),
			instance: Arc::new(()),
			method,
		}
	}

	#[rstest]
	fn test_plan_groups_by_method_and_kind() {
		let mut plan = InterceptionPlan::new("jack");

		plan.join_point_mut("say").push(AdviceKind::Before, advice("log_start"));
		plan.join_point_mut("walk").push(AdviceKind::After, advice("log_end"));
		plan.join_point_mut("say").push(AdviceKind::AfterThrowing, advice("log_error"));

		assert_eq!(plan.join_points.len(), 2);
		let say = &plan.join_points[0];
		assert_eq!(say.target, "jack");
		assert_eq!(say.method, "say");
		assert_eq!(say.before[0].method, "log_start");
		assert_eq!(say.after_throwing[0].method, "log_error");
		assert_eq!(say.advice_count(), 2);
	}

	#[rstest]
	fn test_new_plan_is_empty() {
		assert!(InterceptionPlan::new("jack").is_empty());
	}
}
