//! Startup extension hooks.
//!
//! Extensions run in registration order at fixed points of context startup.
//! Every hook has a no-op default; an error from any hook aborts startup and
//! is returned from [`ApplicationContextBuilder::build`].
//!
//! | Stage | Hook | Runs |
//! |-------|------|------|
//! | scan | [`on_definition`](Extension::on_definition) | once per definition |
//! | scan | [`after_scan`](Extension::after_scan) | once |
//! | instantiate | [`on_instance`](Extension::on_instance) | once per eager singleton |
//! | instantiate | [`after_instantiate`](Extension::after_instantiate) | once |
//! | proxy | [`on_intercept`](Extension::on_intercept) | once per join point |
//! | proxy | [`after_proxy`](Extension::after_proxy) | once |
//! | autowire | [`on_bean`](Extension::on_bean) | once per eager singleton |
//! | autowire | [`after_autowire`](Extension::after_autowire) | once |
//! | configuration | [`before_configuration`](Extension::before_configuration), [`after_configuration`](Extension::after_configuration) | once each |
//!
//! [`ApplicationContextBuilder::build`]: crate::ApplicationContextBuilder::build

use crate::context::ApplicationContext;
use crate::definition::BeanDefinition;
use crate::error::DiResult;
use crate::proxy::JoinPoint;
use crate::view::BeanRef;

/// Observer of context startup.
#[allow(unused_variables)]
pub trait Extension: Send + Sync {
	/// Name used when attributing failures
	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}

	/// A definition was registered.
	fn on_definition(&self, context: &ApplicationContext, definition: &BeanDefinition) -> DiResult<()> {
		Ok(())
	}

	/// All definitions are registered.
	fn after_scan(&self, context: &ApplicationContext) -> DiResult<()> {
		Ok(())
	}

	/// An eager singleton was constructed, before wiring.
	fn on_instance(&self, context: &ApplicationContext, name: &str, bean: &BeanRef) -> DiResult<()> {
		Ok(())
	}

	/// All eager singletons are constructed.
	fn after_instantiate(&self, context: &ApplicationContext) -> DiResult<()> {
		Ok(())
	}

	/// Advice was bound to a method of an in-progress singleton.
	fn on_intercept(&self, context: &ApplicationContext, join_point: &JoinPoint) -> DiResult<()> {
		Ok(())
	}

	/// The proxy stage is complete.
	fn after_proxy(&self, context: &ApplicationContext) -> DiResult<()> {
		Ok(())
	}

	/// An eager singleton is wired and finished.
	fn on_bean(&self, context: &ApplicationContext, name: &str, bean: &BeanRef) -> DiResult<()> {
		Ok(())
	}

	/// All eager singletons are wired.
	fn after_autowire(&self, context: &ApplicationContext) -> DiResult<()> {
		Ok(())
	}

	/// Configuration expansion is about to start.
	fn before_configuration(&self, context: &ApplicationContext) -> DiResult<()> {
		Ok(())
	}

	/// Configuration expansion is complete.
	fn after_configuration(&self, context: &ApplicationContext) -> DiResult<()> {
		Ok(())
	}
}
