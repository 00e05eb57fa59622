//! # Beanstalk Dependency Injection
//!
//! A container of named beans with literal field injection, autowiring by
//! name or type, and startup wiring that tolerates circular references
//! between singletons.
//!
//! ## Features
//!
//! - **Components**: declared with the [`Component`] builder, discovered by
//!   a [`ComponentScanner`] or registered directly
//! - **Scopes**: singletons (shared, optionally lazy) and prototypes (fresh
//!   per lookup)
//! - **Cycle-tolerant wiring**: singletons are shared while still half-built,
//!   so `A -> B -> A` resolves to the same two instances
//! - **Views**: beans can be requested as trait objects they declare with
//!   [`Component::provides`]
//! - **Configuration**: factory methods of configuration components produce
//!   further beans after wiring
//! - **Extensions**: hooks at every startup stage, and a proxy stage driven
//!   by aspect advice
//!
//! ## Example
//!
//! ```rust
//! use beanstalk_di::{ApplicationContext, Autowired, Component};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Jack {
//!     age: i32,
//!     bean: Autowired<Bean>,
//! }
//!
//! #[derive(Default)]
//! struct Bean {
//!     jack: Autowired<Jack>,
//! }
//!
//! let context = ApplicationContext::builder()
//!     .component(
//!         Component::<Jack>::new()
//!             .value::<i32>("age", "15", |jack, age| jack.age = age)
//!             .autowired::<Bean>("bean", |jack| &jack.bean),
//!     )
//!     .component(Component::<Bean>::new().autowired::<Jack>("jack", |bean| &bean.jack))
//!     .build()
//!     .unwrap();
//!
//! let jack = context.get::<Jack>("jack").unwrap();
//! let bean = context.get_by_type::<Bean>().unwrap();
//! assert_eq!(jack.age, 15);
//! assert!(Arc::ptr_eq(jack.bean.get().unwrap(), &bean));
//! assert!(Arc::ptr_eq(bean.jack.get().unwrap(), &jack));
//! ```

#![warn(missing_docs)]

pub mod autowired;
pub mod cache;
pub mod component;
pub mod context;
pub mod cycle_detection;
pub mod definition;
pub mod error;
pub mod extension;
pub mod literal;
pub mod proxy;
mod registry;
pub mod scan;
pub mod view;

pub use autowired::Autowired;
pub use cache::Tier;
pub use component::{Blueprint, Component, DependencyResolver, FactoryMethod};
pub use context::{ApplicationContext, ApplicationContextBuilder};
pub use cycle_detection::{CycleError, ResolutionGuard, ResolutionTracker};
pub use definition::{BeanDefinition, BeanOrigin, BeanScope, TypeKey, default_bean_name};
pub use error::{BoxError, DiError, DiResult};
pub use extension::Extension;
pub use literal::{Literal, LiteralValue, convert_literal};
pub use proxy::{Advice, AdviceDecl, AdviceKind, InterceptionPlan, JoinPoint, Weaver};
pub use scan::{ComponentRegistration, ComponentScanner, ComponentSet, InventoryScanner};
pub use view::{BeanRef, ErasedView, ViewTable};

pub use beanstalk_conf::Settings;

#[doc(hidden)]
pub use inventory;
