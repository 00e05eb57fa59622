//! # Beanstalk
//!
//! A small dependency injection container built around named beans.
//!
//! Components are declared with a builder, discovered by scanning module
//! paths, and wired at startup. Singletons may depend on each other in
//! cycles: a bean is shared as soon as it is constructed, and its dependency
//! fields are filled afterwards.
//!
//! ## Feature Flags
//!
//! - `di` - the container ([`di`])
//! - `conf` - layered settings and `${key}` placeholders ([`conf`])
//! - `full` (default) - both
//!
//! ## Quick Example
//!
//! ```rust
//! use beanstalk::prelude::*;
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
//!     name: String,
//!     jack: Autowired<Jack>,
//! }
//!
//! let settings = Settings::builder()
//!     .add_source(MemorySource::new().with_property("jack.age", "15"))
//!     .build()
//!     .unwrap();
//!
//! let context = ApplicationContext::builder()
//!     .settings(settings)
//!     .component(
//!         Component::<Jack>::new()
//!             .value::<i32>("age", "${jack.age}", |jack, age| jack.age = age)
//!             .autowired::<Bean>("bean", |jack| &jack.bean),
//!     )
//!     .component(
//!         Component::<Bean>::new()
//!             .value::<String>("name", "cp", |bean, name| bean.name = name)
//!             .autowired::<Jack>("jack", |bean| &bean.jack),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let jack = context.get::<Jack>("jack").unwrap();
//! assert_eq!(jack.age, 15);
//! assert_eq!(jack.bean.get().unwrap().name, "cp");
//! assert!(Arc::ptr_eq(jack.bean.get().unwrap().jack.get().unwrap(), &jack));
//! ```

/// Dependency injection container.
#[cfg(feature = "di")]
pub mod di {
	pub use beanstalk_di::*;
}

/// Layered settings.
#[cfg(feature = "conf")]
pub mod conf {
	pub use beanstalk_conf::*;
}

#[cfg(feature = "di")]
pub use beanstalk_di::{
	ApplicationContext, Autowired, Component, DiError, DiResult, register_component,
};

#[cfg(feature = "conf")]
pub use beanstalk_conf::{Settings, SettingsError};

/// Common imports.
pub mod prelude {
	#[cfg(feature = "di")]
	pub use beanstalk_di::{
		ApplicationContext, Autowired, BeanRef, Blueprint, Component, ComponentScanner,
		ComponentSet, DiError, DiResult, Extension, InventoryScanner, register_component,
	};

	#[cfg(feature = "conf")]
	pub use beanstalk_conf::{EnvSource, MemorySource, Settings, TomlFileSource};
}
