//! End-to-end scenario through the facade crate

use beanstalk::conf::{EnvSource, MemorySource, TomlFileSource};
use beanstalk::di::{BeanScope, ComponentSet, Tier};
use beanstalk::prelude::*;
use rstest::rstest;
use serial_test::serial;
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Default)]
struct Jack {
	age: i32,
	bean: Autowired<Bean>,
}

#[derive(Default)]
struct Bean {
	name: String,
	jack: Autowired<Jack>,
}

#[derive(Default)]
struct Visitor {
	jack: Autowired<Jack>,
}

#[derive(Default)]
struct AppConfig;

struct Widget {
	owner: String,
}

fn components() -> ComponentSet {
	ComponentSet::new()
		.with(
			"zoo::people",
			Component::<Jack>::new()
				.value::<i32>("age", "${jack.age}", |jack, age| jack.age = age)
				.autowired::<Bean>("bean", |jack| &jack.bean),
		)
		.with(
			"zoo::people",
			Component::<Bean>::new()
				.named("cp")
				.value::<String>("name", "cp", |bean, name| bean.name = name)
				.autowired::<Jack>("jack", |bean| &bean.jack),
		)
		.with(
			"zoo::people",
			Component::<Visitor>::new()
				.prototype()
				.qualified::<Jack>("jack", "jack", |visitor| &visitor.jack),
		)
		.with(
			"zoo::config",
			Component::<AppConfig>::new()
				.configuration()
				.bean("widget", |_| Widget {
					owner: "appConfig".to_string(),
				}),
		)
}

fn settings_file(dir: &TempDir) -> std::path::PathBuf {
	let path = dir.path().join("beanstalk.toml");
	std::fs::write(
		&path,
		r#"
[container]
max_resolution_depth = 16

[properties]
jack.age = "15"
"#,
	)
	.unwrap();
	path
}

#[rstest]
#[serial(beanstalk_env)]
fn test_jack_and_bean() {
	// Arrange
	let dir = TempDir::new().unwrap();
	let settings = Settings::builder()
		.add_source(MemorySource::new().with_property("jack.age", "1"))
		.add_source(TomlFileSource::new(settings_file(&dir)))
		.add_source(EnvSource::new("BEANSTALK_E2E_"))
		.build()
		.unwrap();

	// Act
	let context = ApplicationContext::builder()
		.settings(settings)
		.scanner(components())
		.package("zoo")
		.build()
		.unwrap();

	// Assert
	let jack = context.get::<Jack>("jack").unwrap();
	let bean = context.get::<Bean>("cp").unwrap();
	assert_eq!(jack.age, 15);
	assert_eq!(bean.name, "cp");
	assert!(Arc::ptr_eq(jack.bean.get().unwrap(), &bean));
	assert!(Arc::ptr_eq(bean.jack.get().unwrap(), &jack));
	assert_eq!(context.settings().container.max_resolution_depth, 16);

	let first = context.get::<Visitor>("visitor").unwrap();
	let second = context.get::<Visitor>("visitor").unwrap();
	assert!(!Arc::ptr_eq(&first, &second));
	assert!(Arc::ptr_eq(first.jack.get().unwrap(), &jack));

	let widget = context.get::<Widget>("widget").unwrap();
	assert_eq!(widget.owner, "appConfig");

	assert_eq!(
		context.definition_names(),
		vec!["jack", "cp", "visitor", "appConfig", "widget"]
	);
	assert_eq!(context.definition("visitor").unwrap().scope(), BeanScope::Prototype);
	assert_eq!(context.lifecycle_tier("jack"), Some(Tier::Finished));
	assert_eq!(context.lifecycle_tier("visitor"), None);
}

#[rstest]
#[serial(beanstalk_env)]
fn test_environment_overrides_literal_source() {
	// Arrange
	let dir = TempDir::new().unwrap();
	// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
	// This test uses #[serial] to ensure exclusive access to environment variables.
	unsafe {
		std::env::set_var("BEANSTALK_E2E_PROPERTIES__JACK__AGE", "30");
	}

	// Act
	let settings = Settings::builder()
		.add_source(TomlFileSource::new(settings_file(&dir)))
		.add_source(EnvSource::new("BEANSTALK_E2E_"))
		.build();

	// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
	// This test uses #[serial] to ensure exclusive access to environment variables.
	unsafe {
		std::env::remove_var("BEANSTALK_E2E_PROPERTIES__JACK__AGE");
	}

	// Assert
	let context = ApplicationContext::builder()
		.settings(settings.unwrap())
		.scanner(components())
		.package("zoo::people")
		.build()
		.unwrap();
	assert_eq!(context.get::<Jack>("jack").unwrap().age, 30);
	assert!(!context.contains_bean("widget"));
}

mod scenario {
	use beanstalk::prelude::*;

	#[derive(Default)]
	pub struct Jack {
		pub name: String,
		pub age: i32,
		pub bean: Autowired<Bean>,
	}

	#[derive(Default)]
	pub struct Bean {
		pub name: String,
		pub age: i32,
		pub jack: Autowired<Jack>,
	}

	pub fn jack() -> Component<Jack> {
		Component::<Jack>::new()
			.named("jack")
			.scope("singleton")
			.value::<String>("name", "jack", |jack: &mut Jack, name| jack.name = name)
			.value::<i32>("age", "15", |jack, age| jack.age = age)
			.qualified::<Bean>("bean", "bean", |jack| &jack.bean)
	}

	pub fn bean() -> Component<Bean> {
		Component::<Bean>::new()
			.named("bean")
			.scope("singleton")
			.value::<String>("name", "cp", |bean: &mut Bean, name| bean.name = name)
			.value::<i32>("age", "12", |bean, age| bean.age = age)
			.autowired::<Jack>("jack", |bean| &bean.jack)
	}
}

#[rstest]
fn test_jack_and_bean_literal_scenario() {
	// Arrange & Act
	let context = ApplicationContext::builder()
		.component(scenario::jack())
		.component(scenario::bean())
		.build()
		.unwrap();

	// Assert
	let jack = context.get::<scenario::Jack>("jack").unwrap();
	let bean = context.get::<scenario::Bean>("bean").unwrap();
	assert_eq!(jack.bean.get().unwrap().name, "cp");
	assert_eq!(bean.jack.get().unwrap().name, "jack");
	assert_eq!((jack.age, bean.age), (15, 12));
	assert!(Arc::ptr_eq(jack.bean.get().unwrap(), &bean));
	assert!(Arc::ptr_eq(bean.jack.get().unwrap(), &jack));
}
