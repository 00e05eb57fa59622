//! Factory methods of configuration components

use beanstalk_di::{ApplicationContext, Autowired, BeanOrigin, Component, DiError, Tier};
use rstest::rstest;
use std::sync::Arc;

#[derive(Debug, PartialEq)]
struct Widget {
	label: String,
}

#[derive(Default)]
struct Greeting {
	text: String,
}

#[derive(Default)]
struct AppConfig {
	greeting: Autowired<Greeting>,
}

fn app_config() -> Component<AppConfig> {
	Component::<AppConfig>::new()
		.configuration()
		.autowired::<Greeting>("greeting", |config| &config.greeting)
		.bean("widget", |config| Widget {
			label: format!("{} widget", config.greeting.get().map_or("", |g| g.text.as_str())),
		})
}

fn greeting() -> Component<Greeting> {
	Component::<Greeting>::new().value::<String>("text", "hello", |g, text| g.text = text)
}

#[rstest]
fn test_factory_method_registers_bean() {
	// Arrange & Act
	let context = ApplicationContext::builder()
		.component(app_config())
		.component(greeting())
		.build()
		.unwrap();

	// Assert
	let widget = context.get::<Widget>("widget").unwrap();
	assert_eq!(widget.label, "hello widget");
	assert_eq!(context.lifecycle_tier("widget"), Some(Tier::Finished));

	let definition = context.definition("widget").unwrap();
	assert!(definition.is_eager_singleton());
	assert_eq!(
		definition.origin(),
		&BeanOrigin::Factory {
			configuration: "appConfig".to_string(),
			method: "widget",
		}
	);
	assert_eq!(context.definition_count(), 3);
}

#[rstest]
fn test_factory_bean_is_a_singleton() {
	let context = ApplicationContext::builder()
		.component(app_config())
		.component(greeting())
		.build()
		.unwrap();

	let first = context.get::<Widget>("widget").unwrap();
	let second = context.get::<Widget>("widget").unwrap();

	assert!(Arc::ptr_eq(&first, &second));
}

#[rstest]
fn test_factory_bean_is_found_by_name_and_type_only() {
	let context = ApplicationContext::builder()
		.component(app_config())
		.component(greeting())
		.build()
		.unwrap();

	assert!(context.definition_named::<Widget>("widget").is_ok());
	assert!(matches!(
		context.get_by_type::<Widget>(),
		Err(DiError::NoSuchBean(_))
	));
}

#[rstest]
fn test_explicit_bean_name() {
	let context = ApplicationContext::builder()
		.component(
			Component::<Greeting>::new()
				.configuration()
				.bean_named("widget", "mainWidget", |_| Widget {
					label: "main".to_string(),
				}),
		)
		.build()
		.unwrap();

	assert!(!context.contains_bean("widget"));
	assert_eq!(context.get::<Widget>("mainWidget").unwrap().label, "main");
}

#[rstest]
fn test_duplicate_factory_name_fails() {
	let result = ApplicationContext::builder()
		.component(
			Component::<Greeting>::new()
				.configuration()
				.bean("widget", |_| Widget {
					label: "first".to_string(),
				})
				.bean_named("otherWidget", "widget", |_| Widget {
					label: "second".to_string(),
				}),
		)
		.build();

	assert!(matches!(result, Err(DiError::DuplicateBeanName(name)) if name == "widget"));
}

#[rstest]
fn test_factory_name_clashing_with_component_fails() {
	let result = ApplicationContext::builder()
		.component(app_config())
		.component(greeting().named("widget"))
		.build();

	assert!(matches!(result, Err(DiError::DuplicateBeanName(name)) if name == "widget"));
}

#[rstest]
fn test_second_expansion_fails() {
	let context = ApplicationContext::builder()
		.component(app_config())
		.component(greeting())
		.build()
		.unwrap();

	let result = context.expand_configuration();

	assert!(matches!(result, Err(DiError::DuplicateBeanName(_))));
	assert_eq!(context.get::<Widget>("widget").unwrap().label, "hello widget");
}

#[rstest]
fn test_non_configuration_factories_are_ignored() {
	let context = ApplicationContext::builder()
		.component(Component::<Greeting>::new().bean("widget", |_| Widget {
			label: "never".to_string(),
		}))
		.build()
		.unwrap();

	assert!(!context.contains_bean("widget"));
}

#[rstest]
fn test_lazy_configuration_is_not_expanded() {
	let context = ApplicationContext::builder()
		.component(app_config().lazy())
		.component(greeting())
		.build()
		.unwrap();

	assert!(!context.contains_definition("widget"));
}
