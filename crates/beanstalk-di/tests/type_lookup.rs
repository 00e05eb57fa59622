//! Lookup by type and by trait view

use beanstalk_di::{ApplicationContext, Autowired, BeanScope, Component, DiError, TypeKey};
use rstest::rstest;
use std::sync::Arc;

trait Greeter: Send + Sync {
	fn greet(&self) -> String;
}

#[derive(Default)]
struct English;

impl Greeter for English {
	fn greet(&self) -> String {
		"hello".to_string()
	}
}

#[derive(Default)]
struct French;

impl Greeter for French {
	fn greet(&self) -> String {
		"bonjour".to_string()
	}
}

#[derive(Default)]
struct Host {
	greeter: Autowired<dyn Greeter>,
}

fn english() -> Component<English> {
	Component::<English>::new().provides::<dyn Greeter>(|bean| bean as Arc<dyn Greeter>)
}

fn french() -> Component<French> {
	Component::<French>::new().provides::<dyn Greeter>(|bean| bean as Arc<dyn Greeter>)
}

#[rstest]
fn test_unique_trait_view() {
	// Arrange
	let context = ApplicationContext::builder()
		.component(english())
		.component(Component::<Host>::new().autowired::<dyn Greeter>("greeter", |host| &host.greeter))
		.build()
		.unwrap();

	// Act
	let greeter = context.get_by_type::<dyn Greeter>().unwrap();
	let host = context.get_by_type::<Host>().unwrap();

	// Assert
	assert_eq!(greeter.greet(), "hello");
	assert_eq!(host.greeter.get().unwrap().greet(), "hello");
}

#[rstest]
fn test_ambiguous_type_lists_candidates() {
	let context = ApplicationContext::builder()
		.component(english())
		.component(french())
		.build()
		.unwrap();

	let result = context.get_by_type::<dyn Greeter>();

	match result {
		Err(DiError::DuplicateBeanClass { candidates, .. }) => {
			assert_eq!(candidates, vec!["english", "french"]);
		}
		other => panic!("expected ambiguity, got {:?}", other.err()),
	}
}

#[rstest]
fn test_ambiguous_dependency_aborts_startup() {
	let result = ApplicationContext::builder()
		.component(english())
		.component(french())
		.component(Component::<Host>::new().autowired::<dyn Greeter>("greeter", |host| &host.greeter))
		.build();

	assert!(matches!(result, Err(DiError::DuplicateBeanClass { .. })));
}

#[rstest]
fn test_qualifier_breaks_ambiguity() {
	let context = ApplicationContext::builder()
		.component(english())
		.component(french())
		.component(
			Component::<Host>::new().qualified::<dyn Greeter>("greeter", "french", |host| &host.greeter),
		)
		.build()
		.unwrap();

	let host = context.get::<Host>("host").unwrap();

	assert_eq!(host.greeter.get().unwrap().greet(), "bonjour");
}

#[rstest]
fn test_qualified_bean_without_view_is_mismatch() {
	#[derive(Default)]
	struct Mute;

	let result = ApplicationContext::builder()
		.component(Component::<Mute>::new())
		.component(Component::<Host>::new().qualified::<dyn Greeter>("greeter", "mute", |host| &host.greeter))
		.build();

	assert!(matches!(
		result,
		Err(DiError::TypeMismatch { name, .. }) if name == "mute"
	));
}

#[rstest]
fn test_missing_type() {
	let context = ApplicationContext::builder().component(english()).build().unwrap();

	assert!(matches!(context.get_by_type::<French>(), Err(DiError::NoSuchBean(_))));
	assert!(matches!(
		context.definition_of_type::<French>(),
		Err(DiError::NoSuchBean(_))
	));
}

#[rstest]
fn test_beans_of_type() {
	let context = ApplicationContext::builder()
		.component(english())
		.component(french())
		.build()
		.unwrap();

	let greeters = context.get_beans_of_type::<dyn Greeter>().unwrap();

	let greetings: Vec<(String, String)> = greeters
		.iter()
		.map(|(name, greeter)| (name.clone(), greeter.greet()))
		.collect();
	assert_eq!(
		greetings,
		vec![
			("english".to_string(), "hello".to_string()),
			("french".to_string(), "bonjour".to_string()),
		]
	);
}

#[rstest]
fn test_typed_get_with_wrong_type() {
	let context = ApplicationContext::builder().component(english()).build().unwrap();

	let result = context.get::<French>("english");

	assert!(matches!(result, Err(DiError::TypeMismatch { .. })));
}

#[rstest]
fn test_definition_queries() {
	// Arrange
	let context = ApplicationContext::builder()
		.component(english())
		.component(french().named("frenchGreeter").prototype())
		.build()
		.unwrap();

	// Act
	let by_type = context.definition_of_type::<French>().unwrap();
	let by_name = context.definition_named::<dyn Greeter>("frenchGreeter").unwrap();

	// Assert
	assert_eq!(by_type.name(), "frenchGreeter");
	assert_eq!(by_name.scope(), BeanScope::Prototype);
	assert_eq!(context.get_type("english").unwrap(), TypeKey::of::<English>());
	assert!(matches!(
		context.definition_named::<French>("english"),
		Err(DiError::TypeMismatch { .. })
	));
	assert_eq!(context.definition_names(), vec!["english", "frenchGreeter"]);
	assert_eq!(context.definition_count(), 2);
	assert!(context.contains_definition("frenchGreeter"));
	assert!(!context.contains_definition("french"));
}
