//! End-to-end onboarding flow tests
//!
//! Drives a two-step sign-up through the facade: wizard navigation, field
//! binding, submission and an error boundary around the submit button.

use formkit::prelude::*;
use formkit_integration_tests::{SignUp, sign_up_form};
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn test_wizard_then_submit() {
	// Arrange
	let form = sign_up_form();
	let mut wizard = FormWizard::new(form.clone())
		.step(WizardStep::new("credentials", ["email"]))
		.step(WizardStep::new("profile", ["display_name"]));
	let notifier = MemoryNotifier::new();
	let handler = create_submit_handler(
		form.clone(),
		|values: SignUp| async move {
			anyhow::ensure!(values.display_name != "admin", "Display name is reserved");
			Ok(())
		},
		SubmitOptions::default()
			.validate_rules(true)
			.reset_after_submit(true),
	)
	.with_notifier(notifier.clone());

	// Act
	assert!(wizard.next_step().is_err());
	form.bind_field("email").change("ada@example.com").unwrap();
	wizard.next_step().unwrap();
	form.bind_field("display_name").change("admin").unwrap();
	let rejected = handler.submit(form.values()).await;
	form.bind_field("display_name").change("ada").unwrap();
	let accepted = handler.submit(form.values()).await;

	// Assert
	assert!(!rejected);
	assert!(accepted);
	let levels: Vec<Level> = notifier.peek().iter().map(|n| n.level).collect();
	assert_eq!(levels, vec![Level::Error, Level::Success]);
	assert_eq!(notifier.peek()[0].message, "Display name is reserved");
	assert!(form.values().email.is_empty());
	assert!(!form.is_dirty());
}

#[rstest]
fn test_boundary_guards_handler_failure() {
	// Arrange
	let notifier = MemoryNotifier::new();
	let boundary: ErrorBoundary<String> = ErrorBoundary::new()
		.with_component("SignUpPage")
		.with_notifier(notifier.clone());

	// Act
	let clicked: Option<()> =
		boundary.run_handler(|| Err(anyhow::Error::new(ClientError::Network("offline".into()))));
	let rendered = boundary.render(|| Ok("form".to_string())).unwrap();

	// Assert
	assert!(clicked.is_none());
	assert!(rendered.is_fallback());
	assert_eq!(boundary.error().unwrap().code(), Some("NETWORK_ERROR"));
	assert_eq!(notifier.len(), 1);
}
