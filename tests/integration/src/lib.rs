//! Integration test utilities for formkit
//!
//! Shared records and forms used by the cross-crate flow tests.

use formkit::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUp {
	pub email: String,
	pub display_name: String,
}

/// Two-field sign-up form: a required email and a short display name.
pub fn sign_up_form() -> Form<SignUp> {
	let rules = RuleSet::new()
		.required("email", "Email is required")
		.rule("email", validators::email("Enter a valid email address"))
		.required("display_name", "Pick a display name")
		.rule("display_name", validators::max_length(16, "Keep it under 16 characters"));
	Form::new(
		SignUp {
			email: String::new(),
			display_name: String::new(),
		},
		rules,
	)
}
