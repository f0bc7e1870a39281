//! Form state, validation and submission for formkit
//!
//! This crate provides:
//! - A typed form state engine with touched / dirty tracking ([`Form`])
//! - Composable field validators and per-form rule sets
//! - A schema adapter that maps structured violations onto fields
//! - An async submission pipeline with notifications and mount-safety
//! - Field binding for rendering layers, and multi-step wizards

pub mod bound_field;
pub mod form;
pub mod schema;
pub mod submit;
pub mod validators;
pub mod wizard;

pub use bound_field::{BoundField, FieldProps};
pub use form::{FORM_ERROR_KEY, Form, FormError, FormResult, FormState, FormValues};
pub use schema::{FnSchema, PathSegment, Schema, SchemaError, Violation};
pub use submit::{
	SubmissionOutcome, SubmitAction, SubmitError, SubmitHandler, SubmitOptions,
	create_submit_handler,
};
pub use validators::{FieldRules, Rule, RuleSet};
pub use wizard::{FormWizard, WizardError, WizardStep};

/// Re-export commonly used types
pub mod prelude {
	pub use crate::bound_field::*;
	pub use crate::form::*;
	pub use crate::schema::{FnSchema, PathSegment, Schema, SchemaError, Violation};
	pub use crate::submit::*;
	pub use crate::validators::{self, FieldRules, Rule, RuleSet};
	pub use crate::wizard::*;
}
