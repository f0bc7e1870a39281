//! Multi-step forms
//!
//! A [`FormWizard`] splits one [`Form`] into ordered steps. Each step owns a
//! subset of the fields; moving forward validates only that subset, moving
//! back never validates. Steps with a condition are skipped while the
//! condition is false for the current values.

use crate::form::{Form, FormValues};
use std::collections::HashSet;

type StepCondition<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WizardError {
	#[error("Wizard has no steps")]
	NoSteps,
	#[error("Already at last step")]
	AtLastStep,
	#[error("Already at first step")]
	AtFirstStep,
	#[error("No available step")]
	NoAvailableStep,
	#[error("Step '{step}' has invalid fields: {}", .fields.join(", "))]
	InvalidStep { step: String, fields: Vec<String> },
	#[error("Step '{0}' not found or not available")]
	StepNotFound(String),
	#[error("Cannot skip to step '{target}': step '{step}' has not been completed")]
	StepNotCompleted { target: String, step: String },
}

/// A single step in the wizard
pub struct WizardStep<T> {
	pub name: String,
	pub fields: Vec<String>,
	condition: Option<StepCondition<T>>,
}

impl<T> WizardStep<T> {
	/// Create a step owning `fields`.
	///
	/// # Examples
	///
	/// ```
	/// use formkit_forms::wizard::WizardStep;
	/// use serde_json::{Map, Value};
	///
	/// let step: WizardStep<Map<String, Value>> = WizardStep::new("account", ["email", "password"]);
	/// assert_eq!(step.name, "account");
	/// assert_eq!(step.fields, vec!["email", "password"]);
	/// ```
	pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			name: name.into(),
			fields: fields.into_iter().map(Into::into).collect(),
			condition: None,
		}
	}

	/// Only offer this step while `condition` holds for the current values.
	pub fn with_condition<F>(mut self, condition: F) -> Self
	where
		F: Fn(&T) -> bool + Send + Sync + 'static,
	{
		self.condition = Some(Box::new(condition));
		self
	}

	pub fn is_available(&self, values: &T) -> bool {
		self.condition
			.as_ref()
			.is_none_or(|condition| condition(values))
	}
}

impl<T> std::fmt::Debug for WizardStep<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WizardStep")
			.field("name", &self.name)
			.field("fields", &self.fields)
			.field("conditional", &self.condition.is_some())
			.finish()
	}
}

/// FormWizard manages a multi-step form
pub struct FormWizard<T: FormValues> {
	form: Form<T>,
	steps: Vec<WizardStep<T>>,
	current: usize,
	completed: HashSet<String>,
}

impl<T: FormValues> FormWizard<T> {
	pub fn new(form: Form<T>) -> Self {
		Self {
			form,
			steps: Vec::new(),
			current: 0,
			completed: HashSet::new(),
		}
	}

	pub fn step(mut self, step: WizardStep<T>) -> Self {
		self.add_step(step);
		self
	}

	pub fn add_step(&mut self, step: WizardStep<T>) {
		self.steps.push(step);
	}

	pub fn form(&self) -> &Form<T> {
		&self.form
	}

	pub fn steps(&self) -> &[WizardStep<T>] {
		&self.steps
	}

	pub fn total_steps(&self) -> usize {
		self.steps.len()
	}

	pub fn current_step(&self) -> usize {
		self.current
	}

	pub fn current_step_name(&self) -> Option<&str> {
		self.steps.get(self.current).map(|step| step.name.as_str())
	}

	pub fn is_first_step(&self) -> bool {
		self.current == 0
	}

	/// Whether no available step follows the current one.
	pub fn is_last_step(&self) -> bool {
		self.next_available().is_none()
	}

	pub fn is_step_completed(&self, name: &str) -> bool {
		self.completed.contains(name)
	}

	/// Fraction of available steps up to and including the current one.
	pub fn progress(&self) -> f64 {
		let values = self.form.values();
		let available: Vec<usize> = (0..self.steps.len())
			.filter(|&i| self.steps[i].is_available(&values))
			.collect();
		if available.is_empty() {
			return 0.0;
		}
		let reached = available.iter().filter(|&&i| i <= self.current).count();
		reached as f64 / available.len() as f64
	}

	fn next_available(&self) -> Option<usize> {
		let values = self.form.values();
		((self.current + 1)..self.steps.len()).find(|&i| self.steps[i].is_available(&values))
	}

	/// Validate the current step's fields, leaving other errors alone.
	pub fn validate_current_step(&self) -> Result<(), WizardError> {
		let step = self.steps.get(self.current).ok_or(WizardError::NoSteps)?;
		let fields: Vec<&str> = step.fields.iter().map(String::as_str).collect();
		if self.form.validate_fields(&fields) {
			return Ok(());
		}
		let invalid = step
			.fields
			.iter()
			.filter(|field| self.form.error(field).is_some())
			.cloned()
			.collect();
		Err(WizardError::InvalidStep {
			step: step.name.clone(),
			fields: invalid,
		})
	}

	/// Validate the current step and move to the next available one.
	pub fn next_step(&mut self) -> Result<(), WizardError> {
		if self.steps.is_empty() {
			return Err(WizardError::NoSteps);
		}
		if self.current + 1 >= self.steps.len() {
			return Err(WizardError::AtLastStep);
		}
		self.validate_current_step()?;
		let next = self.next_available().ok_or(WizardError::NoAvailableStep)?;
		self.completed.insert(self.steps[self.current].name.clone());
		tracing::debug!(
			from = %self.steps[self.current].name,
			to = %self.steps[next].name,
			"wizard advanced"
		);
		self.current = next;
		Ok(())
	}

	/// Move back to the previous available step without validating.
	pub fn previous_step(&mut self) -> Result<(), WizardError> {
		if self.is_first_step() {
			return Err(WizardError::AtFirstStep);
		}
		let values = self.form.values();
		let previous = (0..self.current)
			.rev()
			.find(|&i| self.steps[i].is_available(&values))
			.ok_or(WizardError::NoAvailableStep)?;
		self.current = previous;
		Ok(())
	}

	/// Jump to a step by name.
	///
	/// Going back is always allowed; going forward requires every step in
	/// between to have been completed.
	pub fn goto_step(&mut self, name: &str) -> Result<(), WizardError> {
		let values = self.form.values();
		let target = self
			.steps
			.iter()
			.position(|step| step.name == name && step.is_available(&values))
			.ok_or_else(|| WizardError::StepNotFound(name.to_string()))?;

		if target > self.current
			&& let Some(pending) = self.steps[self.current..target]
				.iter()
				.filter(|step| step.is_available(&values))
				.find(|step| !self.completed.contains(&step.name))
		{
			return Err(WizardError::StepNotCompleted {
				target: name.to_string(),
				step: pending.name.clone(),
			});
		}

		self.current = target;
		Ok(())
	}

	/// Back to the first step with a reset form.
	pub fn reset(&mut self) {
		self.current = 0;
		self.completed.clear();
		self.form.reset(None);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::validators::{self, RuleSet};
	use rstest::{fixture, rstest};
	use serde::{Deserialize, Serialize};

	#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
	struct Onboarding {
		email: String,
		company: String,
		is_business: bool,
		vat_id: String,
	}

	#[fixture]
	fn wizard() -> FormWizard<Onboarding> {
		let rules = RuleSet::new()
			.required("email", "Email is required")
			.rule("email", validators::email("Invalid email"))
			.required("company", "Company is required")
			.required("vat_id", "VAT ID is required");
		let form = Form::new(
			Onboarding {
				email: String::new(),
				company: String::new(),
				is_business: false,
				vat_id: String::new(),
			},
			rules,
		);
		FormWizard::new(form)
			.step(WizardStep::new("account", ["email", "is_business"]))
			.step(
				WizardStep::new("tax", ["vat_id"])
					.with_condition(|values: &Onboarding| values.is_business),
			)
			.step(WizardStep::new("company", ["company"]))
	}

	#[rstest]
	fn test_invalid_step_blocks_advance(wizard: FormWizard<Onboarding>) {
		// Arrange
		let mut wizard = wizard;

		// Act
		let result = wizard.next_step();

		// Assert
		assert_eq!(
			result,
			Err(WizardError::InvalidStep {
				step: "account".to_string(),
				fields: vec!["email".to_string()],
			})
		);
		assert_eq!(wizard.current_step_name(), Some("account"));
		assert!(wizard.form().error("company").is_none());
	}

	#[rstest]
	fn test_conditional_step_is_skipped(wizard: FormWizard<Onboarding>) {
		// Arrange
		let mut wizard = wizard;
		wizard.form().handle_change("email", "ada@example.com").unwrap();

		// Act
		wizard.next_step().unwrap();

		// Assert
		assert_eq!(wizard.current_step_name(), Some("company"));
		assert!(wizard.is_last_step());
		assert_eq!(wizard.progress(), 1.0);
	}

	#[rstest]
	fn test_conditional_step_is_taken(wizard: FormWizard<Onboarding>) {
		let mut wizard = wizard;
		wizard.form().handle_change("email", "ada@example.com").unwrap();
		wizard.form().handle_change("is_business", true).unwrap();

		wizard.next_step().unwrap();

		assert_eq!(wizard.current_step_name(), Some("tax"));
		assert!(!wizard.is_last_step());
	}

	#[rstest]
	fn test_previous_step_does_not_validate(wizard: FormWizard<Onboarding>) {
		// Arrange
		let mut wizard = wizard;
		wizard.form().handle_change("email", "ada@example.com").unwrap();
		wizard.next_step().unwrap();

		// Act
		wizard.previous_step().unwrap();

		// Assert
		assert_eq!(wizard.current_step_name(), Some("account"));
		assert!(wizard.form().errors().is_empty());
		assert_eq!(wizard.previous_step(), Err(WizardError::AtFirstStep));
	}

	#[rstest]
	fn test_goto_requires_completed_steps(wizard: FormWizard<Onboarding>) {
		let mut wizard = wizard;

		assert_eq!(
			wizard.goto_step("company"),
			Err(WizardError::StepNotCompleted {
				target: "company".to_string(),
				step: "account".to_string(),
			})
		);
		assert_eq!(
			wizard.goto_step("tax"),
			Err(WizardError::StepNotFound("tax".to_string()))
		);
	}

	#[rstest]
	fn test_reset_returns_to_first_step(wizard: FormWizard<Onboarding>) {
		let mut wizard = wizard;
		wizard.form().handle_change("email", "ada@example.com").unwrap();
		wizard.next_step().unwrap();

		wizard.reset();

		assert!(wizard.is_first_step());
		assert!(!wizard.is_step_completed("account"));
		assert!(wizard.form().values().email.is_empty());
	}

	#[rstest]
	fn test_empty_wizard() {
		let form: Form<Onboarding> = Form::new(
			Onboarding {
				email: String::new(),
				company: String::new(),
				is_business: false,
				vat_id: String::new(),
			},
			RuleSet::new(),
		);
		let mut wizard = FormWizard::new(form);

		assert_eq!(wizard.next_step(), Err(WizardError::NoSteps));
		assert_eq!(wizard.progress(), 0.0);
	}

	#[rstest]
	fn test_no_available_step_leaves_step_incomplete(wizard: FormWizard<Onboarding>) {
		// Arrange
		let form = wizard.form().clone();
		let mut wizard = FormWizard::new(form)
			.step(WizardStep::new("account", ["email"]))
			.step(
				WizardStep::new("tax", ["vat_id"])
					.with_condition(|values: &Onboarding| values.is_business),
			);
		wizard.form().handle_change("email", "ada@example.com").unwrap();

		// Act
		let result = wizard.next_step();

		// Assert
		assert_eq!(result, Err(WizardError::NoAvailableStep));
		assert!(!wizard.is_step_completed("account"));
		assert_eq!(wizard.current_step(), 0);
		assert_eq!(wizard.total_steps(), 2);
		let names: Vec<&str> = wizard.steps().iter().map(|step| step.name.as_str()).collect();
		assert_eq!(names, vec!["account", "tax"]);
	}
}
