//! Submission pipeline
//!
//! [`SubmitHandler`] wraps a caller-supplied async action with a validation
//! gate, the `is_submitting` flag, success / error notification and an
//! optional reset of the form.
//!
//! Everything that happens after the action resolves is skipped when the
//! owning UI element has been unmounted in the meantime; the returned
//! future still resolves with the correct outcome.
//!
//! ## Example
//!
//! ```
//! use formkit_core::messages::MemoryNotifier;
//! use formkit_forms::submit::{create_submit_handler, SubmitOptions};
//! use formkit_forms::{Form, RuleSet};
//! use serde_json::{Map, Value};
//!
//! # futures::executor::block_on(async {
//! let form: Form<Map<String, Value>> = Form::new(Map::new(), RuleSet::new());
//! let notifier = MemoryNotifier::new();
//! let handler = create_submit_handler(
//!     form.clone(),
//!     |_values: Map<String, Value>| async { anyhow::Ok(()) },
//!     SubmitOptions::default().success_message("OK"),
//! )
//! .with_notifier(notifier.clone());
//!
//! assert!(handler.submit(form.values()).await);
//! assert_eq!(notifier.peek()[0].message, "OK");
//! assert!(!form.is_submitting());
//! # });
//! ```

use crate::form::{Form, FormValues};
use async_trait::async_trait;
use formkit_core::exception::{ErrorClassifier, ErrorDescription};
use formkit_core::lifecycle::{AlwaysMounted, MountState};
use formkit_core::messages::{Notifier, TracingNotifier};
use formkit_core::settings::NotificationSettings;
use futures::FutureExt;
use serde::Serialize;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// The caller's async submit function.
#[async_trait]
pub trait SubmitAction<T>: Send + Sync {
	async fn submit(&self, values: T) -> anyhow::Result<()>;
}

#[async_trait]
impl<T, F, Fut> SubmitAction<T> for F
where
	T: Send + 'static,
	F: Fn(T) -> Fut + Send + Sync,
	Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
	async fn submit(&self, values: T) -> anyhow::Result<()> {
		(self)(values).await
	}
}

type ValuesPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type ValuesCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&ErrorDescription) + Send + Sync>;

/// Options for one submit handler.
pub struct SubmitOptions<T> {
	pub success_title: String,
	pub success_message: String,
	pub error_title: String,
	/// Shown instead of an empty error message.
	pub error_message: String,
	pub reset_after_submit: bool,
	/// Run the form's rule set (`validate_all`) before submitting.
	pub validate_rules: bool,
	validate_form: Option<ValuesPredicate<T>>,
	on_success: Option<ValuesCallback<T>>,
	on_error: Option<ErrorCallback>,
}

impl<T> SubmitOptions<T> {
	pub fn from_settings(settings: &NotificationSettings) -> Self {
		Self {
			success_title: settings.success_title.clone(),
			success_message: settings.success_message.clone(),
			error_title: settings.error_title.clone(),
			error_message: settings.error_message.clone(),
			reset_after_submit: false,
			validate_rules: false,
			validate_form: None,
			on_success: None,
			on_error: None,
		}
	}

	pub fn success_title(mut self, title: impl Into<String>) -> Self {
		self.success_title = title.into();
		self
	}

	pub fn success_message(mut self, message: impl Into<String>) -> Self {
		self.success_message = message.into();
		self
	}

	pub fn error_title(mut self, title: impl Into<String>) -> Self {
		self.error_title = title.into();
		self
	}

	pub fn error_message(mut self, message: impl Into<String>) -> Self {
		self.error_message = message.into();
		self
	}

	pub fn reset_after_submit(mut self, reset: bool) -> Self {
		self.reset_after_submit = reset;
		self
	}

	pub fn validate_rules(mut self, validate: bool) -> Self {
		self.validate_rules = validate;
		self
	}

	/// Gate: submission aborts when this returns `false`.
	pub fn validate_form<F>(mut self, validate: F) -> Self
	where
		F: Fn(&T) -> bool + Send + Sync + 'static,
	{
		self.validate_form = Some(Arc::new(validate));
		self
	}

	pub fn on_success<F>(mut self, callback: F) -> Self
	where
		F: Fn(&T) + Send + Sync + 'static,
	{
		self.on_success = Some(Arc::new(callback));
		self
	}

	pub fn on_error<F>(mut self, callback: F) -> Self
	where
		F: Fn(&ErrorDescription) + Send + Sync + 'static,
	{
		self.on_error = Some(Arc::new(callback));
		self
	}
}

impl<T> Default for SubmitOptions<T> {
	fn default() -> Self {
		Self::from_settings(&NotificationSettings::default())
	}
}

impl<T> std::fmt::Debug for SubmitOptions<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SubmitOptions")
			.field("success_title", &self.success_title)
			.field("success_message", &self.success_message)
			.field("error_title", &self.error_title)
			.field("error_message", &self.error_message)
			.field("reset_after_submit", &self.reset_after_submit)
			.field("validate_rules", &self.validate_rules)
			.field("validate_form", &self.validate_form.is_some())
			.finish_non_exhaustive()
	}
}

/// Result of one submit attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
	pub succeeded: bool,
	/// Set when the action failed; `None` for successes and for attempts
	/// stopped by the validation gate.
	pub error: Option<ErrorDescription>,
}

impl SubmissionOutcome {
	fn success() -> Self {
		Self {
			succeeded: true,
			error: None,
		}
	}

	fn rejected() -> Self {
		Self {
			succeeded: false,
			error: None,
		}
	}

	fn failure(error: ErrorDescription) -> Self {
		Self {
			succeeded: false,
			error: Some(error),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
	#[error("Submission was rejected by validation")]
	Rejected,
	#[error("Submission failed: {0}")]
	Failed(ErrorDescription),
}

enum Attempt {
	Rejected,
	Completed(SubmissionOutcome),
}

/// Clears `is_submitting` on every exit path, including a dropped future.
struct SubmittingGuard<'a, T: FormValues> {
	form: &'a Form<T>,
	mount: &'a dyn MountState,
}

impl<T: FormValues> Drop for SubmittingGuard<'_, T> {
	fn drop(&mut self) {
		if self.mount.is_mounted() {
			self.form.set_submitting(false);
		}
	}
}

/// Submit handler bound to one form.
pub struct SubmitHandler<T: FormValues, A> {
	form: Form<T>,
	action: A,
	options: SubmitOptions<T>,
	notifier: Arc<dyn Notifier>,
	mount: Arc<dyn MountState>,
}

impl<T, A> SubmitHandler<T, A>
where
	T: FormValues,
	A: SubmitAction<T>,
{
	pub fn new(form: Form<T>, action: A) -> Self {
		Self {
			form,
			action,
			options: SubmitOptions::default(),
			notifier: Arc::new(TracingNotifier),
			mount: Arc::new(AlwaysMounted),
		}
	}

	pub fn with_options(mut self, options: SubmitOptions<T>) -> Self {
		self.options = options;
		self
	}

	pub fn with_notifier<N>(mut self, notifier: N) -> Self
	where
		N: Notifier + 'static,
	{
		self.notifier = Arc::new(notifier);
		self
	}

	pub fn with_mount_state<M>(mut self, mount: M) -> Self
	where
		M: MountState + 'static,
	{
		self.mount = Arc::new(mount);
		self
	}

	pub fn form(&self) -> &Form<T> {
		&self.form
	}

	pub fn options(&self) -> &SubmitOptions<T> {
		&self.options
	}

	/// Submit `values`. Resolves to `true` iff the action succeeded.
	///
	/// Failures are classified, reported and swallowed.
	pub async fn submit(&self, values: T) -> bool {
		match self.attempt(values).await {
			Attempt::Rejected => false,
			Attempt::Completed(outcome) => outcome.succeeded,
		}
	}

	/// Like [`SubmitHandler::submit`], but hands the classified failure back
	/// to the caller after it has been reported.
	pub async fn try_submit(&self, values: T) -> Result<(), SubmitError> {
		match self.attempt(values).await {
			Attempt::Rejected => Err(SubmitError::Rejected),
			Attempt::Completed(SubmissionOutcome {
				error: Some(error), ..
			}) => Err(SubmitError::Failed(error)),
			Attempt::Completed(_) => Ok(()),
		}
	}

	pub async fn submit_outcome(&self, values: T) -> SubmissionOutcome {
		match self.attempt(values).await {
			Attempt::Rejected => SubmissionOutcome::rejected(),
			Attempt::Completed(outcome) => outcome,
		}
	}

	fn passes_gate(&self, values: &T) -> bool {
		if let Some(validate) = &self.options.validate_form
			&& !validate(values)
		{
			return false;
		}
		!self.options.validate_rules || self.form.validate_all()
	}

	async fn attempt(&self, values: T) -> Attempt {
		if !self.passes_gate(&values) {
			tracing::debug!("submission stopped by validation gate");
			return Attempt::Rejected;
		}

		self.form.set_submitting(true);
		let _guard = SubmittingGuard {
			form: &self.form,
			mount: self.mount.as_ref(),
		};

		let classifier = ErrorClassifier::new(self.options.error_message.clone());
		let result = AssertUnwindSafe(self.action.submit(values.clone()))
			.catch_unwind()
			.await;
		let outcome = match result {
			Ok(Ok(())) => SubmissionOutcome::success(),
			Ok(Err(err)) => SubmissionOutcome::failure(classifier.classify(&err)),
			Err(payload) => {
				tracing::error!("submit action panicked");
				SubmissionOutcome::failure(classifier.classify_panic(payload.as_ref()))
			}
		};

		if !self.mount.is_mounted() {
			tracing::debug!(
				succeeded = outcome.succeeded,
				"owner unmounted before submission settled; skipping effects"
			);
			return Attempt::Completed(outcome);
		}

		match &outcome.error {
			None => {
				tracing::info!("form submitted");
				self.notifier
					.show_success(&self.options.success_title, &self.options.success_message);
				if let Some(on_success) = &self.options.on_success {
					on_success(&values);
				}
				if self.options.reset_after_submit {
					self.form.reset(None);
				}
			}
			Some(error) => {
				tracing::warn!(error = %error, "form submission failed");
				self.notifier
					.show_error(&self.options.error_title, error.message());
				if let Some(on_error) = &self.options.on_error {
					on_error(error);
				}
			}
		}

		Attempt::Completed(outcome)
	}
}

/// Build a submit handler for `form` with the given options.
pub fn create_submit_handler<T, A>(
	form: Form<T>,
	action: A,
	options: SubmitOptions<T>,
) -> SubmitHandler<T, A>
where
	T: FormValues,
	A: SubmitAction<T>,
{
	SubmitHandler::new(form, action).with_options(options)
}
