//! Form state engine
//!
//! [`Form`] owns the state of one form: current values, per-field errors,
//! touched fields and the dirty / submitting flags. It is a cheap-clone
//! handle, so bound fields, submit handlers and wizards can all hold one
//! while the state itself stays exclusive to the form.
//!
//! ## Policy
//!
//! Errors are cleared as soon as a field changes and recomputed on blur
//! (the default [`ValidationMode::OnBlur`]), on every change
//! ([`ValidationMode::OnChange`]) or only on explicit validation
//! ([`ValidationMode::OnSubmit`]).
//!
//! ## Example
//!
//! ```
//! use formkit_forms::{Form, RuleSet, validators};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Contact {
//!     name: String,
//!     email: String,
//! }
//!
//! let rules = RuleSet::new()
//!     .required("name", "Name is required")
//!     .required("email", "Email is required")
//!     .rule("email", validators::email("Enter a valid email address"));
//!
//! let form = Form::new(Contact { name: String::new(), email: String::new() }, rules);
//! assert!(!form.validate_all());
//! assert_eq!(form.error("name").as_deref(), Some("Name is required"));
//!
//! form.handle_change("name", "Ada").unwrap();
//! assert!(form.error("name").is_none());
//! assert!(form.is_touched("name"));
//! assert_eq!(form.values().name, "Ada");
//! ```

use crate::bound_field::BoundField;
use crate::schema::{self, Schema};
use crate::validators::RuleSet;
use formkit_core::settings::{FormSettings, ValidationMode};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Special key for form-level (non-field-specific) errors.
pub const FORM_ERROR_KEY: &str = "_form";

#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error("Form values must serialize to an object")]
	NotARecord,
	#[error("Unknown field: {0}")]
	UnknownField(String),
	#[error("Invalid value for {field}: {source}")]
	FieldType {
		field: String,
		source: serde_json::Error,
	},
	#[error("Failed to serialize form values: {0}")]
	Serialize(#[source] serde_json::Error),
}

pub type FormResult<T> = Result<T, FormError>;

/// A value record a [`Form`] can hold.
///
/// Fields are read and written as `serde_json::Value`. Any serde record
/// (a struct, `serde_json::Map`, `HashMap<String, Value>`) implements this
/// through its JSON object representation.
pub trait FormValues: Clone + PartialEq + Send + 'static {
	/// Current value of `field`, or `None` when the record has no such key.
	fn field_value(&self, field: &str) -> Option<Value>;

	/// Write several fields at once. Either every field is written or,
	/// on error, the record is left unchanged.
	fn set_field_values(&mut self, values: Map<String, Value>) -> FormResult<()>;

	fn set_field_value(&mut self, field: &str, value: Value) -> FormResult<()> {
		let mut values = Map::new();
		values.insert(field.to_string(), value);
		self.set_field_values(values)
	}
}

impl<T> FormValues for T
where
	T: Serialize + DeserializeOwned + Clone + PartialEq + Send + 'static,
{
	fn field_value(&self, field: &str) -> Option<Value> {
		match serde_json::to_value(self) {
			Ok(Value::Object(mut map)) => map.remove(field),
			_ => None,
		}
	}

	fn set_field_values(&mut self, values: Map<String, Value>) -> FormResult<()> {
		let mut record = match serde_json::to_value(&*self).map_err(FormError::Serialize)? {
			Value::Object(map) => map,
			_ => return Err(FormError::NotARecord),
		};
		let fields: Vec<String> = values.keys().cloned().collect();
		record.extend(values);

		let updated: T = serde_json::from_value(Value::Object(record)).map_err(|source| {
			FormError::FieldType {
				field: fields.join(", "),
				source,
			}
		})?;

		// Structs silently drop keys they do not declare.
		let written = match serde_json::to_value(&updated).map_err(FormError::Serialize)? {
			Value::Object(map) => map,
			_ => return Err(FormError::NotARecord),
		};
		if let Some(unknown) = fields.iter().find(|field| !written.contains_key(*field)) {
			return Err(FormError::UnknownField(unknown.clone()));
		}

		*self = updated;
		Ok(())
	}
}

/// Observable state of a form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState<T> {
	pub values: T,
	/// Only fields that failed the most recent validation.
	pub errors: HashMap<String, String>,
	/// Fields that have received a change or a blur.
	pub touched: HashSet<String>,
	pub is_dirty: bool,
	pub is_submitting: bool,
}

struct Inner<T> {
	state: FormState<T>,
	initial: T,
}

/// Form state engine
pub struct Form<T: FormValues> {
	inner: Arc<Mutex<Inner<T>>>,
	rules: Arc<RuleSet<T>>,
	schema: Option<Arc<dyn Schema<T>>>,
	mode: ValidationMode,
}

impl<T: FormValues> Clone for Form<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
			rules: Arc::clone(&self.rules),
			schema: self.schema.clone(),
			mode: self.mode,
		}
	}
}

impl<T: FormValues> Form<T> {
	/// Create a form from its initial values and rule set.
	pub fn new(initial: T, rules: RuleSet<T>) -> Self {
		Self {
			inner: Arc::new(Mutex::new(Inner {
				state: FormState {
					values: initial.clone(),
					errors: HashMap::new(),
					touched: HashSet::new(),
					is_dirty: false,
					is_submitting: false,
				},
				initial,
			})),
			rules: Arc::new(rules),
			schema: None,
			mode: ValidationMode::default(),
		}
	}

	/// Attach a schema that runs after the rule set in every validation pass.
	pub fn with_schema<S>(mut self, schema: S) -> Self
	where
		S: Schema<T> + 'static,
	{
		self.schema = Some(Arc::new(schema));
		self
	}

	pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn with_settings(self, settings: &FormSettings) -> Self {
		self.with_validation_mode(settings.validation_mode)
	}

	pub fn validation_mode(&self) -> ValidationMode {
		self.mode
	}

	pub fn rules(&self) -> &RuleSet<T> {
		&self.rules
	}

	/// Relay a raw input change.
	///
	/// Sets the value, marks the field touched and the form dirty, and drops
	/// the field's error. In [`ValidationMode::OnChange`] the field is then
	/// validated again.
	pub fn handle_change(&self, field: &str, value: impl Into<Value>) -> FormResult<()> {
		let mut values = Map::new();
		values.insert(field.to_string(), value.into());
		self.apply_change(values)
	}

	/// Programmatic equivalent of [`Form::handle_change`] for non-text controls.
	pub fn set_field_value(&self, field: &str, value: impl Into<Value>) -> FormResult<()> {
		self.handle_change(field, value)
	}

	/// Write several fields at once. Only the named fields become touched.
	///
	/// # Examples
	///
	/// ```
	/// use formkit_forms::{Form, RuleSet};
	/// use serde_json::{json, Map, Value};
	///
	/// let form: Form<Map<String, Value>> = Form::new(Map::new(), RuleSet::new());
	/// let mut partial = Map::new();
	/// partial.insert("a".into(), json!(1));
	/// partial.insert("b".into(), json!(2));
	///
	/// form.set_field_values(partial).unwrap();
	/// assert_eq!(form.field_value("a"), Some(json!(1)));
	/// assert!(form.is_touched("a") && form.is_touched("b"));
	/// ```
	pub fn set_field_values(&self, values: Map<String, Value>) -> FormResult<()> {
		self.apply_change(values)
	}

	fn apply_change(&self, values: Map<String, Value>) -> FormResult<()> {
		let fields: Vec<String> = values.keys().cloned().collect();
		{
			let mut inner = self.inner.lock();
			inner.state.values.set_field_values(values)?;
			for field in &fields {
				inner.state.touched.insert(field.clone());
				inner.state.errors.retain(|key, _| !is_error_of(key, field));
			}
			inner.state.is_dirty = true;
		}
		tracing::trace!(fields = ?fields, "form fields changed");

		if self.mode.validates_on_change() {
			let names: Vec<&str> = fields.iter().map(String::as_str).collect();
			self.validate_fields(&names);
		}
		Ok(())
	}

	/// Relay a focus loss: marks the field touched and, unless the form only
	/// validates on submit, recomputes its error.
	pub fn handle_blur(&self, field: &str) {
		self.inner.lock().state.touched.insert(field.to_string());
		if self.mode.validates_on_blur() {
			self.validate_field(field);
		}
	}

	/// Validate every field, replacing all errors.
	///
	/// Required checks run first, then field rules in order, then cross-field
	/// checks, then the attached schema; the first failure per field wins.
	/// Returns `true` iff no errors remain.
	pub fn validate_all(&self) -> bool {
		let values = self.values();
		let errors = self.compute_errors(&values, None);
		let is_valid = errors.is_empty();
		if !is_valid {
			tracing::debug!(invalid = ?errors.keys().collect::<Vec<_>>(), "form validation failed");
		}
		self.inner.lock().state.errors = errors;
		is_valid
	}

	/// Validate a subset of fields, leaving other errors untouched.
	///
	/// Returns `true` iff none of the named fields has an error afterwards.
	pub fn validate_fields(&self, fields: &[&str]) -> bool {
		let values = self.values();
		let computed = self.compute_errors(&values, Some(fields));
		let mut inner = self.inner.lock();
		inner
			.state
			.errors
			.retain(|key, _| !fields.iter().any(|field| is_error_of(key, field)));
		for (key, message) in computed {
			if fields.iter().any(|field| is_error_of(&key, field)) {
				inner.state.errors.insert(key, message);
			}
		}
		!inner
			.state
			.errors
			.keys()
			.any(|key| fields.iter().any(|field| is_error_of(key, field)))
	}

	/// Validate one field and return its error, if any. Nested errors
	/// (`tags.1`) count as errors of their top-level field.
	pub fn validate_field(&self, field: &str) -> Option<String> {
		self.validate_fields(&[field]);
		self.field_error(field)
	}

	fn compute_errors(&self, values: &T, only: Option<&[&str]>) -> HashMap<String, String> {
		let mut errors = self.rules.evaluate(values, only);
		if let Some(schema) = &self.schema {
			for (field, message) in schema::adapt(schema.as_ref(), values) {
				let selected =
					only.is_none_or(|names| names.iter().any(|name| is_error_of(&field, name)));
				if selected && !errors.contains_key(&field) {
					errors.insert(field, message);
				}
			}
		}
		errors
	}

	/// Restore values, clear errors and touched fields, and mark the form
	/// clean. A supplied record also becomes the new initial snapshot.
	pub fn reset(&self, to: Option<T>) {
		let mut inner = self.inner.lock();
		if let Some(values) = to {
			inner.initial = values;
		}
		inner.state.values = inner.initial.clone();
		inner.state.errors.clear();
		inner.state.touched.clear();
		inner.state.is_dirty = false;
		tracing::trace!("form reset");
	}

	/// Replace all errors, e.g. with field errors returned by a server.
	pub fn set_errors(&self, errors: HashMap<String, String>) {
		self.inner.lock().state.errors = errors;
	}

	pub fn set_field_error(&self, field: &str, message: impl Into<String>) {
		self.inner
			.lock()
			.state
			.errors
			.insert(field.to_string(), message.into());
	}

	pub(crate) fn set_submitting(&self, submitting: bool) {
		self.inner.lock().state.is_submitting = submitting;
	}

	/// Bind a field for rendering.
	pub fn bind_field(&self, field: &str) -> BoundField<T> {
		BoundField::new(self.clone(), field)
	}

	pub fn values(&self) -> T {
		self.inner.lock().state.values.clone()
	}

	pub fn initial_values(&self) -> T {
		self.inner.lock().initial.clone()
	}

	pub fn field_value(&self, field: &str) -> Option<Value> {
		self.inner.lock().state.values.field_value(field)
	}

	pub fn errors(&self) -> HashMap<String, String> {
		self.inner.lock().state.errors.clone()
	}

	pub fn error(&self, field: &str) -> Option<String> {
		self.inner.lock().state.errors.get(field).cloned()
	}

	/// The field's own error, else the first nested error under it by key.
	pub fn field_error(&self, field: &str) -> Option<String> {
		let inner = self.inner.lock();
		if let Some(message) = inner.state.errors.get(field) {
			return Some(message.clone());
		}
		inner
			.state
			.errors
			.iter()
			.filter(|(key, _)| is_error_of(key, field))
			.min_by(|a, b| a.0.cmp(b.0))
			.map(|(_, message)| message.clone())
	}

	pub fn touched(&self) -> HashSet<String> {
		self.inner.lock().state.touched.clone()
	}

	pub fn is_touched(&self, field: &str) -> bool {
		self.inner.lock().state.touched.contains(field)
	}

	pub fn is_dirty(&self) -> bool {
		self.inner.lock().state.is_dirty
	}

	pub fn is_submitting(&self) -> bool {
		self.inner.lock().state.is_submitting
	}

	/// Whether the last validation left no errors.
	pub fn is_valid(&self) -> bool {
		self.inner.lock().state.errors.is_empty()
	}

	/// A copy of the complete current state.
	pub fn snapshot(&self) -> FormState<T> {
		self.inner.lock().state.clone()
	}
}

impl<T: FormValues + std::fmt::Debug> std::fmt::Debug for Form<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Form")
			.field("state", &self.snapshot())
			.field("rules", &self.rules)
			.field("mode", &self.mode)
			.finish()
	}
}

/// Whether the error key `key` belongs to `field`: the field itself or a
/// nested path below it (`tags.1` belongs to `tags`).
fn is_error_of(key: &str, field: &str) -> bool {
	key.strip_prefix(field)
		.is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
