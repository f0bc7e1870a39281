use crate::form::{Form, FormResult, FormValues};
use serde::Serialize;
use serde_json::Value;

/// BoundField represents one field of a [`Form`] prepared for rendering.
///
/// It holds no state of its own: every accessor reads the form's current
/// state, and [`BoundField::change`] / [`BoundField::blur`] relay input
/// events back into the form.
pub struct BoundField<T: FormValues> {
	form: Form<T>,
	name: String,
	id: Option<String>,
	prefix: String,
	label: Option<String>,
	description: Option<String>,
}

/// Attributes for a binding target (an input element or its equivalent).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldProps {
	pub id: String,
	pub name: String,
	pub value: Value,
	#[serde(rename = "aria-invalid")]
	pub aria_invalid: bool,
	#[serde(rename = "aria-describedby", skip_serializing_if = "Option::is_none")]
	pub aria_describedby: Option<String>,
}

impl<T: FormValues> BoundField<T> {
	pub(crate) fn new(form: Form<T>, name: &str) -> Self {
		Self {
			form,
			name: name.to_string(),
			id: None,
			prefix: String::new(),
			label: None,
			description: None,
		}
	}

	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Field name inside the value record.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Get the HTML name attribute (with prefix)
	///
	/// # Examples
	///
	/// ```
	/// use formkit_forms::{Form, RuleSet};
	/// use serde_json::{Map, Value};
	///
	/// let form: Form<Map<String, Value>> = Form::new(Map::new(), RuleSet::new());
	/// assert_eq!(form.bind_field("email").html_name(), "email");
	/// assert_eq!(form.bind_field("email").with_prefix("billing").html_name(), "billing-email");
	/// ```
	pub fn html_name(&self) -> String {
		if self.prefix.is_empty() {
			self.name.clone()
		} else {
			format!("{}-{}", self.prefix, self.name)
		}
	}

	/// Explicit id, or the HTML name.
	pub fn id(&self) -> String {
		self.id.clone().unwrap_or_else(|| self.html_name())
	}

	pub fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	/// Current value, `null` when the record has no such field.
	pub fn value(&self) -> Value {
		self.form.field_value(&self.name).unwrap_or(Value::Null)
	}

	pub fn error(&self) -> Option<String> {
		self.form.field_error(&self.name)
	}

	pub fn is_invalid(&self) -> bool {
		self.error().is_some()
	}

	pub fn is_touched(&self) -> bool {
		self.form.is_touched(&self.name)
	}

	pub fn is_required(&self) -> bool {
		self.form.rules().is_required(&self.name)
	}

	/// Ids of the elements describing this field.
	///
	/// `<id>-error` while invalid and `<id>-description` when a description
	/// is set, space-joined when both apply.
	pub fn described_by(&self) -> Option<String> {
		let id = self.id();
		let mut ids = Vec::new();
		if self.is_invalid() {
			ids.push(format!("{id}-error"));
		}
		if self.description.is_some() {
			ids.push(format!("{id}-description"));
		}
		(!ids.is_empty()).then(|| ids.join(" "))
	}

	pub fn props(&self) -> FieldProps {
		FieldProps {
			id: self.id(),
			name: self.html_name(),
			value: self.value(),
			aria_invalid: self.is_invalid(),
			aria_describedby: self.described_by(),
		}
	}

	/// Relay an input change to the form.
	pub fn change(&self, value: impl Into<Value>) -> FormResult<()> {
		self.form.handle_change(&self.name, value)
	}

	/// Relay a focus loss to the form.
	pub fn blur(&self) {
		self.form.handle_blur(&self.name);
	}
}
