//! Field validators and rule sets
//!
//! A validation rule is a pure function from a field value to an optional
//! error message. Every primitive here passes on empty input except
//! [`required`], so required-ness stays opt-in and composes with the rest.
//!
//! ```
//! use formkit_forms::validators::{combine, email, max_length};
//! use serde_json::json;
//!
//! let rule = combine([
//!     email("Enter a valid email address"),
//!     max_length(20, "Too long"),
//! ]);
//!
//! assert_eq!(rule(&json!("")), None);
//! assert_eq!(rule(&json!("ada@example.com")), None);
//! assert_eq!(rule(&json!("not-an-email")).as_deref(), Some("Enter a valid email address"));
//! ```

use crate::form::FormValues;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock};

/// A single validation rule: `None` means the value is acceptable.
pub type Rule = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

type CheckFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

// Deliberately loose: one `@`, no whitespace, a dot in the domain part.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

/// Default message texts shared by rule sets and the schema adapter.
pub mod messages {
	pub const REQUIRED: &str = "This field is required.";
	pub const INVALID_EMAIL: &str = "Enter a valid email address.";
	pub const NOT_A_NUMBER: &str = "Enter a number.";

	pub fn min_length(min: usize) -> String {
		format!("Ensure this value has at least {min} characters.")
	}

	pub fn max_length(max: usize) -> String {
		format!("Ensure this value has at most {max} characters.")
	}

	pub fn range(min: f64, max: f64) -> String {
		format!("Ensure this value is between {min} and {max}.")
	}

	pub fn validation_failed(field: &str) -> String {
		format!("Validation failed for {field}")
	}
}

/// Whether a value counts as "missing".
///
/// `null`, empty or whitespace-only strings, empty arrays and empty objects
/// are all missing. `false` and `0` are values.
pub fn is_empty_value(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.trim().is_empty(),
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => map.is_empty(),
		Value::Bool(_) | Value::Number(_) => false,
	}
}

fn as_text(value: &Value) -> Option<Cow<'_, str>> {
	match value {
		Value::String(s) => Some(Cow::Borrowed(s.as_str())),
		Value::Number(n) => Some(Cow::Owned(n.to_string())),
		Value::Bool(b) => Some(Cow::Owned(b.to_string())),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

fn length_of(value: &Value) -> usize {
	match value {
		Value::Array(items) => items.len(),
		Value::Object(map) => map.len(),
		other => as_text(other).map_or(0, |text| text.chars().count()),
	}
}

fn as_number(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

/// Wrap a closure as a [`Rule`].
pub fn custom<F>(f: F) -> Rule
where
	F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
{
	Arc::new(f)
}

/// Fails when the value is missing (see [`is_empty_value`]).
pub fn required(message: impl Into<String>) -> Rule {
	let message = message.into();
	Arc::new(move |value: &Value| is_empty_value(value).then(|| message.clone()))
}

pub fn email(message: impl Into<String>) -> Rule {
	let message = message.into();
	Arc::new(move |value: &Value| {
		if is_empty_value(value) {
			return None;
		}
		match as_text(value) {
			Some(text) if EMAIL_REGEX.is_match(text.trim()) => None,
			_ => Some(message.clone()),
		}
	})
}

/// Character count (element count for arrays) must be at least `min`.
pub fn min_length(min: usize, message: impl Into<String>) -> Rule {
	let message = message.into();
	Arc::new(move |value: &Value| {
		if is_empty_value(value) || length_of(value) >= min {
			None
		} else {
			Some(message.clone())
		}
	})
}

/// Character count (element count for arrays) must be at most `max`.
pub fn max_length(max: usize, message: impl Into<String>) -> Rule {
	let message = message.into();
	Arc::new(move |value: &Value| {
		if is_empty_value(value) || length_of(value) <= max {
			None
		} else {
			Some(message.clone())
		}
	})
}

/// The textual value must match `pattern`; anchor it for whole-value matches.
///
/// # Examples
///
/// ```
/// use formkit_forms::validators::pattern;
/// use serde_json::json;
///
/// let rule = pattern(r"^[A-Z]{3}$", "Use a three-letter code").unwrap();
/// assert_eq!(rule(&json!("EUR")), None);
/// assert!(rule(&json!("euro")).is_some());
/// assert!(pattern("(", "broken").is_err());
/// ```
pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Rule, regex::Error> {
	let regex = Regex::new(pattern)?;
	let message = message.into();
	Ok(Arc::new(move |value: &Value| {
		if is_empty_value(value) {
			return None;
		}
		match as_text(value) {
			Some(text) if regex.is_match(&text) => None,
			_ => Some(message.clone()),
		}
	}))
}

/// Numeric value (or numeric string) within `min..=max`.
///
/// Non-numeric input fails with [`messages::NOT_A_NUMBER`].
pub fn range(min: f64, max: f64, message: impl Into<String>) -> Rule {
	let message = message.into();
	Arc::new(move |value: &Value| {
		if is_empty_value(value) {
			return None;
		}
		match as_number(value) {
			Some(n) if (min..=max).contains(&n) => None,
			Some(_) => Some(message.clone()),
			None => Some(messages::NOT_A_NUMBER.to_string()),
		}
	})
}

pub fn min_value(min: f64, message: impl Into<String>) -> Rule {
	range(min, f64::INFINITY, message)
}

pub fn max_value(max: f64, message: impl Into<String>) -> Rule {
	range(f64::NEG_INFINITY, max, message)
}

/// Chain rules: the first failing rule's message wins and the rest are
/// skipped.
pub fn combine<I>(rules: I) -> Rule
where
	I: IntoIterator<Item = Rule>,
{
	let rules: Vec<Rule> = rules.into_iter().collect();
	Arc::new(move |value: &Value| rules.iter().find_map(|rule| rule(value)))
}

/// The rules attached to one field.
#[derive(Clone, Default)]
pub struct FieldRules {
	required: Option<String>,
	rules: Vec<Rule>,
}

impl FieldRules {
	pub fn is_required(&self) -> bool {
		self.required.is_some()
	}

	/// Required check first, then each rule in order; first failure wins.
	pub fn evaluate(&self, value: &Value) -> Option<String> {
		if let Some(message) = &self.required
			&& is_empty_value(value)
		{
			return Some(message.clone());
		}
		self.rules.iter().find_map(|rule| rule(value))
	}
}

impl std::fmt::Debug for FieldRules {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FieldRules")
			.field("required", &self.required)
			.field("rules", &self.rules.len())
			.finish()
	}
}

struct CrossFieldCheck<T> {
	target: String,
	check: CheckFn<T>,
}

/// Validation rules for a whole form, keyed by field name.
///
/// Built once per form definition; the engine iterates these keys rather
/// than the value record, so extra or missing value keys never change
/// which checks run.
///
/// # Examples
///
/// ```
/// use formkit_forms::validators::{self, RuleSet};
/// use serde_json::{json, Map, Value};
///
/// let rules: RuleSet<Map<String, Value>> = RuleSet::new()
///     .required("email", "Email is required")
///     .rule("email", validators::email("Enter a valid email address"));
///
/// assert!(rules.is_required("email"));
/// assert_eq!(
///     rules.validate_value("email", &json!("")).as_deref(),
///     Some("Email is required")
/// );
/// ```
pub struct RuleSet<T> {
	fields: Vec<(String, FieldRules)>,
	checks: Vec<CrossFieldCheck<T>>,
}

impl<T> RuleSet<T> {
	pub fn new() -> Self {
		Self {
			fields: Vec::new(),
			checks: Vec::new(),
		}
	}

	fn entry_mut(&mut self, field: &str) -> &mut FieldRules {
		let position = match self.fields.iter().position(|(name, _)| name == field) {
			Some(position) => position,
			None => {
				self.fields.push((field.to_string(), FieldRules::default()));
				self.fields.len() - 1
			}
		};
		&mut self.fields[position].1
	}

	/// Mark `field` as required with the given message.
	pub fn required(mut self, field: &str, message: impl Into<String>) -> Self {
		self.entry_mut(field).required = Some(message.into());
		self
	}

	/// Append a rule to `field`. Rules run in insertion order.
	pub fn rule(mut self, field: &str, rule: Rule) -> Self {
		self.entry_mut(field).rules.push(rule);
		self
	}

	pub fn rules<I>(mut self, field: &str, rules: I) -> Self
	where
		I: IntoIterator<Item = Rule>,
	{
		self.entry_mut(field).rules.extend(rules);
		self
	}

	/// Add a cross-field check whose message is reported on `target`.
	///
	/// Checks only run for targets that passed their own field rules.
	pub fn check<F>(mut self, target: &str, check: F) -> Self
	where
		F: Fn(&T) -> Option<String> + Send + Sync + 'static,
	{
		self.checks.push(CrossFieldCheck {
			target: target.to_string(),
			check: Arc::new(check),
		});
		self
	}

	/// Field names with rules, in declaration order.
	pub fn fields(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|(name, _)| name.as_str())
	}

	pub fn get(&self, field: &str) -> Option<&FieldRules> {
		self.fields
			.iter()
			.find(|(name, _)| name == field)
			.map(|(_, rules)| rules)
	}

	pub fn is_required(&self, field: &str) -> bool {
		self.get(field).is_some_and(FieldRules::is_required)
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty() && self.checks.is_empty()
	}

	/// Run `field`'s rules against `value`.
	///
	/// A panicking rule is logged and reported as a failure of the field.
	pub fn validate_value(&self, field: &str, value: &Value) -> Option<String> {
		let rules = self.get(field)?;
		guarded(field, || rules.evaluate(value))
	}
}

impl<T: FormValues> RuleSet<T> {
	/// Evaluate the rule set against a value record.
	///
	/// With `only` set, fields and check targets outside it are skipped.
	pub fn evaluate(&self, values: &T, only: Option<&[&str]>) -> HashMap<String, String> {
		let selected = |field: &str| only.is_none_or(|names| names.contains(&field));
		let mut errors = HashMap::new();

		for (field, rules) in &self.fields {
			if !selected(field.as_str()) {
				continue;
			}
			let value = values.field_value(field).unwrap_or(Value::Null);
			if let Some(message) = guarded(field, || rules.evaluate(&value)) {
				errors.insert(field.clone(), message);
			}
		}

		for check in &self.checks {
			if !selected(check.target.as_str()) || errors.contains_key(&check.target) {
				continue;
			}
			if let Some(message) = guarded(&check.target, || (check.check)(values)) {
				errors.insert(check.target.clone(), message);
			}
		}

		errors
	}
}

impl<T> Default for RuleSet<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> std::fmt::Debug for RuleSet<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RuleSet")
			.field("fields", &self.fields)
			.field("checks", &self.checks.len())
			.finish()
	}
}

fn guarded<F>(field: &str, evaluate: F) -> Option<String>
where
	F: FnOnce() -> Option<String>,
{
	match panic::catch_unwind(AssertUnwindSafe(evaluate)) {
		Ok(result) => result,
		Err(payload) => {
			let reason = payload
				.downcast_ref::<&str>()
				.map(|s| (*s).to_string())
				.or_else(|| payload.downcast_ref::<String>().cloned())
				.unwrap_or_default();
			tracing::error!(field, reason = %reason, "validation rule panicked");
			Some(messages::validation_failed(field))
		}
	}
}
