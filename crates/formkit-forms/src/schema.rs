//! Schema validation adapter
//!
//! A [`Schema`] validates a whole value record at once and reports
//! violations with structured paths. [`adapt`] flattens those into the
//! engine's `field -> message` map so schema-backed forms and rule-backed
//! forms look the same to the rest of the crate.

use crate::form::{FORM_ERROR_KEY, FormValues};
use crate::validators::RuleSet;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Message reported when a schema fails without field-level detail.
pub const SCHEMA_FAILED_MESSAGE: &str = "Please check the form for errors";

/// One step of a violation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
	Key(String),
	Index(usize),
}

impl fmt::Display for PathSegment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PathSegment::Key(key) => f.write_str(key),
			PathSegment::Index(index) => write!(f, "{index}"),
		}
	}
}

impl From<&str> for PathSegment {
	fn from(key: &str) -> Self {
		PathSegment::Key(key.to_string())
	}
}

impl From<String> for PathSegment {
	fn from(key: String) -> Self {
		PathSegment::Key(key)
	}
}

impl From<usize> for PathSegment {
	fn from(index: usize) -> Self {
		PathSegment::Index(index)
	}
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
	pub path: Vec<PathSegment>,
	pub message: String,
}

impl Violation {
	pub fn new<I, P>(path: I, message: impl Into<String>) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PathSegment>,
	{
		Self {
			path: path.into_iter().map(Into::into).collect(),
			message: message.into(),
		}
	}

	/// A violation of the record as a whole.
	pub fn form(message: impl Into<String>) -> Self {
		Self {
			path: Vec::new(),
			message: message.into(),
		}
	}

	/// Dot-joined path, e.g. `address.lines.0`; [`FORM_ERROR_KEY`] when empty.
	pub fn field_key(&self) -> String {
		if self.path.is_empty() {
			return FORM_ERROR_KEY.to_string();
		}
		self.path
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(".")
	}
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
	/// Structured violations; the adapter maps each to a field.
	#[error("{} schema violation(s)", .0.len())]
	Violations(Vec<Violation>),
	/// Any other failure while validating.
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

/// A whole-record validator.
pub trait Schema<T>: Send + Sync {
	fn validate(&self, values: &T) -> Result<(), SchemaError>;
}

/// Schema backed by a closure.
pub struct FnSchema<F>(pub F);

impl<T, F> Schema<T> for FnSchema<F>
where
	F: Fn(&T) -> Result<(), SchemaError> + Send + Sync,
{
	fn validate(&self, values: &T) -> Result<(), SchemaError> {
		(self.0)(values)
	}
}

impl<T: FormValues> Schema<T> for RuleSet<T> {
	fn validate(&self, values: &T) -> Result<(), SchemaError> {
		let errors = self.evaluate(values, None);
		if errors.is_empty() {
			return Ok(());
		}
		let mut violations: Vec<Violation> = errors
			.into_iter()
			.map(|(field, message)| Violation::new([field], message))
			.collect();
		violations.sort_by_key(Violation::field_key);
		Err(SchemaError::Violations(violations))
	}
}

/// Run a schema and flatten its outcome into a `field -> message` map.
///
/// The first message for each key wins. Violations without a path land on
/// [`FORM_ERROR_KEY`]. Any non-structured failure, including a panic inside
/// the schema, becomes a single [`SCHEMA_FAILED_MESSAGE`] on
/// [`FORM_ERROR_KEY`].
///
/// # Examples
///
/// ```
/// use formkit_forms::schema::{adapt, FnSchema, SchemaError, Violation};
/// use serde_json::{Map, Value};
///
/// let schema = FnSchema(|_: &Map<String, Value>| -> Result<(), SchemaError> {
///     Err(SchemaError::Violations(vec![
///         Violation::new(["address", "zip"], "Invalid zip"),
///         Violation::new(["address", "zip"], "Too short"),
///     ]))
/// });
///
/// let errors = adapt(&schema, &Map::new());
/// assert_eq!(errors["address.zip"], "Invalid zip");
/// ```
pub fn adapt<T, S>(schema: &S, values: &T) -> HashMap<String, String>
where
	S: Schema<T> + ?Sized,
{
	let outcome = panic::catch_unwind(AssertUnwindSafe(|| schema.validate(values)));
	let mut errors = HashMap::new();

	match outcome {
		Ok(Ok(())) => {}
		Ok(Err(SchemaError::Violations(violations))) => {
			for violation in violations {
				errors
					.entry(violation.field_key())
					.or_insert(violation.message);
			}
		}
		Ok(Err(SchemaError::Other(err))) => {
			tracing::error!(error = %err, "schema validation failed");
			errors.insert(FORM_ERROR_KEY.to_string(), SCHEMA_FAILED_MESSAGE.to_string());
		}
		Err(_) => {
			tracing::error!("schema validation panicked");
			errors.insert(FORM_ERROR_KEY.to_string(), SCHEMA_FAILED_MESSAGE.to_string());
		}
	}

	errors
}
