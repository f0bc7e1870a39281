//! Error classification
//!
//! Every failure that reaches a user-facing surface (a rejected submission,
//! a failed render) is normalized into an [`ErrorDescription`] first. The
//! classifier accepts `anyhow::Error`, plain `std::error::Error` values,
//! panic payloads and bare messages.
//!
//! ## Example
//!
//! ```
//! use formkit_core::exception::{ClientError, ErrorClassifier};
//!
//! let classifier = ErrorClassifier::default();
//! let err = anyhow::Error::new(ClientError::Http {
//!     status: 404,
//!     message: "Account not found".to_string(),
//! });
//!
//! let description = classifier.classify(&err);
//! assert_eq!(description.message(), "Account not found");
//! assert_eq!(description.code(), Some("HTTP_404"));
//! ```

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::error::Error as StdError;

/// Message used when a failure carries no usable text.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Errors raised by the network collaborators behind a submit action.
///
/// The classifier looks for this type anywhere in an error chain and lifts
/// its code and details into the resulting [`ErrorDescription`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
	#[error("{message}")]
	Http { status: u16, message: String },
	#[error("Network request failed: {0}")]
	Network(String),
	#[error("The request timed out")]
	Timeout,
	#[error("{message}")]
	Coded {
		code: String,
		message: String,
		details: Option<Map<String, Value>>,
	},
}

impl ClientError {
	/// Stable machine-readable code for this error.
	///
	/// # Examples
	///
	/// ```
	/// use formkit_core::exception::ClientError;
	///
	/// assert_eq!(ClientError::Timeout.code(), "TIMEOUT");
	/// assert_eq!(ClientError::Network("offline".into()).code(), "NETWORK_ERROR");
	/// ```
	pub fn code(&self) -> String {
		match self {
			ClientError::Http { status, .. } => format!("HTTP_{status}"),
			ClientError::Network(_) => "NETWORK_ERROR".to_string(),
			ClientError::Timeout => "TIMEOUT".to_string(),
			ClientError::Coded { code, .. } => code.clone(),
		}
	}

	/// Structured details attached to this error, if any.
	pub fn details(&self) -> Option<Map<String, Value>> {
		match self {
			ClientError::Http { status, .. } => {
				let mut details = Map::new();
				details.insert("status".to_string(), Value::from(*status));
				Some(details)
			}
			ClientError::Coded { details, .. } => details.clone(),
			ClientError::Network(_) | ClientError::Timeout => None,
		}
	}
}

/// Uniform description of a failure.
///
/// Created once by [`ErrorClassifier`] and never mutated afterwards; the
/// fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDescription {
	message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	details: Option<Map<String, Value>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	cause: Option<String>,
	timestamp: String,
}

impl ErrorDescription {
	fn new(
		message: String,
		code: Option<String>,
		details: Option<Map<String, Value>>,
		cause: Option<String>,
	) -> Self {
		Self {
			message,
			code,
			details,
			cause,
			timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
		}
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn code(&self) -> Option<&str> {
		self.code.as_deref()
	}

	pub fn details(&self) -> Option<&Map<String, Value>> {
		self.details.as_ref()
	}

	pub fn cause(&self) -> Option<&str> {
		self.cause.as_deref()
	}

	/// RFC 3339 UTC timestamp of the moment the error was classified.
	pub fn timestamp(&self) -> &str {
		&self.timestamp
	}
}

impl std::fmt::Display for ErrorDescription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.code {
			Some(code) => write!(f, "[{code}] {}", self.message),
			None => f.write_str(&self.message),
		}
	}
}

/// Normalizes thrown or rejected values into [`ErrorDescription`]s.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
	fallback_message: String,
}

impl ErrorClassifier {
	/// Create a classifier that substitutes `fallback_message` for empty messages.
	pub fn new(fallback_message: impl Into<String>) -> Self {
		Self {
			fallback_message: fallback_message.into(),
		}
	}

	/// Classify an `anyhow::Error`, inspecting its whole chain.
	pub fn classify(&self, err: &anyhow::Error) -> ErrorDescription {
		let client = err.chain().find_map(|e| e.downcast_ref::<ClientError>());
		let cause = err.chain().nth(1).map(|source| source.to_string());
		self.describe(err.to_string(), client, cause)
	}

	/// Classify any standard error and its `source()` chain.
	///
	/// # Examples
	///
	/// ```
	/// use formkit_core::exception::ErrorClassifier;
	///
	/// let io = std::io::Error::other("disk full");
	/// let description = ErrorClassifier::default().classify_error(&io);
	/// assert_eq!(description.message(), "disk full");
	/// assert!(description.code().is_none());
	/// ```
	pub fn classify_error(&self, err: &(dyn StdError + 'static)) -> ErrorDescription {
		let mut client = None;
		let mut current = Some(err);
		while let Some(e) = current {
			if let Some(found) = e.downcast_ref::<ClientError>() {
				client = Some(found);
				break;
			}
			current = e.source();
		}
		let cause = err.source().map(|source| source.to_string());
		self.describe(err.to_string(), client, cause)
	}

	/// Classify the payload of a caught panic.
	///
	/// `&str` and `String` payloads keep their text; anything else becomes
	/// the fallback message.
	pub fn classify_panic(&self, payload: &(dyn Any + Send)) -> ErrorDescription {
		let message = payload
			.downcast_ref::<&str>()
			.map(|s| (*s).to_string())
			.or_else(|| payload.downcast_ref::<String>().cloned())
			.unwrap_or_default();
		self.describe(message, None, None)
	}

	/// Build a description from a bare message.
	pub fn from_message(&self, message: impl Into<String>) -> ErrorDescription {
		self.describe(message.into(), None, None)
	}

	fn describe(
		&self,
		message: String,
		client: Option<&ClientError>,
		cause: Option<String>,
	) -> ErrorDescription {
		let message = if message.trim().is_empty() {
			self.fallback_message.clone()
		} else {
			message
		};
		ErrorDescription::new(
			message,
			client.map(ClientError::code),
			client.and_then(ClientError::details),
			cause,
		)
	}
}

impl Default for ErrorClassifier {
	fn default() -> Self {
		Self::new(GENERIC_ERROR_MESSAGE)
	}
}
