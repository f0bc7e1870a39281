//! Default fallback model
//!
//! What a boundary shows when no custom fallback is configured. This is a
//! plain, serializable description; turning it into UI is the host's job.

use formkit_core::exception::ErrorDescription;
use formkit_core::settings::BoundarySettings;
use serde::Serialize;
use serde_json::{Map, Value};

/// Recovery actions offered by the default fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackAction {
	/// Reset the boundary and render the children again.
	TryAgain,
	/// Reload the whole page.
	Reload,
}

impl FallbackAction {
	pub fn label(self) -> &'static str {
		match self {
			FallbackAction::TryAgain => "Try again",
			FallbackAction::Reload => "Reload page",
		}
	}
}

/// Technical-details panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalDetails {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub component: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cause: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Map<String, Value>>,
	pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultFallback {
	pub title: String,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<TechnicalDetails>,
	pub actions: Vec<FallbackAction>,
}

impl DefaultFallback {
	/// Build the fallback for `error` under the given settings.
	///
	/// # Examples
	///
	/// ```
	/// use formkit_core::exception::ErrorClassifier;
	/// use formkit_core::settings::BoundarySettings;
	/// use formkit_pages::fallback::{DefaultFallback, FallbackAction};
	///
	/// let error = ErrorClassifier::default().from_message("boom");
	/// let fallback = DefaultFallback::new(&error, &BoundarySettings::default(), None);
	///
	/// assert_eq!(fallback.message, "boom");
	/// assert!(fallback.details.is_none());
	/// assert_eq!(fallback.actions, vec![FallbackAction::TryAgain, FallbackAction::Reload]);
	/// ```
	pub fn new(
		error: &ErrorDescription,
		settings: &BoundarySettings,
		component: Option<&str>,
	) -> Self {
		let details = settings.show_details.then(|| TechnicalDetails {
			component: component.map(str::to_string),
			code: error.code().map(str::to_string),
			cause: error.cause().map(str::to_string),
			details: error.details().cloned(),
			timestamp: error.timestamp().to_string(),
		});
		let mut actions = vec![FallbackAction::TryAgain];
		if settings.show_reload {
			actions.push(FallbackAction::Reload);
		}
		Self {
			title: settings.title.clone(),
			message: error.message().to_string(),
			details,
			actions,
		}
	}

	pub fn has_action(&self, action: FallbackAction) -> bool {
		self.actions.contains(&action)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use formkit_core::exception::{ClientError, ErrorClassifier};
	use rstest::rstest;

	#[rstest]
	fn test_details_panel_when_enabled() {
		// Arrange
		let error = ErrorClassifier::default().classify(&anyhow::Error::new(ClientError::Timeout));
		let settings = BoundarySettings {
			show_details: true,
			show_reload: false,
			..BoundarySettings::default()
		};

		// Act
		let fallback = DefaultFallback::new(&error, &settings, Some("AccountPanel"));

		// Assert
		let details = fallback.details.as_ref().unwrap();
		assert_eq!(details.code.as_deref(), Some("TIMEOUT"));
		assert_eq!(details.component.as_deref(), Some("AccountPanel"));
		assert!(!fallback.has_action(FallbackAction::Reload));
		assert!(fallback.has_action(FallbackAction::TryAgain));
	}

	#[rstest]
	fn test_serialized_shape() {
		let error = ErrorClassifier::default().from_message("boom");
		let fallback = DefaultFallback::new(&error, &BoundarySettings::default(), None);

		let json = serde_json::to_value(&fallback).unwrap();

		assert_eq!(json["title"], "Something went wrong");
		assert_eq!(json["actions"], serde_json::json!(["try_again", "reload"]));
		assert!(json.get("details").is_none());
	}

	#[rstest]
	#[case(FallbackAction::TryAgain, "Try again")]
	#[case(FallbackAction::Reload, "Reload page")]
	fn test_action_labels(#[case] action: FallbackAction, #[case] label: &str) {
		assert_eq!(action.label(), label);
	}
}
