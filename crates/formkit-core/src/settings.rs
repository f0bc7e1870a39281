//! Typed settings
//!
//! All user-visible defaults (notification titles, fallback messages) and
//! behavioral switches (validation mode, boundary fallback options) live in
//! one [`Settings`] tree. Every section is `#[serde(default)]`, so a partial
//! TOML document only overrides what it names.
//!
//! ```
//! use formkit_core::settings::{Settings, ValidationMode};
//!
//! let settings = Settings::from_toml_str(r#"
//! [forms]
//! validation_mode = "on_change"
//!
//! [notifications]
//! success_message = "Saved!"
//! "#).unwrap();
//!
//! assert_eq!(settings.forms.validation_mode, ValidationMode::OnChange);
//! assert_eq!(settings.notifications.success_message, "Saved!");
//! assert_eq!(settings.notifications.error_title, "Error");
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to parse settings: {0}")]
	Parse(#[from] toml::de::Error),
}

/// When the form engine re-runs a field's rules on its own.
///
/// Errors are always cleared on change; this only controls when they are
/// computed again before submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
	/// Only `validate_all` / explicit calls compute errors.
	OnSubmit,
	/// Validate a field when it loses focus.
	#[default]
	OnBlur,
	/// Validate a field on blur and after every change.
	OnChange,
}

impl ValidationMode {
	pub fn validates_on_blur(self) -> bool {
		matches!(self, ValidationMode::OnBlur | ValidationMode::OnChange)
	}

	pub fn validates_on_change(self) -> bool {
		matches!(self, ValidationMode::OnChange)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
	pub validation_mode: ValidationMode,
}

/// Texts used by the submission pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
	pub success_title: String,
	pub success_message: String,
	pub error_title: String,
	/// Shown when a classified error has no usable message.
	pub error_message: String,
}

impl Default for NotificationSettings {
	fn default() -> Self {
		Self {
			success_title: "Success".to_string(),
			success_message: "Your changes have been saved".to_string(),
			error_title: "Error".to_string(),
			error_message: "Something went wrong. Please try again.".to_string(),
		}
	}
}

/// Defaults for error boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundarySettings {
	pub title: String,
	/// Render the technical-details panel in the default fallback.
	pub show_details: bool,
	/// Offer a full reload next to "try again".
	pub show_reload: bool,
	/// Send a notification when an error is caught.
	pub notify: bool,
}

impl Default for BoundarySettings {
	fn default() -> Self {
		Self {
			title: "Something went wrong".to_string(),
			show_details: false,
			show_reload: true,
			notify: true,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub forms: FormSettings,
	pub notifications: NotificationSettings,
	pub boundary: BoundarySettings,
}

impl Settings {
	/// Parse settings from a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_empty_document_yields_defaults() {
		let settings = Settings::from_toml_str("").unwrap();
		assert_eq!(settings, Settings::default());
		assert_eq!(settings.forms.validation_mode, ValidationMode::OnBlur);
	}

	#[rstest]
	fn test_boundary_section_override() {
		// Arrange
		let source = r#"
			[boundary]
			show_details = true
			notify = false
		"#;

		// Act
		let settings = Settings::from_toml_str(source).unwrap();

		// Assert
		assert!(settings.boundary.show_details);
		assert!(!settings.boundary.notify);
		assert!(settings.boundary.show_reload);
	}

	#[rstest]
	fn test_invalid_mode_is_parse_error() {
		let result = Settings::from_toml_str("[forms]\nvalidation_mode = \"sometimes\"");
		assert!(matches!(result, Err(SettingsError::Parse(_))));
	}

	#[rstest]
	#[case(ValidationMode::OnSubmit, false, false)]
	#[case(ValidationMode::OnBlur, true, false)]
	#[case(ValidationMode::OnChange, true, true)]
	fn test_validation_mode_triggers(
		#[case] mode: ValidationMode,
		#[case] on_blur: bool,
		#[case] on_change: bool,
	) {
		assert_eq!(mode.validates_on_blur(), on_blur);
		assert_eq!(mode.validates_on_change(), on_change);
	}
}
