//! Shared building blocks: error classification, notifications, mount
//! liveness and settings.
//!
//! # Examples
//!
//! ```
//! use formkit::core::exception::ErrorClassifier;
//! use formkit::core::settings::Settings;
//!
//! let settings = Settings::default();
//! let classifier = ErrorClassifier::new(settings.notifications.error_message.clone());
//! assert_eq!(classifier.from_message("").message(), settings.notifications.error_message);
//! ```

pub use formkit_core::*;
