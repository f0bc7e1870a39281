//! # formkit
//!
//! Form state, validation, submission and error recovery for client
//! applications.
//!
//! Every data-entry surface (sign-up wizards, account settings, contact
//! forms, allocation forms) is built on the same engine:
//!
//! - **Form state**: values, per-field errors, touched fields, dirty and
//!   submitting flags for an arbitrary serde record
//! - **Validation**: composable field rules, cross-field checks and
//!   pluggable schemas, with one policy (validate on blur, clear on change)
//! - **Submission**: an async pipeline with a validation gate, notifications,
//!   optional reset and mount-safety
//! - **Error boundaries**: a failure anywhere in a guarded subtree degrades to
//!   a typed fallback that can be reset
//!
//! ## Feature Flags
//!
//! - `forms` - Form engine, validators, submission pipeline, wizards
//! - `pages` - Error boundaries and fallbacks
//! - `full` (default) - All of the above
//!
//! ## Quick Example
//!
//! ```
//! use formkit::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Contact {
//!     email: String,
//! }
//!
//! let rules = RuleSet::new()
//!     .required("email", "Email is required")
//!     .rule("email", validators::email("Enter a valid email address"));
//! let form = Form::new(Contact { email: String::new() }, rules);
//!
//! let email = form.bind_field("email");
//! email.change("ada@").unwrap();
//! email.blur();
//! assert_eq!(email.error().as_deref(), Some("Enter a valid email address"));
//! ```

pub mod core;

#[cfg(feature = "forms")]
pub mod forms;

#[cfg(feature = "pages")]
pub mod pages;

pub use formkit_core::{
	ClientError, ErrorClassifier, ErrorDescription, MemoryNotifier, MountState, Mounted, Notifier,
	Settings, TracingNotifier, ValidationMode,
};

#[cfg(feature = "forms")]
pub use formkit_forms::{
	BoundField, Form, FormError, FormWizard, RuleSet, SubmitHandler, SubmitOptions,
	create_submit_handler,
};

#[cfg(feature = "pages")]
pub use formkit_pages::{ErrorBoundary, Rendered};

/// Re-export commonly used types
pub mod prelude {
	pub use formkit_core::prelude::*;

	// External
	pub use async_trait::async_trait;
	pub use serde::{Deserialize, Serialize};

	#[cfg(feature = "forms")]
	pub use formkit_forms::prelude::*;

	#[cfg(feature = "pages")]
	pub use formkit_pages::prelude::*;
}
