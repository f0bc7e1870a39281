//! Shared building blocks for formkit
//!
//! This crate holds the pieces every other formkit crate leans on:
//! - Error classification into a uniform [`ErrorDescription`]
//! - The notification sink capability ([`Notifier`]) and in-memory / tracing sinks
//! - Mount-liveness sources used to guard state updates after an `await`
//! - Typed, serde-deserializable [`Settings`]

pub mod exception;
pub mod lifecycle;
pub mod messages;
pub mod settings;

pub use exception::{ClientError, ErrorClassifier, ErrorDescription, GENERIC_ERROR_MESSAGE};
pub use lifecycle::{AlwaysMounted, MountState, MountWatcher, Mounted};
pub use messages::{Level, MemoryNotifier, Notification, Notifier, TracingNotifier};
pub use settings::{
	BoundarySettings, FormSettings, NotificationSettings, Settings, SettingsError, ValidationMode,
};

/// Re-export commonly used types
pub mod prelude {
	pub use crate::exception::*;
	pub use crate::lifecycle::*;
	pub use crate::messages::*;
	pub use crate::settings::*;
}
