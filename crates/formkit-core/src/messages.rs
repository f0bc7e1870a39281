//! Notification sinks
//!
//! The submission pipeline and the error boundary report outcomes through an
//! injected [`Notifier`] instead of a global toast singleton. Presentation is
//! the host application's concern; this module only defines the capability
//! and two sinks:
//!
//! - [`MemoryNotifier`]: records every notification, for tests and for hosts
//!   that drain notifications into their own UI.
//! - [`TracingNotifier`]: forwards notifications to `tracing`.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Fire-and-forget notification capability.
pub trait Notifier: Send + Sync {
	fn show_success(&self, title: &str, message: &str);
	fn show_error(&self, title: &str, message: &str);
}

/// Severity of a recorded notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
	Success,
	Error,
}

/// A single notification as seen by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
	pub level: Level,
	pub title: String,
	pub message: String,
}

/// In-memory notification sink
///
/// Clones share the same buffer, so a test can keep one handle and inject
/// another.
///
/// # Examples
///
/// ```
/// use formkit_core::messages::{Level, MemoryNotifier, Notifier};
///
/// let notifier = MemoryNotifier::new();
/// notifier.show_success("Saved", "Your profile was updated");
///
/// let recorded = notifier.peek();
/// assert_eq!(recorded.len(), 1);
/// assert_eq!(recorded[0].level, Level::Success);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
	notifications: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of everything recorded so far.
	pub fn peek(&self) -> Vec<Notification> {
		self.notifications.lock().clone()
	}

	/// Remove and return everything recorded so far.
	pub fn drain(&self) -> Vec<Notification> {
		self.notifications.lock().drain(..).collect()
	}

	pub fn len(&self) -> usize {
		self.notifications.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.notifications.lock().is_empty()
	}

	/// Recorded notifications of one level.
	pub fn with_level(&self, level: Level) -> Vec<Notification> {
		self.notifications
			.lock()
			.iter()
			.filter(|n| n.level == level)
			.cloned()
			.collect()
	}

	fn push(&self, level: Level, title: &str, message: &str) {
		self.notifications.lock().push(Notification {
			level,
			title: title.to_string(),
			message: message.to_string(),
		});
	}
}

impl Notifier for MemoryNotifier {
	fn show_success(&self, title: &str, message: &str) {
		self.push(Level::Success, title, message);
	}

	fn show_error(&self, title: &str, message: &str) {
		self.push(Level::Error, title, message);
	}
}

/// Notification sink that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
	fn show_success(&self, title: &str, message: &str) {
		tracing::info!(title, message, "notification");
	}

	fn show_error(&self, title: &str, message: &str) {
		tracing::warn!(title, message, "error notification");
	}
}
