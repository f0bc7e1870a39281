//! Error boundaries
//!
//! An [`ErrorBoundary`] guards a UI subtree. It is a two-state machine:
//!
//! ```text
//! Clean --(error or panic while rendering / in a handler)--> Caught
//! Caught --(reset)--> Clean
//! ```
//!
//! In `Caught` the boundary renders a fallback instead of its children. A
//! reset re-attempts normal rendering; if the children fail again the
//! boundary simply catches again.
//!
//! ## Example
//!
//! ```
//! use formkit_pages::boundary::{ErrorBoundary, Rendered};
//!
//! let boundary: ErrorBoundary<String> = ErrorBoundary::new().silent();
//!
//! let first = boundary.render(|| anyhow::bail!("boom")).unwrap();
//! assert!(matches!(first, Rendered::Fallback(_)));
//! assert_eq!(boundary.error().unwrap().message(), "boom");
//!
//! boundary.reset();
//! let second = boundary.render(|| Ok("hello".to_string())).unwrap();
//! assert_eq!(second, Rendered::Children("hello".to_string()));
//! ```

use crate::fallback::DefaultFallback;
use formkit_core::exception::{ErrorClassifier, ErrorDescription};
use formkit_core::messages::{Notifier, TracingNotifier};
use formkit_core::settings::BoundarySettings;
use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

type FallbackRenderer<V> = Arc<dyn Fn(&ErrorDescription, ResetHandle) -> anyhow::Result<V> + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&ErrorDescription, &ErrorContext) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryState {
	Clean,
	Caught(ErrorDescription),
}

/// Where a caught error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
	Render,
	Handler,
	Async,
}

impl fmt::Display for RenderPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RenderPhase::Render => f.write_str("render"),
			RenderPhase::Handler => f.write_str("handler"),
			RenderPhase::Async => f.write_str("async"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
	pub component: Option<String>,
	pub phase: RenderPhase,
}

/// Output of [`ErrorBoundary::render`].
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<V> {
	Children(V),
	Fallback(Fallback<V>),
}

impl<V> Rendered<V> {
	pub fn is_fallback(&self) -> bool {
		matches!(self, Rendered::Fallback(_))
	}

	pub fn children(self) -> Option<V> {
		match self {
			Rendered::Children(view) => Some(view),
			Rendered::Fallback(_) => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fallback<V> {
	/// Output of the caller's fallback renderer.
	Custom(V),
	Default(DefaultFallback),
}

struct Shared {
	state: BoundaryState,
	fallback_renders: usize,
}

/// Cloneable handle that resets the boundary it came from.
///
/// Custom fallbacks receive one so a "try again" control can reset
/// without holding the boundary itself.
#[derive(Clone)]
pub struct ResetHandle {
	shared: Arc<Mutex<Shared>>,
}

impl ResetHandle {
	pub fn reset(&self) {
		self.shared.lock().state = BoundaryState::Clean;
		tracing::debug!("error boundary reset");
	}
}

impl fmt::Debug for ResetHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResetHandle").finish_non_exhaustive()
	}
}

/// Error boundary around one UI subtree
///
/// Clones share the same state.
pub struct ErrorBoundary<V> {
	shared: Arc<Mutex<Shared>>,
	component: Option<String>,
	settings: BoundarySettings,
	classifier: ErrorClassifier,
	fallback: Option<FallbackRenderer<V>>,
	on_error: Option<ErrorHook>,
	notifier: Arc<dyn Notifier>,
}

impl<V> Clone for ErrorBoundary<V> {
	fn clone(&self) -> Self {
		Self {
			shared: Arc::clone(&self.shared),
			component: self.component.clone(),
			settings: self.settings.clone(),
			classifier: self.classifier.clone(),
			fallback: self.fallback.clone(),
			on_error: self.on_error.clone(),
			notifier: Arc::clone(&self.notifier),
		}
	}
}

impl<V> ErrorBoundary<V> {
	pub fn new() -> Self {
		Self {
			shared: Arc::new(Mutex::new(Shared {
				state: BoundaryState::Clean,
				fallback_renders: 0,
			})),
			component: None,
			settings: BoundarySettings::default(),
			classifier: ErrorClassifier::default(),
			fallback: None,
			on_error: None,
			notifier: Arc::new(TracingNotifier),
		}
	}

	/// Name used in logs and in the technical-details panel.
	pub fn with_component(mut self, name: impl Into<String>) -> Self {
		self.component = Some(name.into());
		self
	}

	pub fn with_settings(mut self, settings: &BoundarySettings) -> Self {
		self.settings = settings.clone();
		self
	}

	/// Render `fallback` instead of the default fallback.
	///
	/// An error returned (or a panic raised) by the renderer is passed to the
	/// enclosing boundary.
	pub fn with_fallback<F>(mut self, fallback: F) -> Self
	where
		F: Fn(&ErrorDescription, ResetHandle) -> anyhow::Result<V> + Send + Sync + 'static,
	{
		self.fallback = Some(Arc::new(fallback));
		self
	}

	pub fn on_error<F>(mut self, hook: F) -> Self
	where
		F: Fn(&ErrorDescription, &ErrorContext) + Send + Sync + 'static,
	{
		self.on_error = Some(Arc::new(hook));
		self
	}

	pub fn with_notifier<N>(mut self, notifier: N) -> Self
	where
		N: Notifier + 'static,
	{
		self.notifier = Arc::new(notifier);
		self
	}

	/// Do not send notifications for caught errors.
	pub fn silent(mut self) -> Self {
		self.settings.notify = false;
		self
	}

	/// Render the children, or the fallback while an error is held.
	pub fn render<F>(&self, children: F) -> anyhow::Result<Rendered<V>>
	where
		F: FnOnce() -> anyhow::Result<V>,
	{
		if let Some(error) = self.error() {
			return self.render_fallback(&error);
		}

		let error = match panic::catch_unwind(AssertUnwindSafe(children)) {
			Ok(Ok(view)) => return Ok(Rendered::Children(view)),
			Ok(Err(err)) => self.classifier.classify(&err),
			Err(payload) => self.classifier.classify_panic(payload.as_ref()),
		};
		self.record(error.clone(), RenderPhase::Render);
		self.render_fallback(&error)
	}

	/// Run an event handler registered under this boundary.
	///
	/// Returns `None` when the handler failed; the boundary is then in
	/// `Caught` and the next render shows the fallback.
	pub fn run_handler<R, F>(&self, handler: F) -> Option<R>
	where
		F: FnOnce() -> anyhow::Result<R>,
	{
		let error = match panic::catch_unwind(AssertUnwindSafe(handler)) {
			Ok(Ok(value)) => return Some(value),
			Ok(Err(err)) => self.classifier.classify(&err),
			Err(payload) => self.classifier.classify_panic(payload.as_ref()),
		};
		self.record(error, RenderPhase::Handler);
		None
	}

	/// Report an error from asynchronous work owned by the subtree.
	pub fn catch(&self, err: &anyhow::Error) {
		let error = self.classifier.classify(err);
		self.record(error, RenderPhase::Async);
	}

	fn record(&self, error: ErrorDescription, phase: RenderPhase) {
		let context = ErrorContext {
			component: self.component.clone(),
			phase,
		};
		tracing::error!(
			component = context.component.as_deref().unwrap_or("<anonymous>"),
			phase = %phase,
			error = %error,
			"error caught by boundary"
		);
		self.shared.lock().state = BoundaryState::Caught(error.clone());

		if let Some(hook) = &self.on_error {
			hook(&error, &context);
		}
		if self.settings.notify {
			self.notifier.show_error(&self.settings.title, error.message());
		}
	}

	fn render_fallback(&self, error: &ErrorDescription) -> anyhow::Result<Rendered<V>> {
		self.shared.lock().fallback_renders += 1;

		let Some(renderer) = &self.fallback else {
			let fallback =
				DefaultFallback::new(error, &self.settings, self.component.as_deref());
			return Ok(Rendered::Fallback(Fallback::Default(fallback)));
		};

		let reset = self.reset_handle();
		match panic::catch_unwind(AssertUnwindSafe(|| renderer(error, reset))) {
			Ok(Ok(view)) => Ok(Rendered::Fallback(Fallback::Custom(view))),
			Ok(Err(err)) => {
				tracing::error!(error = %err, "fallback renderer failed");
				Err(err.context("Error boundary fallback failed"))
			}
			Err(payload) => {
				let description = self.classifier.classify_panic(payload.as_ref());
				tracing::error!(error = %description, "fallback renderer panicked");
				Err(anyhow::anyhow!(
					"Error boundary fallback panicked: {}",
					description.message()
				))
			}
		}
	}

	/// Clear the held error so the next render re-attempts the children.
	pub fn reset(&self) {
		self.reset_handle().reset();
	}

	pub fn reset_handle(&self) -> ResetHandle {
		ResetHandle {
			shared: Arc::clone(&self.shared),
		}
	}

	pub fn state(&self) -> BoundaryState {
		self.shared.lock().state.clone()
	}

	pub fn has_error(&self) -> bool {
		matches!(self.shared.lock().state, BoundaryState::Caught(_))
	}

	pub fn error(&self) -> Option<ErrorDescription> {
		match &self.shared.lock().state {
			BoundaryState::Caught(error) => Some(error.clone()),
			BoundaryState::Clean => None,
		}
	}

	/// How many times a fallback has been rendered.
	pub fn fallback_renders(&self) -> usize {
		self.shared.lock().fallback_renders
	}
}

impl<V> Default for ErrorBoundary<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V> fmt::Debug for ErrorBoundary<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ErrorBoundary")
			.field("component", &self.component)
			.field("state", &self.state())
			.field("fallback_renders", &self.fallback_renders())
			.finish_non_exhaustive()
	}
}
