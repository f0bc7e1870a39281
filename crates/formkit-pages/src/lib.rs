//! Error boundaries for formkit
//!
//! A failure anywhere in a guarded subtree degrades to a typed fallback
//! instead of taking the whole UI down. Rendering itself stays with the
//! host; boundaries only decide *what* to render.

pub mod boundary;
pub mod fallback;

pub use boundary::{
	BoundaryState, ErrorBoundary, ErrorContext, Fallback, RenderPhase, Rendered, ResetHandle,
};
pub use fallback::{DefaultFallback, FallbackAction, TechnicalDetails};

/// Re-export commonly used types
pub mod prelude {
	pub use crate::boundary::*;
	pub use crate::fallback::*;
}
