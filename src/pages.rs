//! Error boundaries and fallbacks
//!
//! This module provides access to formkit-pages. An [`ErrorBoundary`] keeps
//! a failing subtree from taking down the rest of the UI and exposes a reset
//! that re-attempts normal rendering.
//!
//! ## Example
//!
//! ```
//! use formkit::pages::{ErrorBoundary, Rendered};
//!
//! let boundary: ErrorBoundary<&str> = ErrorBoundary::new().silent();
//! let rendered = boundary.render(|| Ok("profile")).unwrap();
//! assert_eq!(rendered, Rendered::Children("profile"));
//! ```

pub use formkit_pages::*;
