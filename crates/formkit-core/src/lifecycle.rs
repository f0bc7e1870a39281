//! Mount-liveness sources
//!
//! After a submit action resolves, the owning UI element may already be gone.
//! Work that resumes after an `await` asks a [`MountState`] before touching
//! state or showing notifications.
//!
//! ```
//! use formkit_core::lifecycle::{MountState, Mounted};
//!
//! let mounted = Mounted::new();
//! let watcher = mounted.watcher();
//! assert!(watcher.is_mounted());
//!
//! drop(mounted);
//! assert!(!watcher.is_mounted());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Answers whether the owning UI element is still attached.
pub trait MountState: Send + Sync {
	fn is_mounted(&self) -> bool;
}

impl<F> MountState for F
where
	F: Fn() -> bool + Send + Sync,
{
	fn is_mounted(&self) -> bool {
		self()
	}
}

/// Liveness source for hosts with no teardown concept.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysMounted;

impl MountState for AlwaysMounted {
	fn is_mounted(&self) -> bool {
		true
	}
}

/// Mount token held by the owning component.
///
/// The element counts as mounted until [`Mounted::unmount`] is called or the
/// token is dropped.
#[derive(Debug)]
pub struct Mounted {
	flag: Arc<AtomicBool>,
}

impl Mounted {
	pub fn new() -> Self {
		Self {
			flag: Arc::new(AtomicBool::new(true)),
		}
	}

	/// A cloneable, read-only view for injection into pipelines.
	pub fn watcher(&self) -> MountWatcher {
		MountWatcher {
			flag: Arc::clone(&self.flag),
		}
	}

	pub fn unmount(&self) {
		self.flag.store(false, Ordering::Release);
	}

	pub fn is_mounted(&self) -> bool {
		self.flag.load(Ordering::Acquire)
	}
}

impl Default for Mounted {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Mounted {
	fn drop(&mut self) {
		self.unmount();
	}
}

/// Read-only view onto a [`Mounted`] token.
#[derive(Debug, Clone)]
pub struct MountWatcher {
	flag: Arc<AtomicBool>,
}

impl MountState for MountWatcher {
	fn is_mounted(&self) -> bool {
		self.flag.load(Ordering::Acquire)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_unmount_is_visible_to_watchers() {
		let mounted = Mounted::new();
		let watcher = mounted.watcher();
		let second = watcher.clone();

		mounted.unmount();

		assert!(!mounted.is_mounted());
		assert!(!watcher.is_mounted());
		assert!(!second.is_mounted());
	}

	#[rstest]
	fn test_closure_as_mount_state() {
		let source = || false;
		assert!(!source.is_mounted());
		assert!(AlwaysMounted.is_mounted());
	}
}
