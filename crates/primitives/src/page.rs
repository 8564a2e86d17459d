use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier of one open editor page.
///
/// Keys are handed out by [`PageKeyGen`] and never reused while the process
/// lives, so a stale key can only ever miss, never alias a newer page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey(pub u64);

impl fmt::Display for PageKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "page#{}", self.0)
	}
}

/// Monotonic page key generator.
#[derive(Debug, Default, Clone)]
pub struct PageKeyGen {
	next: Arc<AtomicU64>,
}

impl PageKeyGen {
	/// Creates a generator whose first key is `page#1`.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the next unused key.
	pub fn next_key(&self) -> PageKey {
		PageKey(self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
	}
}
