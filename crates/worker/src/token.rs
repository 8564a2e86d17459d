use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Hands out [`GenerationToken`]s with strictly increasing generations.
///
/// Clones share the counter. The first token is generation 1.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	last: Arc<AtomicU64>,
}

impl GenerationClock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Generation of the most recently issued token; 0 before the first.
	pub fn current(&self) -> u64 {
		self.last.load(Ordering::Acquire)
	}

	/// Issues a token for a fresh, uncancelled generation.
	pub fn token(&self) -> GenerationToken {
		let generation = self.last.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
		GenerationToken {
			generation,
			cancel: CancellationToken::new(),
		}
	}
}

/// Identity and cancellation handle of one piece of restartable work.
///
/// A response tagged with an older generation than the live one is stale.
/// Clones observe the same cancellation.
#[derive(Debug, Clone)]
pub struct GenerationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl GenerationToken {
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Resolves once [`cancel`](Self::cancel) is called on any clone.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}
}
