use std::sync::Arc;

use dbide_primitives::PageKey;

use crate::{ExecutionStateTracker, TrackerFlag};

/// Clears a tracker flag when dropped.
///
/// Effects hold the guard across their backend call so the flag is cleared on
/// success, failure, and cancellation of the effect future alike.
#[derive(Debug)]
#[must_use = "dropping the guard clears the tracker flag immediately"]
pub struct TrackerGuard {
	tracker: Arc<ExecutionStateTracker>,
	page: PageKey,
	flag: TrackerFlag,
}

impl TrackerGuard {
	pub(crate) fn new(tracker: Arc<ExecutionStateTracker>, page: PageKey, flag: TrackerFlag) -> Self {
		Self { tracker, page, flag }
	}

	/// Page the guard tracks.
	pub fn page(&self) -> PageKey {
		self.page
	}

	/// Flag the guard clears.
	pub fn flag(&self) -> TrackerFlag {
		self.flag
	}
}

impl Drop for TrackerGuard {
	fn drop(&mut self) {
		let cleared = match self.flag {
			TrackerFlag::Running | TrackerFlag::RunningSection => self.tracker.clear_running(self.page),
			TrackerFlag::Committing => self.tracker.clear_committing(self.page),
			TrackerFlag::RollingBack => self.tracker.clear_rolling_back(self.page),
			TrackerFlag::Stopping => self.tracker.clear_stopping(self.page),
		};
		if !cleared {
			tracing::trace!(page = %self.page, flag = self.flag.as_str(), "tracker.guard.already_cleared");
		}
	}
}
