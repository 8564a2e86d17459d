use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dbide_primitives::{ExecutionMode, PageKey};
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::guard::TrackerGuard;
use crate::{PageSet, ScopePolicy, TrackerChange, TrackerError, TrackerEvent, TrackerFlag, TrackerSnapshot, scope_for};

/// Capacity of the change channel; slow subscribers observe `Lagged` and resync.
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct TrackerSets {
	running: PageSet,
	running_section: PageSet,
	committing: PageSet,
	rolling_back: PageSet,
	stopping: PageSet,
}

impl TrackerSets {
	fn set(&self, flag: TrackerFlag) -> &PageSet {
		match flag {
			TrackerFlag::Running => &self.running,
			TrackerFlag::RunningSection => &self.running_section,
			TrackerFlag::Committing => &self.committing,
			TrackerFlag::RollingBack => &self.rolling_back,
			TrackerFlag::Stopping => &self.stopping,
		}
	}

	fn set_mut(&mut self, flag: TrackerFlag) -> &mut PageSet {
		match flag {
			TrackerFlag::Running => &mut self.running,
			TrackerFlag::RunningSection => &mut self.running_section,
			TrackerFlag::Committing => &mut self.committing,
			TrackerFlag::RollingBack => &mut self.rolling_back,
			TrackerFlag::Stopping => &mut self.stopping,
		}
	}
}

/// Tracks in-flight script execution and transaction control per page.
///
/// Invariants, enforced on every `mark_*`:
/// * a page is in at most one of running, committing, rolling back;
/// * running section pages are a subset of running pages;
/// * stopping never overlaps committing or rolling back.
///
/// Under [`ExecutionMode::SharedSession`] the conflict checks are global, so a
/// commit on one page also blocks runs on every other page.
#[derive(Debug)]
pub struct ExecutionStateTracker {
	mode: ExecutionMode,
	scope: Arc<dyn ScopePolicy>,
	sets: RwLock<TrackerSets>,
	revision: AtomicU64,
	events: broadcast::Sender<TrackerEvent>,
}

impl ExecutionStateTracker {
	/// Creates an empty tracker whose scope follows `mode`.
	pub fn new(mode: ExecutionMode) -> Self {
		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		let scope = scope_for(mode);
		tracing::debug!(mode = mode.as_str(), scope = scope.name(), "tracker.new");
		Self {
			mode,
			scope,
			sets: RwLock::new(TrackerSets::default()),
			revision: AtomicU64::new(0),
			events,
		}
	}

	/// Returns the execution mode the tracker was built for.
	pub fn mode(&self) -> ExecutionMode {
		self.mode
	}

	/// Returns the scope policy in effect.
	pub fn scope(&self) -> &dyn ScopePolicy {
		self.scope.as_ref()
	}

	/// Returns the current revision; bumped on every effective mutation.
	pub fn revision(&self) -> u64 {
		self.revision.load(Ordering::Acquire)
	}

	/// Subscribes to change events.
	pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
		self.events.subscribe()
	}

	/// Marks `page` as running a whole script or, with `section`, a selection.
	///
	/// Returns `Ok(false)` if the page is already running; the existing entry is
	/// left untouched.
	pub fn mark_running(&self, page: PageKey, section: bool) -> Result<bool, TrackerError> {
		let mut sets = self.sets.write();
		if sets.running.contains(&page) {
			return Ok(false);
		}
		self.check_clear(&sets, page, &[TrackerFlag::Committing, TrackerFlag::RollingBack, TrackerFlag::Stopping])?;
		sets.running.insert(page);
		let flag = if section {
			sets.running_section.insert(page);
			TrackerFlag::RunningSection
		} else {
			TrackerFlag::Running
		};
		drop(sets);
		self.publish(page, TrackerChange::Marked(flag));
		Ok(true)
	}

	/// Clears a running entry (whole or section). Returns false if none existed.
	pub fn clear_running(&self, page: PageKey) -> bool {
		let mut sets = self.sets.write();
		if !sets.running.remove(&page) {
			return false;
		}
		let flag = if sets.running_section.remove(&page) {
			TrackerFlag::RunningSection
		} else {
			TrackerFlag::Running
		};
		drop(sets);
		self.publish(page, TrackerChange::Cleared(flag));
		true
	}

	/// Marks `page` as committing.
	pub fn mark_committing(&self, page: PageKey) -> Result<bool, TrackerError> {
		self.mark_exclusive(
			page,
			TrackerFlag::Committing,
			&[TrackerFlag::Committing, TrackerFlag::Running, TrackerFlag::RollingBack, TrackerFlag::Stopping],
		)
	}

	/// Clears a committing entry.
	pub fn clear_committing(&self, page: PageKey) -> bool {
		self.clear_flag(page, TrackerFlag::Committing)
	}

	/// Marks `page` as rolling back.
	pub fn mark_rolling_back(&self, page: PageKey) -> Result<bool, TrackerError> {
		self.mark_exclusive(
			page,
			TrackerFlag::RollingBack,
			&[TrackerFlag::RollingBack, TrackerFlag::Running, TrackerFlag::Committing, TrackerFlag::Stopping],
		)
	}

	/// Clears a rolling-back entry.
	pub fn clear_rolling_back(&self, page: PageKey) -> bool {
		self.clear_flag(page, TrackerFlag::RollingBack)
	}

	/// Marks a cancellation in flight for a running page.
	pub fn mark_stopping(&self, page: PageKey) -> Result<bool, TrackerError> {
		let mut sets = self.sets.write();
		if sets.stopping.contains(&page) {
			return Ok(false);
		}
		if !sets.running.contains(&page) {
			return Err(TrackerError::NotRunning(page));
		}
		self.check_clear(&sets, page, &[TrackerFlag::Committing, TrackerFlag::RollingBack])?;
		sets.stopping.insert(page);
		drop(sets);
		self.publish(page, TrackerChange::Marked(TrackerFlag::Stopping));
		Ok(true)
	}

	/// Clears a stopping entry.
	pub fn clear_stopping(&self, page: PageKey) -> bool {
		self.clear_flag(page, TrackerFlag::Stopping)
	}

	/// Marks `flag` for `page` and returns a guard that clears it on drop.
	///
	/// Unlike `mark_*`, re-entering a flag the page already holds is an error:
	/// the guard would otherwise clear an entry owned by another effect.
	pub fn enter(self: &Arc<Self>, page: PageKey, flag: TrackerFlag) -> Result<TrackerGuard, TrackerError> {
		let marked = match flag {
			TrackerFlag::Running => self.mark_running(page, false)?,
			TrackerFlag::RunningSection => self.mark_running(page, true)?,
			TrackerFlag::Committing => self.mark_committing(page)?,
			TrackerFlag::RollingBack => self.mark_rolling_back(page)?,
			TrackerFlag::Stopping => self.mark_stopping(page)?,
		};
		if !marked {
			return Err(TrackerError::InFlight { page, flag });
		}
		Ok(TrackerGuard::new(Arc::clone(self), page, flag))
	}

	/// Removes every entry for `page`. Returns false if it held none.
	pub fn purge(&self, page: PageKey) -> bool {
		let mut sets = self.sets.write();
		let mut removed = false;
		for flag in [
			TrackerFlag::Running,
			TrackerFlag::RunningSection,
			TrackerFlag::Committing,
			TrackerFlag::RollingBack,
			TrackerFlag::Stopping,
		] {
			removed |= sets.set_mut(flag).remove(&page);
		}
		drop(sets);
		if removed {
			self.publish(page, TrackerChange::Purged);
		}
		removed
	}

	/// Returns true if `page` itself is running (whole or section).
	pub fn is_running(&self, page: PageKey) -> bool {
		self.sets.read().running.contains(&page)
	}

	/// Returns true if `page` itself is running a selected section.
	pub fn is_running_section(&self, page: PageKey) -> bool {
		self.sets.read().running_section.contains(&page)
	}

	/// Returns true if `page` itself is committing.
	pub fn is_committing(&self, page: PageKey) -> bool {
		self.sets.read().committing.contains(&page)
	}

	/// Returns true if `page` itself is rolling back.
	pub fn is_rolling_back(&self, page: PageKey) -> bool {
		self.sets.read().rolling_back.contains(&page)
	}

	/// Returns true if `page` itself is stopping.
	pub fn is_stopping(&self, page: PageKey) -> bool {
		self.sets.read().stopping.contains(&page)
	}

	/// Returns true if `flag` is held anywhere within `page`'s scope.
	pub fn in_scope(&self, page: PageKey, flag: TrackerFlag) -> bool {
		self.scope.holds(self.sets.read().set(flag), page)
	}

	/// Returns the pages currently holding `flag`, sorted.
	pub fn pages(&self, flag: TrackerFlag) -> Vec<PageKey> {
		let mut pages: Vec<_> = self.sets.read().set(flag).iter().copied().collect();
		pages.sort_unstable();
		pages
	}

	/// Captures the tracker state as seen from `page`.
	pub fn snapshot(&self, page: PageKey) -> TrackerSnapshot {
		let sets = self.sets.read();
		let scope = self.scope.as_ref();
		TrackerSnapshot {
			mode: self.mode,
			own_running: sets.running.contains(&page),
			own_running_section: sets.running_section.contains(&page),
			own_committing: sets.committing.contains(&page),
			own_rolling_back: sets.rolling_back.contains(&page),
			own_stopping: sets.stopping.contains(&page),
			scope_running: scope.holds(&sets.running, page),
			scope_committing: scope.holds(&sets.committing, page),
			scope_rolling_back: scope.holds(&sets.rolling_back, page),
			scope_stopping: scope.holds(&sets.stopping, page),
		}
	}

	/// `conflicts` may name `flag` itself: once the page's own entry is ruled
	/// out, that only matches another page under a global scope.
	fn mark_exclusive(&self, page: PageKey, flag: TrackerFlag, conflicts: &[TrackerFlag]) -> Result<bool, TrackerError> {
		let mut sets = self.sets.write();
		if sets.set(flag).contains(&page) {
			return Ok(false);
		}
		self.check_clear(&sets, page, conflicts)?;
		sets.set_mut(flag).insert(page);
		drop(sets);
		self.publish(page, TrackerChange::Marked(flag));
		Ok(true)
	}

	fn clear_flag(&self, page: PageKey, flag: TrackerFlag) -> bool {
		let removed = self.sets.write().set_mut(flag).remove(&page);
		if removed {
			self.publish(page, TrackerChange::Cleared(flag));
		}
		removed
	}

	fn check_clear(&self, sets: &TrackerSets, page: PageKey, conflicts: &[TrackerFlag]) -> Result<(), TrackerError> {
		match conflicts.iter().copied().find(|&flag| self.scope.holds(sets.set(flag), page)) {
			Some(held) => {
				tracing::debug!(%page, held = held.as_str(), scope = self.scope.name(), "tracker.conflict");
				Err(TrackerError::Conflict { page, held })
			}
			None => Ok(()),
		}
	}

	fn publish(&self, page: PageKey, change: TrackerChange) {
		let revision = self.revision.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
		tracing::trace!(%page, ?change, revision, "tracker.change");
		// No subscribers is fine; state is always readable directly.
		let _ = self.events.send(TrackerEvent { page, change, revision });
	}
}
