use dbide_primitives::ExecutionMode;

/// Point-in-time view of the tracker from one page's perspective.
///
/// `own_*` fields answer "does this page hold the flag"; `scope_*` fields answer
/// "does any page within this page's scope hold it", which differs from the
/// former only in shared-session mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackerSnapshot {
	pub mode: ExecutionMode,
	pub own_running: bool,
	pub own_running_section: bool,
	pub own_committing: bool,
	pub own_rolling_back: bool,
	pub own_stopping: bool,
	pub scope_running: bool,
	pub scope_committing: bool,
	pub scope_rolling_back: bool,
	pub scope_stopping: bool,
}

impl TrackerSnapshot {
	/// This page runs the whole script.
	pub fn own_running_whole(&self) -> bool {
		self.own_running && !self.own_running_section
	}

	/// A commit or rollback is in flight within scope.
	pub fn scope_transaction_control(&self) -> bool {
		self.scope_committing || self.scope_rolling_back
	}

	/// Any of run, commit, rollback or stop is in flight within scope.
	pub fn scope_busy(&self) -> bool {
		self.scope_running || self.scope_transaction_control() || self.scope_stopping
	}
}
