use dbide_primitives::PageKey;

/// One of the tracked page sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerFlag {
	/// Whole-script execution.
	Running,
	/// Selected-section execution; implies [`TrackerFlag::Running`].
	RunningSection,
	Committing,
	RollingBack,
	Stopping,
}

impl TrackerFlag {
	/// Short name used in log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Running => "running",
			Self::RunningSection => "running_section",
			Self::Committing => "committing",
			Self::RollingBack => "rolling_back",
			Self::Stopping => "stopping",
		}
	}
}

/// Kind of tracker change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerChange {
	Marked(TrackerFlag),
	Cleared(TrackerFlag),
	/// Every entry for the page was dropped (page closed).
	Purged,
}

/// Published after every effective tracker mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerEvent {
	/// Page whose entry changed.
	pub page: PageKey,
	/// What changed.
	pub change: TrackerChange,
	/// Tracker revision after the change.
	pub revision: u64,
}
