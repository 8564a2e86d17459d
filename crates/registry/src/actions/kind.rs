use dbide_primitives::DataSourceCaps;

use super::builtins;
use super::def::ActionDescriptor;

/// Every operation the console toolbar can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumIter, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
	/// Execute the whole script.
	Run,
	/// Execute the current selection.
	RunSection,
	/// Request the execution plan of the current statement.
	Explain,
	Commit,
	Rollback,
	/// Cancel the query running on this page.
	Stop,
	PlCompile,
	PlRun,
	PlDebug,
	TriggerCompile,
	AnonymousRun,
	AnonymousDebug,
	PlDebugStepIn,
	PlDebugStepOver,
	PlDebugStepOut,
	PlDebugResume,
	PlDebugRetry,
	PlDebugExit,
}

impl ActionKind {
	/// Stable action id, e.g. `RUN_SECTION`.
	pub fn name(self) -> &'static str {
		self.into()
	}

	/// Static descriptor of this action.
	pub fn descriptor(self) -> &'static ActionDescriptor {
		match self {
			Self::Run => &builtins::sql::RUN,
			Self::RunSection => &builtins::sql::RUN_SECTION,
			Self::Explain => &builtins::sql::EXPLAIN,
			Self::Commit => &builtins::transaction::COMMIT,
			Self::Rollback => &builtins::transaction::ROLLBACK,
			Self::Stop => &builtins::transaction::STOP,
			Self::PlCompile => &builtins::pl::PL_COMPILE,
			Self::PlRun => &builtins::pl::PL_RUN,
			Self::PlDebug => &builtins::pl::PL_DEBUG,
			Self::TriggerCompile => &builtins::pl::TRIGGER_COMPILE,
			Self::AnonymousRun => &builtins::pl::ANONYMOUS_RUN,
			Self::AnonymousDebug => &builtins::pl::ANONYMOUS_DEBUG,
			Self::PlDebugStepIn => &builtins::debug::STEP_IN,
			Self::PlDebugStepOver => &builtins::debug::STEP_OVER,
			Self::PlDebugStepOut => &builtins::debug::STEP_OUT,
			Self::PlDebugResume => &builtins::debug::RESUME,
			Self::PlDebugRetry => &builtins::debug::RETRY,
			Self::PlDebugExit => &builtins::debug::EXIT,
		}
	}

	/// Data-source capabilities the action cannot do without.
	pub fn required_caps(self) -> DataSourceCaps {
		self.descriptor().required_caps
	}

	/// Starts a new debug session.
	pub const fn is_debug_start(self) -> bool {
		matches!(self, Self::PlDebug | Self::AnonymousDebug)
	}

	/// Drives an existing debug session.
	pub const fn is_debug_control(self) -> bool {
		matches!(
			self,
			Self::PlDebugStepIn
				| Self::PlDebugStepOver
				| Self::PlDebugStepOut
				| Self::PlDebugResume
				| Self::PlDebugRetry
				| Self::PlDebugExit
		)
	}

	/// Compiles, runs or debugs a persisted PL object by name.
	pub const fn targets_persisted_object(self) -> bool {
		matches!(
			self,
			Self::PlCompile | Self::PlRun | Self::PlDebug | Self::TriggerCompile
		)
	}

	/// Sends the page text, which must not carry unsaved edits of a persisted
	/// object.
	pub const fn guards_unsaved_edits(self) -> bool {
		self.targets_persisted_object() || matches!(self, Self::Run | Self::RunSection)
	}

	/// Operates on an anonymous block.
	pub const fn targets_anonymous_block(self) -> bool {
		matches!(self, Self::AnonymousRun | Self::AnonymousDebug)
	}
}

impl std::fmt::Display for ActionKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}
