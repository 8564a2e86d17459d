use serde::{Deserialize, Serialize};

/// Process-wide policy for how editor pages map onto database sessions.
///
/// Read once from configuration; it selects which invariant scope the execution
/// state tracker enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionMode {
	/// Every page shares one database session; exclusion is global.
	SharedSession,
	/// Each page owns its own session; exclusion is per page.
	#[default]
	MultiSession,
}

impl ExecutionMode {
	/// Returns the lowercase config name of the mode.
	pub fn as_str(self) -> &'static str {
		self.into()
	}
}

/// Transaction state of a live session as last reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionState {
	/// No uncommitted work.
	#[default]
	Idle,
	/// An open transaction with uncommitted work.
	Active,
}

/// Backend-assigned identifier of a database session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub String);

impl SessionId {
	/// Creates a session id.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}
}

impl std::fmt::Display for SessionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

bitflags::bitflags! {
	/// Feature switches advertised by the connected data source.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct DataSourceCaps: u32 {
		/// Running queries can be cancelled.
		const KILL_QUERY = 1 << 0;
		/// PL objects can be step-debugged.
		const PL_DEBUG = 1 << 1;
		/// PL objects can be compiled.
		const PL_COMPILE = 1 << 2;
		/// Triggers can be compiled.
		const TRIGGER_COMPILE = 1 << 3;
		/// Execution plans can be requested.
		const SQL_EXPLAIN = 1 << 4;
	}
}

/// Read-only view of a live database session.
///
/// The handle is owned by the session collaborator; orchestration only reads it
/// to gate transaction control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
	/// Backend session id.
	pub id: SessionId,
	/// Current transaction state.
	pub transaction_state: TransactionState,
	/// Whether every statement commits on its own.
	pub auto_commit: bool,
	/// Data-source capability flags.
	pub caps: DataSourceCaps,
}

impl SessionHandle {
	/// Creates an idle, manual-commit session with the given capabilities.
	pub fn new(id: SessionId, caps: DataSourceCaps) -> Self {
		Self {
			id,
			transaction_state: TransactionState::Idle,
			auto_commit: false,
			caps,
		}
	}

	/// Builder-style override of the auto-commit flag.
	pub fn with_auto_commit(mut self, auto_commit: bool) -> Self {
		self.auto_commit = auto_commit;
		self
	}

	/// Returns true if there is uncommitted work to commit or roll back.
	pub fn has_pending_transaction(&self) -> bool {
		self.transaction_state == TransactionState::Active
	}
}
