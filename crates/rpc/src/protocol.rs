//! Request and response payloads exchanged with the SQL backend.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dbide_primitives::{PlSchema, ScriptKind, SessionId, TransactionState};

/// Correlation id of one backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "req#{}", self.0)
	}
}

/// Shared counter-based request id generator.
///
/// Clones share the same counter so ids stay unique across every page.
#[derive(Debug, Default, Clone)]
pub struct RequestIdGen(Arc<AtomicU64>);

impl RequestIdGen {
	/// Creates a new generator starting at 0.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Generates the next unique id.
	pub fn next_id(&self) -> RequestId {
		RequestId(self.0.fetch_add(1, Ordering::Relaxed))
	}
}

/// Execution of a SQL script or a selected section of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteRequest {
	/// Correlation id; a later [`StopRequest`] names it.
	pub id: RequestId,
	/// Target session.
	pub session: SessionId,
	/// Script text.
	pub sql: String,
	/// True when only the selected section is executed.
	pub section: bool,
}

/// Outcome of one executed statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatementResult {
	/// Statement text as executed.
	pub sql: String,
	/// Rows affected, when reported.
	pub affected_rows: Option<u64>,
	/// Backend message (warnings, server output).
	pub message: Option<String>,
}

/// Result of an execute or PL run request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecuteResponse {
	/// Per-statement outcomes, in execution order.
	pub statements: Vec<StatementResult>,
	/// Transaction state of the session after execution.
	pub transaction_state: TransactionState,
}

/// Result of a commit or rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionResponse {
	/// Transaction state of the session afterwards.
	pub transaction_state: TransactionState,
}

/// Cooperative cancellation of a running execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopRequest {
	/// Session the execution runs on.
	pub session: SessionId,
	/// Execution being cancelled, if known.
	pub target: Option<RequestId>,
}

/// Invocation of a persisted PL object or an anonymous block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlRunRequest {
	/// Correlation id.
	pub id: RequestId,
	/// Target session.
	pub session: SessionId,
	/// Object being run.
	pub schema: PlSchema,
	/// Current editor text.
	pub script: String,
}

/// Compilation of a PL object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
	/// Correlation id.
	pub id: RequestId,
	/// Target session.
	pub session: SessionId,
	/// Object being compiled.
	pub schema: PlSchema,
}

/// One compiler message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileDiagnostic {
	/// 1-based source line, when known.
	pub line: Option<u32>,
	/// Compiler text.
	pub message: String,
}

/// Result of a compile request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompileResponse {
	/// Compiler diagnostics; empty on a clean compile.
	pub diagnostics: Vec<CompileDiagnostic>,
}

impl CompileResponse {
	/// Returns true when the object compiled without diagnostics.
	pub fn is_clean(&self) -> bool {
		self.diagnostics.is_empty()
	}
}

/// Pre-flight classification of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequest {
	/// Session whose dialect applies.
	pub session: SessionId,
	/// Buffer text.
	pub sql: String,
}

/// Execution plan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainRequest {
	/// Target session.
	pub session: SessionId,
	/// Statement to explain.
	pub sql: String,
}

/// Rendered execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExplainPlan {
	/// Plan lines, outermost operation first.
	pub lines: Vec<String>,
}

/// Classification returned by the parse request.
pub type ParseResponse = ScriptKind;
