//! Remote PL debugger contract.

use std::fmt;

use async_trait::async_trait;
use dbide_primitives::{PlSchema, PlType, SessionId};

use crate::error::Result;

/// Identifier of a remote debug session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteDebugId(pub String);

impl fmt::Display for RemoteDebugId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Routine being debugged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugTarget {
	/// Owning package, for package members.
	pub package_name: Option<String>,
	/// Routine name; `None` for anonymous blocks.
	pub pl_name: Option<String>,
	/// Routine kind.
	pub pl_type: PlType,
}

impl From<&PlSchema> for DebugTarget {
	fn from(schema: &PlSchema) -> Self {
		Self {
			package_name: schema.package_name.clone(),
			pl_name: schema.pl_name.clone(),
			pl_type: schema.pl_type,
		}
	}
}

/// Request to launch a debug session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugStartRequest {
	/// Database session that hosts the debuggee.
	pub session: SessionId,
	/// Routine being debugged.
	pub target: DebugTarget,
	/// Script text to debug.
	pub script: String,
	/// Breakpoint lines installed before the first instruction runs.
	pub breakpoints: Vec<u32>,
}

/// Stepping command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepCommand {
	/// Step into the next call.
	StepIn,
	/// Step over the next call.
	StepOver,
	/// Run until the current frame returns.
	StepOut,
	/// Run until the next breakpoint or completion.
	Resume,
}

/// One frame of the remote call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
	/// Routine name of the frame.
	pub pl_name: String,
	/// Owning package, for package members.
	pub package_name: Option<String>,
	/// 1-based current line in the routine.
	pub line: u32,
}

/// What the remote debugger reports after a start or step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugEvent {
	/// Execution is suspended at `line`; innermost frame first.
	Paused {
		/// Line the debuggee stopped at.
		line: u32,
		/// Call stack, innermost frame first.
		call_stack: Vec<StackFrame>,
	},
	/// The routine ran to completion.
	Finished {
		/// Server output or return value, if any.
		output: Option<String>,
	},
	/// The remote session ended abnormally.
	Terminated {
		/// Backend-provided reason.
		reason: String,
	},
}

/// Async requests against the remote debugger.
#[async_trait]
pub trait DebugBackend: Send + Sync {
	/// Launches a debug session and reports where it first stops.
	async fn start(&self, req: DebugStartRequest) -> Result<(RemoteDebugId, DebugEvent)>;

	/// Issues one stepping command and reports where execution stops next.
	async fn step(&self, id: &RemoteDebugId, command: StepCommand) -> Result<DebugEvent>;

	/// Installs a breakpoint in a live session.
	async fn set_breakpoint(&self, id: &RemoteDebugId, line: u32) -> Result<()>;

	/// Removes a breakpoint from a live session.
	async fn remove_breakpoint(&self, id: &RemoteDebugId, line: u32) -> Result<()>;

	/// Tears down the remote session.
	async fn exit(&self, id: &RemoteDebugId) -> Result<()>;
}
