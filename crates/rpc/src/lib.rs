//! Backend collaborator contracts.
//!
//! The orchestration layer never speaks a wire format itself. It talks to the
//! database proxy through these traits, which transports implement:
//! * [`SqlBackend`]: execute, transaction control, cancellation, compile, parse, explain
//! * [`DebugBackend`]: remote step-debugging of PL routines
//! * [`RequestIdGen`]: correlation ids for in-flight requests

#![warn(missing_docs)]

pub mod backend;
pub mod debug;
pub mod error;
pub mod protocol;

pub use backend::SqlBackend;
pub use debug::{DebugBackend, DebugEvent, DebugStartRequest, DebugTarget, RemoteDebugId, StackFrame, StepCommand};
pub use error::{Result, RpcError};
pub use protocol::{
	CompileDiagnostic, CompileRequest, CompileResponse, ExecuteRequest, ExecuteResponse, ExplainPlan, ExplainRequest, ParseRequest, ParseResponse,
	PlRunRequest, RequestId, RequestIdGen, StatementResult, StopRequest, TransactionResponse,
};
