//! SQL backend contract.

use async_trait::async_trait;
use dbide_primitives::SessionId;

use crate::error::Result;
use crate::protocol::{
	CompileRequest, CompileResponse, ExecuteRequest, ExecuteResponse, ExplainPlan, ExplainRequest, ParseRequest, ParseResponse, PlRunRequest,
	StopRequest, TransactionResponse,
};

/// Async requests against the database proxy.
///
/// Implementations own transport, retries and polling for long-running tasks;
/// each call resolves once with success or failure.
#[async_trait]
pub trait SqlBackend: Send + Sync {
	/// Executes a script or section.
	async fn execute(&self, req: ExecuteRequest) -> Result<ExecuteResponse>;

	/// Commits the session's open transaction.
	async fn commit(&self, session: &SessionId) -> Result<TransactionResponse>;

	/// Rolls back the session's open transaction.
	async fn rollback(&self, session: &SessionId) -> Result<TransactionResponse>;

	/// Requests cancellation of a running execution.
	async fn stop(&self, req: StopRequest) -> Result<()>;

	/// Runs a persisted PL object or anonymous block.
	async fn run_pl(&self, req: PlRunRequest) -> Result<ExecuteResponse>;

	/// Compiles a PL object.
	async fn compile(&self, req: CompileRequest) -> Result<CompileResponse>;

	/// Classifies a buffer before an anonymous run or debug.
	async fn parse(&self, req: ParseRequest) -> Result<ParseResponse>;

	/// Requests an execution plan.
	async fn explain(&self, req: ExplainRequest) -> Result<ExplainPlan>;
}
