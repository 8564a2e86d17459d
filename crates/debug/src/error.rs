use dbide_primitives::PageKey;
use dbide_rpc::RpcError;
use thiserror::Error;

/// Debug lifecycle failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DebugError {
	/// The page already has a live or starting debug session.
	#[error("{0}: debug session already active")]
	AlreadyActive(PageKey),
	/// The page has no debug session.
	#[error("{0}: no debug session")]
	NoSession(PageKey),
	/// The remote debugger refused to start.
	#[error("debug start failed: {0}")]
	StartFailed(#[source] RpcError),
}
