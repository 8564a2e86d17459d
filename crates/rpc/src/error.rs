//! Backend failure taxonomy.

use thiserror::Error;

/// Failure of one backend request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
	/// The backend rejected or failed the request.
	#[error("backend error: {message}")]
	Backend {
		/// Backend-provided message.
		message: String,
	},
	/// The request was cancelled before it completed.
	#[error("request cancelled")]
	Cancelled,
	/// The remote session (database or debugger) no longer exists.
	#[error("session closed: {0}")]
	SessionClosed(String),
	/// The transport to the backend is gone.
	#[error("backend disconnected")]
	Disconnected,
}

impl RpcError {
	/// Creates a [`RpcError::Backend`] from a message.
	pub fn backend(message: impl Into<String>) -> Self {
		Self::Backend { message: message.into() }
	}

	/// Returns true if the remote session is gone and cannot be reused.
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::SessionClosed(_) | Self::Disconnected)
	}
}

/// Result alias for backend calls.
pub type Result<T> = std::result::Result<T, RpcError>;
