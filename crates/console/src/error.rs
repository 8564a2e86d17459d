use std::path::PathBuf;

use dbide_primitives::PageKey;
use thiserror::Error;

/// Errors from page bookkeeping. Backend failures never surface here; they
/// become notifications and an [`InvokeOutcome::Failed`](crate::InvokeOutcome::Failed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
	#[error("{0} is not open")]
	UnknownPage(PageKey),
	/// The same persisted object is already open on another page of the session.
	#[error("`{name}` is already open on {page}")]
	PageAlreadyOpen { name: String, page: PageKey },
}

/// Failure to load a console configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("cannot read console config {}: {error}", path.display())]
	Read { path: PathBuf, error: std::io::Error },

	/// Bad TOML, or a well-formed file naming an unknown mode or key.
	#[error("invalid console config: {0}")]
	Parse(#[from] toml::de::Error),
}
