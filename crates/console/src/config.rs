//! Console configuration.
//!
//! ```toml
//! execution_mode = "shared_session"
//!
//! [toolbar]
//! button_width = 28
//!
//! [debug]
//! confirm_retry = false
//! ```
//!
//! Every field is optional. The execution mode is read once when the console
//! is built.

use std::path::Path;

use dbide_primitives::ExecutionMode;
use dbide_registry::ToolbarMetrics;
use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
	/// How pages map onto database sessions.
	pub execution_mode: ExecutionMode,
	pub toolbar: ToolbarConfig,
	pub debug: DebugConfig,
}

/// Toolbar layout sizes, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolbarConfig {
	pub button_width: u32,
	pub group_gap: u32,
	pub overflow_width: u32,
}

impl Default for ToolbarConfig {
	fn default() -> Self {
		let metrics = ToolbarMetrics::default();
		Self {
			button_width: metrics.button_width,
			group_gap: metrics.group_gap,
			overflow_width: metrics.overflow_width,
		}
	}
}

impl ToolbarConfig {
	pub fn metrics(&self) -> ToolbarMetrics {
		ToolbarMetrics {
			button_width: self.button_width,
			group_gap: self.group_gap,
			overflow_width: self.overflow_width,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
	/// Ask before restarting an ended debug session.
	pub confirm_retry: bool,
}

impl Default for DebugConfig {
	fn default() -> Self {
		Self { confirm_retry: true }
	}
}

impl ConsoleConfig {
	/// Parses a configuration document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	/// Reads and parses a configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
			path: path.to_path_buf(),
			error,
		})?;
		let config = Self::from_toml_str(&input)?;
		tracing::debug!(path = %path.display(), mode = config.execution_mode.as_str(), "config.loaded");
		Ok(config)
	}
}
