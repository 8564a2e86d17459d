//! Execution and debug orchestration for the SQL/PL console.
//!
//! A [`Console`] owns the process-wide [`OrchestrationContext`]: the execution
//! state tracker, the debug controller, the session registry and every open
//! page. Toolbar actions are resolved from that state and invoked through
//! [`Console::invoke`], which gates, marks, calls the backend and applies the
//! response. Button refreshes are driven by a [`ToolbarWatcher`] fed from the
//! tracker, debug and page change channels.

mod buffer;
mod config;
mod console;
mod context;
mod effects;
mod error;
mod notifications;
mod pages;
mod sessions;
mod watcher;

pub use buffer::{EditorBuffer, TextBuffer};
pub use config::{ConsoleConfig, DebugConfig, ToolbarConfig};
pub use console::Console;
pub use context::OrchestrationContext;
pub use effects::InvokeOutcome;
pub use error::{ConfigError, ConsoleError};
pub use notifications::NotificationCenter;
pub use pages::{PageChange, PageOutput, PageSpec};
pub use sessions::SessionRegistry;
pub use watcher::{ButtonChange, ToolbarWatcher};
