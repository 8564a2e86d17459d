//! User-facing notifications raised by the console.
//!
//! Definitions are static; a [`NotificationKey`] pairs a definition with a
//! fixed message and parameterized notifications are plain functions building
//! a [`Notification`].

use std::time::Duration;

use crate::GateRejection;

/// Defines a static notification definition and its key.
///
/// ```ignore
/// notif!(NOTIF_EMPTY_SELECTION, EMPTY_SELECTION, Warn, "No statements selected");
/// ```
macro_rules! notif {
	($def:ident, $key:ident, $level:ident, $msg:literal $(, auto_dismiss: $dismiss:expr)?) => {
		static $def: NotificationDef =
			NotificationDef::new(concat!("dbide::", stringify!($key)), Level::$level, notif!(@dismiss $($dismiss)?));

		#[doc = concat!("Static notification: ", $msg)]
		pub const $key: NotificationKey = NotificationKey::new(&$def, $msg);
	};
	($def:ident, $level:ident $(, auto_dismiss: $dismiss:expr)?) => {
		static $def: NotificationDef =
			NotificationDef::new(concat!("dbide::", stringify!($def)), Level::$level, notif!(@dismiss $($dismiss)?));
	};
	(@dismiss $dismiss:expr) => {
		$dismiss
	};
	(@dismiss) => {
		AutoDismiss::DEFAULT
	};
}

/// How loudly the frontend should present a notification.
///
/// Ordered from least to most severe, so `level >= Level::Warn` reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
	#[default]
	Info,
	Success,
	Warn,
	Error,
}

/// When the frontend may drop a notification on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDismiss {
	/// Sticks until the user closes it.
	Never,
	After(Duration),
}

impl AutoDismiss {
	pub const DEFAULT: Self = Self::After(Duration::from_secs(4));
}

impl Default for AutoDismiss {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Identity and presentation of one kind of notification, declared by `notif!`.
#[derive(Debug)]
pub struct NotificationDef {
	/// Stable `dbide::NAME` identifier the frontend can key on.
	pub id: &'static str,
	pub level: Level,
	pub auto_dismiss: AutoDismiss,
}

impl NotificationDef {
	pub const fn new(id: &'static str, level: Level, auto_dismiss: AutoDismiss) -> Self {
		Self { id, level, auto_dismiss }
	}
}

/// A notification with its rendered message.
#[derive(Debug, Clone)]
pub struct Notification {
	pub def: &'static NotificationDef,
	pub message: String,
}

impl Notification {
	pub fn new(def: &'static NotificationDef, message: impl Into<String>) -> Self {
		let message = message.into();
		Self { def, message }
	}

	pub fn id(&self) -> &'static str {
		self.def.id
	}

	pub fn level(&self) -> Level {
		self.def.level
	}

	pub fn auto_dismiss(&self) -> AutoDismiss {
		self.def.auto_dismiss
	}
}

/// Definition bound to a message known at compile time.
#[derive(Debug, Clone, Copy)]
pub struct NotificationKey {
	def: &'static NotificationDef,
	message: &'static str,
}

impl NotificationKey {
	pub const fn new(def: &'static NotificationDef, message: &'static str) -> Self {
		Self { def, message }
	}

	pub fn emit(self) -> Notification {
		Notification::new(self.def, self.message)
	}

	pub fn id(self) -> &'static str {
		self.def.id
	}
}

impl From<NotificationKey> for Notification {
	fn from(key: NotificationKey) -> Self {
		key.emit()
	}
}

/// Notification keys and builders.
pub mod keys {
	use super::*;

	notif!(NOTIF_UNSAVED_CHANGES, Warn);
	notif!(NOTIF_NOT_ANONYMOUS, Warn);
	notif!(NOTIF_EMPTY_SELECTION, EMPTY_SELECTION, Warn, "No statements selected");
	notif!(NOTIF_CAPABILITY_MISSING, Warn);
	notif!(NOTIF_EXECUTE_FAILED, Error, auto_dismiss: AutoDismiss::Never);
	notif!(NOTIF_COMMIT_FAILED, Error, auto_dismiss: AutoDismiss::Never);
	notif!(NOTIF_ROLLBACK_FAILED, Error, auto_dismiss: AutoDismiss::Never);
	notif!(NOTIF_STOP_FAILED, Error);
	notif!(NOTIF_COMPILE_FAILED, Error, auto_dismiss: AutoDismiss::Never);
	notif!(NOTIF_COMPILE_DIAGNOSTICS, Warn, auto_dismiss: AutoDismiss::Never);
	notif!(NOTIF_PARSE_FAILED, Error);
	notif!(NOTIF_EXPLAIN_FAILED, Error);
	notif!(NOTIF_DEBUG_FAILED, Error, auto_dismiss: AutoDismiss::Never);
	notif!(NOTIF_COMMITTED, COMMITTED, Success, "Transaction committed");
	notif!(NOTIF_ROLLED_BACK, ROLLED_BACK, Success, "Transaction rolled back");
	notif!(NOTIF_QUERY_STOPPED, QUERY_STOPPED, Info, "Query cancelled");
	notif!(NOTIF_COMPILED, COMPILED, Success, "Compiled without errors");
	notif!(NOTIF_DEBUG_FINISHED, DEBUG_FINISHED, Info, "Debug session finished");

	/// Persisted object has unsaved edits.
	pub fn unsaved_changes(name: &str) -> Notification {
		Notification::new(&NOTIF_UNSAVED_CHANGES, format!("Save `{name}` before running it"))
	}

	pub fn not_anonymous(parsed_as: &str) -> Notification {
		Notification::new(
			&NOTIF_NOT_ANONYMOUS,
			format!("Script is not an anonymous block (parsed as {parsed_as})"),
		)
	}

	pub fn capability_missing(action: &str) -> Notification {
		Notification::new(
			&NOTIF_CAPABILITY_MISSING,
			format!("{action} is not supported by this data source"),
		)
	}

	pub fn execute_failed(err: &dyn std::fmt::Display) -> Notification {
		Notification::new(&NOTIF_EXECUTE_FAILED, format!("Execution failed: {err}"))
	}

	pub fn commit_failed(err: &dyn std::fmt::Display) -> Notification {
		Notification::new(&NOTIF_COMMIT_FAILED, format!("Commit failed: {err}"))
	}

	pub fn rollback_failed(err: &dyn std::fmt::Display) -> Notification {
		Notification::new(&NOTIF_ROLLBACK_FAILED, format!("Rollback failed: {err}"))
	}

	pub fn stop_failed(err: &dyn std::fmt::Display) -> Notification {
		Notification::new(&NOTIF_STOP_FAILED, format!("Cancel failed: {err}"))
	}

	pub fn compile_failed(err: &dyn std::fmt::Display) -> Notification {
		Notification::new(&NOTIF_COMPILE_FAILED, format!("Compile failed: {err}"))
	}

	/// Compilation finished with `count` diagnostics.
	pub fn compile_diagnostics(count: usize) -> Notification {
		Notification::new(
			&NOTIF_COMPILE_DIAGNOSTICS,
			format!("Compiled with {count} problem(s)"),
		)
	}

	pub fn parse_failed(err: &dyn std::fmt::Display) -> Notification {
		Notification::new(&NOTIF_PARSE_FAILED, format!("Parse failed: {err}"))
	}

	pub fn explain_failed(err: &dyn std::fmt::Display) -> Notification {
		Notification::new(&NOTIF_EXPLAIN_FAILED, format!("Explain failed: {err}"))
	}

	pub fn debug_failed(err: &dyn std::fmt::Display) -> Notification {
		Notification::new(&NOTIF_DEBUG_FAILED, format!("Debugger: {err}"))
	}
}

impl From<&GateRejection> for Notification {
	fn from(rejection: &GateRejection) -> Self {
		match rejection {
			GateRejection::UnsavedChanges { name } => keys::unsaved_changes(name),
			GateRejection::NotAnonymousBlock(kind) => keys::not_anonymous((*kind).into()),
			GateRejection::EmptySelection => keys::EMPTY_SELECTION.emit(),
			GateRejection::CapabilityMissing { action, .. } => keys::capability_missing(action.name()),
		}
	}
}
