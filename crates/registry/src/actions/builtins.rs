//! Built-in action descriptors and the status rules they share.

pub(crate) mod debug;
pub(crate) mod pl;
pub(crate) mod sql;
pub(crate) mod transaction;

use dbide_primitives::ActionStatus;

use super::{ActionContext, ActionKind};

/// Status of an action that marks the page running while it executes.
///
/// Disabled while the page is under debug or while transaction control or a
/// stop holds the scope. On a running
/// page only the action that started the execution reports `Running`; a
/// run started outside any action is attributed to `Run` or `RunSection` by
/// the section flag.
pub(crate) fn execution_status(ctx: &ActionContext<'_>, kind: ActionKind) -> ActionStatus {
	let tracker = &ctx.tracker;
	if ctx.debugging() || tracker.scope_transaction_control() || tracker.scope_stopping {
		return ActionStatus::Disable;
	}
	if !tracker.own_running {
		return ActionStatus::Init;
	}
	let owns = match ctx.in_flight {
		Some(in_flight) => in_flight == kind,
		None => match kind {
			ActionKind::Run => tracker.own_running_whole(),
			ActionKind::RunSection => tracker.own_running_section,
			_ => false,
		},
	};
	if owns { ActionStatus::Running } else { ActionStatus::Disable }
}

/// Shown for PL objects other than packages and their parts.
pub(crate) fn not_package(ctx: &ActionContext<'_>) -> bool {
	ctx.schema.is_some_and(|s| !s.pl_type.is_package())
}
