//! Transaction control and cancellation.

use dbide_primitives::{ActionStatus, DataSourceCaps, ExecutionMode};

use crate::actions::{ActionContext, Confirmation};

fn transaction_status(ctx: &ActionContext<'_>, own: bool, other: bool) -> ActionStatus {
	let tracker = &ctx.tracker;
	if !ctx.session.has_pending_transaction() {
		return ActionStatus::Disable;
	}
	if tracker.scope_running || tracker.scope_stopping || other {
		return ActionStatus::Disable;
	}
	if own { ActionStatus::Running } else { ActionStatus::Init }
}

fn commit_status(ctx: &ActionContext<'_>) -> ActionStatus {
	transaction_status(ctx, ctx.tracker.scope_committing, ctx.tracker.scope_rolling_back)
}

fn rollback_status(ctx: &ActionContext<'_>) -> ActionStatus {
	transaction_status(ctx, ctx.tracker.scope_rolling_back, ctx.tracker.scope_committing)
}

fn stop_status(ctx: &ActionContext<'_>) -> ActionStatus {
	let tracker = &ctx.tracker;
	if tracker.scope_transaction_control() || !tracker.own_running {
		ActionStatus::Disable
	} else if tracker.own_stopping {
		ActionStatus::Running
	} else {
		ActionStatus::Init
	}
}

fn manual_commit(ctx: &ActionContext<'_>) -> bool {
	!ctx.session.auto_commit
}

fn confirm_commit(ctx: &ActionContext<'_>) -> Option<Confirmation> {
	(ctx.tracker.mode == ExecutionMode::SharedSession).then_some(Confirmation::SharedSessionCommit)
}

fn confirm_rollback(ctx: &ActionContext<'_>) -> Option<Confirmation> {
	(ctx.tracker.mode == ExecutionMode::SharedSession).then_some(Confirmation::SharedSessionRollback)
}

action!(COMMIT => Commit, {
	name: "Commit",
	description: "Commit the current transaction",
	status: commit_status,
	visible: manual_commit,
	confirm: confirm_commit,
});

action!(ROLLBACK => Rollback, {
	name: "Rollback",
	description: "Roll back the current transaction",
	status: rollback_status,
	visible: manual_commit,
	confirm: confirm_rollback,
});

action!(STOP => Stop, {
	name: "Stop",
	description: "Cancel the running query",
	caps: DataSourceCaps::KILL_QUERY,
	status: stop_status,
});
