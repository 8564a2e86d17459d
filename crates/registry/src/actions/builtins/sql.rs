//! Plain SQL execution actions.

use dbide_primitives::{ActionStatus, DataSourceCaps};

use super::execution_status;
use crate::actions::{ActionContext, ActionKind};

fn run_status(ctx: &ActionContext<'_>) -> ActionStatus {
	execution_status(ctx, ActionKind::Run)
}

fn run_section_status(ctx: &ActionContext<'_>) -> ActionStatus {
	execution_status(ctx, ActionKind::RunSection)
}

fn explain_status(ctx: &ActionContext<'_>) -> ActionStatus {
	if ctx.tracker.scope_running || ctx.tracker.scope_transaction_control() {
		ActionStatus::Disable
	} else if ctx.in_flight == Some(ActionKind::Explain) {
		ActionStatus::Running
	} else {
		ActionStatus::Init
	}
}

action!(RUN => Run, {
	name: "Run",
	description: "Execute the whole script",
	status: run_status,
});

action!(RUN_SECTION => RunSection, {
	name: "Run Selected",
	description: "Execute the selected statements",
	status: run_section_status,
});

action!(EXPLAIN => Explain, {
	name: "Explain",
	description: "Show the execution plan",
	caps: DataSourceCaps::SQL_EXPLAIN,
	status: explain_status,
});
