//! PL object compile, run and debug start.

use dbide_primitives::{ActionStatus, DataSourceCaps, PlType, ScriptKind};

use super::{execution_status, not_package};
use crate::actions::{ActionContext, ActionKind};

fn debug_start_status(ctx: &ActionContext<'_>, kind: ActionKind) -> ActionStatus {
	if ctx.debugging() || ctx.tracker.scope_busy() {
		ActionStatus::Disable
	} else if ctx.in_flight == Some(kind) {
		ActionStatus::Running
	} else {
		ActionStatus::Init
	}
}

fn compile_status(ctx: &ActionContext<'_>) -> ActionStatus {
	execution_status(ctx, ActionKind::PlCompile)
}

fn pl_run_status(ctx: &ActionContext<'_>) -> ActionStatus {
	execution_status(ctx, ActionKind::PlRun)
}

fn pl_debug_status(ctx: &ActionContext<'_>) -> ActionStatus {
	debug_start_status(ctx, ActionKind::PlDebug)
}

fn trigger_compile_status(ctx: &ActionContext<'_>) -> ActionStatus {
	execution_status(ctx, ActionKind::TriggerCompile)
}

fn anonymous_run_status(ctx: &ActionContext<'_>) -> ActionStatus {
	execution_status(ctx, ActionKind::AnonymousRun)
}

fn anonymous_debug_status(ctx: &ActionContext<'_>) -> ActionStatus {
	debug_start_status(ctx, ActionKind::AnonymousDebug)
}

// Sub-elements of a package compile only as part of the whole package.
fn compilable(ctx: &ActionContext<'_>) -> bool {
	ctx.schema.is_some_and(|s| !s.pl_type.is_package_part())
}

fn is_trigger(ctx: &ActionContext<'_>) -> bool {
	ctx.schema.is_some_and(|s| s.pl_type == PlType::Trigger)
}

fn classified_anonymous(ctx: &ActionContext<'_>) -> bool {
	ctx.script_kind == Some(ScriptKind::AnonymousBlock)
}

action!(PL_COMPILE => PlCompile, {
	name: "Compile",
	description: "Compile the PL object",
	caps: DataSourceCaps::PL_COMPILE,
	status: compile_status,
	visible: compilable,
});

action!(PL_RUN => PlRun, {
	name: "Run",
	description: "Execute the PL object",
	status: pl_run_status,
	visible: not_package,
});

action!(PL_DEBUG => PlDebug, {
	name: "Debug",
	description: "Start a debug session for the PL object",
	caps: DataSourceCaps::PL_DEBUG,
	status: pl_debug_status,
	visible: not_package,
});

action!(TRIGGER_COMPILE => TriggerCompile, {
	name: "Compile",
	description: "Compile the trigger",
	caps: DataSourceCaps::TRIGGER_COMPILE,
	status: trigger_compile_status,
	visible: is_trigger,
});

action!(ANONYMOUS_RUN => AnonymousRun, {
	name: "Run",
	description: "Execute the anonymous block",
	status: anonymous_run_status,
	visible: classified_anonymous,
});

action!(ANONYMOUS_DEBUG => AnonymousDebug, {
	name: "Debug",
	description: "Debug the anonymous block",
	caps: DataSourceCaps::PL_DEBUG,
	status: anonymous_debug_status,
	visible: classified_anonymous,
});
