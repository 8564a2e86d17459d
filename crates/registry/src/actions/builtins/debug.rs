//! Debug session controls.

use dbide_debug::DebugStatus;
use dbide_primitives::ActionStatus;
use dbide_rpc::StepCommand;

use crate::actions::{ActionContext, Confirmation};

fn step_status(ctx: &ActionContext<'_>, command: StepCommand) -> ActionStatus {
	match ctx.debug {
		Some(status) if status == DebugStatus::for_command(command) => ActionStatus::Running,
		Some(DebugStatus::Init) => ActionStatus::Init,
		_ => ActionStatus::Disable,
	}
}

fn step_in_status(ctx: &ActionContext<'_>) -> ActionStatus {
	step_status(ctx, StepCommand::StepIn)
}

fn step_over_status(ctx: &ActionContext<'_>) -> ActionStatus {
	step_status(ctx, StepCommand::StepOver)
}

fn step_out_status(ctx: &ActionContext<'_>) -> ActionStatus {
	step_status(ctx, StepCommand::StepOut)
}

fn resume_status(ctx: &ActionContext<'_>) -> ActionStatus {
	step_status(ctx, StepCommand::Resume)
}

fn retry_status(ctx: &ActionContext<'_>) -> ActionStatus {
	match ctx.debug {
		Some(DebugStatus::Recover) => ActionStatus::Running,
		Some(status) if status.is_end() => ActionStatus::Init,
		_ => ActionStatus::Disable,
	}
}

fn exit_status(ctx: &ActionContext<'_>) -> ActionStatus {
	match ctx.debug {
		Some(DebugStatus::Exiting) => ActionStatus::Running,
		Some(status) if status.is_end() => ActionStatus::Init,
		_ => ActionStatus::Disable,
	}
}

fn debugging(ctx: &ActionContext<'_>) -> bool {
	ctx.debugging()
}

fn confirm_retry(_: &ActionContext<'_>) -> Option<Confirmation> {
	Some(Confirmation::DebugRetry)
}

action!(STEP_IN => PlDebugStepIn, {
	name: "Step In",
	description: "Step into the next call",
	status: step_in_status,
	visible: debugging,
});

action!(STEP_OVER => PlDebugStepOver, {
	name: "Step Over",
	description: "Step over the next statement",
	status: step_over_status,
	visible: debugging,
});

action!(STEP_OUT => PlDebugStepOut, {
	name: "Step Out",
	description: "Run until the current routine returns",
	status: step_out_status,
	visible: debugging,
});

action!(RESUME => PlDebugResume, {
	name: "Resume",
	description: "Run to the next breakpoint",
	status: resume_status,
	visible: debugging,
});

action!(RETRY => PlDebugRetry, {
	name: "Retry",
	description: "Restart the debug session",
	status: retry_status,
	visible: debugging,
	confirm: confirm_retry,
});

action!(EXIT => PlDebugExit, {
	name: "Exit",
	description: "Leave debug mode and restore the script",
	status: exit_status,
	visible: debugging,
});
