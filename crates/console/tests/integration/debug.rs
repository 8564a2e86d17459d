use std::sync::atomic::Ordering;

use dbide_console::InvokeOutcome;
use dbide_debug::DebugStatus;
use dbide_primitives::{ActionStatus, EditingContext, PlSchema, PlType};
use dbide_registry::notifications::keys;
use dbide_registry::{ActionKind, Confirmation};
use dbide_rpc::{DebugEvent, RpcError};
use pretty_assertions::assert_eq;

use crate::common::{Harness, paused};

const DDL: &str = "create procedure load_orders as\nbegin\n  null;\nend;";

fn procedure() -> PlSchema {
	PlSchema::named(PlType::Procedure, "load_orders", DDL)
}

#[tokio::test]
async fn step_in_pauses_at_the_next_breakpoint() {
	let h = Harness::multi();
	let (page, buffer) = h.shared_page("s1", Some(procedure()), DDL);
	assert!(h.console.toggle_breakpoint(page, 10).await.unwrap());
	assert!(h.console.toggle_breakpoint(page, 20).await.unwrap());

	assert_eq!(h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap(), InvokeOutcome::Completed);
	assert_eq!(h.debugger.started.lock()[0].breakpoints, vec![10, 20]);
	assert_eq!(buffer.markers(), vec![10, 20]);
	assert_eq!(buffer.highlighted(), Some(3));
	assert_eq!(h.console.editing_context(page).unwrap(), EditingContext::Debug);

	h.debugger.script([Ok(paused(20))]);
	assert_eq!(h.console.invoke(page, ActionKind::PlDebugStepIn, false).await.unwrap(), InvokeOutcome::Completed);

	let view = h.console.debug_view(page).unwrap();
	assert_eq!(view.status, DebugStatus::Init);
	assert_eq!(view.call_stack[0].line, 20);
	assert_eq!(buffer.highlighted(), Some(20));
}

#[tokio::test]
async fn selecting_a_frame_moves_the_highlight() {
	let h = Harness::multi();
	let (page, buffer) = h.shared_page("s1", Some(procedure()), DDL);
	h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap();

	assert_eq!(h.console.select_frame(page, 1).unwrap(), Some(1));
	assert_eq!(buffer.highlighted(), Some(1));
	assert_eq!(h.console.select_frame(page, 5).unwrap(), None);
	assert_eq!(buffer.highlighted(), Some(1));
}

#[tokio::test]
async fn failed_step_returns_to_init() {
	let h = Harness::multi();
	let (page, _buffer) = h.shared_page("s1", Some(procedure()), DDL);
	h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap();
	h.debugger.script([Err(RpcError::backend("timeout"))]);

	let outcome = h.console.invoke(page, ActionKind::PlDebugStepOver, false).await.unwrap();

	assert!(matches!(outcome, InvokeOutcome::Failed(RpcError::Backend { .. })));
	assert_eq!(h.console.debug_view(page).unwrap().status, DebugStatus::Init);
	assert_eq!(h.notification_ids(), vec![keys::debug_failed(&"x").id()]);
	assert_eq!(
		h.console.action_state(page, ActionKind::PlDebugStepOver).unwrap().status,
		ActionStatus::Init
	);
}

#[tokio::test]
async fn retry_and_exit_wait_for_the_end() {
	let h = Harness::multi();
	let (page, _buffer) = h.shared_page("s1", Some(procedure()), DDL);
	h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap();

	for kind in [ActionKind::PlDebugRetry, ActionKind::PlDebugExit] {
		assert_eq!(
			h.console.invoke(page, kind, true).await.unwrap(),
			InvokeOutcome::NotApplicable(ActionStatus::Disable)
		);
	}
	assert_eq!(h.debugger.calls("start"), 1);
	assert_eq!(h.debugger.calls("exit"), 0);
}

#[tokio::test]
async fn exit_restores_the_buffer_and_clears_markers() {
	let h = Harness::multi();
	let (page, buffer) = h.shared_page("s1", Some(procedure()), DDL);
	h.console.toggle_breakpoint(page, 2).await.unwrap();
	h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap();
	h.console.with_buffer(page, |b| b.set_value("-- scratch")).unwrap();

	assert_eq!(h.console.invoke(page, ActionKind::PlDebugResume, false).await.unwrap(), InvokeOutcome::Completed);
	assert!(h.console.context().debug().is_debug_end(page));
	assert_eq!(h.notification_ids(), vec![keys::DEBUG_FINISHED.id()]);

	assert_eq!(h.console.invoke(page, ActionKind::PlDebugExit, false).await.unwrap(), InvokeOutcome::Completed);
	assert_eq!(buffer.text(), DDL);
	assert!(buffer.markers().is_empty());
	assert_eq!(buffer.highlighted(), None);
	assert!(h.console.debug_view(page).is_none());
	assert_eq!(h.debugger.calls("exit"), 1);
	assert_eq!(h.console.editing_context(page).unwrap(), EditingContext::PlObject);
}

#[tokio::test]
async fn retry_restarts_with_persisted_breakpoints() {
	let h = Harness::multi();
	let (page, buffer) = h.shared_page("s1", Some(procedure()), DDL);
	h.console.toggle_breakpoint(page, 7).await.unwrap();
	h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap();
	let first_generation = h.console.debug_view(page).unwrap().generation;
	h.debugger.script([Ok(DebugEvent::Terminated {
		reason: "killed".into(),
	})]);
	h.console.invoke(page, ActionKind::PlDebugStepOver, false).await.unwrap();

	assert_eq!(
		h.console.invoke(page, ActionKind::PlDebugRetry, false).await.unwrap(),
		InvokeOutcome::NeedsConfirmation(Confirmation::DebugRetry)
	);
	assert_eq!(h.console.invoke(page, ActionKind::PlDebugRetry, true).await.unwrap(), InvokeOutcome::Completed);

	let view = h.console.debug_view(page).unwrap();
	assert_eq!(view.status, DebugStatus::Init);
	assert!(view.generation > first_generation);
	assert_eq!(h.debugger.calls("start"), 2);
	assert_eq!(h.debugger.started.lock()[1].breakpoints, vec![7]);
	assert_eq!(buffer.markers(), vec![7]);
	assert_eq!(buffer.highlighted(), Some(3));
}

#[tokio::test]
async fn failed_start_leaves_no_session() {
	let h = Harness::multi();
	let (page, _buffer) = h.shared_page("s1", Some(procedure()), DDL);
	h.debugger.fail_start.store(true, Ordering::SeqCst);

	let outcome = h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap();

	assert!(matches!(outcome, InvokeOutcome::Failed(_)));
	assert!(h.console.debug_view(page).is_none());
	assert_eq!(h.notification_ids(), vec![keys::debug_failed(&"x").id()]);
	assert_eq!(h.console.action_state(page, ActionKind::PlDebug).unwrap().status, ActionStatus::Init);
}

#[tokio::test]
async fn live_debug_session_blocks_a_second_start() {
	let h = Harness::multi();
	let (page, _buffer) = h.shared_page("s1", Some(procedure()), DDL);
	h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap();

	assert_eq!(
		h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap(),
		InvokeOutcome::NotApplicable(ActionStatus::Disable)
	);
	assert_eq!(h.debugger.calls("start"), 1);
}

#[tokio::test]
async fn breakpoints_toggle_on_a_live_session() {
	let h = Harness::multi();
	let (page, buffer) = h.shared_page("s1", Some(procedure()), DDL);
	h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap();

	assert!(h.console.toggle_breakpoint(page, 4).await.unwrap());
	assert!(!h.console.toggle_breakpoint(page, 4).await.unwrap());

	assert_eq!(h.debugger.calls("set_breakpoint"), 1);
	assert_eq!(h.debugger.calls("remove_breakpoint"), 1);
	assert!(buffer.markers().is_empty());
}

#[tokio::test]
async fn anonymous_block_debugs_the_buffer_text() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "begin null; end;");
	*h.sql.parse_as.lock() = dbide_primitives::ScriptKind::AnonymousBlock;
	h.console.classify(page).await.unwrap();

	assert_eq!(h.console.invoke(page, ActionKind::AnonymousDebug, false).await.unwrap(), InvokeOutcome::Completed);

	let started = h.debugger.started.lock()[0].clone();
	assert_eq!(started.target.pl_type, PlType::AnonymousBlock);
	assert_eq!(started.script, "begin null; end;");
}

#[tokio::test]
async fn runs_are_refused_while_debugging() {
	let h = Harness::multi();
	let (page, _buffer) = h.shared_page("s1", Some(procedure()), DDL);
	h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap();
	assert_eq!(h.console.editing_context(page).unwrap(), EditingContext::Debug);

	for kind in [ActionKind::Run, ActionKind::PlRun, ActionKind::PlCompile] {
		assert_eq!(
			h.console.invoke(page, kind, false).await.unwrap(),
			InvokeOutcome::NotApplicable(ActionStatus::Disable),
			"{kind}"
		);
		assert_eq!(h.console.action_state(page, kind).unwrap().status, ActionStatus::Disable, "{kind}");
	}
	assert_eq!(h.sql.calls("execute"), 0);
	assert_eq!(h.sql.calls("run_pl"), 0);
	assert_eq!(h.sql.calls("compile"), 0);
}

#[tokio::test]
async fn debugged_console_script_cannot_be_rerun() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "begin null; end;");
	*h.sql.parse_as.lock() = dbide_primitives::ScriptKind::AnonymousBlock;
	h.console.classify(page).await.unwrap();
	h.console.invoke(page, ActionKind::AnonymousDebug, false).await.unwrap();

	for kind in [ActionKind::Run, ActionKind::AnonymousRun] {
		assert_eq!(
			h.console.invoke(page, kind, false).await.unwrap(),
			InvokeOutcome::NotApplicable(ActionStatus::Disable),
			"{kind}"
		);
	}
	assert_eq!(h.sql.calls("execute") + h.sql.calls("run_pl"), 0);
}
