use dbide_console::{InvokeOutcome, PageOutput, PageSpec, TextBuffer};
use dbide_primitives::{ActionStatus, DataSourceCaps, PlSchema, PlType, Range, ScriptKind, SessionHandle, SessionId, TransactionState};
use dbide_registry::notifications::keys;
use dbide_registry::{ActionKind, GateRejection};
use dbide_rpc::RpcError;
use dbide_tracker::TrackerSnapshot;
use pretty_assertions::assert_eq;

use crate::common::{Harness, WAIT, wait_until};

#[tokio::test]
async fn run_records_transaction_state_and_output() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "insert into t values (1)");

	let outcome = h.console.invoke(page, ActionKind::Run, false).await.unwrap();

	assert_eq!(outcome, InvokeOutcome::Completed);
	assert_eq!(h.sql.calls("execute"), 1);
	let session = h.console.session_of(page).unwrap();
	let handle = h.console.context().sessions().get(&session).unwrap();
	assert_eq!(handle.transaction_state, TransactionState::Active);
	assert!(matches!(h.console.output(page).unwrap(), Some(PageOutput::Statements(_))));
	assert!(!h.console.context().tracker().is_running(page));
	assert_eq!(h.console.action_state(page, ActionKind::Commit).unwrap().status, ActionStatus::Init);
}

#[tokio::test]
async fn whole_run_in_flight_reports_running_and_blocks_section() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "select 1");
	h.sql.hold();

	let run = h.console.dispatch(page, ActionKind::Run, false);
	assert!(wait_until(WAIT, || h.console.context().tracker().is_running(page)).await);

	assert_eq!(h.console.action_state(page, ActionKind::Run).unwrap().status, ActionStatus::Running);
	assert_eq!(h.console.action_state(page, ActionKind::RunSection).unwrap().status, ActionStatus::Disable);
	assert_eq!(
		h.console.invoke(page, ActionKind::Run, false).await.unwrap(),
		InvokeOutcome::NotApplicable(ActionStatus::Running)
	);

	h.sql.release();
	assert_eq!(run.await.unwrap().unwrap(), InvokeOutcome::Completed);
	assert_eq!(h.sql.calls("execute"), 1);
	assert_eq!(h.console.action_state(page, ActionKind::Run).unwrap().status, ActionStatus::Init);
}

#[tokio::test]
async fn failed_runs_always_clear_the_tracker() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "select broken");
	h.sql.fail("execute");

	for _ in 0..3 {
		let outcome = h.console.invoke(page, ActionKind::Run, false).await.unwrap();
		assert!(matches!(outcome, InvokeOutcome::Failed(RpcError::Backend { .. })));
		assert_eq!(h.console.context().tracker().snapshot(page), TrackerSnapshot {
			mode: h.console.context().tracker().mode(),
			..TrackerSnapshot::default()
		});
	}

	assert_eq!(h.sql.calls("execute"), 3);
	let failed = keys::execute_failed(&"x").id();
	assert_eq!(h.notification_ids(), vec![failed; 3]);
}

#[tokio::test]
async fn empty_section_is_rejected_before_dispatch() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "select 1");

	let outcome = h.console.invoke(page, ActionKind::RunSection, false).await.unwrap();

	assert_eq!(outcome, InvokeOutcome::Rejected(GateRejection::EmptySelection));
	assert_eq!(h.sql.calls("execute"), 0);
	assert_eq!(h.notification_ids(), vec![keys::EMPTY_SELECTION.id()]);
}

#[tokio::test]
async fn section_run_sends_only_the_selection() {
	let h = Harness::multi();
	let (page, buffer) = h.shared_page("s1", None, "select 1; select 2");
	buffer.select(Range::new(0, 8));

	let outcome = h.console.invoke(page, ActionKind::RunSection, false).await.unwrap();

	assert_eq!(outcome, InvokeOutcome::Completed);
	let executed = h.sql.executed.lock().clone();
	assert_eq!(executed.len(), 1);
	assert_eq!(executed[0].sql, "select 1");
	assert!(executed[0].section);
}

#[tokio::test]
async fn stop_cancels_the_running_request() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "select pg_sleep(60)");
	h.sql.hold();

	let run = h.console.dispatch(page, ActionKind::Run, false);
	assert!(wait_until(WAIT, || h.sql.executed.lock().len() == 1).await);

	let stop = h.console.invoke(page, ActionKind::Stop, false).await.unwrap();
	assert_eq!(stop, InvokeOutcome::Completed);
	assert_eq!(run.await.unwrap().unwrap(), InvokeOutcome::Failed(RpcError::Cancelled));

	let executed_id = h.sql.executed.lock()[0].id;
	assert_eq!(h.sql.stops.lock()[0].target, Some(executed_id));
	let tracker = h.console.context().tracker();
	assert!(!tracker.is_running(page));
	assert!(!tracker.is_stopping(page));
	assert_eq!(h.notification_ids(), vec![keys::QUERY_STOPPED.id()]);
	h.sql.release();
}

#[tokio::test]
async fn stop_without_a_run_is_not_applicable() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "select 1");

	let outcome = h.console.invoke(page, ActionKind::Stop, false).await.unwrap();

	assert_eq!(outcome, InvokeOutcome::NotApplicable(ActionStatus::Disable));
	assert_eq!(h.sql.calls("stop"), 0);
}

#[tokio::test]
async fn explain_stores_the_plan() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "select 1");

	let outcome = h.console.invoke(page, ActionKind::Explain, false).await.unwrap();

	assert_eq!(outcome, InvokeOutcome::Completed);
	let Some(PageOutput::Plan(plan)) = h.console.output(page).unwrap() else {
		panic!("expected a plan");
	};
	assert_eq!(plan.lines, vec!["PLAN select 1".to_owned()]);
	assert!(!h.console.context().tracker().is_running(page));
}

#[tokio::test]
async fn compile_reports_clean_and_dirty_results() {
	let h = Harness::multi();
	let schema = PlSchema::named(PlType::Procedure, "refresh_stats", "create procedure refresh_stats ...");
	let page = h.pl_page("s1", schema, "create procedure refresh_stats ...");

	assert_eq!(h.console.invoke(page, ActionKind::PlCompile, false).await.unwrap(), InvokeOutcome::Completed);
	assert_eq!(h.notification_ids(), vec![keys::COMPILED.id()]);

	h.sql.diagnostics.lock().push(dbide_rpc::CompileDiagnostic {
		line: Some(4),
		message: "missing semicolon".into(),
	});
	assert_eq!(h.console.invoke(page, ActionKind::PlCompile, false).await.unwrap(), InvokeOutcome::Completed);
	assert_eq!(h.notification_ids(), vec![keys::compile_diagnostics(1).id()]);
	let Some(PageOutput::Diagnostics(diagnostics)) = h.console.output(page).unwrap() else {
		panic!("expected diagnostics");
	};
	assert_eq!(diagnostics.len(), 1);
}

#[tokio::test]
async fn unsaved_persisted_object_is_not_run() {
	let h = Harness::multi();
	let schema = PlSchema::named(PlType::Procedure, "refresh_stats", "create procedure refresh_stats ...");
	let page = h.pl_page("s1", schema, "create procedure refresh_stats ...");
	h.console.note_edit(page).unwrap();

	let outcome = h.console.invoke(page, ActionKind::PlRun, false).await.unwrap();

	assert_eq!(
		outcome,
		InvokeOutcome::Rejected(GateRejection::UnsavedChanges {
			name: "refresh_stats".into()
		})
	);
	assert_eq!(h.sql.calls("run_pl"), 0);
	assert!(!h.console.context().tracker().snapshot(page).scope_busy());
	assert_eq!(h.notification_ids(), vec![keys::unsaved_changes("refresh_stats").id()]);
}

#[tokio::test]
async fn anonymous_run_reparses_before_dispatch() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "begin null; end;");

	*h.sql.parse_as.lock() = ScriptKind::AnonymousBlock;
	assert_eq!(h.console.classify(page).await.unwrap(), Some(ScriptKind::AnonymousBlock));
	assert!(h.console.action_state(page, ActionKind::AnonymousRun).unwrap().visible);

	*h.sql.parse_as.lock() = ScriptKind::Sql;
	let outcome = h.console.invoke(page, ActionKind::AnonymousRun, false).await.unwrap();
	assert_eq!(outcome, InvokeOutcome::Rejected(GateRejection::NotAnonymousBlock(ScriptKind::Sql)));
	assert_eq!(h.sql.calls("run_pl"), 0);
	assert!(!h.console.action_state(page, ActionKind::AnonymousRun).unwrap().visible);

	*h.sql.parse_as.lock() = ScriptKind::AnonymousBlock;
	h.console.classify(page).await.unwrap();
	let outcome = h.console.invoke(page, ActionKind::AnonymousRun, false).await.unwrap();
	assert_eq!(outcome, InvokeOutcome::Completed);
	assert_eq!(h.sql.calls("run_pl"), 1);
}

#[tokio::test]
async fn parse_failure_is_reported() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "begin");
	h.sql.fail("parse");

	assert_eq!(h.console.classify(page).await.unwrap(), None);
	assert_eq!(h.notification_ids(), vec![keys::parse_failed(&"x").id()]);
}

#[tokio::test]
async fn console_run_is_not_offered_on_an_edited_procedure() {
	let h = Harness::multi();
	let schema = PlSchema::named(PlType::Procedure, "refresh_stats", "create procedure refresh_stats ...");
	let page = h.pl_page("s1", schema, "create procedure refresh_stats ...");
	h.console.note_edit(page).unwrap();

	for kind in [ActionKind::Run, ActionKind::RunSection] {
		let outcome = h.console.invoke(page, kind, false).await.unwrap();
		assert_eq!(outcome, InvokeOutcome::NotApplicable(ActionStatus::Disable), "{kind}");
	}
	assert_eq!(h.sql.calls("execute"), 0);
	assert!(h.console.toolbar(page, None).unwrap().state(ActionKind::Run).is_none());
}

#[tokio::test]
async fn stop_cancels_a_running_compile() {
	let h = Harness::multi();
	let schema = PlSchema::named(PlType::Procedure, "refresh_stats", "create procedure refresh_stats ...");
	let page = h.pl_page("s1", schema, "create procedure refresh_stats ...");
	h.sql.hold();

	let compile = h.console.dispatch(page, ActionKind::PlCompile, false);
	assert!(wait_until(WAIT, || h.sql.calls("compile") == 1).await);
	assert_eq!(h.console.action_state(page, ActionKind::Stop).unwrap().status, ActionStatus::Init);

	assert_eq!(h.console.invoke(page, ActionKind::Stop, false).await.unwrap(), InvokeOutcome::Completed);
	assert_eq!(compile.await.unwrap().unwrap(), InvokeOutcome::Failed(RpcError::Cancelled));

	assert!(h.sql.stops.lock()[0].target.is_some());
	assert!(!h.console.context().tracker().is_running(page));
	assert_eq!(h.console.output(page).unwrap(), None);
	assert_eq!(h.notification_ids(), vec![keys::QUERY_STOPPED.id()]);
	h.sql.release();
}

#[tokio::test]
async fn missing_capability_warns_instead_of_hiding_silently() {
	let h = Harness::multi();
	let session = SessionHandle::new(SessionId::new("s9"), DataSourceCaps::empty());
	let page = h.console.open_page(PageSpec::sql(session, TextBuffer::new("select 1"))).unwrap();
	assert!(!h.console.action_state(page, ActionKind::Explain).unwrap().visible);

	let outcome = h.console.invoke(page, ActionKind::Explain, false).await.unwrap();

	assert_eq!(
		outcome,
		InvokeOutcome::Rejected(GateRejection::CapabilityMissing {
			action: ActionKind::Explain,
			missing: DataSourceCaps::SQL_EXPLAIN,
		})
	);
	assert_eq!(h.sql.calls("explain"), 0);
	assert_eq!(h.notification_ids(), vec![keys::capability_missing("Explain").id()]);
}
