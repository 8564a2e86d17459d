use dbide_console::InvokeOutcome;
use dbide_primitives::{ActionStatus, TransactionState};
use dbide_registry::notifications::keys;
use dbide_registry::{ActionKind, Confirmation};
use pretty_assertions::assert_eq;

use crate::common::{Harness, WAIT, wait_until};

fn status(h: &Harness, page: dbide_primitives::PageKey, kind: ActionKind) -> ActionStatus {
	h.console.action_state(page, kind).unwrap().status
}

#[tokio::test]
async fn idle_transaction_cannot_be_committed() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "select 1");

	assert_eq!(status(&h, page, ActionKind::Commit), ActionStatus::Disable);
	assert_eq!(status(&h, page, ActionKind::Rollback), ActionStatus::Disable);
	assert_eq!(
		h.console.invoke(page, ActionKind::Commit, false).await.unwrap(),
		InvokeOutcome::NotApplicable(ActionStatus::Disable)
	);
	assert_eq!(h.sql.calls("commit"), 0);
}

#[tokio::test]
async fn commit_ends_the_transaction() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "update t set x = 1");
	h.console.invoke(page, ActionKind::Run, false).await.unwrap();

	assert_eq!(h.console.invoke(page, ActionKind::Commit, false).await.unwrap(), InvokeOutcome::Completed);

	let session = h.console.session_of(page).unwrap();
	let handle = h.console.context().sessions().get(&session).unwrap();
	assert_eq!(handle.transaction_state, TransactionState::Idle);
	assert_eq!(status(&h, page, ActionKind::Commit), ActionStatus::Disable);
	assert!(!h.console.context().tracker().is_committing(page));
	assert_eq!(h.notification_ids(), vec![keys::COMMITTED.id()]);
}

#[tokio::test]
async fn rollback_ends_the_transaction() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "delete from t");
	h.console.invoke(page, ActionKind::Run, false).await.unwrap();

	assert_eq!(h.console.invoke(page, ActionKind::Rollback, false).await.unwrap(), InvokeOutcome::Completed);
	assert_eq!(h.sql.calls("rollback"), 1);
	assert_eq!(h.notification_ids(), vec![keys::ROLLED_BACK.id()]);
}

#[tokio::test]
async fn auto_commit_hides_transaction_control() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "select 1");
	h.console.invoke(page, ActionKind::Run, false).await.unwrap();
	h.console.set_auto_commit(page, true).unwrap();

	let commit = h.console.action_state(page, ActionKind::Commit).unwrap();
	assert!(!commit.visible);
	assert!(!h.console.action_state(page, ActionKind::Rollback).unwrap().visible);
	assert!(matches!(
		h.console.invoke(page, ActionKind::Commit, false).await.unwrap(),
		InvokeOutcome::NotApplicable(_)
	));
}

#[tokio::test]
async fn failed_commit_clears_committing_and_can_be_retried() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "update t set x = 1");
	h.console.invoke(page, ActionKind::Run, false).await.unwrap();
	h.sql.fail("commit");

	let outcome = h.console.invoke(page, ActionKind::Commit, false).await.unwrap();

	assert!(matches!(outcome, InvokeOutcome::Failed(_)));
	assert!(!h.console.context().tracker().is_committing(page));
	assert_eq!(status(&h, page, ActionKind::Commit), ActionStatus::Init);
	assert_eq!(h.notification_ids(), vec![keys::commit_failed(&"x").id()]);
	h.console.invoke(page, ActionKind::Commit, false).await.unwrap();
	assert_eq!(h.sql.calls("commit"), 2);
}

#[tokio::test]
async fn shared_session_commit_asks_for_confirmation() {
	let h = Harness::shared();
	let first = h.sql_page("s1", "update t set x = 1");
	let second = h.sql_page("s2", "select 1");
	h.console.invoke(first, ActionKind::Run, false).await.unwrap();

	assert_eq!(
		h.console.invoke(second, ActionKind::Commit, false).await.unwrap(),
		InvokeOutcome::NeedsConfirmation(Confirmation::SharedSessionCommit)
	);
	assert_eq!(h.sql.calls("commit"), 0);
	assert_eq!(h.console.invoke(second, ActionKind::Commit, true).await.unwrap(), InvokeOutcome::Completed);
	assert_eq!(h.sql.calls("commit"), 1);
}

#[tokio::test]
async fn multi_session_commit_needs_no_confirmation() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "update t set x = 1");
	h.console.invoke(page, ActionKind::Run, false).await.unwrap();

	assert_eq!(h.console.action_state(page, ActionKind::Commit).unwrap().confirm, None);
	assert_eq!(h.console.invoke(page, ActionKind::Commit, false).await.unwrap(), InvokeOutcome::Completed);
}

#[tokio::test]
async fn shared_commit_disables_every_other_run() {
	let h = Harness::shared();
	let first = h.sql_page("s1", "update t set x = 1");
	let second = h.sql_page("s2", "select 1");
	h.console.invoke(first, ActionKind::Run, false).await.unwrap();
	h.sql.hold();

	let commit = h.console.dispatch(first, ActionKind::Commit, true);
	assert!(wait_until(WAIT, || h.console.context().tracker().is_committing(first)).await);

	assert_eq!(status(&h, second, ActionKind::Run), ActionStatus::Disable);
	assert_eq!(status(&h, second, ActionKind::Rollback), ActionStatus::Disable);
	assert_eq!(status(&h, second, ActionKind::Commit), ActionStatus::Running);
	assert_eq!(
		h.console.invoke(second, ActionKind::Run, false).await.unwrap(),
		InvokeOutcome::NotApplicable(ActionStatus::Disable)
	);

	h.sql.release();
	assert_eq!(commit.await.unwrap().unwrap(), InvokeOutcome::Completed);
	assert_eq!(status(&h, second, ActionKind::Run), ActionStatus::Init);
}

#[tokio::test]
async fn shared_run_disables_transaction_control_everywhere() {
	let h = Harness::shared();
	let first = h.sql_page("s1", "update t set x = 1");
	let second = h.sql_page("s2", "select 1");
	h.console.invoke(first, ActionKind::Run, false).await.unwrap();
	h.sql.hold();

	let run = h.console.dispatch(first, ActionKind::Run, false);
	assert!(wait_until(WAIT, || h.console.context().tracker().is_running(first)).await);

	for kind in [ActionKind::Commit, ActionKind::Rollback, ActionKind::Stop] {
		assert_eq!(status(&h, second, kind), ActionStatus::Disable, "{kind}");
	}
	assert_eq!(status(&h, first, ActionKind::Stop), ActionStatus::Init);

	h.sql.release();
	run.await.unwrap().unwrap();
}

#[tokio::test]
async fn multi_session_run_leaves_other_pages_alone() {
	let h = Harness::multi();
	let first = h.sql_page("s1", "select 1");
	let second = h.sql_page("s2", "update t set x = 1");
	h.console.invoke(second, ActionKind::Run, false).await.unwrap();
	h.sql.hold();

	let run = h.console.dispatch(first, ActionKind::Run, false);
	assert!(wait_until(WAIT, || h.console.context().tracker().is_running(first)).await);

	assert_eq!(status(&h, second, ActionKind::Commit), ActionStatus::Init);
	assert_eq!(h.console.invoke(second, ActionKind::Rollback, false).await.unwrap(), InvokeOutcome::Completed);

	h.sql.release();
	run.await.unwrap().unwrap();
}
