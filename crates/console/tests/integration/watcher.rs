use dbide_console::{ButtonChange, PageChange, ToolbarWatcher};
use dbide_primitives::{ActionStatus, PageKey, PlSchema, PlType};
use dbide_registry::ActionKind;
use pretty_assertions::assert_eq;

use crate::common::Harness;

fn touches(changes: &[ButtonChange], page: PageKey) -> bool {
	changes.iter().any(|c| c.page == page)
}

fn status_of(changes: &[ButtonChange], page: PageKey, action: ActionKind) -> Option<ActionStatus> {
	changes.iter().find(|c| c.page == page && c.action == action).map(|c| c.state.status)
}

#[tokio::test]
async fn first_refresh_reports_every_action() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "select 1");
	let mut watcher = ToolbarWatcher::new();

	let changes = watcher.refresh(&h.console, [page]);

	assert_eq!(changes.len(), 18);
	assert!(watcher.refresh(&h.console, [page]).is_empty());
	assert_eq!(watcher.state(page, ActionKind::Run).unwrap().status, ActionStatus::Init);
}

#[tokio::test]
async fn multi_session_tracker_change_refreshes_one_page() {
	let h = Harness::multi();
	let first = h.sql_page("s1", "select 1");
	let second = h.sql_page("s2", "select 2");
	let mut watcher = ToolbarWatcher::new();
	watcher.refresh(&h.console, h.console.pages());
	let mut events = h.console.context().tracker().subscribe();
	h.sql.hold();

	let run = h.console.dispatch(first, ActionKind::Run, false);
	let event = events.recv().await.unwrap();
	let changes = watcher.on_tracker_event(&h.console, &event);

	assert_eq!(event.page, first);
	assert_eq!(status_of(&changes, first, ActionKind::Run), Some(ActionStatus::Running));
	assert_eq!(status_of(&changes, first, ActionKind::RunSection), Some(ActionStatus::Disable));
	assert!(!touches(&changes, second));

	h.sql.release();
	run.await.unwrap().unwrap();
}

#[tokio::test]
async fn shared_session_tracker_change_refreshes_every_page() {
	let h = Harness::shared();
	let first = h.sql_page("s1", "select 1");
	let second = h.sql_page("s2", "select 2");
	let mut watcher = ToolbarWatcher::new();
	watcher.refresh(&h.console, h.console.pages());
	let mut events = h.console.context().tracker().subscribe();
	h.sql.hold();

	let run = h.console.dispatch(first, ActionKind::Run, false);
	let event = events.recv().await.unwrap();
	let changes = watcher.on_tracker_event(&h.console, &event);

	assert_eq!(status_of(&changes, first, ActionKind::Run), Some(ActionStatus::Running));
	assert_eq!(status_of(&changes, second, ActionKind::Explain), Some(ActionStatus::Disable));

	h.sql.release();
	run.await.unwrap().unwrap();
}

#[tokio::test]
async fn debug_change_reveals_step_controls() {
	let h = Harness::multi();
	let page = h.pl_page("s1", PlSchema::named(PlType::Procedure, "p", "create procedure p ..."), "");
	let mut watcher = ToolbarWatcher::new();
	watcher.refresh(&h.console, [page]);
	assert!(!watcher.state(page, ActionKind::PlDebugStepIn).unwrap().visible);
	let mut debug_events = h.console.context().debug().subscribe();

	h.console.invoke(page, ActionKind::PlDebug, false).await.unwrap();
	let change = debug_events.recv().await.unwrap();
	let changes = watcher.on_debug_change(&h.console, &change);

	assert!(changes.iter().any(|c| c.action == ActionKind::PlDebugStepIn && c.state.visible));
	assert_eq!(status_of(&changes, page, ActionKind::PlDebug), Some(ActionStatus::Disable));
}

#[tokio::test]
async fn closed_pages_are_forgotten() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "select 1");
	let mut watcher = ToolbarWatcher::new();
	let mut page_events = h.console.context().subscribe();
	watcher.refresh(&h.console, [page]);

	h.console.close_page(page).unwrap();
	let change = page_events.recv().await.unwrap();

	assert_eq!(change, PageChange::Closed(page));
	assert!(watcher.on_page_change(&h.console, &change).is_empty());
	assert!(watcher.state(page, ActionKind::Run).is_none());
}

#[tokio::test]
async fn session_change_refreshes_pages_on_that_session() {
	let h = Harness::multi();
	let page = h.sql_page("s1", "update t set x = 1");
	let other = h.sql_page("s2", "select 1");
	let mut watcher = ToolbarWatcher::new();
	watcher.refresh(&h.console, h.console.pages());

	h.console.invoke(page, ActionKind::Run, false).await.unwrap();
	let session = h.console.session_of(page).unwrap();
	let changes = watcher.on_page_change(&h.console, &PageChange::Session(session));

	assert_eq!(status_of(&changes, page, ActionKind::Commit), Some(ActionStatus::Init));
	assert!(!touches(&changes, other));
}
