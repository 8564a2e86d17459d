//! Shared orchestration state.

use std::sync::Arc;

use dbide_debug::{DebugController, DebugStatus};
use dbide_primitives::{PageKey, PageKeyGen, PlSchema, ScriptKind, SessionHandle};
use dbide_registry::{ActionContext, ActionKind, Notification};
use dbide_rpc::{DebugBackend, RequestIdGen, SqlBackend};
use dbide_tracker::{ExecutionStateTracker, TrackerSnapshot};
use dbide_worker::GenerationClock;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::broadcast;

use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use crate::notifications::NotificationCenter;
use crate::pages::{PageChange, PageState};
use crate::sessions::SessionRegistry;

const CHANGE_CAPACITY: usize = 256;

/// Process-wide orchestration state shared by every page.
///
/// Built once from configuration; the execution mode chosen here fixes the
/// tracker's scope strategy and the session binding policy for the process
/// lifetime.
pub struct OrchestrationContext {
	pub(crate) config: ConsoleConfig,
	pub(crate) tracker: Arc<ExecutionStateTracker>,
	pub(crate) debug: DebugController,
	pub(crate) sessions: SessionRegistry,
	pub(crate) pages: Mutex<FxHashMap<PageKey, PageState>>,
	pub(crate) notifications: Mutex<NotificationCenter>,
	pub(crate) backend: Arc<dyn SqlBackend>,
	pub(crate) request_ids: RequestIdGen,
	pub(crate) page_keys: PageKeyGen,
	/// Cancellation tokens for in-flight executions.
	pub(crate) executions: GenerationClock,
	changes: broadcast::Sender<PageChange>,
}

impl std::fmt::Debug for OrchestrationContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OrchestrationContext")
			.field("mode", &self.config.execution_mode)
			.field("tracker", &self.tracker)
			.field("debug", &self.debug)
			.finish_non_exhaustive()
	}
}

impl OrchestrationContext {
	pub fn new(config: ConsoleConfig, backend: Arc<dyn SqlBackend>, debugger: Arc<dyn DebugBackend>) -> Self {
		let mode = config.execution_mode;
		tracing::info!(mode = mode.as_str(), "console.init");
		let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
		Self {
			tracker: Arc::new(ExecutionStateTracker::new(mode)),
			debug: DebugController::new(debugger),
			sessions: SessionRegistry::new(mode),
			pages: Mutex::new(FxHashMap::default()),
			notifications: Mutex::new(NotificationCenter::default()),
			backend,
			request_ids: RequestIdGen::new(),
			page_keys: PageKeyGen::new(),
			executions: GenerationClock::new(),
			changes,
			config,
		}
	}

	pub fn config(&self) -> &ConsoleConfig {
		&self.config
	}

	pub fn tracker(&self) -> &Arc<ExecutionStateTracker> {
		&self.tracker
	}

	pub fn debug(&self) -> &DebugController {
		&self.debug
	}

	pub fn sessions(&self) -> &SessionRegistry {
		&self.sessions
	}

	/// Subscribes to page-local changes; tracker and debug changes have their
	/// own channels.
	pub fn subscribe(&self) -> broadcast::Receiver<PageChange> {
		self.changes.subscribe()
	}

	pub(crate) fn publish(&self, change: PageChange) {
		let _ = self.changes.send(change);
	}

	pub(crate) fn notify(&self, notification: impl Into<Notification>) {
		self.notifications.lock().push(notification.into());
	}

	/// Gathers the owned inputs of an [`ActionContext`] for `page`.
	pub(crate) fn action_inputs(&self, page: PageKey) -> Result<ActionInputs, ConsoleError> {
		let (session_id, schema, script_kind, dirty, in_flight) = {
			let pages = self.pages.lock();
			let state = pages.get(&page).ok_or(ConsoleError::UnknownPage(page))?;
			(
				state.session.clone(),
				state.schema.clone(),
				state.script_kind,
				state.dirty,
				state.in_flight,
			)
		};
		let session = self.sessions.get(&session_id).ok_or(ConsoleError::UnknownPage(page))?;
		Ok(ActionInputs {
			page,
			tracker: self.tracker.snapshot(page),
			session,
			schema,
			debug: self.debug.status(page),
			script_kind,
			dirty,
			in_flight,
		})
	}
}

/// Owned snapshot of everything an action's resolvers read.
#[derive(Debug, Clone)]
pub(crate) struct ActionInputs {
	pub page: PageKey,
	pub tracker: TrackerSnapshot,
	pub session: SessionHandle,
	pub schema: Option<PlSchema>,
	pub debug: Option<DebugStatus>,
	pub script_kind: Option<ScriptKind>,
	pub dirty: bool,
	pub in_flight: Option<ActionKind>,
}

impl ActionInputs {
	pub fn context(&self) -> ActionContext<'_> {
		ActionContext {
			page: self.page,
			tracker: self.tracker,
			session: &self.session,
			schema: self.schema.as_ref(),
			debug: self.debug,
			script_kind: self.script_kind,
			dirty: self.dirty,
			in_flight: self.in_flight,
		}
	}
}
