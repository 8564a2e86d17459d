use std::collections::BTreeSet;
use std::sync::Arc;

use dbide_primitives::PageKey;
use dbide_rpc::{DebugBackend, DebugStartRequest, DebugTarget, RemoteDebugId, RpcError, StackFrame, StepCommand};
use dbide_worker::{GenerationClock, TaskClass};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::broadcast;

use crate::{DebugError, DebugLaunch, DebugSession, DebugStatus};

const EVENT_CAPACITY: usize = 64;

/// Result of a stepping, retry or similar request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
	/// The request was sent and the response applied; holds the new status.
	Applied(DebugStatus),
	/// Nothing was sent because the session was in the given status.
	Ignored(DebugStatus),
	/// The request failed; the session moved to the given status.
	Failed {
		status: DebugStatus,
		error: RpcError,
	},
	/// The response belonged to a session that has since been replaced or closed.
	Stale,
	/// The page has no debug session.
	NoSession,
}

/// Editor-side effects to undo after a debug session exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugTeardown {
	pub page: PageKey,
	/// Script text to put back into the editor buffer.
	pub restore_text: String,
	/// Breakpoint lines whose markers should be cleared.
	pub breakpoint_markers: Vec<u32>,
}

/// Read-only view of a debug session for the stack panel and highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugView {
	pub status: DebugStatus,
	pub generation: u64,
	pub target: DebugTarget,
	/// Innermost frame first.
	pub call_stack: Vec<StackFrame>,
	pub breakpoints: Vec<u32>,
	pub highlighted_line: Option<u32>,
	pub output: Option<String>,
	pub end_reason: Option<String>,
}

/// Published on every debug status change; `status` is `None` once the
/// session is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugChange {
	pub page: PageKey,
	pub status: Option<DebugStatus>,
}

#[derive(Debug, Default)]
struct Inner {
	sessions: FxHashMap<PageKey, DebugSession>,
	/// Pages whose start request is in flight.
	starting: FxHashSet<PageKey>,
	/// Breakpoint lines per page; they outlive sessions and survive retry.
	breakpoints: FxHashMap<PageKey, BTreeSet<u32>>,
}

/// Owns every page's debug session and drives the remote debugger.
pub struct DebugController {
	backend: Arc<dyn DebugBackend>,
	clock: GenerationClock,
	inner: Mutex<Inner>,
	events: broadcast::Sender<DebugChange>,
}

impl std::fmt::Debug for DebugController {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DebugController").field("inner", &self.inner).finish_non_exhaustive()
	}
}

/// Releases a start reservation even if the start future is dropped.
struct StartReservation<'a> {
	inner: &'a Mutex<Inner>,
	page: PageKey,
}

impl Drop for StartReservation<'_> {
	fn drop(&mut self) {
		self.inner.lock().starting.remove(&self.page);
	}
}

impl DebugController {
	pub fn new(backend: Arc<dyn DebugBackend>) -> Self {
		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		Self {
			backend,
			clock: GenerationClock::new(),
			inner: Mutex::new(Inner::default()),
			events,
		}
	}

	/// Subscribes to status changes.
	pub fn subscribe(&self) -> broadcast::Receiver<DebugChange> {
		self.events.subscribe()
	}

	/// Starts debugging on `page` with its persisted breakpoints.
	pub async fn start(&self, page: PageKey, launch: DebugLaunch) -> Result<DebugStatus, DebugError> {
		let breakpoints = {
			let mut inner = self.inner.lock();
			if inner.sessions.contains_key(&page) || !inner.starting.insert(page) {
				return Err(DebugError::AlreadyActive(page));
			}
			inner.breakpoints.get(&page).cloned().unwrap_or_default()
		};
		let reservation = StartReservation { inner: &self.inner, page };

		tracing::debug!(%page, target = ?launch.target, "debug.start");
		let result = self.backend.start(start_request(&launch, &breakpoints)).await;

		let (remote, event) = match result {
			Ok(started) => started,
			Err(err) => {
				tracing::warn!(%page, error = %err, "debug.start.failed");
				return Err(DebugError::StartFailed(err));
			}
		};

		let status = {
			let mut inner = self.inner.lock();
			if !inner.starting.contains(&page) {
				drop(inner);
				drop(reservation);
				tracing::debug!(%page, %remote, "debug.start.page_closed");
				self.teardown_detached(remote);
				return Err(DebugError::NoSession(page));
			}
			let mut session = DebugSession::new(page, self.clock.token(), remote, launch, breakpoints);
			session.apply_event(event);
			let status = session.status();
			inner.sessions.insert(page, session);
			status
		};
		drop(reservation);
		self.publish(page, Some(status));
		Ok(status)
	}

	/// Steps into the next call.
	pub async fn execute_step_in(&self, page: PageKey) -> StepOutcome {
		self.execute_step(page, StepCommand::StepIn).await
	}

	/// Steps over the next call.
	pub async fn execute_step_over(&self, page: PageKey) -> StepOutcome {
		self.execute_step(page, StepCommand::StepOver).await
	}

	/// Runs until the current frame returns.
	pub async fn execute_step_out(&self, page: PageKey) -> StepOutcome {
		self.execute_step(page, StepCommand::StepOut).await
	}

	/// Runs to the next breakpoint or completion.
	pub async fn execute_resume(&self, page: PageKey) -> StepOutcome {
		self.execute_step(page, StepCommand::Resume).await
	}

	/// Sends one stepping command if the session is `INIT`.
	///
	/// A second command issued while one is in flight is ignored without
	/// reaching the backend.
	pub async fn execute_step(&self, page: PageKey, command: StepCommand) -> StepOutcome {
		let (ticket, token) = {
			let mut inner = self.inner.lock();
			let Some(session) = inner.sessions.get_mut(&page) else {
				return StepOutcome::NoSession;
			};
			match session.begin_step(command) {
				Some(ticket) => (ticket, session.token().clone()),
				None => return StepOutcome::Ignored(session.status()),
			}
		};
		self.publish(page, Some(DebugStatus::for_command(command)));

		let result = tokio::select! {
			res = self.backend.step(&ticket.remote, command) => Some(res),
			() = token.cancelled() => None,
		};
		let Some(result) = result else {
			tracing::debug!(%page, generation = ticket.generation, "debug.step.cancelled");
			return StepOutcome::Stale;
		};

		let (outcome, deferred, remote) = {
			let mut inner = self.inner.lock();
			let Some(session) = inner.sessions.get_mut(&page).filter(|s| s.generation() == ticket.generation) else {
				tracing::debug!(%page, generation = ticket.generation, "debug.step.stale");
				return StepOutcome::Stale;
			};
			let outcome = match result {
				Ok(event) => {
					session.apply_event(event);
					StepOutcome::Applied(session.status())
				}
				Err(error) => {
					tracing::warn!(%page, ?command, %error, "debug.step.failed");
					session.fail_step(&error);
					StepOutcome::Failed {
						status: session.status(),
						error,
					}
				}
			};
			(outcome, session.take_deferred_breakpoints(), session.remote().clone())
		};
		let status = match &outcome {
			StepOutcome::Applied(status) | StepOutcome::Failed { status, .. } => Some(*status),
			_ => None,
		};
		self.publish(page, status);

		for (line, enabled) in deferred {
			if let Err(error) = self.forward_breakpoint(&remote, line, enabled).await {
				tracing::warn!(%page, line, enabled, %error, "debug.breakpoint.forward_failed");
			}
		}
		outcome
	}

	/// Restarts an ended session with the same launch and persisted breakpoints.
	///
	/// Only acts when the session has ended. The old session state is discarded;
	/// breakpoint lines are kept.
	pub async fn retry(&self, page: PageKey) -> Result<StepOutcome, DebugError> {
		let (launch, breakpoints) = {
			let mut inner = self.inner.lock();
			let breakpoints = inner.breakpoints.get(&page).cloned().unwrap_or_default();
			let Some(session) = inner.sessions.get_mut(&page) else {
				return Ok(StepOutcome::NoSession);
			};
			if !session.begin_recover() {
				return Ok(StepOutcome::Ignored(session.status()));
			}
			(session.launch().clone(), breakpoints)
		};
		self.publish(page, Some(DebugStatus::Recover));

		tracing::debug!(%page, "debug.retry");
		match self.backend.start(start_request(&launch, &breakpoints)).await {
			Ok((remote, event)) => {
				let status = {
					let mut inner = self.inner.lock();
					if !inner.sessions.get(&page).is_some_and(|s| s.status() == DebugStatus::Recover) {
						drop(inner);
						self.teardown_detached(remote);
						return Ok(StepOutcome::Stale);
					}
					let mut fresh = DebugSession::new(page, self.clock.token(), remote, launch, breakpoints);
					fresh.apply_event(event);
					let status = fresh.status();
					inner.sessions.insert(page, fresh);
					status
				};
				self.publish(page, Some(status));
				Ok(StepOutcome::Applied(status))
			}
			Err(err) => {
				tracing::warn!(%page, error = %err, "debug.retry.failed");
				let status = {
					let mut inner = self.inner.lock();
					inner.sessions.get_mut(&page).map(|s| {
						s.abort_recover(err.to_string());
						s.status()
					})
				};
				self.publish(page, status);
				Err(DebugError::StartFailed(err))
			}
		}
	}

	/// Exits an ended session and returns the editor effects to undo.
	///
	/// Returns `Ok(None)` without effect unless the session has ended. A failing
	/// remote teardown is logged; local teardown proceeds regardless.
	pub async fn execute_exit(&self, page: PageKey) -> Result<Option<DebugTeardown>, DebugError> {
		let remote = {
			let mut inner = self.inner.lock();
			let Some(session) = inner.sessions.get_mut(&page) else {
				return Err(DebugError::NoSession(page));
			};
			if !session.begin_exit() {
				return Ok(None);
			}
			session.remote().clone()
		};
		self.publish(page, Some(DebugStatus::Exiting));

		if let Err(error) = self.backend.exit(&remote).await {
			tracing::warn!(%page, %remote, %error, "debug.exit.failed");
		}

		let Some(session) = self.inner.lock().sessions.remove(&page) else {
			return Ok(None);
		};
		self.publish(page, None);
		Ok(Some(DebugTeardown {
			page,
			restore_text: session.pre_debug_text().to_owned(),
			breakpoint_markers: session.breakpoints().iter().copied().collect(),
		}))
	}

	/// Toggles a breakpoint line and returns whether it is now set.
	///
	/// The line is persisted for the page. A paused session gets the change
	/// forwarded at once; during a step it is held back and sent when the
	/// session pauses again. A forwarding failure is returned but the local
	/// state is kept.
	pub async fn toggle_breakpoint(&self, page: PageKey, line: u32) -> Result<bool, RpcError> {
		let (enabled, remote) = {
			let mut guard = self.inner.lock();
			let inner = &mut *guard;
			let lines = inner.breakpoints.entry(page).or_default();
			let enabled = if lines.remove(&line) {
				false
			} else {
				lines.insert(line);
				true
			};
			let remote = inner.sessions.get_mut(&page).and_then(|session| {
				session.set_breakpoint(line, enabled);
				if session.accepts_breakpoints() {
					Some(session.remote().clone())
				} else {
					if session.status().in_flight().is_some() {
						tracing::debug!(%page, line, enabled, "debug.breakpoint.deferred");
						session.defer_breakpoint(line, enabled);
					}
					None
				}
			});
			(enabled, remote)
		};

		if let Some(remote) = remote
			&& let Err(error) = self.forward_breakpoint(&remote, line, enabled).await
		{
			tracing::warn!(%page, line, enabled, %error, "debug.breakpoint.forward_failed");
			return Err(error);
		}
		Ok(enabled)
	}

	async fn forward_breakpoint(&self, remote: &RemoteDebugId, line: u32, enabled: bool) -> Result<(), RpcError> {
		if enabled {
			self.backend.set_breakpoint(remote, line).await
		} else {
			self.backend.remove_breakpoint(remote, line).await
		}
	}

	/// Selects a call stack frame; returns the line to highlight.
	pub fn select_frame(&self, page: PageKey, index: usize) -> Option<u32> {
		self.inner.lock().sessions.get_mut(&page)?.select_frame(index)
	}

	/// Drops all debug state of a closed page.
	///
	/// A still-live remote session is torn down in the background.
	pub fn purge(&self, page: PageKey) -> bool {
		let (session, had_state) = {
			let mut inner = self.inner.lock();
			let starting = inner.starting.remove(&page);
			let breakpoints = inner.breakpoints.remove(&page).is_some();
			let session = inner.sessions.remove(&page);
			let had_state = starting || breakpoints || session.is_some();
			(session, had_state)
		};
		if let Some(session) = session {
			session.token().cancel();
			if !session.is_debug_end() {
				self.teardown_detached(session.remote().clone());
			}
			self.publish(page, None);
		}
		had_state
	}

	pub fn status(&self, page: PageKey) -> Option<DebugStatus> {
		self.inner.lock().sessions.get(&page).map(DebugSession::status)
	}

	pub fn has_session(&self, page: PageKey) -> bool {
		self.inner.lock().sessions.contains_key(&page)
	}

	/// True when the page's session has ended (finished or terminated).
	pub fn is_debug_end(&self, page: PageKey) -> bool {
		self.inner.lock().sessions.get(&page).is_some_and(DebugSession::is_debug_end)
	}

	/// Persisted breakpoint lines of a page, ascending.
	pub fn breakpoints(&self, page: PageKey) -> Vec<u32> {
		self.inner
			.lock()
			.breakpoints
			.get(&page)
			.map(|lines| lines.iter().copied().collect())
			.unwrap_or_default()
	}

	pub fn view(&self, page: PageKey) -> Option<DebugView> {
		let inner = self.inner.lock();
		let session = inner.sessions.get(&page)?;
		Some(DebugView {
			status: session.status(),
			generation: session.generation(),
			target: session.target().clone(),
			call_stack: session.call_stack().to_vec(),
			breakpoints: session.breakpoints().iter().copied().collect(),
			highlighted_line: session.highlighted_line(),
			output: session.output().map(str::to_owned),
			end_reason: session.end_reason().map(str::to_owned),
		})
	}

	fn teardown_detached(&self, remote: RemoteDebugId) {
		let backend = Arc::clone(&self.backend);
		dbide_worker::spawn(TaskClass::Background, async move {
			if let Err(error) = backend.exit(&remote).await {
				tracing::debug!(%remote, %error, "debug.detached_exit.failed");
			}
		});
	}

	fn publish(&self, page: PageKey, status: Option<DebugStatus>) {
		let _ = self.events.send(DebugChange { page, status });
	}
}

fn start_request(launch: &DebugLaunch, breakpoints: &BTreeSet<u32>) -> DebugStartRequest {
	DebugStartRequest {
		session: launch.session.clone(),
		target: launch.target.clone(),
		script: launch.script.clone(),
		breakpoints: breakpoints.iter().copied().collect(),
	}
}
