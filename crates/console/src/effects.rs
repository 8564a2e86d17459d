//! Action effects.
//!
//! Every effect that marks the tracker holds an [`Execution`] guard across its
//! backend call, so the flag and the page's in-flight action are cleared on
//! success, failure, and when the effect future is dropped.

use std::sync::Arc;

use dbide_debug::{DebugError, DebugLaunch, StepOutcome};
use dbide_primitives::{ActionStatus, EditingContext, PageKey, PlSchema, ScriptKind};
use dbide_registry::notifications::keys;
use dbide_registry::{ActionKind, Confirmation, GateInput, GateRejection, Notification, check_capabilities, needs_parse, offers};
use dbide_rpc::{
	CompileRequest, ExecuteRequest, ExecuteResponse, ExplainRequest, ParseRequest, PlRunRequest, RpcError, StepCommand, StopRequest,
};
use dbide_tracker::{TrackerFlag, TrackerGuard};
use dbide_worker::TaskClass;
use tokio::task::JoinHandle;

use crate::console::Console;
use crate::context::OrchestrationContext;
use crate::error::ConsoleError;
use crate::pages::{ActiveRequest, PageChange, PageOutput};

/// What became of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
	/// The effect ran and its response was applied.
	Completed,
	/// Invoke again with `confirmed` once the user accepts the prompt.
	NeedsConfirmation(Confirmation),
	/// The action is hidden or not invocable in its current status.
	NotApplicable(ActionStatus),
	/// A dispatch precondition failed; nothing was sent.
	Rejected(GateRejection),
	/// The backend request failed; a notification was queued.
	Failed(RpcError),
	/// The response belonged to a debug session that has since been replaced.
	Discarded,
}

/// Clears the page's in-flight action when dropped.
struct InFlightMark {
	ctx: Arc<OrchestrationContext>,
	page: PageKey,
	kind: ActionKind,
}

impl Drop for InFlightMark {
	fn drop(&mut self) {
		let cleared = {
			let mut pages = self.ctx.pages.lock();
			match pages.get_mut(&self.page) {
				Some(state) if state.in_flight == Some(self.kind) => {
					state.in_flight = None;
					state.active_request = None;
					true
				}
				_ => false,
			}
		};
		if cleared {
			self.ctx.publish(PageChange::Updated(self.page));
		}
	}
}

/// Guards held for the duration of one effect.
///
/// Fields drop in declaration order: the tracker flag is cleared before the
/// in-flight action, so no observer sees a running page without its owner.
struct Execution {
	_tracker: Option<TrackerGuard>,
	_in_flight: Option<InFlightMark>,
}

impl Console {
	/// Resolves, gates and runs one action on `page`.
	///
	/// Only actions on the toolbar of the page's current editing context run.
	/// `confirmed` acknowledges the action's confirmation prompt; without it an
	/// action that needs one returns [`InvokeOutcome::NeedsConfirmation`].
	pub async fn invoke(&self, page: PageKey, kind: ActionKind, confirmed: bool) -> Result<InvokeOutcome, ConsoleError> {
		let inputs = self.ctx.action_inputs(page)?;
		let context = EditingContext::derive(inputs.schema.as_ref(), inputs.debug.is_some());
		if !offers(context, kind) {
			tracing::debug!(%page, action = kind.name(), context = <&str>::from(context), "action.out_of_context");
			return Ok(InvokeOutcome::NotApplicable(ActionStatus::Disable));
		}
		if let Err(rejection) = check_capabilities(kind, inputs.session.caps) {
			tracing::debug!(%page, action = kind.name(), %rejection, "action.rejected");
			self.ctx.notify(Notification::from(&rejection));
			return Ok(InvokeOutcome::Rejected(rejection));
		}

		let state = kind.descriptor().resolve(&inputs.context());
		if !state.is_invocable() {
			tracing::debug!(%page, action = kind.name(), status = ?state.status, visible = state.visible, "action.not_applicable");
			return Ok(InvokeOutcome::NotApplicable(state.status));
		}
		if let Some(confirmation) = state.confirm.filter(|c| self.requires_confirmation(*c))
			&& !confirmed
		{
			return Ok(InvokeOutcome::NeedsConfirmation(confirmation));
		}

		tracing::debug!(%page, action = kind.name(), "action.dispatch");
		match kind {
			ActionKind::Run => self.execute_script(page, kind, false).await,
			ActionKind::RunSection => self.execute_script(page, kind, true).await,
			ActionKind::Explain => self.explain(page).await,
			ActionKind::Commit => self.end_transaction(page, TrackerFlag::Committing).await,
			ActionKind::Rollback => self.end_transaction(page, TrackerFlag::RollingBack).await,
			ActionKind::Stop => self.stop(page).await,
			ActionKind::PlCompile | ActionKind::TriggerCompile => self.compile(page, kind).await,
			ActionKind::PlRun | ActionKind::AnonymousRun => self.run_pl(page, kind).await,
			ActionKind::PlDebug | ActionKind::AnonymousDebug => self.start_debug(page, kind).await,
			ActionKind::PlDebugStepIn => self.step(page, StepCommand::StepIn).await,
			ActionKind::PlDebugStepOver => self.step(page, StepCommand::StepOver).await,
			ActionKind::PlDebugStepOut => self.step(page, StepCommand::StepOut).await,
			ActionKind::PlDebugResume => self.step(page, StepCommand::Resume).await,
			ActionKind::PlDebugRetry => self.retry_debug(page).await,
			ActionKind::PlDebugExit => self.exit_debug(page).await,
		}
	}

	/// Runs [`invoke`](Self::invoke) as a detached interactive task.
	pub fn dispatch(&self, page: PageKey, kind: ActionKind, confirmed: bool) -> JoinHandle<Result<InvokeOutcome, ConsoleError>> {
		let console = self.clone();
		dbide_worker::spawn(TaskClass::Interactive, async move { console.invoke(page, kind, confirmed).await })
	}

	fn requires_confirmation(&self, confirmation: Confirmation) -> bool {
		match confirmation {
			Confirmation::DebugRetry => self.ctx.config.debug.confirm_retry,
			Confirmation::SharedSessionCommit | Confirmation::SharedSessionRollback => true,
		}
	}

	/// Runs the dispatch gate, parsing first when the action needs a fresh
	/// classification. Returns the outcome to stop with, if any.
	async fn check_gate(&self, page: PageKey, kind: ActionKind) -> Result<Option<InvokeOutcome>, ConsoleError> {
		let classification = if needs_parse(kind) {
			match self.parse(page).await? {
				Ok(parsed) => Some(parsed),
				Err(error) => {
					tracing::warn!(%page, %error, "parse.failed");
					self.ctx.notify(keys::parse_failed(&error));
					return Ok(Some(InvokeOutcome::Failed(error)));
				}
			}
		} else {
			None
		};

		let inputs = self.ctx.action_inputs(page)?;
		let selection_empty = self.with_page(page, |state| state.buffer.get_selection().is_empty())?;
		let gate = GateInput {
			action: kind,
			schema: inputs.schema.as_ref(),
			dirty: inputs.dirty,
			classification,
			selection_empty,
			caps: inputs.session.caps,
		};
		match gate.check() {
			Ok(()) => Ok(None),
			Err(rejection) => {
				tracing::debug!(%page, action = kind.name(), %rejection, "action.rejected");
				self.ctx.notify(Notification::from(&rejection));
				Ok(Some(InvokeOutcome::Rejected(rejection)))
			}
		}
	}

	pub(crate) async fn parse(&self, page: PageKey) -> Result<Result<ScriptKind, RpcError>, ConsoleError> {
		let request = self.with_page(page, |state| ParseRequest {
			session: state.session.clone(),
			sql: state.buffer.get_value(),
		})?;
		let result = self.ctx.backend.parse(request).await;
		if let Ok(kind) = result {
			self.update_page(page, |state| state.script_kind.replace(kind) != Some(kind))?;
		}
		Ok(result)
	}

	/// Marks the page's in-flight action and tracker flag.
	fn begin(&self, page: PageKey, kind: Option<ActionKind>, flag: Option<TrackerFlag>) -> Result<Result<Execution, InvokeOutcome>, ConsoleError> {
		let in_flight = match kind {
			Some(kind) => {
				{
					let mut pages = self.ctx.pages.lock();
					let state = pages.get_mut(&page).ok_or(ConsoleError::UnknownPage(page))?;
					if let Some(other) = state.in_flight {
						tracing::debug!(%page, action = kind.name(), in_flight = other.name(), "action.busy");
						return Ok(Err(InvokeOutcome::NotApplicable(ActionStatus::Disable)));
					}
					state.in_flight = Some(kind);
				}
				self.ctx.publish(PageChange::Updated(page));
				Some(InFlightMark {
					ctx: Arc::clone(&self.ctx),
					page,
					kind,
				})
			}
			None => None,
		};

		let tracker = match flag {
			Some(flag) => match self.ctx.tracker.enter(page, flag) {
				Ok(guard) => Some(guard),
				Err(err) => {
					tracing::debug!(%page, error = %err, "action.conflict");
					return Ok(Err(InvokeOutcome::NotApplicable(ActionStatus::Disable)));
				}
			},
			None => None,
		};

		Ok(Ok(Execution {
			_tracker: tracker,
			_in_flight: in_flight,
		}))
	}

	/// Allocates a request id and registers it as the page's stoppable request.
	fn register_request(&self, page: PageKey) -> Result<ActiveRequest, ConsoleError> {
		let active = ActiveRequest {
			id: self.ctx.request_ids.next_id(),
			cancel: self.ctx.executions.token(),
		};
		let mut pages = self.ctx.pages.lock();
		let state = pages.get_mut(&page).ok_or(ConsoleError::UnknownPage(page))?;
		state.active_request = Some(active.clone());
		Ok(active)
	}

	fn store_output(&self, page: PageKey, output: PageOutput) {
		if let Some(state) = self.ctx.pages.lock().get_mut(&page) {
			state.output = Some(output);
		} else {
			tracing::trace!(%page, "output.page_closed");
		}
	}

	/// Applies an execute or PL run response.
	fn finish_execution(&self, page: PageKey, result: Result<ExecuteResponse, RpcError>) -> Result<InvokeOutcome, ConsoleError> {
		match result {
			Ok(response) => {
				let session = self.session_of(page)?;
				if self.ctx.sessions.set_transaction_state(&session, response.transaction_state) {
					self.ctx.publish(PageChange::Session(session));
				}
				self.store_output(page, PageOutput::Statements(response.statements));
				Ok(InvokeOutcome::Completed)
			}
			Err(RpcError::Cancelled) => {
				tracing::debug!(%page, "execute.cancelled");
				Ok(InvokeOutcome::Failed(RpcError::Cancelled))
			}
			Err(error) => {
				tracing::warn!(%page, %error, "execute.failed");
				self.ctx.notify(keys::execute_failed(&error));
				Ok(InvokeOutcome::Failed(error))
			}
		}
	}

	async fn execute_script(&self, page: PageKey, kind: ActionKind, section: bool) -> Result<InvokeOutcome, ConsoleError> {
		if let Some(outcome) = self.check_gate(page, kind).await? {
			return Ok(outcome);
		}
		let flag = if section { TrackerFlag::RunningSection } else { TrackerFlag::Running };
		let _execution = match self.begin(page, Some(kind), Some(flag))? {
			Ok(execution) => execution,
			Err(outcome) => return Ok(outcome),
		};
		let active = self.register_request(page)?;
		let request = self.with_page(page, |state| ExecuteRequest {
			id: active.id,
			session: state.session.clone(),
			sql: state.script(section),
			section,
		})?;

		tracing::debug!(%page, request = %active.id, section, "execute.send");
		let result = tokio::select! {
			res = self.ctx.backend.execute(request) => res,
			() = active.cancel.cancelled() => Err(RpcError::Cancelled),
		};
		self.finish_execution(page, result)
	}

	async fn run_pl(&self, page: PageKey, kind: ActionKind) -> Result<InvokeOutcome, ConsoleError> {
		if let Some(outcome) = self.check_gate(page, kind).await? {
			return Ok(outcome);
		}
		let _execution = match self.begin(page, Some(kind), Some(TrackerFlag::Running))? {
			Ok(execution) => execution,
			Err(outcome) => return Ok(outcome),
		};
		let active = self.register_request(page)?;
		let request = self.with_page(page, |state| {
			let script = state.buffer.get_value();
			PlRunRequest {
				id: active.id,
				session: state.session.clone(),
				schema: run_schema(state.schema.as_ref(), kind, &script),
				script,
			}
		})?;

		tracing::debug!(%page, request = %active.id, action = kind.name(), "pl_run.send");
		let result = tokio::select! {
			res = self.ctx.backend.run_pl(request) => res,
			() = active.cancel.cancelled() => Err(RpcError::Cancelled),
		};
		self.finish_execution(page, result)
	}

	async fn compile(&self, page: PageKey, kind: ActionKind) -> Result<InvokeOutcome, ConsoleError> {
		if let Some(outcome) = self.check_gate(page, kind).await? {
			return Ok(outcome);
		}
		let Some((session, schema)) = self.with_page(page, |state| Some((state.session.clone(), state.schema.clone()?)))? else {
			return Ok(InvokeOutcome::NotApplicable(ActionStatus::Disable));
		};
		let _execution = match self.begin(page, Some(kind), Some(TrackerFlag::Running))? {
			Ok(execution) => execution,
			Err(outcome) => return Ok(outcome),
		};
		let active = self.register_request(page)?;
		let request = CompileRequest {
			id: active.id,
			session,
			schema,
		};

		tracing::debug!(%page, request = %request.id, action = kind.name(), "compile.send");
		let result = tokio::select! {
			res = self.ctx.backend.compile(request) => res,
			() = active.cancel.cancelled() => Err(RpcError::Cancelled),
		};
		match result {
			Ok(response) => {
				if response.is_clean() {
					self.ctx.notify(keys::COMPILED);
				} else {
					self.ctx.notify(keys::compile_diagnostics(response.diagnostics.len()));
				}
				self.store_output(page, PageOutput::Diagnostics(response.diagnostics));
				Ok(InvokeOutcome::Completed)
			}
			Err(RpcError::Cancelled) => {
				tracing::debug!(%page, "compile.cancelled");
				Ok(InvokeOutcome::Failed(RpcError::Cancelled))
			}
			Err(error) => {
				tracing::warn!(%page, %error, "compile.failed");
				self.ctx.notify(keys::compile_failed(&error));
				Ok(InvokeOutcome::Failed(error))
			}
		}
	}

	async fn explain(&self, page: PageKey) -> Result<InvokeOutcome, ConsoleError> {
		if let Some(outcome) = self.check_gate(page, ActionKind::Explain).await? {
			return Ok(outcome);
		}
		let request = self.with_page(page, |state| ExplainRequest {
			session: state.session.clone(),
			sql: state.explain_target(),
		})?;
		let _execution = match self.begin(page, Some(ActionKind::Explain), None)? {
			Ok(execution) => execution,
			Err(outcome) => return Ok(outcome),
		};

		match self.ctx.backend.explain(request).await {
			Ok(plan) => {
				self.store_output(page, PageOutput::Plan(plan));
				Ok(InvokeOutcome::Completed)
			}
			Err(error) => {
				tracing::warn!(%page, %error, "explain.failed");
				self.ctx.notify(keys::explain_failed(&error));
				Ok(InvokeOutcome::Failed(error))
			}
		}
	}

	async fn end_transaction(&self, page: PageKey, flag: TrackerFlag) -> Result<InvokeOutcome, ConsoleError> {
		let session = self.session_of(page)?;
		let _execution = match self.begin(page, None, Some(flag))? {
			Ok(execution) => execution,
			Err(outcome) => return Ok(outcome),
		};

		let committing = flag == TrackerFlag::Committing;
		tracing::debug!(%page, %session, flag = flag.as_str(), "transaction.send");
		let result = if committing {
			self.ctx.backend.commit(&session).await
		} else {
			self.ctx.backend.rollback(&session).await
		};

		match result {
			Ok(response) => {
				if self.ctx.sessions.set_transaction_state(&session, response.transaction_state) {
					self.ctx.publish(PageChange::Session(session));
				}
				self.ctx.notify(if committing { keys::COMMITTED } else { keys::ROLLED_BACK });
				Ok(InvokeOutcome::Completed)
			}
			Err(error) => {
				tracing::warn!(%page, flag = flag.as_str(), %error, "transaction.failed");
				self.ctx.notify(if committing {
					keys::commit_failed(&error)
				} else {
					keys::rollback_failed(&error)
				});
				Ok(InvokeOutcome::Failed(error))
			}
		}
	}

	/// Asks the backend to cancel the page's running request; on success the
	/// running effect is released as cancelled.
	async fn stop(&self, page: PageKey) -> Result<InvokeOutcome, ConsoleError> {
		let Some((request, active)) = self.with_page(page, |state| {
			let active = state.active_request.clone()?;
			let request = StopRequest {
				session: state.session.clone(),
				target: Some(active.id),
			};
			Some((request, active))
		})?
		else {
			tracing::debug!(%page, "stop.nothing_registered");
			return Ok(InvokeOutcome::NotApplicable(ActionStatus::Disable));
		};
		let _execution = match self.begin(page, None, Some(TrackerFlag::Stopping))? {
			Ok(execution) => execution,
			Err(outcome) => return Ok(outcome),
		};

		tracing::debug!(%page, target = ?request.target, "stop.send");
		match self.ctx.backend.stop(request).await {
			Ok(()) => {
				active.cancel.cancel();
				self.ctx.notify(keys::QUERY_STOPPED);
				Ok(InvokeOutcome::Completed)
			}
			Err(error) => {
				tracing::warn!(%page, %error, "stop.failed");
				self.ctx.notify(keys::stop_failed(&error));
				Ok(InvokeOutcome::Failed(error))
			}
		}
	}

	async fn start_debug(&self, page: PageKey, kind: ActionKind) -> Result<InvokeOutcome, ConsoleError> {
		if let Some(outcome) = self.check_gate(page, kind).await? {
			return Ok(outcome);
		}
		let launch = self.with_page(page, |state| {
			let text = state.buffer.get_value();
			let schema = run_schema(state.schema.as_ref(), kind, &text);
			DebugLaunch {
				session: state.session.clone(),
				target: (&schema).into(),
				script: text.clone(),
				pre_debug_text: text,
			}
		})?;
		let _execution = match self.begin(page, Some(kind), None)? {
			Ok(execution) => execution,
			Err(outcome) => return Ok(outcome),
		};

		match self.ctx.debug.start(page, launch).await {
			Ok(status) => {
				self.sync_debug_markers(page)?;
				if status.is_end() {
					self.ctx.notify(keys::DEBUG_FINISHED);
				}
				Ok(InvokeOutcome::Completed)
			}
			Err(DebugError::StartFailed(error)) => {
				self.ctx.notify(keys::debug_failed(&error));
				Ok(InvokeOutcome::Failed(error))
			}
			Err(err) => {
				tracing::debug!(%page, error = %err, "debug.start.rejected");
				Ok(InvokeOutcome::NotApplicable(ActionStatus::Disable))
			}
		}
	}

	async fn step(&self, page: PageKey, command: StepCommand) -> Result<InvokeOutcome, ConsoleError> {
		match self.ctx.debug.execute_step(page, command).await {
			StepOutcome::Applied(status) => {
				self.sync_highlight(page)?;
				if status.is_end() {
					self.ctx.notify(keys::DEBUG_FINISHED);
				}
				Ok(InvokeOutcome::Completed)
			}
			StepOutcome::Failed { error, .. } => {
				self.ctx.notify(keys::debug_failed(&error));
				self.sync_highlight(page)?;
				Ok(InvokeOutcome::Failed(error))
			}
			StepOutcome::Ignored(status) => {
				let status = if status.in_flight().is_some() {
					ActionStatus::Running
				} else {
					ActionStatus::Disable
				};
				Ok(InvokeOutcome::NotApplicable(status))
			}
			StepOutcome::Stale => Ok(InvokeOutcome::Discarded),
			StepOutcome::NoSession => Ok(InvokeOutcome::NotApplicable(ActionStatus::Disable)),
		}
	}

	async fn retry_debug(&self, page: PageKey) -> Result<InvokeOutcome, ConsoleError> {
		match self.ctx.debug.retry(page).await {
			Ok(StepOutcome::Applied(_)) => {
				self.sync_debug_markers(page)?;
				Ok(InvokeOutcome::Completed)
			}
			Ok(StepOutcome::Stale) => Ok(InvokeOutcome::Discarded),
			Ok(StepOutcome::Failed { error, .. }) | Err(DebugError::StartFailed(error)) => {
				self.ctx.notify(keys::debug_failed(&error));
				Ok(InvokeOutcome::Failed(error))
			}
			Ok(StepOutcome::Ignored(_) | StepOutcome::NoSession) | Err(_) => Ok(InvokeOutcome::NotApplicable(ActionStatus::Disable)),
		}
	}

	async fn exit_debug(&self, page: PageKey) -> Result<InvokeOutcome, ConsoleError> {
		match self.ctx.debug.execute_exit(page).await {
			Ok(Some(teardown)) => {
				tracing::debug!(%page, markers = teardown.breakpoint_markers.len(), "debug.teardown");
				self.with_buffer(page, |buffer| {
					buffer.set_value(&teardown.restore_text);
					buffer.clear_markers();
				})?;
				Ok(InvokeOutcome::Completed)
			}
			Ok(None) | Err(_) => Ok(InvokeOutcome::NotApplicable(ActionStatus::Disable)),
		}
	}

	/// Redraws breakpoint markers from the persisted lines and the
	/// execution-line highlight from the live session.
	fn sync_debug_markers(&self, page: PageKey) -> Result<(), ConsoleError> {
		let lines = self.ctx.debug.breakpoints(page);
		let highlighted = self.ctx.debug.view(page).and_then(|view| view.highlighted_line);
		self.with_buffer(page, |buffer| {
			buffer.clear_markers();
			for line in lines {
				buffer.set_breakpoint_marker(line, true);
			}
			buffer.highlight_line(highlighted);
		})
	}

	fn sync_highlight(&self, page: PageKey) -> Result<(), ConsoleError> {
		let highlighted = self.ctx.debug.view(page).and_then(|view| view.highlighted_line);
		self.with_buffer(page, |buffer| buffer.highlight_line(highlighted))
	}
}

/// Schema sent with a PL run or debug start: the page's object for named
/// actions, an anonymous block over the current text otherwise.
fn run_schema(schema: Option<&PlSchema>, kind: ActionKind, script: &str) -> PlSchema {
	match schema {
		Some(schema) if !kind.targets_anonymous_block() || schema.is_anonymous() => schema.clone(),
		_ => PlSchema::anonymous(script),
	}
}
