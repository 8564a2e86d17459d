use std::collections::{BTreeMap, BTreeSet};

use dbide_primitives::{PageKey, SessionId};
use dbide_rpc::{DebugEvent, DebugTarget, RemoteDebugId, RpcError, StackFrame, StepCommand};
use dbide_worker::GenerationToken;

use crate::DebugStatus;

/// Permission to send one stepping command, issued by [`DebugSession::begin_step`].
#[derive(Debug, Clone)]
pub struct StepTicket {
	/// Generation of the session the ticket belongs to.
	pub generation: u64,
	/// Remote session to address.
	pub remote: RemoteDebugId,
	/// Command to send.
	pub command: StepCommand,
}

/// Everything needed to (re)start a debug run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugLaunch {
	/// Database session hosting the debuggee.
	pub session: SessionId,
	/// Routine being debugged.
	pub target: DebugTarget,
	/// Script sent to the debugger.
	pub script: String,
	/// Editor text to restore on exit.
	pub pre_debug_text: String,
}

/// Debug state of one page.
///
/// All transitions are synchronous; the controller performs the remote calls
/// between [`begin_step`](Self::begin_step) and
/// [`apply_event`](Self::apply_event)/[`fail_step`](Self::fail_step).
#[derive(Debug)]
pub struct DebugSession {
	page: PageKey,
	token: GenerationToken,
	remote: RemoteDebugId,
	launch: DebugLaunch,
	status: DebugStatus,
	breakpoints: BTreeSet<u32>,
	/// Toggles made while a step was in flight, not yet sent to the remote.
	deferred: BTreeMap<u32, bool>,
	call_stack: Vec<StackFrame>,
	selected_frame: usize,
	output: Option<String>,
	end_reason: Option<String>,
}

impl DebugSession {
	/// Creates a session paused before its first event is applied.
	pub fn new(page: PageKey, token: GenerationToken, remote: RemoteDebugId, launch: DebugLaunch, breakpoints: BTreeSet<u32>) -> Self {
		Self {
			page,
			token,
			remote,
			launch,
			status: DebugStatus::Init,
			breakpoints,
			deferred: BTreeMap::new(),
			call_stack: Vec::new(),
			selected_frame: 0,
			output: None,
			end_reason: None,
		}
	}

	pub fn page(&self) -> PageKey {
		self.page
	}

	pub fn generation(&self) -> u64 {
		self.token.generation()
	}

	pub fn token(&self) -> &GenerationToken {
		&self.token
	}

	pub fn remote(&self) -> &RemoteDebugId {
		&self.remote
	}

	pub fn launch(&self) -> &DebugLaunch {
		&self.launch
	}

	pub fn status(&self) -> DebugStatus {
		self.status
	}

	pub fn breakpoints(&self) -> &BTreeSet<u32> {
		&self.breakpoints
	}

	pub fn call_stack(&self) -> &[StackFrame] {
		&self.call_stack
	}

	pub fn target(&self) -> &DebugTarget {
		&self.launch.target
	}

	/// Editor text captured before the debug run, restored on exit.
	pub fn pre_debug_text(&self) -> &str {
		&self.launch.pre_debug_text
	}

	/// Output reported by a finished run.
	pub fn output(&self) -> Option<&str> {
		self.output.as_deref()
	}

	/// Reason reported for an abnormal end.
	pub fn end_reason(&self) -> Option<&str> {
		self.end_reason.as_deref()
	}

	/// True once the remote routine completed or the session died.
	pub fn is_debug_end(&self) -> bool {
		self.status.is_end()
	}

	/// Line to highlight: the selected frame's line while paused.
	pub fn highlighted_line(&self) -> Option<u32> {
		if self.status != DebugStatus::Init {
			return None;
		}
		self.call_stack.get(self.selected_frame).map(|f| f.line)
	}

	/// Starts a stepping command. Returns `None` unless the session is `INIT`.
	pub fn begin_step(&mut self, command: StepCommand) -> Option<StepTicket> {
		if self.status != DebugStatus::Init {
			tracing::debug!(page = %self.page, status = self.status.as_str(), ?command, "debug.step.ignored");
			return None;
		}
		self.transition(DebugStatus::for_command(command));
		Some(StepTicket {
			generation: self.generation(),
			remote: self.remote.clone(),
			command,
		})
	}

	/// Applies a remote start/step response.
	pub fn apply_event(&mut self, event: DebugEvent) {
		match event {
			DebugEvent::Paused { line, call_stack } => {
				self.call_stack = if call_stack.is_empty() {
					vec![StackFrame {
						pl_name: self.launch.target.pl_name.clone().unwrap_or_default(),
						package_name: self.launch.target.package_name.clone(),
						line,
					}]
				} else {
					call_stack
				};
				self.selected_frame = 0;
				self.transition(DebugStatus::Init);
			}
			DebugEvent::Finished { output } => {
				self.output = output;
				self.call_stack.clear();
				self.transition(DebugStatus::Finished);
			}
			DebugEvent::Terminated { reason } => {
				self.end_reason = Some(reason);
				self.call_stack.clear();
				self.transition(DebugStatus::Terminated);
			}
		}
	}

	/// Handles a failed stepping command.
	///
	/// The session returns to `INIT` so the user can step again, unless the
	/// failure says the remote session is gone.
	pub fn fail_step(&mut self, err: &RpcError) {
		if err.is_terminal() {
			self.end_reason = Some(err.to_string());
			self.call_stack.clear();
			self.transition(DebugStatus::Terminated);
		} else {
			self.transition(DebugStatus::Init);
		}
	}

	/// Enters `EXITING`. Returns false unless the session has ended.
	pub fn begin_exit(&mut self) -> bool {
		if !self.is_debug_end() {
			return false;
		}
		self.token.cancel();
		self.transition(DebugStatus::Exiting);
		true
	}

	/// Enters `RECOVER`. Returns false unless the session has ended.
	pub fn begin_recover(&mut self) -> bool {
		if !self.is_debug_end() {
			return false;
		}
		self.token.cancel();
		self.transition(DebugStatus::Recover);
		true
	}

	/// Returns a failed restart to the ended state so it can be retried again.
	pub fn abort_recover(&mut self, reason: String) {
		if self.status == DebugStatus::Recover {
			self.end_reason = Some(reason);
			self.transition(DebugStatus::Terminated);
		}
	}

	/// Selects a call stack frame for highlighting; returns its line.
	pub fn select_frame(&mut self, index: usize) -> Option<u32> {
		let line = self.call_stack.get(index)?.line;
		self.selected_frame = index;
		Some(line)
	}

	pub(crate) fn set_breakpoint(&mut self, line: u32, enabled: bool) {
		if enabled {
			self.breakpoints.insert(line);
		} else {
			self.breakpoints.remove(&line);
		}
	}

	/// Paused and able to take breakpoint changes right away.
	pub fn accepts_breakpoints(&self) -> bool {
		self.status == DebugStatus::Init
	}

	/// Remembers a toggle made during a step. A toggle that undoes a deferred
	/// one cancels it, since the remote never saw either.
	pub(crate) fn defer_breakpoint(&mut self, line: u32, enabled: bool) {
		match self.deferred.get(&line) {
			Some(&pending) if pending != enabled => {
				self.deferred.remove(&line);
			}
			_ => {
				self.deferred.insert(line, enabled);
			}
		}
	}

	/// Drains deferred toggles once the session is paused again. An ended
	/// session drops them: there is no remote left to tell.
	pub(crate) fn take_deferred_breakpoints(&mut self) -> Vec<(u32, bool)> {
		if self.status.in_flight().is_some() {
			return Vec::new();
		}
		let deferred = std::mem::take(&mut self.deferred);
		if !self.accepts_breakpoints() {
			return Vec::new();
		}
		deferred.into_iter().collect()
	}

	fn transition(&mut self, next: DebugStatus) {
		tracing::debug!(
			page = %self.page,
			generation = self.generation(),
			from = self.status.as_str(),
			to = next.as_str(),
			"debug.transition"
		);
		self.status = next;
	}
}
