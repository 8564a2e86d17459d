use std::sync::Arc;

use dbide_debug::DebugView;
use dbide_primitives::{EditingContext, PageKey, ScriptKind, SessionId};
use dbide_registry::notifications::keys;
use dbide_registry::{ActionKind, ActionState, Notification, Toolbar};
use dbide_rpc::{DebugBackend, SqlBackend};

use crate::buffer::EditorBuffer;
use crate::config::ConsoleConfig;
use crate::context::OrchestrationContext;
use crate::error::ConsoleError;
use crate::pages::{PageChange, PageOutput, PageSpec, PageState};

/// Handle to the orchestration engine; cheap to clone.
#[derive(Debug, Clone)]
pub struct Console {
	pub(crate) ctx: Arc<OrchestrationContext>,
}

impl Console {
	pub fn new(config: ConsoleConfig, backend: Arc<dyn SqlBackend>, debugger: Arc<dyn DebugBackend>) -> Self {
		Self {
			ctx: Arc::new(OrchestrationContext::new(config, backend, debugger)),
		}
	}

	pub fn context(&self) -> &OrchestrationContext {
		&self.ctx
	}

	/// Opens a page and binds it to a session.
	///
	/// A persisted PL object can be open on only one page per session.
	pub fn open_page(&self, spec: PageSpec) -> Result<PageKey, ConsoleError> {
		let PageSpec { session, schema, buffer } = spec;
		let session = self.ctx.sessions.attach(session);
		let state = PageState::new(session, schema, buffer);

		let page = {
			let mut pages = self.ctx.pages.lock();
			if let Some((name, pl_type)) = state.object_identity() {
				let existing = pages
					.iter()
					.find(|(_, other)| other.session == state.session && other.object_identity() == Some((name, pl_type)));
				if let Some((&page, _)) = existing {
					return Err(ConsoleError::PageAlreadyOpen {
						name: name.to_owned(),
						page,
					});
				}
			}
			let page = self.ctx.page_keys.next_key();
			pages.insert(page, state);
			page
		};
		tracing::debug!(%page, "page.open");
		self.ctx.publish(PageChange::Opened(page));
		Ok(page)
	}

	/// Closes a page and drops everything held for it: tracker entries, the
	/// debug session, persisted breakpoints and, in multi-session mode, its
	/// session handle.
	pub fn close_page(&self, page: PageKey) -> Result<(), ConsoleError> {
		let (state, session_in_use) = {
			let mut pages = self.ctx.pages.lock();
			let state = pages.remove(&page).ok_or(ConsoleError::UnknownPage(page))?;
			let in_use = pages.values().any(|other| other.session == state.session);
			(state, in_use)
		};
		if let Some(active) = &state.active_request {
			active.cancel.cancel();
		}
		let purged_tracker = self.ctx.tracker.purge(page);
		let purged_debug = self.ctx.debug.purge(page);
		if !session_in_use {
			self.ctx.sessions.detach(&state.session);
		}
		tracing::debug!(%page, purged_tracker, purged_debug, "page.close");
		self.ctx.publish(PageChange::Closed(page));
		Ok(())
	}

	/// Open pages in creation order.
	pub fn pages(&self) -> Vec<PageKey> {
		let mut pages: Vec<_> = self.ctx.pages.lock().keys().copied().collect();
		pages.sort_unstable();
		pages
	}

	/// Pages bound to `session`, in creation order.
	pub fn pages_on_session(&self, session: &SessionId) -> Vec<PageKey> {
		let mut pages: Vec<_> = self
			.ctx
			.pages
			.lock()
			.iter()
			.filter(|(_, state)| &state.session == session)
			.map(|(&page, _)| page)
			.collect();
		pages.sort_unstable();
		pages
	}

	pub fn session_of(&self, page: PageKey) -> Result<SessionId, ConsoleError> {
		self.with_page(page, |state| state.session.clone())
	}

	/// Records an edit: marks the page dirty and drops the cached
	/// classification.
	pub fn note_edit(&self, page: PageKey) -> Result<(), ConsoleError> {
		self.update_page(page, |state| {
			let changed = !state.dirty || state.script_kind.is_some();
			state.dirty = true;
			state.script_kind = None;
			changed
		})
	}

	/// Marks the page's edits as saved or unsaved.
	pub fn set_dirty(&self, page: PageKey, dirty: bool) -> Result<(), ConsoleError> {
		self.update_page(page, |state| std::mem::replace(&mut state.dirty, dirty) != dirty)
	}

	pub fn set_auto_commit(&self, page: PageKey, auto_commit: bool) -> Result<(), ConsoleError> {
		let session = self.session_of(page)?;
		if self.ctx.sessions.set_auto_commit(&session, auto_commit) {
			self.ctx.publish(PageChange::Session(session));
		}
		Ok(())
	}

	/// Runs `f` against the page's editor buffer.
	pub fn with_buffer<R>(&self, page: PageKey, f: impl FnOnce(&mut dyn EditorBuffer) -> R) -> Result<R, ConsoleError> {
		let mut pages = self.ctx.pages.lock();
		let state = pages.get_mut(&page).ok_or(ConsoleError::UnknownPage(page))?;
		Ok(f(state.buffer.as_mut()))
	}

	/// Latest result of the page.
	pub fn output(&self, page: PageKey) -> Result<Option<PageOutput>, ConsoleError> {
		self.with_page(page, |state| state.output.clone())
	}

	pub fn editing_context(&self, page: PageKey) -> Result<EditingContext, ConsoleError> {
		let inputs = self.ctx.action_inputs(page)?;
		Ok(EditingContext::derive(inputs.schema.as_ref(), inputs.debug.is_some()))
	}

	/// Resolved `(status, visible, confirm)` of one action on one page.
	pub fn action_state(&self, page: PageKey, kind: ActionKind) -> Result<ActionState, ConsoleError> {
		let inputs = self.ctx.action_inputs(page)?;
		Ok(kind.descriptor().resolve(&inputs.context()))
	}

	/// Every action resolved for `page`.
	pub fn action_states(&self, page: PageKey) -> Result<Vec<(ActionKind, ActionState)>, ConsoleError> {
		let inputs = self.ctx.action_inputs(page)?;
		Ok(dbide_registry::resolve_all(&inputs.context()))
	}

	/// The page's toolbar, collapsed to fit `width` when given.
	pub fn toolbar(&self, page: PageKey, width: Option<u32>) -> Result<Toolbar, ConsoleError> {
		let inputs = self.ctx.action_inputs(page)?;
		let ctx = inputs.context();
		Ok(match width {
			Some(width) => Toolbar::resolve_for_width(&ctx, &self.ctx.config.toolbar.metrics(), width),
			None => Toolbar::resolve(&ctx, 0),
		})
	}

	/// Classifies the buffer with the backend parser and caches the result for
	/// anonymous-block visibility.
	///
	/// A parse failure is reported as a notification and yields `None`.
	pub async fn classify(&self, page: PageKey) -> Result<Option<ScriptKind>, ConsoleError> {
		match self.parse(page).await? {
			Ok(kind) => Ok(Some(kind)),
			Err(error) => {
				tracing::warn!(%page, %error, "parse.failed");
				self.ctx.notify(keys::parse_failed(&error));
				Ok(None)
			}
		}
	}

	/// Toggles a breakpoint and its marker; returns whether it is now set.
	///
	/// A failure to forward the change to a live debugger is reported as a
	/// notification; the breakpoint stays toggled locally.
	pub async fn toggle_breakpoint(&self, page: PageKey, line: u32) -> Result<bool, ConsoleError> {
		let was_set = self.with_page(page, |_| self.ctx.debug.breakpoints(page).contains(&line))?;
		let enabled = match self.ctx.debug.toggle_breakpoint(page, line).await {
			Ok(enabled) => enabled,
			Err(error) => {
				self.ctx.notify(keys::debug_failed(&error));
				!was_set
			}
		};
		self.with_buffer(page, |buffer| buffer.set_breakpoint_marker(line, enabled))?;
		Ok(enabled)
	}

	/// Selects a call stack frame and highlights its line.
	pub fn select_frame(&self, page: PageKey, index: usize) -> Result<Option<u32>, ConsoleError> {
		let line = self.ctx.debug.select_frame(page, index);
		if line.is_some() {
			self.with_buffer(page, |buffer| buffer.highlight_line(line))?;
		}
		Ok(line)
	}

	pub fn debug_view(&self, page: PageKey) -> Option<DebugView> {
		self.ctx.debug.view(page)
	}

	/// Drains queued notifications.
	pub fn take_notifications(&self) -> Vec<Notification> {
		self.ctx.notifications.lock().drain()
	}

	pub(crate) fn with_page<R>(&self, page: PageKey, f: impl FnOnce(&PageState) -> R) -> Result<R, ConsoleError> {
		let pages = self.ctx.pages.lock();
		pages.get(&page).map(f).ok_or(ConsoleError::UnknownPage(page))
	}

	/// Mutates page state and publishes an update when `f` reports a change.
	pub(crate) fn update_page(&self, page: PageKey, f: impl FnOnce(&mut PageState) -> bool) -> Result<(), ConsoleError> {
		let changed = {
			let mut pages = self.ctx.pages.lock();
			let state = pages.get_mut(&page).ok_or(ConsoleError::UnknownPage(page))?;
			f(state)
		};
		if changed {
			self.ctx.publish(PageChange::Updated(page));
		}
		Ok(())
	}
}
