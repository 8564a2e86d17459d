//! Toolbar watcher.
//!
//! Holds the last resolved action states per page and, given a change event,
//! re-resolves only the pages the event can affect.

use dbide_debug::DebugChange;
use dbide_primitives::PageKey;
use dbide_registry::{ActionKind, ActionState, resolve_all};
use dbide_tracker::TrackerEvent;
use rustc_hash::FxHashMap;

use crate::console::Console;
use crate::pages::PageChange;

/// One button whose resolved state differs from the last refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonChange {
	pub page: PageKey,
	pub action: ActionKind,
	pub state: ActionState,
}

#[derive(Debug, Default)]
pub struct ToolbarWatcher {
	states: FxHashMap<PageKey, FxHashMap<ActionKind, ActionState>>,
}

impl ToolbarWatcher {
	pub fn new() -> Self {
		Self::default()
	}

	/// Last state seen for `action` on `page`.
	pub fn state(&self, page: PageKey, action: ActionKind) -> Option<ActionState> {
		self.states.get(&page)?.get(&action).copied()
	}

	/// Re-resolves every action on `pages` and returns what changed.
	///
	/// Pages that are no longer open are forgotten.
	pub fn refresh(&mut self, console: &Console, pages: impl IntoIterator<Item = PageKey>) -> Vec<ButtonChange> {
		let mut changes = Vec::new();
		for page in pages {
			let Ok(inputs) = console.ctx.action_inputs(page) else {
				self.states.remove(&page);
				continue;
			};
			let cached = self.states.entry(page).or_default();
			for (action, state) in resolve_all(&inputs.context()) {
				if cached.insert(action, state) != Some(state) {
					changes.push(ButtonChange { page, action, state });
				}
			}
		}
		if !changes.is_empty() {
			tracing::trace!(changed = changes.len(), "toolbar.refresh");
		}
		changes
	}

	/// Tracker changes reach every page when the scope is console-wide.
	pub fn on_tracker_event(&mut self, console: &Console, event: &TrackerEvent) -> Vec<ButtonChange> {
		if console.ctx.tracker.scope().spans_pages() {
			let pages = console.pages();
			self.refresh(console, pages)
		} else {
			self.refresh(console, [event.page])
		}
	}

	pub fn on_debug_change(&mut self, console: &Console, change: &DebugChange) -> Vec<ButtonChange> {
		self.refresh(console, [change.page])
	}

	pub fn on_page_change(&mut self, console: &Console, change: &PageChange) -> Vec<ButtonChange> {
		match change {
			PageChange::Opened(page) | PageChange::Updated(page) => self.refresh(console, [*page]),
			PageChange::Closed(page) => {
				self.states.remove(page);
				Vec::new()
			}
			PageChange::Session(session) => {
				let pages = console.pages_on_session(session);
				self.refresh(console, pages)
			}
		}
	}
}
