use dbide_debug::DebugStatus;
use dbide_primitives::{PageKey, PlSchema, ScriptKind, SessionHandle};
use dbide_tracker::TrackerSnapshot;

use super::ActionKind;

/// Everything an action's resolvers may read, gathered for one page.
///
/// Resolvers are pure over this value; the caller assembles it from the
/// tracker, session registry, debug controller and page state.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
	pub page: PageKey,
	pub tracker: TrackerSnapshot,
	pub session: &'a SessionHandle,
	pub schema: Option<&'a PlSchema>,
	/// Status of this page's debug session, if one exists.
	pub debug: Option<DebugStatus>,
	/// Last classification of the buffer by the parser.
	pub script_kind: Option<ScriptKind>,
	/// The buffer has edits not saved to the object.
	pub dirty: bool,
	/// Which action started this page's current execution.
	pub in_flight: Option<ActionKind>,
}

impl<'a> ActionContext<'a> {
	/// Context for an idle page with nothing in flight.
	pub fn idle(page: PageKey, session: &'a SessionHandle) -> Self {
		Self {
			page,
			tracker: TrackerSnapshot::default(),
			session,
			schema: None,
			debug: None,
			script_kind: None,
			dirty: false,
			in_flight: None,
		}
	}

	pub fn with_tracker(mut self, tracker: TrackerSnapshot) -> Self {
		self.tracker = tracker;
		self
	}

	pub fn with_schema(mut self, schema: Option<&'a PlSchema>) -> Self {
		self.schema = schema;
		self
	}

	pub fn with_debug(mut self, debug: Option<DebugStatus>) -> Self {
		self.debug = debug;
		self
	}

	pub fn with_script_kind(mut self, kind: Option<ScriptKind>) -> Self {
		self.script_kind = kind;
		self
	}

	pub fn with_in_flight(mut self, kind: Option<ActionKind>) -> Self {
		self.in_flight = kind;
		self
	}

	/// A debug session exists for this page.
	pub fn debugging(&self) -> bool {
		self.debug.is_some()
	}
}
