//! Per-page editor state.

use dbide_primitives::{PageKey, PlSchema, ScriptKind, SessionHandle, SessionId};
use dbide_registry::ActionKind;
use dbide_rpc::{CompileDiagnostic, ExplainPlan, RequestId, StatementResult};
use dbide_worker::GenerationToken;

use crate::buffer::EditorBuffer;

/// Everything needed to open a page.
pub struct PageSpec {
	/// Session the page wants; shared-session mode may bind it elsewhere.
	pub session: SessionHandle,
	/// PL metadata; `None` for a plain SQL script.
	pub schema: Option<PlSchema>,
	pub buffer: Box<dyn EditorBuffer>,
}

impl PageSpec {
	pub fn sql(session: SessionHandle, buffer: impl EditorBuffer + 'static) -> Self {
		Self {
			session,
			schema: None,
			buffer: Box::new(buffer),
		}
	}

	pub fn pl(session: SessionHandle, schema: PlSchema, buffer: impl EditorBuffer + 'static) -> Self {
		Self {
			session,
			schema: Some(schema),
			buffer: Box::new(buffer),
		}
	}
}

/// Latest result shown under a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutput {
	Statements(Vec<StatementResult>),
	Diagnostics(Vec<CompileDiagnostic>),
	Plan(ExplainPlan),
}

/// Execution a Stop would cancel.
#[derive(Debug, Clone)]
pub(crate) struct ActiveRequest {
	pub id: RequestId,
	pub cancel: GenerationToken,
}

pub(crate) struct PageState {
	pub session: SessionId,
	pub schema: Option<PlSchema>,
	pub buffer: Box<dyn EditorBuffer>,
	pub dirty: bool,
	/// Last pre-flight classification; cleared on edit.
	pub script_kind: Option<ScriptKind>,
	pub in_flight: Option<ActionKind>,
	pub active_request: Option<ActiveRequest>,
	pub output: Option<PageOutput>,
}

impl PageState {
	pub fn new(session: SessionId, schema: Option<PlSchema>, buffer: Box<dyn EditorBuffer>) -> Self {
		Self {
			session,
			schema,
			buffer,
			dirty: false,
			script_kind: None,
			in_flight: None,
			active_request: None,
			output: None,
		}
	}

	/// Text an execution of `section` sends.
	pub fn script(&self, section: bool) -> String {
		let text = self.buffer.get_value();
		if section {
			self.buffer.get_selection().slice(&text).to_owned()
		} else {
			text
		}
	}

	/// Text to explain: the selection if any, else the whole buffer.
	pub fn explain_target(&self) -> String {
		let selection = self.buffer.get_selection();
		self.script(!selection.is_empty())
	}

	/// Persisted object name and type, for duplicate detection.
	pub fn object_identity(&self) -> Option<(&str, dbide_primitives::PlType)> {
		let schema = self.schema.as_ref().filter(|s| s.is_persisted())?;
		Some((schema.pl_name.as_deref()?, schema.pl_type))
	}
}

impl std::fmt::Debug for PageState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PageState")
			.field("session", &self.session)
			.field("schema", &self.schema)
			.field("dirty", &self.dirty)
			.field("script_kind", &self.script_kind)
			.field("in_flight", &self.in_flight)
			.finish_non_exhaustive()
	}
}

/// Page-local change that affects toolbar state without touching the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageChange {
	Opened(PageKey),
	Closed(PageKey),
	/// In-flight action, dirty flag or classification changed.
	Updated(PageKey),
	/// A session's transaction state or auto-commit flag changed.
	Session(SessionId),
}
