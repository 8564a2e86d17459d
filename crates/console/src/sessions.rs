//! Database sessions pages are bound to.

use dbide_primitives::{ExecutionMode, SessionHandle, SessionId, TransactionState};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Live session handles, keyed by id.
///
/// In shared-session mode the first attached handle is the only one; every
/// later page binds to it.
#[derive(Debug)]
pub struct SessionRegistry {
	mode: ExecutionMode,
	handles: RwLock<FxHashMap<SessionId, SessionHandle>>,
	shared: RwLock<Option<SessionId>>,
}

impl SessionRegistry {
	pub fn new(mode: ExecutionMode) -> Self {
		Self {
			mode,
			handles: RwLock::new(FxHashMap::default()),
			shared: RwLock::new(None),
		}
	}

	/// Registers a page's session and returns the id the page is bound to.
	pub fn attach(&self, handle: SessionHandle) -> SessionId {
		if self.mode == ExecutionMode::SharedSession {
			let mut shared = self.shared.write();
			if let Some(id) = shared.as_ref() {
				return id.clone();
			}
			*shared = Some(handle.id.clone());
		}
		let id = handle.id.clone();
		self.handles.write().entry(id.clone()).or_insert(handle);
		id
	}

	/// Forgets a session no page uses any more. The shared session is kept.
	pub fn detach(&self, id: &SessionId) -> bool {
		if self.shared.read().as_ref() == Some(id) {
			return false;
		}
		self.handles.write().remove(id).is_some()
	}

	pub fn get(&self, id: &SessionId) -> Option<SessionHandle> {
		self.handles.read().get(id).cloned()
	}

	/// Records the transaction state reported by the backend. Returns true if
	/// it changed.
	pub fn set_transaction_state(&self, id: &SessionId, state: TransactionState) -> bool {
		let mut handles = self.handles.write();
		let Some(handle) = handles.get_mut(id) else {
			return false;
		};
		if handle.transaction_state == state {
			return false;
		}
		tracing::debug!(session = %id, ?state, "session.transaction_state");
		handle.transaction_state = state;
		true
	}

	pub fn set_auto_commit(&self, id: &SessionId, auto_commit: bool) -> bool {
		let mut handles = self.handles.write();
		match handles.get_mut(id) {
			Some(handle) if handle.auto_commit != auto_commit => {
				handle.auto_commit = auto_commit;
				true
			}
			_ => false,
		}
	}
}
