use std::fmt::Debug;
use std::sync::Arc;

use dbide_primitives::{ExecutionMode, PageKey};
use rustc_hash::FxHashSet;

/// Set of pages holding one tracker flag.
pub type PageSet = FxHashSet<PageKey>;

/// Decides whether an entry in a tracker set counts against a page.
///
/// This is the single point where shared-session and multi-session consoles
/// differ: the predicate arity changes from "contains this page" to "is
/// non-empty".
pub trait ScopePolicy: Debug + Send + Sync {
	/// Name used in log fields.
	fn name(&self) -> &'static str;

	/// Returns true if `set` holds an entry within `page`'s scope.
	fn holds(&self, set: &PageSet, page: PageKey) -> bool;

	/// Returns true if a change on one page can alter another page's state.
	fn spans_pages(&self) -> bool;
}

/// Exclusion scoped to each page (one session per page).
#[derive(Debug, Clone, Copy, Default)]
pub struct PerPageScope;

impl ScopePolicy for PerPageScope {
	fn name(&self) -> &'static str {
		"per_page"
	}

	fn holds(&self, set: &PageSet, page: PageKey) -> bool {
		set.contains(&page)
	}

	fn spans_pages(&self) -> bool {
		false
	}
}

/// Exclusion scoped to the whole console (one shared session).
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalScope;

impl ScopePolicy for GlobalScope {
	fn name(&self) -> &'static str {
		"global"
	}

	fn holds(&self, set: &PageSet, _page: PageKey) -> bool {
		!set.is_empty()
	}

	fn spans_pages(&self) -> bool {
		true
	}
}

/// Selects the scope policy for an execution mode.
pub fn scope_for(mode: ExecutionMode) -> Arc<dyn ScopePolicy> {
	match mode {
		ExecutionMode::SharedSession => Arc::new(GlobalScope),
		ExecutionMode::MultiSession => Arc::new(PerPageScope),
	}
}
