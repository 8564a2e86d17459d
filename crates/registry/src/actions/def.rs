//! Action descriptor and resolution types.

use dbide_primitives::{ActionStatus, DataSourceCaps};

use super::{ActionContext, ActionKind};

/// Computes an action's status from a page context.
pub type StatusResolver = fn(&ActionContext<'_>) -> ActionStatus;

/// Decides whether an action's button is shown at all.
pub type VisibilityPredicate = fn(&ActionContext<'_>) -> bool;

/// Decides whether invoking the action first needs user confirmation.
pub type ConfirmRequirement = fn(&ActionContext<'_>) -> Option<Confirmation>;

/// Static definition of a toolbar action.
#[derive(Clone, Copy)]
pub struct ActionDescriptor {
	pub kind: ActionKind,
	/// Button label.
	pub name: &'static str,
	/// Tooltip text.
	pub short_desc: &'static str,
	pub required_caps: DataSourceCaps,
	pub status: StatusResolver,
	pub visible: VisibilityPredicate,
	pub confirm: ConfirmRequirement,
}

impl ActionDescriptor {
	/// Resolves the descriptor against one page context.
	///
	/// A button whose required capabilities are missing is hidden regardless of
	/// its own predicate.
	pub fn resolve(&self, ctx: &ActionContext<'_>) -> ActionState {
		let visible = ctx.session.caps.contains(self.required_caps) && (self.visible)(ctx);
		ActionState {
			status: (self.status)(ctx),
			visible,
			confirm: (self.confirm)(ctx),
		}
	}
}

impl std::fmt::Debug for ActionDescriptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActionDescriptor")
			.field("kind", &self.kind)
			.field("name", &self.name)
			.field("required_caps", &self.required_caps)
			.finish_non_exhaustive()
	}
}

/// Resolved `(status, visible, confirm)` triple for one action on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionState {
	pub status: ActionStatus,
	pub visible: bool,
	pub confirm: Option<Confirmation>,
}

impl ActionState {
	/// Visible and clickable.
	pub fn is_invocable(&self) -> bool {
		self.visible && self.status.is_invocable()
	}
}

/// Prompts shown before an action that affects more than the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confirmation {
	SharedSessionCommit,
	SharedSessionRollback,
	DebugRetry,
}

impl Confirmation {
	/// Prompt text.
	pub const fn message(self) -> &'static str {
		match self {
			Self::SharedSessionCommit => {
				"All pages share one session. Commit the transaction for every page?"
			}
			Self::SharedSessionRollback => {
				"All pages share one session. Roll back the transaction for every page?"
			}
			Self::DebugRetry => "Restart the debug session from the beginning?",
		}
	}
}

/// No confirmation.
pub(crate) fn never(_: &ActionContext<'_>) -> Option<Confirmation> {
	None
}

/// Always shown.
pub(crate) fn always(_: &ActionContext<'_>) -> bool {
	true
}
