//! Action kinds and their static descriptors.
//!
//! The registry is a closed enum: [`ActionKind::descriptor`] is an exhaustive
//! match, so adding a kind without a descriptor fails to compile.

#[macro_use]
mod macros;

mod builtins;
mod context;
mod def;
mod kind;

pub use context::ActionContext;
pub use def::{ActionDescriptor, ActionState, Confirmation, ConfirmRequirement, StatusResolver, VisibilityPredicate};
pub use kind::ActionKind;

/// Resolves every action for one page context, in declaration order.
pub fn resolve_all(ctx: &ActionContext<'_>) -> Vec<(ActionKind, ActionState)> {
	use strum::IntoEnumIterator;

	ActionKind::iter().map(|kind| (kind, kind.descriptor().resolve(ctx))).collect()
}
