//! Synchronous dispatch preconditions.
//!
//! The gate runs before every guarded action is dispatched. A rejection never
//! mutates state and never reaches the network; the caller turns it into a
//! warning notification.
//!
//! [`check_capabilities`] runs first, before visibility is considered, since a
//! missing capability also hides the button.

use dbide_primitives::{DataSourceCaps, PlSchema, ScriptKind};
use thiserror::Error;

use crate::actions::ActionKind;

/// Reason an action was refused before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateRejection {
	/// A persisted object has edits that were not saved.
	#[error("save `{name}` before running it")]
	UnsavedChanges { name: String },
	/// The pre-flight parse did not classify the buffer as an anonymous block.
	#[error("script is not an anonymous block (parsed as {0:?})")]
	NotAnonymousBlock(ScriptKind),
	#[error("no statements selected")]
	EmptySelection,
	#[error("{action} is not supported by this data source")]
	CapabilityMissing { action: ActionKind, missing: DataSourceCaps },
}

/// Page facts the gate inspects.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
	pub action: ActionKind,
	pub schema: Option<&'a PlSchema>,
	pub dirty: bool,
	/// Fresh parse result; required for anonymous-block actions.
	pub classification: Option<ScriptKind>,
	pub selection_empty: bool,
	pub caps: DataSourceCaps,
}

/// Refuses an action the data source cannot perform.
pub fn check_capabilities(action: ActionKind, caps: DataSourceCaps) -> Result<(), GateRejection> {
	let required = action.required_caps();
	if caps.contains(required) {
		Ok(())
	} else {
		Err(GateRejection::CapabilityMissing {
			action,
			missing: required.difference(caps),
		})
	}
}

impl GateInput<'_> {
	/// Checks every precondition of the action, first failure wins.
	pub fn check(&self) -> Result<(), GateRejection> {
		check_capabilities(self.action, self.caps)?;

		if self.action.guards_unsaved_edits()
			&& self.dirty
			&& let Some(schema) = self.schema.filter(|s| s.is_persisted())
		{
			return Err(GateRejection::UnsavedChanges {
				name: schema.pl_name.clone().unwrap_or_default(),
			});
		}

		if self.action.targets_anonymous_block() {
			match self.classification {
				Some(ScriptKind::AnonymousBlock) => {}
				other => return Err(GateRejection::NotAnonymousBlock(other.unwrap_or(ScriptKind::Unknown))),
			}
		}

		if self.action == ActionKind::RunSection && self.selection_empty {
			return Err(GateRejection::EmptySelection);
		}

		Ok(())
	}
}

/// The action needs a fresh parse of the buffer before [`GateInput::check`].
pub fn needs_parse(action: ActionKind) -> bool {
	action.targets_anonymous_block()
}
