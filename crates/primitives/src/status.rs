use crate::schema::{PlSchema, PlType};

/// Derived state of one toolbar action.
///
/// When several conditions hold, `Disable` wins over `Running`, which wins over
/// `Active`, which wins over `Init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
	/// Idle and invocable.
	Init,
	/// Highlighted/toggled but invocable.
	Active,
	/// This very operation is in flight.
	Running,
	/// Not invocable right now.
	Disable,
}

impl ActionStatus {
	/// Returns true if the action may be invoked.
	pub fn is_invocable(self) -> bool {
		matches!(self, Self::Init | Self::Active)
	}
}

/// Editing context a page is in, selecting which toolbar is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EditingContext {
	/// Plain SQL script.
	Sql,
	/// Function, procedure or type.
	PlObject,
	/// Package or package part.
	PlPackage,
	PlTrigger,
	AnonymousBlock,
	/// A debug session is live on the page.
	Debug,
}

impl EditingContext {
	/// Derives the context from the page's PL metadata and debug state.
	pub fn derive(schema: Option<&PlSchema>, debugging: bool) -> Self {
		if debugging {
			return Self::Debug;
		}
		match schema {
			None => Self::Sql,
			// Unnamed objects of any type count as anonymous blocks.
			Some(s) if s.is_anonymous() => Self::AnonymousBlock,
			Some(s) if s.pl_type == PlType::Trigger => Self::PlTrigger,
			Some(s) if s.pl_type.is_package() => Self::PlPackage,
			Some(_) => Self::PlObject,
		}
	}
}
