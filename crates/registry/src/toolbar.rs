//! Per-context action groups and the resolved toolbar.

use dbide_primitives::EditingContext;

use crate::actions::{ActionContext, ActionKind, ActionState};

/// Side of the toolbar a group is laid out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarZone {
	Left,
	Right,
}

/// Ordered set of actions drawn together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionGroup {
	pub name: &'static str,
	pub zone: ToolbarZone,
	pub actions: &'static [ActionKind],
}

const fn group(name: &'static str, zone: ToolbarZone, actions: &'static [ActionKind]) -> ActionGroup {
	ActionGroup { name, zone, actions }
}

const SESSION: ActionGroup = group(
	"session",
	ToolbarZone::Right,
	&[ActionKind::Commit, ActionKind::Rollback, ActionKind::Stop],
);

const ANONYMOUS: ActionGroup = group(
	"anonymous",
	ToolbarZone::Left,
	&[ActionKind::AnonymousRun, ActionKind::AnonymousDebug],
);

// A console script the parser classified as an anonymous block also offers
// the anonymous actions; they stay hidden until then.
static SQL_GROUPS: [ActionGroup; 3] = [
	group(
		"execute",
		ToolbarZone::Left,
		&[ActionKind::Run, ActionKind::RunSection, ActionKind::Explain],
	),
	ANONYMOUS,
	SESSION,
];

static PL_OBJECT_GROUPS: [ActionGroup; 2] = [
	group(
		"pl",
		ToolbarZone::Left,
		&[ActionKind::PlCompile, ActionKind::PlRun, ActionKind::PlDebug],
	),
	SESSION,
];

static PL_PACKAGE_GROUPS: [ActionGroup; 2] = [group("pl", ToolbarZone::Left, &[ActionKind::PlCompile]), SESSION];

static PL_TRIGGER_GROUPS: [ActionGroup; 2] = [group("pl", ToolbarZone::Left, &[ActionKind::TriggerCompile]), SESSION];

static ANONYMOUS_GROUPS: [ActionGroup; 2] = [ANONYMOUS, SESSION];

static DEBUG_GROUPS: [ActionGroup; 2] = [
	group(
		"step",
		ToolbarZone::Left,
		&[
			ActionKind::PlDebugStepIn,
			ActionKind::PlDebugStepOver,
			ActionKind::PlDebugStepOut,
			ActionKind::PlDebugResume,
		],
	),
	group(
		"debug",
		ToolbarZone::Right,
		&[ActionKind::PlDebugRetry, ActionKind::PlDebugExit],
	),
];

/// Groups shown for an editing context, left zone first.
pub fn groups_for(context: EditingContext) -> &'static [ActionGroup] {
	match context {
		EditingContext::Sql => &SQL_GROUPS,
		EditingContext::PlObject => &PL_OBJECT_GROUPS,
		EditingContext::PlPackage => &PL_PACKAGE_GROUPS,
		EditingContext::PlTrigger => &PL_TRIGGER_GROUPS,
		EditingContext::AnonymousBlock => &ANONYMOUS_GROUPS,
		EditingContext::Debug => &DEBUG_GROUPS,
	}
}

/// True when `kind` has a button in the toolbar of `context`.
pub fn offers(context: EditingContext, kind: ActionKind) -> bool {
	groups_for(context).iter().any(|group| group.actions.contains(&kind))
}

/// One visible button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarButton {
	pub kind: ActionKind,
	pub label: &'static str,
	pub tooltip: &'static str,
	pub state: ActionState,
}

/// A group with its hidden buttons removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
	pub name: &'static str,
	pub zone: ToolbarZone,
	pub buttons: Vec<ToolbarButton>,
}

/// Fully resolved toolbar for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolbar {
	pub context: EditingContext,
	pub left: Vec<ResolvedGroup>,
	pub right: Vec<ResolvedGroup>,
	/// Groups folded into the overflow menu, in their original order.
	pub overflow: Vec<ResolvedGroup>,
}

impl Toolbar {
	/// Resolves the toolbar with the trailing `collapse` groups folded into the
	/// overflow menu.
	pub fn resolve(ctx: &ActionContext<'_>, collapse: usize) -> Self {
		let context = EditingContext::derive(ctx.schema, ctx.debugging());
		let mut groups = resolve_groups(ctx, context);
		let overflow = groups.split_off(groups.len().saturating_sub(collapse));

		let (left, right): (Vec<_>, Vec<_>) = groups.into_iter().partition(|g| g.zone == ToolbarZone::Left);
		Self {
			context,
			left,
			right,
			overflow,
		}
	}

	/// Resolves the toolbar so that it fits into `width`.
	pub fn resolve_for_width(ctx: &ActionContext<'_>, metrics: &ToolbarMetrics, width: u32) -> Self {
		let context = EditingContext::derive(ctx.schema, ctx.debugging());
		let collapse = metrics.collapse_count(&resolve_groups(ctx, context), width);
		Self::resolve(ctx, collapse)
	}

	/// All buttons in display order, overflow last.
	pub fn buttons(&self) -> impl Iterator<Item = &ToolbarButton> {
		self.left
			.iter()
			.chain(&self.right)
			.chain(&self.overflow)
			.flat_map(|g| &g.buttons)
	}

	/// State of a visible button.
	pub fn state(&self, kind: ActionKind) -> Option<ActionState> {
		self.buttons().find(|b| b.kind == kind).map(|b| b.state)
	}
}

fn resolve_groups(ctx: &ActionContext<'_>, context: EditingContext) -> Vec<ResolvedGroup> {
	groups_for(context)
		.iter()
		.filter_map(|group| {
			let buttons: Vec<_> = group
				.actions
				.iter()
				.filter_map(|&kind| {
					let descriptor = kind.descriptor();
					let state = descriptor.resolve(ctx);
					state.visible.then_some(ToolbarButton {
						kind,
						label: descriptor.name,
						tooltip: descriptor.short_desc,
						state,
					})
				})
				.collect();
			(!buttons.is_empty()).then_some(ResolvedGroup {
				name: group.name,
				zone: group.zone,
				buttons,
			})
		})
		.collect()
}

/// Pixel sizes used to turn an available width into a collapse count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarMetrics {
	pub button_width: u32,
	/// Space between adjacent groups.
	pub group_gap: u32,
	/// Width of the overflow menu button.
	pub overflow_width: u32,
}

impl Default for ToolbarMetrics {
	fn default() -> Self {
		Self {
			button_width: 32,
			group_gap: 8,
			overflow_width: 32,
		}
	}
}

impl ToolbarMetrics {
	fn span(&self, groups: &[ResolvedGroup]) -> u32 {
		let buttons: u32 = groups.iter().map(|g| g.buttons.len() as u32).sum();
		let gaps = groups.len().saturating_sub(1) as u32;
		buttons * self.button_width + gaps * self.group_gap
	}

	/// Smallest number of trailing groups to collapse so the rest fits.
	///
	/// Collapsing everything is the floor when even the overflow button alone
	/// does not fit.
	pub fn collapse_count(&self, groups: &[ResolvedGroup], width: u32) -> usize {
		if self.span(groups) <= width {
			return 0;
		}
		for collapse in 1..groups.len() {
			let kept = &groups[..groups.len() - collapse];
			if self.span(kept) + self.group_gap + self.overflow_width <= width {
				return collapse;
			}
		}
		groups.len()
	}
}
