//! Declarative action registry for the SQL/PL console.
//!
//! Every toolbar operation is an [`ActionKind`] with a static
//! [`ActionDescriptor`] resolving, from a pure [`ActionContext`], its status,
//! visibility and confirmation requirement. [`toolbar`] arranges descriptors
//! into per-context groups, [`gate`] holds the synchronous dispatch
//! preconditions, and [`notifications`] the user-facing messages.

pub mod actions;
pub mod gate;
pub mod notifications;
pub mod toolbar;

pub use actions::{ActionContext, ActionDescriptor, ActionKind, ActionState, Confirmation, resolve_all};
pub use gate::{GateInput, GateRejection, check_capabilities, needs_parse};
pub use notifications::{AutoDismiss, Level, Notification, NotificationKey};
pub use toolbar::{ActionGroup, ResolvedGroup, Toolbar, ToolbarButton, ToolbarMetrics, ToolbarZone, groups_for, offers};
