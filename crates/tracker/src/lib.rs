//! Process-wide execution state tracker.
//!
//! Tracks which pages are running a script (whole or section), committing,
//! rolling back or stopping. The [`ExecutionMode`] picks a [`ScopePolicy`] once
//! at construction: per-page exclusion for multi-session consoles, global
//! exclusion when every page shares one database session.
//!
//! [`ExecutionMode`]: dbide_primitives::ExecutionMode

mod error;
mod event;
mod guard;
mod scope;
mod snapshot;
mod tracker;


pub use error::TrackerError;
pub use event::{TrackerChange, TrackerEvent, TrackerFlag};
pub use guard::TrackerGuard;
pub use scope::{GlobalScope, PageSet, PerPageScope, ScopePolicy, scope_for};
pub use snapshot::TrackerSnapshot;
pub use tracker::ExecutionStateTracker;
