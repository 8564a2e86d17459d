use dbide_primitives::PageKey;
use thiserror::Error;

use crate::TrackerFlag;

/// Rejected tracker mutation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerError {
	/// A conflicting operation is in flight within the page's scope.
	#[error("{page}: conflicting {held:?} in flight")]
	Conflict {
		/// Page whose mutation was rejected.
		page: PageKey,
		/// Flag that blocked it.
		held: TrackerFlag,
	},
	/// Stop requested for a page that is not running.
	#[error("{0}: nothing running to stop")]
	NotRunning(PageKey),
	/// The same operation is already in flight for this page.
	#[error("{page}: {flag:?} already in flight")]
	InFlight {
		/// Page that already holds the flag.
		page: PageKey,
		/// Flag already held.
		flag: TrackerFlag,
	},
}
