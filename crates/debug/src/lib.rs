//! PL step-debugging.
//!
//! One [`DebugSession`] exists per debugged page. Its status machine only
//! advances on user requests and remote responses:
//!
//! ```text
//! INIT ──step──▶ STEP_IN | STEP_OVER | STEP_OUT | RESUME ──paused──▶ INIT
//!                         │                    └──finished/terminated──▶ end
//! end ──retry──▶ RECOVER ──restarted──▶ INIT
//! end ──exit───▶ EXITING ──▶ (session removed)
//! ```
//!
//! [`DebugController`] owns the sessions and issues requests to the remote
//! [`DebugBackend`](dbide_rpc::DebugBackend).

mod controller;
mod error;
mod session;
mod status;


pub use controller::{DebugChange, DebugController, DebugTeardown, DebugView, StepOutcome};
pub use error::DebugError;
pub use session::{DebugLaunch, DebugSession, StepTicket};
pub use status::DebugStatus;
