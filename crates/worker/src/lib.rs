//! Worker primitives for orchestration effects.
//!
//! Effects are dispatched as tokio tasks tagged with a [`TaskClass`]; long-lived
//! remote sessions carry a [`GenerationToken`] so responses that arrive after a
//! restart can be recognised and dropped.

mod class;
mod spawn;
mod token;

pub use class::TaskClass;
pub use spawn::spawn;
pub use token::{GenerationClock, GenerationToken};
