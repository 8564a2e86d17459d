//! Core types shared by the execution and debug orchestration layers: page
//! identifiers, session metadata, PL object descriptions and action status.

/// Editor page identifiers.
pub mod page;
/// Text range types used by the editor buffer capability.
pub mod range;
/// PL object metadata and script classification.
pub mod schema;
/// Database session handles and data-source capabilities.
pub mod session;
/// Action status and editing context enums.
pub mod status;

pub use page::{PageKey, PageKeyGen};
pub use range::{CharIdx, Range, TextEdit, byte_offset};
pub use schema::{PlSchema, PlType, ScriptKind};
pub use session::{DataSourceCaps, ExecutionMode, SessionHandle, SessionId, TransactionState};
pub use status::{ActionStatus, EditingContext};
