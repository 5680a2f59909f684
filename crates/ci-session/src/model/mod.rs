//! Data model types.
//!
//! - Values (the closed set of PHP types a session payload can carry)
//! - Session rows and lookup queries for the storage collaborator

pub mod session;
pub mod value;

pub use session::{MemoryStore, SessionQuery, SessionRecord, SessionStore};
pub use value::{Map, Value};
