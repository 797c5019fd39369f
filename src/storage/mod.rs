//! Local state store: a small SQLite key/value table holding the session
//! identity and persisted UI preferences.

mod local_state;
mod schema;
mod types;

pub use schema::Database;
pub use types::{DatabaseError, StateEntry};
