//! Table data model as pushed by the server.
//!
//! Nothing here knows poker rules. Snapshots are opaque authoritative values
//! and the helpers only resolve indices and defaults the server leaves implicit.

pub mod constants;
pub mod entities;
