//! Character-sheet state: the persisted document model, schema migration,
//! and the store that owns the document for the page lifetime.
//!
//! State lives in WASM memory (thread_local) and is mirrored to localStorage
//! after every mutation.

pub mod migrate;
pub mod platform;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
