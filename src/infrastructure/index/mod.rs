//! Searchable knowledge index.
//!
//! The in-memory index is built once at startup from the knowledge store and
//! is read-only afterwards, so it can be shared between requests without locks.

pub mod memory_index;

pub use memory_index::InMemoryIndex;
