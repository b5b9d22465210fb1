//! Profile store implementations for Chimera.

pub mod directory;
pub mod in_memory;

pub use directory::DirectoryStore;
pub use in_memory::InMemoryStore;
