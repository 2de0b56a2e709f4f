//! Option store backends.

pub mod file;
pub mod memory;

pub use file::JsonFileOptionStore;
pub use memory::MemoryOptionStore;
