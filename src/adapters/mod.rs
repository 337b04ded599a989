// Adapters layer: concrete record stores behind the RecordStore port.

pub mod json_store;
pub mod memory_store;

pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;
