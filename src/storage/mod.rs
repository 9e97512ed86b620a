//! In-memory state holders
//!
//! The chain itself lives only for the process lifetime; this module holds
//! the pending-transaction pool that sits next to it.

pub mod memory_pool;

pub use memory_pool::MemoryPool;
