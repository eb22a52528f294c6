//! store
//!
//! Persistence behind the engine.
//!
//! # Modules
//!
//! - [`traits`] - `RecordStore` and `RedirectStore` contracts
//! - [`memory`] - In-memory store with failure injection
//! - [`file`] - Locked JSON site document on disk
//!
//! # Architecture
//!
//! The engine is generic over the two traits. The CLI opens a
//! [`FileStore`], runs the engine against its in-memory view, and flushes.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::{FailOn, MemoryStore, StoreOperation};
pub use traits::{RecordStore, RedirectStore, StoreError};
