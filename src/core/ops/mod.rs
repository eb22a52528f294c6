//! core::ops
//!
//! Run bookkeeping: correlation groups and site locking.
//!
//! # Modules
//!
//! - [`correlation`] - Correlation ids tying one run's writes together
//! - [`lock`] - Exclusive lock on a site document
//!
//! # Architecture
//!
//! Every mutating command:
//! 1. Acquires the site lock (CLI boundary)
//! 2. Creates one correlation group for the run
//! 3. Stamps every slug write and redirect with the group's ids
//! 4. Flushes the site document
//!
//! A later revert looks the writes up by the group's subject.

pub mod correlation;
pub mod lock;

pub use correlation::{Aspect, CorrelationError, CorrelationGroup, CorrelationId};
pub use lock::{LockError, SiteLock};
