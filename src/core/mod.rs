//! core
//!
//! Domain types, pure algorithms, and schemas for slugsync.
//!
//! # Modules
//!
//! - [`types`] - Strong types: NodeId, LanguageId, UtcTimestamp
//! - [`naming`] - Segment normalization
//! - [`paths`] - Slug path composition
//! - [`policy`] - Lock and exclusion policies
//! - [`permission`] - Permission oracle and locked prefixes
//! - [`site`] - Node records and the site document schema
//! - [`ops`] - Correlation groups and site locking
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Everything here is deterministic and free of I/O, except config
//!   loading and the site lock

pub mod config;
pub mod naming;
pub mod ops;
pub mod paths;
pub mod permission;
pub mod policy;
pub mod site;
pub mod types;
