//! slugsync - Slug synchronization for hierarchical content trees
//!
//! slugsync keeps the URL slugs of a page tree consistent with its titles
//! and hierarchy. Renaming a page regenerates its slug and every
//! descendant's, respecting per-node locks, excluded node types, and
//! permission-scoped path prefixes. Each run is stamped with one correlation
//! group so it can be reverted as a unit, and old paths are kept alive as
//! redirects.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Synchronization, rename, manual edit, and revert
//! - [`core`] - Domain types, normalization, policies, and schemas
//! - [`store`] - Record and redirect stores behind the engine
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! 1. `normalize(normalize(x)) == normalize(x)`
//! 2. Every write of a run carries that run's correlation group
//! 3. No live redirect ever points a path at itself
//! 4. Editors never move a node outside their locked prefix

pub mod cli;
pub mod core;
pub mod engine;
pub mod store;
pub mod ui;
