//! core::site
//!
//! The content tree, redirect table and slug history of one site.
//!
//! # Modules
//!
//! - [`schema`] - Site document schema (v1)
//!
//! # Architecture
//!
//! The engine never touches a [`SiteDocument`] directly. Stores load it and
//! expose nodes and redirects through the store traits.

pub mod schema;

pub use schema::{
    parse_site, NewRedirect, Node, Redirect, SchemaError, SiteDocument, SlugChange, DEFAULT_TYPE,
    SCHEMA_VERSION, SITE_KIND,
};
