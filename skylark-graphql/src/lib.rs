//! Skylark GraphQL compiles GraphQL documents for a content model which is only known at runtime.
//!
//! A Skylark customer defines their own object types, with their own fields and relationships, and
//! the API exposes a different set of queries and mutations for every schema. The UI cannot ship
//! static documents for such an API. Instead, it introspects the schema into [metadata](meta) and
//! uses it to build every document it sends. This crate consists of:
//!
//! * The [metadata model](meta), describing object types, their fields, relationships,
//!   operations and capabilities, and the [classifier](classify) which turns introspected fields
//!   into that model.
//! * A small [document](document) AST with a deterministic printer.
//! * The [query](query) and [mutation](mutation) builders, pure functions from metadata (and, for
//!   mutations, the user's changes) to documents. Link-list mutations send only the
//!   [minimal diff](diff) between what was loaded and what was edited.
//! * The [alias codec](alias), which keeps polymorphic selections and batched mutations free of
//!   response key collisions and undoes the field aliases in responses.
//! * A [transport](transport) contract for executing documents, with a mock implementation, and
//!   [cache keys](cache) for callers which cache responses.
//!
//! Builders never fail. When metadata has not loaded yet, or an object type does not support an
//! operation, or there is simply nothing to change, they return no document and the
//! [client](transport::Client) sends nothing.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub mod alias;
pub mod cache;
pub mod classify;
pub mod diff;
pub mod document;
pub mod meta;
pub mod mutation;
pub mod prelude;
pub mod query;
pub mod transport;

/// Initialize tracing.
pub fn init_logging() {
    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        if let Err(err) = color_eyre::install() {
            eprintln!("unable to install error reporting: {err}");
        }
        tracing_subscriber::fmt()
            .with_ansi(true)
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    });
}
