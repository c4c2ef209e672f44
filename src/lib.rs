//! # Cluster Schema
//!
//! A schema-discovery client for analytical database clusters.
//!
//! ## Architecture
//!
//! Given a cluster and a database name, the loader issues administrative
//! commands and assembles the answers into a typed symbol tree that a query
//! analysis engine consumes as its schema context:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        SymbolLoader (load_database, list_databases)      │
//! │        + negative cache of missing databases             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [config::EndpointResolver]
//! ┌─────────────────────────────────────────────────────────┐
//! │       ConnectionDescriptor ──► ClientPool (per source)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata::assemble]
//! ┌─────────────────────────────────────────────────────────┐
//! │   tables, external tables, materialized views,           │
//! │   functions, entity groups                               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                 DatabaseSymbol tree                      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod loader;
pub mod metadata;
pub mod symbols;

#[cfg(test)]
pub(crate) mod test_utils;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::client::{AdminClient, ClientError, ClientFactory, ClientResult, ResultSet};
    pub use crate::config::{ConnectionDescriptor, EndpointResolver, Settings};
    pub use crate::loader::{
        DatabaseName, LoadError, LoadResult, ServerSymbolLoader, SymbolLoader, SymbolLoaderExt,
    };
    pub use crate::symbols::{ClusterSymbol, DatabaseSymbol, Member, MemberKind};
    pub use tokio_util::sync::CancellationToken;
}

pub use loader::{ServerSymbolLoader, SymbolLoader, SymbolLoaderExt};
pub use symbols::{ClusterSymbol, DatabaseSymbol};
