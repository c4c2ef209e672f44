//! Symbol loading.
//!
//! A [`SymbolLoader`] produces database symbols for a cluster on demand.
//! [`ServerSymbolLoader`] is the implementation backed by administrative
//! commands; it owns the per-loader client pool and the negative cache of
//! databases known not to exist.
//!
//! # Example
//!
//! ```ignore
//! use cluster_schema::config::Settings;
//! use cluster_schema::loader::{ServerSymbolLoader, SymbolLoader};
//! use tokio_util::sync::CancellationToken;
//!
//! let loader = ServerSymbolLoader::from_settings(&Settings::load()?)?;
//! let cancel = CancellationToken::new();
//!
//! if let Some(db) = loader.load_database("Samples", "", false, &cancel).await? {
//!     println!("{}", db.to_schema_text());
//! }
//!
//! loader.shutdown().await?;
//! ```

mod bad_databases;
mod error;
mod server;

pub use bad_databases::BadDatabaseCache;
pub use error::{LoadError, LoadResult};
pub use server::ServerSymbolLoader;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::metadata::records::DatabaseRecord;
use crate::symbols::{non_empty, ClusterSymbol, DatabaseSymbol};

/// A database as listed by the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseName {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretty_name: Option<String>,
}

impl From<DatabaseRecord> for DatabaseName {
    fn from(record: DatabaseRecord) -> Self {
        Self {
            pretty_name: non_empty(&record.pretty_name),
            name: record.database_name,
        }
    }
}

/// Loads schema symbols from a cluster.
///
/// `cluster` is an empty string (the default cluster), a short host name, or
/// a full URI. With `throw_on_error` unset, failures are logged and the
/// operation returns `Ok(None)`; with it set they surface as `Err`.
#[async_trait]
pub trait SymbolLoader: Send + Sync {
    /// Canonical name of the default cluster.
    fn default_cluster(&self) -> &str;

    /// Canonical name of `cluster`, or `None` if it cannot be resolved.
    fn cluster_name(&self, cluster: &str) -> Option<String>;

    /// Load every member of one database.
    ///
    /// Returns `Ok(None)` when the database does not exist or could not be
    /// loaded.
    async fn load_database(
        &self,
        database: &str,
        cluster: &str,
        throw_on_error: bool,
        cancel: &CancellationToken,
    ) -> LoadResult<Option<DatabaseSymbol>>;

    /// List the databases of a cluster.
    async fn list_databases(
        &self,
        cluster: &str,
        throw_on_error: bool,
        cancel: &CancellationToken,
    ) -> LoadResult<Option<Vec<DatabaseName>>>;
}

/// Extension trait for SymbolLoader with multi-database operations.
#[async_trait]
pub trait SymbolLoaderExt: SymbolLoader {
    /// Load several databases one after another, skipping those that
    /// return no result.
    async fn load_databases(
        &self,
        databases: &[String],
        cluster: &str,
        throw_on_error: bool,
        cancel: &CancellationToken,
    ) -> LoadResult<Vec<DatabaseSymbol>> {
        let mut loaded = Vec::with_capacity(databases.len());
        for database in databases {
            if let Some(symbol) = self
                .load_database(database, cluster, throw_on_error, cancel)
                .await?
            {
                loaded.push(symbol);
            }
        }
        Ok(loaded)
    }

    /// Enumerate the databases of a cluster and load each one.
    async fn load_cluster(
        &self,
        cluster: &str,
        throw_on_error: bool,
        cancel: &CancellationToken,
    ) -> LoadResult<Option<ClusterSymbol>> {
        let Some(name) = self.cluster_name(cluster) else {
            return Ok(None);
        };
        let Some(listed) = self.list_databases(cluster, throw_on_error, cancel).await? else {
            return Ok(None);
        };

        let names: Vec<String> = listed.into_iter().map(|d| d.name).collect();
        let databases = self
            .load_databases(&names, cluster, throw_on_error, cancel)
            .await?;

        Ok(Some(ClusterSymbol { name, databases }))
    }
}

impl<T: SymbolLoader + ?Sized> SymbolLoaderExt for T {}
