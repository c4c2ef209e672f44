//! Administrative client abstractions.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::ClientResult;
use super::protocol::ResultSet;
use crate::config::ConnectionDescriptor;

/// A reusable handle bound to one data source that executes administrative
/// commands.
///
/// Clients are expensive to create and cheap to reuse. They hold resources
/// (processes, sockets) until [`AdminClient::close`] is called.
#[async_trait]
pub trait AdminClient: Send + Sync {
    /// The data source this client is bound to.
    fn data_source(&self) -> &str;

    /// Execute a command scoped to `database` and return every result table.
    async fn execute(&self, database: &str, command: &str) -> ClientResult<ResultSet>;

    /// Release the resources held by this client.
    async fn close(&self) -> ClientResult<()>;
}

/// Creates administrative clients for connection descriptors.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Create a new client bound to the descriptor's data source.
    async fn connect(&self, descriptor: &ConnectionDescriptor)
        -> ClientResult<Arc<dyn AdminClient>>;
}
