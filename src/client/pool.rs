//! Per-data-source cache of administrative clients.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::admin::{AdminClient, ClientFactory};
use super::error::{ClientError, ClientResult};
use crate::config::ConnectionDescriptor;

/// Holds at most one [`AdminClient`] per data source.
///
/// Clients are created lazily on first [`ClientPool::acquire`] and live until
/// [`ClientPool::release_all`], after which the pool refuses new clients.
/// The state is guarded by an async mutex held across client creation, so
/// concurrent acquires for the same data source never create two clients and
/// no client is created after release.
pub struct ClientPool {
    factory: Arc<dyn ClientFactory>,
    state: Mutex<PoolState>,
}

#[derive(Default)]
struct PoolState {
    clients: HashMap<String, Arc<dyn AdminClient>>,
    released: bool,
}

impl ClientPool {
    /// Create an empty pool that builds clients with `factory`.
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Get the client for the descriptor's data source, creating it on a miss.
    ///
    /// Fails with [`ClientError::Released`] once the pool has been released.
    pub async fn acquire(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> ClientResult<Arc<dyn AdminClient>> {
        let key = descriptor.data_source_key();
        let mut state = self.state.lock().await;

        if state.released {
            return Err(ClientError::Released);
        }
        if let Some(client) = state.clients.get(&key) {
            return Ok(client.clone());
        }

        let client = self.factory.connect(descriptor).await?;
        debug!(data_source = %key, "created administrative client");
        state.clients.insert(key, client.clone());
        Ok(client)
    }

    /// Close every cached client, empty the pool and refuse further acquires.
    ///
    /// All clients are closed even if one fails; the first failure is returned.
    pub async fn release_all(&self) -> ClientResult<()> {
        let clients: Vec<_> = {
            let mut state = self.state.lock().await;
            state.released = true;
            state.clients.drain().collect()
        };
        let mut first_error = None;

        for (key, client) in clients {
            if let Err(e) = client.close().await {
                warn!(data_source = %key, error = %e, "failed to close administrative client");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of cached clients.
    pub async fn len(&self) -> usize {
        self.state.lock().await.clients.len()
    }

    /// Whether the pool holds no clients.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.clients.is_empty()
    }
}
