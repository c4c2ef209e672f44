//! Symbol loader backed by administrative commands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::bad_databases::BadDatabaseCache;
use super::error::{LoadError, LoadResult};
use super::{DatabaseName, SymbolLoader};
use crate::client::{AdminClient, BridgeClientFactory, ClientError, ClientFactory, ClientPool};
use crate::config::{EndpointResolver, LoaderSettings, Settings};
use crate::metadata::assemble::{
    load_entity_groups, load_external_tables, load_functions, load_materialized_views,
    load_tables,
};
use crate::metadata::records::DatabaseRecord;
use crate::metadata::{commands, CommandExecutor, FailurePolicy, Fetch};
use crate::symbols::{DatabaseSymbol, Member};

/// Loads database symbols by issuing administrative commands.
///
/// Owns one client per data source, created on first use and held until
/// [`shutdown`](Self::shutdown), and a per-cluster negative cache of
/// databases the server reported as missing. Both caches are internally
/// synchronized, so one loader can serve concurrent loads.
pub struct ServerSymbolLoader {
    resolver: EndpointResolver,
    pool: ClientPool,
    bad_databases: BadDatabaseCache,
    settings: LoaderSettings,
    closed: AtomicBool,
}

impl ServerSymbolLoader {
    pub fn new(resolver: EndpointResolver, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            resolver,
            pool: ClientPool::new(factory),
            bad_databases: BadDatabaseCache::new(),
            settings: LoaderSettings::default(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_settings(mut self, settings: LoaderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build a loader that talks to clusters through the configured bridge.
    pub fn from_settings(settings: &Settings) -> LoadResult<Self> {
        let resolver = settings.connection.resolver()?;
        let factory = BridgeClientFactory::from_settings(&settings.bridge)?;
        Ok(Self::new(resolver, Arc::new(factory)).with_settings(settings.loader.clone()))
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    /// Databases recorded as missing on `cluster`, sorted.
    pub fn bad_databases(&self, cluster: &str) -> Vec<String> {
        self.resolver
            .cluster_name(cluster)
            .map(|name| self.bad_databases.databases(&name))
            .unwrap_or_default()
    }

    pub fn is_known_bad(&self, cluster: &str, database: &str) -> bool {
        self.resolver
            .cluster_name(cluster)
            .is_some_and(|name| self.bad_databases.contains(&name, database))
    }

    /// Number of clients currently held.
    pub async fn client_count(&self) -> usize {
        self.pool.len().await
    }

    /// Close every client and refuse further loads.
    ///
    /// Every client is closed even if one fails; the first failure is
    /// returned. Calling it again is a no-op.
    pub async fn shutdown(&self) -> LoadResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let released = self.pool.release_all().await;
        info!(default_cluster = %self.resolver.default_cluster(), "symbol loader shut down");
        Ok(released?)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> LoadResult<()> {
        if self.is_closed() {
            Err(LoadError::Closed)
        } else {
            Ok(())
        }
    }

    fn policy(&self, throw_on_error: bool) -> FailurePolicy {
        FailurePolicy::from_throw_on_error(throw_on_error || self.settings.strict)
    }

    async fn connect(
        &self,
        cluster: &str,
        policy: FailurePolicy,
    ) -> LoadResult<Option<Arc<dyn AdminClient>>> {
        let Some(descriptor) = self.resolver.resolve(cluster) else {
            debug!(cluster = %cluster, "cluster cannot be resolved");
            return Ok(None);
        };

        match self.pool.acquire(&descriptor).await {
            Ok(client) => Ok(Some(client)),
            Err(ClientError::Released) => Err(LoadError::Closed),
            Err(e) if policy.is_strict() => Err(e.into()),
            Err(e) => {
                warn!(
                    data_source = %descriptor.data_source(),
                    error = %e,
                    "failed to create administrative client"
                );
                Ok(None)
            }
        }
    }

    fn mark_bad(&self, cluster: &str, database: &str) {
        if self.bad_databases.insert(cluster, database) {
            info!(cluster = %cluster, database = %database, "recorded missing database");
        }
    }
}

/// Collapse a category listing to its symbols.
///
/// A category whose listing failed leniently is empty. A listing reported
/// not found is only an expected absence for the table schema, so under the
/// strict policy it aborts the load here.
fn category<T>(policy: FailurePolicy, command: &str, fetch: Fetch<Vec<T>>) -> LoadResult<Vec<T>> {
    match fetch {
        Fetch::Found(symbols) => Ok(symbols),
        Fetch::NotFound if policy.is_strict() => Err(listing_not_found(command)),
        Fetch::NotFound | Fetch::Failed(_) => Ok(Vec::new()),
    }
}

fn listing_not_found(command: &str) -> LoadError {
    ClientError::NotFound(format!("`{}` reported a missing entity", command)).into()
}

#[async_trait]
impl SymbolLoader for ServerSymbolLoader {
    fn default_cluster(&self) -> &str {
        self.resolver.default_cluster()
    }

    fn cluster_name(&self, cluster: &str) -> Option<String> {
        self.resolver.cluster_name(cluster)
    }

    async fn load_database(
        &self,
        database: &str,
        cluster: &str,
        throw_on_error: bool,
        cancel: &CancellationToken,
    ) -> LoadResult<Option<DatabaseSymbol>> {
        self.ensure_open()?;

        let Some(cluster_name) = self.resolver.cluster_name(cluster) else {
            debug!(cluster = %cluster, "cluster cannot be resolved");
            return Ok(None);
        };

        if self.bad_databases.contains(&cluster_name, database) {
            debug!(cluster = %cluster_name, database = %database, "database known to be missing");
            return Ok(None);
        }

        let policy = self.policy(throw_on_error);
        let Some(client) = self.connect(cluster, policy).await? else {
            return Ok(None);
        };
        let exec = CommandExecutor::new(client.as_ref(), database, policy, cancel);

        // Only the success of the listing matters here.
        match exec
            .scoped("")
            .run::<DatabaseRecord>(commands::SHOW_DATABASES)
            .await?
        {
            Fetch::Found(_) => {}
            Fetch::NotFound if policy.is_strict() => {
                return Err(listing_not_found(commands::SHOW_DATABASES));
            }
            Fetch::NotFound | Fetch::Failed(_) => return Ok(None),
        }

        let tables = match load_tables(&exec).await? {
            Fetch::Found(tables) => tables,
            Fetch::NotFound => {
                self.mark_bad(&cluster_name, database);
                return Ok(None);
            }
            Fetch::Failed(_) => {
                if self.settings.negative_cache_on_failure && !exec.is_cancelled() {
                    self.mark_bad(&cluster_name, database);
                }
                return Ok(None);
            }
        };

        let concurrency = self.settings.follow_up_concurrency;
        let external_tables = category(
            policy,
            commands::SHOW_EXTERNAL_TABLES,
            load_external_tables(&exec, concurrency).await?,
        )?;
        let materialized_views = category(
            policy,
            commands::SHOW_MATERIALIZED_VIEWS,
            load_materialized_views(&exec, concurrency).await?,
        )?;
        let functions = category(
            policy,
            commands::SHOW_FUNCTIONS,
            load_functions(&exec).await?,
        )?;
        let entity_groups = category(
            policy,
            commands::SHOW_ENTITY_GROUPS,
            load_entity_groups(&exec).await?,
        )?;

        if exec.is_cancelled() {
            debug!(cluster = %cluster_name, database = %database, "load cancelled");
            return Ok(None);
        }

        let members: Vec<Member> = tables
            .into_iter()
            .map(Member::from)
            .chain(external_tables.into_iter().map(Member::from))
            .chain(materialized_views.into_iter().map(Member::from))
            .chain(functions.into_iter().map(Member::from))
            .chain(entity_groups.into_iter().map(Member::from))
            .collect();

        debug!(
            cluster = %cluster_name,
            database = %database,
            members = members.len(),
            "loaded database"
        );
        Ok(Some(DatabaseSymbol::new(database, members)))
    }

    async fn list_databases(
        &self,
        cluster: &str,
        throw_on_error: bool,
        cancel: &CancellationToken,
    ) -> LoadResult<Option<Vec<DatabaseName>>> {
        self.ensure_open()?;

        let policy = self.policy(throw_on_error);
        let Some(client) = self.connect(cluster, policy).await? else {
            return Ok(None);
        };
        let exec = CommandExecutor::new(client.as_ref(), "", policy, cancel);

        match exec.run::<DatabaseRecord>(commands::SHOW_DATABASES).await? {
            Fetch::Found(rows) => Ok(Some(rows.into_iter().map(DatabaseName::from).collect())),
            Fetch::NotFound if policy.is_strict() => {
                Err(listing_not_found(commands::SHOW_DATABASES))
            }
            Fetch::NotFound | Fetch::Failed(_) => Ok(None),
        }
    }
}
