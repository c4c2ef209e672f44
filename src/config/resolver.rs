//! Endpoint resolution.
//!
//! Turns a short cluster name or full URI into a connection descriptor that
//! inherits the default connection's credentials.

use std::sync::Arc;

use url::Url;

use super::connection::{host_of, ConnectionDescriptor, ConnectionError};

/// Domain appended to short host names when none is configured.
pub const DEFAULT_DOMAIN: &str = ".kusto.windows.net";

/// Catalog used by derived descriptors for cross-database control commands.
pub const ADMIN_DATABASE: &str = "NetDefaultDB";

/// Resolves cluster identifiers against a default connection.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    default_connection: Arc<ConnectionDescriptor>,
    default_cluster: String,
    default_domain: String,
    admin_database: String,
}

impl EndpointResolver {
    /// Create a resolver for the default connection and domain suffix.
    ///
    /// `default_domain` must start with `.`; `None` uses [`DEFAULT_DOMAIN`].
    pub fn new(
        default_connection: ConnectionDescriptor,
        default_domain: Option<&str>,
    ) -> Result<Self, ConnectionError> {
        let default_domain = default_domain.unwrap_or(DEFAULT_DOMAIN);
        if !default_domain.starts_with('.') {
            return Err(ConnectionError::InvalidDomain(default_domain.to_string()));
        }

        let default_cluster = default_connection
            .host()
            .ok_or(ConnectionError::MissingDataSource)?;

        Ok(Self {
            default_connection: Arc::new(default_connection),
            default_cluster,
            default_domain: default_domain.to_string(),
            admin_database: ADMIN_DATABASE.to_string(),
        })
    }

    /// Override the catalog used by derived descriptors.
    pub fn with_admin_database(mut self, admin_database: impl Into<String>) -> Self {
        self.admin_database = admin_database.into();
        self
    }

    /// The default connection.
    pub fn default_connection(&self) -> &Arc<ConnectionDescriptor> {
        &self.default_connection
    }

    /// Host name of the default connection.
    pub fn default_cluster(&self) -> &str {
        &self.default_cluster
    }

    /// Domain suffix applied to short host names.
    pub fn default_domain(&self) -> &str {
        &self.default_domain
    }

    /// Canonical cluster name (fully qualified host) for an identifier.
    ///
    /// Empty identifiers mean the default cluster. Blank or unparsable
    /// identifiers return `None`.
    pub fn cluster_name(&self, cluster: &str) -> Option<String> {
        if cluster.is_empty() {
            return Some(self.default_cluster.clone());
        }
        if cluster.trim().is_empty() {
            return None;
        }
        host_of(&self.full_host_uri(cluster)?)
    }

    /// Resolve an identifier to a connection descriptor.
    ///
    /// The default cluster resolves to the shared default descriptor itself.
    /// Any other cluster gets a new descriptor with the default credentials,
    /// a fully qualified data source, and the administrative catalog.
    pub fn resolve(&self, cluster: &str) -> Option<Arc<ConnectionDescriptor>> {
        if cluster.is_empty() || cluster == self.default_cluster {
            return Some(self.default_connection.clone());
        }
        if cluster.trim().is_empty() {
            return None;
        }

        let data_source = self.full_host_uri(cluster)?;
        Some(Arc::new(
            self.default_connection
                .derive(data_source, self.admin_database.clone()),
        ))
    }

    /// Add the default scheme and qualify the host with the default domain.
    pub fn full_host_uri(&self, cluster: &str) -> Option<String> {
        let cluster = cluster.trim();
        let uri = if cluster.contains("://") {
            cluster.to_string()
        } else {
            format!("{}://{}", self.default_connection.scheme(), cluster)
        };

        let mut url = Url::parse(&uri).ok()?;
        let host = url.host_str()?.to_string();

        if needs_domain(&host) {
            let qualified = format!("{}{}", host, self.default_domain);
            url.set_host(Some(&qualified)).ok()?;
        }

        let rendered = url.to_string();
        if url.path() == "/" && url.query().is_none() && url.fragment().is_none() {
            Some(rendered.trim_end_matches('/').to_string())
        } else {
            Some(rendered)
        }
    }
}

fn needs_domain(host: &str) -> bool {
    !host.contains('.')
        && !host.starts_with('[')
        && !host.eq_ignore_ascii_case("localhost")
}
