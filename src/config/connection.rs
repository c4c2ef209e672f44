//! Connection descriptors.
//!
//! A descriptor is parsed from a `Key=Value;` connection string:
//!
//! ```text
//! Data Source=https://help.kusto.windows.net;Initial Catalog=Samples;AAD Federated Security=True
//! ```
//!
//! Keys are case-insensitive and accept the usual aliases. Unknown keys are
//! kept and written back by [`ConnectionDescriptor::to_connection_string`].

use std::fmt;

use url::Url;

/// Error type for connection strings.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Connection string has no data source")]
    MissingDataSource,

    #[error("Malformed connection string segment: {0}")]
    MalformedSegment(String),

    #[error("Invalid data source URI {uri}: {message}")]
    InvalidDataSource { uri: String, message: String },

    #[error("Default domain must start with '.': {0}")]
    InvalidDomain(String),
}

/// Credential fields carried by a descriptor.
///
/// Derived descriptors copy these unchanged from the default descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub federated_security: bool,
    pub user_id: Option<String>,
    pub application_client_id: Option<String>,
    pub application_key: Option<String>,
    pub application_certificate_thumbprint: Option<String>,
    pub authority_id: Option<String>,
    pub user_token: Option<String>,
    pub application_token: Option<String>,
}

/// Known connection string keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    DataSource,
    InitialCatalog,
    FederatedSecurity,
    UserId,
    ApplicationClientId,
    ApplicationKey,
    ApplicationCertificateThumbprint,
    AuthorityId,
    UserToken,
    ApplicationToken,
}

impl Key {
    fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "datasource" | "server" | "addr" | "address" | "networkaddress" => {
                Some(Key::DataSource)
            }
            "initialcatalog" | "database" => Some(Key::InitialCatalog),
            "aadfederatedsecurity" | "fed" | "federated" | "federatedsecurity" => {
                Some(Key::FederatedSecurity)
            }
            "aaduserid" | "userid" | "uid" | "user" => Some(Key::UserId),
            "applicationclientid" | "appclientid" => Some(Key::ApplicationClientId),
            "applicationkey" | "appkey" => Some(Key::ApplicationKey),
            "applicationcertificatethumbprint" | "appcert" => {
                Some(Key::ApplicationCertificateThumbprint)
            }
            "authorityid" | "tenantid" | "authority" => Some(Key::AuthorityId),
            "usertoken" | "usrtoken" => Some(Key::UserToken),
            "applicationtoken" | "apptoken" => Some(Key::ApplicationToken),
            _ => None,
        }
    }

    fn canonical(&self) -> &'static str {
        match self {
            Key::DataSource => "Data Source",
            Key::InitialCatalog => "Initial Catalog",
            Key::FederatedSecurity => "AAD Federated Security",
            Key::UserId => "AAD User ID",
            Key::ApplicationClientId => "Application Client Id",
            Key::ApplicationKey => "Application Key",
            Key::ApplicationCertificateThumbprint => "Application Certificate Thumbprint",
            Key::AuthorityId => "Authority Id",
            Key::UserToken => "User Token",
            Key::ApplicationToken => "Application Token",
        }
    }
}

/// Identifies one physical endpoint plus the credentials used to reach it.
///
/// Immutable once built; use [`ConnectionDescriptor::derive`] to point the same
/// credentials at another data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    data_source: String,
    initial_catalog: String,
    credentials: Credentials,
    extra: Vec<(String, String)>,
}

impl ConnectionDescriptor {
    /// Create a descriptor for a data source with no credentials.
    pub fn new(data_source: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            initial_catalog: String::new(),
            credentials: Credentials::default(),
            extra: Vec::new(),
        }
    }

    /// Set the initial catalog.
    pub fn with_initial_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.initial_catalog = catalog.into();
        self
    }

    /// Set the credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Parse a `Key=Value;` connection string.
    ///
    /// A bare URI (no `=`) is accepted as the data source.
    pub fn parse(connection_string: &str) -> Result<Self, ConnectionError> {
        let trimmed = connection_string.trim();
        if !trimmed.contains('=') {
            if trimmed.is_empty() {
                return Err(ConnectionError::MissingDataSource);
            }
            return Ok(Self::new(trimmed.trim_end_matches('/')));
        }

        let mut descriptor = Self::new(String::new());

        for segment in trimmed.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionError::MalformedSegment(segment.to_string()))?;
            let value = value.trim().to_string();

            match Key::parse(name) {
                Some(Key::DataSource) => {
                    descriptor.data_source = value.trim_end_matches('/').to_string()
                }
                Some(Key::InitialCatalog) => descriptor.initial_catalog = value,
                Some(Key::FederatedSecurity) => {
                    descriptor.credentials.federated_security = parse_bool(&value)
                }
                Some(Key::UserId) => descriptor.credentials.user_id = Some(value),
                Some(Key::ApplicationClientId) => {
                    descriptor.credentials.application_client_id = Some(value)
                }
                Some(Key::ApplicationKey) => descriptor.credentials.application_key = Some(value),
                Some(Key::ApplicationCertificateThumbprint) => {
                    descriptor.credentials.application_certificate_thumbprint = Some(value)
                }
                Some(Key::AuthorityId) => descriptor.credentials.authority_id = Some(value),
                Some(Key::UserToken) => descriptor.credentials.user_token = Some(value),
                Some(Key::ApplicationToken) => {
                    descriptor.credentials.application_token = Some(value)
                }
                None => descriptor.extra.push((name.trim().to_string(), value)),
            }
        }

        if descriptor.data_source.is_empty() {
            return Err(ConnectionError::MissingDataSource);
        }

        if descriptor.data_source.contains("://") {
            Url::parse(&descriptor.data_source).map_err(|e| ConnectionError::InvalidDataSource {
                uri: descriptor.data_source.clone(),
                message: e.to_string(),
            })?;
        }

        Ok(descriptor)
    }

    /// Build a descriptor for another data source with the same credentials.
    pub fn derive(&self, data_source: impl Into<String>, initial_catalog: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            initial_catalog: initial_catalog.into(),
            credentials: self.credentials.clone(),
            extra: self.extra.clone(),
        }
    }

    /// The data source URI.
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    /// The initial catalog (database).
    pub fn initial_catalog(&self) -> &str {
        &self.initial_catalog
    }

    /// The credential fields.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Identity used to share clients between descriptors.
    pub fn data_source_key(&self) -> String {
        self.data_source.trim_end_matches('/').to_lowercase()
    }

    /// The URI scheme of the data source, `https` when it has none.
    pub fn scheme(&self) -> String {
        match Url::parse(&self.data_source) {
            Ok(url) if self.data_source.contains("://") => url.scheme().to_string(),
            _ => "https".to_string(),
        }
    }

    /// The host component of the data source.
    pub fn host(&self) -> Option<String> {
        host_of(&self.data_source)
    }

    /// Render the connection string, secrets included.
    pub fn to_connection_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, redact: bool) -> String {
        let mut parts = vec![format!("{}={}", Key::DataSource.canonical(), self.data_source)];

        if !self.initial_catalog.is_empty() {
            parts.push(format!(
                "{}={}",
                Key::InitialCatalog.canonical(),
                self.initial_catalog
            ));
        }

        let c = &self.credentials;
        if c.federated_security {
            parts.push(format!("{}=True", Key::FederatedSecurity.canonical()));
        }

        let fields = [
            (Key::UserId, &c.user_id, false),
            (Key::ApplicationClientId, &c.application_client_id, false),
            (Key::ApplicationKey, &c.application_key, true),
            (
                Key::ApplicationCertificateThumbprint,
                &c.application_certificate_thumbprint,
                false,
            ),
            (Key::AuthorityId, &c.authority_id, false),
            (Key::UserToken, &c.user_token, true),
            (Key::ApplicationToken, &c.application_token, true),
        ];

        for (key, value, secret) in fields {
            if let Some(value) = value {
                let shown = if redact && secret { "****" } else { value.as_str() };
                parts.push(format!("{}={}", key.canonical(), shown));
            }
        }

        for (name, value) in &self.extra {
            parts.push(format!("{}={}", name, value));
        }

        parts.join(";")
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

impl std::str::FromStr for ConnectionDescriptor {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1")
}

/// Extract the host component of a URI or bare host name.
pub(crate) fn host_of(uri: &str) -> Option<String> {
    let uri = uri.trim();
    if uri.is_empty() {
        return None;
    }
    if uri.contains("://") {
        Url::parse(uri)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    } else {
        let host = uri.split(['/', ':']).next().unwrap_or(uri);
        Some(host.to_lowercase())
    }
}
