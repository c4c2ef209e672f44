//! Configuration module.
//!
//! Handles connection descriptors, endpoint resolution, and settings.

mod connection;
mod resolver;
mod settings;

pub use connection::{ConnectionDescriptor, ConnectionError, Credentials};
pub use resolver::{EndpointResolver, ADMIN_DATABASE, DEFAULT_DOMAIN};
pub use settings::{
    expand_env_vars, BridgeSettings, ConnectionSettings, LoaderSettings, Settings, SettingsError,
};
