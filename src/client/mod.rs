//! Administrative client module.
//!
//! This module provides the clients that carry administrative commands to a
//! cluster endpoint. The wire transport and authentication live in a bridge
//! process; this side only frames requests and decodes the returned tables.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    ClientPool (one per loader)                  │
//! │  data source ──► Arc<dyn AdminClient>   (created lazily)        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    BridgeClient (Async)                         │
//! │  - Spawns the bridge as a child process                         │
//! │  - NDJSON protocol over stdin/stdout                            │
//! │  - Request IDs for concurrent request correlation               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod admin;
mod bridge;
mod error;
mod pool;
pub mod protocol;

pub use admin::{AdminClient, ClientFactory};
pub use bridge::{BridgeClient, BridgeClientFactory};
pub use error::{ClientError, ClientResult};
pub use pool::ClientPool;
pub use protocol::{ResultColumn, ResultSet, ResultTable};
