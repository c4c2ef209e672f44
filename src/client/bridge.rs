//! Async client that executes commands through a bridge process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

use super::admin::{AdminClient, ClientFactory};
use super::error::{ClientError, ClientResult};
use super::protocol::{
    methods, ErrorInfo, ExecuteParams, RequestEnvelope, ResponseEnvelope, ResultSet,
};
use crate::config::{BridgeSettings, ConnectionDescriptor, SettingsError};

/// Default timeout for requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Administrative client backed by a bridge child process.
///
/// The bridge owns the wire transport and authentication for one data source.
/// The client talks to it with NDJSON over stdin/stdout; each request carries
/// a unique ID so concurrent requests can share the pipe.
///
/// # Example
///
/// ```ignore
/// use cluster_schema::client::{AdminClient, BridgeClient};
///
/// let client = BridgeClient::spawn("./cluster-schema-bridge", &descriptor).await?;
/// let result = client.execute("Samples", ".show database Samples schema").await?;
/// client.close().await?;
/// ```
pub struct BridgeClient {
    /// Writer for sending requests to bridge stdin.
    stdin: Arc<Mutex<BufWriter<ChildStdin>>>,

    /// Map of pending request IDs to response channels.
    pending: PendingMap,

    /// Handle to the bridge child process, taken on close.
    child: Mutex<Option<Child>>,

    /// Handle to the background reader task.
    reader_task: tokio::task::JoinHandle<()>,

    /// Request timeout duration.
    timeout: Duration,

    /// Data source this client is bound to.
    data_source: String,

    /// Connection string forwarded with every request.
    connection_string: String,
}

impl BridgeClient {
    /// Spawn a bridge process for the descriptor's data source.
    pub async fn spawn<P: AsRef<Path>>(
        bridge_path: P,
        descriptor: &ConnectionDescriptor,
    ) -> ClientResult<Self> {
        Self::spawn_with_timeout(
            bridge_path,
            descriptor,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .await
    }

    /// Spawn a bridge process with a custom request timeout.
    pub async fn spawn_with_timeout<P: AsRef<Path>>(
        bridge_path: P,
        descriptor: &ConnectionDescriptor,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let mut child = Command::new(bridge_path.as_ref())
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(ClientError::SpawnFailed)?;

        let stdin = child.stdin.take().ok_or_else(|| not_captured("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| not_captured("stdout"))?;

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let reader_task = Self::spawn_reader_task(stdout, pending.clone());

        debug!(data_source = descriptor.data_source(), "spawned bridge process");

        Ok(Self {
            stdin: Arc::new(Mutex::new(BufWriter::new(stdin))),
            pending,
            child: Mutex::new(Some(child)),
            reader_task,
            timeout,
            data_source: descriptor.data_source().to_string(),
            connection_string: descriptor.to_connection_string(),
        })
    }

    /// Route each response line to the request waiting for it.
    ///
    /// When the bridge closes stdout every waiting request is failed with
    /// `BRIDGE_EXITED`.
    fn spawn_reader_task(stdout: ChildStdout, pending: PendingMap) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                        Ok(response) => {
                            if let Some(waiter) = pending.lock().await.remove(&response.id) {
                                let _ = waiter.send(response);
                            }
                        }
                        Err(e) => warn!(error = %e, "bridge: unparseable response line"),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "bridge: read error");
                        break;
                    }
                }
            }

            fail_pending(&pending).await;
        })
    }

    /// Send a request to the bridge and wait for its response.
    async fn request<P, R>(&self, method: &str, params: P) -> ClientResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();

        let request = RequestEnvelope {
            id: id.clone(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(ClientError::SerializeFailed)?,
        };

        let mut line = serde_json::to_string(&request).map_err(ClientError::SerializeFailed)?;
        line.push('\n');

        let (waiter, response) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), waiter);

        if let Err(e) = self.write_line(&line).await {
            self.pending.lock().await.remove(&id);
            return Err(ClientError::WriteFailed(e));
        }

        let response = match tokio::time::timeout(self.timeout, response).await {
            Ok(received) => received?,
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(ClientError::Timeout(self.timeout.as_secs()));
            }
        };

        if response.success {
            let result = response.result.unwrap_or(serde_json::Value::Null);
            serde_json::from_value(result).map_err(ClientError::DeserializeFailed)
        } else {
            let error = response.error.unwrap_or_else(|| ErrorInfo {
                code: "UNKNOWN".to_string(),
                message: "Unknown error".to_string(),
            });
            Err(Self::classify_error(&error.code, &error.message))
        }
    }

    async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut stdin = self.stdin.lock().await;
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await
    }

    /// Classify a bridge error into a more specific error type.
    fn classify_error(code: &str, message: &str) -> ClientError {
        match code {
            "BRIDGE_EXITED" => ClientError::BridgeExited,
            _ => ClientError::remote(code, message),
        }
    }

    /// Check if the bridge is still running.
    pub fn is_alive(&self) -> bool {
        !self.reader_task.is_finished()
    }

    /// Get the current request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl AdminClient for BridgeClient {
    fn data_source(&self) -> &str {
        &self.data_source
    }

    async fn execute(&self, database: &str, command: &str) -> ClientResult<ResultSet> {
        self.request(
            methods::EXECUTE_MGMT,
            ExecuteParams {
                connection_string: self.connection_string.clone(),
                database: database.to_string(),
                command: command.to_string(),
            },
        )
        .await
    }

    async fn close(&self) -> ClientResult<()> {
        let child = self.child.lock().await.take();
        if let Some(mut child) = child {
            child.kill().await.map_err(|source| ClientError::CloseFailed {
                data_source: self.data_source.clone(),
                source,
            })?;
            debug!(data_source = %self.data_source, "bridge process stopped");
        }
        self.reader_task.abort();
        Ok(())
    }
}

async fn fail_pending(pending: &PendingMap) {
    for (id, waiter) in pending.lock().await.drain() {
        let _ = waiter.send(ResponseEnvelope {
            id,
            success: false,
            result: None,
            error: Some(ErrorInfo {
                code: "BRIDGE_EXITED".to_string(),
                message: "bridge process exited".to_string(),
            }),
        });
    }
}

fn not_captured(stream: &str) -> ClientError {
    ClientError::SpawnFailed(std::io::Error::other(format!("{} not captured", stream)))
}

/// Factory that spawns one [`BridgeClient`] per data source.
#[derive(Debug, Clone)]
pub struct BridgeClientFactory {
    path: PathBuf,
    timeout: Duration,
}

impl BridgeClientFactory {
    /// Create a factory for the given bridge executable.
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    /// Create a factory from bridge settings.
    pub fn from_settings(settings: &BridgeSettings) -> Result<Self, SettingsError> {
        let path = settings.resolve_path()?.ok_or(SettingsError::BridgeNotFound)?;
        Ok(Self::new(path, Duration::from_secs(settings.timeout_secs)))
    }

    /// Path of the bridge executable.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ClientFactory for BridgeClientFactory {
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> ClientResult<Arc<dyn AdminClient>> {
        let client: Arc<dyn AdminClient> =
            Arc::new(BridgeClient::spawn_with_timeout(&self.path, descriptor, self.timeout).await?);
        Ok(client)
    }
}
