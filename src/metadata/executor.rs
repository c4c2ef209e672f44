//! Command execution with explicit failure outcomes.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::records::{decode, Record};
use crate::client::{AdminClient, ClientError, ClientResult};

/// Outcome of one administrative command.
///
/// `NotFound` is the server saying the entity is absent; `Failed` is every
/// other failure that the caller chose to tolerate.
#[derive(Debug)]
pub enum Fetch<T> {
    Found(T),
    NotFound,
    Failed(ClientError),
}

impl<T> Fetch<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetch<U> {
        match self {
            Fetch::Found(value) => Fetch::Found(f(value)),
            Fetch::NotFound => Fetch::NotFound,
            Fetch::Failed(e) => Fetch::Failed(e),
        }
    }

    /// The found value, or the non-found outcome retyped for the caller.
    pub fn into_found<U>(self) -> Result<T, Fetch<U>> {
        match self {
            Fetch::Found(value) => Ok(value),
            Fetch::NotFound => Err(Fetch::NotFound),
            Fetch::Failed(e) => Err(Fetch::Failed(e)),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Fetch::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Fetch::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Fetch::NotFound)
    }
}

/// What to do with a command failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Propagate the failure as an error.
    Strict,
    /// Log it and report it as [`Fetch::Failed`].
    #[default]
    Lenient,
}

impl FailurePolicy {
    pub fn from_throw_on_error(throw_on_error: bool) -> Self {
        if throw_on_error {
            FailurePolicy::Strict
        } else {
            FailurePolicy::Lenient
        }
    }

    pub fn is_strict(self) -> bool {
        self == FailurePolicy::Strict
    }
}

/// Runs commands against one database through one client.
#[derive(Clone, Copy)]
pub struct CommandExecutor<'a> {
    client: &'a dyn AdminClient,
    database: &'a str,
    policy: FailurePolicy,
    cancel: &'a CancellationToken,
}

impl<'a> CommandExecutor<'a> {
    /// An empty `database` scopes commands to the connection's initial catalog.
    pub fn new(
        client: &'a dyn AdminClient,
        database: &'a str,
        policy: FailurePolicy,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            client,
            database,
            policy,
            cancel,
        }
    }

    pub fn database(&self) -> &'a str {
        self.database
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Same client and policy, scoped to another database.
    pub fn scoped(&self, database: &'a str) -> Self {
        Self {
            database,
            ..*self
        }
    }

    /// Execute `command` and decode its primary table as `R` rows.
    ///
    /// Strict policy turns failures into `Err`; not-found outcomes are
    /// returned as [`Fetch::NotFound`] under either policy.
    pub async fn run<R: Record>(&self, command: &str) -> ClientResult<Fetch<Vec<R>>> {
        debug!(
            data_source = %self.client.data_source(),
            database = %self.database,
            command = %command,
            "executing command"
        );

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled(command.to_string())),
            result = self.client.execute(self.database, command) => result,
        };

        match outcome.and_then(|set| decode::<R>(command, &set)) {
            Ok(records) => Ok(Fetch::Found(records)),
            Err(e) if e.is_not_found() => {
                debug!(command = %command, error = %e, "entity not found");
                Ok(Fetch::NotFound)
            }
            Err(e) => Ok(Fetch::Failed(self.tolerate(command, e)?)),
        }
    }

    /// Apply the policy to a failure: strict returns it as `Err`, lenient
    /// logs it and hands it back.
    pub fn tolerate(&self, command: &str, error: ClientError) -> ClientResult<ClientError> {
        match self.policy {
            FailurePolicy::Strict => Err(error),
            FailurePolicy::Lenient => {
                warn!(
                    data_source = %self.client.data_source(),
                    database = %self.database,
                    command = %command,
                    error = %error,
                    "command failed; continuing without result"
                );
                Ok(error)
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
