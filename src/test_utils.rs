//! Scripted administrative client for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{AdminClient, ClientError, ClientResult, ResultSet};

enum Scripted {
    Result(ResultSet),
    Error { code: String, message: String },
    Pending,
}

/// Answers commands from a fixed script and records every command it sees.
pub struct ScriptedClient {
    data_source: String,
    script: HashMap<String, Scripted>,
    commands: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            data_source: "https://test.kusto.windows.net".to_string(),
            script: HashMap::new(),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(mut self, command: &str, result: ResultSet) -> Self {
        self.script
            .insert(command.to_string(), Scripted::Result(result));
        self
    }

    pub fn fail(mut self, command: &str, code: &str, message: &str) -> Self {
        self.script.insert(
            command.to_string(),
            Scripted::Error {
                code: code.to_string(),
                message: message.to_string(),
            },
        );
        self
    }

    /// The command never completes.
    pub fn hang(mut self, command: &str) -> Self {
        self.script.insert(command.to_string(), Scripted::Pending);
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdminClient for ScriptedClient {
    fn data_source(&self) -> &str {
        &self.data_source
    }

    async fn execute(&self, _database: &str, command: &str) -> ClientResult<ResultSet> {
        self.commands.lock().unwrap().push(command.to_string());
        match self.script.get(command) {
            Some(Scripted::Result(result)) => Ok(result.clone()),
            Some(Scripted::Error { code, message }) => {
                Err(ClientError::remote(code.clone(), message.clone()))
            }
            Some(Scripted::Pending) => std::future::pending().await,
            None => Err(ClientError::remote("Unscripted", command)),
        }
    }

    async fn close(&self) -> ClientResult<()> {
        Ok(())
    }
}
