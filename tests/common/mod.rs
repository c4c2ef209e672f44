//! Shared fixtures for loader integration tests.
//!
//! `MockCluster` answers administrative commands from a script that tests can
//! change between calls, and records every command it receives.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cluster_schema::client::{
    AdminClient, ClientError, ClientFactory, ClientResult, ResultSet, ResultTable,
};
use cluster_schema::config::{ConnectionDescriptor, EndpointResolver, LoaderSettings};
use cluster_schema::ServerSymbolLoader;

pub const DEFAULT_SOURCE: &str = "https://help.kusto.windows.net";
pub const DEFAULT_CLUSTER: &str = "help.kusto.windows.net";

#[derive(Clone)]
enum Reply {
    Result(ResultSet),
    Error { code: String, message: String },
    Hang,
}

/// A command as received by a mock client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub data_source: String,
    pub database: String,
    pub command: String,
}

#[derive(Default)]
pub struct MockCluster {
    script: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl MockCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, command: &str, result: ResultSet) {
        self.script
            .lock()
            .unwrap()
            .insert(command.to_string(), Reply::Result(result));
    }

    pub fn respond_table(&self, command: &str, table: ResultTable) {
        self.respond(command, ResultSet::single(table));
    }

    pub fn fail(&self, command: &str, code: &str, message: &str) {
        self.script.lock().unwrap().insert(
            command.to_string(),
            Reply::Error {
                code: code.to_string(),
                message: message.to_string(),
            },
        );
    }

    pub fn hang(&self, command: &str) {
        self.script
            .lock()
            .unwrap()
            .insert(command.to_string(), Reply::Hang);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn answer(&self, call: Call) -> ClientResult<ResultSet> {
        let reply = self.script.lock().unwrap().get(&call.command).cloned();
        self.calls.lock().unwrap().push(call.clone());

        match reply {
            Some(Reply::Result(result)) => Ok(result),
            Some(Reply::Error { code, message }) => Err(ClientError::remote(code, message)),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(ClientError::remote("BadRequest", call.command)),
        }
    }
}

pub struct MockClient {
    data_source: String,
    cluster: Arc<MockCluster>,
    fail_close: bool,
    closed: AtomicBool,
}

impl MockClient {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdminClient for MockClient {
    fn data_source(&self) -> &str {
        &self.data_source
    }

    async fn execute(&self, database: &str, command: &str) -> ClientResult<ResultSet> {
        self.cluster
            .answer(Call {
                data_source: self.data_source.clone(),
                database: database.to_string(),
                command: command.to_string(),
            })
            .await
    }

    async fn close(&self) -> ClientResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close {
            return Err(ClientError::CloseFailed {
                data_source: self.data_source.clone(),
                source: std::io::Error::other("bridge already gone"),
            });
        }
        Ok(())
    }
}

/// Creates mock clients that share one scripted cluster.
pub struct MockFactory {
    cluster: Arc<MockCluster>,
    connects: AtomicUsize,
    descriptors: Mutex<Vec<ConnectionDescriptor>>,
    clients: Mutex<Vec<Arc<MockClient>>>,
    fail_close: bool,
}

impl MockFactory {
    pub fn new(cluster: Arc<MockCluster>) -> Arc<Self> {
        Arc::new(Self::build(cluster, false))
    }

    pub fn failing_close(cluster: Arc<MockCluster>) -> Arc<Self> {
        Arc::new(Self::build(cluster, true))
    }

    fn build(cluster: Arc<MockCluster>, fail_close: bool) -> Self {
        Self {
            cluster,
            connects: AtomicUsize::new(0),
            descriptors: Mutex::new(Vec::new()),
            clients: Mutex::new(Vec::new()),
            fail_close,
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn descriptors(&self) -> Vec<ConnectionDescriptor> {
        self.descriptors.lock().unwrap().clone()
    }

    pub fn clients(&self) -> Vec<Arc<MockClient>> {
        self.clients.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> ClientResult<Arc<dyn AdminClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.descriptors.lock().unwrap().push(descriptor.clone());

        let client = Arc::new(MockClient {
            data_source: descriptor.data_source().to_string(),
            cluster: self.cluster.clone(),
            fail_close: self.fail_close,
            closed: AtomicBool::new(false),
        });
        self.clients.lock().unwrap().push(client.clone());

        let client: Arc<dyn AdminClient> = client;
        Ok(client)
    }
}

pub fn resolver() -> EndpointResolver {
    EndpointResolver::new(ConnectionDescriptor::new(DEFAULT_SOURCE), None).unwrap()
}

pub fn loader(cluster: &Arc<MockCluster>) -> (ServerSymbolLoader, Arc<MockFactory>) {
    loader_with(cluster, LoaderSettings::default())
}

pub fn loader_with(
    cluster: &Arc<MockCluster>,
    settings: LoaderSettings,
) -> (ServerSymbolLoader, Arc<MockFactory>) {
    let factory = MockFactory::new(cluster.clone());
    let loader = ServerSymbolLoader::new(resolver(), factory.clone()).with_settings(settings);
    (loader, factory)
}

pub const SHOW_DATABASES: &str = ".show databases";
pub const SAMPLES_SCHEMA: &str = ".show database Samples schema";
pub const SHOW_EXTERNAL_TABLES: &str = ".show external tables";
pub const EXT_LOGS_SCHEMA: &str = ".show external table ExtLogs cslschema";
pub const EXT_MISSING_SCHEMA: &str = ".show external table ExtMissing cslschema";
pub const SHOW_VIEWS: &str = ".show materialized-views";
pub const DAILY_STORMS_SCHEMA: &str = ".show materialized-view DailyStorms cslschema";
pub const SHOW_FUNCTIONS: &str = ".show functions";
pub const SHOW_ENTITY_GROUPS: &str = ".show entity_groups";

/// Script the `Samples` database with one member of every kind.
pub fn script_samples(cluster: &MockCluster) {
    cluster.respond_table(
        SHOW_DATABASES,
        ResultTable::new(&["DatabaseName", "PrettyName"])
            .with_row(&["Samples", "Sample Data"])
            .with_row(&["Logs", ""]),
    );

    cluster.respond_table(
        SAMPLES_SCHEMA,
        ResultTable::new(&[
            "DatabaseName",
            "TableName",
            "ColumnName",
            "ColumnType",
            "DocString",
            "Folder",
        ])
        .with_row(&["Samples", "StormEvents", "StartTime", "System.DateTime", "", "Weather"])
        .with_row(&["Samples", "Users", "Id", "System.Int64", "", ""])
        .with_row(&["Samples", "StormEvents", "", "", "Storm events", "Weather"])
        .with_row(&["Samples", "StormEvents", "State", "System.String", "US state", "Weather"]),
    );

    cluster.respond_table(
        SHOW_EXTERNAL_TABLES,
        ResultTable::new(&["TableName", "TableType", "Folder", "DocString"])
            .with_row(&["ExtLogs", "Blob", "", ""])
            .with_row(&["ExtMissing", "Blob", "", ""]),
    );
    cluster.respond_table(
        EXT_LOGS_SCHEMA,
        ResultTable::new(&["TableName", "Schema", "DatabaseName", "Folder", "DocString"])
            .with_row(&["ExtLogs", "Path:string, Size:long", "Samples", "", ""]),
    );
    cluster.respond_table(
        EXT_MISSING_SCHEMA,
        ResultTable::new(&["TableName", "Schema", "DatabaseName", "Folder", "DocString"]),
    );

    cluster.respond_table(
        SHOW_VIEWS,
        ResultTable::new(&["Name", "SourceTable", "Query", "Folder", "DocString"]).with_row(&[
            "DailyStorms",
            "StormEvents",
            "StormEvents\n| summarize Count=count() by Day=bin(StartTime, 1d)",
            "",
            "",
        ]),
    );
    cluster.respond_table(
        DAILY_STORMS_SCHEMA,
        ResultTable::new(&["Name", "Schema"]).with_row(&["DailyStorms", "Day:datetime, Count:long"]),
    );

    cluster.respond_table(
        SHOW_FUNCTIONS,
        ResultTable::new(&["Name", "Parameters", "Body", "Folder", "DocString"]).with_row(&[
            "TopStates",
            "(n:long)",
            "{ StormEvents | summarize count() by State | top n by count_ }",
            "",
            "top n states",
        ]),
    );

    cluster.respond_table(
        SHOW_ENTITY_GROUPS,
        ResultTable::new(&["Name", "Entities"])
            .with_row(&["Regional", "[database('Samples'), database('Logs')]"]),
    );
}

/// Commands a full load of `Samples` issues, in order.
pub fn samples_commands() -> Vec<&'static str> {
    vec![
        SHOW_DATABASES,
        SAMPLES_SCHEMA,
        SHOW_EXTERNAL_TABLES,
        EXT_LOGS_SCHEMA,
        EXT_MISSING_SCHEMA,
        SHOW_VIEWS,
        DAILY_STORMS_SCHEMA,
        SHOW_FUNCTIONS,
        SHOW_ENTITY_GROUPS,
    ]
}
