// tests/loader/list_databases_test.rs
#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use cluster_schema::client::{ClientError, ResultTable};
use cluster_schema::loader::{DatabaseName, LoadError, SymbolLoader, SymbolLoaderExt};
use cluster_schema::ServerSymbolLoader;
use common::*;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_list_databases() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let (loader, _factory) = loader(&cluster);

    let databases = loader
        .list_databases("", false, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        databases,
        vec![
            DatabaseName {
                name: "Samples".to_string(),
                pretty_name: Some("Sample Data".to_string()),
            },
            DatabaseName {
                name: "Logs".to_string(),
                pretty_name: None,
            },
        ]
    );
    assert_eq!(cluster.commands(), vec![SHOW_DATABASES]);
}

#[tokio::test]
async fn test_list_databases_is_not_cached() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let (loader, factory) = loader(&cluster);
    let cancel = CancellationToken::new();

    loader.list_databases("", false, &cancel).await.unwrap();
    loader.list_databases("", false, &cancel).await.unwrap();

    assert_eq!(cluster.call_count(), 2);
    assert_eq!(factory.connects(), 1);
}

#[tokio::test]
async fn test_list_databases_failure_by_policy() {
    let cluster = MockCluster::new();
    cluster.fail(SHOW_DATABASES, "Unauthorized", "denied");
    let (loader, _factory) = loader(&cluster);
    let cancel = CancellationToken::new();

    let lenient = loader.list_databases("", false, &cancel).await.unwrap();
    assert!(lenient.is_none());

    let strict = loader.list_databases("", true, &cancel).await;
    assert!(matches!(
        strict,
        Err(LoadError::Client(ClientError::Remote { ref code, .. })) if code == "Unauthorized"
    ));
}

#[tokio::test]
async fn test_list_databases_not_found_by_policy() {
    let cluster = MockCluster::new();
    cluster.fail(SHOW_DATABASES, "EntityNotFound", "cluster not found");
    let (loader, _factory) = loader(&cluster);
    let cancel = CancellationToken::new();

    assert!(loader.list_databases("", false, &cancel).await.unwrap().is_none());
    assert!(matches!(
        loader.list_databases("", true, &cancel).await,
        Err(LoadError::Client(ClientError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_list_databases_unresolvable_cluster() {
    let cluster = MockCluster::new();
    let (loader, factory) = loader(&cluster);

    let result = loader
        .list_databases(" \t", true, &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(factory.connects(), 0);
}

#[tokio::test]
async fn test_load_cluster_skips_databases_that_do_not_load() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    cluster.fail(".show database Logs schema", "DatabaseNotFound", "gone");
    let (loader, _factory) = loader(&cluster);

    let symbol = loader
        .load_cluster("", false, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(symbol.name, DEFAULT_CLUSTER);
    assert_eq!(symbol.databases.len(), 1);
    assert!(symbol.database("Samples").is_some());
    assert!(loader.is_known_bad("", "Logs"));
}

#[tokio::test]
async fn test_load_databases_batch() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    cluster.fail(".show database Gone schema", "DatabaseNotFound", "gone");
    let (loader, _factory) = loader(&cluster);

    let names = vec!["Gone".to_string(), "Samples".to_string()];
    let loaded = loader
        .load_databases(&names, "", false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Samples");
}

#[tokio::test]
async fn test_shutdown_releases_clients() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let (loader, factory) = loader(&cluster);
    let cancel = CancellationToken::new();

    loader.list_databases("", false, &cancel).await.unwrap();
    loader.list_databases("other", false, &cancel).await.unwrap();
    assert_eq!(loader.client_count().await, 2);

    loader.shutdown().await.unwrap();

    assert!(factory.clients().iter().all(|c| c.is_closed()));
    assert_eq!(loader.client_count().await, 0);
    assert!(matches!(
        loader.load_database("Samples", "", false, &cancel).await,
        Err(LoadError::Closed)
    ));
}

#[tokio::test]
async fn test_shutdown_propagates_close_failure() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let factory = MockFactory::failing_close(cluster.clone());
    let loader = ServerSymbolLoader::new(resolver(), factory.clone());
    let cancel = CancellationToken::new();

    loader.list_databases("", false, &cancel).await.unwrap();
    loader.list_databases("other", false, &cancel).await.unwrap();

    let err = loader.shutdown().await.unwrap_err();
    assert!(matches!(err, LoadError::Client(ClientError::CloseFailed { .. })));

    // Every client was still closed.
    assert_eq!(factory.clients().len(), 2);
    assert!(factory.clients().iter().all(|c| c.is_closed()));
    assert!(loader.is_closed());
}

#[tokio::test]
async fn test_loader_as_trait_object() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    cluster.respond_table(
        ".show database Logs schema",
        ResultTable::new(&["TableName", "ColumnName", "ColumnType"])
            .with_row(&["Requests", "Url", "string"]),
    );
    let (loader, _factory) = loader(&cluster);
    let loader: Arc<dyn SymbolLoader> = Arc::new(loader);

    assert_eq!(loader.default_cluster(), DEFAULT_CLUSTER);
    assert_eq!(loader.cluster_name("bar").as_deref(), Some("bar.kusto.windows.net"));

    let symbol = loader
        .load_cluster("", false, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(symbol.databases.len(), 2);
}
