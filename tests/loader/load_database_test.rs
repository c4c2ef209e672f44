// tests/loader/load_database_test.rs
#[path = "../common/mod.rs"]
mod common;

use cluster_schema::client::{ClientError, ResultTable};
use cluster_schema::config::LoaderSettings;
use cluster_schema::loader::{LoadError, SymbolLoader};
use cluster_schema::symbols::{Member, MemberKind, ScalarType};
use common::*;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_load_complete_database() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let (loader, _factory) = loader(&cluster);

    let db = loader
        .load_database("Samples", "", false, &CancellationToken::new())
        .await
        .unwrap()
        .expect("database should load");

    assert_eq!(db.name, "Samples");
    assert_eq!(
        db.member_names(),
        vec!["StormEvents", "Users", "ExtLogs", "DailyStorms", "TopStates", "Regional"]
    );

    let storm = db.tables().next().unwrap();
    assert_eq!(storm.columns.len(), 2);
    assert_eq!(storm.description.as_deref(), Some("Storm events"));
    assert_eq!(storm.folder.as_deref(), Some("Weather"));
    assert_eq!(storm.column("State").unwrap().description.as_deref(), Some("US state"));

    match db.member("DailyStorms") {
        Some(Member::MaterializedView(view)) => {
            assert!(view.query.starts_with("StormEvents"));
            assert_eq!(view.columns[0].column_type, ScalarType::DateTime);
        }
        other => panic!("expected materialized view, got {:?}", other),
    }

    insta::assert_snapshot!(db.to_schema_text(), @r"
    database Samples
      table StormEvents (StartTime:datetime, State:string)  // Storm events
      table Users (Id:long)
      external table ExtLogs (Path:string, Size:long)
      materialized view DailyStorms (Day:datetime, Count:long) = StormEvents | summarize Count=count() by Day=bin(StartTime, 1d)
      function TopStates(n:long)  // top n states
      entity group Regional [database('Samples'), database('Logs')]
    ");
}

#[tokio::test]
async fn test_commands_issued_in_assembler_order() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let (loader, _factory) = loader(&cluster);

    loader
        .load_database("Samples", "", false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(cluster.commands(), samples_commands());

    let calls = cluster.calls();
    assert!(calls.iter().all(|c| c.data_source == DEFAULT_SOURCE));
    assert_eq!(calls[0].database, "");
    assert!(calls[1..].iter().all(|c| c.database == "Samples"));
}

#[tokio::test]
async fn test_repeated_loads_are_identical_and_reuse_client() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let (loader, factory) = loader(&cluster);
    let cancel = CancellationToken::new();

    let first = loader.load_database("Samples", "", false, &cancel).await.unwrap();
    let second = loader.load_database("Samples", "", false, &cancel).await.unwrap();

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(
        first.unwrap().to_schema_text(),
        second.unwrap().to_schema_text()
    );
    assert_eq!(factory.connects(), 1);
}

#[tokio::test]
async fn test_concurrent_loads_share_one_client() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let (loader, factory) = loader(&cluster);
    let cancel = CancellationToken::new();

    let (samples, again, by_short_name) = tokio::join!(
        loader.load_database("Samples", "", false, &cancel),
        loader.load_database("Samples", "", false, &cancel),
        loader.load_database("Samples", "help", false, &cancel)
    );

    let samples = samples.unwrap().unwrap();
    assert_eq!(Some(&samples), again.unwrap().as_ref());
    assert_eq!(Some(&samples), by_short_name.unwrap().as_ref());
    assert_eq!(factory.connects(), 1);
    assert_eq!(loader.client_count().await, 1);
}

#[tokio::test]
async fn test_follow_up_concurrency_keeps_listing_order() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    cluster.respond_table(
        SHOW_EXTERNAL_TABLES,
        ResultTable::new(&["TableName"])
            .with_row(&["ExtLogs"])
            .with_row(&["ExtMissing"])
            .with_row(&["ExtMetrics"]),
    );
    cluster.respond_table(
        ".show external table ExtMetrics cslschema",
        ResultTable::new(&["Schema"]).with_row(&["Name:string, Value:real"]),
    );
    let cancel = CancellationToken::new();

    let (sequential, _) = loader(&cluster);
    let (parallel, _) = loader_with(
        &cluster,
        LoaderSettings {
            follow_up_concurrency: 4,
            ..LoaderSettings::default()
        },
    );

    let a = sequential.load_database("Samples", "", false, &cancel).await.unwrap().unwrap();
    let b = parallel.load_database("Samples", "", false, &cancel).await.unwrap().unwrap();

    assert_eq!(a, b);
    let external: Vec<&str> = b
        .members_of(MemberKind::ExternalTable)
        .map(Member::name)
        .collect();
    assert_eq!(external, vec!["ExtLogs", "ExtMetrics"]);
}

#[tokio::test]
async fn test_non_table_failures_leave_category_empty() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    cluster.fail(SHOW_FUNCTIONS, "InternalServiceError", "boom");
    cluster.fail(SHOW_VIEWS, "Throttled", "try later");
    let (loader, _factory) = loader(&cluster);

    let db = loader
        .load_database("Samples", "", false, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(db.members_of(MemberKind::Function).count(), 0);
    assert_eq!(db.members_of(MemberKind::MaterializedView).count(), 0);
    assert_eq!(
        db.member_names(),
        vec!["StormEvents", "Users", "ExtLogs", "Regional"]
    );
    // Later steps still ran after the failures.
    assert!(cluster.commands().contains(&SHOW_ENTITY_GROUPS.to_string()));
}

#[tokio::test]
async fn test_strict_mode_propagates_any_command_failure() {
    for failing in samples_commands() {
        let cluster = MockCluster::new();
        script_samples(&cluster);
        cluster.fail(failing, "InternalServiceError", "boom");
        let (loader, _factory) = loader(&cluster);

        let result = loader
            .load_database("Samples", "", true, &CancellationToken::new())
            .await;
        assert!(
            matches!(result, Err(LoadError::Client(_))),
            "failure of `{}` should propagate, got {:?}",
            failing,
            result
        );
    }
}

#[tokio::test]
async fn test_strict_mode_propagates_listing_not_found() {
    let listings = [
        SHOW_DATABASES,
        SHOW_EXTERNAL_TABLES,
        SHOW_VIEWS,
        SHOW_FUNCTIONS,
        SHOW_ENTITY_GROUPS,
    ];

    for failing in listings {
        let cluster = MockCluster::new();
        script_samples(&cluster);
        cluster.fail(failing, "DatabaseNotFound", "database 'Samples' not found");
        let (loader, _factory) = loader(&cluster);

        let result = loader
            .load_database("Samples", "", true, &CancellationToken::new())
            .await;
        assert!(
            matches!(result, Err(LoadError::Client(ClientError::NotFound(_)))),
            "not-found from `{}` should propagate, got {:?}",
            failing,
            result
        );
        assert!(!loader.is_known_bad("", "Samples"));
    }
}

#[tokio::test]
async fn test_strict_mode_omits_object_dropped_before_describe() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    cluster.fail(DAILY_STORMS_SCHEMA, "EntityNotFound", "view 'DailyStorms' not found");
    let (loader, _factory) = loader(&cluster);

    let db = loader
        .load_database("Samples", "", true, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert!(db.member("DailyStorms").is_none());
    assert_eq!(db.members_of(MemberKind::MaterializedView).count(), 0);
}

#[tokio::test]
async fn test_strict_mode_still_omits_empty_describes() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let (loader, _factory) = loader(&cluster);

    let db = loader
        .load_database("Samples", "", true, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert!(db.member("ExtMissing").is_none());
}

#[tokio::test]
async fn test_listing_failure_aborts_load() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    cluster.fail(SHOW_DATABASES, "Unauthorized", "denied");
    let (loader, _factory) = loader(&cluster);

    let result = loader
        .load_database("Samples", "", false, &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(cluster.commands(), vec![SHOW_DATABASES]);
    assert!(!loader.is_known_bad("", "Samples"));
}

#[tokio::test]
async fn test_other_cluster_uses_derived_descriptor() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let (loader, factory) = loader(&cluster);

    loader
        .load_database("Samples", "bar", false, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    let descriptors = factory.descriptors();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].data_source(), "https://bar.kusto.windows.net");
    assert_eq!(descriptors[0].initial_catalog(), "NetDefaultDB");
    assert!(cluster
        .calls()
        .iter()
        .all(|c| c.data_source == "https://bar.kusto.windows.net"));
}

#[tokio::test]
async fn test_unresolvable_cluster_issues_no_calls() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    let (loader, factory) = loader(&cluster);

    for throw_on_error in [false, true] {
        let result = loader
            .load_database("Samples", "   ", throw_on_error, &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }
    assert_eq!(cluster.call_count(), 0);
    assert_eq!(factory.connects(), 0);
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_command() {
    let cluster = MockCluster::new();
    script_samples(&cluster);
    cluster.hang(SHOW_FUNCTIONS);
    let (loader, _factory) = loader(&cluster);
    let cancel = CancellationToken::new();

    let load = loader.load_database("Samples", "", true, &cancel);
    let trigger = async {
        while !cluster.commands().contains(&SHOW_FUNCTIONS.to_string()) {
            tokio::task::yield_now().await;
        }
        cancel.cancel();
    };
    let (result, ()) = tokio::join!(load, trigger);

    let err = result.unwrap_err();
    assert!(err.is_cancelled());
    assert!(!cluster.commands().contains(&SHOW_ENTITY_GROUPS.to_string()));
}
