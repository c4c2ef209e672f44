//! Negative cache of databases known not to exist.

use std::collections::HashSet;

use dashmap::DashMap;

/// Per-cluster set of database names the server reported as absent.
///
/// Entries are never evicted; they live as long as the loader.
#[derive(Debug, Default)]
pub struct BadDatabaseCache {
    entries: DashMap<String, HashSet<String>>,
}

impl BadDatabaseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, cluster: &str, database: &str) -> bool {
        self.entries
            .get(cluster)
            .is_some_and(|names| names.contains(database))
    }

    /// Record `database` as absent; returns `false` if it already was.
    pub fn insert(&self, cluster: &str, database: &str) -> bool {
        self.entries
            .entry(cluster.to_string())
            .or_default()
            .insert(database.to_string())
    }

    /// Names recorded for `cluster`, sorted.
    pub fn databases(&self, cluster: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .get(cluster)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|entry| entry.value().is_empty())
    }
}
