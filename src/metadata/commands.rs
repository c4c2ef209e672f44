//! Administrative command text.
//!
//! Names are interpolated verbatim; no escaping is applied.

/// Lists the databases visible on the cluster.
pub const SHOW_DATABASES: &str = ".show databases";

/// Lists the external tables of the current database.
pub const SHOW_EXTERNAL_TABLES: &str = ".show external tables";

/// Lists the materialized views of the current database.
pub const SHOW_MATERIALIZED_VIEWS: &str = ".show materialized-views";

/// Lists the stored functions of the current database.
pub const SHOW_FUNCTIONS: &str = ".show functions";

/// Lists the entity groups of the current database.
pub const SHOW_ENTITY_GROUPS: &str = ".show entity_groups";

/// One row per column of every table in `database`.
pub fn database_schema(database: &str) -> String {
    format!(".show database {} schema", database)
}

/// Schema text of one external table.
pub fn external_table_schema(table: &str) -> String {
    format!(".show external table {} cslschema", table)
}

/// Schema text of one materialized view.
pub fn materialized_view_schema(view: &str) -> String {
    format!(".show materialized-view {} cslschema", view)
}
