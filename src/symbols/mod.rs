//! Symbol tree produced by schema loading.
//!
//! One [`DatabaseSymbol`] owns its members in load order: tables, external
//! tables, materialized views, functions, then entity groups. The tree is
//! handed to the query analysis engine as its schema context.

mod render;
pub mod schema_text;
mod symbol;
mod types;

pub use schema_text::SchemaTextError;
pub use symbol::{
    schema_of, ClusterSymbol, ColumnSymbol, DatabaseSymbol, EntityGroupSymbol,
    ExternalTableSymbol, FunctionSymbol, MaterializedViewSymbol, Member, MemberKind,
    ParameterKind, ParameterSymbol, TableSymbol,
};
pub use types::ScalarType;

pub(crate) use symbol::non_empty;
