//! Symbol types.

use serde::{Deserialize, Serialize};

use super::types::ScalarType;

/// Convert an empty doc string to `None`.
pub(crate) fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A column of a table, external table, or materialized view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSymbol {
    pub name: String,
    pub column_type: ScalarType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnSymbol {
    pub fn new(name: impl Into<String>, column_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            column_type,
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// Render columns as `(a:string, b:long)`.
pub fn schema_of(columns: &[ColumnSymbol]) -> String {
    let inner: Vec<String> = columns
        .iter()
        .map(|c| format!("{}:{}", render_name(&c.name), c.column_type))
        .collect();
    format!("({})", inner.join(", "))
}

/// Quote a name if it is not a plain identifier.
fn render_name(name: &str) -> String {
    let plain = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("['{}']", name.replace('\'', "\\'"))
    }
}

/// A database table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSymbol {
    pub name: String,
    pub columns: Vec<ColumnSymbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

impl TableSymbol {
    /// The schema text of the table's columns.
    pub fn schema(&self) -> String {
        schema_of(&self.columns)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSymbol> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A table backed by external storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalTableSymbol {
    pub name: String,
    /// Parenthesized schema text, e.g. `(a:string, b:long)`.
    pub schema: String,
    pub columns: Vec<ColumnSymbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// A materialized view and its defining query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedViewSymbol {
    pub name: String,
    /// Parenthesized schema text.
    pub schema: String,
    pub columns: Vec<ColumnSymbol>,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// How a function parameter is typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterKind {
    Scalar { scalar_type: ScalarType },
    /// A tabular parameter; `open` when the schema ends in `*`.
    Tabular {
        columns: Vec<ColumnSymbol>,
        open: bool,
    },
}

/// A stored function parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSymbol {
    pub name: String,
    #[serde(flatten)]
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// A stored function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub name: String,
    /// Parameter list text as reported, e.g. `(x:long, y:string)`.
    pub parameters_text: String,
    pub parameters: Vec<ParameterSymbol>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// A named group of entities (clusters or databases).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityGroupSymbol {
    pub name: String,
    /// Entity list text as reported.
    pub definition: String,
    pub entities: Vec<String>,
}

/// The category of a database member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Table,
    ExternalTable,
    MaterializedView,
    Function,
    EntityGroup,
}

/// One member of a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    Table(TableSymbol),
    ExternalTable(ExternalTableSymbol),
    MaterializedView(MaterializedViewSymbol),
    Function(FunctionSymbol),
    EntityGroup(EntityGroupSymbol),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Table(t) => &t.name,
            Member::ExternalTable(t) => &t.name,
            Member::MaterializedView(v) => &v.name,
            Member::Function(f) => &f.name,
            Member::EntityGroup(g) => &g.name,
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            Member::Table(_) => MemberKind::Table,
            Member::ExternalTable(_) => MemberKind::ExternalTable,
            Member::MaterializedView(_) => MemberKind::MaterializedView,
            Member::Function(_) => MemberKind::Function,
            Member::EntityGroup(_) => MemberKind::EntityGroup,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Member::Table(t) => t.description.as_deref(),
            Member::ExternalTable(t) => t.description.as_deref(),
            Member::MaterializedView(v) => v.description.as_deref(),
            Member::Function(f) => f.description.as_deref(),
            Member::EntityGroup(_) => None,
        }
    }
}

impl From<TableSymbol> for Member {
    fn from(value: TableSymbol) -> Self {
        Member::Table(value)
    }
}

impl From<ExternalTableSymbol> for Member {
    fn from(value: ExternalTableSymbol) -> Self {
        Member::ExternalTable(value)
    }
}

impl From<MaterializedViewSymbol> for Member {
    fn from(value: MaterializedViewSymbol) -> Self {
        Member::MaterializedView(value)
    }
}

impl From<FunctionSymbol> for Member {
    fn from(value: FunctionSymbol) -> Self {
        Member::Function(value)
    }
}

impl From<EntityGroupSymbol> for Member {
    fn from(value: EntityGroupSymbol) -> Self {
        Member::EntityGroup(value)
    }
}

/// A database and its members, in load order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSymbol {
    pub name: String,
    pub members: Vec<Member>,
}

impl DatabaseSymbol {
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    /// Find a member by name.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name() == name)
    }

    /// Members of one category, in load order.
    pub fn members_of(&self, kind: MemberKind) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(move |m| m.kind() == kind)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSymbol> {
        self.members.iter().filter_map(|m| match m {
            Member::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionSymbol> {
        self.members.iter().filter_map(|m| match m {
            Member::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Member names in load order.
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(Member::name).collect()
    }
}

/// A cluster and the databases loaded from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSymbol {
    pub name: String,
    pub databases: Vec<DatabaseSymbol>,
}

impl ClusterSymbol {
    pub fn database(&self, name: &str) -> Option<&DatabaseSymbol> {
        self.databases.iter().find(|d| d.name == name)
    }
}
