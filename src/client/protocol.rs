//! Protocol types for bridge communication and tabular results.
//!
//! The bridge executes administrative commands on behalf of the client and
//! returns the raw result tables. Every request and response is one line of
//! JSON (NDJSON).

use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Method names understood by the bridge.
pub mod methods {
    /// Execute an administrative (control) command.
    pub const EXECUTE_MGMT: &str = "mgmt.execute";
}

/// Request envelope sent to the bridge.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "mgmt.execute").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Parameters for `mgmt.execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteParams {
    /// Connection string of the target data source.
    pub connection_string: String,
    /// Database the command is scoped to.
    pub database: String,
    /// Command text.
    pub command: String,
}

// ============================================================================
// Tabular results
// ============================================================================

/// A column header in a result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
}

/// One table of a command response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    #[serde(default)]
    pub name: String,
    pub columns: Vec<ResultColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl ResultTable {
    /// Create a table with string-typed columns.
    pub fn new(columns: &[&str]) -> Self {
        Self {
            name: "Table_0".to_string(),
            columns: columns
                .iter()
                .map(|c| ResultColumn {
                    name: c.to_string(),
                    data_type: "string".to_string(),
                })
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row of string cells.
    pub fn with_row(mut self, cells: &[&str]) -> Self {
        self.rows.push(
            cells
                .iter()
                .map(|c| serde_json::Value::String(c.to_string()))
                .collect(),
        );
        self
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// All tables returned by one command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub tables: Vec<ResultTable>,
}

impl ResultSet {
    /// Wrap a single primary table.
    pub fn single(table: ResultTable) -> Self {
        Self {
            tables: vec![table],
        }
    }

    /// The primary result table.
    pub fn primary(&self) -> Option<&ResultTable> {
        self.tables.first()
    }
}
