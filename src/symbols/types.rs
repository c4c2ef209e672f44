//! Scalar column types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar type of a column or parameter.
///
/// Admin commands report types either by CLR name (`System.Int64`) or by
/// query-language name (`long`); both resolve to the same variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ScalarType {
    Bool,
    Int,
    Long,
    Real,
    Decimal,
    DateTime,
    TimeSpan,
    String,
    Guid,
    Dynamic,
    /// A type name that did not resolve, kept verbatim.
    Unknown(String),
}

impl ScalarType {
    /// Resolve a CLR or query-language type name.
    pub fn resolve(name: &str) -> Self {
        let trimmed = name.trim();
        let lowered = trimmed.to_lowercase();
        let short = lowered.strip_prefix("system.").unwrap_or(&lowered);

        match short {
            "bool" | "boolean" | "sbyte" => ScalarType::Bool,
            "int" | "int32" | "int16" | "byte" | "uint16" => ScalarType::Int,
            "long" | "int64" | "uint32" | "uint64" => ScalarType::Long,
            "real" | "double" | "single" | "float" => ScalarType::Real,
            "decimal" | "sqldecimal" | "data.sqltypes.sqldecimal" => ScalarType::Decimal,
            "datetime" | "date" => ScalarType::DateTime,
            "timespan" | "time" => ScalarType::TimeSpan,
            "string" => ScalarType::String,
            "guid" | "uniqueid" => ScalarType::Guid,
            "dynamic" | "object" | "newtonsoft.json.linq.jtoken" | "newtonsoft.json.linq.jobject"
            | "newtonsoft.json.linq.jarray" => ScalarType::Dynamic,
            _ => ScalarType::Unknown(trimmed.to_string()),
        }
    }

    /// Query-language name of the type.
    pub fn name(&self) -> &str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::Long => "long",
            ScalarType::Real => "real",
            ScalarType::Decimal => "decimal",
            ScalarType::DateTime => "datetime",
            ScalarType::TimeSpan => "timespan",
            ScalarType::String => "string",
            ScalarType::Guid => "guid",
            ScalarType::Dynamic => "dynamic",
            ScalarType::Unknown(name) => name,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ScalarType::Unknown(_))
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ScalarType> for String {
    fn from(value: ScalarType) -> Self {
        value.name().to_string()
    }
}

impl From<String> for ScalarType {
    fn from(value: String) -> Self {
        ScalarType::resolve(&value)
    }
}
