//! Metadata for SQL statement chunks

use serde::{Deserialize, Serialize};

/// Metadata describing one top-level SQL statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlMetadata {
    /// e.g. `"CREATE_TABLE"`, `"INSERT"`, `"SELECT"`, `"CREATE_PROCEDURE"`.
    pub statement_type: String,
    /// e.g. `"TABLE"`, `"VIEW"`, `"INDEX"`, `"PROCEDURE"`, `"FUNCTION"`.
    pub object_type: Option<String>,
    pub table_name: Option<String>,
    pub procedure_name: Option<String>,
    /// Detected SQL dialect, e.g. `"postgres"`, `"mysql"`, `"ansi"`.
    pub dialect: Option<String>,
}
