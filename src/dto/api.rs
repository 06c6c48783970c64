//! DTOs exposed by the resource API endpoints.

use serde::{Deserialize, Serialize};

fn default_length() -> u64 {
    10
}

/// Query parameters accepted by the list endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct DataTableQuery {
    /// Offset of the first row.
    #[serde(default)]
    pub start: u64,
    /// Maximum number of rows.
    #[serde(default = "default_length")]
    pub length: u64,
    /// Sort order: `<field> [ASC|DESC] (, <field> [ASC|DESC])*`.
    pub sort: Option<String>,
    /// Term matched against every searchable field.
    pub search: Option<String>,
    /// Opaque token returned as-is in the response.
    pub echo: Option<String>,
    /// Attach the out-of-band payload to the response.
    #[serde(default, rename = "oob")]
    pub include_oob: bool,
}

impl Default for DataTableQuery {
    fn default() -> Self {
        Self {
            start: 0,
            length: default_length(),
            sort: None,
            search: None,
            echo: None,
            include_oob: false,
        }
    }
}

/// Query parameters accepted by the autocomplete endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AutoCompleteParams {
    pub q: Option<String>,
}

/// Autocompletion result payload.
#[derive(Clone, Debug, Serialize)]
pub struct AutoCompleteValues {
    pub values: Vec<String>,
}

/// A rejected field of an add or edit payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

/// Body of a `400 Bad Request` listing every validation failure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidResponse {
    pub errors: Vec<FieldError>,
    pub global_errors: Vec<String>,
}

impl InvalidResponse {
    /// A response carrying a single error not tied to any field.
    pub fn global(error: impl Into<String>) -> Self {
        Self {
            global_errors: vec![error.into()],
            ..Self::default()
        }
    }

    pub fn add_error(&mut self, field: impl Into<String>, error: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            error: error.into(),
        });
    }

    pub fn add_global_error(&mut self, error: impl Into<String>) {
        self.global_errors.push(error.into());
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.global_errors.is_empty()
    }
}
