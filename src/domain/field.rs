//! Static description of the entities exposed through the CRUD surface.

use serde::{Deserialize, Serialize};

/// Presentation type of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
}

impl FieldType {
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Integer => "INTEGER",
            FieldType::Decimal => "DECIMAL",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Date => "DATE",
        }
    }
}

/// Per-field CRUD configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Column name, also used as the JSON property name.
    pub name: &'static str,
    /// Presentation label; defaults to `name`.
    pub label: Option<&'static str>,
    pub field_type: FieldType,
    /// Matched against the free-text search term.
    pub searchable: bool,
    /// Allowed in client sort expressions.
    pub sortable: bool,
    /// Writable through add and edit.
    pub editable: bool,
    /// Exposes an autocompletion endpoint.
    pub autocomplete: bool,
    /// Must not be empty when written.
    pub required: bool,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            label: None,
            field_type,
            searchable: false,
            sortable: false,
            editable: false,
            autocomplete: false,
            required: false,
        }
    }

    pub const fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub const fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub const fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub const fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn display_name(&self) -> &'static str {
        self.label.unwrap_or(self.name)
    }
}

/// An entity type exposed as a REST resource.
///
/// Implementations are explicit per-entity declarations of what would
/// otherwise be discovered by reflection: the backing table, its key and
/// the CRUD configuration of every exposed field.
pub trait Resource: Sized {
    /// Type name, e.g. `Item`.
    const NAME: &'static str;
    /// Backing table; also the resource path segment and the entity name
    /// used for permission checks and configuration.
    const TABLE: &'static str;
    /// Integer primary key column.
    const KEY: &'static str = "id";
    const FIELDS: &'static [FieldDescriptor];
    /// Fields listed first in the descriptor, in this order.
    const COLUMN_ORDER: &'static [&'static str] = &[];
}
