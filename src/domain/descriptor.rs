//! Column description of a resource for generic clients.

use serde::Serialize;

use crate::domain::field::FieldDescriptor;
use crate::domain::metadata::EntityMetadata;
use crate::query::errors::QueryError;

/// Validator name reported for required fields.
pub const NOT_EMPTY_VALIDATOR: &str = "notempty";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    /// Presentation label.
    pub name: String,
    pub field: String,
    pub editable: bool,
    pub sortable: bool,
    pub autocomplete: bool,
    #[serde(rename = "type")]
    pub field_type: String,
    pub validators: Vec<String>,
}

impl From<&FieldDescriptor> for Column {
    fn from(field: &FieldDescriptor) -> Self {
        let mut validators = Vec::new();
        if field.required {
            validators.push(NOT_EMPTY_VALIDATOR.to_string());
        }
        Self {
            name: field.display_name().to_string(),
            field: field.name.to_string(),
            editable: field.editable,
            sortable: field.sortable,
            autocomplete: field.autocomplete,
            field_type: field.field_type.as_str().to_string(),
            validators,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Descriptor {
    pub columns: Vec<Column>,
}

impl Descriptor {
    /// Columns in declaration order, with the fields named in the
    /// metadata's column order moved to the front.
    pub fn new(metadata: &EntityMetadata) -> Result<Self, QueryError> {
        let mut columns: Vec<Column> = metadata.fields.iter().map(Column::from).collect();

        let mut ordered = Vec::with_capacity(columns.len());
        for field in &metadata.column_order {
            let index = columns
                .iter()
                .position(|column| column.field == *field)
                .ok_or_else(|| QueryError::missing_field(metadata.name, *field))?;
            ordered.push(columns.remove(index));
        }
        ordered.append(&mut columns);

        Ok(Self { columns: ordered })
    }
}
