use thiserror::Error;

/// Errors raised while assembling a query from client input and entity
/// metadata.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The sort text is empty or names a field that may not be sorted on.
    /// Callers fall back to the default ordering.
    #[error("invalid sort expression: {0}")]
    InvalidSortExpression(String),

    /// A field reference does not exist in the entity metadata.
    #[error("entity `{entity}` has no field `{field}`")]
    MissingField { entity: String, field: String },
}

impl QueryError {
    pub fn missing_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        QueryError::MissingField {
            entity: entity.into(),
            field: field.into(),
        }
    }
}
