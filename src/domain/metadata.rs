//! Runtime entity metadata and the registry holding it.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::field::{FieldDescriptor, Resource};
use crate::query::errors::QueryError;

/// Configuration overrides for the search and sort whitelists of a
/// resource.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResourceOverrides {
    /// Replaces the set of searchable fields.
    pub searchable: Option<Vec<String>>,
    /// Replaces the set of sortable fields.
    pub sortable: Option<Vec<String>>,
}

/// Metadata of one resource after configuration has been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityMetadata {
    pub name: &'static str,
    pub table: &'static str,
    pub key: &'static str,
    pub fields: Vec<FieldDescriptor>,
    pub column_order: Vec<&'static str>,
}

impl EntityMetadata {
    pub fn of<R: Resource>() -> Self {
        Self {
            name: R::NAME,
            table: R::TABLE,
            key: R::KEY,
            fields: R::FIELDS.to_vec(),
            column_order: R::COLUMN_ORDER.to_vec(),
        }
    }

    /// Applies configured whitelists. Every named field must exist.
    pub fn with_overrides(mut self, overrides: &ResourceOverrides) -> Result<Self, QueryError> {
        if let Some(searchable) = &overrides.searchable {
            self.check_fields(searchable)?;
            for field in &mut self.fields {
                field.searchable = searchable.iter().any(|name| name == field.name);
            }
        }
        if let Some(sortable) = &overrides.sortable {
            self.check_fields(sortable)?;
            for field in &mut self.fields {
                field.sortable = sortable.iter().any(|name| name == field.name);
            }
        }
        Ok(self)
    }

    fn check_fields(&self, names: &[String]) -> Result<(), QueryError> {
        names.iter().try_for_each(|name| self.field(name).map(|_| ()))
    }

    pub fn field(&self, name: &str) -> Result<&FieldDescriptor, QueryError> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| QueryError::missing_field(self.name, name))
    }

    pub fn searchable_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.searchable)
            .map(|f| f.name)
            .collect()
    }

    pub fn sortable_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.sortable)
            .map(|f| f.name)
            .collect()
    }
}

/// Explicitly constructed set of resources known to the application,
/// keyed by table name.
#[derive(Clone, Debug, Default)]
pub struct ResourceRegistry {
    entries: HashMap<&'static str, EntityMetadata>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `R`, applying `overrides` when present.
    pub fn register<R: Resource>(
        &mut self,
        overrides: Option<&ResourceOverrides>,
    ) -> Result<&EntityMetadata, QueryError> {
        let mut metadata = EntityMetadata::of::<R>();
        if let Some(overrides) = overrides {
            metadata = metadata.with_overrides(overrides)?;
        }
        log::info!(
            "Registered resource {} (searchable: {:?}, sortable: {:?})",
            metadata.table,
            metadata.searchable_fields(),
            metadata.sortable_fields()
        );
        self.entries.insert(R::TABLE, metadata);
        Ok(&self.entries[R::TABLE])
    }

    pub fn get(&self, table: &str) -> Option<&EntityMetadata> {
        self.entries.get(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::FieldType;

    struct Note;

    impl Resource for Note {
        const NAME: &'static str = "Note";
        const TABLE: &'static str = "notes";
        const FIELDS: &'static [FieldDescriptor] = &[
            FieldDescriptor::new("id", FieldType::Integer).sortable(),
            FieldDescriptor::new("title", FieldType::String)
                .searchable()
                .sortable(),
            FieldDescriptor::new("body", FieldType::String),
        ];
    }

    #[test]
    fn static_metadata_drives_whitelists() {
        let metadata = EntityMetadata::of::<Note>();

        assert_eq!(metadata.searchable_fields(), vec!["title"]);
        assert_eq!(metadata.sortable_fields(), vec!["id", "title"]);
    }

    #[test]
    fn overrides_replace_whitelists() {
        let overrides = ResourceOverrides {
            searchable: Some(vec!["title".to_string(), "body".to_string()]),
            sortable: Some(vec!["title".to_string()]),
        };

        let metadata = EntityMetadata::of::<Note>()
            .with_overrides(&overrides)
            .unwrap();

        assert_eq!(metadata.searchable_fields(), vec!["title", "body"]);
        assert_eq!(metadata.sortable_fields(), vec!["title"]);
    }

    #[test]
    fn overrides_naming_unknown_fields_are_rejected() {
        let overrides = ResourceOverrides {
            searchable: None,
            sortable: Some(vec!["author".to_string()]),
        };

        let result = EntityMetadata::of::<Note>().with_overrides(&overrides);

        assert_eq!(result, Err(QueryError::missing_field("Note", "author")));
    }

    #[test]
    fn registry_looks_up_by_table() {
        let mut registry = ResourceRegistry::new();
        registry.register::<Note>(None).unwrap();

        assert_eq!(registry.get("notes").map(|m| m.name), Some("Note"));
        assert!(registry.get("Note").is_none());
    }
}
