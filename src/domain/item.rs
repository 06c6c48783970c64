use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::field::{FieldDescriptor, FieldType, Resource};

/// Catalog item served by the bundled application.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl Resource for Item {
    const NAME: &'static str = "Item";
    const TABLE: &'static str = "items";
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::new("id", FieldType::Integer)
            .label("Id")
            .sortable(),
        FieldDescriptor::new("name", FieldType::String)
            .label("Name")
            .searchable()
            .sortable()
            .editable()
            .autocomplete()
            .required(),
        FieldDescriptor::new("description", FieldType::String)
            .label("Description")
            .searchable()
            .editable(),
        FieldDescriptor::new("category", FieldType::String)
            .label("Category")
            .searchable()
            .sortable()
            .editable()
            .autocomplete(),
        FieldDescriptor::new("price", FieldType::Decimal)
            .label("Price")
            .sortable()
            .editable(),
        FieldDescriptor::new("active", FieldType::Boolean)
            .label("Active")
            .editable(),
        FieldDescriptor::new("created_at", FieldType::Date)
            .label("Created")
            .sortable(),
    ];
    const COLUMN_ORDER: &'static [&'static str] = &["name", "category", "price"];
}
