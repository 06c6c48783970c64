use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::item::Item as DomainItem;
use crate::models::Persisted;

#[derive(Debug, Clone, QueryableByName)]
#[diesel(table_name = crate::schema::items)]
/// Diesel model for [`crate::domain::item::Item`].
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl From<Item> for DomainItem {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            category: item.category,
            price: item.price,
            active: item.active,
            created_at: item.created_at,
        }
    }
}

impl Persisted for DomainItem {
    type Model = Item;
}
