use serde::Serialize;
use serde_json::Value;

/// One page of a listed resource.
#[derive(Clone, Debug, Serialize)]
pub struct DataTable<T> {
    /// Lower camel case entity type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Permissions the caller holds on the listed type.
    #[serde(rename = "permission")]
    pub permissions: Vec<String>,
    /// Client correlation token, returned exactly as received.
    pub echo: Option<String>,
    /// Total number of rows matching the filter, across all pages.
    pub size: u64,
    pub rows: Vec<T>,
    /// Out-of-band payload attached by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oob: Option<Value>,
}

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl<T> DataTable<T> {
    pub fn new(
        entity: &str,
        echo: Option<String>,
        size: u64,
        rows: Vec<T>,
        oob: Option<Value>,
    ) -> Self {
        Self {
            type_name: lower_camel(entity),
            permissions: Vec::new(),
            echo,
            size,
            rows,
            oob,
        }
    }

    pub fn add_permission(&mut self, permission: impl Into<String>) {
        self.permissions.push(permission.into());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn type_name_is_lower_camel_case() {
        assert_eq!(lower_camel("ItemCategory"), "itemCategory");
        assert_eq!(lower_camel(""), "");
    }

    #[test]
    fn serializes_wire_names() {
        let mut table = DataTable::new("Item", Some(String::new()), 35, vec![1, 2], None);
        table.add_permission("insert");

        let json = serde_json::to_value(&table).unwrap();

        assert_eq!(
            json,
            json!({
                "type": "item",
                "permission": ["insert"],
                "echo": "",
                "size": 35,
                "rows": [1, 2],
            })
        );
    }
}
