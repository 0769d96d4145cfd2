//! Schema registry - collection names mapped to ordered column lists.
//!
//! The backing row store has no typed columns; a row is nothing but a
//! positional list of values. Column order therefore carries the whole
//! meaning of a row, and every read and write aligns against the
//! registry's column list for that collection.

use crate::CollectionName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column name stamped with the creation timestamp.
pub const CREATED_AT: &str = "createdAt";

/// Column name stamped on every update.
pub const UPDATED_AT: &str = "updatedAt";

/// The first column of every collection.
pub const ID_COLUMN: &str = "id";

/// Ordered column list for a single collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSchema {
    /// Collection name
    pub name: CollectionName,
    /// Ordered column names; the first is always `id`
    pub columns: Vec<String>,
}

impl CollectionSchema {
    /// Create a new collection schema.
    pub fn new<I, S>(name: impl Into<CollectionName>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this schema declares the given column.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Registry of collection schemas with a fallback for unknown names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRegistry {
    collections: HashMap<CollectionName, CollectionSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            collections: HashMap::new(),
        }
    }

    /// The built-in inventory schema.
    pub fn defaults() -> Self {
        Self::new()
            .with_collection(CollectionSchema::new(
                "Products",
                ["id", "name", "category", "price", CREATED_AT, UPDATED_AT],
            ))
            .with_collection(CollectionSchema::new(
                "Variants",
                ["id", "productId", "sku", "name", "price", CREATED_AT, UPDATED_AT],
            ))
            .with_collection(CollectionSchema::new(
                "Stock",
                ["id", "variantId", "quantity", "location", CREATED_AT, UPDATED_AT],
            ))
            .with_collection(CollectionSchema::new(
                "Sales",
                [
                    "id", "variantId", "orderId", "quantity", "total", CREATED_AT, UPDATED_AT,
                ],
            ))
            .with_collection(CollectionSchema::new(
                "Purchases",
                [
                    "id", "variantId", "quantity", "cost", "supplier", CREATED_AT, UPDATED_AT,
                ],
            ))
            .with_collection(CollectionSchema::new(
                "Orders",
                ["id", "customer", "status", CREATED_AT, UPDATED_AT],
            ))
    }

    /// Add a collection to the registry.
    pub fn add_collection(&mut self, collection: CollectionSchema) -> &mut Self {
        self.collections.insert(collection.name.clone(), collection);
        self
    }

    /// Builder-style method to add a collection.
    pub fn with_collection(mut self, collection: CollectionSchema) -> Self {
        self.add_collection(collection);
        self
    }

    /// Ordered columns for a collection; unknown names fall back to `[id, name]`.
    pub fn columns_for(&self, name: &str) -> Vec<String> {
        match self.collections.get(name) {
            Some(schema) => schema.columns.clone(),
            None => vec![ID_COLUMN.to_string(), "name".to_string()],
        }
    }

    /// Get a collection schema by name, if declared.
    pub fn get_collection(&self, name: &str) -> Option<&CollectionSchema> {
        self.collections.get(name)
    }
}
