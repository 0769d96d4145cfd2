//! Read-time enrichment - denormalized display fields from related collections.
//!
//! The row store has no joins, so cross-collection fields are computed
//! per request: each referenced parent collection is scanned fully once,
//! turned into an `id -> record` map, and the target records are
//! decorated in memory. Stored rows are never touched. There is no cache
//! across requests - any concurrent writer could invalidate one
//! instantly, and the collections are small enough for a rescan.

use crate::{error::Result, query, CellValue, Record, RowStore};
use std::collections::HashMap;

/// Declared relationships, fixed per collection.
///
/// `Variants -> Products` via `productId`; `Stock`, `Sales` and
/// `Purchases -> Variants` via `variantId`, then onward to `Products`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    /// One hop: decorate with the parent product's name.
    Variant,
    /// Two hops through the variant: sku, product id and product name.
    Movement,
}

fn plan_for(collection: &str) -> Option<Plan> {
    match collection {
        "Variants" => Some(Plan::Variant),
        "Stock" | "Sales" | "Purchases" => Some(Plan::Movement),
        _ => None,
    }
}

/// Decorates records with fields sourced from related collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct Enricher;

impl Enricher {
    pub fn new() -> Self {
        Self
    }

    /// Enrich `records` read from `collection`, in place.
    ///
    /// Unresolved references decorate with empty strings - enrichment
    /// never fails the read path on a dangling id.
    pub fn enrich(
        &self,
        store: &dyn RowStore,
        collection: &str,
        records: &mut [Record],
    ) -> Result<()> {
        let Some(plan) = plan_for(collection) else {
            return Ok(());
        };

        match plan {
            Plan::Variant => {
                let products = lookup_map(store, "Products")?;
                for record in records.iter_mut() {
                    let product_id = field_string(record, "productId");
                    record.insert(
                        "productName".to_string(),
                        field_of(&products, &product_id, "name"),
                    );
                }
            }
            Plan::Movement => {
                let variants = lookup_map(store, "Variants")?;
                let products = lookup_map(store, "Products")?;
                for record in records.iter_mut() {
                    let variant_id = field_string(record, "variantId");
                    let variant = variants.get(&variant_id);

                    let sku = variant
                        .map(|v| field_value(v, "sku"))
                        .unwrap_or_else(empty);
                    let product_id = variant
                        .map(|v| query::value_to_string(&field_value(v, "productId")))
                        .unwrap_or_default();
                    let product_name = field_of(&products, &product_id, "name");

                    record.insert("variantSku".to_string(), sku);
                    record.insert("productId".to_string(), CellValue::String(product_id));
                    record.insert("productName".to_string(), product_name);
                }
            }
        }

        Ok(())
    }
}

/// Full scan of a collection into an `id -> record` map.
fn lookup_map(store: &dyn RowStore, collection: &str) -> Result<HashMap<String, Record>> {
    let sheet = store.read_all(collection)?;
    let mut map = HashMap::new();
    for record in query::to_records(&sheet) {
        if let Some(id) = record.get("id") {
            map.insert(query::value_to_string(id), record);
        }
    }
    Ok(map)
}

fn empty() -> CellValue {
    CellValue::String(String::new())
}

/// A record's field as a lookup key string; missing reads as "".
fn field_string(record: &Record, field: &str) -> String {
    record.get(field).map(query::value_to_string).unwrap_or_default()
}

/// A record's field value; missing reads as the empty string value.
fn field_value(record: &Record, field: &str) -> CellValue {
    record.get(field).cloned().unwrap_or_else(empty)
}

/// `map[id].field`, or the empty string when either hop dangles.
fn field_of(map: &HashMap<String, Record>, id: &str, field: &str) -> CellValue {
    map.get(id).map(|r| field_value(r, field)).unwrap_or_else(empty)
}
