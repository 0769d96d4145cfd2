//! # Gridgate Engine
//!
//! A schema-driven CRUD engine over a spreadsheet-like row store.
//!
//! This crate provides the core logic of the Gridgate data-access
//! gateway: named tabular collections are auto-provisioned from a
//! schema registry, read as field-keyed records, enriched with
//! denormalized fields from related collections, and mutated through
//! a single dispatcher that owns id generation and timestamping.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine talks to storage only through the [`RowStore`]
//!   trait handed in by the caller
//! - **Synchronous**: one request runs to completion; the host decides
//!   how requests are scheduled
//! - **Time injected**: the current timestamp is a parameter, never read
//!   from a clock
//! - **Store untrusted**: the backing store has no transactions and no
//!   locks, so row positions are re-resolved on every call and nothing
//!   is cached across requests
//!
//! ## Core Concepts
//!
//! ### Collections and rows
//!
//! A collection is a sheet: a header row fixing column order, then
//! positional data rows. The [`SchemaRegistry`] maps collection names to
//! ordered column lists; unknown names fall back to `[id, name]`. The
//! first column is always `id`, a unique string.
//!
//! ### Dispatch
//!
//! One [`GatewayRequest`] selects exactly one handler via [`Action`]:
//! `get` (with optional id or equality filters), `create`, `update`,
//! `delete`, or `batch`. Creates generate the id as
//! (max existing numeric id) + 1 and stamp `createdAt`/`updatedAt`
//! when the schema declares them.
//!
//! ### Enrichment
//!
//! Reads decorate records with display fields from related collections
//! (a variant gains `productName`, a stock/sale/purchase row gains
//! `variantSku`, `productId`, `productName`). Dangling references
//! decorate with empty strings; enrichment never fails a read.
//!
//! ### Batches
//!
//! A batch is an ordered list of creates where later payloads may hold
//! a typed [`RefValue`] pointing at an earlier step's result. Steps run
//! strictly left to right with no rollback on failure.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridgate_engine::{
//!     Action, Dispatcher, GatewayRequest, GatewayResponse, MemoryStore, SchemaRegistry,
//! };
//! use serde_json::json;
//!
//! let dispatcher = Dispatcher::new(SchemaRegistry::defaults());
//! let mut store = MemoryStore::new();
//!
//! // Create a product; the id is generated.
//! let request = GatewayRequest::get("Products")
//!     .with_action(Action::Create)
//!     .with_payload(json!({"name": "Widget", "category": "Tools"}));
//! let response = dispatcher.dispatch(&mut store, request, 1706745600000).unwrap();
//!
//! let GatewayResponse::Created(created) = response else { unreachable!() };
//! assert_eq!(created.id, "1");
//!
//! // Read it back by id.
//! let request = GatewayRequest::get("Products").with_id("1");
//! let response = dispatcher.dispatch(&mut store, request, 1706745601000).unwrap();
//!
//! let GatewayResponse::Record(record) = response else { unreachable!() };
//! assert_eq!(record["name"], json!("Widget"));
//! ```

pub mod batch;
pub mod dispatch;
pub mod enrich;
pub mod error;
pub mod query;
pub mod schema;
pub mod store;

// Re-export main types at crate root
pub use batch::{BatchOpKind, BatchOperation, BatchOutcome, RefField, RefValue};
pub use dispatch::{
    Action, CreateResult, DeleteResult, Dispatcher, GatewayRequest, GatewayResponse,
    UpdateResult, DEFAULT_SHEET,
};
pub use enrich::Enricher;
pub use error::{Error, Result};
pub use query::{is_reserved_key, RESERVED_KEYS};
pub use schema::{CollectionSchema, SchemaRegistry, CREATED_AT, ID_COLUMN, UPDATED_AT};
pub use store::{MemoryStore, RowStore, Sheet};

/// Type aliases for clarity
pub type RecordId = String;
pub type CollectionName = String;
/// One logical row as a field map, in column order.
pub type Record = serde_json::Map<String, serde_json::Value>;
/// A single stored cell; native JSON types are preserved.
pub type CellValue = serde_json::Value;
/// Epoch milliseconds.
pub type Timestamp = i64;
