//! CRUD dispatcher - routes one gateway request to one handler.
//!
//! The dispatcher owns id generation, timestamp stamping and the
//! orchestration of registry, store adapter, query engine and enricher.
//! It is synchronous and pure apart from the store calls; the current
//! time is injected by the caller on every dispatch.

use crate::{
    batch, error::Result, query, schema, CellValue, Enricher, Error, Record, RowStore,
    SchemaRegistry, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection used when the request names none.
pub const DEFAULT_SHEET: &str = "Products";

/// The gateway actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Get,
    Create,
    Update,
    Delete,
    Batch,
}

impl Action {
    /// Parse an action string; `None` or empty defaults to `Get`.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None | Some("") | Some("get") => Ok(Action::Get),
            Some("create") => Ok(Action::Create),
            Some("update") => Ok(Action::Update),
            Some("delete") => Ok(Action::Delete),
            Some("batch") => Ok(Action::Batch),
            Some(other) => Err(Error::UnknownAction(other.to_string())),
        }
    }
}

/// One decoded request against the gateway.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    /// Target collection
    pub sheet: String,
    /// Selected action
    pub action: Action,
    /// Target record id for get/update/delete
    pub id: Option<String>,
    /// Decoded `data` payload for create/update/batch
    pub payload: Option<serde_json::Value>,
    /// Equality filters for get (reserved keys already stripped)
    pub filters: HashMap<String, String>,
}

impl GatewayRequest {
    /// A bare `get` of a collection.
    pub fn get(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            action: Action::Get,
            id: None,
            payload: None,
            filters: HashMap::new(),
        }
    }

    /// Builder-style id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder-style action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Builder-style payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Builder-style filters.
    pub fn with_filters(mut self, filters: HashMap<String, String>) -> Self {
        self.filters = filters;
        self
    }
}

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResult {
    pub status: String,
    pub id: String,
    pub sheet: String,
}

/// Result of a successful update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub status: String,
    pub id: String,
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub status: String,
    pub id: String,
}

/// Every shape a handler can produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GatewayResponse {
    /// get by id: the record, or an empty object when absent
    Record(Record),
    /// get: full or filtered list
    Records(Vec<Record>),
    Created(CreateResult),
    Updated(UpdateResult),
    Deleted(DeleteResult),
    Batch(batch::BatchOutcome),
}

/// Routes requests to handlers over an injected store.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: SchemaRegistry,
    enricher: Enricher,
}

impl Dispatcher {
    /// Create a dispatcher over the given registry.
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            enricher: Enricher::new(),
        }
    }

    /// The registry this dispatcher provisions collections from.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Dispatch one request. `now` is epoch milliseconds.
    pub fn dispatch(
        &self,
        store: &mut dyn RowStore,
        request: GatewayRequest,
        now: Timestamp,
    ) -> Result<GatewayResponse> {
        match request.action {
            Action::Get => self.handle_get(store, &request),
            Action::Create => {
                let payload = require_payload(request.payload.as_ref())?;
                let result = self.handle_create(store, &request.sheet, &payload, now)?;
                Ok(GatewayResponse::Created(result))
            }
            Action::Update => {
                let id = request.id.as_deref().ok_or(Error::MissingId)?;
                let payload = require_payload(request.payload.as_ref())?;
                let result = self.handle_update(store, &request.sheet, id, &payload, now)?;
                Ok(GatewayResponse::Updated(result))
            }
            Action::Delete => {
                let id = request.id.as_deref().ok_or(Error::MissingId)?;
                let result = self.handle_delete(store, &request.sheet, id)?;
                Ok(GatewayResponse::Deleted(result))
            }
            Action::Batch => {
                let payload = request.payload.as_ref().ok_or(Error::MissingPayload)?;
                let operations = batch::parse_operations(payload)?;
                let outcome = batch::run(self, store, operations, now)?;
                Ok(GatewayResponse::Batch(outcome))
            }
        }
    }

    fn handle_get(
        &self,
        store: &mut dyn RowStore,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse> {
        store.open(&request.sheet, &self.registry)?;
        let sheet = store.read_all(&request.sheet)?;
        let mut records = query::to_records(&sheet);
        self.enricher.enrich(store, &request.sheet, &mut records)?;

        if let Some(id) = request.id.as_deref() {
            let record = query::find_by_id(&records, id).cloned().unwrap_or_default();
            return Ok(GatewayResponse::Record(record));
        }

        if !request.filters.is_empty() {
            records = query::filter_records(records, &request.filters);
        }
        Ok(GatewayResponse::Records(records))
    }

    /// Create a record; also the execution step of the batch runner.
    pub(crate) fn handle_create(
        &self,
        store: &mut dyn RowStore,
        sheet_name: &str,
        payload: &Record,
        now: Timestamp,
    ) -> Result<CreateResult> {
        store.open(sheet_name, &self.registry)?;
        let sheet = store.read_all(sheet_name)?;
        let records = query::to_records(&sheet);

        let id = match payload.get(schema::ID_COLUMN) {
            Some(explicit) if !query::value_to_string(explicit).is_empty() => {
                let id = query::value_to_string(explicit);
                if query::find_by_id(&records, &id).is_some() {
                    return Err(Error::DuplicateId(id));
                }
                id
            }
            _ => next_id(&records),
        };

        let columns = if sheet.headers.is_empty() {
            self.registry.columns_for(sheet_name)
        } else {
            sheet.headers
        };

        let row = columns
            .iter()
            .map(|column| match column.as_str() {
                schema::ID_COLUMN => CellValue::String(id.clone()),
                schema::CREATED_AT | schema::UPDATED_AT => CellValue::from(now),
                _ => payload
                    .get(column)
                    .cloned()
                    .unwrap_or_else(|| CellValue::String(String::new())),
            })
            .collect();

        store.append(sheet_name, row)?;

        Ok(CreateResult {
            status: "success".to_string(),
            id,
            sheet: sheet_name.to_string(),
        })
    }

    fn handle_update(
        &self,
        store: &mut dyn RowStore,
        sheet_name: &str,
        id: &str,
        payload: &Record,
        now: Timestamp,
    ) -> Result<UpdateResult> {
        store.open(sheet_name, &self.registry)?;
        let sheet = store.read_all(sheet_name)?;
        let records = query::to_records(&sheet);

        let row = query::position_by_id(&records, id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;

        // One set_cell per changed column; not atomic across cells.
        // `id` and `createdAt` are never taken from the payload.
        for (col, column) in sheet.headers.iter().enumerate() {
            match column.as_str() {
                schema::UPDATED_AT => {
                    store.set_cell(sheet_name, row, col, CellValue::from(now))?;
                }
                schema::ID_COLUMN | schema::CREATED_AT => {}
                _ => {
                    if let Some(value) = payload.get(column) {
                        store.set_cell(sheet_name, row, col, value.clone())?;
                    }
                }
            }
        }

        Ok(UpdateResult {
            status: "updated".to_string(),
            id: id.to_string(),
        })
    }

    fn handle_delete(
        &self,
        store: &mut dyn RowStore,
        sheet_name: &str,
        id: &str,
    ) -> Result<DeleteResult> {
        store.open(sheet_name, &self.registry)?;
        let sheet = store.read_all(sheet_name)?;
        let records = query::to_records(&sheet);

        let row = query::position_by_id(&records, id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        store.delete_row(sheet_name, row)?;

        Ok(DeleteResult {
            status: "deleted".to_string(),
            id: id.to_string(),
        })
    }
}

/// Next id: (max existing numeric id) + 1, or "1" when the sheet is empty.
///
/// Non-numeric ids are skipped by the max scan.
fn next_id(records: &[Record]) -> String {
    let max = records
        .iter()
        .filter_map(|r| r.get(schema::ID_COLUMN))
        .filter_map(|v| query::value_to_string(v).parse::<i64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

/// Decode a payload value into a field map; non-objects are rejected.
fn require_payload(payload: Option<&serde_json::Value>) -> Result<Record> {
    let value = payload.ok_or(Error::MissingPayload)?;
    value
        .as_object()
        .cloned()
        .ok_or_else(|| Error::InvalidPayload("payload must be an object".to_string()))
}
