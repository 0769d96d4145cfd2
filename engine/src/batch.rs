//! Batch transaction runner - ordered multi-step creates.
//!
//! A batch is an ordered list of create operations. A payload value may
//! be a typed reference to a field of an earlier step's result, so a
//! dependent record can point at an id generated moments before it. By
//! convention step 0 is a parent record and later steps its dependents,
//! but the runner is agnostic to that.
//!
//! Steps run strictly left to right, never reordered. The backing store
//! has no transactions, so the run is not atomic: when step N fails,
//! steps 0..N-1 stay committed and the outcome reports the failing
//! index. There is no rollback.

use crate::{
    error::Result, CellValue, Dispatcher, Error, Record, RowStore, Timestamp,
};
use serde::{Deserialize, Serialize};

/// A reference to a field of an earlier operation's result.
///
/// On the wire: `{"$ref": {"op": 0, "field": "id"}}`. The referenced
/// index must be strictly less than the referencing operation's own
/// index; this is checked before any step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefValue {
    /// Index of the referenced operation
    pub op: usize,
    /// Result field to take, e.g. `id`
    pub field: RefField,
}

/// The result fields a reference may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefField {
    Id,
    Sheet,
    Status,
}

/// One step of a batch: always a create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOperation {
    /// Step kind; only `create` exists
    #[serde(rename = "type", default)]
    pub kind: BatchOpKind,
    /// Target collection
    #[serde(alias = "sheet")]
    pub target_collection: String,
    /// Create payload; values may hold references
    pub payload: serde_json::Value,
}

/// Kind marker for batch steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOpKind {
    #[default]
    Create,
}

/// Outcome of a batch run: per-step results in execution order.
///
/// On failure `results` holds the steps that committed before the
/// failing index; nothing is rolled back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub results: Vec<Record>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_index: Option<usize>,
}

/// Decode the `data` payload of a batch request: `{"operations": [...]}`.
pub fn parse_operations(payload: &serde_json::Value) -> Result<Vec<BatchOperation>> {
    #[derive(Deserialize)]
    struct BatchRequest {
        operations: Vec<BatchOperation>,
    }

    let request: BatchRequest = serde_json::from_value(payload.clone())
        .map_err(|e| Error::InvalidPayload(e.to_string()))?;
    Ok(request.operations)
}

/// Check every reference before any step runs: a step may only name
/// results of steps before it.
pub fn validate_references(operations: &[BatchOperation]) -> Result<()> {
    for (index, operation) in operations.iter().enumerate() {
        for value in payload_values(&operation.payload) {
            if let Some(reference) = as_reference(value)? {
                if reference.op >= index {
                    return Err(Error::InvalidReference {
                        op: index,
                        referenced: reference.op,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Run a batch strictly left to right.
pub fn run(
    dispatcher: &Dispatcher,
    store: &mut dyn RowStore,
    operations: Vec<BatchOperation>,
    now: Timestamp,
) -> Result<BatchOutcome> {
    validate_references(&operations)?;

    let mut results: Vec<Record> = Vec::with_capacity(operations.len());

    for (index, operation) in operations.into_iter().enumerate() {
        match run_step(dispatcher, store, &operation, &results, now) {
            Ok(result) => results.push(result),
            Err(err) => {
                let err = err.at_batch_step(index);
                return Ok(BatchOutcome {
                    results,
                    status: "error".to_string(),
                    error: Some(err.to_string()),
                    failed_index: Some(index),
                });
            }
        }
    }

    Ok(BatchOutcome {
        results,
        status: "success".to_string(),
        error: None,
        failed_index: None,
    })
}

fn run_step(
    dispatcher: &Dispatcher,
    store: &mut dyn RowStore,
    operation: &BatchOperation,
    prior: &[Record],
    now: Timestamp,
) -> Result<Record> {
    let payload = resolve_payload(&operation.payload, prior)?;
    let created =
        dispatcher.handle_create(store, &operation.target_collection, &payload, now)?;

    // The step result is the resolved payload plus the create outcome,
    // so later steps (and the caller) can read generated fields.
    let mut result = payload;
    result.insert("id".to_string(), CellValue::String(created.id));
    result.insert("sheet".to_string(), CellValue::String(created.sheet));
    result.insert("status".to_string(), CellValue::String(created.status));
    Ok(result)
}

/// Substitute every reference in a payload with the referenced result field.
fn resolve_payload(payload: &serde_json::Value, prior: &[Record]) -> Result<Record> {
    let object = payload
        .as_object()
        .ok_or_else(|| Error::InvalidPayload("payload must be an object".to_string()))?;

    let mut resolved = Record::new();
    for (key, value) in object {
        let value = match as_reference(value)? {
            Some(reference) => resolve_reference(reference, prior)?,
            None => value.clone(),
        };
        resolved.insert(key.clone(), value);
    }
    Ok(resolved)
}

fn resolve_reference(reference: RefValue, prior: &[Record]) -> Result<CellValue> {
    let result = prior
        .get(reference.op)
        .ok_or(Error::InvalidReference {
            op: prior.len(),
            referenced: reference.op,
        })?;

    let field = match reference.field {
        RefField::Id => "id",
        RefField::Sheet => "sheet",
        RefField::Status => "status",
    };
    Ok(result.get(field).cloned().unwrap_or(CellValue::Null))
}

/// Top-level values of a payload object; non-objects yield nothing and
/// are rejected later by the create path.
fn payload_values(payload: &serde_json::Value) -> impl Iterator<Item = &serde_json::Value> {
    payload.as_object().into_iter().flat_map(|o| o.values())
}

/// Parse a value as a reference if it carries the `$ref` marker.
fn as_reference(value: &serde_json::Value) -> Result<Option<RefValue>> {
    let Some(inner) = value.as_object().and_then(|o| o.get("$ref")) else {
        return Ok(None);
    };
    let reference: RefValue = serde_json::from_value(inner.clone())
        .map_err(|e| Error::InvalidPayload(format!("malformed $ref: {e}")))?;
    Ok(Some(reference))
}
