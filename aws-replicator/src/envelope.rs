//! State envelope codec.
//!
//! The envelope is the only thing that crosses from the operator's machine
//! into the local instance:
//!
//! ```json
//! {"Type": "AWS::SQS::Queue", "PhysicalResourceId": "...", "Properties": {...}}
//! ```
//!
//! Field names are upper-case to stay in line with resource-model naming and
//! are matched exactly on decode.

use crate::error::{ReplicationError, Result};
use crate::replicator_core::ResourceDescriptor;
use serde_json::{json, Map, Value};

pub const FIELD_TYPE: &str = "Type";
pub const FIELD_PHYSICAL_ID: &str = "PhysicalResourceId";
pub const FIELD_PROPERTIES: &str = "Properties";

/// Serialize a descriptor. Infallible: every descriptor is plain JSON.
pub fn encode(descriptor: &ResourceDescriptor) -> Vec<u8> {
    json!({
        FIELD_TYPE: descriptor.type_name,
        FIELD_PHYSICAL_ID: descriptor.physical_id,
        FIELD_PROPERTIES: descriptor.properties,
    })
    .to_string()
    .into_bytes()
}

pub fn decode(bytes: &[u8]) -> Result<ResourceDescriptor> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ReplicationError::MalformedEnvelope(format!("invalid JSON: {e}")))?;
    let Value::Object(mut obj) = value else {
        return Err(ReplicationError::MalformedEnvelope(
            "envelope must be a JSON object".into(),
        ));
    };

    let type_name = take_string(&mut obj, FIELD_TYPE)?;
    let physical_id = take_string(&mut obj, FIELD_PHYSICAL_ID)?;
    let properties = match obj.remove(FIELD_PROPERTIES) {
        Some(Value::Object(props)) => props,
        Some(_) => return Err(wrong_type(FIELD_PROPERTIES, "an object")),
        None => return Err(missing(FIELD_PROPERTIES)),
    };

    Ok(ResourceDescriptor {
        type_name,
        physical_id,
        properties,
    })
}

fn take_string(obj: &mut Map<String, Value>, field: &str) -> Result<String> {
    match obj.remove(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(wrong_type(field, "a string")),
        None => Err(missing(field)),
    }
}

fn missing(field: &str) -> ReplicationError {
    ReplicationError::MalformedEnvelope(format!("missing field `{field}`"))
}

fn wrong_type(field: &str, expected: &str) -> ReplicationError {
    ReplicationError::MalformedEnvelope(format!("field `{field}` must be {expected}"))
}
