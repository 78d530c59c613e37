use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// Wire items. Field names use the provider's casing so both sides agree on
// exact names inside `Properties`.

/// A received queue message. Only `Body` is mandatory; the rest is whatever
/// the remote returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_handle: Option<String>,
    #[serde(rename = "MD5OfBody", default, skip_serializing_if = "Option::is_none")]
    pub md5_of_body: Option<String>,
    pub body: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(
        rename = "MD5OfMessageAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub md5_of_message_attributes: Option<String>,
    #[serde(default)]
    pub message_attributes: BTreeMap<String, MessageAttribute>,
}

impl QueueMessage {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            message_id: None,
            receipt_handle: None,
            md5_of_body: None,
            body: body.into(),
            attributes: BTreeMap::new(),
            md5_of_message_attributes: None,
            message_attributes: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageAttribute {
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "b64::opt")]
    pub binary_value: Option<Vec<u8>>,
}

/// Table row in DynamoDB JSON form.
pub type Item = HashMap<String, AttrValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    S(String),
    N(String),
    B(#[serde(with = "b64")] Vec<u8>),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    M(HashMap<String, AttrValue>),
    L(Vec<AttrValue>),
    SS(Vec<String>),
    NS(Vec<String>),
    BS(#[serde(with = "b64::list")] Vec<Vec<u8>>),
}

impl AttrValue {
    /// Key attributes may only be strings, numbers or binary.
    pub fn is_key_type(&self) -> bool {
        matches!(self, AttrValue::S(_) | AttrValue::N(_) | AttrValue::B(_))
    }
}

/// Bucket object with its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectRecord {
    pub key: String,
    pub size: u64,
    #[serde(with = "b64")]
    pub body: Vec<u8>,
}

/// Listing entry, before content is fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
}

mod b64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(d)?;
        STANDARD.decode(raw).map_err(serde::de::Error::custom)
    }

    pub mod opt {
        use super::*;

        pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
            match bytes {
                Some(b) => s.serialize_some(&STANDARD.encode(b)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| STANDARD.decode(raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }

    pub mod list {
        use super::*;
        use serde::ser::SerializeSeq;

        pub fn serialize<S: Serializer>(items: &[Vec<u8>], s: S) -> Result<S::Ok, S::Error> {
            let mut seq = s.serialize_seq(Some(items.len()))?;
            for b in items {
                seq.serialize_element(&STANDARD.encode(b))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<u8>>, D::Error> {
            Vec::<String>::deserialize(d)?
                .into_iter()
                .map(|raw| STANDARD.decode(raw).map_err(serde::de::Error::custom))
                .collect()
        }
    }
}
