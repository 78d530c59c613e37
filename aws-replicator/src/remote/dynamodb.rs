use super::{ScanPage, TableSource};
use crate::error::{ReplicationError, Result};
use crate::replicator_core::ResourceKind;
use crate::types::{AttrValue, Item};
use async_trait::async_trait;
use aws_sdk_dynamodb as ddb;
use ddb::error::DisplayErrorContext;
use ddb::primitives::Blob;
use ddb::types::AttributeValue;
use std::collections::HashMap;

pub struct AwsTableSource {
    client: ddb::Client,
}

impl AwsTableSource {
    pub fn new(client: ddb::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TableSource for AwsTableSource {
    async fn scan(&self, table_name: &str, exclusive_start_key: Option<Item>) -> Result<ScanPage> {
        let label = ResourceKind::Table.label(table_name);
        let resp = self
            .client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(exclusive_start_key.map(|k| to_sdk_item(&k)))
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_resource_not_found_exception()) {
                    ReplicationError::not_found(label.clone())
                } else {
                    ReplicationError::remote(label.clone(), DisplayErrorContext(&e).to_string())
                }
            })?;

        let items = resp
            .items()
            .iter()
            .map(from_sdk_item)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|m| ReplicationError::remote(label.clone(), m))?;
        let last_evaluated_key = resp
            .last_evaluated_key()
            .map(from_sdk_item)
            .transpose()
            .map_err(|m| ReplicationError::remote(label, m))?;

        Ok(ScanPage {
            items,
            last_evaluated_key,
        })
    }
}

fn from_sdk_item(item: &HashMap<String, AttributeValue>) -> std::result::Result<Item, String> {
    item.iter()
        .map(|(k, v)| from_sdk(v).map(|v| (k.clone(), v)))
        .collect()
}

fn from_sdk(v: &AttributeValue) -> std::result::Result<AttrValue, String> {
    Ok(match v {
        AttributeValue::S(s) => AttrValue::S(s.clone()),
        AttributeValue::N(n) => AttrValue::N(n.clone()),
        AttributeValue::B(b) => AttrValue::B(b.as_ref().to_vec()),
        AttributeValue::Bool(b) => AttrValue::Bool(*b),
        AttributeValue::Null(b) => AttrValue::Null(*b),
        AttributeValue::M(m) => AttrValue::M(from_sdk_item(m)?),
        AttributeValue::L(l) => AttrValue::L(l.iter().map(from_sdk).collect::<std::result::Result<_, _>>()?),
        AttributeValue::Ss(ss) => AttrValue::SS(ss.clone()),
        AttributeValue::Ns(ns) => AttrValue::NS(ns.clone()),
        AttributeValue::Bs(bs) => AttrValue::BS(bs.iter().map(|b| b.as_ref().to_vec()).collect()),
        other => return Err(format!("unsupported attribute value: {other:?}")),
    })
}

fn to_sdk_item(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter().map(|(k, v)| (k.clone(), to_sdk(v))).collect()
}

// Only needed for exclusive start keys, which echo back what a scan returned.
fn to_sdk(v: &AttrValue) -> AttributeValue {
    match v {
        AttrValue::S(s) => AttributeValue::S(s.clone()),
        AttrValue::N(n) => AttributeValue::N(n.clone()),
        AttrValue::B(b) => AttributeValue::B(Blob::new(b.clone())),
        AttrValue::Bool(b) => AttributeValue::Bool(*b),
        AttrValue::Null(b) => AttributeValue::Null(*b),
        AttrValue::M(m) => AttributeValue::M(to_sdk_item(m)),
        AttrValue::L(l) => AttributeValue::L(l.iter().map(to_sdk).collect()),
        AttrValue::SS(ss) => AttributeValue::Ss(ss.clone()),
        AttrValue::NS(ns) => AttributeValue::Ns(ns.clone()),
        AttrValue::BS(bs) => AttributeValue::Bs(bs.iter().map(|b| Blob::new(b.clone())).collect()),
    }
}
