use crate::backend::BackendLocator;
use crate::config::EnumerationConfig;
use crate::error::{ReplicationError, Result};
use crate::remote::RemoteClientFactory;
use crate::replicator_core::{Enumerator, Injector, ResourceDescriptor, ResourceKind};
use crate::types::Item;
use crate::utils::chunked;
use async_trait::async_trait;
use serde_json::{json, Map};
use tracing::{debug, info, warn};

pub const ITEMS_FIELD: &str = "Items";

/// Batch-write limit of the provider.
pub const BATCH_WRITE_SIZE: usize = 25;

/// Full table scan on the remote side, upsert on the local side.
pub struct DynamoDbTableReplicator;

impl DynamoDbTableReplicator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DynamoDbTableReplicator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Enumerator for DynamoDbTableReplicator {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Table
    }

    async fn enumerate(
        &self,
        table_name: &str,
        remote: &dyn RemoteClientFactory,
        config: &EnumerationConfig,
    ) -> Result<ResourceDescriptor> {
        debug!(table = table_name, "copying items from source table");
        let source = remote.tables();

        let mut items: Vec<Item> = Vec::new();
        let mut start_key: Option<Item> = None;
        let mut pages = 0;
        loop {
            let page = source.scan(table_name, start_key.take()).await?;
            pages += 1;
            items.extend(page.items);

            match page.last_evaluated_key {
                None => break,
                Some(_) if pages >= config.max_scan_pages => {
                    warn!(
                        table = table_name,
                        pages,
                        items = items.len(),
                        "scan budget exhausted, replicating partial table"
                    );
                    break;
                }
                Some(key) => start_key = Some(key),
            }
        }
        info!(table = table_name, items = items.len(), pages, "enumerated table");

        let mut props = Map::new();
        props.insert(ResourceKind::Table.name_property().into(), json!(table_name));
        props.insert(ITEMS_FIELD.into(), json!(items));
        Ok(ResourceDescriptor::new(ResourceKind::Table, table_name, props))
    }
}

#[async_trait]
impl Injector for DynamoDbTableReplicator {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Table
    }

    async fn inject(&self, descriptor: &ResourceDescriptor, backends: &dyn BackendLocator) -> Result<()> {
        let table_name = descriptor.resource_name(ResourceKind::Table);
        let items: Vec<Item> = descriptor.payload(ITEMS_FIELD)?;
        let table = backends
            .find_table(&table_name)
            .await
            .ok_or_else(|| ReplicationError::target_missing(ResourceKind::Table.label(&table_name)))?;

        info!(table = %table_name, items = items.len(), "writing items into table");
        for batch in chunked(&items, BATCH_WRITE_SIZE) {
            table.batch_write(batch).await?;
        }
        Ok(())
    }
}
