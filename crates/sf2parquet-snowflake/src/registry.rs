// Source object registry.
//
// One table, one column: the API names of the Salesforce objects to
// pull this run. Result order is the query result order, so audit
// trails list objects the same way run after run.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::client::SnowflakeClient;
use crate::error::SnowflakeError;
use sf2parquet_core::{EventKind, EventSink, ObjectRegistry, SourceObject};

const PROCESS_NAME: &str = "list_source_objects";

pub struct SnowflakeRegistry {
    client: SnowflakeClient,
    table: String,
    events: Arc<dyn EventSink>,
}

impl SnowflakeRegistry {
    pub fn new(client: SnowflakeClient, table: impl Into<String>, events: Arc<dyn EventSink>) -> Self {
        Self {
            client,
            table: table.into(),
            events,
        }
    }

    async fn fetch(&self) -> Result<Vec<SourceObject>, SnowflakeError> {
        let session = self.client.connect().await?;
        let result = session
            .query(&format!("SELECT object_name FROM {}", self.table), &[])
            .await;
        session.close().await;

        let rows = result?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .map(SourceObject::new)
            .collect())
    }
}

#[async_trait]
impl ObjectRegistry for SnowflakeRegistry {
    async fn list_objects(&self) -> Result<Vec<SourceObject>> {
        match self.fetch().await {
            Ok(objects) => {
                let names: Vec<&str> = objects.iter().map(SourceObject::name).collect();
                self.events
                    .record(
                        PROCESS_NAME,
                        EventKind::Insert,
                        &format!("retrieved objects: {names:?}"),
                    )
                    .await;
                Ok(objects)
            }
            Err(err) => {
                self.events
                    .record(
                        PROCESS_NAME,
                        EventKind::Error,
                        &format!("error retrieving object list: {err}"),
                    )
                    .await;
                Err(err.into())
            }
        }
    }
}
