// Record extractor: one object in, its full record set out.
//
// Each extraction performs a fresh login so objects never share
// session state; a token expiring mid-run can only take down the one
// object it was serving.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::client::SalesforceClient;
use crate::error::SalesforceError;
use sf2parquet_core::{EventKind, EventSink, RecordExtractor, RecordSet, SourceObject};

const PROCESS_NAME: &str = "extract_records";

pub struct SalesforceExtractor {
    client: SalesforceClient,
    events: Arc<dyn EventSink>,
}

impl SalesforceExtractor {
    pub fn new(client: SalesforceClient, events: Arc<dyn EventSink>) -> Self {
        Self { client, events }
    }

    async fn pull(&self, object: &SourceObject) -> Result<RecordSet, SalesforceError> {
        let session = self.client.login().await?;
        let fields = self.client.describe_fields(&session, object.name()).await?;
        if fields.is_empty() {
            return Err(SalesforceError::Protocol(format!(
                "describe returned no fields for {object}"
            )));
        }

        let soql = format!("SELECT {} FROM {}", fields.join(", "), object.name());
        let records = self.client.query_all(&session, &soql).await?;
        Ok(RecordSet::from_records(records))
    }
}

#[async_trait]
impl RecordExtractor for SalesforceExtractor {
    async fn extract(&self, object: &SourceObject) -> Result<RecordSet> {
        match self.pull(object).await {
            Ok(records) => {
                self.events
                    .record(
                        PROCESS_NAME,
                        EventKind::Insert,
                        &format!("pulled {} records from {object}", records.len()),
                    )
                    .await;
                Ok(records)
            }
            Err(err) => {
                self.events
                    .record(
                        PROCESS_NAME,
                        EventKind::Error,
                        &format!("error pulling data for {object}: {err}"),
                    )
                    .await;
                Err(err.into())
            }
        }
    }
}
