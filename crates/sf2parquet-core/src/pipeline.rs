// Run orchestrator
//
// Drives the per-object loop: registry once, then extract -> write per
// object, sequentially. One object's failure is logged and skipped;
// only a registry failure aborts the run. The concrete components
// behind the traits live in the client crates and are injected here.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::event::{EventKind, EventSink};
use crate::record::{RecordSet, SourceObject};

/// Process name the orchestrator tags its own audit events with.
pub const PROCESS_NAME: &str = "run_export";

/// Fixed confirmation message returned after all objects are attempted.
/// Deliberately does not distinguish full from partial success.
pub const COMPLETION_MESSAGE: &str = "Salesforce data successfully pulled and stored in S3.";

/// Yields the configured source object names, in registry order.
#[async_trait]
pub trait ObjectRegistry: Send + Sync {
    async fn list_objects(&self) -> Result<Vec<SourceObject>>;
}

/// Fetches every record of one source object.
#[async_trait]
pub trait RecordExtractor: Send + Sync {
    async fn extract(&self, object: &SourceObject) -> Result<RecordSet>;
}

/// Persists a record set under a naming stem, returning the written keys.
#[async_trait]
pub trait RecordSetWriter: Send + Sync {
    async fn write(&self, records: &RecordSet, stem: &str) -> Result<Vec<String>>;
}

pub struct Pipeline {
    registry: Arc<dyn ObjectRegistry>,
    extractor: Arc<dyn RecordExtractor>,
    writer: Arc<dyn RecordSetWriter>,
    events: Arc<dyn EventSink>,
}

impl Pipeline {
    pub fn new(
        registry: Arc<dyn ObjectRegistry>,
        extractor: Arc<dyn RecordExtractor>,
        writer: Arc<dyn RecordSetWriter>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            extractor,
            writer,
            events,
        }
    }

    /// Run one full export. This is the outermost error boundary: the
    /// only error that escapes is a registry failure, which leaves
    /// nothing to iterate.
    pub async fn run(&self) -> Result<String> {
        let objects = match self.registry.list_objects().await {
            Ok(objects) => objects,
            Err(err) => {
                self.events
                    .record(
                        PROCESS_NAME,
                        EventKind::Error,
                        &format!("run aborted, object list unavailable: {err:#}"),
                    )
                    .await;
                return Err(err);
            }
        };

        for object in &objects {
            if let Err(err) = self.process_object(object).await {
                self.events
                    .record(
                        PROCESS_NAME,
                        EventKind::Error,
                        &format!("error processing {object}: {err:#}"),
                    )
                    .await;
            }
        }

        Ok(COMPLETION_MESSAGE.to_string())
    }

    async fn process_object(&self, object: &SourceObject) -> Result<()> {
        let records = self.extractor.extract(object).await?;
        self.writer.write(&records, object.name()).await?;
        Ok(())
    }
}
