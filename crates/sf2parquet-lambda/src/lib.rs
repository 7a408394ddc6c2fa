// AWS Lambda runtime adapter
//
// Wires configuration to concrete components and hands the pipeline to
// lambda_runtime. The trigger payload is opaque (a schedule fires the
// function); the response is the {statusCode, body} result object the
// invoker inspects.

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;

mod handlers;
mod response;

use handlers::handle_trigger;

use sf2parquet_config::RuntimeConfig;
use sf2parquet_core::{ChunkPolicy, EventSink, Pipeline};
use sf2parquet_salesforce::{SalesforceClient, SalesforceExtractor};
use sf2parquet_snowflake::{AuditLog, SnowflakeClient, SnowflakeRegistry};
use sf2parquet_storage::{operator_from_config, ParquetChunkWriter};

/// Build the pipeline from a loaded configuration.
pub fn build_pipeline(config: &RuntimeConfig) -> anyhow::Result<Pipeline> {
    let snowflake = SnowflakeClient::new(config.snowflake.clone())?;
    let events: Arc<dyn EventSink> = Arc::new(AuditLog::new(
        snowflake.clone(),
        config.snowflake.log_table.clone(),
    ));

    let registry = SnowflakeRegistry::new(
        snowflake,
        config.snowflake.registry_table.clone(),
        events.clone(),
    );
    let extractor = SalesforceExtractor::new(
        SalesforceClient::new(config.salesforce.clone())?,
        events.clone(),
    );
    let writer = ParquetChunkWriter::new(
        operator_from_config(&config.storage)?,
        ChunkPolicy::new(config.chunk.file_size_mb),
        events.clone(),
    );

    Ok(Pipeline::new(
        Arc::new(registry),
        Arc::new(extractor),
        Arc::new(writer),
        events,
    ))
}

/// Lambda runtime entry point
pub async fn run() -> Result<(), Error> {
    tracing_subscriber::fmt().with_ansi(false).init();

    let config = RuntimeConfig::from_env()
        .map_err(|err| Error::from(format!("configuration error: {err:#}")))?;
    let pipeline = Arc::new(
        build_pipeline(&config)
            .map_err(|err| Error::from(format!("initialization error: {err:#}")))?,
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let pipeline = pipeline.clone();
        async move { handle_trigger(event, pipeline).await }
    }))
    .await
}
