// Trigger handler.

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;

use crate::response::RunResponse;
use sf2parquet_core::Pipeline;

/// Handle one invocation: run the full export and convert the outcome
/// into a result object. Nothing propagates past here as a runtime
/// error; failure is a 500 in the response.
pub(crate) async fn handle_trigger(
    event: LambdaEvent<Value>,
    pipeline: Arc<Pipeline>,
) -> Result<RunResponse, Error> {
    let (_payload, context) = event.into_parts();
    tracing::info!(request_id = %context.request_id, "starting export run");

    Ok(match pipeline.run().await {
        Ok(message) => RunResponse::completed(message),
        Err(err) => {
            tracing::error!("export run aborted: {err:#}");
            RunResponse::failed(format!("Error: {err:#}"))
        }
    })
}
