// AWS Lambda binary entry point
//
// Build with: cargo build -p sf2parquet-lambda
//
// The lambda_runtime crate provides the tokio runtime, so we use #[tokio::main]

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    sf2parquet_lambda::run().await
}
