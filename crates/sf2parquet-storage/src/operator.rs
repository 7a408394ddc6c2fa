// Storage operator construction.
//
// OpenDAL discovers AWS credentials itself (IAM role in Lambda,
// environment variables, credentials file), so only the bucket and
// optional region/endpoint come from our config.

use anyhow::{Context, Result};
use opendal::{services, Operator};

use sf2parquet_config::StorageConfig;

const DEFAULT_REGION: &str = "us-east-1";

pub fn operator_from_config(config: &StorageConfig) -> Result<Operator> {
    let mut builder = services::S3::default()
        .bucket(&config.bucket)
        .region(config.region.as_deref().unwrap_or(DEFAULT_REGION));

    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint(endpoint);
    }

    Ok(Operator::new(builder)
        .with_context(|| format!("failed to create S3 operator for bucket {}", config.bucket))?
        .finish())
}
