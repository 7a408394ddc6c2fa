// Environment variable loading.
//
// Variable names match the original deployment so existing function
// configuration keeps working unchanged.

use crate::{ChunkConfig, RuntimeConfig, SalesforceConfig, SnowflakeConfig, StorageConfig};
use anyhow::{Context, Result};
use std::env;

/// Injectable environment access so config loading is testable without
/// touching process globals.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment.
pub struct StdEnv;

impl EnvSource for StdEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

pub(crate) fn load(env: &dyn EnvSource) -> Result<RuntimeConfig> {
    let get = |key: &str| env.get(key).unwrap_or_default();
    let get_or = |key: &str, default: &str| env.get(key).unwrap_or_else(|| default.to_string());

    let file_size_mb = match env.get("FILE_SIZE_MB") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("FILE_SIZE_MB must be a non-negative integer, got {raw:?}"))?,
        None => 0,
    };

    Ok(RuntimeConfig {
        salesforce: SalesforceConfig {
            username: get("SF_USERNAME"),
            password: get("SF_PASSWORD"),
            security_token: get("SF_SECURITY_TOKEN"),
            domain: get_or("SF_DOMAIN", "login"),
        },
        snowflake: SnowflakeConfig {
            user: get("SNOWFLAKE_USER"),
            password: get("SNOWFLAKE_PASSWORD"),
            account: get("SNOWFLAKE_ACCOUNT"),
            warehouse: get("SNOWFLAKE_WAREHOUSE"),
            database: get("SNOWFLAKE_DATABASE"),
            schema: get("SNOWFLAKE_SCHEMA"),
            log_table: get_or("SNOWFLAKE_LOG_TABLE", "LOGGING_TABLE"),
            registry_table: get_or("SNOWFLAKE_REGISTRY_TABLE", "SALESFORCE_OBJECTS"),
        },
        storage: StorageConfig {
            bucket: get("S3_BUCKET"),
            region: env.get("AWS_REGION"),
            endpoint: env.get("S3_ENDPOINT"),
        },
        chunk: ChunkConfig { file_size_mb },
    })
}
