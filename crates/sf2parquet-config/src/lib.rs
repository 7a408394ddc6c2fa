// sf2parquet-config - Runtime configuration
//
// One RuntimeConfig value object is built from the environment at
// process start and handed to each component's constructor. Components
// never read the environment themselves.

use anyhow::{bail, Result};
use std::fmt;

mod sources;

pub use sources::{EnvSource, StdEnv};

/// Main runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub salesforce: SalesforceConfig,
    pub snowflake: SnowflakeConfig,
    pub storage: StorageConfig,
    pub chunk: ChunkConfig,
}

/// Salesforce credentials (username/password + security token flow).
#[derive(Clone)]
pub struct SalesforceConfig {
    pub username: String,
    pub password: String,
    pub security_token: String,
    /// Login host prefix: `login` for production orgs, `test` for
    /// sandboxes.
    pub domain: String,
}

impl fmt::Debug for SalesforceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SalesforceConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("security_token", &"[REDACTED]")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Snowflake connection parameters plus the two tables this system
/// touches.
#[derive(Clone)]
pub struct SnowflakeConfig {
    pub user: String,
    pub password: String,
    pub account: String,
    pub warehouse: String,
    pub database: String,
    pub schema: String,
    pub log_table: String,
    pub registry_table: String,
}

impl fmt::Debug for SnowflakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeConfig")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("account", &self.account)
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("log_table", &self.log_table)
            .field("registry_table", &self.registry_table)
            .finish()
    }
}

/// Destination bucket.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: Option<String>,
    /// Custom S3 endpoint (MinIO, localstack). None for AWS.
    pub endpoint: Option<String>,
}

/// Output file splitting.
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    /// Target file size in megabytes; 0 writes one file per object.
    pub file_size_mb: usize,
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_source(&StdEnv)
    }

    /// Load from an injected environment (tests use a map-backed source).
    pub fn from_env_source(env: &dyn EnvSource) -> Result<Self> {
        let config = sources::load(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("SF_USERNAME", &self.salesforce.username),
            ("SF_PASSWORD", &self.salesforce.password),
            ("SNOWFLAKE_USER", &self.snowflake.user),
            ("SNOWFLAKE_PASSWORD", &self.snowflake.password),
            ("SNOWFLAKE_ACCOUNT", &self.snowflake.account),
            ("S3_BUCKET", &self.storage.bucket),
        ];
        for (name, value) in required {
            if value.is_empty() {
                bail!("missing required configuration: {name}");
            }
        }
        Ok(())
    }
}
