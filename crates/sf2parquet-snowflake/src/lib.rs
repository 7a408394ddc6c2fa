// sf2parquet-snowflake - Durable log store access
//
// Snowflake plays two roles here: the audit log sink and the source
// object registry. Both go through the same thin session client; each
// logical operation opens its own session and closes it on every exit
// path.

mod audit;
mod client;
mod error;
mod registry;

pub use audit::AuditLog;
pub use client::{Row, Session, SnowflakeClient};
pub use error::SnowflakeError;
pub use registry::SnowflakeRegistry;
