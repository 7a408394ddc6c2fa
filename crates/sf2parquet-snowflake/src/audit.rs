// Audit log sink backed by the Snowflake logging table.
//
// Expected columns: ProcessName, EventType, EventDetail, EventDate,
// UserName. Append-only; this system never reads the table back.

use async_trait::async_trait;
use chrono::Utc;

use crate::client::SnowflakeClient;
use crate::error::SnowflakeError;
use sf2parquet_core::{EventKind, EventSink};

pub struct AuditLog {
    client: SnowflakeClient,
    table: String,
}

impl AuditLog {
    pub fn new(client: SnowflakeClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    async fn append(
        &self,
        process: &str,
        kind: EventKind,
        detail: &str,
        actor: &str,
    ) -> Result<(), SnowflakeError> {
        let sql = format!(
            "INSERT INTO {} (ProcessName, EventType, EventDetail, EventDate, UserName) \
             VALUES (?, ?, ?, ?, ?)",
            self.table
        );
        let event_date = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let session = self.client.connect().await?;
        let result = session
            .execute(&sql, &[process, kind.as_str(), detail, &event_date, actor])
            .await;
        session.close().await;
        result
    }
}

#[async_trait]
impl EventSink for AuditLog {
    async fn record_as(&self, process: &str, kind: EventKind, detail: &str, actor: &str) {
        if let Err(err) = self.append(process, kind, detail, actor).await {
            // The log store is the thing that failed; the diagnostic
            // stream is all that is left.
            tracing::warn!(process, error = %err, "audit event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use sf2parquet_config::SnowflakeConfig;
    use url::Url;

    fn config() -> SnowflakeConfig {
        SnowflakeConfig {
            user: "LOADER".into(),
            password: "secret".into(),
            account: "xy12345".into(),
            warehouse: "LOAD_WH".into(),
            database: "RAW".into(),
            schema: "SALESFORCE".into(),
            log_table: "LOGGING_TABLE".into(),
            registry_table: "SALESFORCE_OBJECTS".into(),
        }
    }

    fn audit_log(server: &MockServer) -> AuditLog {
        let client =
            SnowflakeClient::with_base_url(config(), Url::parse(&server.base_url()).unwrap())
                .unwrap();
        AuditLog::new(client, "LOGGING_TABLE")
    }

    #[tokio::test]
    async fn appends_one_row_per_event() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/session/v1/login-request");
                then.status(200)
                    .json_body(serde_json::json!({"success": true, "data": {"token": "tok"}}));
            })
            .await;
        let insert = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/queries/v1/query-request")
                    .body_contains("INSERT INTO LOGGING_TABLE")
                    .body_contains("extract_records")
                    .body_contains("insert")
                    .body_contains("pulled 42 records");
                then.status(200)
                    .json_body(serde_json::json!({"success": true, "data": {"rowset": []}}));
            })
            .await;
        let logout = server
            .mock_async(|when, then| {
                when.method(POST).path("/session/logout-request");
                then.status(200).json_body(serde_json::json!({"success": true}));
            })
            .await;

        audit_log(&server)
            .record("extract_records", EventKind::Insert, "pulled 42 records")
            .await;

        insert.assert_async().await;
        logout.assert_async().await;
    }

    #[tokio::test]
    async fn store_outage_never_reaches_the_caller() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/session/v1/login-request");
                then.status(500);
            })
            .await;

        // Completes without error despite the store being down.
        audit_log(&server)
            .record("run_export", EventKind::Error, "boom")
            .await;
    }

    #[tokio::test]
    async fn session_is_closed_when_the_insert_fails() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/session/v1/login-request");
                then.status(200)
                    .json_body(serde_json::json!({"success": true, "data": {"token": "tok"}}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/queries/v1/query-request");
                then.status(200).json_body(
                    serde_json::json!({"success": false, "message": "table does not exist"}),
                );
            })
            .await;
        let logout = server
            .mock_async(|when, then| {
                when.method(POST).path("/session/logout-request");
                then.status(200).json_body(serde_json::json!({"success": true}));
            })
            .await;

        audit_log(&server)
            .record("write_parquet", EventKind::Insert, "saved key")
            .await;

        logout.assert_async().await;
    }
}
