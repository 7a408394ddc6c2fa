// Snowflake session client over the legacy REST protocol
//
// login-request issues a session token, query-request executes one
// statement with positional bindings, logout-request releases the
// session. Rows come back as nullable strings in `data.rowset`.

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

use crate::error::SnowflakeError;
use sf2parquet_config::SnowflakeConfig;

/// One row: column values in select order, NULL as None.
pub type Row = Vec<Option<String>>;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryData {
    #[serde(default)]
    rowset: Vec<Row>,
}

/// Thin client holding connection parameters. Sessions are opened per
/// logical operation via [`SnowflakeClient::connect`].
#[derive(Clone)]
pub struct SnowflakeClient {
    http: Client,
    config: SnowflakeConfig,
    base_url: Url,
}

impl SnowflakeClient {
    pub fn new(config: SnowflakeConfig) -> Result<Self, SnowflakeError> {
        let base_url = Url::parse(&format!(
            "https://{}.snowflakecomputing.com",
            config.account
        ))
        .map_err(|_| {
            SnowflakeError::Config(format!("invalid account identifier: {}", config.account))
        })?;
        Self::with_base_url(config, base_url)
    }

    /// Point the client at a non-default host. Tests use a local mock
    /// server.
    pub fn with_base_url(config: SnowflakeConfig, base_url: Url) -> Result<Self, SnowflakeError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    /// Open a fresh session.
    pub async fn connect(&self) -> Result<Session, SnowflakeError> {
        let mut url = endpoint(&self.base_url, "/session/v1/login-request")?;
        url.query_pairs_mut()
            .append_pair("warehouse", &self.config.warehouse)
            .append_pair("databaseName", &self.config.database)
            .append_pair("schemaName", &self.config.schema);

        let body = json!({
            "data": {
                "LOGIN_NAME": self.config.user,
                "PASSWORD": self.config.password,
                "ACCOUNT_NAME": self.config.account,
            }
        });

        let response = self.http.post(url).json(&body).send().await?;
        let envelope: Envelope<LoginData> = read_envelope(response, "login").await?;
        if !envelope.success {
            return Err(SnowflakeError::Login(message_of(envelope.message)));
        }
        let data = envelope
            .data
            .ok_or_else(|| SnowflakeError::Protocol("login response carried no token".into()))?;

        Ok(Session {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: data.token,
        })
    }
}

/// An authenticated session. Must be closed by the owner on every exit
/// path; `close` consumes the session.
#[derive(Debug)]
pub struct Session {
    http: Client,
    base_url: Url,
    token: String,
}

impl Session {
    /// Execute one statement and return its row set. `binds` fill the
    /// statement's `?` placeholders positionally, as text.
    pub async fn query(&self, sql: &str, binds: &[&str]) -> Result<Vec<Row>, SnowflakeError> {
        let mut url = endpoint(&self.base_url, "/queries/v1/query-request")?;
        url.query_pairs_mut()
            .append_pair("requestId", &Uuid::new_v4().to_string());

        let mut body = json!({ "sqlText": sql });
        if !binds.is_empty() {
            let bindings: serde_json::Map<String, Value> = binds
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    (
                        (i + 1).to_string(),
                        json!({ "type": "TEXT", "value": value }),
                    )
                })
                .collect();
            body["bindings"] = Value::Object(bindings);
        }

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.auth_header())
            .json(&body)
            .send()
            .await?;
        let envelope: Envelope<QueryData> = read_envelope(response, "query").await?;
        if !envelope.success {
            return Err(SnowflakeError::Statement(message_of(envelope.message)));
        }
        Ok(envelope.data.unwrap_or_default().rowset)
    }

    /// Execute one statement, discarding any rows.
    pub async fn execute(&self, sql: &str, binds: &[&str]) -> Result<(), SnowflakeError> {
        self.query(sql, binds).await.map(|_| ())
    }

    /// Release the session. Best effort: a failed logout is reported to
    /// the diagnostic stream and dropped.
    pub async fn close(self) {
        let url = match endpoint(&self.base_url, "/session/logout-request") {
            Ok(url) => url,
            Err(err) => {
                tracing::debug!(error = %err, "skipping session logout");
                return;
            }
        };
        let result = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await;
        if let Err(err) = result {
            tracing::debug!(error = %err, "session logout failed");
        }
    }

    fn auth_header(&self) -> String {
        format!("Snowflake Token=\"{}\"", self.token)
    }
}

fn endpoint(base: &Url, path: &str) -> Result<Url, SnowflakeError> {
    base.join(path)
        .map_err(|err| SnowflakeError::Protocol(format!("invalid endpoint {path}: {err}")))
}

fn message_of(message: Option<String>) -> String {
    message.unwrap_or_else(|| "no error message in response".to_string())
}

async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<Envelope<T>, SnowflakeError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SnowflakeError::Protocol(format!(
            "{context} request returned HTTP {}",
            status.as_u16()
        )));
    }
    Ok(response.json().await?)
}
