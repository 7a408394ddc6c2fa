// Salesforce REST client: describe + paginated SOQL.
//
// SOQL has no `SELECT *`, so "all fields" means describing the object
// first and selecting the field list the describe returns. query_all
// then follows nextRecordsUrl until the API reports done.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::auth::{self, SalesforceSession};
use crate::error::SalesforceError;
use crate::API_VERSION;
use sf2parquet_config::SalesforceConfig;
use sf2parquet_core::Record;

/// Mirrors the query response JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQueryResponse {
    done: bool,
    #[serde(default)]
    next_records_url: Option<String>,
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct WireDescribeResponse {
    fields: Vec<WireDescribeField>,
}

#[derive(Debug, Deserialize)]
struct WireDescribeField {
    name: String,
}

/// Salesforce API error responses are arrays of error objects.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireApiError {
    message: String,
    error_code: String,
}

#[derive(Clone)]
pub struct SalesforceClient {
    http: Client,
    config: SalesforceConfig,
    login_host: Url,
}

impl SalesforceClient {
    pub fn new(config: SalesforceConfig) -> Result<Self, SalesforceError> {
        let login_host = Url::parse(&format!("https://{}.salesforce.com", config.domain))
            .map_err(|_| {
                SalesforceError::Config(format!("invalid login domain: {}", config.domain))
            })?;
        Self::with_login_host(config, login_host)
    }

    /// Point the client at a non-default login host. Tests use a local
    /// mock server.
    pub fn with_login_host(
        config: SalesforceConfig,
        login_host: Url,
    ) -> Result<Self, SalesforceError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            config,
            login_host,
        })
    }

    /// Fresh SOAP login.
    pub async fn login(&self) -> Result<SalesforceSession, SalesforceError> {
        auth::login(
            &self.http,
            &self.login_host,
            &self.config.username,
            &self.config.password,
            &self.config.security_token,
        )
        .await
    }

    /// Field API names of one object, in describe order.
    pub async fn describe_fields(
        &self,
        session: &SalesforceSession,
        object: &str,
    ) -> Result<Vec<String>, SalesforceError> {
        let url = rest_url(
            session,
            &format!("/services/data/{API_VERSION}/sobjects/{object}/describe"),
        )?;
        let response = self.get(session, url).await?;
        let describe: WireDescribeResponse = parse_json(response).await?;
        Ok(describe.fields.into_iter().map(|f| f.name).collect())
    }

    /// Execute a SOQL query and fetch every page of results.
    pub async fn query_all(
        &self,
        session: &SalesforceSession,
        soql: &str,
    ) -> Result<Vec<Record>, SalesforceError> {
        let mut url = rest_url(session, &format!("/services/data/{API_VERSION}/query"))?;
        url.query_pairs_mut().append_pair("q", soql);

        let mut records = Vec::new();
        let mut next_url = Some(url);
        let mut page_count = 0u32;

        while let Some(url) = next_url.take() {
            page_count += 1;
            let response = self.get(session, url).await?;
            let page: WireQueryResponse = parse_json(response).await?;
            records.extend(page.records);

            if page.done {
                break;
            }
            if let Some(next) = page.next_records_url {
                next_url = Some(rest_url(session, &next)?);
            }
        }

        tracing::debug!(pages = page_count, records = records.len(), "query complete");
        Ok(records)
    }

    async fn get(
        &self,
        session: &SalesforceSession,
        url: Url,
    ) -> Result<reqwest::Response, SalesforceError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&session.session_id)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The API reports errors as an array of {message, errorCode}.
        let body = response.text().await.unwrap_or_default();
        if let Ok(errors) = serde_json::from_str::<Vec<WireApiError>>(&body) {
            if let Some(first) = errors.into_iter().next() {
                return Err(SalesforceError::Api {
                    error_code: first.error_code,
                    message: first.message,
                });
            }
        }
        Err(SalesforceError::Protocol(format!(
            "HTTP {} - {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown error")
        )))
    }
}

fn rest_url(session: &SalesforceSession, path: &str) -> Result<Url, SalesforceError> {
    let base = Url::parse(&session.instance_url).map_err(|_| {
        SalesforceError::Protocol(format!("invalid instance url: {}", session.instance_url))
    })?;
    base.join(path)
        .map_err(|_| SalesforceError::Protocol(format!("invalid path: {path}")))
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SalesforceError> {
    response.json().await.map_err(SalesforceError::Http)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config() -> SalesforceConfig {
        SalesforceConfig {
            username: "svc@example.com".into(),
            password: "hunter2".into(),
            security_token: "tok123".into(),
            domain: "login".into(),
        }
    }

    fn client(server: &MockServer) -> SalesforceClient {
        SalesforceClient::with_login_host(config(), Url::parse(&server.base_url()).unwrap())
            .unwrap()
    }

    fn login_body(server: &MockServer) -> String {
        format!(
            "<soapenv:Envelope><soapenv:Body><loginResponse><result>\
             <sessionId>SESSION-1</sessionId>\
             <serverUrl>{}/services/Soap/u/59.0/00Dxx</serverUrl>\
             </result></loginResponse></soapenv:Body></soapenv:Envelope>",
            server.base_url()
        )
    }

    async fn mock_login(server: &MockServer) {
        let body = login_body(server);
        server
            .mock_async(move |when, then| {
                when.method(POST)
                    .path("/services/Soap/u/59.0")
                    .header("SOAPAction", "login")
                    .body_contains("svc@example.com")
                    .body_contains("hunter2tok123");
                then.status(200)
                    .header("Content-Type", "text/xml")
                    .body(body);
            })
            .await;
    }

    #[tokio::test]
    async fn login_yields_session_and_instance() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;

        let session = client(&server).login().await.unwrap();

        assert_eq!(session.session_id, "SESSION-1");
        assert_eq!(session.instance_url, server.base_url());
    }

    #[tokio::test]
    async fn login_fault_is_a_login_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/services/Soap/u/59.0");
                then.status(500).body(
                    "<soapenv:Envelope><soapenv:Body><soapenv:Fault>\
                     <faultcode>INVALID_LOGIN</faultcode>\
                     <faultstring>INVALID_LOGIN: Invalid username, password, security token</faultstring>\
                     </soapenv:Fault></soapenv:Body></soapenv:Envelope>",
                );
            })
            .await;

        let err = client(&server).login().await.unwrap_err();
        assert!(matches!(err, SalesforceError::Login(_)));
        assert!(err.to_string().contains("INVALID_LOGIN"));
    }

    #[tokio::test]
    async fn describe_lists_field_names() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/services/data/v59.0/sobjects/Account/describe")
                    .header("authorization", "Bearer SESSION-1");
                then.status(200).json_body(json!({
                    "name": "Account",
                    "fields": [{"name": "Id"}, {"name": "Name"}, {"name": "Industry"}]
                }));
            })
            .await;

        let client = client(&server);
        let session = client.login().await.unwrap();
        let fields = client.describe_fields(&session, "Account").await.unwrap();

        assert_eq!(fields, vec!["Id", "Name", "Industry"]);
    }

    #[tokio::test]
    async fn query_all_follows_pagination() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;

        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/services/data/v59.0/query")
                    .query_param("q", "SELECT Id FROM Account");
                then.status(200).json_body(json!({
                    "totalSize": 3,
                    "done": false,
                    "nextRecordsUrl": "/services/data/v59.0/query/01gxx-2000",
                    "records": [
                        {"attributes": {"type": "Account"}, "Id": "001"},
                        {"attributes": {"type": "Account"}, "Id": "002"}
                    ]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/services/data/v59.0/query/01gxx-2000");
                then.status(200).json_body(json!({
                    "totalSize": 3,
                    "done": true,
                    "records": [{"attributes": {"type": "Account"}, "Id": "003"}]
                }));
            })
            .await;

        let client = client(&server);
        let session = client.login().await.unwrap();
        let records = client
            .query_all(&session, "SELECT Id FROM Account")
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["Id"], json!("001"));
        assert_eq!(records[2]["Id"], json!("003"));
    }

    #[tokio::test]
    async fn api_error_array_maps_to_typed_error() {
        let server = MockServer::start_async().await;
        mock_login(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/services/data/v59.0/query");
                then.status(400).json_body(json!([
                    {"message": "sObject type 'Bogus' is not supported.", "errorCode": "INVALID_TYPE"}
                ]));
            })
            .await;

        let client = client(&server);
        let session = client.login().await.unwrap();
        let err = client
            .query_all(&session, "SELECT Id FROM Bogus")
            .await
            .unwrap_err();

        match err {
            SalesforceError::Api {
                error_code,
                message,
            } => {
                assert_eq!(error_code, "INVALID_TYPE");
                assert!(message.contains("Bogus"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
