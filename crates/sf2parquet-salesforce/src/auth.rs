// SOAP username/password login.
//
// The partner-API login call is the only SOAP interaction; everything
// after it uses REST with the returned session id as a bearer token.
// The two fields we need come out of the response envelope by tag name,
// which spares us an XML dependency the rest of the crate has no use
// for.

use reqwest::Client;
use url::Url;

use crate::error::SalesforceError;

/// SOAP endpoint under the login host, matching [`crate::API_VERSION`].
const SOAP_LOGIN_PATH: &str = "/services/Soap/u/59.0";

/// An authenticated Salesforce session.
#[derive(Debug, Clone)]
pub struct SalesforceSession {
    /// Session id, sent as a bearer token on REST calls.
    pub session_id: String,
    /// Origin of the org's instance, e.g. `https://na139.salesforce.com`.
    pub instance_url: String,
}

/// Log in with username and password+security-token against the given
/// login host.
pub(crate) async fn login(
    http: &Client,
    login_host: &Url,
    username: &str,
    password: &str,
    security_token: &str,
) -> Result<SalesforceSession, SalesforceError> {
    let url = login_host
        .join(SOAP_LOGIN_PATH)
        .map_err(|err| SalesforceError::Config(format!("invalid login host: {err}")))?;

    let envelope = login_envelope(username, &format!("{password}{security_token}"));
    let response = http
        .post(url)
        .header("Content-Type", "text/xml; charset=UTF-8")
        .header("SOAPAction", "login")
        .body(envelope)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if let Some(fault) = extract_tag(&body, "faultstring") {
        return Err(SalesforceError::Login(fault.to_string()));
    }
    if !status.is_success() {
        return Err(SalesforceError::Protocol(format!(
            "login returned HTTP {}",
            status.as_u16()
        )));
    }

    let session_id = extract_tag(&body, "sessionId")
        .ok_or_else(|| SalesforceError::Protocol("login response missing sessionId".into()))?;
    let server_url = extract_tag(&body, "serverUrl")
        .ok_or_else(|| SalesforceError::Protocol("login response missing serverUrl".into()))?;

    // serverUrl points at the SOAP endpoint on the org's instance; the
    // REST base is its origin.
    let parsed = Url::parse(server_url)
        .map_err(|_| SalesforceError::Protocol(format!("unparseable serverUrl: {server_url}")))?;
    let instance_url = format!(
        "{}://{}",
        parsed.scheme(),
        parsed
            .host_str()
            .ok_or_else(|| SalesforceError::Protocol("serverUrl has no host".into()))?
    );
    let instance_url = match parsed.port() {
        Some(port) => format!("{instance_url}:{port}"),
        None => instance_url,
    };

    Ok(SalesforceSession {
        session_id: session_id.to_string(),
        instance_url,
    })
}

fn login_envelope(username: &str, password: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:urn="urn:partner.soap.sforce.com">
  <soapenv:Body>
    <urn:login>
      <urn:username>{}</urn:username>
      <urn:password>{}</urn:password>
    </urn:login>
  </soapenv:Body>
</soapenv:Envelope>"#,
        xml_escape(username),
        xml_escape(password)
    )
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Text content of the first `<tag>...</tag>` occurrence.
fn extract_tag<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    Some(&xml[start..end])
}
