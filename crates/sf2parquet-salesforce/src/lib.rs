// sf2parquet-salesforce - CRM source access
//
// Username/password+token SOAP login, object describe, and paginated
// SOQL execution over the REST API. The extractor on top is what the
// pipeline sees.

mod auth;
mod client;
mod error;
mod extract;

pub use auth::SalesforceSession;
pub use client::SalesforceClient;
pub use error::SalesforceError;
pub use extract::SalesforceExtractor;

/// REST API version all requests are pinned to.
pub const API_VERSION: &str = "v59.0";
