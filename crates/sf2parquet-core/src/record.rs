// Record-set model
//
// A record is the JSON field-map the Salesforce REST API returns for one
// row. The API attaches an `attributes` sub-structure (object type and
// row URL) to every record; it is metadata, not data, and is stripped
// when records are materialized into a RecordSet.

use serde_json::{Map, Value};
use std::fmt;

/// Reserved per-record metadata key injected by the source API.
pub const RESERVED_METADATA_FIELD: &str = "attributes";

/// API name of one queryable Salesforce object, as configured in the
/// registry table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceObject(String);

impl SourceObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row: field name to scalar-or-null value.
pub type Record = Map<String, Value>;

/// All rows retrieved for one source object in one run. Row order is
/// whatever the source returned; nothing downstream depends on it.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    /// Materialize raw records, dropping the reserved metadata field
    /// from each.
    pub fn from_records(mut records: Vec<Record>) -> Self {
        for record in &mut records {
            record.remove(RESERVED_METADATA_FIELD);
        }
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}
