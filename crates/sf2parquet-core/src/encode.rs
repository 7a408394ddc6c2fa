// JSON-record to Parquet encoding
//
// Records arrive as untyped JSON field-maps. The Arrow schema is
// inferred once over the whole record set so every chunk of one run
// shares it, then each row slice is decoded and serialized
// independently.

use anyhow::{Context, Result};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::json::reader::infer_json_schema_from_iterator;
use arrow::json::ReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use serde_json::Value;
use std::sync::{Arc, OnceLock};

use crate::record::Record;

/// Shared writer properties (cached)
///
/// Same recipe for every file: ZSTD, dictionary encoding, 32k rows per
/// group.
pub fn writer_properties() -> &'static WriterProperties {
    static PROPERTIES: OnceLock<WriterProperties> = OnceLock::new();
    PROPERTIES.get_or_init(|| {
        let level = ZstdLevel::try_new(2).unwrap_or_default();
        WriterProperties::builder()
            .set_dictionary_enabled(true)
            .set_statistics_enabled(EnabledStatistics::Page)
            .set_compression(Compression::ZSTD(level))
            .set_write_batch_size(32 * 1024)
            .set_max_row_group_size(32 * 1024)
            .build()
    })
}

/// Infer one Arrow schema over the full record set.
///
/// Columns that are null in every record come back as the Null type,
/// which Parquet cannot store; they are widened to nullable Utf8. An
/// empty record set yields an empty schema (and ultimately a Parquet
/// file with no columns).
pub fn inferred_schema(records: &[Record]) -> Result<SchemaRef> {
    if records.is_empty() {
        return Ok(Arc::new(Schema::empty()));
    }

    let schema = infer_json_schema_from_iterator(
        records
            .iter()
            .map(|record| Ok(Value::Object(record.clone()))),
    )
    .context("failed to infer schema from records")?;

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| match field.data_type() {
            DataType::Null => Field::new(field.name(), DataType::Utf8, true),
            _ => field.as_ref().clone(),
        })
        .collect();

    Ok(Arc::new(Schema::new(fields)))
}

/// Serialize a row slice into one Parquet blob against a shared schema.
pub fn rows_to_parquet(schema: &SchemaRef, rows: &[Record]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let props = writer_properties().clone();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema.clone(), Some(props))
        .context("failed to open parquet writer")?;

    // A writer closed with no batches still produces a valid file:
    // schema plus footer, zero row groups. That is the single empty
    // file the no-splitting path emits for an empty record set.
    if !rows.is_empty() && !schema.fields().is_empty() {
        let mut decoder = ReaderBuilder::new(schema.clone())
            .with_batch_size(rows.len())
            .build_decoder()
            .context("failed to build row decoder")?;
        decoder
            .serialize(rows)
            .context("failed to decode records against inferred schema")?;
        while let Some(batch) = decoder.flush()? {
            writer.write(&batch)?;
        }
    }

    writer.close().context("failed to finish parquet file")?;
    Ok(buffer)
}
