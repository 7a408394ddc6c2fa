// Chunking Parquet writer.
//
// Key naming: {stem}_{MMDDYY}_{HHMMSS}.parquet for a single file,
// {stem}_{MMDDYY}_{HHMMSS}_part{N}.parquet (N from 1) when splitting.
// Whole-second resolution: two writes of the same object within one
// second would collide, an accepted limitation since objects are
// processed one at a time per run. Already-uploaded chunks are not
// rolled back when a later chunk fails.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use opendal::Operator;
use std::sync::Arc;

use sf2parquet_core::encode;
use sf2parquet_core::{ChunkPolicy, EventKind, EventSink, RecordSet, RecordSetWriter};

const PROCESS_NAME: &str = "write_parquet";

pub struct ParquetChunkWriter {
    operator: Operator,
    policy: ChunkPolicy,
    events: Arc<dyn EventSink>,
}

impl ParquetChunkWriter {
    pub fn new(operator: Operator, policy: ChunkPolicy, events: Arc<dyn EventSink>) -> Self {
        Self {
            operator,
            policy,
            events,
        }
    }

    /// Write against an explicit timestamp. Production goes through the
    /// trait impl, which stamps the local wall clock; tests pin the
    /// clock here.
    pub async fn write_at(
        &self,
        records: &RecordSet,
        stem: &str,
        at: NaiveDateTime,
    ) -> Result<Vec<String>> {
        match self.upload_chunks(records, stem, at).await {
            Ok(keys) => Ok(keys),
            Err(err) => {
                self.events
                    .record(
                        PROCESS_NAME,
                        EventKind::Error,
                        &format!("error saving data for {stem}: {err:#}"),
                    )
                    .await;
                Err(err)
            }
        }
    }

    async fn upload_chunks(
        &self,
        records: &RecordSet,
        stem: &str,
        at: NaiveDateTime,
    ) -> Result<Vec<String>> {
        let base = format!("{stem}_{}", at.format("%m%d%y_%H%M%S"));
        let schema = encode::inferred_schema(records.records())?;

        let mut keys = Vec::new();
        if self.policy.single_file() {
            let bytes = encode::rows_to_parquet(&schema, records.records())?;
            let key = format!("{base}.parquet");
            self.upload(&key, bytes).await?;
            keys.push(key);
        } else {
            for (index, range) in self.policy.ranges(records.len()).into_iter().enumerate() {
                let slice = &records.records()[range];
                let bytes = encode::rows_to_parquet(&schema, slice)?;
                let key = format!("{base}_part{}.parquet", index + 1);
                self.upload(&key, bytes).await?;
                keys.push(key);
            }
        }
        Ok(keys)
    }

    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let size = bytes.len();
        self.operator
            .write(key, bytes)
            .await
            .with_context(|| format!("failed to upload {key}"))?;
        tracing::debug!(key, size, "uploaded chunk");
        self.events
            .record(PROCESS_NAME, EventKind::Insert, &format!("saved {key}"))
            .await;
        Ok(())
    }
}

#[async_trait]
impl RecordSetWriter for ParquetChunkWriter {
    async fn write(&self, records: &RecordSet, stem: &str) -> Result<Vec<String>> {
        self.write_at(records, stem, Local::now().naive_local()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::NaiveDate;
    use opendal::services;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use serde_json::{json, Value};
    use sf2parquet_core::{MemorySink, Record};

    fn record_set(count: usize) -> RecordSet {
        let records: Vec<Record> = (0..count)
            .map(|i| match json!({"Id": format!("{i:03}"), "Seq": i}) {
                Value::Object(map) => map,
                _ => unreachable!(),
            })
            .collect();
        RecordSet::from_records(records)
    }

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap()
    }

    fn writer(policy: ChunkPolicy) -> (ParquetChunkWriter, Operator, Arc<MemorySink>) {
        let operator = Operator::new(services::Memory::default()).unwrap().finish();
        let events = Arc::new(MemorySink::new());
        (
            ParquetChunkWriter::new(operator.clone(), policy, events.clone()),
            operator,
            events,
        )
    }

    async fn row_count(operator: &Operator, key: &str) -> usize {
        let bytes = operator.read(key).await.unwrap().to_vec();
        assert_eq!(&bytes[0..4], b"PAR1");
        ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
            .unwrap()
            .build()
            .unwrap()
            .map(|batch| batch.unwrap().num_rows())
            .sum()
    }

    #[tokio::test]
    async fn single_file_key_matches_naming_scheme() {
        let (writer, operator, events) = writer(ChunkPolicy::new(0));

        let keys = writer
            .write_at(&record_set(3), "Account", fixed_time())
            .await
            .unwrap();

        assert_eq!(keys, vec!["Account_011524_143005.parquet"]);
        assert_eq!(row_count(&operator, &keys[0]).await, 3);

        let recorded = events.events();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].kind, EventKind::Insert);
        assert!(recorded[0].detail.contains("Account_011524_143005.parquet"));
    }

    #[tokio::test]
    async fn empty_record_set_still_writes_one_file_when_not_splitting() {
        let (writer, operator, _) = writer(ChunkPolicy::new(0));

        let keys = writer
            .write_at(&record_set(0), "Account", fixed_time())
            .await
            .unwrap();

        assert_eq!(keys.len(), 1);
        let bytes = operator.read(&keys[0]).await.unwrap().to_vec();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[0..4], b"PAR1");
    }

    #[tokio::test]
    async fn splitting_partitions_rows_into_part_files() {
        // 1 MB threshold at 10 rows/MB -> 10-row chunks
        let policy = ChunkPolicy::new(1).with_rows_per_mb(10);
        let (writer, operator, _) = writer(policy);

        let keys = writer
            .write_at(&record_set(25), "Contact", fixed_time())
            .await
            .unwrap();

        assert_eq!(
            keys,
            vec![
                "Contact_011524_143005_part1.parquet",
                "Contact_011524_143005_part2.parquet",
                "Contact_011524_143005_part3.parquet",
            ]
        );
        assert_eq!(row_count(&operator, &keys[0]).await, 10);
        assert_eq!(row_count(&operator, &keys[1]).await, 10);
        assert_eq!(row_count(&operator, &keys[2]).await, 5);
    }

    #[tokio::test]
    async fn splitting_an_empty_record_set_writes_nothing() {
        let policy = ChunkPolicy::new(1).with_rows_per_mb(10);
        let (writer, operator, events) = writer(policy);

        let keys = writer
            .write_at(&record_set(0), "Contact", fixed_time())
            .await
            .unwrap();

        assert!(keys.is_empty());
        assert!(!operator
            .exists("Contact_011524_143005_part1.parquet")
            .await
            .unwrap());
        assert!(events.events().is_empty());
    }

    #[tokio::test]
    async fn exact_multiple_has_no_short_tail() {
        let policy = ChunkPolicy::new(1).with_rows_per_mb(10);
        let (writer, operator, _) = writer(policy);

        let keys = writer
            .write_at(&record_set(20), "Lead", fixed_time())
            .await
            .unwrap();

        assert_eq!(keys.len(), 2);
        assert_eq!(row_count(&operator, &keys[0]).await, 10);
        assert_eq!(row_count(&operator, &keys[1]).await, 10);
    }
}
