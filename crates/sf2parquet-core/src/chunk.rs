// Output chunk arithmetic
//
// The configured threshold is a file size in megabytes, but the Parquet
// size of a record set is unknown until after serialization. The policy
// converts megabytes into a row count through a coarse calibratable
// constant and splits on row boundaries. Integer floor-division plus a
// remainder check, never floating point.

use std::ops::Range;

/// Approximate rows per megabyte of Parquet output. Calibratable
/// default; override with [`ChunkPolicy::with_rows_per_mb`].
pub const DEFAULT_ROWS_PER_MB: usize = 1024;

/// Row-count splitting policy derived from a megabyte threshold.
/// A threshold of 0 means "no splitting": one file regardless of size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    threshold_mb: usize,
    rows_per_mb: usize,
}

impl ChunkPolicy {
    pub fn new(threshold_mb: usize) -> Self {
        Self {
            threshold_mb,
            rows_per_mb: DEFAULT_ROWS_PER_MB,
        }
    }

    /// Override the rows-per-megabyte approximation (clamped to 1).
    pub fn with_rows_per_mb(mut self, rows_per_mb: usize) -> Self {
        self.rows_per_mb = rows_per_mb.max(1);
        self
    }

    /// True when the whole record set goes into a single unsuffixed file.
    pub fn single_file(&self) -> bool {
        self.threshold_mb == 0
    }

    /// Derived row-count threshold per chunk. Only meaningful when
    /// splitting is enabled.
    pub fn rows_per_chunk(&self) -> usize {
        self.threshold_mb * self.rows_per_mb
    }

    /// Number of output chunks for `total_rows` rows.
    ///
    /// Single-file mode always yields 1 (an empty record set still
    /// produces one empty file). Split mode yields
    /// `total_rows / rows_per_chunk`, rounded up - which is 0 for an
    /// empty record set: no rows, no files.
    pub fn chunk_count(&self, total_rows: usize) -> usize {
        if self.single_file() {
            return 1;
        }
        let per_chunk = self.rows_per_chunk();
        total_rows / per_chunk + usize::from(total_rows % per_chunk != 0)
    }

    /// Contiguous row ranges covering `total_rows`, in order. Every
    /// range except possibly the last holds exactly `rows_per_chunk`
    /// rows.
    pub fn ranges(&self, total_rows: usize) -> Vec<Range<usize>> {
        if self.single_file() {
            return vec![0..total_rows];
        }
        let per_chunk = self.rows_per_chunk();
        (0..self.chunk_count(total_rows))
            .map(|i| i * per_chunk..((i + 1) * per_chunk).min(total_rows))
            .collect()
    }
}
