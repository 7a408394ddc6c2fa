// sf2parquet-storage - Object storage output
//
// Builds the OpenDAL operator for the destination bucket and implements
// the chunking Parquet writer on top of it.

mod operator;
mod writer;

pub use operator::operator_from_config;
pub use writer::ParquetChunkWriter;
