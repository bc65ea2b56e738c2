//! Sparse encoding module
//!
//! Thresholds a dense frame into index/value pairs packed into a fixed-size
//! `u32` frame that the IMM writer can store as a compressed record.

mod encoder;
pub mod types;

pub use encoder::{SparseEncoder, SparsePixel};
pub use types::{SparseConfig, SparseConfigBuilder, SparseOutput, SparseSample, SPARSE_COMPRESSION};
