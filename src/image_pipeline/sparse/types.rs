//! Sparse encoding types

use crate::image_pipeline::frame::Frame;

/// Compression tag for "index/value sparse, 4-byte index width".
pub const SPARSE_COMPRESSION: i32 = 6;

/// One above-threshold pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparseSample {
    /// Row-major linear index, truncated to 32 bits
    pub index: u32,
    /// Source value widened to 32 bits
    pub value: u32,
}

/// Configuration for sparse encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparseConfig {
    /// Pixels strictly greater than this are kept
    pub threshold: i32,
    /// Element count of every output frame; at most half of it holds samples
    pub array_size: usize,
}

impl Default for SparseConfig {
    fn default() -> Self {
        Self {
            threshold: 0,
            array_size: 1024,
        }
    }
}

impl SparseConfig {
    pub fn builder() -> SparseConfigBuilder {
        SparseConfigBuilder::default()
    }

    /// Largest number of samples one output frame can carry.
    pub fn max_samples(&self) -> usize {
        self.array_size / 2
    }
}

/// Builder for SparseConfig
#[derive(Default)]
pub struct SparseConfigBuilder {
    threshold: Option<i32>,
    array_size: Option<usize>,
}

impl SparseConfigBuilder {
    pub fn threshold(mut self, threshold: i32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn array_size(mut self, array_size: usize) -> Self {
        self.array_size = Some(array_size);
        self
    }

    pub fn build(self) -> SparseConfig {
        let default = SparseConfig::default();
        SparseConfig {
            threshold: self.threshold.unwrap_or(default.threshold),
            array_size: self.array_size.unwrap_or(default.array_size),
        }
    }
}

/// Result of encoding one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseOutput {
    /// Packed `u32` frame carrying indices then values, plus geometry attributes
    pub frame: Frame,
    /// Above-threshold pixels found in the source
    pub match_count: usize,
    /// Samples actually packed into `frame`
    pub retained: usize,
}

impl SparseOutput {
    /// True when trailing matches were dropped because the output frame was full.
    pub fn truncated(&self) -> bool {
        self.retained < self.match_count
    }
}
