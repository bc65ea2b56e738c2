//! Pipeline conversions module
//!
//! Frame sinks that chain the sparse encoder in front of the IMM file writer,
//! and the capture pipeline that drives them from a frame source.

mod capture_pipeline;
mod imm_capture;
mod sparse_stage;
pub mod types;


pub use capture_pipeline::{CapturePipeline, CaptureSummary};
pub use imm_capture::ImmCaptureSink;
pub use sparse_stage::SparseStage;
pub use types::{PipelineConfig, PipelineConfigBuilder};
