//! Image processing pipeline module
//!
//! Detector frames flow from a `FrameSource` through an optional sparse
//! encoding stage into an IMM container file writer.

pub mod common;
pub mod conversions;
pub mod frame;
pub mod imm;
pub mod sparse;

pub use common::{
    PipelineError,
    Result,
};

pub use frame::{
    ElementType,
    Frame,
    FrameAllocator,
    FrameAttributes,
    FrameSink,
    FrameSource,
    HeapAllocator,
    PixelBuffer,
    VecFrameSource,
};

pub use sparse::{
    SparseConfig,
    SparseConfigBuilder,
    SparseEncoder,
    SparseOutput,
    SparseSample,
    SPARSE_COMPRESSION,
};

pub use imm::{
    ImmFile,
    ImmFrameWriter,
    ImmHeader,
    OpenMode,
    StandardImmWriter,
};

pub use conversions::{
    CapturePipeline,
    CaptureSummary,
    ImmCaptureSink,
    PipelineConfig,
    PipelineConfigBuilder,
    SparseStage,
};
