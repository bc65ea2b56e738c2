use std::path::PathBuf;

use thiserror::Error;

use crate::image_pipeline::frame::ElementType;
use crate::image_pipeline::imm::OpenMode;

/// Every failure here is scoped to a single call; the component is left Closed or unchanged.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unsupported open mode: {0:?} (IMM files are write-only and always created fresh)")]
    UnsupportedOpenMode(OpenMode),

    #[error("Invalid number of frames to capture: {0}. Please specify a number >= 0")]
    InvalidFrameCount(i32),

    #[error("Failed to create output file {}: {source}", path.display())]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File is not open")]
    FileNotOpen,

    #[error("Frame payload too short: need {needed} elements, frame holds {available}")]
    PayloadTooShort { needed: usize, available: usize },

    #[error("Invalid data length: {0}")]
    InvalidDataLength(i32),

    #[error("Compressed frames must carry a UInt32 buffer, got {0:?}")]
    SparsePayloadType(ElementType),

    #[error("Invalid frame dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
