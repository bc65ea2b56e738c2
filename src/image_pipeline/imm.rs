//! IMM file writing module
//!
//! This module provides the fixed 1024-byte IMM frame header, raw and sparse
//! payload writers, and the multi-frame container file lifecycle.

mod file;
mod header;
mod standard_imm_writer;
pub mod types;
mod writer;

#[cfg(test)]
mod tests;

pub use file::ImmFile;
pub use header::{date_stamp, ImmHeader};
pub use standard_imm_writer::StandardImmWriter;
pub use types::{OpenMode, HEADER_SIZE, IMM_MODE, IMM_VERSION, RAW_COMPRESSION};
pub use writer::ImmFrameWriter;
