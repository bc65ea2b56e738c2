//! Frame module
//!
//! Detector frames as delivered by the acquisition host, the typed attribute
//! channel that travels with them, and the capability traits the encoder and
//! file codec use to receive, forward and allocate frames.

mod allocator;
mod source;
pub mod types;

pub use allocator::{FrameAllocator, HeapAllocator};
pub use source::{FrameSink, FrameSource, VecFrameSource};
pub use types::{ElementType, Frame, FrameAttributes, PixelBuffer};
