use crate::image_pipeline::frame::types::{ElementType, Frame, PixelBuffer};

/// Source of fresh output frames (the host's frame pool).
pub trait FrameAllocator {
    fn alloc(&self, element_type: ElementType, len: usize) -> Frame;
}

/// Allocates each frame on the heap; ownership passes straight to the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl FrameAllocator for HeapAllocator {
    fn alloc(&self, element_type: ElementType, len: usize) -> Frame {
        Frame::linear(PixelBuffer::zeroed(element_type, len))
    }
}
