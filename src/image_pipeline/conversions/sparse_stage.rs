use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::frame::{FrameAllocator, FrameSink, HeapAllocator, Frame};
use crate::image_pipeline::sparse::{SparseConfig, SparseEncoder};

/// Optional sparse-encoding stage in front of another sink.
///
/// Without an encoder frames pass through untouched.
pub struct SparseStage<S: FrameSink, A: FrameAllocator = HeapAllocator> {
    encoder: Option<SparseEncoder<A>>,
    downstream: S,
    truncated_frames: usize,
}

impl<S: FrameSink> SparseStage<S, HeapAllocator> {
    pub fn new(config: SparseConfig, downstream: S) -> Self {
        Self::with_encoder(Some(SparseEncoder::new(config)), downstream)
    }

    pub fn passthrough(downstream: S) -> Self {
        Self::with_encoder(None, downstream)
    }
}

impl<S: FrameSink, A: FrameAllocator> SparseStage<S, A> {
    pub fn with_encoder(encoder: Option<SparseEncoder<A>>, downstream: S) -> Self {
        Self {
            encoder,
            downstream,
            truncated_frames: 0,
        }
    }

    pub fn encoder(&self) -> Option<&SparseEncoder<A>> {
        self.encoder.as_ref()
    }

    pub fn downstream(&self) -> &S {
        &self.downstream
    }

    pub fn downstream_mut(&mut self) -> &mut S {
        &mut self.downstream
    }

    /// Frames that had more hits than the output array could carry.
    pub fn truncated_frames(&self) -> usize {
        self.truncated_frames
    }

    pub fn into_inner(self) -> S {
        self.downstream
    }
}

impl<S: FrameSink, A: FrameAllocator> FrameSink for SparseStage<S, A> {
    fn process_frame(&mut self, frame: Frame) -> Result<()> {
        let Some(encoder) = self.encoder.as_mut() else {
            return self.downstream.process_frame(frame);
        };

        let output = encoder.encode(&frame);
        if output.truncated() {
            self.truncated_frames += 1;
        }
        debug!(
            "Frame {} -> {} sparse samples",
            frame.unique_id, output.retained
        );
        self.downstream.process_frame(output.frame)
    }

    fn finish(&mut self) -> Result<()> {
        self.downstream.finish()
    }
}
