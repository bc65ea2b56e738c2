use std::collections::VecDeque;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::frame::types::Frame;

/// Delivers frames one at a time, in acquisition order.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Consumes frames one at a time. Hosts call `process_frame` serially.
pub trait FrameSink {
    fn process_frame(&mut self, frame: Frame) -> Result<()>;

    /// End of acquisition; releases whatever the sink still holds.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Replays a fixed list of frames.
#[derive(Debug, Default)]
pub struct VecFrameSource {
    frames: VecDeque<Frame>,
}

impl VecFrameSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames: frames.into() }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FromIterator<Frame> for VecFrameSource {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self { frames: iter.into_iter().collect() }
    }
}

impl FrameSource for VecFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }
}
