use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::frame::Frame;
use crate::image_pipeline::imm::header::ImmHeader;

pub trait ImmFrameWriter {
    fn write_frame(&self, frame: &Frame, header: &ImmHeader, output: &mut dyn Write) -> Result<()>;
}
