use std::io::Write;
use tracing::debug;
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::frame::Frame;
use crate::image_pipeline::imm::header::ImmHeader;
use crate::image_pipeline::imm::writer::ImmFrameWriter;

/// Bytes kept from each 32-bit magnitude. Wider pixel sizes are zero-extended.
const MAGNITUDE_BYTES: usize = 4;

pub struct StandardImmWriter;

impl StandardImmWriter {
    fn raw_payload(frame: &Frame, dlen: usize) -> Result<Vec<u8>> {
        let mut payload = Vec::with_capacity(dlen * frame.bytes_per_element());
        frame.data.write_le(dlen, &mut payload)?;
        Ok(payload)
    }

    /// Re-packs the first `2 * dlen` `u32` entries: indices at 4 bytes, magnitudes at `pixel_size`.
    fn sparse_payload(frame: &Frame, dlen: usize, pixel_size: usize) -> Result<Vec<u8>> {
        let entries = frame
            .data
            .as_u32()
            .ok_or(PipelineError::SparsePayloadType(frame.element_type()))?;

        let needed = dlen * 2;
        if entries.len() < needed {
            return Err(PipelineError::PayloadTooShort {
                needed,
                available: entries.len(),
            });
        }

        let (indices, rest) = entries.split_at(dlen);
        let mut payload = Vec::with_capacity(dlen * (4 + pixel_size));
        for index in indices {
            payload.extend_from_slice(&index.to_le_bytes());
        }
        for value in &rest[..dlen] {
            let bytes = value.to_le_bytes();
            let kept = pixel_size.min(MAGNITUDE_BYTES);
            payload.extend_from_slice(&bytes[..kept]);
            payload.resize(payload.len() + (pixel_size - kept), 0);
        }
        Ok(payload)
    }
}

impl ImmFrameWriter for StandardImmWriter {
    fn write_frame(&self, frame: &Frame, header: &ImmHeader, output: &mut dyn Write) -> Result<()> {
        let dlen = usize::try_from(header.data_length)
            .map_err(|_| PipelineError::InvalidDataLength(header.data_length))?;

        // Build the payload first so a bad frame leaves no partial record behind
        let payload = if header.is_compressed() {
            let pixel_size = usize::try_from(header.bytes_per_pixel).unwrap_or(0);
            Self::sparse_payload(frame, dlen, pixel_size)?
        } else {
            Self::raw_payload(frame, dlen)?
        };

        debug!(
            "Writing IMM frame {}: compression={}, dlen={}, payload={} bytes",
            header.frame_number,
            header.compression,
            dlen,
            payload.len()
        );

        output.write_all(&header.to_bytes())?;
        output.write_all(&payload)?;
        Ok(())
    }
}
