use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::conversions::types::PipelineConfig;
use crate::image_pipeline::frame::{Frame, FrameSink};
use crate::image_pipeline::imm::{ImmFile, ImmFrameWriter, OpenMode, StandardImmWriter};

/// Capture-mode file sink: opens a container at the first frame of a session,
/// writes `num_capture` frames into it and closes it.
pub struct ImmCaptureSink<W: ImmFrameWriter = StandardImmWriter> {
    file: ImmFile<W>,
    base_path: PathBuf,
    num_capture: i32,
    file_number: i32,
    files: Vec<PathBuf>,
}

impl ImmCaptureSink<StandardImmWriter> {
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_writer(StandardImmWriter, config)
    }
}

impl<W: ImmFrameWriter> ImmCaptureSink<W> {
    pub fn with_writer(writer: W, config: &PipelineConfig) -> Self {
        Self {
            file: ImmFile::with_writer(writer),
            base_path: config.base_path(),
            num_capture: config.num_capture,
            file_number: config.file_number,
            files: Vec::new(),
        }
    }

    fn session_complete(&self) -> bool {
        self.num_capture > 0 && self.file.frames_written() >= self.num_capture
    }

    /// Re-enables capture after a rejected open.
    pub fn start_capture(&mut self) {
        self.file.arm();
    }

    pub fn imm(&self) -> &ImmFile<W> {
        &self.file
    }

    /// File number the next session will start from.
    pub fn file_number(&self) -> i32 {
        self.file_number
    }

    /// Every container opened so far, in order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl<W: ImmFrameWriter> FrameSink for ImmCaptureSink<W> {
    fn process_frame(&mut self, frame: Frame) -> Result<()> {
        if !self.file.capture_enabled() {
            debug!("Capture disabled, dropping frame {}", frame.unique_id);
            return Ok(());
        }

        if !self.file.is_open() {
            let path = self.file.open(
                &self.base_path,
                OpenMode::Write,
                self.num_capture,
                self.file_number,
            );
            self.file_number = self.file.next_file_number();
            let path = path?;
            // the file number steps past this session's range so the next file never reuses it
            self.file_number = self.file_number.saturating_add(1);
            self.files.push(path);
        }

        self.file.write(&frame)?;

        if self.session_complete() {
            info!("Captured {} frames", self.file.frames_written());
            self.file.close();
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.file.close();
        Ok(())
    }
}
