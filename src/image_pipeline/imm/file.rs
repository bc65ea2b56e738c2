//! IMM container file lifecycle.
//!
//! One file holds a pre-declared number of consecutive frames, each a 1024-byte
//! header followed by its payload. The handle is either Closed or Open; `write`
//! is only valid while Open and `close` is always safe.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, error, info, instrument, warn};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::frame::Frame;
use crate::image_pipeline::imm::header::ImmHeader;
use crate::image_pipeline::imm::standard_imm_writer::StandardImmWriter;
use crate::image_pipeline::imm::types::OpenMode;
use crate::image_pipeline::imm::writer::ImmFrameWriter;

pub struct ImmFile<W: ImmFrameWriter = StandardImmWriter> {
    writer: W,
    file: Option<BufWriter<File>>,
    full_file_name: Option<PathBuf>,
    /// Index of the next frame within the open file
    frame_no: i32,
    next_file_number: i32,
    last_length_read: i32,
    capture_enabled: bool,
    write_enabled: bool,
}

impl ImmFile<StandardImmWriter> {
    pub fn new() -> Self {
        Self::with_writer(StandardImmWriter)
    }
}

impl Default for ImmFile<StandardImmWriter> {
    fn default() -> Self {
        Self::new()
    }
}

/// `{base}_{first:05}-{last:05}.imm`, where the range starts one below `file_number`.
pub(crate) fn container_path(base_name: &Path, file_number: i32, frame_count: i32) -> PathBuf {
    let first = file_number.saturating_sub(1);
    let last = file_number.saturating_add(frame_count).saturating_sub(2);
    let mut name = OsString::from(base_name.as_os_str());
    name.push(format!("_{:05}-{:05}.imm", first, last));
    PathBuf::from(name)
}

impl<W: ImmFrameWriter> ImmFile<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            file: None,
            full_file_name: None,
            frame_no: 0,
            next_file_number: 1,
            last_length_read: 0,
            capture_enabled: true,
            write_enabled: true,
        }
    }

    fn reject(&mut self, err: PipelineError) -> Result<PathBuf> {
        error!("{}", err);
        self.capture_enabled = false;
        self.write_enabled = false;
        Err(err)
    }

    /// Creates a fresh container for `frame_count` frames numbered from `file_number`.
    ///
    /// Any file already open is closed first. Returns the full path of the new file.
    /// Read and append modes and negative frame counts are rejected and turn the
    /// capture/write flags off. The next file number is advanced even when the file
    /// cannot be created.
    #[instrument(skip(self, base_name), fields(base = %base_name.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(
        &mut self,
        base_name: P,
        mode: OpenMode,
        frame_count: i32,
        file_number: i32,
    ) -> Result<PathBuf> {
        if mode != OpenMode::Write {
            return self.reject(PipelineError::UnsupportedOpenMode(mode));
        }

        if frame_count < 0 {
            return self.reject(PipelineError::InvalidFrameCount(frame_count));
        }

        if self.is_open() {
            self.close();
        }

        let path = container_path(base_name.as_ref(), file_number, frame_count);
        self.full_file_name = Some(path.clone());
        self.next_file_number = file_number.saturating_add(frame_count).saturating_sub(1);

        let file = File::create(&path).map_err(|source| {
            error!("Failed to create a new output file {}: {}", path.display(), source);
            PipelineError::FileCreate {
                path: path.clone(),
                source,
            }
        })?;

        self.file = Some(BufWriter::new(file));
        self.frame_no = 0;

        info!(path = %path.display(), frames = frame_count, "Opened IMM file");
        Ok(path)
    }

    /// Appends one header + payload record.
    pub fn write(&mut self, frame: &Frame) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            debug!("file is not open!");
            return Err(PipelineError::FileNotOpen);
        };

        let header = ImmHeader::for_frame(frame, self.frame_no, &Local::now().naive_local());
        self.last_length_read = header.data_length;

        self.writer.write_frame(frame, &header, file)?;
        self.frame_no += 1;
        Ok(())
    }

    /// Flushes and releases the file. A no-op when nothing is open.
    pub fn close(&mut self) {
        let Some(mut file) = self.file.take() else {
            debug!("file was not open! Ignoring close command.");
            return;
        };

        if let Err(e) = file.flush() {
            warn!("Failed to flush IMM file on close: {}", e);
        }

        info!(frames = self.frame_no, "IMM file closed");
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Path computed by the most recent accepted `open`, set even if creation failed.
    pub fn full_file_name(&self) -> Option<&Path> {
        self.full_file_name.as_deref()
    }

    /// Frames written to the current (or last) file.
    pub fn frames_written(&self) -> i32 {
        self.frame_no
    }

    /// File number to hand to the next `open`.
    pub fn next_file_number(&self) -> i32 {
        self.next_file_number
    }

    /// Data length recorded in the most recent header.
    pub fn last_length_read(&self) -> i32 {
        self.last_length_read
    }

    pub fn capture_enabled(&self) -> bool {
        self.capture_enabled
    }

    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// Turns capture and writing back on after a rejected `open`.
    pub fn arm(&mut self) {
        self.capture_enabled = true;
        self.write_enabled = true;
    }
}
