use std::path::PathBuf;

use tracing::{error, info, instrument};

use crate::image_pipeline::{
    common::error::Result,
    conversions::{ImmCaptureSink, PipelineConfig, SparseStage},
    frame::{FrameSink, FrameSource, HeapAllocator},
    imm::{ImmFrameWriter, StandardImmWriter},
    sparse::SparseEncoder,
};

/// Outcome of one `CapturePipeline::run`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureSummary {
    /// Frames pulled from the source
    pub frames: usize,
    /// Frames the sink rejected; processing continued past them
    pub failed: usize,
    /// Frames whose sparse hits exceeded the output array
    pub truncated: usize,
    /// Containers opened during the run
    pub files: Vec<PathBuf>,
}

pub struct CapturePipeline<W: ImmFrameWriter = StandardImmWriter> {
    stage: SparseStage<ImmCaptureSink<W>, HeapAllocator>,
    config: PipelineConfig,
}

impl CapturePipeline<StandardImmWriter> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_custom(StandardImmWriter, config)
    }
}

impl<W: ImmFrameWriter> CapturePipeline<W> {
    pub fn with_custom(writer: W, config: PipelineConfig) -> Self {
        let sink = ImmCaptureSink::with_writer(writer, &config);
        let encoder = config.sparse.map(SparseEncoder::new);
        Self {
            stage: SparseStage::with_encoder(encoder, sink),
            config,
        }
    }

    /// Drains `source` through the optional sparse stage into the IMM sink, then
    /// closes any file still open.
    #[instrument(skip(self, source), fields(base = %self.config.base_path().display()))]
    pub fn run(&mut self, source: &mut dyn FrameSource) -> Result<CaptureSummary> {
        info!("Starting capture");

        let files_before = self.sink().files().len();
        let truncated_before = self.stage.truncated_frames();
        let mut summary = CaptureSummary::default();

        while let Some(frame) = source.next_frame() {
            summary.frames += 1;
            let unique_id = frame.unique_id;

            let _span = tracing::debug_span!("process_frame", unique_id).entered();
            if let Err(e) = self.stage.process_frame(frame) {
                error!("Frame {} not written: {}", unique_id, e);
                summary.failed += 1;
            }
        }

        self.stage.finish()?;

        summary.truncated = self.stage.truncated_frames() - truncated_before;
        summary.files = self.sink().files()[files_before..].to_vec();

        info!(
            frames = summary.frames,
            failed = summary.failed,
            files = summary.files.len(),
            "Capture complete"
        );
        Ok(summary)
    }

    pub fn sink(&self) -> &ImmCaptureSink<W> {
        self.stage.downstream()
    }

    /// Re-arms the file sink after a rejected open.
    pub fn start_capture(&mut self) {
        self.stage.downstream_mut().start_capture();
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
