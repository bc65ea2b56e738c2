//! Capture pipeline configuration types

use std::path::PathBuf;

use crate::image_pipeline::sparse::SparseConfig;

/// Configuration for a capture session
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory the container files are created in
    pub output_dir: PathBuf,
    /// File name prefix; the frame range and `.imm` are appended
    pub base_name: String,
    /// Frame number the first file's range is derived from
    pub file_number: i32,
    /// Frames per file; 0 keeps one file open until the pipeline finishes
    pub num_capture: i32,
    /// Sparse encoding in front of the writer, or `None` to store raw frames
    pub sparse: Option<SparseConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            base_name: "frames".to_string(),
            file_number: 1,
            num_capture: 1,
            sparse: None,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn base_path(&self) -> PathBuf {
        self.output_dir.join(&self.base_name)
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    output_dir: Option<PathBuf>,
    base_name: Option<String>,
    file_number: Option<i32>,
    num_capture: Option<i32>,
    sparse: Option<Option<SparseConfig>>,
}

impl PipelineConfigBuilder {
    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = Some(base_name.into());
        self
    }

    pub fn file_number(mut self, file_number: i32) -> Self {
        self.file_number = Some(file_number);
        self
    }

    pub fn num_capture(mut self, num_capture: i32) -> Self {
        self.num_capture = Some(num_capture);
        self
    }

    pub fn sparse(mut self, sparse: Option<SparseConfig>) -> Self {
        self.sparse = Some(sparse);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            base_name: self.base_name.unwrap_or(default.base_name),
            file_number: self.file_number.unwrap_or(default.file_number),
            num_capture: self.num_capture.unwrap_or(default.num_capture),
            sparse: self.sparse.unwrap_or(default.sparse),
        }
    }
}
