use imm_sparse_rs::image_pipeline::{
    CapturePipeline, Frame, PipelineConfig, PixelBuffer, SparseConfig, VecFrameSource,
};
use imm_sparse_rs::logger;

use tracing::{error, info};

const WIDTH: usize = 256;
const HEIGHT: usize = 256;
const FRAMES: i32 = 10;

/// Flat background with a handful of photon hits whose positions drift per frame.
fn synthetic_frame(unique_id: i32) -> anyhow::Result<Frame> {
    let mut data = vec![3u16; WIDTH * HEIGHT];
    let stride = 7919 + unique_id as usize * 13;
    for hit in 0..200 {
        let index = (hit * stride) % data.len();
        data[index] = 1000 + (hit as u16 % 64);
    }

    let frame = Frame::new(WIDTH, HEIGHT, PixelBuffer::UInt16(data))?
        .with_unique_id(unique_id)
        .with_timestamp(f64::from(unique_id) * 0.01);
    Ok(frame)
}

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting imm_sparse...");

    let config = PipelineConfig::builder()
        .output_dir(std::env::temp_dir())
        .base_name("synthetic")
        .file_number(1)
        .num_capture(FRAMES)
        .sparse(Some(
            SparseConfig::builder()
                .threshold(100)
                .array_size(1024)
                .build(),
        ))
        .build();
    let mut pipeline = CapturePipeline::new(config);

    info!("Sparse capture pipeline initialized");
    info!("Output: {}", pipeline.config().base_path().display());
    info!(
        "Sparse encoding: {}",
        if pipeline.config().sparse.is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );

    let frames = (1..=FRAMES)
        .map(synthetic_frame)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let mut source = VecFrameSource::new(frames);

    match pipeline.run(&mut source) {
        Ok(summary) => {
            for file in &summary.files {
                info!("Wrote {}", file.display());
            }
            info!(
                "Capture successful: {} frames, {} failed, {} truncated",
                summary.frames, summary.failed, summary.truncated
            );
        }
        Err(e) => error!("Capture failed: {}", e),
    }

    Ok(())
}
