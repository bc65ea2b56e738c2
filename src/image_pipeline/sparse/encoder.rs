//! Threshold scan and two-half packing.
//!
//! The output frame holds `array_size` `u32` elements. With `n` retained samples,
//! elements `[0, n)` are the linear pixel indices and `[n, 2n)` the widened pixel
//! values; anything after `2n` is left zero. The `dlen` attribute carries `n` so the
//! writer knows how much of the buffer is meaningful.

use tracing::{debug, warn};

use crate::image_pipeline::frame::{
    ElementType, Frame, FrameAllocator, FrameAttributes, HeapAllocator, PixelBuffer,
};
use crate::image_pipeline::sparse::types::{
    SparseConfig, SparseOutput, SparseSample, SPARSE_COMPRESSION,
};

/// Pixel types the encoder can threshold.
pub trait SparsePixel: Copy {
    /// Strict comparison against the threshold. Types up to `i32` compare exactly;
    /// `u32` and `f32` convert the threshold to the pixel type first.
    fn exceeds(self, threshold: i32) -> bool;

    /// Widens to the 32-bit magnitude stored in the sparse buffer.
    fn widen(self) -> u32;
}

macro_rules! impl_integer_pixel {
    ($($t:ty),*) => {
        $(
            impl SparsePixel for $t {
                fn exceeds(self, threshold: i32) -> bool {
                    i64::from(self) > i64::from(threshold)
                }

                fn widen(self) -> u32 {
                    self as u32
                }
            }
        )*
    };
}

impl SparsePixel for u32 {
    /// The threshold takes the pixel's unsigned type, so negative thresholds wrap high.
    fn exceeds(self, threshold: i32) -> bool {
        self > threshold as u32
    }

    fn widen(self) -> u32 {
        self
    }
}

impl SparsePixel for f32 {
    fn exceeds(self, threshold: i32) -> bool {
        self > threshold as f32
    }

    fn widen(self) -> u32 {
        self as u32
    }
}

impl SparsePixel for f64 {
    fn exceeds(self, threshold: i32) -> bool {
        self > f64::from(threshold)
    }

    fn widen(self) -> u32 {
        self as u32
    }
}

impl_integer_pixel!(i8, u8, i16, u16, i32);

fn collect_samples<T: SparsePixel>(values: &[T], threshold: i32) -> Vec<SparseSample> {
    values
        .iter()
        .enumerate()
        .filter(|(_, value)| value.exceeds(threshold))
        .map(|(index, value)| SparseSample {
            index: index as u32,
            value: value.widen(),
        })
        .collect()
}

fn to_attribute(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub struct SparseEncoder<A: FrameAllocator = HeapAllocator> {
    allocator: A,
    config: SparseConfig,
    last_written: usize,
}

impl SparseEncoder<HeapAllocator> {
    pub fn new(config: SparseConfig) -> Self {
        Self::with_allocator(HeapAllocator, config)
    }
}

impl<A: FrameAllocator> SparseEncoder<A> {
    pub fn with_allocator(allocator: A, config: SparseConfig) -> Self {
        Self {
            allocator,
            config,
            last_written: 0,
        }
    }

    /// Every pixel above threshold, in increasing index order.
    ///
    /// 64-bit integer frames are not encodable and yield no samples.
    pub fn scan(&self, frame: &Frame) -> Vec<SparseSample> {
        let threshold = self.config.threshold;
        match &frame.data {
            PixelBuffer::Int8(values) => collect_samples(values, threshold),
            PixelBuffer::UInt8(values) => collect_samples(values, threshold),
            PixelBuffer::Int16(values) => collect_samples(values, threshold),
            PixelBuffer::UInt16(values) => collect_samples(values, threshold),
            PixelBuffer::Int32(values) => collect_samples(values, threshold),
            PixelBuffer::UInt32(values) => collect_samples(values, threshold),
            PixelBuffer::Float32(values) => collect_samples(values, threshold),
            PixelBuffer::Float64(values) => collect_samples(values, threshold),
            PixelBuffer::Int64(_) | PixelBuffer::UInt64(_) => {
                warn!(
                    "Unsupported element type {:?} for sparse encoding, emitting no samples",
                    frame.element_type()
                );
                Vec::new()
            }
        }
    }

    /// Encodes `frame` into a freshly allocated sparse frame. The input is not modified.
    pub fn encode(&mut self, frame: &Frame) -> SparseOutput {
        let samples = self.scan(frame);
        let array_size = self.config.array_size;
        let match_count = samples.len();

        let retained = match_count.min(self.config.max_samples());
        if retained < match_count {
            warn!(
                "Pixel hits require {} elements, limiting to {}",
                match_count * 2,
                array_size
            );
        }

        let mut output = self.allocator.alloc(ElementType::UInt32, array_size);
        let usable = matches!(&output.data, PixelBuffer::UInt32(values) if values.len() == array_size);
        if !usable {
            debug!("Allocator returned a {:?} buffer of {} elements, replacing it", output.element_type(), output.n_elements());
            output = Frame::linear(PixelBuffer::UInt32(vec![0; array_size]));
        }

        if let PixelBuffer::UInt32(packed) = &mut output.data {
            for (slot, sample) in samples[..retained].iter().enumerate() {
                packed[slot] = sample.index;
                packed[slot + retained] = sample.value;
            }
        }

        output.unique_id = frame.unique_id;
        output.timestamp = frame.timestamp;
        output.attributes = FrameAttributes {
            compressed: Some(SPARSE_COMPRESSION),
            rows: Some(to_attribute(frame.height)),
            cols: Some(to_attribute(frame.width)),
            row_beg: Some(0),
            row_end: Some(to_attribute(frame.height)),
            col_beg: Some(0),
            col_end: Some(to_attribute(frame.width)),
            row_bin: None,
            col_bin: None,
            pixel_size: Some(to_attribute(frame.bytes_per_element())),
            dlen: Some(to_attribute(retained)),
        };

        debug!(
            unique_id = frame.unique_id,
            matches = match_count,
            retained,
            "Sparse frame encoded"
        );

        self.last_written = retained;

        SparseOutput {
            frame: output,
            match_count,
            retained,
        }
    }

    /// Samples packed by the most recent `encode`.
    pub fn last_written(&self) -> usize {
        self.last_written
    }

    pub fn config(&self) -> &SparseConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SparseConfig) {
        self.config = config;
    }
}
