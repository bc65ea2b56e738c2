//! Frame data types

use std::io::Write;

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Element type of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl ElementType {
    pub fn bytes_per_element(self) -> usize {
        match self {
            ElementType::Int8 | ElementType::UInt8 => 1,
            ElementType::Int16 | ElementType::UInt16 => 2,
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => 4,
            ElementType::Int64 | ElementType::UInt64 | ElementType::Float64 => 8,
        }
    }
}

/// Homogeneously typed sample storage of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

macro_rules! for_each_buffer {
    ($buffer:expr, $values:ident => $body:expr) => {
        match $buffer {
            PixelBuffer::Int8($values) => $body,
            PixelBuffer::UInt8($values) => $body,
            PixelBuffer::Int16($values) => $body,
            PixelBuffer::UInt16($values) => $body,
            PixelBuffer::Int32($values) => $body,
            PixelBuffer::UInt32($values) => $body,
            PixelBuffer::Int64($values) => $body,
            PixelBuffer::UInt64($values) => $body,
            PixelBuffer::Float32($values) => $body,
            PixelBuffer::Float64($values) => $body,
        }
    };
}

impl PixelBuffer {
    /// Allocates a zero-filled buffer of `len` elements.
    pub fn zeroed(element_type: ElementType, len: usize) -> Self {
        match element_type {
            ElementType::Int8 => PixelBuffer::Int8(vec![0; len]),
            ElementType::UInt8 => PixelBuffer::UInt8(vec![0; len]),
            ElementType::Int16 => PixelBuffer::Int16(vec![0; len]),
            ElementType::UInt16 => PixelBuffer::UInt16(vec![0; len]),
            ElementType::Int32 => PixelBuffer::Int32(vec![0; len]),
            ElementType::UInt32 => PixelBuffer::UInt32(vec![0; len]),
            ElementType::Int64 => PixelBuffer::Int64(vec![0; len]),
            ElementType::UInt64 => PixelBuffer::UInt64(vec![0; len]),
            ElementType::Float32 => PixelBuffer::Float32(vec![0.0; len]),
            ElementType::Float64 => PixelBuffer::Float64(vec![0.0; len]),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            PixelBuffer::Int8(_) => ElementType::Int8,
            PixelBuffer::UInt8(_) => ElementType::UInt8,
            PixelBuffer::Int16(_) => ElementType::Int16,
            PixelBuffer::UInt16(_) => ElementType::UInt16,
            PixelBuffer::Int32(_) => ElementType::Int32,
            PixelBuffer::UInt32(_) => ElementType::UInt32,
            PixelBuffer::Int64(_) => ElementType::Int64,
            PixelBuffer::UInt64(_) => ElementType::UInt64,
            PixelBuffer::Float32(_) => ElementType::Float32,
            PixelBuffer::Float64(_) => ElementType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        for_each_buffer!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_u32(&self) -> Option<&[u32]> {
        match self {
            PixelBuffer::UInt32(values) => Some(values),
            _ => None,
        }
    }

    /// Writes the first `count` elements little-endian.
    pub fn write_le(&self, count: usize, output: &mut dyn Write) -> Result<()> {
        if count > self.len() {
            return Err(PipelineError::PayloadTooShort {
                needed: count,
                available: self.len(),
            });
        }

        let mut bytes = Vec::with_capacity(count * self.element_type().bytes_per_element());
        for_each_buffer!(self, values => {
            for value in &values[..count] {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        });
        output.write_all(&bytes)?;
        Ok(())
    }
}

/// Named values attached to a frame by upstream stages.
///
/// Only the fields read by the IMM header builder exist here; `None` means the
/// attribute is absent and the header falls back to the frame's own geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameAttributes {
    /// `compressed`: 0 for raw payloads, the sparse scheme tag otherwise
    pub compressed: Option<i32>,
    pub rows: Option<i32>,
    pub cols: Option<i32>,
    pub row_beg: Option<i32>,
    pub row_end: Option<i32>,
    pub col_beg: Option<i32>,
    pub col_end: Option<i32>,
    pub row_bin: Option<i32>,
    pub col_bin: Option<i32>,
    /// `pixel_size`: bytes per source pixel
    pub pixel_size: Option<i32>,
    /// `dlen`: number of valid elements, which may be less than the buffer length
    pub dlen: Option<i32>,
}

/// One detector image plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub data: PixelBuffer,
    pub unique_id: i32,
    /// Seconds, as assigned by the acquisition host
    pub timestamp: f64,
    pub attributes: FrameAttributes,
}

impl Frame {
    /// Builds a `width` x `height` frame; the buffer must hold exactly that many elements.
    pub fn new(width: usize, height: usize, data: PixelBuffer) -> Result<Self> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(PipelineError::InvalidDimensions(width, height));
        }

        Ok(Self {
            width,
            height,
            data,
            unique_id: 0,
            timestamp: 0.0,
            attributes: FrameAttributes::default(),
        })
    }

    /// Builds a one-dimensional frame spanning the whole buffer.
    pub fn linear(data: PixelBuffer) -> Self {
        Self {
            width: data.len(),
            height: 1,
            data,
            unique_id: 0,
            timestamp: 0.0,
            attributes: FrameAttributes::default(),
        }
    }

    pub fn with_unique_id(mut self, unique_id: i32) -> Self {
        self.unique_id = unique_id;
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_attributes(mut self, attributes: FrameAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn bytes_per_element(&self) -> usize {
        self.element_type().bytes_per_element()
    }

    pub fn n_elements(&self) -> usize {
        self.data.len()
    }
}
