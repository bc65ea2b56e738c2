//! IMM frame header.

use chrono::NaiveDateTime;

use crate::image_pipeline::frame::Frame;
use crate::image_pipeline::imm::types::{
    offsets, DATE_LEN, HEADER_SIZE, IMM_MODE, IMM_VERSION, RAW_COMPRESSION,
};

/// Header values for one frame record.
///
/// Reserved and unused fields (monitor, shutter, kinetics, preset, topup, inject,
/// imageserver, CPU speed, camera type, threshold) are always written as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmHeader {
    pub compression: i32,
    pub date: [u8; DATE_LEN],
    pub frame_number: i32,
    pub row_beg: i32,
    /// Row count, not the index of the last row
    pub row_end: i32,
    pub col_beg: i32,
    /// Column count, not the index of the last column
    pub col_end: i32,
    pub row_bin: i32,
    pub col_bin: i32,
    pub rows: i32,
    pub cols: i32,
    pub bytes_per_pixel: i32,
    pub elapsed: f64,
    pub data_length: i32,
    pub buffer_number: i32,
    pub sys_tick: i32,
    pub timestamp: i32,
}

/// `asctime`-style stamp ("Fri Oct 16 09:05:03 2026\n"), zero padded to 32 bytes.
pub fn date_stamp(now: &NaiveDateTime) -> [u8; DATE_LEN] {
    let text = now.format("%a %b %e %H:%M:%S %Y\n").to_string();
    let mut date = [0u8; DATE_LEN];
    let len = text.len().min(DATE_LEN);
    date[..len].copy_from_slice(&text.as_bytes()[..len]);
    date
}

fn to_field(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl ImmHeader {
    /// Builds the header for `frame`, preferring attribute overrides over the
    /// frame's own geometry.
    ///
    /// `frame_number` fills both the frame and buffer number fields; the frame's
    /// unique id stands in for the sys tick and timestamp fields.
    pub fn for_frame(frame: &Frame, frame_number: i32, now: &NaiveDateTime) -> Self {
        let attrs = &frame.attributes;
        let height = to_field(frame.height);
        let width = to_field(frame.width);

        Self {
            compression: attrs.compressed.unwrap_or(RAW_COMPRESSION),
            date: date_stamp(now),
            frame_number,
            row_beg: attrs.row_beg.unwrap_or(0),
            row_end: attrs.row_end.unwrap_or(height),
            col_beg: attrs.col_beg.unwrap_or(0),
            col_end: attrs.col_end.unwrap_or(width),
            row_bin: attrs.row_bin.unwrap_or(1),
            col_bin: attrs.col_bin.unwrap_or(1),
            rows: attrs.rows.unwrap_or(height),
            cols: attrs.cols.unwrap_or(width),
            bytes_per_pixel: attrs.pixel_size.unwrap_or(to_field(frame.bytes_per_element())),
            elapsed: frame.timestamp,
            data_length: attrs.dlen.unwrap_or(to_field(frame.n_elements())),
            buffer_number: frame_number,
            sys_tick: frame.unique_id,
            timestamp: frame.unique_id,
        }
    }

    /// Whether the payload uses the two-half sparse layout.
    pub fn is_compressed(&self) -> bool {
        self.compression != RAW_COMPRESSION
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        put_i32(&mut buf, offsets::MODE, IMM_MODE);
        put_i32(&mut buf, offsets::COMPRESSION, self.compression);
        buf[offsets::DATE..offsets::DATE + DATE_LEN].copy_from_slice(&self.date);
        put_i32(&mut buf, offsets::FRAME_NUMBER, self.frame_number);
        put_i32(&mut buf, offsets::MONITOR, 0);
        put_i32(&mut buf, offsets::SHUTTER, 0);
        put_i32(&mut buf, offsets::ROW_BEG, self.row_beg);
        put_i32(&mut buf, offsets::ROW_END, self.row_end);
        put_i32(&mut buf, offsets::COL_BEG, self.col_beg);
        put_i32(&mut buf, offsets::COL_END, self.col_end);
        put_i32(&mut buf, offsets::ROW_BIN, self.row_bin);
        put_i32(&mut buf, offsets::COL_BIN, self.col_bin);
        put_i32(&mut buf, offsets::ROWS, self.rows);
        put_i32(&mut buf, offsets::COLS, self.cols);
        put_i32(&mut buf, offsets::BYTES_PER_PIXEL, self.bytes_per_pixel);
        put_i32(&mut buf, offsets::KINETICS, 0);
        put_i32(&mut buf, offsets::KINETICS_WINSIZE, 0);
        put_f64(&mut buf, offsets::ELAPSED, self.elapsed);
        put_f64(&mut buf, offsets::PRESET, 0.0);
        put_i32(&mut buf, offsets::TOPUP, 0);
        put_i32(&mut buf, offsets::INJECT, 0);
        put_i32(&mut buf, offsets::DATA_LENGTH, self.data_length);
        put_i32(&mut buf, offsets::ROI_NUMBER, 1);
        put_i32(&mut buf, offsets::BUFFER_NUMBER, self.buffer_number);
        put_i32(&mut buf, offsets::SYS_TICK, self.sys_tick);
        put_i32(&mut buf, offsets::IMAGESERVER, 0);
        put_i32(&mut buf, offsets::CPU_SPEED, 0);
        put_i32(&mut buf, offsets::IMM_VERSION, IMM_VERSION);
        put_i32(&mut buf, offsets::TIMESTAMP, self.timestamp);
        put_i32(&mut buf, offsets::CAMERA_TYPE, 0);
        put_i32(&mut buf, offsets::THRESHOLD, 0);

        buf
    }
}

fn put_i32(buf: &mut [u8; HEADER_SIZE], offset: usize, value: i32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_f64(buf: &mut [u8; HEADER_SIZE], offset: usize, value: f64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}
