use std::io::Write;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tempfile::TempDir;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::frame::{Frame, FrameAttributes, PixelBuffer};
use crate::image_pipeline::imm::file::container_path;
use crate::image_pipeline::imm::header::{date_stamp, ImmHeader};
use crate::image_pipeline::imm::types::{offsets, OpenMode, HEADER_SIZE};
use crate::image_pipeline::imm::writer::ImmFrameWriter;
use crate::image_pipeline::imm::{ImmFile, StandardImmWriter};
use crate::image_pipeline::sparse::SPARSE_COMPRESSION;

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn read_f64(bytes: &[u8], offset: usize) -> f64 {
    f64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

fn sample_time() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(9, 5, 3)
        .unwrap()
}

fn raw_frame() -> Frame {
    Frame::new(10, 10, PixelBuffer::UInt16((0..100).collect()))
        .unwrap()
        .with_unique_id(17)
        .with_timestamp(12.5)
}

fn sparse_frame(dlen: usize, pixel_size: i32, capacity: usize) -> Frame {
    let mut data = vec![0u32; capacity];
    for i in 0..dlen {
        data[i] = (i as u32) * 3;
        data[i + dlen] = 0x0102_0300 + i as u32;
    }
    Frame::linear(PixelBuffer::UInt32(data)).with_attributes(FrameAttributes {
        compressed: Some(SPARSE_COMPRESSION),
        rows: Some(8),
        cols: Some(16),
        pixel_size: Some(pixel_size),
        dlen: Some(dlen as i32),
        ..FrameAttributes::default()
    })
}

#[test]
fn test_header_field_offsets() {
    let header = ImmHeader {
        compression: 6,
        date: date_stamp(&sample_time()),
        frame_number: 3,
        row_beg: 4,
        row_end: 5,
        col_beg: 6,
        col_end: 7,
        row_bin: 8,
        col_bin: 9,
        rows: 10,
        cols: 11,
        bytes_per_pixel: 2,
        elapsed: 1.75,
        data_length: 12,
        buffer_number: 13,
        sys_tick: 14,
        timestamp: 15,
    };

    let bytes = header.to_bytes();
    assert_eq!(bytes.len(), HEADER_SIZE);

    assert_eq!(read_i32(&bytes, offsets::MODE), 2);
    assert_eq!(read_i32(&bytes, offsets::COMPRESSION), 6);
    assert_eq!(&bytes[offsets::DATE..offsets::DATE + 25], b"Fri Oct 16 09:05:03 2026\n");
    assert_eq!(bytes[offsets::DATE + 25], 0);
    assert_eq!(read_i32(&bytes, offsets::FRAME_NUMBER), 3);
    assert_eq!(read_i32(&bytes, offsets::MONITOR), 0);
    assert_eq!(read_i32(&bytes, offsets::SHUTTER), 0);
    assert_eq!(read_i32(&bytes, offsets::ROW_BEG), 4);
    assert_eq!(read_i32(&bytes, offsets::ROW_END), 5);
    assert_eq!(read_i32(&bytes, offsets::COL_BEG), 6);
    assert_eq!(read_i32(&bytes, offsets::COL_END), 7);
    assert_eq!(read_i32(&bytes, offsets::ROW_BIN), 8);
    assert_eq!(read_i32(&bytes, offsets::COL_BIN), 9);
    assert_eq!(read_i32(&bytes, offsets::ROWS), 10);
    assert_eq!(read_i32(&bytes, offsets::COLS), 11);
    assert_eq!(read_i32(&bytes, offsets::BYTES_PER_PIXEL), 2);
    assert_eq!(read_i32(&bytes, offsets::KINETICS), 0);
    assert_eq!(read_i32(&bytes, offsets::KINETICS_WINSIZE), 0);
    assert_eq!(read_f64(&bytes, offsets::ELAPSED), 1.75);
    assert_eq!(read_f64(&bytes, offsets::PRESET), 0.0);
    assert_eq!(read_i32(&bytes, offsets::TOPUP), 0);
    assert_eq!(read_i32(&bytes, offsets::INJECT), 0);
    assert_eq!(read_i32(&bytes, offsets::DATA_LENGTH), 12);
    assert_eq!(read_i32(&bytes, offsets::ROI_NUMBER), 1);
    assert_eq!(read_i32(&bytes, offsets::BUFFER_NUMBER), 13);
    assert_eq!(read_i32(&bytes, offsets::SYS_TICK), 14);
    assert_eq!(read_i32(&bytes, offsets::IMAGESERVER), 0);
    assert_eq!(read_i32(&bytes, offsets::CPU_SPEED), 0);
    assert_eq!(read_i32(&bytes, offsets::IMM_VERSION), 12);
    assert_eq!(read_i32(&bytes, offsets::TIMESTAMP), 15);
    assert_eq!(read_i32(&bytes, offsets::CAMERA_TYPE), 0);
    assert_eq!(read_i32(&bytes, offsets::THRESHOLD), 0);
}

#[test]
fn test_header_defaults_from_frame() {
    let frame = Frame::new(6, 4, PixelBuffer::Float32(vec![0.0; 24]))
        .unwrap()
        .with_unique_id(99)
        .with_timestamp(0.5);
    let header = ImmHeader::for_frame(&frame, 2, &sample_time());

    assert_eq!(header.compression, 0);
    assert!(!header.is_compressed());
    assert_eq!((header.rows, header.cols), (4, 6));
    assert_eq!((header.row_beg, header.row_end), (0, 4));
    assert_eq!((header.col_beg, header.col_end), (0, 6));
    assert_eq!((header.row_bin, header.col_bin), (1, 1));
    assert_eq!(header.bytes_per_pixel, 4);
    assert_eq!(header.data_length, 24);
    assert_eq!((header.frame_number, header.buffer_number), (2, 2));
    assert_eq!((header.sys_tick, header.timestamp), (99, 99));
    assert_eq!(header.elapsed, 0.5);
}

#[test]
fn test_header_attribute_overrides() {
    let frame = sparse_frame(4, 2, 32).with_unique_id(5);
    let header = ImmHeader::for_frame(&frame, 0, &sample_time());

    assert_eq!(header.compression, SPARSE_COMPRESSION);
    assert!(header.is_compressed());
    assert_eq!((header.rows, header.cols), (8, 16));
    assert_eq!(header.bytes_per_pixel, 2);
    assert_eq!(header.data_length, 4);
    // no row_end override: falls back to the carrying frame's own height
    assert_eq!(header.row_end, 1);
}

#[test]
fn test_container_path_numbering() {
    let path = container_path(std::path::Path::new("/data/scan"), 5, 3);
    assert_eq!(path, std::path::PathBuf::from("/data/scan_00004-00006.imm"));

    let single = container_path(std::path::Path::new("run"), 1, 1);
    assert_eq!(single, std::path::PathBuf::from("run_00000-00000.imm"));
}

#[test]
fn test_open_rejects_read_append_and_negative_count() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("scan");

    for (mode, count) in [(OpenMode::Read, 3), (OpenMode::Append, 3), (OpenMode::Write, -1)] {
        let mut imm = ImmFile::new();
        let result = imm.open(&base, mode, count, 5);

        match (mode, result) {
            (OpenMode::Write, Err(PipelineError::InvalidFrameCount(-1))) => {}
            (OpenMode::Read | OpenMode::Append, Err(PipelineError::UnsupportedOpenMode(m))) => {
                assert_eq!(m, mode)
            }
            (_, other) => panic!("unexpected result {:?}", other),
        }
        assert!(!imm.is_open());
        assert!(!imm.capture_enabled());
        assert!(!imm.write_enabled());
        assert!(imm.full_file_name().is_none());
        assert_eq!(imm.next_file_number(), 1);

        imm.arm();
        assert!(imm.capture_enabled() && imm.write_enabled());
    }

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_open_creation_failure_stays_closed() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("missing").join("scan");

    let mut imm = ImmFile::new();
    let result = imm.open(&base, OpenMode::Write, 3, 5);

    assert!(matches!(result, Err(PipelineError::FileCreate { .. })));
    assert!(!imm.is_open());
    assert!(imm.full_file_name().is_some());
    assert_eq!(imm.next_file_number(), 7);
    assert!(matches!(imm.write(&raw_frame()), Err(PipelineError::FileNotOpen)));
}

#[test]
fn test_write_while_closed() {
    let mut imm = ImmFile::new();
    let result = imm.write(&raw_frame());

    assert!(matches!(result, Err(PipelineError::FileNotOpen)));
    assert_eq!(imm.frames_written(), 0);
    assert_eq!(imm.last_length_read(), 0);
}

#[test]
fn test_three_frame_session() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("scan");

    let mut imm = ImmFile::new();
    let path = imm.open(&base, OpenMode::Write, 3, 5).unwrap();
    assert_eq!(path, dir.path().join("scan_00004-00006.imm"));
    assert_eq!(imm.full_file_name(), Some(path.as_path()));
    assert_eq!(imm.next_file_number(), 7);

    let frames = [raw_frame(), sparse_frame(4, 2, 16), raw_frame()];
    for frame in &frames {
        imm.write(frame).unwrap();
    }
    assert_eq!(imm.frames_written(), 3);
    imm.close();

    let bytes = std::fs::read(&path).unwrap();
    let payloads = [200, 4 * 4 + 4 * 2, 200];
    assert_eq!(bytes.len(), 3 * HEADER_SIZE + payloads.iter().sum::<usize>());

    let mut offset = 0;
    for (expected, payload) in payloads.iter().enumerate() {
        let header = &bytes[offset..offset + HEADER_SIZE];
        assert_eq!(read_i32(header, offsets::FRAME_NUMBER), expected as i32);
        assert_eq!(read_i32(header, offsets::BUFFER_NUMBER), expected as i32);
        offset += HEADER_SIZE + payload;
    }
}

#[test]
fn test_raw_payload_verbatim() {
    let dir = TempDir::new().unwrap();
    let mut imm = ImmFile::new();
    let path = imm.open(dir.path().join("raw"), OpenMode::Write, 1, 1).unwrap();

    let frame = raw_frame();
    imm.write(&frame).unwrap();
    imm.close();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE + 200);
    assert_eq!(read_i32(&bytes, offsets::COMPRESSION), 0);
    assert_eq!(read_i32(&bytes, offsets::DATA_LENGTH), 100);
    assert_eq!(read_i32(&bytes, offsets::BYTES_PER_PIXEL), 2);
    assert_eq!(read_i32(&bytes, offsets::SYS_TICK), 17);
    assert_eq!(read_f64(&bytes, offsets::ELAPSED), 12.5);

    let expected: Vec<u8> = (0u16..100).flat_map(|v| v.to_le_bytes()).collect();
    assert_eq!(&bytes[HEADER_SIZE..], expected.as_slice());
    assert_eq!(imm.last_length_read(), 100);
}

#[test]
fn test_sparse_payload_two_half_layout() {
    let dir = TempDir::new().unwrap();
    let mut imm = ImmFile::new();
    let path = imm.open(dir.path().join("sparse"), OpenMode::Write, 1, 1).unwrap();

    imm.write(&sparse_frame(4, 2, 64)).unwrap();
    imm.close();

    let bytes = std::fs::read(&path).unwrap();
    let payload = &bytes[HEADER_SIZE..];
    assert_eq!(read_i32(&bytes, offsets::COMPRESSION), 6);
    assert_eq!(read_i32(&bytes, offsets::DATA_LENGTH), 4);
    assert_eq!(payload.len(), 4 * 4 + 4 * 2);

    for i in 0..4 {
        assert_eq!(read_i32(payload, i * 4), (i as i32) * 3);
    }
    let magnitudes = &payload[16..];
    for i in 0..4 {
        // low two bytes of 0x010203xx
        assert_eq!(magnitudes[i * 2..i * 2 + 2], [i as u8, 0x03]);
    }
    assert_eq!(imm.last_length_read(), 4);
}

#[test]
fn test_sparse_payload_wide_pixels_are_zero_extended() {
    let frame = sparse_frame(2, 8, 4);
    let header = ImmHeader::for_frame(&frame, 0, &sample_time());
    let mut out = Vec::new();
    StandardImmWriter.write_frame(&frame, &header, &mut out).unwrap();

    let payload = &out[HEADER_SIZE..];
    assert_eq!(payload.len(), 2 * 4 + 2 * 8);
    assert_eq!(&payload[8..16], &[0x00, 0x03, 0x02, 0x01, 0, 0, 0, 0]);
}

#[test]
fn test_bad_payload_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut imm = ImmFile::new();
    let path = imm.open(dir.path().join("bad"), OpenMode::Write, 2, 1).unwrap();

    let mut short = sparse_frame(4, 2, 8);
    short.data = PixelBuffer::UInt32(vec![0; 6]);
    assert!(matches!(
        imm.write(&short),
        Err(PipelineError::PayloadTooShort { needed: 8, available: 6 })
    ));

    short.data = PixelBuffer::UInt16(vec![0; 8]);
    assert!(matches!(imm.write(&short), Err(PipelineError::SparsePayloadType(_))));

    let mut oversized = raw_frame();
    oversized.attributes.dlen = Some(101);
    assert!(matches!(imm.write(&oversized), Err(PipelineError::PayloadTooShort { .. })));

    assert_eq!(imm.frames_written(), 0);
    imm.close();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn test_negative_data_length_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut imm = ImmFile::new();
    let path = imm.open(dir.path().join("negative"), OpenMode::Write, 2, 1).unwrap();

    let mut raw = raw_frame();
    raw.attributes.dlen = Some(-1);
    assert!(matches!(imm.write(&raw), Err(PipelineError::InvalidDataLength(-1))));

    let mut sparse = sparse_frame(2, 2, 8);
    sparse.attributes.dlen = Some(-3);
    assert!(matches!(imm.write(&sparse), Err(PipelineError::InvalidDataLength(-3))));

    assert_eq!(imm.frames_written(), 0);
    imm.close();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn test_close_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut imm = ImmFile::new();
    let path = imm.open(dir.path().join("twice"), OpenMode::Write, 1, 1).unwrap();
    imm.write(&raw_frame()).unwrap();

    imm.close();
    let first = std::fs::read(&path).unwrap();
    imm.close();
    let second = std::fs::read(&path).unwrap();

    assert!(!imm.is_open());
    assert_eq!(first, second);
    assert_eq!(first.len(), HEADER_SIZE + 200);
}

#[test]
fn test_reopen_closes_previous_and_resets_frame_index() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("scan");
    let mut imm = ImmFile::new();

    let first = imm.open(&base, OpenMode::Write, 2, 1).unwrap();
    imm.write(&raw_frame()).unwrap();
    imm.write(&raw_frame()).unwrap();

    let second = imm.open(&base, OpenMode::Write, 2, imm.next_file_number()).unwrap();
    assert_eq!(first, dir.path().join("scan_00000-00001.imm"));
    assert_eq!(second, dir.path().join("scan_00001-00002.imm"));
    assert_eq!(imm.frames_written(), 0);

    imm.write(&raw_frame()).unwrap();
    imm.close();

    assert_eq!(std::fs::metadata(&first).unwrap().len(), 2 * (HEADER_SIZE as u64 + 200));
    let bytes = std::fs::read(&second).unwrap();
    assert_eq!(read_i32(&bytes, offsets::FRAME_NUMBER), 0);
}

struct MockWriter {
    should_fail: bool,
    headers: Arc<Mutex<Vec<ImmHeader>>>,
}

impl ImmFrameWriter for MockWriter {
    fn write_frame(&self, _frame: &Frame, header: &ImmHeader, _output: &mut dyn Write) -> Result<()> {
        if self.should_fail {
            return Err(PipelineError::IoError(std::io::Error::other("Mock write error")));
        }
        self.headers.lock().unwrap().push(header.clone());
        Ok(())
    }
}

#[test]
fn test_custom_writer_receives_headers() {
    let dir = TempDir::new().unwrap();
    let headers = Arc::new(Mutex::new(Vec::new()));
    let mut imm = ImmFile::with_writer(MockWriter { should_fail: false, headers: headers.clone() });

    imm.open(dir.path().join("mock"), OpenMode::Write, 2, 1).unwrap();
    imm.write(&raw_frame()).unwrap();
    imm.write(&raw_frame().with_unique_id(18)).unwrap();
    imm.close();

    let headers = headers.lock().unwrap();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers[1].frame_number, 1);
    assert_eq!(headers[1].sys_tick, 18);
}

#[test]
fn test_writer_failure_does_not_advance_frame_index() {
    let dir = TempDir::new().unwrap();
    let headers = Arc::new(Mutex::new(Vec::new()));
    let mut imm = ImmFile::with_writer(MockWriter { should_fail: true, headers });

    imm.open(dir.path().join("fail"), OpenMode::Write, 1, 1).unwrap();
    let result = imm.write(&raw_frame());

    assert!(matches!(result, Err(PipelineError::IoError(_))));
    assert_eq!(imm.frames_written(), 0);
    assert!(imm.is_open());
}
