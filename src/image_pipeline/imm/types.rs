//! IMM format constants and file open modes

/// Size of the header record preceding every frame payload.
pub const HEADER_SIZE: usize = 1024;

/// Value of the header `mode` field.
pub const IMM_MODE: i32 = 2;

/// Value of the header `IMM version` field.
pub const IMM_VERSION: i32 = 12;

/// Compression tag of an uncompressed payload.
pub const RAW_COMPRESSION: i32 = 0;

/// Width of the textual date stamp.
pub const DATE_LEN: usize = 32;

/// Byte offsets of the header fields. Fields not listed are zero.
pub mod offsets {
    pub const MODE: usize = 0;
    pub const COMPRESSION: usize = 4;
    pub const DATE: usize = 8;
    pub const FRAME_NUMBER: usize = 56;
    pub const MONITOR: usize = 76;
    pub const SHUTTER: usize = 80;
    pub const ROW_BEG: usize = 84;
    pub const ROW_END: usize = 88;
    pub const COL_BEG: usize = 92;
    pub const COL_END: usize = 96;
    pub const ROW_BIN: usize = 100;
    pub const COL_BIN: usize = 104;
    pub const ROWS: usize = 108;
    pub const COLS: usize = 112;
    pub const BYTES_PER_PIXEL: usize = 116;
    pub const KINETICS: usize = 120;
    pub const KINETICS_WINSIZE: usize = 124;
    pub const ELAPSED: usize = 128;
    pub const PRESET: usize = 136;
    pub const TOPUP: usize = 144;
    pub const INJECT: usize = 148;
    pub const DATA_LENGTH: usize = 152;
    pub const ROI_NUMBER: usize = 156;
    pub const BUFFER_NUMBER: usize = 160;
    pub const SYS_TICK: usize = 164;
    pub const IMAGESERVER: usize = 608;
    pub const CPU_SPEED: usize = 612;
    pub const IMM_VERSION: usize = 616;
    pub const TIMESTAMP: usize = 620;
    pub const CAMERA_TYPE: usize = 624;
    pub const THRESHOLD: usize = 628;
}

const _: () = assert!(offsets::DATE + DATE_LEN <= offsets::FRAME_NUMBER);
const _: () = assert!(offsets::THRESHOLD + 4 <= HEADER_SIZE);

/// How a file is requested to be opened. Only `Write` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
}
