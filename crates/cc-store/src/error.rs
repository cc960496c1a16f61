use std::io;
use thiserror::Error;

/// Failure modes for the file-backed arena stores (components B-E).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("store is open read-only and does not accept writes")]
    ReadOnly,

    #[error("string of {len} bytes does not fit in a 16-bit position (capacity {cap})")]
    StringCapacityExceeded { len: usize, cap: usize },

    #[error("record index {index} is out of range for a store of {len} records")]
    IndexOutOfRange { index: u32, len: u32 },

    #[error("store file is truncated or corrupt: {0}")]
    Corrupt(String),
}
