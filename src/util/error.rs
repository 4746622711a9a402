use std::io;
use std::os::raw::c_int;

use thiserror::Error;

type ErrorNum = c_int;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("file already exists: {0}")]
    AlreadyExists(String),
    #[error("directory is full ({0} entries)")]
    DirectoryFull(u32),
    #[error("invalid range: start {start} for file of size {size}")]
    InvalidRange { start: i64, size: u32 },
    #[error("no free blocks left in container")]
    OutOfSpace,
    #[error("corrupt block chain: {0}")]
    CorruptChain(String),
    #[error("container I/O failed: {0}")]
    IOFault(#[from] io::Error),
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
    #[error("container is not formatted (bad magic or version)")]
    BadMagic,
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("short input: expected {expected} bytes, got {got}")]
    ShortInput { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, FsError>;

impl FsError {
    pub fn errno(&self) -> ErrorNum {
        match self {
            FsError::NotFound(_) => libc::ENOENT,
            FsError::AlreadyExists(_) => libc::EEXIST,
            FsError::DirectoryFull(_) => libc::ENFILE,
            FsError::InvalidRange { .. } => libc::EINVAL,
            FsError::OutOfSpace => libc::ENOSPC,
            FsError::CorruptChain(_) => libc::EIO,
            FsError::IOFault(err) => err.raw_os_error().unwrap_or(libc::EIO),
            FsError::InvalidName(_) => libc::ENAMETOOLONG,
            FsError::BadMagic => libc::EINVAL,
            FsError::InvalidGeometry(_) => libc::EINVAL,
            FsError::ShortInput { .. } => libc::EINVAL,
        }
    }
}
