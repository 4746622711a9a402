use std::io;

pub(crate) mod file_drive;
#[cfg(test)]
pub(crate) mod memory_drive;

/// Byte-addressable backing store for a container.
pub trait DeviceDriver {
    fn get_size(&self) -> u64;
    fn set_size(&mut self, bytes: u64) -> io::Result<()>;
    fn read_at(&self, offset: u64, buffer: &mut [u8]) -> io::Result<()>;
    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()>;
}
