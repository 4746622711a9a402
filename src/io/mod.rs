use std::io;

use crate::consts::{BlockPointer, NEXT_POINTER_SIZE};
use crate::driver::DeviceDriver;
use crate::util::error::Result;
use raw::{raw_read, raw_write};

mod raw;

/// Positioned block access over the container's block region.
///
/// Every block record is `block_size` payload bytes followed by a
/// little-endian `u32` next pointer, stored at
/// `block_offset + index * (block_size + 4)`.
pub struct IO<A: DeviceDriver> {
    pub(crate) device: A,
    block_size: usize,
    block_count: u32,
    block_offset: u64,
}

impl<A: DeviceDriver> IO<A> {
    pub fn new(device: A, block_size: usize, block_count: u32, block_offset: u64) -> IO<A> {
        IO { device, block_size, block_count, block_offset }
    }

    pub fn get_block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.block_size + NEXT_POINTER_SIZE
    }

    /// Total container length implied by the geometry.
    pub fn container_size(&self) -> u64 {
        self.block_offset + self.block_count as u64 * self.stride() as u64
    }

    pub(crate) fn read_block(&self, index: BlockPointer) -> Result<Vec<u8>> {
        let offset = self.block_position(index)?;
        Ok(raw_read(&self.device, offset, self.stride())?)
    }

    pub(crate) fn write_block(&mut self, index: BlockPointer, record: &[u8]) -> Result<()> {
        if record.len() != self.stride() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("block record size mismatch - expected {}, got {}", self.stride(), record.len()),
            )
            .into());
        }
        let offset = self.block_position(index)?;
        Ok(raw_write(&mut self.device, offset, record)?)
    }

    pub(crate) fn read_next(&self, index: BlockPointer) -> Result<BlockPointer> {
        let offset = self.block_position(index)? + self.block_size as u64;
        let bytes = raw_read(&self.device, offset, NEXT_POINTER_SIZE)?;
        Ok(BlockPointer::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn write_next(&mut self, index: BlockPointer, next: BlockPointer) -> Result<()> {
        let offset = self.block_position(index)? + self.block_size as u64;
        Ok(raw_write(&mut self.device, offset, &next.to_le_bytes())?)
    }

    pub(crate) fn read_meta(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        Ok(raw_read(&self.device, offset, length)?)
    }

    pub(crate) fn write_meta(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.block_offset {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "metadata write overlaps block region").into());
        }
        Ok(raw_write(&mut self.device, offset, data)?)
    }

    #[inline]
    fn block_position(&self, index: BlockPointer) -> Result<u64> {
        if index >= self.block_count {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("block index {} out of range (count {})", index, self.block_count),
            )
            .into());
        }
        Ok(self.block_offset + index as u64 * self.stride() as u64)
    }
}

#[cfg(test)]
mod tests {
    use crate::driver::memory_drive::MemoryDrive;
    use crate::util::error::FsError;

    use super::IO;

    fn io(block_size: usize, block_count: u32) -> IO<MemoryDrive> {
        let mut io = IO::new(MemoryDrive::new(), block_size, block_count, 64);
        let size = io.container_size();
        io.device.data.resize(size as usize, 0);
        io
    }

    #[test]
    fn read_write() {
        let mut io = io(8, 4);

        let mut record = vec![42; 8];
        record.extend_from_slice(&3u32.to_le_bytes());
        io.write_block(1, &record).unwrap();

        assert_eq!(io.read_block(1).unwrap(), record);
        assert_eq!(io.read_next(1).unwrap(), 3);
        assert_eq!(io.read_block(0).unwrap(), vec![0; 12]);
        assert_eq!(io.device.data[64 + 12], 42);
    }

    #[test]
    fn write_next_keeps_payload() {
        let mut io = io(8, 4);

        let mut record = vec![7; 8];
        record.extend_from_slice(&4u32.to_le_bytes());
        io.write_block(2, &record).unwrap();
        io.write_next(2, 0).unwrap();

        let read = io.read_block(2).unwrap();
        assert_eq!(&read[..8], &[7; 8]);
        assert_eq!(io.read_next(2).unwrap(), 0);
    }

    #[test]
    fn out_of_range() {
        let mut io = io(8, 4);
        assert!(matches!(io.read_block(4), Err(FsError::IOFault(_))));
        assert!(matches!(io.write_next(9, 0), Err(FsError::IOFault(_))));
        assert!(matches!(io.write_block(0, &[0; 3]), Err(FsError::IOFault(_))));
    }

    #[test]
    fn meta_cannot_overlap_blocks() {
        let mut io = io(8, 4);
        io.write_meta(0, &[1; 64]).unwrap();
        assert!(io.write_meta(60, &[1; 8]).is_err());
        assert_eq!(io.read_meta(0, 4).unwrap(), vec![1; 4]);
    }

    #[test]
    fn truncated_container() {
        let mut io = io(8, 4);
        io.device.data.truncate(64 + 12 * 2);
        assert!(io.read_block(1).is_ok());
        assert!(matches!(io.read_block(2), Err(FsError::IOFault(_))));
    }
}
