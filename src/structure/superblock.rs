use log::debug;

use crate::consts::{
    BlockPointer, ENTRY_SIZE, MAGIC, MAX_BLOCK_SIZE, MAX_DIR_CAPACITY, SUPERBLOCK_SIZE, VERSION,
};
use crate::driver::DeviceDriver;
use crate::io::IO;
use crate::util::error::{FsError, Result};
use crate::util::serializable::{read_u32, ByteSerializable, KnownSize};

/// Format-time parameters of a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub block_size: u32,
    pub total_blocks: u32,
    pub dir_capacity: u32,
}

impl Geometry {
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(FsError::InvalidGeometry(format!(
                "block size must be between 1 and {}, got {}",
                MAX_BLOCK_SIZE, self.block_size
            )));
        }
        // the sentinel (== total_blocks) must itself fit in a pointer
        if self.total_blocks == 0 || self.total_blocks == BlockPointer::MAX {
            return Err(FsError::InvalidGeometry(format!("unusable block count {}", self.total_blocks)));
        }
        if self.dir_capacity == 0 || self.dir_capacity > MAX_DIR_CAPACITY {
            return Err(FsError::InvalidGeometry(format!(
                "directory capacity must be between 1 and {}, got {}",
                MAX_DIR_CAPACITY, self.dir_capacity
            )));
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct SuperBlock {
    pub magic: u32,
    pub version: u32,
    pub block_size: u32,
    pub total_blocks: u32,
    pub free_head: BlockPointer,
    pub free_count: u32,
    pub dir_offset: u32,
    pub dir_capacity: u32,
    pub block_offset: u32,
}

impl SuperBlock {
    /// Fresh superblock with every block on the free list, head at block 0.
    pub fn new(geometry: &Geometry) -> SuperBlock {
        let dir_offset = SUPERBLOCK_SIZE as u32;
        let block_offset = dir_offset + geometry.dir_capacity * ENTRY_SIZE as u32;
        SuperBlock {
            magic: MAGIC,
            version: VERSION,
            block_size: geometry.block_size,
            total_blocks: geometry.total_blocks,
            free_head: 0,
            free_count: geometry.total_blocks,
            dir_offset,
            dir_capacity: geometry.dir_capacity,
            block_offset,
        }
    }

    /// The "no block" sentinel: one past the last valid index.
    #[inline]
    pub fn no_block(&self) -> BlockPointer {
        self.total_blocks
    }

    pub fn used_blocks(&self) -> u32 {
        self.total_blocks - self.free_count
    }

    // note: the superblock is read straight from the device since the block
    // geometry is unknown until it has been decoded
    pub fn read<A: DeviceDriver>(device: &A) -> Result<SuperBlock> {
        if device.get_size() < SuperBlock::size_on_disk() as u64 {
            return Err(FsError::BadMagic);
        }

        let mut buffer = vec![0u8; SuperBlock::size_on_disk()];
        device.read_at(0, &mut buffer)?;

        if read_u32(&buffer, 0) != MAGIC || read_u32(&buffer, 4) != VERSION {
            return Err(FsError::BadMagic);
        }

        let superblock = SuperBlock::from_bytes(&buffer);
        let geometry = Geometry {
            block_size: superblock.block_size,
            total_blocks: superblock.total_blocks,
            dir_capacity: superblock.dir_capacity,
        };
        if geometry.validate().is_err() {
            return Err(FsError::BadMagic);
        }
        let layout = SuperBlock::new(&geometry);
        if superblock.dir_offset != layout.dir_offset || superblock.block_offset != layout.block_offset {
            return Err(FsError::BadMagic);
        }

        if superblock.free_count > superblock.total_blocks
            || superblock.free_head > superblock.total_blocks
            || (superblock.free_head == superblock.no_block()) != (superblock.free_count == 0)
        {
            return Err(FsError::CorruptChain(format!(
                "free list head {} disagrees with free count {}",
                superblock.free_head, superblock.free_count
            )));
        }
        Ok(superblock)
    }

    pub fn write<A: DeviceDriver>(&self, io: &mut IO<A>) -> Result<()> {
        io.write_meta(0, &self.to_bytes())
    }

    pub fn set_free_list<A: DeviceDriver>(
        &mut self,
        io: &mut IO<A>,
        head: BlockPointer,
        count: u32,
    ) -> Result<()> {
        debug!("Free list head {} -> {}, count {} -> {}", self.free_head, head, self.free_count, count);
        self.free_head = head;
        self.free_count = count;
        self.write(io)
    }
}

impl KnownSize for SuperBlock {
    fn size_on_disk() -> usize {
        SUPERBLOCK_SIZE
    }
}

impl ByteSerializable for SuperBlock {
    fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(SUPERBLOCK_SIZE);
        buffer.extend_from_slice(&self.magic.to_le_bytes());
        buffer.extend_from_slice(&self.version.to_le_bytes());
        buffer.extend_from_slice(&self.block_size.to_le_bytes());
        buffer.extend_from_slice(&self.total_blocks.to_le_bytes());
        buffer.extend_from_slice(&self.free_head.to_le_bytes());
        buffer.extend_from_slice(&self.free_count.to_le_bytes());
        buffer.extend_from_slice(&self.dir_offset.to_le_bytes());
        buffer.extend_from_slice(&self.dir_capacity.to_le_bytes());
        buffer.extend_from_slice(&self.block_offset.to_le_bytes());
        buffer
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        SuperBlock {
            magic: read_u32(bytes, 0),
            version: read_u32(bytes, 4),
            block_size: read_u32(bytes, 8),
            total_blocks: read_u32(bytes, 12),
            free_head: read_u32(bytes, 16),
            free_count: read_u32(bytes, 20),
            dir_offset: read_u32(bytes, 24),
            dir_capacity: read_u32(bytes, 28),
            block_offset: read_u32(bytes, 32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory_drive::MemoryDrive;

    fn geometry() -> Geometry {
        Geometry { block_size: 8, total_blocks: 4, dir_capacity: 2 }
    }

    #[test]
    fn layout() {
        let superblock = SuperBlock::new(&geometry());
        assert_eq!(superblock.dir_offset, 36);
        assert_eq!(superblock.block_offset, 36 + 2 * 20);
        assert_eq!(superblock.free_count, 4);
        assert_eq!(superblock.no_block(), 4);
        assert_eq!(superblock.to_bytes().len(), SuperBlock::size_on_disk());
    }

    #[test]
    fn read_write_superblock() {
        let superblock = SuperBlock::new(&geometry());
        let mut io = IO::new(MemoryDrive::new(), 8, 4, superblock.block_offset as u64);
        superblock.write(&mut io).unwrap();

        let mut read = SuperBlock::read(&io.device).unwrap();
        assert_eq!(superblock, read);

        read.set_free_list(&mut io, 3, 1).unwrap();
        assert_eq!(SuperBlock::read(&io.device).unwrap(), read);
    }

    #[test]
    fn unformatted_device() {
        let mut drive = MemoryDrive::new();
        assert!(matches!(SuperBlock::read(&drive), Err(FsError::BadMagic)));
        drive.data = vec![0; 128];
        assert!(matches!(SuperBlock::read(&drive), Err(FsError::BadMagic)));
    }

    #[test]
    fn corrupted_geometry() {
        let zero_block_size = SuperBlock { block_size: 0, ..SuperBlock::new(&geometry()) };
        let huge_directory = SuperBlock { dir_capacity: MAX_DIR_CAPACITY + 1, ..SuperBlock::new(&geometry()) };
        let shifted_directory = SuperBlock { dir_offset: 40, ..SuperBlock::new(&geometry()) };
        let overlapping_blocks = SuperBlock { block_offset: 36, ..SuperBlock::new(&geometry()) };

        for superblock in [zero_block_size, huge_directory, shifted_directory, overlapping_blocks] {
            let mut drive = MemoryDrive::new();
            drive.data = superblock.to_bytes();
            assert!(matches!(SuperBlock::read(&drive), Err(FsError::BadMagic)), "{:?}", superblock);
        }
    }

    #[test]
    fn inconsistent_free_list() {
        let mut superblock = SuperBlock::new(&geometry());
        superblock.free_head = superblock.no_block();
        let mut drive = MemoryDrive::new();
        drive.data = superblock.to_bytes();
        assert!(matches!(SuperBlock::read(&drive), Err(FsError::CorruptChain(_))));
    }

    #[test]
    fn geometry_limits() {
        assert!(geometry().validate().is_ok());
        let zero_blocks = Geometry { total_blocks: 0, ..geometry() };
        assert!(matches!(zero_blocks.validate(), Err(FsError::InvalidGeometry(_))));
        let huge_block = Geometry { block_size: MAX_BLOCK_SIZE + 1, ..geometry() };
        assert!(huge_block.validate().is_err());
        let no_dir = Geometry { dir_capacity: 0, ..geometry() };
        assert!(no_dir.validate().is_err());
    }
}
