use std::io;

use log::info;

use crate::consts::BlockPointer;
use crate::driver::DeviceDriver;
use crate::io::IO;
use crate::structure::block::Block;
use crate::structure::directory::{Directory, Slot};
use crate::structure::entry::FileEntry;
use crate::structure::superblock::{Geometry, SuperBlock};
use crate::util::error::{FsError, Result};
use crate::util::serializable::ByteSerializable;

pub mod block;
pub mod directory;
pub mod entry;
pub(crate) mod free_list;
pub mod superblock;

/// One open container: the explicit state every operation is threaded
/// through.
pub struct Structure<A: DeviceDriver> {
    pub(crate) io: IO<A>,
    pub(crate) superblock: SuperBlock,
    pub(crate) directory: Directory,
}

impl<A: DeviceDriver> Structure<A> {
    /// Lays out a fresh container on `device`, overwriting whatever it held.
    pub fn format(mut device: A, geometry: Geometry) -> Result<Structure<A>> {
        geometry.validate()?;

        // drop previous contents so no stale bytes survive a re-format
        device.set_size(0)?;

        let mut superblock = SuperBlock::new(&geometry);
        let mut io = IO::new(
            device,
            geometry.block_size as usize,
            geometry.total_blocks,
            superblock.block_offset as u64,
        );
        let size = io.container_size();
        io.device.set_size(size)?;

        superblock.write(&mut io)?;
        let directory = Directory::format(&mut io, &superblock)?;
        free_list::format(&mut io, &mut superblock)?;

        info!(
            "Formatted container: {} blocks of {} bytes, {} directory slots",
            geometry.total_blocks, geometry.block_size, geometry.dir_capacity
        );
        Ok(Structure { io, superblock, directory })
    }

    pub fn mount(device: A) -> Result<Structure<A>> {
        let superblock = SuperBlock::read(&device)?;
        let io = IO::new(
            device,
            superblock.block_size as usize,
            superblock.total_blocks,
            superblock.block_offset as u64,
        );
        if io.device.get_size() < io.container_size() {
            return Err(FsError::IOFault(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("container truncated: {} of {} bytes", io.device.get_size(), io.container_size()),
            )));
        }
        let directory = Directory::read(&io, &superblock)?;
        Ok(Structure { io, superblock, directory })
    }

    pub fn get_block_size(&self) -> usize {
        self.io.get_block_size()
    }

    #[inline]
    pub fn no_block(&self) -> BlockPointer {
        self.superblock.no_block()
    }

    pub fn allocate_block(&mut self) -> Result<BlockPointer> {
        free_list::allocate(&mut self.io, &mut self.superblock)
    }

    pub fn free_block(&mut self, index: BlockPointer) -> Result<()> {
        free_list::free(&mut self.io, &mut self.superblock, index)
    }

    pub fn read_block(&self, index: BlockPointer) -> Result<Block> {
        self.check_pointer(index)?;
        Ok(Block::from_bytes(&self.io.read_block(index)?))
    }

    pub fn write_block(&mut self, index: BlockPointer, block: &Block) -> Result<()> {
        self.io.write_block(index, &block.to_bytes())
    }

    pub fn next_of(&self, index: BlockPointer) -> Result<BlockPointer> {
        self.check_pointer(index)?;
        self.io.read_next(index)
    }

    pub fn link(&mut self, index: BlockPointer, next: BlockPointer) -> Result<()> {
        self.io.write_next(index, next)
    }

    pub fn entry(&self, slot: Slot) -> FileEntry {
        *self.directory.entry(slot)
    }

    pub fn update_entry(&mut self, slot: Slot, entry: FileEntry) -> Result<()> {
        self.directory.update(&mut self.io, slot, entry)
    }

    /// Walks an entry's chain, checking its length against the recorded size.
    pub fn chain(&self, entry: &FileEntry) -> Result<Vec<BlockPointer>> {
        let expected = entry.block_count(self.get_block_size());
        let mut blocks = Vec::with_capacity(expected);
        let mut current = entry.first_block;

        while blocks.len() < expected {
            if current >= self.no_block() {
                return Err(FsError::CorruptChain(format!(
                    "{:?} has {} blocks, size {} needs {}",
                    entry.name(),
                    blocks.len(),
                    entry.size,
                    expected
                )));
            }
            blocks.push(current);
            current = self.io.read_next(current)?;
        }

        if current != self.no_block() {
            return Err(FsError::CorruptChain(format!(
                "{:?} continues past its {} blocks into block {}",
                entry.name(),
                expected,
                current
            )));
        }
        Ok(blocks)
    }

    #[inline]
    fn check_pointer(&self, index: BlockPointer) -> Result<()> {
        if index >= self.no_block() {
            return Err(FsError::CorruptChain(format!("block pointer {} out of range", index)));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn into_device(self) -> A {
        self.io.device
    }
}
