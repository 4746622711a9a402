//! LIFO free list threaded through the blocks' own next pointers. The head
//! and the free count live in the superblock.

use log::debug;

use crate::consts::BlockPointer;
use crate::driver::DeviceDriver;
use crate::io::IO;
use crate::structure::block::Block;
use crate::structure::superblock::SuperBlock;
use crate::util::error::{FsError, Result};
use crate::util::serializable::ByteSerializable;

/// Threads every block onto the free list in ascending order.
pub(crate) fn format<A: DeviceDriver>(io: &mut IO<A>, superblock: &mut SuperBlock) -> Result<()> {
    let block_size = io.get_block_size();
    for index in 0..superblock.total_blocks {
        let block = Block::zeroed(block_size, index + 1);
        io.write_block(index, &block.to_bytes())?;
    }
    superblock.set_free_list(io, 0, superblock.total_blocks)
}

/// Pops the head of the free list. The returned block is zeroed and
/// terminated.
pub(crate) fn allocate<A: DeviceDriver>(io: &mut IO<A>, superblock: &mut SuperBlock) -> Result<BlockPointer> {
    let head = superblock.free_head;
    if head == superblock.no_block() {
        return Err(FsError::OutOfSpace);
    }

    let next = io.read_next(head)?;
    if next > superblock.no_block() {
        return Err(FsError::CorruptChain(format!("free block {} points at {}", head, next)));
    }
    let count = superblock
        .free_count
        .checked_sub(1)
        .ok_or_else(|| FsError::CorruptChain("free list longer than free count".to_string()))?;

    let block = Block::zeroed(io.get_block_size(), superblock.no_block());
    io.write_block(head, &block.to_bytes())?;
    superblock.set_free_list(io, next, count)?;
    debug!("Allocated block {}", head);
    Ok(head)
}

/// Pushes `index` onto the free list. The payload is left as is.
pub(crate) fn free<A: DeviceDriver>(io: &mut IO<A>, superblock: &mut SuperBlock, index: BlockPointer) -> Result<()> {
    if index >= superblock.no_block() {
        return Err(FsError::CorruptChain(format!("cannot free block {}", index)));
    }
    // only catches a free into a full pool; ownership is verified by the check scan
    if superblock.free_count >= superblock.total_blocks {
        return Err(FsError::CorruptChain(format!("block {} freed while every block is free", index)));
    }

    io.write_next(index, superblock.free_head)?;
    let count = superblock.free_count + 1;
    superblock.set_free_list(io, index, count)?;
    debug!("Freed block {}", index);
    Ok(())
}

/// Follows the free list from its head, bounded by the block count.
pub(crate) fn walk<A: DeviceDriver>(io: &IO<A>, superblock: &SuperBlock) -> Result<Vec<BlockPointer>> {
    let mut blocks = Vec::new();
    let mut current = superblock.free_head;
    while current != superblock.no_block() {
        if current > superblock.no_block() || blocks.len() >= superblock.total_blocks as usize {
            return Err(FsError::CorruptChain(format!("free list runs through invalid block {}", current)));
        }
        blocks.push(current);
        current = io.read_next(current)?;
    }
    Ok(blocks)
}
