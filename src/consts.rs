pub(crate) const MAGIC: u32 = 0x5346_5331;
pub(crate) const VERSION: u32 = 1;

// magic, version, block_size, total_blocks, free_head, free_count,
// dir_offset, dir_capacity, block_offset
pub(crate) const SUPERBLOCK_SIZE: usize = 9 * 4;

pub(crate) const FILE_NAME_LENGTH: usize = 12;
pub(crate) const ENTRY_SIZE: usize = FILE_NAME_LENGTH + 4 + 4;
pub(crate) const NEXT_POINTER_SIZE: usize = 4;

pub(crate) const DEFAULT_BLOCK_SIZE: u32 = 128;
pub(crate) const DEFAULT_DIR_CAPACITY: u32 = 16;
pub(crate) const MAX_BLOCK_SIZE: u32 = 64 * 1024;
pub(crate) const MAX_DIR_CAPACITY: u32 = 4096;

pub type BlockPointer = u32;
pub type FileName = [u8; FILE_NAME_LENGTH];
