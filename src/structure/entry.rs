use crate::consts::{BlockPointer, FileName, ENTRY_SIZE, FILE_NAME_LENGTH};
use crate::util::error::{FsError, Result};
use crate::util::serializable::{read_u32, ByteSerializable, KnownSize};

/// One directory slot. A slot is occupied iff its name is non-empty.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct FileEntry {
    pub name: FileName,
    pub size: u32,
    pub first_block: BlockPointer,
}

impl FileEntry {
    pub fn empty(no_block: BlockPointer) -> FileEntry {
        FileEntry { name: [0; FILE_NAME_LENGTH], size: 0, first_block: no_block }
    }

    pub fn new(name: FileName, no_block: BlockPointer) -> FileEntry {
        FileEntry { name, size: 0, first_block: no_block }
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.name[0] != 0
    }

    pub fn name(&self) -> String {
        let length = self.name.iter().position(|&b| b == 0).unwrap_or(FILE_NAME_LENGTH);
        String::from_utf8_lossy(&self.name[..length]).into_owned()
    }

    /// Number of blocks a file of this size must own.
    #[inline]
    pub fn block_count(&self, block_size: usize) -> usize {
        (self.size as usize).div_ceil(block_size)
    }
}

/// Encodes a file name into its fixed-width, NUL-padded on-disk form.
pub fn encode_name(name: &str) -> Result<FileName> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > FILE_NAME_LENGTH || bytes.contains(&0) {
        return Err(FsError::InvalidName(name.to_string()));
    }
    let mut encoded = [0u8; FILE_NAME_LENGTH];
    encoded[..bytes.len()].copy_from_slice(bytes);
    Ok(encoded)
}

impl KnownSize for FileEntry {
    fn size_on_disk() -> usize {
        ENTRY_SIZE
    }
}

impl ByteSerializable for FileEntry {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ENTRY_SIZE);
        bytes.extend_from_slice(&self.name);
        bytes.extend_from_slice(&self.size.to_le_bytes());
        bytes.extend_from_slice(&self.first_block.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let mut name = [0u8; FILE_NAME_LENGTH];
        name.copy_from_slice(&bytes[..FILE_NAME_LENGTH]);
        FileEntry {
            name,
            size: read_u32(bytes, FILE_NAME_LENGTH),
            first_block: read_u32(bytes, FILE_NAME_LENGTH + 4),
        }
    }
}
