use log::debug;

use crate::consts::BlockPointer;
use crate::driver::DeviceDriver;
use crate::io::IO;
use crate::structure::entry::{encode_name, FileEntry};
use crate::structure::superblock::SuperBlock;
use crate::util::error::{FsError, Result};
use crate::util::serializable::{ByteSerializable, KnownSize};

pub type Slot = usize;

/// Fixed-capacity table of file entries, mirrored in memory and written
/// through on every change.
pub struct Directory {
    entries: Vec<FileEntry>,
    offset: u64,
    no_block: BlockPointer,
}

impl Directory {
    pub fn format<A: DeviceDriver>(io: &mut IO<A>, superblock: &SuperBlock) -> Result<Directory> {
        let empty = FileEntry::empty(superblock.no_block());
        let entries = vec![empty; superblock.dir_capacity as usize];
        let bytes: Vec<u8> = entries.iter().flat_map(|entry| entry.to_bytes()).collect();
        io.write_meta(superblock.dir_offset as u64, &bytes)?;
        Ok(Directory { entries, offset: superblock.dir_offset as u64, no_block: superblock.no_block() })
    }

    pub fn read<A: DeviceDriver>(io: &IO<A>, superblock: &SuperBlock) -> Result<Directory> {
        let capacity = superblock.dir_capacity as usize;
        let bytes = io.read_meta(superblock.dir_offset as u64, capacity * FileEntry::size_on_disk())?;
        let entries = bytes.chunks_exact(FileEntry::size_on_disk()).map(FileEntry::from_bytes).collect();
        Ok(Directory { entries, offset: superblock.dir_offset as u64, no_block: superblock.no_block() })
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, slot: Slot) -> &FileEntry {
        &self.entries[slot]
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Slot, &FileEntry)> {
        self.entries.iter().enumerate().filter(|(_, entry)| entry.is_occupied())
    }

    /// Exact-match lookup on the stored fixed-width name.
    pub fn find(&self, name: &str) -> Result<Slot> {
        let encoded = encode_name(name).map_err(|_| FsError::NotFound(name.to_string()))?;
        self.entries
            .iter()
            .position(|entry| entry.is_occupied() && entry.name == encoded)
            .ok_or_else(|| FsError::NotFound(name.to_string()))
    }

    pub fn create<A: DeviceDriver>(&mut self, io: &mut IO<A>, name: &str) -> Result<Slot> {
        let encoded = encode_name(name)?;
        if self.find(name).is_ok() {
            return Err(FsError::AlreadyExists(name.to_string()));
        }
        let slot = self
            .entries
            .iter()
            .position(|entry| !entry.is_occupied())
            .ok_or(FsError::DirectoryFull(self.entries.len() as u32))?;

        self.update(io, slot, FileEntry::new(encoded, self.no_block))?;
        debug!("Created {:?} in slot {}", name, slot);
        Ok(slot)
    }

    /// Clears the slot of `name`. Its chain must already have been freed.
    pub fn remove<A: DeviceDriver>(&mut self, io: &mut IO<A>, name: &str) -> Result<()> {
        let slot = self.find(name)?;
        self.clear(io, slot)
    }

    pub fn clear<A: DeviceDriver>(&mut self, io: &mut IO<A>, slot: Slot) -> Result<()> {
        debug!("Clearing slot {}", slot);
        self.update(io, slot, FileEntry::empty(self.no_block))
    }

    pub fn update<A: DeviceDriver>(&mut self, io: &mut IO<A>, slot: Slot, entry: FileEntry) -> Result<()> {
        io.write_meta(self.offset + (slot * FileEntry::size_on_disk()) as u64, &entry.to_bytes())?;
        self.entries[slot] = entry;
        Ok(())
    }
}
