use log::{info, warn};

use crate::driver::DeviceDriver;
use crate::ops::SimFS;
use crate::structure::block::Block;
use crate::structure::entry::FileEntry;
use crate::util::error::{FsError, Result};

fn offset_in_file(start: i64, entry: &FileEntry) -> Result<u64> {
    u64::try_from(start).map_err(|_| FsError::InvalidRange { start, size: entry.size })
}

impl<A: DeviceDriver> SimFS<A> {
    /// Frees the file's chain in chain order, then clears its slot. With
    /// `scrub` the freed payloads are zeroed first.
    pub fn delete_file(&mut self, name: &str, scrub: bool) -> Result<()> {
        let slot = self.structure.directory.find(name)?;
        let entry = self.structure.entry(slot);
        let chain = self.structure.chain(&entry)?;

        for &index in &chain {
            if scrub {
                let empty = Block::zeroed(self.get_block_size(), self.structure.no_block());
                self.structure.write_block(index, &empty)?;
            }
            self.structure.free_block(index)?;
        }

        let structure = &mut self.structure;
        structure.directory.remove(&mut structure.io, name)?;
        info!("Deleted {:?}, released {} blocks", name, chain.len());
        Ok(())
    }

    /// Reads up to `length` bytes from `start`, clamped to the end of file.
    pub fn read_file(&self, name: &str, start: i64, length: u64) -> Result<Vec<u8>> {
        let slot = self.structure.directory.find(name)?;
        let entry = self.structure.entry(slot);
        let start = offset_in_file(start, &entry)?;
        if start >= entry.size as u64 {
            return Err(FsError::InvalidRange { start: start as i64, size: entry.size });
        }

        let start = start as usize;
        let length = length.min((entry.size as usize - start) as u64) as usize;
        let block_size = self.get_block_size();

        let mut current = entry.first_block;
        for _ in 0..start / block_size {
            current = self.structure.next_of(current)?;
        }

        let mut result = Vec::with_capacity(length);
        let mut offset = start % block_size;
        while result.len() < length {
            if current >= self.structure.no_block() {
                return Err(FsError::CorruptChain(format!(
                    "{:?} ends after {} of {} bytes",
                    name,
                    start + result.len(),
                    entry.size
                )));
            }
            let block = self.structure.read_block(current)?;
            let count = (block_size - offset).min(length - result.len());
            result.extend_from_slice(&block.data[offset..offset + count]);
            offset = 0;
            current = block.next;
        }
        Ok(result)
    }

    /// Writes `data` at `start`, growing the chain as needed. A gap between
    /// the old end of file and `start` reads back as zeros.
    ///
    /// Running out of blocks keeps whatever was written so far: the file
    /// ends at the last block that could be allocated and `OutOfSpace` is
    /// returned.
    pub fn write_file(&mut self, name: &str, start: i64, data: &[u8]) -> Result<usize> {
        let slot = self.structure.directory.find(name)?;
        let mut entry = self.structure.entry(slot);
        let start = offset_in_file(start, &entry)?;
        let end = start + data.len() as u64;
        if end > u32::MAX as u64 {
            return Err(FsError::InvalidRange { start: start as i64, size: entry.size });
        }

        let (start, end) = (start as usize, end as usize);
        let old_size = entry.size as usize;
        let new_size = old_size.max(end);
        let block_size = self.get_block_size();
        let no_block = self.structure.no_block();

        let mut chain = self.structure.chain(&entry)?;
        // bytes in [dirty_start, end) change: the hole (if any), then data
        let dirty_start = start.min(old_size);

        for i in 0..new_size.div_ceil(block_size) {
            let block_start = i * block_size;
            let block_end = block_start + block_size;

            let fresh = i >= chain.len();
            if fresh {
                let index = match self.structure.allocate_block() {
                    Ok(index) => index,
                    Err(err) => {
                        entry.size = old_size.max(block_start) as u32;
                        self.structure.update_entry(slot, entry)?;
                        warn!("Write to {:?} stopped at {} bytes: {}", name, entry.size, err);
                        return Err(err);
                    }
                };
                match chain.last() {
                    Some(&last) => self.structure.link(last, index)?,
                    None => {
                        entry.first_block = index;
                        self.structure.update_entry(slot, entry)?;
                    }
                }
                chain.push(index);
            }

            if block_end <= dirty_start || block_start >= end {
                continue;
            }

            let mut block = if fresh {
                Block::zeroed(block_size, no_block)
            } else {
                self.structure.read_block(chain[i])?
            };

            let hole = old_size.max(block_start)..start.min(block_end);
            if !hole.is_empty() {
                block.data[hole.start - block_start..hole.end - block_start].fill(0);
            }
            let written = start.max(block_start)..end.min(block_end);
            if !written.is_empty() {
                block.data[written.start - block_start..written.end - block_start]
                    .copy_from_slice(&data[written.start - start..written.end - start]);
            }
            self.structure.write_block(chain[i], &block)?;
        }

        entry.size = new_size as u32;
        self.structure.update_entry(slot, entry)?;
        info!("Wrote {} bytes to {:?} at {}, size now {}", data.len(), name, start, new_size);
        Ok(data.len())
    }

    /// Shrinks or grows a file to exactly `size` bytes.
    pub fn truncate_file(&mut self, name: &str, size: u64) -> Result<()> {
        let slot = self.structure.directory.find(name)?;
        let mut entry = self.structure.entry(slot);
        if size > u32::MAX as u64 {
            return Err(FsError::InvalidRange { start: size as i64, size: entry.size });
        }

        let size = size as usize;
        let old_size = entry.size as usize;
        if size > old_size {
            self.write_file(name, size as i64, &[])?;
            return Ok(());
        }
        if size == old_size {
            return Ok(());
        }

        let block_size = self.get_block_size();
        let chain = self.structure.chain(&entry)?;
        let keep = size.div_ceil(block_size);

        if keep == 0 {
            entry.first_block = self.structure.no_block();
        } else {
            let last = chain[keep - 1];
            let mut block = self.structure.read_block(last)?;
            block.next = self.structure.no_block();
            block.data[size - (keep - 1) * block_size..].fill(0);
            self.structure.write_block(last, &block)?;
        }
        entry.size = size as u32;
        self.structure.update_entry(slot, entry)?;

        for &index in &chain[keep..] {
            self.structure.free_block(index)?;
        }
        info!("Truncated {:?} from {} to {} bytes", name, old_size, size);
        Ok(())
    }
}
