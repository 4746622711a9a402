use std::fmt;

use crate::driver::DeviceDriver;
use crate::ops::SimFS;
use crate::structure::free_list;
use crate::util::error::{FsError, Result};
use crate::util::format::pretty_size_from_bytes;

#[derive(Debug, PartialEq)]
pub struct FileSummary {
    pub name: String,
    pub size: u32,
    pub blocks: usize,
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12}  {:>10} bytes  {:>6} blocks", self.name, self.size, self.blocks)
    }
}

#[derive(Debug, PartialEq)]
pub struct FsInfo {
    pub block_size: u32,
    pub total_blocks: u32,
    pub free_blocks: u32,
    pub used_blocks: u32,
    pub files: usize,
    pub dir_capacity: usize,
}

impl fmt::Display for FsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let block_size = self.block_size as u64;
        writeln!(f, "block size:   {}", pretty_size_from_bytes(block_size))?;
        writeln!(f, "total blocks: {}", self.total_blocks)?;
        writeln!(
            f,
            "free blocks:  {} ({})",
            self.free_blocks,
            pretty_size_from_bytes(self.free_blocks as u64 * block_size)
        )?;
        writeln!(
            f,
            "used blocks:  {} ({})",
            self.used_blocks,
            pretty_size_from_bytes(self.used_blocks as u64 * block_size)
        )?;
        write!(f, "files:        {} / {}", self.files, self.dir_capacity)
    }
}

/// Result of a successful consistency scan.
#[derive(Debug, PartialEq)]
pub struct CheckReport {
    pub files: usize,
    pub file_blocks: usize,
    pub free_blocks: usize,
}

impl<A: DeviceDriver> SimFS<A> {
    /// One summary per occupied directory slot, in slot order.
    pub fn list_files(&self) -> Vec<FileSummary> {
        let block_size = self.get_block_size();
        self.structure
            .directory
            .occupied()
            .map(|(_, entry)| FileSummary {
                name: entry.name(),
                size: entry.size,
                blocks: entry.block_count(block_size),
            })
            .collect()
    }

    pub fn file_size(&self, name: &str) -> Result<u32> {
        let slot = self.structure.directory.find(name)?;
        Ok(self.structure.entry(slot).size)
    }

    pub fn info(&self) -> FsInfo {
        let superblock = &self.structure.superblock;
        FsInfo {
            block_size: superblock.block_size,
            total_blocks: superblock.total_blocks,
            free_blocks: superblock.free_count,
            used_blocks: superblock.used_blocks(),
            files: self.structure.directory.occupied().count(),
            dir_capacity: self.structure.directory.capacity(),
        }
    }

    /// Verifies every block is owned exactly once, by one file chain or by
    /// the free list, and that the free count matches the free list.
    pub fn check(&self) -> Result<CheckReport> {
        let structure = &self.structure;
        let total = structure.superblock.total_blocks as usize;
        let mut owners: Vec<Option<String>> = vec![None; total];

        let mut claim = |index: u32, owner: String| -> Result<()> {
            match &owners[index as usize] {
                Some(previous) => Err(FsError::CorruptChain(format!(
                    "block {} owned by both {} and {}",
                    index, previous, owner
                ))),
                None => {
                    owners[index as usize] = Some(owner);
                    Ok(())
                }
            }
        };

        let mut files = 0;
        let mut file_blocks = 0;
        for (_, entry) in structure.directory.occupied() {
            let chain = structure.chain(entry)?;
            for &index in &chain {
                claim(index, format!("{:?}", entry.name()))?;
            }
            files += 1;
            file_blocks += chain.len();
        }

        let free = free_list::walk(&structure.io, &structure.superblock)?;
        for &index in &free {
            claim(index, "the free list".to_string())?;
        }
        if free.len() != structure.superblock.free_count as usize {
            return Err(FsError::CorruptChain(format!(
                "free list holds {} blocks but the free count is {}",
                free.len(),
                structure.superblock.free_count
            )));
        }
        if file_blocks + free.len() != total {
            return Err(FsError::CorruptChain(format!(
                "{} of {} blocks are unreachable",
                total - file_blocks - free.len(),
                total
            )));
        }

        Ok(CheckReport { files, file_blocks, free_blocks: free.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory_drive::MemoryDrive;
    use crate::structure::superblock::Geometry;

    fn simfs() -> SimFS<MemoryDrive> {
        SimFS::format(MemoryDrive::new(), Geometry { block_size: 8, total_blocks: 8, dir_capacity: 4 }).unwrap()
    }

    #[test]
    fn list_and_info() {
        let mut fs = simfs();
        fs.create_file("a").unwrap();
        fs.create_file("b").unwrap();
        fs.write_file("b", 0, &[1; 17]).unwrap();

        assert_eq!(
            fs.list_files(),
            vec![
                FileSummary { name: "a".to_string(), size: 0, blocks: 0 },
                FileSummary { name: "b".to_string(), size: 17, blocks: 3 },
            ]
        );

        assert_eq!(fs.file_size("b").unwrap(), 17);
        assert!(matches!(fs.file_size("c"), Err(FsError::NotFound(_))));

        let info = fs.info();
        assert_eq!(info.total_blocks, 8);
        assert_eq!(info.free_blocks, 5);
        assert_eq!(info.used_blocks, 3);
        assert_eq!(info.files, 2);
        assert_eq!(info.dir_capacity, 4);
        assert!(info.to_string().contains("files:        2 / 4"));
    }

    #[test]
    fn inspecting_does_not_mutate() {
        let mut fs = simfs();
        fs.create_file("a").unwrap();
        fs.write_file("a", 0, b"abc").unwrap();
        let before = fs.structure.superblock.clone();

        fs.list_files();
        fs.info();
        fs.check().unwrap();
        assert_eq!(fs.structure.superblock, before);
    }

    #[test]
    fn check_clean_container() {
        let mut fs = simfs();
        fs.create_file("a").unwrap();
        fs.write_file("a", 0, &[3; 9]).unwrap();
        assert_eq!(fs.check().unwrap(), CheckReport { files: 1, file_blocks: 2, free_blocks: 6 });
    }

    #[test]
    fn check_detects_double_ownership() {
        let mut fs = simfs();
        fs.create_file("a").unwrap();
        fs.write_file("a", 0, b"abc").unwrap();
        let slot = fs.structure.directory.find("a").unwrap();
        let block = fs.structure.entry(slot).first_block;

        // double free: the block now sits on the free list and in the chain
        fs.structure.free_block(block).unwrap();
        assert!(matches!(fs.check(), Err(FsError::CorruptChain(_))));
    }

    #[test]
    fn check_detects_leak() {
        let mut fs = simfs();
        fs.structure.allocate_block().unwrap();
        assert!(matches!(fs.check(), Err(FsError::CorruptChain(_))));
    }
}
