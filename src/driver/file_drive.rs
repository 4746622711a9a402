use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::Path;

use crate::driver::DeviceDriver;

pub struct FileDrive {
    file: File,
    bytes: u64,
}

impl FileDrive {
    /// Creates the host file if needed and truncates it to zero length.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<FileDrive> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(FileDrive { file, bytes: 0 })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<FileDrive> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let bytes = file.metadata()?.len();
        Ok(FileDrive { file, bytes })
    }
}

impl DeviceDriver for FileDrive {
    fn get_size(&self) -> u64 {
        self.bytes
    }

    fn set_size(&mut self, bytes: u64) -> io::Result<()> {
        self.file.set_len(bytes)?;
        self.bytes = bytes;
        Ok(())
    }

    fn read_at(&self, offset: u64, buffer: &mut [u8]) -> io::Result<()> {
        self.file.read_exact_at(buffer, offset)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.file.write_all_at(data, offset)?;
        self.bytes = self.bytes.max(offset + data.len() as u64);
        Ok(())
    }
}
