use std::io;

use crate::driver::DeviceDriver;

#[derive(Default)]
pub struct MemoryDrive {
    pub(crate) data: Vec<u8>,
}

impl MemoryDrive {
    pub fn new() -> MemoryDrive {
        MemoryDrive { data: Vec::new() }
    }
}

impl DeviceDriver for MemoryDrive {
    fn get_size(&self) -> u64 {
        self.data.len() as u64
    }

    fn set_size(&mut self, bytes: u64) -> io::Result<()> {
        self.data.resize(bytes as usize, 0);
        Ok(())
    }

    fn read_at(&self, offset: u64, buffer: &mut [u8]) -> io::Result<()> {
        let start = offset as usize;
        let end = start + buffer.len();
        if end > self.data.len() {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "read past end of drive"));
        }
        buffer.copy_from_slice(&self.data[start..end]);
        Ok(())
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        let start = offset as usize;
        let end = start + data.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(data);
        Ok(())
    }
}
