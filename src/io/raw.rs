use std::io;

use log::trace;

use crate::driver::DeviceDriver;

pub(crate) fn raw_write<A: DeviceDriver>(drive: &mut A, offset: u64, data: &[u8]) -> io::Result<()> {
    trace!("Writing {} bytes at offset {}", data.len(), offset);
    drive.write_at(offset, data)
}

pub(crate) fn raw_read<A: DeviceDriver>(drive: &A, offset: u64, length: usize) -> io::Result<Vec<u8>> {
    trace!("Reading {} bytes at offset {}", length, offset);
    let mut buffer = vec![0u8; length];
    drive.read_at(offset, &mut buffer)?;
    Ok(buffer)
}
