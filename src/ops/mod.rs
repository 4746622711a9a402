use log::info;

use crate::driver::DeviceDriver;
use crate::structure::superblock::Geometry;
use crate::structure::Structure;
use crate::util::error::Result;

mod file;
pub mod meta;

/// The simulated file system over one container.
///
/// Single-process only: nothing locks the container, so two processes
/// operating on it at once will corrupt its metadata.
pub struct SimFS<A: DeviceDriver> {
    pub(crate) structure: Structure<A>,
}

impl<A: DeviceDriver> SimFS<A> {
    /// Formats `device`. Any previous file system on it is destroyed.
    pub fn format(device: A, geometry: Geometry) -> Result<SimFS<A>> {
        Ok(SimFS { structure: Structure::format(device, geometry)? })
    }

    pub fn mount(device: A) -> Result<SimFS<A>> {
        Ok(SimFS { structure: Structure::mount(device)? })
    }

    pub fn get_block_size(&self) -> usize {
        self.structure.get_block_size()
    }

    pub fn create_file(&mut self, name: &str) -> Result<()> {
        let structure = &mut self.structure;
        structure.directory.create(&mut structure.io, name)?;
        info!("Created file {:?}", name);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn into_device(self) -> A {
        self.structure.into_device()
    }
}
