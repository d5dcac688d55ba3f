//! FAT12 layout interpreter: boot sector geometry, root directory, and
//! cluster chains. Every query reads through the block source again;
//! nothing is cached between calls.

pub mod chain;
pub mod dir_scan;
pub mod geometry;
pub mod lookup;
pub mod names;

use heapless::Vec;

pub use chain::{Clusters, FAT12_END_OF_CHAIN};
pub use dir_scan::{DirEntry, RootEntries, SlotKind};
pub use geometry::{BiosParameterBlock, Geometry};
pub use names::{trim_field, ShortName};

use crate::{error::FatError, source::BlockSource, BPB_SIZE};

/// A mounted volume: the block source plus the geometry read at mount.
pub struct Volume<S> {
    source: S,
    geometry: Geometry,
}

impl<S: BlockSource> Volume<S> {
    /// Read the boot sector at offset 0 and derive the layout.
    pub fn mount(mut source: S) -> Result<Self, FatError<S::Error>> {
        let mut boot = [0u8; BPB_SIZE];
        source.read(0, &mut boot).map_err(FatError::Io)?;
        let geometry = Geometry::parse(&boot)?;
        Ok(Self { source, geometry })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn entries(&mut self) -> RootEntries<'_, S> {
        dir_scan::root_entries(&self.geometry, &mut self.source)
    }

    pub fn find(&mut self, name: &str) -> Result<DirEntry, FatError<S::Error>> {
        lookup::find_entry(&self.geometry, &mut self.source, name)
    }

    pub fn file_size(&mut self, name: &str) -> Result<u32, FatError<S::Error>> {
        lookup::file_size(&self.geometry, &mut self.source, name)
    }

    pub fn read_file(&mut self, name: &str, out: &mut [u8]) -> Result<usize, FatError<S::Error>> {
        lookup::read_file(&self.geometry, &mut self.source, name, out)
    }

    pub fn read_chain(
        &mut self,
        start_cluster: u16,
        declared_size: u32,
        out: &mut [u8],
    ) -> Result<usize, FatError<S::Error>> {
        chain::read_chain(
            &self.geometry,
            &mut self.source,
            start_cluster,
            declared_size,
            out,
        )
    }

    pub fn next_cluster(&mut self, cluster: u16) -> Result<u16, FatError<S::Error>> {
        chain::next_cluster(&self.geometry, &mut self.source, cluster)
    }

    pub fn clusters(&mut self, start_cluster: u16) -> Clusters<'_, S> {
        chain::clusters(&self.geometry, &mut self.source, start_cluster)
    }

    pub fn volume_label(&mut self) -> Result<Option<Vec<u8, 11>>, FatError<S::Error>> {
        dir_scan::volume_label(&self.geometry, &mut self.source)
    }
}
