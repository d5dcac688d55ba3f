use super::{chain::read_chain, dir_scan::root_entries, dir_scan::DirEntry, geometry::Geometry};
use crate::{error::FatError, source::BlockSource};

/// First root entry whose `NAME.EXT` form equals `name` exactly.
pub fn find_entry<S: BlockSource>(
    geometry: &Geometry,
    source: &mut S,
    name: &str,
) -> Result<DirEntry, FatError<S::Error>> {
    for entry in root_entries(geometry, source) {
        let entry = entry?;
        if entry.short_name().matches(name) {
            return Ok(entry);
        }
    }
    Err(FatError::NotFound)
}

/// Declared size of `name`. A miss is `NotFound`, never `Ok(0)`.
pub fn file_size<S: BlockSource>(
    geometry: &Geometry,
    source: &mut S,
    name: &str,
) -> Result<u32, FatError<S::Error>> {
    find_entry(geometry, source, name).map(|entry| entry.size_bytes)
}

pub fn read_file<S: BlockSource>(
    geometry: &Geometry,
    source: &mut S,
    name: &str,
    out: &mut [u8],
) -> Result<usize, FatError<S::Error>> {
    let entry = find_entry(geometry, source, name)?;
    read_chain(
        geometry,
        source,
        entry.starting_cluster,
        entry.size_bytes,
        out,
    )
}
