use core::{cmp, iter::FusedIterator};

use super::geometry::Geometry;
use crate::{error::FatError, source::BlockSource};

pub const FAT12_MASK: u16 = 0x0FFF;
/// Values from here to `0xFFF` terminate a chain.
pub const FAT12_END_OF_CHAIN: u16 = 0x0FF8;
pub const FIRST_DATA_CLUSTER: u16 = 2;

/// Byte offset of a cluster's entry inside the FAT (1.5 bytes per entry).
pub fn fat12_entry_offset(cluster: u16) -> u32 {
    cluster as u32 + cluster as u32 / 2
}

/// Decode the 12-bit entry for `cluster` from the two bytes at its offset.
///
/// Even clusters own the low 12 bits of the pair, odd clusters the high 12.
pub fn decode_fat12(pair: [u8; 2], cluster: u16) -> u16 {
    if cluster & 1 == 1 {
        (pair[0] >> 4) as u16 | (pair[1] as u16) << 4
    } else {
        u16::from_le_bytes(pair) & FAT12_MASK
    }
}

pub fn is_end_of_chain(value: u16) -> bool {
    value >= FAT12_END_OF_CHAIN
}

fn check_data_cluster<E>(geometry: &Geometry, cluster: u16) -> Result<u16, FatError<E>> {
    if cluster < FIRST_DATA_CLUSTER || cluster as u32 > geometry.max_cluster() {
        return Err(FatError::BadCluster(cluster));
    }
    Ok(cluster)
}

/// Raw FAT12 value stored for `cluster` in the first FAT copy.
pub fn next_cluster<S: BlockSource>(
    geometry: &Geometry,
    source: &mut S,
    cluster: u16,
) -> Result<u16, FatError<S::Error>> {
    let offset = geometry.fat_offset() + fat12_entry_offset(cluster) as u64;
    let mut pair = [0u8; 2];
    source.read(offset, &mut pair).map_err(FatError::Io)?;
    Ok(decode_fat12(pair, cluster))
}

/// Copy `declared_size` bytes of the chain starting at `start_cluster` into
/// `out`, returning the byte count.
///
/// Fails before any read when `out` cannot hold the declared size. A chain
/// that ends early reports `TruncatedChain` and a walk longer than the
/// volume can hold reports `ChainCycleSuspected`; in both cases the copied
/// prefix of `out` stays valid.
pub fn read_chain<S: BlockSource>(
    geometry: &Geometry,
    source: &mut S,
    start_cluster: u16,
    declared_size: u32,
    out: &mut [u8],
) -> Result<usize, FatError<S::Error>> {
    let declared = declared_size as usize;
    if declared > out.len() {
        return Err(FatError::BufferTooSmall {
            needed: declared,
            capacity: out.len(),
        });
    }
    if declared == 0 {
        return Ok(0);
    }

    let cluster_size = geometry.cluster_size() as usize;
    let max_steps = geometry.max_chain_steps();
    let mut cluster = check_data_cluster(geometry, start_cluster)?;
    let mut bytes_read = 0usize;
    let mut steps = 0u32;

    loop {
        if steps >= max_steps {
            return Err(FatError::ChainCycleSuspected { copied: bytes_read });
        }
        steps += 1;

        let offset = geometry
            .cluster_offset(cluster)
            .ok_or(FatError::BadCluster(cluster))?;
        let to_copy = cmp::min(cluster_size, declared - bytes_read);
        source
            .read(offset, &mut out[bytes_read..bytes_read + to_copy])
            .map_err(FatError::Io)?;
        bytes_read += to_copy;

        if bytes_read >= declared {
            return Ok(bytes_read);
        }

        let value = next_cluster(geometry, source, cluster)?;
        if is_end_of_chain(value) {
            return Err(FatError::TruncatedChain {
                copied: bytes_read,
                declared,
            });
        }
        cluster = check_data_cluster(geometry, value)?;
    }
}

/// Lazy walk over the cluster numbers of one chain, start cluster first.
///
/// Bounded by the same step limit as [`read_chain`]; the first error is
/// yielded and ends the walk.
pub struct Clusters<'a, S> {
    geometry: &'a Geometry,
    source: &'a mut S,
    next: Option<u16>,
    steps: u32,
}

pub fn clusters<'a, S: BlockSource>(
    geometry: &'a Geometry,
    source: &'a mut S,
    start_cluster: u16,
) -> Clusters<'a, S> {
    Clusters {
        geometry,
        source,
        next: Some(start_cluster),
        steps: 0,
    }
}

impl<S: BlockSource> Iterator for Clusters<'_, S> {
    type Item = Result<u16, FatError<S::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        let cluster = self.next.take()?;
        if let Err(err) = check_data_cluster::<S::Error>(self.geometry, cluster) {
            return Some(Err(err));
        }
        if self.steps >= self.geometry.max_chain_steps() {
            return Some(Err(FatError::ChainCycleSuspected { copied: 0 }));
        }
        self.steps += 1;

        match next_cluster(self.geometry, self.source, cluster) {
            Ok(value) if is_end_of_chain(value) => {}
            Ok(value) => self.next = Some(value),
            Err(err) => return Some(Err(err)),
        }
        Some(Ok(cluster))
    }
}

impl<S: BlockSource> FusedIterator for Clusters<'_, S> {}
