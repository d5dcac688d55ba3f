use core::iter::FusedIterator;

use heapless::Vec;

use super::{geometry::Geometry, names::trim_field, names::ShortName};
use crate::{
    codec::{read_u16_le, read_u32_le},
    error::FatError,
    source::BlockSource,
    DIR_ENTRY_SIZE,
};

pub const ATTR_READ_ONLY: u8 = 0x01;
pub const ATTR_HIDDEN: u8 = 0x02;
pub const ATTR_SYSTEM: u8 = 0x04;
pub const ATTR_VOLUME_ID: u8 = 0x08;
pub const ATTR_DIRECTORY: u8 = 0x10;
pub const ATTR_ARCHIVE: u8 = 0x20;
pub const ATTR_LONG_NAME: u8 = 0x0F;

const SLOT_END_OF_DIRECTORY: u8 = 0x00;
const SLOT_DELETED: u8 = 0xE5;
const ENTRY_ATTRIBUTES: usize = 11;
const ENTRY_STARTING_CLUSTER: usize = 26;
const ENTRY_SIZE_BYTES: usize = 28;

/// One live root-directory slot. Name fields are kept exactly as stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub slot: u16,
    pub name: [u8; 8],
    pub extension: [u8; 3],
    pub attributes: u8,
    pub starting_cluster: u16,
    pub size_bytes: u32,
}

impl DirEntry {
    pub fn parse(slot: u16, raw: &[u8; DIR_ENTRY_SIZE]) -> Self {
        let mut name = [0u8; 8];
        name.copy_from_slice(&raw[0..8]);
        let mut extension = [0u8; 3];
        extension.copy_from_slice(&raw[8..11]);
        Self {
            slot,
            name,
            extension,
            attributes: raw[ENTRY_ATTRIBUTES],
            starting_cluster: read_u16_le(raw, ENTRY_STARTING_CLUSTER),
            size_bytes: read_u32_le(raw, ENTRY_SIZE_BYTES),
        }
    }

    pub fn short_name(&self) -> ShortName {
        ShortName::from_fields(&self.name, &self.extension)
    }

    pub fn is_read_only(&self) -> bool {
        self.attributes & ATTR_READ_ONLY != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes & ATTR_HIDDEN != 0
    }

    pub fn is_system(&self) -> bool {
        self.attributes & ATTR_SYSTEM != 0
    }

    pub fn is_directory(&self) -> bool {
        self.attributes & ATTR_DIRECTORY != 0
    }

    pub fn is_archive(&self) -> bool {
        self.attributes & ATTR_ARCHIVE != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    /// First byte `0x00`: this and every later slot is unused.
    EndOfDirectory,
    /// Deleted, or carries the volume-ID bit (labels and long-name parts).
    Skip,
    Entry,
}

pub fn classify_slot(raw: &[u8; DIR_ENTRY_SIZE]) -> SlotKind {
    match raw[0] {
        SLOT_END_OF_DIRECTORY => SlotKind::EndOfDirectory,
        SLOT_DELETED => SlotKind::Skip,
        _ if raw[ENTRY_ATTRIBUTES] & ATTR_VOLUME_ID != 0 => SlotKind::Skip,
        _ => SlotKind::Entry,
    }
}

pub fn read_slot<S: BlockSource>(
    geometry: &Geometry,
    source: &mut S,
    slot: u16,
    out: &mut [u8; DIR_ENTRY_SIZE],
) -> Result<(), FatError<S::Error>> {
    let offset = geometry.root_dir_offset() + slot as u64 * DIR_ENTRY_SIZE as u64;
    source.read(offset, out).map_err(FatError::Io)
}

/// Lazy walk over the root directory, yielding live entries in slot order.
///
/// Stops at the first end-of-directory slot or after `root_dir_entries`
/// slots. A read failure is yielded once and ends the walk.
pub struct RootEntries<'a, S> {
    geometry: &'a Geometry,
    source: &'a mut S,
    next_slot: u16,
    finished: bool,
}

pub fn root_entries<'a, S: BlockSource>(
    geometry: &'a Geometry,
    source: &'a mut S,
) -> RootEntries<'a, S> {
    RootEntries {
        geometry,
        source,
        next_slot: 0,
        finished: false,
    }
}

impl<S: BlockSource> Iterator for RootEntries<'_, S> {
    type Item = Result<DirEntry, FatError<S::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished && self.next_slot < self.geometry.root_dir_entries() {
            let slot = self.next_slot;
            self.next_slot += 1;

            let mut raw = [0u8; DIR_ENTRY_SIZE];
            if let Err(err) = read_slot(self.geometry, self.source, slot, &mut raw) {
                self.finished = true;
                return Some(Err(err));
            }
            match classify_slot(&raw) {
                SlotKind::EndOfDirectory => self.finished = true,
                SlotKind::Skip => continue,
                SlotKind::Entry => return Some(Ok(DirEntry::parse(slot, &raw))),
            }
        }
        self.finished = true;
        None
    }
}

impl<S: BlockSource> FusedIterator for RootEntries<'_, S> {}

/// Label stored in the root directory as a volume-ID entry, trimmed.
pub fn volume_label<S: BlockSource>(
    geometry: &Geometry,
    source: &mut S,
) -> Result<Option<Vec<u8, 11>>, FatError<S::Error>> {
    for slot in 0..geometry.root_dir_entries() {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        read_slot(geometry, source, slot, &mut raw)?;
        match raw[0] {
            SLOT_END_OF_DIRECTORY => break,
            SLOT_DELETED => continue,
            _ => {}
        }
        let attributes = raw[ENTRY_ATTRIBUTES];
        if attributes == ATTR_LONG_NAME || attributes & ATTR_VOLUME_ID == 0 {
            continue;
        }
        let mut label = Vec::new();
        let _ = label.extend_from_slice(trim_field(&raw[0..11]));
        return Ok(Some(label));
    }
    Ok(None)
}
