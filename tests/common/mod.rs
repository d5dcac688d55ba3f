#![allow(dead_code)]

use flashfat::{BlockSource, MemoryError, MemorySource};

#[derive(Clone, Copy, Debug)]
pub struct Layout {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub root_dir_entries: u16,
    pub total_sectors: u16,
    pub sectors_per_fat: u16,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 1,
            num_fats: 2,
            root_dir_entries: 16,
            total_sectors: 64,
            sectors_per_fat: 1,
        }
    }
}

/// Synthetic FAT12 volume assembled slot by slot and cluster by cluster.
pub struct FixtureImage {
    layout: Layout,
    bytes: Vec<u8>,
    next_slot: usize,
    next_free_cluster: u16,
}

impl FixtureImage {
    pub fn new(layout: Layout) -> Self {
        let size = layout.total_sectors as usize * layout.bytes_per_sector as usize;
        let mut image = Self {
            layout,
            bytes: vec![0; size],
            next_slot: 0,
            next_free_cluster: 2,
        };
        let boot = &mut image.bytes;
        boot[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        boot[3..11].copy_from_slice(b"MSDOS5.0");
        boot[11..13].copy_from_slice(&layout.bytes_per_sector.to_le_bytes());
        boot[13] = layout.sectors_per_cluster;
        boot[14..16].copy_from_slice(&layout.reserved_sectors.to_le_bytes());
        boot[16] = layout.num_fats;
        boot[17..19].copy_from_slice(&layout.root_dir_entries.to_le_bytes());
        boot[19..21].copy_from_slice(&layout.total_sectors.to_le_bytes());
        boot[21] = 0xF8;
        boot[22..24].copy_from_slice(&layout.sectors_per_fat.to_le_bytes());
        boot[510] = 0x55;
        boot[511] = 0xAA;
        image.set_fat(0, 0xFF8);
        image.set_fat(1, 0xFFF);
        image
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn sector_bytes(&self, sector: u32) -> usize {
        sector as usize * self.layout.bytes_per_sector as usize
    }

    pub fn fat_offset(&self) -> usize {
        self.sector_bytes(self.layout.reserved_sectors as u32)
    }

    pub fn root_dir_sector(&self) -> u32 {
        self.layout.reserved_sectors as u32
            + self.layout.num_fats as u32 * self.layout.sectors_per_fat as u32
    }

    pub fn data_start_sector(&self) -> u32 {
        let root_bytes = self.layout.root_dir_entries as u32 * 32;
        self.root_dir_sector() + root_bytes.div_ceil(self.layout.bytes_per_sector as u32)
    }

    pub fn cluster_size(&self) -> usize {
        self.layout.sectors_per_cluster as usize * self.layout.bytes_per_sector as usize
    }

    pub fn cluster_offset(&self, cluster: u16) -> usize {
        self.sector_bytes(
            self.data_start_sector()
                + (cluster as u32 - 2) * self.layout.sectors_per_cluster as u32,
        )
    }

    /// Store a 12-bit value for `cluster` in every FAT copy.
    pub fn set_fat(&mut self, cluster: u16, value: u16) {
        let fat_len = self.sector_bytes(self.layout.sectors_per_fat as u32);
        for copy in 0..self.layout.num_fats as usize {
            let at = self.fat_offset() + copy * fat_len + cluster as usize + cluster as usize / 2;
            let bytes = &mut self.bytes;
            if cluster & 1 == 1 {
                bytes[at] = (bytes[at] & 0x0F) | ((value << 4) as u8 & 0xF0);
                bytes[at + 1] = (value >> 4) as u8;
            } else {
                bytes[at] = value as u8;
                bytes[at + 1] = (bytes[at + 1] & 0xF0) | ((value >> 8) as u8 & 0x0F);
            }
        }
    }

    pub fn push_slot(&mut self, raw: [u8; 32]) -> usize {
        let slot = self.next_slot;
        self.put_slot(slot, raw);
        self.next_slot += 1;
        slot
    }

    pub fn put_slot(&mut self, slot: usize, raw: [u8; 32]) {
        let at = self.sector_bytes(self.root_dir_sector()) + slot * 32;
        self.bytes[at..at + 32].copy_from_slice(&raw);
    }

    pub fn write_cluster(&mut self, cluster: u16, data: &[u8]) {
        assert!(data.len() <= self.cluster_size());
        let at = self.cluster_offset(cluster);
        self.bytes[at..at + data.len()].copy_from_slice(data);
    }

    /// Write `data` into consecutive free clusters, link them, and add a
    /// root entry. Returns the starting cluster (0 for an empty file).
    pub fn add_file(&mut self, short: &[u8; 11], data: &[u8]) -> u16 {
        let clusters = data.len().div_ceil(self.cluster_size());
        let first = if clusters == 0 {
            0
        } else {
            self.next_free_cluster
        };
        for (idx, chunk) in data.chunks(self.cluster_size()).enumerate() {
            let cluster = first + idx as u16;
            self.write_cluster(cluster, chunk);
            let link = if idx + 1 == clusters {
                0xFFF
            } else {
                cluster + 1
            };
            self.set_fat(cluster, link);
        }
        self.next_free_cluster += clusters as u16;
        self.push_slot(dir_entry(short, 0x20, first, data.len() as u32));
        first
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn into_source(self) -> MemorySource<Vec<u8>> {
        MemorySource::new(self.bytes)
    }
}

pub fn dir_entry(short: &[u8; 11], attributes: u8, cluster: u16, size: u32) -> [u8; 32] {
    let mut raw = [0u8; 32];
    raw[..11].copy_from_slice(short);
    raw[11] = attributes;
    raw[26..28].copy_from_slice(&cluster.to_le_bytes());
    raw[28..32].copy_from_slice(&size.to_le_bytes());
    raw
}

/// Deterministic non-repeating-per-cluster content.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|idx| (idx * 7 + idx / 251) as u8).collect()
}

/// Records every read so tests can assert which regions were touched.
pub struct RecordingSource {
    inner: MemorySource<Vec<u8>>,
    pub reads: Vec<(u64, usize)>,
}

impl RecordingSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: MemorySource::new(bytes),
            reads: Vec::new(),
        }
    }

    pub fn reads_within(&self, start: u64, end: u64) -> usize {
        self.reads
            .iter()
            .filter(|(offset, _)| *offset >= start && *offset < end)
            .count()
    }
}

impl BlockSource for RecordingSource {
    type Error = MemoryError;

    fn read(&mut self, offset: u64, out: &mut [u8]) -> Result<(), MemoryError> {
        self.reads.push((offset, out.len()));
        self.inner.read(offset, out)
    }
}

/// Fails every read that starts inside `[fail_start, fail_end)`.
pub struct FaultySource {
    inner: MemorySource<Vec<u8>>,
    fail_start: u64,
    fail_end: u64,
}

impl FaultySource {
    pub fn new(bytes: Vec<u8>, fail_start: u64, fail_end: u64) -> Self {
        Self {
            inner: MemorySource::new(bytes),
            fail_start,
            fail_end,
        }
    }
}

impl BlockSource for FaultySource {
    type Error = MemoryError;

    fn read(&mut self, offset: u64, out: &mut [u8]) -> Result<(), MemoryError> {
        if offset >= self.fail_start && offset < self.fail_end {
            return Err(MemoryError::OutOfRange {
                offset,
                len: out.len(),
            });
        }
        self.inner.read(offset, out)
    }
}
