use crate::{
    codec::{read_u16_le, read_u32_le},
    error::GeometryFault,
    BPB_SIZE, DIR_ENTRY_SIZE,
};

const BPB_BYTES_PER_SECTOR: usize = 11;
const BPB_SECTORS_PER_CLUSTER: usize = 13;
const BPB_RESERVED_SECTORS: usize = 14;
const BPB_NUM_FATS: usize = 16;
const BPB_ROOT_DIR_ENTRIES: usize = 17;
const BPB_TOTAL_SECTORS: usize = 19;
const BPB_SECTORS_PER_FAT: usize = 22;
const BPB_TOTAL_SECTORS_LARGE: usize = 32;
const BOOT_SIGNATURE_OFFSET: usize = 510;
const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];

/// The seven boot sector fields the FAT12 layout depends on, as stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BiosParameterBlock {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub root_dir_entries: u16,
    pub total_sectors: u16,
    pub sectors_per_fat: u16,
}

impl BiosParameterBlock {
    pub fn decode(boot: &[u8]) -> Result<Self, GeometryFault> {
        if boot.len() < BPB_SIZE {
            return Err(GeometryFault::ShortBootSector(boot.len()));
        }
        Ok(Self {
            bytes_per_sector: read_u16_le(boot, BPB_BYTES_PER_SECTOR),
            sectors_per_cluster: boot[BPB_SECTORS_PER_CLUSTER],
            reserved_sectors: read_u16_le(boot, BPB_RESERVED_SECTORS),
            num_fats: boot[BPB_NUM_FATS],
            root_dir_entries: read_u16_le(boot, BPB_ROOT_DIR_ENTRIES),
            total_sectors: read_u16_le(boot, BPB_TOTAL_SECTORS),
            sectors_per_fat: read_u16_le(boot, BPB_SECTORS_PER_FAT),
        })
    }
}

/// Volume layout computed once at mount.
///
/// The derived sector positions are only ever produced together from a
/// [`BiosParameterBlock`]; there are no setters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    bpb: BiosParameterBlock,
    total_sectors_large: u32,
    boot_signature_present: bool,
    root_dir_sector: u32,
    root_dir_size_sectors: u32,
    data_start_sector: u32,
}

impl Geometry {
    /// Decode a boot sector window (at least `BPB_SIZE` bytes).
    pub fn parse(boot: &[u8]) -> Result<Self, GeometryFault> {
        let bpb = BiosParameterBlock::decode(boot)?;
        let total_sectors_large = read_u32_le(boot, BPB_TOTAL_SECTORS_LARGE);
        let signature = [boot[BOOT_SIGNATURE_OFFSET], boot[BOOT_SIGNATURE_OFFSET + 1]];
        Self::derive(bpb, total_sectors_large, signature == BOOT_SIGNATURE)
    }

    /// Build from already-decoded fields. Signature status reads as absent.
    pub fn from_bpb(bpb: BiosParameterBlock) -> Result<Self, GeometryFault> {
        Self::derive(bpb, 0, false)
    }

    fn derive(
        bpb: BiosParameterBlock,
        total_sectors_large: u32,
        boot_signature_present: bool,
    ) -> Result<Self, GeometryFault> {
        if bpb.bytes_per_sector == 0 {
            return Err(GeometryFault::ZeroBytesPerSector);
        }
        if bpb.sectors_per_cluster == 0 {
            return Err(GeometryFault::ZeroSectorsPerCluster);
        }

        let root_dir_sector =
            bpb.reserved_sectors as u32 + bpb.num_fats as u32 * bpb.sectors_per_fat as u32;
        let root_dir_size_sectors = (bpb.root_dir_entries as u32 * DIR_ENTRY_SIZE as u32)
            .div_ceil(bpb.bytes_per_sector as u32);
        let data_start_sector = root_dir_sector + root_dir_size_sectors;

        Ok(Self {
            bpb,
            total_sectors_large,
            boot_signature_present,
            root_dir_sector,
            root_dir_size_sectors,
            data_start_sector,
        })
    }

    pub fn bpb(&self) -> &BiosParameterBlock {
        &self.bpb
    }

    pub fn bytes_per_sector(&self) -> u16 {
        self.bpb.bytes_per_sector
    }

    pub fn sectors_per_cluster(&self) -> u8 {
        self.bpb.sectors_per_cluster
    }

    pub fn reserved_sectors(&self) -> u16 {
        self.bpb.reserved_sectors
    }

    pub fn num_fats(&self) -> u8 {
        self.bpb.num_fats
    }

    pub fn root_dir_entries(&self) -> u16 {
        self.bpb.root_dir_entries
    }

    pub fn total_sectors(&self) -> u16 {
        self.bpb.total_sectors
    }

    pub fn sectors_per_fat(&self) -> u16 {
        self.bpb.sectors_per_fat
    }

    pub fn root_dir_sector(&self) -> u32 {
        self.root_dir_sector
    }

    pub fn root_dir_size_sectors(&self) -> u32 {
        self.root_dir_size_sectors
    }

    pub fn data_start_sector(&self) -> u32 {
        self.data_start_sector
    }

    /// Whether bytes 510..512 held `55 AA`. Informational only.
    pub fn boot_signature_present(&self) -> bool {
        self.boot_signature_present
    }

    /// Sector count of the volume, falling back to the 32-bit field when
    /// the 16-bit one is zero.
    pub fn sector_count(&self) -> u32 {
        if self.bpb.total_sectors != 0 {
            self.bpb.total_sectors as u32
        } else {
            self.total_sectors_large
        }
    }

    pub fn fat_offset(&self) -> u64 {
        self.bpb.reserved_sectors as u64 * self.bpb.bytes_per_sector as u64
    }

    pub fn root_dir_offset(&self) -> u64 {
        self.root_dir_sector as u64 * self.bpb.bytes_per_sector as u64
    }

    pub fn cluster_size(&self) -> u32 {
        self.bpb.sectors_per_cluster as u32 * self.bpb.bytes_per_sector as u32
    }

    /// Byte offset of a data cluster. Clusters 0 and 1 have no data.
    pub fn cluster_offset(&self, cluster: u16) -> Option<u64> {
        let index = cluster.checked_sub(2)? as u64;
        let sector = self.data_start_sector as u64 + index * self.bpb.sectors_per_cluster as u64;
        Some(sector * self.bpb.bytes_per_sector as u64)
    }

    /// Number of clusters that fit in the data region.
    pub fn cluster_count(&self) -> u32 {
        self.sector_count().saturating_sub(self.data_start_sector)
            / self.bpb.sectors_per_cluster as u32
    }

    /// Highest cluster number that addresses the data region.
    pub fn max_cluster(&self) -> u32 {
        self.cluster_count().saturating_add(1)
    }

    /// Upper bound on clusters visited by any single chain walk.
    pub fn max_chain_steps(&self) -> u32 {
        (self.sector_count() / self.bpb.sectors_per_cluster as u32).saturating_add(1)
    }
}
