use flashfat::{DirEntry, Geometry};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub name: String,
    pub slot: u16,
    pub attributes: u8,
    pub flags: String,
    pub directory: bool,
    pub starting_cluster: u16,
    /// Byte offset of the first cluster; absent for empty files.
    pub location: Option<u64>,
    pub size_bytes: u32,
}

impl EntryReport {
    pub fn new(entry: &DirEntry, geometry: &Geometry) -> Self {
        Self {
            name: entry.short_name().to_string(),
            slot: entry.slot,
            attributes: entry.attributes,
            flags: entry_flags(entry),
            directory: entry.is_directory(),
            starting_cluster: entry.starting_cluster,
            location: geometry.cluster_offset(entry.starting_cluster),
            size_bytes: entry.size_bytes,
        }
    }
}

pub fn listing_line(report: &EntryReport) -> String {
    format!(
        "{}   -   starts at location 0x{:X} and has the size: {} bytes",
        report.name,
        report.location.unwrap_or(0),
        report.size_bytes
    )
}

/// `RHSDA` with `-` for each attribute the entry lacks.
pub fn entry_flags(entry: &DirEntry) -> String {
    [
        (entry.is_read_only(), 'R'),
        (entry.is_hidden(), 'H'),
        (entry.is_system(), 'S'),
        (entry.is_directory(), 'D'),
        (entry.is_archive(), 'A'),
    ]
    .iter()
    .map(|&(set, flag)| if set { flag } else { '-' })
    .collect()
}

#[derive(Debug, Serialize)]
pub struct GeometryReport {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub root_dir_entries: u16,
    pub total_sectors: u16,
    pub sectors_per_fat: u16,
    pub sector_count: u32,
    pub root_dir_sector: u32,
    pub root_dir_size_sectors: u32,
    pub data_start_sector: u32,
    pub cluster_size: u32,
    pub cluster_count: u32,
    pub boot_signature_present: bool,
    pub volume_label: Option<String>,
}

impl GeometryReport {
    pub fn new(geometry: &Geometry, volume_label: Option<&[u8]>) -> Self {
        let bpb = geometry.bpb();
        Self {
            bytes_per_sector: bpb.bytes_per_sector,
            sectors_per_cluster: bpb.sectors_per_cluster,
            reserved_sectors: bpb.reserved_sectors,
            num_fats: bpb.num_fats,
            root_dir_entries: bpb.root_dir_entries,
            total_sectors: bpb.total_sectors,
            sectors_per_fat: bpb.sectors_per_fat,
            sector_count: geometry.sector_count(),
            root_dir_sector: geometry.root_dir_sector(),
            root_dir_size_sectors: geometry.root_dir_size_sectors(),
            data_start_sector: geometry.data_start_sector(),
            cluster_size: geometry.cluster_size(),
            cluster_count: geometry.cluster_count(),
            boot_signature_present: geometry.boot_signature_present(),
            volume_label: volume_label.map(|label| label.iter().map(|&b| b as char).collect()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("bytes_per_sector={}", self.bytes_per_sector),
            format!("sectors_per_cluster={}", self.sectors_per_cluster),
            format!("reserved_sectors={}", self.reserved_sectors),
            format!("num_fats={}", self.num_fats),
            format!("root_dir_entries={}", self.root_dir_entries),
            format!("total_sectors={}", self.total_sectors),
            format!("sectors_per_fat={}", self.sectors_per_fat),
            format!("sector_count={}", self.sector_count),
            format!("root_dir_sector={}", self.root_dir_sector),
            format!("root_dir_size_sectors={}", self.root_dir_size_sectors),
            format!("data_start_sector={}", self.data_start_sector),
            format!("cluster_size={}", self.cluster_size),
            format!("cluster_count={}", self.cluster_count),
            format!("boot_signature_present={}", self.boot_signature_present),
            format!(
                "volume_label={}",
                self.volume_label.as_deref().unwrap_or("<none>")
            ),
        ]
    }
}
