use std::{fs, io::Write, path::Path};

use anyhow::Result;
use flashfat::{BlockSource, MemoryError, MemorySource, Volume};
use tempfile::NamedTempFile;

use crate::{
    commands::{open_volume, run_cat, run_chain, run_info, run_ls, run_stat, ImageVolume},
    env_utils::ImageConfig,
    logging::Logger,
};

const BYTES_PER_SECTOR: usize = 512;
const ROOT_DIR_SECTOR: usize = 3;
const DATA_START_SECTOR: usize = 4;
const TOTAL_SECTORS: usize = 64;

/// 512-byte sectors, 1 sector per cluster, 2 FATs of 1 sector, 16 root
/// entries. Files are placed in consecutive clusters from 2.
struct ImageBuilder {
    bytes: Vec<u8>,
    slot: usize,
    cluster: u16,
}

impl ImageBuilder {
    fn new() -> Self {
        let mut bytes = vec![0u8; TOTAL_SECTORS * BYTES_PER_SECTOR];
        bytes[11..13].copy_from_slice(&512u16.to_le_bytes());
        bytes[13] = 1;
        bytes[14..16].copy_from_slice(&1u16.to_le_bytes());
        bytes[16] = 2;
        bytes[17..19].copy_from_slice(&16u16.to_le_bytes());
        bytes[19..21].copy_from_slice(&(TOTAL_SECTORS as u16).to_le_bytes());
        bytes[22..24].copy_from_slice(&1u16.to_le_bytes());
        bytes[510] = 0x55;
        bytes[511] = 0xAA;
        Self {
            bytes,
            slot: 0,
            cluster: 2,
        }
    }

    fn set_fat(&mut self, cluster: u16, value: u16) {
        let at = BYTES_PER_SECTOR + cluster as usize + cluster as usize / 2;
        if cluster & 1 == 1 {
            self.bytes[at] = (self.bytes[at] & 0x0F) | ((value << 4) as u8);
            self.bytes[at + 1] = (value >> 4) as u8;
        } else {
            self.bytes[at] = value as u8;
            self.bytes[at + 1] = (self.bytes[at + 1] & 0xF0) | ((value >> 8) as u8 & 0x0F);
        }
    }

    fn entry(&mut self, short: &[u8; 11], attributes: u8, cluster: u16, size: u32) {
        let at = ROOT_DIR_SECTOR * BYTES_PER_SECTOR + self.slot * 32;
        self.bytes[at..at + 11].copy_from_slice(short);
        self.bytes[at + 11] = attributes;
        self.bytes[at + 26..at + 28].copy_from_slice(&cluster.to_le_bytes());
        self.bytes[at + 28..at + 32].copy_from_slice(&size.to_le_bytes());
        self.slot += 1;
    }

    fn file(mut self, short: &[u8; 11], data: &[u8]) -> Self {
        let first = if data.is_empty() { 0 } else { self.cluster };
        let chunks: Vec<&[u8]> = data.chunks(BYTES_PER_SECTOR).collect();
        for (idx, chunk) in chunks.iter().enumerate() {
            let cluster = self.cluster;
            let at = (DATA_START_SECTOR + cluster as usize - 2) * BYTES_PER_SECTOR;
            self.bytes[at..at + chunk.len()].copy_from_slice(chunk);
            let link = if idx + 1 == chunks.len() {
                0xFFF
            } else {
                cluster + 1
            };
            self.set_fat(cluster, link);
            self.cluster += 1;
        }
        self.entry(short, 0x20, first, data.len() as u32);
        self
    }

    fn write(self) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(&self.bytes)?;
        file.flush()?;
        Ok(file)
    }
}

fn sample() -> Result<NamedTempFile> {
    let page: Vec<u8> = (0..1300u32).map(|idx| (idx % 253) as u8).collect();
    ImageBuilder::new()
        .file(b"WSCLI   HTM", &page)
        .file(b"NOTES   TXT", b"hello flash\n")
        .file(b"EMPTY   TXT", &[])
        .write()
}

fn mount(path: &Path, stream: bool) -> Result<ImageVolume> {
    let config = ImageConfig {
        stream,
        ..ImageConfig::default()
    };
    open_volume(&mut Logger::quiet(), path, config)
}

fn output_of(run: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> Result<String> {
    let mut out = Vec::new();
    run(&mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn ls_prints_one_line_per_entry() -> Result<()> {
    let image = sample()?;
    let mut volume = mount(image.path(), false)?;
    let listing = output_of(|out| run_ls(&mut volume, false, out))?;
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(
        lines,
        [
            "WSCLI.HTM   -   starts at location 0x800 and has the size: 1300 bytes",
            "NOTES.TXT   -   starts at location 0xE00 and has the size: 12 bytes",
            "EMPTY.TXT   -   starts at location 0x0 and has the size: 0 bytes",
        ]
    );
    Ok(())
}

#[test]
fn ls_json_lists_entries() -> Result<()> {
    let image = sample()?;
    let mut volume = mount(image.path(), true)?;
    let listing = output_of(|out| run_ls(&mut volume, true, out))?;
    let parsed: serde_json::Value = serde_json::from_str(&listing)?;
    let entries = parsed.as_array().expect("array");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["name"], "WSCLI.HTM");
    assert_eq!(entries[0]["starting_cluster"], 2);
    assert_eq!(entries[2]["location"], serde_json::Value::Null);
    Ok(())
}

#[test]
fn info_reports_layout_and_signature() -> Result<()> {
    let image = sample()?;
    let mut volume = mount(image.path(), false)?;
    let info = output_of(|out| run_info(&mut volume, out))?;
    assert!(info.contains("root_dir_sector=3\n"));
    assert!(info.contains("data_start_sector=4\n"));
    assert!(info.contains("boot_signature_present=true\n"));
    assert!(info.contains("volume_label=<none>\n"));
    Ok(())
}

#[test]
fn stat_missing_file_is_an_error_not_zero() -> Result<()> {
    let image = sample()?;
    let mut volume = mount(image.path(), false)?;
    let err = run_stat(&mut volume, "MISSING.TXT", &mut Vec::new()).unwrap_err();
    assert!(format!("{err:#}").contains("not found"));

    let stat = output_of(|out| run_stat(&mut volume, "EMPTY.TXT", out))?;
    assert!(stat.contains("size_bytes=0\n"));
    Ok(())
}

#[test]
fn cat_streams_file_contents() -> Result<()> {
    let image = sample()?;
    for stream in [false, true] {
        let mut volume = mount(image.path(), stream)?;
        let mut out = Vec::new();
        run_cat(
            &mut Logger::quiet(),
            &mut volume,
            "NOTES.TXT",
            51_200,
            None,
            &mut out,
        )?;
        assert_eq!(out, b"hello flash\n");
    }
    Ok(())
}

#[test]
fn cat_writes_output_path() -> Result<()> {
    let image = sample()?;
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("wscli.htm");
    let mut volume = mount(image.path(), false)?;
    run_cat(
        &mut Logger::quiet(),
        &mut volume,
        "WSCLI.HTM",
        51_200,
        Some(target.clone()),
        &mut Vec::new(),
    )?;
    let written = fs::read(&target)?;
    assert_eq!(written.len(), 1300);
    assert_eq!(written[300], (300 % 253) as u8);
    Ok(())
}

#[test]
fn cat_rejects_file_over_capacity() -> Result<()> {
    let image = sample()?;
    let mut volume = mount(image.path(), false)?;
    let mut out = Vec::new();
    let err = run_cat(
        &mut Logger::quiet(),
        &mut volume,
        "WSCLI.HTM",
        1024,
        None,
        &mut out,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("FAT12LS_MAX_FILE_BYTES=1024"));
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn cat_emits_prefix_then_fails_on_short_chain() -> Result<()> {
    let mut builder = ImageBuilder::new().file(b"SHORT   BIN", &[0x5A; 512]);
    // Declared size claims two clusters but the chain ends after one.
    let size_at = ROOT_DIR_SECTOR * BYTES_PER_SECTOR + 28;
    builder.bytes[size_at..size_at + 4].copy_from_slice(&900u32.to_le_bytes());
    let image = builder.write()?;

    let mut volume = mount(image.path(), false)?;
    let mut out = Vec::new();
    let err = run_cat(
        &mut Logger::quiet(),
        &mut volume,
        "SHORT.BIN",
        51_200,
        None,
        &mut out,
    )
    .unwrap_err();
    assert_eq!(out, vec![0x5A; 512]);
    assert!(format!("{err:#}").contains("after 512 bytes"));
    Ok(())
}

#[test]
fn chain_prints_cluster_numbers() -> Result<()> {
    let image = sample()?;
    let mut volume = mount(image.path(), false)?;
    let chain = output_of(|out| run_chain(&mut volume, "WSCLI.HTM", out))?;
    assert_eq!(chain, "2 -> 3 -> 4\n");
    let empty = output_of(|out| run_chain(&mut volume, "EMPTY.TXT", out))?;
    assert!(empty.contains("no clusters"));
    Ok(())
}

#[test]
fn image_without_boot_sector_fails_to_mount() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(&[0u8; 64])?;
    file.flush()?;
    assert!(mount(file.path(), false).is_err());
    assert!(mount(file.path(), true).is_err());
    Ok(())
}

/// Counts reads that land in the root directory sector.
struct RootReadCounter {
    inner: MemorySource<Vec<u8>>,
    root_reads: usize,
}

impl BlockSource for RootReadCounter {
    type Error = MemoryError;

    fn read(&mut self, offset: u64, out: &mut [u8]) -> Result<(), MemoryError> {
        let root = (ROOT_DIR_SECTOR * BYTES_PER_SECTOR) as u64;
        if (root..root + BYTES_PER_SECTOR as u64).contains(&offset) {
            self.root_reads += 1;
        }
        self.inner.read(offset, out)
    }
}

#[test]
fn cat_scans_root_directory_once() -> Result<()> {
    let builder = ImageBuilder::new()
        .file(b"WSCLI   HTM", &[0x11; 700])
        .file(b"NOTES   TXT", b"hello flash\n");
    let source = RootReadCounter {
        inner: MemorySource::new(builder.bytes),
        root_reads: 0,
    };
    let mut volume = Volume::mount(source)?;

    let mut out = Vec::new();
    run_cat(
        &mut Logger::quiet(),
        &mut volume,
        "NOTES.TXT",
        51_200,
        None,
        &mut out,
    )?;
    assert_eq!(out, b"hello flash\n");
    assert_eq!(volume.source_mut().root_reads, 2);
    Ok(())
}
