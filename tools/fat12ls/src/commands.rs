use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use flashfat::{load_image, BlockSource, DirEntry, FatError, FileSource, MemorySource, Volume};

use crate::{
    env_utils::ImageConfig,
    logging::Logger,
    report::{listing_line, EntryReport, GeometryReport},
};

/// Either the whole image loaded up front or positioned reads against the
/// open file (`FAT12LS_STREAM=1`).
pub enum ImageSource {
    Loaded(MemorySource<Vec<u8>>),
    Streamed(FileSource),
}

impl BlockSource for ImageSource {
    type Error = io::Error;

    fn read(&mut self, offset: u64, out: &mut [u8]) -> io::Result<()> {
        match self {
            Self::Loaded(source) => source
                .read(offset, out)
                .map_err(|err| io::Error::new(io::ErrorKind::UnexpectedEof, err)),
            Self::Streamed(source) => source.read(offset, out),
        }
    }
}

pub type ImageVolume = Volume<ImageSource>;

pub fn open_volume(logger: &mut Logger, path: &Path, config: ImageConfig) -> Result<ImageVolume> {
    let source = if config.stream {
        ImageSource::Streamed(
            FileSource::open(path).with_context(|| format!("opening {}", path.display()))?,
        )
    } else {
        ImageSource::Loaded(
            load_image(path).with_context(|| format!("loading {}", path.display()))?,
        )
    };
    let volume = Volume::mount(source)
        .with_context(|| format!("mounting FAT12 volume in {}", path.display()))?;

    let geometry = volume.geometry();
    logger.event(
        "info",
        &format!(
            "mount_ok image={} bytes_per_sector={} sectors_per_cluster={} root_dir_sector={} data_start_sector={}",
            path.display(),
            geometry.bytes_per_sector(),
            geometry.sectors_per_cluster(),
            geometry.root_dir_sector(),
            geometry.data_start_sector()
        ),
    );
    if !geometry.boot_signature_present() {
        logger.warn(format!(
            "{}: boot sector lacks the 55 AA signature",
            path.display()
        ));
    }
    Ok(volume)
}

fn entry_reports(volume: &mut ImageVolume) -> Result<Vec<EntryReport>> {
    let geometry = *volume.geometry();
    volume
        .entries()
        .map(|entry| {
            entry
                .map(|entry| EntryReport::new(&entry, &geometry))
                .context("reading root directory")
        })
        .collect()
}

fn find<S>(volume: &mut Volume<S>, name: &str) -> Result<DirEntry>
where
    S: BlockSource,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    match volume.find(name) {
        Ok(entry) => Ok(entry),
        Err(FatError::NotFound) => Err(anyhow!("{name}: not found in root directory")),
        Err(err) => Err(err).with_context(|| format!("looking up {name}")),
    }
}

pub fn run_ls(volume: &mut ImageVolume, json: bool, out: &mut dyn Write) -> Result<()> {
    let reports = entry_reports(volume)?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &reports)?;
        writeln!(out)?;
    } else {
        for report in &reports {
            writeln!(out, "{}", listing_line(report))?;
        }
    }
    Ok(())
}

pub fn run_info(volume: &mut ImageVolume, out: &mut dyn Write) -> Result<()> {
    let label = volume.volume_label().context("reading volume label")?;
    let report = GeometryReport::new(volume.geometry(), label.as_deref());
    for line in report.lines() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub fn run_stat(volume: &mut ImageVolume, name: &str, out: &mut dyn Write) -> Result<()> {
    let entry = find(volume, name)?;
    let report = EntryReport::new(&entry, volume.geometry());
    writeln!(out, "name={}", report.name)?;
    writeln!(out, "size_bytes={}", report.size_bytes)?;
    writeln!(out, "starting_cluster={}", report.starting_cluster)?;
    writeln!(out, "location=0x{:X}", report.location.unwrap_or(0))?;
    writeln!(out, "attributes={}", report.flags)?;
    writeln!(out, "slot={}", report.slot)?;
    Ok(())
}

/// Copy one file out. A chain that breaks early still emits the bytes read
/// before the break, then fails.
pub fn run_cat<S>(
    logger: &mut Logger,
    volume: &mut Volume<S>,
    name: &str,
    max_file_bytes: u32,
    output: Option<PathBuf>,
    out: &mut dyn Write,
) -> Result<()>
where
    S: BlockSource,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let entry = find(volume, name)?;
    let mut buffer = vec![0u8; max_file_bytes as usize];
    let read = volume.read_chain(entry.starting_cluster, entry.size_bytes, &mut buffer);
    let (copied, failure) = match read {
        Ok(len) => (len, None),
        Err(err @ FatError::BufferTooSmall { .. }) => {
            return Err(err).with_context(|| {
                format!("{name} is larger than FAT12LS_MAX_FILE_BYTES={max_file_bytes}")
            });
        }
        Err(err) => match err.copied() {
            Some(copied) => (copied, Some(err)),
            None => return Err(err).with_context(|| format!("reading {name}")),
        },
    };

    let data = &buffer[..copied];
    match &output {
        Some(path) => {
            fs::write(path, data).with_context(|| format!("writing {}", path.display()))?;
            logger.info(format!(
                "{name}: wrote {copied} of {} bytes to {}",
                entry.size_bytes,
                path.display()
            ));
        }
        None => out.write_all(data)?,
    }

    match failure {
        Some(err) => Err(err).with_context(|| format!("{name}: chain ended after {copied} bytes")),
        None => Ok(()),
    }
}

pub fn run_chain(volume: &mut ImageVolume, name: &str, out: &mut dyn Write) -> Result<()> {
    let entry = find(volume, name)?;
    if entry.size_bytes == 0 {
        writeln!(out, "{name}: empty file, no clusters")?;
        return Ok(());
    }
    let chain = volume
        .clusters(entry.starting_cluster)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("walking cluster chain of {name}"))?;
    let rendered: Vec<String> = chain.iter().map(u16::to_string).collect();
    writeln!(out, "{}", rendered.join(" -> "))?;
    Ok(())
}
