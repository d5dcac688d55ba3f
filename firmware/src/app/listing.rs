use core::fmt::Display;

use esp_println::println;
use flashfat::{BlockSource, Geometry, Volume};

pub(crate) fn log_geometry(geometry: &Geometry) {
    println!(
        "fat12[boot]: mount_ok bytes_per_sector={} sectors_per_cluster={} reserved_sectors={} num_fats={} root_dir_entries={} sectors_per_fat={} sector_count={}",
        geometry.bytes_per_sector(),
        geometry.sectors_per_cluster(),
        geometry.reserved_sectors(),
        geometry.num_fats(),
        geometry.root_dir_entries(),
        geometry.sectors_per_fat(),
        geometry.sector_count()
    );
    println!(
        "fat12[boot]: layout root_dir_sector={} root_dir_size_sectors={} data_start_sector={} cluster_count={}",
        geometry.root_dir_sector(),
        geometry.root_dir_size_sectors(),
        geometry.data_start_sector(),
        geometry.cluster_count()
    );
    if !geometry.boot_signature_present() {
        println!("fat12[boot]: warn boot_signature_missing");
    }
}

pub(crate) fn log_label<S>(volume: &mut Volume<S>)
where
    S: BlockSource,
    S::Error: Display,
{
    match volume.volume_label() {
        Ok(Some(label)) => match core::str::from_utf8(&label) {
            Ok(label) => println!("fat12[ls]: label={}", label),
            Err(_) => println!("fat12[ls]: label={:02X?}", label.as_slice()),
        },
        Ok(None) => {}
        Err(err) => println!("fat12[ls]: label_err err={}", err),
    }
}

/// Print the root directory, one line per live entry.
pub(crate) fn log_entries<S>(volume: &mut Volume<S>) -> usize
where
    S: BlockSource,
    S::Error: Display,
{
    let geometry = *volume.geometry();
    let mut count = 0usize;
    for entry in volume.entries() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                println!("fat12[ls]: read_err after={} err={}", count, err);
                return count;
            }
        };
        println!(
            "{}   -   starts at location 0x{:X} and has the size: {} bytes",
            entry.short_name(),
            geometry.cluster_offset(entry.starting_cluster).unwrap_or(0),
            entry.size_bytes
        );
        count += 1;
    }
    println!("fat12[ls]: done entries={}", count);
    count
}
