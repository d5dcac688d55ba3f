pub(crate) mod config;
mod listing;

use esp_println::println;
use esp_storage::FlashStorage;
use flashfat::{FatError, FlashSource, Volume};
use static_cell::ConstStaticCell;

use self::config::{
    FAT_PARTITION_LEN, FAT_PARTITION_OFFSET, FILE_BUFFER_CAPACITY, PREVIEW_LEN, PROBE_FILE_NAME,
};

static FILE_BUFFER: ConstStaticCell<[u8; FILE_BUFFER_CAPACITY]> =
    ConstStaticCell::new([0; FILE_BUFFER_CAPACITY]);

pub(crate) fn run() -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let flash = FlashStorage::new(peripherals.FLASH).multicore_auto_park();
    let source = FlashSource::new(flash, FAT_PARTITION_OFFSET, FAT_PARTITION_LEN);
    println!(
        "fat12[boot]: partition base={:#010x} len={}",
        source.base(),
        source.len()
    );

    let mut volume = match Volume::mount(source) {
        Ok(volume) => volume,
        Err(err) => {
            println!("fat12[boot]: mount_err err={}", err);
            halt_forever();
        }
    };
    listing::log_geometry(volume.geometry());
    listing::log_label(&mut volume);
    listing::log_entries(&mut volume);

    let buffer = FILE_BUFFER.take();
    load_probe_file(&mut volume, buffer);

    halt_forever()
}

fn load_probe_file<S>(volume: &mut Volume<S>, buffer: &mut [u8])
where
    S: flashfat::BlockSource,
    S::Error: core::fmt::Display,
{
    match volume.file_size(PROBE_FILE_NAME) {
        Ok(size) => println!(
            "fat12[probe]: size name={} bytes={}",
            PROBE_FILE_NAME,
            size
        ),
        Err(FatError::NotFound) => {
            println!("fat12[probe]: not_found name={}", PROBE_FILE_NAME);
            return;
        }
        Err(err) => {
            println!(
                "fat12[probe]: size_err name={} err={}",
                PROBE_FILE_NAME,
                err
            );
            return;
        }
    }

    let loaded = match volume.read_file(PROBE_FILE_NAME, buffer) {
        Ok(len) => len,
        Err(err) => {
            println!(
                "fat12[probe]: read_err name={} err={}",
                PROBE_FILE_NAME,
                err
            );
            match err.copied() {
                Some(copied) => copied,
                None => return,
            }
        }
    };
    println!(
        "fat12[probe]: loaded name={} bytes={} capacity={}",
        PROBE_FILE_NAME,
        loaded,
        buffer.len()
    );

    let preview = &buffer[..loaded.min(PREVIEW_LEN)];
    match core::str::from_utf8(preview) {
        Ok(text) => println!("fat12[probe]: preview={:?}", text),
        Err(_) => println!("fat12[probe]: preview={:02X?}", preview),
    }
}

fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
