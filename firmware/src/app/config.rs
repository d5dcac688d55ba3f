/// Start of the FAT12 partition in SPI flash, after the app image.
pub(crate) const FAT_PARTITION_OFFSET: u32 = 0x0031_0000;
/// Partition size; reads past this are rejected before touching flash.
pub(crate) const FAT_PARTITION_LEN: u32 = 0x0010_0000;
pub(crate) const PROBE_FILE_NAME: &str = "WSCLI.HTM";
pub(crate) const FILE_BUFFER_CAPACITY: usize = 51_200;
/// Bytes of the probe file echoed to the console after loading.
pub(crate) const PREVIEW_LEN: usize = 64;
