#![cfg_attr(not(feature = "std"), no_std)]

pub mod codec;
pub mod error;
pub mod fat;
pub mod flash;
#[cfg(feature = "std")]
pub mod image;
pub mod source;

pub use error::{FatError, GeometryFault};
pub use fat::{
    BiosParameterBlock, Clusters, DirEntry, Geometry, RootEntries, ShortName, SlotKind, Volume,
};
pub use flash::{FlashError, FlashSource};
#[cfg(feature = "std")]
pub use image::{load_image, FileSource};
pub use source::{BlockSource, MemoryError, MemorySource};

/// Bytes read from offset 0 to decode the boot sector.
pub const BPB_SIZE: usize = 512;
pub const DIR_ENTRY_SIZE: usize = 32;
