//! Block source over a flash partition reachable through
//! `embedded_storage::ReadStorage` (SPI NOR, on-chip flash).

use core::fmt;

use embedded_storage::ReadStorage;

use crate::source::BlockSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashError<E> {
    OutOfRange {
        offset: u64,
        len: usize,
    },
    Storage(E),
}

impl<E: fmt::Debug> fmt::Display for FlashError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { offset, len } => {
                write!(f, "read of {len} bytes at {offset:#X} is outside the partition")
            }
            Self::Storage(err) => write!(f, "flash read failed: {err:?}"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for FlashError<E> {}

/// A FAT12 partition occupying `len` bytes at `base` inside a flash device.
pub struct FlashSource<S> {
    storage: S,
    base: u32,
    len: u32,
}

impl<S: ReadStorage> FlashSource<S> {
    /// `len` is clipped to what the device holds past `base`.
    pub fn new(storage: S, base: u32, len: u32) -> Self {
        let capacity = u32::try_from(storage.capacity()).unwrap_or(u32::MAX);
        let len = len.min(capacity.saturating_sub(base));
        Self { storage, base, len }
    }

    /// The whole device is the volume.
    pub fn whole(storage: S) -> Self {
        Self::new(storage, 0, u32::MAX)
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S: ReadStorage> BlockSource for FlashSource<S> {
    type Error = FlashError<S::Error>;

    fn read(&mut self, offset: u64, out: &mut [u8]) -> Result<(), Self::Error> {
        let out_of_range = FlashError::OutOfRange {
            offset,
            len: out.len(),
        };
        let in_partition = offset
            .checked_add(out.len() as u64)
            .is_some_and(|end| end <= self.len as u64);
        if !in_partition {
            return Err(out_of_range);
        }
        // offset < len <= u32::MAX and base + len <= capacity.
        let address = self.base + offset as u32;
        self.storage.read(address, out).map_err(FlashError::Storage)
    }
}
