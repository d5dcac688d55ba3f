use core::fmt;

/// Read-only byte-addressable medium holding a FAT12 volume.
///
/// `read` fills `out` completely from `offset` or fails; a short read is an
/// error. Offsets are relative to the start of the volume.
pub trait BlockSource {
    type Error;

    fn read(&mut self, offset: u64, out: &mut [u8]) -> Result<(), Self::Error>;
}

impl<S: BlockSource + ?Sized> BlockSource for &mut S {
    type Error = S::Error;

    fn read(&mut self, offset: u64, out: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(offset, out)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryError {
    OutOfRange {
        offset: u64,
        len: usize,
    },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { offset, len } => {
                write!(f, "read of {len} bytes at {offset:#X} is past the image end")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MemoryError {}

/// Whole volume image held in memory and owned by this handle.
pub struct MemorySource<B> {
    image: B,
}

impl<B: AsRef<[u8]>> MemorySource<B> {
    pub fn new(image: B) -> Self {
        Self { image }
    }

    pub fn len(&self) -> usize {
        self.image.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_ref()
    }

    pub fn into_inner(self) -> B {
        self.image
    }
}

impl<B: AsRef<[u8]>> BlockSource for MemorySource<B> {
    type Error = MemoryError;

    fn read(&mut self, offset: u64, out: &mut [u8]) -> Result<(), MemoryError> {
        let image = self.image.as_ref();
        let out_of_range = MemoryError::OutOfRange {
            offset,
            len: out.len(),
        };
        let start = usize::try_from(offset).map_err(|_| out_of_range)?;
        let end = start.checked_add(out.len()).ok_or(out_of_range)?;
        if end > image.len() {
            return Err(out_of_range);
        }
        out.copy_from_slice(&image[start..end]);
        Ok(())
    }
}
