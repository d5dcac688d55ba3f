//! Host-side providers for disk image files.

use std::{
    fs::{self, File},
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};

use crate::source::{BlockSource, MemorySource};

/// Read a whole image file into an owned in-memory source.
pub fn load_image(path: impl AsRef<Path>) -> io::Result<MemorySource<Vec<u8>>> {
    fs::read(path).map(MemorySource::new)
}

/// Positioned reads straight from an image file, without loading it.
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_file(File::open(path)?)
    }

    pub fn from_file(file: File) -> io::Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl BlockSource for FileSource {
    type Error = io::Error;

    fn read(&mut self, offset: u64, out: &mut [u8]) -> io::Result<()> {
        let in_image = offset
            .checked_add(out.len() as u64)
            .is_some_and(|end| end <= self.len);
        if !in_image {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "read of {} bytes at {offset:#X} is past the image end ({} bytes)",
                    out.len(),
                    self.len
                ),
            ));
        }
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(out)
    }
}
