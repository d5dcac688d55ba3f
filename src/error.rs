use core::fmt;

/// Reason a boot sector cannot describe a usable volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryFault {
    /// The boot sector window held fewer than `BPB_SIZE` bytes.
    ShortBootSector(usize),
    ZeroBytesPerSector,
    ZeroSectorsPerCluster,
}

impl fmt::Display for GeometryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortBootSector(len) => write!(f, "boot sector window is {len} bytes"),
            Self::ZeroBytesPerSector => write!(f, "bytes_per_sector is zero"),
            Self::ZeroSectorsPerCluster => write!(f, "sectors_per_cluster is zero"),
        }
    }
}

/// Every condition a volume query reports. `E` is the block source error.
///
/// `NotFound` is an ordinary negative answer, distinct from a file whose
/// declared size is zero.
#[derive(Debug, PartialEq, Eq)]
pub enum FatError<E> {
    Io(E),
    MalformedGeometry(GeometryFault),
    NotFound,
    BufferTooSmall {
        needed: usize,
        capacity: usize,
    },
    /// The chain ended before `declared` bytes; the first `copied` bytes of
    /// the output buffer are valid.
    TruncatedChain {
        copied: usize,
        declared: usize,
    },
    /// The walk exceeded the volume's cluster bound; the first `copied`
    /// bytes of the output buffer are valid.
    ChainCycleSuspected {
        copied: usize,
    },
    /// A start cluster or FAT link outside the data region.
    BadCluster(u16),
}

impl<E> FatError<E> {
    /// Bytes already placed in the caller's buffer when a walk was cut short.
    pub fn copied(&self) -> Option<usize> {
        match self {
            Self::TruncatedChain { copied, .. } | Self::ChainCycleSuspected { copied } => {
                Some(*copied)
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl<E> From<GeometryFault> for FatError<E> {
    fn from(value: GeometryFault) -> Self {
        Self::MalformedGeometry(value)
    }
}

impl<E: fmt::Display> fmt::Display for FatError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "block source read failed: {err}"),
            Self::MalformedGeometry(fault) => write!(f, "malformed geometry: {fault}"),
            Self::NotFound => write!(f, "no such file in root directory"),
            Self::BufferTooSmall { needed, capacity } => {
                write!(f, "buffer too small: need {needed} bytes, have {capacity}")
            }
            Self::TruncatedChain { copied, declared } => write!(
                f,
                "cluster chain ended after {copied} of {declared} declared bytes"
            ),
            Self::ChainCycleSuspected { copied } => {
                write!(f, "cluster chain exceeds volume bound after {copied} bytes")
            }
            Self::BadCluster(cluster) => {
                write!(f, "cluster {cluster:#05X} is outside the data region")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GeometryFault {}

#[cfg(feature = "std")]
impl<E> std::error::Error for FatError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}
