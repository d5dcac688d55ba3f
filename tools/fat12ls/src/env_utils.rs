use anyhow::{anyhow, Context, Result};

pub const MAX_FILE_BYTES_ENV: &str = "FAT12LS_MAX_FILE_BYTES";
pub const STREAM_ENV: &str = "FAT12LS_STREAM";

/// Capacity of the buffer `cat` reads into; matches the firmware's 50 KiB.
pub const DEFAULT_MAX_FILE_BYTES: u32 = 51_200;

pub fn parse_env_u32(name: &str, default: u32) -> Result<u32> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("{name} must be an unsigned integer")),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(anyhow!("{name} invalid: {err}")),
    }
}

pub fn parse_env_bool01(name: &str, default: bool) -> Result<bool> {
    match std::env::var(name) {
        Ok(raw) => match raw.as_str() {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(anyhow!("{name} must be 0 or 1")),
        },
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(anyhow!("{name} invalid: {err}")),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageConfig {
    pub max_file_bytes: u32,
    pub stream: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            stream: false,
        }
    }
}

impl ImageConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            max_file_bytes: parse_env_u32(MAX_FILE_BYTES_ENV, DEFAULT_MAX_FILE_BYTES)?,
            stream: parse_env_bool01(STREAM_ENV, false)?,
        })
    }
}
