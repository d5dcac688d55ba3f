use core::fmt::{self, Write};

use heapless::Vec;

/// `NAME` + `.` + `EXT` at most.
pub const SHORT_NAME_MAX: usize = 12;

/// Drop trailing space padding from a fixed-width name field.
pub fn trim_field(field: &[u8]) -> &[u8] {
    let end = field
        .iter()
        .rposition(|&byte| byte != b' ')
        .map_or(0, |idx| idx + 1);
    &field[..end]
}

/// An 8.3 name in `NAME.EXT` form, extension and dot omitted when empty.
///
/// Comparison is byte-exact and therefore case-sensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShortName {
    bytes: Vec<u8, SHORT_NAME_MAX>,
}

impl ShortName {
    pub fn from_fields(name: &[u8; 8], extension: &[u8; 3]) -> Self {
        let mut bytes = Vec::new();
        let base = trim_field(name);
        let ext = trim_field(extension);
        // 8 + 1 + 3 always fits.
        let _ = bytes.extend_from_slice(base);
        if !ext.is_empty() {
            let _ = bytes.push(b'.');
            let _ = bytes.extend_from_slice(ext);
        }
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `None` when the directory held non-UTF-8 (code page) bytes.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    pub fn matches(&self, target: &str) -> bool {
        self.as_bytes() == target.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq<str> for ShortName {
    fn eq(&self, other: &str) -> bool {
        self.matches(other)
    }
}

impl PartialEq<&str> for ShortName {
    fn eq(&self, other: &&str) -> bool {
        self.matches(other)
    }
}

impl fmt::Display for ShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bytes above 0x7F are code page characters; show them as Latin-1.
        for &byte in self.bytes.iter() {
            f.write_char(char::from(byte))?;
        }
        Ok(())
    }
}
