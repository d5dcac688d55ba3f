//! Fixed-width little-endian decoding over a byte window.
//!
//! Callers guarantee the window covers `offset..offset + width`; an
//! out-of-window offset panics like any slice index.

pub fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

pub fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}
