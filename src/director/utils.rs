use itertools::Itertools;

#[allow(non_snake_case)]
pub const fn FOURCC(tag: &str) -> u32 {
    let bytes = tag.as_bytes();
    ((bytes[0] as u32) << 24) | ((bytes[1] as u32) << 16) | ((bytes[2] as u32) << 8) | (bytes[3] as u32)
}

pub fn fourcc_to_string(fourcc: u32) -> String {
    fourcc
        .to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}

/// Hex preview of the first `limit` bytes, for diagnostics.
pub fn hex_preview(data: &[u8], limit: usize) -> String {
    data.iter().take(limit).map(|b| format!("{:02x}", b)).join(" ")
}
