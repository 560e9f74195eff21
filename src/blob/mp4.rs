//! Minimal ISO-BMFF walker, just enough to read the presentation duration
//! out of the `moov/mvhd` box.

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn read_u64(bytes: &[u8], at: usize) -> Option<u64> {
    bytes.get(at..at + 8).map(|b| {
        u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
    })
}

/// Iterates top-level boxes of `bytes`, returning the payload of the first
/// box named `name`.
fn find_box<'a>(bytes: &'a [u8], name: &[u8; 4]) -> Option<&'a [u8]> {
    let mut offset = 0usize;
    while offset + 8 <= bytes.len() {
        let declared_size = read_u32(bytes, offset)? as usize;
        let box_name = &bytes[offset + 4..offset + 8];
        // size 1 means a 64-bit largesize follows the name, size 0 means
        // the box extends to the end of the file.
        let (header_len, size) = match declared_size {
            0 => (8, bytes.len() - offset),
            1 => (16, read_u64(bytes, offset + 8)? as usize),
            s => (8, s),
        };
        if size < header_len || offset + size > bytes.len() {
            return None;
        }
        if box_name == name {
            return Some(&bytes[offset + header_len..offset + size]);
        }
        offset += size;
    }
    None
}

/// Returns the duration in seconds declared by the mvhd box, if present.
pub fn probe_duration(bytes: &[u8]) -> Option<f64> {
    let moov = find_box(bytes, b"moov")?;
    let mvhd = find_box(moov, b"mvhd")?;
    let version = *mvhd.first()?;
    let (timescale, duration) = match version {
        // version + flags, creation, modification, then timescale/duration
        0 => (read_u32(mvhd, 12)? as u64, read_u32(mvhd, 16)? as u64),
        1 => (read_u32(mvhd, 20)? as u64, read_u64(mvhd, 24)?),
        _ => return None,
    };
    if timescale == 0 {
        return None;
    }
    Some(duration as f64 / timescale as f64)
}

#[cfg(test)]
pub fn synthesize(timescale: u32, duration: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    // ftyp
    bytes.extend_from_slice(&16u32.to_be_bytes());
    bytes.extend_from_slice(b"ftypisom");
    bytes.extend_from_slice(&0u32.to_be_bytes());
    // moov > mvhd, version 0
    let mut mvhd = Vec::new();
    mvhd.extend_from_slice(&[0u8; 4]); // version + flags
    mvhd.extend_from_slice(&[0u8; 8]); // creation + modification
    mvhd.extend_from_slice(&timescale.to_be_bytes());
    mvhd.extend_from_slice(&duration.to_be_bytes());
    let mvhd_size = 8 + mvhd.len() as u32;
    let moov_size = 8 + mvhd_size;
    bytes.extend_from_slice(&moov_size.to_be_bytes());
    bytes.extend_from_slice(b"moov");
    bytes.extend_from_slice(&mvhd_size.to_be_bytes());
    bytes.extend_from_slice(b"mvhd");
    bytes.extend_from_slice(&mvhd);
    bytes
}
