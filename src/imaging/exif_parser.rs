//! Minimal EXIF orientation reader for JPEG and TIFF files.
//!
//! Extracts one field: Orientation (tag 0x0112, IFD0).
//!
//! For JPEG: reads the TIFF structure inside the APP1 `Exif\0\0` segment.
//! For TIFF: reads IFD0 of the file itself.
//!
//! The container is sniffed from the leading bytes, not the extension, since
//! picker results frequently come back without one.

use std::path::Path;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const ORIENTATION_TAG: u16 = 0x0112;
const TYPE_SHORT: u16 = 3;

/// Read the orientation tag from a file.
///
/// `Ok(None)` means the file carries no orientation (or is a container we
/// don't read metadata from). `Err` only for I/O failures.
pub fn read_orientation(path: &Path) -> std::io::Result<Option<u16>> {
    let bytes = std::fs::read(path)?;
    Ok(orientation_from_bytes(&bytes))
}

/// Dispatch on the container magic and pull out the orientation tag.
pub fn orientation_from_bytes(data: &[u8]) -> Option<u16> {
    if data.starts_with(&[0xFF, 0xD8]) {
        let tiff = find_jpeg_app1_exif(data)?;
        return orientation_from_tiff(tiff);
    }
    if data.starts_with(b"II") || data.starts_with(b"MM") {
        return orientation_from_tiff(data);
    }
    None
}

// ---------------------------------------------------------------------------
// JPEG: locate the EXIF TIFF block inside APP1
// ---------------------------------------------------------------------------

/// Find the TIFF bytes that follow `Exif\0\0` in a JPEG's APP1 segment.
fn find_jpeg_app1_exif(data: &[u8]) -> Option<&[u8]> {
    // Skip SOI
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];

        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS (0xDA) means entropy-coded data starts, EOI ends the file
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // Markers without length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            break;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());

        if marker == 0xE1 {
            let segment = &data[seg_start..seg_end];
            if let Some(tiff) = segment.strip_prefix(EXIF_HEADER) {
                return Some(tiff);
            }
        }

        pos += 2 + seg_len;
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF: read IFD0
// ---------------------------------------------------------------------------

/// Read the orientation entry from IFD0 of a TIFF structure.
fn orientation_from_tiff(data: &[u8]) -> Option<u16> {
    if data.len() < 8 {
        return None;
    }

    // Determine byte order
    let big_endian = match &data[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => return None,
    };

    let read_u16 = |offset: usize| -> Option<u16> {
        let bytes = [*data.get(offset)?, *data.get(offset + 1)?];
        Some(if big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    };

    let read_u32 = |offset: usize| -> Option<u32> {
        let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
        Some(if big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    };

    // Verify TIFF magic (42)
    if read_u16(2)? != 42 {
        return None;
    }

    let ifd_offset = read_u32(4)? as usize;
    let entry_count = read_u16(ifd_offset)? as usize;
    let entries_start = ifd_offset + 2;

    for i in 0..entry_count {
        let entry_offset = entries_start + i * 12;
        let tag = read_u16(entry_offset)?;
        if tag != ORIENTATION_TAG {
            continue;
        }
        let typ = read_u16(entry_offset + 2)?;
        let count = read_u32(entry_offset + 4)?;
        if typ != TYPE_SHORT || count == 0 {
            return None;
        }
        // A single SHORT sits left-justified in the value field
        return read_u16(entry_offset + 8);
    }

    None
}
