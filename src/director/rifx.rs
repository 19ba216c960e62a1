use log::debug;

use crate::io::reader::{ByteOrder, Cursor};

use super::{
    chunks::score::ScoreLayout,
    error::ParseError,
    utils::{fourcc_to_string, FOURCC},
};

/// magic(4) size(4) format(4)
pub const RIFX_HEADER_SIZE: usize = 12;

pub const FORMAT_LEGACY: u32 = FOURCC("MV93");
pub const FORMAT_EXTENDED: u32 = FOURCC("MV97");

/// Outer envelope of a movie file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RifxHeader {
    pub byte_order: ByteOrder,
    /// Bytes after the size field, format tag included.
    pub declared_size: u32,
    pub format: u32,
    pub layout: ScoreLayout,
}

impl RifxHeader {
    pub fn byte_order_for_magic(magic: [u8; 4]) -> Option<ByteOrder> {
        match &magic {
            b"RIFX" => Some(ByteOrder::BigEndian),
            b"XFIR" => Some(ByteOrder::LittleEndian),
            _ => None,
        }
    }

    pub fn layout_for_format(format: u32) -> Option<ScoreLayout> {
        match format {
            FORMAT_LEGACY => Some(ScoreLayout::Legacy),
            FORMAT_EXTENDED => Some(ScoreLayout::Extended),
            _ => None,
        }
    }

    pub fn read(buffer: &[u8]) -> Result<RifxHeader, ParseError> {
        if buffer.len() < 4 {
            return Err(ParseError::Truncated {
                offset: 0,
                needed: 4,
                available: buffer.len(),
            });
        }
        let magic = [buffer[0], buffer[1], buffer[2], buffer[3]];
        let byte_order = Self::byte_order_for_magic(magic)
            .ok_or(ParseError::UnrecognizedFormat { magic })?;

        let mut cursor = Cursor::new(buffer, byte_order);
        cursor.seek(4)?;
        let declared_size = cursor.read_u32()?;

        // Trailing bytes past the envelope are ignored
        let available = buffer.len() - 8;
        if declared_size as usize > available {
            return Err(ParseError::Truncated {
                offset: 8,
                needed: declared_size as usize,
                available,
            });
        }
        if (declared_size as usize) < 4 {
            return Err(ParseError::Truncated {
                offset: 8,
                needed: 4,
                available: declared_size as usize,
            });
        }

        let format = cursor.read_fourcc()?;
        let layout =
            Self::layout_for_format(format).ok_or(ParseError::UnsupportedVersion { tag: format })?;

        debug!(
            "RIFX header: {:?}, size {}, format {} ({:?})",
            byte_order,
            declared_size,
            fourcc_to_string(format),
            layout
        );

        Ok(RifxHeader {
            byte_order,
            declared_size,
            format,
            layout,
        })
    }

    /// End of the envelope, exclusive.
    pub fn end_offset(&self) -> usize {
        8 + self.declared_size as usize
    }

    /// Byte range holding the top-level chunks.
    pub fn body_range(&self) -> std::ops::Range<usize> {
        RIFX_HEADER_SIZE..self.end_offset()
    }
}
