use binary_reader::{BinaryReader, Endian};
use thiserror::Error;

/// Byte order of every multi-byte field in a container.
/// `RIFX` files are big endian, `XFIR` files little endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    fn endian(self) -> Endian {
        match self {
            ByteOrder::BigEndian => Endian::Big,
            ByteOrder::LittleEndian => Endian::Little,
        }
    }
}

/// How the bytes of a fixed-width string field are turned into text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEncoding {
    /// One byte per char, no validation. Labels and names in older movies.
    Latin1,
    /// Invalid sequences are replaced with U+FFFD.
    Utf8,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("read of {needed} bytes at offset {offset} exceeds buffer ({available} bytes left)")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("seek target {target} outside buffer of length {length}")]
    OutOfBounds { target: i64, length: usize },
}

/// Helpers layered on top of `BinaryReader` for the container formats.
pub trait DirectorExt {
    fn bytes_left(&self) -> usize;
    fn at_end(&self) -> bool;
    fn read_fixed_str(&mut self, len: usize, encoding: TextEncoding) -> std::io::Result<String>;
}

impl DirectorExt for BinaryReader {
    fn bytes_left(&self) -> usize {
        self.length.saturating_sub(self.pos)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.length
    }

    fn read_fixed_str(&mut self, len: usize, encoding: TextEncoding) -> std::io::Result<String> {
        let bytes = self.read_bytes(len)?;
        // Fixed fields are NUL padded
        let text = match bytes.iter().position(|&b| b == 0) {
            Some(end) => &bytes[..end],
            None => bytes,
        };
        Ok(decode_text(text, encoding))
    }
}

pub fn decode_text(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Sequential reader with a byte order fixed at construction.
///
/// Every read is bounds-checked up front, so a failed read leaves the
/// position untouched and never yields partial data.
pub struct Cursor {
    reader: BinaryReader,
    byte_order: ByteOrder,
}

impl Cursor {
    pub fn new(data: &[u8], byte_order: ByteOrder) -> Cursor {
        let mut reader = BinaryReader::from_u8(data);
        reader.set_endian(byte_order.endian());
        Cursor { reader, byte_order }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn position(&self) -> usize {
        self.reader.pos
    }

    pub fn len(&self) -> usize {
        self.reader.length
    }

    pub fn is_empty(&self) -> bool {
        self.reader.length == 0
    }

    pub fn remaining(&self) -> usize {
        self.reader.bytes_left()
    }

    pub fn is_eof(&self) -> bool {
        self.reader.at_end()
    }

    /// Checks that `needed` bytes are left and returns the current offset.
    fn require(&self, needed: usize) -> Result<usize, CursorError> {
        let available = self.remaining();
        if needed > available {
            return Err(CursorError::Truncated {
                offset: self.position(),
                needed,
                available,
            });
        }
        Ok(self.position())
    }

    fn read_error(offset: usize, needed: usize) -> CursorError {
        CursorError::Truncated {
            offset,
            needed,
            available: 0,
        }
    }

    pub fn seek(&mut self, offset: usize) -> Result<(), CursorError> {
        if offset > self.len() {
            return Err(CursorError::OutOfBounds {
                target: offset as i64,
                length: self.len(),
            });
        }
        self.reader.jmp(offset);
        Ok(())
    }

    pub fn skip(&mut self, delta: i64) -> Result<(), CursorError> {
        let target = self.position() as i64 + delta;
        if target < 0 || target > self.len() as i64 {
            return Err(CursorError::OutOfBounds {
                target,
                length: self.len(),
            });
        }
        self.reader.jmp(target as usize);
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        let offset = self.require(1)?;
        self.reader.read_u8().map_err(|_| Self::read_error(offset, 1))
    }

    pub fn read_i8(&mut self) -> Result<i8, CursorError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, CursorError> {
        let offset = self.require(2)?;
        self.reader.read_u16().map_err(|_| Self::read_error(offset, 2))
    }

    pub fn read_i16(&mut self) -> Result<i16, CursorError> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, CursorError> {
        let offset = self.require(4)?;
        self.reader.read_u32().map_err(|_| Self::read_error(offset, 4))
    }

    pub fn read_i32(&mut self) -> Result<i32, CursorError> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_f32(&mut self) -> Result<f32, CursorError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, CursorError> {
        self.require(8)?;
        let first = self.read_u32()? as u64;
        let second = self.read_u32()? as u64;
        let bits = match self.byte_order {
            ByteOrder::BigEndian => (first << 32) | second,
            ByteOrder::LittleEndian => (second << 32) | first,
        };
        Ok(f64::from_bits(bits))
    }

    /// Reads a chunk tag. Tags go through the cursor byte order, so a
    /// reversed tag in an `XFIR` file yields the same value as in `RIFX`.
    pub fn read_fourcc(&mut self) -> Result<u32, CursorError> {
        self.read_u32()
    }

    pub fn read_fixed_bytes(&mut self, len: usize) -> Result<Vec<u8>, CursorError> {
        let offset = self.require(len)?;
        self.reader
            .read_bytes(len)
            .map(|bytes| bytes.to_vec())
            .map_err(|_| Self::read_error(offset, len))
    }

    pub fn read_fixed_string(
        &mut self,
        len: usize,
        encoding: TextEncoding,
    ) -> Result<String, CursorError> {
        let offset = self.require(len)?;
        self.reader
            .read_fixed_str(len, encoding)
            .map_err(|_| Self::read_error(offset, len))
    }

    /// New cursor over `[offset, offset + len)` with the same byte order.
    /// The position of `self` is left unchanged.
    pub fn sub_cursor(&mut self, offset: usize, len: usize) -> Result<Cursor, CursorError> {
        let saved = self.position();
        self.seek(offset)?;
        let bytes = self.read_fixed_bytes(len);
        self.reader.jmp(saved);
        Ok(Cursor::new(&bytes?, self.byte_order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_reads() {
        let data = [0x12, 0x34, 0xFF, 0xFE, 0x00, 0x00, 0x00, 0x2A];
        let mut cursor = Cursor::new(&data, ByteOrder::BigEndian);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.read_i16().unwrap(), -2);
        assert_eq!(cursor.read_u32().unwrap(), 42);
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_little_endian_reads() {
        let data = [0x34, 0x12, 0x2A, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(&data, ByteOrder::LittleEndian);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.read_i32().unwrap(), 42);
    }

    #[test]
    fn test_no_sign_extension_past_width() {
        let data = [0xFF, 0xFF];
        let mut cursor = Cursor::new(&data, ByteOrder::BigEndian);
        assert_eq!(cursor.read_i8().unwrap(), -1);
        assert_eq!(cursor.read_u8().unwrap(), 0xFF);
    }

    #[test]
    fn test_floats() {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f32.to_be_bytes());
        data.extend_from_slice(&(-0.25f64).to_be_bytes());
        let mut cursor = Cursor::new(&data, ByteOrder::BigEndian);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
        assert_eq!(cursor.read_f64().unwrap(), -0.25);

        let data = 3.0f32.to_le_bytes();
        let mut cursor = Cursor::new(&data, ByteOrder::LittleEndian);
        assert_eq!(cursor.read_f32().unwrap(), 3.0);
    }

    #[test]
    fn test_truncated_read_keeps_position() {
        let data = [0x01, 0x02, 0x03];
        let mut cursor = Cursor::new(&data, ByteOrder::BigEndian);
        cursor.read_u8().unwrap();
        assert_eq!(
            cursor.read_u32(),
            Err(CursorError::Truncated {
                offset: 1,
                needed: 4,
                available: 2
            })
        );
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_u16().unwrap(), 0x0203);
    }

    #[test]
    fn test_seek_and_skip_bounds() {
        let data = [0u8; 4];
        let mut cursor = Cursor::new(&data, ByteOrder::BigEndian);
        assert!(cursor.seek(4).is_ok());
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(
            cursor.seek(5),
            Err(CursorError::OutOfBounds {
                target: 5,
                length: 4
            })
        );
        cursor.seek(1).unwrap();
        assert_eq!(
            cursor.skip(-2),
            Err(CursorError::OutOfBounds {
                target: -1,
                length: 4
            })
        );
        cursor.skip(3).unwrap();
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_fixed_string() {
        let data = b"Intro\0\0\0caf\xe9";
        let mut cursor = Cursor::new(data, ByteOrder::BigEndian);
        assert_eq!(
            cursor.read_fixed_string(8, TextEncoding::Latin1).unwrap(),
            "Intro"
        );
        assert_eq!(cursor.position(), 8);
        assert_eq!(
            cursor.read_fixed_string(4, TextEncoding::Latin1).unwrap(),
            "café"
        );
    }

    #[test]
    fn test_sub_cursor() {
        let data = [0xAA, 0x00, 0x07, 0xBB];
        let mut cursor = Cursor::new(&data, ByteOrder::LittleEndian);
        let mut sub = cursor.sub_cursor(1, 2).unwrap();
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.read_u16().unwrap(), 0x0700);
        assert!(cursor.sub_cursor(3, 2).is_err());
        assert_eq!(cursor.position(), 0);
    }
}
