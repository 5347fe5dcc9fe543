//! Big-endian reader over game data streams

/// Sequential big-endian reader over a byte slice
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn skip(&mut self, count: usize) -> Result<(), String> {
        self.read_bytes(count).map(|_| ())
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                format!(
                    "Unexpected end of data: wanted {} bytes at offset 0x{:x}, {} left",
                    count,
                    self.pos,
                    self.remaining()
                )
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, String> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, String> {
        let b = self.read_bytes(2)?;
        Ok(((b[0] as u16) << 8) | b[1] as u16)
    }

    pub fn read_i16(&mut self) -> Result<i16, String> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, String> {
        let b = self.read_bytes(4)?;
        Ok(((b[0] as u32) << 24) | ((b[1] as u32) << 16) | ((b[2] as u32) << 8) | b[3] as u32)
    }

    /// Read an item reference: 0xFFFFFFFF is "no item", others are offset by
    /// the two predefined item slots
    pub fn read_item_id(&mut self) -> Result<u16, String> {
        let raw = self.read_u32()?;
        if raw == 0xFFFF_FFFF {
            Ok(0)
        } else {
            Ok(raw.wrapping_add(2) as u16)
        }
    }

    /// Read a NUL-terminated ASCII string; the terminator is consumed
    pub fn read_cstr(&mut self) -> Result<String, String> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| format!("Unterminated string at offset 0x{:x}", self.pos))?;
        let text: String = rest[..len].iter().map(|&b| b as char).collect();
        self.pos += len + 1;
        Ok(text)
    }
}

/// Read a big-endian word from a byte slice, 0 past the end
pub fn read_be_u16(bytes: &[u8], offset: usize) -> u16 {
    match bytes.get(offset..offset + 2) {
        Some(b) => ((b[0] as u16) << 8) | b[1] as u16,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_big_endian_values() {
        let data = [0x12, 0x34, 0xDE, 0xAD, 0xBE, 0xEF, 0xFF];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(r.read_u8().unwrap(), 0xFF);
        assert!(r.is_eof());
        assert!(r.read_u8().is_err());
    }

    #[test]
    fn test_item_id_offsets() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x05];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_item_id().unwrap(), 0);
        assert_eq!(r.read_item_id().unwrap(), 7);
    }

    #[test]
    fn test_read_cstr() {
        let data = b"TABLES01\0rest";
        let mut r = ByteReader::new(data);
        assert_eq!(r.read_cstr().unwrap(), "TABLES01");
        assert_eq!(r.position(), 9);
        assert!(r.read_cstr().is_err());
    }

    #[test]
    fn test_read_be_u16_past_end() {
        assert_eq!(read_be_u16(&[0x01, 0x02], 0), 0x0102);
        assert_eq!(read_be_u16(&[0x01, 0x02], 1), 0);
    }
}
