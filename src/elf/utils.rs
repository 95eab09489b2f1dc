use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

/// ELF64 little-endian is the only encoding the loader accepts (§6), so
/// these helpers skip the endianness dispatch the general ELF format
/// allows for and always read little-endian.
pub fn read_u16<R: Read>(io: &mut R) -> io::Result<u16> {
    io.read_u16::<LittleEndian>()
}

pub fn read_u32<R: Read>(io: &mut R) -> io::Result<u32> {
    io.read_u32::<LittleEndian>()
}

pub fn read_u64<R: Read>(io: &mut R) -> io::Result<u64> {
    io.read_u64::<LittleEndian>()
}

/// Reads a NUL-terminated string out of a string-table section's raw
/// bytes, starting at byte offset `start`. Returns an empty string if
/// `start` is out of bounds rather than panicking, since corrupt section
/// links should surface as a parse error upstream, not a crash here.
pub fn get_string(data: &[u8], start: usize) -> String {
    if start >= data.len() {
        return String::new();
    }
    let end = data[start..]
        .iter()
        .position(|&b| b == 0)
        .map(|rel| start + rel)
        .unwrap_or(data.len());
    String::from_utf8_lossy(&data[start..end]).into_owned()
}
