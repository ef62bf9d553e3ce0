use std::io;
use std::io::Read;

// NB. addresses are usize here; the image is far bigger than any 16-bit map

/// Represents a flat, byte-addressed memory that a program image is copied into
pub trait MemoryMap {
    /// write unknown len of data into memory at a particular address,
    /// returning how many bytes were written
    fn write_any(&mut self, reader: &mut impl io::Read, addr: usize) -> Result<usize, io::Error> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        self.write(buf.as_slice(), addr)?;
        Ok(len)
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: usize) -> Result<(), io::Error> {
        let bytes = self.get_rw_slice(addr, data.len()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "write past end of memory")
        })?;
        let mut d: &[u8] = data;
        d.read_exact(bytes)
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: usize, len: usize) -> Option<&mut [u8]>;
}

/// Holds one loaded program image. Reads past the loaded length see zeros.
pub struct ImageMemory {
    bytes: Box<[u8]>,
    loaded_len: usize,
}

impl MemoryMap for ImageMemory {
    fn get_rw_slice(&mut self, addr: usize, len: usize) -> Option<&mut [u8]> {
        self.bytes.get_mut(addr..addr.checked_add(len)?)
    }
}

/// how much image we are prepared to hold (a DS cartridge tops out at 512MiB;
/// the demo core does not need anything like that)
pub const IMAGE_CAPACITY_BYTES: usize = 16 * 1024 * 1024;

impl ImageMemory {
    pub fn new(capacity: usize) -> Self {
        ImageMemory {
            bytes: vec![0u8; capacity].into_boxed_slice(),
            loaded_len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// bytes occupied by the current image
    pub fn loaded_len(&self) -> usize {
        self.loaded_len
    }

    /// load an image at address 0, replacing whatever was there
    pub fn load_image(&mut self, reader: &mut impl io::Read) -> Result<usize, io::Error> {
        self.bytes.fill(0);
        self.loaded_len = 0;
        let len = self.write_any(reader, 0)?;
        self.loaded_len = len;
        Ok(len)
    }

    /// copy `out.len()` bytes starting at `addr`, wrapping around the loaded image
    pub fn read_wrapping(&self, addr: usize, out: &mut [u8]) {
        if self.loaded_len == 0 {
            out.fill(0);
            return;
        }
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.bytes[(addr + i) % self.loaded_len];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = ImageMemory::new(64);
        assert_eq!(m.bytes[..], [0u8; 64]);
        assert_eq!(m.loaded_len(), 0);
    }

    #[test]
    fn test_write_any_data_ok() -> Result<(), io::Error> {
        let mut dst = ImageMemory::new(64);
        let mut src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(dst.write_any(&mut src, 8)?, 8);
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_write_past_end_is_an_error() {
        let mut dst = ImageMemory::new(16);
        let mut src: &[u8] = &[0; 8];
        let err = dst.write_any(&mut src, 12).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_slice_out_of_range() {
        let mut m = ImageMemory::new(16);
        assert!(m.get_rw_slice(12, 8).is_none());
        assert!(m.get_rw_slice(usize::MAX, 2).is_none());
    }

    #[test]
    fn test_load_replaces_previous_image() -> Result<(), io::Error> {
        let mut m = ImageMemory::new(16);
        let mut first: &[u8] = &[9; 12];
        m.load_image(&mut first)?;
        let mut second: &[u8] = &[1, 2];
        assert_eq!(m.load_image(&mut second)?, 2);
        assert_eq!(m.loaded_len(), 2);
        assert_eq!(m.bytes[..4], [1, 2, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_read_wrapping() -> Result<(), io::Error> {
        let mut m = ImageMemory::new(16);
        let mut prog: &[u8] = &[1, 2, 3];
        m.load_image(&mut prog)?;
        let mut out = [0u8; 5];
        m.read_wrapping(2, &mut out);
        assert_eq!(out, [3, 1, 2, 3, 1]);
        Ok(())
    }
}
