//! The emulated machine, as seen from the run loop.
//!
//! The loop does not know what the machine is; it only needs to load a
//! program, advance one frame's worth of cycles, and read back the frame.

use crate::display::Resolution;
use crate::error::{LoadError, MachineError};
use crate::input::{Keypad, Touch};
use crate::memory::{ImageMemory, IMAGE_CAPACITY_BYTES};
use std::fs::File;
use std::path::Path;

pub trait Machine {
    /// reset to power-on defaults (firmware settings, rasterizer choice)
    fn init(&mut self);

    /// turn on the dynamic recompiler, capping each translated block
    fn enable_jit(&mut self, max_block_size: u32);

    fn load_program(&mut self, path: &Path) -> Result<(), LoadError>;

    /// controller state for the coming step
    fn set_keypad(&mut self, keys: Keypad);
    fn set_touch(&mut self, touch: Option<Touch>);

    /// the next `exec` runs the cycles but does not render the frame
    fn skip_next_frame(&mut self);

    /// advance by one video frame of emulated time
    fn exec(&mut self) -> Result<(), MachineError>;

    /// the most recently rendered frame
    fn framebuffer(&self) -> &[u8];

    /// tone requested during the last step, in Hz
    fn tone(&self) -> Option<u16>;
}

/// emulated cycles in one frame of a 33.5MHz handheld at ~60Hz
pub const CYCLES_PER_FRAME: u64 = 560_190;

/// demo screen: 64x32, one bit per pixel
pub const DEMO_RESOLUTION: Resolution = Resolution(64, 32, 1);

/// Bundled stand-in core: shows the loaded image as a bitmap, one row per
/// frame, so the front-end has something to drive. It does not execute code.
pub struct ImageViewer {
    memory: ImageMemory,
    framebuffer: Vec<u8>,
    row_bytes: usize,
    offset: usize,
    cycles: u64,
    skip_next: bool,
    keys: Keypad,
    touch: Option<Touch>,
    tone: Option<u16>,
    jit_block_size: Option<u32>,
    loaded: bool,
}

impl ImageViewer {
    pub fn new() -> Self {
        Self::with_capacity(IMAGE_CAPACITY_BYTES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ImageViewer {
            memory: ImageMemory::new(capacity),
            framebuffer: vec![0; DEMO_RESOLUTION.byte_count()],
            row_bytes: DEMO_RESOLUTION.0 * DEMO_RESOLUTION.2 / 8,
            offset: 0,
            cycles: 0,
            skip_next: false,
            keys: Keypad::empty(),
            touch: None,
            tone: None,
            jit_block_size: None,
            loaded: false,
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn jit_block_size(&self) -> Option<u32> {
        self.jit_block_size
    }

    /// copy the image in; the file may have changed size since it was checked
    fn load_from(&mut self, path: &Path, reader: &mut impl std::io::Read) -> Result<usize, LoadError> {
        self.loaded = false;
        let read = self.memory.load_image(reader).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if read == 0 {
            return Err(LoadError::Empty(path.to_path_buf()));
        }
        self.loaded = true;
        Ok(read)
    }
}

impl Default for ImageViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for ImageViewer {
    fn init(&mut self) {
        self.offset = 0;
        self.cycles = 0;
        self.skip_next = false;
        self.tone = None;
        self.jit_block_size = None;
        self.framebuffer.fill(0);
    }

    fn enable_jit(&mut self, max_block_size: u32) {
        self.jit_block_size = Some(max_block_size);
    }

    fn load_program(&mut self, path: &Path) -> Result<(), LoadError> {
        self.loaded = false;
        let read_err = |source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        };
        let mut f = File::open(path).map_err(read_err)?;
        let len = f.metadata().map_err(read_err)?.len() as usize;
        if len == 0 {
            return Err(LoadError::Empty(path.to_path_buf()));
        }
        if len > self.memory.capacity() {
            return Err(LoadError::TooLarge {
                path: path.to_path_buf(),
                len,
                max: self.memory.capacity(),
            });
        }
        let read = self.load_from(path, &mut f)?;
        tracing::info!(path = %path.display(), bytes = read, "program image loaded");
        Ok(())
    }

    fn set_keypad(&mut self, keys: Keypad) {
        self.keys = keys;
    }

    fn set_touch(&mut self, touch: Option<Touch>) {
        self.touch = touch;
    }

    fn skip_next_frame(&mut self) {
        self.skip_next = true;
    }

    fn exec(&mut self) -> Result<(), MachineError> {
        if !self.loaded {
            return Err(MachineError::NotLoaded);
        }
        let len = self.memory.loaded_len();
        // UP scrolls backwards; a touch jumps to that row of the view
        if let Some(t) = self.touch {
            self.offset = (self.offset + t.y as usize * self.row_bytes) % len;
        } else if self.keys.contains(Keypad::UP) {
            self.offset = (self.offset + len - self.row_bytes % len) % len;
        } else {
            self.offset = (self.offset + self.row_bytes) % len;
        }
        self.cycles += CYCLES_PER_FRAME;

        let mut lead = [0u8; 1];
        self.memory.read_wrapping(self.offset, &mut lead);
        self.tone = (lead[0] & 0x80 != 0).then(|| 220 + (lead[0] & 0x7f) as u16 * 8);

        if self.skip_next {
            self.skip_next = false;
        } else {
            self.memory.read_wrapping(self.offset, &mut self.framebuffer);
        }
        Ok(())
    }

    fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    fn tone(&self) -> Option<u16> {
        self.tone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn image(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f
    }

    #[test]
    fn test_exec_before_load_fails() {
        let mut m = ImageViewer::with_capacity(1024);
        assert!(matches!(m.exec(), Err(MachineError::NotLoaded)));
    }

    #[test]
    fn test_load_rejects_empty_and_oversized() {
        let mut m = ImageViewer::with_capacity(16);
        let empty = image(&[]);
        assert!(matches!(m.load_program(empty.path()), Err(LoadError::Empty(_))));
        let big = image(&[1; 17]);
        assert!(matches!(
            m.load_program(big.path()),
            Err(LoadError::TooLarge { len: 17, max: 16, .. })
        ));
        assert!(matches!(
            m.load_program(Path::new("/nonexistent/program.nds")),
            Err(LoadError::Read { .. })
        ));
    }

    #[test]
    fn test_image_that_reads_empty_is_not_loaded() -> Result<(), Box<dyn std::error::Error>> {
        let f = image(&[1, 2, 3]);
        let mut m = ImageViewer::with_capacity(64);
        m.load_program(f.path())?;
        // as if the file was truncated between the size check and the read
        let mut truncated: &[u8] = &[];
        let err = m.load_from(Path::new("shrunk.nds"), &mut truncated).unwrap_err();
        assert!(matches!(err, LoadError::Empty(_)));
        assert!(matches!(m.exec(), Err(MachineError::NotLoaded)));
        Ok(())
    }

    #[test]
    fn test_exec_scrolls_one_row() -> Result<(), Box<dyn std::error::Error>> {
        let bytes: Vec<u8> = (0..=255).collect();
        let f = image(&bytes);
        let mut m = ImageViewer::with_capacity(1024);
        m.init();
        m.load_program(f.path())?;
        m.exec()?;
        assert_eq!(m.framebuffer()[0], 8);
        assert_eq!(m.cycles(), CYCLES_PER_FRAME);
        Ok(())
    }

    #[test]
    fn test_skipped_frame_keeps_old_picture() -> Result<(), Box<dyn std::error::Error>> {
        let bytes: Vec<u8> = (0..=255).collect();
        let f = image(&bytes);
        let mut m = ImageViewer::with_capacity(1024);
        m.load_program(f.path())?;
        m.exec()?;
        let before = m.framebuffer().to_vec();
        m.skip_next_frame();
        m.exec()?;
        assert_eq!(m.framebuffer(), &before[..]);
        assert_eq!(m.cycles(), 2 * CYCLES_PER_FRAME);
        m.exec()?;
        assert_eq!(m.framebuffer()[0], 24);
        Ok(())
    }

    #[test]
    fn test_tone_follows_high_bit() -> Result<(), Box<dyn std::error::Error>> {
        let mut bytes = vec![0u8; 16];
        bytes[8] = 0x81;
        let f = image(&bytes);
        let mut m = ImageViewer::with_capacity(64);
        m.load_program(f.path())?;
        m.exec()?;
        assert_eq!(m.tone(), Some(228));
        m.exec()?;
        assert_eq!(m.tone(), None);
        Ok(())
    }

    #[test]
    fn test_jit_setting_recorded() {
        let mut m = ImageViewer::with_capacity(16);
        m.enable_jit(60);
        assert_eq!(m.jit_block_size(), Some(60));
        m.init();
        assert_eq!(m.jit_block_size(), None);
    }
}
