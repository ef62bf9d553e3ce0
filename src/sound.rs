use beep::beep;
use std::error::Error;

/// One frame of 44.1kHz audio at 60Hz is 735 samples; buffer four of them.
pub const SOUND_BUFFER_SAMPLES: usize = 735 * 4;

/// Synthesises the audio for one emulation step. Runs after the machine
/// step has completed, for skipped and rendered steps alike.
pub trait Sound {
    /// size the output buffer before the first step
    fn configure(&mut self, buffer_samples: usize) -> Result<(), Box<dyn Error>>;

    /// emit whatever the step just produced; `tone` is the pitch in Hz the
    /// machine is asking for, if any
    fn emulate(&mut self, tone: Option<u16>) -> Result<(), Box<dyn Error>>;

    fn stop(&mut self) -> Result<(), Box<dyn Error>>;

    fn name(&self) -> &'static str;
}

/// square-wave beeper on the PC speaker
pub struct SimpleBeep {
    pitch: u16,
    buffer_samples: usize,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep {
            pitch: 0,
            buffer_samples: 0,
        }
    }

    pub fn is_beeping(&self) -> bool {
        self.pitch != 0
    }

    pub fn buffer_samples(&self) -> usize {
        self.buffer_samples
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn configure(&mut self, buffer_samples: usize) -> Result<(), Box<dyn Error>> {
        // the speaker has no buffer of its own; remembered for diagnostics
        self.buffer_samples = buffer_samples;
        tracing::debug!(buffer_samples, "beeper configured");
        Ok(())
    }

    fn emulate(&mut self, tone: Option<u16>) -> Result<(), Box<dyn Error>> {
        let pitch = tone.unwrap_or(0);
        if pitch != self.pitch {
            beep(pitch)?;
            self.pitch = pitch;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        self.pitch = 0;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "beep"
    }
}

pub struct Mute {}

impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}

impl Default for Mute {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for Mute {
    fn configure(&mut self, _buffer_samples: usize) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn emulate(&mut self, _tone: Option<u16>) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dummy"
    }
}

/// The sound cores a build knows about; one is picked at startup.
pub enum SoundCore {
    Dummy(Mute),
    Beep(SimpleBeep),
}

impl SoundCore {
    /// the beeper when sound is wanted, otherwise silence
    pub fn select(sound_enabled: bool) -> Self {
        if sound_enabled {
            SoundCore::Beep(SimpleBeep::new())
        } else {
            SoundCore::Dummy(Mute::new())
        }
    }

    fn core(&mut self) -> &mut dyn Sound {
        match self {
            SoundCore::Dummy(m) => m,
            SoundCore::Beep(b) => b,
        }
    }
}

impl Sound for SoundCore {
    fn configure(&mut self, buffer_samples: usize) -> Result<(), Box<dyn Error>> {
        self.core().configure(buffer_samples)
    }

    fn emulate(&mut self, tone: Option<u16>) -> Result<(), Box<dyn Error>> {
        self.core().emulate(tone)
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.core().stop()
    }

    fn name(&self) -> &'static str {
        match self {
            SoundCore::Dummy(m) => m.name(),
            SoundCore::Beep(b) => b.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select() {
        assert_eq!(SoundCore::select(true).name(), "beep");
        assert_eq!(SoundCore::select(false).name(), "dummy");
    }

    #[test]
    fn test_buffer_is_four_frames() {
        assert_eq!(SOUND_BUFFER_SAMPLES, 2940);
    }

    #[test]
    fn test_beeper_configure_is_silent() -> Result<(), Box<dyn Error>> {
        let mut b = SimpleBeep::new();
        b.configure(SOUND_BUFFER_SAMPLES)?;
        assert_eq!(b.buffer_samples(), SOUND_BUFFER_SAMPLES);
        assert!(!b.is_beeping());
        Ok(())
    }

    #[test]
    fn test_mute_accepts_everything() -> Result<(), Box<dyn Error>> {
        let mut core = SoundCore::select(false);
        core.configure(SOUND_BUFFER_SAMPLES)?;
        core.emulate(Some(440))?;
        core.stop()
    }
}
