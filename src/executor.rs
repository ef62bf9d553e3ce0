use crate::error::MachineError;
use crate::input::Input;
use crate::machine::Machine;
use crate::sound::Sound;

/// Runs single emulation steps: refresh input, advance the machine, then
/// (optionally) synthesise that step's audio. Holds no state of its own.
pub struct StepExecutor<'a> {
    machine: &'a mut dyn Machine,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
}

impl<'a> StepExecutor<'a> {
    pub fn new(
        machine: &'a mut dyn Machine,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Self {
        StepExecutor {
            machine,
            input,
            sound,
        }
    }

    /// one frame of emulated time; a machine fault ends the run
    pub fn advance(&mut self, render_audio: bool) -> Result<(), MachineError> {
        self.input.update_keypad();
        self.input.update_touch();
        self.machine.set_keypad(self.input.keypad());
        self.machine.set_touch(self.input.touch());

        self.machine.exec()?;

        // audio trouble never stops the machine; the speaker just goes quiet
        if render_audio {
            if let Err(e) = self.sound.emulate(self.machine.tone()) {
                tracing::warn!(core = self.sound.name(), "sound step failed: {}", e);
            }
        }
        Ok(())
    }

    /// a catch-up step whose frame is never rendered
    pub fn skip(&mut self, render_audio: bool) -> Result<(), MachineError> {
        self.machine.skip_next_frame();
        self.advance(render_audio)
    }

    pub fn framebuffer(&self) -> &[u8] {
        self.machine.framebuffer()
    }
}
