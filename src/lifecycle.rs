//! Startup, the run itself, and teardown.
//!
//! Idle -> Running -> Exiting. A missing program or a program that will not
//! load goes straight from Idle to Exiting without running a single step.

use crate::browser::ProgramSelector;
use crate::clock::Clock;
use crate::config::RuntimeConfig;
use crate::display::Presenter;
use crate::error::Result;
use crate::executor::StepExecutor;
use crate::input::Input;
use crate::machine::Machine;
use crate::pacer::{ExecuteFlag, FramePacer};
use crate::sound::{Sound, SOUND_BUFFER_SAMPLES};
use std::time::Duration;

/// Largest block the recompiler may translate at once. Some titles cope
/// with more, but this keeps them stable.
pub const JIT_MAX_BLOCK_SIZE: u32 = 60;

/// how long an exit message stays up
pub const EXIT_MESSAGE_DELAY: Duration = Duration::from_secs(6);

/// Board-level setup the run loop does not care about the details of.
pub trait Platform {
    /// CPU, bus and GPU clocks
    fn configure_clocks(&mut self);

    /// analog sticks and front touch panel sampling
    fn configure_input_sampling(&mut self);

    /// block the calling thread
    fn delay(&mut self, duration: Duration);
}

/// A desktop needs no clock or sampling setup; only the delay is real.
#[derive(Debug, Default)]
pub struct DesktopPlatform;

impl Platform for DesktopPlatform {
    fn configure_clocks(&mut self) {
        tracing::debug!("host clocks left as they are");
    }

    fn configure_input_sampling(&mut self) {
        tracing::debug!("terminal input needs no sampling setup");
    }

    fn delay(&mut self, duration: Duration) {
        spin_sleep::sleep(duration);
    }
}

/// The collaborators a run needs, borrowed for its duration.
pub struct Host<'a> {
    pub platform: &'a mut dyn Platform,
    pub selector: &'a mut dyn ProgramSelector,
    pub presenter: &'a mut dyn Presenter,
    pub machine: &'a mut dyn Machine,
    pub input: &'a mut dyn Input,
    pub sound: &'a mut dyn Sound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Running,
    Exiting,
}

/// How a run ended. All of these are a clean process exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoProgram,
    LoadFailed,
    Finished { frames: u64 },
}

pub struct Lifecycle<'a, C: Clock + Clone> {
    config: &'a RuntimeConfig,
    host: Host<'a>,
    clock: C,
    flag: ExecuteFlag,
    state: LifecycleState,
}

impl<'a, C: Clock + Clone> Lifecycle<'a, C> {
    pub fn new(config: &'a RuntimeConfig, host: Host<'a>, clock: C, flag: ExecuteFlag) -> Self {
        Lifecycle {
            config,
            host,
            clock,
            flag,
            state: LifecycleState::Idle,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Take the machine from power-on to teardown. Errors are machine faults
    /// or presentation failures; the screen is released either way.
    pub fn run(&mut self) -> Result<Outcome> {
        let result = self.startup_and_run();
        self.state = LifecycleState::Exiting;
        let teardown = self.teardown();
        let outcome = result?;
        teardown?;
        tracing::info!(?outcome, "exiting");
        Ok(outcome)
    }

    fn startup_and_run(&mut self) -> Result<Outcome> {
        self.host.platform.configure_clocks();
        self.host.platform.configure_input_sampling();
        self.host.presenter.init()?;

        let path = match self.host.selector.select() {
            Some(path) => path,
            None => {
                let message = self.host.selector.empty_message();
                tracing::info!("{}", message);
                self.show_and_wait(&message)?;
                return Ok(Outcome::NoProgram);
            }
        };

        self.host.machine.init();
        if self.config.jit_enabled {
            tracing::info!(max_block_size = JIT_MAX_BLOCK_SIZE, "jit enabled");
            self.host.machine.enable_jit(JIT_MAX_BLOCK_SIZE);
        }

        if let Err(e) = self.host.machine.load_program(&path) {
            tracing::error!("failed to load program: {}", e);
            self.show_and_wait(&format!("Could not load program: {}", e))?;
            return Ok(Outcome::LoadFailed);
        }

        self.flag.start();
        if self.config.sound_enabled {
            if let Err(e) = self.host.sound.configure(SOUND_BUFFER_SAMPLES) {
                tracing::warn!(core = self.host.sound.name(), "sound configure failed: {}", e);
            }
        }
        self.state = LifecycleState::Running;
        tracing::info!(program = %path.display(), sound = self.host.sound.name(), "running");

        let executor = StepExecutor::new(
            &mut *self.host.machine,
            &mut *self.host.input,
            &mut *self.host.sound,
        );
        let mut pacer = FramePacer::new(
            self.config,
            executor,
            &mut *self.host.presenter,
            self.clock.clone(),
            self.flag.clone(),
        );
        let frames = pacer.run()?;
        Ok(Outcome::Finished { frames })
    }

    fn show_and_wait(&mut self, message: &str) -> Result<()> {
        let presenter = &mut *self.host.presenter;
        presenter.begin_draw()?;
        presenter.draw_text(1, message)?;
        presenter.draw_text(2, "Program will exit after 6s...")?;
        presenter.end_draw()?;
        self.host.platform.delay(EXIT_MESSAGE_DELAY);
        Ok(())
    }

    fn teardown(&mut self) -> Result<()> {
        self.flag.request_stop();
        if let Err(e) = self.host.sound.stop() {
            tracing::warn!(core = self.host.sound.name(), "sound stop failed: {}", e);
        }
        self.host.presenter.shutdown()?;
        Ok(())
    }
}
