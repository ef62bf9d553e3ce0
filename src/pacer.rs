use crate::clock::Clock;
use crate::config::RuntimeConfig;
use crate::display::Presenter;
use crate::error::Result;
use crate::executor::StepExecutor;
use crate::fps::FpsEstimator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// line the FPS overlay is drawn on
const FPS_TEXT_LINE: u16 = 1;

/// The "executing" flag. Raised once a program is loaded; anyone holding a
/// clone may lower it to stop the run. The loop checks it once per cycle.
#[derive(Debug, Clone, Default)]
pub struct ExecuteFlag(Arc<AtomicBool>);

impl ExecuteFlag {
    pub fn new() -> Self {
        ExecuteFlag(Arc::new(AtomicBool::new(false)))
    }

    pub fn start(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn request_stop(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_executing(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacerState {
    Stopped,
    Running,
}

/// Drives the machine: `frame_skip` unrendered steps, then one rendered
/// step that is handed to the presenter, for as long as the flag stays up.
pub struct FramePacer<'a, C: Clock> {
    config: &'a RuntimeConfig,
    executor: StepExecutor<'a>,
    presenter: &'a mut dyn Presenter,
    fps: FpsEstimator<C>,
    fps_text: String,
    flag: ExecuteFlag,
    state: PacerState,
    rendered: u64,
}

impl<'a, C: Clock> FramePacer<'a, C> {
    pub fn new(
        config: &'a RuntimeConfig,
        executor: StepExecutor<'a>,
        presenter: &'a mut dyn Presenter,
        clock: C,
        flag: ExecuteFlag,
    ) -> Self {
        FramePacer {
            config,
            executor,
            presenter,
            fps: FpsEstimator::new(clock),
            fps_text: String::new(),
            flag,
            state: PacerState::Stopped,
            rendered: 0,
        }
    }

    pub fn state(&self) -> PacerState {
        self.state
    }

    /// frames handed to the presenter so far
    pub fn rendered_frames(&self) -> u64 {
        self.rendered
    }

    /// the overlay text the next rendered frame will carry
    pub fn fps_text(&self) -> &str {
        &self.fps_text
    }

    /// Loop until the flag is lowered. Returns frames presented.
    pub fn run(&mut self) -> Result<u64> {
        self.state = PacerState::Running;
        tracing::info!(frame_skip = self.config.frame_skip, "frame pacer running");
        let result = self.run_until_stopped();
        self.state = PacerState::Stopped;
        tracing::info!(frames = self.rendered, "frame pacer stopped");
        result.map(|_| self.rendered)
    }

    fn run_until_stopped(&mut self) -> Result<()> {
        while self.flag.is_executing() {
            self.run_cycle()?;
        }
        Ok(())
    }

    /// one rendered frame and the skipped steps in front of it
    pub fn run_cycle(&mut self) -> Result<()> {
        let audio = self.config.sound_enabled;

        for _ in 0..self.config.frame_skip {
            self.executor.skip(audio)?;
        }
        self.executor.advance(audio)?;

        self.presenter.begin_draw()?;
        self.presenter.draw_frame(self.executor.framebuffer())?;
        if self.config.fps_counter_enabled && !self.fps_text.is_empty() {
            self.presenter.draw_text(FPS_TEXT_LINE, &self.fps_text)?;
        }
        self.presenter.end_draw()?;
        self.rendered += 1;

        if self.config.fps_counter_enabled {
            self.fps.record_rendered_frame();
            if let Some(text) = self.fps.sample() {
                self.fps_text = text;
            }
        }
        Ok(())
    }
}
