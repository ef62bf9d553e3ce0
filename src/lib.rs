//! # emuloop
//!
//! The run loop of a handheld emulator front-end: it decides how many frames
//! to emulate without drawing for every frame it does draw, keeps audio
//! going on every step, measures the presented frame rate, and walks the
//! program through startup, running and shutdown.
//!
//! ## Design
//!
//! * the emulated machine, the screen, the controls and the speaker are all
//!   traits, so the loop never learns what is behind them
//! * frame skip is a fixed count from the config: `frame_skip` steps run with
//!   rendering suppressed, then one step is rendered and presented
//! * audio is synthesised after every step, skipped or not
//! * the FPS counter only counts presented frames, over a fixed one-second
//!   window
//! * one thread; the only thing shared is the "executing" flag, which input
//!   (or anything else holding a clone) can lower to end the run
//!
//! Model
//!
//! Lifecycle
//!  |-- platform, program selector, presenter       (Idle)
//!  |-- machine.init / enable_jit / load_program
//!  |-- FramePacer(config, StepExecutor(machine, input, sound), presenter)
//!  |    `-- while executing {
//!  |          frame_skip x executor.skip(sound_enabled);
//!  |          executor.advance(sound_enabled);
//!  |          begin_draw; draw_frame; [fps text]; end_draw;
//!  |          fps.record_rendered_frame(); fps.sample();
//!  |        }
//!  `-- presenter.shutdown                           (Exiting)
pub mod browser;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod executor;
pub mod fps;
pub mod input;
pub mod lifecycle;
pub mod machine;
pub mod memory;
pub mod pacer;
pub mod sound;

pub use error::{Error, Result};
