use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use std::time::{Duration, Instant};
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

/// Presenter is used by the run loop to put rendered frames on the screen.
/// Only rendered steps reach it; skipped steps never draw.
///
/// A frame is always `begin_draw`, `draw_frame`, any `draw_text`, `end_draw`.
pub trait Presenter {
    /// take over the screen; called once before anything is drawn
    fn init(&mut self) -> Result<(), io::Error>;

    fn begin_draw(&mut self) -> Result<(), io::Error>;

    /// draw framebuffer data based on internal resolution of display
    fn draw_frame(&mut self, data: &[u8]) -> Result<(), io::Error>;

    /// overlay a line of status text; `line` counts from the top
    fn draw_text(&mut self, line: u16, text: &str) -> Result<(), io::Error>;

    fn end_draw(&mut self) -> Result<(), io::Error>;

    /// release the screen; nothing may be drawn afterwards
    fn shutdown(&mut self) -> Result<(), io::Error>;
}

// width, height, bits per pixel of the emulated screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution(pub usize, pub usize, pub usize);

impl Resolution {
    pub fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    pub fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// Sleeps off whatever is left of a frame period; the terminal has no vsync.
#[derive(Debug)]
pub struct FrameLimiter {
    period: Option<Duration>,
    last: Instant,
}

impl FrameLimiter {
    /// `hz` of 0 never sleeps
    pub fn new(hz: u32) -> Self {
        FrameLimiter {
            period: (hz > 0).then(|| Duration::from_secs(1) / hz),
            last: Instant::now(),
        }
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn wait(&mut self) {
        if let Some(period) = self.period {
            let spent = self.last.elapsed();
            if spent < period {
                spin_sleep::sleep(period - spent);
            }
        }
        self.last = Instant::now();
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
    frame: Vec<u8>,
    overlay: Vec<(u16, String)>,
    limiter: FrameLimiter,
    active: bool,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize, frame_limit: u32) -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        let resolution = Resolution(x, y, 1);
        Ok(MonoTermDisplay {
            terminal,
            resolution,
            frame: vec![0; resolution.byte_count()],
            overlay: Vec::new(),
            limiter: FrameLimiter::new(frame_limit),
            active: false,
        })
    }

    fn render(&mut self) -> Result<(), io::Error> {
        let resolution = self.resolution;
        let frame = &self.frame;
        let overlay = &self.overlay;
        self.terminal.draw(|f| {
            // for now this assumes a 1:1 ratio between terminal cells and pixels
            let area = f.size();
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16)
                .intersection(area);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("emuloop")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(frame, 0).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(frame, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);

            for (line, text) in overlay {
                if *line >= area.height {
                    continue;
                }
                let rect = Rect::new(1, *line, area.width.saturating_sub(1), 1);
                let para = Paragraph::new(text.as_str()).style(Style::default().fg(Color::White));
                f.render_widget(para, rect);
            }
        })?;
        Ok(())
    }
}

impl Presenter for MonoTermDisplay {
    fn init(&mut self) -> Result<(), io::Error> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(
            self.terminal.backend_mut(),
            EnterAlternateScreen,
            EnableMouseCapture
        )?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()
    }

    fn begin_draw(&mut self) -> Result<(), io::Error> {
        self.overlay.clear();
        Ok(())
    }

    fn draw_frame(&mut self, data: &[u8]) -> Result<(), io::Error> {
        if data.len() != self.resolution.byte_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "frame is {} bytes, display needs {}",
                    data.len(),
                    self.resolution.byte_count()
                ),
            ));
        }
        self.frame.copy_from_slice(data);
        Ok(())
    }

    fn draw_text(&mut self, line: u16, text: &str) -> Result<(), io::Error> {
        self.overlay.push((line, text.to_string()));
        Ok(())
    }

    fn end_draw(&mut self) -> Result<(), io::Error> {
        self.render()?;
        self.limiter.wait();
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), io::Error> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.terminal.show_cursor()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal::disable_raw_mode()
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            eprintln!("Warning: could not restore terminal: {}", e);
        }
    }
}
