use crate::pacer::ExecuteFlag;
use bitflags::bitflags;
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers, MouseButton, MouseEventKind};
use std::collections::HashMap;
use std::time::Duration;

bitflags! {
    /// buttons held down on the emulated handheld
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Keypad: u16 {
        const A = 1 << 0;
        const B = 1 << 1;
        const SELECT = 1 << 2;
        const START = 1 << 3;
        const RIGHT = 1 << 4;
        const LEFT = 1 << 5;
        const UP = 1 << 6;
        const DOWN = 1 << 7;
        const R = 1 << 8;
        const L = 1 << 9;
        const X = 1 << 10;
        const Y = 1 << 11;
    }
}

/// a point on the touch screen, in emulated screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Touch {
    pub x: u16,
    pub y: u16,
}

/// map of terminal keys to handheld buttons, using the right-hand side of a
/// qwerty keyboard for the face buttons
const CONVENTIONAL_KEYMAP: [(char, Keypad); 10] = [
    ('x', Keypad::A),
    ('z', Keypad::B),
    ('s', Keypad::X),
    ('a', Keypad::Y),
    ('w', Keypad::UP),
    ('k', Keypad::DOWN),
    ('j', Keypad::LEFT),
    ('l', Keypad::RIGHT),
    ('1', Keypad::L),
    ('2', Keypad::R),
];

/// Refreshes controller state. Both updates run once per emulation step,
/// before the step executes.
pub trait Input {
    fn update_keypad(&mut self);
    fn update_touch(&mut self);

    /// buttons as of the last `update_keypad`
    fn keypad(&self) -> Keypad;

    /// stylus position as of the last `update_touch`, if it is down
    fn touch(&self) -> Option<Touch>;
}

/// Reads the terminal through crossterm. Terminals only report presses, so a
/// key counts as held for the step it arrived in.
///
/// `Esc` and `q` ask the run loop to stop.
pub struct TermInput {
    keymap: HashMap<char, Keypad>,
    keys: Keypad,
    touch: Option<Touch>,
    pending_touch: Option<Touch>,
    exit: ExecuteFlag,
}

impl TermInput {
    pub fn new(exit: ExecuteFlag) -> Self {
        TermInput {
            keymap: HashMap::from(CONVENTIONAL_KEYMAP),
            keys: Keypad::empty(),
            touch: None,
            pending_touch: None,
            exit,
        }
    }

    fn handle(&mut self, evt: Event) {
        match evt {
            Event::Key(key) => match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    tracing::info!("interrupted");
                    self.exit.request_stop();
                }
                KeyCode::Esc | KeyCode::Char('q') => {
                    tracing::info!("exit requested from keyboard");
                    self.exit.request_stop();
                }
                KeyCode::Enter => self.keys |= Keypad::START,
                KeyCode::Backspace => self.keys |= Keypad::SELECT,
                KeyCode::Up => self.keys |= Keypad::UP,
                KeyCode::Down => self.keys |= Keypad::DOWN,
                KeyCode::Left => self.keys |= Keypad::LEFT,
                KeyCode::Right => self.keys |= Keypad::RIGHT,
                KeyCode::Char(c) => match self.keymap.get(&c) {
                    Some(mapped) => self.keys |= *mapped,
                    None => tracing::trace!(key = ?c, "unmapped key"),
                },
                _ => {}
            },
            Event::Mouse(m) => match m.kind {
                MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                    self.pending_touch = Some(Touch {
                        x: m.column,
                        y: m.row,
                    })
                }
                MouseEventKind::Up(MouseButton::Left) => self.pending_touch = None,
                _ => {}
            },
            Event::Resize(..) => {}
        }
    }

    fn drain(&mut self) {
        loop {
            match poll(Duration::from_millis(0)) {
                Ok(true) => match read() {
                    Ok(evt) => self.handle(evt),
                    Err(e) => {
                        tracing::warn!("reading terminal input failed: {}", e);
                        return;
                    }
                },
                Ok(false) => return,
                Err(e) => {
                    tracing::warn!("polling terminal input failed: {}", e);
                    return;
                }
            }
        }
    }
}

impl Input for TermInput {
    fn update_keypad(&mut self) {
        self.keys = Keypad::empty();
        self.drain();
    }

    fn update_touch(&mut self) {
        // mouse events were already drained with the keyboard
        self.touch = self.pending_touch;
    }

    fn keypad(&self) -> Keypad {
        self.keys
    }

    fn touch(&self) -> Option<Touch> {
        self.touch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, MouseEvent};

    fn key(c: KeyCode) -> Event {
        Event::Key(KeyEvent::new(c, KeyModifiers::NONE))
    }

    #[test]
    fn test_mapped_keys_set_buttons() {
        let mut input = TermInput::new(ExecuteFlag::new());
        input.handle(key(KeyCode::Char('x')));
        input.handle(key(KeyCode::Up));
        input.handle(key(KeyCode::Char('?')));
        assert_eq!(input.keypad(), Keypad::A | Keypad::UP);
    }

    #[test]
    fn test_escape_requests_stop() {
        let flag = ExecuteFlag::new();
        flag.start();
        let mut input = TermInput::new(flag.clone());
        input.handle(key(KeyCode::Esc));
        assert!(!flag.is_executing());

        // raw mode swallows the signal, so ctrl-c arrives as a key
        flag.start();
        input.handle(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!flag.is_executing());
        assert_eq!(input.keypad(), Keypad::empty());
    }

    #[test]
    fn test_touch_follows_mouse() {
        let mut input = TermInput::new(ExecuteFlag::new());
        input.handle(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(input.touch(), None);
        input.update_touch();
        assert_eq!(input.touch(), Some(Touch { x: 12, y: 7 }));
        input.handle(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        }));
        input.update_touch();
        assert_eq!(input.touch(), None);
    }
}
