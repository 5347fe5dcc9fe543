//! Player input
//!
//! The interpreter polls for the mouse position, button and key presses and
//! asks the input side to wait between movie frames.

use log::debug;
use std::collections::VecDeque;
use std::io::{self, BufRead};

/// One poll of the input devices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub mouse_x: u16,
    pub mouse_y: u16,
    /// Left button went down since the last poll
    pub left_button: bool,
    /// Keys pressed since the last poll
    pub keys: Vec<u8>,
    /// The player asked to quit
    pub quit: bool,
}

impl InputState {
    pub fn click(x: u16, y: u16) -> Self {
        InputState {
            mouse_x: x,
            mouse_y: y,
            left_button: true,
            ..Default::default()
        }
    }

    pub fn key(key: u8) -> Self {
        InputState {
            keys: vec![key],
            ..Default::default()
        }
    }

    pub fn quit() -> Self {
        InputState {
            quit: true,
            ..Default::default()
        }
    }
}

pub trait InputSource {
    fn poll(&mut self) -> InputState;

    /// Let `millis` milliseconds pass
    fn wait(&mut self, millis: u32);
}

/// Replays a fixed list of input states, then reports quit
#[derive(Debug, Default)]
pub struct ScriptedInput {
    events: VecDeque<InputState>,
    waited: u64,
}

impl ScriptedInput {
    pub fn new(events: Vec<InputState>) -> Self {
        ScriptedInput {
            events: events.into(),
            waited: 0,
        }
    }

    /// Total milliseconds waited so far
    pub fn waited(&self) -> u64 {
        self.waited
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputState {
        self.events.pop_front().unwrap_or_else(InputState::quit)
    }

    fn wait(&mut self, millis: u32) {
        self.waited += millis as u64;
    }
}

/// Reads commands from standard input, one per line:
/// `click X Y`, `key C` or `quit`. End of input quits.
pub struct TerminalInput {
    interactive: bool,
}

impl TerminalInput {
    pub fn new() -> Self {
        TerminalInput {
            interactive: atty::is(atty::Stream::Stdin),
        }
    }

    fn parse_command(line: &str) -> Option<InputState> {
        let mut words = line.split_whitespace();
        match words.next()? {
            "click" => {
                let x = words.next()?.parse().ok()?;
                let y = words.next()?.parse().ok()?;
                Some(InputState::click(x, y))
            }
            "key" => {
                let c = words.next()?.bytes().next()?;
                Some(InputState::key(c))
            }
            "quit" => Some(InputState::quit()),
            _ => None,
        }
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self) -> InputState {
        let stdin = io::stdin();
        loop {
            if self.interactive {
                eprint!("> ");
            }
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => {
                    debug!("TerminalInput: end of input");
                    return InputState::quit();
                }
                Ok(_) => match Self::parse_command(&line) {
                    Some(state) => return state,
                    None => {
                        if self.interactive {
                            eprintln!("commands: click X Y | key C | quit");
                        }
                    }
                },
            }
        }
    }

    fn wait(&mut self, millis: u32) {
        std::thread::sleep(std::time::Duration::from_millis(millis as u64));
    }
}
