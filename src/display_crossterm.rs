//! Terminal screen using crossterm
//!
//! Script text goes to the terminal as it is printed. Picture blits are shown
//! as a one-line placeholder since a text terminal cannot show the pixels.

use crossterm::{
    cursor::MoveTo,
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use log::debug;
use std::io::{self, Stdout, Write};

use crate::display_trait::{DisplayError, Screen};

pub struct TerminalScreen {
    stdout: Stdout,
    width: u16,
    height: u16,
    /// stdout is a tty; otherwise no control sequences are written
    interactive: bool,
}

impl TerminalScreen {
    pub fn new() -> Result<Self, DisplayError> {
        let mut stdout = io::stdout();
        let interactive = atty::is(atty::Stream::Stdout);
        if interactive {
            execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        let (width, height) = terminal::size().unwrap_or((80, 24));
        debug!("TerminalScreen: {}x{}, interactive {}", width, height, interactive);
        Ok(TerminalScreen {
            stdout,
            width,
            height,
            interactive,
        })
    }
}

impl Screen for TerminalScreen {
    fn clear_screen(&mut self) -> Result<(), DisplayError> {
        if self.interactive {
            execute!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        } else {
            writeln!(self.stdout)?;
        }
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.interactive {
            // Raw newlines do not return the carriage on every terminal
            queue!(self.stdout, Print(text.replace('\n', "\r\n")))?;
        } else {
            write!(self.stdout, "{text}")?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    fn blit(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        _pixels: &[u8],
    ) -> Result<(), DisplayError> {
        let note = format!("[picture {width}x{height} at {x},{y}]");
        if self.interactive {
            queue!(
                self.stdout,
                SetForegroundColor(Color::DarkGrey),
                Print(note),
                Print("\r\n"),
                ResetColor
            )?;
        } else {
            writeln!(self.stdout, "{note}")?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    fn get_screen_size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn force_refresh(&mut self) -> Result<(), DisplayError> {
        self.stdout.flush()?;
        Ok(())
    }
}
