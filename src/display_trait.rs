//! Screen trait for the game's text and picture output
//!
//! The interpreter only writes to the screen: script text, cleared windows
//! and decoded picture blocks. Rendering lives behind this trait.

use std::fmt;

pub trait Screen {
    /// Clear the entire screen
    fn clear_screen(&mut self) -> Result<(), DisplayError>;

    /// Print script text
    fn print(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Write a block of 8-bit pixels with its top-left corner at (x, y)
    fn blit(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[u8],
    ) -> Result<(), DisplayError>;

    /// Screen dimensions in pixels
    fn get_screen_size(&self) -> (u16, u16);

    /// Push pending output to the device
    fn force_refresh(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Display error type
#[derive(Debug, Clone)]
pub struct DisplayError {
    pub message: String,
}

impl DisplayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Display error: {}", self.message)
    }
}

impl std::error::Error for DisplayError {}

impl From<std::io::Error> for DisplayError {
    fn from(error: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", error))
    }
}

impl From<DisplayError> for String {
    fn from(error: DisplayError) -> String {
        error.message
    }
}
