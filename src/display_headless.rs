//! Headless screen for tests and non-interactive runs
//!
//! Collects printed text and counts blits without drawing anything.

use crate::display_trait::{DisplayError, Screen};
use log::debug;

#[derive(Debug, Default)]
pub struct HeadlessScreen {
    buffer: Vec<String>,
    current_line: String,
    blits: Vec<(u16, u16, u16, u16)>,
}

impl HeadlessScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// All output as a single string
    pub fn get_output(&self) -> String {
        let mut output = self.buffer.join("\n");
        if !self.current_line.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&self.current_line);
        }
        output
    }

    /// Rectangles blitted so far
    pub fn blits(&self) -> &[(u16, u16, u16, u16)] {
        &self.blits
    }
}

impl Screen for HeadlessScreen {
    fn clear_screen(&mut self) -> Result<(), DisplayError> {
        self.buffer.clear();
        self.current_line.clear();
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        for ch in text.chars() {
            if ch == '\n' {
                self.buffer.push(std::mem::take(&mut self.current_line));
            } else {
                self.current_line.push(ch);
            }
        }
        Ok(())
    }

    fn blit(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[u8],
    ) -> Result<(), DisplayError> {
        debug!("Headless: blit {width}x{height} at ({x},{y}), {} bytes", pixels.len());
        self.blits.push((x, y, width, height));
        Ok(())
    }

    fn get_screen_size(&self) -> (u16, u16) {
        (320, 200)
    }
}
