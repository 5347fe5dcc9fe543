//! Picks a screen implementation for the current environment

use crate::display_crossterm::TerminalScreen;
use crate::display_headless::HeadlessScreen;
use crate::display_trait::{DisplayError, Screen};

use log::debug;

/// Display mode selection
#[derive(Debug, Clone, Default)]
pub enum DisplayMode {
    /// Terminal, headless if the terminal cannot be set up
    #[default]
    Auto,
    /// Force terminal output
    Terminal,
    /// No display output (for testing/CI)
    Headless,
}

impl DisplayMode {
    /// Read the mode from `DISPLAY_MODE`
    pub fn from_env() -> Self {
        match std::env::var("DISPLAY_MODE").as_deref() {
            Ok("terminal") => DisplayMode::Terminal,
            Ok("headless") => DisplayMode::Headless,
            _ => DisplayMode::Auto,
        }
    }
}

/// Create a screen for the given mode
pub fn create_screen(mode: DisplayMode) -> Result<Box<dyn Screen>, DisplayError> {
    debug!("Creating screen with mode {:?}", mode);
    let screen: Box<dyn Screen> = match mode {
        DisplayMode::Auto => match TerminalScreen::new() {
            Ok(screen) => Box::new(screen),
            Err(e) => {
                debug!("Terminal screen failed ({}), falling back to headless", e);
                Box::new(HeadlessScreen::new())
            }
        },
        DisplayMode::Terminal => Box::new(TerminalScreen::new()?),
        DisplayMode::Headless => Box::new(HeadlessScreen::new()),
    };
    Ok(screen)
}
