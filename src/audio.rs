//! Sound effects
//!
//! Decoding and mixing happen elsewhere; the interpreter only asks for a
//! sound by number, stops everything, or hands over an effects bank.

use log::debug;

pub trait AudioMixer {
    /// Play a sound effect from the current bank
    fn play_sound(&mut self, id: u16);

    /// Stop all playing sounds
    fn stop_all(&mut self);

    /// Replace the effects bank with the contents of a named file
    fn load_effects(&mut self, name: &str, data: Vec<u8>);
}

/// Mixer that plays nothing but remembers what it was asked to do
#[derive(Debug, Default)]
pub struct NullMixer {
    played: Vec<u16>,
    bank: Option<String>,
}

impl NullMixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> &[u16] {
        &self.played
    }

    pub fn bank(&self) -> Option<&str> {
        self.bank.as_deref()
    }
}

impl AudioMixer for NullMixer {
    fn play_sound(&mut self, id: u16) {
        debug!("NullMixer: play sound {id}");
        self.played.push(id);
    }

    fn stop_all(&mut self) {
        debug!("NullMixer: stop all");
    }

    fn load_effects(&mut self, name: &str, data: Vec<u8>) {
        debug!("NullMixer: effects bank {name}, {} bytes", data.len());
        self.bank = Some(name.to_string());
    }
}
