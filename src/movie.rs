//! Full-motion video playback
//!
//! A decoder hands out frames; playback blits each one centred on the screen,
//! waits the frame delay and stops early when the player quits.

use crate::display_trait::Screen;
use crate::input::InputSource;
use log::{debug, info};

pub trait VideoDecoder {
    /// Next frame's pixels, None after the last frame
    fn decode_next_frame(&mut self) -> Option<Vec<u8>>;

    fn width(&self) -> u16;

    fn height(&self) -> u16;

    /// Milliseconds until the next frame is due
    fn time_to_next_frame(&self) -> u32;
}

/// Opens movies by name
pub trait MovieSource {
    fn open(&mut self, name: &str) -> Option<Box<dyn VideoDecoder>>;
}

/// A source without any movies
#[derive(Debug, Default)]
pub struct NoMovies;

impl MovieSource for NoMovies {
    fn open(&mut self, name: &str) -> Option<Box<dyn VideoDecoder>> {
        debug!("NoMovies: {name} not available");
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieOutcome {
    Finished,
    Interrupted,
}

/// Play a movie to the end or until quit is requested
pub fn play_movie(
    decoder: &mut dyn VideoDecoder,
    screen: &mut dyn Screen,
    input: &mut dyn InputSource,
) -> Result<MovieOutcome, String> {
    let (screen_w, screen_h) = screen.get_screen_size();
    let x = screen_w.saturating_sub(decoder.width()) / 2;
    let y = screen_h.saturating_sub(decoder.height()) / 2;
    let mut frames = 0;

    while let Some(frame) = decoder.decode_next_frame() {
        screen.blit(x, y, decoder.width(), decoder.height(), &frame)?;
        frames += 1;
        input.wait(decoder.time_to_next_frame());
        if input.poll().quit {
            info!("Movie interrupted after {frames} frames");
            return Ok(MovieOutcome::Interrupted);
        }
    }
    debug!("Movie finished after {frames} frames");
    Ok(MovieOutcome::Finished)
}
