//! Text, picture, box and media opcodes
//!
//! This module handles everything the player sees or clicks:
//! - Text output (print, message, msg)
//! - Pictures (picture), drawn from the sprite file of a zone
//! - Clickable boxes (addBox, delBox, enableBox, disableBox, moveBox, isBox)
//! - Object selection by click (getDollar2)
//! - Sound effects and movies (playEffect, loadVideo, playVideo)
use crate::hit_area::{box_flags_from_params, VERB_BIT_ALTERNATE};
use crate::interpreter::{Interpreter, LOCKOUT_PICTURE};
use crate::movie::{play_movie, MovieOutcome};
use log::{debug, info, warn};

/// Box ids carry their flags in the thousands
const BOX_PARAMS_DIVISOR: u16 = 1000;

/// Box x coordinates from here on select the alternate verb
const ALTERNATE_VERB_X: u16 = 1000;

impl Interpreter {
    /// 62: print a variable as a number
    pub(crate) fn o_print(&mut self) -> Result<(), String> {
        let value = self.get_next_var_contents()?;
        self.show_message(&value.to_string())
    }

    /// 63: print a string and end the line
    pub(crate) fn o_message(&mut self) -> Result<(), String> {
        let id = self.get_next_string_id()?;
        let text = format!("{}\n", self.state.strings.get(id));
        self.show_message(&text)
    }

    /// 64: print a string
    pub(crate) fn o_msg(&mut self) -> Result<(), String> {
        let id = self.get_next_string_id()?;
        let text = self.state.strings.get(id).to_string();
        self.show_message(&text)
    }

    /// 96: show the picture of a zone
    pub(crate) fn o_picture(&mut self) -> Result<(), String> {
        let vga_res = self.get_var_or_word()?;
        let mode = self.get_var_or_byte()?;
        let zone = vga_res / 100;
        debug!("picture {vga_res} mode {mode}");

        self.load_zone_locked(zone, LOCKOUT_PICTURE)?;
        self.draw_zone_picture(zone)?;
        self.zone_number = zone;
        Ok(())
    }

    fn draw_zone_picture(&mut self, zone: u16) -> Result<(), String> {
        let span = match self.zones.entry(zone).and_then(|e| e.vga_file2) {
            Some(span) => span,
            None => {
                debug!("picture: zone {zone} has no images");
                return Ok(());
            }
        };
        let (width, max_height) = self.screen.get_screen_size();
        let pixels = self.zones.data(span);
        let height = (pixels.len() / width.max(1) as usize).min(max_height as usize) as u16;
        self.screen.clear_screen()?;
        if height > 0 {
            let size = width as usize * height as usize;
            self.screen.blit(0, 0, width, height, &pixels[..size])?;
        }
        self.screen.force_refresh()?;
        Ok(())
    }

    /// 107: define a box
    pub(crate) fn o_add_box(&mut self) -> Result<(), String> {
        let mut id = self.get_var_or_word()?;
        let mut x = self.get_var_or_word()?;
        let y = self.get_var_or_word()?;
        let width = self.get_var_or_word()?;
        let height = self.get_var_or_word()?;
        let item = self.get_next_item_ptr_strange()?;
        let mut verb = self.get_var_or_word()?;

        let flags = box_flags_from_params(id / BOX_PARAMS_DIVISOR);
        id %= BOX_PARAMS_DIVISOR;
        if x >= ALTERNATE_VERB_X {
            verb = verb.wrapping_add(VERB_BIT_ALTERNATE);
            x -= ALTERNATE_VERB_X;
        }
        self.hit_areas
            .define_box(id, x, y, width, height, flags, verb, item);
        Ok(())
    }

    /// 108
    pub(crate) fn o_del_box(&mut self) -> Result<(), String> {
        let id = self.get_var_or_word()?;
        self.hit_areas.undefine_box(id);
        Ok(())
    }

    /// 109
    pub(crate) fn o_enable_box(&mut self) -> Result<(), String> {
        let id = self.get_var_or_word()?;
        self.hit_areas.enable_box(id);
        Ok(())
    }

    /// 110
    pub(crate) fn o_disable_box(&mut self) -> Result<(), String> {
        let id = self.get_var_or_word()?;
        self.hit_areas.disable_box(id);
        Ok(())
    }

    /// 111
    pub(crate) fn o_move_box(&mut self) -> Result<(), String> {
        let id = self.get_var_or_word()?;
        let x = self.get_var_or_word()?;
        let y = self.get_var_or_word()?;
        self.hit_areas.move_box(id, x, y);
        Ok(())
    }

    /// 142: box exists and is live
    pub(crate) fn o_is_box(&mut self) -> Result<(), String> {
        let id = self.get_var_or_word()?;
        self.set_condition(self.hit_areas.is_box_live(id));
        Ok(())
    }

    /// 163
    pub(crate) fn o_play_effect(&mut self) -> Result<(), String> {
        let id = self.get_var_or_word()?;
        self.audio.play_sound(id);
        Ok(())
    }

    /// 164: wait for the player to click the object of the verb
    pub(crate) fn o_get_dollar2(&mut self) -> Result<(), String> {
        self.state.show_preposition = true;
        let clicked = loop {
            let input = self.input.poll();
            if input.quit {
                self.state.quit_requested = true;
                break None;
            }
            if !input.left_button {
                continue;
            }
            match self.hit_areas.find_at(input.mouse_x, input.mouse_y) {
                Some(area) => break Some(area.item),
                None => debug!("getDollar2: click at ({},{}) misses", input.mouse_x, input.mouse_y),
            }
        };
        self.state.show_preposition = false;

        if let Some(hit) = clicked {
            self.state.hit_area_object_item = hit;
            self.state.object_item = self.state.resolve_hit_item(hit);
            let (adj, noun) = self.item_words(self.state.object_item);
            self.state.adj2 = adj;
            self.state.noun2 = noun;
        }
        Ok(())
    }

    /// 182: open a movie for the next `playVideo`
    pub(crate) fn o_load_video(&mut self) -> Result<(), String> {
        let id = self.get_next_string_id()?;
        let name = self.state.strings.get(id).to_string();
        self.movie = self.movies.open(&name);
        if self.movie.is_none() {
            warn!("loadVideo: cannot open movie '{name}'");
        }
        Ok(())
    }

    /// 183
    pub(crate) fn o_play_video(&mut self) -> Result<(), String> {
        let mut movie = match self.movie.take() {
            Some(movie) => movie,
            None => {
                warn!("playVideo: no movie loaded");
                return Ok(());
            }
        };
        let outcome = play_movie(movie.as_mut(), self.screen.as_mut(), self.input.as_mut())?;
        if outcome == MovieOutcome::Interrupted {
            info!("Quit during movie");
            self.state.quit_requested = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::audio::AudioMixer;
    use crate::config::GameVariant;
    use crate::hit_area::{HitItem, BF_BOX_ITEM, BF_NO_TOUCH_NAME};
    use crate::input::{InputState, ScriptedInput};
    use crate::interpreter::tests::create_test_interpreter;
    use crate::movie::{MovieSource, VideoDecoder};
    use crate::resource::MemoryStore;
    use crate::world::PLAYER_ITEM;
    use std::cell::RefCell;
    use std::rc::Rc;
    use test_log::test;

    #[test]
    fn test_text_output() {
        let (mut interp, screen) = create_test_interpreter(GameVariant::Simon1);
        interp.state.write_variable(3, 42);
        // message str2; msg str1; print v3
        interp.run_line(vec![63, 0, 2, 64, 0, 1, 62, 3, 0xFF]).unwrap();
        assert_eq!(screen.0.borrow().get_output(), "Hello\nlamp42");
    }

    #[test]
    fn test_add_box_decodes_params() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        // addBox 6012 at x 1010, y 20, 30x40, empty hands, verb 5
        let code = vec![
            107, 0x17, 0x7C, 0x03, 0xF2, 0, 20, 0, 30, 0, 40, 0xFF, 0xFB, 0, 5, 0xFF,
        ];
        interp.run_line(code).unwrap();
        let area = interp.hit_areas.get(12).unwrap();
        assert_eq!(area.flags, BF_NO_TOUCH_NAME | BF_BOX_ITEM);
        assert_eq!((area.x, area.y), (10, 20));
        assert_eq!(area.verb, 5 | 0x4000);
        assert_eq!(area.item, Some(HitItem::EmptyHands));
    }

    #[test]
    fn test_box_lifecycle() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        interp.hit_areas.define_box(4, 0, 0, 10, 10, 0, 1, None);
        // disableBox 4; isBox 4
        interp.run_line(vec![110, 0, 4, 142, 0, 4, 0xFF]).unwrap();
        assert!(!interp.condition());
        // enableBox 4; moveBox 4 to (50, 60); isBox 4
        interp
            .run_line(vec![109, 0, 4, 111, 0, 4, 0, 50, 0, 60, 142, 0, 4, 0xFF])
            .unwrap();
        assert!(interp.condition());
        assert_eq!(interp.hit_areas.find_at(55, 65).map(|a| a.id), Some(4));
        // delBox 4
        interp.run_line(vec![108, 0, 4, 0xFF]).unwrap();
        assert!(interp.hit_areas.get(4).is_none());
    }

    #[test]
    fn test_picture_draws_zone_images() {
        let (mut interp, screen) = create_test_interpreter(GameVariant::Simon1);
        interp.resources = Box::new(
            MemoryStore::new()
                .with_file("0031.VGA", vec![1; 16])
                .with_file("0032.VGA", vec![2; 320 * 3 + 7]),
        );
        // picture 305, mode 0
        interp.run_line(vec![96, 0x01, 0x31, 0, 0xFF]).unwrap();
        assert_eq!(interp.zone_number, 3);
        assert_eq!(interp.video_lockout, 0);
        assert_eq!(screen.0.borrow().blits(), &[(0, 0, 320, 3)]);
    }

    #[test]
    fn test_get_dollar2_resolves_sentinels() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        interp
            .hit_areas
            .define_box(20, 0, 0, 10, 10, 0, 0, Some(HitItem::PlayerContainer));
        interp
            .hit_areas
            .define_box(21, 20, 0, 10, 10, 0, 0, Some(HitItem::EmptyHands));
        interp.input = Box::new(ScriptedInput::new(vec![
            InputState::default(),
            InputState::click(100, 100),
            InputState::click(5, 5),
            InputState::click(25, 5),
        ]));

        interp.run_line(vec![164, 0xFF]).unwrap();
        assert_eq!(interp.state.object_item, Some(2));
        assert_eq!(interp.state.noun2, 20);
        assert!(!interp.state.show_preposition);

        interp.run_line(vec![164, 0xFF]).unwrap();
        assert_eq!(interp.state.object_item, Some(PLAYER_ITEM));
        assert_eq!(interp.state.hit_area_object_item, Some(HitItem::EmptyHands));

        // input runs out: quit, preposition flag still reset
        interp.run_line(vec![164, 0xFF]).unwrap();
        assert!(interp.state.quit_requested);
        assert!(!interp.state.show_preposition);
    }

    /// Mixer whose requests stay readable after it is boxed
    struct RecordingMixer(Rc<RefCell<Vec<u16>>>);

    impl AudioMixer for RecordingMixer {
        fn play_sound(&mut self, id: u16) {
            self.0.borrow_mut().push(id);
        }

        fn stop_all(&mut self) {}

        fn load_effects(&mut self, _name: &str, _data: Vec<u8>) {}
    }

    #[test]
    fn test_play_effect() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        let played = Rc::new(RefCell::new(Vec::new()));
        interp.audio = Box::new(RecordingMixer(played.clone()));
        interp.run_line(vec![163, 0, 17, 0xFF]).unwrap();
        assert_eq!(*played.borrow(), vec![17]);
    }

    struct OneFrame(bool);

    impl VideoDecoder for OneFrame {
        fn decode_next_frame(&mut self) -> Option<Vec<u8>> {
            if self.0 {
                return None;
            }
            self.0 = true;
            Some(vec![0; 16])
        }

        fn width(&self) -> u16 {
            4
        }

        fn height(&self) -> u16 {
            4
        }

        fn time_to_next_frame(&self) -> u32 {
            40
        }
    }

    struct OneMovie;

    impl MovieSource for OneMovie {
        fn open(&mut self, name: &str) -> Option<Box<dyn VideoDecoder>> {
            (name == "lamp").then(|| Box::new(OneFrame(false)) as Box<dyn VideoDecoder>)
        }
    }

    #[test]
    fn test_video_playback() {
        let (mut interp, screen) = create_test_interpreter(GameVariant::Feeble);
        interp.movies = Box::new(OneMovie);
        interp.input = Box::new(ScriptedInput::new(vec![InputState::default()]));
        // loadVideo "lamp"; playVideo
        interp.run_line(vec![182, 0, 1, 183, 0xFF]).unwrap();
        assert_eq!(screen.0.borrow().blits().len(), 1);
        assert!(interp.movie.is_none());
        assert!(!interp.state.quit_requested);

        // a missing movie leaves nothing to play
        interp.run_line(vec![182, 0, 2, 183, 0xFF]).unwrap();
        assert_eq!(screen.0.borrow().blits().len(), 1);
    }
}
