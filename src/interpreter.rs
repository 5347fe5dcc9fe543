use crate::audio::{AudioMixer, NullMixer};
use crate::config::GameConfig;
use crate::disassembler::disassemble_subroutine;
use crate::display_headless::HeadlessScreen;
use crate::display_trait::Screen;
use crate::hit_area::{HitAreaList, HitItem, VERB_BIT_ALTERNATE};
use crate::input::{InputSource, ScriptedInput};
use crate::item::{ItemId, NO_ITEM};
use crate::movie::{MovieSource, NoMovies, VideoDecoder};
use crate::opcode_tables::OpcodeTable;
use crate::resource::{MemoryStore, ResourceStore};
use crate::rng::ScriptRandom;
use crate::subroutine::{ResolvedLine, ResolvedSubroutine, SubroutineTable};
use crate::tables::{load_tables_into_mem, TableList};
use crate::vm::InterpreterState;
use crate::world::WorldData;
use crate::zone::{OverlapRule, ZoneArena, ZoneLoadContext};
use log::{debug, error, info, log_enabled, trace, warn, Level};

/// Deepest allowed nesting of running subroutines
const MAX_RECURSION_DEPTH: usize = 40;

/// Subroutine matched against the script words after a verb click
const VERB_SUBROUTINE: u16 = 0;

/// Subroutine run after every verb
const AFTER_VERB_SUBROUTINE: u16 = 100;

/// Return code asking for the current subroutine to start over
pub const RESTART_CODE: i16 = -10;

/// Video lockout bit held while a picture loads
pub const LOCKOUT_PICTURE: u16 = 0x20;

/// Video lockout bit held while `loadZone` runs
pub const LOCKOUT_LOAD_ZONE: u16 = 0x80;

/// Outcome of running a script line or a subroutine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptResult {
    /// Ran to completion with return code 0
    Continue,
    /// Stopped with a non-zero code for the caller. A subroutine in which no
    /// line was selected reports -1.
    ReturnToCaller(i16),
    /// Start the subroutine again from its first line
    Restart,
    /// The session is over
    Quit,
}

impl ScriptResult {
    fn from_code(code: i16) -> Self {
        match code {
            0 => ScriptResult::Continue,
            RESTART_CODE => ScriptResult::Restart,
            code => ScriptResult::ReturnToCaller(code),
        }
    }

    /// Numeric return code as scripts see it
    pub fn code(self) -> i16 {
        match self {
            ScriptResult::Continue => 0,
            ScriptResult::ReturnToCaller(code) => code,
            ScriptResult::Restart => RESTART_CODE,
            ScriptResult::Quit => 1,
        }
    }
}

/// The subroutine whose code is executing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentTable {
    pub id: u16,
    /// Loaded from an overlay file rather than the main game data
    pub from_overlay: bool,
}

/// Everything the interpreter talks to outside itself
pub struct Collaborators {
    pub screen: Box<dyn Screen>,
    pub audio: Box<dyn AudioMixer>,
    pub input: Box<dyn InputSource>,
    pub resources: Box<dyn ResourceStore>,
    pub movies: Box<dyn MovieSource>,
}

impl Collaborators {
    /// No screen, no sound, no input, no files
    pub fn headless() -> Self {
        Collaborators {
            screen: Box::new(HeadlessScreen::new()),
            audio: Box::new(NullMixer::new()),
            input: Box::new(ScriptedInput::default()),
            resources: Box::new(MemoryStore::new()),
            movies: Box::new(NoMovies),
        }
    }
}

/// The script interpreter
pub struct Interpreter {
    pub config: GameConfig,
    /// Session state touched by the opcodes
    pub state: InterpreterState,
    pub subroutines: SubroutineTable,
    /// Overlay table list, when the game has one
    pub tables: Option<TableList>,
    pub zones: ZoneArena,
    pub hit_areas: HitAreaList,
    pub(crate) opcodes: &'static OpcodeTable,
    pub(crate) rng: ScriptRandom,
    /// Code of the line being run and the cursor into it
    code: Vec<u8>,
    pc: usize,
    /// Result of the last condition opcode
    pub(crate) condition: bool,
    pub(crate) script_return: i16,
    current_table: Option<CurrentTable>,
    recursion_depth: usize,
    pub video_lockout: u16,
    /// Zone of the last picture shown
    pub zone_number: u16,
    /// Movie opened by `loadVideo`, waiting for `playVideo`
    pub(crate) movie: Option<Box<dyn VideoDecoder>>,
    pub(crate) screen: Box<dyn Screen>,
    pub(crate) audio: Box<dyn AudioMixer>,
    pub(crate) input: Box<dyn InputSource>,
    pub(crate) resources: Box<dyn ResourceStore>,
    pub(crate) movies: Box<dyn MovieSource>,
}

impl Interpreter {
    /// Create an interpreter over loaded game data
    pub fn new(config: GameConfig, world: WorldData, collaborators: Collaborators) -> Self {
        let variant = config.variant;
        let zones = ZoneArena::new(config.zone_memory_size, OverlapRule::for_variant(variant));
        let rng = ScriptRandom::from_seed(config.seed);
        info!(
            "{variant}: {} subroutines, {} strings",
            world.subroutines.len(),
            world.strings.len()
        );
        Interpreter {
            state: InterpreterState::new(variant, world.items, world.strings),
            subroutines: world.subroutines,
            tables: None,
            zones,
            hit_areas: HitAreaList::new(),
            opcodes: OpcodeTable::for_variant(variant),
            rng,
            code: Vec::new(),
            pc: 0,
            condition: true,
            script_return: 0,
            current_table: None,
            recursion_depth: 0,
            video_lockout: 0,
            zone_number: 0,
            movie: None,
            screen: collaborators.screen,
            audio: collaborators.audio,
            input: collaborators.input,
            resources: collaborators.resources,
            movies: collaborators.movies,
            config,
        }
    }

    /// Attach the overlay table list
    pub fn set_table_list(&mut self, tables: TableList) {
        self.tables = Some(tables);
    }

    pub fn opcodes(&self) -> &'static OpcodeTable {
        self.opcodes
    }

    pub fn current_table(&self) -> Option<CurrentTable> {
        self.current_table
    }

    pub fn condition(&self) -> bool {
        self.condition
    }

    pub(crate) fn set_condition(&mut self, value: bool) {
        self.condition = value;
    }

    pub(crate) fn set_script_return(&mut self, code: i16) {
        self.script_return = code;
    }

    pub(crate) fn zone_context(&self) -> ZoneLoadContext {
        ZoneLoadContext {
            variant: self.config.variant,
            platform: self.config.platform,
            talkie: self.config.talkie,
            scan_anims: self.config.variant.is_late() || self.video_lockout & LOCKOUT_PICTURE == 0,
        }
    }

    pub(crate) fn show_message(&mut self, text: &str) -> Result<(), String> {
        self.screen.print(text)?;
        Ok(())
    }

    // Operand readers. Each consumes operand bytes at the cursor.

    fn fetch_byte(&mut self) -> Result<u8, String> {
        let byte = *self
            .code
            .get(self.pc)
            .ok_or_else(|| format!("Script read past end of line at {}", self.pc))?;
        self.pc += 1;
        Ok(byte)
    }

    fn fetch_word(&mut self) -> Result<u16, String> {
        let hi = self.fetch_byte()?;
        let lo = self.fetch_byte()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn fetch_opcode(&mut self) -> Result<u16, String> {
        if self.opcodes.encoding().word_opcodes {
            self.fetch_word()
        } else {
            self.fetch_byte().map(u16::from)
        }
    }

    /// Word operand; values in the variable-reference range read a variable
    pub fn get_var_or_word(&mut self) -> Result<u16, String> {
        let value = self.fetch_word()?;
        let (min, max) = self.config.profile().var_ref_range;
        if value >= min && value < max {
            Ok(self.state.read_variable(value - min))
        } else {
            Ok(value)
        }
    }

    /// Byte operand; 0xFF reads the variable named by the next byte
    pub fn get_var_or_byte(&mut self) -> Result<u16, String> {
        if self.opcodes.encoding().word_opcodes {
            return self.get_var_or_word();
        }
        let value = self.fetch_byte()?;
        if value != 0xFF {
            return Ok(value as u16);
        }
        let var = self.fetch_byte()?;
        Ok(self.state.read_variable(var as u16))
    }

    /// A variable number
    pub fn get_var_wrapper(&mut self) -> Result<u16, String> {
        if self.opcodes.encoding().word_var_refs {
            self.get_var_or_word()
        } else {
            self.get_var_or_byte()
        }
    }

    pub fn get_next_var_contents(&mut self) -> Result<u16, String> {
        let var = self.get_var_wrapper()?;
        Ok(self.state.read_variable(var))
    }

    pub fn write_next_var_contents(&mut self, value: u16) -> Result<(), String> {
        let var = self.get_var_wrapper()?;
        self.state.write_variable(var, value);
        Ok(())
    }

    pub fn get_next_word(&mut self) -> Result<i16, String> {
        self.fetch_word().map(|w| w as i16)
    }

    /// Item operand, resolving the subject/object/player sentinels
    pub fn get_next_item_ptr(&mut self) -> Result<Option<ItemId>, String> {
        let value = self.get_next_word()?;
        Ok(match value {
            -1 => self.state.subject_item,
            -3 => self.state.object_item,
            -5 | -7 => Some(self.state.me()),
            -9 => self.state.player_parent(),
            id => self.state.item_ref(id as u16),
        })
    }

    /// Item operand for hit areas, where -5 and -9 stay symbolic
    pub fn get_next_item_ptr_strange(&mut self) -> Result<Option<HitItem>, String> {
        let value = self.get_next_word()?;
        Ok(match value {
            -1 => self.state.subject_item.map(HitItem::Item),
            -3 => self.state.object_item.map(HitItem::Item),
            -5 => Some(HitItem::EmptyHands),
            -7 => None,
            -9 => Some(HitItem::PlayerContainer),
            id => self.state.item_ref(id as u16).map(HitItem::Item),
        })
    }

    /// Item operand as a bare id, 0 for none
    pub fn get_next_item_id(&mut self) -> Result<ItemId, String> {
        let value = self.get_next_word()?;
        Ok(match value {
            -1 => self.state.subject_item.unwrap_or(NO_ITEM),
            -3 => self.state.object_item.unwrap_or(NO_ITEM),
            -5 => self.state.me(),
            -7 => NO_ITEM,
            -9 => self.state.items.parent_of(self.state.me()),
            id => id as u16,
        })
    }

    pub fn get_next_string_id(&mut self) -> Result<u16, String> {
        self.fetch_word()
    }

    /// Run the code of one line from the cursor
    fn run_script(&mut self) -> Result<ScriptResult, String> {
        let encoding = self.opcodes.encoding();
        if self.state.quit_requested {
            return Ok(ScriptResult::Quit);
        }
        loop {
            let start = self.pc;
            let mut opcode = self.fetch_opcode()?;
            if opcode == encoding.end {
                return Ok(ScriptResult::Continue);
            }
            let mut inverted = false;
            if opcode == encoding.invert {
                inverted = true;
                opcode = self.fetch_opcode()?;
                if opcode == encoding.end {
                    return Ok(ScriptResult::Continue);
                }
            }

            self.condition = true;
            self.script_return = 0;

            let entry = match self.opcodes.get(opcode) {
                Some(entry) => *entry,
                None => {
                    error!("Invalid opcode {opcode} at offset {start}");
                    return Err(format!("Invalid opcode '{opcode}'"));
                }
            };
            debug!("{:04} {}{}", start, if inverted { "!" } else { "" }, entry.name);
            (entry.handler)(self)?;

            if self.state.quit_requested {
                return Ok(ScriptResult::Quit);
            }
            if self.condition == inverted || self.script_return != 0 {
                return Ok(ScriptResult::from_code(self.script_return));
            }
        }
    }

    /// Run a single line of code outside any subroutine
    pub fn run_line(&mut self, code: Vec<u8>) -> Result<ScriptResult, String> {
        let saved_code = std::mem::replace(&mut self.code, code);
        let saved_pc = std::mem::replace(&mut self.pc, 0);
        let result = self.run_script();
        self.code = saved_code;
        self.pc = saved_pc;
        result
    }

    /// Whether a line of subroutine `id` is selected by the script words.
    /// Only subroutine 0 filters; -1 matches anything and -2 matches -1.
    fn line_selected(&self, id: u16, line: &ResolvedLine) -> bool {
        fn matches(pattern: i16, word: i16) -> bool {
            pattern == -1 || pattern == word || (pattern == -2 && word == -1)
        }
        id != VERB_SUBROUTINE
            || (matches(line.verb, self.state.verb)
                && matches(line.noun1, self.state.noun1)
                && matches(line.noun2, self.state.noun2))
    }

    /// Execute a subroutine. The caller's cursor and current table are
    /// restored afterwards.
    pub fn start_subroutine(&mut self, sub: &ResolvedSubroutine) -> Result<ScriptResult, String> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            error!("Subroutine {} nested deeper than {MAX_RECURSION_DEPTH}", sub.id);
            return Err("Recursion error".to_string());
        }
        if log_enabled!(Level::Trace) {
            match disassemble_subroutine(self.opcodes, sub) {
                Ok(listing) => trace!("Subroutine {}:\n{listing}", sub.id),
                Err(e) => trace!("Subroutine {}: {e}", sub.id),
            }
        }

        self.recursion_depth += 1;
        let saved_code = std::mem::take(&mut self.code);
        let saved_pc = self.pc;
        let saved_table = self.current_table.replace(CurrentTable {
            id: sub.id,
            from_overlay: sub.origin.is_overlay(),
        });

        let result = self.run_lines(sub);

        self.code = saved_code;
        self.pc = saved_pc;
        self.current_table = saved_table;
        self.recursion_depth -= 1;
        result
    }

    fn run_lines(&mut self, sub: &ResolvedSubroutine) -> Result<ScriptResult, String> {
        'restart: loop {
            if self.state.quit_requested {
                return Ok(ScriptResult::Quit);
            }
            let mut result = ScriptResult::ReturnToCaller(-1);
            for line in &sub.lines {
                if !self.line_selected(sub.id, line) {
                    continue;
                }
                self.code.clone_from(&line.code);
                self.pc = 0;
                result = self.run_script()?;
                match result {
                    ScriptResult::Continue => {}
                    ScriptResult::Restart => {
                        debug!("Subroutine {} restarting", sub.id);
                        continue 'restart;
                    }
                    _ => break,
                }
            }
            return Ok(result);
        }
    }

    /// Look up a subroutine, loading its overlay when it is not resident
    pub fn find_subroutine(&mut self, id: u16) -> Result<Option<ResolvedSubroutine>, String> {
        if let Some(sub) = self.subroutines.resolve(id) {
            return Ok(Some(sub));
        }
        if self.load_tables(id)? {
            if let Some(sub) = self.subroutines.resolve(id) {
                return Ok(Some(sub));
            }
        }
        debug!("Subroutine {id} not found");
        Ok(None)
    }

    /// Run a subroutine by id; None when it does not exist
    pub fn run_subroutine(&mut self, id: u16) -> Result<Option<ScriptResult>, String> {
        match self.find_subroutine(id)? {
            Some(sub) => self.start_subroutine(&sub).map(Some),
            None => Ok(None),
        }
    }

    /// Load the overlay holding subroutine `id`
    pub fn load_tables(&mut self, id: u16) -> Result<bool, String> {
        let list = match &self.tables {
            Some(list) => list,
            None => return Ok(false),
        };
        load_tables_into_mem(
            id,
            list,
            &mut self.subroutines,
            self.opcodes,
            &self.config,
            self.resources.as_mut(),
            self.audio.as_mut(),
        )
    }

    /// Dispatch a verb with the items of the clicked boxes
    pub fn handle_verb_clicked(
        &mut self,
        verb: u16,
        subject: Option<HitItem>,
        object: Option<HitItem>,
    ) -> Result<(), String> {
        if self.state.quit_requested {
            return Ok(());
        }
        self.state.hit_area_subject_item = subject;
        self.state.hit_area_object_item = object;
        self.state.subject_item = self.state.resolve_hit_item(subject);
        self.state.object_item = self.state.resolve_hit_item(object);

        let (adj1, noun1) = self.item_words(self.state.subject_item);
        let (adj2, noun2) = self.item_words(self.state.object_item);
        self.state.adj1 = adj1;
        self.state.noun1 = noun1;
        self.state.adj2 = adj2;
        self.state.noun2 = noun2;
        self.state.verb = verb as i16;
        debug!("Verb {verb}: noun1 {noun1}, noun2 {noun2}");

        let sub = match self.find_subroutine(VERB_SUBROUTINE)? {
            Some(sub) => sub,
            None => {
                warn!("No verb subroutine");
                return Ok(());
            }
        };
        if self.start_subroutine(&sub)? == ScriptResult::ReturnToCaller(-1) {
            self.show_message("I don't understand\n")?;
        }
        if let Some(sub) = self.find_subroutine(AFTER_VERB_SUBROUTINE)? {
            self.start_subroutine(&sub)?;
        }
        Ok(())
    }

    /// (adjective, noun) of an item as script words, -1 for none
    pub(crate) fn item_words(&self, item: Option<ItemId>) -> (i16, i16) {
        match self.state.item(item) {
            Some(i) => (i.adjective as i16, i.noun as i16),
            None => (-1, -1),
        }
    }

    /// Run the game: the start subroutine, then clicks until quit
    pub fn run(&mut self) -> Result<(), String> {
        let start = self.config.start_subroutine;
        info!("Starting {} at subroutine {start}", self.config.variant);
        if self.run_subroutine(start)?.is_none() {
            warn!("Start subroutine {start} not found");
        }

        let id_var = self.config.profile().hit_area_id_var as u16;
        while !self.state.quit_requested {
            let input = self.input.poll();
            if input.quit {
                info!("Quit requested");
                self.state.quit_requested = true;
                break;
            }
            if !input.left_button {
                continue;
            }
            let area = match self.hit_areas.find_at(input.mouse_x, input.mouse_y) {
                Some(area) if area.verb != 0 => area.clone(),
                _ => {
                    debug!("Click at ({},{}) hits no box", input.mouse_x, input.mouse_y);
                    continue;
                }
            };
            self.state.write_variable(id_var, area.id);
            self.handle_verb_clicked(area.verb & !VERB_BIT_ALTERNATE, area.item, None)?;
        }
        self.audio.stop_all();
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{GameVariant, Platform};
    use crate::display_trait::DisplayError;
    use crate::input::InputState;
    use crate::item::{ChildBlock, Item, SubObject, SubRoom};
    use crate::subroutine::SubroutineOrigin;
    use crate::world::{ItemGraph, StringTable, PLAYER_ITEM};
    use std::cell::RefCell;
    use std::rc::Rc;
    use test_log::test;

    /// Screen whose output stays readable after it is boxed
    #[derive(Clone, Default)]
    pub(crate) struct SharedScreen(pub Rc<RefCell<HeadlessScreen>>);

    impl Screen for SharedScreen {
        fn clear_screen(&mut self) -> Result<(), DisplayError> {
            self.0.borrow_mut().clear_screen()
        }

        fn print(&mut self, text: &str) -> Result<(), DisplayError> {
            self.0.borrow_mut().print(text)
        }

        fn blit(&mut self, x: u16, y: u16, w: u16, h: u16, pixels: &[u8]) -> Result<(), DisplayError> {
            self.0.borrow_mut().blit(x, y, w, h, pixels)
        }

        fn get_screen_size(&self) -> (u16, u16) {
            self.0.borrow().get_screen_size()
        }
    }

    /// Room 2 holding the player, object 3 in the room, room 4 elsewhere
    pub(crate) fn create_test_world() -> WorldData {
        let mut items = ItemGraph::new(10);
        let mut room = Item::new(0, 20);
        room.attach(ChildBlock::Room(SubRoom {
            subroutine_id: 0,
            exit_states: 0,
            exits: vec![],
        }))
        .unwrap();
        items.insert(2, room).unwrap();
        let mut lamp = Item::new(5, 30);
        lamp.attach(ChildBlock::Object(SubObject::new(0b11, vec![7, 8], Some(1))))
            .unwrap();
        items.insert(3, lamp).unwrap();
        items.insert(4, Item::new(0, 21)).unwrap();
        items.set_item_parent(PLAYER_ITEM, 2).unwrap();
        items.set_item_parent(3, 2).unwrap();
        WorldData {
            items,
            strings: StringTable::from_strings(vec!["".into(), "lamp".into(), "Hello".into()]),
            subroutines: SubroutineTable::new(10_000),
        }
    }

    pub(crate) fn create_test_interpreter(variant: GameVariant) -> (Interpreter, SharedScreen) {
        let screen = SharedScreen::default();
        let mut config = GameConfig::new(variant, Platform::Dos);
        config.seed = Some(1);
        config.zone_memory_size = 4096;
        let mut collaborators = Collaborators::headless();
        collaborators.screen = Box::new(screen.clone());
        let interp = Interpreter::new(config, create_test_world(), collaborators);
        (interp, screen)
    }

    #[test]
    fn test_condition_stops_line() {
        let (mut interp, screen) = create_test_interpreter(GameVariant::Simon1);
        // let v1 = 5; eq v1, 4 (false); let v2 = 9
        let code = vec![42, 1, 0, 5, 13, 1, 0, 4, 42, 2, 0, 9, 0xFF];
        assert_eq!(interp.run_line(code).unwrap(), ScriptResult::Continue);
        assert_eq!(interp.state.read_variable(1), 5);
        assert_eq!(interp.state.read_variable(2), 0);
        assert_eq!(screen.0.borrow().get_output(), "");
    }

    #[test]
    fn test_inverted_condition_continues() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        // !eq v1, 4; let v2 = 9
        let code = vec![0, 13, 1, 0, 4, 42, 2, 0, 9, 0xFF];
        interp.run_line(code).unwrap();
        assert_eq!(interp.state.read_variable(2), 9);
    }

    #[test]
    fn test_operand_readers() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        interp.state.write_variable(7, 1234);
        interp.state.subject_item = Some(3);
        interp.code = vec![
            0xFF, 7, // indirect byte
            0x75, 0x37, // 30007 reads v7
            0xFF, 0xFF, // -1 subject
            0xFF, 0xF7, // -9 player's parent
            0xFF, 0xFB, // -5 empty hands (strange)
        ];
        interp.pc = 0;
        assert_eq!(interp.get_var_or_byte().unwrap(), 1234);
        assert_eq!(interp.get_var_or_word().unwrap(), 1234);
        assert_eq!(interp.get_next_item_ptr().unwrap(), Some(3));
        assert_eq!(interp.get_next_item_ptr().unwrap(), Some(2));
        assert_eq!(interp.get_next_item_ptr_strange().unwrap(), Some(HitItem::EmptyHands));
        assert!(interp.get_next_word().is_err());
    }

    #[test]
    fn test_unknown_opcode_fatal() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        assert!(interp.run_line(vec![250, 0xFF]).is_err());
    }

    #[test]
    fn test_verb_subroutine_line_matching() {
        let (mut interp, screen) = create_test_interpreter(GameVariant::Simon1);
        let sub = interp
            .subroutines
            .create_subroutine(VERB_SUBROUTINE, SubroutineOrigin::GameData);
        // verb 7 with any noun1 and no object: message str2
        interp
            .subroutines
            .add_line(sub, 7, -1, -2, &[63, 0, 2, 0xFF])
            .unwrap();

        interp
            .handle_verb_clicked(7, Some(HitItem::Item(3)), None)
            .unwrap();
        assert_eq!(interp.state.noun1, 30);
        assert_eq!(interp.state.noun2, -1);
        assert_eq!(screen.0.borrow().get_output(), "Hello");

        screen.0.borrow_mut().clear_screen().unwrap();
        interp
            .handle_verb_clicked(8, Some(HitItem::Item(3)), None)
            .unwrap();
        assert_eq!(screen.0.borrow().get_output(), "I don't understand");
    }

    #[test]
    fn test_recursion_limit() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        let sub = interp.subroutines.create_subroutine(5, SubroutineOrigin::GameData);
        // process 5
        interp.subroutines.add_line(sub, 0, 0, 0, &[71, 0, 5, 0xFF]).unwrap();
        let result = interp.run_subroutine(5);
        assert!(result.is_err());
        assert_eq!(interp.recursion_depth, 0);
    }

    #[test]
    fn test_run_dispatches_clicks() {
        let (mut interp, screen) = create_test_interpreter(GameVariant::Simon1);
        interp.input = Box::new(ScriptedInput::new(vec![
            InputState::click(1, 1),
            InputState::click(15, 15),
        ]));
        let start = interp.subroutines.create_subroutine(101, SubroutineOrigin::GameData);
        // addBox 10 at (10,10) 20x20, item lamp, verb 7
        interp
            .subroutines
            .add_line(
                start,
                0,
                0,
                0,
                &[107, 0, 10, 0, 10, 0, 10, 0, 20, 0, 20, 0, 3, 0, 7, 0xFF],
            )
            .unwrap();
        let verbs = interp
            .subroutines
            .create_subroutine(VERB_SUBROUTINE, SubroutineOrigin::GameData);
        interp
            .subroutines
            .add_line(verbs, 7, 30, -1, &[64, 0, 1, 0xFF])
            .unwrap();

        interp.run().unwrap();
        assert!(interp.state.quit_requested);
        assert_eq!(screen.0.borrow().get_output(), "lamp");
        assert_eq!(interp.state.read_variable(60), 10);
    }
}
