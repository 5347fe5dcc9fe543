//! Builders for game data images and a screen whose output can be read back
//! after the interpreter owns it.

#![allow(dead_code)]

use grimoire::audio::NullMixer;
use grimoire::config::{GameConfig, GameVariant, Platform};
use grimoire::display_headless::HeadlessScreen;
use grimoire::display_trait::{DisplayError, Screen};
use grimoire::input::{InputState, ScriptedInput};
use grimoire::interpreter::{Collaborators, Interpreter};
use grimoire::movie::NoMovies;
use grimoire::opcode_tables::OpcodeTable;
use grimoire::resource::MemoryStore;
use grimoire::world::load_game_data;
use std::cell::RefCell;
use std::rc::Rc;

pub fn push_u16(v: &mut Vec<u8>, x: u16) {
    v.extend_from_slice(&x.to_be_bytes());
}

pub fn push_u32(v: &mut Vec<u8>, x: u32) {
    v.extend_from_slice(&x.to_be_bytes());
}

/// Item id as stored in the file
pub fn item_ref(id: u16) -> u32 {
    if id == 0 {
        0xFFFF_FFFF
    } else {
        id as u32 - 2
    }
}

/// One item record with its child blocks, each given as (tag, payload)
pub struct ItemRecord {
    pub adjective: u16,
    pub noun: u16,
    pub next: u16,
    pub child: u16,
    pub parent: u16,
    pub children: Vec<(u16, Vec<u8>)>,
}

impl ItemRecord {
    pub fn new(noun: u16) -> Self {
        ItemRecord {
            adjective: 0,
            noun,
            next: 0,
            child: 0,
            parent: 0,
            children: Vec::new(),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_u16(out, self.adjective);
        push_u16(out, self.noun);
        push_u16(out, 0);
        push_u32(out, item_ref(self.next));
        push_u32(out, item_ref(self.child));
        push_u32(out, item_ref(self.parent));
        push_u16(out, 0);
        if self.children.is_empty() {
            push_u32(out, 0);
            return;
        }
        push_u32(out, 1);
        for (tag, payload) in &self.children {
            push_u16(out, *tag);
            out.extend_from_slice(payload);
        }
        push_u16(out, 0);
    }
}

/// A subroutine of byte-encoded lines; subroutine 0 lines carry
/// (verb, noun1, noun2) in front of the code
pub struct SubroutineRecord {
    pub id: u16,
    pub lines: Vec<(Option<(i16, i16, i16)>, Vec<u8>)>,
}

impl SubroutineRecord {
    pub fn new(id: u16, lines: Vec<Vec<u8>>) -> Self {
        SubroutineRecord {
            id,
            lines: lines.into_iter().map(|code| (None, code)).collect(),
        }
    }
}

pub fn subroutine_block(subs: &[SubroutineRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    for sub in subs {
        push_u16(&mut out, 0);
        push_u16(&mut out, sub.id);
        for (words, code) in &sub.lines {
            push_u16(&mut out, 0);
            if let Some((verb, noun1, noun2)) = words {
                for w in [*verb, *noun1, *noun2] {
                    push_u16(&mut out, w as u16);
                }
            }
            out.extend_from_slice(code);
        }
        push_u16(&mut out, 1);
    }
    push_u16(&mut out, 1);
    out
}

/// A complete world data file
pub fn world_image(strings: &[&str], items: &[ItemRecord], subs: &[SubroutineRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, items.len() as u32);
    push_u32(&mut out, 0x80);
    push_u32(&mut out, items.len() as u32);
    push_u32(&mut out, strings.len() as u32 - 2);

    let mut text = Vec::new();
    for s in strings {
        text.extend_from_slice(s.as_bytes());
        text.push(0);
    }
    push_u32(&mut out, text.len() as u32);
    out.extend_from_slice(&text);

    for item in items {
        item.write(&mut out);
    }
    out.extend_from_slice(&subroutine_block(subs));
    out
}

/// Table list file naming each overlay with one id range
pub fn table_list(entries: &[(&str, u16, u16)]) -> Vec<u8> {
    let mut out = vec![0; 32];
    for (name, min, max) in entries {
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        push_u16(&mut out, *min);
        push_u16(&mut out, *max);
        push_u16(&mut out, 0);
    }
    out.push(0);
    out
}

/// Build a line of code from pieces
pub fn line(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

/// An `I` operand naming a concrete item
pub fn item_operand(id: u16) -> Vec<u8> {
    let mut out = vec![0, 0];
    push_u32(&mut out, item_ref(id));
    out
}

/// A `T` operand naming a string
pub fn string_operand(id: u16) -> Vec<u8> {
    let mut out = vec![0, 1];
    push_u32(&mut out, id as u32);
    out
}

pub const STRINGS: [&str; 4] = ["", "lamp", "You see a lamp", "north"];

pub const HALL: u16 = 2;
pub const CELLAR: u16 = 3;
pub const LAMP: u16 = 4;
pub const GRID: u16 = 5;
pub const CHEST: u16 = 6;
pub const COIN: u16 = 7;

/// Hall and cellar joined north/south, a lamp in the hall, a 2x1x1 grid,
/// a chest with user flags and a loose coin
pub fn sample_items() -> Vec<ItemRecord> {
    let mut hall = ItemRecord::new(20);
    hall.child = LAMP;
    let mut room = Vec::new();
    push_u16(&mut room, 50);
    push_u16(&mut room, 1);
    push_u32(&mut room, item_ref(CELLAR));
    hall.children.push((1, room));

    let mut cellar = ItemRecord::new(21);
    let mut room = Vec::new();
    push_u16(&mut room, 0);
    push_u16(&mut room, 1 << 4);
    push_u32(&mut room, item_ref(HALL));
    cellar.children.push((1, room));

    let mut lamp = ItemRecord::new(30);
    lamp.adjective = 5;
    lamp.parent = HALL;
    let mut object = Vec::new();
    push_u32(&mut object, 0b110);
    push_u16(&mut object, 7);
    push_u16(&mut object, 8);
    push_u32(&mut object, 1);
    lamp.children.push((2, object));

    let mut grid = ItemRecord::new(22);
    let mut super_room = Vec::new();
    for w in [60, 2, 1, 1, 0, 0] {
        push_u16(&mut super_room, w);
    }
    grid.children.push((4, super_room));

    let mut chest = ItemRecord::new(23);
    let mut container = Vec::new();
    push_u16(&mut container, 10);
    push_u16(&mut container, 0);
    chest.children.push((7, container));
    let mut user = Vec::new();
    for w in [1, 2, 3, 4] {
        push_u16(&mut user, w);
    }
    chest.children.push((9, user));

    vec![hall, cellar, lamp, grid, chest, ItemRecord::new(31)]
}

/// Screen whose output stays readable after it is boxed
#[derive(Clone, Default)]
pub struct SharedScreen(pub Rc<RefCell<HeadlessScreen>>);

impl SharedScreen {
    pub fn output(&self) -> String {
        self.0.borrow().get_output()
    }
}

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

pub fn test_config(variant: GameVariant) -> GameConfig {
    let mut config = GameConfig::new(variant, Platform::Dos);
    config.seed = Some(7);
    config.zone_memory_size = 100;
    config
}

/// Load an image and wrap it in an interpreter with in-memory files and
/// scripted input
pub fn create_interpreter(
    config: GameConfig,
    image: &[u8],
    files: MemoryStore,
    input: Vec<InputState>,
) -> (Interpreter, SharedScreen) {
    let table = OpcodeTable::for_variant(config.variant);
    let world = load_game_data(image, config.variant, table, config.tables_heap_size)
        .expect("image loads");
    let screen = SharedScreen::default();
    let collaborators = Collaborators {
        screen: Box::new(screen.clone()),
        audio: Box::new(NullMixer::new()),
        input: Box::new(ScriptedInput::new(input)),
        resources: Box::new(files),
        movies: Box::new(NoMovies),
    };
    (Interpreter::new(config, world, collaborators), screen)
}
