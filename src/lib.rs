#![allow(dead_code)]

#[macro_use]
extern crate lazy_static;

pub mod audio;
pub mod config;
pub mod disassembler;
pub mod display_crossterm;
pub mod display_headless;
pub mod display_manager;
pub mod display_trait;
pub mod flags;
pub mod hit_area;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod item;
pub mod movie;
pub mod opcode_tables;
mod opcodes_display;
mod opcodes_flow;
mod opcodes_math;
mod opcodes_memory;
mod opcodes_object;
mod opcodes_rooms;
mod opcodes_zone;
pub mod reader;
pub mod resource;
pub mod rng;
pub mod rooms;
pub mod subroutine;
pub mod tables;
pub mod vm;
pub mod world;
pub mod zone;

/*
Layout of a world data file
        00000   header: item array size, version, inited items, string count
        00010   text block size, then the text block
        .....   items, each with its chained child blocks
        .....   subroutine block: ids, each followed by its lines of code
Overlay files hold only a subroutine block.
*/
