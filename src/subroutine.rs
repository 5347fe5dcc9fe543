//! Compiled subroutines and the tables heap that holds their code
//!
//! Subroutines form a list with the most recently loaded at the front, so an
//! overlay can shadow nothing but is always found after a fresh load. Lines of
//! a subroutine keep file order and chain through `next`.

use crate::instruction::OperandKind;
use crate::opcode_tables::OpcodeTable;
use crate::reader::ByteReader;
use log::{debug, error, info};
use std::ops::Range;

/// Where a subroutine was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubroutineOrigin {
    /// The main world data file
    GameData,
    /// A named overlay table file
    Overlay(String),
}

impl SubroutineOrigin {
    pub fn is_overlay(&self) -> bool {
        matches!(self, SubroutineOrigin::Overlay(_))
    }
}

#[derive(Debug, Clone)]
pub struct Subroutine {
    pub id: u16,
    pub origin: SubroutineOrigin,
    /// First line, index into the line list
    pub first_line: Option<usize>,
    last_line: Option<usize>,
    /// Next subroutine in the list
    pub next: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SubroutineLine {
    pub verb: i16,
    pub noun1: i16,
    pub noun2: i16,
    /// Code bytes in the tables heap
    pub code: Range<usize>,
    pub next: Option<usize>,
}

/// Fixed-capacity byte heap for expanded line code
#[derive(Debug)]
pub struct TablesHeap {
    bytes: Vec<u8>,
    capacity: usize,
}

impl TablesHeap {
    pub fn new(capacity: usize) -> Self {
        TablesHeap {
            bytes: Vec::new(),
            capacity,
        }
    }

    pub fn used(&self) -> usize {
        self.bytes.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy `data` into the heap
    pub fn allocate(&mut self, data: &[u8]) -> Result<Range<usize>, String> {
        let start = self.bytes.len();
        if start + data.len() > self.capacity {
            error!(
                "Tables heap overflow: {} + {} > {}",
                start,
                data.len(),
                self.capacity
            );
            return Err("Out of table memory".to_string());
        }
        self.bytes.extend_from_slice(data);
        Ok(start..self.bytes.len())
    }

    pub fn slice(&self, range: Range<usize>) -> &[u8] {
        self.bytes.get(range).unwrap_or(&[])
    }

    fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }
}

/// One line copied out of the table for execution
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub verb: i16,
    pub noun1: i16,
    pub noun2: i16,
    pub code: Vec<u8>,
}

/// A subroutine copied out of the table; loading an overlay while it runs
/// cannot disturb its code
#[derive(Debug, Clone)]
pub struct ResolvedSubroutine {
    pub id: u16,
    pub origin: SubroutineOrigin,
    pub lines: Vec<ResolvedLine>,
}

#[derive(Debug, Clone, Copy)]
struct BaseSnapshot {
    subroutines: usize,
    lines: usize,
    head: Option<usize>,
    heap_used: usize,
}

/// All loaded subroutines
#[derive(Debug)]
pub struct SubroutineTable {
    subroutines: Vec<Subroutine>,
    lines: Vec<SubroutineLine>,
    head: Option<usize>,
    heap: TablesHeap,
    base: Option<BaseSnapshot>,
}

impl SubroutineTable {
    pub fn new(heap_capacity: usize) -> Self {
        SubroutineTable {
            subroutines: Vec::new(),
            lines: Vec::new(),
            head: None,
            heap: TablesHeap::new(heap_capacity),
            base: None,
        }
    }

    pub fn heap(&self) -> &TablesHeap {
        &self.heap
    }

    /// Create an empty subroutine at the front of the list
    pub fn create_subroutine(&mut self, id: u16, origin: SubroutineOrigin) -> usize {
        let index = self.subroutines.len();
        self.subroutines.push(Subroutine {
            id,
            origin,
            first_line: None,
            last_line: None,
            next: self.head,
        });
        self.head = Some(index);
        index
    }

    /// Append a line with already expanded code to a subroutine
    pub fn add_line(
        &mut self,
        sub: usize,
        verb: i16,
        noun1: i16,
        noun2: i16,
        code: &[u8],
    ) -> Result<(), String> {
        if sub >= self.subroutines.len() {
            return Err(format!("add_line: no subroutine at index {sub}"));
        }
        let range = self.heap.allocate(code)?;
        let index = self.lines.len();
        self.lines.push(SubroutineLine {
            verb,
            noun1,
            noun2,
            code: range,
            next: None,
        });
        let s = &mut self.subroutines[sub];
        match s.last_line {
            Some(last) => self.lines[last].next = Some(index),
            None => s.first_line = Some(index),
        }
        s.last_line = Some(index);
        Ok(())
    }

    /// Iterate the subroutine list front to back
    pub fn iter(&self) -> impl Iterator<Item = &Subroutine> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let index = cursor?;
            let sub = &self.subroutines[index];
            cursor = sub.next;
            Some(sub)
        })
    }

    /// Index of the first subroutine with this id
    pub fn find(&self, id: u16) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            if self.subroutines[index].id == id {
                return Some(index);
            }
            cursor = self.subroutines[index].next;
        }
        None
    }

    pub fn contains(&self, id: u16) -> bool {
        self.find(id).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&Subroutine> {
        self.subroutines.get(index)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Lines of a subroutine in file order
    pub fn lines_of(&self, index: usize) -> impl Iterator<Item = &SubroutineLine> + '_ {
        let mut cursor = self.subroutines.get(index).and_then(|s| s.first_line);
        std::iter::from_fn(move || {
            let line = &self.lines[cursor?];
            cursor = line.next;
            Some(line)
        })
    }

    pub fn code(&self, line: &SubroutineLine) -> &[u8] {
        self.heap.slice(line.code.clone())
    }

    /// Copy a subroutine out for execution
    pub fn resolve(&self, id: u16) -> Option<ResolvedSubroutine> {
        let index = self.find(id)?;
        let sub = &self.subroutines[index];
        let lines = self
            .lines_of(index)
            .map(|line| ResolvedLine {
                verb: line.verb,
                noun1: line.noun1,
                noun2: line.noun2,
                code: self.code(line).to_vec(),
            })
            .collect();
        Some(ResolvedSubroutine {
            id: sub.id,
            origin: sub.origin.clone(),
            lines,
        })
    }

    /// Record the current contents as the base that overlays load on top of
    pub fn remember_base(&mut self) {
        self.base = Some(BaseSnapshot {
            subroutines: self.subroutines.len(),
            lines: self.lines.len(),
            head: self.head,
            heap_used: self.heap.used(),
        });
    }

    /// Drop everything loaded after `remember_base`
    pub fn restore_base(&mut self) {
        let base = self.base.unwrap_or(BaseSnapshot {
            subroutines: 0,
            lines: 0,
            head: None,
            heap_used: 0,
        });
        self.subroutines.truncate(base.subroutines);
        self.lines.truncate(base.lines);
        self.head = base.head;
        self.heap.truncate(base.heap_used);
    }

    /// Parse a subroutine block: `while u16 == 0 { id; lines }`.
    /// Returns the number of subroutines read.
    pub fn read_block(
        &mut self,
        reader: &mut ByteReader,
        table: &OpcodeTable,
        origin: SubroutineOrigin,
    ) -> Result<usize, String> {
        let mut count = 0;
        while reader.read_u16()? == 0 {
            let id = reader.read_u16()?;
            let sub = self.create_subroutine(id, origin.clone());
            while reader.read_u16()? == 0 {
                self.read_line(reader, table, sub, id)?;
            }
            count += 1;
        }
        match &origin {
            SubroutineOrigin::GameData => info!("Loaded {count} subroutines from game data"),
            SubroutineOrigin::Overlay(name) => info!("Loaded {count} subroutines from {name}"),
        }
        Ok(count)
    }

    fn read_line(
        &mut self,
        reader: &mut ByteReader,
        table: &OpcodeTable,
        sub: usize,
        id: u16,
    ) -> Result<(), String> {
        let enc = table.encoding();
        let (mut verb, mut noun1, mut noun2) = (0, 0, 0);
        if id == 0 {
            verb = reader.read_i16()?;
            noun1 = reader.read_i16()?;
            noun2 = reader.read_i16()?;
        } else if enc.word_opcodes {
            reader.skip(6)?;
        }

        let mut code = Vec::new();
        loop {
            let opcode = if enc.word_opcodes {
                reader.read_u16()?
            } else {
                reader.read_u8()? as u16
            };
            push_opcode(&mut code, opcode, enc.word_opcodes);
            if opcode == enc.end {
                break;
            }
            if opcode == enc.invert {
                continue;
            }
            if !enc.word_opcodes && opcode == 87 {
                error!("Subroutine {id}: opcode 87 in line data");
                return Err("Unsupported opcode 87".to_string());
            }
            let entry = table
                .get(opcode)
                .ok_or_else(|| format!("Subroutine {id}: invalid opcode '{opcode}'"))?;
            for kind in OperandKind::parse_format(entry.args)? {
                expand_operand(reader, kind, table, &mut code)?;
            }
        }

        debug!("Subroutine {id}: line ({verb},{noun1},{noun2}) {} bytes", code.len());
        self.add_line(sub, verb, noun1, noun2, &code)
    }
}

fn push_opcode(code: &mut Vec<u8>, opcode: u16, word: bool) {
    if word {
        code.extend_from_slice(&opcode.to_be_bytes());
    } else {
        code.push(opcode as u8);
    }
}

fn push_word(code: &mut Vec<u8>, value: u16) {
    code.extend_from_slice(&value.to_be_bytes());
}

/// Expand one operand from its file form to its in-memory form
fn expand_operand(
    reader: &mut ByteReader,
    kind: OperandKind,
    table: &OpcodeTable,
    code: &mut Vec<u8>,
) -> Result<(), String> {
    let enc = table.encoding();
    match kind {
        OperandKind::VarOrByte | OperandKind::VarRef => {
            let word = match kind {
                OperandKind::VarOrByte => enc.word_opcodes,
                _ => enc.word_var_refs,
            };
            if word {
                push_word(code, reader.read_u16()?);
            } else {
                let b = reader.read_u8()?;
                code.push(b);
                if b == 0xFF {
                    code.push(reader.read_u8()?);
                }
            }
        }
        OperandKind::VarOrWord | OperandKind::Word => push_word(code, reader.read_u16()?),
        OperandKind::Item => {
            let selector = reader.read_u16()?;
            let value = match selector {
                1 => 0xFFFF,
                3 => 0xFFFD,
                5 => 0xFFFB,
                7 => 0xFFF9,
                9 => 0xFFF7,
                _ => reader.read_item_id()?,
            };
            push_word(code, value);
        }
        OperandKind::StringId => {
            let selector = reader.read_u16()?;
            let value = match selector {
                0 => 0xFFFF,
                3 => 0xFFFD,
                _ => reader.read_u32()? as u16,
            };
            push_word(code, value);
        }
    }
    Ok(())
}
