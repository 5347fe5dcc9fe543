use crate::opcode_tables::OpcodeTable;
use crate::reader::read_be_u16;
use std::fmt::{Display, Error, Formatter, Write};

/// Operand encodings named by the characters of an opcode's format string
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperandKind {
    /// 'B': byte, or 0xFF followed by a variable number
    VarOrByte,
    /// 'v': variable reference
    VarRef,
    /// 'N': word, values in the variable range read a variable
    VarOrWord,
    /// 'W': literal word
    Word,
    /// 'I': item reference or sentinel
    Item,
    /// 'T': string id
    StringId,
}

impl OperandKind {
    /// Parse one format character
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(OperandKind::VarOrByte),
            'v' => Some(OperandKind::VarRef),
            'N' => Some(OperandKind::VarOrWord),
            'W' => Some(OperandKind::Word),
            'I' => Some(OperandKind::Item),
            'T' => Some(OperandKind::StringId),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            OperandKind::VarOrByte => 'B',
            OperandKind::VarRef => 'v',
            OperandKind::VarOrWord => 'N',
            OperandKind::Word => 'W',
            OperandKind::Item => 'I',
            OperandKind::StringId => 'T',
        }
    }

    /// Parse a whole format string
    pub fn parse_format(format: &str) -> Result<Vec<OperandKind>, String> {
        format
            .chars()
            .map(|c| OperandKind::from_code(c).ok_or_else(|| format!("Bad operand format '{c}'")))
            .collect()
    }
}

/// How opcodes and operands are laid out in memory for a variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeEncoding {
    /// Opcodes and 'B' operands are words
    pub word_opcodes: bool,
    /// 'v' operands are words
    pub word_var_refs: bool,
    /// Prefix opcode that inverts the next condition
    pub invert: u16,
    /// Opcode that ends a line
    pub end: u16,
}

impl CodeEncoding {
    pub fn opcode_size(&self) -> usize {
        if self.word_opcodes {
            2
        } else {
            1
        }
    }
}

/// One decoded operand
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// Literal byte
    Byte(u8),
    /// Contents of a variable (0xFF-prefixed byte form)
    Indirect(u8),
    /// Word operand as stored
    Word(u16),
}

/// A decoded script instruction
#[derive(Debug, Clone)]
pub struct Instruction {
    pub opcode: u16,
    /// Preceded by the invert prefix
    pub inverted: bool,
    pub name: &'static str,
    pub operands: Vec<(OperandKind, Operand)>,
    /// Total size in bytes including any invert prefix
    pub size: usize,
}

fn read_opcode(code: &[u8], pos: usize, enc: &CodeEncoding) -> Result<u16, String> {
    if enc.word_opcodes {
        if pos + 2 > code.len() {
            return Err(format!("Instruction runs past end of line at {pos}"));
        }
        Ok(read_be_u16(code, pos))
    } else {
        code.get(pos)
            .map(|b| *b as u16)
            .ok_or_else(|| format!("Instruction runs past end of line at {pos}"))
    }
}

impl Instruction {
    /// Decode the instruction at `addr`. Returns None at the end-of-line
    /// marker.
    pub fn decode(code: &[u8], addr: usize, table: &OpcodeTable) -> Result<Option<Self>, String> {
        let enc = table.encoding();
        let mut pos = addr;
        let mut opcode = read_opcode(code, pos, &enc)?;
        pos += enc.opcode_size();
        let mut inverted = false;
        if opcode == enc.end {
            return Ok(None);
        }
        if opcode == enc.invert {
            inverted = true;
            opcode = read_opcode(code, pos, &enc)?;
            pos += enc.opcode_size();
            if opcode == enc.end {
                return Ok(None);
            }
        }

        let entry = table
            .get(opcode)
            .ok_or_else(|| format!("Invalid opcode '{opcode}' at offset {addr}"))?;

        let mut operands = Vec::new();
        for kind in OperandKind::parse_format(entry.args)? {
            let word_sized = match kind {
                OperandKind::VarOrByte => enc.word_opcodes,
                OperandKind::VarRef => enc.word_var_refs,
                _ => true,
            };
            let operand = if word_sized {
                if pos + 2 > code.len() {
                    return Err(format!("Operand runs past end of line at {pos}"));
                }
                let w = read_be_u16(code, pos);
                pos += 2;
                Operand::Word(w)
            } else {
                let b = *code
                    .get(pos)
                    .ok_or_else(|| format!("Operand runs past end of line at {pos}"))?;
                pos += 1;
                if b == 0xFF {
                    let v = *code
                        .get(pos)
                        .ok_or_else(|| format!("Operand runs past end of line at {pos}"))?;
                    pos += 1;
                    Operand::Indirect(v)
                } else {
                    Operand::Byte(b)
                }
            };
            operands.push((kind, operand));
        }

        Ok(Some(Instruction {
            opcode,
            inverted,
            name: entry.name,
            operands,
            size: pos - addr,
        }))
    }
}

fn item_sentinel_name(value: u16) -> Option<&'static str> {
    match value as i16 {
        -1 => Some("$subject"),
        -3 => Some("$object"),
        -5 => Some("me"),
        -7 => Some("actor"),
        -9 => Some("here"),
        _ => None,
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        if self.inverted {
            write!(f, "!")?;
        }
        write!(f, "{}", self.name)?;

        let mut text = String::new();
        for (i, (kind, op)) in self.operands.iter().enumerate() {
            text.push_str(if i == 0 { " " } else { ", " });
            match (kind, op) {
                (_, Operand::Byte(b)) => write!(text, "{b}")?,
                (_, Operand::Indirect(v)) => write!(text, "[v{v}]")?,
                (OperandKind::Item, Operand::Word(w)) => match item_sentinel_name(*w) {
                    Some(name) => text.push_str(name),
                    None => write!(text, "#{w}")?,
                },
                (OperandKind::StringId, Operand::Word(w)) => write!(text, "str{w}")?,
                (_, Operand::Word(w)) => write!(text, "{}", *w as i16)?,
            }
        }
        write!(f, "{text}")
    }
}
