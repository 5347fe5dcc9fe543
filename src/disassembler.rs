use crate::instruction::Instruction;
use crate::opcode_tables::OpcodeTable;
use crate::subroutine::{ResolvedSubroutine, SubroutineOrigin};
use std::fmt::Write;

/// Renders script code as text, using the operand formats of one variant
pub struct Disassembler<'a> {
    table: &'a OpcodeTable,
}

impl<'a> Disassembler<'a> {
    pub fn new(table: &'a OpcodeTable) -> Self {
        Disassembler { table }
    }

    /// Decode every instruction of a line up to its end marker
    pub fn instructions(&self, code: &[u8]) -> Result<Vec<(usize, Instruction)>, String> {
        let mut out = Vec::new();
        let mut addr = 0;
        while addr < code.len() {
            match Instruction::decode(code, addr, self.table)? {
                Some(inst) => {
                    let size = inst.size;
                    out.push((addr, inst));
                    addr += size;
                }
                None => break,
            }
        }
        Ok(out)
    }

    /// One instruction per output line, prefixed with its offset
    pub fn disassemble_line(&self, code: &[u8]) -> Result<String, String> {
        let mut output = String::new();
        for (addr, inst) in self.instructions(code)? {
            writeln!(output, "{addr:04}: {inst}").map_err(|e| e.to_string())?;
        }
        Ok(output)
    }

    pub fn disassemble_subroutine(&self, sub: &ResolvedSubroutine) -> Result<String, String> {
        let mut output = String::new();
        let origin = match &sub.origin {
            SubroutineOrigin::GameData => "game data",
            SubroutineOrigin::Overlay(name) => name.as_str(),
        };
        writeln!(output, "Subroutine {} ({origin}), {} lines", sub.id, sub.lines.len())
            .map_err(|e| e.to_string())?;

        for (n, line) in sub.lines.iter().enumerate() {
            if sub.id == 0 {
                writeln!(
                    output,
                    "line {n}: verb {} noun1 {} noun2 {}",
                    line.verb, line.noun1, line.noun2
                )
            } else {
                writeln!(output, "line {n}:")
            }
            .map_err(|e| e.to_string())?;

            // An undecodable line still shows what came before the fault
            match self.disassemble_line(&line.code) {
                Ok(text) => {
                    for l in text.lines() {
                        writeln!(output, "    {l}").map_err(|e| e.to_string())?;
                    }
                }
                Err(e) => writeln!(output, "    <{e}>").map_err(|e| e.to_string())?,
            }
        }
        Ok(output)
    }
}

/// Disassemble the code of one line
pub fn disassemble_line(table: &OpcodeTable, code: &[u8]) -> Result<String, String> {
    Disassembler::new(table).disassemble_line(code)
}

/// Disassemble every line of a subroutine
pub fn disassemble_subroutine(table: &OpcodeTable, sub: &ResolvedSubroutine) -> Result<String, String> {
    Disassembler::new(table).disassemble_subroutine(sub)
}
