//! Bit flag opcodes
//!
//! `bSet`..`bNotZero` address the primary flag array through a variable
//! operand; the `b2` group addresses the secondary array with a byte.

use crate::config::GameVariant;
use crate::interpreter::Interpreter;
use log::{debug, warn};

/// Subroutine of the first game whose `bZero` tests the wrong flag
const MISNUMBERED_FLAG_TABLE: u16 = 2962;
const MISNUMBERED_FLAG: u16 = 63;
const INTENDED_FLAG: u16 = 50;

impl Interpreter {
    /// 153
    pub(crate) fn o_b_set(&mut self) -> Result<(), String> {
        let bit = self.get_var_wrapper()?;
        debug!("bSet {bit}");
        self.state.flags.set(bit, true);
        Ok(())
    }

    /// 154
    pub(crate) fn o_b_clear(&mut self) -> Result<(), String> {
        let bit = self.get_var_wrapper()?;
        debug!("bClear {bit}");
        self.state.flags.set(bit, false);
        Ok(())
    }

    /// 155: flag is clear
    pub(crate) fn o_b_zero(&mut self) -> Result<(), String> {
        let mut bit = self.get_var_wrapper()?;
        let in_misnumbered_table = self.current_table().map_or(false, |t| {
            t.id == MISNUMBERED_FLAG_TABLE && t.from_overlay
        });
        if self.config.variant == GameVariant::Simon1
            && in_misnumbered_table
            && bit == MISNUMBERED_FLAG
        {
            warn!("bZero: subroutine {MISNUMBERED_FLAG_TABLE} tests flag {bit}, using {INTENDED_FLAG}");
            bit = INTENDED_FLAG;
        }
        self.set_condition(!self.state.flags.get(bit));
        Ok(())
    }

    /// 156
    pub(crate) fn o_b_not_zero(&mut self) -> Result<(), String> {
        let bit = self.get_var_wrapper()?;
        self.set_condition(self.state.flags.get(bit));
        Ok(())
    }

    /// 166
    pub(crate) fn o_b2_set(&mut self) -> Result<(), String> {
        let bit = self.get_var_or_byte()?;
        self.state.flags.set2(bit, true);
        Ok(())
    }

    /// 167
    pub(crate) fn o_b2_clear(&mut self) -> Result<(), String> {
        let bit = self.get_var_or_byte()?;
        self.state.flags.set2(bit, false);
        Ok(())
    }

    /// 168
    pub(crate) fn o_b2_zero(&mut self) -> Result<(), String> {
        let bit = self.get_var_or_byte()?;
        self.set_condition(!self.state.flags.get2(bit));
        Ok(())
    }

    /// 169
    pub(crate) fn o_b2_not_zero(&mut self) -> Result<(), String> {
        let bit = self.get_var_or_byte()?;
        self.set_condition(self.state.flags.get2(bit));
        Ok(())
    }
}
