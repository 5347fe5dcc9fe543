//! Variable arithmetic and comparison opcodes
//!
//! Variables are unsigned 16-bit; arithmetic wraps and comparisons are
//! unsigned. Division or modulo by zero is fatal.

use crate::interpreter::Interpreter;
use log::debug;

impl Interpreter {
    /// 11: variable is zero
    pub(crate) fn o_zero(&mut self) -> Result<(), String> {
        let value = self.get_next_var_contents()?;
        self.set_condition(value == 0);
        Ok(())
    }

    /// 12
    pub(crate) fn o_not_zero(&mut self) -> Result<(), String> {
        let value = self.get_next_var_contents()?;
        self.set_condition(value != 0);
        Ok(())
    }

    /// 13: variable equals a value
    pub(crate) fn o_eq(&mut self) -> Result<(), String> {
        let a = self.get_next_var_contents()?;
        let b = self.get_var_or_word()?;
        self.set_condition(a == b);
        Ok(())
    }

    /// 14
    pub(crate) fn o_not_eq(&mut self) -> Result<(), String> {
        let a = self.get_next_var_contents()?;
        let b = self.get_var_or_word()?;
        self.set_condition(a != b);
        Ok(())
    }

    /// 15
    pub(crate) fn o_gt(&mut self) -> Result<(), String> {
        let a = self.get_next_var_contents()?;
        let b = self.get_var_or_word()?;
        self.set_condition(a > b);
        Ok(())
    }

    /// 16
    pub(crate) fn o_lt(&mut self) -> Result<(), String> {
        let a = self.get_next_var_contents()?;
        let b = self.get_var_or_word()?;
        self.set_condition(a < b);
        Ok(())
    }

    /// 17: two variables are equal
    pub(crate) fn o_eqf(&mut self) -> Result<(), String> {
        let a = self.get_next_var_contents()?;
        let b = self.get_next_var_contents()?;
        self.set_condition(a == b);
        Ok(())
    }

    /// 18
    pub(crate) fn o_not_eqf(&mut self) -> Result<(), String> {
        let a = self.get_next_var_contents()?;
        let b = self.get_next_var_contents()?;
        self.set_condition(a != b);
        Ok(())
    }

    /// 19
    pub(crate) fn o_ltf(&mut self) -> Result<(), String> {
        let a = self.get_next_var_contents()?;
        let b = self.get_next_var_contents()?;
        self.set_condition(a < b);
        Ok(())
    }

    /// 20
    pub(crate) fn o_gtf(&mut self) -> Result<(), String> {
        let a = self.get_next_var_contents()?;
        let b = self.get_next_var_contents()?;
        self.set_condition(a > b);
        Ok(())
    }

    /// 23: percentage chance, biased against long runs of the same outcome
    pub(crate) fn o_chance(&mut self) -> Result<(), String> {
        let percent = self.get_var_or_word()?;
        if percent == 0 {
            self.set_condition(false);
            return Ok(());
        }
        if percent == 100 {
            self.set_condition(true);
            return Ok(());
        }

        let threshold = percent as i32 + self.state.chance_modifier;
        if threshold <= 0 {
            self.state.chance_modifier = 0;
            self.set_condition(false);
        } else if (self.rng.random_number(99) as i32) < threshold {
            if self.state.chance_modifier <= 0 {
                self.state.chance_modifier -= 5;
            } else {
                self.state.chance_modifier = 0;
            }
            self.set_condition(true);
        } else {
            if self.state.chance_modifier >= 0 {
                self.state.chance_modifier += 5;
            } else {
                self.state.chance_modifier = 0;
            }
            self.set_condition(false);
        }
        debug!("chance {percent}: modifier now {}", self.state.chance_modifier);
        Ok(())
    }

    /// 36: copy one variable into another
    pub(crate) fn o_copyff(&mut self) -> Result<(), String> {
        let value = self.get_next_var_contents()?;
        self.write_next_var_contents(value)
    }

    /// 41
    pub(crate) fn o_clear(&mut self) -> Result<(), String> {
        self.write_next_var_contents(0)
    }

    /// 42
    pub(crate) fn o_let(&mut self) -> Result<(), String> {
        let var = self.get_var_wrapper()?;
        let value = self.get_var_or_word()?;
        self.state.write_variable(var, value);
        Ok(())
    }

    /// Apply `op` to a variable and a word operand
    fn update_with_word(&mut self, op: fn(u16, u16) -> Option<u16>) -> Result<(), String> {
        let var = self.get_var_wrapper()?;
        let value = self.get_var_or_word()?;
        let result = op(self.state.read_variable(var), value).ok_or("Division by zero")?;
        self.state.write_variable(var, result);
        Ok(())
    }

    /// Apply `op` to two variables, storing into the first
    fn update_with_var(&mut self, op: fn(u16, u16) -> Option<u16>) -> Result<(), String> {
        let var = self.get_var_wrapper()?;
        let value = self.get_next_var_contents()?;
        let result = op(self.state.read_variable(var), value).ok_or("Division by zero")?;
        self.state.write_variable(var, result);
        Ok(())
    }

    /// 43
    pub(crate) fn o_add(&mut self) -> Result<(), String> {
        self.update_with_word(|a, b| Some(a.wrapping_add(b)))
    }

    /// 44
    pub(crate) fn o_sub(&mut self) -> Result<(), String> {
        self.update_with_word(|a, b| Some(a.wrapping_sub(b)))
    }

    /// 45
    pub(crate) fn o_addf(&mut self) -> Result<(), String> {
        self.update_with_var(|a, b| Some(a.wrapping_add(b)))
    }

    /// 46
    pub(crate) fn o_subf(&mut self) -> Result<(), String> {
        self.update_with_var(|a, b| Some(a.wrapping_sub(b)))
    }

    /// 47
    pub(crate) fn o_mul(&mut self) -> Result<(), String> {
        self.update_with_word(|a, b| Some(a.wrapping_mul(b)))
    }

    /// 48
    pub(crate) fn o_div(&mut self) -> Result<(), String> {
        self.update_with_word(u16::checked_div)
    }

    /// 49
    pub(crate) fn o_mulf(&mut self) -> Result<(), String> {
        self.update_with_var(|a, b| Some(a.wrapping_mul(b)))
    }

    /// 50
    pub(crate) fn o_divf(&mut self) -> Result<(), String> {
        self.update_with_var(u16::checked_div)
    }

    /// 51
    pub(crate) fn o_mod(&mut self) -> Result<(), String> {
        self.update_with_word(u16::checked_rem)
    }

    /// 52
    pub(crate) fn o_modf(&mut self) -> Result<(), String> {
        self.update_with_var(u16::checked_rem)
    }

    /// 53: random number below a limit
    pub(crate) fn o_random(&mut self) -> Result<(), String> {
        let var = self.get_var_wrapper()?;
        let limit = self.get_var_or_word()?;
        let value = if limit == 0 {
            0
        } else {
            self.rng.random_number(limit - 1)
        };
        self.state.write_variable(var, value);
        Ok(())
    }

    /// 59: increment, sticking at 0xFFFF
    pub(crate) fn o_inc(&mut self) -> Result<(), String> {
        let var = self.get_var_wrapper()?;
        let value = self.state.read_variable(var);
        if value != 0xFFFF {
            self.state.write_variable(var, value + 1);
        }
        Ok(())
    }

    /// 60: decrement, sticking at 0
    pub(crate) fn o_dec(&mut self) -> Result<(), String> {
        let var = self.get_var_wrapper()?;
        let value = self.state.read_variable(var);
        if value != 0 {
            self.state.write_variable(var, value - 1);
        }
        Ok(())
    }
}
