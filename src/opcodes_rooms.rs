//! Door and exit opcodes

use crate::interpreter::Interpreter;
use crate::rooms::{
    get_door_state, get_exit_of, get_super_room_exit, set_door_state, set_super_room_exit,
    DOOR_CLOSED, DOOR_LOCKED, DOOR_OPEN,
};
use log::{debug, warn};

impl Interpreter {
    /// Set a door and the paired door behind it
    fn change_door(&mut self, state: u16) -> Result<(), String> {
        let item = self.get_next_item_ptr()?;
        let d = self.get_var_or_byte()?;
        match item {
            Some(room) => {
                debug!("door {d} of {room} -> {state}");
                set_door_state(&mut self.state.items, room, d, state);
            }
            None => warn!("door opcode without a room"),
        }
        Ok(())
    }

    fn door_is(&mut self, state: u16) -> Result<(), String> {
        let item = self.get_next_item_ptr()?;
        let d = self.get_var_or_byte()?;
        let current = item.map_or(0, |room| get_door_state(&self.state.items, room, d));
        self.set_condition(current == state);
        Ok(())
    }

    /// 85: where an exit leads, into subject (1) or object
    pub(crate) fn o_where_to(&mut self) -> Result<(), String> {
        let item = self.get_next_item_ptr()?;
        let d = self.get_var_or_byte()?;
        let which = self.get_var_or_byte()?;
        let exit = item.and_then(|room| self.state.item_ref(get_exit_of(&self.state.items, room, d)));
        if which == 1 {
            self.state.subject_item = exit;
        } else {
            self.state.object_item = exit;
        }
        Ok(())
    }

    /// 144
    pub(crate) fn o_set_door_open(&mut self) -> Result<(), String> {
        self.change_door(DOOR_OPEN)
    }

    /// 145
    pub(crate) fn o_set_door_closed(&mut self) -> Result<(), String> {
        self.change_door(DOOR_CLOSED)
    }

    /// 146
    pub(crate) fn o_set_door_locked(&mut self) -> Result<(), String> {
        self.change_door(DOOR_LOCKED)
    }

    /// 148
    pub(crate) fn o_if_door_open(&mut self) -> Result<(), String> {
        self.door_is(DOOR_OPEN)
    }

    /// 149
    pub(crate) fn o_if_door_closed(&mut self) -> Result<(), String> {
        self.door_is(DOOR_CLOSED)
    }

    /// 150
    pub(crate) fn o_if_door_locked(&mut self) -> Result<(), String> {
        self.door_is(DOOR_LOCKED)
    }

    /// 171: set an exit of one super room cell
    pub(crate) fn o_set_exit_state(&mut self) -> Result<(), String> {
        let item = self.get_next_item_ptr()?;
        let cell = self.get_var_or_word()?;
        let d = self.get_var_or_byte()?;
        let state = self.get_var_or_byte()?;
        match item {
            Some(sr) => set_super_room_exit(&mut self.state.items, sr, cell, d, state),
            None => warn!("setExitState: no item"),
        }
        Ok(())
    }

    /// 172
    pub(crate) fn o_if_exit_open(&mut self) -> Result<(), String> {
        let item = self.get_next_item_ptr()?;
        let cell = self.get_var_or_word()?;
        let d = self.get_var_or_byte()?;
        let state = item.map_or(0, |sr| get_super_room_exit(&self.state.items, sr, cell, d));
        self.set_condition(state == DOOR_OPEN);
        Ok(())
    }
}
