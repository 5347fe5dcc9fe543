//! Control flow opcodes: ending the game, returning from and starting
//! subroutines, and running the script attached to a room.

use crate::config::GameVariant;
use crate::interpreter::{Interpreter, RESTART_CODE};
use log::{debug, info};

/// Waxworks subroutine that asks the manual question, and its replacement
const WW_PROTECTION_SUBROUTINE: u16 = 71;
const WW_PROTECTION_BYPASS: u16 = 70;

impl Interpreter {
    /// 68: quit the game
    pub(crate) fn o_end(&mut self) -> Result<(), String> {
        info!("Script ended the game");
        self.state.quit_requested = true;
        Ok(())
    }

    /// 69: leave the subroutine as if no line matched
    pub(crate) fn o_done(&mut self) -> Result<(), String> {
        self.set_script_return(-1);
        Ok(())
    }

    /// 71: run another subroutine
    pub(crate) fn o_process(&mut self) -> Result<(), String> {
        let mut id = self.get_var_or_word()?;
        if self.config.variant == GameVariant::Waxworks
            && !self.config.copy_protection
            && id == WW_PROTECTION_SUBROUTINE
        {
            id = WW_PROTECTION_BYPASS;
        }
        if self.run_subroutine(id)?.is_none() {
            debug!("process: no subroutine {id}");
        }
        Ok(())
    }

    /// 83: start the current subroutine again
    pub(crate) fn o_rescan(&mut self) -> Result<(), String> {
        self.set_script_return(RESTART_CODE);
        Ok(())
    }

    /// 87
    pub(crate) fn o_comment(&mut self) -> Result<(), String> {
        self.get_next_string_id()?;
        Ok(())
    }

    /// 143: run the subroutine of a room. The condition is false when one
    /// ran.
    pub(crate) fn o_do_table(&mut self) -> Result<(), String> {
        let item = self.get_next_item_ptr()?;
        let room_sub = self
            .state
            .item(item)
            .and_then(|i| i.as_room())
            .map(|r| r.subroutine_id);
        if let Some(id) = room_sub {
            if let Some(sub) = self.find_subroutine(id)? {
                self.start_subroutine(&sub)?;
                self.set_condition(false);
                return Ok(());
            }
        }

        if self.config.variant == GameVariant::Elvira2 {
            let super_sub = self
                .state
                .item(item)
                .and_then(|i| i.as_super_room())
                .map(|sr| sr.subroutine_id);
            if let Some(id) = super_sub {
                if let Some(sub) = self.find_subroutine(id)? {
                    self.start_subroutine(&sub)?;
                    self.set_condition(false);
                    return Ok(());
                }
            }
        }

        self.set_condition(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GameVariant;
    use crate::interpreter::tests::create_test_interpreter;
    use crate::interpreter::ScriptResult;
    use crate::item::{ChildBlock, Item, SubRoom, SubSuperRoom};
    use crate::subroutine::SubroutineOrigin;
    use test_log::test;

    #[test]
    fn test_end_quits() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        let result = interp.run_line(vec![68, 42, 1, 0, 1, 0xFF]).unwrap();
        assert_eq!(result, ScriptResult::Quit);
        assert!(interp.state.quit_requested);
        assert_eq!(interp.state.read_variable(1), 0);
    }

    #[test]
    fn test_done_returns_to_caller() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        let sub = interp.subroutines.create_subroutine(5, SubroutineOrigin::GameData);
        interp.subroutines.add_line(sub, 0, 0, 0, &[69, 0xFF]).unwrap();
        interp
            .subroutines
            .add_line(sub, 0, 0, 0, &[42, 1, 0, 1, 0xFF])
            .unwrap();
        let result = interp.run_subroutine(5).unwrap();
        assert_eq!(result, Some(ScriptResult::ReturnToCaller(-1)));
        assert_eq!(interp.state.read_variable(1), 0);
    }

    #[test]
    fn test_rescan_restarts_keeping_side_effects() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        let sub = interp.subroutines.create_subroutine(6, SubroutineOrigin::GameData);
        // inc v1; lt v1, 3; rescan
        interp
            .subroutines
            .add_line(sub, 0, 0, 0, &[59, 1, 16, 1, 0, 3, 83, 0xFF])
            .unwrap();
        interp.run_subroutine(6).unwrap();
        assert_eq!(interp.state.read_variable(1), 3);
    }

    #[test]
    fn test_process_and_comment() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        let sub = interp.subroutines.create_subroutine(9, SubroutineOrigin::GameData);
        interp
            .subroutines
            .add_line(sub, 0, 0, 0, &[42, 2, 0, 4, 0xFF])
            .unwrap();
        // comment str1; process 9; process 10 (missing); let v3 = 1
        interp
            .run_line(vec![87, 0, 1, 71, 0, 9, 71, 0, 10, 42, 3, 0, 1, 0xFF])
            .unwrap();
        assert_eq!(interp.state.read_variable(2), 4);
        assert_eq!(interp.state.read_variable(3), 1);
    }

    #[test]
    fn test_waxworks_protection_bypass() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Waxworks);
        interp.config.copy_protection = false;
        for (id, value) in [(70u16, 1u8), (71, 2)] {
            let sub = interp.subroutines.create_subroutine(id, SubroutineOrigin::GameData);
            interp
                .subroutines
                .add_line(sub, 0, 0, 0, &[42, 1, 0, value, 0xFF])
                .unwrap();
        }
        interp.run_line(vec![71, 0, 71, 0xFF]).unwrap();
        assert_eq!(interp.state.read_variable(1), 1);

        interp.config.copy_protection = true;
        interp.run_line(vec![71, 0, 71, 0xFF]).unwrap();
        assert_eq!(interp.state.read_variable(1), 2);
    }

    fn add_room_script(interp: &mut crate::interpreter::Interpreter, id: u16) {
        let sub = interp.subroutines.create_subroutine(id, SubroutineOrigin::GameData);
        interp
            .subroutines
            .add_line(sub, 0, 0, 0, &[42, 1, 0, 7, 0xFF])
            .unwrap();
    }

    #[test]
    fn test_do_table_room() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        // room 2 has subroutine 0, which does not exist yet
        interp.run_line(vec![143, 0, 2, 0xFF]).unwrap();
        assert!(interp.condition());

        interp
            .state
            .items
            .get_mut(2)
            .unwrap()
            .as_room_mut()
            .unwrap()
            .subroutine_id = 30;
        add_room_script(&mut interp, 30);
        interp.run_line(vec![143, 0, 2, 0xFF]).unwrap();
        assert!(!interp.condition());
        assert_eq!(interp.state.read_variable(1), 7);
    }

    #[test]
    fn test_do_table_super_room_only_in_elvira2() {
        for (variant, runs) in [(GameVariant::Elvira2, true), (GameVariant::Waxworks, false)] {
            let (mut interp, _) = create_test_interpreter(variant);
            let mut grid = Item::new(0, 22);
            grid.attach(ChildBlock::SuperRoom(SubSuperRoom {
                subroutine_id: 31,
                room_x: 1,
                room_y: 1,
                room_z: 1,
                exit_states: vec![0],
            }))
            .unwrap();
            interp.state.items.insert(5, grid).unwrap();
            add_room_script(&mut interp, 31);

            interp.run_line(vec![143, 0, 5, 0xFF]).unwrap();
            assert_eq!(interp.condition(), !runs);
            assert_eq!(interp.state.read_variable(1) == 7, runs);
        }
    }

    #[test]
    fn test_do_table_prefers_room() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Elvira2);
        let mut item = Item::new(0, 23);
        item.attach(ChildBlock::Room(SubRoom {
            subroutine_id: 32,
            exit_states: 0,
            exits: vec![],
        }))
        .unwrap();
        interp.state.items.insert(6, item).unwrap();
        add_room_script(&mut interp, 32);
        interp.run_line(vec![143, 0, 6, 0xFF]).unwrap();
        assert!(!interp.condition());
        assert_eq!(interp.state.read_variable(1), 7);
    }
}
