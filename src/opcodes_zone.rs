//! Zone memory and animation opcodes

use crate::config::GameVariant;
use crate::interpreter::{Interpreter, LOCKOUT_LOAD_ZONE};
use crate::zone::VgaSprite;
use log::{debug, info};

/// Subroutines that ask the manual question, per game
const SIMON1_PROTECTION_TABLE: u16 = 2924;
const SIMON2_PROTECTION_TABLE: u16 = 1322;

/// Variables and flag the protection scripts leave behind when passed
const PROTECTION_VARS: [u16; 2] = [134, 135];
const PROTECTION_FLAG: u16 = 135;

impl Interpreter {
    /// Load a zone with a lockout bit held
    pub(crate) fn load_zone_locked(&mut self, zone: u16, lockout: u16) -> Result<(), String> {
        self.video_lockout |= lockout;
        let ctx = self.zone_context();
        let result = self
            .zones
            .load_zone(zone, &ctx, self.resources.as_mut(), true);
        self.video_lockout &= !lockout;
        result
    }

    /// 97
    pub(crate) fn o_load_zone(&mut self) -> Result<(), String> {
        let zone = self.get_var_or_word()?;
        debug!("loadZone {zone}");
        self.load_zone_locked(zone, LOCKOUT_LOAD_ZONE)
    }

    /// 98: start an animation, loading its zone first if needed. The zone of
    /// the last picture is kept out of reach of the allocator meanwhile.
    pub(crate) fn o_animate(&mut self) -> Result<(), String> {
        let window = self.get_var_or_byte()?;
        let id = self.get_var_or_word()?;
        let x = self.get_var_or_word()? as i16;
        let y = self.get_var_or_word()? as i16;
        let palette = self.get_var_or_word()?;
        let zone = id / 100;

        if self.zones.is_sprite_loaded(id, zone) {
            debug!("animate: sprite {id} already running");
            return Ok(());
        }
        self.zones.add_sprite(VgaSprite {
            id,
            zone,
            window,
            x,
            y,
            palette,
        });

        if !self.zones.is_loaded(zone) {
            if self.zone_number != zone {
                self.zones.set_no_overwrite(Some(self.zone_number));
            }
            let ctx = self.zone_context();
            let result = self
                .zones
                .load_zone(zone, &ctx, self.resources.as_mut(), true);
            self.zones.set_no_overwrite(None);
            result?;
            if !self.zones.is_loaded(zone) {
                return Err(format!("animate: zone {zone} could not be loaded"));
            }
        }
        Ok(())
    }

    /// 99
    pub(crate) fn o_stop_animate(&mut self) -> Result<(), String> {
        let id = self.get_var_or_word()?;
        if !self.zones.remove_sprite(id, id / 100) {
            debug!("stopAnimate: sprite {id} not running");
        }
        Ok(())
    }

    /// 100
    pub(crate) fn o_kill_animate(&mut self) -> Result<(), String> {
        self.zones.clear_sprites();
        Ok(())
    }

    /// 138: protect everything loaded so far. Also passes the manual
    /// check of the floppy releases when protection is off.
    pub(crate) fn o_freeze_zones(&mut self) -> Result<(), String> {
        self.zones.freeze_bottom();

        if self.config.copy_protection || self.config.talkie {
            return Ok(());
        }
        let in_protection = self.current_table().map_or(false, |t| {
            matches!(
                (self.config.variant, t.id),
                (GameVariant::Simon1, SIMON1_PROTECTION_TABLE)
                    | (GameVariant::Simon2, SIMON2_PROTECTION_TABLE)
            )
        });
        if in_protection {
            info!("Skipping manual check");
            for var in PROTECTION_VARS {
                self.state.write_variable(var, 3);
            }
            self.state.flags.set(PROTECTION_FLAG, true);
            self.set_condition(false);
        }
        Ok(())
    }

    /// 175
    pub(crate) fn o_lock_zones(&mut self) -> Result<(), String> {
        self.zones.lock_zones();
        Ok(())
    }

    /// 176
    pub(crate) fn o_unlock_zones(&mut self) -> Result<(), String> {
        self.zones.unlock_zones();
        Ok(())
    }

    /// 184
    pub(crate) fn o_unload_zone(&mut self) -> Result<(), String> {
        let zone = self.get_var_or_word()?;
        self.zones.unload_zone(zone);
        Ok(())
    }

    /// 186
    pub(crate) fn o_unfreeze_zones(&mut self) -> Result<(), String> {
        self.zones.unfreeze_bottom();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GameVariant;
    use crate::interpreter::tests::create_test_interpreter;
    use crate::interpreter::Interpreter;
    use crate::resource::MemoryStore;
    use crate::subroutine::SubroutineOrigin;
    use test_log::test;

    fn with_zones(interp: &mut Interpreter) {
        interp.resources = Box::new(
            MemoryStore::new()
                .with_file("0011.VGA", vec![1; 10])
                .with_file("0012.VGA", vec![2; 20])
                .with_file("0021.VGA", vec![3; 10])
                .with_file("0022.VGA", vec![4; 20]),
        );
    }

    #[test]
    fn test_load_and_unload_zone() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        with_zones(&mut interp);
        interp.run_line(vec![97, 0, 1, 0xFF]).unwrap();
        assert!(interp.zones.is_loaded(1));
        assert_eq!(interp.video_lockout, 0);
        interp.run_line(vec![184, 0, 1, 0xFF]).unwrap();
        assert!(!interp.zones.is_loaded(1));
        // a zone without files is fatal
        assert!(interp.run_line(vec![97, 0, 9, 0xFF]).is_err());
    }

    #[test]
    fn test_animate_loads_zone_once() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        with_zones(&mut interp);
        // animate window 1, sprite 101 at (5,6) palette 0, twice
        let code = vec![98, 1, 0, 101, 0, 5, 0, 6, 0, 0, 98, 1, 0, 101, 0, 5, 0, 6, 0, 0, 0xFF];
        interp.run_line(code).unwrap();
        assert!(interp.zones.is_loaded(1));
        assert_eq!(interp.zones.active_sprites().count(), 1);
        let sprite = *interp.zones.active_sprites().next().unwrap();
        assert_eq!((sprite.zone, sprite.x, sprite.y), (1, 5, 6));
        assert_eq!(interp.zones.no_overwrite(), None);

        // stopAnimate 101
        interp.run_line(vec![99, 0, 101, 0xFF]).unwrap();
        assert_eq!(interp.zones.active_sprites().count(), 0);
    }

    #[test]
    fn test_animate_keeps_picture_zone() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        with_zones(&mut interp);
        interp.run_line(vec![97, 0, 1, 0xFF]).unwrap();
        interp.zone_number = 1;
        interp.run_line(vec![98, 0, 0, 201, 0, 0, 0, 0, 0, 0, 0xFF]).unwrap();
        assert!(interp.zones.is_loaded(1));
        assert!(interp.zones.is_loaded(2));
        // killAnimate
        interp.run_line(vec![100, 0xFF]).unwrap();
        assert_eq!(interp.zones.active_sprites().count(), 0);
    }

    #[test]
    fn test_animate_missing_zone_fatal() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        assert!(interp
            .run_line(vec![98, 0, 0, 0x03, 0x85, 0, 0, 0, 0, 0, 0, 0xFF])
            .is_err());
    }

    #[test]
    fn test_freeze_round_trip() {
        let (mut interp, _) = create_test_interpreter(GameVariant::Simon1);
        with_zones(&mut interp);
        interp.run_line(vec![97, 0, 1, 138, 0xFF]).unwrap();
        assert_eq!(interp.zones.cursors().base, 30);
        // lockZones after zone 2; unlockZones drops back to the frozen base
        interp.run_line(vec![97, 0, 2, 175, 0xFF]).unwrap();
        assert_eq!(interp.zones.cursors().base, 60);
        interp.run_line(vec![176, 0xFF]).unwrap();
        assert_eq!(interp.zones.cursors().base, 30);
        interp.run_line(vec![186, 0xFF]).unwrap();
        assert_eq!(interp.zones.cursors().base, 0);
    }

    fn run_protection_table(variant: GameVariant, table: u16, copy_protection: bool) -> Interpreter {
        let (mut interp, _) = create_test_interpreter(variant);
        interp.config.copy_protection = copy_protection;
        let sub = interp
            .subroutines
            .create_subroutine(table, SubroutineOrigin::GameData);
        // freezeZones; let v1 = 9
        interp
            .subroutines
            .add_line(sub, 0, 0, 0, &[138, 42, 1, 0, 9, 0xFF])
            .unwrap();
        interp.run_subroutine(table).unwrap();
        interp
    }

    #[test]
    fn test_manual_check_skipped_without_protection() {
        let interp = run_protection_table(GameVariant::Simon1, 2924, false);
        assert_eq!(interp.state.read_variable(134), 3);
        assert_eq!(interp.state.read_variable(135), 3);
        assert!(interp.state.flags.get(135));
        assert_eq!(interp.state.read_variable(1), 0);

        let interp = run_protection_table(GameVariant::Simon2, 1322, false);
        assert!(interp.state.flags.get(135));

        let interp = run_protection_table(GameVariant::Simon1, 2924, true);
        assert_eq!(interp.state.read_variable(134), 0);
        assert_eq!(interp.state.read_variable(1), 9);

        let interp = run_protection_table(GameVariant::Simon2, 2924, false);
        assert_eq!(interp.state.read_variable(1), 9);
    }
}
