//! Per-variant opcode tables
//!
//! Each game variant gets one table, built on first use, mapping opcode
//! numbers to a name, an operand format string and a handler. The format
//! string drives both loading (operand expansion) and disassembly; the
//! handler reads its own operands from the script cursor.

use crate::config::GameVariant;
use crate::instruction::CodeEncoding;
use crate::interpreter::Interpreter;
use std::fmt;

/// Executes one opcode, reading its operands from the script cursor
pub type OpcodeHandler = fn(&mut Interpreter) -> Result<(), String>;

/// One row of a table: number, name, operand format, handler
type OpcodeRow = (u16, &'static str, &'static str, OpcodeHandler);

#[derive(Clone, Copy)]
pub struct OpcodeEntry {
    pub name: &'static str,
    /// Operand format, one character per operand (see `OperandKind`)
    pub args: &'static str,
    pub handler: OpcodeHandler,
}

impl fmt::Debug for OpcodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.name, self.args)
    }
}

/// Opcodes shared by every variant
static BASE_OPCODES: &[OpcodeRow] = &[
    (1, "at", "I", Interpreter::o_at),
    (2, "notAt", "I", Interpreter::o_not_at),
    (5, "carried", "I", Interpreter::o_carried),
    (6, "notCarried", "I", Interpreter::o_not_carried),
    (7, "isAt", "II", Interpreter::o_is_at),
    (11, "zero", "v", Interpreter::o_zero),
    (12, "notZero", "v", Interpreter::o_not_zero),
    (13, "eq", "vN", Interpreter::o_eq),
    (14, "notEq", "vN", Interpreter::o_not_eq),
    (15, "gt", "vN", Interpreter::o_gt),
    (16, "lt", "vN", Interpreter::o_lt),
    (17, "eqf", "vv", Interpreter::o_eqf),
    (18, "notEqf", "vv", Interpreter::o_not_eqf),
    (19, "ltf", "vv", Interpreter::o_ltf),
    (20, "gtf", "vv", Interpreter::o_gtf),
    (23, "chance", "N", Interpreter::o_chance),
    (25, "isRoom", "I", Interpreter::o_is_room),
    (26, "isObject", "I", Interpreter::o_is_object),
    (27, "state", "IN", Interpreter::o_state),
    (28, "oflag", "IB", Interpreter::o_oflag),
    (31, "destroy", "I", Interpreter::o_destroy),
    (33, "place", "II", Interpreter::o_place),
    (36, "copyff", "vv", Interpreter::o_copyff),
    (41, "clear", "v", Interpreter::o_clear),
    (42, "let", "vN", Interpreter::o_let),
    (43, "add", "vN", Interpreter::o_add),
    (44, "sub", "vN", Interpreter::o_sub),
    (45, "addf", "vv", Interpreter::o_addf),
    (46, "subf", "vv", Interpreter::o_subf),
    (47, "mul", "vN", Interpreter::o_mul),
    (48, "div", "vN", Interpreter::o_div),
    (49, "mulf", "vv", Interpreter::o_mulf),
    (50, "divf", "vv", Interpreter::o_divf),
    (51, "mod", "vN", Interpreter::o_mod),
    (52, "modf", "vv", Interpreter::o_modf),
    (53, "random", "vN", Interpreter::o_random),
    (55, "goto", "I", Interpreter::o_goto),
    (56, "oset", "IB", Interpreter::o_oset),
    (57, "oclear", "IB", Interpreter::o_oclear),
    (58, "putBy", "II", Interpreter::o_put_by),
    (59, "inc", "v", Interpreter::o_inc),
    (60, "dec", "v", Interpreter::o_dec),
    (61, "setState", "IN", Interpreter::o_set_state),
    (62, "print", "v", Interpreter::o_print),
    (63, "message", "T", Interpreter::o_message),
    (64, "msg", "T", Interpreter::o_msg),
    (68, "end", "", Interpreter::o_end),
    (69, "done", "", Interpreter::o_done),
    (71, "process", "N", Interpreter::o_process),
    (77, "if1", "", Interpreter::o_if1),
    (78, "if2", "", Interpreter::o_if2),
    (79, "isCalled", "IT", Interpreter::o_is_called),
    (80, "is", "II", Interpreter::o_is),
    (83, "rescan", "", Interpreter::o_rescan),
    (85, "whereTo", "IBB", Interpreter::o_where_to),
    (87, "comment", "T", Interpreter::o_comment),
    (90, "getParent", "IB", Interpreter::o_get_parent),
    (91, "getNext", "IB", Interpreter::o_get_next),
    (92, "getChildren", "IB", Interpreter::o_get_children),
    (96, "picture", "NB", Interpreter::o_picture),
    (97, "loadZone", "N", Interpreter::o_load_zone),
    (98, "animate", "BNNNN", Interpreter::o_animate),
    (99, "stopAnimate", "N", Interpreter::o_stop_animate),
    (100, "killAnimate", "", Interpreter::o_kill_animate),
    (107, "addBox", "NNNNNIN", Interpreter::o_add_box),
    (108, "delBox", "N", Interpreter::o_del_box),
    (109, "enableBox", "N", Interpreter::o_enable_box),
    (110, "disableBox", "N", Interpreter::o_disable_box),
    (111, "moveBox", "NNN", Interpreter::o_move_box),
    (115, "isClass", "IB", Interpreter::o_is_class),
    (116, "setClass", "IB", Interpreter::o_set_class),
    (117, "unsetClass", "IB", Interpreter::o_unset_class),
    (125, "here", "I", Interpreter::o_here),
    (130, "setAdjNoun", "BWW", Interpreter::o_set_adj_noun),
    (138, "freezeZones", "", Interpreter::o_freeze_zones),
    (141, "setDollar", "BI", Interpreter::o_set_dollar),
    (142, "isBox", "N", Interpreter::o_is_box),
    (143, "doTable", "I", Interpreter::o_do_table),
    (151, "storeItem", "BI", Interpreter::o_store_item),
    (152, "getItem", "BB", Interpreter::o_get_item),
    (153, "bSet", "v", Interpreter::o_b_set),
    (154, "bClear", "v", Interpreter::o_b_clear),
    (155, "bZero", "v", Interpreter::o_b_zero),
    (156, "bNotZero", "v", Interpreter::o_b_not_zero),
    (157, "getOValue", "IBv", Interpreter::o_get_o_value),
    (158, "setOValue", "IBN", Interpreter::o_set_o_value),
    (163, "playEffect", "N", Interpreter::o_play_effect),
    (164, "getDollar2", "", Interpreter::o_get_dollar2),
    (165, "isAdjNoun", "IWW", Interpreter::o_is_adj_noun),
    (175, "lockZones", "", Interpreter::o_lock_zones),
    (176, "unlockZones", "", Interpreter::o_unlock_zones),
    (184, "unloadZone", "N", Interpreter::o_unload_zone),
    (186, "unfreezeZones", "", Interpreter::o_unfreeze_zones),
];

/// Door opcodes, every variant after the first
static DOOR_OPCODES: &[OpcodeRow] = &[
    (144, "setDoorOpen", "IB", Interpreter::o_set_door_open),
    (145, "setDoorClosed", "IB", Interpreter::o_set_door_closed),
    (146, "setDoorLocked", "IB", Interpreter::o_set_door_locked),
    (148, "ifDoorOpen", "IB", Interpreter::o_if_door_open),
    (149, "ifDoorClosed", "IB", Interpreter::o_if_door_closed),
    (150, "ifDoorLocked", "IB", Interpreter::o_if_door_locked),
];

/// Secondary flag array, every variant after the first
static BIT2_OPCODES: &[OpcodeRow] = &[
    (166, "b2Set", "B", Interpreter::o_b2_set),
    (167, "b2Clear", "B", Interpreter::o_b2_clear),
    (168, "b2Zero", "B", Interpreter::o_b2_zero),
    (169, "b2NotZero", "B", Interpreter::o_b2_not_zero),
];

static SUPER_ROOM_OPCODES: &[OpcodeRow] = &[
    (171, "setExitState", "INBB", Interpreter::o_set_exit_state),
    (172, "ifExitOpen", "INB", Interpreter::o_if_exit_open),
];

static VIDEO_OPCODES: &[OpcodeRow] = &[
    (182, "loadVideo", "T", Interpreter::o_load_video),
    (183, "playVideo", "", Interpreter::o_play_video),
];

pub struct OpcodeTable {
    variant: GameVariant,
    entries: Vec<Option<OpcodeEntry>>,
    encoding: CodeEncoding,
}

impl fmt::Debug for OpcodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpcodeTable")
            .field("variant", &self.variant)
            .field("opcodes", &self.len())
            .field("encoding", &self.encoding)
            .finish()
    }
}

lazy_static! {
    static ref ELVIRA1_OPCODES: OpcodeTable = OpcodeTable::build(GameVariant::Elvira1);
    static ref ELVIRA2_OPCODES: OpcodeTable = OpcodeTable::build(GameVariant::Elvira2);
    static ref WAXWORKS_OPCODES: OpcodeTable = OpcodeTable::build(GameVariant::Waxworks);
    static ref SIMON1_OPCODES: OpcodeTable = OpcodeTable::build(GameVariant::Simon1);
    static ref SIMON2_OPCODES: OpcodeTable = OpcodeTable::build(GameVariant::Simon2);
    static ref FEEBLE_OPCODES: OpcodeTable = OpcodeTable::build(GameVariant::Feeble);
    static ref PUZZLE_OPCODES: OpcodeTable = OpcodeTable::build(GameVariant::Puzzle);
}

impl OpcodeTable {
    /// The table for a variant
    pub fn for_variant(variant: GameVariant) -> &'static OpcodeTable {
        match variant {
            GameVariant::Elvira1 => &*ELVIRA1_OPCODES,
            GameVariant::Elvira2 => &*ELVIRA2_OPCODES,
            GameVariant::Waxworks => &*WAXWORKS_OPCODES,
            GameVariant::Simon1 => &*SIMON1_OPCODES,
            GameVariant::Simon2 => &*SIMON2_OPCODES,
            GameVariant::Feeble => &*FEEBLE_OPCODES,
            GameVariant::Puzzle => &*PUZZLE_OPCODES,
        }
    }

    fn build(variant: GameVariant) -> Self {
        let encoding = if variant == GameVariant::Elvira1 {
            CodeEncoding {
                word_opcodes: true,
                word_var_refs: true,
                invert: 203,
                end: 10000,
            }
        } else {
            CodeEncoding {
                word_opcodes: false,
                word_var_refs: variant.word_var_refs(),
                invert: 0,
                end: 0xFF,
            }
        };

        let mut groups = vec![BASE_OPCODES];
        if variant != GameVariant::Elvira1 {
            groups.push(DOOR_OPCODES);
            groups.push(BIT2_OPCODES);
        }
        if variant == GameVariant::Elvira2 {
            groups.push(SUPER_ROOM_OPCODES);
        }
        if variant.is_late() {
            groups.push(VIDEO_OPCODES);
        }

        let mut entries: Vec<Option<OpcodeEntry>> = Vec::new();
        for (opcode, name, args, handler) in groups.into_iter().flatten() {
            let index = *opcode as usize;
            if entries.len() <= index {
                entries.resize(index + 1, None);
            }
            entries[index] = Some(OpcodeEntry {
                name: *name,
                args: *args,
                handler: *handler,
            });
        }

        OpcodeTable {
            variant,
            entries,
            encoding,
        }
    }

    pub fn variant(&self) -> GameVariant {
        self.variant
    }

    pub fn encoding(&self) -> CodeEncoding {
        self.encoding
    }

    pub fn get(&self, opcode: u16) -> Option<&OpcodeEntry> {
        self.entries.get(opcode as usize).and_then(|e| e.as_ref())
    }

    /// Number of defined opcodes
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find an opcode number by name
    pub fn opcode_named(&self, name: &str) -> Option<u16> {
        self.entries
            .iter()
            .position(|e| e.as_ref().map(|e| e.name) == Some(name))
            .map(|i| i as u16)
    }
}
