//! World items and their typed child blocks
//!
//! Every item can carry at most one child block of each kind. Child blocks
//! hold the type-specific data (room exits, object properties, containers)
//! and are looked up by kind, returning None on a mismatch.
//!
//! All cross references (parent, exits, chain targets, inherit masters) are
//! item ids resolved through the ItemGraph at use time.
use log::debug;

/// Item number; 0 means "no item"
pub type ItemId = u16;

pub const NO_ITEM: ItemId = 0;

/// Maximum number of object property slots
pub const MAX_OBJECT_PROPS: u16 = 16;

/// Number of nominal exit directions of a flat room
pub const NUM_DIRECTIONS: u16 = 6;

/// Child block type tags as stored in the world data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Room,
    Object,
    SuperRoom,
    Container,
    Chain,
    UserFlag,
    Inherit,
}

impl ChildKind {
    /// Map a file tag to a child kind
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            1 => Some(ChildKind::Room),
            2 => Some(ChildKind::Object),
            4 => Some(ChildKind::SuperRoom),
            7 => Some(ChildKind::Container),
            8 => Some(ChildKind::Chain),
            9 => Some(ChildKind::UserFlag),
            255 => Some(ChildKind::Inherit),
            _ => None,
        }
    }

    pub fn tag(self) -> u16 {
        match self {
            ChildKind::Room => 1,
            ChildKind::Object => 2,
            ChildKind::SuperRoom => 4,
            ChildKind::Container => 7,
            ChildKind::Chain => 8,
            ChildKind::UserFlag => 9,
            ChildKind::Inherit => 255,
        }
    }
}

/// A room with up to six exits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubRoom {
    /// Subroutine run on entry
    pub subroutine_id: u16,
    /// 2-bit door state per direction
    pub exit_states: u16,
    /// Exit targets, one per direction whose state is non-zero at load time
    pub exits: Vec<ItemId>,
}

/// Object with a densely packed set of optional 16-bit properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubObject {
    /// Bits 0..15 mark present properties, higher bits are plain object flags
    pub flags: u32,
    /// Present property values, in ascending property order
    pub values: Vec<u16>,
    /// Name string id (absent in the earliest variant)
    pub name: Option<u16>,
}

impl SubObject {
    /// Build an object block from a flag mask and its present values
    pub fn new(flags: u32, values: Vec<u16>, name: Option<u16>) -> Self {
        SubObject {
            flags,
            values,
            name,
        }
    }

    pub fn has_prop(&self, prop: u16) -> bool {
        prop < MAX_OBJECT_PROPS && self.flags & (1 << prop) != 0
    }

    /// Test any of the 32 object flag bits
    pub fn has_flag(&self, bit: u16) -> bool {
        bit < 32 && self.flags & (1 << bit) != 0
    }

    /// Dense slot of a present property: the number of set flag bits below it
    pub fn slot_of(&self, prop: u16) -> Option<usize> {
        if !self.has_prop(prop) {
            return None;
        }
        let below = self.flags & ((1u32 << prop) - 1);
        Some(below.count_ones() as usize)
    }

    /// Property value; absent or out-of-range properties read as 0
    pub fn value(&self, prop: u16) -> u16 {
        self.slot_of(prop)
            .and_then(|slot| self.values.get(slot).copied())
            .unwrap_or(0)
    }

    /// Store a property value; writes to absent properties are ignored
    pub fn set_value(&mut self, prop: u16, value: u16) {
        match self.slot_of(prop) {
            Some(slot) if slot < self.values.len() => self.values[slot] = value,
            _ => debug!("set_value: property {} not present, write ignored", prop),
        }
    }
}

/// 3-D grid of rooms sharing one item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubSuperRoom {
    pub subroutine_id: u16,
    pub room_x: u16,
    pub room_y: u16,
    pub room_z: u16,
    /// One exit-state word per cell, x fastest
    pub exit_states: Vec<u16>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubContainer {
    pub volume: u16,
    pub flags: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubChain {
    pub chained: ItemId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubUserFlag {
    pub values: [u16; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubInherit {
    pub master: ItemId,
}

/// Type-specific attachment of an item
#[derive(Debug, Clone, PartialEq)]
pub enum ChildBlock {
    Room(SubRoom),
    Object(SubObject),
    SuperRoom(SubSuperRoom),
    Container(SubContainer),
    Chain(SubChain),
    UserFlag(SubUserFlag),
    Inherit(SubInherit),
}

impl ChildBlock {
    pub fn kind(&self) -> ChildKind {
        match self {
            ChildBlock::Room(_) => ChildKind::Room,
            ChildBlock::Object(_) => ChildKind::Object,
            ChildBlock::SuperRoom(_) => ChildKind::SuperRoom,
            ChildBlock::Container(_) => ChildKind::Container,
            ChildBlock::Chain(_) => ChildKind::Chain,
            ChildBlock::UserFlag(_) => ChildKind::UserFlag,
            ChildBlock::Inherit(_) => ChildKind::Inherit,
        }
    }
}

/// An object, room or character of the world graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub adjective: u16,
    pub noun: u16,
    pub state: u16,
    /// Containing item (backlink only)
    pub parent: ItemId,
    /// First contained item
    pub child: ItemId,
    /// Next sibling inside the parent
    pub next: ItemId,
    pub class_flags: u16,
    /// Name string id, earliest variant only
    pub item_name: u16,
    children: Vec<ChildBlock>,
}

impl Item {
    pub fn new(adjective: u16, noun: u16) -> Self {
        Item {
            adjective,
            noun,
            ..Default::default()
        }
    }

    pub fn children(&self) -> &[ChildBlock] {
        &self.children
    }

    /// Attach a child block; a second block of the same kind is malformed data
    pub fn attach(&mut self, block: ChildBlock) -> Result<(), String> {
        let kind = block.kind();
        if self.find_child(kind).is_some() {
            return Err(format!("Item already has a {kind:?} child block"));
        }
        self.children.push(block);
        Ok(())
    }

    pub fn find_child(&self, kind: ChildKind) -> Option<&ChildBlock> {
        self.children.iter().find(|c| c.kind() == kind)
    }

    pub fn find_child_mut(&mut self, kind: ChildKind) -> Option<&mut ChildBlock> {
        self.children.iter_mut().find(|c| c.kind() == kind)
    }

    pub fn as_room(&self) -> Option<&SubRoom> {
        match self.find_child(ChildKind::Room) {
            Some(ChildBlock::Room(r)) => Some(r),
            _ => None,
        }
    }

    pub fn as_room_mut(&mut self) -> Option<&mut SubRoom> {
        match self.find_child_mut(ChildKind::Room) {
            Some(ChildBlock::Room(r)) => Some(r),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&SubObject> {
        match self.find_child(ChildKind::Object) {
            Some(ChildBlock::Object(o)) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut SubObject> {
        match self.find_child_mut(ChildKind::Object) {
            Some(ChildBlock::Object(o)) => Some(o),
            _ => None,
        }
    }

    pub fn as_super_room(&self) -> Option<&SubSuperRoom> {
        match self.find_child(ChildKind::SuperRoom) {
            Some(ChildBlock::SuperRoom(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_super_room_mut(&mut self) -> Option<&mut SubSuperRoom> {
        match self.find_child_mut(ChildKind::SuperRoom) {
            Some(ChildBlock::SuperRoom(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&SubContainer> {
        match self.find_child(ChildKind::Container) {
            Some(ChildBlock::Container(c)) => Some(c),
            _ => None,
        }
    }

    pub fn as_chain(&self) -> Option<&SubChain> {
        match self.find_child(ChildKind::Chain) {
            Some(ChildBlock::Chain(c)) => Some(c),
            _ => None,
        }
    }

    pub fn as_inherit(&self) -> Option<&SubInherit> {
        match self.find_child(ChildKind::Inherit) {
            Some(ChildBlock::Inherit(i)) => Some(i),
            _ => None,
        }
    }

    pub fn user_flag(&self, index: usize) -> u16 {
        match self.find_child(ChildKind::UserFlag) {
            Some(ChildBlock::UserFlag(u)) => u.values.get(index).copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// Set a user flag slot, creating the UserFlag block on first use
    pub fn set_user_flag(&mut self, index: usize, value: u16) {
        if index >= 4 {
            debug!("set_user_flag: slot {} out of range", index);
            return;
        }
        if self.find_child(ChildKind::UserFlag).is_none() {
            self.children
                .push(ChildBlock::UserFlag(SubUserFlag::default()));
        }
        if let Some(ChildBlock::UserFlag(u)) = self.find_child_mut(ChildKind::UserFlag) {
            u.values[index] = value;
        }
    }
}
