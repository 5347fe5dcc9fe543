//! The world graph and the loader for the main game data file
//!
//! Items live in an arena indexed by item id. Item 0 is "no item" and item 1
//! is the player, created by the loader; ids 2.. come from the data file.

use crate::config::GameVariant;
use crate::item::{
    ChildBlock, ChildKind, Item, ItemId, SubChain, SubContainer, SubInherit, SubObject, SubRoom,
    SubSuperRoom, NO_ITEM, NUM_DIRECTIONS,
};
use crate::opcode_tables::OpcodeTable;
use crate::reader::ByteReader;
use crate::subroutine::{SubroutineOrigin, SubroutineTable};
use log::{debug, error, info, warn};

/// The player item
pub const PLAYER_ITEM: ItemId = 1;

/// Runtime database version accepted by the loader
const GAME_DATA_VERSION: u32 = 0x80;

/// Arena of items indexed by id
#[derive(Debug, Clone)]
pub struct ItemGraph {
    items: Vec<Option<Item>>,
}

impl ItemGraph {
    /// An empty arena with room for `size` ids and the player at id 1
    pub fn new(size: usize) -> Self {
        let mut items = vec![None; size.max(2)];
        let mut player = Item::new(0xFFFF, 10000);
        player.set_user_flag(0, 0);
        items[PLAYER_ITEM as usize] = Some(player);
        ItemGraph { items }
    }

    /// Number of id slots, including 0 and the player
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Resolve an id; 0 and unused ids give None
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        if id == NO_ITEM {
            return None;
        }
        self.items.get(id as usize).and_then(|i| i.as_ref())
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        if id == NO_ITEM {
            return None;
        }
        self.items.get_mut(id as usize).and_then(|i| i.as_mut())
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Place an item at an id
    pub fn insert(&mut self, id: ItemId, item: Item) -> Result<(), String> {
        if id == NO_ITEM {
            return Err("Cannot store an item at id 0".to_string());
        }
        let slot = self
            .items
            .get_mut(id as usize)
            .ok_or_else(|| format!("Item id {id} beyond item array"))?;
        *slot = Some(item);
        Ok(())
    }

    pub fn parent_of(&self, id: ItemId) -> ItemId {
        self.get(id).map(|i| i.parent).unwrap_or(NO_ITEM)
    }

    pub fn is_room(&self, id: ItemId) -> bool {
        self.get(id).map_or(false, |i| i.as_room().is_some())
    }

    pub fn is_object(&self, id: ItemId) -> bool {
        self.get(id).map_or(false, |i| i.as_object().is_some())
    }

    /// Children of an item in list order
    pub fn children_of(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut cursor = self.get(id).map(|i| i.child).unwrap_or(NO_ITEM);
        while cursor != NO_ITEM && out.len() < self.items.len() {
            out.push(cursor);
            cursor = self.get(cursor).map(|i| i.next).unwrap_or(NO_ITEM);
        }
        out
    }

    /// Move an item under a new parent (0 detaches it). The item goes to the
    /// front of the new parent's child list.
    pub fn set_item_parent(&mut self, item: ItemId, parent: ItemId) -> Result<(), String> {
        if item == parent && item != NO_ITEM {
            error!("set_item_parent: item {item} as its own parent");
            return Err(format!("Trying to set item {item} as its own parent"));
        }
        if !self.contains(item) {
            warn!("set_item_parent: no item {item}");
            return Ok(());
        }
        if parent != NO_ITEM && !self.contains(parent) {
            warn!("set_item_parent: no parent item {parent}, detaching {item}");
        }
        self.unlink_item(item)?;
        self.link_item(item, parent);
        Ok(())
    }

    fn unlink_item(&mut self, item: ItemId) -> Result<(), String> {
        let parent = self.parent_of(item);
        if parent == NO_ITEM {
            return Ok(());
        }
        let item_next = self.get(item).map(|i| i.next).unwrap_or(NO_ITEM);
        let first = self.get(parent).map(|p| p.child).unwrap_or(NO_ITEM);

        if first == item {
            if let Some(p) = self.get_mut(parent) {
                p.child = item_next;
            }
        } else {
            let mut cursor = first;
            loop {
                if cursor == NO_ITEM {
                    error!("unlink_item: parent {parent} empty");
                    return Err(format!("unlinkItem: parent {parent} empty"));
                }
                let next = self.get(cursor).map(|i| i.next).unwrap_or(NO_ITEM);
                if next == NO_ITEM {
                    error!("unlink_item: parent {parent} does not contain {item}");
                    return Err(format!("unlinkItem: parent {parent} does not contain child {item}"));
                }
                if next == item {
                    if let Some(c) = self.get_mut(cursor) {
                        c.next = item_next;
                    }
                    break;
                }
                cursor = next;
            }
        }

        if let Some(i) = self.get_mut(item) {
            i.parent = NO_ITEM;
            i.next = NO_ITEM;
        }
        Ok(())
    }

    fn link_item(&mut self, item: ItemId, parent: ItemId) {
        let head = match self.get_mut(parent) {
            Some(p) => {
                let head = p.child;
                p.child = item;
                Some(head)
            }
            None => None,
        };
        if let Some(i) = self.get_mut(item) {
            match head {
                Some(head) => {
                    i.parent = parent;
                    i.next = head;
                }
                None => {
                    i.parent = NO_ITEM;
                    i.next = NO_ITEM;
                }
            }
        }
    }
}

/// Global strings, addressed by id
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    /// Split a block of NUL-terminated strings, keeping at most `count`
    pub fn from_block(block: &[u8], count: usize) -> Self {
        let strings = block
            .split(|b| *b == 0)
            .take(count)
            .map(|s| s.iter().map(|&b| b as char).collect())
            .collect();
        StringTable { strings }
    }

    pub fn from_strings(strings: Vec<String>) -> Self {
        StringTable { strings }
    }

    /// String by id; unknown ids give an empty string
    pub fn get(&self, id: u16) -> &str {
        match self.strings.get(id as usize) {
            Some(s) => s,
            None => {
                debug!("String id {id} out of range");
                ""
            }
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Everything read from the main game data file
#[derive(Debug)]
pub struct WorldData {
    pub items: ItemGraph,
    pub strings: StringTable,
    pub subroutines: SubroutineTable,
}

/// Load the main game data file
pub fn load_game_data(
    data: &[u8],
    variant: GameVariant,
    table: &OpcodeTable,
    heap_capacity: usize,
) -> Result<WorldData, String> {
    let mut reader = ByteReader::new(data);

    let item_array_size = reader.read_u32()? as usize + 2;
    let version = reader.read_u32()?;
    let mut item_array_inited = reader.read_u32()? as usize + 2;
    let string_table_num = reader.read_u32()? as usize + 2;
    if version != GAME_DATA_VERSION {
        error!("Game data version 0x{version:x}");
        return Err("Not a runtime database".to_string());
    }
    if matches!(variant, GameVariant::Elvira1 | GameVariant::Elvira2) {
        item_array_inited = item_array_size;
    }
    if item_array_inited > item_array_size || item_array_size > u16::MAX as usize {
        return Err(format!(
            "Bad item counts: {item_array_inited} inited of {item_array_size}"
        ));
    }

    let text_size = reader.read_u32()? as usize;
    let strings = StringTable::from_block(reader.read_bytes(text_size)?, string_table_num);

    let mut items = ItemGraph::new(item_array_size);
    for id in 2..item_array_inited {
        let item = read_item(&mut reader, variant)?;
        items.insert(id as ItemId, item)?;
    }

    let mut subroutines = SubroutineTable::new(heap_capacity);
    subroutines.read_block(&mut reader, table, SubroutineOrigin::GameData)?;
    subroutines.remember_base();

    info!(
        "Loaded {} items, {} strings, {} subroutines for {}",
        item_array_inited - 2,
        strings.len(),
        subroutines.len(),
        variant
    );
    Ok(WorldData {
        items,
        strings,
        subroutines,
    })
}

fn read_item(reader: &mut ByteReader, variant: GameVariant) -> Result<Item, String> {
    let elvira1 = variant == GameVariant::Elvira1;
    let mut item = Item::default();
    if elvira1 {
        item.item_name = reader.read_u32()? as u16;
    }
    item.adjective = reader.read_u16()?;
    item.noun = reader.read_u16()?;
    item.state = reader.read_u16()?;
    if elvira1 {
        reader.skip(2)?;
    }
    item.next = reader.read_item_id()?;
    item.child = reader.read_item_id()?;
    item.parent = reader.read_item_id()?;
    if elvira1 {
        reader.skip(2)?;
    }
    item.class_flags = reader.read_u16()?;

    if reader.read_u32()? != 0 {
        loop {
            let tag = reader.read_u16()?;
            if tag == 0 {
                break;
            }
            read_child(reader, &mut item, tag, variant)?;
        }
    }
    Ok(item)
}

fn read_child(
    reader: &mut ByteReader,
    item: &mut Item,
    tag: u16,
    variant: GameVariant,
) -> Result<(), String> {
    let kind = ChildKind::from_tag(tag).ok_or_else(|| {
        error!("Unknown child block tag {tag} at offset 0x{:x}", reader.position());
        format!("readItemChildren: invalid type {tag}")
    })?;

    let block = match kind {
        ChildKind::Room => {
            let subroutine_id = reader.read_u16()?;
            let exit_states = reader.read_u16()?;
            let mut exits = Vec::new();
            for d in 0..NUM_DIRECTIONS {
                if (exit_states >> (d * 2)) & 3 != 0 {
                    exits.push(reader.read_item_id()?);
                }
            }
            ChildBlock::Room(SubRoom {
                subroutine_id,
                exit_states,
                exits,
            })
        }
        ChildKind::Object => {
            let flags = reader.read_u32()?;
            let mut values = Vec::new();
            if flags & 1 != 0 {
                values.push(reader.read_u32()? as u16);
            }
            for bit in 1..16 {
                if flags & (1 << bit) != 0 {
                    values.push(reader.read_u16()?);
                }
            }
            let name = if variant == GameVariant::Elvira1 {
                None
            } else {
                Some(reader.read_u32()? as u16)
            };
            ChildBlock::Object(SubObject::new(flags, values, name))
        }
        ChildKind::SuperRoom => {
            let subroutine_id = reader.read_u16()?;
            let room_x = reader.read_u16()?;
            let room_y = reader.read_u16()?;
            let room_z = reader.read_u16()?;
            let cells = room_x as usize * room_y as usize * room_z as usize;
            let mut exit_states = Vec::with_capacity(cells);
            for _ in 0..cells {
                exit_states.push(reader.read_u16()?);
            }
            ChildBlock::SuperRoom(SubSuperRoom {
                subroutine_id,
                room_x,
                room_y,
                room_z,
                exit_states,
            })
        }
        ChildKind::Container => ChildBlock::Container(SubContainer {
            volume: reader.read_u16()?,
            flags: reader.read_u16()?,
        }),
        ChildKind::Chain => ChildBlock::Chain(SubChain {
            chained: reader.read_item_id()?,
        }),
        ChildKind::Inherit => ChildBlock::Inherit(SubInherit {
            master: reader.read_item_id()?,
        }),
        ChildKind::UserFlag => {
            for slot in 0..4 {
                let value = reader.read_u16()?;
                item.set_user_flag(slot, value);
            }
            return Ok(());
        }
    };
    item.attach(block)
}
