//! Doors and exits
//!
//! A flat room packs a 2-bit door state per direction into one word; its exit
//! list only holds the directions that had a non-zero state at load time, so
//! direction indices are compacted before indexing it. Changing a door also
//! changes the matching door of the neighbouring room, but only when that
//! room's opposite exit leads back.
//!
//! Super rooms hold one exit word per grid cell; cells are numbered from 1,
//! x fastest, then y, then z.
use crate::item::{ItemId, SubSuperRoom, NO_ITEM};
use crate::world::ItemGraph;
use log::{debug, warn};

/// Door states as used by the door opcodes
pub const DOOR_OPEN: u16 = 1;
pub const DOOR_CLOSED: u16 = 2;
pub const DOOR_LOCKED: u16 = 3;

/// Direction reached by walking back through a door
pub fn opposite_direction(d: u16) -> u16 {
    match d {
        0 => 2,
        1 => 3,
        2 => 0,
        3 => 1,
        4 => 5,
        5 => 4,
        _ => d,
    }
}

fn field(word: u16, d: u16) -> u16 {
    if d >= 8 {
        return 0;
    }
    (word >> (d * 2)) & 3
}

fn with_field(word: u16, d: u16, state: u16) -> u16 {
    if d >= 8 {
        return word;
    }
    let shift = d * 2;
    (word & !(3 << shift)) | ((state & 3) << shift)
}

/// 2-bit door state of a direction; 0 when the item is not a room
pub fn get_door_state(items: &ItemGraph, item: ItemId, d: u16) -> u16 {
    match items.get(item).and_then(|i| i.as_room()) {
        Some(room) => field(room.exit_states, d),
        None => 0,
    }
}

/// Item reached through a direction, skipping closed-off earlier directions
pub fn get_exit_of(items: &ItemGraph, item: ItemId, d: u16) -> ItemId {
    let room = match items.get(item).and_then(|i| i.as_room()) {
        Some(room) => room,
        None => return NO_ITEM,
    };
    let skipped = (0..d).filter(|y| field(room.exit_states, *y) == 0).count() as u16;
    let index = d.saturating_sub(skipped) as usize;
    match room.exits.get(index) {
        Some(exit) => *exit,
        None => {
            debug!("get_exit_of: item {item} has no exit slot {index}");
            NO_ITEM
        }
    }
}

fn change_door_state(items: &mut ItemGraph, item: ItemId, d: u16, state: u16) {
    if let Some(room) = items.get_mut(item).and_then(|i| i.as_room_mut()) {
        room.exit_states = with_field(room.exit_states, d, state);
    }
}

/// Set a door and the paired door of the room behind it
pub fn set_door_state(items: &mut ItemGraph, item: ItemId, d: u16, state: u16) {
    if items.get(item).and_then(|i| i.as_room()).is_none() {
        debug!("set_door_state: item {item} is not a room");
        return;
    }
    let neighbour = get_exit_of(items, item, d);
    change_door_state(items, item, d, state);

    if items.get(neighbour).and_then(|i| i.as_room()).is_none() {
        return;
    }
    let back = opposite_direction(d);
    if get_exit_of(items, neighbour, back) != item {
        debug!("set_door_state: exit {back} of {neighbour} does not lead back to {item}");
        return;
    }
    change_door_state(items, neighbour, back, state);
}

fn cell_index(sr: &SubSuperRoom, cell: u16) -> Option<usize> {
    let index = (cell as usize).checked_sub(1)?;
    if index < sr.exit_states.len() {
        Some(index)
    } else {
        None
    }
}

/// Exit state of a super room cell (1-based) in a direction
pub fn get_super_room_exit(items: &ItemGraph, item: ItemId, cell: u16, d: u16) -> u16 {
    let sr = match items.get(item).and_then(|i| i.as_super_room()) {
        Some(sr) => sr,
        None => return 0,
    };
    match cell_index(sr, cell) {
        Some(index) => field(sr.exit_states[index], d),
        None => {
            warn!("Super room {item}: cell {cell} out of range");
            0
        }
    }
}

/// Offset to the neighbouring cell in a direction, or None at the grid edge
fn neighbour_offset(sr: &SubSuperRoom, index: usize, d: u16) -> Option<isize> {
    let (x_size, y_size, z_size) = (sr.room_x as usize, sr.room_y as usize, sr.room_z as usize);
    if x_size == 0 || y_size == 0 {
        return None;
    }
    let layer = x_size * y_size;
    let x = index % x_size;
    let y = (index % layer) / x_size;
    let z = index / layer;
    match d {
        0 if y > 0 => Some(-(x_size as isize)),
        1 if x + 1 < x_size => Some(1),
        2 if y + 1 < y_size => Some(x_size as isize),
        3 if x > 0 => Some(-1),
        4 if z > 0 => Some(-(layer as isize)),
        5 if z + 1 < z_size => Some(layer as isize),
        _ => None,
    }
}

/// Set a super room exit and the opposite exit of the adjacent cell
pub fn set_super_room_exit(items: &mut ItemGraph, item: ItemId, cell: u16, d: u16, state: u16) {
    let sr = match items.get_mut(item).and_then(|i| i.as_super_room_mut()) {
        Some(sr) => sr,
        None => {
            debug!("set_super_room_exit: item {item} is not a super room");
            return;
        }
    };
    let index = match cell_index(sr, cell) {
        Some(index) => index,
        None => {
            warn!("Super room {item}: cell {cell} out of range, write ignored");
            return;
        }
    };
    sr.exit_states[index] = with_field(sr.exit_states[index], d, state);

    if let Some(offset) = neighbour_offset(sr, index, d) {
        let other = (index as isize + offset) as usize;
        if let Some(word) = sr.exit_states.get_mut(other) {
            *word = with_field(*word, opposite_direction(d), state);
        }
    }
}
