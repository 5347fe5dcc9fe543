//! Clickable screen boxes
//!
//! Boxes are keyed by id. The id doubles as priority: when boxes overlap, the
//! highest id wins a click.

use crate::item::ItemId;
use indexmap::IndexMap;
use log::{debug, warn};

/// Maximum number of boxes
pub const MAX_HIT_AREAS: usize = 250;

/// Verb bit added when a box is defined with x >= 1000
pub const VERB_BIT_ALTERNATE: u16 = 0x4000;

pub const BF_INVERT_TOUCH: u16 = 0x01;
pub const BF_NO_TOUCH_NAME: u16 = 0x02;
pub const BF_BOX_ITEM: u16 = 0x04;
pub const BF_TEXT_BOX: u16 = 0x08;
pub const BF_DRAG_BOX: u16 = 0x10;
pub const BF_BOX_DEAD: u16 = 0x80;

/// Item bound to a box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitItem {
    Item(ItemId),
    /// Stands for the player's own hands
    EmptyHands,
    /// Stands for whatever contains the player
    PlayerContainer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HitArea {
    pub id: u16,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub flags: u16,
    pub verb: u16,
    pub priority: u16,
    pub item: Option<HitItem>,
}

impl HitArea {
    pub fn is_live(&self) -> bool {
        self.flags & BF_BOX_DEAD == 0
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x
            && y >= self.y
            && (x as u32) < self.x as u32 + self.width as u32
            && (y as u32) < self.y as u32 + self.height as u32
    }
}

/// Decode the box flags carried in the thousands of an addBox id
pub fn box_flags_from_params(params: u16) -> u16 {
    let mut flags = 0;
    if params & 1 != 0 {
        flags |= BF_INVERT_TOUCH;
    }
    if params & 2 != 0 {
        flags |= BF_NO_TOUCH_NAME;
    }
    if params & 4 != 0 {
        flags |= BF_BOX_ITEM;
    }
    if params & 8 != 0 {
        flags |= BF_TEXT_BOX;
    }
    if params & 16 != 0 {
        flags |= BF_DRAG_BOX;
    }
    flags
}

#[derive(Debug, Default)]
pub struct HitAreaList {
    areas: IndexMap<u16, HitArea>,
}

impl HitAreaList {
    pub fn new() -> Self {
        HitAreaList {
            areas: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Define a box, replacing any box with the same id
    #[allow(clippy::too_many_arguments)]
    pub fn define_box(
        &mut self,
        id: u16,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        flags: u16,
        verb: u16,
        item: Option<HitItem>,
    ) {
        self.undefine_box(id);
        if self.areas.len() >= MAX_HIT_AREAS {
            warn!("define_box: no free hit area for box {id}");
            return;
        }
        debug!("define_box {id}: ({x},{y}) {width}x{height} verb {verb:#x}");
        self.areas.insert(
            id,
            HitArea {
                id,
                x,
                y,
                width,
                height,
                flags,
                verb,
                priority: id,
                item,
            },
        );
    }

    pub fn undefine_box(&mut self, id: u16) {
        self.areas.shift_remove(&id);
    }

    pub fn enable_box(&mut self, id: u16) {
        if let Some(ha) = self.areas.get_mut(&id) {
            ha.flags &= !BF_BOX_DEAD;
        }
    }

    pub fn disable_box(&mut self, id: u16) {
        if let Some(ha) = self.areas.get_mut(&id) {
            ha.flags |= BF_BOX_DEAD;
        }
    }

    pub fn move_box(&mut self, id: u16, x: u16, y: u16) {
        if let Some(ha) = self.areas.get_mut(&id) {
            ha.x = x;
            ha.y = y;
        }
    }

    pub fn get(&self, id: u16) -> Option<&HitArea> {
        self.areas.get(&id)
    }

    /// True if the box exists and is live
    pub fn is_box_live(&self, id: u16) -> bool {
        self.areas.get(&id).map_or(false, |ha| ha.is_live())
    }

    /// Live box of highest priority under a point
    pub fn find_at(&self, x: u16, y: u16) -> Option<&HitArea> {
        self.areas
            .values()
            .filter(|ha| ha.is_live() && ha.contains(x, y))
            .fold(None, |best: Option<&HitArea>, ha| match best {
                Some(b) if b.priority >= ha.priority => Some(b),
                _ => Some(ha),
            })
    }

    pub fn clear(&mut self) {
        self.areas.clear();
    }
}
