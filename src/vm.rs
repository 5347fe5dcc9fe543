use crate::config::GameVariant;
use crate::flags::BitFlagStore;
use crate::hit_area::HitItem;
use crate::item::{Item, ItemId, NO_ITEM};
use crate::world::{ItemGraph, StringTable, PLAYER_ITEM};
use log::{debug, warn};

/// Mutable state of one game session, shared by every opcode handler
#[derive(Debug)]
pub struct InterpreterState {
    pub variant: GameVariant,
    pub items: ItemGraph,
    pub strings: StringTable,
    pub flags: BitFlagStore,
    /// Script variables
    variables: Vec<u16>,
    /// Small array of remembered items (`storeItem`/`getItem`)
    item_store: Vec<ItemId>,
    /// The "subject" implicit operand
    pub subject_item: Option<ItemId>,
    /// The "object" implicit operand
    pub object_item: Option<ItemId>,
    /// Items of the boxes last clicked for subject and object
    pub hit_area_subject_item: Option<HitItem>,
    pub hit_area_object_item: Option<HitItem>,
    /// Script words matched by the lines of subroutine 0
    pub verb: i16,
    pub noun1: i16,
    pub noun2: i16,
    pub adj1: i16,
    pub adj2: i16,
    pub show_preposition: bool,
    /// Running bias of the `chance` opcode
    pub chance_modifier: i32,
    pub quit_requested: bool,
}

impl InterpreterState {
    pub fn new(variant: GameVariant, items: ItemGraph, strings: StringTable) -> Self {
        let profile = variant.profile();
        InterpreterState {
            variant,
            items,
            strings,
            flags: BitFlagStore::new(profile.primary_bits, profile.secondary_words),
            variables: vec![0; profile.num_vars],
            item_store: vec![NO_ITEM; profile.item_store_size],
            subject_item: None,
            object_item: None,
            hit_area_subject_item: None,
            hit_area_object_item: None,
            verb: 0,
            noun1: 0,
            noun2: 0,
            adj1: 0,
            adj2: 0,
            show_preposition: false,
            chance_modifier: 0,
            quit_requested: false,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    /// Read a variable; out of range reads 0
    pub fn read_variable(&self, var: u16) -> u16 {
        match self.variables.get(var as usize) {
            Some(value) => *value,
            None => {
                warn!("read_variable: variable {var} out of range");
                0
            }
        }
    }

    /// Write a variable; out of range writes are dropped
    pub fn write_variable(&mut self, var: u16, value: u16) {
        match self.variables.get_mut(var as usize) {
            Some(slot) => *slot = value,
            None => warn!("write_variable: variable {var} out of range"),
        }
    }

    /// Item remembered in a store slot; empty or out of range gives None
    pub fn stored_item(&self, slot: u16) -> Option<ItemId> {
        match self.item_store.get(slot as usize) {
            Some(&NO_ITEM) => None,
            Some(id) => Some(*id),
            None => {
                warn!("stored_item: slot {slot} out of range");
                None
            }
        }
    }

    pub fn store_item(&mut self, slot: u16, item: Option<ItemId>) {
        match self.item_store.get_mut(slot as usize) {
            Some(entry) => *entry = item.unwrap_or(NO_ITEM),
            None => warn!("store_item: slot {slot} out of range"),
        }
    }

    /// The player item
    pub fn me(&self) -> ItemId {
        PLAYER_ITEM
    }

    /// Whatever contains the player, if anything
    pub fn player_parent(&self) -> Option<ItemId> {
        self.item_ref(self.items.parent_of(PLAYER_ITEM))
    }

    /// An id as an item reference; 0 and unused ids give None
    pub fn item_ref(&self, id: ItemId) -> Option<ItemId> {
        if self.items.contains(id) {
            Some(id)
        } else {
            if id != NO_ITEM {
                debug!("item_ref: no item {id}");
            }
            None
        }
    }

    pub fn item(&self, id: Option<ItemId>) -> Option<&Item> {
        id.and_then(|id| self.items.get(id))
    }

    pub fn item_mut(&mut self, id: Option<ItemId>) -> Option<&mut Item> {
        id.and_then(move |id| self.items.get_mut(id))
    }

    /// Resolve a box item to a world item
    pub fn resolve_hit_item(&self, item: Option<HitItem>) -> Option<ItemId> {
        match item? {
            HitItem::Item(id) => self.item_ref(id),
            HitItem::EmptyHands => Some(self.me()),
            HitItem::PlayerContainer => self.player_parent(),
        }
    }
}
