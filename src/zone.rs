//! Zone memory: a circular arena for graphics and sound blocks
//!
//! Each zone owns up to three blocks: animation definitions (file 1), sprite
//! images (file 2) and sound (sfx). Allocation carves blocks from `current`
//! and wraps to `base` at the end of the pool. A candidate block is rejected
//! if it would clobber the no-overwrite zone or a zone with a running
//! animation; otherwise every zone whose blocks it touches is evicted.
//!
//! Everything below `base` is protected. Freezing moves `base` up to the
//! allocation point, unfreezing drops it back to the start of the pool.

use crate::config::{GameVariant, Platform};
use crate::resource::{zone_file_name, ResourceStore};
use log::{debug, error, info, warn};

/// Number of zone entries
pub const NUM_ZONES: usize = 450;

/// Number of animation sprite slots
pub const MAX_SPRITES: usize = 200;

/// Extra bytes reserved behind the sprite file of zone 2 in the Simon games
const ZONE2_EXTRA: usize = 6400;

/// Zone classes of the Waxworks Amiga release; zones of class 3 take their
/// sprite images from a shared zone (18, or 94 from zone 85 on)
static WW_AMIGA_ZONE_TABLE: [u8; 160] = [
    0, 0, 2, 2, 2, 2, 0, 2, 2, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    2, 0, 3, 3, 3, 1, 3, 0, 0, 0, 1, 0, 2, 0, 0, 0, 1, 0, 0, 0, //
    1, 2, 1, 1, 1, 1, 1, 0, 0, 0, 2, 0, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, //
    2, 2, 2, 0, 0, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, //
    3, 3, 3, 3, 3, 3, 3, 2, 2, 2, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, //
    2, 2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
];

/// A block of the pool, `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Blocks of one zone; None means not loaded
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VgaPointersEntry {
    pub vga_file1: Option<Span>,
    pub vga_file2: Option<Span>,
    pub sfx_file: Option<Span>,
}

impl VgaPointersEntry {
    pub fn is_loaded(&self) -> bool {
        self.vga_file1.is_some()
    }

    fn spans(&self) -> impl Iterator<Item = Span> {
        [self.vga_file1, self.vga_file2, self.sfx_file]
            .into_iter()
            .flatten()
    }

    fn clear(&mut self) {
        *self = VgaPointersEntry::default();
    }
}

/// How a candidate block is tested against a live block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapRule {
    /// A conflict is either endpoint of the live block falling inside the
    /// candidate, ends inclusive; eviction tests the start only
    Endpoints,
    /// Plain half-open interval overlap
    HalfOpen,
}

impl OverlapRule {
    pub fn for_variant(variant: GameVariant) -> Self {
        if variant.is_late() {
            OverlapRule::HalfOpen
        } else {
            OverlapRule::Endpoints
        }
    }

    fn conflicts(self, block: Span, live: Span) -> bool {
        match self {
            OverlapRule::Endpoints => {
                (block.start <= live.start && block.end >= live.start)
                    || (block.start <= live.end && block.end >= live.end)
            }
            OverlapRule::HalfOpen => live.start < block.end && live.end > block.start,
        }
    }

    fn evicts(self, block: Span, live: Span) -> bool {
        match self {
            OverlapRule::Endpoints => live.start >= block.start && live.start <= block.end,
            OverlapRule::HalfOpen => live.start < block.end && live.end > block.start,
        }
    }

    /// Where to retry after a rejected candidate
    fn skip_past(self, live: Span) -> usize {
        match self {
            OverlapRule::Endpoints => live.end + 1,
            OverlapRule::HalfOpen => live.end,
        }
    }
}

/// A running animation; id 0 marks the end of the active list
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VgaSprite {
    pub id: u16,
    pub zone: u16,
    pub window: u16,
    pub x: i16,
    pub y: i16,
    pub palette: u16,
}

/// Snapshot of the arena cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaCursors {
    pub real_base: usize,
    pub base: usize,
    pub current: usize,
    pub frozen_base: usize,
    pub end: usize,
}

/// Per-call settings for zone loading
#[derive(Debug, Clone, Copy)]
pub struct ZoneLoadContext {
    pub variant: GameVariant,
    pub platform: Platform,
    pub talkie: bool,
    /// Check running animations when placing blocks
    pub scan_anims: bool,
}

#[derive(Debug)]
pub struct ZoneArena {
    memory: Vec<u8>,
    real_base: usize,
    base: usize,
    current: usize,
    frozen_base: usize,
    end: usize,
    entries: Vec<VgaPointersEntry>,
    sprites: Vec<VgaSprite>,
    no_overwrite: Option<u16>,
    rule: OverlapRule,
}

impl ZoneArena {
    pub fn new(size: usize, rule: OverlapRule) -> Self {
        ZoneArena {
            memory: vec![0; size],
            real_base: 0,
            base: 0,
            current: 0,
            frozen_base: 0,
            end: size,
            entries: vec![VgaPointersEntry::default(); NUM_ZONES],
            sprites: vec![VgaSprite::default(); MAX_SPRITES],
            no_overwrite: None,
            rule,
        }
    }

    pub fn cursors(&self) -> ArenaCursors {
        ArenaCursors {
            real_base: self.real_base,
            base: self.base,
            current: self.current,
            frozen_base: self.frozen_base,
            end: self.end,
        }
    }

    pub fn entry(&self, zone: u16) -> Option<&VgaPointersEntry> {
        self.entries.get(zone as usize)
    }

    pub fn is_loaded(&self, zone: u16) -> bool {
        self.entry(zone).map_or(false, |e| e.is_loaded())
    }

    /// Bytes of a block
    pub fn data(&self, span: Span) -> &[u8] {
        self.memory.get(span.start..span.end).unwrap_or(&[])
    }

    pub fn no_overwrite(&self) -> Option<u16> {
        self.no_overwrite
    }

    /// Protect one zone's blocks from being overwritten, or none
    pub fn set_no_overwrite(&mut self, zone: Option<u16>) {
        self.no_overwrite = zone;
    }

    /// Carve `size` bytes out of the pool
    pub fn alloc_block(&mut self, size: usize, scan_anims: bool) -> Result<Span, String> {
        if self.base + size >= self.end {
            error!(
                "alloc_block: {} bytes cannot fit between {} and {}",
                size, self.base, self.end
            );
            return Err(format!("Out of zone memory allocating {size} bytes"));
        }
        let mut wraps = 0;
        loop {
            let block = Span::new(self.current, self.current + size);
            if block.end >= self.end {
                wraps += 1;
                if wraps > 2 {
                    error!("alloc_block: no room for {size} bytes after scanning the pool");
                    return Err(format!("Out of zone memory allocating {size} bytes"));
                }
                self.current = self.base;
                continue;
            }
            if let Some(retry) = self.check_no_overwrite(block) {
                self.current = retry;
                continue;
            }
            if scan_anims {
                if let Some(retry) = self.check_running_anims(block) {
                    self.current = retry;
                    continue;
                }
            }
            self.check_zone_ptrs(block);
            self.current = block.end;
            return Ok(block);
        }
    }

    fn check_no_overwrite(&self, block: Span) -> Option<usize> {
        let entry = self.entry(self.no_overwrite?)?;
        [entry.vga_file1, entry.vga_file2]
            .into_iter()
            .flatten()
            .find(|live| self.rule.conflicts(block, *live))
            .map(|live| self.rule.skip_past(live))
    }

    fn check_running_anims(&self, block: Span) -> Option<usize> {
        for sprite in self.active_sprites() {
            if let Some(retry) = self.check_anims(sprite.zone, block) {
                return Some(retry);
            }
        }
        None
    }

    fn check_anims(&self, zone: u16, block: Span) -> Option<usize> {
        let entry = self.entry(zone)?;
        entry
            .spans()
            .find(|live| self.rule.conflicts(block, *live))
            .map(|live| self.rule.skip_past(live))
    }

    fn check_zone_ptrs(&mut self, block: Span) {
        let rule = self.rule;
        for (zone, entry) in self.entries.iter_mut().enumerate() {
            if entry.spans().any(|live| rule.evicts(block, live)) {
                debug!("Zone {zone} evicted by block {}..{}", block.start, block.end);
                entry.clear();
            }
        }
    }

    /// Protect everything allocated so far until `unfreeze_bottom`
    pub fn freeze_bottom(&mut self) {
        self.base = self.current;
        self.frozen_base = self.current;
    }

    pub fn unfreeze_bottom(&mut self) {
        self.current = self.real_base;
        self.base = self.real_base;
        self.frozen_base = self.real_base;
    }

    /// Protect everything allocated so far until `unlock_zones`
    pub fn lock_zones(&mut self) {
        self.base = self.current;
    }

    pub fn unlock_zones(&mut self) {
        self.current = self.frozen_base;
        self.base = self.frozen_base;
    }

    /// Forget a zone's blocks
    pub fn unload_zone(&mut self, zone: u16) {
        match self.entries.get_mut(zone as usize) {
            Some(entry) => entry.clear(),
            None => warn!("unload_zone: zone {zone} out of range"),
        }
    }

    /// Make sure a zone's blocks are in memory. Load order is sprite images,
    /// then animation definitions, then sound.
    pub fn load_zone(
        &mut self,
        zone: u16,
        ctx: &ZoneLoadContext,
        store: &mut dyn ResourceStore,
        use_error: bool,
    ) -> Result<(), String> {
        if zone as usize >= NUM_ZONES {
            warn!("load_zone: zone {zone} out of range");
            return Ok(());
        }
        if self.entries[zone as usize].vga_file1.is_some() {
            return Ok(());
        }

        let image_zone = if ctx.platform == Platform::Amiga
            && ctx.variant == GameVariant::Waxworks
            && WW_AMIGA_ZONE_TABLE.get(zone as usize) == Some(&3)
        {
            if zone >= 85 {
                94
            } else {
                18
            }
        } else {
            zone
        };

        let file2 = self.load_vga_file(image_zone, 2, ctx, store, use_error)?;
        self.entries[zone as usize].vga_file2 = file2;

        let file1 = self.load_vga_file(zone, 1, ctx, store, use_error)?;
        self.entries[zone as usize].vga_file1 = file1;

        self.entries[zone as usize].sfx_file = None;
        let sfx = self.load_vga_file(zone, 3, ctx, store, false)?;
        self.entries[zone as usize].sfx_file = sfx;

        info!(
            "Loaded zone {zone}: file1 {:?}, file2 {:?}, sfx {:?}",
            file1, file2, sfx
        );
        Ok(())
    }

    fn load_vga_file(
        &mut self,
        zone: u16,
        kind: u8,
        ctx: &ZoneLoadContext,
        store: &mut dyn ResourceStore,
        use_error: bool,
    ) -> Result<Option<Span>, String> {
        let name = zone_file_name(ctx.variant, ctx.platform, ctx.talkie, zone, kind);
        let data = match store.read(&name) {
            Some(data) => data,
            None => {
                if use_error {
                    error!("Zone {zone}: cannot load {name}");
                    return Err(format!("loadVGAVideoFile: Can't load {name}"));
                }
                debug!("Zone {zone}: no {name}");
                return Ok(None);
            }
        };
        let mut size = data.len();
        if kind == 2
            && zone == 2
            && matches!(ctx.variant, GameVariant::Simon1 | GameVariant::Simon2)
        {
            size += ZONE2_EXTRA;
        }
        let span = self.alloc_block(size, ctx.scan_anims)?;
        self.memory[span.start..span.start + data.len()].copy_from_slice(&data);
        Ok(Some(span))
    }

    /// Running sprites, up to the first empty slot
    pub fn active_sprites(&self) -> impl Iterator<Item = &VgaSprite> {
        self.sprites.iter().take_while(|s| s.id != 0)
    }

    pub fn is_sprite_loaded(&self, id: u16, zone: u16) -> bool {
        self.active_sprites().any(|s| s.id == id && s.zone == zone)
    }

    /// Put a sprite in the first free slot; false when all slots are taken
    pub fn add_sprite(&mut self, sprite: VgaSprite) -> bool {
        match self.sprites.iter_mut().find(|s| s.id == 0) {
            Some(slot) => {
                *slot = sprite;
                true
            }
            None => {
                warn!("add_sprite: no free sprite slot for {}", sprite.id);
                false
            }
        }
    }

    /// Remove a sprite, keeping the active list contiguous
    pub fn remove_sprite(&mut self, id: u16, zone: u16) -> bool {
        let active = self.active_sprites().count();
        match self.sprites[..active]
            .iter()
            .position(|s| s.id == id && s.zone == zone)
        {
            Some(index) => {
                self.sprites[index..active].rotate_left(1);
                self.sprites[active - 1] = VgaSprite::default();
                true
            }
            None => false,
        }
    }

    pub fn clear_sprites(&mut self) {
        self.sprites.iter_mut().for_each(|s| *s = VgaSprite::default());
    }
}
