//! Overlay table files
//!
//! Subroutines outside the main game data live in overlay files. The table
//! list names each file with the id ranges it covers; the first file whose
//! range holds a wanted id is loaded on top of the base subroutines,
//! replacing whatever overlay was there before.

use crate::audio::AudioMixer;
use crate::config::{GameConfig, GameVariant, Platform};
use crate::opcode_tables::OpcodeTable;
use crate::reader::ByteReader;
use crate::resource::ResourceStore;
use crate::subroutine::{SubroutineOrigin, SubroutineTable};
use log::{debug, error, info};

/// Bytes before the first entry of a table list
const TABLE_LIST_HEADER: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    pub filename: String,
    /// Inclusive id ranges
    pub ranges: Vec<(u16, u16)>,
}

impl TableEntry {
    pub fn covers(&self, id: u16) -> bool {
        self.ranges.iter().any(|(min, max)| id >= *min && id <= *max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableList {
    entries: Vec<TableEntry>,
}

impl TableList {
    /// Parse a table list: header, then `name\0` with (min, max) pairs ended
    /// by min == 0; a zero byte where a name would start ends the list
    pub fn parse(data: &[u8]) -> Result<Self, String> {
        let mut reader = ByteReader::new(data);
        reader.skip(TABLE_LIST_HEADER)?;
        let mut entries = Vec::new();
        while !reader.is_eof() {
            if data[reader.position()] == 0 {
                break;
            }
            let filename = reader.read_cstr()?;
            let mut ranges = Vec::new();
            loop {
                let min = reader.read_u16()?;
                if min == 0 {
                    break;
                }
                let max = reader.read_u16()?;
                ranges.push((min, max));
            }
            debug!("Table file {filename}: {ranges:?}");
            entries.push(TableEntry { filename, ranges });
        }
        Ok(TableList { entries })
    }

    pub fn from_entries(entries: Vec<TableEntry>) -> Self {
        TableList { entries }
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// First entry covering an id
    pub fn find(&self, id: u16) -> Option<&TableEntry> {
        self.entries.iter().find(|e| e.covers(id))
    }
}

/// File name of an overlay on a platform
pub fn overlay_file_name(name: &str, platform: Platform) -> String {
    if platform == Platform::Acorn {
        format!("{name}.DAT")
    } else {
        name.to_string()
    }
}

/// Effects bank belonging to an overlay: its name with the first six
/// characters replaced by `SFXXXX`
pub fn sfx_file_name(name: &str) -> Option<String> {
    name.get(6..).map(|suffix| format!("SFXXXX{suffix}"))
}

/// Load the overlay that holds subroutine `id`. Returns false when no
/// listed file covers the id.
pub fn load_tables_into_mem(
    id: u16,
    list: &TableList,
    subroutines: &mut SubroutineTable,
    table: &OpcodeTable,
    config: &GameConfig,
    store: &mut dyn ResourceStore,
    audio: &mut dyn AudioMixer,
) -> Result<bool, String> {
    let entry = match list.find(id) {
        Some(entry) => entry,
        None => {
            debug!("load_tables_into_mem: didn't find {id}");
            return Ok(false);
        }
    };

    subroutines.restore_base();

    let file_name = overlay_file_name(&entry.filename, config.platform);
    let data = store.read(&file_name).ok_or_else(|| {
        error!("Overlay {file_name} listed but missing");
        format!("openTablesFile: Can't open '{file_name}'")
    })?;
    subroutines.read_block(
        &mut ByteReader::new(&data),
        table,
        SubroutineOrigin::Overlay(entry.filename.clone()),
    )?;

    if config.variant == GameVariant::Simon1 && config.platform == Platform::Windows {
        if let Some(sfx) = sfx_file_name(&entry.filename) {
            match store.read(&sfx) {
                Some(bank) => audio.load_effects(&sfx, bank),
                None => debug!("No effects bank {sfx}"),
            }
        }
    }

    info!(
        "Loaded overlay {} for subroutine {id}, heap {}/{}",
        entry.filename,
        subroutines.heap().used(),
        subroutines.heap().capacity()
    );
    Ok(true)
}
