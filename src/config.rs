//! Game configuration and per-variant engine profiles
//!
//! A session is pinned to one historical game variant and one platform. The
//! variant decides operand encodings, table sizes and which compatibility
//! shims are active; the platform decides file naming.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Historical game variants understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    Elvira1,
    Elvira2,
    Waxworks,
    Simon1,
    Simon2,
    Feeble,
    Puzzle,
}

/// Target platform of the data files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Dos,
    Amiga,
    AtariSt,
    Acorn,
    Windows,
}

/// Fixed engine parameters for a variant
#[derive(Debug)]
pub struct VariantProfile {
    /// Number of script variables
    pub num_vars: usize,
    /// Number of primary bit flags
    pub primary_bits: usize,
    /// Number of 16-bit words in the secondary flag array
    pub secondary_words: usize,
    /// Size of the item store used by storeItem/getItem
    pub item_store_size: usize,
    /// Variable that receives the id of a clicked text box
    pub hit_area_id_var: usize,
    /// Opcodes and byte operands are encoded as words
    pub word_opcodes: bool,
    /// Word operands in this range are variable references
    pub var_ref_range: (u16, u16),
    /// Default name of the world data file
    pub game_file: &'static str,
}

static ELVIRA1_PROFILE: VariantProfile = VariantProfile {
    num_vars: 512,
    primary_bits: 256,
    secondary_words: 16,
    item_store_size: 50,
    hit_area_id_var: 60,
    word_opcodes: true,
    var_ref_range: (30000, 30512),
    game_file: "GAMEPC",
};

static ELVIRA2_PROFILE: VariantProfile = VariantProfile {
    num_vars: 512,
    primary_bits: 1024,
    secondary_words: 16,
    item_store_size: 50,
    hit_area_id_var: 60,
    word_opcodes: false,
    var_ref_range: (30000, 30512),
    game_file: "GAMEPC",
};

static SIMON_PROFILE: VariantProfile = VariantProfile {
    num_vars: 256,
    primary_bits: 2048,
    secondary_words: 16,
    item_store_size: 50,
    hit_area_id_var: 60,
    word_opcodes: false,
    var_ref_range: (30000, 30512),
    game_file: "GAMEPC",
};

static FEEBLE_PROFILE: VariantProfile = VariantProfile {
    num_vars: 256,
    primary_bits: 2048,
    secondary_words: 16,
    item_store_size: 50,
    hit_area_id_var: 78,
    word_opcodes: false,
    var_ref_range: (30000, 30512),
    game_file: "GAME22",
};

static PUZZLE_PROFILE: VariantProfile = VariantProfile {
    num_vars: 2048,
    primary_bits: 2048,
    secondary_words: 16,
    item_store_size: 50,
    hit_area_id_var: 78,
    word_opcodes: false,
    var_ref_range: (60000, 62048),
    game_file: "GAME25",
};

impl GameVariant {
    /// Static engine profile of this variant
    pub fn profile(self) -> &'static VariantProfile {
        match self {
            GameVariant::Elvira1 => &ELVIRA1_PROFILE,
            GameVariant::Elvira2 => &ELVIRA2_PROFILE,
            GameVariant::Waxworks | GameVariant::Simon1 | GameVariant::Simon2 => &SIMON_PROFILE,
            GameVariant::Feeble => &FEEBLE_PROFILE,
            GameVariant::Puzzle => &PUZZLE_PROFILE,
        }
    }

    /// The two late variants with their own allocator and lockout rules
    pub fn is_late(self) -> bool {
        matches!(self, GameVariant::Feeble | GameVariant::Puzzle)
    }

    /// Variable references inside opcodes are word encoded
    pub fn word_var_refs(self) -> bool {
        matches!(self, GameVariant::Elvira1 | GameVariant::Puzzle)
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameVariant::Elvira1 => "Elvira: Mistress of the Dark",
            GameVariant::Elvira2 => "Elvira II: The Jaws of Cerberus",
            GameVariant::Waxworks => "Waxworks",
            GameVariant::Simon1 => "Simon the Sorcerer",
            GameVariant::Simon2 => "Simon the Sorcerer II",
            GameVariant::Feeble => "The Feeble Files",
            GameVariant::Puzzle => "Puzzle Pack",
        };
        write!(f, "{name}")
    }
}

fn default_copy_protection() -> bool {
    true
}

fn default_zone_memory_size() -> usize {
    1_000_000
}

fn default_tables_heap_size() -> usize {
    160_000
}

fn default_start_subroutine() -> u16 {
    101
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Session configuration, normally read from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub variant: GameVariant,
    pub platform: Platform,
    /// Directory holding the game data files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// World data file name (defaults to the variant's usual name)
    #[serde(default)]
    pub game_file: Option<String>,
    /// Overlay table list file name, if the game uses overlays
    #[serde(default)]
    pub table_list_file: Option<String>,
    /// Speech release
    #[serde(default)]
    pub talkie: bool,
    /// Run the manual-lookup protection scripts
    #[serde(default = "default_copy_protection")]
    pub copy_protection: bool,
    #[serde(default = "default_zone_memory_size")]
    pub zone_memory_size: usize,
    #[serde(default = "default_tables_heap_size")]
    pub tables_heap_size: usize,
    /// Fixed seed for the script random generator
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_start_subroutine")]
    pub start_subroutine: u16,
}

impl GameConfig {
    /// Configuration with defaults for everything but variant and platform
    pub fn new(variant: GameVariant, platform: Platform) -> Self {
        GameConfig {
            variant,
            platform,
            data_dir: default_data_dir(),
            game_file: None,
            table_list_file: None,
            talkie: false,
            copy_protection: default_copy_protection(),
            zone_memory_size: default_zone_memory_size(),
            tables_heap_size: default_tables_heap_size(),
            seed: None,
            start_subroutine: default_start_subroutine(),
        }
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("Invalid configuration: {e}"))
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read configuration '{}': {}", path.display(), e))?;
        Self::from_toml_str(&text)
    }

    pub fn profile(&self) -> &'static VariantProfile {
        self.variant.profile()
    }

    /// World data file name, honouring an explicit override
    pub fn game_file_name(&self) -> &str {
        self.game_file
            .as_deref()
            .unwrap_or(self.variant.profile().game_file)
    }
}
