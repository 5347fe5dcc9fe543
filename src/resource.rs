//! Access to game data files
//!
//! Files are fetched whole by name. The directory store tolerates the case
//! mix found on old distribution media.

use crate::config::{GameVariant, Platform};
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub trait ResourceStore {
    /// Whole contents of a named file, None if it does not exist
    fn read(&mut self, name: &str) -> Option<Vec<u8>>;
}

/// Files in a directory on disk
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryStore { root: root.into() }
    }
}

impl ResourceStore for DirectoryStore {
    fn read(&mut self, name: &str) -> Option<Vec<u8>> {
        for candidate in [name.to_string(), name.to_uppercase(), name.to_lowercase()] {
            let path = self.root.join(&candidate);
            if let Ok(data) = fs::read(&path) {
                debug!("Read {} ({} bytes)", path.display(), data.len());
                return Some(data);
            }
        }
        debug!("No file {name} in {}", self.root.display());
        None
    }
}

/// Files held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, data: Vec<u8>) {
        self.files.insert(name.to_uppercase(), data);
    }

    pub fn with_file(mut self, name: &str, data: Vec<u8>) -> Self {
        self.insert(name, data);
        self
    }
}

impl ResourceStore for MemoryStore {
    fn read(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.get(&name.to_uppercase()).cloned()
    }
}

/// File name of one part of a zone; `kind` is 1 for animation definitions,
/// 2 for sprite images and 3 for sound
pub fn zone_file_name(
    variant: GameVariant,
    platform: Platform,
    talkie: bool,
    zone: u16,
    kind: u8,
) -> String {
    let elvira = matches!(
        variant,
        GameVariant::Elvira1 | GameVariant::Elvira2 | GameVariant::Waxworks
    );
    match platform {
        Platform::Amiga | Platform::AtariSt => {
            if elvira {
                format!("{zone:02}{kind}.out")
            } else if talkie {
                format!("{zone:03}{kind}.out")
            } else {
                format!("{zone:03}{kind}.pkd")
            }
        }
        Platform::Acorn => format!("{zone:03}{kind}.DAT"),
        _ if elvira => format!("{zone:02}{kind}.VGA"),
        _ => format!("{zone:03}{kind}.VGA"),
    }
}
