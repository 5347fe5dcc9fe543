//! Script bit flags
//!
//! Two independent stores: the primary flag array tested by bSet/bZero and
//! friends, and the secondary "array 2" that scripts address as
//! word = bit / 16, mask = 1 << (bit & 15). Both live for the whole session.
use bitvec::prelude::*;
use log::warn;

#[derive(Debug)]
pub struct BitFlagStore {
    primary: BitVec<u16, Lsb0>,
    secondary: Vec<u16>,
}

impl BitFlagStore {
    /// Create zeroed stores of the given sizes
    pub fn new(primary_bits: usize, secondary_words: usize) -> Self {
        BitFlagStore {
            primary: bitvec![u16, Lsb0; 0; primary_bits],
            secondary: vec![0; secondary_words],
        }
    }

    pub fn primary_len(&self) -> usize {
        self.primary.len()
    }

    pub fn secondary_len(&self) -> usize {
        self.secondary.len() * 16
    }

    /// Read a primary flag; out-of-range flags read as clear
    pub fn get(&self, bit: u16) -> bool {
        match self.primary.get(bit as usize) {
            Some(b) => *b,
            None => {
                warn!("Bit flag {} out of range ({} flags)", bit, self.primary.len());
                false
            }
        }
    }

    /// Set or clear a primary flag; out-of-range writes are ignored
    pub fn set(&mut self, bit: u16, value: bool) {
        match self.primary.get_mut(bit as usize) {
            Some(mut b) => *b = value,
            None => warn!("Bit flag {} out of range, write ignored", bit),
        }
    }

    /// Read a flag of the secondary array
    pub fn get2(&self, bit: u16) -> bool {
        match self.secondary.get(bit as usize / 16) {
            Some(word) => word & (1 << (bit & 15)) != 0,
            None => {
                warn!("Array 2 bit {} out of range", bit);
                false
            }
        }
    }

    /// Set or clear a flag of the secondary array
    pub fn set2(&mut self, bit: u16, value: bool) {
        match self.secondary.get_mut(bit as usize / 16) {
            Some(word) => {
                if value {
                    *word |= 1 << (bit & 15);
                } else {
                    *word &= !(1 << (bit & 15));
                }
            }
            None => warn!("Array 2 bit {} out of range, write ignored", bit),
        }
    }

    /// Raw secondary words, in script order
    pub fn secondary_words(&self) -> &[u16] {
        &self.secondary
    }

    /// Raw primary words, 16 flags per word with flag 0 in the low bit
    pub fn primary_words(&self) -> &[u16] {
        self.primary.as_raw_slice()
    }

    pub fn clear_all(&mut self) {
        self.primary.fill(false);
        self.secondary.iter_mut().for_each(|w| *w = 0);
    }
}
