//! Read-only views of the run handed to collaborators.
//!
//! `StateSnapshot` is rebuilt on every emit and owns its data, so a
//! listener can keep or mutate it without touching engine state.
//! `SaveState` is the only thing that survives across sessions.

use crate::types::{Symbol, TileIndex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Tile {
    pub id:         TileIndex,
    pub symbol:     Symbol,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl Tile {
    pub fn new(id: TileIndex, symbol: Symbol) -> Self {
        Self {
            id,
            symbol,
            is_flipped: false,
            is_matched: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StateSnapshot {
    pub tiles:          Vec<Tile>,
    pub score:          u64,
    pub lives:          u32,
    pub level:          u32,
    pub combo:          u32,
    pub time_remaining: u32,
    pub is_paused:      bool,
    pub is_running:     bool,
}

/// Cross-session progress. Tiles are never saved: a resumed level is
/// always dealt fresh.
///
/// Zero `level` or `lives` read as "missing" on resume.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveState {
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub lives: u32,
}
