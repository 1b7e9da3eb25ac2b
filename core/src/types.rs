//! Shared primitive types used across the entire game core.

/// Virtual time in milliseconds since the engine was created.
pub type Millis = u64;

/// Positional index of a tile within the current level's layout.
pub type TileIndex = usize;

/// A tile face. Symbols are static glyphs from the curated catalog.
pub type Symbol = &'static str;

/// Player identifier used by the storage collaborator.
pub type PlayerName = String;
