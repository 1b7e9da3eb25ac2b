use crate::{snapshot::SaveState, types::TileIndex};
use serde::{Deserialize, Serialize};

/// All player-issued commands, for hosts that drive the engine over JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Run control ───────────────────────────────
    StartGame,
    ResumeGame { save: SaveState },
    StartAfterPreview,
    NextLevel,
    RestartLevel,

    // ── Board ─────────────────────────────────────
    FlipCard { index: TileIndex },

    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
}
