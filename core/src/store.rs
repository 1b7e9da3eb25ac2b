//! SQLite persistence for the storage collaborator.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never touches storage; hosts move `SaveState` values and
//! game-over results in and out through this type.

use crate::{error::GameResult, snapshot::SaveState};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Entries kept on the leaderboard after every insert.
pub const LEADERBOARD_SIZE: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name:  String,
    pub score: u64,
    pub level: u32,
    pub date:  String,
}

pub struct GameStore {
    conn: Connection,
}

impl GameStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Save slots ─────────────────────────────────────────────

    pub fn save_progress(&self, player: &str, state: &SaveState) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO save_slot (player, level, score, lives, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(player) DO UPDATE SET
                level = excluded.level,
                score = excluded.score,
                lives = excluded.lives,
                saved_at = excluded.saved_at",
            params![
                player,
                state.level.max(1),
                state.score as i64,
                state.lives,
                Utc::now().to_rfc3339(),
            ],
        )?;
        log::debug!("saved progress for {player}: {state:?}");
        Ok(())
    }

    pub fn load_progress(&self, player: &str) -> GameResult<Option<SaveState>> {
        let state = self
            .conn
            .query_row(
                "SELECT level, score, lives FROM save_slot WHERE player = ?1",
                params![player],
                |row| {
                    Ok(SaveState {
                        level: row.get(0)?,
                        score: row.get::<_, i64>(1)? as u64,
                        lives: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(state)
    }

    pub fn clear_progress(&self, player: &str) -> GameResult<()> {
        self.conn
            .execute("DELETE FROM save_slot WHERE player = ?1", params![player])?;
        Ok(())
    }

    // ── Leaderboard ────────────────────────────────────────────

    /// Record a finished run dated today and return the retained board.
    pub fn add_leaderboard_entry(
        &self,
        name: &str,
        score: u64,
        level: u32,
    ) -> GameResult<Vec<LeaderboardEntry>> {
        self.add_leaderboard_entry_on(name, score, level, Utc::now().date_naive())
    }

    pub fn add_leaderboard_entry_on(
        &self,
        name: &str,
        score: u64,
        level: u32,
        date: NaiveDate,
    ) -> GameResult<Vec<LeaderboardEntry>> {
        self.conn.execute(
            "INSERT INTO leaderboard (name, score, level, date) VALUES (?1, ?2, ?3, ?4)",
            params![name, score as i64, level, date.format("%Y-%m-%d").to_string()],
        )?;
        // Ties keep the earlier entry ahead.
        self.conn.execute(
            "DELETE FROM leaderboard WHERE id NOT IN (
                SELECT id FROM leaderboard ORDER BY score DESC, id ASC LIMIT ?1
             )",
            params![LEADERBOARD_SIZE as i64],
        )?;
        log::info!("leaderboard: {name} scored {score} at level {level}");
        self.leaderboard()
    }

    /// Entries ranked by score, best first.
    pub fn leaderboard(&self) -> GameResult<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, score, level, date FROM leaderboard
             ORDER BY score DESC, id ASC",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(LeaderboardEntry {
                    name:  row.get(0)?,
                    score: row.get::<_, i64>(1)? as u64,
                    level: row.get(2)?,
                    date:  row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
