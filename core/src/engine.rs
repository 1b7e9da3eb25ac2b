//! The game engine: owner of the run and its only mutator.
//!
//! TIMING MODEL:
//!   - Time is virtual. The host calls `advance(ms)`; nothing sleeps.
//!   - Two independent timers exist: the countdown clock's periodic
//!     decrement, and at most one pending delayed transition
//!     (preview end or mismatch review).
//!   - Due timers fire in time order. On a tie the delayed transition
//!     fires before the clock.
//!
//! RULES:
//!   - Illegal player input is a silent no-op, never an error.
//!   - `is_locked` is held for as long as a delayed transition is pending,
//!     so no flip can land while a preview or review is on screen.
//!   - Every mutation ends with a `StateChanged` event carrying a fresh
//!     snapshot; derived changes complete before it is emitted.
//!   - Pausing freezes the clock only. A pending review still completes.

use crate::{
    clock::{ClockSignal, CountdownClock},
    command::PlayerCommand,
    config::GameConfig,
    error::GameResult,
    event::{ChannelListener, FnListener, GameEvent, GameListener},
    pair_source::{PairSource, SymbolCategory},
    rng::RngBank,
    snapshot::{SaveState, StateSnapshot, Tile},
    types::{Millis, Symbol, TileIndex},
};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;

/// Coarse state of the run, derived from the engine's flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Previewing,
    Playing,
    Resolving,
    Paused,
    LevelComplete,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    LevelComplete,
    GameOver,
}

type PreviewCallback = Box<dyn FnOnce() + Send>;

enum Transition {
    PreviewEnd { on_done: PreviewCallback },
    MismatchReview { first: TileIndex, second: TileIndex },
}

struct PendingTransition {
    due_at:     Millis,
    transition: Transition,
}

/// Everything that is dealt fresh or reset between levels and runs.
struct RunState {
    level:         u32,
    score:         u64,
    lives:         u32,
    combo:         u32,
    tiles:         Vec<Tile>,
    flipped:       Vec<TileIndex>,
    matched:       Vec<bool>,
    matched_count: usize,
    is_locked:     bool,
    is_paused:     bool,
    is_running:    bool,
    is_previewing: bool,
    total_matches: u32,
    outcome:       Option<RunOutcome>,
}

impl RunState {
    fn new(max_lives: u32) -> Self {
        Self {
            level:         1,
            score:         0,
            lives:         max_lives,
            combo:         0,
            tiles:         Vec::new(),
            flipped:       Vec::with_capacity(2),
            matched:       Vec::new(),
            matched_count: 0,
            is_locked:     false,
            is_paused:     false,
            is_running:    false,
            is_previewing: false,
            total_matches: 0,
            outcome:       None,
        }
    }
}

pub struct GameEngine {
    config:      GameConfig,
    pair_source: PairSource,
    clock:       CountdownClock,
    listeners:   Vec<Box<dyn GameListener>>,
    now:         Millis,
    pending:     Option<PendingTransition>,
    run:         RunState,
}

impl GameEngine {
    /// `config` is trusted as given. Use `from_config` for tunings that
    /// have not been through `GameConfig::validate`.
    pub fn new(seed: u64, config: GameConfig) -> Self {
        Self::with_categories(seed, config, SymbolCategory::ALL)
    }

    /// Validate `config`, then build an engine over the full catalog.
    pub fn from_config(seed: u64, config: GameConfig) -> GameResult<Self> {
        config.validate()?;
        Ok(Self::new(seed, config))
    }

    /// An engine dealing only symbols from `categories`.
    pub fn with_categories(seed: u64, config: GameConfig, categories: &[SymbolCategory]) -> Self {
        let bank = RngBank::new(seed);
        Self {
            pair_source: PairSource::with_categories(&bank, categories),
            clock:       CountdownClock::new(config.timing.clock_interval_ms),
            listeners:   Vec::new(),
            now:         0,
            pending:     None,
            run:         RunState::new(config.level.max_lives),
            config,
        }
    }

    // ── Listeners ─────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl GameListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn subscribe_fn<F>(&mut self, f: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.subscribe(FnListener(f));
    }

    /// Register a channel listener and hand back its receiving end.
    pub fn event_channel(&mut self) -> Receiver<GameEvent> {
        let (listener, rx) = ChannelListener::channel();
        self.subscribe(listener);
        rx
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig { &self.config }
    pub fn clock(&self) -> &CountdownClock { &self.clock }
    pub fn now(&self) -> Millis { self.now }
    pub fn level(&self) -> u32 { self.run.level }
    pub fn score(&self) -> u64 { self.run.score }
    pub fn lives(&self) -> u32 { self.run.lives }
    pub fn combo(&self) -> u32 { self.run.combo }
    pub fn tiles(&self) -> &[Tile] { &self.run.tiles }
    pub fn flipped(&self) -> &[TileIndex] { &self.run.flipped }
    pub fn matched_count(&self) -> usize { self.run.matched_count }
    pub fn total_matches(&self) -> u32 { self.run.total_matches }
    pub fn is_locked(&self) -> bool { self.run.is_locked }
    pub fn is_paused(&self) -> bool { self.run.is_paused }
    pub fn is_running(&self) -> bool { self.run.is_running }
    pub fn is_previewing(&self) -> bool { self.run.is_previewing }
    pub fn time_remaining(&self) -> u32 { self.clock.remaining() }
    pub fn has_pending_transition(&self) -> bool { self.pending.is_some() }

    pub fn is_matched(&self, index: TileIndex) -> bool {
        self.run.matched.get(index).copied().unwrap_or(false)
    }

    pub fn phase(&self) -> Phase {
        match self.run.outcome {
            Some(RunOutcome::GameOver) => return Phase::GameOver,
            Some(RunOutcome::LevelComplete) => return Phase::LevelComplete,
            None => {}
        }
        if !self.run.is_running {
            Phase::Idle
        } else if self.run.is_paused {
            Phase::Paused
        } else if self.run.is_previewing {
            Phase::Previewing
        } else if self.run.flipped.len() == 2 {
            Phase::Resolving
        } else {
            Phase::Playing
        }
    }

    pub fn pair_count(&self, level: u32) -> usize {
        self.config.level.pair_count(level)
    }

    pub fn time_budget(&self, level: u32) -> u32 {
        self.config.level.time_budget(level)
    }

    /// Board column hint for the renderer.
    pub fn column_count(&self) -> usize {
        self.config.layout.columns_for(self.run.tiles.len())
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            tiles:          self.run.tiles.clone(),
            score:          self.run.score,
            lives:          self.run.lives,
            level:          self.run.level,
            combo:          self.run.combo,
            time_remaining: self.clock.remaining(),
            is_paused:      self.run.is_paused,
            is_running:     self.run.is_running,
        }
    }

    /// Progress worth persisting. Tile state is not saved.
    pub fn save_state(&self) -> SaveState {
        SaveState {
            level: self.run.level,
            score: self.run.score,
            lives: self.run.lives,
        }
    }

    /// A decorative symbol. Does not affect the layouts of this run.
    pub fn random_symbol(&mut self) -> Symbol {
        self.pair_source.random_symbol()
    }

    // ── Run control ───────────────────────────────────────────

    pub fn start_game(&mut self) {
        self.run = RunState::new(self.config.level.max_lives);
        self.start_level();
    }

    /// Continue from saved progress. The level is dealt fresh.
    pub fn resume_game(&mut self, saved: SaveState) {
        let max_lives = self.config.level.max_lives;
        self.run = RunState::new(max_lives);
        self.run.level = saved.level.max(1);
        self.run.score = saved.score;
        self.run.lives = match saved.lives {
            0 => max_lives,
            lives => lives.min(max_lives),
        };
        self.start_level();
    }

    pub fn next_level(&mut self) {
        self.run.level = self.run.level.saturating_add(1);
        self.run.lives = self.run.lives.saturating_add(1).min(self.config.level.max_lives);
        self.start_level();
    }

    /// Retry the current level with full lives. Score is kept.
    pub fn restart_level(&mut self) {
        self.run.lives = self.config.level.max_lives;
        self.run.combo = 0;
        self.start_level();
    }

    /// Show every tile, then after the preview delay hide them, unlock the
    /// board, start the clock and call `on_done`.
    pub fn start_after_preview<F>(&mut self, on_done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.run.is_previewing || self.pending.is_some() {
            log::warn!(
                "start_after_preview ignored: previewing={} pending={}",
                self.run.is_previewing,
                self.pending.is_some()
            );
            return;
        }

        for tile in &mut self.run.tiles {
            tile.is_flipped = true;
        }
        self.emit_state();

        self.pending = Some(PendingTransition {
            due_at:     self.now.saturating_add(self.config.timing.preview_ms),
            transition: Transition::PreviewEnd { on_done: Box::new(on_done) },
        });
    }

    pub fn flip_card(&mut self, index: TileIndex) {
        if self.run.is_locked || self.run.is_paused || !self.run.is_running {
            return;
        }
        let Some(tile) = self.run.tiles.get_mut(index) else {
            return;
        };
        if tile.is_matched || tile.is_flipped || self.run.flipped.contains(&index) {
            return;
        }

        tile.is_flipped = true;
        self.run.flipped.push(index);
        self.emit(GameEvent::CardFlipped { index });

        if self.run.flipped.len() == 2 {
            self.run.is_locked = true;
            self.resolve_pair();
        }

        self.emit_state();
    }

    pub fn pause(&mut self) {
        if !self.run.is_running {
            return;
        }
        self.run.is_paused = true;
        self.clock.pause();
        self.emit_state();
    }

    pub fn resume(&mut self) {
        if !self.run.is_running {
            return;
        }
        self.run.is_paused = false;
        // The clock for this level only exists once the preview is over.
        if !self.run.is_previewing {
            self.clock.resume(self.now);
        }
        self.emit_state();
    }

    pub fn apply(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartGame           => self.start_game(),
            PlayerCommand::ResumeGame { save } => self.resume_game(save),
            PlayerCommand::StartAfterPreview   => self.start_after_preview(|| {}),
            PlayerCommand::NextLevel           => self.next_level(),
            PlayerCommand::RestartLevel        => self.restart_level(),
            PlayerCommand::FlipCard { index }  => self.flip_card(index),
            PlayerCommand::Pause               => self.pause(),
            PlayerCommand::Resume              => self.resume(),
        }
    }

    // ── Time ──────────────────────────────────────────────────

    /// Move virtual time forward by `ms`, firing every timer that
    /// comes due on the way, in order.
    pub fn advance(&mut self, ms: Millis) {
        let target = self.now.saturating_add(ms);

        loop {
            let pending_due = self.pending.as_ref().map(|p| p.due_at);
            let clock_due = self.clock.next_due();
            let next = match (pending_due, clock_due) {
                (Some(p), Some(c)) => p.min(c),
                (Some(p), None) => p,
                (None, Some(c)) => c,
                (None, None) => break,
            };
            if next > target {
                break;
            }

            self.now = next;
            if pending_due == Some(next) {
                self.fire_pending();
            } else {
                let signals = self.clock.fire();
                self.handle_clock(signals);
            }
        }

        self.now = target;
    }

    // ── Internals ─────────────────────────────────────────────

    fn start_level(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("level {}: cancelled pending transition", self.run.level);
        }
        self.clock.stop();

        let pairs = self.pair_count(self.run.level);
        let symbols = self.pair_source.pairs(pairs);
        let tile_count = symbols.len();

        self.run.tiles = symbols
            .into_iter()
            .enumerate()
            .map(|(id, symbol)| Tile::new(id, symbol))
            .collect();
        self.run.flipped.clear();
        self.run.matched = vec![false; tile_count];
        self.run.matched_count = 0;
        self.run.is_locked = true;
        self.run.is_paused = false;
        self.run.is_running = true;
        self.run.is_previewing = true;
        self.run.combo = 0;
        self.run.outcome = None;

        log::info!(
            "level {} dealt: {} tiles, {}s budget, lives={} score={}",
            self.run.level,
            tile_count,
            self.time_budget(self.run.level),
            self.run.lives,
            self.run.score
        );
        self.emit_state();
    }

    fn resolve_pair(&mut self) {
        let (first, second) = (self.run.flipped[0], self.run.flipped[1]);

        if self.run.tiles[first].symbol == self.run.tiles[second].symbol {
            for index in [first, second] {
                self.run.tiles[index].is_matched = true;
                self.run.matched[index] = true;
            }
            self.run.matched_count += 2;
            self.run.total_matches += 1;
            self.run.combo += 1;

            let points = self.config.level.match_points(self.run.combo);
            self.run.score = self.run.score.saturating_add(points);
            log::debug!(
                "match {first}/{second}: +{points} combo={} score={}",
                self.run.combo,
                self.run.score
            );

            let signal = self.clock.add_time(self.config.level.time_bonus_per_match);
            self.handle_clock(vec![signal]);

            self.emit(GameEvent::Matched { first, second });
            self.run.flipped.clear();
            self.run.is_locked = false;
            self.emit_state();

            if self.run.matched_count == self.run.tiles.len() {
                self.level_complete();
            }
        } else {
            self.run.combo = 0;
            self.run.lives = self.run.lives.saturating_sub(1);
            log::debug!("mismatch {first}/{second}: lives={}", self.run.lives);

            self.emit(GameEvent::Mismatched { first, second });

            debug_assert!(self.pending.is_none(), "flip accepted while a transition was pending");
            self.pending = Some(PendingTransition {
                due_at:     self.now.saturating_add(self.config.timing.mismatch_review_ms),
                transition: Transition::MismatchReview { first, second },
            });
        }
    }

    fn fire_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        match pending.transition {
            Transition::PreviewEnd { on_done } => self.finish_preview(on_done),
            Transition::MismatchReview { first, second } => self.finish_review(first, second),
        }
    }

    fn finish_preview(&mut self, on_done: PreviewCallback) {
        for tile in &mut self.run.tiles {
            tile.is_flipped = false;
        }
        self.run.is_locked = false;
        self.run.is_previewing = false;

        let budget = self.time_budget(self.run.level);
        let signals = self.clock.start(self.now, budget);
        if self.run.is_paused {
            self.clock.pause();
        }
        self.handle_clock(signals);

        self.emit_state();
        on_done();
        self.emit(GameEvent::PreviewEnded);
    }

    fn finish_review(&mut self, first: TileIndex, second: TileIndex) {
        self.run.tiles[first].is_flipped = false;
        self.run.tiles[second].is_flipped = false;
        self.run.flipped.clear();
        self.run.is_locked = false;
        self.emit_state();

        if self.run.lives == 0 && self.run.is_running {
            self.game_over();
        }
    }

    fn handle_clock(&mut self, signals: Vec<ClockSignal>) {
        for signal in signals {
            match signal {
                ClockSignal::Tick { .. } => self.emit_state(),
                ClockSignal::Timeout => {
                    if self.run.is_running {
                        log::info!("level {}: clock ran out", self.run.level);
                        self.game_over();
                    }
                }
            }
        }
    }

    fn level_complete(&mut self) {
        self.clock.stop();
        let bonus = u64::from(self.clock.remaining()).saturating_mul(self.config.level.time_bonus_multiplier);
        self.run.score = self.run.score.saturating_add(bonus);
        self.run.is_running = false;
        self.run.outcome = Some(RunOutcome::LevelComplete);

        log::info!(
            "level {} complete: time bonus {bonus}, score={}",
            self.run.level,
            self.run.score
        );
        self.emit(GameEvent::LevelCompleted {
            level: self.run.level,
            score: self.run.score,
        });
    }

    fn game_over(&mut self) {
        if self.run.outcome == Some(RunOutcome::GameOver) {
            return;
        }
        self.clock.stop();
        self.run.is_running = false;
        self.run.outcome = Some(RunOutcome::GameOver);

        log::info!("game over at level {} with score {}", self.run.level, self.run.score);
        self.emit(GameEvent::GameOver {
            score: self.run.score,
            level: self.run.level,
        });
        self.emit_state();
    }

    fn emit(&mut self, event: GameEvent) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }

    fn emit_state(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.emit(GameEvent::StateChanged { snapshot });
    }
}
