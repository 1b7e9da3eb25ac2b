//! The event bus: everything the engine tells the outside world.
//!
//! RULE: Collaborators learn about the run ONLY through events.
//! They never read or write engine state directly; the engine owns it.
//! Listeners are called synchronously, in registration order, and
//! cannot call back into the engine while handling an event.

use crate::{snapshot::StateSnapshot, types::TileIndex};
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Emitted after every mutation.
    StateChanged { snapshot: StateSnapshot },
    CardFlipped { index: TileIndex },
    Matched { first: TileIndex, second: TileIndex },
    /// Emitted as soon as the mismatch is detected, before the review delay.
    Mismatched { first: TileIndex, second: TileIndex },
    LevelCompleted { level: u32, score: u64 },
    GameOver { score: u64, level: u32 },
    PreviewEnded,
}

impl GameEvent {
    /// Stable name for logs and the runner's output.
    pub fn type_name(&self) -> &'static str {
        match self {
            GameEvent::StateChanged { .. }   => "state_changed",
            GameEvent::CardFlipped { .. }    => "card_flipped",
            GameEvent::Matched { .. }        => "matched",
            GameEvent::Mismatched { .. }     => "mismatched",
            GameEvent::LevelCompleted { .. } => "level_completed",
            GameEvent::GameOver { .. }       => "game_over",
            GameEvent::PreviewEnded          => "preview_ended",
        }
    }
}

/// The contract every event consumer fulfills.
pub trait GameListener: Send {
    fn on_event(&mut self, event: &GameEvent);
}

/// Adapts a closure into a listener.
pub struct FnListener<F>(pub F);

impl<F> GameListener for FnListener<F>
where
    F: FnMut(&GameEvent) + Send,
{
    fn on_event(&mut self, event: &GameEvent) {
        (self.0)(event)
    }
}

/// Forwards every event into an mpsc channel.
/// A dropped receiver is not an error; events are discarded.
pub struct ChannelListener {
    tx: Sender<GameEvent>,
}

impl ChannelListener {
    pub fn channel() -> (Self, Receiver<GameEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl GameListener for ChannelListener {
    fn on_event(&mut self, event: &GameEvent) {
        let _ = self.tx.send(event.clone());
    }
}
