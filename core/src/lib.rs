//! DuoMind game core: a timed memory-matching game engine.
//!
//! `GameEngine` owns the run. `PairSource` deals the tiles and
//! `CountdownClock` keeps time; collaborators observe through
//! `GameEvent`s and persist through `GameStore`.

pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod pair_source;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod types;
