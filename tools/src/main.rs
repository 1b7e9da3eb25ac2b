//! duomind-runner: headless driver for the DuoMind game core.
//!
//! Usage:
//!   duomind-runner --seed 12345 --levels 3 --player ada --db duomind.db
//!   duomind-runner --player ada --ipc-mode

use anyhow::Result;
use duomind_core::{
    clock::CountdownClock,
    command::PlayerCommand,
    config::GameConfig,
    engine::{GameEngine, Phase},
    event::GameEvent,
    snapshot::StateSnapshot,
    store::{GameStore, LeaderboardEntry},
    types::{Millis, Symbol, TileIndex},
};
use std::collections::{HashMap, HashSet};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::Receiver;

/// Simulated time the autoplay bot spends before each flip.
const THINK_MS: Millis = 400;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Advance { ms: Millis },
    Command { command: PlayerCommand },
    Save,
    Leaderboard,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    now:      Millis,
    phase:    Phase,
    columns:  usize,
    clock:    String,
    snapshot: StateSnapshot,
}

#[derive(serde::Serialize)]
#[serde(untagged)]
enum IpcReply<'a> {
    Event { event: &'a GameEvent },
    State { state: UiState },
    Leaderboard { leaderboard: Vec<LeaderboardEntry> },
}

/// Wires engine outcomes to storage, as the game's host does.
struct Session {
    engine: GameEngine,
    events: Receiver<GameEvent>,
    store:  GameStore,
    player: String,
}

impl Session {
    /// Forward pending events to storage and return them.
    fn drain(&mut self) -> Result<Vec<GameEvent>> {
        let events: Vec<GameEvent> = self.events.try_iter().collect();
        for event in &events {
            if let GameEvent::GameOver { score, level } = event {
                self.store.add_leaderboard_entry(&self.player, *score, *level)?;
                self.store.clear_progress(&self.player)?;
            }
        }
        Ok(events)
    }

    fn save(&self) -> Result<()> {
        if self.engine.phase() != Phase::GameOver {
            self.store.save_progress(&self.player, &self.engine.save_state())?;
        }
        Ok(())
    }

    fn ui_state(&self) -> UiState {
        UiState {
            now:      self.engine.now(),
            phase:    self.engine.phase(),
            columns:  self.engine.column_count(),
            clock:    CountdownClock::format(self.engine.time_remaining()),
            snapshot: self.engine.snapshot(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", chrono::Utc::now().timestamp() as u64);
    let levels = parse_arg(&args, "--levels", 3u32);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let player = string_arg(&args, "--player").unwrap_or("Guest").to_string();

    let config = match string_arg(&args, "--config") {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let store = if db == ":memory:" {
        GameStore::in_memory()?
    } else {
        GameStore::open(db)?
    };
    store.migrate()?;

    let mut engine = GameEngine::from_config(seed, config)?;
    let events = engine.event_channel();
    let mut session = Session { engine, events, store, player };

    match session.store.load_progress(&session.player)? {
        Some(saved) => {
            log::info!("resuming {} from {saved:?}", session.player);
            session.engine.resume_game(saved);
        }
        None => session.engine.start_game(),
    }
    session.drain()?;

    if ipc_mode {
        run_ipc_loop(&mut session)?;
    } else {
        println!("DuoMind: duomind-runner");
        println!("  seed:    {seed}");
        println!("  levels:  {levels}");
        println!("  db:      {db}");
        println!("  player:  {}", session.player);
        println!();
        autoplay(&mut session, levels)?;
        print_summary(&session)?;
    }

    Ok(())
}

fn run_ipc_loop(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Advance { ms } => session.engine.advance(ms),
            IpcCommand::Command { command } => session.engine.apply(command),
            IpcCommand::Save => session.save()?,
            IpcCommand::Leaderboard => {
                let leaderboard = session.store.leaderboard()?;
                writeln!(stdout, "{}", serde_json::to_string(&IpcReply::Leaderboard { leaderboard })?)?;
            }
        }

        for event in session.drain()? {
            // Snapshots are summarised by the trailing state line.
            if !matches!(event, GameEvent::StateChanged { .. }) {
                writeln!(stdout, "{}", serde_json::to_string(&IpcReply::Event { event: &event })?)?;
            }
        }
        let state = session.ui_state();
        writeln!(stdout, "{}", serde_json::to_string(&IpcReply::State { state })?)?;
        stdout.flush()?;
    }

    session.save()
}

/// Play up to `levels` levels with a bot that remembers every tile it
/// has turned over. It never peeks at face-down tiles.
fn autoplay(session: &mut Session, levels: u32) -> Result<()> {
    let preview_ms = session.engine.config().timing.preview_ms;
    let review_ms = session.engine.config().timing.mismatch_review_ms;

    for played in 0..levels {
        if played > 0 {
            session.engine.next_level();
        }
        session.engine.start_after_preview(|| {});
        session.engine.advance(preview_ms);
        session.drain()?;

        let mut seen: HashMap<Symbol, Vec<TileIndex>> = HashMap::new();
        let mut revealed: HashSet<TileIndex> = HashSet::new();

        while session.engine.phase() == Phase::Playing {
            let first = match known_pair(&session.engine, &seen) {
                Some((a, b)) => {
                    flip(session, a, &mut seen, &mut revealed);
                    flip(session, b, &mut seen, &mut revealed);
                    continue;
                }
                None => match unrevealed(&session.engine, &revealed, None) {
                    Some(i) => i,
                    None => break,
                },
            };
            let symbol = flip(session, first, &mut seen, &mut revealed);

            let partner = seen
                .get(symbol)
                .and_then(|ixs| ixs.iter().copied().find(|&i| i != first))
                .or_else(|| unrevealed(&session.engine, &revealed, Some(first)));
            if let Some(second) = partner {
                flip(session, second, &mut seen, &mut revealed);
            }

            let events = session.drain()?;
            if events.iter().any(|e| matches!(e, GameEvent::Mismatched { .. })) {
                session.engine.advance(review_ms);
                session.drain()?;
            }
        }
        session.drain()?;

        let outcome = session.engine.phase();
        println!(
            "  level {:>2}: {:?} score={} lives={} clock={}",
            session.engine.level(),
            outcome,
            session.engine.score(),
            session.engine.lives(),
            CountdownClock::format(session.engine.time_remaining())
        );
        if outcome != Phase::LevelComplete {
            break;
        }
    }

    session.save()
}

fn flip(
    session: &mut Session,
    index: TileIndex,
    seen: &mut HashMap<Symbol, Vec<TileIndex>>,
    revealed: &mut HashSet<TileIndex>,
) -> Symbol {
    session.engine.advance(THINK_MS);
    session.engine.flip_card(index);
    let tile = &session.engine.tiles()[index];
    let symbol = tile.symbol;
    if (tile.is_flipped || tile.is_matched) && revealed.insert(index) {
        seen.entry(symbol).or_default().push(index);
    }
    symbol
}

fn known_pair(
    engine: &GameEngine,
    seen: &HashMap<Symbol, Vec<TileIndex>>,
) -> Option<(TileIndex, TileIndex)> {
    seen.values()
        .filter(|ixs| ixs.len() == 2 && !engine.is_matched(ixs[0]))
        .map(|ixs| (ixs[0], ixs[1]))
        .min()
}

fn unrevealed(
    engine: &GameEngine,
    revealed: &HashSet<TileIndex>,
    except: Option<TileIndex>,
) -> Option<TileIndex> {
    (0..engine.tiles().len()).find(|i| {
        !revealed.contains(i) && !engine.is_matched(*i) && Some(*i) != except
    })
}

fn print_summary(session: &Session) -> Result<()> {
    println!();
    println!("=== RUN SUMMARY ===");
    println!("  final level:    {}", session.engine.level());
    println!("  score:          {}", session.engine.score());
    println!("  lives:          {}", session.engine.lives());
    println!("  pairs matched:  {}", session.engine.total_matches());
    println!("  outcome:        {:?}", session.engine.phase());

    println!();
    println!("=== LEADERBOARD ===");
    let board = session.store.leaderboard()?;
    if board.is_empty() {
        println!("  (No finished runs yet)");
    } else {
        for (rank, entry) in board.iter().enumerate() {
            println!(
                "  {:>2}. {:<12} {:>7}  level {:<3} {}",
                rank + 1,
                entry.name,
                entry.score,
                entry.level,
                entry.date
            );
        }
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
