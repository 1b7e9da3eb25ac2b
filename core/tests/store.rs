//! Storage collaborator tests: save slots and the leaderboard.

use chrono::NaiveDate;
use duomind_core::{
    snapshot::SaveState,
    store::{GameStore, LEADERBOARD_SIZE},
};

fn store() -> GameStore {
    let store = GameStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date")
}

#[test]
fn progress_round_trips_per_player() {
    let store = store();
    assert_eq!(store.load_progress("ada").unwrap(), None);

    let saved = SaveState { level: 4, score: 5230, lives: 2 };
    store.save_progress("ada", &saved).unwrap();
    store.save_progress("grace", &SaveState { level: 1, score: 0, lives: 5 }).unwrap();

    assert_eq!(store.load_progress("ada").unwrap(), Some(saved));
    assert_eq!(store.load_progress("grace").unwrap().map(|s| s.level), Some(1));
}

#[test]
fn saving_again_overwrites_the_slot() {
    let store = store();
    store.save_progress("ada", &SaveState { level: 2, score: 900, lives: 3 }).unwrap();
    store.save_progress("ada", &SaveState { level: 3, score: 2100, lives: 4 }).unwrap();

    assert_eq!(
        store.load_progress("ada").unwrap(),
        Some(SaveState { level: 3, score: 2100, lives: 4 })
    );
}

#[test]
fn clearing_progress_removes_only_that_player() {
    let store = store();
    store.save_progress("ada", &SaveState { level: 2, score: 10, lives: 1 }).unwrap();
    store.save_progress("grace", &SaveState { level: 5, score: 99, lives: 5 }).unwrap();

    store.clear_progress("ada").unwrap();
    store.clear_progress("nobody").unwrap();

    assert_eq!(store.load_progress("ada").unwrap(), None);
    assert!(store.load_progress("grace").unwrap().is_some());
}

#[test]
fn leaderboard_ranks_by_score_descending() {
    let store = store();
    store.add_leaderboard_entry_on("ada", 1200, 2, day(1)).unwrap();
    store.add_leaderboard_entry_on("grace", 4800, 4, day(2)).unwrap();
    let board = store.add_leaderboard_entry_on("alan", 300, 1, day(3)).unwrap();

    let names: Vec<&str> = board.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["grace", "ada", "alan"]);
    assert_eq!(board[0].date, "2026-03-02");
    assert_eq!(board[0].level, 4);
}

#[test]
fn equal_scores_keep_the_earlier_entry_first() {
    let store = store();
    store.add_leaderboard_entry_on("first", 500, 1, day(1)).unwrap();
    let board = store.add_leaderboard_entry_on("second", 500, 1, day(2)).unwrap();
    assert_eq!(board[0].name, "first");
    assert_eq!(board[1].name, "second");
}

#[test]
fn leaderboard_keeps_only_the_top_entries() {
    let store = store();
    for i in 0..(LEADERBOARD_SIZE as u64 + 5) {
        store
            .add_leaderboard_entry_on(&format!("p{i}"), i * 100, 1, day(1))
            .unwrap();
    }

    let board = store.leaderboard().unwrap();
    assert_eq!(board.len(), LEADERBOARD_SIZE);
    assert_eq!(board[0].score, (LEADERBOARD_SIZE as u64 + 4) * 100);
    assert_eq!(board.last().unwrap().score, 500, "the five lowest scores fall off");

    // A score below the cut is not retained.
    let board = store.add_leaderboard_entry_on("late", 50, 1, day(4)).unwrap();
    assert!(board.iter().all(|e| e.name != "late"));
}

#[test]
fn dated_today_by_default() {
    let store = store();
    let board = store.add_leaderboard_entry("ada", 10, 1).unwrap();
    assert_eq!(board[0].date.len(), "2026-01-01".len());
}
