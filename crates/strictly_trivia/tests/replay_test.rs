//! Tests for rebuilding rounds from their event history.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::time::Duration;
use strictly_trivia::{
    Phase, Player, PlayerId, QuestionRef, RoundEngine, RoundError, RoundEvent, RoundId, RoundRules,
    RoundSnapshot,
};
use uuid::Uuid;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn players() -> Vec<Player> {
    vec![
        Player::new("alice".into(), "Alice".into()),
        Player::new("bob".into(), "Bob".into()),
        Player::new("carol".into(), "Carol".into()),
    ]
}

/// Plays a full round and returns (initial snapshot, history, final snapshot).
fn play_round() -> (RoundSnapshot, Vec<RoundEvent>, RoundSnapshot) {
    let rules = RoundRules::new(Duration::from_secs(30))
        .with_authoritative_reveal(Duration::from_secs(10))
        .with_authoritative_advance(Duration::from_secs(15));
    let mut engine = RoundEngine::create(
        RoundId::new(),
        3,
        QuestionRef::new(Uuid::new_v4()),
        players().into_iter().collect(),
        rules,
        t0(),
    )
    .expect("Valid round");
    let initial = engine.snapshot().clone();
    let mut history = Vec::new();

    let mut commit = |engine: &mut RoundEngine, events: Vec<RoundEvent>| {
        engine.apply_all(&events).expect("Apply failed");
        history.extend(events);
    };

    let [alice, bob, carol] = <[Player; 3]>::try_from(players()).unwrap();
    let mallory = Player::new("mallory".into(), "Mallory".into());

    let events = engine.submit_answer(alice.clone(), "Lyon", t0() + TimeDelta::seconds(3)).unwrap();
    commit(&mut engine, events);
    let events = engine.submit_answer(bob, "Paris", t0() + TimeDelta::seconds(7)).unwrap();
    commit(&mut engine, events);
    let events = engine.submit_answer(mallory, "Rome", t0() + TimeDelta::seconds(8)).unwrap();
    commit(&mut engine, events);
    let events = engine.submit_answer(alice, "Paris", t0() + TimeDelta::seconds(12)).unwrap();
    commit(&mut engine, events);
    let events = engine.submit_answer(carol, "Nice", t0() + TimeDelta::seconds(31)).unwrap();
    commit(&mut engine, events);

    for at in [30, 45, 60] {
        let events = engine.tick(t0() + TimeDelta::seconds(at)).unwrap();
        commit(&mut engine, events);
    }

    (initial, history, engine.into_snapshot())
}

#[test]
fn test_replay_reproduces_final_snapshot() {
    let (initial, history, final_snapshot) = play_round();
    assert_eq!(final_snapshot.phase(), Phase::Completed);

    let replayed = RoundSnapshot::replay(&initial, &history).expect("Valid replay");
    assert_eq!(replayed, final_snapshot);
}

#[test]
fn test_replay_keeps_last_answer_per_player() {
    let (initial, history, _) = play_round();
    let replayed = RoundSnapshot::replay(&initial, &history).unwrap();

    let answers = replayed.answers();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[&PlayerId::from("alice")].value(), "Paris");
    assert_eq!(answers[&PlayerId::from("bob")].value(), "Paris");
    assert!(!answers.contains_key(&PlayerId::from("carol")));
}

#[test]
fn test_replay_of_prefix_matches_intermediate_phase() {
    let (initial, history, _) = play_round();
    let reveal_at = history
        .iter()
        .position(|e| matches!(e, RoundEvent::RevealStarted { .. }))
        .unwrap();
    let partial = RoundSnapshot::replay(&initial, &history[..=reveal_at]).unwrap();
    assert_eq!(partial.phase(), Phase::Reveal);
}

#[test]
fn test_history_survives_json_round_trip() {
    let (initial, history, final_snapshot) = play_round();
    let lines: Vec<String> = history
        .iter()
        .map(|e| serde_json::to_string(e).unwrap())
        .collect();
    let decoded: Vec<RoundEvent> = lines
        .iter()
        .map(|line| RoundEvent::from_json(line).unwrap())
        .collect();

    let initial_json = serde_json::to_string(&initial).unwrap();
    let initial: RoundSnapshot = serde_json::from_str(&initial_json).unwrap();

    assert_eq!(RoundSnapshot::replay(&initial, &decoded).unwrap(), final_snapshot);
}

#[test]
fn test_replay_with_foreign_event_fails() {
    let (initial, mut history, _) = play_round();
    history.push(RoundEvent::RoundCompleted {
        round_id: RoundId::new(),
        completed_at: t0(),
    });
    assert!(matches!(
        RoundSnapshot::replay(&initial, &history),
        Err(RoundError::ForeignEvent { .. })
    ));
}
