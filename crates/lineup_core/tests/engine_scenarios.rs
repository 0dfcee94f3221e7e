//! End-to-end scenarios against a `LineupEngine`

use lineup_core::lineup::{ALL_AROUND_SLOT, SLOTS_PER_EVENT};
use lineup_core::models::EventCatalog;
use lineup_core::save::{FileSink, MemorySink, Snapshot};
use lineup_core::{
    Athlete, AthleteId, EngineConfig, EventId, EventMetrics, LineupEngine, Metric, Outcome, Rejection, SlotSource,
};

fn ev(id: &str) -> EventId {
    EventId::new(id)
}

fn athlete(n: usize) -> AthleteId {
    AthleteId::new(format!("athlete-{}", n))
}

/// Blank engine with athletes `athlete-1..=count`, none enrolled anywhere
fn engine_with(count: usize) -> LineupEngine {
    let mut engine = LineupEngine::new(EngineConfig::blank()).unwrap();
    let rows = (1..=count).map(|n| Athlete::new(athlete(n), format!("Athlete {}", n))).collect();
    engine.replace_roster(rows).unwrap();
    engine
}

#[test]
fn swap_between_events() {
    let mut engine = engine_with(2);
    let (a, b) = (athlete(1), athlete(2));
    assert!(engine.move_or_swap(&SlotSource::Unplaced, &ev("event-1"), 0, &a).is_accepted());
    assert!(engine.move_or_swap(&SlotSource::Unplaced, &ev("event-2"), 1, &b).is_accepted());

    let outcome = engine.move_or_swap(&SlotSource::slot("event-1", 0), &ev("event-2"), 1, &a);
    assert_eq!(outcome, Outcome::Accepted);

    let grid = engine.active_grid();
    assert_eq!(grid.occupant(&ev("event-2"), 1), Some(&a));
    assert_eq!(grid.occupant(&ev("event-1"), 0), Some(&b));
}

#[test]
fn place_then_event_total() {
    let mut engine = engine_with(1);
    let a = athlete(1);
    assert!(engine.place(&ev("event-1"), &a).is_accepted());
    assert_eq!(engine.active_grid().occupant(&ev("event-1"), 0), Some(&a));

    // No FX metrics yet
    let total = engine.event_total_for(&ev("event-1"), Metric::DScore).unwrap();
    assert_eq!(total.value, 0.0);
    assert_eq!(total.label, "Total D-Score");

    engine.set_event_metrics(&a, "FX", EventMetrics::new(5.6, 91.0, 13.85).unwrap()).unwrap();
    let total = engine.event_total_for(&ev("event-1"), Metric::DScore).unwrap();
    assert_eq!(total.display, "5.6");
}

#[test]
fn main_slot_cap_and_all_around_exemption() {
    let mut engine = engine_with(13);
    let events: Vec<EventId> = EventCatalog::default().ids().cloned().collect();

    // Two distinct athletes per event in main slots: 12 in total
    for (i, event_id) in events.iter().enumerate() {
        assert!(engine.place(event_id, &athlete(2 * i + 1)).is_accepted());
        assert!(engine.place(event_id, &athlete(2 * i + 2)).is_accepted());
    }
    assert_eq!(engine.unique_main_count(), 12);

    let before = engine.active_grid().clone();
    let thirteenth = athlete(13);
    assert_eq!(
        engine.place(&events[0], &thirteenth),
        Outcome::Rejected(Rejection::CapExceeded { limit: 12 })
    );
    assert_eq!(engine.active_grid(), &before);

    let outcome = engine.move_or_swap(&SlotSource::Unplaced, &events[0], ALL_AROUND_SLOT, &thirteenth);
    assert!(outcome.is_accepted());
    assert_eq!(engine.unique_main_count(), 12);

    // Already-main athletes can still be added to other events' main slots
    assert!(engine.place(&events[1], &athlete(1)).is_accepted());
    assert_eq!(engine.unique_main_count(), 12);
}

#[test]
fn removing_athlete_clears_vault_slot_in_every_lineup() {
    let mut engine = engine_with(3);
    let vault = ev("event-4");
    let target = athlete(2);

    let first = engine.active_lineup_id().clone();
    assert!(engine.place(&ev("event-1"), &athlete(1)).is_accepted());
    assert!(engine.move_or_swap(&SlotSource::Unplaced, &vault, 2, &target).is_accepted());

    engine.create_lineup("Second Meet");
    assert!(engine.move_or_swap(&SlotSource::Unplaced, &vault, 2, &target).is_accepted());
    assert!(engine.place(&vault, &athlete(3)).is_accepted());

    let mut expected = engine.snapshot();
    for saved in expected.saved_lineups.values_mut() {
        saved.lineup.set_slot(&vault, 2, None);
    }
    expected.athletes.retain(|a| a.id != target);

    assert_eq!(engine.remove_athlete(&target).unwrap(), 2);
    assert_eq!(engine.snapshot(), expected);

    assert!(engine.set_active_lineup(&first).is_accepted());
    assert_eq!(engine.active_grid().occupant(&ev("event-1"), 0), Some(&athlete(1)));
}

#[test]
fn deleting_only_lineup_rejected() {
    let mut engine = engine_with(0);
    let before = engine.snapshot();
    assert_eq!(engine.delete_active_lineup(), Outcome::Rejected(Rejection::LastLineup));
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn clear_event_is_idempotent() {
    let mut engine = engine_with(3);
    for n in 1..=3 {
        assert!(engine.place(&ev("event-3"), &athlete(n)).is_accepted());
    }
    assert!(engine.place(&ev("event-5"), &athlete(1)).is_accepted());

    assert!(engine.clear_event(&ev("event-3")).is_accepted());
    let once = engine.snapshot();
    assert!(engine.clear_event(&ev("event-3")).is_accepted());
    assert_eq!(engine.snapshot(), once);
    assert_eq!(engine.active_grid().occupant(&ev("event-5"), 0), Some(&athlete(1)));
}

#[test]
fn snapshot_json_round_trip_preserves_grids_and_titles() {
    let mut engine = engine_with(4);
    assert!(engine.place(&ev("event-6"), &athlete(4)).is_accepted());
    engine.create_lineup("Regionals");
    assert!(engine.move_or_swap(&SlotSource::Unplaced, &ev("event-2"), 5, &athlete(3)).is_accepted());

    let json = engine.snapshot().to_json().unwrap();
    let back = Snapshot::from_json(&json).unwrap();
    assert_eq!(back, engine.snapshot());

    for saved in back.saved_lineups.values() {
        for (_, row) in saved.lineup.rows() {
            assert_eq!(row.len(), SLOTS_PER_EVENT);
        }
    }
}

#[test]
fn file_sink_persists_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["team.json", "team.lineup"] {
        let path = dir.path().join(name);
        let mut sink = FileSink::new(&path);

        let mut engine = LineupEngine::load_or_default(EngineConfig::default(), &sink).unwrap();
        let first = AthleteId::new("athlete-default-0");
        assert!(engine.place(&ev("event-2"), &first).is_accepted());
        assert!(engine.rename_active_lineup("Home Opener").is_accepted());
        engine.save_to(&mut sink).unwrap();

        let reloaded = LineupEngine::load_or_default(EngineConfig::default(), &sink).unwrap();
        assert_eq!(reloaded.snapshot(), engine.snapshot());
        assert_eq!(reloaded.lineups().active().title, "Home Opener");
    }
}

#[test]
fn corrupt_store_falls_back_to_defaults() {
    let sink = MemorySink::with_bytes(r#"{"athletes": 7}"#);
    let engine = LineupEngine::load_or_default(EngineConfig::default(), &sink).unwrap();
    assert_eq!(engine.roster().len(), 24);
    assert_eq!(engine.lineups().len(), 1);
    assert_eq!(engine.lineups().active().title, "Untitled Lineup");
}

#[test]
fn bulk_roster_replace_revokes_event_in_every_lineup() {
    let metrics = EventMetrics::new(5.0, 85.0, 13.2).unwrap();
    let mut engine = engine_with(0);
    let rows = vec![
        Athlete::new(athlete(1), "Athlete 1").with_event("VT", metrics).with_event("FX", metrics),
        Athlete::new(athlete(2), "Athlete 2").with_event("VT", metrics),
        Athlete::new(athlete(3), "Athlete 3").with_event("PB", metrics),
    ];
    engine.replace_roster(rows.clone()).unwrap();

    let (vault, floor, bars) = (ev("event-4"), ev("event-1"), ev("event-5"));
    let first = engine.active_lineup_id().clone();
    assert!(engine.place(&vault, &athlete(1)).is_accepted());
    assert!(engine.place(&floor, &athlete(1)).is_accepted());
    assert!(engine.place(&vault, &athlete(2)).is_accepted());
    assert!(engine.place(&bars, &athlete(3)).is_accepted());
    let second = engine.create_lineup("Dual Meet");
    assert!(engine.move_or_swap(&SlotSource::Unplaced, &vault, 4, &athlete(1)).is_accepted());
    assert!(engine.place(&bars, &athlete(3)).is_accepted());

    // Athlete 1 loses VT, athlete 3 is dropped via a blank name
    let mut next = rows;
    next[0].events.remove("VT");
    next[2].name = "   ".to_string();
    assert_eq!(engine.replace_roster(next).unwrap(), 4);
    assert_eq!(engine.roster().len(), 2);

    for id in [&first, &second] {
        let grid = &engine.lineups().get(id).unwrap().lineup;
        assert!(!grid.row_contains(&vault, &athlete(1)));
        assert_eq!(grid.usage_count(&athlete(3)), 0);
    }
    let grid = &engine.lineups().get(&first).unwrap().lineup;
    assert_eq!(grid.occupant(&floor, 0), Some(&athlete(1)));
    assert_eq!(grid.occupant(&vault, 1), Some(&athlete(2)));
}
