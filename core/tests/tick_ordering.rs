//! End-to-end checks of the fixed order inside one `advance` call

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use cadence_core::{
    ActorState, CastRequest, CombatSignal, EffectKind, Faction, ResourcePool, StopReason,
    TimedEffect, TimingEngine, UpkeepRates,
};

fn engine_with(actors: &[&str]) -> TimingEngine {
    let mut engine = TimingEngine::default();
    for id in actors {
        engine.upsert_actor(ActorState::new(*id, Faction::PlayerParty));
    }
    engine
}

#[test]
fn cast_completion_opens_channel_in_same_advance() {
    let mut engine = engine_with(&["a"]);
    engine
        .start_cast(
            "a",
            CastRequest::new("heal").cast_time_ms(2000).opens_channel("song:1"),
        )
        .unwrap();

    engine.advance(2000);

    let names: Vec<_> = engine.take_signals().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["cast_complete", "channel_start", "tick"]);
    assert!(engine.is_channel_active("a", "song:1"));
}

#[test]
fn subscribers_observe_signals_in_emission_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);

    let mut engine = engine_with(&["a"]);
    engine.subscribe(move |s: &CombatSignal| sink.borrow_mut().push(s.clone()));
    engine
        .start_cast(
            "a",
            CastRequest::new("heal").cast_time_ms(2000).opens_channel("song:1"),
        )
        .unwrap();
    engine.advance(2000);

    let log = log.borrow();
    assert_eq!(
        log[0],
        CombatSignal::CastComplete {
            caster_id: "a".into(),
            ability_id: "heal".into(),
            target_ids: vec![],
        }
    );
    assert_eq!(
        log[1],
        CombatSignal::ChannelStart {
            source_id: "a".into(),
            channel_id: "song:1".into(),
        }
    );
}

#[test]
fn clock_is_sum_of_deltas() {
    let mut engine = engine_with(&[]);
    let deltas = [16u64, 16, 17, 0, 1000, 3];
    for dt in deltas {
        engine.advance(dt);
    }
    assert_eq!(engine.now_ms(), deltas.iter().sum::<u64>());
}

#[test]
fn channel_opened_by_cast_is_charged_in_same_advance() {
    let mut engine = engine_with(&["a"]);
    let mut pools = HashMap::new();
    pools.insert("a".to_string(), ResourcePool::full(100.0, 100.0, 100.0));

    // Channel exists with upkeep before the cast reopens it
    engine.start_channel("a", "song:1", Some(UpkeepRates::mp(10.0)));
    engine.stop_channel("a", "song:1");

    engine
        .start_cast(
            "a",
            CastRequest::new("sing").cast_time_ms(5000).opens_channel("song:1"),
        )
        .unwrap();
    engine.advance_with(5000, &mut pools);

    // Opened during the flush, so the upkeep stage of the same tick sees it
    assert!(engine.is_channel_active("a", "song:1"));
    assert_eq!(pools["a"].mp, 90.0);
    let channel = engine.actor("a").unwrap().channel("song:1").unwrap();
    assert_eq!(channel.upkeep.as_ref().unwrap().accumulated_ms, 0);
}

#[test]
fn song_lifecycle_from_start_to_expiry() {
    let mut engine = engine_with(&["bard", "tank"]);
    let mut pools = HashMap::new();
    pools.insert(
        "bard".to_string(),
        ResourcePool {
            mp: 25.0,
            ..ResourcePool::full(100.0, 100.0, 100.0)
        },
    );

    let dot_period = engine.config().dot_regen_period_ms;
    engine.start_maintained_song("bard", "song:valor", "valor", 6.0, Default::default(), 10.0);
    engine.add_effect(
        "tank",
        TimedEffect::timed("bleed", "wolf", EffectKind::Dot, 4.0)
            .with_periodic(dot_period, Some("DOT_TICK")),
        None,
    );
    engine.take_signals();

    // Two drains leave 5 MP, third exhausts at 15s
    for _ in 0..3 {
        engine.advance_with(5000, &mut pools);
    }
    assert_eq!(pools["bard"].mp, 0.0);
    assert!(!engine.is_channel_active("bard", "song:valor"));

    let signals = engine.take_signals();
    assert!(signals.contains(&CombatSignal::ChannelStop {
        source_id: "bard".into(),
        channel_id: "song:valor".into(),
        reason: StopReason::Exhausted,
    }));
    // Bleed pulsed and ran out during the first step
    assert!(signals.contains(&CombatSignal::EffectPulse {
        owner_id: "tank".into(),
        effect_id: "bleed".into(),
        tag: Some("DOT_TICK".into()),
    }));
    assert!(signals.contains(&CombatSignal::EffectExpired {
        owner_id: "tank".into(),
        effect_id: "bleed".into(),
    }));

    // Aura released at 15s and counted 5s in that same tick
    let valor = engine.effect("bard", "valor").unwrap();
    assert!((valor.remaining_secs - 1.0).abs() < 1e-9);

    engine.advance_with(1000, &mut pools);
    assert!(engine.effect("bard", "valor").is_none());
}

#[test]
fn independent_engines_do_not_share_state() {
    let mut first = engine_with(&["a"]);
    let second = engine_with(&["a"]);

    first.start_channel("a", "song:1", None);
    assert!(first.is_channel_active("a", "song:1"));
    assert!(!second.is_channel_active("a", "song:1"));
}
