use crate::battle::state::{BattleEvent, BattleStatus, CaptureResult, Side, TurnRng};
use crate::battle::tests::common::{
    assert_ok, count_events, create_instance, test_species, wildling, Scenario, TRAINER,
};
use crate::errors::{EncounterError, Resource};
use crate::player::PlayerAction;
use crate::pokemon::{InstanceId, NewInstance};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_capture_succeeds_and_stores_creature() {
    let mut scenario = Scenario::new().with_wild_hp(30);
    // Final probability 70, roll 70: the roll may equal the probability.
    let mut rng = TurnRng::new_for_test(vec![1.0, 0.7]);

    let bus = assert_ok(scenario.resolve(PlayerAction::Capture, &mut rng));

    assert_eq!(scenario.ctx.battle.status, BattleStatus::Captured);
    assert_eq!(scenario.ctx.battle.captures_remaining, 4);
    assert_eq!(
        scenario.ctx.new_capture,
        Some(NewInstance {
            owner: TRAINER,
            species: "wildling".to_string(),
            current_hp: 100,
            level: scenario.config.captured_level,
            on_team: false,
        })
    );
    assert!(bus.events().contains(&BattleEvent::CaptureSucceeded {
        species: "wildling".to_string(),
        result: CaptureResult::Stored,
    }));
    assert_eq!(rng.remaining(), 0, "no counter-attack after a capture");
}

#[test]
fn test_capture_of_owned_species_stores_nothing() {
    let wild = wildling();
    let mut scenario = Scenario::new()
        .with_wild_hp(30)
        .with_instance(create_instance(2, &wild, 40, false));
    let mut rng = TurnRng::new_for_test(vec![1.0, 0.0]);

    let bus = assert_ok(scenario.resolve(PlayerAction::Capture, &mut rng));

    assert_eq!(scenario.ctx.battle.status, BattleStatus::Captured);
    assert_eq!(scenario.ctx.new_capture, None);
    assert!(bus.events().contains(&BattleEvent::CaptureSucceeded {
        species: "wildling".to_string(),
        result: CaptureResult::AlreadyOwned {
            existing: InstanceId(2)
        },
    }));
}

#[test]
fn test_failed_capture_provokes_counter_attack() {
    let mut scenario = Scenario::new();
    // Full HP: base 10, final 5, roll 100. Then pick and variance.
    let mut rng = TurnRng::new_for_test(vec![0.0, 1.0, 0.0, 1.0]);

    let bus = assert_ok(scenario.resolve(PlayerAction::Capture, &mut rng));

    assert_eq!(scenario.ctx.battle.status, BattleStatus::Active);
    assert_eq!(scenario.ctx.battle.captures_remaining, 4);
    assert_eq!(scenario.ctx.new_capture, None);
    assert_eq!(scenario.active_hp(), 88);
    assert_eq!(
        count_events(&bus, |e| matches!(e, BattleEvent::CaptureFailed { .. })),
        1
    );
    assert_eq!(
        count_events(&bus, |e| matches!(e, BattleEvent::DamageDealt { target: Side::Player, .. })),
        1
    );
}

fn full_reserve(scenario: Scenario, include_wild: bool) -> Scenario {
    let capacity = scenario.config.reserve_capacity;
    (0..capacity).fold(scenario, |scenario, i| {
        let name = if include_wild && i == 0 {
            "wildling".to_string()
        } else {
            format!("boxed-{}", i)
        };
        let species = test_species(&name, 40, 40, 40, &["normal"], vec![]);
        scenario.with_instance(create_instance(10 + i as u64, &species, 40, false))
    })
}

#[rstest]
#[case::no_attempts_left(0, false, Resource::Captures)]
#[case::reserve_full(5, true, Resource::ReserveSlots)]
fn test_capture_rejected_when_exhausted(
    #[case] captures: u8,
    #[case] fill_reserve: bool,
    #[case] resource: Resource,
) {
    let mut scenario = Scenario::new();
    scenario.ctx.battle.captures_remaining = captures;
    if fill_reserve {
        scenario = full_reserve(scenario, false);
    }
    let before = scenario.ctx.clone();
    let mut rng = TurnRng::new_for_test(vec![]);

    let err = scenario.resolve(PlayerAction::Capture, &mut rng).unwrap_err();

    assert!(
        matches!(err, EncounterError::ResourceExhausted(r) if r == resource),
        "unexpected error: {}",
        err
    );
    assert_eq!(scenario.ctx, before);
}

#[test]
fn test_full_reserve_allows_capturing_owned_species() {
    let mut scenario = full_reserve(Scenario::new().with_wild_hp(30), true);
    let mut rng = TurnRng::new_for_test(vec![1.0, 0.0]);

    assert_ok(scenario.resolve(PlayerAction::Capture, &mut rng));

    assert_eq!(scenario.ctx.battle.status, BattleStatus::Captured);
    assert_eq!(scenario.ctx.new_capture, None);
}
