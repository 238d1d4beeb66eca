use crate::battle::calculators::Effectiveness;
use crate::battle::state::{BattleEvent, BattleStatus, Side, TurnRng};
use crate::battle::tests::common::{
    assert_ok, attack, count_events, test_move, test_species, Scenario,
};
use crate::errors::ErrorKind;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_attack_knocks_out_wild_without_counter() {
    let mut scenario = Scenario::new().with_wild_hp(30);
    let mut rng = TurnRng::new_for_test(vec![1.0]);

    let bus = assert_ok(scenario.resolve(attack("strike"), &mut rng));

    assert_eq!(scenario.ctx.battle.wild_current_hp, 0);
    assert_eq!(scenario.ctx.battle.status, BattleStatus::Won);
    assert_eq!(scenario.active_hp(), 100);
    assert_eq!(rng.remaining(), 0, "no counter-attack after a knockout");

    assert!(bus.events().contains(&BattleEvent::PokemonFainted {
        side: Side::Wild,
        species: "wildling".to_string(),
    }));
    assert!(bus.events().contains(&BattleEvent::BattleEnded {
        status: BattleStatus::Won,
    }));
    assert_eq!(
        count_events(&bus, |e| matches!(e, BattleEvent::DamageDealt { target: Side::Player, .. })),
        0
    );
}

#[test]
fn test_attack_then_counter_attack() {
    let mut scenario = Scenario::new();
    // Player variance, wild move pick, wild variance.
    let mut rng = TurnRng::new_for_test(vec![1.0, 0.0, 1.0]);

    let bus = assert_ok(scenario.resolve(attack("strike"), &mut rng));

    assert_eq!(scenario.ctx.battle.wild_current_hp, 65);
    assert_eq!(scenario.active_hp(), 88);
    assert_eq!(scenario.ctx.battle.status, BattleStatus::Active);
    assert_eq!(scenario.ctx.battle.turn_number, 2);

    let kinds: Vec<&str> = bus
        .events()
        .iter()
        .map(|e| match e {
            BattleEvent::TurnStarted { .. } => "turn",
            BattleEvent::MoveUsed { side: Side::Player, .. } => "player move",
            BattleEvent::MoveUsed { side: Side::Wild, .. } => "wild move",
            BattleEvent::DamageDealt { target: Side::Wild, .. } => "wild hit",
            BattleEvent::DamageDealt { target: Side::Player, .. } => "player hit",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["turn", "player move", "wild hit", "wild move", "player hit"]
    );
}

#[test]
fn test_lowest_variance_floors_damage() {
    let mut scenario = Scenario::new();
    let mut rng = TurnRng::new_for_test(vec![0.0, 0.0, 0.0]);

    assert_ok(scenario.resolve(attack("strike"), &mut rng));

    // 35 * 0.85 and 12 * 0.85, rounded down.
    assert_eq!(scenario.ctx.battle.wild_current_hp, 100 - 29);
    assert_eq!(scenario.active_hp(), 100 - 10);
}

#[test]
fn test_immune_defender_still_takes_one_damage() {
    let phantom = test_species(
        "phantom",
        100,
        50,
        50,
        &["ghost"],
        vec![test_move("nibble", Some(25), "normal")],
    );
    let mut scenario = Scenario::against(phantom);
    let mut rng = TurnRng::new_for_test(vec![1.0, 0.0, 1.0]);

    let bus = assert_ok(scenario.resolve(attack("strike"), &mut rng));

    let outcome = bus
        .events()
        .iter()
        .find_map(|e| match e {
            BattleEvent::DamageDealt {
                target: Side::Wild,
                outcome,
                ..
            } => Some(*outcome),
            _ => None,
        })
        .unwrap();
    assert_eq!(outcome.damage, 1);
    assert_eq!(outcome.effectiveness, Effectiveness::NoEffect);
    assert_eq!(scenario.ctx.battle.wild_current_hp, 99);
}

#[test]
fn test_player_status_move_deals_nothing_and_skips_variance() {
    let mut scenario = Scenario::new();
    // Wild move pick and variance only.
    let mut rng = TurnRng::new_for_test(vec![0.0, 1.0]);

    assert_ok(scenario.resolve(attack("growl"), &mut rng));

    assert_eq!(scenario.ctx.battle.wild_current_hp, 100);
    assert_eq!(scenario.active_hp(), 88);
    assert_eq!(rng.remaining(), 0);
}

#[test]
fn test_counter_attack_with_status_move_deals_nothing() {
    let lurker = test_species(
        "lurker",
        100,
        50,
        50,
        &["normal"],
        vec![test_move("leer", None, "normal")],
    );
    let mut scenario = Scenario::against(lurker);
    let mut rng = TurnRng::new_for_test(vec![1.0, 0.0]);

    let bus = assert_ok(scenario.resolve(attack("strike"), &mut rng));

    assert_eq!(scenario.active_hp(), 100);
    assert_eq!(rng.remaining(), 0);
    assert!(bus.events().contains(&BattleEvent::MoveUsed {
        side: Side::Wild,
        species: "lurker".to_string(),
        move_name: "leer".to_string(),
    }));
}

#[test]
fn test_wild_without_moves_uses_fallback_strike() {
    let blob = test_species("blob", 100, 50, 50, &["normal"], vec![]);
    let mut scenario = Scenario::against(blob);
    let mut rng = TurnRng::new_for_test(vec![1.0]);

    let bus = assert_ok(scenario.resolve(attack("strike"), &mut rng));

    let fallback = scenario.config.fallback_counter_damage;
    assert_eq!(scenario.active_hp(), 100 - fallback);
    assert!(bus.events().contains(&BattleEvent::FallbackStrike {
        species: "blob".to_string(),
    }));
}

#[rstest]
#[case("hyper-nova", ErrorKind::NotFound)]
#[case("nibble", ErrorKind::MoveNotOwned)]
fn test_attack_with_unusable_move_is_rejected(#[case] move_name: &str, #[case] expected: ErrorKind) {
    let mut scenario = Scenario::new();
    let before = scenario.ctx.clone();
    let mut rng = TurnRng::new_for_test(vec![]);

    let err = scenario.resolve(attack(move_name), &mut rng).unwrap_err();

    assert_eq!(err.kind(), expected);
    assert_eq!(scenario.ctx, before);
}
