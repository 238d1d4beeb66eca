use crate::auth::UserId;
use crate::battle::context::EncounterContext;
use crate::battle::engine::resolve_action;
use crate::battle::state::{Battle, BattleDraft, BattleEvent, BattleId, EventBus, TurnRng};
use crate::catalog::ReferenceBook;
use crate::config::EncounterConfig;
use crate::errors::EncounterResult;
use crate::player::PlayerAction;
use crate::pokemon::{CreatureInstance, InstanceId};
use crate::species::{BaseStats, MoveData, Species, SpeciesData, Sprites};
use schema::{DamageRelations, TypeData};

pub const TRAINER: UserId = UserId(1);

pub fn test_move(name: &str, power: Option<u16>, move_type: &str) -> MoveData {
    MoveData {
        name: name.to_string(),
        power,
        pp: 35,
        accuracy: Some(100),
        move_type: move_type.to_string(),
    }
}

/// A species with only the stats the battle math reads.
pub fn test_species(
    name: &str,
    hp: u16,
    attack: u16,
    defense: u16,
    types: &[&str],
    moves: Vec<MoveData>,
) -> Species {
    Species::from_data(
        SpeciesData {
            name: name.to_string(),
            base_stats: BaseStats {
                hp,
                attack,
                defense,
                sp_attack: 50,
                sp_defense: 50,
                speed: 50,
            },
            types: types.iter().map(|t| t.to_string()).collect(),
            base_experience: 64,
            height: 7,
            weight: 69,
            sprites: Sprites::default(),
            moves: Vec::new(),
        },
        moves,
    )
}

/// Player-side species: `strike` hits for 35 against defense 50 at full variance.
pub fn hero() -> Species {
    test_species(
        "hero",
        100,
        50,
        55,
        &["normal"],
        vec![
            test_move("strike", Some(75), "normal"),
            test_move("growl", None, "normal"),
        ],
    )
}

/// Wild species: `nibble` hits the hero for 12 at full variance.
pub fn wildling() -> Species {
    test_species(
        "wildling",
        100,
        50,
        50,
        &["normal"],
        vec![test_move("nibble", Some(25), "normal")],
    )
}

pub fn create_book(species: Vec<Species>) -> ReferenceBook {
    let mut book = ReferenceBook::new();
    for s in species {
        book.insert_species(s);
    }
    book.insert_type(TypeData {
        name: "ghost".to_string(),
        damage_relations: DamageRelations {
            no_damage_from: vec!["normal".to_string(), "fighting".to_string()],
            double_damage_from: vec!["ghost".to_string(), "dark".to_string()],
            ..Default::default()
        },
    });
    book
}

pub fn create_instance(id: u64, species: &Species, current_hp: u16, on_team: bool) -> CreatureInstance {
    CreatureInstance {
        id: InstanceId(id),
        owner: TRAINER,
        species: species.name.clone(),
        current_hp,
        level: 5,
        experience: 0,
        on_team,
    }
}

/// A fresh battle against `wild` with creature #1 fighting.
pub fn create_battle(wild: &Species, config: &EncounterConfig) -> Battle {
    BattleDraft::new(
        TRAINER,
        &wild.name,
        wild.max_hp(),
        Some(InstanceId(1)),
        config,
    )
    .into_battle(BattleId(1))
}

/// Everything a scenario needs: a context, the reference data and the config.
pub struct Scenario {
    pub ctx: EncounterContext,
    pub book: ReferenceBook,
    pub config: EncounterConfig,
}

impl Scenario {
    /// Hero (#1, full HP, on the team) against a wildling.
    pub fn new() -> Self {
        Self::against(wildling())
    }

    pub fn against(wild: Species) -> Self {
        let config = EncounterConfig::default();
        let hero = hero();
        let battle = create_battle(&wild, &config);
        let roster = vec![create_instance(1, &hero, hero.max_hp(), true)];
        Self {
            ctx: EncounterContext::new(battle, roster),
            book: create_book(vec![hero, wild]),
            config,
        }
    }

    pub fn with_instance(mut self, instance: CreatureInstance) -> Self {
        self.ctx.roster.push(instance);
        self.ctx.roster.sort_by_key(|p| p.id);
        self
    }

    pub fn with_active_hp(mut self, hp: u16) -> Self {
        if let Some(active) = self.ctx.active_mut() {
            active.current_hp = hp;
        }
        self
    }

    pub fn with_wild_hp(mut self, hp: u16) -> Self {
        self.ctx.battle.wild_current_hp = hp;
        self
    }

    pub fn resolve(&mut self, action: PlayerAction, rng: &mut TurnRng) -> EncounterResult<EventBus> {
        resolve_action(&mut self.ctx, &action, &self.book, &self.config, rng)
    }

    pub fn active_hp(&self) -> u16 {
        self.ctx.active().map(|p| p.current_hp).unwrap_or(0)
    }
}

pub fn attack(move_name: &str) -> PlayerAction {
    PlayerAction::Attack {
        move_name: move_name.to_string(),
    }
}

/// Helper function to assert that a Result is Ok and return the value.
pub fn assert_ok<T>(result: EncounterResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}

pub fn count_events(bus: &EventBus, predicate: impl Fn(&BattleEvent) -> bool) -> usize {
    bus.events().iter().filter(|e| predicate(e)).count()
}
