//! Battle lifecycle API: the operations front ends call on behalf of a user.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use crate::auth::UserId;
use crate::battle::context::EncounterContext;
use crate::battle::engine::{resolve_action, ActionOutcome};
use crate::battle::state::{Battle, BattleDraft, BattleId, TurnRng};
use crate::catalog::{CatalogCache, CatalogError, CreatureCatalog};
use crate::config::EncounterConfig;
use crate::errors::{EncounterError, EncounterResult};
use crate::healing::{HealingService, HealthReport};
use crate::locks::KeyedLocks;
use crate::player::{PlayerAction, Roster};
use crate::pokemon::{CreatureInstance, InstanceId, NewInstance};
use crate::repository::EncounterRepository;
use crate::species::Species;
use crate::teams::TeamManager;

/// Entry point for every game operation.
///
/// Catalog lookups happen before any lock is taken. Battle actions hold the
/// battle lock and then the owner's roster lock; roster operations hold only
/// the roster lock.
pub struct EncounterService {
    repo: Arc<dyn EncounterRepository>,
    cache: CatalogCache,
    config: EncounterConfig,
    rng: Mutex<TurnRng>,
    battle_locks: KeyedLocks<BattleId>,
    roster_locks: KeyedLocks<UserId>,
}

impl EncounterService {
    pub fn new(
        catalog: Arc<dyn CreatureCatalog>,
        repo: Arc<dyn EncounterRepository>,
        config: EncounterConfig,
    ) -> Self {
        let rng = TurnRng::from_config(&config);
        Self {
            repo,
            cache: CatalogCache::new(catalog),
            config,
            rng: Mutex::new(rng),
            battle_locks: KeyedLocks::new(),
            roster_locks: KeyedLocks::new(),
        }
    }

    /// Replace the random source, e.g. with scripted rolls.
    pub fn with_rng(mut self, rng: TurnRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.cache
    }

    pub async fn species(&self, name: &str) -> EncounterResult<Arc<Species>> {
        self.cache.species(name).await
    }

    /// Species a new player may pick as their first creature.
    pub async fn starter_options(&self) -> EncounterResult<Vec<Arc<Species>>> {
        let mut options = Vec::with_capacity(self.config.starter_species.len());
        for name in &self.config.starter_species {
            options.push(self.cache.species(name).await?);
        }
        Ok(options)
    }

    /// Give a player with no creatures their first one, on the team at full HP.
    pub async fn choose_starter(
        &self,
        user: UserId,
        species_name: &str,
    ) -> EncounterResult<CreatureInstance> {
        if !self.config.is_starter(species_name) {
            return Err(EncounterError::invalid(format!(
                "'{}' is not a starter, choose one of: {}",
                species_name,
                self.config.starter_species.join(", ")
            )));
        }
        let species = self.cache.species(species_name).await?;

        let _roster = self.roster_locks.lock(&user).await;
        if !self.repo.instances_for(user)?.is_empty() {
            return Err(EncounterError::invalid(
                "a starter can only be chosen before owning any creature",
            ));
        }

        let starter = self.repo.insert_instance(NewInstance {
            owner: user,
            species: species.name.clone(),
            current_hp: species.max_hp(),
            level: self.config.starter_level,
            on_team: true,
        })?;
        info!(%user, species = %starter.species, creature = %starter.id, "starter chosen");
        Ok(starter)
    }

    /// Start an encounter with a random wild creature.
    ///
    /// The player's first living team member fights first.
    pub async fn start_battle(&self, user: UserId) -> EncounterResult<Battle> {
        let roster = Roster::from_instances(self.repo.instances_for(user)?);
        if !roster.has_living_team_member() {
            return Err(EncounterError::invalid(
                "a battle needs at least one living team member",
            ));
        }
        let wild = self.cache.random_species().await?;

        let _roster = self.roster_locks.lock(&user).await;
        let roster = Roster::from_instances(self.repo.instances_for(user)?);
        let active = roster
            .team
            .iter()
            .find(|p| p.is_alive())
            .map(|p| p.id)
            .ok_or_else(|| {
                EncounterError::invalid("a battle needs at least one living team member")
            })?;

        let draft = BattleDraft::new(user, &wild.name, wild.max_hp(), Some(active), &self.config);
        let battle = self.repo.insert_battle(draft)?;
        info!(%user, battle = %battle.id, wild = %battle.wild_species, hp = battle.wild_max_hp, "battle started");
        Ok(battle)
    }

    /// Read a battle, including finished ones.
    pub async fn get_battle(&self, user: UserId, id: BattleId) -> EncounterResult<Battle> {
        self.load_battle(user, id)
    }

    /// Parse a tagged action at the boundary and perform it.
    pub async fn perform_tagged_action(
        &self,
        user: UserId,
        id: BattleId,
        tag: &str,
        params: &serde_json::Value,
    ) -> EncounterResult<ActionOutcome> {
        let action = PlayerAction::from_tag(tag, params)?;
        self.perform_action(user, id, action).await
    }

    /// Resolve one action and persist its results.
    ///
    /// A rejected action leaves the stored battle and creatures untouched.
    pub async fn perform_action(
        &self,
        user: UserId,
        id: BattleId,
        action: PlayerAction,
    ) -> EncounterResult<ActionOutcome> {
        let battle = self.load_battle(user, id)?;
        let roster = self.repo.instances_for(user)?;
        self.ensure_species(
            std::iter::once(battle.wild_species.as_str())
                .chain(roster.iter().map(|p| p.species.as_str())),
        )
        .await?;
        if let (true, PlayerAction::Attack { move_name }) = (battle.is_active(), &action) {
            self.ensure_move(move_name).await?;
        }

        let _battle = self.battle_locks.lock(&id).await;
        let _roster = self.roster_locks.lock(&user).await;

        let battle = self.load_battle(user, id)?;
        let roster = self.repo.instances_for(user)?;
        let book = self.cache.snapshot();
        let mut ctx = EncounterContext::new(battle, roster.clone());

        let result = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            resolve_action(&mut ctx, &action, &book, &self.config, &mut rng)
        };
        let bus = match result {
            Ok(bus) => bus,
            Err(err) => {
                warn!(%user, battle = %id, %action, error = %err, "action rejected");
                return Err(err);
            }
        };
        bus.trace(id);

        let changed: Vec<CreatureInstance> = ctx
            .roster
            .iter()
            .filter(|p| !roster.contains(p))
            .cloned()
            .collect();
        let captured = self
            .repo
            .commit(&ctx.battle, &changed, ctx.new_capture.take())?;

        info!(
            %user,
            battle = %id,
            %action,
            status = %ctx.battle.status,
            wild_hp = ctx.battle.wild_current_hp,
            "action resolved"
        );
        if let Some(captured) = &captured {
            info!(%user, species = %captured.species, creature = %captured.id, "creature captured");
        }

        Ok(ActionOutcome {
            battle: ctx.battle,
            events: bus.into_events(),
            captured,
        })
    }

    pub async fn list_instances(&self, user: UserId) -> EncounterResult<Roster> {
        TeamManager::new(self.repo.as_ref(), &self.config).roster(user)
    }

    pub async fn toggle_membership(
        &self,
        user: UserId,
        id: InstanceId,
    ) -> EncounterResult<CreatureInstance> {
        let _roster = self.roster_locks.lock(&user).await;
        TeamManager::new(self.repo.as_ref(), &self.config).toggle_membership(user, id)
    }

    pub async fn swap(
        &self,
        user: UserId,
        team_id: InstanceId,
        reserve_id: InstanceId,
    ) -> EncounterResult<(CreatureInstance, CreatureInstance)> {
        let _roster = self.roster_locks.lock(&user).await;
        TeamManager::new(self.repo.as_ref(), &self.config).swap(user, team_id, reserve_id)
    }

    pub async fn release(&self, user: UserId, id: InstanceId) -> EncounterResult<CreatureInstance> {
        let _roster = self.roster_locks.lock(&user).await;
        TeamManager::new(self.repo.as_ref(), &self.config).release(user, id)
    }

    pub async fn heal_all(&self, user: UserId) -> EncounterResult<usize> {
        self.ensure_roster_species(user).await?;
        let _roster = self.roster_locks.lock(&user).await;
        let book = self.cache.snapshot();
        HealingService::new(self.repo.as_ref(), &book).heal_all(user)
    }

    pub async fn heal_one(&self, user: UserId, id: InstanceId) -> EncounterResult<CreatureInstance> {
        self.ensure_roster_species(user).await?;
        let _roster = self.roster_locks.lock(&user).await;
        let book = self.cache.snapshot();
        HealingService::new(self.repo.as_ref(), &book).heal_one(user, id)
    }

    pub async fn revive_one(
        &self,
        user: UserId,
        id: InstanceId,
    ) -> EncounterResult<CreatureInstance> {
        self.ensure_roster_species(user).await?;
        let _roster = self.roster_locks.lock(&user).await;
        let book = self.cache.snapshot();
        HealingService::new(self.repo.as_ref(), &book).revive_one(user, id)
    }

    pub async fn revive_all(&self, user: UserId) -> EncounterResult<usize> {
        self.ensure_roster_species(user).await?;
        let _roster = self.roster_locks.lock(&user).await;
        let book = self.cache.snapshot();
        HealingService::new(self.repo.as_ref(), &book).revive_all(user)
    }

    pub async fn health_report(&self, user: UserId) -> EncounterResult<HealthReport> {
        self.ensure_roster_species(user).await?;
        let book = self.cache.snapshot();
        HealingService::new(self.repo.as_ref(), &book).health_report(user)
    }

    fn load_battle(&self, user: UserId, id: BattleId) -> EncounterResult<Battle> {
        self.repo
            .load_battle(user, id)?
            .ok_or_else(|| EncounterError::not_found(format!("battle {}", id)))
    }

    async fn ensure_roster_species(&self, user: UserId) -> EncounterResult<()> {
        let roster = self.repo.instances_for(user)?;
        self.ensure_species(roster.iter().map(|p| p.species.as_str()))
            .await
    }

    /// Load a move so the engine can tell a real move the creature does not
    /// know from a name that matches no move at all.
    async fn ensure_move(&self, move_name: &str) -> EncounterResult<()> {
        match self.cache.move_details(move_name).await {
            Ok(_) | Err(EncounterError::Catalog(CatalogError::UnknownMove(_))) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Load every named species into the cache.
    async fn ensure_species<'a>(
        &self,
        names: impl Iterator<Item = &'a str>,
    ) -> EncounterResult<()> {
        let unique: BTreeSet<&str> = names.collect();
        for name in unique {
            self.cache.species(name).await?;
        }
        Ok(())
    }
}
