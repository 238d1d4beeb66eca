//! Repository contract for battles and creature instances.

use crate::auth::UserId;
use crate::battle::state::{Battle, BattleDraft, BattleId};
use crate::pokemon::{CreatureInstance, InstanceId, NewInstance};

use super::Result;

/// Storage for the mutable entities of the game.
///
/// Every read is scoped to an owner: an entity that exists but belongs to
/// someone else is reported as absent.
pub trait EncounterRepository: Send + Sync {
    fn load_battle(&self, owner: UserId, id: BattleId) -> Result<Option<Battle>>;

    /// Store a new battle and assign its id.
    fn insert_battle(&self, draft: BattleDraft) -> Result<Battle>;

    fn save_battle(&self, battle: &Battle) -> Result<()>;

    /// The owner's battles that have not ended yet, sorted by id.
    fn active_battles_for(&self, owner: UserId) -> Result<Vec<Battle>>;

    fn load_instance(&self, owner: UserId, id: InstanceId) -> Result<Option<CreatureInstance>>;

    /// Store a new creature and assign its id. A user owns at most one
    /// creature per species.
    fn insert_instance(&self, new_instance: NewInstance) -> Result<CreatureInstance>;

    fn save_instance(&self, instance: &CreatureInstance) -> Result<()>;

    /// Save several creatures at once: either all are written or none.
    fn save_instances(&self, instances: &[CreatureInstance]) -> Result<()>;

    /// Remove a creature. Returns false if the owner had no such creature.
    fn delete_instance(&self, owner: UserId, id: InstanceId) -> Result<bool>;

    /// Every creature the owner holds, sorted by id.
    fn instances_for(&self, owner: UserId) -> Result<Vec<CreatureInstance>>;

    /// Persist the outcome of one battle action in a single step.
    ///
    /// Writes the battle, the given creatures and, if present, stores the
    /// captured creature. Returns the stored capture.
    fn commit(
        &self,
        battle: &Battle,
        instances: &[CreatureInstance],
        capture: Option<NewInstance>,
    ) -> Result<Option<CreatureInstance>>;
}
