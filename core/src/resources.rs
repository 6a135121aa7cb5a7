//! Resource pool access for upkeep drains
//!
//! The engine holds no resource values. During `advance_with` it asks the
//! caller's store for an actor's pools and debits them in place, so the
//! store must hand back the same backing pool for the whole call.

use std::collections::BTreeMap;
use std::hash::BuildHasher;

use cadence_types::{ResourcePool, UpkeepRates};

use crate::actors::ActorId;

/// Lookup from actor id to its mutable resource pools
pub trait ResourceAccess {
    fn pool_mut(&mut self, actor_id: &str) -> Option<&mut ResourcePool>;
}

impl<S: BuildHasher> ResourceAccess for std::collections::HashMap<ActorId, ResourcePool, S> {
    fn pool_mut(&mut self, actor_id: &str) -> Option<&mut ResourcePool> {
        self.get_mut(actor_id)
    }
}

impl<S: BuildHasher> ResourceAccess for hashbrown::HashMap<ActorId, ResourcePool, S> {
    fn pool_mut(&mut self, actor_id: &str) -> Option<&mut ResourcePool> {
        self.get_mut(actor_id)
    }
}

impl ResourceAccess for BTreeMap<ActorId, ResourcePool> {
    fn pool_mut(&mut self, actor_id: &str) -> Option<&mut ResourcePool> {
        self.get_mut(actor_id)
    }
}

/// Debit one upkeep tick, clamping every pool at zero.
///
/// Returns true if a pool that this upkeep actually drains is now empty.
pub fn drain_upkeep_tick(pool: &mut ResourcePool, rates: &UpkeepRates) -> bool {
    pool.mp = (pool.mp - rates.mp_per_5s).max(0.0);
    pool.stamina = (pool.stamina - rates.stamina_per_5s).max(0.0);
    pool.hp = (pool.hp - rates.hp_per_5s).max(0.0);

    (rates.mp_per_5s > 0.0 && pool.mp <= 0.0)
        || (rates.stamina_per_5s > 0.0 && pool.stamina <= 0.0)
        || (rates.hp_per_5s > 0.0 && pool.hp <= 0.0)
}
