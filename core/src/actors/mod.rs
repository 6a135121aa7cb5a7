//! Actor registry types
//!
//! One `ActorState` per combatant: alive flag, faction, global cooldown,
//! per-ability cooldowns, the active cast, owned channels and applied effects.

mod state;

pub use state::{ActiveCast, ActorId, ActorState, CastState, Cooldown};
