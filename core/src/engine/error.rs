//! Rejection reasons for engine operations

use thiserror::Error;

use crate::actors::ActorId;
use crate::clock::Millis;

/// Why `start_cast` refused to start. A rejected cast mutates nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastRejection {
    #[error("unknown actor {actor_id}")]
    UnknownActor { actor_id: ActorId },

    #[error("actor {actor_id} is dead")]
    Dead { actor_id: ActorId },

    #[error("actor {actor_id} is on global cooldown for another {remaining_ms}ms")]
    GlobalCooldown {
        actor_id: ActorId,
        remaining_ms: Millis,
    },

    #[error("actor {actor_id} is already casting {ability_id}")]
    AlreadyCasting {
        actor_id: ActorId,
        ability_id: String,
    },
}
