pub mod actors;
pub mod channels;
pub mod clock;
pub mod config;
pub mod effects;
pub mod engine;
pub mod resources;
pub mod signals;
pub mod timeline;

// Shared types re-exported for convenience
pub use cadence_types::{
    DurationModel, EffectKind, EngineConfig, Faction, ResourcePool, UpkeepRates,
};

pub use actors::{ActiveCast, ActorId, ActorState, CastState, Cooldown};
pub use channels::{Channel, Upkeep};
pub use clock::{Millis, SimClock, format_sim_time};
pub use config::{ConfigError, load_config, parse_config};
pub use effects::{AURA_PULSE_TAG, DOT_TICK_TAG, Payload, Periodic, TimedEffect};
pub use engine::{CastRejection, CastRequest, EngineCommand, TimingEngine};
pub use resources::ResourceAccess;
pub use signals::{CombatSignal, SignalBus, SignalHandler, StopReason};
pub use timeline::{ScheduledCall, Timeline};
