//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed substeps only
//! - Injected RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod arena;
pub mod combat;
pub mod contact;
pub mod forces;
pub mod lifecycle;
pub mod rng;
pub mod state;
pub mod stats;
pub mod tick;
pub mod world;

pub use arena::Arena;
pub use rng::{PcgSource, RandomSource, SequenceSource};
pub use state::{
    DeathCause, Drift, Entity, EntityId, EntitySnapshot, MatchOutcome, MatchPhase, MatchState, SimEvent, Vitality,
};
pub use stats::{ForcePreset, ForcePresetKind, ForcePresets, StatOverrides, Stats};
pub use tick::{Combatant, FrameInput, Simulation, arena_world, default_roster};
pub use world::{BodyHandle, BodyProps, BodyState, CollisionPair, RigidBodyWorld, SimpleWorld};
