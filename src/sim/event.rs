/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound; tests use them to
/// observe what a frame did.

use crate::domain::character::CharId;
use crate::domain::scroll::{EntityId, EntityKind};
use super::world::Outcome;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped { who: CharId },
    Spun { who: CharId },
    Landed { who: CharId },
    Hit { who: CharId },
    Collected { who: CharId, score: u32 },
    Reordered { order: Vec<CharId> },
    Spawned { id: EntityId, kind: EntityKind },
    Despawned { id: EntityId },
    RoundFinished { outcome: Outcome },
}
