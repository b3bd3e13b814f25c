/// World: everything a running round owns.
///
/// Characters, slots, scrolling entities, the ground strip, round state and
/// the task list live here and are passed by `&mut` into each subsystem.
/// Nothing in the simulation is global.
///
/// ## Slots
///
/// `slots` is the fixed sequence of x-coordinates computed at startup and
/// never changes. Each character's `slot` field indexes into it; a hit
/// permutes those indices, never the sequence.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::{GameConfig, PhysicsConfig, RoundConfig, ScreenConfig};
use crate::domain::character::{CharId, Character};
use crate::domain::reorder::is_slot_permutation;
use crate::domain::scroll::{EntityId, EntityKind, GroundStrip, ScrollingEntity};
use super::director::Director;
use super::task::Task;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoundPhase {
    Running,
    Finished,
}

/// How a round ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Winner(CharId),
    Tie,
}

/// The end-of-round text.
#[derive(Clone, Debug)]
pub struct Label {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

pub struct World {
    // ── Fixed configuration ──
    pub screen: ScreenConfig,
    pub physics: PhysicsConfig,
    pub round_cfg: RoundConfig,
    pub floor: f32,
    pub slots: Vec<f32>,

    // ── Entities ──
    pub characters: Vec<Character>,
    pub entities: Vec<ScrollingEntity>,
    pub ground: GroundStrip,

    // ── Round ──
    pub round: RoundPhase,
    pub outcome: Option<Outcome>,
    pub label: Option<Label>,

    // ── Clock ──
    pub time: f32,
    pub frame: u64,

    pub rng: Pcg32,

    // ── Scheduler ──
    /// Live tasks in registration order.
    pub(crate) tasks: Vec<Task>,
    /// Tasks spawned during the current frame; they join `tasks` after it.
    pub(crate) spawned: Vec<Task>,

    next_entity_id: EntityId,
}

// ── Construction ──

impl World {
    pub fn new(config: &GameConfig) -> Self {
        let seed = config.round.seed.unwrap_or_else(rand::random);
        World::with_seed(config, seed)
    }

    pub fn with_seed(config: &GameConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let floor = config.screen.floor();
        let slots = config.screen.slots(config.skins.len());

        let characters: Vec<Character> = config.skins.iter()
            .enumerate()
            .map(|(i, skin)| {
                let offset: f32 = rng.random();
                Character::new(skin, i, slots[i], floor, offset)
            })
            .collect();

        let mut tasks: Vec<Task> = (0..characters.len()).map(Task::Animate).collect();
        tasks.push(Task::Ground);
        tasks.push(Task::Director(Director::new()));

        log::info!(
            "round start: {} characters, {:.0}s, seed {seed}",
            characters.len(), config.round.duration_secs,
        );

        World {
            screen: config.screen.clone(),
            physics: config.physics.clone(),
            round_cfg: config.round.clone(),
            floor,
            slots,
            characters,
            entities: vec![],
            ground: GroundStrip::new(config.screen.width, floor),
            round: RoundPhase::Running,
            outcome: None,
            label: None,
            time: 0.0,
            frame: 0,
            rng,
            tasks,
            spawned: vec![],
            next_entity_id: 1,
        }
    }

    /// Start a fresh round, continuing the random stream.
    pub fn restart(&mut self, config: &GameConfig) {
        let seed: u64 = self.rng.random();
        *self = World::with_seed(config, seed);
    }
}

// ── Queries ──

impl World {
    /// Character ids sorted by slot, leftmost first.
    pub fn in_slot_order(&self) -> Vec<CharId> {
        let mut ids: Vec<CharId> = (0..self.characters.len()).collect();
        ids.sort_by_key(|&id| self.characters[id].slot);
        ids
    }

    pub fn slots_are_permutation(&self) -> bool {
        let slots: Vec<usize> = self.characters.iter().map(|c| c.slot).collect();
        is_slot_permutation(&slots)
    }

    pub fn entity(&self, id: EntityId) -> Option<&ScrollingEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut ScrollingEntity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }
}

// ── Mutation ──

impl World {
    /// Queue a task. It is polled from the next frame on.
    pub fn spawn_task(&mut self, task: Task) {
        self.spawned.push(task);
    }

    /// Create a scrolling entity and start its scroll task.
    pub fn spawn_entity(&mut self, kind: EntityKind, image: &str, size: (f32, f32), x: f32, y: f32) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        self.entities.push(ScrollingEntity::new(id, kind, image, size, x, y));
        self.spawn_task(Task::Scroll(id));
        log::debug!("spawn {kind:?} #{id} '{image}' at y={y}");
        id
    }

    pub fn remove_entity(&mut self, id: EntityId) {
        if let Some(e) = self.entity_mut(id) {
            e.sprite.delete();
        }
        self.entities.retain(|e| e.id != id);
    }

    pub fn set_label(&mut self, text: String) {
        self.label = Some(Label {
            text,
            x: self.screen.width / 2.0,
            y: self.screen.height / 3.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn characters_start_in_their_slots() {
        let w = World::with_seed(&GameConfig::default(), 1);
        assert_eq!(w.characters.len(), 4);
        for (i, c) in w.characters.iter().enumerate() {
            assert_eq!(c.slot, i);
            assert_eq!(c.sprite.x, w.slots[i]);
            assert_eq!(c.y(), w.floor);
        }
        assert!(w.slots_are_permutation());
        assert_eq!(w.in_slot_order(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn initial_tasks_are_animators_ground_director() {
        let w = World::with_seed(&GameConfig::default(), 1);
        assert_eq!(w.tasks.len(), 6);
        assert!(matches!(w.tasks[0], Task::Animate(0)));
        assert!(matches!(w.tasks[4], Task::Ground));
        assert!(matches!(w.tasks[5], Task::Director(_)));
    }

    #[test]
    fn slot_order_follows_slot_field() {
        let mut w = World::with_seed(&GameConfig::default(), 1);
        for (id, slot) in [(0, 2), (1, 0), (2, 3), (3, 1)] {
            w.characters[id].slot = slot;
        }
        assert_eq!(w.in_slot_order(), vec![1, 3, 0, 2]);
    }

    #[test]
    fn entity_ids_are_unique_and_removable() {
        let mut w = World::with_seed(&GameConfig::default(), 1);
        let a = w.spawn_entity(EntityKind::Obstacle, "crate", (70.0, 70.0), 1380.0, w.floor);
        let b = w.spawn_entity(EntityKind::Collectible, "coin", (40.0, 40.0), 1380.0, 400.0);
        assert_ne!(a, b);
        assert_eq!(w.spawned.len(), 2);
        w.remove_entity(a);
        assert!(w.entity(a).is_none());
        assert!(w.entity(b).is_some());
    }

    #[test]
    fn restart_resets_the_round() {
        let cfg = GameConfig::default();
        let mut w = World::with_seed(&cfg, 1);
        w.characters[2].score = 3;
        w.characters[0].slot = 1;
        w.characters[1].slot = 0;
        w.round = RoundPhase::Finished;
        w.set_label("done".to_string());
        w.spawn_entity(EntityKind::Flag, "flag", (70.0, 140.0), 1380.0, w.floor);

        w.restart(&cfg);
        assert_eq!(w.round, RoundPhase::Running);
        assert!(w.label.is_none() && w.outcome.is_none());
        assert!(w.entities.is_empty());
        assert!(w.characters.iter().all(|c| c.score == 0));
        assert_eq!(w.in_slot_order(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn same_seed_same_walk_offsets() {
        let cfg = GameConfig::default();
        let a = World::with_seed(&cfg, 42);
        let b = World::with_seed(&cfg, 42);
        let ya: Vec<_> = a.characters.iter().map(|c| format!("{c:?}")).collect();
        let yb: Vec<_> = b.characters.iter().map(|c| format!("{c:?}")).collect();
        assert_eq!(ya, yb);
    }
}
