/// Round director: spawns obstacles and collectibles for a fixed time
/// budget, then plants the finish flag and names the winner.
///
///   Running ──(elapsed ≥ budget)──▶ Finished
///
/// While running, each spawn is an obstacle or a collectible with equal
/// odds, followed by a random wait drawn from `[spawn_min, spawn_max]`.

use rand::Rng;

use crate::domain::scroll::{EntityKind, COLLECTIBLES, FLAG, OBSTACLES, SPAWN_MARGIN};
use super::event::GameEvent;
use super::task::Poll;
use super::world::{Outcome, RoundPhase, World};

#[derive(Clone, Debug, Default)]
pub struct Director {
    elapsed: f32,
    /// Seconds until the next spawn.
    wait: f32,
}

impl Director {
    pub fn new() -> Self {
        Director { elapsed: 0.0, wait: 0.0 }
    }

    pub fn poll(&mut self, world: &mut World, dt: f32, events: &mut Vec<GameEvent>) -> Poll {
        if world.round == RoundPhase::Finished {
            return Poll::Done;
        }

        self.elapsed += dt;
        self.wait -= dt;

        if self.elapsed >= world.round_cfg.duration_secs {
            finish_round(world, events);
            return Poll::Done;
        }

        if self.wait <= 0.0 {
            spawn_random(world, events);
            let (lo, hi) = (world.round_cfg.spawn_min_secs, world.round_cfg.spawn_max_secs);
            self.wait = if hi > lo { world.rng.random_range(lo..hi) } else { lo };
        }
        Poll::Pending
    }
}

fn spawn_random(world: &mut World, events: &mut Vec<GameEvent>) {
    let x = world.screen.width + SPAWN_MARGIN;
    let id = if world.rng.random_bool(0.5) {
        let (image, size) = OBSTACLES[world.rng.random_range(0..OBSTACLES.len())];
        world.spawn_entity(EntityKind::Obstacle, image, size, x, world.floor)
    } else {
        let (image, size) = COLLECTIBLES[world.rng.random_range(0..COLLECTIBLES.len())];
        let heights = &world.round_cfg.collectible_heights;
        let height = heights[world.rng.random_range(0..heights.len())];
        world.spawn_entity(EntityKind::Collectible, image, size, x, world.floor - height)
    };
    if let Some(e) = world.entity(id) {
        events.push(GameEvent::Spawned { id, kind: e.kind });
    }
}

fn finish_round(world: &mut World, events: &mut Vec<GameEvent>) {
    let (image, size) = FLAG;
    let x = world.screen.width + SPAWN_MARGIN;
    let id = world.spawn_entity(EntityKind::Flag, image, size, x, world.floor);
    events.push(GameEvent::Spawned { id, kind: EntityKind::Flag });

    let scores: Vec<u32> = world.characters.iter().map(|c| c.score).collect();
    let outcome = decide_outcome(&scores);
    world.round = RoundPhase::Finished;
    world.outcome = Some(outcome);

    let text = match outcome {
        Outcome::Winner(id) => format!("{} wins with {}!", world.characters[id].skin, scores[id]),
        Outcome::Tie => "It's a tie!".to_string(),
    };
    log::info!("round finished at frame {}: {text} scores={scores:?}", world.frame);
    world.set_label(text);
    events.push(GameEvent::RoundFinished { outcome });
}

/// The unique highest score wins; a shared maximum is a tie.
pub fn decide_outcome(scores: &[u32]) -> Outcome {
    let Some(&best) = scores.iter().max() else { return Outcome::Tie };
    let mut leaders = scores.iter().enumerate().filter(|&(_, &s)| s == best);
    match (leaders.next(), leaders.next()) {
        (Some((id, _)), None) => Outcome::Winner(id),
        _ => Outcome::Tie,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::task::run_frame;

    fn world_with(duration: f32) -> World {
        let mut cfg = GameConfig::default();
        cfg.round.duration_secs = duration;
        World::with_seed(&cfg, 5)
    }

    #[test]
    fn outcome_rules() {
        assert_eq!(decide_outcome(&[0, 3, 1, 2]), Outcome::Winner(1));
        assert_eq!(decide_outcome(&[2, 3, 3, 0]), Outcome::Tie);
        assert_eq!(decide_outcome(&[0, 0, 0, 0]), Outcome::Tie);
        assert_eq!(decide_outcome(&[7]), Outcome::Winner(0));
        assert_eq!(decide_outcome(&[]), Outcome::Tie);
    }

    #[test]
    fn zero_budget_spawns_only_the_flag() {
        let mut w = world_with(0.0);
        let mut events = vec![];
        run_frame(&mut w, 1.0 / 60.0, &mut events);

        let spawned: Vec<_> = events.iter()
            .filter_map(|e| match e { GameEvent::Spawned { kind, .. } => Some(*kind), _ => None })
            .collect();
        assert_eq!(spawned, vec![EntityKind::Flag]);
        assert_eq!(w.entities.len(), 1);
        assert_eq!(w.round, RoundPhase::Finished);
        // All scores are zero: a four-way tie.
        assert_eq!(w.outcome, Some(Outcome::Tie));
        assert_eq!(w.label.as_ref().unwrap().text, "It's a tie!");
        assert!(!w.tasks.iter().any(|t| matches!(t, crate::sim::task::Task::Director(_))));
    }

    #[test]
    fn tie_on_equal_maximum_at_round_end() {
        let mut w = world_with(0.0);
        w.characters[1].score = 4;
        w.characters[3].score = 4;
        w.characters[0].score = 2;
        let mut events = vec![];
        run_frame(&mut w, 0.01, &mut events);
        assert_eq!(w.outcome, Some(Outcome::Tie));
        assert!(events.contains(&GameEvent::RoundFinished { outcome: Outcome::Tie }));
    }

    #[test]
    fn strict_maximum_names_the_winner() {
        let mut w = world_with(0.0);
        w.characters[2].score = 5;
        w.characters[0].score = 4;
        let mut events = vec![];
        run_frame(&mut w, 0.01, &mut events);
        assert_eq!(w.outcome, Some(Outcome::Winner(2)));
        assert_eq!(w.label.as_ref().unwrap().text, "alienpink wins with 5!");
    }

    #[test]
    fn spawns_immediately_then_waits_within_range() {
        let mut w = world_with(1000.0);
        let mut events = vec![];
        run_frame(&mut w, 1.0 / 60.0, &mut events);
        assert_eq!(w.entities.len(), 1);

        // No second spawn before spawn_min has passed.
        let frames_min = (w.round_cfg.spawn_min_secs * 60.0) as usize - 2;
        for _ in 0..frames_min {
            run_frame(&mut w, 1.0 / 60.0, &mut events);
        }
        let count = events.iter().filter(|e| matches!(e, GameEvent::Spawned { .. })).count();
        assert_eq!(count, 1);

        // ...but one by spawn_max.
        let frames_rest = ((w.round_cfg.spawn_max_secs - w.round_cfg.spawn_min_secs) * 60.0) as usize + 4;
        for _ in 0..frames_rest {
            run_frame(&mut w, 1.0 / 60.0, &mut events);
        }
        let count = events.iter().filter(|e| matches!(e, GameEvent::Spawned { .. })).count();
        assert_eq!(count, 2);
    }

    #[test]
    fn collectibles_spawn_at_configured_heights() {
        let mut w = world_with(1000.0);
        for _ in 0..64 {
            spawn_random(&mut w, &mut vec![]);
        }
        let floor = w.floor;
        let heights = w.round_cfg.collectible_heights.clone();
        let mut saw_collectible = false;
        for e in &w.entities {
            match e.kind {
                EntityKind::Collectible => {
                    saw_collectible = true;
                    assert!(heights.iter().any(|h| floor - h == e.sprite.y));
                }
                EntityKind::Obstacle => assert_eq!(e.sprite.y, floor),
                EntityKind::Flag => panic!("flag spawned mid-round"),
            }
        }
        assert!(saw_collectible);
    }

    #[test]
    fn round_finishes_after_its_budget() {
        let mut w = world_with(2.0);
        let mut events = vec![];
        for _ in 0..119 {
            run_frame(&mut w, 1.0 / 60.0, &mut events);
        }
        assert_eq!(w.round, RoundPhase::Running);
        for _ in 0..3 {
            run_frame(&mut w, 1.0 / 60.0, &mut events);
        }
        assert_eq!(w.round, RoundPhase::Finished);
    }
}
