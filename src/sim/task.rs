/// Cooperative frame scheduler.
///
/// Every long-running behaviour (character animators, spin routines,
/// scrolling entities, the ground strip, the round director) is a `Task`:
/// a resumable state machine polled once per frame, in registration order.
/// A task suspends by returning `Poll::Pending` and ends by returning
/// `Poll::Done`; there is no other cancellation. Tasks spawned while a
/// frame runs are queued in `World::spawned` and join the list after it,
/// so they are first polled on the following frame.

use std::f32::consts::TAU;

use crate::domain::character::CharId;
use crate::domain::easing::{Curve, Tween};
use crate::domain::scroll::{EntityId, EntityKind};
use super::collide;
use super::director::Director;
use super::event::GameEvent;
use super::world::World;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Poll {
    Pending,
    Done,
}

#[derive(Clone, Debug)]
pub enum Task {
    /// Physics, walk cycle and slot slide for one character.
    Animate(CharId),
    /// The visual spin that accompanies a double jump.
    Spin(SpinTask),
    Ground,
    /// Scroll + collision loop for one entity.
    Scroll(EntityId),
    Director(Director),
}

impl Task {
    pub fn poll(&mut self, world: &mut World, dt: f32, events: &mut Vec<GameEvent>) -> Poll {
        match self {
            Task::Animate(id) => poll_animate(*id, world, dt, events),
            Task::Spin(spin) => spin.poll(world, dt),
            Task::Ground => {
                let speed = world.physics.scroll_speed;
                world.ground.advance(dt, speed);
                Poll::Pending
            }
            Task::Scroll(id) => poll_scroll(*id, world, dt, events),
            Task::Director(director) => director.poll(world, dt, events),
        }
    }
}

/// Poll every task once, in order, then admit the tasks spawned meanwhile.
pub fn run_frame(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) {
    let mut tasks = std::mem::take(&mut world.tasks);
    tasks.retain_mut(|task| task.poll(world, dt, events) == Poll::Pending);
    tasks.append(&mut world.spawned);
    world.tasks = tasks;
}

fn poll_animate(id: CharId, world: &mut World, dt: f32, events: &mut Vec<GameEvent>) -> Poll {
    let floor = world.floor;
    let Some(c) = world.characters.get_mut(id) else { return Poll::Done };
    c.advance_slide(dt);
    if c.integrate(dt, &world.physics, floor) {
        events.push(GameEvent::Landed { who: id });
    }
    Poll::Pending
}

fn poll_scroll(id: EntityId, world: &mut World, dt: f32, events: &mut Vec<GameEvent>) -> Poll {
    let speed = world.physics.scroll_speed;
    let Some(entity) = world.entity_mut(id) else { return Poll::Done };

    if !entity.advance(dt, speed) {
        world.remove_entity(id);
        events.push(GameEvent::Despawned { id });
        return Poll::Done;
    }

    let kind = entity.kind;
    let Some(bounds) = entity.bounds() else { return Poll::Pending };

    match kind {
        EntityKind::Obstacle => {
            collide::obstacle_pass(world, &bounds, events);
            Poll::Pending
        }
        EntityKind::Collectible => {
            if collide::collect(world, &bounds, events) {
                world.remove_entity(id);
                events.push(GameEvent::Despawned { id });
                Poll::Done
            } else {
                Poll::Pending
            }
        }
        EntityKind::Flag => Poll::Pending,
    }
}

// ── Spin routine ──

#[derive(Clone, Debug)]
enum SpinStage {
    Rotating(Tween),
    Holding { remaining: f32 },
}

/// One full backward turn, then a short hold before the jump pose returns.
/// Only the sprite's angle and anchor change; position and velocity stay
/// with the animator task. A newer spin of the same character retires
/// this one without running its hooks.
#[derive(Clone, Debug)]
pub struct SpinTask {
    who: CharId,
    generation: u32,
    stage: SpinStage,
}

impl SpinTask {
    pub fn new(who: CharId, generation: u32, duration: f32) -> Self {
        SpinTask {
            who,
            generation,
            stage: SpinStage::Rotating(Tween::new(0.0, -TAU, duration, Curve::AccelDecel)),
        }
    }

    fn poll(&mut self, world: &mut World, dt: f32) -> Poll {
        let hold = world.physics.spin_hold_secs;
        let Some(c) = world.characters.get_mut(self.who) else { return Poll::Done };
        if c.spin_gen != self.generation {
            return Poll::Done;
        }

        match &mut self.stage {
            SpinStage::Rotating(tween) => {
                let done = tween.advance(dt);
                c.sprite.angle = tween.value();
                if done {
                    c.end_spin_rotation();
                    self.stage = SpinStage::Holding { remaining: hold };
                }
                Poll::Pending
            }
            SpinStage::Holding { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    c.finish_spin();
                    Poll::Done
                } else {
                    Poll::Pending
                }
            }
        }
    }
}
