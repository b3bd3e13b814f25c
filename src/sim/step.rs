/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Clock bookkeeping
///   2. Input: each activation routes to `characters[index].jump()`
///   3. Scheduler: every task polled once, in registration order
///      (animators, ground, director, then spawned tasks in spawn order)
///
/// At every frame boundary the characters' slots are a permutation of
/// `0..N`.

use crate::domain::character::JumpOutcome;
use super::event::GameEvent;
use super::task::{run_frame, SpinTask, Task};
use super::world::World;

/// Input gathered for one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    /// Character indices activated this frame, in arrival order.
    pub activations: Vec<usize>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World, input: &FrameInput, dt: f32) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    world.time += dt;
    world.frame += 1;

    for &index in &input.activations {
        activate(world, index, &mut events);
    }

    run_frame(world, dt, &mut events);

    debug_assert!(world.slots_are_permutation(), "slots lost their permutation");
    events
}

/// Route one activation to a character's jump. Out-of-range indices are
/// ignored.
pub fn activate(world: &mut World, index: usize, events: &mut Vec<GameEvent>) {
    let spin_secs = world.physics.spin_secs;
    let Some(c) = world.characters.get_mut(index) else { return };

    match c.jump(&world.physics) {
        JumpOutcome::Jumped => events.push(GameEvent::Jumped { who: index }),
        JumpOutcome::Spun => {
            let spin = SpinTask::new(index, c.spin_gen, spin_secs);
            world.spawn_task(Task::Spin(spin));
            events.push(GameEvent::Spun { who: index });
        }
        JumpOutcome::Ignored => {}
    }
}
