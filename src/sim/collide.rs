/// Collision resolution against the live line of characters.
///
/// Obstacles: run the reorder pass (see `domain::reorder`) and, if the line
/// changed, commit the new slots and slide everyone toward them.
/// Collectibles: the first eligible character in slot order scores.
///
/// A character whose sprite has no bounds is never a match.

use crate::domain::character::CharId;
use crate::domain::reorder::reorder_pass;
use crate::domain::sprite::Rect;
use super::event::GameEvent;
use super::world::World;

/// One obstacle's per-frame pass. Returns true if the slot order changed.
pub fn obstacle_pass(world: &mut World, obstacle: &Rect, events: &mut Vec<GameEvent>) -> bool {
    let in_order = world.in_slot_order();

    let World { characters, physics, .. } = world;
    let out_order = reorder_pass(&in_order, |&id| {
        let c = &mut characters[id];
        let Some(bounds) = c.sprite.bounds() else { return false };
        if c.was_hit || !bounds.overlaps(obstacle) {
            return false;
        }
        c.hit(physics);
        log::debug!("hit: {} (slot {})", c.skin, c.slot);
        events.push(GameEvent::Hit { who: id });
        true
    });

    if out_order == in_order {
        return false;
    }
    commit_order(world, &out_order);
    events.push(GameEvent::Reordered { order: out_order });
    true
}

/// Give `order[i]` slot `i` and start each character's slide toward it.
pub fn commit_order(world: &mut World, order: &[CharId]) {
    let duration = world.physics.slide_secs;
    for (slot, &id) in order.iter().enumerate() {
        let target = world.slots[slot];
        let c = &mut world.characters[id];
        c.slot = slot;
        c.slide_to(target, duration);
    }
    log::debug!("reorder: {:?}", order);
}

/// Award a collectible to the first eligible overlapping character.
/// Returns true if it was picked up.
pub fn collect(world: &mut World, item: &Rect, events: &mut Vec<GameEvent>) -> bool {
    for id in world.in_slot_order() {
        let c = &mut world.characters[id];
        if c.was_hit {
            continue;
        }
        let Some(bounds) = c.sprite.bounds() else { continue };
        if bounds.overlaps(item) {
            c.score += 1;
            log::debug!("{} collects, score {}", c.skin, c.score);
            events.push(GameEvent::Collected { who: id, score: c.score });
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::character::CharPhase;

    fn world() -> World {
        World::with_seed(&GameConfig::default(), 9)
    }

    /// A box covering exactly the character currently in `slot`.
    fn box_over_slot(w: &World, slot: usize) -> Rect {
        let id = w.in_slot_order()[slot];
        w.characters[id].sprite.bounds().unwrap()
    }

    fn slots(w: &World) -> Vec<usize> {
        w.characters.iter().map(|c| c.slot).collect()
    }

    #[test]
    fn hit_on_third_swaps_with_second() {
        let mut w = world();
        let mut events = vec![];
        let b = box_over_slot(&w, 2);
        assert!(obstacle_pass(&mut w, &b, &mut events));
        assert_eq!(w.in_slot_order(), vec![0, 2, 1, 3]);
        assert_eq!(w.characters[2].phase, CharPhase::Hurt);
        assert_eq!(events[0], GameEvent::Hit { who: 2 });
        assert_eq!(events[1], GameEvent::Reordered { order: vec![0, 2, 1, 3] });
        // Slides target the new slots.
        assert_eq!(w.characters[2].slide.as_ref().unwrap().to, w.slots[1]);
        assert_eq!(w.characters[1].slide.as_ref().unwrap().to, w.slots[2]);
    }

    #[test]
    fn hit_on_leader_keeps_order_but_hurts() {
        let mut w = world();
        let mut events = vec![];
        let b = box_over_slot(&w, 0);
        assert!(!obstacle_pass(&mut w, &b, &mut events));
        assert_eq!(slots(&w), vec![0, 1, 2, 3]);
        assert!(w.characters[0].was_hit);
        assert!(w.characters.iter().all(|c| c.slide.is_none()));
        assert_eq!(events, vec![GameEvent::Hit { who: 0 }]);
    }

    #[test]
    fn already_hit_character_is_not_hit_again() {
        let mut w = world();
        let mut events = vec![];
        let b = box_over_slot(&w, 3);
        obstacle_pass(&mut w, &b, &mut events);
        let after_first = w.in_slot_order();
        events.clear();

        // Same obstacle, same overlap, next frame: no further effect.
        let b = w.characters[3].sprite.bounds().unwrap();
        assert!(!obstacle_pass(&mut w, &b, &mut events));
        assert_eq!(w.in_slot_order(), after_first);
        assert!(events.is_empty());
    }

    #[test]
    fn character_without_bounds_is_skipped() {
        let mut w = world();
        let mut events = vec![];
        let b = box_over_slot(&w, 1);
        w.characters[1].sprite.delete();
        assert!(!obstacle_pass(&mut w, &b, &mut events));
        assert!(!w.characters[1].was_hit);
        assert!(events.is_empty());
    }

    #[test]
    fn wide_obstacle_hits_everyone_in_sequence() {
        let mut w = world();
        let mut events = vec![];
        let wide = Rect::new(0.0, 0.0, 2000.0, 2000.0);
        obstacle_pass(&mut w, &wide, &mut events);
        // [0,1,2,3]: 0 stays, 1 swaps with 0, 2 swaps with 0, 3 swaps with 0.
        assert_eq!(w.in_slot_order(), vec![1, 2, 3, 0]);
        assert!(w.slots_are_permutation());
    }

    #[test]
    fn collectible_scores_exactly_one() {
        let mut w = world();
        let mut events = vec![];
        let everything = Rect::new(0.0, 0.0, 2000.0, 2000.0);
        assert!(collect(&mut w, &everything, &mut events));
        let scores: Vec<u32> = w.characters.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![1, 0, 0, 0]);
        assert_eq!(events, vec![GameEvent::Collected { who: 0, score: 1 }]);
    }

    #[test]
    fn collectible_goes_to_first_in_slot_order_not_first_in_list() {
        let mut w = world();
        let order = vec![3, 2, 1, 0];
        commit_order(&mut w, &order);
        let mut events = vec![];
        assert!(collect(&mut w, &Rect::new(0.0, 0.0, 2000.0, 2000.0), &mut events));
        assert_eq!(w.characters[3].score, 1);
    }

    #[test]
    fn hurt_characters_cannot_collect() {
        let mut w = world();
        let phys = w.physics.clone();
        w.characters[0].hit(&phys);
        let item = box_over_slot(&w, 0);
        let mut events = vec![];
        assert!(!collect(&mut w, &item, &mut events));
        assert_eq!(w.characters[0].score, 0);
    }
}
