/// Slot reordering: how a hit shuffles the line of characters.
///
/// Policy: a hit character swaps places with whoever is directly in front
/// of it (one slot toward the back of the line), unless it is already first.
/// Within one obstacle pass the swaps apply incrementally, left to right,
/// against the working order built so far, so two hits in one pass can move
/// a leader back by more than one place.

/// Swap `order[index]` with its predecessor. Index 0 is left unchanged.
pub fn demote<T: Clone>(order: &[T], index: usize) -> Vec<T> {
    let mut out = order.to_vec();
    if index > 0 && index < out.len() {
        out.swap(index - 1, index);
    }
    out
}

/// Run one obstacle's pass over the line.
///
/// `in_order` is the line sorted by slot. `try_hit` is asked once per
/// member, in order; it returns true when that member overlapped the
/// obstacle and was hit (it applies the hit itself). Returns the new order.
pub fn reorder_pass<T, F>(in_order: &[T], mut try_hit: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    let mut out: Vec<T> = Vec::with_capacity(in_order.len());
    for member in in_order {
        out.push(member.clone());
        if try_hit(member) {
            out = demote(&out, out.len() - 1);
        }
    }
    out
}

/// True if `slots` holds each of `0..slots.len()` exactly once.
pub fn is_slot_permutation(slots: &[usize]) -> bool {
    let mut seen = vec![false; slots.len()];
    for &s in slots {
        match seen.get_mut(s) {
            Some(flag) if !*flag => *flag = true,
            _ => return false,
        }
    }
    true
}
