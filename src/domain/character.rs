/// Character controller: per-character physics and pose state machine.
///
/// Phases: Walking → Jumping → (Spinning) → Walking, with Hurt entered from
/// any phase by `hit()`. There is no terminal phase; the cycle runs until
/// the program ends.
///
/// Vertical motion uses trapezoidal integration of the velocity:
///   vy' = vy + g·dt
///   y'  = y + (vy + vy')/2 · dt
/// Screen y grows downward, so upward velocities are negative and the floor
/// is the largest y a character may have.

use crate::config::PhysicsConfig;
use super::easing::{Curve, Tween};
use super::sprite::{Anchor, Sprite};

/// Index into `World::characters`. Stable for the lifetime of a round.
pub type CharId = usize;

/// Character footprint in world pixels (Kenney alien sprites).
pub const CHAR_SIZE: (f32, f32) = (66.0, 92.0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CharPhase {
    Walking,
    Jumping,
    Spinning,
    Hurt,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pose {
    Walk1,
    Walk2,
    Jump,
    Duck,
    Hurt,
}

impl Pose {
    pub fn suffix(self) -> &'static str {
        match self {
            Pose::Walk1 => "walk1",
            Pose::Walk2 => "walk2",
            Pose::Jump => "jump",
            Pose::Duck => "duck",
            Pose::Hurt => "hurt",
        }
    }
}

/// What a jump command turned into.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JumpOutcome {
    /// Left the ground.
    Jumped,
    /// Mid-air second jump; the caller must start the spin routine.
    Spun,
    /// Double jump already used (or hurt): nothing happened.
    Ignored,
}

#[derive(Clone, Debug)]
pub struct Character {
    pub skin: String,
    pub slot: usize,
    pub sprite: Sprite,
    pub vy: f32,
    pub phase: CharPhase,
    pub pose: Pose,
    pub can_jump: bool,
    pub can_spin: bool,
    pub was_hit: bool,
    pub score: u32,
    /// Bumped by every spin so a stale spin task can tell it was superseded.
    pub spin_gen: u32,
    /// Horizontal slide toward the current slot, if one is running.
    pub slide: Option<Tween>,
    walk_timer: f32,
    walk_frame: u32,
}

impl Character {
    /// `walk_offset` seeds the walk-cycle timer so characters are out of step.
    pub fn new(skin: &str, slot: usize, x: f32, floor: f32, walk_offset: f32) -> Self {
        let image = format!("{skin}_{}", Pose::Walk1.suffix());
        Character {
            skin: skin.to_string(),
            slot,
            sprite: Sprite::new(image, x, floor, CHAR_SIZE, Anchor::Bottom),
            vy: 0.0,
            phase: CharPhase::Walking,
            pose: Pose::Walk1,
            can_jump: true,
            can_spin: false,
            was_hit: false,
            score: 0,
            spin_gen: 0,
            slide: None,
            walk_timer: walk_offset,
            walk_frame: 0,
        }
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.sprite.image = format!("{}_{}", self.skin, pose.suffix());
    }

    #[cfg(test)]
    pub fn y(&self) -> f32 {
        self.sprite.y
    }

    // ── Commands ──

    pub fn jump(&mut self, phys: &PhysicsConfig) -> JumpOutcome {
        if self.can_jump {
            self.can_jump = false;
            self.can_spin = true;
            self.vy = -phys.jump_velocity;
            self.phase = CharPhase::Jumping;
            self.set_pose(Pose::Jump);
            JumpOutcome::Jumped
        } else if self.can_spin {
            self.can_spin = false;
            self.spin_gen = self.spin_gen.wrapping_add(1);
            self.vy -= phys.spin_impulse;
            self.sprite.y -= phys.spin_hop;
            self.phase = CharPhase::Spinning;
            self.set_pose(Pose::Duck);
            self.sprite.anchor = Anchor::Center;
            JumpOutcome::Spun
        } else {
            JumpOutcome::Ignored
        }
    }

    /// Knock the character upward into the Hurt phase.
    /// Returns false (and does nothing) if it is already hurt and airborne.
    pub fn hit(&mut self, phys: &PhysicsConfig) -> bool {
        if self.was_hit {
            return false;
        }
        self.can_jump = false;
        self.can_spin = false;
        self.was_hit = true;
        self.phase = CharPhase::Hurt;
        self.set_pose(Pose::Hurt);
        self.vy = -phys.hit_velocity;
        true
    }

    // ── Per-frame update ──

    /// Integrate one frame. Returns true if the character touched down
    /// this frame after being airborne.
    pub fn integrate(&mut self, dt: f32, phys: &PhysicsConfig, floor: f32) -> bool {
        if self.phase != CharPhase::Walking {
            let uv = self.vy;
            self.vy += phys.gravity * dt;
            self.sprite.y += (uv + self.vy) / 2.0 * dt;
        } else {
            self.walk_timer += dt;
            if self.walk_timer > phys.walk_frame_secs {
                self.walk_timer = 0.0;
                self.walk_frame += 1;
                self.set_pose(self.walk_pose());
            }
        }

        if self.sprite.y >= floor {
            let was_airborne = self.phase != CharPhase::Walking;
            self.land(floor);
            return was_airborne;
        }
        false
    }

    fn land(&mut self, floor: f32) {
        self.sprite.y = floor;
        self.vy = 0.0;
        self.can_jump = true;
        self.can_spin = false;
        self.was_hit = false;
        if self.phase != CharPhase::Walking {
            self.phase = CharPhase::Walking;
            self.set_pose(self.walk_pose());
        }
    }

    fn walk_pose(&self) -> Pose {
        if self.walk_frame % 2 == 0 { Pose::Walk1 } else { Pose::Walk2 }
    }

    /// Start sliding toward `target_x`, replacing any slide in progress.
    pub fn slide_to(&mut self, target_x: f32, duration: f32) {
        self.slide = Some(Tween::new(self.sprite.x, target_x, duration, Curve::AccelDecel));
    }

    pub fn advance_slide(&mut self, dt: f32) {
        if let Some(tween) = &mut self.slide {
            let done = tween.advance(dt);
            self.sprite.x = tween.value();
            if done {
                self.slide = None;
            }
        }
    }

    // ── Spin routine hooks (driven by the spin task) ──

    /// Rotation finished: back to upright, anchored at the feet.
    pub fn end_spin_rotation(&mut self) {
        self.sprite.anchor = Anchor::Bottom;
        self.sprite.angle = 0.0;
    }

    /// Hold finished: restore the airborne pose and re-arm the spin, unless
    /// a hit or a landing already took the character out of the spin.
    pub fn finish_spin(&mut self) {
        if self.phase == CharPhase::Spinning {
            self.can_spin = true;
            self.phase = CharPhase::Jumping;
            self.set_pose(Pose::Jump);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: f32 = 650.0;

    fn walker() -> Character {
        Character::new("alienblue", 0, 106.0, FLOOR, 0.0)
    }

    fn run_frames(c: &mut Character, dts: &[f32], phys: &PhysicsConfig) -> Vec<f32> {
        dts.iter().map(|&dt| { c.integrate(dt, phys, FLOOR); c.y() }).collect()
    }

    #[test]
    fn starts_walking_on_the_floor() {
        let c = walker();
        assert_eq!(c.phase, CharPhase::Walking);
        assert!(c.can_jump && !c.can_spin && !c.was_hit);
        assert_eq!(c.y(), FLOOR);
        assert_eq!(c.sprite.image, "alienblue_walk1");
    }

    #[test]
    fn trajectory_matches_trapezoid_formula() {
        let phys = PhysicsConfig::default();
        let mut c = walker();
        assert_eq!(c.jump(&phys), JumpOutcome::Jumped);

        let dts = [1.0 / 60.0, 1.0 / 30.0, 0.02, 1.0 / 60.0, 0.01];
        let mut y = FLOOR;
        let mut vy = -phys.jump_velocity;
        for &dt in &dts {
            let uv = vy;
            vy += phys.gravity * dt;
            y += (uv + vy) / 2.0 * dt;
            c.integrate(dt, &phys, FLOOR);
            assert_eq!(c.y(), y);
            assert_eq!(c.vy, vy);
        }
    }

    #[test]
    fn identical_inputs_give_identical_trajectories() {
        let phys = PhysicsConfig::default();
        let dts: Vec<f32> = (0..120).map(|i| if i % 3 == 0 { 0.02 } else { 1.0 / 60.0 }).collect();

        let mut a = walker();
        a.jump(&phys);
        let ta = run_frames(&mut a, &dts, &phys);

        let mut b = walker();
        b.jump(&phys);
        let tb = run_frames(&mut b, &dts, &phys);

        assert_eq!(ta, tb);
        assert!(ta.iter().all(|&y| y <= FLOOR));
        assert_eq!(a.phase, CharPhase::Walking);
    }

    #[test]
    fn lands_and_resets_flags() {
        let phys = PhysicsConfig::default();
        let mut c = walker();
        c.jump(&phys);
        let mut landed = false;
        for _ in 0..200 {
            if c.integrate(1.0 / 60.0, &phys, FLOOR) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(c.y(), FLOOR);
        assert_eq!(c.vy, 0.0);
        assert!(c.can_jump && !c.can_spin);
        assert_eq!(c.phase, CharPhase::Walking);
    }

    #[test]
    fn second_jump_spins_third_is_ignored() {
        let phys = PhysicsConfig::default();
        let mut c = walker();
        assert_eq!(c.jump(&phys), JumpOutcome::Jumped);
        c.integrate(1.0 / 60.0, &phys, FLOOR);

        let (vy, y) = (c.vy, c.y());
        assert_eq!(c.jump(&phys), JumpOutcome::Spun);
        assert_eq!(c.vy, vy - phys.spin_impulse);
        assert_eq!(c.y(), y - phys.spin_hop);
        assert_eq!(c.phase, CharPhase::Spinning);
        assert_eq!(c.sprite.anchor, Anchor::Center);
        assert!(!c.can_spin);

        let (vy, y) = (c.vy, c.y());
        assert_eq!(c.jump(&phys), JumpOutcome::Ignored);
        assert_eq!((c.vy, c.y()), (vy, y));
    }

    #[test]
    fn hit_bounces_and_blocks_jumping() {
        let phys = PhysicsConfig::default();
        let mut c = walker();
        assert!(c.hit(&phys));
        assert_eq!(c.phase, CharPhase::Hurt);
        assert_eq!(c.vy, -phys.hit_velocity);
        assert_eq!(c.sprite.image, "alienblue_hurt");
        assert_eq!(c.jump(&phys), JumpOutcome::Ignored);
        // Already hurt: a second hit is refused until the character lands.
        assert!(!c.hit(&phys));
    }

    #[test]
    fn was_hit_clears_only_on_regrounding() {
        let phys = PhysicsConfig::default();
        let mut c = walker();
        c.hit(&phys);
        c.integrate(1.0 / 60.0, &phys, FLOOR);
        assert!(c.was_hit);
        assert!(c.y() < FLOOR);
        for _ in 0..200 {
            if c.integrate(1.0 / 60.0, &phys, FLOOR) { break; }
            assert!(c.was_hit);
        }
        assert!(!c.was_hit);
        assert!(c.hit(&phys));
    }

    #[test]
    fn walk_cycle_alternates_every_tenth_of_a_second() {
        let phys = PhysicsConfig::default();
        let mut c = walker();
        c.integrate(0.06, &phys, FLOOR);
        assert_eq!(c.pose, Pose::Walk1);
        c.integrate(0.06, &phys, FLOOR);
        assert_eq!(c.pose, Pose::Walk2);
        c.integrate(0.11, &phys, FLOOR);
        assert_eq!(c.pose, Pose::Walk1);
        assert_eq!(c.y(), FLOOR);
    }

    #[test]
    fn finish_spin_leaves_hurt_alone() {
        let phys = PhysicsConfig::default();
        let mut c = walker();
        c.jump(&phys);
        c.integrate(1.0 / 60.0, &phys, FLOOR);
        c.jump(&phys);
        c.hit(&phys);
        c.end_spin_rotation();
        c.finish_spin();
        assert_eq!(c.phase, CharPhase::Hurt);
        assert_eq!(c.pose, Pose::Hurt);
        assert_eq!(c.sprite.anchor, Anchor::Bottom);
        assert!(!c.can_spin);
    }

    #[test]
    fn finished_spin_rearms_the_next_spin() {
        let phys = PhysicsConfig::default();
        let mut c = walker();
        c.jump(&phys);
        c.integrate(1.0 / 60.0, &phys, FLOOR);
        assert_eq!(c.jump(&phys), JumpOutcome::Spun);
        assert_eq!(c.spin_gen, 1);
        c.end_spin_rotation();
        c.finish_spin();
        assert_eq!(c.phase, CharPhase::Jumping);
        assert!(c.can_spin);
        assert_eq!(c.jump(&phys), JumpOutcome::Spun);
        assert_eq!(c.spin_gen, 2);
    }

    #[test]
    fn slide_reaches_target() {
        let mut c = walker();
        c.slide_to(212.0, 0.3);
        for _ in 0..10 { c.advance_slide(0.05); }
        assert_eq!(c.sprite.x, 212.0);
        assert!(c.slide.is_none());
    }
}
