/// Easing curves and a single-value tween.
///
/// Pure math, no knowledge of sprites. The owner of a `Tween` advances it
/// with the frame delta and writes `value()` wherever it belongs.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Curve {
    #[default]
    Linear,
    /// Slow start and end (quadratic in-out).
    AccelDecel,
}

impl Curve {
    /// Map normalized time `t` in [0, 1] to eased progress in [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::AccelDecel => {
                let p = t * 2.0;
                if p < 1.0 {
                    0.5 * p * p
                } else {
                    let p = p - 1.0;
                    -0.5 * (p * (p - 2.0) - 1.0)
                }
            }
        }
    }
}

/// Interpolates one scalar from `from` to `to` over `duration` seconds.
#[derive(Clone, Debug)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub curve: Curve,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, curve: Curve) -> Self {
        Tween { from, to, duration, elapsed: 0.0, curve }
    }

    /// Advance by `dt`. Returns true once the tween has reached its end.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let k = self.curve.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * k
    }
}
