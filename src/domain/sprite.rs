/// Visual handles: the drawable side of characters and scrolling entities.
///
/// A `Sprite` is the core's view of a drawable: position, rotation, image
/// and anchor policy are mutable after creation, and `bounds()` gives the
/// axis-aligned box the collision engine tests against. The renderer only
/// reads sprites; it never feeds anything back into the simulation.

/// Axis-aligned rectangle in world pixels (y grows downward).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Rect { left, top, width, height }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// Which point of the image sits at the sprite's position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Anchor {
    /// Horizontal center, bottom edge. Used while standing/running.
    Bottom,
    /// Center of the image. Used while spinning.
    Center,
    /// Left edge, top. Used for ground tiles.
    TopLeft,
}

#[derive(Clone, Debug)]
pub struct Sprite {
    pub image: String,
    pub x: f32,
    pub y: f32,
    /// Rotation in radians.
    pub angle: f32,
    pub anchor: Anchor,
    /// Unrotated image footprint.
    pub width: f32,
    pub height: f32,
    deleted: bool,
}

impl Sprite {
    pub fn new(image: impl Into<String>, x: f32, y: f32, size: (f32, f32), anchor: Anchor) -> Self {
        Sprite {
            image: image.into(),
            x, y,
            angle: 0.0,
            anchor,
            width: size.0,
            height: size.1,
            deleted: false,
        }
    }

    /// Bounding box of the (possibly rotated) image.
    /// `None` once the sprite has been deleted.
    pub fn bounds(&self) -> Option<Rect> {
        if self.deleted {
            return None;
        }
        let (cx, cy) = self.center();
        let (sin, cos) = self.angle.sin_cos();
        let w = (self.width * cos).abs() + (self.height * sin).abs();
        let h = (self.width * sin).abs() + (self.height * cos).abs();
        Some(Rect::new(cx - w / 2.0, cy - h / 2.0, w, h))
    }

    /// Center of the unrotated image, given the anchor policy.
    pub fn center(&self) -> (f32, f32) {
        match self.anchor {
            Anchor::Bottom => (self.x, self.y - self.height / 2.0),
            Anchor::Center => (self.x, self.y),
            Anchor::TopLeft => (self.x + self.width / 2.0, self.y + self.height / 2.0),
        }
    }

    pub fn delete(&mut self) {
        self.deleted = true;
    }
}
